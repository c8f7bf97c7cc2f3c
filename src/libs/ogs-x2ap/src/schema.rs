//! Message schemas
//!
//! What a procedure's message value contains: the body kind and, for
//! ProtocolIE bodies, the IEs with their criticality and presence.

use crate::types::{Criticality, ProtocolIeId};

/// Presence - indicates whether an IE is mandatory, optional, or conditional
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Presence {
    Optional,
    Conditional,
    Mandatory,
}

/// One row of a message's IE table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IeSpec {
    pub id: ProtocolIeId,
    pub criticality: Criticality,
    pub presence: Presence,
}

/// Container carried by a message value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageBody {
    /// SEQUENCE { protocolIEs ProtocolIE-Container, ... }
    ProtocolIes,
    /// SEQUENCE { privateIEs PrivateIE-Container, ... }
    PrivateIes,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageSchema {
    pub name: &'static str,
    pub body: MessageBody,
    pub ies: Vec<IeSpec>,
}

impl MessageSchema {
    pub fn protocol_ies(name: &'static str) -> Self {
        Self {
            name,
            body: MessageBody::ProtocolIes,
            ies: Vec::new(),
        }
    }

    pub fn private_ies(name: &'static str) -> Self {
        Self {
            name,
            body: MessageBody::PrivateIes,
            ies: Vec::new(),
        }
    }

    pub fn ie(mut self, id: ProtocolIeId, criticality: Criticality, presence: Presence) -> Self {
        self.ies.push(IeSpec {
            id,
            criticality,
            presence,
        });
        self
    }

    pub fn mandatory(self, id: ProtocolIeId, criticality: Criticality) -> Self {
        self.ie(id, criticality, Presence::Mandatory)
    }

    pub fn optional(self, id: ProtocolIeId, criticality: Criticality) -> Self {
        self.ie(id, criticality, Presence::Optional)
    }

    pub fn conditional(self, id: ProtocolIeId, criticality: Criticality) -> Self {
        self.ie(id, criticality, Presence::Conditional)
    }

    pub fn find(&self, id: ProtocolIeId) -> Option<&IeSpec> {
        self.ies.iter().find(|spec| spec.id == id)
    }

    pub fn mandatory_ies(&self) -> impl Iterator<Item = &IeSpec> + '_ {
        self.ies
            .iter()
            .filter(|spec| spec.presence == Presence::Mandatory)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_builder() {
        let schema = MessageSchema::protocol_ies("HandoverCancel")
            .mandatory(ProtocolIeId(10), Criticality::Reject)
            .optional(ProtocolIeId(9), Criticality::Ignore)
            .mandatory(ProtocolIeId(5), Criticality::Ignore);

        assert_eq!(schema.body, MessageBody::ProtocolIes);
        let mandatory: Vec<_> = schema.mandatory_ies().map(|spec| spec.id).collect();
        assert_eq!(mandatory, vec![ProtocolIeId(10), ProtocolIeId(5)]);
        assert_eq!(
            schema.find(ProtocolIeId(9)).map(|spec| spec.presence),
            Some(Presence::Optional)
        );
    }
}
