//! IE values and protocol containers
//!
//! Field codecs produce an [`IeValue`] tree; containers keep their fields in
//! wire order. Duplicate ids are kept as separate fields.

use std::borrow::Cow;

use bitvec::prelude::*;

use crate::diagnostics::CriticalityDiagnostics;
use crate::types::{Criticality, PrivateIeId, ProtocolIeId};

/// Decoded value of an IE, an extension or a private IE
#[derive(Debug, Clone, PartialEq)]
pub enum IeValue {
    Null,
    Boolean(bool),
    Integer(i64),
    Enumerated { value: i64, extended: bool },
    BitString(BitVec<u8, Msb0>),
    OctetString(Vec<u8>),
    Sequence(Sequence),
    SequenceOf(Vec<IeValue>),
    Choice { index: usize, value: Box<IeValue> },
    Container(ProtocolIeContainer),
    CriticalityDiagnostics(CriticalityDiagnostics),
    /// Undecoded open type contents, relayed verbatim on encode
    Opaque(Vec<u8>),
}

impl IeValue {
    pub fn kind_name(&self) -> &'static str {
        match self {
            IeValue::Null => "NULL",
            IeValue::Boolean(_) => "BOOLEAN",
            IeValue::Integer(_) => "INTEGER",
            IeValue::Enumerated { .. } => "ENUMERATED",
            IeValue::BitString(_) => "BIT STRING",
            IeValue::OctetString(_) => "OCTET STRING",
            IeValue::Sequence(_) => "SEQUENCE",
            IeValue::SequenceOf(_) => "SEQUENCE OF",
            IeValue::Choice { .. } => "CHOICE",
            IeValue::Container(_) => "ProtocolIE-Container",
            IeValue::CriticalityDiagnostics(_) => "CriticalityDiagnostics",
            IeValue::Opaque(_) => "open type",
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            IeValue::Integer(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_octets(&self) -> Option<&[u8]> {
        match self {
            IeValue::OctetString(data) | IeValue::Opaque(data) => Some(data),
            _ => None,
        }
    }

    pub fn as_container(&self) -> Option<&ProtocolIeContainer> {
        match self {
            IeValue::Container(container) => Some(container),
            _ => None,
        }
    }
}

/// SEQUENCE value: root components in order (None for an absent OPTIONAL)
/// and the trailing iE-Extensions container
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Sequence {
    pub components: Vec<Option<IeValue>>,
    pub extensions: Option<ProtocolExtensionContainer>,
}

impl Sequence {
    pub fn new(components: Vec<Option<IeValue>>) -> Self {
        Self {
            components,
            extensions: None,
        }
    }

    pub fn with_extensions(mut self, extensions: ProtocolExtensionContainer) -> Self {
        self.extensions = Some(extensions);
        self
    }

    pub fn component(&self, index: usize) -> Option<&IeValue> {
        self.components.get(index).and_then(Option::as_ref)
    }
}

/// Resolved field of a container
#[derive(Debug, Clone, PartialEq)]
pub struct Field<I> {
    pub id: I,
    pub criticality: Criticality,
    pub value: IeValue,
}

impl<I> Field<I> {
    pub fn new(id: I, criticality: Criticality, value: IeValue) -> Self {
        Self {
            id,
            criticality,
            value,
        }
    }
}

/// Field as read from the wire, value not yet resolved
#[derive(Debug, Clone, PartialEq)]
pub struct RawField<'a, I> {
    pub id: I,
    pub criticality: Criticality,
    pub value: Cow<'a, [u8]>,
}

pub type ProtocolIeField = Field<ProtocolIeId>;
pub type ProtocolExtensionField = Field<ProtocolIeId>;
pub type PrivateIeField = Field<PrivateIeId>;

/// Ordered fields of a ProtocolIE-Container, ProtocolExtensionContainer or
/// PrivateIE-Container
#[derive(Debug, Clone, PartialEq)]
pub struct Container<I> {
    pub ies: Vec<Field<I>>,
}

impl<I> Default for Container<I> {
    fn default() -> Self {
        Self { ies: Vec::new() }
    }
}

impl<I: PartialEq> Container<I> {
    pub fn new() -> Self {
        Self { ies: Vec::new() }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            ies: Vec::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, field: Field<I>) {
        self.ies.push(field);
    }

    pub fn with(mut self, id: I, criticality: Criticality, value: IeValue) -> Self {
        self.ies.push(Field::new(id, criticality, value));
        self
    }

    pub fn len(&self) -> usize {
        self.ies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ies.is_empty()
    }

    /// First field with `id`
    pub fn find(&self, id: &I) -> Option<&Field<I>> {
        self.ies.iter().find(|ie| ie.id == *id)
    }

    pub fn find_mut(&mut self, id: &I) -> Option<&mut Field<I>> {
        self.ies.iter_mut().find(|ie| ie.id == *id)
    }

    /// Every field with `id`, in wire order
    pub fn find_all<'c>(&'c self, id: &'c I) -> impl Iterator<Item = &'c Field<I>> + 'c {
        self.ies.iter().filter(move |ie| ie.id == *id)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Field<I>> {
        self.ies.iter()
    }
}

impl<'c, I> IntoIterator for &'c Container<I> {
    type Item = &'c Field<I>;
    type IntoIter = std::slice::Iter<'c, Field<I>>;

    fn into_iter(self) -> Self::IntoIter {
        self.ies.iter()
    }
}

pub type ProtocolIeContainer = Container<ProtocolIeId>;
pub type ProtocolExtensionContainer = Container<ProtocolIeId>;
pub type PrivateIeContainer = Container<PrivateIeId>;
