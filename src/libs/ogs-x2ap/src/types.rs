//! X2AP Basic Types
//!
//! Basic types from X2AP-CommonDataTypes (3GPP TS 36.423). Procedure codes
//! and IE ids are carried as `u32`; their wire bounds come from
//! [`CodecConfig`](crate::config::CodecConfig) so the same types serve every
//! protocol built on this container pattern.

use std::fmt;

use ogs_asn1c::per::{AperDecode, AperDecoder, AperEncode, AperEncoder, Constraint, PerError, PerResult};
use serde::{Deserialize, Serialize};

/// Criticality - indicates how to handle unrecognized IEs
/// ASN.1: Criticality ::= ENUMERATED { reject, ignore, notify }
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Criticality {
    Reject = 0,
    Ignore = 1,
    Notify = 2,
}

impl Criticality {
    pub const CONSTRAINT: Constraint = Constraint::new(0, 2);
}

impl AperEncode for Criticality {
    fn encode_aper(&self, encoder: &mut AperEncoder) -> PerResult<()> {
        encoder.encode_enumerated(*self as i64, &Self::CONSTRAINT)
    }
}

impl AperDecode for Criticality {
    fn decode_aper(decoder: &mut AperDecoder<'_>) -> PerResult<Self> {
        match decoder.decode_enumerated(&Self::CONSTRAINT)? {
            0 => Ok(Criticality::Reject),
            1 => Ok(Criticality::Ignore),
            2 => Ok(Criticality::Notify),
            value => Err(PerError::DecodeError(format!(
                "Invalid Criticality value: {value}"
            ))),
        }
    }
}

impl fmt::Display for Criticality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Criticality::Reject => "reject",
            Criticality::Ignore => "ignore",
            Criticality::Notify => "notify",
        })
    }
}

/// ProcedureCode - identifies the elementary procedure
/// ASN.1: ProcedureCode ::= INTEGER (0..255)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProcedureCode(pub u32);

impl ProcedureCode {
    pub fn encode_bounded(&self, encoder: &mut AperEncoder, bound: &Constraint) -> PerResult<()> {
        encoder.encode_constrained_whole_number(self.0 as i64, bound)
    }

    pub fn decode_bounded(decoder: &mut AperDecoder<'_>, bound: &Constraint) -> PerResult<Self> {
        let value = decoder.decode_constrained_whole_number(bound)?;
        Ok(ProcedureCode(value as u32))
    }
}

impl fmt::Display for ProcedureCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// ProtocolIE-ID - identifies the Information Element
/// ASN.1: ProtocolIE-ID ::= INTEGER (0..maxProtocolIEs)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProtocolIeId(pub u32);

impl ProtocolIeId {
    pub fn encode_bounded(&self, encoder: &mut AperEncoder, bound: &Constraint) -> PerResult<()> {
        encoder.encode_constrained_whole_number(self.0 as i64, bound)
    }

    pub fn decode_bounded(decoder: &mut AperDecoder<'_>, bound: &Constraint) -> PerResult<Self> {
        let value = decoder.decode_constrained_whole_number(bound)?;
        Ok(ProtocolIeId(value as u32))
    }
}

impl fmt::Display for ProtocolIeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// PrivateIE-ID
/// ASN.1: PrivateIE-ID ::= CHOICE { local INTEGER (0..maxPrivateIEs), global OBJECT IDENTIFIER }
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PrivateIeId {
    Local(u32),
    /// BER contents octets of the OBJECT IDENTIFIER
    Global(Vec<u8>),
}

impl PrivateIeId {
    pub const NUM_ALTERNATIVES: usize = 2;

    pub fn encode_bounded(&self, encoder: &mut AperEncoder, local_max: u32) -> PerResult<()> {
        match self {
            PrivateIeId::Local(id) => {
                encoder.encode_choice_index(0, Self::NUM_ALTERNATIVES, false)?;
                encoder.encode_constrained_whole_number(
                    *id as i64,
                    &Constraint::new(0, local_max as i64),
                )
            }
            PrivateIeId::Global(oid) => {
                encoder.encode_choice_index(1, Self::NUM_ALTERNATIVES, false)?;
                encoder.encode_object_identifier(oid)
            }
        }
    }

    pub fn decode_bounded(decoder: &mut AperDecoder<'_>, local_max: u32) -> PerResult<Self> {
        match decoder.decode_choice_index(Self::NUM_ALTERNATIVES, false)? {
            0 => {
                let id = decoder
                    .decode_constrained_whole_number(&Constraint::new(0, local_max as i64))?;
                Ok(PrivateIeId::Local(id as u32))
            }
            _ => Ok(PrivateIeId::Global(decoder.decode_object_identifier()?)),
        }
    }
}

impl fmt::Display for PrivateIeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PrivateIeId::Local(id) => write!(f, "local:{id}"),
            PrivateIeId::Global(oid) => {
                f.write_str("global:")?;
                for byte in oid {
                    write!(f, "{byte:02x}")?;
                }
                Ok(())
            }
        }
    }
}

/// Alternative of the top-level PDU choice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcedureClass {
    InitiatingMessage,
    SuccessfulOutcome,
    UnsuccessfulOutcome,
}

impl ProcedureClass {
    pub const ALL: [ProcedureClass; 3] = [
        ProcedureClass::InitiatingMessage,
        ProcedureClass::SuccessfulOutcome,
        ProcedureClass::UnsuccessfulOutcome,
    ];

    pub fn triggering_message(self) -> TriggeringMessage {
        match self {
            ProcedureClass::InitiatingMessage => TriggeringMessage::InitiatingMessage,
            ProcedureClass::SuccessfulOutcome => TriggeringMessage::SuccessfulOutcome,
            ProcedureClass::UnsuccessfulOutcome => TriggeringMessage::UnsuccessfulOutcome,
        }
    }
}

impl fmt::Display for ProcedureClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ProcedureClass::InitiatingMessage => "initiatingMessage",
            ProcedureClass::SuccessfulOutcome => "successfulOutcome",
            ProcedureClass::UnsuccessfulOutcome => "unsuccessfulOutcome",
        })
    }
}

/// TriggeringMessage - indicates which message triggered the error
/// ASN.1: TriggeringMessage ::= ENUMERATED { initiating-message, successful-outcome, unsuccessful-outcome }
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum TriggeringMessage {
    InitiatingMessage = 0,
    SuccessfulOutcome = 1,
    UnsuccessfulOutcome = 2,
}

impl TriggeringMessage {
    pub const CONSTRAINT: Constraint = Constraint::new(0, 2);
}

impl AperEncode for TriggeringMessage {
    fn encode_aper(&self, encoder: &mut AperEncoder) -> PerResult<()> {
        encoder.encode_enumerated(*self as i64, &Self::CONSTRAINT)
    }
}

impl AperDecode for TriggeringMessage {
    fn decode_aper(decoder: &mut AperDecoder<'_>) -> PerResult<Self> {
        match decoder.decode_enumerated(&Self::CONSTRAINT)? {
            0 => Ok(TriggeringMessage::InitiatingMessage),
            1 => Ok(TriggeringMessage::SuccessfulOutcome),
            2 => Ok(TriggeringMessage::UnsuccessfulOutcome),
            value => Err(PerError::DecodeError(format!(
                "Invalid TriggeringMessage value: {value}"
            ))),
        }
    }
}

/// Procedure being decoded or encoded, as carried by the envelope
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcedureInfo {
    pub class: ProcedureClass,
    pub procedure_code: ProcedureCode,
    pub criticality: Criticality,
}
