//! X2AP Error Types

use ogs_asn1c::PerError;
use thiserror::Error;

use crate::diagnostics::{CriticalityDiagnostics, Diagnostic};
use crate::registry::{Namespace, RegistryKey};
use crate::types::{PrivateIeId, ProcedureClass, ProcedureCode, ProcedureInfo};

/// Errors that can occur during X2AP message processing
#[derive(Error, Debug, Clone, PartialEq)]
pub enum X2apError {
    /// ASN.1 encoding/decoding error (truncation, bad length, bad fragment)
    #[error("ASN.1 codec error: {0}")]
    Asn1(#[from] PerError),

    /// Container count outside the declared SIZE bound
    #[error("{container} count {count} outside {min}..={max}")]
    CountOutOfBounds {
        container: &'static str,
        count: usize,
        min: usize,
        max: usize,
    },

    /// No message schema registered for (class, procedure code)
    #[error("Unknown procedure code {procedure_code} for {class}")]
    UnknownProcedure {
        class: ProcedureClass,
        procedure_code: ProcedureCode,
    },

    /// PDU choice index outside the configured root alternatives
    #[error("Unknown PDU choice index {index}")]
    UnknownPduChoice { index: usize },

    #[error("Container nesting deeper than {limit}")]
    NestingTooDeep { limit: usize },

    /// IE with criticality reject could not be understood or is missing
    #[error("Rejected {diagnostic}")]
    Rejected {
        diagnostic: Diagnostic,
        procedure: Option<ProcedureInfo>,
    },

    /// Private IE with criticality reject could not be understood
    #[error("Rejected private IE {id}")]
    RejectedPrivateIe { id: PrivateIeId },

    /// No codec registered for an IE value that is not opaque
    #[error("No encoder for {namespace} id {id}")]
    NoEncoder { namespace: Namespace, id: String },

    /// Codec handed a value of the wrong shape
    #[error("{codec} cannot encode a {found} value")]
    ValueMismatch {
        codec: &'static str,
        found: &'static str,
    },

    /// Invalid IE value
    #[error("Invalid IE value for {ie_name}: {reason}")]
    InvalidIeValue {
        ie_name: &'static str,
        reason: String,
    },

    #[error("Duplicate registration for {0}")]
    DuplicateRegistration(RegistryKey),

    /// Message registered into a field namespace or the reverse
    #[error("{kind} cannot be registered under {key}")]
    NamespaceMismatch { key: RegistryKey, kind: &'static str },
}

pub type X2apResult<T> = Result<T, X2apError>;

impl X2apError {
    /// CriticalityDiagnostics to report back for a failed decode, when the
    /// failure is one the peer can be told about.
    pub fn criticality_diagnostics(&self) -> Option<CriticalityDiagnostics> {
        match self {
            X2apError::Rejected {
                diagnostic,
                procedure,
            } => Some(CriticalityDiagnostics::for_procedure(
                *procedure,
                vec![*diagnostic],
            )),
            X2apError::UnknownProcedure {
                class,
                procedure_code,
            } => Some(CriticalityDiagnostics {
                procedure_code: Some(*procedure_code),
                triggering_message: Some(class.triggering_message()),
                ..Default::default()
            }),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::DiagnosticKind;
    use crate::types::{Criticality, ProtocolIeId, TriggeringMessage};

    #[test]
    fn test_rejected_carries_diagnostics() {
        let procedure = ProcedureInfo {
            class: ProcedureClass::InitiatingMessage,
            procedure_code: ProcedureCode(1),
            criticality: Criticality::Reject,
        };
        let err = X2apError::Rejected {
            diagnostic: Diagnostic {
                ie_id: ProtocolIeId(10),
                ie_criticality: Criticality::Reject,
                kind: DiagnosticKind::Missing,
            },
            procedure: Some(procedure),
        };

        let diagnostics = err.criticality_diagnostics().unwrap();
        assert_eq!(diagnostics.procedure_code, Some(ProcedureCode(1)));
        assert_eq!(
            diagnostics.triggering_message,
            Some(TriggeringMessage::InitiatingMessage)
        );
        assert_eq!(diagnostics.procedure_criticality, Some(Criticality::Reject));
        assert_eq!(diagnostics.ie_diagnostics.len(), 1);
        assert!(err.to_string().contains("10"));
    }

    #[test]
    fn test_structural_errors_have_no_diagnostics() {
        let err = X2apError::from(PerError::InvalidLength { length: 70000 });
        assert!(err.criticality_diagnostics().is_none());
        assert!(X2apError::NestingTooDeep { limit: 8 }
            .criticality_diagnostics()
            .is_none());
    }
}
