//! Bundled X2AP catalogue
//!
//! A subset of TS 36.423: the UE-associated handover messages, the
//! global error and reset procedures, X2 Release and the private message.
//! IEs outside the subset decode through the criticality policy like any
//! other unknown IE.

mod codes;
mod ies;
mod messages;

pub use codes::MAX_NOOF_BEARERS;
pub use ies::{
    register_ies, Cause, CauseGroup, ERabItem, EnbId, GlobalEnbId, TimeToWait, E_RAB_ID, UE_X2AP_ID,
};
pub use messages::{
    error_indication, handover_cancel, handover_preparation_failure, handover_request_acknowledge,
    private_message, register_messages, reset_request, reset_response, ue_context_release,
    x2_release, x2_setup_failure,
};

use crate::error::X2apResult;
use crate::registry::{Registry, RegistryBuilder};

/// Adds the bundled IE codecs and message schemas to `builder`
pub fn register(builder: &mut RegistryBuilder) -> X2apResult<()> {
    register_ies(builder)?;
    register_messages(builder)
}

/// Frozen registry holding only the bundled catalogue
pub fn registry() -> X2apResult<Registry> {
    let mut builder = Registry::builder();
    register(&mut builder)?;
    Ok(builder.build())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::X2apCodec;
    use crate::diagnostics::{CriticalityDiagnostics, Diagnostic, DiagnosticKind};
    use crate::error::X2apError;
    use crate::pdu::{MessageValue, ProcedureEnvelope};
    use crate::types::{
        Criticality, PrivateIeId, ProcedureClass, ProcedureCode, ProcedureInfo, ProtocolIeId,
    };
    use crate::value::{IeValue, PrivateIeContainer, ProtocolIeContainer};

    fn codec() -> X2apCodec {
        X2apCodec::x2ap().unwrap()
    }

    fn roundtrip(envelope: &ProcedureEnvelope) -> ProcedureEnvelope {
        let codec = codec();
        let bytes = codec.encode(envelope).unwrap();
        let decoded = codec.decode(&bytes).unwrap();
        assert!(decoded.diagnostics.is_empty(), "{:?}", decoded.diagnostics);
        decoded.envelope
    }

    #[test]
    fn test_registry_contents() {
        let registry = registry().unwrap();
        assert!(registry
            .message(ProcedureClass::InitiatingMessage, ProcedureCode::HANDOVER_CANCEL)
            .is_some());
        assert!(registry
            .message(ProcedureClass::SuccessfulOutcome, ProcedureCode::HANDOVER_CANCEL)
            .is_none());
        assert_eq!(
            registry
                .message(ProcedureClass::UnsuccessfulOutcome, ProcedureCode::X2_SETUP)
                .map(|schema| schema.name),
            Some("X2SetupFailure")
        );

        let mut builder = Registry::builder();
        register(&mut builder).unwrap();
        assert!(matches!(
            register_ies(&mut builder),
            Err(X2apError::DuplicateRegistration(_))
        ));
    }

    #[test]
    fn test_handover_cancel_bytes() {
        let envelope = ProcedureEnvelope::initiating(
            ProcedureCode::HANDOVER_CANCEL,
            Criticality::Ignore,
            ProtocolIeContainer::new()
                .with(ProtocolIeId::OLD_ENB_UE_X2AP_ID, Criticality::Reject, IeValue::Integer(1))
                .with(
                    ProtocolIeId::CAUSE,
                    Criticality::Ignore,
                    Cause::radio_network(1).into(),
                ),
        );
        let bytes = codec().encode(&envelope).unwrap();
        assert_eq!(
            bytes.as_ref(),
            &[
                0x00, 0x01, 0x40, 0x0F, // initiatingMessage, HandoverCancel, ignore, 15 octets
                0x00, 0x00, 0x02, // ext, 2 IEs
                0x00, 0x0A, 0x00, 0x02, 0x00, 0x01, // Old eNB UE X2AP ID = 1
                0x00, 0x05, 0x40, 0x02, 0x00, 0x80, // Cause radioNetwork 1
            ]
        );
        assert_eq!(roundtrip(&envelope), envelope);
    }

    #[test]
    fn test_x2_setup_failure() {
        let envelope = ProcedureEnvelope::unsuccessful(
            ProcedureCode::X2_SETUP,
            Criticality::Reject,
            ProtocolIeContainer::new()
                .with(ProtocolIeId::CAUSE, Criticality::Ignore, Cause::misc(0).into())
                .with(
                    ProtocolIeId::TIME_TO_WAIT,
                    Criticality::Ignore,
                    TimeToWait::V10s.into(),
                )
                .with(
                    ProtocolIeId::CRITICALITY_DIAGNOSTICS,
                    Criticality::Ignore,
                    IeValue::CriticalityDiagnostics(CriticalityDiagnostics::for_procedure(
                        Some(ProcedureInfo {
                            class: ProcedureClass::InitiatingMessage,
                            procedure_code: ProcedureCode::X2_SETUP,
                            criticality: Criticality::Reject,
                        }),
                        vec![Diagnostic {
                            ie_id: ProtocolIeId::SERVED_CELLS,
                            ie_criticality: Criticality::Reject,
                            kind: DiagnosticKind::Missing,
                        }],
                    )),
                ),
        );
        assert_eq!(roundtrip(&envelope), envelope);
    }

    #[test]
    fn test_handover_request_acknowledge_relays_admitted_list() {
        let not_admitted = ProtocolIeContainer::new().with(
            ProtocolIeId::E_RAB_ITEM,
            Criticality::Ignore,
            ERabItem::new(6, Cause::radio_network(12)).into(),
        );
        let envelope = ProcedureEnvelope::successful(
            ProcedureCode::HANDOVER_PREPARATION,
            Criticality::Reject,
            ProtocolIeContainer::new()
                .with(ProtocolIeId::OLD_ENB_UE_X2AP_ID, Criticality::Ignore, IeValue::Integer(7))
                .with(ProtocolIeId::NEW_ENB_UE_X2AP_ID, Criticality::Ignore, IeValue::Integer(8))
                .with(
                    ProtocolIeId::E_RABS_ADMITTED_LIST,
                    Criticality::Ignore,
                    IeValue::Opaque(vec![0x00, 0x00]),
                )
                .with(
                    ProtocolIeId::E_RABS_NOT_ADMITTED_LIST,
                    Criticality::Ignore,
                    IeValue::Container(not_admitted.clone()),
                )
                .with(
                    ProtocolIeId::TARGET_ENB_TO_SOURCE_ENB_TRANSPARENT_CONTAINER,
                    Criticality::Ignore,
                    IeValue::OctetString(vec![0xAB; 40]),
                ),
        );

        let codec = codec();
        let decoded = codec.decode(&codec.encode(&envelope).unwrap()).unwrap();
        // The admitted list has no codec here; it was present, so it is
        // dropped without being reported missing
        assert!(decoded.diagnostics.is_empty());
        let ies = decoded.envelope.value.protocol_ies().unwrap();
        assert_eq!(ies.len(), 4);
        assert!(ies.find(&ProtocolIeId::E_RABS_ADMITTED_LIST).is_none());
        assert_eq!(
            ies.find(&ProtocolIeId::E_RABS_NOT_ADMITTED_LIST).map(|ie| &ie.value),
            Some(&IeValue::Container(not_admitted))
        );
    }

    #[test]
    fn test_x2_release_global_enb_id() {
        let global = GlobalEnbId {
            plmn_identity: [0x00, 0xF1, 0x10],
            enb_id: EnbId::macro_id(0xABCDE),
            extensions: None,
        };
        let envelope = ProcedureEnvelope::initiating(
            ProcedureCode::X2_RELEASE,
            Criticality::Reject,
            ProtocolIeContainer::new().with(
                ProtocolIeId::GLOBAL_ENB_ID,
                Criticality::Reject,
                global.clone().into(),
            ),
        );
        let decoded = roundtrip(&envelope);
        let ie = decoded.find_ie(ProtocolIeId::GLOBAL_ENB_ID).unwrap();
        assert_eq!(GlobalEnbId::try_from(&ie.value).unwrap(), global);
    }

    #[test]
    fn test_x2_release_with_malformed_global_enb_id_is_rejected() {
        // eNB-ID extension choice 5 is unknown; the IE is reject-critical
        let envelope = ProcedureEnvelope::initiating(
            ProcedureCode::X2_RELEASE,
            Criticality::Reject,
            ProtocolIeContainer::new().with(
                ProtocolIeId::GLOBAL_ENB_ID,
                Criticality::Reject,
                IeValue::Opaque(vec![0x00, 0x00, 0xF1, 0x10, 0x85, 0x01, 0x00]),
            ),
        );
        let codec = codec();
        let bytes = codec.encode(&envelope).unwrap();
        match codec.decode(&bytes) {
            Err(X2apError::Rejected { diagnostic, procedure }) => {
                assert_eq!(diagnostic.ie_id, ProtocolIeId::GLOBAL_ENB_ID);
                assert_eq!(diagnostic.kind, DiagnosticKind::NotUnderstood);
                assert_eq!(procedure.map(|p| p.procedure_code), Some(ProcedureCode::X2_RELEASE));
            }
            other => panic!("expected rejection, got {other:?}"),
        }
    }

    #[test]
    fn test_x2_release_reject_extension_under_ignore_ie() {
        let extensions = crate::value::ProtocolExtensionContainer::new().with(
            ProtocolIeId(500),
            Criticality::Reject,
            IeValue::Opaque(vec![0x00]),
        );
        let global = GlobalEnbId {
            plmn_identity: [0x00, 0xF1, 0x10],
            enb_id: EnbId::macro_id(0xABCDE),
            extensions: Some(extensions),
        };
        let envelope = ProcedureEnvelope::initiating(
            ProcedureCode::X2_RELEASE,
            Criticality::Reject,
            ProtocolIeContainer::new().with(
                ProtocolIeId::GLOBAL_ENB_ID,
                Criticality::Ignore,
                global.into(),
            ),
        );
        let codec = codec();
        let bytes = codec.encode(&envelope).unwrap();
        match codec.decode(&bytes) {
            Err(X2apError::Rejected { diagnostic, procedure }) => {
                assert_eq!(diagnostic.ie_id, ProtocolIeId(500));
                assert_eq!(diagnostic.ie_criticality, Criticality::Reject);
                assert_eq!(procedure.map(|p| p.procedure_code), Some(ProcedureCode::X2_RELEASE));
            }
            other => panic!("expected rejection, got {other:?}"),
        }
    }

    #[test]
    fn test_error_indication_all_optional() {
        let envelope = ProcedureEnvelope::initiating(
            ProcedureCode::ERROR_INDICATION,
            Criticality::Ignore,
            ProtocolIeContainer::new(),
        );
        assert_eq!(roundtrip(&envelope), envelope);
    }

    #[test]
    fn test_ue_context_release_missing_new_id_is_rejected() {
        let envelope = ProcedureEnvelope::initiating(
            ProcedureCode::UE_CONTEXT_RELEASE,
            Criticality::Ignore,
            ProtocolIeContainer::new().with(
                ProtocolIeId::OLD_ENB_UE_X2AP_ID,
                Criticality::Reject,
                IeValue::Integer(3),
            ),
        );
        let codec = codec();
        let bytes = codec.encode(&envelope).unwrap();
        let err = codec.decode(&bytes).unwrap_err();
        let report = err.criticality_diagnostics().unwrap();
        assert_eq!(report.procedure_code, Some(ProcedureCode::UE_CONTEXT_RELEASE));
        assert_eq!(
            report.ie_diagnostics,
            vec![Diagnostic {
                ie_id: ProtocolIeId::NEW_ENB_UE_X2AP_ID,
                ie_criticality: Criticality::Reject,
                kind: DiagnosticKind::Missing,
            }]
        );
    }

    #[test]
    fn test_reset_and_private_message() {
        let reset = ProcedureEnvelope::initiating(
            ProcedureCode::RESET,
            Criticality::Reject,
            ProtocolIeContainer::new().with(
                ProtocolIeId::CAUSE,
                Criticality::Ignore,
                Cause::protocol(5).into(),
            ),
        );
        assert_eq!(roundtrip(&reset), reset);

        let response = ProcedureEnvelope::successful(
            ProcedureCode::RESET,
            Criticality::Reject,
            ProtocolIeContainer::new(),
        );
        assert_eq!(roundtrip(&response), response);

        // Private IEs have no codecs, so ignore-critical ones are dropped
        let private = ProcedureEnvelope::new(
            ProcedureClass::InitiatingMessage,
            ProcedureCode::PRIVATE_MESSAGE,
            Criticality::Ignore,
            MessageValue::PrivateIes(PrivateIeContainer::new().with(
                PrivateIeId::Local(3),
                Criticality::Ignore,
                IeValue::Opaque(vec![1, 2, 3]),
            )),
        );
        let decoded = roundtrip(&private);
        assert_eq!(decoded.value.private_ies().map(|ies| ies.len()), Some(0));
    }
}
