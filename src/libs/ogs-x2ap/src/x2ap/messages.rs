//! X2AP message schemas (X2AP-PDU-Contents, 3GPP TS 36.423 9.3.4)

use crate::error::X2apResult;
use crate::registry::RegistryBuilder;
use crate::schema::MessageSchema;
use crate::types::{ProcedureCode, ProtocolIeId};

use crate::types::Criticality::{Ignore, Reject};

pub fn handover_preparation_failure() -> MessageSchema {
    MessageSchema::protocol_ies("HandoverPreparationFailure")
        .mandatory(ProtocolIeId::OLD_ENB_UE_X2AP_ID, Ignore)
        .mandatory(ProtocolIeId::CAUSE, Ignore)
        .optional(ProtocolIeId::CRITICALITY_DIAGNOSTICS, Ignore)
}

pub fn handover_request_acknowledge() -> MessageSchema {
    MessageSchema::protocol_ies("HandoverRequestAcknowledge")
        .mandatory(ProtocolIeId::OLD_ENB_UE_X2AP_ID, Ignore)
        .mandatory(ProtocolIeId::NEW_ENB_UE_X2AP_ID, Ignore)
        .mandatory(ProtocolIeId::E_RABS_ADMITTED_LIST, Ignore)
        .optional(ProtocolIeId::E_RABS_NOT_ADMITTED_LIST, Ignore)
        .mandatory(ProtocolIeId::TARGET_ENB_TO_SOURCE_ENB_TRANSPARENT_CONTAINER, Ignore)
        .optional(ProtocolIeId::CRITICALITY_DIAGNOSTICS, Ignore)
}

pub fn handover_cancel() -> MessageSchema {
    MessageSchema::protocol_ies("HandoverCancel")
        .mandatory(ProtocolIeId::OLD_ENB_UE_X2AP_ID, Reject)
        .optional(ProtocolIeId::NEW_ENB_UE_X2AP_ID, Ignore)
        .mandatory(ProtocolIeId::CAUSE, Ignore)
}

pub fn error_indication() -> MessageSchema {
    MessageSchema::protocol_ies("ErrorIndication")
        .optional(ProtocolIeId::OLD_ENB_UE_X2AP_ID, Ignore)
        .optional(ProtocolIeId::NEW_ENB_UE_X2AP_ID, Ignore)
        .optional(ProtocolIeId::CAUSE, Ignore)
        .optional(ProtocolIeId::CRITICALITY_DIAGNOSTICS, Ignore)
}

pub fn ue_context_release() -> MessageSchema {
    MessageSchema::protocol_ies("UEContextRelease")
        .mandatory(ProtocolIeId::OLD_ENB_UE_X2AP_ID, Reject)
        .mandatory(ProtocolIeId::NEW_ENB_UE_X2AP_ID, Reject)
}

pub fn x2_setup_failure() -> MessageSchema {
    MessageSchema::protocol_ies("X2SetupFailure")
        .mandatory(ProtocolIeId::CAUSE, Ignore)
        .optional(ProtocolIeId::TIME_TO_WAIT, Ignore)
        .optional(ProtocolIeId::CRITICALITY_DIAGNOSTICS, Ignore)
}

pub fn reset_request() -> MessageSchema {
    MessageSchema::protocol_ies("ResetRequest").mandatory(ProtocolIeId::CAUSE, Ignore)
}

pub fn reset_response() -> MessageSchema {
    MessageSchema::protocol_ies("ResetResponse")
        .optional(ProtocolIeId::CRITICALITY_DIAGNOSTICS, Ignore)
}

pub fn private_message() -> MessageSchema {
    MessageSchema::private_ies("PrivateMessage")
}

pub fn x2_release() -> MessageSchema {
    MessageSchema::protocol_ies("X2Release").mandatory(ProtocolIeId::GLOBAL_ENB_ID, Reject)
}

/// Registers the bundled message schemas under their elementary procedures
pub fn register_messages(builder: &mut RegistryBuilder) -> X2apResult<()> {
    use crate::types::ProcedureClass::{InitiatingMessage, SuccessfulOutcome, UnsuccessfulOutcome};

    let messages = [
        (UnsuccessfulOutcome, ProcedureCode::HANDOVER_PREPARATION, handover_preparation_failure()),
        (SuccessfulOutcome, ProcedureCode::HANDOVER_PREPARATION, handover_request_acknowledge()),
        (InitiatingMessage, ProcedureCode::HANDOVER_CANCEL, handover_cancel()),
        (InitiatingMessage, ProcedureCode::ERROR_INDICATION, error_indication()),
        (InitiatingMessage, ProcedureCode::UE_CONTEXT_RELEASE, ue_context_release()),
        (UnsuccessfulOutcome, ProcedureCode::X2_SETUP, x2_setup_failure()),
        (InitiatingMessage, ProcedureCode::RESET, reset_request()),
        (SuccessfulOutcome, ProcedureCode::RESET, reset_response()),
        (InitiatingMessage, ProcedureCode::PRIVATE_MESSAGE, private_message()),
        (InitiatingMessage, ProcedureCode::X2_RELEASE, x2_release()),
    ];
    for (class, code, schema) in messages {
        builder.register_message(class, code, schema)?;
    }
    Ok(())
}
