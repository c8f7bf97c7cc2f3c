//! X2AP procedure codes and IE ids (X2AP-Constants, 3GPP TS 36.423 9.3.8)

use crate::types::{ProcedureCode, ProtocolIeId};

impl ProcedureCode {
    pub const HANDOVER_PREPARATION: Self = Self(0);
    pub const HANDOVER_CANCEL: Self = Self(1);
    pub const LOAD_INDICATION: Self = Self(2);
    pub const ERROR_INDICATION: Self = Self(3);
    pub const SN_STATUS_TRANSFER: Self = Self(4);
    pub const UE_CONTEXT_RELEASE: Self = Self(5);
    pub const X2_SETUP: Self = Self(6);
    pub const RESET: Self = Self(7);
    pub const ENB_CONFIGURATION_UPDATE: Self = Self(8);
    pub const RESOURCE_STATUS_REPORTING_INITIATION: Self = Self(9);
    pub const RESOURCE_STATUS_REPORTING: Self = Self(10);
    pub const PRIVATE_MESSAGE: Self = Self(11);
    pub const MOBILITY_SETTINGS_CHANGE: Self = Self(12);
    pub const RLF_INDICATION: Self = Self(13);
    pub const HANDOVER_REPORT: Self = Self(14);
    pub const CELL_ACTIVATION: Self = Self(15);
    pub const X2_RELEASE: Self = Self(16);
    pub const X2AP_MESSAGE_TRANSFER: Self = Self(17);
    pub const X2_REMOVAL: Self = Self(18);
    pub const SENB_ADDITION_PREPARATION: Self = Self(19);
    pub const SENB_RECONFIGURATION_COMPLETION: Self = Self(20);
    pub const MENB_INITIATED_SENB_MODIFICATION_PREPARATION: Self = Self(21);
    pub const SENB_INITIATED_SENB_MODIFICATION: Self = Self(22);
    pub const MENB_INITIATED_SENB_RELEASE: Self = Self(23);
    pub const SENB_INITIATED_SENB_RELEASE: Self = Self(24);
    pub const SENB_COUNTER_CHECK: Self = Self(25);
}

impl ProtocolIeId {
    pub const E_RABS_ADMITTED_ITEM: Self = Self(0);
    pub const E_RABS_ADMITTED_LIST: Self = Self(1);
    pub const E_RAB_ITEM: Self = Self(2);
    pub const E_RABS_NOT_ADMITTED_LIST: Self = Self(3);
    pub const E_RABS_TO_BE_SETUP_ITEM: Self = Self(4);
    pub const CAUSE: Self = Self(5);
    pub const CELL_INFORMATION: Self = Self(6);
    pub const CELL_INFORMATION_ITEM: Self = Self(7);
    pub const NEW_ENB_UE_X2AP_ID: Self = Self(9);
    pub const OLD_ENB_UE_X2AP_ID: Self = Self(10);
    pub const TARGET_CELL_ID: Self = Self(11);
    pub const TARGET_ENB_TO_SOURCE_ENB_TRANSPARENT_CONTAINER: Self = Self(12);
    pub const TRACE_ACTIVATION: Self = Self(13);
    pub const UE_CONTEXT_INFORMATION: Self = Self(14);
    pub const UE_HISTORY_INFORMATION: Self = Self(15);
    pub const UE_X2AP_ID: Self = Self(16);
    pub const CRITICALITY_DIAGNOSTICS: Self = Self(17);
    pub const E_RABS_SUBJECT_TO_STATUS_TRANSFER_LIST: Self = Self(18);
    pub const E_RABS_SUBJECT_TO_STATUS_TRANSFER_ITEM: Self = Self(19);
    pub const SERVED_CELLS: Self = Self(20);
    pub const GLOBAL_ENB_ID: Self = Self(21);
    pub const TIME_TO_WAIT: Self = Self(22);
    pub const GUMMEI_ID: Self = Self(23);
    pub const GU_GROUP_ID_LIST: Self = Self(24);
}

/// maxnoofBearers
pub const MAX_NOOF_BEARERS: usize = 256;
