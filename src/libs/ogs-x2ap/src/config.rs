//! Codec Configuration
//!
//! Wire bounds and decode policy knobs for one protocol profile. The
//! defaults are the X2AP values from X2AP-Constants (3GPP TS 36.423).

use std::path::Path;

use ogs_asn1c::per::Constraint;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::ProcedureClass;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration validation error: {0}")]
    ValidationError(String),
    #[error("Parse error: {0}")]
    ParseError(String),
    #[error("Cannot read {path}: {reason}")]
    Io { path: String, reason: String },
}

/// maxProtocolIEs
pub const MAX_PROTOCOL_IES: usize = 65535;
/// maxProtocolExtensions
pub const MAX_PROTOCOL_EXTENSIONS: usize = 65535;
/// maxPrivateIEs
pub const MAX_PRIVATE_IES: usize = 65535;
/// maxNrOfErrors
pub const MAX_NR_OF_ERRORS: usize = 256;

/// Largest SIZE upper bound encoded as a constrained length
const MAX_CONSTRAINED_SIZE: usize = 65535;

/// Inclusive INTEGER bound
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bound {
    pub min: u32,
    pub max: u32,
}

impl Bound {
    pub const fn new(min: u32, max: u32) -> Self {
        Self { min, max }
    }

    pub fn constraint(&self) -> Constraint {
        Constraint::new(self.min as i64, self.max as i64)
    }
}

/// How IE ids are keyed in the registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IeKeying {
    /// (procedure code, IE id) first, then the protocol-wide IE id
    #[default]
    ProcedureScoped,
    /// Protocol-wide IE id only
    Global,
}

/// Layout of the top-level PDU choice
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PduChoiceConf {
    /// Class of each root alternative, in index order
    pub order: Vec<ProcedureClass>,
    pub extensible: bool,
}

impl Default for PduChoiceConf {
    fn default() -> Self {
        Self {
            order: ProcedureClass::ALL.to_vec(),
            extensible: true,
        }
    }
}

/// Codec configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodecConfig {
    pub procedure_code: Bound,
    pub protocol_ie_id: Bound,
    pub private_ie_id_max: u32,
    pub max_protocol_ies: usize,
    pub max_protocol_extensions: usize,
    pub max_private_ies: usize,
    pub max_errors: usize,
    pub ie_keying: IeKeying,
    pub check_mandatory: bool,
    pub max_nesting_depth: usize,
    pub pdu_choice: PduChoiceConf,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            procedure_code: Bound::new(0, 255),
            protocol_ie_id: Bound::new(0, 65535),
            private_ie_id_max: 65535,
            max_protocol_ies: MAX_PROTOCOL_IES,
            max_protocol_extensions: MAX_PROTOCOL_EXTENSIONS,
            max_private_ies: MAX_PRIVATE_IES,
            max_errors: MAX_NR_OF_ERRORS,
            ie_keying: IeKeying::default(),
            check_mandatory: true,
            max_nesting_depth: 8,
            pdu_choice: PduChoiceConf::default(),
        }
    }
}

impl CodecConfig {
    pub fn x2ap() -> Self {
        Self::default()
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        let config: CodecConfig =
            serde_yaml::from_str(yaml).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Self::from_yaml_str(&yaml)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, bound) in [
            ("procedure_code", &self.procedure_code),
            ("protocol_ie_id", &self.protocol_ie_id),
        ] {
            if bound.min > bound.max {
                return Err(ConfigError::ValidationError(format!(
                    "`{name}` min {} exceeds max {}",
                    bound.min, bound.max
                )));
            }
        }

        for (name, max) in [
            ("max_protocol_ies", self.max_protocol_ies),
            ("max_protocol_extensions", self.max_protocol_extensions),
            ("max_private_ies", self.max_private_ies),
            ("max_errors", self.max_errors),
        ] {
            if max == 0 || max > MAX_CONSTRAINED_SIZE {
                return Err(ConfigError::ValidationError(format!(
                    "`{name}` must be within 1..={MAX_CONSTRAINED_SIZE}, got {max}"
                )));
            }
        }

        if self.max_nesting_depth == 0 {
            return Err(ConfigError::ValidationError(
                "`max_nesting_depth` should not be 0".to_string(),
            ));
        }

        let order = &self.pdu_choice.order;
        let complete = order.len() == ProcedureClass::ALL.len()
            && ProcedureClass::ALL.iter().all(|class| order.contains(class));
        if !complete {
            return Err(ConfigError::ValidationError(format!(
                "`pdu_choice.order` must list each procedure class once, got {order:?}"
            )));
        }
        Ok(())
    }

    pub fn procedure_code_constraint(&self) -> Constraint {
        self.procedure_code.constraint()
    }

    pub fn protocol_ie_id_constraint(&self) -> Constraint {
        self.protocol_ie_id.constraint()
    }

    pub fn class_for_index(&self, index: usize) -> Option<ProcedureClass> {
        self.pdu_choice.order.get(index).copied()
    }

    pub fn index_for_class(&self, class: ProcedureClass) -> Option<usize> {
        self.pdu_choice.order.iter().position(|c| *c == class)
    }
}
