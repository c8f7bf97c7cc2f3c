//! Decode and encode contexts
//!
//! Per-call state threaded explicitly through container and field codecs.
//! One [`DecodeContext`] lives for exactly one PDU decode.

use crate::config::CodecConfig;
use crate::diagnostics::CriticalityDiagnosticsBuilder;
use crate::error::{X2apError, X2apResult};
use crate::registry::Registry;
use crate::types::{ProcedureCode, ProcedureInfo, ProtocolIeId};

pub struct DecodeContext<'r> {
    registry: &'r Registry,
    config: &'r CodecConfig,
    procedure: Option<ProcedureInfo>,
    ie_id: Option<ProtocolIeId>,
    depth: usize,
    diagnostics: CriticalityDiagnosticsBuilder,
}

impl<'r> DecodeContext<'r> {
    pub fn new(registry: &'r Registry, config: &'r CodecConfig) -> Self {
        Self {
            registry,
            config,
            procedure: None,
            ie_id: None,
            depth: 0,
            diagnostics: CriticalityDiagnosticsBuilder::with_limit(config.max_errors),
        }
    }

    pub fn registry(&self) -> &'r Registry {
        self.registry
    }

    pub fn config(&self) -> &'r CodecConfig {
        self.config
    }

    pub fn procedure(&self) -> Option<ProcedureInfo> {
        self.procedure
    }

    pub fn procedure_code(&self) -> Option<ProcedureCode> {
        self.procedure.map(|info| info.procedure_code)
    }

    pub fn set_procedure(&mut self, procedure: ProcedureInfo) {
        self.procedure = Some(procedure);
    }

    /// Id of the IE whose value is being decoded
    pub fn ie_id(&self) -> Option<ProtocolIeId> {
        self.ie_id
    }

    /// Replaces the current IE id, returning the previous one for restoring
    pub(crate) fn replace_ie_id(&mut self, ie_id: Option<ProtocolIeId>) -> Option<ProtocolIeId> {
        std::mem::replace(&mut self.ie_id, ie_id)
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub(crate) fn enter(&mut self) -> X2apResult<()> {
        if self.depth >= self.config.max_nesting_depth {
            return Err(X2apError::NestingTooDeep {
                limit: self.config.max_nesting_depth,
            });
        }
        self.depth += 1;
        Ok(())
    }

    pub(crate) fn leave(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    pub fn diagnostics(&self) -> &CriticalityDiagnosticsBuilder {
        &self.diagnostics
    }

    pub fn diagnostics_mut(&mut self) -> &mut CriticalityDiagnosticsBuilder {
        &mut self.diagnostics
    }

    pub fn into_diagnostics(self) -> CriticalityDiagnosticsBuilder {
        self.diagnostics
    }
}

/// Read-only counterpart of [`DecodeContext`] for encoding
#[derive(Clone, Copy)]
pub struct EncodeContext<'r> {
    registry: &'r Registry,
    config: &'r CodecConfig,
    procedure: Option<ProcedureCode>,
}

impl<'r> EncodeContext<'r> {
    pub fn new(registry: &'r Registry, config: &'r CodecConfig) -> Self {
        Self {
            registry,
            config,
            procedure: None,
        }
    }

    pub fn with_procedure(mut self, procedure: ProcedureCode) -> Self {
        self.procedure = Some(procedure);
        self
    }

    pub fn registry(&self) -> &'r Registry {
        self.registry
    }

    pub fn config(&self) -> &'r CodecConfig {
        self.config
    }

    pub fn procedure_code(&self) -> Option<ProcedureCode> {
        self.procedure
    }
}
