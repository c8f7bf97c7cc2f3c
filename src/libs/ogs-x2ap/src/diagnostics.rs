//! Criticality Diagnostics
//!
//! Per-IE failure records collected during one decode pass and the
//! CriticalityDiagnostics IE (3GPP TS 36.423 9.2.7) they are reported with.
//!
//! ```text
//! CriticalityDiagnostics ::= SEQUENCE {
//!     procedureCode             ProcedureCode             OPTIONAL,
//!     triggeringMessage         TriggeringMessage         OPTIONAL,
//!     procedureCriticality      Criticality               OPTIONAL,
//!     iEsCriticalityDiagnostics CriticalityDiagnostics-IE-List OPTIONAL,
//!     iE-Extensions             ProtocolExtensionContainer OPTIONAL,
//!     ...
//! }
//! ```

use std::fmt;

use log::{trace, warn};
use ogs_asn1c::per::{AperDecode, AperDecoder, AperEncode, AperEncoder, Constraint};

use crate::config::MAX_NR_OF_ERRORS;
use crate::container::{
    decode_count, decode_extensions, encode_count, encode_extensions, skip_extension_additions,
};
use crate::context::{DecodeContext, EncodeContext};
use crate::error::{X2apError, X2apResult};
use crate::types::{Criticality, ProcedureCode, ProcedureInfo, ProtocolIeId, TriggeringMessage};
use crate::value::{IeValue, ProtocolExtensionContainer};

const IE_LIST: &str = "CriticalityDiagnostics-IE-List";

/// TypeOfError
/// ASN.1: TypeOfError ::= ENUMERATED { not-understood, missing, ... }
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum DiagnosticKind {
    NotUnderstood = 0,
    Missing = 1,
}

impl DiagnosticKind {
    pub const CONSTRAINT: Constraint = Constraint::extensible(0, 1);
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DiagnosticKind::NotUnderstood => "not-understood",
            DiagnosticKind::Missing => "missing",
        })
    }
}

/// One CriticalityDiagnostics-IE-Item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Diagnostic {
    pub ie_id: ProtocolIeId,
    pub ie_criticality: Criticality,
    pub kind: DiagnosticKind,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "IE {} ({}, {})",
            self.ie_id, self.ie_criticality, self.kind
        )
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct CriticalityDiagnostics {
    pub procedure_code: Option<ProcedureCode>,
    pub triggering_message: Option<TriggeringMessage>,
    pub procedure_criticality: Option<Criticality>,
    /// Empty means the IE list is absent
    pub ie_diagnostics: Vec<Diagnostic>,
    pub extensions: Option<ProtocolExtensionContainer>,
}

impl CriticalityDiagnostics {
    pub fn for_procedure(procedure: Option<ProcedureInfo>, ie_diagnostics: Vec<Diagnostic>) -> Self {
        Self {
            procedure_code: procedure.map(|p| p.procedure_code),
            triggering_message: procedure.map(|p| p.class.triggering_message()),
            procedure_criticality: procedure.map(|p| p.criticality),
            ie_diagnostics,
            extensions: None,
        }
    }

    pub fn decode(decoder: &mut AperDecoder<'_>, ctx: &mut DecodeContext<'_>) -> X2apResult<Self> {
        let config = ctx.config();
        let extended = decoder.read_bit()?;
        let has_procedure_code = decoder.read_bit()?;
        let has_triggering_message = decoder.read_bit()?;
        let has_procedure_criticality = decoder.read_bit()?;
        let has_ie_list = decoder.read_bit()?;
        let has_extensions = decoder.read_bit()?;

        let procedure_code = if has_procedure_code {
            Some(ProcedureCode::decode_bounded(
                decoder,
                &config.procedure_code_constraint(),
            )?)
        } else {
            None
        };
        let triggering_message = if has_triggering_message {
            Some(TriggeringMessage::decode_aper(decoder)?)
        } else {
            None
        };
        let procedure_criticality = if has_procedure_criticality {
            Some(Criticality::decode_aper(decoder)?)
        } else {
            None
        };

        let mut ie_diagnostics = Vec::new();
        if has_ie_list {
            let count = decode_count(decoder, IE_LIST, 1, config.max_errors)?;
            ie_diagnostics.reserve(count);
            for _ in 0..count {
                ie_diagnostics.push(decode_item(decoder, ctx)?);
            }
        }

        let extensions = if has_extensions {
            decode_extensions(decoder, ctx)?
        } else {
            None
        };
        if extended {
            skip_extension_additions(decoder)?;
        }

        Ok(Self {
            procedure_code,
            triggering_message,
            procedure_criticality,
            ie_diagnostics,
            extensions,
        })
    }

    pub fn encode(&self, encoder: &mut AperEncoder, ctx: &EncodeContext<'_>) -> X2apResult<()> {
        let config = ctx.config();
        encoder.write_bit(false);
        encoder.write_bit(self.procedure_code.is_some());
        encoder.write_bit(self.triggering_message.is_some());
        encoder.write_bit(self.procedure_criticality.is_some());
        encoder.write_bit(!self.ie_diagnostics.is_empty());
        encoder.write_bit(self.extensions.is_some());

        if let Some(code) = self.procedure_code {
            code.encode_bounded(encoder, &config.procedure_code_constraint())?;
        }
        if let Some(trigger) = self.triggering_message {
            trigger.encode_aper(encoder)?;
        }
        if let Some(criticality) = self.procedure_criticality {
            criticality.encode_aper(encoder)?;
        }
        if !self.ie_diagnostics.is_empty() {
            encode_count(encoder, IE_LIST, self.ie_diagnostics.len(), 1, config.max_errors)?;
            for item in &self.ie_diagnostics {
                encode_item(item, encoder, ctx)?;
            }
        }
        if let Some(extensions) = &self.extensions {
            encode_extensions(encoder, extensions, ctx)?;
        }
        Ok(())
    }
}

fn decode_item(decoder: &mut AperDecoder<'_>, ctx: &mut DecodeContext<'_>) -> X2apResult<Diagnostic> {
    let extended = decoder.read_bit()?;
    let has_extensions = decoder.read_bit()?;
    let ie_criticality = Criticality::decode_aper(decoder)?;
    let ie_id = ProtocolIeId::decode_bounded(decoder, &ctx.config().protocol_ie_id_constraint())?;
    let kind = match decoder.decode_enumerated_ext(&DiagnosticKind::CONSTRAINT)? {
        (0, false) => DiagnosticKind::NotUnderstood,
        (1, false) => DiagnosticKind::Missing,
        (value, extended) => {
            return Err(X2apError::InvalidIeValue {
                ie_name: "TypeOfError",
                reason: format!("unknown value {value} (extension {extended})"),
            })
        }
    };
    if has_extensions {
        if let Some(extensions) = decode_extensions(decoder, ctx)? {
            trace!("Dropping {} extensions of diagnostic for IE {ie_id}", extensions.len());
        }
    }
    if extended {
        skip_extension_additions(decoder)?;
    }
    Ok(Diagnostic {
        ie_id,
        ie_criticality,
        kind,
    })
}

fn encode_item(item: &Diagnostic, encoder: &mut AperEncoder, ctx: &EncodeContext<'_>) -> X2apResult<()> {
    encoder.write_bit(false);
    encoder.write_bit(false);
    item.ie_criticality.encode_aper(encoder)?;
    item.ie_id
        .encode_bounded(encoder, &ctx.config().protocol_ie_id_constraint())?;
    encoder.encode_enumerated_ext(item.kind as i64, false, &DiagnosticKind::CONSTRAINT)?;
    Ok(())
}

pub fn decode_criticality_diagnostics(
    decoder: &mut AperDecoder<'_>,
    ctx: &mut DecodeContext<'_>,
) -> X2apResult<IeValue> {
    Ok(IeValue::CriticalityDiagnostics(CriticalityDiagnostics::decode(decoder, ctx)?))
}

pub fn encode_criticality_diagnostics(
    value: &IeValue,
    encoder: &mut AperEncoder,
    ctx: &EncodeContext<'_>,
) -> X2apResult<()> {
    match value {
        IeValue::CriticalityDiagnostics(diagnostics) => diagnostics.encode(encoder, ctx),
        other => Err(X2apError::ValueMismatch {
            codec: "CriticalityDiagnostics",
            found: other.kind_name(),
        }),
    }
}

/// Position in a [`CriticalityDiagnosticsBuilder`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiagnosticsMark {
    len: usize,
    dropped: usize,
}

/// Accumulates the diagnostics of one decode pass
#[derive(Debug, Clone)]
pub struct CriticalityDiagnosticsBuilder {
    diagnostics: Vec<Diagnostic>,
    limit: usize,
    dropped: usize,
}

impl Default for CriticalityDiagnosticsBuilder {
    fn default() -> Self {
        Self::with_limit(MAX_NR_OF_ERRORS)
    }
}

impl CriticalityDiagnosticsBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_limit(limit: usize) -> Self {
        Self {
            diagnostics: Vec::new(),
            limit,
            dropped: 0,
        }
    }

    pub fn record(&mut self, diagnostic: Diagnostic) {
        if self.diagnostics.len() >= self.limit {
            self.dropped += 1;
            warn!(
                "Diagnostics list full ({}), dropping {diagnostic}",
                self.limit
            );
            return;
        }
        self.diagnostics.push(diagnostic);
    }

    pub fn not_understood(&mut self, ie_id: ProtocolIeId, ie_criticality: Criticality) {
        self.record(Diagnostic {
            ie_id,
            ie_criticality,
            kind: DiagnosticKind::NotUnderstood,
        });
    }

    pub fn missing(&mut self, ie_id: ProtocolIeId, ie_criticality: Criticality) {
        self.record(Diagnostic {
            ie_id,
            ie_criticality,
            kind: DiagnosticKind::Missing,
        });
    }

    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// Diagnostics that did not fit under the limit
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Current position, for [`rollback`](Self::rollback)
    pub fn mark(&self) -> DiagnosticsMark {
        DiagnosticsMark {
            len: self.diagnostics.len(),
            dropped: self.dropped,
        }
    }

    /// Forget everything recorded or dropped since `mark`
    pub fn rollback(&mut self, mark: DiagnosticsMark) {
        self.diagnostics.truncate(mark.len);
        self.dropped = self.dropped.min(mark.dropped);
    }

    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }

    pub fn build(&self, procedure: Option<ProcedureInfo>) -> Option<CriticalityDiagnostics> {
        if self.diagnostics.is_empty() && procedure.is_none() {
            return None;
        }
        Some(CriticalityDiagnostics::for_procedure(
            procedure,
            self.diagnostics.clone(),
        ))
    }
}
