//! Protocol IE Containers
//!
//! Generic decode and encode of the X2AP-Containers types (3GPP TS 36.423
//! 9.3.7), with the criticality policy applied to every field whose value
//! cannot be resolved.
//!
//! ```text
//! ProtocolIE-Container ::= SEQUENCE (SIZE (0..maxProtocolIEs)) OF ProtocolIE-Field
//! ProtocolIE-Field ::= SEQUENCE {
//!     id          ProtocolIE-ID,
//!     criticality Criticality,
//!     value       open type
//! }
//! ProtocolExtensionContainer ::= SEQUENCE (SIZE (1..maxProtocolExtensions)) OF ProtocolExtensionField
//! PrivateIE-Container ::= SEQUENCE (SIZE (1..maxPrivateIEs)) OF PrivateIE-Field
//! ```
//!
//! A field that cannot be resolved, either because nothing is registered
//! for its id or because the registered codec fails on its value, is
//! handled by its criticality: `reject` fails the enclosing decode,
//! `ignore` drops it silently and `notify` drops it and records a
//! diagnostic.

use std::fmt;

use bytes::Bytes;
use log::{debug, trace, warn};
use ogs_asn1c::per::{AperDecode, AperDecoder, AperEncode, AperEncoder, PerError};

use crate::config::CodecConfig;
use crate::context::{DecodeContext, EncodeContext};
use crate::diagnostics::{Diagnostic, DiagnosticKind};
use crate::error::{X2apError, X2apResult};
use crate::registry::{Namespace, Registry};
use crate::schema::MessageSchema;
use crate::types::{Criticality, PrivateIeId, ProcedureInfo, ProtocolIeId};
use crate::value::{
    Container, Field, IeValue, ProtocolExtensionContainer, ProtocolIeField, RawField,
};

/// Upper bound on capacity reserved from an untrusted count
const PREALLOCATE_LIMIT: usize = 64;

/// Id of a container field
pub trait FieldId: Clone + PartialEq + fmt::Debug + fmt::Display {
    fn decode_id(decoder: &mut AperDecoder<'_>, config: &CodecConfig) -> X2apResult<Self>;

    fn encode_id(&self, encoder: &mut AperEncoder, config: &CodecConfig) -> X2apResult<()>;

    /// Registry id, or `None` when the id can never be resolved
    fn registry_id(&self) -> Option<u32>;

    /// Id a CriticalityDiagnostics item can name
    fn diagnostic_id(&self) -> Option<ProtocolIeId>;

    fn rejection(
        &self,
        criticality: Criticality,
        kind: DiagnosticKind,
        procedure: Option<ProcedureInfo>,
    ) -> X2apError;
}

impl FieldId for ProtocolIeId {
    fn decode_id(decoder: &mut AperDecoder<'_>, config: &CodecConfig) -> X2apResult<Self> {
        Ok(ProtocolIeId::decode_bounded(
            decoder,
            &config.protocol_ie_id_constraint(),
        )?)
    }

    fn encode_id(&self, encoder: &mut AperEncoder, config: &CodecConfig) -> X2apResult<()> {
        Ok(self.encode_bounded(encoder, &config.protocol_ie_id_constraint())?)
    }

    fn registry_id(&self) -> Option<u32> {
        Some(self.0)
    }

    fn diagnostic_id(&self) -> Option<ProtocolIeId> {
        Some(*self)
    }

    fn rejection(
        &self,
        criticality: Criticality,
        kind: DiagnosticKind,
        procedure: Option<ProcedureInfo>,
    ) -> X2apError {
        X2apError::Rejected {
            diagnostic: Diagnostic {
                ie_id: *self,
                ie_criticality: criticality,
                kind,
            },
            procedure,
        }
    }
}

impl FieldId for PrivateIeId {
    fn decode_id(decoder: &mut AperDecoder<'_>, config: &CodecConfig) -> X2apResult<Self> {
        Ok(PrivateIeId::decode_bounded(decoder, config.private_ie_id_max)?)
    }

    fn encode_id(&self, encoder: &mut AperEncoder, config: &CodecConfig) -> X2apResult<()> {
        Ok(self.encode_bounded(encoder, config.private_ie_id_max)?)
    }

    fn registry_id(&self) -> Option<u32> {
        match self {
            PrivateIeId::Local(id) => Some(*id),
            PrivateIeId::Global(_) => None,
        }
    }

    fn diagnostic_id(&self) -> Option<ProtocolIeId> {
        None
    }

    fn rejection(&self, _: Criticality, _: DiagnosticKind, _: Option<ProcedureInfo>) -> X2apError {
        X2apError::RejectedPrivateIe { id: self.clone() }
    }
}

/// Declared shape of one container
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContainerSpec {
    pub name: &'static str,
    pub namespace: Namespace,
    pub min: usize,
    pub max: usize,
}

impl ContainerSpec {
    pub const fn new(name: &'static str, namespace: Namespace, min: usize, max: usize) -> Self {
        Self {
            name,
            namespace,
            min,
            max,
        }
    }

    pub fn protocol_ies(config: &CodecConfig) -> Self {
        Self::new(
            "ProtocolIE-Container",
            Namespace::Ie,
            0,
            config.max_protocol_ies,
        )
    }

    pub fn extensions(config: &CodecConfig) -> Self {
        Self::new(
            "ProtocolExtensionContainer",
            Namespace::IeExtension,
            1,
            config.max_protocol_extensions,
        )
    }

    pub fn private_ies(config: &CodecConfig) -> Self {
        Self::new(
            "PrivateIE-Container",
            Namespace::PrivateIe,
            1,
            config.max_private_ies,
        )
    }
}

impl<'a, I: FieldId> RawField<'a, I> {
    pub fn decode(decoder: &mut AperDecoder<'a>, config: &CodecConfig) -> X2apResult<Self> {
        let id = I::decode_id(decoder, config)?;
        let criticality = Criticality::decode_aper(decoder)?;
        let value = decoder.decode_open_type()?;
        Ok(Self {
            id,
            criticality,
            value,
        })
    }
}

/// SEQUENCE OF count within `min..=max`
pub fn decode_count(
    decoder: &mut AperDecoder<'_>,
    container: &'static str,
    min: usize,
    max: usize,
) -> X2apResult<usize> {
    match decoder.decode_constrained_length(min, max) {
        Ok(count) => Ok(count),
        Err(PerError::ConstraintViolation { value, .. }) => Err(X2apError::CountOutOfBounds {
            container,
            count: value.max(0) as usize,
            min,
            max,
        }),
        Err(err) => Err(err.into()),
    }
}

pub fn encode_count(
    encoder: &mut AperEncoder,
    container: &'static str,
    count: usize,
    min: usize,
    max: usize,
) -> X2apResult<()> {
    if count < min || count > max {
        return Err(X2apError::CountOutOfBounds {
            container,
            count,
            min,
            max,
        });
    }
    encoder.encode_constrained_length(count, min, max)?;
    Ok(())
}

pub fn decode_container<I: FieldId>(
    decoder: &mut AperDecoder<'_>,
    spec: &ContainerSpec,
    ctx: &mut DecodeContext<'_>,
) -> X2apResult<Container<I>> {
    decode_container_tracking(decoder, spec, ctx).map(|(container, _)| container)
}

/// Decodes a container from `bytes` with a fresh context, returning the
/// resolved fields and the diagnostics of the pass
pub fn decode_container_standalone<I: FieldId>(
    bytes: &[u8],
    spec: &ContainerSpec,
    procedure: Option<ProcedureInfo>,
    registry: &Registry,
    config: &CodecConfig,
) -> X2apResult<(Container<I>, Vec<Diagnostic>)> {
    let mut ctx = DecodeContext::new(registry, config);
    if let Some(procedure) = procedure {
        ctx.set_procedure(procedure);
    }
    let mut decoder = AperDecoder::new(bytes);
    let container = decode_container(&mut decoder, spec, &mut ctx)?;
    Ok((container, ctx.into_diagnostics().into_diagnostics()))
}

/// Like [`decode_container`], also returning every id seen on the wire
pub(crate) fn decode_container_tracking<I: FieldId>(
    decoder: &mut AperDecoder<'_>,
    spec: &ContainerSpec,
    ctx: &mut DecodeContext<'_>,
) -> X2apResult<(Container<I>, Vec<I>)> {
    let count = decode_count(decoder, spec.name, spec.min, spec.max)?;
    ctx.enter()?;
    let result = decode_fields(decoder, count, spec, ctx);
    ctx.leave();
    result
}

fn decode_fields<I: FieldId>(
    decoder: &mut AperDecoder<'_>,
    count: usize,
    spec: &ContainerSpec,
    ctx: &mut DecodeContext<'_>,
) -> X2apResult<(Container<I>, Vec<I>)> {
    let mut container = Container::with_capacity(count.min(PREALLOCATE_LIMIT));
    let mut seen = Vec::with_capacity(count.min(PREALLOCATE_LIMIT));

    for _ in 0..count {
        let raw = RawField::<I>::decode(decoder, ctx.config())?;
        seen.push(raw.id.clone());
        if let Some(field) = resolve_field(raw, spec, ctx)? {
            container.push(field);
        }
    }
    Ok((container, seen))
}

fn resolve_field<I: FieldId>(
    raw: RawField<'_, I>,
    spec: &ContainerSpec,
    ctx: &mut DecodeContext<'_>,
) -> X2apResult<Option<Field<I>>> {
    let registry = ctx.registry();
    let keying = ctx.config().ie_keying;
    let codec = raw
        .id
        .registry_id()
        .and_then(|id| registry.resolve_field(spec.namespace, ctx.procedure_code(), id, keying));

    let Some(codec) = codec else {
        apply_policy(
            &raw.id,
            raw.criticality,
            DiagnosticKind::NotUnderstood,
            spec.name,
            ctx,
        )?;
        return Ok(None);
    };

    let mark = ctx.diagnostics().mark();
    let outer = ctx.replace_ie_id(raw.id.diagnostic_id());
    let mut value_decoder = AperDecoder::new(&raw.value);
    let result = codec.decode(&mut value_decoder, ctx);
    ctx.replace_ie_id(outer);

    match result {
        Ok(value) => {
            trace!("{} IE {}: {}", spec.name, raw.id, codec.name());
            Ok(Some(Field {
                id: raw.id,
                criticality: raw.criticality,
                value,
            }))
        }
        Err(
            err @ (X2apError::NestingTooDeep { .. }
            | X2apError::Rejected { .. }
            | X2apError::RejectedPrivateIe { .. }),
        ) => Err(err),
        Err(err) => {
            ctx.diagnostics_mut().rollback(mark);
            debug!("{} IE {} ({}): {err}", spec.name, raw.id, codec.name());
            apply_policy(
                &raw.id,
                raw.criticality,
                DiagnosticKind::NotUnderstood,
                spec.name,
                ctx,
            )?;
            Ok(None)
        }
    }
}

/// Applies the criticality policy to a field that is not understood or missing
pub(crate) fn apply_policy<I: FieldId>(
    id: &I,
    criticality: Criticality,
    kind: DiagnosticKind,
    container: &str,
    ctx: &mut DecodeContext<'_>,
) -> X2apResult<()> {
    match criticality {
        Criticality::Reject => {
            warn!("{container}: IE {id} {kind}, rejecting");
            Err(id.rejection(criticality, kind, ctx.procedure()))
        }
        Criticality::Ignore => {
            debug!("{container}: IE {id} {kind}, ignored");
            Ok(())
        }
        Criticality::Notify => {
            match id.diagnostic_id() {
                Some(ie_id) => {
                    warn!("{container}: IE {id} {kind}, reporting");
                    ctx.diagnostics_mut().record(Diagnostic {
                        ie_id,
                        ie_criticality: criticality,
                        kind,
                    });
                }
                None => warn!("{container}: IE {id} {kind}, cannot be reported"),
            }
            Ok(())
        }
    }
}

/// Governs every mandatory IE of `schema` absent from `seen`
pub fn check_mandatory(
    schema: &MessageSchema,
    seen: &[ProtocolIeId],
    ctx: &mut DecodeContext<'_>,
) -> X2apResult<()> {
    if !ctx.config().check_mandatory {
        return Ok(());
    }
    for spec in schema.mandatory_ies() {
        if !seen.contains(&spec.id) {
            apply_policy(
                &spec.id,
                spec.criticality,
                DiagnosticKind::Missing,
                schema.name,
                ctx,
            )?;
        }
    }
    Ok(())
}

pub fn encode_container<I: FieldId>(
    encoder: &mut AperEncoder,
    container: &Container<I>,
    spec: &ContainerSpec,
    ctx: &EncodeContext<'_>,
) -> X2apResult<()> {
    encode_count(encoder, spec.name, container.ies.len(), spec.min, spec.max)?;
    for field in &container.ies {
        encode_field(encoder, field, spec.namespace, ctx)?;
    }
    Ok(())
}

pub fn encode_field<I: FieldId>(
    encoder: &mut AperEncoder,
    field: &Field<I>,
    namespace: Namespace,
    ctx: &EncodeContext<'_>,
) -> X2apResult<()> {
    field.id.encode_id(encoder, ctx.config())?;
    field.criticality.encode_aper(encoder)?;
    let value = encode_field_value(field, namespace, ctx)?;
    encoder.encode_open_type(&value)?;
    Ok(())
}

fn encode_field_value<I: FieldId>(
    field: &Field<I>,
    namespace: Namespace,
    ctx: &EncodeContext<'_>,
) -> X2apResult<Bytes> {
    if let IeValue::Opaque(raw) = &field.value {
        return Ok(Bytes::copy_from_slice(raw));
    }

    let config = ctx.config();
    let codec = field
        .id
        .registry_id()
        .and_then(|id| {
            ctx.registry()
                .resolve_field(namespace, ctx.procedure_code(), id, config.ie_keying)
        })
        .ok_or_else(|| X2apError::NoEncoder {
            namespace,
            id: field.id.to_string(),
        })?;

    let mut value_encoder = AperEncoder::new();
    codec.encode(&field.value, &mut value_encoder, ctx)?;
    Ok(value_encoder.into_bytes())
}

/// Trailing iE-Extensions; `None` when every extension was dropped
pub fn decode_extensions(
    decoder: &mut AperDecoder<'_>,
    ctx: &mut DecodeContext<'_>,
) -> X2apResult<Option<ProtocolExtensionContainer>> {
    let spec = ContainerSpec::extensions(ctx.config());
    let extensions: ProtocolExtensionContainer = decode_container(decoder, &spec, ctx)?;
    Ok(if extensions.is_empty() {
        None
    } else {
        Some(extensions)
    })
}

pub fn encode_extensions(
    encoder: &mut AperEncoder,
    extensions: &ProtocolExtensionContainer,
    ctx: &EncodeContext<'_>,
) -> X2apResult<()> {
    encode_container(
        encoder,
        extensions,
        &ContainerSpec::extensions(ctx.config()),
        ctx,
    )
}

/// SEQUENCE (SIZE (min..max)) OF ProtocolIE-Single-Container
///
/// A single container carries exactly one ProtocolIE-Field, so the list
/// shares the container framing and policy; only the result shape differs.
pub fn decode_single_container_list(
    decoder: &mut AperDecoder<'_>,
    spec: &ContainerSpec,
    ctx: &mut DecodeContext<'_>,
) -> X2apResult<Vec<ProtocolIeField>> {
    decode_container::<ProtocolIeId>(decoder, spec, ctx).map(|container| container.ies)
}

pub fn encode_single_container_list(
    encoder: &mut AperEncoder,
    fields: &[ProtocolIeField],
    spec: &ContainerSpec,
    ctx: &EncodeContext<'_>,
) -> X2apResult<()> {
    encode_count(encoder, spec.name, fields.len(), spec.min, spec.max)?;
    for field in fields {
        encode_field(encoder, field, spec.namespace, ctx)?;
    }
    Ok(())
}

/// Skips the extension additions of an extensible SEQUENCE whose extension
/// bit was set, returning how many were present
pub fn skip_extension_additions(decoder: &mut AperDecoder<'_>) -> X2apResult<usize> {
    let count = decoder.decode_normally_small_length()?;
    let mut present = Vec::with_capacity(count.min(PREALLOCATE_LIMIT));
    for _ in 0..count {
        present.push(decoder.read_bit()?);
    }

    let mut skipped = 0;
    for flag in present {
        if flag {
            decoder.decode_open_type()?;
            skipped += 1;
        }
    }
    if skipped > 0 {
        debug!("Skipped {skipped} extension additions");
    }
    Ok(skipped)
}
