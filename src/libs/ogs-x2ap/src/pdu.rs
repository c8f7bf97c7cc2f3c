//! X2AP PDU Envelope
//!
//! Top-level PDU from X2AP-PDU-Descriptions (3GPP TS 36.423 9.3.3)
//!
//! ```text
//! X2AP-PDU ::= CHOICE {
//!     initiatingMessage   InitiatingMessage,
//!     successfulOutcome   SuccessfulOutcome,
//!     unsuccessfulOutcome UnsuccessfulOutcome,
//!     ...
//! }
//! InitiatingMessage ::= SEQUENCE {
//!     procedureCode X2AP-ELEMENTARY-PROCEDURE.&procedureCode,
//!     criticality   X2AP-ELEMENTARY-PROCEDURE.&criticality,
//!     value         X2AP-ELEMENTARY-PROCEDURE.&InitiatingMessage
//! }
//! ```
//!
//! The three alternatives share one shape, so a single
//! [`ProcedureEnvelope`] tagged with its [`ProcedureClass`] stands for all
//! of them. The value is resolved through the registry by (class, code).

use bytes::Bytes;
use log::debug;
use ogs_asn1c::per::{AperDecode, AperDecoder, AperEncode, AperEncoder};

use crate::config::CodecConfig;
use crate::container::{
    check_mandatory, decode_container, decode_container_tracking, encode_container,
    skip_extension_additions, ContainerSpec,
};
use crate::context::{DecodeContext, EncodeContext};
use crate::diagnostics::{CriticalityDiagnostics, Diagnostic};
use crate::error::{X2apError, X2apResult};
use crate::registry::Registry;
use crate::schema::{MessageBody, MessageSchema};
use crate::types::{Criticality, ProcedureClass, ProcedureCode, ProcedureInfo, ProtocolIeId};
use crate::value::{PrivateIeContainer, ProtocolIeContainer, ProtocolIeField};

/// Contents of a message value
#[derive(Debug, Clone, PartialEq)]
pub enum MessageValue {
    ProtocolIes(ProtocolIeContainer),
    PrivateIes(PrivateIeContainer),
}

impl MessageValue {
    pub fn protocol_ies(&self) -> Option<&ProtocolIeContainer> {
        match self {
            MessageValue::ProtocolIes(ies) => Some(ies),
            MessageValue::PrivateIes(_) => None,
        }
    }

    pub fn private_ies(&self) -> Option<&PrivateIeContainer> {
        match self {
            MessageValue::PrivateIes(ies) => Some(ies),
            MessageValue::ProtocolIes(_) => None,
        }
    }

    fn body(&self) -> MessageBody {
        match self {
            MessageValue::ProtocolIes(_) => MessageBody::ProtocolIes,
            MessageValue::PrivateIes(_) => MessageBody::PrivateIes,
        }
    }
}

/// One X2AP-PDU
#[derive(Debug, Clone, PartialEq)]
pub struct ProcedureEnvelope {
    pub class: ProcedureClass,
    pub procedure_code: ProcedureCode,
    pub criticality: Criticality,
    pub value: MessageValue,
}

impl ProcedureEnvelope {
    pub fn new(
        class: ProcedureClass,
        procedure_code: ProcedureCode,
        criticality: Criticality,
        value: MessageValue,
    ) -> Self {
        Self {
            class,
            procedure_code,
            criticality,
            value,
        }
    }

    pub fn initiating(code: ProcedureCode, criticality: Criticality, ies: ProtocolIeContainer) -> Self {
        Self::new(
            ProcedureClass::InitiatingMessage,
            code,
            criticality,
            MessageValue::ProtocolIes(ies),
        )
    }

    pub fn successful(code: ProcedureCode, criticality: Criticality, ies: ProtocolIeContainer) -> Self {
        Self::new(
            ProcedureClass::SuccessfulOutcome,
            code,
            criticality,
            MessageValue::ProtocolIes(ies),
        )
    }

    pub fn unsuccessful(code: ProcedureCode, criticality: Criticality, ies: ProtocolIeContainer) -> Self {
        Self::new(
            ProcedureClass::UnsuccessfulOutcome,
            code,
            criticality,
            MessageValue::ProtocolIes(ies),
        )
    }

    pub fn info(&self) -> ProcedureInfo {
        ProcedureInfo {
            class: self.class,
            procedure_code: self.procedure_code,
            criticality: self.criticality,
        }
    }

    pub fn find_ie(&self, id: ProtocolIeId) -> Option<&ProtocolIeField> {
        self.value.protocol_ies()?.find(&id)
    }
}

/// Result of a successful, possibly partial, decode
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedPdu {
    pub envelope: ProcedureEnvelope,
    /// IEs dropped under criticality notify, and missing mandatory IEs
    pub diagnostics: Vec<Diagnostic>,
}

impl DecodedPdu {
    pub fn has_diagnostics(&self) -> bool {
        !self.diagnostics.is_empty()
    }

    /// CriticalityDiagnostics to report back, if anything was noted
    pub fn criticality_diagnostics(&self) -> Option<CriticalityDiagnostics> {
        if self.diagnostics.is_empty() {
            return None;
        }
        Some(CriticalityDiagnostics::for_procedure(
            Some(self.envelope.info()),
            self.diagnostics.clone(),
        ))
    }
}

pub fn decode_pdu(bytes: &[u8], registry: &Registry, config: &CodecConfig) -> X2apResult<DecodedPdu> {
    let mut decoder = AperDecoder::new(bytes);
    let choice = &config.pdu_choice;
    let index = decoder.decode_choice_index(choice.order.len(), choice.extensible)?;
    let class = config
        .class_for_index(index)
        .ok_or(X2apError::UnknownPduChoice { index })?;

    let procedure_code =
        ProcedureCode::decode_bounded(&mut decoder, &config.procedure_code_constraint())?;
    let criticality = Criticality::decode_aper(&mut decoder)?;
    let value = decoder.decode_open_type()?;

    let schema = registry
        .message(class, procedure_code)
        .ok_or(X2apError::UnknownProcedure {
            class,
            procedure_code,
        })?;
    debug!("Decoding {} ({class} {procedure_code})", schema.name);

    let info = ProcedureInfo {
        class,
        procedure_code,
        criticality,
    };
    let mut ctx = DecodeContext::new(registry, config);
    ctx.set_procedure(info);
    let value = decode_message_value(&value, schema, &mut ctx)?;

    let diagnostics = ctx.into_diagnostics().into_diagnostics();
    if !diagnostics.is_empty() {
        debug!("{}: {} IEs noted for reporting", schema.name, diagnostics.len());
    }
    Ok(DecodedPdu {
        envelope: ProcedureEnvelope {
            class,
            procedure_code,
            criticality,
            value,
        },
        diagnostics,
    })
}

pub fn encode_pdu(
    envelope: &ProcedureEnvelope,
    registry: &Registry,
    config: &CodecConfig,
) -> X2apResult<Bytes> {
    let schema = registry
        .message(envelope.class, envelope.procedure_code)
        .ok_or(X2apError::UnknownProcedure {
            class: envelope.class,
            procedure_code: envelope.procedure_code,
        })?;
    let index = config
        .index_for_class(envelope.class)
        .ok_or(X2apError::UnknownPduChoice {
            index: config.pdu_choice.order.len(),
        })?;

    let ctx = EncodeContext::new(registry, config).with_procedure(envelope.procedure_code);
    let value = encode_message_value(&envelope.value, schema, &ctx)?;

    let mut encoder = AperEncoder::new();
    let choice = &config.pdu_choice;
    encoder.encode_choice_index(index, choice.order.len(), choice.extensible)?;
    envelope
        .procedure_code
        .encode_bounded(&mut encoder, &config.procedure_code_constraint())?;
    envelope.criticality.encode_aper(&mut encoder)?;
    encoder.encode_open_type(&value)?;
    Ok(encoder.into_bytes())
}

/// SEQUENCE { protocolIEs ProtocolIE-Container, ... }, or the privateIEs
/// form, followed by the mandatory-IE check
fn decode_message_value(
    value: &[u8],
    schema: &MessageSchema,
    ctx: &mut DecodeContext<'_>,
) -> X2apResult<MessageValue> {
    let config = ctx.config();
    let mut decoder = AperDecoder::new(value);
    let extended = decoder.read_bit()?;

    let value = match schema.body {
        MessageBody::ProtocolIes => {
            let spec = ContainerSpec::protocol_ies(config);
            let (ies, seen) = decode_container_tracking(&mut decoder, &spec, ctx)?;
            check_mandatory(schema, &seen, ctx)?;
            MessageValue::ProtocolIes(ies)
        }
        MessageBody::PrivateIes => {
            let spec = ContainerSpec::private_ies(config);
            MessageValue::PrivateIes(decode_container(&mut decoder, &spec, ctx)?)
        }
    };

    if extended {
        skip_extension_additions(&mut decoder)?;
    }
    Ok(value)
}

fn encode_message_value(
    value: &MessageValue,
    schema: &MessageSchema,
    ctx: &EncodeContext<'_>,
) -> X2apResult<Bytes> {
    let config = ctx.config();
    let mut encoder = AperEncoder::new();
    encoder.write_bit(false);

    match (schema.body, value) {
        (MessageBody::ProtocolIes, MessageValue::ProtocolIes(ies)) => {
            encode_container(&mut encoder, ies, &ContainerSpec::protocol_ies(config), ctx)?
        }
        (MessageBody::PrivateIes, MessageValue::PrivateIes(ies)) => {
            encode_container(&mut encoder, ies, &ContainerSpec::private_ies(config), ctx)?
        }
        (_, other) => {
            return Err(X2apError::ValueMismatch {
                codec: schema.name,
                found: match other.body() {
                    MessageBody::ProtocolIes => "protocolIEs",
                    MessageBody::PrivateIes => "privateIEs",
                },
            })
        }
    }
    Ok(encoder.into_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Bound;
    use crate::diagnostics::DiagnosticKind;
    use crate::registry::{RegistryBuilder, RegistryKey};
    use crate::types::PrivateIeId;
    use crate::value::IeValue;
    use ogs_asn1c::per::Constraint;

    const ID: Constraint = Constraint::new(0, 4095);

    fn decode_id(decoder: &mut AperDecoder<'_>, _: &mut DecodeContext<'_>) -> X2apResult<IeValue> {
        Ok(IeValue::Integer(decoder.decode_constrained_whole_number(&ID)?))
    }

    fn encode_id(value: &IeValue, encoder: &mut AperEncoder, _: &EncodeContext<'_>) -> X2apResult<()> {
        let value = value.as_integer().ok_or(X2apError::ValueMismatch {
            codec: "ID",
            found: value.kind_name(),
        })?;
        Ok(encoder.encode_constrained_whole_number(value, &ID)?)
    }

    fn builder() -> RegistryBuilder {
        let mut builder = Registry::builder();
        for id in [10, 9] {
            builder
                .register(RegistryKey::ie(ProtocolIeId(id)), "ID", decode_id, encode_id)
                .unwrap();
        }
        builder
            .register_message(
                ProcedureClass::InitiatingMessage,
                ProcedureCode(1),
                MessageSchema::protocol_ies("Cancel")
                    .mandatory(ProtocolIeId(10), Criticality::Reject)
                    .mandatory(ProtocolIeId(9), Criticality::Notify),
            )
            .unwrap();
        builder
            .register_message(
                ProcedureClass::InitiatingMessage,
                ProcedureCode(11),
                MessageSchema::private_ies("Private"),
            )
            .unwrap();
        builder
    }

    fn envelope(ies: ProtocolIeContainer) -> ProcedureEnvelope {
        ProcedureEnvelope::initiating(ProcedureCode(1), Criticality::Ignore, ies)
    }

    #[test]
    fn test_envelope_roundtrip() {
        let registry = builder().build();
        let config = CodecConfig::default();
        let envelope = envelope(
            ProtocolIeContainer::new()
                .with(ProtocolIeId(10), Criticality::Reject, IeValue::Integer(100))
                .with(ProtocolIeId(9), Criticality::Notify, IeValue::Integer(200)),
        );

        let bytes = encode_pdu(&envelope, &registry, &config).unwrap();
        // initiatingMessage, procedureCode 1, criticality ignore
        assert_eq!(&bytes[..3], &[0x00, 0x01, 0x40]);

        let decoded = decode_pdu(&bytes, &registry, &config).unwrap();
        assert_eq!(decoded.envelope, envelope);
        assert!(!decoded.has_diagnostics());
        assert!(decoded.criticality_diagnostics().is_none());
    }

    #[test]
    fn test_unknown_procedure() {
        let registry = builder().build();
        let config = CodecConfig {
            procedure_code: Bound::new(0, 65535),
            ..Default::default()
        };
        let mut encoder = AperEncoder::new();
        encoder.encode_choice_index(0, 3, true).unwrap();
        encoder
            .encode_constrained_whole_number(9999, &config.procedure_code_constraint())
            .unwrap();
        Criticality::Ignore.encode_aper(&mut encoder).unwrap();
        encoder.encode_open_type(&[0x00, 0x00]).unwrap();
        let bytes = encoder.into_bytes();

        let err = decode_pdu(&bytes, &registry, &config).unwrap_err();
        assert_eq!(
            err,
            X2apError::UnknownProcedure {
                class: ProcedureClass::InitiatingMessage,
                procedure_code: ProcedureCode(9999),
            }
        );
        let diagnostics = err.criticality_diagnostics().unwrap();
        assert_eq!(diagnostics.procedure_code, Some(ProcedureCode(9999)));

        let unknown = envelope(ProtocolIeContainer::new());
        let unknown = ProcedureEnvelope {
            procedure_code: ProcedureCode(9999),
            ..unknown
        };
        assert!(matches!(
            encode_pdu(&unknown, &registry, &config),
            Err(X2apError::UnknownProcedure { .. })
        ));
    }

    #[test]
    fn test_unknown_pdu_choice() {
        let registry = builder().build();
        let config = CodecConfig::default();
        let mut encoder = AperEncoder::new();
        encoder.encode_choice_index(3, 3, true).unwrap();
        let bytes = encoder.into_bytes();
        assert_eq!(
            decode_pdu(&bytes, &registry, &config).unwrap_err(),
            X2apError::UnknownPduChoice { index: 3 }
        );
    }

    #[test]
    fn test_missing_mandatory_ies() {
        let registry = builder().build();
        let config = CodecConfig::default();

        let only_10 = envelope(ProtocolIeContainer::new().with(
            ProtocolIeId(10),
            Criticality::Reject,
            IeValue::Integer(1),
        ));
        let bytes = encode_pdu(&only_10, &registry, &config).unwrap();
        let decoded = decode_pdu(&bytes, &registry, &config).unwrap();
        assert_eq!(
            decoded.diagnostics,
            vec![Diagnostic {
                ie_id: ProtocolIeId(9),
                ie_criticality: Criticality::Notify,
                kind: DiagnosticKind::Missing,
            }]
        );
        let reply = decoded.criticality_diagnostics().unwrap();
        assert_eq!(reply.procedure_code, Some(ProcedureCode(1)));
        assert_eq!(reply.procedure_criticality, Some(Criticality::Ignore));

        let only_9 = envelope(ProtocolIeContainer::new().with(
            ProtocolIeId(9),
            Criticality::Notify,
            IeValue::Integer(1),
        ));
        let bytes = encode_pdu(&only_9, &registry, &config).unwrap();
        match decode_pdu(&bytes, &registry, &config) {
            Err(X2apError::Rejected {
                diagnostic,
                procedure: Some(procedure),
            }) => {
                assert_eq!(diagnostic.ie_id, ProtocolIeId(10));
                assert_eq!(diagnostic.kind, DiagnosticKind::Missing);
                assert_eq!(procedure.procedure_code, ProcedureCode(1));
            }
            other => panic!("Expected Rejected, got {other:?}"),
        }

        let lenient = CodecConfig {
            check_mandatory: false,
            ..Default::default()
        };
        assert!(decode_pdu(&bytes, &registry, &lenient).is_ok());
    }

    #[test]
    fn test_undecodable_ie_is_not_reported_missing() {
        let registry = builder().build();
        let config = CodecConfig::default();
        let envelope = envelope(
            ProtocolIeContainer::new()
                .with(ProtocolIeId(10), Criticality::Reject, IeValue::Integer(1))
                .with(ProtocolIeId(9), Criticality::Ignore, IeValue::Opaque(vec![0x01])),
        );
        let bytes = encode_pdu(&envelope, &registry, &config).unwrap();
        let decoded = decode_pdu(&bytes, &registry, &config).unwrap();
        assert_eq!(decoded.envelope.value.protocol_ies().map(|ies| ies.len()), Some(1));
        assert!(decoded.diagnostics.is_empty());
    }

    #[test]
    fn test_private_message() {
        let mut builder = builder();
        builder
            .register(RegistryKey::private(3), "ID", decode_id, encode_id)
            .unwrap();
        let registry = builder.build();
        let config = CodecConfig::default();

        let ies = PrivateIeContainer::new().with(
            PrivateIeId::Local(3),
            Criticality::Ignore,
            IeValue::Integer(9),
        );
        let envelope = ProcedureEnvelope::new(
            ProcedureClass::InitiatingMessage,
            ProcedureCode(11),
            Criticality::Ignore,
            MessageValue::PrivateIes(ies),
        );
        let bytes = encode_pdu(&envelope, &registry, &config).unwrap();
        assert_eq!(decode_pdu(&bytes, &registry, &config).unwrap().envelope, envelope);

        let wrong_body = ProcedureEnvelope {
            procedure_code: ProcedureCode(1),
            ..envelope
        };
        assert!(matches!(
            encode_pdu(&wrong_body, &registry, &config),
            Err(X2apError::ValueMismatch { .. })
        ));
    }

    #[test]
    fn test_message_extension_additions_skipped() {
        let registry = builder().build();
        let config = CodecConfig::default();

        let mut value = AperEncoder::new();
        value.write_bit(true);
        value.encode_constrained_length(2, 0, 65535).unwrap();
        for (id, criticality) in [(10, Criticality::Reject), (9, Criticality::Notify)] {
            ProtocolIeId(id)
                .encode_bounded(&mut value, &config.protocol_ie_id_constraint())
                .unwrap();
            criticality.encode_aper(&mut value).unwrap();
            value.encode_open_type(&[0x00, 0x05]).unwrap();
        }
        value.encode_normally_small_length(1).unwrap();
        value.write_bit(true);
        value.encode_open_type(&[0xFF]).unwrap();
        let value = value.into_bytes();

        let mut encoder = AperEncoder::new();
        encoder.encode_choice_index(0, 3, true).unwrap();
        ProcedureCode(1)
            .encode_bounded(&mut encoder, &config.procedure_code_constraint())
            .unwrap();
        Criticality::Reject.encode_aper(&mut encoder).unwrap();
        encoder.encode_open_type(&value).unwrap();
        let bytes = encoder.into_bytes();

        let decoded = decode_pdu(&bytes, &registry, &config).unwrap();
        assert_eq!(
            decoded.envelope.find_ie(ProtocolIeId(9)).map(|ie| &ie.value),
            Some(&IeValue::Integer(5))
        );
    }

    #[test]
    fn test_custom_choice_order() {
        let registry = builder().build();
        let config = CodecConfig::from_yaml_str(
            "pdu_choice: { order: [successful_outcome, unsuccessful_outcome, initiating_message], extensible: false }",
        )
        .unwrap();
        let envelope = envelope(
            ProtocolIeContainer::new()
                .with(ProtocolIeId(10), Criticality::Reject, IeValue::Integer(1))
                .with(ProtocolIeId(9), Criticality::Notify, IeValue::Integer(2)),
        );
        let bytes = encode_pdu(&envelope, &registry, &config).unwrap();
        // index 2 of 3, no extension bit
        assert_eq!(bytes[0] >> 6, 0b10);
        assert_eq!(decode_pdu(&bytes, &registry, &config).unwrap().envelope, envelope);
    }
}
