//! Codec Registry
//!
//! Namespaced tables mapping an IE id, or a (class, procedure code) pair, to
//! whatever resolves the corresponding open type. A [`RegistryBuilder`] is
//! filled once at start-up and frozen into a [`Registry`], which has no
//! mutators and is shared read-only between decoders.

use std::collections::hash_map::{Entry as MapEntry, HashMap};
use std::fmt;
use std::sync::Arc;

use ogs_asn1c::per::{AperDecoder, AperEncoder};

use crate::config::IeKeying;
use crate::context::{DecodeContext, EncodeContext};
use crate::error::{X2apError, X2apResult};
use crate::schema::MessageSchema;
use crate::types::{ProcedureClass, ProcedureCode, ProtocolIeId};
use crate::value::IeValue;

/// Registry namespace
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Namespace {
    Ie,
    IeExtension,
    PrivateIe,
    InitiatingValue,
    SuccessfulValue,
    UnsuccessfulValue,
}

impl Namespace {
    pub fn for_class(class: ProcedureClass) -> Self {
        match class {
            ProcedureClass::InitiatingMessage => Namespace::InitiatingValue,
            ProcedureClass::SuccessfulOutcome => Namespace::SuccessfulValue,
            ProcedureClass::UnsuccessfulOutcome => Namespace::UnsuccessfulValue,
        }
    }

    /// Procedure class of an outcome namespace
    pub fn class(self) -> Option<ProcedureClass> {
        match self {
            Namespace::InitiatingValue => Some(ProcedureClass::InitiatingMessage),
            Namespace::SuccessfulValue => Some(ProcedureClass::SuccessfulOutcome),
            Namespace::UnsuccessfulValue => Some(ProcedureClass::UnsuccessfulOutcome),
            _ => None,
        }
    }

    pub fn is_message(self) -> bool {
        self.class().is_some()
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Namespace::Ie => "IE",
            Namespace::IeExtension => "IE-extension",
            Namespace::PrivateIe => "private-IE",
            Namespace::InitiatingValue => "initiating-message-value",
            Namespace::SuccessfulValue => "successful-outcome-value",
            Namespace::UnsuccessfulValue => "unsuccessful-outcome-value",
        })
    }
}

/// Registry key
///
/// For the outcome namespaces `id` is the procedure code and `scope` is
/// always `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RegistryKey {
    pub namespace: Namespace,
    pub scope: Option<ProcedureCode>,
    pub id: u32,
}

impl RegistryKey {
    pub fn ie(id: ProtocolIeId) -> Self {
        Self {
            namespace: Namespace::Ie,
            scope: None,
            id: id.0,
        }
    }

    pub fn scoped_ie(procedure: ProcedureCode, id: ProtocolIeId) -> Self {
        Self {
            namespace: Namespace::Ie,
            scope: Some(procedure),
            id: id.0,
        }
    }

    pub fn extension(id: ProtocolIeId) -> Self {
        Self {
            namespace: Namespace::IeExtension,
            scope: None,
            id: id.0,
        }
    }

    pub fn scoped_extension(procedure: ProcedureCode, id: ProtocolIeId) -> Self {
        Self {
            namespace: Namespace::IeExtension,
            scope: Some(procedure),
            id: id.0,
        }
    }

    pub fn private(local_id: u32) -> Self {
        Self {
            namespace: Namespace::PrivateIe,
            scope: None,
            id: local_id,
        }
    }

    pub fn procedure(class: ProcedureClass, code: ProcedureCode) -> Self {
        Self {
            namespace: Namespace::for_class(class),
            scope: None,
            id: code.0,
        }
    }
}

impl fmt::Display for RegistryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.scope {
            Some(procedure) => write!(f, "{} {} (procedure {procedure})", self.namespace, self.id),
            None => write!(f, "{} {}", self.namespace, self.id),
        }
    }
}

/// Codec for one open-type value
pub trait ValueCodec: Send + Sync {
    fn name(&self) -> &'static str;

    fn decode(
        &self,
        decoder: &mut AperDecoder<'_>,
        ctx: &mut DecodeContext<'_>,
    ) -> X2apResult<IeValue>;

    fn encode(
        &self,
        value: &IeValue,
        encoder: &mut AperEncoder,
        ctx: &EncodeContext<'_>,
    ) -> X2apResult<()>;
}

pub type DecodeFn = fn(&mut AperDecoder<'_>, &mut DecodeContext<'_>) -> X2apResult<IeValue>;
pub type EncodeFn = fn(&IeValue, &mut AperEncoder, &EncodeContext<'_>) -> X2apResult<()>;

/// [`ValueCodec`] over a pair of plain functions
#[derive(Clone, Copy)]
pub struct FnCodec {
    name: &'static str,
    decode: DecodeFn,
    encode: EncodeFn,
}

impl FnCodec {
    pub const fn new(name: &'static str, decode: DecodeFn, encode: EncodeFn) -> Self {
        Self {
            name,
            decode,
            encode,
        }
    }
}

impl ValueCodec for FnCodec {
    fn name(&self) -> &'static str {
        self.name
    }

    fn decode(
        &self,
        decoder: &mut AperDecoder<'_>,
        ctx: &mut DecodeContext<'_>,
    ) -> X2apResult<IeValue> {
        (self.decode)(decoder, ctx)
    }

    fn encode(
        &self,
        value: &IeValue,
        encoder: &mut AperEncoder,
        ctx: &EncodeContext<'_>,
    ) -> X2apResult<()> {
        (self.encode)(value, encoder, ctx)
    }
}

/// Registry entry
#[derive(Clone)]
pub enum Entry {
    Field(Arc<dyn ValueCodec>),
    Message(Arc<MessageSchema>),
}

impl fmt::Debug for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Entry::Field(codec) => f.debug_tuple("Field").field(&codec.name()).finish(),
            Entry::Message(schema) => f.debug_tuple("Message").field(&schema.name).finish(),
        }
    }
}

/// Mutable registry, only reachable before [`RegistryBuilder::build`]
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    entries: HashMap<RegistryKey, Entry>,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(
        &mut self,
        key: RegistryKey,
        name: &'static str,
        decode: DecodeFn,
        encode: EncodeFn,
    ) -> X2apResult<()> {
        self.register_codec(key, Arc::new(FnCodec::new(name, decode, encode)))
    }

    pub fn register_codec(&mut self, key: RegistryKey, codec: Arc<dyn ValueCodec>) -> X2apResult<()> {
        if key.namespace.is_message() {
            return Err(X2apError::NamespaceMismatch {
                key,
                kind: "field codec",
            });
        }
        self.insert(key, Entry::Field(codec))
    }

    pub fn register_message(
        &mut self,
        class: ProcedureClass,
        code: ProcedureCode,
        schema: MessageSchema,
    ) -> X2apResult<()> {
        self.insert(
            RegistryKey::procedure(class, code),
            Entry::Message(Arc::new(schema)),
        )
    }

    /// Message schema under an explicit key, which must be an outcome namespace
    pub fn register_message_key(&mut self, key: RegistryKey, schema: MessageSchema) -> X2apResult<()> {
        if !key.namespace.is_message() || key.scope.is_some() {
            return Err(X2apError::NamespaceMismatch {
                key,
                kind: "message schema",
            });
        }
        self.insert(key, Entry::Message(Arc::new(schema)))
    }

    fn insert(&mut self, key: RegistryKey, entry: Entry) -> X2apResult<()> {
        match self.entries.entry(key) {
            MapEntry::Occupied(_) => Err(X2apError::DuplicateRegistration(key)),
            MapEntry::Vacant(slot) => {
                slot.insert(entry);
                Ok(())
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn build(self) -> Registry {
        log::debug!("Registry frozen with {} entries", self.entries.len());
        Registry {
            entries: self.entries,
        }
    }
}

/// Frozen registry
#[derive(Debug)]
pub struct Registry {
    entries: HashMap<RegistryKey, Entry>,
}

impl Registry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    pub fn lookup(&self, key: &RegistryKey) -> Option<&Entry> {
        self.entries.get(key)
    }

    /// Field codec stored under exactly `key`
    pub fn field(&self, key: &RegistryKey) -> Option<&dyn ValueCodec> {
        match self.lookup(key)? {
            Entry::Field(codec) => Some(codec.as_ref()),
            Entry::Message(_) => None,
        }
    }

    pub fn message(&self, class: ProcedureClass, code: ProcedureCode) -> Option<&MessageSchema> {
        match self.lookup(&RegistryKey::procedure(class, code))? {
            Entry::Message(schema) => Some(schema.as_ref()),
            Entry::Field(_) => None,
        }
    }

    /// Field codec for `id` seen inside `procedure`
    pub fn resolve_field(
        &self,
        namespace: Namespace,
        procedure: Option<ProcedureCode>,
        id: u32,
        keying: IeKeying,
    ) -> Option<&dyn ValueCodec> {
        let scoped = match (keying, procedure) {
            (IeKeying::ProcedureScoped, Some(procedure)) => self.field(&RegistryKey {
                namespace,
                scope: Some(procedure),
                id,
            }),
            _ => None,
        };
        scoped.or_else(|| {
            self.field(&RegistryKey {
                namespace,
                scope: None,
                id,
            })
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CodecConfig;

    fn decode_null(_: &mut AperDecoder<'_>, _: &mut DecodeContext<'_>) -> X2apResult<IeValue> {
        Ok(IeValue::Null)
    }

    fn decode_true(_: &mut AperDecoder<'_>, _: &mut DecodeContext<'_>) -> X2apResult<IeValue> {
        Ok(IeValue::Boolean(true))
    }

    fn encode_nothing(_: &IeValue, _: &mut AperEncoder, _: &EncodeContext<'_>) -> X2apResult<()> {
        Ok(())
    }

    fn decode_with(registry: &Registry, codec: &dyn ValueCodec) -> IeValue {
        let config = CodecConfig::default();
        let mut ctx = DecodeContext::new(registry, &config);
        let mut decoder = AperDecoder::new(&[0x00]);
        codec.decode(&mut decoder, &mut ctx).unwrap()
    }

    #[test]
    fn test_duplicate_registration() {
        let mut builder = Registry::builder();
        builder
            .register(RegistryKey::ie(ProtocolIeId(5)), "A", decode_null, encode_nothing)
            .unwrap();
        let err = builder
            .register(RegistryKey::ie(ProtocolIeId(5)), "B", decode_null, encode_nothing)
            .unwrap_err();
        assert_eq!(
            err,
            X2apError::DuplicateRegistration(RegistryKey::ie(ProtocolIeId(5)))
        );

        // same id in another namespace or scope is a different key
        builder
            .register(RegistryKey::extension(ProtocolIeId(5)), "C", decode_null, encode_nothing)
            .unwrap();
        builder
            .register(
                RegistryKey::scoped_ie(ProcedureCode(1), ProtocolIeId(5)),
                "D",
                decode_null,
                encode_nothing,
            )
            .unwrap();
        assert_eq!(builder.len(), 3);
    }

    #[test]
    fn test_namespace_mismatch() {
        let mut builder = Registry::builder();
        let key = RegistryKey::procedure(ProcedureClass::InitiatingMessage, ProcedureCode(1));
        assert!(matches!(
            builder.register(key, "A", decode_null, encode_nothing),
            Err(X2apError::NamespaceMismatch { .. })
        ));
        assert!(matches!(
            builder.register_message_key(RegistryKey::ie(ProtocolIeId(1)), MessageSchema::protocol_ies("M")),
            Err(X2apError::NamespaceMismatch { .. })
        ));
        assert!(builder.is_empty());
    }

    #[test]
    fn test_class_and_code_form_one_key() {
        let mut builder = Registry::builder();
        builder
            .register_message(
                ProcedureClass::InitiatingMessage,
                ProcedureCode(1),
                MessageSchema::protocol_ies("HandoverCancel"),
            )
            .unwrap();
        builder
            .register_message(
                ProcedureClass::SuccessfulOutcome,
                ProcedureCode(1),
                MessageSchema::protocol_ies("Other"),
            )
            .unwrap();
        let registry = builder.build();

        assert_eq!(
            registry
                .message(ProcedureClass::InitiatingMessage, ProcedureCode(1))
                .map(|schema| schema.name),
            Some("HandoverCancel")
        );
        assert!(registry
            .message(ProcedureClass::UnsuccessfulOutcome, ProcedureCode(1))
            .is_none());
        assert!(registry
            .message(ProcedureClass::InitiatingMessage, ProcedureCode(2))
            .is_none());
    }

    #[test]
    fn test_procedure_scoped_resolution() {
        let mut builder = Registry::builder();
        builder
            .register(RegistryKey::ie(ProtocolIeId(5)), "global", decode_null, encode_nothing)
            .unwrap();
        builder
            .register(
                RegistryKey::scoped_ie(ProcedureCode(7), ProtocolIeId(5)),
                "scoped",
                decode_true,
                encode_nothing,
            )
            .unwrap();
        let registry = builder.build();

        let scoped = registry
            .resolve_field(Namespace::Ie, Some(ProcedureCode(7)), 5, IeKeying::ProcedureScoped)
            .unwrap();
        assert_eq!(scoped.name(), "scoped");
        assert_eq!(decode_with(&registry, scoped), IeValue::Boolean(true));

        let fallback = registry
            .resolve_field(Namespace::Ie, Some(ProcedureCode(8)), 5, IeKeying::ProcedureScoped)
            .unwrap();
        assert_eq!(fallback.name(), "global");

        let global = registry
            .resolve_field(Namespace::Ie, Some(ProcedureCode(7)), 5, IeKeying::Global)
            .unwrap();
        assert_eq!(global.name(), "global");

        assert!(registry
            .resolve_field(Namespace::IeExtension, None, 5, IeKeying::ProcedureScoped)
            .is_none());
    }

    #[test]
    fn test_registry_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Registry>();
        assert_send_sync::<Arc<Registry>>();
    }
}
