//! X2AP Codec
//!
//! Frozen registry plus configuration, shared between any number of
//! decoding threads.

use std::sync::Arc;

use bytes::Bytes;

use crate::config::CodecConfig;
use crate::error::X2apResult;
use crate::pdu::{decode_pdu, encode_pdu, DecodedPdu, ProcedureEnvelope};
use crate::registry::Registry;
use crate::x2ap;

#[derive(Debug, Clone)]
pub struct X2apCodec {
    registry: Arc<Registry>,
    config: Arc<CodecConfig>,
}

impl X2apCodec {
    pub fn new(registry: Arc<Registry>, config: Arc<CodecConfig>) -> Self {
        Self { registry, config }
    }

    /// Codec with the bundled X2AP catalogue and default X2AP bounds
    pub fn x2ap() -> X2apResult<Self> {
        Ok(Self::new(
            Arc::new(x2ap::registry()?),
            Arc::new(CodecConfig::x2ap()),
        ))
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    pub fn decode(&self, bytes: &[u8]) -> X2apResult<DecodedPdu> {
        decode_pdu(bytes, &self.registry, &self.config)
    }

    pub fn encode(&self, envelope: &ProcedureEnvelope) -> X2apResult<Bytes> {
        encode_pdu(envelope, &self.registry, &self.config)
    }
}
