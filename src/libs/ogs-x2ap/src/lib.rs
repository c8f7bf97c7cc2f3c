//! NextGCore X2AP Protocol Library
//!
//! Criticality-aware decoding and encoding of X2AP (3GPP TS 36.423) PDUs,
//! layered on the APER primitives of `ogs-asn1c`.
//!
//! # Architecture
//!
//! - **Envelope** (`pdu`): the three-way X2AP-PDU choice carrying a
//!   procedure code, criticality and an open-type message value
//! - **Containers** (`container`): ProtocolIE, extension and private IE
//!   containers, with the reject/ignore/notify policy applied per field
//! - **Registry** (`registry`): frozen table of IE codecs and message
//!   schemas, shared read-only between decoders
//! - **Diagnostics** (`diagnostics`): CriticalityDiagnostics accumulated
//!   during a decode and its APER codec
//! - **Catalogue** (`x2ap`): a subset of the X2AP messages and IEs
//!
//! # Example
//!
//! ```no_run
//! use ogs_x2ap::x2ap::Cause;
//! use ogs_x2ap::{Criticality, IeValue, ProcedureCode, ProcedureEnvelope};
//! use ogs_x2ap::{ProtocolIeContainer, ProtocolIeId, X2apCodec};
//!
//! let codec = X2apCodec::x2ap().unwrap();
//! let cancel = ProcedureEnvelope::initiating(
//!     ProcedureCode::HANDOVER_CANCEL,
//!     Criticality::Ignore,
//!     ProtocolIeContainer::new()
//!         .with(ProtocolIeId::OLD_ENB_UE_X2AP_ID, Criticality::Reject, IeValue::Integer(17))
//!         .with(ProtocolIeId::CAUSE, Criticality::Ignore, Cause::radio_network(0).into()),
//! );
//! let bytes = codec.encode(&cancel).unwrap();
//! let decoded = codec.decode(&bytes).unwrap();
//! assert!(decoded.diagnostics.is_empty());
//! ```

pub mod codec;
pub mod config;
pub mod container;
pub mod context;
pub mod diagnostics;
pub mod error;
pub mod pdu;
pub mod registry;
pub mod schema;
pub mod types;
pub mod value;
pub mod x2ap;


pub use codec::X2apCodec;
pub use config::{CodecConfig, ConfigError};
pub use context::{DecodeContext, EncodeContext};
pub use diagnostics::{
    CriticalityDiagnostics, CriticalityDiagnosticsBuilder, Diagnostic, DiagnosticKind,
    DiagnosticsMark,
};
pub use error::{X2apError, X2apResult};
pub use pdu::{decode_pdu, encode_pdu, DecodedPdu, MessageValue, ProcedureEnvelope};
pub use registry::{Namespace, Registry, RegistryBuilder, RegistryKey, ValueCodec};
pub use schema::{MessageBody, MessageSchema, Presence};
pub use types::{
    Criticality, PrivateIeId, ProcedureClass, ProcedureCode, ProcedureInfo, ProtocolIeId,
    TriggeringMessage,
};
pub use value::{
    IeValue, PrivateIeContainer, ProtocolExtensionContainer, ProtocolIeContainer, Sequence,
};
