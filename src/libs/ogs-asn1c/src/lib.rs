//! NextGCore ASN.1 Codec Library
//!
//! Aligned PER (APER) primitives shared by the RAN application protocol
//! crates. Protocol containers and open-type dispatch are built on top of
//! this crate (see `ogs-x2ap`).
//!
//! # Modules
//!
//! - `per` - Packed Encoding Rules (APER) encoder/decoder

pub mod per;


pub use per::{
    encode_to_bytes, AperDecode, AperDecoder, AperEncode, AperEncoder, Constraint, PerError,
    PerResult,
};
