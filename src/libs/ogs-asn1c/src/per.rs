//! PER (Packed Encoding Rules) primitives
//!
//! Aligned PER (APER, ITU-T X.691) as used by X2AP and the other RAN
//! application protocols. Only scalar primitives live here; containers,
//! open-type dispatch and criticality handling belong to the protocol crates.
//!
//! Decoding borrows from the input buffer. Octet-aligned reads, and in
//! particular open-type contents, are returned as `Cow::Borrowed` slices
//! unless the wire form is fragmented.

use std::borrow::Cow;

use bitvec::prelude::*;
use bytes::Bytes;
use thiserror::Error;

/// Fragment size unit for length determinants (X.691 11.9.3.8)
const FRAGMENT_UNIT: usize = 16384;

/// Largest length expressible without fragmentation
pub const MAX_UNFRAGMENTED_LENGTH: usize = FRAGMENT_UNIT - 1;

/// PER codec errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PerError {
    #[error("Buffer underflow: need {needed} bits, have {available}")]
    BufferUnderflow { needed: usize, available: usize },
    #[error("Value {value} outside constraint {min}..={max}")]
    ConstraintViolation { value: i64, min: i64, max: i64 },
    #[error("Invalid choice index: {index} (max {max})")]
    InvalidChoiceIndex { index: usize, max: usize },
    #[error("Invalid length: {length}")]
    InvalidLength { length: usize },
    #[error("Invalid fragment multiplier: {multiplier}")]
    InvalidFragment { multiplier: u8 },
    #[error("Integer does not fit in 64 bits ({octets} octets)")]
    IntegerOverflow { octets: usize },
    #[error("Extension value where only root values are allowed")]
    UnsupportedExtension,
    #[error("Decode error: {0}")]
    DecodeError(String),
}

pub type PerResult<T> = Result<T, PerError>;

/// Value range of a constrained INTEGER, ENUMERATED or SIZE constraint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Constraint {
    pub min: i64,
    pub max: i64,
    pub extensible: bool,
}

impl Constraint {
    pub const fn new(min: i64, max: i64) -> Self {
        Self { min, max, extensible: false }
    }

    pub const fn extensible(min: i64, max: i64) -> Self {
        Self { min, max, extensible: true }
    }

    /// Number of values in the range (0 for an inverted constraint)
    pub fn range(&self) -> u64 {
        if self.max >= self.min {
            (self.max as i128 - self.min as i128 + 1).min(u64::MAX as i128) as u64
        } else {
            0
        }
    }

    pub fn contains(&self, value: i64) -> bool {
        value >= self.min && value <= self.max
    }

    /// Bits of a non-negative-binary-integer holding every offset in the range
    pub fn bits_needed(&self) -> usize {
        let range = self.range();
        if range <= 1 {
            0
        } else {
            64 - (range - 1).leading_zeros() as usize
        }
    }

    /// Octets holding every offset in the range (indefinite-length case)
    pub fn octets_needed(&self) -> usize {
        self.bits_needed().div_ceil(8).max(1)
    }

    fn check(&self, value: i64) -> PerResult<()> {
        if self.contains(value) {
            Ok(())
        } else {
            Err(PerError::ConstraintViolation {
                value,
                min: self.min,
                max: self.max,
            })
        }
    }
}

/// Minimal two's-complement big-endian octets of `value`
fn signed_octets(value: i64) -> Vec<u8> {
    let raw = value.to_be_bytes();
    let mut start = 0;
    while start < raw.len() - 1 {
        let redundant = (raw[start] == 0x00 && raw[start + 1] & 0x80 == 0)
            || (raw[start] == 0xFF && raw[start + 1] & 0x80 != 0);
        if !redundant {
            break;
        }
        start += 1;
    }
    raw[start..].to_vec()
}

/// Minimal unsigned big-endian octets of `value` (at least one)
fn unsigned_octets(value: u64) -> Vec<u8> {
    let raw = value.to_be_bytes();
    let skip = raw.iter().take_while(|b| **b == 0).count().min(raw.len() - 1);
    raw[skip..].to_vec()
}

/// APER (Aligned PER) Encoder
#[derive(Debug, Clone)]
pub struct AperEncoder {
    buffer: BitVec<u8, Msb0>,
}

impl AperEncoder {
    pub fn new() -> Self {
        Self {
            buffer: BitVec::new(),
        }
    }

    pub fn with_capacity(bits: usize) -> Self {
        Self {
            buffer: BitVec::with_capacity(bits),
        }
    }

    /// Encoded bytes; a trailing partial octet is zero-padded
    pub fn into_bytes(self) -> Bytes {
        Bytes::from(self.buffer.into_vec())
    }

    pub fn bit_position(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Pad with zero bits up to the next octet boundary
    pub fn align(&mut self) {
        let padding = (8 - self.buffer.len() % 8) % 8;
        self.buffer.resize(self.buffer.len() + padding, false);
    }

    pub fn write_bit(&mut self, bit: bool) {
        self.buffer.push(bit);
    }

    /// Write the low `num_bits` bits of `value`, MSB first
    pub fn write_bits(&mut self, value: u64, num_bits: usize) {
        debug_assert!(num_bits <= 64);
        let bits = value.view_bits::<Msb0>();
        self.buffer.extend_from_bitslice(&bits[64 - num_bits..]);
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.buffer.extend_from_bitslice(bytes.view_bits::<Msb0>());
    }

    /// Constrained whole number (X.691 10.5)
    pub fn encode_constrained_whole_number(
        &mut self,
        value: i64,
        constraint: &Constraint,
    ) -> PerResult<()> {
        constraint.check(value)?;
        let range = constraint.range();
        let offset = (value as i128 - constraint.min as i128) as u64;

        match range {
            0 | 1 => {}
            2..=255 => self.write_bits(offset, constraint.bits_needed()),
            256 => {
                self.align();
                self.write_bits(offset, 8);
            }
            257..=65536 => {
                self.align();
                self.write_bits(offset, 16);
            }
            _ => {
                // Indefinite-length case: octet count as a constrained whole
                // number in 1..=octets_needed, then the aligned octets
                let octets = unsigned_octets(offset);
                let count = Constraint::new(1, constraint.octets_needed() as i64);
                self.encode_constrained_whole_number(octets.len() as i64, &count)?;
                self.align();
                self.write_bytes(&octets);
            }
        }
        Ok(())
    }

    /// Unconstrained whole number (X.691 10.8): length + two's complement
    pub fn encode_unconstrained_whole_number(&mut self, value: i64) -> PerResult<()> {
        let octets = signed_octets(value);
        self.encode_length_determinant(octets.len())?;
        self.write_bytes(&octets);
        Ok(())
    }

    /// Unconstrained length determinant (X.691 11.9.3.6/11.9.3.7)
    ///
    /// Lengths of 16K and above must go through [`Self::encode_fragmented`].
    pub fn encode_length_determinant(&mut self, length: usize) -> PerResult<()> {
        self.align();
        if length <= 127 {
            self.write_bits(length as u64, 8);
        } else if length <= MAX_UNFRAGMENTED_LENGTH {
            self.write_bits(0x8000 | length as u64, 16);
        } else {
            return Err(PerError::InvalidLength { length });
        }
        Ok(())
    }

    /// Length-prefixed octets, fragmented in 16K units when needed
    pub fn encode_fragmented(&mut self, data: &[u8]) -> PerResult<()> {
        let mut rest = data;
        loop {
            if rest.len() <= MAX_UNFRAGMENTED_LENGTH {
                self.encode_length_determinant(rest.len())?;
                self.write_bytes(rest);
                return Ok(());
            }
            let multiplier = (rest.len() / FRAGMENT_UNIT).min(4);
            let chunk = multiplier * FRAGMENT_UNIT;
            self.align();
            self.write_bits(0xC0 | multiplier as u64, 8);
            self.write_bytes(&rest[..chunk]);
            rest = &rest[chunk..];
        }
    }

    /// Constrained length determinant (SIZE constraint with ub < 64K)
    pub fn encode_constrained_length(
        &mut self,
        length: usize,
        min: usize,
        max: usize,
    ) -> PerResult<()> {
        let constraint = Constraint::new(min as i64, max as i64);
        self.encode_constrained_whole_number(length as i64, &constraint)
    }

    /// Normally small non-negative whole number (X.691 10.6)
    pub fn encode_normally_small_non_negative(&mut self, value: u64) -> PerResult<()> {
        if value <= 63 {
            self.write_bit(false);
            self.write_bits(value, 6);
            Ok(())
        } else {
            self.write_bit(true);
            let octets = unsigned_octets(value);
            self.encode_length_determinant(octets.len())?;
            self.write_bytes(&octets);
            Ok(())
        }
    }

    /// Normally small length (X.691 11.9.3.4), used for extension bitmaps
    pub fn encode_normally_small_length(&mut self, length: usize) -> PerResult<()> {
        if length == 0 {
            return Err(PerError::InvalidLength { length });
        }
        if length <= 64 {
            self.write_bit(false);
            self.write_bits(length as u64 - 1, 6);
            Ok(())
        } else {
            self.write_bit(true);
            self.encode_length_determinant(length)
        }
    }

    /// ENUMERATED root value (X.691 13)
    pub fn encode_enumerated(&mut self, value: i64, constraint: &Constraint) -> PerResult<()> {
        self.encode_enumerated_ext(value, false, constraint)
    }

    /// ENUMERATED value; `extended` selects an extension-addition index
    pub fn encode_enumerated_ext(
        &mut self,
        value: i64,
        extended: bool,
        constraint: &Constraint,
    ) -> PerResult<()> {
        if extended && !constraint.extensible {
            return Err(PerError::UnsupportedExtension);
        }
        if constraint.extensible {
            self.write_bit(extended);
        }
        if extended {
            if value < 0 {
                return Err(PerError::ConstraintViolation { value, min: 0, max: i64::MAX });
            }
            self.encode_normally_small_non_negative(value as u64)
        } else {
            self.encode_constrained_whole_number(value, constraint)
        }
    }

    /// CHOICE index (X.691 22); indices past the root are extension choices
    pub fn encode_choice_index(
        &mut self,
        index: usize,
        num_alternatives: usize,
        extensible: bool,
    ) -> PerResult<()> {
        if num_alternatives == 0 {
            return Err(PerError::InvalidChoiceIndex { index, max: 0 });
        }
        let in_root = index < num_alternatives;
        if !in_root && !extensible {
            return Err(PerError::InvalidChoiceIndex {
                index,
                max: num_alternatives - 1,
            });
        }
        if extensible {
            self.write_bit(!in_root);
        }
        if in_root {
            let constraint = Constraint::new(0, (num_alternatives - 1) as i64);
            self.encode_constrained_whole_number(index as i64, &constraint)
        } else {
            self.encode_normally_small_non_negative((index - num_alternatives) as u64)
        }
    }

    /// OCTET STRING (X.691 16)
    pub fn encode_octet_string(
        &mut self,
        data: &[u8],
        min_len: Option<usize>,
        max_len: Option<usize>,
    ) -> PerResult<()> {
        let len = data.len();
        match (min_len, max_len) {
            (Some(min), Some(max)) if min == max => {
                if len != min {
                    return Err(PerError::InvalidLength { length: len });
                }
                if min > 2 {
                    self.align();
                }
                self.write_bytes(data);
            }
            (Some(min), Some(max)) if max <= MAX_UNFRAGMENTED_LENGTH => {
                if len < min || len > max {
                    return Err(PerError::InvalidLength { length: len });
                }
                self.encode_constrained_length(len, min, max)?;
                self.align();
                self.write_bytes(data);
            }
            _ => self.encode_fragmented(data)?,
        }
        Ok(())
    }

    /// BIT STRING (X.691 15)
    pub fn encode_bit_string(
        &mut self,
        bits: &BitSlice<u8, Msb0>,
        min_len: Option<usize>,
        max_len: Option<usize>,
    ) -> PerResult<()> {
        let len = bits.len();
        match (min_len, max_len) {
            (Some(min), Some(max)) if min == max => {
                if len != min {
                    return Err(PerError::InvalidLength { length: len });
                }
                if min > 16 {
                    self.align();
                }
            }
            (Some(min), Some(max)) if max <= MAX_UNFRAGMENTED_LENGTH => {
                if len < min || len > max {
                    return Err(PerError::InvalidLength { length: len });
                }
                self.encode_constrained_length(len, min, max)?;
                self.align();
            }
            _ => self.encode_length_determinant(len)?,
        }
        self.buffer.extend_from_bitslice(bits);
        Ok(())
    }

    /// OBJECT IDENTIFIER, given its BER contents octets (X.691 24)
    pub fn encode_object_identifier(&mut self, contents: &[u8]) -> PerResult<()> {
        if contents.is_empty() {
            return Err(PerError::InvalidLength { length: 0 });
        }
        self.encode_length_determinant(contents.len())?;
        self.write_bytes(contents);
        Ok(())
    }

    /// Open type (X.691 11.2): an already complete encoding as octets
    ///
    /// An empty encoding is replaced by a single zero octet.
    pub fn encode_open_type(&mut self, encoding: &[u8]) -> PerResult<()> {
        if encoding.is_empty() {
            self.encode_fragmented(&[0x00])
        } else {
            self.encode_fragmented(encoding)
        }
    }
}

impl Default for AperEncoder {
    fn default() -> Self {
        Self::new()
    }
}

/// APER (Aligned PER) Decoder over a borrowed buffer
#[derive(Debug, Clone)]
pub struct AperDecoder<'a> {
    data: &'a [u8],
    bits: &'a BitSlice<u8, Msb0>,
    position: usize,
}

impl<'a> AperDecoder<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            bits: data.view_bits::<Msb0>(),
            position: 0,
        }
    }

    pub fn bit_position(&self) -> usize {
        self.position
    }

    pub fn remaining_bits(&self) -> usize {
        self.bits.len().saturating_sub(self.position)
    }

    /// True when less than one octet (padding) is left
    pub fn is_exhausted(&self) -> bool {
        self.remaining_bits() < 8
    }

    pub fn align(&mut self) {
        let remainder = self.position % 8;
        if remainder != 0 {
            self.position = (self.position + 8 - remainder).min(self.bits.len());
        }
    }

    fn ensure(&self, needed: usize) -> PerResult<()> {
        let available = self.remaining_bits();
        if needed > available {
            Err(PerError::BufferUnderflow { needed, available })
        } else {
            Ok(())
        }
    }

    pub fn read_bit(&mut self) -> PerResult<bool> {
        self.ensure(1)?;
        let bit = self.bits[self.position];
        self.position += 1;
        Ok(bit)
    }

    /// Read `num_bits` (at most 64) as an unsigned value, MSB first
    pub fn read_bits(&mut self, num_bits: usize) -> PerResult<u64> {
        if num_bits == 0 {
            return Ok(0);
        }
        if num_bits > 64 {
            return Err(PerError::InvalidLength { length: num_bits });
        }
        self.ensure(num_bits)?;
        let value = self.bits[self.position..self.position + num_bits].load_be::<u64>();
        self.position += num_bits;
        Ok(value)
    }

    /// Read `count` octets; borrowed from the input when octet-aligned
    pub fn read_octets(&mut self, count: usize) -> PerResult<Cow<'a, [u8]>> {
        self.ensure(count.saturating_mul(8))?;
        if self.position % 8 == 0 {
            let start = self.position / 8;
            self.position += count * 8;
            return Ok(Cow::Borrowed(&self.data[start..start + count]));
        }
        let mut owned = Vec::with_capacity(count);
        for _ in 0..count {
            owned.push(self.read_bits(8)? as u8);
        }
        Ok(Cow::Owned(owned))
    }

    pub fn read_bytes(&mut self, count: usize) -> PerResult<Vec<u8>> {
        self.read_octets(count).map(Cow::into_owned)
    }

    /// Constrained whole number (X.691 10.5), validated against the bound
    pub fn decode_constrained_whole_number(&mut self, constraint: &Constraint) -> PerResult<i64> {
        let range = constraint.range();
        let offset = match range {
            0 | 1 => 0,
            2..=255 => self.read_bits(constraint.bits_needed())?,
            256 => {
                self.align();
                self.read_bits(8)?
            }
            257..=65536 => {
                self.align();
                self.read_bits(16)?
            }
            _ => {
                let count = Constraint::new(1, constraint.octets_needed() as i64);
                let octets = self.decode_constrained_whole_number(&count)? as usize;
                self.align();
                self.read_bits(octets * 8)?
            }
        };

        let value = constraint.min as i128 + offset as i128;
        if value > constraint.max as i128 {
            return Err(PerError::ConstraintViolation {
                value: value.min(i64::MAX as i128) as i64,
                min: constraint.min,
                max: constraint.max,
            });
        }
        Ok(value as i64)
    }

    /// Unconstrained whole number (X.691 10.8)
    pub fn decode_unconstrained_whole_number(&mut self) -> PerResult<i64> {
        let len = self.decode_length_determinant()?;
        if len == 0 {
            return Err(PerError::InvalidLength { length: 0 });
        }
        if len > 8 {
            return Err(PerError::IntegerOverflow { octets: len });
        }
        let octets = self.read_octets(len)?;
        let negative = octets[0] & 0x80 != 0;
        let value = octets
            .iter()
            .fold(if negative { -1i64 } else { 0 }, |acc, b| (acc << 8) | *b as i64);
        Ok(value)
    }

    /// Length prefix: `(length, more_fragments_follow)`
    fn read_length_prefix(&mut self) -> PerResult<(usize, bool)> {
        self.align();
        let first = self.read_bits(8)? as u8;
        if first & 0x80 == 0 {
            Ok((first as usize, false))
        } else if first & 0x40 == 0 {
            let second = self.read_bits(8)? as usize;
            Ok(((((first & 0x3F) as usize) << 8) | second, false))
        } else {
            let multiplier = first & 0x3F;
            if !(1..=4).contains(&multiplier) {
                return Err(PerError::InvalidFragment { multiplier });
            }
            Ok((multiplier as usize * FRAGMENT_UNIT, true))
        }
    }

    /// Unconstrained length determinant; fragmented forms are rejected here
    pub fn decode_length_determinant(&mut self) -> PerResult<usize> {
        match self.read_length_prefix()? {
            (length, false) => Ok(length),
            (length, true) => Err(PerError::InvalidLength { length }),
        }
    }

    /// Length-prefixed octets, reassembling fragments when present
    pub fn decode_fragmented(&mut self) -> PerResult<Cow<'a, [u8]>> {
        let (length, mut more) = self.read_length_prefix()?;
        let first = self.read_octets(length)?;
        if !more {
            return Ok(first);
        }

        let mut assembled = first.into_owned();
        while more {
            let (length, next) = self.read_length_prefix()?;
            assembled.extend_from_slice(&self.read_octets(length)?);
            more = next;
        }
        Ok(Cow::Owned(assembled))
    }

    pub fn decode_constrained_length(&mut self, min: usize, max: usize) -> PerResult<usize> {
        let constraint = Constraint::new(min as i64, max as i64);
        self.decode_constrained_whole_number(&constraint)
            .map(|v| v as usize)
    }

    pub fn decode_normally_small_non_negative(&mut self) -> PerResult<u64> {
        if !self.read_bit()? {
            return self.read_bits(6);
        }
        let len = self.decode_length_determinant()?;
        if len == 0 || len > 8 {
            return Err(PerError::IntegerOverflow { octets: len });
        }
        self.read_bits(len * 8)
    }

    pub fn decode_normally_small_length(&mut self) -> PerResult<usize> {
        if !self.read_bit()? {
            return Ok(self.read_bits(6)? as usize + 1);
        }
        self.decode_length_determinant()
    }

    /// ENUMERATED root value; an extension value is an error
    pub fn decode_enumerated(&mut self, constraint: &Constraint) -> PerResult<i64> {
        match self.decode_enumerated_ext(constraint)? {
            (value, false) => Ok(value),
            (_, true) => Err(PerError::UnsupportedExtension),
        }
    }

    /// ENUMERATED value as `(value, extended)`
    pub fn decode_enumerated_ext(&mut self, constraint: &Constraint) -> PerResult<(i64, bool)> {
        let extended = constraint.extensible && self.read_bit()?;
        if extended {
            let index = self.decode_normally_small_non_negative()?;
            Ok((index as i64, true))
        } else {
            Ok((self.decode_constrained_whole_number(constraint)?, false))
        }
    }

    /// CHOICE index; extension choices are returned past `num_alternatives`
    pub fn decode_choice_index(
        &mut self,
        num_alternatives: usize,
        extensible: bool,
    ) -> PerResult<usize> {
        if num_alternatives == 0 {
            return Err(PerError::InvalidChoiceIndex { index: 0, max: 0 });
        }
        if extensible && self.read_bit()? {
            let ext_index = self.decode_normally_small_non_negative()?;
            return Ok(num_alternatives.saturating_add(ext_index as usize));
        }
        let constraint = Constraint::new(0, (num_alternatives - 1) as i64);
        self.decode_constrained_whole_number(&constraint)
            .map(|v| v as usize)
    }

    pub fn decode_octet_string(
        &mut self,
        min_len: Option<usize>,
        max_len: Option<usize>,
    ) -> PerResult<Vec<u8>> {
        match (min_len, max_len) {
            (Some(min), Some(max)) if min == max => {
                if min > 2 {
                    self.align();
                }
                self.read_bytes(min)
            }
            (Some(min), Some(max)) if max <= MAX_UNFRAGMENTED_LENGTH => {
                let len = self.decode_constrained_length(min, max)?;
                self.align();
                self.read_bytes(len)
            }
            _ => self.decode_fragmented().map(Cow::into_owned),
        }
    }

    pub fn decode_bit_string(
        &mut self,
        min_len: Option<usize>,
        max_len: Option<usize>,
    ) -> PerResult<BitVec<u8, Msb0>> {
        let len = match (min_len, max_len) {
            (Some(min), Some(max)) if min == max => {
                if min > 16 {
                    self.align();
                }
                min
            }
            (Some(min), Some(max)) if max <= MAX_UNFRAGMENTED_LENGTH => {
                let len = self.decode_constrained_length(min, max)?;
                self.align();
                len
            }
            _ => self.decode_length_determinant()?,
        };

        self.ensure(len)?;
        let bits = self.bits[self.position..self.position + len].to_bitvec();
        self.position += len;
        Ok(bits)
    }

    /// OBJECT IDENTIFIER contents octets
    pub fn decode_object_identifier(&mut self) -> PerResult<Vec<u8>> {
        let len = self.decode_length_determinant()?;
        if len == 0 {
            return Err(PerError::InvalidLength { length: 0 });
        }
        self.read_bytes(len)
    }

    /// Open type contents, still undecoded
    pub fn decode_open_type(&mut self) -> PerResult<Cow<'a, [u8]>> {
        self.decode_fragmented()
    }
}

/// Trait for types that can be encoded with APER
pub trait AperEncode {
    fn encode_aper(&self, encoder: &mut AperEncoder) -> PerResult<()>;
}

/// Trait for types that can be decoded with APER
pub trait AperDecode: Sized {
    fn decode_aper(decoder: &mut AperDecoder<'_>) -> PerResult<Self>;
}

/// Encode a value on its own and return the aligned octets
pub fn encode_to_bytes<T: AperEncode>(value: &T) -> PerResult<Bytes> {
    let mut encoder = AperEncoder::new();
    value.encode_aper(&mut encoder)?;
    encoder.align();
    Ok(encoder.into_bytes())
}
