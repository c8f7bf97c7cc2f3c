//! X2AP IE codecs (X2AP-IEs, 3GPP TS 36.423 9.3.5)
//!
//! Field codecs for the IEs of the bundled message subset. Each IE has a
//! typed form where one is useful and converts to and from [`IeValue`].

use bitvec::prelude::*;
use ogs_asn1c::per::{AperDecoder, AperEncoder, Constraint};

use crate::container::{
    decode_extensions, decode_single_container_list, encode_extensions,
    encode_single_container_list, skip_extension_additions, ContainerSpec,
};
use crate::context::{DecodeContext, EncodeContext};
use crate::diagnostics::{decode_criticality_diagnostics, encode_criticality_diagnostics};
use crate::error::{X2apError, X2apResult};
use crate::registry::{Namespace, RegistryBuilder, RegistryKey};
use crate::types::ProtocolIeId;
use crate::value::{IeValue, ProtocolExtensionContainer, ProtocolIeContainer, Sequence};

use super::codes::MAX_NOOF_BEARERS;

fn mismatch(codec: &'static str, value: &IeValue) -> X2apError {
    X2apError::ValueMismatch {
        codec,
        found: value.kind_name(),
    }
}

fn invalid(ie_name: &'static str, reason: impl Into<String>) -> X2apError {
    X2apError::InvalidIeValue {
        ie_name,
        reason: reason.into(),
    }
}

// ============================================================================
// UE-X2AP-ID
// ============================================================================

/// UE-X2AP-ID ::= INTEGER (0..4095)
pub const UE_X2AP_ID: Constraint = Constraint::new(0, 4095);

pub fn decode_ue_x2ap_id(decoder: &mut AperDecoder<'_>, _: &mut DecodeContext<'_>) -> X2apResult<IeValue> {
    Ok(IeValue::Integer(
        decoder.decode_constrained_whole_number(&UE_X2AP_ID)?,
    ))
}

pub fn encode_ue_x2ap_id(value: &IeValue, encoder: &mut AperEncoder, _: &EncodeContext<'_>) -> X2apResult<()> {
    let id = value
        .as_integer()
        .ok_or_else(|| mismatch("UE-X2AP-ID", value))?;
    Ok(encoder.encode_constrained_whole_number(id, &UE_X2AP_ID)?)
}

// ============================================================================
// Cause
// ============================================================================

/// Alternative of the Cause CHOICE
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CauseGroup {
    RadioNetwork,
    Transport,
    Protocol,
    Misc,
}

impl CauseGroup {
    pub const NUM_ALTERNATIVES: usize = 4;

    pub fn index(self) -> usize {
        match self {
            CauseGroup::RadioNetwork => 0,
            CauseGroup::Transport => 1,
            CauseGroup::Protocol => 2,
            CauseGroup::Misc => 3,
        }
    }

    pub fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(CauseGroup::RadioNetwork),
            1 => Some(CauseGroup::Transport),
            2 => Some(CauseGroup::Protocol),
            3 => Some(CauseGroup::Misc),
            _ => None,
        }
    }

    /// Root values of the group's ENUMERATED
    pub fn constraint(self) -> Constraint {
        match self {
            CauseGroup::RadioNetwork => Constraint::extensible(0, 21),
            CauseGroup::Transport => Constraint::extensible(0, 1),
            CauseGroup::Protocol => Constraint::extensible(0, 6),
            CauseGroup::Misc => Constraint::extensible(0, 4),
        }
    }
}

/// Cause ::= CHOICE { radioNetwork, transport, protocol, misc, ... }
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Cause {
    pub group: CauseGroup,
    pub value: i64,
    /// `value` indexes the group's extension additions
    pub extended: bool,
}

impl Cause {
    pub const UNKNOWN_NEW_ENB_UE_X2AP_ID: Cause = Cause::radio_network(5);
    pub const UNKNOWN_OLD_ENB_UE_X2AP_ID: Cause = Cause::radio_network(6);
    pub const RADIO_NETWORK_UNSPECIFIED: Cause = Cause::radio_network(21);
    pub const TRANSFER_SYNTAX_ERROR: Cause = Cause::protocol(0);
    pub const ABSTRACT_SYNTAX_ERROR_REJECT: Cause = Cause::protocol(1);
    pub const ABSTRACT_SYNTAX_ERROR_IGNORE_AND_NOTIFY: Cause = Cause::protocol(2);
    pub const MISC_UNSPECIFIED: Cause = Cause::misc(4);

    pub const fn new(group: CauseGroup, value: i64) -> Self {
        Self {
            group,
            value,
            extended: false,
        }
    }

    pub const fn radio_network(value: i64) -> Self {
        Self::new(CauseGroup::RadioNetwork, value)
    }

    pub const fn transport(value: i64) -> Self {
        Self::new(CauseGroup::Transport, value)
    }

    pub const fn protocol(value: i64) -> Self {
        Self::new(CauseGroup::Protocol, value)
    }

    pub const fn misc(value: i64) -> Self {
        Self::new(CauseGroup::Misc, value)
    }

    pub fn decode(decoder: &mut AperDecoder<'_>) -> X2apResult<Self> {
        let index = decoder.decode_choice_index(CauseGroup::NUM_ALTERNATIVES, true)?;
        let group = CauseGroup::from_index(index)
            .ok_or_else(|| invalid("Cause", format!("unknown alternative {index}")))?;
        let (value, extended) = decoder.decode_enumerated_ext(&group.constraint())?;
        Ok(Self {
            group,
            value,
            extended,
        })
    }

    pub fn encode(&self, encoder: &mut AperEncoder) -> X2apResult<()> {
        encoder.encode_choice_index(self.group.index(), CauseGroup::NUM_ALTERNATIVES, true)?;
        encoder.encode_enumerated_ext(self.value, self.extended, &self.group.constraint())?;
        Ok(())
    }
}

impl From<Cause> for IeValue {
    fn from(cause: Cause) -> Self {
        IeValue::Choice {
            index: cause.group.index(),
            value: Box::new(IeValue::Enumerated {
                value: cause.value,
                extended: cause.extended,
            }),
        }
    }
}

impl TryFrom<&IeValue> for Cause {
    type Error = X2apError;

    fn try_from(value: &IeValue) -> Result<Self, Self::Error> {
        match value {
            IeValue::Choice { index, value: inner } => {
                let group = CauseGroup::from_index(*index)
                    .ok_or_else(|| invalid("Cause", format!("unknown alternative {index}")))?;
                match inner.as_ref() {
                    IeValue::Enumerated { value, extended } => Ok(Cause {
                        group,
                        value: *value,
                        extended: *extended,
                    }),
                    other => Err(mismatch("Cause", other)),
                }
            }
            other => Err(mismatch("Cause", other)),
        }
    }
}

pub fn decode_cause(decoder: &mut AperDecoder<'_>, _: &mut DecodeContext<'_>) -> X2apResult<IeValue> {
    Ok(Cause::decode(decoder)?.into())
}

pub fn encode_cause(value: &IeValue, encoder: &mut AperEncoder, _: &EncodeContext<'_>) -> X2apResult<()> {
    Cause::try_from(value)?.encode(encoder)
}

// ============================================================================
// TimeToWait
// ============================================================================

/// TimeToWait ::= ENUMERATED { v1s, v2s, v5s, v10s, v20s, v60s, ... }
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum TimeToWait {
    V1s = 0,
    V2s = 1,
    V5s = 2,
    V10s = 3,
    V20s = 4,
    V60s = 5,
}

impl TimeToWait {
    pub const CONSTRAINT: Constraint = Constraint::extensible(0, 5);

    pub fn seconds(self) -> u32 {
        match self {
            TimeToWait::V1s => 1,
            TimeToWait::V2s => 2,
            TimeToWait::V5s => 5,
            TimeToWait::V10s => 10,
            TimeToWait::V20s => 20,
            TimeToWait::V60s => 60,
        }
    }
}

impl From<TimeToWait> for IeValue {
    fn from(time: TimeToWait) -> Self {
        IeValue::Enumerated {
            value: time as i64,
            extended: false,
        }
    }
}

pub fn decode_time_to_wait(decoder: &mut AperDecoder<'_>, _: &mut DecodeContext<'_>) -> X2apResult<IeValue> {
    let (value, extended) = decoder.decode_enumerated_ext(&TimeToWait::CONSTRAINT)?;
    Ok(IeValue::Enumerated { value, extended })
}

pub fn encode_time_to_wait(value: &IeValue, encoder: &mut AperEncoder, _: &EncodeContext<'_>) -> X2apResult<()> {
    match value {
        IeValue::Enumerated { value, extended } => {
            Ok(encoder.encode_enumerated_ext(*value, *extended, &TimeToWait::CONSTRAINT)?)
        }
        other => Err(mismatch("TimeToWait", other)),
    }
}

// ============================================================================
// TargeteNBtoSource-eNBTransparentContainer
// ============================================================================

/// TargeteNBtoSource-eNBTransparentContainer ::= OCTET STRING
pub fn decode_transparent_container(
    decoder: &mut AperDecoder<'_>,
    _: &mut DecodeContext<'_>,
) -> X2apResult<IeValue> {
    Ok(IeValue::OctetString(decoder.decode_octet_string(None, None)?))
}

pub fn encode_transparent_container(
    value: &IeValue,
    encoder: &mut AperEncoder,
    _: &EncodeContext<'_>,
) -> X2apResult<()> {
    match value {
        IeValue::OctetString(data) => Ok(encoder.encode_octet_string(data, None, None)?),
        other => Err(mismatch("TargeteNBtoSource-eNBTransparentContainer", other)),
    }
}

// ============================================================================
// GlobalENB-ID
// ============================================================================

/// ENB-ID ::= CHOICE {
///     macro-eNB-ID BIT STRING (SIZE (20)), home-eNB-ID BIT STRING (SIZE (28)), ...,
///     short-Macro-eNB-ID BIT STRING (SIZE (18)), long-Macro-eNB-ID BIT STRING (SIZE (21))
/// }
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnbId {
    Macro(BitVec<u8, Msb0>),
    Home(BitVec<u8, Msb0>),
    ShortMacro(BitVec<u8, Msb0>),
    LongMacro(BitVec<u8, Msb0>),
}

impl EnbId {
    pub const ROOT_ALTERNATIVES: usize = 2;
    const SIZES: [usize; 4] = [20, 28, 18, 21];

    /// Macro eNB id from the 20 low bits of `id`
    pub fn macro_id(id: u32) -> Self {
        let mut bits = BitVec::<u8, Msb0>::repeat(false, 20);
        bits.store_be(id & 0xF_FFFF);
        EnbId::Macro(bits)
    }

    pub fn index(&self) -> usize {
        match self {
            EnbId::Macro(_) => 0,
            EnbId::Home(_) => 1,
            EnbId::ShortMacro(_) => 2,
            EnbId::LongMacro(_) => 3,
        }
    }

    pub fn bits(&self) -> &BitSlice<u8, Msb0> {
        match self {
            EnbId::Macro(bits) | EnbId::Home(bits) | EnbId::ShortMacro(bits) | EnbId::LongMacro(bits) => {
                bits.as_bitslice()
            }
        }
    }

    fn from_index(index: usize, bits: BitVec<u8, Msb0>) -> Option<Self> {
        match index {
            0 => Some(EnbId::Macro(bits)),
            1 => Some(EnbId::Home(bits)),
            2 => Some(EnbId::ShortMacro(bits)),
            3 => Some(EnbId::LongMacro(bits)),
            _ => None,
        }
    }

    pub fn decode(decoder: &mut AperDecoder<'_>) -> X2apResult<Self> {
        let index = decoder.decode_choice_index(Self::ROOT_ALTERNATIVES, true)?;
        let size = Self::SIZES.get(index).copied();
        let bits = match size {
            Some(size) if index < Self::ROOT_ALTERNATIVES => {
                decoder.decode_bit_string(Some(size), Some(size))?
            }
            Some(size) => {
                let span = decoder.decode_open_type()?;
                AperDecoder::new(&span).decode_bit_string(Some(size), Some(size))?
            }
            None => {
                decoder.decode_open_type()?;
                return Err(invalid("ENB-ID", format!("unknown alternative {index}")));
            }
        };
        Self::from_index(index, bits)
            .ok_or_else(|| invalid("ENB-ID", format!("unknown alternative {index}")))
    }

    pub fn encode(&self, encoder: &mut AperEncoder) -> X2apResult<()> {
        let index = self.index();
        let size = Self::SIZES[index];
        encoder.encode_choice_index(index, Self::ROOT_ALTERNATIVES, true)?;
        if index < Self::ROOT_ALTERNATIVES {
            encoder.encode_bit_string(self.bits(), Some(size), Some(size))?;
        } else {
            let mut extension = AperEncoder::new();
            extension.encode_bit_string(self.bits(), Some(size), Some(size))?;
            encoder.encode_open_type(&extension.into_bytes())?;
        }
        Ok(())
    }
}

/// GlobalENB-ID ::= SEQUENCE {
///     pLMN-Identity PLMN-Identity, eNB-ID ENB-ID,
///     iE-Extensions ProtocolExtensionContainer { {GlobalENB-ID-ExtIEs} } OPTIONAL, ...
/// }
#[derive(Debug, Clone, PartialEq)]
pub struct GlobalEnbId {
    pub plmn_identity: [u8; 3],
    pub enb_id: EnbId,
    pub extensions: Option<ProtocolExtensionContainer>,
}

impl GlobalEnbId {
    pub fn decode(decoder: &mut AperDecoder<'_>, ctx: &mut DecodeContext<'_>) -> X2apResult<Self> {
        let extended = decoder.read_bit()?;
        let has_extensions = decoder.read_bit()?;
        let plmn = decoder.decode_octet_string(Some(3), Some(3))?;
        let plmn_identity = [plmn[0], plmn[1], plmn[2]];
        let enb_id = EnbId::decode(decoder)?;
        let extensions = if has_extensions {
            decode_extensions(decoder, ctx)?
        } else {
            None
        };
        if extended {
            skip_extension_additions(decoder)?;
        }
        Ok(Self {
            plmn_identity,
            enb_id,
            extensions,
        })
    }

    pub fn encode(&self, encoder: &mut AperEncoder, ctx: &EncodeContext<'_>) -> X2apResult<()> {
        encoder.write_bit(false);
        encoder.write_bit(self.extensions.is_some());
        encoder.encode_octet_string(&self.plmn_identity, Some(3), Some(3))?;
        self.enb_id.encode(encoder)?;
        if let Some(extensions) = &self.extensions {
            encode_extensions(encoder, extensions, ctx)?;
        }
        Ok(())
    }
}

impl From<GlobalEnbId> for IeValue {
    fn from(id: GlobalEnbId) -> Self {
        let index = id.enb_id.index();
        let enb_id = IeValue::Choice {
            index,
            value: Box::new(IeValue::BitString(id.enb_id.bits().to_bitvec())),
        };
        IeValue::Sequence(Sequence {
            components: vec![
                Some(IeValue::OctetString(id.plmn_identity.to_vec())),
                Some(enb_id),
            ],
            extensions: id.extensions,
        })
    }
}

impl TryFrom<&IeValue> for GlobalEnbId {
    type Error = X2apError;

    fn try_from(value: &IeValue) -> Result<Self, Self::Error> {
        let IeValue::Sequence(sequence) = value else {
            return Err(mismatch("GlobalENB-ID", value));
        };
        let plmn_identity = match sequence.component(0) {
            Some(IeValue::OctetString(plmn)) => <[u8; 3]>::try_from(plmn.as_slice())
                .map_err(|_| invalid("GlobalENB-ID", format!("PLMN of {} octets", plmn.len())))?,
            _ => return Err(invalid("GlobalENB-ID", "missing pLMN-Identity")),
        };
        let enb_id = match sequence.component(1) {
            Some(IeValue::Choice { index, value }) => match value.as_ref() {
                IeValue::BitString(bits) => EnbId::from_index(*index, bits.clone())
                    .ok_or_else(|| invalid("ENB-ID", format!("unknown alternative {index}")))?,
                other => return Err(mismatch("ENB-ID", other)),
            },
            _ => return Err(invalid("GlobalENB-ID", "missing eNB-ID")),
        };
        Ok(Self {
            plmn_identity,
            enb_id,
            extensions: sequence.extensions.clone(),
        })
    }
}

pub fn decode_global_enb_id(decoder: &mut AperDecoder<'_>, ctx: &mut DecodeContext<'_>) -> X2apResult<IeValue> {
    Ok(GlobalEnbId::decode(decoder, ctx)?.into())
}

pub fn encode_global_enb_id(value: &IeValue, encoder: &mut AperEncoder, ctx: &EncodeContext<'_>) -> X2apResult<()> {
    GlobalEnbId::try_from(value)?.encode(encoder, ctx)
}

// ============================================================================
// E-RAB-Item, E-RABs-NotAdmitted-List
// ============================================================================

/// E-RAB-ID ::= INTEGER (0..15, ...)
pub const E_RAB_ID: Constraint = Constraint::extensible(0, 15);

/// E-RAB-Item ::= SEQUENCE {
///     e-RAB-ID E-RAB-ID, cause Cause,
///     iE-Extensions ProtocolExtensionContainer { {E-RAB-Item-ExtIEs} } OPTIONAL, ...
/// }
#[derive(Debug, Clone, PartialEq)]
pub struct ERabItem {
    pub e_rab_id: i64,
    pub cause: Cause,
    pub extensions: Option<ProtocolExtensionContainer>,
}

impl ERabItem {
    pub fn new(e_rab_id: i64, cause: Cause) -> Self {
        Self {
            e_rab_id,
            cause,
            extensions: None,
        }
    }

    pub fn decode(decoder: &mut AperDecoder<'_>, ctx: &mut DecodeContext<'_>) -> X2apResult<Self> {
        let extended = decoder.read_bit()?;
        let has_extensions = decoder.read_bit()?;
        let e_rab_id = if decoder.read_bit()? {
            decoder.decode_unconstrained_whole_number()?
        } else {
            decoder.decode_constrained_whole_number(&E_RAB_ID)?
        };
        let cause = Cause::decode(decoder)?;
        let extensions = if has_extensions {
            decode_extensions(decoder, ctx)?
        } else {
            None
        };
        if extended {
            skip_extension_additions(decoder)?;
        }
        Ok(Self {
            e_rab_id,
            cause,
            extensions,
        })
    }

    pub fn encode(&self, encoder: &mut AperEncoder, ctx: &EncodeContext<'_>) -> X2apResult<()> {
        encoder.write_bit(false);
        encoder.write_bit(self.extensions.is_some());
        if E_RAB_ID.contains(self.e_rab_id) {
            encoder.write_bit(false);
            encoder.encode_constrained_whole_number(self.e_rab_id, &E_RAB_ID)?;
        } else {
            encoder.write_bit(true);
            encoder.encode_unconstrained_whole_number(self.e_rab_id)?;
        }
        self.cause.encode(encoder)?;
        if let Some(extensions) = &self.extensions {
            encode_extensions(encoder, extensions, ctx)?;
        }
        Ok(())
    }
}

impl From<ERabItem> for IeValue {
    fn from(item: ERabItem) -> Self {
        IeValue::Sequence(Sequence {
            components: vec![Some(IeValue::Integer(item.e_rab_id)), Some(item.cause.into())],
            extensions: item.extensions,
        })
    }
}

impl TryFrom<&IeValue> for ERabItem {
    type Error = X2apError;

    fn try_from(value: &IeValue) -> Result<Self, Self::Error> {
        let IeValue::Sequence(sequence) = value else {
            return Err(mismatch("E-RAB-Item", value));
        };
        let e_rab_id = sequence
            .component(0)
            .and_then(IeValue::as_integer)
            .ok_or_else(|| invalid("E-RAB-Item", "missing e-RAB-ID"))?;
        let cause = sequence
            .component(1)
            .ok_or_else(|| invalid("E-RAB-Item", "missing cause"))
            .and_then(Cause::try_from)?;
        Ok(Self {
            e_rab_id,
            cause,
            extensions: sequence.extensions.clone(),
        })
    }
}

pub fn decode_e_rab_item(decoder: &mut AperDecoder<'_>, ctx: &mut DecodeContext<'_>) -> X2apResult<IeValue> {
    Ok(ERabItem::decode(decoder, ctx)?.into())
}

pub fn encode_e_rab_item(value: &IeValue, encoder: &mut AperEncoder, ctx: &EncodeContext<'_>) -> X2apResult<()> {
    ERabItem::try_from(value)?.encode(encoder, ctx)
}

/// E-RABs-NotAdmitted-List ::= SEQUENCE (SIZE (1..maxnoofBearers)) OF
///     ProtocolIE-Single-Container { {E-RAB-ItemIEs} }
pub const E_RABS_NOT_ADMITTED_LIST: ContainerSpec =
    ContainerSpec::new("E-RABs-NotAdmitted-List", Namespace::Ie, 1, MAX_NOOF_BEARERS);

pub fn decode_e_rabs_not_admitted_list(
    decoder: &mut AperDecoder<'_>,
    ctx: &mut DecodeContext<'_>,
) -> X2apResult<IeValue> {
    let ies = decode_single_container_list(decoder, &E_RABS_NOT_ADMITTED_LIST, ctx)?;
    if ies.is_empty() {
        return Err(invalid("E-RABs-NotAdmitted-List", "every item was dropped"));
    }
    Ok(IeValue::Container(ProtocolIeContainer { ies }))
}

pub fn encode_e_rabs_not_admitted_list(
    value: &IeValue,
    encoder: &mut AperEncoder,
    ctx: &EncodeContext<'_>,
) -> X2apResult<()> {
    let list = value
        .as_container()
        .ok_or_else(|| mismatch("E-RABs-NotAdmitted-List", value))?;
    encode_single_container_list(encoder, &list.ies, &E_RABS_NOT_ADMITTED_LIST, ctx)
}

/// Registers the protocol-wide IE codecs
pub fn register_ies(builder: &mut RegistryBuilder) -> X2apResult<()> {
    for id in [ProtocolIeId::OLD_ENB_UE_X2AP_ID, ProtocolIeId::NEW_ENB_UE_X2AP_ID] {
        builder.register(RegistryKey::ie(id), "UE-X2AP-ID", decode_ue_x2ap_id, encode_ue_x2ap_id)?;
    }
    builder.register(RegistryKey::ie(ProtocolIeId::CAUSE), "Cause", decode_cause, encode_cause)?;
    builder.register(
        RegistryKey::ie(ProtocolIeId::TIME_TO_WAIT),
        "TimeToWait",
        decode_time_to_wait,
        encode_time_to_wait,
    )?;
    builder.register(
        RegistryKey::ie(ProtocolIeId::CRITICALITY_DIAGNOSTICS),
        "CriticalityDiagnostics",
        decode_criticality_diagnostics,
        encode_criticality_diagnostics,
    )?;
    builder.register(
        RegistryKey::ie(ProtocolIeId::TARGET_ENB_TO_SOURCE_ENB_TRANSPARENT_CONTAINER),
        "TargeteNBtoSource-eNBTransparentContainer",
        decode_transparent_container,
        encode_transparent_container,
    )?;
    builder.register(
        RegistryKey::ie(ProtocolIeId::GLOBAL_ENB_ID),
        "GlobalENB-ID",
        decode_global_enb_id,
        encode_global_enb_id,
    )?;
    builder.register(
        RegistryKey::ie(ProtocolIeId::E_RAB_ITEM),
        "E-RAB-Item",
        decode_e_rab_item,
        encode_e_rab_item,
    )?;
    builder.register(
        RegistryKey::ie(ProtocolIeId::E_RABS_NOT_ADMITTED_LIST),
        "E-RABs-NotAdmitted-List",
        decode_e_rabs_not_admitted_list,
        encode_e_rabs_not_admitted_list,
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CodecConfig;
    use crate::registry::Registry;

    fn roundtrip<T, E, D>(value: &T, encode: E, decode: D) -> T
    where
        E: Fn(&T, &mut AperEncoder, &EncodeContext<'_>) -> X2apResult<()>,
        D: Fn(&mut AperDecoder<'_>, &mut DecodeContext<'_>) -> X2apResult<T>,
    {
        let mut builder = Registry::builder();
        register_ies(&mut builder).unwrap();
        let registry = builder.build();
        let config = CodecConfig::default();

        let mut encoder = AperEncoder::new();
        encode(value, &mut encoder, &EncodeContext::new(&registry, &config)).unwrap();
        let bytes = encoder.into_bytes();
        let mut ctx = DecodeContext::new(&registry, &config);
        decode(&mut AperDecoder::new(&bytes), &mut ctx).unwrap()
    }

    #[test]
    fn test_ue_x2ap_id_bounds() {
        let registry = Registry::builder().build();
        let config = CodecConfig::default();
        let ctx = EncodeContext::new(&registry, &config);
        let mut encoder = AperEncoder::new();
        encode_ue_x2ap_id(&IeValue::Integer(4095), &mut encoder, &ctx).unwrap();
        assert_eq!(encoder.into_bytes().as_ref(), &[0x0F, 0xFF]);

        let mut encoder = AperEncoder::new();
        assert!(matches!(
            encode_ue_x2ap_id(&IeValue::Integer(4096), &mut encoder, &ctx),
            Err(X2apError::Asn1(_))
        ));
        assert!(matches!(
            encode_ue_x2ap_id(&IeValue::Null, &mut encoder, &ctx),
            Err(X2apError::ValueMismatch { .. })
        ));
    }

    #[test]
    fn test_cause_encoding() {
        // radioNetwork (0 00), unknown-old-eNB-UE-X2AP-ID (0 00110)
        let mut encoder = AperEncoder::new();
        Cause::UNKNOWN_OLD_ENB_UE_X2AP_ID.encode(&mut encoder).unwrap();
        assert_eq!(encoder.into_bytes().as_ref(), &[0x03, 0x00]);

        // misc (0 11), unspecified (0 100)
        let mut encoder = AperEncoder::new();
        Cause::MISC_UNSPECIFIED.encode(&mut encoder).unwrap();
        assert_eq!(encoder.into_bytes().as_ref(), &[0x68]);

        let value = IeValue::from(Cause::transport(1));
        let decoded = roundtrip(&value, encode_cause, decode_cause);
        assert_eq!(Cause::try_from(&decoded).unwrap(), Cause::transport(1));
    }

    #[test]
    fn test_cause_out_of_root_rejected() {
        let mut encoder = AperEncoder::new();
        assert!(Cause::transport(2).encode(&mut encoder).is_err());

        let extended = Cause {
            extended: true,
            ..Cause::protocol(3)
        };
        let mut encoder = AperEncoder::new();
        extended.encode(&mut encoder).unwrap();
        let bytes = encoder.into_bytes();
        assert_eq!(Cause::decode(&mut AperDecoder::new(&bytes)).unwrap(), extended);
    }

    #[test]
    fn test_time_to_wait() {
        let value = IeValue::from(TimeToWait::V10s);
        assert_eq!(roundtrip(&value, encode_time_to_wait, decode_time_to_wait), value);
        assert_eq!(TimeToWait::V60s.seconds(), 60);
    }

    #[test]
    fn test_transparent_container() {
        let value = IeValue::OctetString((0..=255u8).cycle().take(600).collect());
        assert_eq!(
            roundtrip(&value, encode_transparent_container, decode_transparent_container),
            value
        );
    }

    #[test]
    fn test_global_enb_id() {
        let id = GlobalEnbId {
            plmn_identity: [0x00, 0xF1, 0x10],
            enb_id: EnbId::macro_id(0x1_2345),
            extensions: None,
        };
        let decoded = roundtrip(&IeValue::from(id.clone()), encode_global_enb_id, decode_global_enb_id);
        assert_eq!(GlobalEnbId::try_from(&decoded).unwrap(), id);

        let mut bits = BitVec::<u8, Msb0>::repeat(false, 21);
        bits.set(0, true);
        let long = GlobalEnbId {
            enb_id: EnbId::LongMacro(bits),
            ..id
        };
        let decoded = roundtrip(&IeValue::from(long.clone()), encode_global_enb_id, decode_global_enb_id);
        assert_eq!(GlobalEnbId::try_from(&decoded).unwrap(), long);
    }

    #[test]
    fn test_global_enb_id_with_unknown_extension() {
        // GlobalENB-ID-ExtIEs is empty, so every extension is unresolved
        let extensions = ProtocolExtensionContainer::new().with(
            ProtocolIeId(500),
            crate::types::Criticality::Ignore,
            IeValue::Opaque(vec![0x42]),
        );
        let id = GlobalEnbId {
            plmn_identity: [0x21, 0xF3, 0x54],
            enb_id: EnbId::macro_id(7),
            extensions: Some(extensions),
        };
        let decoded = roundtrip(&IeValue::from(id.clone()), encode_global_enb_id, decode_global_enb_id);
        let decoded = GlobalEnbId::try_from(&decoded).unwrap();
        assert_eq!(decoded.enb_id, id.enb_id);
        assert_eq!(decoded.extensions, None);
    }

    #[test]
    fn test_e_rabs_not_admitted_list() {
        let list = IeValue::Container(
            ProtocolIeContainer::new()
                .with(
                    ProtocolIeId::E_RAB_ITEM,
                    crate::types::Criticality::Ignore,
                    ERabItem::new(5, Cause::RADIO_NETWORK_UNSPECIFIED).into(),
                )
                .with(
                    ProtocolIeId::E_RAB_ITEM,
                    crate::types::Criticality::Ignore,
                    ERabItem::new(20, Cause::transport(0)).into(),
                ),
        );
        let decoded = roundtrip(&list, encode_e_rabs_not_admitted_list, decode_e_rabs_not_admitted_list);
        assert_eq!(decoded, list);

        let items: Vec<_> = decoded
            .as_container()
            .unwrap()
            .iter()
            .map(|ie| ERabItem::try_from(&ie.value).unwrap().e_rab_id)
            .collect();
        assert_eq!(items, vec![5, 20]);
    }

    #[test]
    fn test_e_rabs_not_admitted_list_with_no_usable_item() {
        let mut builder = Registry::builder();
        register_ies(&mut builder).unwrap();
        let registry = builder.build();
        let config = CodecConfig::default();

        let list = IeValue::Container(ProtocolIeContainer::new().with(
            ProtocolIeId(999),
            crate::types::Criticality::Ignore,
            IeValue::Opaque(vec![0x42]),
        ));
        let mut encoder = AperEncoder::new();
        encode_e_rabs_not_admitted_list(&list, &mut encoder, &EncodeContext::new(&registry, &config))
            .unwrap();
        let bytes = encoder.into_bytes();

        let mut ctx = DecodeContext::new(&registry, &config);
        let result = decode_e_rabs_not_admitted_list(&mut AperDecoder::new(&bytes), &mut ctx);
        assert!(matches!(result, Err(X2apError::InvalidIeValue { .. })));
        assert!(ctx.diagnostics().is_empty());
    }
}
