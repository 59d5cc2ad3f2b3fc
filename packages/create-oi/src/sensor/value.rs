use super::types::{
    BumpsAndWheelDrops, Buttons, ChargingSources, ChargingState, LightBumper, OiMode, Stasis,
    WheelOvercurrents,
};
use crate::{
    decode::DecodeError,
    word::{decode_byte, decode_signed_byte, decode_signed_word, decode_unsigned_word},
};

/// How the raw bytes of a sensor packet are interpreted.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum ValueKind {
    Bumps,
    Overcurrents,
    Buttons,
    ChargingSources,
    LightBumper,
    Stasis,
    /// Bit 0 of a single byte.
    Bit,
    Byte,
    SignedByte,
    Word,
    SignedWord,
    /// Unsigned word divided by `divisor`.
    ScaledWord { divisor: u16 },
    /// Signed word divided by `divisor`.
    ScaledSignedWord { divisor: u16 },
    ChargingState,
    OiMode,
}

impl ValueKind {
    /// Number of bytes this kind occupies on the wire.
    pub const fn size(self) -> usize {
        match self {
            Self::Word
            | Self::SignedWord
            | Self::ScaledWord { .. }
            | Self::ScaledSignedWord { .. } => 2,
            _ => 1,
        }
    }

    /// Decodes a value of this kind from `buf` at `offset`.
    ///
    /// # Errors
    ///
    /// Returns a [`DecodeError`] if fewer than [`ValueKind::size`] bytes are
    /// available at `offset`.
    pub fn decode(self, buf: &[u8], offset: usize) -> Result<SensorValue, DecodeError> {
        let byte = || decode_byte(buf, offset);

        Ok(match self {
            Self::Bumps => SensorValue::Bumps(BumpsAndWheelDrops::from_bits_truncate(byte()?)),
            Self::Overcurrents => {
                SensorValue::Overcurrents(WheelOvercurrents::from_bits_truncate(byte()?))
            }
            Self::Buttons => SensorValue::Buttons(Buttons::from_bits_truncate(byte()?)),
            Self::ChargingSources => {
                SensorValue::ChargingSources(ChargingSources::from_bits_truncate(byte()?))
            }
            Self::LightBumper => SensorValue::LightBumper(LightBumper::from_bits_truncate(byte()?)),
            Self::Stasis => SensorValue::Stasis(Stasis::from_bits_truncate(byte()?)),
            Self::Bit => SensorValue::Bool(byte()? & 1 != 0),
            Self::Byte => SensorValue::Byte(byte()?),
            Self::SignedByte => SensorValue::SignedByte(decode_signed_byte(buf, offset)?),
            Self::Word => SensorValue::Word(decode_unsigned_word(buf, offset)?),
            Self::SignedWord => SensorValue::SignedWord(decode_signed_word(buf, offset)?),
            Self::ScaledWord { divisor } => SensorValue::Scaled(
                f32::from(decode_unsigned_word(buf, offset)?) / f32::from(divisor),
            ),
            Self::ScaledSignedWord { divisor } => SensorValue::Scaled(
                f32::from(decode_signed_word(buf, offset)?) / f32::from(divisor),
            ),
            Self::ChargingState => SensorValue::ChargingState(ChargingState::from_raw(byte()?)),
            Self::OiMode => SensorValue::OiMode(OiMode::from_raw(byte()?)),
        })
    }
}

/// A decoded sensor reading.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SensorValue {
    Bumps(BumpsAndWheelDrops),
    Overcurrents(WheelOvercurrents),
    Buttons(Buttons),
    ChargingSources(ChargingSources),
    LightBumper(LightBumper),
    Stasis(Stasis),
    Bool(bool),
    Byte(u8),
    SignedByte(i8),
    Word(u16),
    SignedWord(i16),
    Scaled(f32),
    ChargingState(ChargingState),
    OiMode(OiMode),
}

impl SensorValue {
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns integral readings widened to `i32`.
    pub const fn as_i32(&self) -> Option<i32> {
        match self {
            Self::Byte(v) => Some(*v as i32),
            Self::SignedByte(v) => Some(*v as i32),
            Self::Word(v) => Some(*v as i32),
            Self::SignedWord(v) => Some(*v as i32),
            _ => None,
        }
    }

    pub const fn as_f32(&self) -> Option<f32> {
        match self {
            Self::Scaled(v) => Some(*v),
            _ => None,
        }
    }
}

impl core::fmt::Display for SensorValue {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Bumps(v) => write!(f, "{v:?}"),
            Self::Overcurrents(v) => write!(f, "{v:?}"),
            Self::Buttons(v) => write!(f, "{v:?}"),
            Self::ChargingSources(v) => write!(f, "{v:?}"),
            Self::LightBumper(v) => write!(f, "{v:?}"),
            Self::Stasis(v) => write!(f, "{v:?}"),
            Self::Bool(v) => write!(f, "{v}"),
            Self::Byte(v) => write!(f, "{v}"),
            Self::SignedByte(v) => write!(f, "{v}"),
            Self::Word(v) => write!(f, "{v}"),
            Self::SignedWord(v) => write!(f, "{v}"),
            Self::Scaled(v) => write!(f, "{v:.3}"),
            Self::ChargingState(v) => f.write_str(v.label()),
            Self::OiMode(v) => write!(f, "{v:?}"),
        }
    }
}
