//! 16-bit word codec.
//!
//! Every multi-byte quantity on the Open Interface is a big-endian 16-bit
//! word, high byte first. Signed words are two's complement.

use crate::{
    decode::{window, Decode, DecodeError},
    encode::EncodeError,
};

fn decode_at<T: Decode>(buf: &[u8], offset: usize) -> Result<T, DecodeError> {
    let mut data = window::<T>(buf, offset, core::mem::size_of::<T>())?;
    T::decode(&mut data)
}

/// Encodes `value` as a big-endian two's-complement word.
///
/// # Errors
///
/// Returns [`EncodeError::WordOutOfRange`] if `value` is outside
/// `-32768..=32767`.
pub fn encode_signed_word(value: i32) -> Result<[u8; 2], EncodeError> {
    i16::try_from(value)
        .map(i16::to_be_bytes)
        .map_err(|_| EncodeError::WordOutOfRange(value))
}

/// Encodes `value` as a big-endian unsigned word.
pub const fn encode_unsigned_word(value: u16) -> [u8; 2] {
    value.to_be_bytes()
}

/// Reads a big-endian signed word at `buf[offset..offset + 2]`.
pub fn decode_signed_word(buf: &[u8], offset: usize) -> Result<i16, DecodeError> {
    decode_at(buf, offset)
}

/// Reads a big-endian unsigned word at `buf[offset..offset + 2]`.
pub fn decode_unsigned_word(buf: &[u8], offset: usize) -> Result<u16, DecodeError> {
    decode_at(buf, offset)
}

/// Reads `buf[offset]` as a two's-complement signed byte.
pub fn decode_signed_byte(buf: &[u8], offset: usize) -> Result<i8, DecodeError> {
    decode_at(buf, offset)
}

/// Reads `buf[offset]` as an unsigned byte.
pub fn decode_byte(buf: &[u8], offset: usize) -> Result<u8, DecodeError> {
    decode_at(buf, offset)
}
