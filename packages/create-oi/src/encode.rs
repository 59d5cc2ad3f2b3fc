use alloc::vec::Vec;
use thiserror::Error;

/// Returned when a command cannot be represented on the wire.
///
/// Only hard, machine-representable limits are checked here. Soft limits
/// documented by iRobot (wheel velocity, notes per song, song slots) are
/// passed through to the robot unchanged.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncodeError {
    #[error("Value {0} does not fit in a 16-bit signed word.")]
    WordOutOfRange(i32),

    #[error("{0} packet ids cannot be listed in a single request (maximum 255).")]
    TooManyPackets(usize),

    #[error("A song of {0} notes cannot be defined (note count is a single byte).")]
    TooManyNotes(usize),

    #[error("A stream payload of {0} bytes does not fit in a frame (maximum 255).")]
    FrameTooLong(usize),
}

/// A type that can be encoded into a sequence of bytes.
pub trait Encode {
    /// Returns the number of bytes this value will take when encoded.
    fn size(&self) -> usize;

    /// Encodes this instance into the provided byte slice.
    ///
    /// `data` must be at least [`Encode::size`] bytes long.
    fn encode(&self, data: &mut [u8]);

    /// Encodes this instance into a freshly allocated buffer.
    fn to_bytes(&self) -> Vec<u8> {
        let mut data = alloc::vec![0; self.size()];
        self.encode(&mut data);
        data
    }
}

macro_rules! impl_encode_for_primitive {
    ($($t:ty),*) => {
        $(
            impl Encode for $t {
                fn size(&self) -> usize {
                    core::mem::size_of::<Self>()
                }

                fn encode(&self, data: &mut [u8]) {
                    data[..core::mem::size_of::<Self>()].copy_from_slice(&self.to_be_bytes());
                }
            }
        )*
    };
}

impl_encode_for_primitive!(u8, u16, i8, i16);

impl Encode for () {
    fn size(&self) -> usize {
        0
    }

    fn encode(&self, _data: &mut [u8]) {}
}

impl Encode for bool {
    fn size(&self) -> usize {
        1
    }

    fn encode(&self, data: &mut [u8]) {
        data[0] = u8::from(*self);
    }
}

impl Encode for &[u8] {
    fn size(&self) -> usize {
        self.len()
    }

    fn encode(&self, data: &mut [u8]) {
        data[..self.len()].copy_from_slice(self);
    }
}

impl<const N: usize> Encode for [u8; N] {
    fn size(&self) -> usize {
        N
    }

    fn encode(&self, data: &mut [u8]) {
        data[..N].copy_from_slice(self);
    }
}

impl Encode for Vec<u8> {
    fn size(&self) -> usize {
        self.len()
    }

    fn encode(&self, data: &mut [u8]) {
        self.as_slice().encode(data)
    }
}

/// Sequentially writes [`Encode`] values into a byte slice.
pub struct MessageEncoder<'a> {
    data: &'a mut [u8],
    position: usize,
}

impl<'a> MessageEncoder<'a> {
    pub fn new(data: &'a mut [u8]) -> Self {
        Self::new_with_position(data, 0)
    }

    pub fn new_with_position(data: &'a mut [u8], position: usize) -> Self {
        Self { data, position }
    }

    /// Encodes `value` at the current position and advances past it.
    pub fn write<E: Encode + ?Sized>(&mut self, value: &E) {
        value.encode(&mut self.data[self.position..]);
        self.position += value.size();
    }

    pub fn position(&self) -> usize {
        self.position
    }
}

#[cfg(test)]
mod tests {
    use super::{Encode, MessageEncoder};

    #[test]
    fn encoder_advances() {
        let mut buf = [0u8; 5];
        let mut enc = MessageEncoder::new(&mut buf);
        enc.write(&0x89u8);
        enc.write(&-200i16);
        enc.write(&0x8000u16);

        assert_eq!(enc.position(), 5);
        assert_eq!(buf, [0x89, 0xFF, 0x38, 0x80, 0x00]);
    }

    #[test]
    fn to_bytes_matches_size() {
        let bytes = [1u8, 2, 3].to_bytes();
        assert_eq!(bytes, [1, 2, 3]);
        assert_eq!(true.to_bytes(), [1]);
    }
}
