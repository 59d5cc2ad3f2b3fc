use thiserror::Error;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub struct DecodeError {
    kind: DecodeErrorKind,
    type_name: &'static str,
}

impl DecodeError {
    pub fn new<T: ?Sized>(kind: DecodeErrorKind) -> Self {
        Self {
            kind,
            type_name: core::any::type_name::<T>(),
        }
    }

    pub const fn kind(&self) -> DecodeErrorKind {
        self.kind
    }
}

impl core::fmt::Display for DecodeError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "Failed to decode {}: {}", self.type_name, self.kind)
    }
}

#[derive(Error, Clone, Copy, Debug, PartialEq, Eq)]
pub enum DecodeErrorKind {
    #[error("Buffer was too short. Needed {needed} bytes at offset {offset}, found {available}.")]
    UnexpectedEnd {
        offset: usize,
        needed: usize,
        available: usize,
    },
}

/// Returns the `size` bytes of `buf` starting at `offset`, or an
/// [`DecodeErrorKind::UnexpectedEnd`] error attributed to `T`.
pub(crate) fn window<T: ?Sized>(
    buf: &[u8],
    offset: usize,
    size: usize,
) -> Result<&[u8], DecodeError> {
    offset
        .checked_add(size)
        .and_then(|end| buf.get(offset..end))
        .ok_or_else(|| {
            DecodeError::new::<T>(DecodeErrorKind::UnexpectedEnd {
                offset,
                needed: size,
                available: buf.len().saturating_sub(offset),
            })
        })
}

/// A type that can be reconstructed (decoded) from a raw sequence of bytes.
///
/// The input slice will be advanced by the number of bytes successfully
/// consumed during decoding. All multi-byte values on the Open Interface are
/// big-endian.
pub trait Decode {
    /// Attempts to decode `Self` from the beginning of the provided byte slice.
    ///
    /// # Errors
    ///
    /// Returns a [`DecodeError`] if the input is too short to decode a
    /// complete value of this type.
    fn decode(data: &mut &[u8]) -> Result<Self, DecodeError>
    where
        Self: Sized;
}

impl Decode for () {
    fn decode(_data: &mut &[u8]) -> Result<Self, DecodeError> {
        Ok(())
    }
}

macro_rules! impl_decode_for_primitive {
    ($($t:ty),*) => {
        $(
            impl Decode for $t {
                fn decode(data: &mut &[u8]) -> Result<Self, DecodeError> {
                    const SIZE: usize = core::mem::size_of::<$t>();
                    let bytes = window::<$t>(data, 0, SIZE)?;
                    let mut raw = [0u8; SIZE];
                    raw.copy_from_slice(bytes);
                    *data = &data[SIZE..];
                    Ok(Self::from_be_bytes(raw))
                }
            }
        )*
    };
}

impl_decode_for_primitive!(u8, u16, i8, i16);
