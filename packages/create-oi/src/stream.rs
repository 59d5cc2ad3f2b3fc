//! Stream frame validation.
//!
//! While streaming, the robot sends a frame every 15 ms:
//!
//! | Field      | Size | Description |
//! |------------|------|-------------|
//! | `header`   | 1    | Always [`STREAM_HEADER`]. |
//! | `length`   | 1    | Number of payload bytes. |
//! | `payload`  | n    | For each requested packet, its id followed by its value. |
//! | `checksum` | 1    | Makes the sum of length, payload and checksum 0 mod 256. |
//!
//! Some firmware folds the header into the sum as well, as in iRobot's own
//! example frame `19 5 29 2 25 13 0 163`. Frames summed either way are
//! accepted.
//!
//! Frames are only accepted when the checksum holds and the payload matches
//! the requested packet list exactly.

use alloc::vec::Vec;
use thiserror::Error;

use crate::{
    decode::DecodeError,
    encode::{EncodeError, MessageEncoder},
    sensor::Descriptor,
};

/// First byte of every stream frame.
pub const STREAM_HEADER: u8 = 19;

/// Position of the stream synchronizer in the incoming byte stream.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum SyncState {
    Idle,
    /// Discarding bytes until a [`STREAM_HEADER`] is seen.
    HuntingSync,
    ReadingLength,
    ReadingPayload,
    Validating,
    Dispatching,
}

/// Reasons a frame is rejected.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameError {
    #[error("Frame started with {0:#04x} instead of the stream header.")]
    InvalidHeader(u8),

    #[error("Frame checksum failed (byte sum was {0:#04x}).")]
    Checksum(u8),

    #[error("Expected packet id {expected} at payload offset {offset}, found {found}.")]
    IdMismatch {
        offset: usize,
        expected: u8,
        found: u8,
    },

    #[error("Payload ended before packet {id} at offset {offset} was complete.")]
    Truncated { id: u8, offset: usize },

    #[error("Payload is {found} bytes long but the requested packets take {expected}.")]
    LengthMismatch { expected: usize, found: usize },

    #[error(transparent)]
    Decode(#[from] DecodeError),
}

/// Number of payload bytes a frame carrying `descriptors` has: one id byte
/// plus the value for each.
pub fn payload_size<D: Descriptor>(descriptors: &[D]) -> usize {
    descriptors.iter().map(|d| 1 + d.size()).sum()
}

fn byte_sum(length: u8, payload: &[u8]) -> u8 {
    payload.iter().fold(length, |acc, b| acc.wrapping_add(*b))
}

/// Computes the checksum byte for a frame with the given length and payload:
/// `256 - (length + payload) mod 256`.
pub fn checksum(length: u8, payload: &[u8]) -> u8 {
    byte_sum(length, payload).wrapping_neg()
}

/// Checks that length, payload and checksum sum to zero, with or without the
/// header byte.
///
/// # Errors
///
/// Returns [`FrameError::Checksum`] with the header-less byte sum otherwise.
pub fn verify_checksum(length: u8, payload: &[u8], checksum: u8) -> Result<(), FrameError> {
    let sum = byte_sum(length, payload).wrapping_add(checksum);

    if sum == 0 || sum.wrapping_add(STREAM_HEADER) == 0 {
        Ok(())
    } else {
        Err(FrameError::Checksum(sum))
    }
}

/// Walks `payload` against the expected packet list without decoding
/// anything.
///
/// # Errors
///
/// Returns the first mismatch found: a wrong id, a packet that runs past the
/// end of the payload, or bytes left over after the last packet.
pub fn validate_payload<D: Descriptor>(payload: &[u8], expected: &[D]) -> Result<(), FrameError> {
    let mut offset = 0;

    for descriptor in expected {
        let Some(&found) = payload.get(offset) else {
            return Err(FrameError::Truncated {
                id: descriptor.id(),
                offset,
            });
        };

        if found != descriptor.id() {
            return Err(FrameError::IdMismatch {
                offset,
                expected: descriptor.id(),
                found,
            });
        }

        if payload.len() - offset - 1 < descriptor.size() {
            return Err(FrameError::Truncated {
                id: descriptor.id(),
                offset,
            });
        }

        offset += 1 + descriptor.size();
    }

    if offset != payload.len() {
        return Err(FrameError::LengthMismatch {
            expected: offset,
            found: payload.len(),
        });
    }

    Ok(())
}

/// Validates `payload` and then decodes every descriptor in `expected` from
/// the bytes following its id.
///
/// Nothing is decoded unless the whole payload validates.
pub fn decode_payload<D: Descriptor>(payload: &[u8], expected: &mut [D]) -> Result<(), FrameError> {
    validate_payload(payload, expected)?;

    let mut offset = 0;
    for descriptor in expected.iter_mut() {
        descriptor.decode(payload, offset + 1)?;
        offset += 1 + descriptor.size();
    }

    Ok(())
}

/// Checks a complete frame, header to checksum, and decodes it into
/// `expected`.
pub fn decode_frame<D: Descriptor>(frame: &[u8], expected: &mut [D]) -> Result<(), FrameError> {
    let (&header, rest) = frame.split_first().ok_or(FrameError::LengthMismatch {
        expected: 3,
        found: 0,
    })?;
    if header != STREAM_HEADER {
        return Err(FrameError::InvalidHeader(header));
    }

    let (&length, rest) = rest.split_first().ok_or(FrameError::LengthMismatch {
        expected: 3,
        found: frame.len(),
    })?;
    if rest.len() != length as usize + 1 {
        return Err(FrameError::LengthMismatch {
            expected: length as usize + 3,
            found: frame.len(),
        });
    }

    let (payload, checksum) = rest.split_at(length as usize);
    verify_checksum(length, payload, checksum[0])?;
    decode_payload(payload, expected)
}

/// Builds a complete frame from `(id, value bytes)` records.
///
/// The robot is the only real producer of frames; this is used for
/// simulating one.
///
/// # Errors
///
/// Returns [`EncodeError::FrameTooLong`] if the payload exceeds 255 bytes.
pub fn encode_frame(records: &[(u8, &[u8])]) -> Result<Vec<u8>, EncodeError> {
    let length: usize = records.iter().map(|(_, value)| 1 + value.len()).sum();
    let length = u8::try_from(length).map_err(|_| EncodeError::FrameTooLong(length))?;

    let mut frame = alloc::vec![0; length as usize + 3];
    let mut enc = MessageEncoder::new(&mut frame);
    enc.write(&STREAM_HEADER);
    enc.write(&length);
    for (id, value) in records {
        enc.write(id);
        enc.write(value);
    }

    let sum = checksum(length, &frame[2..length as usize + 2]);
    frame[length as usize + 2] = sum;

    Ok(frame)
}
