//! Sensor query and streaming commands.

use alloc::vec::Vec;

use super::{opcodes, CommandPacket};
use crate::encode::{Encode, EncodeError, MessageEncoder};

/// A count-prefixed list of packet ids.
#[derive(Debug, Clone, Eq, PartialEq, Default)]
pub struct PacketIdList {
    ids: Vec<u8>,
}

impl PacketIdList {
    /// # Errors
    ///
    /// Returns [`EncodeError::TooManyPackets`] if more than 255 ids are given.
    pub fn new(ids: impl IntoIterator<Item = u8>) -> Result<Self, EncodeError> {
        let ids: Vec<u8> = ids.into_iter().collect();
        if ids.len() > u8::MAX as usize {
            return Err(EncodeError::TooManyPackets(ids.len()));
        }

        Ok(Self { ids })
    }

    pub fn ids(&self) -> &[u8] {
        &self.ids
    }
}

impl Encode for PacketIdList {
    fn size(&self) -> usize {
        1 + self.ids.len()
    }

    fn encode(&self, data: &mut [u8]) {
        let mut enc = MessageEncoder::new(data);
        enc.write(&(self.ids.len() as u8));
        enc.write(&self.ids);
    }
}

/// Requests a single packet (individual or group) by id.
pub type QuerySensorPacket = CommandPacket<{ opcodes::SENSORS }, u8>;

/// Requests several packets at once. The reply is their values back to back,
/// in request order, with no framing.
pub type QueryListPacket = CommandPacket<{ opcodes::QUERY_LIST }, PacketIdList>;

/// Starts a stream of the listed packets, sent as a frame every 15 ms.
pub type StreamPacket = CommandPacket<{ opcodes::STREAM }, PacketIdList>;

/// Pauses (`false`) or resumes (`true`) a running stream without changing
/// its packet list.
pub type PauseResumeStreamPacket = CommandPacket<{ opcodes::PAUSE_RESUME_STREAM }, bool>;
