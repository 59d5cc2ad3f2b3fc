//! Open Interface command packets.
//!
//! Every robot-bound message is a single opcode byte followed by zero or more
//! argument bytes in a fixed order. Commands are fire-and-forget; the only
//! replies the robot ever sends are sensor data, which are correlated with
//! their request by position in the byte stream.

use crate::encode::{Encode, MessageEncoder};

pub mod actuator;
pub mod display;
pub mod mode;
pub mod sensors;

pub use actuator::*;
pub use display::*;
pub use mode::*;
pub use sensors::*;

/// OI opcodes.
///
/// These are the byte values identifying the different commands.
pub mod opcodes {
    pub const START: u8 = 0x80;
    pub const RESET: u8 = 0x07;
    pub const BAUD: u8 = 0x81;
    pub const SAFE: u8 = 0x83;
    pub const FULL: u8 = 0x84;
    pub const POWER_DOWN: u8 = 0x85;
    pub const SPOT: u8 = 0x86;
    pub const CLEAN: u8 = 0x87;
    pub const MAX_CLEAN: u8 = 0x88;
    pub const DRIVE: u8 = 0x89;
    pub const MOTORS: u8 = 0x8A;
    pub const LEDS: u8 = 0x8B;
    pub const SONG: u8 = 0x8C;
    pub const PLAY: u8 = 0x8D;
    pub const SENSORS: u8 = 0x8E;
    pub const SEEK_DOCK: u8 = 0x8F;
    pub const MOTORS_PWM: u8 = 0x90;
    pub const DRIVE_DIRECT: u8 = 0x91;
    pub const DRIVE_PWM: u8 = 0x92;
    pub const STREAM: u8 = 0x94;
    pub const QUERY_LIST: u8 = 0x95;
    pub const PAUSE_RESUME_STREAM: u8 = 0x96;
    pub const SCHEDULING_LEDS: u8 = 0xA2;
    pub const DIGIT_LEDS_RAW: u8 = 0xA3;
    pub const DIGIT_LEDS_ASCII: u8 = 0xA4;
    pub const BUTTONS: u8 = 0xA5;
    pub const SCHEDULE: u8 = 0xA7;
    pub const SET_DAY_TIME: u8 = 0xA8;
    pub const STOP: u8 = 0xAD;
}

/// OI command packet.
///
/// A robot-bound message containing an opcode and an encoded payload.
///
/// # Encoding
///
/// | Field     | Size | Description |
/// |-----------|------|-------------|
/// | `opcode`  | 1    | An [OI opcode](crate::command::opcodes). |
/// | `payload` | n    | Encoded arguments, multi-byte values big-endian. |
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct CommandPacket<const OPCODE: u8, P: Encode> {
    payload: P,
}

impl<const OPCODE: u8, P: Encode> CommandPacket<OPCODE, P> {
    pub const ID: u8 = OPCODE;

    /// Creates a new robot-bound packet with a given payload.
    pub const fn new(payload: P) -> Self {
        Self { payload }
    }

    pub const fn payload(&self) -> &P {
        &self.payload
    }
}

impl<const OPCODE: u8, P: Encode + Default> Default for CommandPacket<OPCODE, P> {
    fn default() -> Self {
        Self::new(P::default())
    }
}

impl<const OPCODE: u8, P: Encode> Encode for CommandPacket<OPCODE, P> {
    fn size(&self) -> usize {
        1 + self.payload.size()
    }

    fn encode(&self, data: &mut [u8]) {
        let mut enc = MessageEncoder::new(data);
        enc.write(&OPCODE);
        enc.write(&self.payload);
    }
}

/// Commands that carry no arguments.
///
/// Mode transitions are sent as a [`Mode`] instead.
pub type SpotPacket = CommandPacket<{ opcodes::SPOT }, ()>;
pub type CleanPacket = CommandPacket<{ opcodes::CLEAN }, ()>;
pub type MaxCleanPacket = CommandPacket<{ opcodes::MAX_CLEAN }, ()>;
pub type SeekDockPacket = CommandPacket<{ opcodes::SEEK_DOCK }, ()>;
