//! Mode transitions and link-level commands.

use super::{opcodes, CommandPacket};
use crate::encode::Encode;

/// An OI mode transition.
///
/// Each variant encodes as its single opcode byte. The robot ignores further
/// commands for a short while after most transitions, see
/// [`Mode::settle_required`].
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Mode {
    /// Start the OI. The robot enters passive mode.
    Passive,
    Safe,
    Full,
    PowerDown,
    /// Soft reset, as if the battery had been reinserted.
    Reset,
    /// Stop the OI. The robot stops responding to commands.
    Stop,
}

impl Mode {
    pub const fn opcode(self) -> u8 {
        match self {
            Self::Passive => opcodes::START,
            Self::Safe => opcodes::SAFE,
            Self::Full => opcodes::FULL,
            Self::PowerDown => opcodes::POWER_DOWN,
            Self::Reset => opcodes::RESET,
            Self::Stop => opcodes::STOP,
        }
    }

    /// Whether the host must wait for the robot to settle after sending this
    /// transition.
    pub const fn settle_required(self) -> bool {
        matches!(
            self,
            Self::Passive | Self::Safe | Self::Full | Self::PowerDown
        )
    }
}

impl Encode for Mode {
    fn size(&self) -> usize {
        1
    }

    fn encode(&self, data: &mut [u8]) {
        data[0] = self.opcode();
    }
}

/// Serial baud rates understood by the robot.
///
/// The encoded value is the rate's code, not the rate itself.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum BaudRate {
    B300 = 0,
    B600 = 1,
    B1200 = 2,
    B2400 = 3,
    B4800 = 4,
    B9600 = 5,
    B14400 = 6,
    B19200 = 7,
    B28800 = 8,
    B38400 = 9,
    B57600 = 10,
    B115200 = 11,
}

impl BaudRate {
    pub const fn bits_per_second(self) -> u32 {
        match self {
            Self::B300 => 300,
            Self::B600 => 600,
            Self::B1200 => 1200,
            Self::B2400 => 2400,
            Self::B4800 => 4800,
            Self::B9600 => 9600,
            Self::B14400 => 14400,
            Self::B19200 => 19200,
            Self::B28800 => 28800,
            Self::B38400 => 38400,
            Self::B57600 => 57600,
            Self::B115200 => 115200,
        }
    }
}

impl Encode for BaudRate {
    fn size(&self) -> usize {
        1
    }

    fn encode(&self, data: &mut [u8]) {
        data[0] = *self as u8;
    }
}

pub type BaudPacket = CommandPacket<{ opcodes::BAUD }, BaudRate>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_opcodes() {
        assert_eq!(Mode::Passive.to_bytes(), [0x80]);
        assert_eq!(Mode::Safe.to_bytes(), [0x83]);
        assert_eq!(Mode::Full.to_bytes(), [0x84]);
        assert_eq!(Mode::PowerDown.to_bytes(), [0x85]);
        assert_eq!(Mode::Reset.to_bytes(), [0x07]);
        assert_eq!(Mode::Stop.to_bytes(), [0xAD]);
    }

    #[test]
    fn settle() {
        assert!(Mode::Passive.settle_required());
        assert!(Mode::Safe.settle_required());
        assert!(Mode::Full.settle_required());
        assert!(Mode::PowerDown.settle_required());
        assert!(!Mode::Reset.settle_required());
        assert!(!Mode::Stop.settle_required());
    }

    #[test]
    fn baud() {
        assert_eq!(BaudPacket::new(BaudRate::B115200).to_bytes(), [0x81, 11]);
        assert_eq!(BaudPacket::new(BaudRate::B300).to_bytes(), [0x81, 0]);
        assert_eq!(BaudRate::B57600.bits_per_second(), 57600);
    }
}
