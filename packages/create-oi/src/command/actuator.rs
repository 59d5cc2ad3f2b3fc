//! Drive, motor, LED and song commands.

use alloc::vec::Vec;
use bitflags::bitflags;

use super::{opcodes, CommandPacket};
use crate::{
    encode::{Encode, EncodeError, MessageEncoder},
    word::encode_signed_word,
};

/// Special radius values understood by the drive command.
pub mod radius {
    /// Drive in a straight line.
    pub const STRAIGHT: i16 = 32767;
    /// Alternate encoding of a straight line.
    pub const STRAIGHT_ALT: i16 = -32768;
    /// Turn in place clockwise.
    pub const SPIN_CLOCKWISE: i16 = -1;
    /// Turn in place counter-clockwise.
    pub const SPIN_COUNTER_CLOCKWISE: i16 = 1;
}

fn checked_word(value: i32) -> Result<i16, EncodeError> {
    encode_signed_word(value).map(i16::from_be_bytes)
}

/// Arguments of the drive command.
///
/// Velocity is in mm/s, radius in mm. Neither is clamped to the range
/// documented for the robot; out-of-range values are sent as-is.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DrivePayload {
    pub velocity: i16,
    pub radius: i16,
}

impl DrivePayload {
    /// # Errors
    ///
    /// Returns [`EncodeError::WordOutOfRange`] if either argument does not fit
    /// in a signed word.
    pub fn new(velocity: i32, radius: i32) -> Result<Self, EncodeError> {
        Ok(Self {
            velocity: checked_word(velocity)?,
            radius: checked_word(radius)?,
        })
    }

    pub fn straight(velocity: i32) -> Result<Self, EncodeError> {
        Self::new(velocity, radius::STRAIGHT.into())
    }

    pub fn spin_clockwise(velocity: i32) -> Result<Self, EncodeError> {
        Self::new(velocity, radius::SPIN_CLOCKWISE.into())
    }

    pub fn spin_counter_clockwise(velocity: i32) -> Result<Self, EncodeError> {
        Self::new(velocity, radius::SPIN_COUNTER_CLOCKWISE.into())
    }

    pub const fn stop() -> Self {
        Self {
            velocity: 0,
            radius: 0,
        }
    }
}

impl Encode for DrivePayload {
    fn size(&self) -> usize {
        4
    }

    fn encode(&self, data: &mut [u8]) {
        let mut enc = MessageEncoder::new(data);
        enc.write(&self.velocity);
        enc.write(&self.radius);
    }
}

/// Per-wheel arguments, right wheel first on the wire.
///
/// Used by drive direct (mm/s) and drive PWM (duty cycle, -255..=255).
#[derive(Debug, Clone, Copy, Eq, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WheelsPayload {
    pub right: i16,
    pub left: i16,
}

impl WheelsPayload {
    pub fn new(right: i32, left: i32) -> Result<Self, EncodeError> {
        Ok(Self {
            right: checked_word(right)?,
            left: checked_word(left)?,
        })
    }
}

impl Encode for WheelsPayload {
    fn size(&self) -> usize {
        4
    }

    fn encode(&self, data: &mut [u8]) {
        let mut enc = MessageEncoder::new(data);
        enc.write(&self.right);
        enc.write(&self.left);
    }
}

pub type DrivePacket = CommandPacket<{ opcodes::DRIVE }, DrivePayload>;
pub type DriveDirectPacket = CommandPacket<{ opcodes::DRIVE_DIRECT }, WheelsPayload>;
pub type DrivePwmPacket = CommandPacket<{ opcodes::DRIVE_PWM }, WheelsPayload>;

bitflags! {
    /// Cleaning motor switches.
    #[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Default)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct Motors: u8 {
        const SIDE_BRUSH = 1 << 0;
        const VACUUM = 1 << 1;
        const MAIN_BRUSH = 1 << 2;
        /// Run the side brush clockwise instead of its default direction.
        const SIDE_BRUSH_CLOCKWISE = 1 << 3;
        /// Run the main brush outward instead of its default direction.
        const MAIN_BRUSH_OUTWARD = 1 << 4;
    }
}

impl Encode for Motors {
    fn size(&self) -> usize {
        1
    }

    fn encode(&self, data: &mut [u8]) {
        data[0] = self.bits();
    }
}

pub type MotorsPacket = CommandPacket<{ opcodes::MOTORS }, Motors>;

/// Cleaning motor duty cycles.
///
/// Brushes take -127..=127, the vacuum 0..=127. Values are not checked.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MotorsPwmPayload {
    pub main_brush: i8,
    pub side_brush: i8,
    pub vacuum: u8,
}

impl Encode for MotorsPwmPayload {
    fn size(&self) -> usize {
        3
    }

    fn encode(&self, data: &mut [u8]) {
        let mut enc = MessageEncoder::new(data);
        enc.write(&self.main_brush);
        enc.write(&self.side_brush);
        enc.write(&self.vacuum);
    }
}

pub type MotorsPwmPacket = CommandPacket<{ opcodes::MOTORS_PWM }, MotorsPwmPayload>;

bitflags! {
    /// Indicator LEDs.
    #[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Default)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct Leds: u8 {
        const DEBRIS = 1 << 0;
        const SPOT = 1 << 1;
        const DOCK = 1 << 2;
        const CHECK_ROBOT = 1 << 3;
    }
}

/// Arguments of the LED command.
///
/// `power_color` goes from 0 (green) to 255 (red); `power_intensity` from 0
/// (off) to 255 (full).
#[derive(Debug, Clone, Copy, Eq, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LedsPayload {
    pub leds: Leds,
    pub power_color: u8,
    pub power_intensity: u8,
}

impl Encode for LedsPayload {
    fn size(&self) -> usize {
        3
    }

    fn encode(&self, data: &mut [u8]) {
        let mut enc = MessageEncoder::new(data);
        enc.write(&self.leds.bits());
        enc.write(&self.power_color);
        enc.write(&self.power_intensity);
    }
}

pub type LedsPacket = CommandPacket<{ opcodes::LEDS }, LedsPayload>;

/// A single song note.
///
/// `pitch` is a MIDI note number (31..=127, anything else is a rest);
/// `duration` is in 1/64ths of a second.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Note {
    pub pitch: u8,
    pub duration: u8,
}

impl Note {
    pub const fn new(pitch: u8, duration: u8) -> Self {
        Self { pitch, duration }
    }
}

impl From<(u8, u8)> for Note {
    fn from((pitch, duration): (u8, u8)) -> Self {
        Self::new(pitch, duration)
    }
}

/// Arguments of the song definition command.
///
/// The robot stores at most 16 notes per slot, but longer songs are sent
/// unmodified; the extra notes spill over into the following slots. Only a
/// note count that does not fit in a byte is refused.
#[derive(Debug, Clone, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SongPayload {
    number: u8,
    notes: Vec<Note>,
}

impl SongPayload {
    /// # Errors
    ///
    /// Returns [`EncodeError::TooManyNotes`] if more than 255 notes are given.
    pub fn new(number: u8, notes: impl IntoIterator<Item = Note>) -> Result<Self, EncodeError> {
        let notes: Vec<Note> = notes.into_iter().collect();
        if notes.len() > u8::MAX as usize {
            return Err(EncodeError::TooManyNotes(notes.len()));
        }

        Ok(Self { number, notes })
    }

    pub const fn number(&self) -> u8 {
        self.number
    }

    pub fn notes(&self) -> &[Note] {
        &self.notes
    }
}

impl Encode for SongPayload {
    fn size(&self) -> usize {
        2 + 2 * self.notes.len()
    }

    fn encode(&self, data: &mut [u8]) {
        let mut enc = MessageEncoder::new(data);
        enc.write(&self.number);
        enc.write(&(self.notes.len() as u8));
        for note in &self.notes {
            enc.write(&note.pitch);
            enc.write(&note.duration);
        }
    }
}

pub type SongPacket = CommandPacket<{ opcodes::SONG }, SongPayload>;
pub type PlaySongPacket = CommandPacket<{ opcodes::PLAY }, u8>;
