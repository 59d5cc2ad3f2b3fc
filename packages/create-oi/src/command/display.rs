//! Front panel display, button and clock commands.

use bitflags::bitflags;

use super::{opcodes, CommandPacket};
use crate::{
    encode::{Encode, MessageEncoder},
    sensor::Buttons,
};

bitflags! {
    /// Days of the week, Sunday in the lowest bit.
    #[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Default)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct Weekdays: u8 {
        const SUNDAY = 1 << 0;
        const MONDAY = 1 << 1;
        const TUESDAY = 1 << 2;
        const WEDNESDAY = 1 << 3;
        const THURSDAY = 1 << 4;
        const FRIDAY = 1 << 5;
        const SATURDAY = 1 << 6;
    }
}

bitflags! {
    /// Scheduling indicator segments.
    #[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Default)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct SchedulingIndicators: u8 {
        const COLON = 1 << 0;
        const PM = 1 << 1;
        const AM = 1 << 2;
        const CLOCK = 1 << 3;
        const SCHEDULE = 1 << 4;
    }
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SchedulingLedsPayload {
    pub days: Weekdays,
    pub indicators: SchedulingIndicators,
}

impl Encode for SchedulingLedsPayload {
    fn size(&self) -> usize {
        2
    }

    fn encode(&self, data: &mut [u8]) {
        data[0] = self.days.bits();
        data[1] = self.indicators.bits();
    }
}

pub type SchedulingLedsPacket = CommandPacket<{ opcodes::SCHEDULING_LEDS }, SchedulingLedsPayload>;

/// Raw seven-segment bit patterns for the four digits, left to right.
pub type DigitLedsRawPacket = CommandPacket<{ opcodes::DIGIT_LEDS_RAW }, [u8; 4]>;

/// ASCII characters for the four digits, left to right.
///
/// The robot displays printable codes 32..=126; others show as blank.
pub type DigitLedsAsciiPacket = CommandPacket<{ opcodes::DIGIT_LEDS_ASCII }, [u8; 4]>;

impl DigitLedsAsciiPacket {
    /// Builds the packet from the first four bytes of `text`, padding with
    /// spaces.
    pub fn from_text(text: &str) -> Self {
        let mut digits = [b' '; 4];
        for (digit, byte) in digits.iter_mut().zip(text.bytes()) {
            *digit = byte;
        }
        Self::new(digits)
    }
}

impl Encode for Buttons {
    fn size(&self) -> usize {
        1
    }

    fn encode(&self, data: &mut [u8]) {
        data[0] = self.bits();
    }
}

/// Simulates a press of the given buttons.
pub type ButtonsPacket = CommandPacket<{ opcodes::BUTTONS }, Buttons>;

/// Hour (0..=23) and minute (0..=59).
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TimeOfDay {
    pub hour: u8,
    pub minute: u8,
}

impl TimeOfDay {
    pub const fn new(hour: u8, minute: u8) -> Self {
        Self { hour, minute }
    }
}

/// A weekly cleaning schedule.
///
/// `times` is indexed by day, Sunday first. Times for days not set in `days`
/// are still sent.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SchedulePayload {
    pub days: Weekdays,
    pub times: [TimeOfDay; 7],
}

impl SchedulePayload {
    /// A schedule with no days enabled, which clears the stored schedule.
    pub const fn cleared() -> Self {
        Self {
            days: Weekdays::empty(),
            times: [TimeOfDay::new(0, 0); 7],
        }
    }
}

impl Encode for SchedulePayload {
    fn size(&self) -> usize {
        15
    }

    fn encode(&self, data: &mut [u8]) {
        let mut enc = MessageEncoder::new(data);
        enc.write(&self.days.bits());
        for time in &self.times {
            enc.write(&time.hour);
            enc.write(&time.minute);
        }
    }
}

pub type SchedulePacket = CommandPacket<{ opcodes::SCHEDULE }, SchedulePayload>;

#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum Day {
    Sunday = 0,
    Monday = 1,
    Tuesday = 2,
    Wednesday = 3,
    Thursday = 4,
    Friday = 5,
    Saturday = 6,
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DayTimePayload {
    pub day: Day,
    pub time: TimeOfDay,
}

impl Encode for DayTimePayload {
    fn size(&self) -> usize {
        3
    }

    fn encode(&self, data: &mut [u8]) {
        let mut enc = MessageEncoder::new(data);
        enc.write(&(self.day as u8));
        enc.write(&self.time.hour);
        enc.write(&self.time.minute);
    }
}

pub type SetDayTimePacket = CommandPacket<{ opcodes::SET_DAY_TIME }, DayTimePayload>;
