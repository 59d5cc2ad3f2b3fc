use bitflags::bitflags;

bitflags! {
    /// Bumper and wheel drop switches (packet 7).
    #[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Default)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct BumpsAndWheelDrops: u8 {
        const BUMP_RIGHT = 1 << 0;
        const BUMP_LEFT = 1 << 1;
        const WHEEL_DROP_RIGHT = 1 << 2;
        const WHEEL_DROP_LEFT = 1 << 3;
    }
}

bitflags! {
    /// Motor overcurrent flags (packet 14).
    #[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Default)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct WheelOvercurrents: u8 {
        const SIDE_BRUSH = 1 << 0;
        const MAIN_BRUSH = 1 << 2;
        const RIGHT_WHEEL = 1 << 3;
        const LEFT_WHEEL = 1 << 4;
    }
}

bitflags! {
    /// Panel buttons (packet 18).
    ///
    /// Also used as the argument of the button press command.
    #[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Default)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct Buttons: u8 {
        const CLEAN = 1 << 0;
        const SPOT = 1 << 1;
        const DOCK = 1 << 2;
        const MINUTE = 1 << 3;
        const HOUR = 1 << 4;
        const DAY = 1 << 5;
        const SCHEDULE = 1 << 6;
        const CLOCK = 1 << 7;
    }
}

bitflags! {
    /// Charging sources available (packet 34).
    #[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Default)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct ChargingSources: u8 {
        const INTERNAL_CHARGER = 1 << 0;
        const HOME_BASE = 1 << 1;
    }
}

bitflags! {
    /// Light bumper detections (packet 45).
    #[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Default)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct LightBumper: u8 {
        const LEFT = 1 << 0;
        const FRONT_LEFT = 1 << 1;
        const CENTER_LEFT = 1 << 2;
        const CENTER_RIGHT = 1 << 3;
        const FRONT_RIGHT = 1 << 4;
        const RIGHT = 1 << 5;
    }
}

bitflags! {
    /// Caster wheel stasis sensor (packet 58).
    #[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Default)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct Stasis: u8 {
        /// The caster is turning, so the robot is moving forward.
        const TOGGLING = 1 << 0;
        /// The sensor is disabled.
        const DISABLED = 1 << 1;
    }
}

/// Battery charging state (packet 21).
///
/// Raw values outside the documented range decode to [`ChargingState::Unknown`].
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ChargingState {
    NotCharging,
    ReconditioningCharging,
    FullCharging,
    TrickleCharging,
    Waiting,
    ChargingFaultCondition,
    Unknown(u8),
}

impl ChargingState {
    pub const fn from_raw(raw: u8) -> Self {
        match raw {
            0 => Self::NotCharging,
            1 => Self::ReconditioningCharging,
            2 => Self::FullCharging,
            3 => Self::TrickleCharging,
            4 => Self::Waiting,
            5 => Self::ChargingFaultCondition,
            v => Self::Unknown(v),
        }
    }

    pub const fn raw(self) -> u8 {
        match self {
            Self::NotCharging => 0,
            Self::ReconditioningCharging => 1,
            Self::FullCharging => 2,
            Self::TrickleCharging => 3,
            Self::Waiting => 4,
            Self::ChargingFaultCondition => 5,
            Self::Unknown(v) => v,
        }
    }

    /// Human-readable label, as shown in iRobot's documentation.
    pub const fn label(self) -> &'static str {
        match self {
            Self::NotCharging => "Not charging",
            Self::ReconditioningCharging => "Reconditioning Charging",
            Self::FullCharging => "Full Charging",
            Self::TrickleCharging => "Trickle Charging",
            Self::Waiting => "Waiting",
            Self::ChargingFaultCondition => "Charging Fault Condition",
            Self::Unknown(_) => "Unknown",
        }
    }
}

impl From<u8> for ChargingState {
    fn from(raw: u8) -> Self {
        Self::from_raw(raw)
    }
}

/// The OI mode the robot reports itself in (packet 35).
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum OiMode {
    Off,
    Passive,
    Safe,
    Full,
    Unknown(u8),
}

impl OiMode {
    pub const fn from_raw(raw: u8) -> Self {
        match raw {
            0 => Self::Off,
            1 => Self::Passive,
            2 => Self::Safe,
            3 => Self::Full,
            v => Self::Unknown(v),
        }
    }

    pub const fn raw(self) -> u8 {
        match self {
            Self::Off => 0,
            Self::Passive => 1,
            Self::Safe => 2,
            Self::Full => 3,
            Self::Unknown(v) => v,
        }
    }
}

impl From<u8> for OiMode {
    fn from(raw: u8) -> Self {
        Self::from_raw(raw)
    }
}
