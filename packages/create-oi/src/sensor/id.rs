use super::value::ValueKind;

macro_rules! sensor_ids {
    ($($(#[$meta:meta])* $variant:ident = $id:literal => $kind:expr, $name:literal;)*) => {
        /// An individual sensor packet.
        #[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, PartialOrd, Ord)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        #[repr(u8)]
        pub enum SensorId {
            $($(#[$meta])* $variant = $id,)*
        }

        impl SensorId {
            /// Every individual packet, in id order.
            pub const ALL: &'static [SensorId] = &[$(Self::$variant,)*];

            pub const fn id(self) -> u8 {
                self as u8
            }

            pub const fn kind(self) -> ValueKind {
                match self {
                    $(Self::$variant => $kind,)*
                }
            }

            pub const fn name(self) -> &'static str {
                match self {
                    $(Self::$variant => $name,)*
                }
            }

            pub const fn from_id(id: u8) -> Option<Self> {
                match id {
                    $($id => Some(Self::$variant),)*
                    _ => None,
                }
            }
        }
    };
}

sensor_ids! {
    BumpsAndWheelDrops = 7 => ValueKind::Bumps, "Bumps and Wheel Drops";
    Wall = 8 => ValueKind::Bit, "Wall";
    CliffLeft = 9 => ValueKind::Bit, "Cliff Left";
    CliffFrontLeft = 10 => ValueKind::Bit, "Cliff Front Left";
    CliffFrontRight = 11 => ValueKind::Bit, "Cliff Front Right";
    CliffRight = 12 => ValueKind::Bit, "Cliff Right";
    VirtualWall = 13 => ValueKind::Bit, "Virtual Wall";
    WheelOvercurrents = 14 => ValueKind::Overcurrents, "Wheel Overcurrents";
    DirtDetect = 15 => ValueKind::Byte, "Dirt Detect";
    InfraredCharacterOmni = 17 => ValueKind::Byte, "Infrared Character Omni";
    Buttons = 18 => ValueKind::Buttons, "Buttons";
    /// Distance travelled since the last request, in mm.
    Distance = 19 => ValueKind::SignedWord, "Distance";
    /// Angle turned since the last request, in degrees.
    Angle = 20 => ValueKind::SignedWord, "Angle";
    ChargingState = 21 => ValueKind::ChargingState, "Charging State";
    /// Battery voltage in V.
    BatteryVoltage = 22 => ValueKind::ScaledWord { divisor: 1000 }, "Voltage";
    /// Battery current in A, negative when discharging.
    BatteryCurrent = 23 => ValueKind::ScaledSignedWord { divisor: 1000 }, "Current";
    /// Battery temperature in °C.
    BatteryTemperature = 24 => ValueKind::SignedByte, "Temperature";
    /// Battery charge in mAh.
    BatteryCharge = 25 => ValueKind::Word, "Battery Charge";
    /// Battery capacity in mAh.
    BatteryCapacity = 26 => ValueKind::Word, "Battery Capacity";
    WallSignal = 27 => ValueKind::Word, "Wall Signal";
    CliffLeftSignal = 28 => ValueKind::Word, "Cliff Left Signal";
    CliffFrontLeftSignal = 29 => ValueKind::Word, "Cliff Front Left Signal";
    CliffFrontRightSignal = 30 => ValueKind::Word, "Cliff Front Right Signal";
    CliffRightSignal = 31 => ValueKind::Word, "Cliff Right Signal";
    ChargingSourcesAvailable = 34 => ValueKind::ChargingSources, "Charging Sources Available";
    OiMode = 35 => ValueKind::OiMode, "OI Mode";
    SongNumber = 36 => ValueKind::Byte, "Song Number";
    SongPlaying = 37 => ValueKind::Bit, "Song Playing";
    NumberOfStreamPackets = 38 => ValueKind::Byte, "Number of Stream Packets";
    RequestedVelocity = 39 => ValueKind::SignedWord, "Requested Velocity";
    RequestedRadius = 40 => ValueKind::SignedWord, "Requested Radius";
    RequestedRightVelocity = 41 => ValueKind::SignedWord, "Requested Right Velocity";
    RequestedLeftVelocity = 42 => ValueKind::SignedWord, "Requested Left Velocity";
    LeftEncoderCounts = 43 => ValueKind::SignedWord, "Left Encoder Counts";
    RightEncoderCounts = 44 => ValueKind::SignedWord, "Right Encoder Counts";
    LightBumper = 45 => ValueKind::LightBumper, "Light Bumper";
    LightBumpLeftSignal = 46 => ValueKind::Word, "Light Bump Left Signal";
    LightBumpFrontLeftSignal = 47 => ValueKind::Word, "Light Bump Front Left Signal";
    LightBumpCenterLeftSignal = 48 => ValueKind::Word, "Light Bump Center Left Signal";
    LightBumpCenterRightSignal = 49 => ValueKind::Word, "Light Bump Center Right Signal";
    LightBumpFrontRightSignal = 50 => ValueKind::Word, "Light Bump Front Right Signal";
    LightBumpRightSignal = 51 => ValueKind::Word, "Light Bump Right Signal";
    InfraredCharacterLeft = 52 => ValueKind::Byte, "Infrared Character Left";
    InfraredCharacterRight = 53 => ValueKind::Byte, "Infrared Character Right";
    /// Left wheel motor current in mA.
    LeftMotorCurrent = 54 => ValueKind::SignedWord, "Left Motor Current";
    RightMotorCurrent = 55 => ValueKind::SignedWord, "Right Motor Current";
    MainBrushMotorCurrent = 56 => ValueKind::SignedWord, "Main Brush Motor Current";
    SideBrushMotorCurrent = 57 => ValueKind::SignedWord, "Side Brush Motor Current";
    Stasis = 58 => ValueKind::Stasis, "Stasis";
}

impl SensorId {
    /// Number of bytes this packet occupies on the wire.
    pub const fn size(self) -> usize {
        self.kind().size()
    }
}

impl TryFrom<u8> for SensorId {
    type Error = u8;

    fn try_from(id: u8) -> Result<Self, Self::Error> {
        Self::from_id(id).ok_or(id)
    }
}
