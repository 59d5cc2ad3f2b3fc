use super::id::SensorId::{self, *};

/// One entry of a group layout.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum Slot {
    Sensor(SensorId),
    /// Unused bytes. Skipped when decoding.
    Reserved(usize),
}

impl Slot {
    pub const fn size(self) -> usize {
        match self {
            Self::Sensor(sensor) => sensor.size(),
            Self::Reserved(n) => n,
        }
    }
}

use Slot::{Reserved as R, Sensor as S};

const GROUP_0: &[Slot] = &[
    S(BumpsAndWheelDrops),
    S(Wall),
    S(CliffLeft),
    S(CliffFrontLeft),
    S(CliffFrontRight),
    S(CliffRight),
    S(VirtualWall),
    S(WheelOvercurrents),
    S(DirtDetect),
    R(1),
    S(InfraredCharacterOmni),
    S(Buttons),
    S(Distance),
    S(Angle),
    S(ChargingState),
    S(BatteryVoltage),
    S(BatteryCurrent),
    S(BatteryTemperature),
    S(BatteryCharge),
    S(BatteryCapacity),
];

const GROUP_1: &[Slot] = &[
    S(BumpsAndWheelDrops),
    S(Wall),
    S(CliffLeft),
    S(CliffFrontLeft),
    S(CliffFrontRight),
    S(CliffRight),
    S(VirtualWall),
    S(WheelOvercurrents),
    S(DirtDetect),
    R(1),
];

const GROUP_2: &[Slot] = &[S(InfraredCharacterOmni), S(Buttons), S(Distance), S(Angle)];

const GROUP_3: &[Slot] = &[
    S(ChargingState),
    S(BatteryVoltage),
    S(BatteryCurrent),
    S(BatteryTemperature),
    S(BatteryCharge),
    S(BatteryCapacity),
];

const GROUP_4: &[Slot] = &[
    S(WallSignal),
    S(CliffLeftSignal),
    S(CliffFrontLeftSignal),
    S(CliffFrontRightSignal),
    S(CliffRightSignal),
    R(3),
    S(ChargingSourcesAvailable),
];

const GROUP_5: &[Slot] = &[
    S(OiMode),
    S(SongNumber),
    S(SongPlaying),
    S(NumberOfStreamPackets),
    S(RequestedVelocity),
    S(RequestedRadius),
    S(RequestedRightVelocity),
    S(RequestedLeftVelocity),
];

const GROUP_6: &[Slot] = &[
    S(BumpsAndWheelDrops),
    S(Wall),
    S(CliffLeft),
    S(CliffFrontLeft),
    S(CliffFrontRight),
    S(CliffRight),
    S(VirtualWall),
    S(WheelOvercurrents),
    S(DirtDetect),
    R(1),
    S(InfraredCharacterOmni),
    S(Buttons),
    S(Distance),
    S(Angle),
    S(ChargingState),
    S(BatteryVoltage),
    S(BatteryCurrent),
    S(BatteryTemperature),
    S(BatteryCharge),
    S(BatteryCapacity),
    S(WallSignal),
    S(CliffLeftSignal),
    S(CliffFrontLeftSignal),
    S(CliffFrontRightSignal),
    S(CliffRightSignal),
    R(3),
    S(ChargingSourcesAvailable),
    S(OiMode),
    S(SongNumber),
    S(SongPlaying),
    S(NumberOfStreamPackets),
    S(RequestedVelocity),
    S(RequestedRadius),
    S(RequestedRightVelocity),
    S(RequestedLeftVelocity),
];

const GROUP_100: &[Slot] = &[
    S(BumpsAndWheelDrops),
    S(Wall),
    S(CliffLeft),
    S(CliffFrontLeft),
    S(CliffFrontRight),
    S(CliffRight),
    S(VirtualWall),
    S(WheelOvercurrents),
    S(DirtDetect),
    R(1),
    S(InfraredCharacterOmni),
    S(Buttons),
    S(Distance),
    S(Angle),
    S(ChargingState),
    S(BatteryVoltage),
    S(BatteryCurrent),
    S(BatteryTemperature),
    S(BatteryCharge),
    S(BatteryCapacity),
    S(WallSignal),
    S(CliffLeftSignal),
    S(CliffFrontLeftSignal),
    S(CliffFrontRightSignal),
    S(CliffRightSignal),
    R(3),
    S(ChargingSourcesAvailable),
    S(OiMode),
    S(SongNumber),
    S(SongPlaying),
    S(NumberOfStreamPackets),
    S(RequestedVelocity),
    S(RequestedRadius),
    S(RequestedRightVelocity),
    S(RequestedLeftVelocity),
    S(LeftEncoderCounts),
    S(RightEncoderCounts),
    S(LightBumper),
    S(LightBumpLeftSignal),
    S(LightBumpFrontLeftSignal),
    S(LightBumpCenterLeftSignal),
    S(LightBumpCenterRightSignal),
    S(LightBumpFrontRightSignal),
    S(LightBumpRightSignal),
    S(InfraredCharacterLeft),
    S(InfraredCharacterRight),
    S(LeftMotorCurrent),
    S(RightMotorCurrent),
    S(MainBrushMotorCurrent),
    S(SideBrushMotorCurrent),
    S(Stasis),
];

const GROUP_101: &[Slot] = &[
    S(LeftEncoderCounts),
    S(RightEncoderCounts),
    S(LightBumper),
    S(LightBumpLeftSignal),
    S(LightBumpFrontLeftSignal),
    S(LightBumpCenterLeftSignal),
    S(LightBumpCenterRightSignal),
    S(LightBumpFrontRightSignal),
    S(LightBumpRightSignal),
    S(InfraredCharacterLeft),
    S(InfraredCharacterRight),
    S(LeftMotorCurrent),
    S(RightMotorCurrent),
    S(MainBrushMotorCurrent),
    S(SideBrushMotorCurrent),
    S(Stasis),
];

const GROUP_106: &[Slot] = &[
    S(LightBumpLeftSignal),
    S(LightBumpFrontLeftSignal),
    S(LightBumpCenterLeftSignal),
    S(LightBumpCenterRightSignal),
    S(LightBumpFrontRightSignal),
    S(LightBumpRightSignal),
];

const GROUP_107: &[Slot] = &[
    S(LeftMotorCurrent),
    S(RightMotorCurrent),
    S(MainBrushMotorCurrent),
    S(SideBrushMotorCurrent),
    S(Stasis),
];

/// A group packet: a fixed sequence of individual packets requested with a
/// single id.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum GroupId {
    Group0 = 0,
    Group1 = 1,
    Group2 = 2,
    Group3 = 3,
    Group4 = 4,
    Group5 = 5,
    Group6 = 6,
    Group100 = 100,
    Group101 = 101,
    Group106 = 106,
    Group107 = 107,
}

impl GroupId {
    pub const ALL: &'static [GroupId] = &[
        Self::Group0,
        Self::Group1,
        Self::Group2,
        Self::Group3,
        Self::Group4,
        Self::Group5,
        Self::Group6,
        Self::Group100,
        Self::Group101,
        Self::Group106,
        Self::Group107,
    ];

    pub const fn id(self) -> u8 {
        self as u8
    }

    pub const fn from_id(id: u8) -> Option<Self> {
        Some(match id {
            0 => Self::Group0,
            1 => Self::Group1,
            2 => Self::Group2,
            3 => Self::Group3,
            4 => Self::Group4,
            5 => Self::Group5,
            6 => Self::Group6,
            100 => Self::Group100,
            101 => Self::Group101,
            106 => Self::Group106,
            107 => Self::Group107,
            _ => return None,
        })
    }

    /// The wire layout of this group, in order.
    pub const fn layout(self) -> &'static [Slot] {
        match self {
            Self::Group0 => GROUP_0,
            Self::Group1 => GROUP_1,
            Self::Group2 => GROUP_2,
            Self::Group3 => GROUP_3,
            Self::Group4 => GROUP_4,
            Self::Group5 => GROUP_5,
            Self::Group6 => GROUP_6,
            Self::Group100 => GROUP_100,
            Self::Group101 => GROUP_101,
            Self::Group106 => GROUP_106,
            Self::Group107 => GROUP_107,
        }
    }

    /// Total size on the wire, reserved bytes included.
    pub const fn size(self) -> usize {
        let layout = self.layout();
        let mut total = 0;
        let mut i = 0;
        while i < layout.len() {
            total += layout[i].size();
            i += 1;
        }
        total
    }

    /// The individual packets carried by this group, in wire order.
    pub fn members(self) -> impl Iterator<Item = SensorId> {
        self.layout().iter().filter_map(|slot| match slot {
            Slot::Sensor(sensor) => Some(*sensor),
            Slot::Reserved(_) => None,
        })
    }
}

impl TryFrom<u8> for GroupId {
    type Error = u8;

    fn try_from(id: u8) -> Result<Self, Self::Error> {
        Self::from_id(id).ok_or(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn group_sizes() {
        let expected = [
            (GroupId::Group0, 26),
            (GroupId::Group1, 10),
            (GroupId::Group2, 6),
            (GroupId::Group3, 10),
            (GroupId::Group4, 14),
            (GroupId::Group5, 12),
            (GroupId::Group6, 52),
            (GroupId::Group100, 80),
            (GroupId::Group101, 28),
            (GroupId::Group106, 12),
            (GroupId::Group107, 9),
        ];

        for (group, size) in expected {
            assert_eq!(group.size(), size, "{group:?}");
        }
    }

    #[test]
    fn group_100_is_group_6_then_group_101() {
        let combined: alloc::vec::Vec<Slot> = GroupId::Group6
            .layout()
            .iter()
            .chain(GroupId::Group101.layout())
            .copied()
            .collect();
        assert_eq!(GroupId::Group100.layout(), combined.as_slice());
    }

    #[test]
    fn group_6_is_groups_1_to_5() {
        let combined: alloc::vec::Vec<Slot> = [
            GroupId::Group1,
            GroupId::Group2,
            GroupId::Group3,
            GroupId::Group4,
            GroupId::Group5,
        ]
        .iter()
        .flat_map(|group| group.layout().iter().copied())
        .collect();
        assert_eq!(GroupId::Group6.layout(), combined.as_slice());
    }

    #[test]
    fn members_skip_reserved() {
        let members: alloc::vec::Vec<SensorId> = GroupId::Group4.members().collect();
        assert_eq!(members.len(), 6);
        assert_eq!(members.last(), Some(&SensorId::ChargingSourcesAvailable));
    }

    #[test]
    fn from_id() {
        for group in GroupId::ALL {
            assert_eq!(GroupId::from_id(group.id()), Some(*group));
        }
        assert_eq!(GroupId::from_id(7), None);
        assert_eq!(GroupId::try_from(102), Err(102));
    }
}
