//! Sensor packet descriptors.
//!
//! A descriptor pairs a packet's identity (id and wire size) with its most
//! recently decoded value. Descriptors are created once and reused; each
//! successful decode overwrites the previous value in place.

use alloc::vec::Vec;

use crate::decode::{window, DecodeError};

mod group;
mod id;
mod types;
mod value;

pub use group::{GroupId, Slot};
pub use id::SensorId;
pub use types::*;
pub use value::{SensorValue, ValueKind};

/// A packet that can be requested from the robot and decoded from its reply.
pub trait Descriptor {
    /// Packet id, as sent in query and stream requests.
    fn id(&self) -> u8;

    /// Number of bytes the packet's value occupies on the wire.
    fn size(&self) -> usize;

    /// Decodes this packet's value from `buf` starting at `offset`.
    ///
    /// # Errors
    ///
    /// Returns a [`DecodeError`] if fewer than [`Descriptor::size`] bytes are
    /// available at `offset`. The previously decoded value is left untouched.
    fn decode(&mut self, buf: &[u8], offset: usize) -> Result<(), DecodeError>;
}

impl<D: Descriptor + ?Sized> Descriptor for &mut D {
    fn id(&self) -> u8 {
        (**self).id()
    }

    fn size(&self) -> usize {
        (**self).size()
    }

    fn decode(&mut self, buf: &[u8], offset: usize) -> Result<(), DecodeError> {
        (**self).decode(buf, offset)
    }
}

/// Descriptor for an individual sensor packet.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Sensor {
    id: SensorId,
    value: Option<SensorValue>,
}

impl Sensor {
    pub const fn new(id: SensorId) -> Self {
        Self { id, value: None }
    }

    pub const fn sensor_id(&self) -> SensorId {
        self.id
    }

    /// The last decoded value, or `None` if nothing was decoded yet.
    pub const fn value(&self) -> Option<&SensorValue> {
        self.value.as_ref()
    }
}

impl From<SensorId> for Sensor {
    fn from(id: SensorId) -> Self {
        Self::new(id)
    }
}

impl Descriptor for Sensor {
    fn id(&self) -> u8 {
        self.id.id()
    }

    fn size(&self) -> usize {
        self.id.size()
    }

    fn decode(&mut self, buf: &[u8], offset: usize) -> Result<(), DecodeError> {
        self.value = Some(self.id.kind().decode(buf, offset)?);
        Ok(())
    }
}

/// Descriptor for a group packet.
///
/// Holds one [`Sensor`] per member of the group's layout. Reserved bytes in
/// the layout are skipped while decoding and have no descriptor.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SensorGroup {
    id: GroupId,
    sensors: Vec<Sensor>,
}

impl SensorGroup {
    pub fn new(id: GroupId) -> Self {
        Self {
            id,
            sensors: id.members().map(Sensor::new).collect(),
        }
    }

    pub const fn group_id(&self) -> GroupId {
        self.id
    }

    /// Member descriptors, in wire order.
    pub fn sensors(&self) -> &[Sensor] {
        &self.sensors
    }

    pub fn get(&self, id: SensorId) -> Option<&Sensor> {
        self.sensors.iter().find(|sensor| sensor.id == id)
    }

    /// Shorthand for the last decoded value of member `id`.
    pub fn value(&self, id: SensorId) -> Option<&SensorValue> {
        self.get(id).and_then(Sensor::value)
    }
}

impl From<GroupId> for SensorGroup {
    fn from(id: GroupId) -> Self {
        Self::new(id)
    }
}

impl Descriptor for SensorGroup {
    fn id(&self) -> u8 {
        self.id.id()
    }

    fn size(&self) -> usize {
        self.id.size()
    }

    fn decode(&mut self, buf: &[u8], offset: usize) -> Result<(), DecodeError> {
        // Check the whole group up front so a short buffer leaves every member untouched.
        window::<Self>(buf, offset, self.size())?;

        let mut members = self.sensors.iter_mut();
        let mut position = offset;
        for slot in self.id.layout() {
            if let Slot::Sensor(_) = slot {
                if let Some(sensor) = members.next() {
                    sensor.decode(buf, position)?;
                }
            }
            position += slot.size();
        }

        Ok(())
    }
}

/// Either kind of descriptor.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Packet {
    Sensor(Sensor),
    Group(SensorGroup),
}

impl Packet {
    /// Builds a descriptor for any known packet id, individual or group.
    pub fn from_id(id: u8) -> Option<Self> {
        if let Some(sensor) = SensorId::from_id(id) {
            Some(Self::Sensor(Sensor::new(sensor)))
        } else {
            GroupId::from_id(id).map(|group| Self::Group(SensorGroup::new(group)))
        }
    }

    pub const fn as_sensor(&self) -> Option<&Sensor> {
        match self {
            Self::Sensor(sensor) => Some(sensor),
            Self::Group(_) => None,
        }
    }

    pub const fn as_group(&self) -> Option<&SensorGroup> {
        match self {
            Self::Group(group) => Some(group),
            Self::Sensor(_) => None,
        }
    }

    /// Looks up the value of an individual packet, whether this is that
    /// packet itself or a group containing it.
    pub fn value(&self, id: SensorId) -> Option<&SensorValue> {
        match self {
            Self::Sensor(sensor) if sensor.id == id => sensor.value(),
            Self::Sensor(_) => None,
            Self::Group(group) => group.value(id),
        }
    }
}

impl From<SensorId> for Packet {
    fn from(id: SensorId) -> Self {
        Self::Sensor(Sensor::new(id))
    }
}

impl From<GroupId> for Packet {
    fn from(id: GroupId) -> Self {
        Self::Group(SensorGroup::new(id))
    }
}

impl From<Sensor> for Packet {
    fn from(sensor: Sensor) -> Self {
        Self::Sensor(sensor)
    }
}

impl From<SensorGroup> for Packet {
    fn from(group: SensorGroup) -> Self {
        Self::Group(group)
    }
}

impl Descriptor for Packet {
    fn id(&self) -> u8 {
        match self {
            Self::Sensor(sensor) => sensor.id(),
            Self::Group(group) => group.id(),
        }
    }

    fn size(&self) -> usize {
        match self {
            Self::Sensor(sensor) => sensor.size(),
            Self::Group(group) => group.size(),
        }
    }

    fn decode(&mut self, buf: &[u8], offset: usize) -> Result<(), DecodeError> {
        match self {
            Self::Sensor(sensor) => sensor.decode(buf, offset),
            Self::Group(group) => group.decode(buf, offset),
        }
    }
}
