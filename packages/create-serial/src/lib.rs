//! Crate for driving iRobot Create robots over the Open Interface. Not affiliated with iRobot.
//!
//! A [`Link`] wraps any async byte transport (usually a serial port opened
//! with [`serial::open`]) and provides mode changes, commands, blocking sensor
//! queries and background sensor streaming.

pub use create_oi as protocol;

pub mod config;
pub mod error;
pub mod link;
pub mod stream;

#[cfg(feature = "serial")]
pub mod serial;

pub use config::LinkConfig;
pub use error::LinkError;
pub use link::{Link, Transport};
pub use stream::{FrameReceiver, StreamFrame, StreamStats, SyncError, Synchronizer};
