//! Implementation of the iRobot Create Open Interface (OI) serial protocol in Rust.
//!
//! This crate only deals in bytes: it encodes robot-bound commands, decodes
//! sensor replies and validates stream frames. See `create-serial` for
//! talking to an actual robot.

#![no_std]

extern crate alloc;

pub mod command;
pub mod sensor;
pub mod stream;
pub mod word;

mod decode;
mod encode;

pub use decode::{Decode, DecodeError, DecodeErrorKind};
pub use encode::{Encode, EncodeError, MessageEncoder};
