use create_oi::{DecodeError, EncodeError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LinkError {
    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Timed out waiting for the robot to reply")]
    Timeout,

    #[error("Packet decoding error: {0}")]
    Decode(#[from] DecodeError),

    #[error("Command encoding error: {0}")]
    Encode(#[from] EncodeError),

    #[cfg(feature = "serial")]
    #[error("Serialport Error: {0}")]
    Serialport(#[from] tokio_serial::Error),

    #[error("A sensor stream is running and owns the read side of the link")]
    StreamActive,

    #[error("No sensor stream is running")]
    StreamInactive,

    #[error("The read side of the link was lost")]
    ReadSideUnavailable,

    #[error("Stream task failed: {0}")]
    StreamTask(#[from] tokio::task::JoinError),
}
