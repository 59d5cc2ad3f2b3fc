//! Sensor streaming.
//!
//! Once a stream is started the robot sends a frame every 15 ms until it is
//! paused or stopped. A background task owns the read side of the link for
//! the whole stream: it hunts for the frame header, reads the rest of the
//! frame, validates it against the requested packet list and hands decoded
//! frames to the consumer over a bounded channel. Invalid frames are counted
//! and discarded; only transport failures end the task.

use std::{
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
    time::Duration,
};

use create_oi::{
    sensor::{Descriptor, Packet, SensorId, SensorValue},
    stream::{decode_payload, verify_checksum, FrameError, SyncState, STREAM_HEADER},
};
use log::{debug, error, trace, warn};
use thiserror::Error;
use tokio::{
    io::{AsyncRead, AsyncReadExt},
    select,
    sync::{
        mpsc::{self, error::TrySendError},
        watch,
    },
    time::sleep,
};
use tokio_stream::wrappers::ReceiverStream;

/// Why a frame could not be read.
#[derive(Error, Debug)]
pub enum SyncError {
    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Rejected frame: {0}")]
    Frame(#[from] FrameError),

    #[error("Frame was not completed in time")]
    Timeout,
}

/// Splits a continuous byte stream into validated stream frames.
#[derive(Debug)]
pub struct Synchronizer<R> {
    reader: R,
    state: SyncState,
    buffer: Vec<u8>,
    frame_timeout: Duration,
}

impl<R: AsyncRead + Unpin> Synchronizer<R> {
    /// `frame_timeout` bounds how long the rest of a frame may take to
    /// arrive once its header was seen.
    pub fn new(reader: R, frame_timeout: Duration) -> Self {
        Self {
            reader,
            state: SyncState::Idle,
            buffer: Vec::new(),
            frame_timeout,
        }
    }

    pub fn state(&self) -> SyncState {
        self.state
    }

    /// Discards bytes until a frame header has been consumed.
    ///
    /// Cancelling this future loses nothing but the garbage it already
    /// skipped.
    pub async fn hunt(&mut self) -> std::io::Result<()> {
        self.state = SyncState::HuntingSync;

        let mut skipped = 0usize;
        loop {
            if self.reader.read_u8().await? == STREAM_HEADER {
                if skipped > 0 {
                    trace!("Skipped {} bytes while hunting for a frame header", skipped);
                }

                self.state = SyncState::ReadingLength;
                return Ok(());
            }
            skipped += 1;
        }
    }

    /// Reads the rest of a frame whose header was just consumed by
    /// [`Synchronizer::hunt`], then validates and decodes it into
    /// `expected`.
    ///
    /// Nothing in `expected` is touched unless the whole frame is valid.
    pub async fn read_frame<D: Descriptor>(&mut self, expected: &mut [D]) -> Result<(), SyncError> {
        let timeout = self.frame_timeout;
        let read = select! {
            result = self.read_body() => result,
            _ = sleep(timeout) => Err(SyncError::Timeout),
        };

        if let Err(err) = read {
            self.state = SyncState::HuntingSync;
            return Err(err);
        }

        self.state = SyncState::Validating;
        let validated = match self.buffer.split_last() {
            Some((&checksum, payload)) => verify_checksum(payload.len() as u8, payload, checksum)
                .and_then(|()| decode_payload(payload, expected)),
            None => Err(FrameError::LengthMismatch {
                expected: 1,
                found: 0,
            }),
        };

        match validated {
            Ok(()) => {
                self.state = SyncState::Dispatching;
                Ok(())
            }
            Err(err) => {
                self.state = SyncState::HuntingSync;
                Err(err.into())
            }
        }
    }

    /// Hunts for and reads frames until one validates.
    ///
    /// Rejected frames are logged and skipped. Only transport errors are
    /// returned.
    pub async fn next_frame<D: Descriptor>(&mut self, expected: &mut [D]) -> std::io::Result<()> {
        loop {
            self.hunt().await?;

            match self.read_frame(expected).await {
                Ok(()) => return Ok(()),
                Err(SyncError::Io(err)) => return Err(err),
                Err(err) => debug!("{}", err),
            }
        }
    }

    pub fn into_inner(self) -> R {
        self.reader
    }

    async fn read_body(&mut self) -> Result<(), SyncError> {
        let length = self.reader.read_u8().await?;

        self.state = SyncState::ReadingPayload;
        self.buffer.clear();
        self.buffer.resize(length as usize + 1, 0);
        self.reader.read_exact(&mut self.buffer).await?;

        trace!(
            "received frame: {:x?}",
            [&[STREAM_HEADER, length][..], &self.buffer[..]].concat()
        );

        Ok(())
    }
}

/// A decoded stream frame.
#[derive(Debug, Clone, PartialEq)]
pub struct StreamFrame {
    /// Counts accepted frames from 1 since the stream started.
    pub sequence: u64,

    /// The requested packets, in request order, holding this frame's values.
    pub packets: Vec<Packet>,
}

impl StreamFrame {
    /// Finds the value of an individual packet in this frame, whether it was
    /// requested on its own or as part of a group.
    pub fn value(&self, id: SensorId) -> Option<&SensorValue> {
        self.packets.iter().find_map(|packet| packet.value(id))
    }
}

/// Frame counters of a running or finished stream.
#[derive(Debug, Default)]
pub struct StreamStats {
    received: AtomicU64,
    rejected: AtomicU64,
    dropped: AtomicU64,
}

impl StreamStats {
    /// Frames that validated and were decoded.
    pub fn frames_received(&self) -> u64 {
        self.received.load(Ordering::Relaxed)
    }

    /// Frames that failed validation or timed out.
    pub fn frames_rejected(&self) -> u64 {
        self.rejected.load(Ordering::Relaxed)
    }

    /// Valid frames that were not delivered because the consumer fell behind.
    pub fn frames_dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}

/// Receiving end of a sensor stream.
///
/// Yields `None` once the stream has stopped, whether it was stopped by the
/// link or ended on a transport error.
#[derive(Debug)]
pub struct FrameReceiver {
    inner: mpsc::Receiver<StreamFrame>,
}

impl FrameReceiver {
    pub async fn recv(&mut self) -> Option<StreamFrame> {
        self.inner.recv().await
    }

    pub fn try_recv(&mut self) -> Option<StreamFrame> {
        self.inner.try_recv().ok()
    }

    /// Converts this receiver into a [`Stream`](tokio_stream::Stream) of frames.
    pub fn into_stream(self) -> ReceiverStream<StreamFrame> {
        ReceiverStream::new(self.inner)
    }
}

/// What a finished stream task hands back to the link.
pub(crate) struct StreamExit<R> {
    pub reader: R,
    pub error: Option<std::io::Error>,
}

pub(crate) fn channel(capacity: usize) -> (mpsc::Sender<StreamFrame>, FrameReceiver) {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    (tx, FrameReceiver { inner: rx })
}

/// Body of the stream task.
///
/// The stop signal is only looked at between frames, while hunting for the
/// next header.
pub(crate) async fn run<R: AsyncRead + Unpin>(
    mut sync: Synchronizer<R>,
    mut packets: Vec<Packet>,
    mut stop: watch::Receiver<bool>,
    frames: mpsc::Sender<StreamFrame>,
    stats: Arc<StreamStats>,
) -> StreamExit<R> {
    let mut sequence = 0;

    let error = loop {
        select! {
            biased;
            _ = stop.changed() => break None,
            hunted = sync.hunt() => {
                if let Err(err) = hunted {
                    break Some(err);
                }
            }
        }

        match sync.read_frame(&mut packets).await {
            Ok(()) => {
                sequence += 1;
                stats.received.fetch_add(1, Ordering::Relaxed);

                let frame = StreamFrame {
                    sequence,
                    packets: packets.clone(),
                };
                match frames.try_send(frame) {
                    Ok(()) => {}
                    Err(TrySendError::Full(frame)) => {
                        stats.dropped.fetch_add(1, Ordering::Relaxed);
                        warn!(
                            "Stream consumer is falling behind, dropped frame {}",
                            frame.sequence
                        );
                    }
                    Err(TrySendError::Closed(_)) => {
                        trace!("Stream consumer is gone, frame {} discarded", sequence);
                    }
                }
            }
            Err(SyncError::Io(err)) => break Some(err),
            Err(err) => {
                stats.rejected.fetch_add(1, Ordering::Relaxed);
                debug!("{}", err);
            }
        }
    };

    if let Some(err) = &error {
        error!("Sensor stream ended on a transport error: {}", err);
    }

    StreamExit {
        reader: sync.into_inner(),
        error,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use create_oi::{
        sensor::{GroupId, SensorValue},
        stream::encode_frame,
    };
    use tokio::io::{duplex, AsyncWriteExt};

    fn wall_frame(wall: u8) -> Vec<u8> {
        let records: [(u8, &[u8]); 1] = [(8, &[wall])];
        encode_frame(&records).unwrap()
    }

    #[tokio::test]
    async fn resynchronizes_on_garbage() {
        let (mut robot, host) = duplex(256);
        let mut sync = Synchronizer::new(host, Duration::from_millis(100));
        let mut expected = [Packet::from(SensorId::Wall)];

        robot.write_all(&[0x00, 0xFF, 0x42]).await.unwrap();
        robot.write_all(&wall_frame(1)).await.unwrap();
        robot.write_all(&[0x01, 0x02]).await.unwrap();

        sync.next_frame(&mut expected).await.unwrap();
        assert_eq!(sync.state(), SyncState::Dispatching);
        assert_eq!(
            expected[0].value(SensorId::Wall),
            Some(&SensorValue::Bool(true))
        );

        // Trailing garbage never produces a second frame.
        let second =
            tokio::time::timeout(Duration::from_millis(50), sync.next_frame(&mut expected)).await;
        assert!(second.is_err());
        assert_eq!(sync.state(), SyncState::HuntingSync);
    }

    #[tokio::test]
    async fn mismatched_frame_is_discarded() {
        let (mut robot, host) = duplex(256);
        let mut sync = Synchronizer::new(host, Duration::from_millis(100));
        let mut expected = [Packet::from(SensorId::Wall)];

        let wrong: [(u8, &[u8]); 1] = [(9, &[1])];
        robot.write_all(&encode_frame(&wrong).unwrap()).await.unwrap();
        robot.write_all(&wall_frame(1)).await.unwrap();

        sync.hunt().await.unwrap();
        let rejected = sync.read_frame(&mut expected).await;
        assert!(matches!(
            rejected,
            Err(SyncError::Frame(FrameError::IdMismatch { .. }))
        ));
        assert_eq!(expected[0].value(SensorId::Wall), None);

        sync.next_frame(&mut expected).await.unwrap();
        assert_eq!(
            expected[0].value(SensorId::Wall),
            Some(&SensorValue::Bool(true))
        );
    }

    #[tokio::test]
    async fn bad_checksum_is_discarded() {
        let (mut robot, host) = duplex(256);
        let mut sync = Synchronizer::new(host, Duration::from_millis(100));
        let mut expected = [Packet::from(SensorId::Wall)];

        let mut corrupt = wall_frame(0);
        *corrupt.last_mut().unwrap() ^= 0x10;
        robot.write_all(&corrupt).await.unwrap();

        sync.hunt().await.unwrap();
        assert!(matches!(
            sync.read_frame(&mut expected).await,
            Err(SyncError::Frame(FrameError::Checksum(_)))
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn stalled_frame_times_out() {
        let (mut robot, host) = duplex(256);
        let mut sync = Synchronizer::new(host, Duration::from_millis(100));
        let mut expected = [Packet::from(GroupId::Group3)];

        robot.write_all(&[STREAM_HEADER, 11, 3, 0]).await.unwrap();

        sync.hunt().await.unwrap();
        assert!(matches!(
            sync.read_frame(&mut expected).await,
            Err(SyncError::Timeout)
        ));
        assert_eq!(sync.state(), SyncState::HuntingSync);
    }

    #[tokio::test]
    async fn closed_transport_is_an_error() {
        let (robot, host) = duplex(256);
        let mut sync = Synchronizer::new(host, Duration::from_millis(100));
        drop(robot);

        let err = sync.next_frame(&mut [Packet::from(SensorId::Wall)]).await.unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::UnexpectedEof);
    }

    #[tokio::test]
    async fn task_delivers_frames_and_stops() {
        let (mut robot, host) = duplex(256);
        let (tx, mut frames) = channel(4);
        let (stop_tx, stop_rx) = watch::channel(false);
        let stats = Arc::new(StreamStats::default());

        let task = tokio::spawn(run(
            Synchronizer::new(host, Duration::from_millis(100)),
            vec![Packet::from(SensorId::Wall)],
            stop_rx,
            tx,
            stats.clone(),
        ));

        robot.write_all(&wall_frame(1)).await.unwrap();
        robot.write_all(&[0xAA]).await.unwrap();
        robot.write_all(&wall_frame(0)).await.unwrap();

        let first = frames.recv().await.unwrap();
        let second = frames.recv().await.unwrap();
        assert_eq!(first.sequence, 1);
        assert_eq!(first.value(SensorId::Wall), Some(&SensorValue::Bool(true)));
        assert_eq!(second.sequence, 2);
        assert_eq!(second.value(SensorId::Wall), Some(&SensorValue::Bool(false)));

        stop_tx.send(true).unwrap();
        let exit = task.await.unwrap();
        assert!(exit.error.is_none());
        assert_eq!(stats.frames_received(), 2);
        assert_eq!(stats.frames_rejected(), 0);
        assert!(frames.recv().await.is_none());
    }

    #[tokio::test]
    async fn full_channel_drops_newest() {
        let (mut robot, host) = duplex(256);
        let (tx, mut frames) = channel(1);
        let (stop_tx, stop_rx) = watch::channel(false);
        let stats = Arc::new(StreamStats::default());

        let task = tokio::spawn(run(
            Synchronizer::new(host, Duration::from_millis(100)),
            vec![Packet::from(SensorId::Wall)],
            stop_rx,
            tx,
            stats.clone(),
        ));

        robot.write_all(&wall_frame(1)).await.unwrap();
        robot.write_all(&wall_frame(0)).await.unwrap();
        drop(robot);

        let exit = task.await.unwrap();
        assert!(exit.error.is_some());
        drop(stop_tx);

        assert_eq!(stats.frames_received(), 2);
        assert_eq!(stats.frames_dropped(), 1);
        assert_eq!(frames.recv().await.unwrap().sequence, 1);
        assert!(frames.recv().await.is_none());
    }
}
