//! The link session.

use std::sync::Arc;

use create_oi::{
    command::{
        DrivePacket, DrivePayload, DriveDirectPacket, DrivePwmPacket, Leds, LedsPacket,
        LedsPayload, Mode, Note, PacketIdList, PauseResumeStreamPacket, PlaySongPacket,
        QueryListPacket, QuerySensorPacket, SeekDockPacket, SongPacket, SongPayload,
        StreamPacket, WheelsPayload,
    },
    sensor::{Descriptor, Packet},
    stream::payload_size,
    Encode, EncodeError,
};
use futures::FutureExt;
use log::{debug, info, trace, warn};
use tokio::{
    io::{split, AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, ReadHalf, WriteHalf},
    select,
    sync::watch,
    task::JoinHandle,
    time::sleep,
};

use crate::{
    config::LinkConfig,
    error::LinkError,
    stream::{self, FrameReceiver, StreamExit, StreamStats, Synchronizer},
};

/// An ordered, bidirectional byte channel to the robot.
///
/// Implemented for anything that is [`AsyncRead`] + [`AsyncWrite`], such as a
/// serial port or, in tests, one end of [`tokio::io::duplex`].
pub trait Transport: AsyncRead + AsyncWrite + Send + Unpin + 'static {}

impl<T: AsyncRead + AsyncWrite + Send + Unpin + 'static> Transport for T {}

struct ActiveStream<T> {
    stop: watch::Sender<bool>,
    task: JoinHandle<StreamExit<ReadHalf<T>>>,
    stats: Arc<StreamStats>,
}

/// An open session with a robot.
///
/// Commands may be sent at any time. The read side is used either for
/// blocking sensor queries or, while a stream is running, by the stream task;
/// never both.
pub struct Link<T: Transport> {
    reader: Option<ReadHalf<T>>,
    writer: WriteHalf<T>,
    config: LinkConfig,
    stream: Option<ActiveStream<T>>,
}

impl<T: Transport> Link<T> {
    pub fn new(transport: T, config: LinkConfig) -> Self {
        let (reader, writer) = split(transport);

        Self {
            reader: Some(reader),
            writer,
            config,
            stream: None,
        }
    }

    pub fn config(&self) -> &LinkConfig {
        &self.config
    }

    pub fn is_streaming(&self) -> bool {
        self.stream.is_some()
    }

    /// Sends a command.
    pub async fn send(&mut self, packet: impl Encode) -> Result<(), LinkError> {
        let encoded = packet.to_bytes();

        trace!("sent packet: {:x?}", encoded);

        self.writer.write_all(&encoded).await?;
        self.writer.flush().await?;

        Ok(())
    }

    /// Switches the OI mode, then waits for the robot to settle if the
    /// transition requires it.
    pub async fn set_mode(&mut self, mode: Mode) -> Result<(), LinkError> {
        self.send(mode).await?;
        info!("Switched to {:?} mode", mode);

        if mode.settle_required() {
            sleep(self.config.settle_time).await;
        }

        Ok(())
    }

    /// Starts the OI and enters safe mode.
    pub async fn initialize(&mut self) -> Result<(), LinkError> {
        self.set_mode(Mode::Passive).await?;
        self.set_mode(Mode::Safe).await
    }

    /// Stops any running stream, returns the robot to passive mode and stops
    /// the OI.
    pub async fn close(&mut self) -> Result<(), LinkError> {
        let stopped = if self.is_streaming() {
            self.stop_stream().await
        } else {
            Ok(())
        };

        self.set_mode(Mode::Passive).await?;
        self.set_mode(Mode::Stop).await?;

        stopped
    }

    /// Drives with `velocity` (mm/s) along an arc of `radius` (mm).
    pub async fn drive(&mut self, velocity: i32, radius: i32) -> Result<(), LinkError> {
        self.send(DrivePacket::new(DrivePayload::new(velocity, radius)?))
            .await
    }

    pub async fn drive_straight(&mut self, velocity: i32) -> Result<(), LinkError> {
        self.send(DrivePacket::new(DrivePayload::straight(velocity)?))
            .await
    }

    pub async fn spin_clockwise(&mut self, velocity: i32) -> Result<(), LinkError> {
        self.send(DrivePacket::new(DrivePayload::spin_clockwise(velocity)?))
            .await
    }

    pub async fn spin_counter_clockwise(&mut self, velocity: i32) -> Result<(), LinkError> {
        self.send(DrivePacket::new(DrivePayload::spin_counter_clockwise(
            velocity,
        )?))
        .await
    }

    pub async fn drive_stop(&mut self) -> Result<(), LinkError> {
        self.send(DrivePacket::new(DrivePayload::stop())).await
    }

    /// Drives each wheel at its own velocity (mm/s).
    pub async fn drive_direct(&mut self, right: i32, left: i32) -> Result<(), LinkError> {
        self.send(DriveDirectPacket::new(WheelsPayload::new(right, left)?))
            .await
    }

    /// Drives each wheel with a raw duty cycle (-255..=255).
    pub async fn drive_pwm(&mut self, right: i32, left: i32) -> Result<(), LinkError> {
        self.send(DrivePwmPacket::new(WheelsPayload::new(right, left)?))
            .await
    }

    pub async fn set_leds(
        &mut self,
        leds: Leds,
        power_color: u8,
        power_intensity: u8,
    ) -> Result<(), LinkError> {
        self.send(LedsPacket::new(LedsPayload {
            leds,
            power_color,
            power_intensity,
        }))
        .await
    }

    pub async fn define_song(
        &mut self,
        number: u8,
        notes: impl IntoIterator<Item = Note>,
    ) -> Result<(), LinkError> {
        self.send(SongPacket::new(SongPayload::new(number, notes)?))
            .await
    }

    pub async fn play_song(&mut self, number: u8) -> Result<(), LinkError> {
        self.send(PlaySongPacket::new(number)).await
    }

    pub async fn seek_dock(&mut self) -> Result<(), LinkError> {
        self.send(SeekDockPacket::default()).await
    }

    fn reader(&mut self) -> Result<&mut ReadHalf<T>, LinkError> {
        if self.stream.is_some() {
            return Err(LinkError::StreamActive);
        }

        self.reader.as_mut().ok_or(LinkError::ReadSideUnavailable)
    }

    /// Throws away whatever is already waiting on the read side so a reply
    /// is not confused with leftovers from an earlier exchange or stream.
    fn discard_stale(&mut self) -> Result<(), LinkError> {
        let reader = self.reader()?;
        let mut scratch = [0u8; 64];
        let mut discarded = 0;

        loop {
            match reader.read(&mut scratch).now_or_never() {
                Some(Ok(0)) | None => break,
                Some(Ok(n)) => discarded += n,
                Some(Err(err)) => return Err(err.into()),
            }
        }

        if discarded > 0 {
            debug!("Discarded {} stale bytes before query", discarded);
        }

        Ok(())
    }

    /// Reads exactly `len` reply bytes, bounded by the query timeout.
    async fn read_reply(&mut self, len: usize) -> Result<Vec<u8>, LinkError> {
        let timeout = self.config.query_timeout;
        let reader = self.reader()?;
        let mut reply = vec![0; len];

        select! {
            result = reader.read_exact(&mut reply) => {
                result?;
            }
            _ = sleep(timeout) => {
                warn!("No reply within {:?} (expected {} bytes)", timeout, len);
                return Err(LinkError::Timeout);
            }
        }

        trace!("received reply: {:x?}", reply);

        Ok(reply)
    }

    /// Requests a single packet and decodes the reply into `descriptor`.
    ///
    /// On failure `descriptor` keeps its previous value.
    pub async fn query_one<D: Descriptor + ?Sized>(
        &mut self,
        descriptor: &mut D,
    ) -> Result<(), LinkError> {
        self.discard_stale()?;
        self.send(QuerySensorPacket::new(descriptor.id())).await?;

        let reply = self.read_reply(descriptor.size()).await?;
        descriptor.decode(&reply, 0)?;

        Ok(())
    }

    /// Requests several packets at once and decodes the reply into each
    /// descriptor, in order.
    ///
    /// The reply is read in full before anything is decoded, so on failure
    /// no descriptor is touched.
    pub async fn query_many<D: Descriptor>(
        &mut self,
        descriptors: &mut [D],
    ) -> Result<(), LinkError> {
        let ids = PacketIdList::new(descriptors.iter().map(|d| d.id()))?;

        self.discard_stale()?;
        self.send(QueryListPacket::new(ids)).await?;

        let total = descriptors.iter().map(|d| d.size()).sum();
        let reply = self.read_reply(total).await?;

        let mut offset = 0;
        for descriptor in descriptors.iter_mut() {
            descriptor.decode(&reply, offset)?;
            offset += descriptor.size();
        }

        Ok(())
    }

    /// Starts streaming `packets`.
    ///
    /// The read side moves to a background task until
    /// [`Link::stop_stream`] is called; queries fail with
    /// [`LinkError::StreamActive`] meanwhile.
    pub async fn start_stream(&mut self, packets: Vec<Packet>) -> Result<FrameReceiver, LinkError> {
        if self.stream.is_some() {
            return Err(LinkError::StreamActive);
        }

        let frame_size = payload_size(&packets);
        if frame_size > u8::MAX as usize {
            return Err(EncodeError::FrameTooLong(frame_size).into());
        }
        let ids = PacketIdList::new(packets.iter().map(|p| p.id()))?;

        self.discard_stale()?;
        self.send(StreamPacket::new(ids)).await?;

        let reader = self.reader.take().ok_or(LinkError::ReadSideUnavailable)?;
        let (frames, receiver) = stream::channel(self.config.stream_capacity);
        let (stop, stop_rx) = watch::channel(false);
        let stats = Arc::new(StreamStats::default());

        info!("Starting stream of {} packets", packets.len());

        let task = tokio::spawn(stream::run(
            Synchronizer::new(reader, self.config.query_timeout),
            packets,
            stop_rx,
            frames,
            stats.clone(),
        ));

        self.stream = Some(ActiveStream { stop, task, stats });

        Ok(receiver)
    }

    /// Pauses the running stream without forgetting its packet list.
    pub async fn pause_stream(&mut self) -> Result<(), LinkError> {
        if self.stream.is_none() {
            return Err(LinkError::StreamInactive);
        }

        self.send(PauseResumeStreamPacket::new(false)).await
    }

    pub async fn resume_stream(&mut self) -> Result<(), LinkError> {
        if self.stream.is_none() {
            return Err(LinkError::StreamInactive);
        }

        self.send(PauseResumeStreamPacket::new(true)).await
    }

    /// Counters of the running stream.
    pub fn stream_stats(&self) -> Option<Arc<StreamStats>> {
        self.stream.as_ref().map(|stream| stream.stats.clone())
    }

    /// Pauses the robot's stream, stops the stream task and takes the read
    /// side back.
    ///
    /// The task only notices the stop request between frames. If it had
    /// already ended on a transport error, that error is returned here.
    pub async fn stop_stream(&mut self) -> Result<(), LinkError> {
        let stream = self.stream.take().ok_or(LinkError::StreamInactive)?;

        let paused = self.send(PauseResumeStreamPacket::new(false)).await;
        _ = stream.stop.send(true);

        let exit = stream.task.await?;
        self.reader = Some(exit.reader);

        info!(
            "Stopped stream after {} frames ({} rejected)",
            stream.stats.frames_received(),
            stream.stats.frames_rejected()
        );

        if let Some(err) = exit.error {
            return Err(err.into());
        }

        paused
    }

    /// Reassembles the transport.
    ///
    /// Fails with [`LinkError::StreamActive`] while a stream is running.
    pub fn into_inner(self) -> Result<T, LinkError> {
        if self.stream.is_some() {
            return Err(LinkError::StreamActive);
        }

        let reader = self.reader.ok_or(LinkError::ReadSideUnavailable)?;
        Ok(reader.unsplit(self.writer))
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use create_oi::sensor::{
        BumpsAndWheelDrops, Buttons, ChargingState, GroupId, OiMode, Sensor, SensorGroup,
        SensorId, SensorValue,
    };
    use tokio::{
        io::{duplex, DuplexStream},
        time::Instant,
    };

    use super::*;

    fn link() -> (Link<DuplexStream>, DuplexStream) {
        let (host, robot) = duplex(1024);
        let config = LinkConfig::default()
            .with_settle_time(Duration::from_millis(100))
            .with_query_timeout(Duration::from_millis(200));

        (Link::new(host, config), robot)
    }

    async fn expect_bytes(robot: &mut DuplexStream, expected: &[u8]) {
        let mut buf = vec![0; expected.len()];
        robot.read_exact(&mut buf).await.unwrap();
        assert_eq!(buf, expected);
    }

    #[tokio::test]
    async fn query_many_decodes_in_order() {
        let (mut link, mut robot) = link();

        let responder = tokio::spawn(async move {
            expect_bytes(&mut robot, &[0x95, 3, 18, 21, 35]).await;
            robot.write_all(&[0x04, 0x02, 0x03]).await.unwrap();
            robot
        });

        let mut sensors = [
            Sensor::new(SensorId::Buttons),
            Sensor::new(SensorId::ChargingState),
            Sensor::new(SensorId::OiMode),
        ];
        link.query_many(&mut sensors).await.unwrap();
        responder.await.unwrap();

        assert_eq!(
            sensors[0].value(),
            Some(&SensorValue::Buttons(Buttons::DOCK))
        );
        assert_eq!(
            sensors[1].value(),
            Some(&SensorValue::ChargingState(ChargingState::FullCharging))
        );
        assert_eq!(sensors[2].value(), Some(&SensorValue::OiMode(OiMode::Full)));
    }

    #[tokio::test]
    async fn query_one_group() {
        let (mut link, mut robot) = link();

        let responder = tokio::spawn(async move {
            expect_bytes(&mut robot, &[0x8E, 3]).await;
            robot
                .write_all(&[0x02, 0x3A, 0x98, 0xFE, 0x0C, 0x19, 0x0B, 0xB8, 0x0F, 0xA0])
                .await
                .unwrap();
            robot
        });

        let mut group = SensorGroup::new(GroupId::Group3);
        link.query_one(&mut group).await.unwrap();
        responder.await.unwrap();

        assert_eq!(
            group.value(SensorId::BatteryTemperature),
            Some(&SensorValue::SignedByte(25))
        );
        assert_eq!(
            group.value(SensorId::BatteryCapacity),
            Some(&SensorValue::Word(4000))
        );
    }

    #[tokio::test]
    async fn stale_bytes_are_discarded() {
        let (mut link, mut robot) = link();

        // Leftovers from an earlier exchange.
        robot.write_all(&[0xDE, 0xAD, 0xBE]).await.unwrap();

        let responder = tokio::spawn(async move {
            expect_bytes(&mut robot, &[0x8E, 7]).await;
            robot.write_all(&[0b0101]).await.unwrap();
            robot
        });

        let mut bumps = Sensor::new(SensorId::BumpsAndWheelDrops);
        link.query_one(&mut bumps).await.unwrap();
        responder.await.unwrap();

        assert_eq!(
            bumps.value(),
            Some(&SensorValue::Bumps(
                BumpsAndWheelDrops::BUMP_RIGHT | BumpsAndWheelDrops::WHEEL_DROP_RIGHT
            ))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn silent_robot_times_out() {
        let (mut link, _robot) = link();

        let mut wall = Sensor::new(SensorId::Wall);
        let err = link.query_one(&mut wall).await.unwrap_err();

        assert!(matches!(err, LinkError::Timeout));
        assert_eq!(wall.value(), None);
    }

    #[tokio::test]
    async fn short_reply_is_a_transport_error() {
        let (mut link, mut robot) = link();

        let responder = tokio::spawn(async move {
            expect_bytes(&mut robot, &[0x95, 2, 19, 20]).await;
            robot.write_all(&[0x00, 0x01, 0x00]).await.unwrap();
        });

        let mut sensors = [
            Sensor::new(SensorId::Distance),
            Sensor::new(SensorId::Angle),
        ];
        let err = link.query_many(&mut sensors).await.unwrap_err();
        responder.await.unwrap();

        assert!(matches!(err, LinkError::Io(_)));
        assert!(sensors.iter().all(|s| s.value().is_none()));
    }

    #[tokio::test(start_paused = true)]
    async fn mode_changes_settle() {
        let (mut link, mut robot) = link();

        let start = Instant::now();
        link.initialize().await.unwrap();
        assert!(start.elapsed() >= Duration::from_millis(200));
        expect_bytes(&mut robot, &[0x80, 0x83]).await;

        let start = Instant::now();
        link.set_mode(Mode::Reset).await.unwrap();
        assert!(start.elapsed() < Duration::from_millis(100));
        expect_bytes(&mut robot, &[0x07]).await;
    }

    #[tokio::test]
    async fn drive_commands() {
        let (mut link, mut robot) = link();

        link.drive(-200, 500).await.unwrap();
        link.drive_straight(100).await.unwrap();
        link.spin_clockwise(50).await.unwrap();
        link.spin_counter_clockwise(50).await.unwrap();
        link.drive_stop().await.unwrap();
        link.drive_direct(100, -100).await.unwrap();

        expect_bytes(&mut robot, &[0x89, 0xFF, 0x38, 0x01, 0xF4]).await;
        expect_bytes(&mut robot, &[0x89, 0x00, 0x64, 0x7F, 0xFF]).await;
        expect_bytes(&mut robot, &[0x89, 0x00, 0x32, 0xFF, 0xFF]).await;
        expect_bytes(&mut robot, &[0x89, 0x00, 0x32, 0x00, 0x01]).await;
        expect_bytes(&mut robot, &[0x89, 0, 0, 0, 0]).await;
        expect_bytes(&mut robot, &[0x91, 0x00, 0x64, 0xFF, 0x9C]).await;

        assert!(matches!(
            link.drive(70000, 0).await,
            Err(LinkError::Encode(EncodeError::WordOutOfRange(70000)))
        ));
    }

    #[tokio::test]
    async fn songs_and_leds() {
        let (mut link, mut robot) = link();

        link.define_song(2, [Note::new(72, 16)]).await.unwrap();
        link.play_song(2).await.unwrap();
        link.set_leds(Leds::DOCK, 0, 255).await.unwrap();
        link.seek_dock().await.unwrap();

        expect_bytes(&mut robot, &[0x8C, 2, 1, 72, 16]).await;
        expect_bytes(&mut robot, &[0x8D, 2]).await;
        expect_bytes(&mut robot, &[0x8B, 0x04, 0, 255]).await;
        expect_bytes(&mut robot, &[0x8F]).await;
    }

    #[tokio::test]
    async fn stream_control_requires_a_stream() {
        let (mut link, _robot) = link();

        assert!(matches!(link.stop_stream().await, Err(LinkError::StreamInactive)));
        assert!(matches!(link.pause_stream().await, Err(LinkError::StreamInactive)));
        assert!(matches!(link.resume_stream().await, Err(LinkError::StreamInactive)));
        assert!(link.stream_stats().is_none());
    }

    #[tokio::test]
    async fn into_inner_reassembles() {
        let (link, mut robot) = link();
        let mut host = link.into_inner().unwrap();

        host.write_all(&[1, 2]).await.unwrap();
        expect_bytes(&mut robot, &[1, 2]).await;
    }
}
