use std::time::Duration;

use create_serial::{
    protocol::{
        sensor::{GroupId, Packet, Sensor, SensorId, SensorValue},
        stream::encode_frame,
    },
    Link, LinkConfig, LinkError,
};
use tokio::io::{duplex, AsyncReadExt, AsyncWriteExt, DuplexStream};

fn link() -> (Link<DuplexStream>, DuplexStream) {
    let (host, robot) = duplex(4096);
    let config = LinkConfig::default().with_query_timeout(Duration::from_millis(500));

    (Link::new(host, config), robot)
}

async fn expect_bytes(robot: &mut DuplexStream, expected: &[u8]) {
    let mut buf = vec![0; expected.len()];
    robot.read_exact(&mut buf).await.unwrap();
    assert_eq!(buf, expected);
}

fn frame(records: &[(u8, &[u8])]) -> Vec<u8> {
    encode_frame(records).unwrap()
}

#[tokio::test]
async fn garbage_around_a_frame_yields_one_frame() {
    let (mut link, mut robot) = link();

    let mut frames = link
        .start_stream(vec![
            Packet::from(SensorId::Wall),
            Packet::from(SensorId::Distance),
        ])
        .await
        .unwrap();
    expect_bytes(&mut robot, &[0x94, 2, 8, 19]).await;

    robot.write_all(&[0x55, 0x00, 0xFF]).await.unwrap();
    robot
        .write_all(&frame(&[(8, &[1]), (19, &[0xFF, 0xF6])]))
        .await
        .unwrap();
    robot.write_all(&[0x01, 0x02, 0x03]).await.unwrap();

    let received = frames.recv().await.unwrap();
    assert_eq!(received.sequence, 1);
    assert_eq!(received.value(SensorId::Wall), Some(&SensorValue::Bool(true)));
    assert_eq!(
        received.value(SensorId::Distance),
        Some(&SensorValue::SignedWord(-10))
    );

    let stats = link.stream_stats().unwrap();
    link.stop_stream().await.unwrap();
    expect_bytes(&mut robot, &[0x96, 0]).await;

    assert_eq!(stats.frames_received(), 1);
    assert_eq!(stats.frames_rejected(), 0);
    assert!(frames.recv().await.is_none());
}

#[tokio::test]
async fn mismatched_frame_is_discarded() {
    let (mut link, mut robot) = link();

    let mut frames = link
        .start_stream(vec![Packet::from(SensorId::Wall)])
        .await
        .unwrap();
    expect_bytes(&mut robot, &[0x94, 1, 8]).await;

    robot.write_all(&frame(&[(9, &[1])])).await.unwrap();
    robot.write_all(&frame(&[(8, &[0])])).await.unwrap();

    let received = frames.recv().await.unwrap();
    assert_eq!(received.sequence, 1);
    assert_eq!(received.value(SensorId::Wall), Some(&SensorValue::Bool(false)));

    let stats = link.stream_stats().unwrap();
    link.stop_stream().await.unwrap();
    assert_eq!(stats.frames_received(), 1);
    assert_eq!(stats.frames_rejected(), 1);
}

#[tokio::test]
async fn both_checksum_forms_are_accepted() {
    let (mut link, mut robot) = link();

    let mut frames = link
        .start_stream(vec![Packet::from(SensorId::Wall)])
        .await
        .unwrap();
    expect_bytes(&mut robot, &[0x94, 1, 8]).await;

    // Length through checksum sums to zero.
    robot.write_all(&[19, 2, 8, 1, 245]).await.unwrap();
    // Header folded into the sum.
    robot.write_all(&[19, 2, 8, 0, 227]).await.unwrap();
    // Neither.
    robot.write_all(&[19, 2, 8, 1, 0]).await.unwrap();
    robot.write_all(&[19, 2, 8, 1, 245]).await.unwrap();

    let first = frames.recv().await.unwrap();
    assert_eq!(first.value(SensorId::Wall), Some(&SensorValue::Bool(true)));
    let second = frames.recv().await.unwrap();
    assert_eq!(second.value(SensorId::Wall), Some(&SensorValue::Bool(false)));
    let third = frames.recv().await.unwrap();
    assert_eq!(third.sequence, 3);

    let stats = link.stream_stats().unwrap();
    link.stop_stream().await.unwrap();
    assert_eq!(stats.frames_received(), 3);
    assert_eq!(stats.frames_rejected(), 1);
}

#[tokio::test]
async fn queries_are_refused_while_streaming() {
    let (mut link, mut robot) = link();

    let _frames = link
        .start_stream(vec![Packet::from(GroupId::Group107)])
        .await
        .unwrap();
    expect_bytes(&mut robot, &[0x94, 1, 107]).await;

    let mut wall = Sensor::new(SensorId::Wall);
    assert!(matches!(
        link.query_one(&mut wall).await,
        Err(LinkError::StreamActive)
    ));
    assert!(matches!(
        link.start_stream(vec![Packet::from(SensorId::Wall)]).await,
        Err(LinkError::StreamActive)
    ));

    link.pause_stream().await.unwrap();
    link.resume_stream().await.unwrap();
    expect_bytes(&mut robot, &[0x96, 0, 0x96, 1]).await;

    link.stop_stream().await.unwrap();
}

#[tokio::test]
async fn stream_can_be_restarted_and_queried_after() {
    let (mut link, mut robot) = link();

    let mut frames = link
        .start_stream(vec![Packet::from(SensorId::Wall)])
        .await
        .unwrap();
    expect_bytes(&mut robot, &[0x94, 1, 8]).await;
    robot.write_all(&frame(&[(8, &[1])])).await.unwrap();
    assert_eq!(frames.recv().await.unwrap().sequence, 1);
    link.stop_stream().await.unwrap();
    expect_bytes(&mut robot, &[0x96, 0]).await;

    let mut frames = link
        .start_stream(vec![Packet::from(SensorId::SongNumber)])
        .await
        .unwrap();
    expect_bytes(&mut robot, &[0x94, 1, 36]).await;
    robot.write_all(&frame(&[(36, &[4])])).await.unwrap();

    let received = frames.recv().await.unwrap();
    assert_eq!(received.sequence, 1);
    assert_eq!(received.value(SensorId::SongNumber), Some(&SensorValue::Byte(4)));
    link.stop_stream().await.unwrap();
    expect_bytes(&mut robot, &[0x96, 0]).await;

    // A frame that was already in flight when the stream stopped.
    robot.write_all(&frame(&[(36, &[4])])).await.unwrap();

    let responder = tokio::spawn(async move {
        expect_bytes(&mut robot, &[0x8E, 35]).await;
        robot.write_all(&[2]).await.unwrap();
        robot
    });

    let mut mode = Sensor::new(SensorId::OiMode);
    link.query_one(&mut mode).await.unwrap();
    let _robot = responder.await.unwrap();

    assert_eq!(
        mode.value(),
        Some(&SensorValue::OiMode(
            create_serial::protocol::sensor::OiMode::Safe
        ))
    );
}

#[tokio::test]
async fn transport_failure_ends_the_stream() {
    let (mut link, mut robot) = link();

    let mut frames = link
        .start_stream(vec![Packet::from(SensorId::Wall)])
        .await
        .unwrap();
    expect_bytes(&mut robot, &[0x94, 1, 8]).await;

    robot.write_all(&frame(&[(8, &[1])])).await.unwrap();
    assert!(frames.recv().await.is_some());

    drop(robot);
    assert!(frames.recv().await.is_none());

    assert!(matches!(link.stop_stream().await, Err(LinkError::Io(_))));
    assert!(!link.is_streaming());
}

#[tokio::test]
async fn oversized_stream_requests_are_refused() {
    let (mut link, _robot) = link();

    let packets = vec![Packet::from(GroupId::Group100); 4];
    assert!(matches!(
        link.start_stream(packets).await,
        Err(LinkError::Encode(_))
    ));
    assert!(!link.is_streaming());
}
