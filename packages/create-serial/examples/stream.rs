use log::{error, info, warn};
use tokio_stream::StreamExt;
use create_serial::{
    protocol::{
        command::Mode,
        sensor::{Packet, SensorId, SensorValue},
    },
    serial, LinkConfig, LinkError,
};

#[tokio::main]
async fn main() -> Result<(), LinkError> {
    simplelog::TermLogger::init(
        log::LevelFilter::Info,
        simplelog::Config::default(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Always,
    )
    .unwrap();

    let Some(port) = serial::find_ports()?.into_iter().next() else {
        error!("No USB serial ports found");
        return Ok(());
    };

    let mut link = serial::connect(&port.port_name, LinkConfig::default())?;
    link.initialize().await?;
    link.set_mode(Mode::Full).await?;

    let frames = link
        .start_stream(vec![
            Packet::from(SensorId::BumpsAndWheelDrops),
            Packet::from(SensorId::Distance),
            Packet::from(SensorId::Angle),
        ])
        .await?;

    // Creep forward and print odometry until the bumper is hit
    link.drive_straight(100).await?;

    let mut frames = frames.into_stream().take(400);
    while let Some(frame) = frames.next().await {
        info!(
            "#{} distance {:?} angle {:?}",
            frame.sequence,
            frame.value(SensorId::Distance).and_then(|v| v.as_i32()),
            frame.value(SensorId::Angle).and_then(|v| v.as_i32()),
        );

        if let Some(SensorValue::Bumps(bumps)) = frame.value(SensorId::BumpsAndWheelDrops) {
            if !bumps.is_empty() {
                warn!("Bumped: {:?}", bumps);
                break;
            }
        }
    }

    link.drive_stop().await?;

    if let Some(stats) = link.stream_stats() {
        info!(
            "{} frames received, {} rejected",
            stats.frames_received(),
            stats.frames_rejected()
        );
    }

    link.stop_stream().await?;
    link.close().await?;

    Ok(())
}
