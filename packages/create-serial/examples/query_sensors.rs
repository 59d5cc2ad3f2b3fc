use log::{error, info};
use create_serial::{
    protocol::sensor::{GroupId, SensorGroup, SensorId},
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

    // Use the first USB serial port unless one is given
    let port = match std::env::args().nth(1) {
        Some(port) => port,
        None => match serial::find_ports()?.into_iter().next() {
            Some(port) => port.port_name,
            None => {
                error!("No USB serial ports found");
                return Ok(());
            }
        },
    };

    let mut link = serial::connect(&port, LinkConfig::default())?;
    link.initialize().await?;

    // Battery and charging state
    let mut battery = SensorGroup::new(GroupId::Group3);
    link.query_one(&mut battery).await?;

    for sensor in battery.sensors() {
        if let Some(value) = sensor.value() {
            info!("{}: {}", sensor.sensor_id().name(), value);
        }
    }

    let mut bumps = SensorGroup::new(GroupId::Group1);
    link.query_one(&mut bumps).await?;
    info!(
        "Bumps: {}",
        bumps
            .value(SensorId::BumpsAndWheelDrops)
            .map(ToString::to_string)
            .unwrap_or_default()
    );

    link.close().await?;

    Ok(())
}
