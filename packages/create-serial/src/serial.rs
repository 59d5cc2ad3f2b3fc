//! Discovering and opening robots connected over a USB serial cable.

use log::{debug, info};
use serialport::{SerialPortInfo, SerialPortType};
use tokio_serial::SerialStream;

use crate::{config::LinkConfig, error::LinkError, link::Link};

/// USB vendor ID of FTDI, whose USB-serial chip is in the Create 2 cable.
pub const FTDI_USB_VID: u16 = 0x0403;

fn is_call_in_device(port: &SerialPortInfo) -> bool {
    // https://pbxbook.com/other/mac-tty.html
    cfg!(target_os = "macos") && port.port_name.starts_with("/dev/tty.")
}

/// Lists USB serial ports a robot may be connected to.
///
/// Ports behind an FTDI adapter come first. Other USB serial adapters are
/// listed after them, since third-party cables are common.
pub fn find_ports() -> Result<Vec<SerialPortInfo>, LinkError> {
    let mut ports = Vec::new();

    for port in tokio_serial::available_ports()? {
        let SerialPortType::UsbPort(info) = &port.port_type else {
            continue;
        };

        if is_call_in_device(&port) {
            debug!(
                "Ignoring port named {:?} because it is a call-in device",
                port.port_name
            );
            continue;
        }

        debug!(
            "Found USB serial port {} (vid {:04x}, pid {:04x})",
            port.port_name, info.vid, info.pid
        );
        ports.push(port);
    }

    ports.sort_by_key(|port| match &port.port_type {
        SerialPortType::UsbPort(info) => info.vid != FTDI_USB_VID,
        _ => true,
    });

    Ok(ports)
}

/// Opens `port` at the configured baud rate, 8N1, no flow control.
pub fn open(port: &str, config: &LinkConfig) -> Result<SerialStream, LinkError> {
    let stream = SerialStream::open(
        &tokio_serial::new(port, config.baud_rate)
            .data_bits(tokio_serial::DataBits::Eight)
            .parity(tokio_serial::Parity::None)
            .stop_bits(tokio_serial::StopBits::One)
            .flow_control(tokio_serial::FlowControl::None)
            .timeout(config.read_timeout),
    )?;

    info!("Opened {} at {} baud", port, config.baud_rate);

    Ok(stream)
}

/// Opens `port` and wraps it in a [`Link`].
pub fn connect(port: &str, config: LinkConfig) -> Result<Link<SerialStream>, LinkError> {
    let stream = open(port, &config)?;
    Ok(Link::new(stream, config))
}
