//! Serial/USB transport implementation.
//!
//! This module provides serial port communication for signs connected
//! through an RS-232/RS-485 adapter.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use bytes::{Bytes, BytesMut};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio_serial::{DataBits, Parity, SerialPort, SerialPortBuilderExt, SerialStream, StopBits};

use crate::error::{Error, Result};
use crate::protocol::frame::hex_dump;
use crate::transport::Transport;

/// Default baud rate for sign boards.
pub const DEFAULT_BAUD_RATE: u32 = 9600;

/// Default connection delay.
pub const DEFAULT_CONNECTION_DELAY: Duration = Duration::from_millis(100);

/// Configuration for serial transport.
///
/// Framing is fixed at 8 data bits, no parity, one stop bit.
#[derive(Debug, Clone)]
pub struct SerialConfig {
    /// Serial port path (e.g., "/dev/ttyUSB0" or "COM3").
    pub port: String,
    /// Baud rate.
    pub baud_rate: u32,
    /// Delay after connection before sending commands.
    pub connection_delay: Duration,
}

impl SerialConfig {
    /// Creates a new serial configuration with default settings.
    #[must_use]
    pub fn new(port: impl Into<String>) -> Self {
        Self {
            port: port.into(),
            baud_rate: DEFAULT_BAUD_RATE,
            connection_delay: DEFAULT_CONNECTION_DELAY,
        }
    }

    /// Sets the baud rate.
    #[must_use]
    pub const fn baud_rate(mut self, rate: u32) -> Self {
        self.baud_rate = rate;
        self
    }

    /// Sets the connection delay.
    #[must_use]
    pub const fn connection_delay(mut self, delay: Duration) -> Self {
        self.connection_delay = delay;
        self
    }
}

/// Serial transport for sign communication.
pub struct SerialTransport {
    config: SerialConfig,
    stream: Option<SerialStream>,
}

impl SerialTransport {
    /// Creates a new serial transport with the given configuration.
    #[must_use]
    pub const fn new(config: SerialConfig) -> Self {
        Self {
            config,
            stream: None,
        }
    }

    /// Creates a new serial transport for the given port with default settings.
    #[must_use]
    pub fn with_port(port: impl Into<String>) -> Self {
        Self::new(SerialConfig::new(port))
    }

    /// Returns the configuration.
    #[must_use]
    pub const fn config(&self) -> &SerialConfig {
        &self.config
    }
}

/// Reads whatever the port has buffered right now.
async fn drain(stream: &mut SerialStream) -> Result<Bytes> {
    let mut out = BytesMut::new();
    loop {
        let pending = stream.bytes_to_read().map_err(Error::Serial)? as usize;
        if pending == 0 {
            break;
        }
        let start = out.len();
        out.resize(start + pending, 0);
        stream
            .read_exact(&mut out[start..])
            .await
            .map_err(Error::Io)?;
    }
    Ok(out.freeze())
}

impl Transport for SerialTransport {
    fn connect(&mut self) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        Box::pin(async move {
            if self.stream.is_some() {
                return Ok(());
            }

            tracing::info!("connecting to serial port: {}", self.config.port);

            let mut stream = tokio_serial::new(&self.config.port, self.config.baud_rate)
                .data_bits(DataBits::Eight)
                .parity(Parity::None)
                .stop_bits(StopBits::One)
                .open_native_async()
                .map_err(Error::Serial)?;

            // Wait for the adapter to settle
            tokio::time::sleep(self.config.connection_delay).await;

            // Drop anything the sign sent before we were listening
            let stale = drain(&mut stream).await?;
            if !stale.is_empty() {
                tracing::debug!("drained {} stale bytes from buffer", stale.len());
            }

            self.stream = Some(stream);
            tracing::info!("connected to serial port");
            Ok(())
        })
    }

    fn disconnect(&mut self) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        Box::pin(async move {
            if self.stream.take().is_some() {
                tracing::info!("disconnected from serial port");
            }
            Ok(())
        })
    }

    fn send(&mut self, data: Bytes) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        Box::pin(async move {
            let stream = self.stream.as_mut().ok_or(Error::NotConnected)?;

            tracing::trace!("sending {} bytes: {}", data.len(), hex_dump(&data));

            stream.write_all(&data).await.map_err(Error::Io)?;
            stream.flush().await.map_err(Error::Io)?;

            Ok(())
        })
    }

    fn read_available(&mut self) -> Pin<Box<dyn Future<Output = Result<Bytes>> + Send + '_>> {
        Box::pin(async move {
            let stream = self.stream.as_mut().ok_or(Error::NotConnected)?;
            let data = drain(stream).await?;
            tracing::trace!("received {} bytes", data.len());
            Ok(data)
        })
    }

    fn is_connected(&self) -> bool {
        self.stream.is_some()
    }
}
