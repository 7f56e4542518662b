//! Transport layer for sign communication.
//!
//! This module provides the abstraction for different transport methods.
//! Currently only USB/Serial is implemented.

#[cfg(test)]
pub(crate) mod mock;
pub mod serial;

use std::future::Future;
use std::pin::Pin;

use bytes::Bytes;

use crate::error::Result;

/// Trait for transport implementations.
///
/// The sign protocol is half-duplex: callers write one command, wait, then
/// drain whatever the sign answered before writing the next one.
pub trait Transport: Send + Sync {
    /// Connects to the device.
    fn connect(&mut self) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>>;

    /// Disconnects from the device. Does nothing if already disconnected.
    fn disconnect(&mut self) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>>;

    /// Writes raw bytes to the device.
    fn send(&mut self, data: Bytes) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>>;

    /// Reads every byte currently buffered, without waiting for more.
    fn read_available(&mut self) -> Pin<Box<dyn Future<Output = Result<Bytes>> + Send + '_>>;

    /// Returns true if connected.
    fn is_connected(&self) -> bool;
}

pub use serial::{SerialConfig, SerialTransport};
