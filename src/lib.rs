//! # ledsign
//!
//! A Rust client library for serial-attached LED message signs.
//!
//! This library keeps a local model of a sign's pages and schedules and
//! pushes only what changed over an RS-232/RS-485 link.
//!
//! ## Features
//!
//! - Async/await based API using Tokio
//! - Dirty tracking so a push sends only changed items
//! - Character translation for the sign's glyph set
//! - Pixel graphic encoding for extended signs
//! - State persistence between runs
//!
//! ## Quick Start
//!
//! ```no_run
//! use ledsign::{FileStore, PageParams, Sign};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), ledsign::Error> {
//!     // Connect to the sign on address 01
//!     let mut sign = Sign::serial("/dev/ttyUSB0").with_store(FileStore::default());
//!     sign.open().await?;
//!
//!     // Edit page A of line 1
//!     sign.update_line('A', "HELLO", '1', PageParams::default())?;
//!
//!     // Send the changes
//!     let report = sign.push_changes(false).await?;
//!     println!("{} of {} changes sent", report.succeeded, report.attempted);
//!
//!     sign.close().await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! The library is organized into several modules:
//!
//! - [`protocol`] - Wire format (frames, commands, translation, graphics)
//! - [`types`] - Data structures (identifiers, pages, schedules, sign state)
//! - [`transport`] - Transport implementations (currently serial)
//! - [`commands`] - Command handler running the reply protocol
//! - [`store`] - State persistence
//! - [`client`] - High-level [`Sign`] client

pub mod client;
pub mod commands;
pub mod error;
pub mod protocol;
pub mod store;
pub mod transport;
pub mod types;

// Re-exports for convenience
pub use client::{PushItem, PushReport, Sign, SignConfig};
pub use commands::CommandHandler;
pub use error::{DateError, Error, GraphicError, Result};
pub use protocol::{Command, GraphicGrid, Pixel, encode_graphic, translate};
pub use store::{FileStore, MemoryStore, StateStore};
pub use transport::{SerialConfig, SerialTransport, Transport};
pub use types::{
    Brightness, DateInput, DisplayMode, LineId, Page, PageId, PageParams, Schedule, ScheduleDate,
    ScheduleId, SignState, Speed, Style, Summary, Variant, display_mode, parse_date,
};
