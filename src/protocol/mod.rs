//! Protocol definitions for sign communication.
//!
//! This module contains the low-level protocol types including:
//! - Frame encoding and checksums
//! - Command bodies
//! - Character translation for message text
//! - Graphic bitmap encoding

pub mod command;
pub mod frame;
pub mod graphic;
pub mod translate;

pub use command::Command;
pub use frame::{ACK, BROADCAST_ADDRESS, checksum, encode as encode_frame, encode_raw};
pub use graphic::{BlockId, GraphicGrid, GraphicId, Pixel, encode_graphic};
pub use translate::{encode_latin1, translate};
