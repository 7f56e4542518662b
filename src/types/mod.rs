//! Data types for sign configuration.
//!
//! This module contains the core data structures used throughout the library:
//! - Line, page and schedule identifiers
//! - Pages and their animation settings
//! - Schedules and schedule dates
//! - The aggregate sign state
//! - Sign variants and device settings

pub mod device;
pub mod ids;
pub mod page;
pub mod schedule;
pub mod state;

pub use device::{Brightness, Variant};
pub use ids::{LineId, PageId, ScheduleId};
pub use page::{DisplayMode, Page, PageParams, Speed, Style, display_mode};
pub use schedule::{DateInput, Schedule, ScheduleDate, parse_date, render_schedule};
pub use state::{SignState, Summary};
