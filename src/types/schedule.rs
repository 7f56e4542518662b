//! Schedule records and schedule dates.
//!
//! A schedule shows a sequence of pages between a start and an end date.
//! Dates travel on the wire as `YYMMDDHHMM` in the 2000s.

use std::fmt;

use chrono::{Datelike, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::error::DateError;
use crate::types::PageId;

/// Number of digits in a rendered schedule date.
pub const SCHEDULE_DATE_LEN: usize = 10;

/// A schedule date at minute resolution.
///
/// Fields are kept within their clamped ranges but the day is not checked
/// against the length of the month; the sign accepts e.g. February 31st.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ScheduleDate {
    year: u16,
    month: u8,
    day: u8,
    hour: u8,
    minute: u8,
}

impl ScheduleDate {
    /// Creates a date, clamping every field into range.
    #[must_use]
    pub fn new(year: u16, month: u8, day: u8, hour: u8, minute: u8) -> Self {
        Self {
            year: year.clamp(2000, 2099),
            month: month.clamp(1, 12),
            day: day.clamp(1, 31),
            hour: hour.min(23),
            minute: minute.min(59),
        }
    }

    /// Year, 2000..=2099.
    #[must_use]
    pub const fn year(&self) -> u16 {
        self.year
    }

    /// Month, 1..=12.
    #[must_use]
    pub const fn month(&self) -> u8 {
        self.month
    }

    /// Day, 1..=31.
    #[must_use]
    pub const fn day(&self) -> u8 {
        self.day
    }

    /// Hour, 0..=23.
    #[must_use]
    pub const fn hour(&self) -> u8 {
        self.hour
    }

    /// Minute, 0..=59.
    #[must_use]
    pub const fn minute(&self) -> u8 {
        self.minute
    }
}

impl Default for ScheduleDate {
    fn default() -> Self {
        Self::new(2000, 1, 1, 0, 0)
    }
}

impl From<NaiveDateTime> for ScheduleDate {
    fn from(dt: NaiveDateTime) -> Self {
        let year = u16::try_from(dt.year().clamp(2000, 2099)).unwrap_or(2000);
        Self::new(
            year,
            dt.month() as u8,
            dt.day() as u8,
            dt.hour() as u8,
            dt.minute() as u8,
        )
    }
}

impl fmt::Display for ScheduleDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:04}-{:02}-{:02} {:02}:{:02}",
            self.year, self.month, self.day, self.hour, self.minute
        )
    }
}

/// Renders a date as the sign's `YYMMDDHHMM`.
#[must_use]
pub fn render_schedule(date: &ScheduleDate) -> String {
    format!(
        "{:02}{:02}{:02}{:02}{:02}",
        date.year % 100,
        date.month,
        date.day,
        date.hour,
        date.minute
    )
}

/// Anything a schedule date can be given as.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DateInput {
    /// An already normalized date.
    Normalized(ScheduleDate),
    /// A calendar date and time; seconds are dropped.
    Calendar(NaiveDateTime),
    /// Digits `YYMMDDHHMM`, possibly truncated.
    Text(String),
}

impl From<ScheduleDate> for DateInput {
    fn from(date: ScheduleDate) -> Self {
        Self::Normalized(date)
    }
}

impl From<NaiveDateTime> for DateInput {
    fn from(dt: NaiveDateTime) -> Self {
        Self::Calendar(dt)
    }
}

impl From<&str> for DateInput {
    fn from(text: &str) -> Self {
        Self::Text(text.to_owned())
    }
}

impl From<String> for DateInput {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

/// Normalizes a date input.
///
/// Text is read in digit pairs for year, month, day, hour and minute.
/// Missing pairs default to 00, 01, 01, 00, 00 and each field is clamped
/// into range, so `"139942"` reads as 2013-12-31 00:00.
pub fn parse_date(input: impl Into<DateInput>) -> Result<ScheduleDate, DateError> {
    match input.into() {
        DateInput::Normalized(date) => Ok(date),
        DateInput::Calendar(dt) => Ok(ScheduleDate::from(dt)),
        DateInput::Text(text) => parse_digits(&text),
    }
}

fn parse_digits(text: &str) -> Result<ScheduleDate, DateError> {
    if !text.bytes().all(|b| b.is_ascii_digit()) {
        return Err(DateError::NotNumeric(text.to_owned()));
    }
    if text.len() > SCHEDULE_DATE_LEN {
        return Err(DateError::TooLong(text.to_owned()));
    }

    // A pair may be cut short by the end of the input.
    let field = |index: usize, default: u8| -> u8 {
        let start = index * 2;
        if start >= text.len() {
            return default;
        }
        let end = (start + 2).min(text.len());
        text[start..end].parse().unwrap_or(default)
    };

    Ok(ScheduleDate::new(
        2000 + u16::from(field(0, 0)),
        field(1, 1),
        field(2, 1),
        field(3, 0),
        field(4, 0),
    ))
}

/// Returns true if every character of `pages` is a page identifier.
#[must_use]
pub fn is_page_sequence(pages: &str) -> bool {
    pages.chars().all(|c| PageId::new(c).is_some())
}

/// A schedule: the pages to cycle through between two dates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schedule {
    start: ScheduleDate,
    end: ScheduleDate,
    pages: String,
    active: bool,
    dirty: bool,
}

impl Schedule {
    /// Creates an active, dirty schedule.
    #[must_use]
    pub fn new(pages: &str, start: ScheduleDate, end: ScheduleDate) -> Self {
        Self {
            start,
            end,
            pages: pages.to_owned(),
            active: true,
            dirty: true,
        }
    }

    /// Sets the start date. Always marks the schedule dirty.
    pub fn set_start(&mut self, input: impl Into<DateInput>) -> Result<ScheduleDate, DateError> {
        self.start = parse_date(input)?;
        self.dirty = true;
        Ok(self.start)
    }

    /// Sets the end date. Always marks the schedule dirty.
    pub fn set_end(&mut self, input: impl Into<DateInput>) -> Result<ScheduleDate, DateError> {
        self.end = parse_date(input)?;
        self.dirty = true;
        Ok(self.end)
    }

    /// Replaces the page sequence. Empty input, or input with anything but
    /// page identifiers, leaves it unchanged.
    pub fn set_pages(&mut self, pages: &str) -> &str {
        if !pages.is_empty() && is_page_sequence(pages) && self.pages != pages {
            pages.clone_into(&mut self.pages);
            self.dirty = true;
        }
        &self.pages
    }

    /// Activates or deactivates the schedule.
    ///
    /// An inactive schedule is deleted from the sign on the next push.
    pub fn activate(&mut self, active: bool) {
        if self.active != active {
            self.active = active;
            self.dirty = true;
        }
    }

    /// Start date.
    #[must_use]
    pub const fn start(&self) -> ScheduleDate {
        self.start
    }

    /// End date.
    #[must_use]
    pub const fn end(&self) -> ScheduleDate {
        self.end
    }

    /// Page identifiers shown in order.
    #[must_use]
    pub fn pages(&self) -> &str {
        &self.pages
    }

    /// Returns true if the schedule should exist on the sign.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active
    }

    /// Returns true if the schedule has changes not yet on the sign.
    #[must_use]
    pub const fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub(crate) fn mark_clean(&mut self) {
        self.dirty = false;
    }

    /// Schedule packet, without identifier or checksum.
    #[must_use]
    pub fn packet(&self) -> String {
        format!(
            "{}{}{}",
            render_schedule(&self.start),
            render_schedule(&self.end),
            self.pages
        )
    }
}
