//! The complete configuration of one sign.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::types::{
    DateInput, LineId, Page, PageId, PageParams, Schedule, ScheduleId, Variant, parse_date,
};

/// Start date given to new schedules when none is supplied.
pub const DEFAULT_SCHEDULE_START: &str = "00";

/// End date given to new schedules when none is supplied.
pub const DEFAULT_SCHEDULE_END: &str = "99";

/// Lines of pages, schedules and the default page of one sign.
///
/// This is both what gets persisted and what gets pushed to the sign.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignState {
    lines: BTreeMap<LineId, BTreeMap<PageId, Page>>,
    schedules: Vec<(ScheduleId, Schedule)>,
    default_page: PageId,
}

impl Default for SignState {
    fn default() -> Self {
        let mut lines = BTreeMap::new();
        lines.insert(LineId::default(), BTreeMap::new());
        Self {
            lines,
            schedules: Vec::new(),
            default_page: PageId::default(),
        }
    }
}

impl SignState {
    /// Creates a state holding an empty line 1.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates or updates a page.
    ///
    /// A new page starts from the defaults; an existing page only changes
    /// the fields whose new values are valid and different.
    pub fn update_line(
        &mut self,
        line: LineId,
        page: PageId,
        message: &str,
        params: PageParams,
        variant: Variant,
    ) -> &Page {
        self.lines
            .entry(line)
            .or_default()
            .entry(page)
            .and_modify(|existing| existing.apply(message, params, variant))
            .or_insert_with(|| Page::new(message, params, variant))
    }

    /// Creates or updates a schedule.
    ///
    /// An unknown schedule is created only when it is given pages and is
    /// active; any other update of an unknown schedule is an error and
    /// changes nothing. So is a page sequence with anything but page
    /// identifiers.
    pub fn update_schedule(
        &mut self,
        id: ScheduleId,
        pages: &str,
        active: bool,
        start: Option<DateInput>,
        end: Option<DateInput>,
    ) -> Result<&Schedule> {
        for c in pages.chars() {
            PageId::try_from(c)?;
        }

        let Some(index) = self.schedule_index(id) else {
            if pages.is_empty() || !active {
                return Err(Error::UnknownSchedule(id.as_char()));
            }
            let start = parse_date(start.unwrap_or_else(|| DEFAULT_SCHEDULE_START.into()))?;
            let end = parse_date(end.unwrap_or_else(|| DEFAULT_SCHEDULE_END.into()))?;
            self.schedules.push((id, Schedule::new(pages, start, end)));
            return Ok(&self.schedules[self.schedules.len() - 1].1);
        };

        // Parse both dates first so a bad one leaves the schedule untouched.
        let start = start.map(parse_date).transpose()?;
        let end = end.map(parse_date).transpose()?;

        let schedule = &mut self.schedules[index].1;
        schedule.activate(active);
        schedule.set_pages(pages);
        if let Some(start) = start {
            schedule.set_start(start)?;
        }
        if let Some(end) = end {
            schedule.set_end(end)?;
        }
        Ok(&*schedule)
    }

    fn schedule_index(&self, id: ScheduleId) -> Option<usize> {
        self.schedules.iter().position(|(sid, _)| *sid == id)
    }

    /// Looks up a page.
    #[must_use]
    pub fn page(&self, line: LineId, page: PageId) -> Option<&Page> {
        self.lines.get(&line)?.get(&page)
    }

    pub(crate) fn page_mut(&mut self, line: LineId, page: PageId) -> Option<&mut Page> {
        self.lines.get_mut(&line)?.get_mut(&page)
    }

    /// Looks up a schedule.
    #[must_use]
    pub fn schedule(&self, id: ScheduleId) -> Option<&Schedule> {
        self.schedules
            .iter()
            .find_map(|(sid, s)| (*sid == id).then_some(s))
    }

    pub(crate) fn schedule_mut(&mut self, id: ScheduleId) -> Option<&mut Schedule> {
        self.schedules
            .iter_mut()
            .find_map(|(sid, s)| (*sid == id).then_some(s))
    }

    /// Lines in ascending order, each with its pages in identifier order.
    pub fn lines(&self) -> impl Iterator<Item = (LineId, &BTreeMap<PageId, Page>)> {
        self.lines.iter().map(|(id, pages)| (*id, pages))
    }

    /// Schedules in the order they were created.
    pub fn schedules(&self) -> impl Iterator<Item = (ScheduleId, &Schedule)> {
        self.schedules.iter().map(|(id, s)| (*id, s))
    }

    /// Page shown when no schedule is running.
    #[must_use]
    pub const fn default_page(&self) -> PageId {
        self.default_page
    }

    pub(crate) fn set_default_page(&mut self, page: PageId) {
        self.default_page = page;
    }

    /// Number of pages and schedules with unpushed changes.
    #[must_use]
    pub fn dirty_count(&self) -> usize {
        let pages = self
            .lines
            .values()
            .flat_map(BTreeMap::values)
            .filter(|p| p.is_dirty())
            .count();
        let schedules = self.schedules.iter().filter(|(_, s)| s.is_dirty()).count();
        pages + schedules
    }
}

impl SignState {
    /// Returns a printable listing of every page and schedule.
    ///
    /// Pages are shown as their translated packets for `variant`.
    #[must_use]
    pub const fn summary(&self, variant: Variant) -> Summary<'_> {
        Summary {
            state: self,
            variant,
        }
    }
}

/// Listing of a [`SignState`], see [`SignState::summary`].
#[derive(Debug, Clone, Copy)]
pub struct Summary<'a> {
    state: &'a SignState,
    variant: Variant,
}

impl fmt::Display for Summary<'_> {
    /// Flags modified (`M`) items and active (`A`) or inactive (`N`)
    /// schedules.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (line, pages) in &self.state.lines {
            writeln!(f, "### LINE {line} ###")?;
            for (id, page) in pages {
                let m = if page.is_dirty() { "M " } else { "  " };
                writeln!(f, "{m}({id}) {}", page.packet_text(self.variant))?;
            }
        }
        writeln!(f, "### SCHEDULES ###")?;
        for (id, schedule) in &self.state.schedules {
            let m = if schedule.is_dirty() { "M " } else { "  " };
            let a = if schedule.is_active() { "A " } else { "N " };
            writeln!(f, "{m}{a}({id}) {}", schedule.packet())?;
        }
        Ok(())
    }
}
