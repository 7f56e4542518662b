//! Main [`Sign`] client implementation.
//!
//! This module provides the high-level [`Sign`] client that combines the
//! transport, command handler, sign state and state store into one
//! interface. Local edits mark pages and schedules dirty;
//! [`Sign::push_changes`] sends only what changed.

use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDateTime;
use tokio::sync::Mutex;

use crate::commands::{CommandHandler, DEFAULT_BATCH_PAUSE, DEFAULT_SETTLE_DELAY};
use crate::error::{Error, Result};
use crate::protocol::graphic::{BlockId, GraphicGrid, GraphicId};
use crate::protocol::Command;
use crate::store::StateStore;
use crate::transport::{SerialConfig, SerialTransport, Transport};
use crate::types::{
    Brightness, DateInput, LineId, Page, PageId, PageParams, Schedule, ScheduleId, SignState,
    Summary, Variant,
};

/// Default sign address.
pub const DEFAULT_ADDRESS: u8 = 0x01;

/// Configuration of the sign being driven.
#[derive(Debug, Clone)]
pub struct SignConfig {
    /// Sign address on the bus. `0` broadcasts to every sign.
    pub address: u8,
    /// Hardware family.
    pub variant: Variant,
    /// Wait between writing a command and reading the reply.
    pub settle_delay: Duration,
    /// Pause around the batch brackets.
    pub batch_pause: Duration,
}

impl Default for SignConfig {
    fn default() -> Self {
        Self {
            address: DEFAULT_ADDRESS,
            variant: Variant::default(),
            settle_delay: DEFAULT_SETTLE_DELAY,
            batch_pause: DEFAULT_BATCH_PAUSE,
        }
    }
}

impl SignConfig {
    /// Creates a configuration with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the sign address.
    #[must_use]
    pub const fn address(mut self, address: u8) -> Self {
        self.address = address;
        self
    }

    /// Sets the hardware family.
    #[must_use]
    pub const fn variant(mut self, variant: Variant) -> Self {
        self.variant = variant;
        self
    }

    /// Sets the reply settle delay.
    #[must_use]
    pub const fn settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay = delay;
        self
    }

    /// Sets the batch bracket pause.
    #[must_use]
    pub const fn batch_pause(mut self, pause: Duration) -> Self {
        self.batch_pause = pause;
        self
    }
}

/// An item that [`Sign::push_changes`] tried to send.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushItem {
    /// A page on a line.
    Page { line: LineId, page: PageId },
    /// A schedule, either stored or deleted.
    Schedule(ScheduleId),
}

/// Outcome of a push.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PushReport {
    /// Items sent.
    pub attempted: usize,
    /// Items the sign acknowledged.
    pub succeeded: usize,
    /// Items that failed and are still dirty.
    pub failed: Vec<PushItem>,
    /// Whether the state was saved afterwards.
    pub persisted: bool,
}

impl PushReport {
    /// Returns true if every attempted item was acknowledged.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Client for one sign.
pub struct Sign<T> {
    commands: CommandHandler<T>,
    variant: Variant,
    state: SignState,
    store: Option<Box<dyn StateStore>>,
    restored: bool,
}

impl Sign<SerialTransport> {
    /// Creates a new client for a serial port with default settings.
    ///
    /// # Arguments
    ///
    /// * `port` - Serial port path (e.g., "/dev/ttyUSB0")
    ///
    /// # Returns
    ///
    /// A new client (not yet connected).
    #[must_use]
    pub fn serial(port: impl Into<String>) -> Self {
        Self::with_serial_config(SerialConfig::new(port), SignConfig::default())
    }

    /// Creates a new client with custom serial and sign configuration.
    #[must_use]
    pub fn with_serial_config(serial: SerialConfig, config: SignConfig) -> Self {
        Self::new(SerialTransport::new(serial), config)
    }
}

impl<T: Transport + 'static> Sign<T> {
    /// Creates a new client with the given transport.
    #[must_use]
    pub fn new(transport: T, config: SignConfig) -> Self {
        let mut commands = CommandHandler::new(Arc::new(Mutex::new(transport)), config.address);
        commands.set_settle_delay(config.settle_delay);
        commands.set_batch_pause(config.batch_pause);

        Self {
            commands,
            variant: config.variant,
            state: SignState::new(),
            store: None,
            restored: false,
        }
    }

    /// Attaches a store that keeps the state between runs.
    #[must_use]
    pub fn with_store(mut self, store: impl StateStore + 'static) -> Self {
        self.store = Some(Box::new(store));
        self
    }

    /// Restores saved state and connects to the sign.
    ///
    /// Saved state is restored by the first `open` only, even when the
    /// connection fails, so edits can still be prepared; every device
    /// operation then fails with [`Error::NotConnected`] until a later
    /// `open` succeeds. Later calls keep the in-memory state.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection cannot be established.
    pub async fn open(&mut self) -> Result<()> {
        if !self.restored {
            self.load_state();
            self.restored = true;
        }

        let result = {
            let mut transport = self.commands.transport().lock().await;
            transport.connect().await
        };
        match &result {
            Ok(()) => tracing::info!("sign {:02x} ready", self.address()),
            Err(e) => tracing::warn!("failed to connect to sign {:02x}: {}", self.address(), e),
        }
        result
    }

    /// Closes the connection. Safe to call more than once.
    pub async fn close(&mut self) -> Result<()> {
        let mut transport = self.commands.transport().lock().await;
        transport.disconnect().await
    }

    /// Returns true if connected.
    pub async fn is_connected(&self) -> bool {
        let transport = self.commands.transport().lock().await;
        transport.is_connected()
    }

    /// Replaces the in-memory state with the saved one, if there is one.
    pub fn load_state(&mut self) {
        let Some(store) = &self.store else {
            return;
        };
        match store.load(self.address()) {
            Ok(Some(state)) => self.state = state,
            Ok(None) => tracing::debug!("no saved state for sign {:02x}", self.address()),
            Err(e) => tracing::warn!("ignoring saved state: {}", e),
        }
    }

    /// Saves the state. Failures are logged; the in-memory state stays.
    fn persist(&self) -> bool {
        let Some(store) = &self.store else {
            return false;
        };
        match store.save(self.address(), &self.state) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!("failed to save state: {}", e);
                false
            }
        }
    }

    /// Returns the sign address.
    #[must_use]
    pub const fn address(&self) -> u8 {
        self.commands.address()
    }

    /// Returns the hardware family.
    #[must_use]
    pub const fn variant(&self) -> Variant {
        self.variant
    }

    /// Returns the current state.
    #[must_use]
    pub const fn state(&self) -> &SignState {
        &self.state
    }

    /// Returns a printable listing of pages and schedules.
    #[must_use]
    pub const fn summary(&self) -> Summary<'_> {
        self.state.summary(self.variant)
    }

    /// Looks up a page.
    #[must_use]
    pub fn page(&self, line: LineId, page: PageId) -> Option<&Page> {
        self.state.page(line, page)
    }

    /// Looks up a schedule.
    #[must_use]
    pub fn schedule(&self, id: ScheduleId) -> Option<&Schedule> {
        self.state.schedule(id)
    }

    // ==================== Local Edits ====================

    /// Creates or updates a page on a line.
    pub fn update_line(
        &mut self,
        page: char,
        message: &str,
        line: char,
        params: PageParams,
    ) -> Result<&Page> {
        let line = LineId::try_from(line)?;
        let page = PageId::try_from(page)?;
        Ok(self
            .state
            .update_line(line, page, message, params, self.variant))
    }

    /// Creates or updates a schedule.
    ///
    /// Dates left as `None` keep their current value, or take the widest
    /// window for a new schedule.
    pub fn update_schedule(
        &mut self,
        id: char,
        pages: &str,
        active: bool,
        start: Option<DateInput>,
        end: Option<DateInput>,
    ) -> Result<&Schedule> {
        let id = ScheduleId::try_from(id)?;
        self.state.update_schedule(id, pages, active, start, end)
    }

    // ==================== Synchronisation ====================

    /// Sends every changed page and schedule to the sign.
    ///
    /// With `reset`, the sign is wiped first and everything is sent
    /// regardless of its dirty flag. Items fail independently: a rejected
    /// item stays dirty for the next push and the rest of the batch still
    /// goes out. When anything succeeded the state is saved.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotConnected`] before sending anything if the sign
    /// is not connected. Per-item failures are reported, not returned.
    pub async fn push_changes(&mut self, reset: bool) -> Result<PushReport> {
        if !self.is_connected().await {
            return Err(Error::NotConnected);
        }

        let mut report = PushReport::default();
        if !reset && self.state.dirty_count() == 0 {
            tracing::info!("no changes to push");
            return Ok(report);
        }

        if reset {
            self.send_unchecked(&Command::Reset).await;
        }

        let brackets = self.variant.has_batch_brackets();
        if brackets {
            self.send_unchecked(&Command::BeginBatch).await;
        }

        let pages: Vec<(LineId, PageId)> = self
            .state
            .lines()
            .flat_map(|(line, pages)| {
                pages
                    .iter()
                    .filter(move |(_, page)| reset || page.is_dirty())
                    .map(move |(id, _)| (line, *id))
            })
            .collect();

        for (line, page) in pages {
            report.attempted += 1;
            match self.push_page(line, page).await {
                Ok(()) => report.succeeded += 1,
                Err(e) => {
                    tracing::warn!("page {} on line {} failed: {}", page, line, e);
                    report.failed.push(PushItem::Page { line, page });
                }
            }
        }

        let schedules: Vec<ScheduleId> = self
            .state
            .schedules()
            .filter(|(_, schedule)| reset || schedule.is_dirty())
            .map(|(id, _)| id)
            .collect();

        for id in schedules {
            report.attempted += 1;
            match self.push_schedule(id).await {
                Ok(()) => report.succeeded += 1,
                Err(e) => {
                    tracing::warn!("schedule {} failed: {}", id, e);
                    report.failed.push(PushItem::Schedule(id));
                }
            }
        }

        if brackets {
            tokio::time::sleep(self.commands.batch_pause()).await;
            self.send_unchecked(&Command::EndBatch).await;
        }

        if report.attempted != report.succeeded {
            tracing::warn!(
                "only {} of {} changes reached the sign",
                report.succeeded,
                report.attempted
            );
        }

        if report.succeeded > 0 {
            tracing::info!("changes pushed");
            report.persisted = self.persist();
        }

        Ok(report)
    }

    async fn push_page(&mut self, line: LineId, id: PageId) -> Result<()> {
        let Some(page) = self.state.page(line, id) else {
            return Ok(());
        };
        let command = Command::UpdatePage {
            line,
            page: id,
            packet: page.packet(self.variant)?,
        };
        self.commands.execute(&command).await?;

        if let Some(page) = self.state.page_mut(line, id) {
            tracing::info!("page {} OK - {}", id, page.message());
            page.mark_clean();
        }
        Ok(())
    }

    async fn push_schedule(&mut self, id: ScheduleId) -> Result<()> {
        let Some(schedule) = self.state.schedule(id) else {
            return Ok(());
        };
        let command = if schedule.is_active() {
            Command::UpsertSchedule {
                id,
                packet: schedule.packet(),
            }
        } else {
            Command::DeleteSchedule(id)
        };
        self.commands.execute(&command).await?;

        if let Some(schedule) = self.state.schedule_mut(id) {
            if schedule.is_active() {
                tracing::info!("schedule {} OK - {}", id, schedule.pages());
            } else {
                tracing::info!("schedule {} OK - deletion", id);
            }
            schedule.mark_clean();
        }
        Ok(())
    }

    /// Sends a command whose failure does not stop a push.
    async fn send_unchecked(&self, command: &Command) {
        if let Err(e) = self.commands.execute(command).await {
            tracing::warn!("{} failed: {}", command.name(), e);
        }
    }

    // ==================== Device Commands ====================

    /// Sets the page shown when no schedule is running.
    ///
    /// The page is remembered locally even if the sign rejects it.
    pub async fn default_run_page(&mut self, page: char) -> Result<PageId> {
        let page = PageId::try_from(page)?;
        self.state.set_default_page(page);
        self.run(&Command::DefaultRunPage(page)).await?;
        Ok(page)
    }

    /// Sets the sign's clock to the local time.
    pub async fn set_clock(&self) -> Result<()> {
        self.set_clock_at(chrono::Local::now().naive_local()).await
    }

    /// Sets the sign's clock.
    pub async fn set_clock_at(&self, now: NaiveDateTime) -> Result<()> {
        self.run(&Command::SetClock(now)).await
    }

    /// Sets the display brightness.
    pub async fn brightness(&self, level: Brightness) -> Result<()> {
        self.run(&Command::Brightness(level)).await
    }

    /// Assigns a new address to the sign.
    ///
    /// This client keeps talking to the old address; create a new client
    /// for the new one.
    pub async fn set_address(&self, address: u8) -> Result<()> {
        self.run(&Command::set_address(address)?).await
    }

    /// Programs one block of a graphic slot from grid text.
    pub async fn program_graphic(&self, graphic: char, block: char, grid: &str) -> Result<()> {
        if !self.variant.has_graphics() {
            return Err(Error::Unsupported("programmable graphics"));
        }
        let command = Command::ProgramGraphic {
            graphic: GraphicId::try_from(graphic)?,
            block: BlockId::try_from(block)?,
            payload: GraphicGrid::parse(grid)?.encode(),
        };
        self.run(&command).await
    }

    async fn run(&self, command: &Command) -> Result<()> {
        match self.commands.execute(command).await {
            Ok(()) => {
                tracing::info!("{} - OK", command.name());
                Ok(())
            }
            Err(e) => {
                tracing::warn!("{} - failed: {}", command.name(), e);
                Err(e)
            }
        }
    }
}
