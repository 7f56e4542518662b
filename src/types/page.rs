//! Page configuration records.
//!
//! A page is one message on a line together with its animation settings.
//! Every setter validates against the field's alphabet: an invalid or
//! unchanged value is ignored, a new valid value is stored and marks the
//! page dirty.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::protocol::translate;
use crate::types::Variant;

/// Lead-in effects: immediate, xopen, curtain up/down, scroll left/right,
/// vopen, vclose, scroll up/down, hold, snow, twinkle, block move, random
/// and the pen-writing animations.
pub const LEAD_IN_EFFECTS: &str = "ABCDEFGHIJKLMNOPQRS";

/// Lead-out effects: immediate through hold.
pub const LEAD_OUT_EFFECTS: &str = "ABCDEFGHIJK";

/// Wait times from 0.5s up to 25s. `T` is not accepted by the firmware.
pub const WAIT_TIMES: &str = "ABCDEFGHIJKLMNOPQRSUVWXYZ";

/// Display speed tier, 1 (fastest) to 4.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Speed {
    /// Tier 1.
    Tier1,
    /// Tier 2.
    Tier2,
    /// Tier 3.
    Tier3,
    /// Tier 4.
    Tier4,
}

/// Display style class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Style {
    /// Steady text.
    Normal,
    /// Blinking text.
    Blink,
    /// Text with the first melody.
    Song1,
    /// Text with the second melody.
    Song2,
    /// Text with the third melody.
    Song3,
}

const SPEEDS: [Speed; 4] = [Speed::Tier1, Speed::Tier2, Speed::Tier3, Speed::Tier4];
const STYLES: [Style; 5] = [
    Style::Normal,
    Style::Blink,
    Style::Song1,
    Style::Song2,
    Style::Song3,
];

/// Display mode codes, one row per speed tier, one column per style.
const DISPLAY_MODES: [[char; 5]; 4] = [
    ['A', 'B', 'C', 'D', 'E'],
    ['Q', 'R', 'S', 'T', 'U'],
    ['a', 'b', 'c', 'd', 'e'],
    ['q', 'r', 's', 't', 'u'],
];

/// A display mode as a (speed, style) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DisplayMode {
    /// Speed tier.
    pub speed: Speed,
    /// Style class.
    pub style: Style,
}

impl DisplayMode {
    /// Looks up the protocol code, if the variant supports this mode.
    #[must_use]
    pub fn code(self, variant: Variant) -> Option<char> {
        let supported = match variant {
            Variant::Basic => matches!(self.style, Style::Normal | Style::Blink),
            Variant::Extended => true,
        };
        supported.then(|| DISPLAY_MODES[self.speed as usize][self.style as usize])
    }

    /// Decodes a protocol code for the given variant.
    #[must_use]
    pub fn from_code(code: char, variant: Variant) -> Option<Self> {
        for (speed, row) in SPEEDS.into_iter().zip(DISPLAY_MODES) {
            for (style, c) in STYLES.into_iter().zip(row) {
                if c == code {
                    let mode = Self { speed, style };
                    return mode.code(variant).map(|_| mode);
                }
            }
        }
        None
    }
}

/// Returns the display mode code for a speed and style.
#[must_use]
pub fn display_mode(variant: Variant, speed: Speed, style: Style) -> Option<char> {
    DisplayMode { speed, style }.code(variant)
}

/// Animation settings applied when creating or updating a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageParams {
    /// Lead-in effect code.
    pub lead_in: char,
    /// Display mode code.
    pub display_mode: char,
    /// Wait time code.
    pub wait_time: char,
    /// Lead-out effect code.
    pub lead_out: char,
}

impl Default for PageParams {
    fn default() -> Self {
        Self {
            lead_in: 'E',
            display_mode: 'Q',
            wait_time: 'A',
            lead_out: 'E',
        }
    }
}

/// A page: message text plus animation settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    lead_in: char,
    display_mode: char,
    wait_time: char,
    lead_out: char,
    message: String,
    dirty: bool,
}

impl Page {
    /// Creates a dirty page. Invalid settings fall back to the defaults.
    #[must_use]
    pub fn new(message: &str, params: PageParams, variant: Variant) -> Self {
        let defaults = PageParams::default();
        let mut page = Self {
            lead_in: defaults.lead_in,
            display_mode: defaults.display_mode,
            wait_time: defaults.wait_time,
            lead_out: defaults.lead_out,
            message: String::new(),
            dirty: true,
        };
        page.apply(message, params, variant);
        page
    }

    /// Applies a message and settings through the validating setters.
    pub fn apply(&mut self, message: &str, params: PageParams, variant: Variant) {
        self.set_message(message);
        self.set_lead_in(params.lead_in);
        self.set_display_mode(params.display_mode, variant);
        self.set_wait_time(params.wait_time);
        self.set_lead_out(params.lead_out);
    }

    fn set_field(field: &mut char, value: char, alphabet: &str, dirty: &mut bool) -> char {
        if *field != value && alphabet.contains(value) {
            *field = value;
            *dirty = true;
        }
        *field
    }

    /// Sets the lead-in effect.
    pub fn set_lead_in(&mut self, fx: char) -> char {
        Self::set_field(&mut self.lead_in, fx, LEAD_IN_EFFECTS, &mut self.dirty)
    }

    /// Sets the display mode, validated against the variant's modes.
    pub fn set_display_mode(&mut self, mx: char, variant: Variant) -> char {
        if self.display_mode != mx && DisplayMode::from_code(mx, variant).is_some() {
            self.display_mode = mx;
            self.dirty = true;
        }
        self.display_mode
    }

    /// Sets the wait time.
    pub fn set_wait_time(&mut self, wx: char) -> char {
        Self::set_field(&mut self.wait_time, wx, WAIT_TIMES, &mut self.dirty)
    }

    /// Sets the lead-out effect.
    pub fn set_lead_out(&mut self, fy: char) -> char {
        Self::set_field(&mut self.lead_out, fy, LEAD_OUT_EFFECTS, &mut self.dirty)
    }

    /// Replaces the message. Empty text leaves the message unchanged.
    pub fn set_message(&mut self, text: &str) -> &str {
        if !text.is_empty() && self.message != text {
            text.clone_into(&mut self.message);
            self.dirty = true;
        }
        &self.message
    }

    /// Lead-in effect code.
    #[must_use]
    pub const fn lead_in(&self) -> char {
        self.lead_in
    }

    /// Display mode code.
    #[must_use]
    pub const fn display_mode(&self) -> char {
        self.display_mode
    }

    /// Wait time code.
    #[must_use]
    pub const fn wait_time(&self) -> char {
        self.wait_time
    }

    /// Lead-out effect code.
    #[must_use]
    pub const fn lead_out(&self) -> char {
        self.lead_out
    }

    /// Untranslated message text.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns true if the page has changes not yet on the sign.
    #[must_use]
    pub const fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub(crate) fn mark_clean(&mut self) {
        self.dirty = false;
    }

    /// Page packet as text, without line, page identifier or checksum.
    ///
    /// The message is translated; characters are not yet wire-encoded.
    #[must_use]
    pub fn packet_text(&self, variant: Variant) -> String {
        format!(
            "<F{}><M{}><W{}><F{}>{}",
            self.lead_in,
            self.display_mode,
            self.wait_time,
            self.lead_out,
            translate::translate(&self.message, variant)
        )
    }

    /// Page packet as wire bytes.
    pub fn packet(&self, variant: Variant) -> Result<Vec<u8>> {
        translate::encode_latin1(&self.packet_text(variant))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clean_page() -> Page {
        let mut page = Page::new("HELLO", PageParams::default(), Variant::Extended);
        page.mark_clean();
        page
    }

    #[test]
    fn test_new_page_is_dirty_with_defaults() {
        let page = Page::new("HELLO", PageParams::default(), Variant::Extended);
        assert!(page.is_dirty());
        assert_eq!(page.packet_text(Variant::Extended), "<FE><MQ><WA><FE>HELLO");
    }

    #[test]
    fn test_invalid_creation_params_fall_back() {
        let params = PageParams {
            lead_in: 'Z',
            display_mode: 'C',
            wait_time: 'T',
            lead_out: 'L',
        };
        let page = Page::new("x", params, Variant::Basic);
        assert_eq!(page.lead_in(), 'E');
        assert_eq!(page.display_mode(), 'Q');
        assert_eq!(page.wait_time(), 'A');
        assert_eq!(page.lead_out(), 'E');
    }

    #[test]
    fn test_valid_setter_marks_dirty() {
        let mut page = clean_page();
        assert_eq!(page.set_lead_in('A'), 'A');
        assert!(page.is_dirty());
    }

    #[test]
    fn test_same_value_is_noop() {
        let mut page = clean_page();
        assert_eq!(page.set_lead_in('E'), 'E');
        assert_eq!(page.set_message("HELLO"), "HELLO");
        assert!(!page.is_dirty());
    }

    #[test]
    fn test_invalid_value_is_noop() {
        let mut page = clean_page();
        assert_eq!(page.set_lead_in('T'), 'E');
        assert_eq!(page.set_lead_out('L'), 'E');
        assert_eq!(page.set_display_mode('z', Variant::Extended), 'Q');
        assert!(!page.is_dirty());
    }

    #[test]
    fn test_wait_time_excludes_t() {
        let mut page = clean_page();
        assert_eq!(page.set_wait_time('T'), 'A');
        assert!(!page.is_dirty());
        assert_eq!(page.set_wait_time('S'), 'S');
        assert_eq!(page.set_wait_time('U'), 'U');
        assert_eq!(WAIT_TIMES.len(), 25);
    }

    #[test]
    fn test_empty_message_is_noop() {
        let mut page = clean_page();
        assert_eq!(page.set_message(""), "HELLO");
        assert!(!page.is_dirty());
    }

    #[test]
    fn test_display_mode_by_variant() {
        let mut page = clean_page();
        assert_eq!(page.set_display_mode('C', Variant::Basic), 'Q');
        assert!(!page.is_dirty());
        assert_eq!(page.set_display_mode('C', Variant::Extended), 'C');
        assert!(page.is_dirty());
    }

    #[test]
    fn test_display_mode_table() {
        assert_eq!(
            display_mode(Variant::Extended, Speed::Tier1, Style::Normal),
            Some('A')
        );
        assert_eq!(
            display_mode(Variant::Extended, Speed::Tier2, Style::Song3),
            Some('U')
        );
        assert_eq!(
            display_mode(Variant::Extended, Speed::Tier4, Style::Blink),
            Some('r')
        );
        assert_eq!(display_mode(Variant::Basic, Speed::Tier3, Style::Song1), None);

        let basic: String = "ABCDEQRSTUabcdeqrstu"
            .chars()
            .filter(|c| DisplayMode::from_code(*c, Variant::Basic).is_some())
            .collect();
        assert_eq!(basic, "ABQRabqr");
    }

    #[test]
    fn test_display_mode_round_trip() {
        let mode = DisplayMode::from_code('s', Variant::Extended).unwrap();
        assert_eq!(mode.speed, Speed::Tier4);
        assert_eq!(mode.style, Style::Song1);
        assert_eq!(mode.code(Variant::Extended), Some('s'));
    }

    #[test]
    fn test_packet_translates_but_stores_source() {
        let mut page = clean_page();
        page.set_message("1α");
        assert_eq!(page.message(), "1α");
        assert_eq!(page.packet(Variant::Extended).unwrap(), b"<FE><MQ><WA><FE>1<U14>");
    }
}
