//! Sign model and device-level settings.

use serde::{Deserialize, Serialize};

/// The sign hardware family being driven.
///
/// The two families share the protocol but differ in their display modes,
/// the first glyph of the character table, and whether batch brackets and
/// programmable graphics exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Variant {
    /// Monochrome board with the reduced display-mode set.
    Basic,
    /// Tri-color board with song modes, batch brackets and graphics.
    #[default]
    Extended,
}

impl Variant {
    /// Returns true if the sign understands `<BE>`/`<BF>` update brackets.
    #[must_use]
    pub const fn has_batch_brackets(self) -> bool {
        matches!(self, Self::Extended)
    }

    /// Returns true if the sign accepts programmed graphics.
    #[must_use]
    pub const fn has_graphics(self) -> bool {
        matches!(self, Self::Extended)
    }
}

/// Display brightness levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Brightness {
    /// 100%.
    Full,
    /// 75%.
    ThreeQuarters,
    /// 50%.
    Half,
    /// 25%.
    #[default]
    Quarter,
}

impl Brightness {
    /// Returns the protocol code for this level.
    #[must_use]
    pub const fn code(self) -> char {
        match self {
            Self::Full => 'A',
            Self::ThreeQuarters => 'B',
            Self::Half => 'C',
            Self::Quarter => 'D',
        }
    }
}
