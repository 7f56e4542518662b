//! Packed bitmap encoding for programmable graphics.
//!
//! A graphic is 8 rows by 32 columns of tri-color pixels, written as text
//! with one character per pixel:
//!
//! | Char | Pixel  | Bits |
//! |------|--------|------|
//! | `@`  | off    | `00` |
//! | `A`  | red    | `10` |
//! | `D`  | green  | `01` |
//! | `E`  | yellow | `11` |
//!
//! The payload is four 8×8 blocks left to right. Each block row takes two
//! bytes of four pixels each, leftmost pixel in the top bits.

use std::fmt;

use crate::error::GraphicError;

/// Pixel rows in a graphic.
pub const GRAPHIC_ROWS: usize = 8;

/// Pixel columns in a graphic.
pub const GRAPHIC_COLUMNS: usize = 32;

/// Columns in one block.
pub const BLOCK_COLUMNS: usize = 8;

/// Encoded payload size.
pub const PAYLOAD_LEN: usize = GRAPHIC_ROWS * GRAPHIC_COLUMNS / 4;

/// A pixel color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Pixel {
    /// Unlit.
    #[default]
    Off,
    /// Red.
    Red,
    /// Green.
    Green,
    /// Red and green together.
    Yellow,
}

impl Pixel {
    /// Parses a grid character. Unknown characters are off.
    #[must_use]
    pub const fn from_char(c: char) -> Self {
        match c {
            'A' => Self::Red,
            'D' => Self::Green,
            'E' => Self::Yellow,
            _ => Self::Off,
        }
    }

    /// Returns the grid character.
    #[must_use]
    pub const fn as_char(self) -> char {
        match self {
            Self::Off => '@',
            Self::Red => 'A',
            Self::Green => 'D',
            Self::Yellow => 'E',
        }
    }

    const fn bits(self) -> u8 {
        match self {
            Self::Off => 0b00,
            Self::Red => 0b10,
            Self::Green => 0b01,
            Self::Yellow => 0b11,
        }
    }
}

macro_rules! graphic_id {
    ($(#[$meta:meta])* $name:ident, $kind:literal, $alphabet:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub struct $name(char);

        impl $name {
            /// Creates an identifier, or `None` if `c` is out of range.
            #[must_use]
            pub fn new(c: char) -> Option<Self> {
                $alphabet.contains(c).then_some(Self(c))
            }

            /// Returns the identifier character.
            #[must_use]
            pub const fn as_char(self) -> char {
                self.0
            }
        }

        impl TryFrom<char> for $name {
            type Error = crate::error::Error;

            fn try_from(c: char) -> Result<Self, Self::Error> {
                Self::new(c).ok_or(crate::error::Error::InvalidIdentifier {
                    kind: $kind,
                    value: c,
                })
            }
        }
    };
}

graphic_id!(
    /// One of the sign's graphic slots, `A` to `P`.
    GraphicId,
    "graphic",
    "ABCDEFGHIJKLMNOP"
);

graphic_id!(
    /// Block of a graphic slot, `1` to `8`.
    BlockId,
    "block",
    "12345678"
);

/// A validated pixel grid.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GraphicGrid {
    pixels: [[Pixel; GRAPHIC_COLUMNS]; GRAPHIC_ROWS],
}

impl GraphicGrid {
    /// Creates an all-off grid.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses grid text.
    ///
    /// Missing rows are off, and a row may stop at a block boundary with
    /// the remaining blocks off. A row that stops inside a block is an
    /// error rather than a half-filled block.
    pub fn parse(text: &str) -> Result<Self, GraphicError> {
        let rows: Vec<&str> = text.lines().collect();
        let too_large = || GraphicError::TooLarge {
            rows: rows.len(),
            columns: rows.iter().map(|r| r.chars().count()).max().unwrap_or(0),
        };

        if rows.len() > GRAPHIC_ROWS {
            return Err(too_large());
        }

        let mut grid = Self::new();
        for (row, line) in rows.iter().enumerate() {
            let chars: Vec<char> = line.chars().collect();
            let len = chars.len();
            if len > GRAPHIC_COLUMNS {
                return Err(too_large());
            }
            if len % BLOCK_COLUMNS != 0 {
                let block = len / BLOCK_COLUMNS;
                return Err(GraphicError::ShortRow {
                    row,
                    len,
                    block,
                    needed: (block + 1) * BLOCK_COLUMNS,
                });
            }
            for (column, c) in chars.into_iter().enumerate() {
                grid.pixels[row][column] = Pixel::from_char(c);
            }
        }
        Ok(grid)
    }

    /// Returns a pixel.
    ///
    /// # Panics
    ///
    /// Panics if the position is outside the grid.
    #[must_use]
    pub const fn pixel(&self, row: usize, column: usize) -> Pixel {
        self.pixels[row][column]
    }

    /// Sets a pixel.
    ///
    /// # Panics
    ///
    /// Panics if the position is outside the grid.
    pub const fn set_pixel(&mut self, row: usize, column: usize, pixel: Pixel) {
        self.pixels[row][column] = pixel;
    }

    /// Encodes the grid into the sign's packed payload.
    #[must_use]
    pub fn encode(&self) -> [u8; PAYLOAD_LEN] {
        let mut payload = [0u8; PAYLOAD_LEN];
        let blocks = GRAPHIC_COLUMNS / BLOCK_COLUMNS;
        for block in 0..blocks {
            for (row, pixels) in self.pixels.iter().enumerate() {
                let offset = block * GRAPHIC_ROWS * 2 + row * 2;
                let start = block * BLOCK_COLUMNS;
                payload[offset] = pack(&pixels[start..start + 4]);
                payload[offset + 1] = pack(&pixels[start + 4..start + 8]);
            }
        }
        payload
    }
}

fn pack(pixels: &[Pixel]) -> u8 {
    pixels
        .iter()
        .enumerate()
        .fold(0u8, |acc, (i, p)| acc | (p.bits() << (6 - i * 2)))
}

impl fmt::Display for GraphicGrid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in &self.pixels {
            let line: String = row.iter().map(|p| p.as_char()).collect();
            write!(f, "{line}\r\n")?;
        }
        Ok(())
    }
}

/// Parses grid text and encodes it.
pub fn encode_graphic(text: &str) -> Result<[u8; PAYLOAD_LEN], GraphicError> {
    GraphicGrid::parse(text).map(|grid| grid.encode())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_grid_is_all_off() {
        assert_eq!(encode_graphic("").unwrap(), [0u8; PAYLOAD_LEN]);
    }

    #[test]
    fn test_pixel_packing() {
        // Red, green, yellow, off | four reds
        let payload = encode_graphic("ADE@AAAA").unwrap();
        assert_eq!(payload[0], 0b1001_1100);
        assert_eq!(payload[1], 0b1010_1010);
        assert!(payload[2..].iter().all(|b| *b == 0));
    }

    #[test]
    fn test_block_layout() {
        let mut rows = vec!["@".repeat(32); 8];
        // Row 2, first pixel of block 3.
        rows[2].replace_range(24..25, "E");
        let payload = encode_graphic(&rows.join("\r\n")).unwrap();
        let offset = 3 * 16 + 2 * 2;
        assert_eq!(payload[offset], 0b1100_0000);
        assert_eq!(payload.iter().filter(|b| **b != 0).count(), 1);
    }

    #[test]
    fn test_eighth_row_is_encoded() {
        let mut text = "@@@@@@@@\n".repeat(7);
        text.push_str("@@@@@@@A");
        let payload = encode_graphic(&text).unwrap();
        assert_eq!(payload[7 * 2 + 1], 0b0000_0010);
    }

    #[test]
    fn test_row_ending_on_block_boundary() {
        let payload = encode_graphic(&"E".repeat(16)).unwrap();
        assert_eq!(&payload[0..2], &[0xff, 0xff]);
        assert_eq!(&payload[16..18], &[0xff, 0xff]);
        assert_eq!(&payload[32..34], &[0x00, 0x00]);
    }

    #[test]
    fn test_short_row_is_rejected() {
        let text = format!("{}\n{}", "A".repeat(32), "A".repeat(12));
        assert_eq!(
            encode_graphic(&text),
            Err(GraphicError::ShortRow {
                row: 1,
                len: 12,
                block: 1,
                needed: 16
            })
        );
    }

    #[test]
    fn test_oversized_grid_is_rejected() {
        assert!(matches!(
            encode_graphic(&"A".repeat(40)),
            Err(GraphicError::TooLarge { .. })
        ));
        assert!(matches!(
            encode_graphic(&"@@@@@@@@\n".repeat(9)),
            Err(GraphicError::TooLarge { rows: 9, .. })
        ));
    }

    #[test]
    fn test_grid_text_round_trip() {
        let mut grid = GraphicGrid::new();
        grid.set_pixel(0, 0, Pixel::Red);
        grid.set_pixel(7, 31, Pixel::Green);
        let parsed = GraphicGrid::parse(&grid.to_string()).unwrap();
        assert_eq!(parsed, grid);
        assert_eq!(parsed.pixel(7, 31), Pixel::Green);
    }

    #[test]
    fn test_ids() {
        assert!(GraphicId::new('P').is_some());
        assert!(GraphicId::new('Q').is_none());
        assert!(BlockId::new('8').is_some());
        assert!(BlockId::new('0').is_none());
    }
}
