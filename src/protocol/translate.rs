//! Character translation from Unicode text to sign glyph tokens.
//!
//! The sign has 128 extra glyphs addressed by `<U00>`..`<U7F>`. Message
//! text is rewritten per character; anything without a glyph passes through.
//!
//! The glyph table is authored by token code. A few characters are bound to
//! more than one code (`ä` and `¿`); the binding with the highest code wins,
//! so `ä` becomes `<U64>` and `¿` becomes `<U3F>`. The shadowed codes are
//! still reachable by writing the `<Uxx>` markup directly.

use std::collections::HashMap;
use std::sync::LazyLock;

use crate::error::{Error, Result};
use crate::types::Variant;

/// Glyphs `<U00>`..`<U7F>` of the extended sign, indexed by token code.
const GLYPHS: [char; 128] = [
    '€', '↑', '↓', '˥', '˦', '˨', '˩', '└', '┴', '├', '┬', '─', '┼', '┘', '┌', '█', //
    '▄', '▌', '▐', '▀', 'α', 'β', 'Γ', 'ä', 'Σ', 'σ', 'μ', 'τ', 'Φ', '≈', 'Ω', 'δ', //
    '∞', 'λ', '¢', '£', '♉', '¥', '→', '←', '¿', '©', 'ª', '≥', 'Ɛ', '∩', '®', '\u{FFFD}', //
    'š', '±', '²', '³', 'ž', 'Ÿ', '¶', 'ɶ', 'Š', '¹', '⁰', '≤', '¼', '½', '¤', '¿', //
    'À', 'Á', 'Â', 'Ã', 'Ä', 'Å', 'Æ', 'Ç', 'È', 'É', 'Ê', 'Ë', 'Ì', 'Í', 'Î', 'Ï', //
    'Ð', 'Ñ', 'Ò', 'Ó', 'Ô', 'Õ', 'Ö', 'Ž', 'Ø', 'Ù', 'Ú', 'Û', 'Ü', 'Ý', 'Þ', 'ß', //
    'à', 'á', 'â', 'ã', 'ä', 'å', 'æ', 'ç', 'è', 'é', 'ê', 'ë', 'ì', 'í', 'î', 'ï', //
    'ð', 'ñ', 'ò', 'ó', 'ô', 'õ', 'ö', '…', 'ø', 'ù', 'ú', 'û', 'ü', 'ý', 'þ', 'ÿ', //
];

/// Glyph at `<U00>` on the basic sign, which has no euro sign.
const BASIC_GLYPH_ZERO: char = 'ä';

fn build_table(zero: char) -> HashMap<char, u8> {
    let mut table = HashMap::with_capacity(GLYPHS.len());
    for (code, glyph) in (0u8..).zip(GLYPHS) {
        let glyph = if code == 0 { zero } else { glyph };
        // Later codes overwrite earlier ones.
        table.insert(glyph, code);
    }
    table
}

static EXTENDED_TABLE: LazyLock<HashMap<char, u8>> = LazyLock::new(|| build_table(GLYPHS[0]));
static BASIC_TABLE: LazyLock<HashMap<char, u8>> =
    LazyLock::new(|| build_table(BASIC_GLYPH_ZERO));

fn table(variant: Variant) -> &'static HashMap<char, u8> {
    match variant {
        Variant::Basic => &BASIC_TABLE,
        Variant::Extended => &EXTENDED_TABLE,
    }
}

/// Returns the glyph code for a character, if the sign has one.
#[must_use]
pub fn glyph_code(c: char, variant: Variant) -> Option<u8> {
    table(variant).get(&c).copied()
}

/// Rewrites every character that has a sign glyph into its `<Uxx>` token.
#[must_use]
pub fn translate(text: &str, variant: Variant) -> String {
    let table = table(variant);
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match table.get(&c) {
            Some(code) => out.push_str(&format!("<U{code:02X}>")),
            None => out.push(c),
        }
    }
    out
}

/// Encodes translated text as wire bytes.
///
/// Characters left after translation are sent as single bytes, which
/// limits them to U+0000..=U+00FF.
pub fn encode_latin1(text: &str) -> Result<Vec<u8>> {
    text.chars()
        .map(|c| u8::try_from(u32::from(c)).map_err(|_| Error::UnencodableChar(c)))
        .collect()
}
