/*
    MartyPC
    https://github.com/dbalsom/martypc

    Copyright 2022-2025 Daniel Balsom

    Permission is hereby granted, free of charge, to any person obtaining a
    copy of this software and associated documentation files (the “Software”),
    to deal in the Software without restriction, including without limitation
    the rights to use, copy, modify, merge, publish, distribute, sublicense,
    and/or sell copies of the Software, and to permit persons to whom the
    Software is furnished to do so, subject to the following conditions:

    The above copyright notice and this permission notice shall be included in
    all copies or substantial portions of the Software.

    THE SOFTWARE IS PROVIDED “AS IS”, WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
    IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
    FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
    AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
    LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING
    FROM, OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER
    DEALINGS IN THE SOFTWARE.

    --------------------------------------------------------------------------

    devices/incolor/font.rs

    The character generator ROM used by ROM font text mode.

    256 glyphs of 14 rows, stored 16 bytes apart. Bit 7 of each row byte is
    the leftmost pixel. A dump of a real ROM can be supplied in the
    configuration; otherwise an equivalent table is synthesised from the
    font8x8 glyph sets, mapped through code page 437.

*/

use std::path::Path;

use font8x8::{UnicodeFonts, BASIC_FONTS, BLOCK_FONTS, BOX_FONTS, GREEK_FONTS, LATIN_FONTS, MISC_FONTS};
use lazy_static::lazy_static;

use crate::error::InColorError;

pub const GLYPH_COUNT: usize = 256;
pub const GLYPH_ROWS: usize = 14;
pub const GLYPH_STRIDE: usize = 16;
pub const CHARACTER_ROM_SIZE: usize = GLYPH_COUNT * GLYPH_STRIDE;
/// Glyph lookups wrap within the ROM.
pub const CHARACTER_ROM_MASK: usize = CHARACTER_ROM_SIZE - 1;

const PACKED_ROM_SIZE: usize = GLYPH_COUNT * GLYPH_ROWS;

// Code page 437 control range, 0x00-0x1F.
const CP437_LOW: [char; 32] = [
    ' ', '☺', '☻', '♥', '♦', '♣', '♠', '•', '◘', '○', '◙', '♂', '♀', '♪', '♫', '☼', //
    '►', '◄', '↕', '‼', '¶', '§', '▬', '↨', '↑', '↓', '→', '←', '∟', '↔', '▲', '▼',
];

// Code page 437, 0x80-0xFF.
const CP437_HIGH: [char; 128] = [
    'Ç', 'ü', 'é', 'â', 'ä', 'à', 'å', 'ç', 'ê', 'ë', 'è', 'ï', 'î', 'ì', 'Ä', 'Å', //
    'É', 'æ', 'Æ', 'ô', 'ö', 'ò', 'û', 'ù', 'ÿ', 'Ö', 'Ü', '¢', '£', '¥', '₧', 'ƒ', //
    'á', 'í', 'ó', 'ú', 'ñ', 'Ñ', 'ª', 'º', '¿', '⌐', '¬', '½', '¼', '¡', '«', '»', //
    '░', '▒', '▓', '│', '┤', '╡', '╢', '╖', '╕', '╣', '║', '╗', '╝', '╜', '╛', '┐', //
    '└', '┴', '┬', '├', '─', '┼', '╞', '╟', '╚', '╔', '╩', '╦', '╠', '═', '╬', '╧', //
    '╨', '╤', '╥', '╙', '╘', '╒', '╓', '╫', '╪', '┘', '┌', '█', '▄', '▌', '▐', '▀', //
    'α', 'ß', 'Γ', 'π', 'Σ', 'σ', 'µ', 'τ', 'Φ', 'Θ', 'Ω', 'δ', '∞', 'φ', 'ε', '∩', //
    '≡', '±', '≥', '≤', '⌠', '⌡', '÷', '≈', '°', '∙', '·', '√', 'ⁿ', '²', '■', ' ',
];

fn cp437_char(code: u8) -> char {
    match code {
        0x00..=0x1F => CP437_LOW[code as usize],
        0x7F => '⌂',
        0x20..=0x7E => code as char,
        _ => CP437_HIGH[(code - 0x80) as usize],
    }
}

fn lookup_8x8(c: char) -> Option<[u8; 8]> {
    BASIC_FONTS
        .get(c)
        .or_else(|| LATIN_FONTS.get(c))
        .or_else(|| BOX_FONTS.get(c))
        .or_else(|| BLOCK_FONTS.get(c))
        .or_else(|| GREEK_FONTS.get(c))
        .or_else(|| MISC_FONTS.get(c))
}

fn synthesize_rom() -> Box<[u8; CHARACTER_ROM_SIZE]> {
    let mut rom = Box::new([0u8; CHARACTER_ROM_SIZE]);

    for code in 0..GLYPH_COUNT {
        let Some(glyph) = lookup_8x8(cp437_char(code as u8)) else {
            continue;
        };
        // Stretch 8 source rows over the 14-row cell so that line-drawing characters
        // still meet their neighbours. font8x8 stores the leftmost pixel in bit 0.
        for row in 0..GLYPH_ROWS {
            let src = glyph[row * 8 / GLYPH_ROWS];
            rom[code * GLYPH_STRIDE + row] = src.reverse_bits();
        }
    }
    rom
}

lazy_static! {
    static ref BUILTIN_ROM: Box<[u8; CHARACTER_ROM_SIZE]> = synthesize_rom();
}

#[derive(Clone)]
pub struct CharacterRom {
    glyphs: Box<[u8; CHARACTER_ROM_SIZE]>,
}

impl Default for CharacterRom {
    fn default() -> Self {
        Self::builtin()
    }
}

impl CharacterRom {
    pub fn builtin() -> Self {
        Self {
            glyphs: BUILTIN_ROM.clone(),
        }
    }

    /// Build a ROM from a dump. Dumps of 4096 bytes or more hold 16 bytes per glyph; shorter
    /// dumps of at least 3584 bytes hold 14.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, InColorError> {
        let stride = if bytes.len() >= CHARACTER_ROM_SIZE {
            GLYPH_STRIDE
        }
        else if bytes.len() >= PACKED_ROM_SIZE {
            GLYPH_ROWS
        }
        else {
            return Err(InColorError::FontRomSize(bytes.len()));
        };

        let mut glyphs = Box::new([0u8; CHARACTER_ROM_SIZE]);
        for (code, src) in bytes.chunks_exact(stride).take(GLYPH_COUNT).enumerate() {
            let dst = code * GLYPH_STRIDE;
            glyphs[dst..dst + GLYPH_ROWS].copy_from_slice(&src[..GLYPH_ROWS]);
        }
        Ok(Self { glyphs })
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, InColorError> {
        let bytes = std::fs::read(path.as_ref()).map_err(|source| InColorError::FontRomIo {
            path: path.as_ref().to_path_buf(),
            source,
        })?;
        log::debug!("Loaded {} byte font ROM from {}", bytes.len(), path.as_ref().display());
        Self::from_bytes(&bytes)
    }

    /// Fetch one row of a glyph.
    #[inline(always)]
    pub fn glyph_row(&self, chr: u8, row: u8) -> u8 {
        self.glyphs[(chr as usize * GLYPH_STRIDE + row as usize) & CHARACTER_ROM_MASK]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_space_is_blank() {
        let rom = CharacterRom::builtin();
        for row in 0..16 {
            assert_eq!(rom.glyph_row(b' ', row), 0);
        }
    }

    #[test]
    fn builtin_full_block_is_solid() {
        let rom = CharacterRom::builtin();
        for row in 0..GLYPH_ROWS as u8 {
            assert_eq!(rom.glyph_row(0xDB, row), 0xFF);
        }
        // Padding rows past the cell are blank.
        assert_eq!(rom.glyph_row(0xDB, 14), 0);
        assert_eq!(rom.glyph_row(0xDB, 15), 0);
    }

    #[test]
    fn builtin_left_half_block_is_msb_first() {
        let rom = CharacterRom::builtin();
        assert_eq!(rom.glyph_row(0xDD, 0), 0xF0);
    }

    #[test]
    fn builtin_has_letters() {
        let rom = CharacterRom::builtin();
        let lit = (0..GLYPH_ROWS as u8).filter(|&r| rom.glyph_row(b'A', r) != 0).count();
        assert!(lit > 0);
    }

    #[test]
    fn row_index_wraps() {
        let mut dump = vec![0u8; CHARACTER_ROM_SIZE];
        dump[0] = 0xAA;
        let rom = CharacterRom::from_bytes(&dump).unwrap();
        // 0xFF * 16 + 16 wraps to offset 0.
        assert_eq!(rom.glyph_row(0xFF, 16), 0xAA);
    }

    #[test]
    fn packed_dump_is_restrided() {
        let mut dump = vec![0u8; PACKED_ROM_SIZE];
        dump[GLYPH_ROWS] = 0x81; // glyph 1, row 0
        dump[2 * GLYPH_ROWS - 1] = 0x18; // glyph 1, row 13
        let rom = CharacterRom::from_bytes(&dump).unwrap();
        assert_eq!(rom.glyph_row(1, 0), 0x81);
        assert_eq!(rom.glyph_row(1, 13), 0x18);
        assert_eq!(rom.glyph_row(0, 14), 0);
    }

    #[test]
    fn short_dump_is_rejected() {
        let result = CharacterRom::from_bytes(&[0u8; 1000]);
        assert!(matches!(result, Err(InColorError::FontRomSize(1000))));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let result = CharacterRom::from_file("/nonexistent/mda.rom");
        assert!(matches!(result, Err(InColorError::FontRomIo { .. })));
    }
}
