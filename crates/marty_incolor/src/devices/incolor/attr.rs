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

    devices/incolor/attr.rs

    Character attribute decoding. ROM font and 4K RAMfont text use the MDA
    attribute byte; 48K RAMfont text repurposes it to select one of 12
    fonts and a set of line decorations.

*/

pub const ATTR_BLINK: u8 = 0b1000_0000;
pub const ATTR_MDA_MASK: u8 = 0b0111_0111;
pub const ATTR_MDA_INVERSE: u8 = 0b0111_0000;
pub const ATTR_MDA_INTENSITY: u8 = 0b0000_1000;
pub const ATTR_MDA_UNDERLINE: u8 = 0b0000_0001;

pub const ATTR_EXT_BOLD: u8 = 0b1000_0000;
pub const ATTR_EXT_BLINK: u8 = 0b0100_0000;
pub const ATTR_EXT_REVERSE: u8 = 0b0100_0000;
pub const ATTR_EXT_OVERSTRIKE: u8 = 0b0010_0000;
pub const ATTR_EXT_UNDERLINE: u8 = 0b0001_0000;
pub const ATTR_EXT_FONT_MASK: u8 = 0b0000_1111;

/// Row of the character cell the MDA underline is drawn on.
pub const MDA_UNDERLINE_ROW: u8 = 13;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct MdaAttr {
    pub fg: u8,
    pub bg: u8,
    /// The glyph is in the off phase of blinking and draws as background only.
    pub hidden: bool,
    pub underline: bool,
}

/// Decode an MDA attribute byte into foreground and background inks.
///
/// With blinking enabled, bit 7 makes the character blink and is then masked off, so it no
/// longer selects the bright background.
pub fn decode_mda(attr: u8, blink_enabled: bool, blink_phase: bool) -> MdaAttr {
    let mut attr = attr;
    let mut hidden = false;

    if blink_enabled {
        if attr & ATTR_BLINK != 0 {
            hidden = blink_phase;
        }
        attr &= !ATTR_BLINK;
    }

    let (mut fg, mut bg) = if attr & ATTR_MDA_MASK == ATTR_MDA_INVERSE {
        (0, 7)
    }
    else {
        (7, 0)
    };

    if attr & ATTR_MDA_INTENSITY != 0 {
        fg |= 8;
    }
    if attr & ATTR_BLINK != 0 {
        bg |= 8;
    }
    if attr & ATTR_MDA_MASK == 0 {
        fg = bg;
    }

    MdaAttr {
        fg,
        bg,
        hidden,
        underline: attr & 0x07 == ATTR_MDA_UNDERLINE,
    }
}

/// An underline or overstrike line as programmed in CRTC R21 / R22: low nibble selects the
/// cell row, high nibble the ink. An ink of 0 means the default ink 7.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct DecorationLine {
    pub row: u8,
    pub ink: u8,
}

impl DecorationLine {
    pub fn from_register(reg: u8) -> Self {
        let ink = reg >> 4;
        Self {
            row: reg & 0x0F,
            ink: if ink == 0 { 7 } else { ink },
        }
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct ExtendedAttr {
    /// Index of the 4K font slot within the 48K RAMfont.
    pub font: u8,
    pub fg: u8,
    pub bg: u8,
    pub bold: bool,
    pub hidden: bool,
    pub overstrike: bool,
    pub underline: bool,
}

/// Decode a 48K RAMfont attribute byte.
///
/// The low nibble selects the font; values 12-15 alias fonts 4-7. With blinking enabled bit 6
/// blinks and bit 7 is masked off, leaving background ink 0. Otherwise bit 7 is bold and bit 6
/// reverses the cell onto background ink 15. The foreground is always the background's
/// complement.
pub fn decode_extended(attr: u8, blink_enabled: bool, blink_phase: bool) -> ExtendedAttr {
    let mut font = attr & ATTR_EXT_FONT_MASK;
    if font >= 12 {
        font &= 7;
    }

    let (bg, bold, hidden) = if blink_enabled {
        (0, false, (attr & ATTR_EXT_BLINK != 0) && blink_phase)
    }
    else {
        let bg = if attr & ATTR_EXT_REVERSE != 0 { 0x0F } else { 0 };
        (bg, attr & ATTR_EXT_BOLD != 0, false)
    };

    ExtendedAttr {
        font,
        fg: bg ^ 0x0F,
        bg,
        bold,
        hidden,
        overstrike: attr & ATTR_EXT_OVERSTRIKE != 0,
        underline: attr & ATTR_EXT_UNDERLINE != 0,
    }
}
