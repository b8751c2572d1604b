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

    devices/incolor/palette.rs

    Ink to RGB resolution. The InColor monitor accepts a 6-bit rgbRGB
    colour; a 16-entry palette maps each of the card's 4-bit inks onto one
    of those 64 colours.

*/

/// Number of inks a character cell can select.
pub const INK_COUNT: usize = 16;
/// Number of colours the monitor can display.
pub const RGB_COUNT: usize = 64;

/// Power-on palette: the eight low-intensity colours, then the eight high-intensity ones.
pub const DEFAULT_PALETTE: [u8; INK_COUNT] = [
    0x00, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x38, 0x39, 0x3A, 0x3B, 0x3C, 0x3D, 0x3E, 0x3F,
];

// Bits of a monitor colour, from most significant: r g b R G B. Upper case are the
// primary (0xAA) signals, lower case the secondary (0x55) ones.
const fn rgbrgb_component(colour: usize, primary_bit: usize) -> u32 {
    let mut c = 0;
    if colour & (1 << primary_bit) != 0 {
        c += 0xAA;
    }
    if colour & (1 << (primary_bit + 3)) != 0 {
        c += 0x55;
    }
    c
}

const fn make_rgb_table() -> [u32; RGB_COUNT] {
    let mut table = [0; RGB_COUNT];
    let mut i = 0;
    while i < RGB_COUNT {
        let r = rgbrgb_component(i, 2);
        let g = rgbrgb_component(i, 1);
        let b = rgbrgb_component(i, 0);
        table[i] = (r << 16) | (g << 8) | b;
        i += 1;
    }
    table
}

/// The 64 monitor colours as 0x00RRGGBB.
pub static INCOLOR_RGB: [u32; RGB_COUNT] = make_rgb_table();

/// Resolve an ink through the power-on palette.
#[inline(always)]
pub fn default_rgb(ink: u8) -> u32 {
    INCOLOR_RGB[DEFAULT_PALETTE[(ink & 0x0F) as usize] as usize]
}

/// The programmable palette. When enabled, RAMfont text resolves inks through it instead of
/// the power-on palette. Writes fill successive entries through an auto-incrementing cursor.
#[derive(Clone, Debug)]
pub struct PaletteExtension {
    enabled: bool,
    inks: [u8; INK_COUNT],
    index: usize,
}

impl Default for PaletteExtension {
    fn default() -> Self {
        Self {
            enabled: false,
            inks: DEFAULT_PALETTE,
            index: 0,
        }
    }
}

impl PaletteExtension {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            ..Self::default()
        }
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Store a monitor colour in the entry under the cursor and advance the cursor, wrapping
    /// after the 16th entry.
    pub fn write(&mut self, colour: u8) {
        self.inks[self.index] = colour & 0x3F;
        self.index = (self.index + 1) % INK_COUNT;
    }

    /// Rewind the write cursor to entry 0.
    pub fn rewind(&mut self) {
        self.index = 0;
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn entries(&self) -> &[u8; INK_COUNT] {
        &self.inks
    }

    /// Restore the power-on palette and rewind the cursor. The enable flag is kept.
    pub fn reset(&mut self) {
        self.inks = DEFAULT_PALETTE;
        self.index = 0;
    }

    /// Resolve an ink to RGB, through the programmable palette if enabled.
    #[inline(always)]
    pub fn resolve(&self, ink: u8) -> u32 {
        if self.enabled {
            INCOLOR_RGB[self.inks[(ink & 0x0F) as usize] as usize]
        }
        else {
            default_rgb(ink)
        }
    }
}
