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

    devices/incolor/crtc.rs

    The CRTC register file: the 18 registers of the 6845 plus the InColor
    extensions, reached through an index/data port pair.

*/

use modular_bitfield::{bitfield, prelude::*};
use strum_macros::{Display, EnumIter, FromRepr};

use super::attr::DecorationLine;

pub const CRTC_REGISTER_COUNT: usize = 32;
/// Registers above this index are not implemented; writes are dropped and reads float.
pub const CRTC_REGISTER_MAX: u8 = 22;
pub const CRTC_INDEX_MASK: u8 = 0x1F;

const CRTC_ADDRESS_MASK: u16 = 0x3FFF;
const CURSOR_LINE_MASK: u8 = 0b0001_1111;
const CURSOR_ATTR_MASK: u8 = 0b0110_0000;
const CURSOR_DISABLE: u8 = 0b0010_0000;

// Some Turbo XT BIOSes program a CGA-style cursor (lines 6-7) on monochrome cards.
const BAD_CURSOR_START: u8 = 6;
const BAD_CURSOR_END: u8 = 7;
const FIXED_CURSOR_START: u8 = 11;
const FIXED_CURSOR_END: u8 = 12;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Display, EnumIter, FromRepr)]
#[repr(u8)]
pub enum CrtcRegister {
    HorizontalTotal = 0,
    HorizontalDisplayed,
    HorizontalSyncPosition,
    SyncWidth,
    VerticalTotal,
    VerticalTotalAdjust,
    VerticalDisplayed,
    VerticalSync,
    InterlaceMode,
    MaximumScanlineAddress,
    CursorStartLine,
    CursorEndLine,
    StartAddressH,
    StartAddressL,
    CursorAddressH,
    CursorAddressL,
    LightPenPositionH,
    LightPenPositionL,
    Unused18,
    Unused19,
    ExtendedMode,
    Underline,
    Overstrike,
}

/// CRTC R20, the xMode register.
#[bitfield]
#[derive(Copy, Clone)]
pub struct XModeRegister {
    pub ramfont: bool,
    pub ninety_column: bool,
    pub ramfont_48k: bool,
    #[skip]
    unused: B5,
}

#[derive(Clone, Debug)]
pub struct CrtcRegisterFile {
    reg: [u8; CRTC_REGISTER_COUNT],
    index: u8,
}

impl Default for CrtcRegisterFile {
    fn default() -> Self {
        Self::new()
    }
}

impl CrtcRegisterFile {
    pub fn new() -> Self {
        Self {
            reg: [0; CRTC_REGISTER_COUNT],
            index: 0,
        }
    }

    /// Handle a write to an index port. Only the low five bits are kept.
    #[inline]
    pub fn select(&mut self, data: u8) {
        self.index = data & CRTC_INDEX_MASK;
    }

    #[inline]
    pub fn selected(&self) -> u8 {
        self.index
    }

    /// Handle a write to a data port. Returns false if the selected register is not
    /// implemented and the write was dropped.
    pub fn write_data(&mut self, data: u8) -> bool {
        if self.index > CRTC_REGISTER_MAX {
            return false;
        }
        self.reg[self.index as usize] = data;

        if self.reg[CrtcRegister::CursorStartLine as usize] == BAD_CURSOR_START
            && self.reg[CrtcRegister::CursorEndLine as usize] == BAD_CURSOR_END
        {
            self.reg[CrtcRegister::CursorStartLine as usize] = FIXED_CURSOR_START;
            self.reg[CrtcRegister::CursorEndLine as usize] = FIXED_CURSOR_END;
        }
        true
    }

    /// Handle a read from a data port.
    pub fn read_data(&self) -> u8 {
        if self.index > CRTC_REGISTER_MAX {
            0xFF
        }
        else {
            self.reg[self.index as usize]
        }
    }

    #[inline(always)]
    pub fn get(&self, reg: CrtcRegister) -> u8 {
        self.reg[reg as usize]
    }

    /// Direct access for debuggers; indices wrap at 32.
    pub fn raw(&self, index: usize) -> u8 {
        self.reg[index % CRTC_REGISTER_COUNT]
    }

    pub fn selected_register(&self) -> Option<CrtcRegister> {
        CrtcRegister::from_repr(self.index)
    }

    /// R0: character clocks per scanline, minus one.
    #[inline(always)]
    pub fn horizontal_total(&self) -> u8 {
        self.get(CrtcRegister::HorizontalTotal)
    }

    /// R1: displayed character cells per row.
    #[inline(always)]
    pub fn horizontal_displayed(&self) -> u8 {
        self.get(CrtcRegister::HorizontalDisplayed)
    }

    /// R4: character rows per frame, minus one. Unmasked, so a value above 127 never matches
    /// the 7-bit row counter.
    #[inline(always)]
    pub fn vertical_total(&self) -> u8 {
        self.get(CrtcRegister::VerticalTotal)
    }

    /// R5: extra scanlines after the last row.
    #[inline(always)]
    pub fn vertical_total_adjust(&self) -> u8 {
        self.get(CrtcRegister::VerticalTotalAdjust)
    }

    /// R6: displayed character rows.
    #[inline(always)]
    pub fn vertical_displayed(&self) -> u8 {
        self.get(CrtcRegister::VerticalDisplayed)
    }

    /// R7: character row at which vertical sync begins.
    #[inline(always)]
    pub fn vertical_sync_pos(&self) -> u8 {
        self.get(CrtcRegister::VerticalSync)
    }

    /// R8 & 3 == 3: each scanline counter value is shown twice.
    #[inline(always)]
    pub fn scanline_doubled(&self) -> bool {
        self.get(CrtcRegister::InterlaceMode) & 0x03 == 0x03
    }

    /// R9: last scanline of a character row.
    #[inline(always)]
    pub fn maximum_scanline(&self) -> u8 {
        self.get(CrtcRegister::MaximumScanlineAddress)
    }

    /// R10 & 0x1F
    #[inline(always)]
    pub fn cursor_start(&self) -> u8 {
        self.get(CrtcRegister::CursorStartLine) & CURSOR_LINE_MASK
    }

    /// R11 & 0x1F
    #[inline(always)]
    pub fn cursor_end(&self) -> u8 {
        self.get(CrtcRegister::CursorEndLine) & CURSOR_LINE_MASK
    }

    /// R10 bits 5-6 == 01: cursor off.
    #[inline(always)]
    pub fn cursor_disabled(&self) -> bool {
        self.get(CrtcRegister::CursorStartLine) & CURSOR_ATTR_MASK == CURSOR_DISABLE
    }

    /// R12:R13 & 0x3FFF
    #[inline(always)]
    pub fn start_address(&self) -> u16 {
        (((self.get(CrtcRegister::StartAddressH) as u16) << 8) | self.get(CrtcRegister::StartAddressL) as u16)
            & CRTC_ADDRESS_MASK
    }

    /// R14:R15 & 0x3FFF
    #[inline(always)]
    pub fn cursor_address(&self) -> u16 {
        (((self.get(CrtcRegister::CursorAddressH) as u16) << 8) | self.get(CrtcRegister::CursorAddressL) as u16)
            & CRTC_ADDRESS_MASK
    }

    /// R20
    #[inline(always)]
    pub fn xmode(&self) -> XModeRegister {
        XModeRegister::from_bytes([self.get(CrtcRegister::ExtendedMode)])
    }

    /// R21
    #[inline(always)]
    pub fn underline(&self) -> DecorationLine {
        DecorationLine::from_register(self.get(CrtcRegister::Underline))
    }

    /// R22
    #[inline(always)]
    pub fn overstrike(&self) -> DecorationLine {
        DecorationLine::from_register(self.get(CrtcRegister::Overstrike))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_reg(crtc: &mut CrtcRegisterFile, index: u8, data: u8) -> bool {
        crtc.select(index);
        crtc.write_data(data)
    }

    #[test]
    fn select_masks_to_five_bits() {
        let mut crtc = CrtcRegisterFile::new();
        for v in 0..=255u8 {
            crtc.select(v);
            assert_eq!(crtc.selected(), v & 0x1F);
        }
    }

    #[test]
    fn writes_above_22_are_dropped() {
        let mut crtc = CrtcRegisterFile::new();
        for index in 0..=CRTC_REGISTER_MAX {
            assert!(write_reg(&mut crtc, index, 0x40 + index));
        }
        let before = crtc.clone();
        for index in 23..32 {
            assert!(!write_reg(&mut crtc, index, 0xAA));
            assert_eq!(crtc.read_data(), 0xFF);
        }
        assert_eq!(before.reg, crtc.reg);
    }

    #[test]
    fn reads_return_stored_values() {
        let mut crtc = CrtcRegisterFile::new();
        write_reg(&mut crtc, 9, 13);
        assert_eq!(crtc.read_data(), 13);
        assert_eq!(crtc.selected_register(), Some(CrtcRegister::MaximumScanlineAddress));
        crtc.select(30);
        assert_eq!(crtc.selected_register(), None);
    }

    #[test]
    fn cga_cursor_is_fixed_up() {
        let mut crtc = CrtcRegisterFile::new();
        write_reg(&mut crtc, 10, 6);
        assert_eq!(crtc.raw(10), 6);
        write_reg(&mut crtc, 11, 7);
        assert_eq!(crtc.raw(10), 11);
        assert_eq!(crtc.raw(11), 12);
    }

    #[test]
    fn other_cursor_shapes_are_kept() {
        let mut crtc = CrtcRegisterFile::new();
        write_reg(&mut crtc, 10, 6);
        write_reg(&mut crtc, 11, 8);
        assert_eq!((crtc.raw(10), crtc.raw(11)), (6, 8));
        write_reg(&mut crtc, 10, 7);
        write_reg(&mut crtc, 11, 7);
        assert_eq!((crtc.raw(10), crtc.raw(11)), (7, 7));
    }

    #[test]
    fn address_accessors_mask_to_14_bits() {
        let mut crtc = CrtcRegisterFile::new();
        write_reg(&mut crtc, 12, 0xFF);
        write_reg(&mut crtc, 13, 0x12);
        write_reg(&mut crtc, 14, 0x41);
        write_reg(&mut crtc, 15, 0x23);
        assert_eq!(crtc.start_address(), 0x3F12);
        assert_eq!(crtc.cursor_address(), 0x0123);
    }

    #[test]
    fn cursor_attributes() {
        let mut crtc = CrtcRegisterFile::new();
        write_reg(&mut crtc, 10, 0x2B);
        assert!(crtc.cursor_disabled());
        assert_eq!(crtc.cursor_start(), 11);
        write_reg(&mut crtc, 10, 0x6B);
        assert!(!crtc.cursor_disabled());
    }

    #[test]
    fn extended_registers() {
        let mut crtc = CrtcRegisterFile::new();
        write_reg(&mut crtc, 20, 0x07);
        let xmode = crtc.xmode();
        assert!(xmode.ramfont() && xmode.ninety_column() && xmode.ramfont_48k());

        write_reg(&mut crtc, 21, 0x0D);
        write_reg(&mut crtc, 22, 0x36);
        assert_eq!(crtc.underline(), DecorationLine { row: 13, ink: 7 });
        assert_eq!(crtc.overstrike(), DecorationLine { row: 6, ink: 3 });
        write_reg(&mut crtc, 8, 0x03);
        assert!(crtc.scanline_doubled());
    }

    #[test]
    fn register_names() {
        assert_eq!(CrtcRegister::ExtendedMode.to_string(), "ExtendedMode");
        assert_eq!(CrtcRegister::from_repr(22), Some(CrtcRegister::Overstrike));
    }
}
