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

    devices/incolor/draw.rs

    Scanline rendering. One renderer is chosen per scanline; each walks the
    R1 character cells of the row and emits pixels into the host's row
    buffer. Pixels that fall outside the row are dropped.

*/

use strum_macros::{Display, EnumIter};

use super::{
    attr::{decode_extended, decode_mda, MDA_UNDERLINE_ROW},
    crtc::XModeRegister,
    palette::default_rgb,
    *,
};
use crate::device_traits::videocard::VideoHost;

// Text memory is addressed through 14 bits; graphics banks through 13.
const TEXT_ADDRESS_MASK: usize = 0x3FFF;
const GFX_BANK_MASK: usize = 0x1FFF;
const GFX_BANK_SIZE: usize = 0x2000;
const GFX_PAGE1_OFFSET: usize = 0x8000;

const RAMFONT_BASE: usize = 0x4000;
const RAMFONT_GLYPH_STRIDE: usize = 16;
const RAMFONT_FONT_STRIDE: usize = 4096;

const LINE_GRAPHICS_CHARS: std::ops::RangeInclusive<u8> = 0xC0..=0xDF;

/// The pattern shifted out for a cell row: 9 bits, leftmost pixel in bit 8.
const PATTERN_MSB: u16 = 0x100;
const PATTERN_SOLID: u16 = 0x1FF;

const GFX_LIT_INK: u8 = 0x0F;
const GFX_DARK_INK: u8 = 0x00;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Display, EnumIter)]
pub enum LineRenderer {
    RomFont,
    RamFont4K,
    RamFont48K,
    Graphics,
}

impl LineRenderer {
    pub const COUNT: usize = 4;

    /// Choose the renderer for a scanline. Graphics wins when enabled; otherwise the RAMfont
    /// bits of xMode pick the text renderer. The 48K bit alone has no effect.
    pub fn select(graphics: bool, xmode: XModeRegister) -> LineRenderer {
        if graphics {
            return LineRenderer::Graphics;
        }
        match (xmode.ramfont(), xmode.ramfont_48k()) {
            (false, _) => LineRenderer::RomFont,
            (true, false) => LineRenderer::RamFont4K,
            (true, true) => LineRenderer::RamFont48K,
        }
    }
}

/// Shift a cell pattern out MSB first into `cw` pixels of cell `x`.
#[inline(always)]
fn emit_cell(row: &mut [u32], x: usize, cw: usize, pattern: u16, fg: u32, bg: u32) {
    let mut val = pattern;
    for i in 0..cw {
        if let Some(px) = row.get_mut(x * cw + i) {
            *px = if val & PATTERN_MSB != 0 { fg } else { bg };
        }
        val <<= 1;
    }
}

/// Widen a glyph byte to the 9-bit cell pattern. In 9-dot mode the line graphics characters
/// repeat their eighth column into the ninth so that horizontal lines join up.
#[inline(always)]
fn cell_pattern(glyph: u8, chr: u8, cw: usize) -> u16 {
    let mut val = (glyph as u16) << 1;
    if cw == TEXT_CHAR_WIDTH && LINE_GRAPHICS_CHARS.contains(&chr) {
        val |= (val >> 1) & 1;
    }
    val
}

impl InColorCard {
    /// Render the current display line into the host frame buffer.
    pub(crate) fn draw_scanline(&mut self, host: &mut dyn VideoHost) {
        let renderer = self.current_renderer();
        let row = host.line_mut(self.display_line as usize);

        match renderer {
            LineRenderer::Graphics => self.draw_graphics_line(row),
            _ => self.draw_text_line(renderer, row),
        }
        self.lines_rendered[renderer as usize] += 1;
    }

    #[inline]
    fn char_width(&self) -> usize {
        if self.crtc.xmode().ninety_column() {
            TEXT_CHAR_WIDTH_90COL
        }
        else {
            TEXT_CHAR_WIDTH
        }
    }

    #[inline]
    fn blink_phase(&self) -> bool {
        self.blink & BLINK_PHASE_MASK != 0
    }

    pub(crate) fn draw_text_line(&mut self, renderer: LineRenderer, row: &mut [u32]) {
        let cw = self.char_width();
        let cursor_address = self.crtc.cursor_address();

        for x in 0..self.crtc.horizontal_displayed() as usize {
            let addr = (self.vma as usize) << 1;
            let chr = self.vram[addr & TEXT_ADDRESS_MASK];
            let attr = self.vram[(addr + 1) & TEXT_ADDRESS_MASK];

            let draw_cursor = self.vma == cursor_address && self.cursor_line_on && self.cursor_visible;

            match renderer {
                LineRenderer::RomFont => self.draw_char_rom(row, x, cw, chr, attr),
                LineRenderer::RamFont4K => self.draw_char_ram4k(row, x, cw, chr, attr),
                LineRenderer::RamFont48K => self.draw_char_ram48k(row, x, cw, chr, attr),
                LineRenderer::Graphics => {}
            }
            self.vma = self.vma.wrapping_add(1);

            if draw_cursor {
                let ink = (attr & 0x08) | 0x07;
                emit_cell(row, x, cw, PATTERN_SOLID, default_rgb(ink), 0);
            }
        }
    }

    /// Pattern for a cell under MDA attribute rules.
    fn mda_pattern(&self, glyph: u8, chr: u8, cw: usize, hidden: bool, underline: bool) -> u16 {
        if hidden {
            0
        }
        else if underline && self.vlc_c9 == MDA_UNDERLINE_ROW {
            PATTERN_SOLID
        }
        else {
            cell_pattern(glyph, chr, cw)
        }
    }

    fn draw_char_rom(&self, row: &mut [u32], x: usize, cw: usize, chr: u8, attr: u8) {
        let a = decode_mda(attr, self.mode.blink_enable(), self.blink_phase());
        let glyph = self.font.glyph_row(chr, self.vlc_c9);
        let pattern = self.mda_pattern(glyph, chr, cw, a.hidden, a.underline);

        emit_cell(row, x, cw, pattern, default_rgb(a.fg), default_rgb(a.bg));
    }

    fn draw_char_ram4k(&self, row: &mut [u32], x: usize, cw: usize, chr: u8, attr: u8) {
        let a = decode_mda(attr, self.mode.blink_enable(), self.blink_phase());
        let glyph_addr = RAMFONT_BASE + RAMFONT_GLYPH_STRIDE * chr as usize + self.vlc_c9 as usize;
        let glyph = self.vram[glyph_addr & INCOLOR_MEM_MASK];
        let pattern = self.mda_pattern(glyph, chr, cw, a.hidden, a.underline);

        emit_cell(
            row,
            x,
            cw,
            pattern,
            self.palette.resolve(a.fg),
            self.palette.resolve(a.bg),
        );
    }

    fn draw_char_ram48k(&self, row: &mut [u32], x: usize, cw: usize, chr: u8, attr: u8) {
        let a = decode_extended(attr, self.mode.blink_enable(), self.blink_phase());
        let scanline = self.vlc_c9;
        let bg = self.palette.resolve(a.bg);

        if a.hidden {
            emit_cell(row, x, cw, 0, 0, bg);
            return;
        }

        let overstrike = self.crtc.overstrike();
        if a.overstrike && scanline == overstrike.row {
            emit_cell(row, x, cw, PATTERN_SOLID, self.palette.resolve(overstrike.ink ^ a.bg), bg);
            return;
        }

        let underline = self.crtc.underline();
        if a.underline && scanline == underline.row {
            emit_cell(row, x, cw, PATTERN_SOLID, self.palette.resolve(underline.ink ^ a.bg), bg);
            return;
        }

        let glyph_addr = RAMFONT_BASE
            + RAMFONT_GLYPH_STRIDE * chr as usize
            + RAMFONT_FONT_STRIDE * a.font as usize
            + scanline as usize;
        let glyph = self.vram[glyph_addr & INCOLOR_MEM_MASK];

        let mut pattern = cell_pattern(glyph, chr, cw);
        if a.bold {
            pattern |= pattern >> 1;
        }
        emit_cell(row, x, cw, pattern, self.palette.resolve(a.fg), bg);
    }

    pub(crate) fn draw_graphics_line(&mut self, row: &mut [u32]) {
        let mut bank = (self.vlc_c9 as usize & 0x03) * GFX_BANK_SIZE;
        if self.mode.page_one() && self.config_switch.enable_page() {
            bank += GFX_PAGE1_OFFSET;
        }

        let lit = default_rgb(GFX_LIT_INK);
        let dark = default_rgb(GFX_DARK_INK);

        for x in 0..self.crtc.horizontal_displayed() as usize {
            let addr = (((self.vma as usize) << 1) & GFX_BANK_MASK) + bank;
            let pattern = (self.vram[addr & INCOLOR_MEM_MASK] as u16) << 8 | self.vram[(addr + 1) & INCOLOR_MEM_MASK] as u16;
            self.vma = self.vma.wrapping_add(1);

            for c in 0..GFX_CELL_WIDTH {
                if let Some(px) = row.get_mut(x * GFX_CELL_WIDTH + c) {
                    *px = if pattern & (0x8000 >> c) != 0 { lit } else { dark };
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::devices::incolor::{font::CharacterRom, tests::test_card};

    const GREY: u32 = 0xAAAAAA;
    const WHITE: u32 = 0xFFFFFF;
    const BLACK: u32 = 0x000000;

    fn set_reg(card: &mut InColorCard, index: u8, value: u8) {
        card.crtc.select(index);
        card.crtc.write_data(value);
    }

    /// A card showing one text cell, with a ROM whose every glyph row is 0xFF.
    fn text_card(columns: u8) -> InColorCard {
        let mut card = test_card();
        set_reg(&mut card, 1, columns);
        card.font = CharacterRom::from_bytes(&[0xFF; 4096]).unwrap();
        card
    }

    fn put_cell(card: &mut InColorCard, cell: usize, chr: u8, attr: u8) {
        card.vram[cell * 2] = chr;
        card.vram[cell * 2 + 1] = attr;
    }

    fn render_text(card: &mut InColorCard) -> Vec<u32> {
        let mut row = vec![0x123456; 64];
        card.vma = 0;
        let renderer = card.current_renderer();
        card.draw_text_line(renderer, &mut row);
        row
    }

    #[test]
    fn renderer_selection() {
        let xmode = |v: u8| XModeRegister::from_bytes([v]);
        assert_eq!(LineRenderer::select(false, xmode(0)), LineRenderer::RomFont);
        assert_eq!(LineRenderer::select(false, xmode(4)), LineRenderer::RomFont);
        assert_eq!(LineRenderer::select(false, xmode(2)), LineRenderer::RomFont);
        assert_eq!(LineRenderer::select(false, xmode(1)), LineRenderer::RamFont4K);
        assert_eq!(LineRenderer::select(false, xmode(3)), LineRenderer::RamFont4K);
        assert_eq!(LineRenderer::select(false, xmode(5)), LineRenderer::RamFont48K);
        assert_eq!(LineRenderer::select(true, xmode(5)), LineRenderer::Graphics);
    }

    #[test]
    fn ninth_column_repeats_for_line_graphics() {
        let mut card = text_card(2);
        put_cell(&mut card, 0, b'A', 0x07);
        put_cell(&mut card, 1, 0xC4, 0x07);
        let row = render_text(&mut card);

        assert!(row[0..8].iter().all(|&p| p == GREY));
        assert_eq!(row[8], BLACK);
        assert!(row[9..18].iter().all(|&p| p == GREY));
        // Past the last cell the row is untouched.
        assert_eq!(row[18], 0x123456);
    }

    #[test]
    fn ninety_column_cells_are_eight_wide() {
        let mut card = text_card(2);
        set_reg(&mut card, 20, 0x02);
        put_cell(&mut card, 0, 0xC4, 0x07);
        put_cell(&mut card, 1, 0xC4, 0x0F);
        let row = render_text(&mut card);

        assert!(row[0..8].iter().all(|&p| p == GREY));
        assert!(row[8..16].iter().all(|&p| p == WHITE));
        assert_eq!(row[16], 0x123456);
    }

    #[test]
    fn mda_underline_row() {
        let mut card = text_card(1);
        card.font = CharacterRom::from_bytes(&[0x00; 4096]).unwrap();
        put_cell(&mut card, 0, b'A', 0x01);

        card.vlc_c9 = 12;
        let row = render_text(&mut card);
        assert!(row[0..9].iter().all(|&p| p == BLACK));

        card.vlc_c9 = MDA_UNDERLINE_ROW;
        let row = render_text(&mut card);
        assert!(row[0..9].iter().all(|&p| p == GREY));
    }

    #[test]
    fn blinking_text_hides_in_off_phase() {
        let mut card = text_card(1);
        card.mode = ModeControlRegister::from_bytes([0x28]);
        put_cell(&mut card, 0, b'A', 0x87);

        card.blink = 0;
        let row = render_text(&mut card);
        assert_eq!(row[0], GREY);

        card.blink = BLINK_PHASE_MASK;
        let row = render_text(&mut card);
        assert!(row[0..9].iter().all(|&p| p == BLACK));
    }

    #[test]
    fn cursor_overlays_cell() {
        let mut card = text_card(2);
        card.font = CharacterRom::from_bytes(&[0x00; 4096]).unwrap();
        set_reg(&mut card, 14, 0x00);
        set_reg(&mut card, 15, 0x01);
        put_cell(&mut card, 0, b'A', 0x07);
        put_cell(&mut card, 1, b'B', 0x0F);
        card.cursor_line_on = true;
        card.cursor_visible = true;

        let row = render_text(&mut card);
        assert!(row[0..9].iter().all(|&p| p == BLACK));
        assert!(row[9..18].iter().all(|&p| p == WHITE));

        card.cursor_visible = false;
        let row = render_text(&mut card);
        assert!(row[9..18].iter().all(|&p| p == BLACK));
    }

    #[test]
    fn vma_advances_per_cell() {
        let mut card = text_card(80);
        render_text(&mut card);
        assert_eq!(card.vma, 80);
    }

    #[test]
    fn ramfont_4k_reads_glyphs_from_vram() {
        let mut card = text_card(1);
        set_reg(&mut card, 20, 0x01);
        card.vlc_c9 = 3;
        card.vram[0x4000 + 16 * b'A' as usize + 3] = 0x81;
        put_cell(&mut card, 0, b'A', 0x07);

        let row = render_text(&mut card);
        assert_eq!(row[0], GREY);
        assert!(row[1..7].iter().all(|&p| p == BLACK));
        assert_eq!(row[7], GREY);
        assert_eq!(row[8], BLACK);
    }

    #[test]
    fn ramfont_4k_uses_palette_when_enabled() {
        let mut card = text_card(1);
        set_reg(&mut card, 20, 0x01);
        card.vram[0x4000 + 16 * b'A' as usize] = 0x80;
        put_cell(&mut card, 0, b'A', 0x07);

        for i in 0..16u8 {
            card.palette_mut().write(if i == 7 { 0b100100 } else { i });
        }
        let row = render_text(&mut card);
        assert_eq!(row[0], GREY);

        card.palette_mut().set_enabled(true);
        let row = render_text(&mut card);
        assert_eq!(row[0], 0xFF0000);
        assert_eq!(row[1], BLACK);
    }

    #[test]
    fn ramfont_48k_font_select() {
        let mut card = text_card(1);
        set_reg(&mut card, 20, 0x05);
        card.vlc_c9 = 2;
        card.vram[0x4000 + 16 * b'A' as usize + 2 * 4096 + 2] = 0x80;
        put_cell(&mut card, 0, b'A', 0x02);

        let row = render_text(&mut card);
        assert_eq!(row[0], WHITE);
        assert!(row[1..9].iter().all(|&p| p == BLACK));

        // Fonts 12-15 alias 4-7.
        card.vram[0x4000 + 16 * b'A' as usize + 4 * 4096 + 2] = 0x40;
        put_cell(&mut card, 0, b'A', 0x0C);
        let row = render_text(&mut card);
        assert_eq!(row[0], BLACK);
        assert_eq!(row[1], WHITE);
    }

    #[test]
    fn ramfont_48k_bold_and_reverse() {
        let mut card = text_card(1);
        set_reg(&mut card, 20, 0x05);
        card.vram[0x4000 + 16 * b'A' as usize] = 0x40;
        put_cell(&mut card, 0, b'A', 0x80);
        let row = render_text(&mut card);
        assert_eq!(&row[0..4], &[BLACK, WHITE, WHITE, BLACK]);

        put_cell(&mut card, 0, b'A', 0x40);
        let row = render_text(&mut card);
        assert_eq!(&row[0..3], &[WHITE, BLACK, WHITE]);
    }

    #[test]
    fn ramfont_48k_decoration_lines() {
        let mut card = text_card(1);
        set_reg(&mut card, 20, 0x05);
        set_reg(&mut card, 21, 0x05);
        set_reg(&mut card, 22, 0x25);
        card.vlc_c9 = 5;

        // Underline only, default ink.
        put_cell(&mut card, 0, b'A', 0x10);
        let row = render_text(&mut card);
        assert!(row[0..9].iter().all(|&p| p == GREY));

        // Overstrike on the same row takes precedence, complemented by the reverse background.
        put_cell(&mut card, 0, b'A', 0x70);
        let row = render_text(&mut card);
        assert!(row[0..9].iter().all(|&p| p == default_rgb(0x02 ^ 0x0F)));

        // Decoration bits without a matching row draw the glyph.
        card.vlc_c9 = 6;
        let row = render_text(&mut card);
        assert!(row[0..9].iter().all(|&p| p == WHITE));
    }

    #[test]
    fn ramfont_48k_blink_mode() {
        let mut card = text_card(1);
        set_reg(&mut card, 20, 0x05);
        card.mode = ModeControlRegister::from_bytes([0x28]);
        card.vram[0x4000 + 16 * b'A' as usize] = 0xFF;
        put_cell(&mut card, 0, b'A', 0xC0);

        // Bit 7 is masked off in blink mode: the background stays ink 0.
        card.blink = BLINK_PHASE_MASK;
        let row = render_text(&mut card);
        assert!(row[0..9].iter().all(|&p| p == default_rgb(0)));

        card.blink = 0;
        let row = render_text(&mut card);
        assert!(row[0..8].iter().all(|&p| p == default_rgb(0x0F)));
        assert_eq!(row[8], default_rgb(0));
    }

    #[test]
    fn graphics_banks_and_pixel_order() {
        let mut card = test_card();
        set_reg(&mut card, 1, 2);
        card.vram[0x2000] = 0x80;
        card.vram[0x2001] = 0x01;
        card.vram[0x2003] = 0xFF;
        card.vlc_c9 = 1;
        card.vma = 0;

        let mut row = vec![0x123456; 40];
        card.draw_graphics_line(&mut row);

        assert_eq!(row[0], WHITE);
        assert!(row[1..15].iter().all(|&p| p == BLACK));
        assert_eq!(row[15], WHITE);
        assert!(row[16..24].iter().all(|&p| p == BLACK));
        assert!(row[24..32].iter().all(|&p| p == WHITE));
        assert_eq!(row[32], 0x123456);
        assert_eq!(card.vma, 2);
    }

    #[test]
    fn graphics_page_one() {
        let mut card = test_card();
        set_reg(&mut card, 1, 1);
        card.vram[0x8000] = 0xFF;
        card.mode = ModeControlRegister::from_bytes([0x8A]);
        card.config_switch = ConfigSwitch::from_bytes([0x03]);
        card.vma = 0;
        card.vlc_c9 = 0;

        let mut row = vec![0; 16];
        card.draw_graphics_line(&mut row);
        assert!(row[0..8].iter().all(|&p| p == WHITE));

        // Page one needs the configuration switch too.
        card.config_switch = ConfigSwitch::from_bytes([0x01]);
        card.vma = 0;
        card.draw_graphics_line(&mut row);
        assert!(row[0..8].iter().all(|&p| p == BLACK));
    }

    #[test]
    fn short_rows_are_not_overrun() {
        let mut card = text_card(80);
        let mut row = vec![0; 10];
        card.draw_text_line(LineRenderer::RomFont, &mut row);
        let mut row = vec![0; 10];
        card.draw_graphics_line(&mut row);
    }
}
