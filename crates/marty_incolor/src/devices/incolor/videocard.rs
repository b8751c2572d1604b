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

    devices/incolor/videocard.rs

    Implementation of the VideoCard trait for the InColor card.

*/

use std::collections::HashMap;

use strum::IntoEnumIterator;

use super::{crtc::CrtcRegister, palette::INCOLOR_RGB, *};
use crate::device_traits::videocard::{VideoCard, VideoCardState, VideoCardStateEntry};

impl VideoCard for InColorCard {
    fn get_display_size(&self) -> (u32, u32) {
        self.display_size
    }

    fn get_sync(&self) -> (bool, bool, bool) {
        (
            self.status & STATUS_VRETRACE != 0,
            self.status & STATUS_HRETRACE != 0,
            self.display_enabled,
        )
    }

    fn get_scanline(&self) -> u32 {
        self.display_line
    }

    fn get_start_address(&self) -> u16 {
        self.crtc.start_address()
    }

    fn is_graphics_mode(&self) -> bool {
        self.is_graphics()
    }

    fn get_character_height(&self) -> u8 {
        self.crtc.maximum_scanline().wrapping_add(1)
    }

    fn get_videocard_string_state(&self) -> VideoCardState {
        let mut map = HashMap::new();

        let general_vec = vec![
            (
                String::from("Adapter Type:"),
                VideoCardStateEntry::String(String::from("Hercules InColor")),
            ),
            (
                String::from("Mode Register:"),
                VideoCardStateEntry::String(format!("{:08b}", self.mode_byte())),
            ),
            (
                String::from("Config Switch:"),
                VideoCardStateEntry::String(format!("{:08b}", self.config_switch_byte())),
            ),
            (
                String::from("Status Register:"),
                VideoCardStateEntry::String(format!("{:08b}", self.status)),
            ),
            (
                String::from("Renderer:"),
                VideoCardStateEntry::String(self.current_renderer().to_string()),
            ),
            (
                String::from("Window:"),
                VideoCardStateEntry::String(format!("{:05X}+{:05X}", self.mapping.address, self.mapping.size)),
            ),
            (
                String::from("Frame Count:"),
                VideoCardStateEntry::String(format!("{}", self.frame_count)),
            ),
            (
                String::from("Status Reads:"),
                VideoCardStateEntry::String(format!("{}", self.status_reads)),
            ),
        ];
        map.insert("General".to_string(), general_vec);

        let mut crtc_vec = Vec::new();
        for reg in CrtcRegister::iter() {
            crtc_vec.push((
                format!("{} [R{:02}]", reg, reg as u8),
                VideoCardStateEntry::Value8(self.crtc.get(reg)),
            ));
        }
        crtc_vec.push((
            String::from("Start Address:"),
            VideoCardStateEntry::Value16(self.crtc.start_address()),
        ));
        crtc_vec.push((
            String::from("Cursor Address:"),
            VideoCardStateEntry::Value16(self.crtc.cursor_address()),
        ));
        map.insert("CRTC".to_string(), crtc_vec);

        let xmode = self.crtc.xmode();
        let underline = self.crtc.underline();
        let overstrike = self.crtc.overstrike();
        let mut ext_vec = vec![
            (
                String::from("RAMfont:"),
                VideoCardStateEntry::String(format!("{:?}", xmode.ramfont())),
            ),
            (
                String::from("48K RAMfont:"),
                VideoCardStateEntry::String(format!("{:?}", xmode.ramfont_48k())),
            ),
            (
                String::from("90 Column:"),
                VideoCardStateEntry::String(format!("{:?}", xmode.ninety_column())),
            ),
            (
                String::from("Underline:"),
                VideoCardStateEntry::String(format!("row {} ink {}", underline.row, underline.ink)),
            ),
            (
                String::from("Overstrike:"),
                VideoCardStateEntry::String(format!("row {} ink {}", overstrike.row, overstrike.ink)),
            ),
            (
                String::from("Palette Enabled:"),
                VideoCardStateEntry::String(format!("{:?}", self.palette.enabled())),
            ),
        ];
        for (i, &colour) in self.palette.entries().iter().enumerate() {
            let rgb = INCOLOR_RGB[colour as usize];
            ext_vec.push((
                format!("Palette {:X}:", i),
                VideoCardStateEntry::Color(
                    format!("{:02X}", colour),
                    (rgb >> 16) as u8,
                    (rgb >> 8) as u8,
                    rgb as u8,
                ),
            ));
        }
        map.insert("InColor".to_string(), ext_vec);

        let internal_vec = vec![
            (String::from("vcc_c4:"), VideoCardStateEntry::Value8(self.vcc_c4)),
            (String::from("vlc_c9:"), VideoCardStateEntry::Value8(self.vlc_c9)),
            (String::from("vtac_c5:"), VideoCardStateEntry::Value8(self.vtac_c5)),
            (
                String::from("vsc_c3h:"),
                VideoCardStateEntry::String(format!("{}", self.vsc_c3h)),
            ),
            (String::from("vma:"), VideoCardStateEntry::Value16(self.vma)),
            (String::from("vma':"), VideoCardStateEntry::Value16(self.vma_t)),
            (
                String::from("Display Line:"),
                VideoCardStateEntry::String(format!("{}", self.display_line)),
            ),
            (
                String::from("Display Enabled:"),
                VideoCardStateEntry::String(format!("{:?}", self.display_enabled)),
            ),
            (
                String::from("Cursor:"),
                VideoCardStateEntry::String(format!(
                    "visible: {:?} line on: {:?} line off: {:?}",
                    self.cursor_visible, self.cursor_line_on, self.cursor_line_off
                )),
            ),
            (
                String::from("Blink:"),
                VideoCardStateEntry::String(format!("{}", self.blink)),
            ),
        ];
        map.insert("Internal".to_string(), internal_vec);

        map
    }

    fn get_frame_count(&self) -> u64 {
        self.frame_count
    }

    fn reset(&mut self) {
        log::debug!("Resetting InColor card");
        InColorCard::reset(self);
    }

    fn write_trace_log(&mut self, msg: String) {
        self.trace_logger.println(&msg);
    }

    fn trace_flush(&mut self) {
        self.trace_logger.flush();
    }
}
