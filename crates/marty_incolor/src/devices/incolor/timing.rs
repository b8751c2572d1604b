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

    devices/incolor/timing.rs

    The scanline timing state machine.

    Each scanline is processed in two halves. The blank half raises the
    in-progress status bit and renders the line if the display is enabled.
    The active half advances the CRTC counters: scanline within the row,
    character row, vertical adjust and vertical sync, and at vertical sync
    presents the finished frame to the host.

    Times are in host timer ticks: host CPU clocks scaled by 2^TIMER_SHIFT.

*/

use super::*;
use crate::{bus::DeviceRunTimeUnit, device_traits::videocard::VideoHost};

/// The MDA character clock: a 16.257MHz dot clock divided by 8.
pub const MDA_CHAR_CLOCK_HZ: f64 = 2_032_125.0;
pub const TIMER_SHIFT: u32 = 6;
const TIMER_SCALE: f64 = (1u64 << TIMER_SHIFT) as f64;

impl InColorCard {
    /// Recompute the length of each half of a scanline from R0, R1 and the host clock.
    pub(crate) fn recalc_timings(&mut self) {
        let total = self.crtc.horizontal_total() as f64 + 1.0;
        let on = self.crtc.horizontal_displayed() as f64;
        let off = total - on;
        let char_clock = self.host_clock_hz / MDA_CHAR_CLOCK_HZ;

        self.disp_on_ticks = (on * char_clock * TIMER_SCALE) as i64;
        self.disp_off_ticks = (off * char_clock * TIMER_SCALE) as i64;
        self.degenerate_warned = false;
    }

    /// The host CPU clock changed. Scan position is kept.
    pub fn speed_changed(&mut self, clock_hz: f64) {
        log::debug!("InColor host clock changed: {} Hz -> {} Hz", self.host_clock_hz, clock_hz);
        self.host_clock_hz = clock_hz;
        self.recalc_timings();
    }

    pub fn host_clock_hz(&self) -> f64 {
        self.host_clock_hz
    }

    /// Ticks spent in the displayed and retrace portions of a scanline.
    pub fn line_timings(&self) -> (i64, i64) {
        (self.disp_on_ticks, self.disp_off_ticks)
    }

    /// Device time owed to (negative) or ahead of (positive) the host.
    pub fn vid_time(&self) -> i64 {
        self.vid_time
    }

    /// Process one half scanline. Returns the number of ticks until the next call is due;
    /// the same amount is credited to the device's time balance.
    pub fn advance(&mut self, host: &mut dyn VideoHost) -> i64 {
        let ticks = match self.half {
            HalfLine::Blank => self.blank_half(host),
            HalfLine::Active => self.active_half(host),
        };
        self.vid_time += ticks;
        ticks
    }

    /// Run the device for `ticks` host timer ticks, calling advance() until the device has
    /// caught up.
    pub fn run(&mut self, host: &mut dyn VideoHost, ticks: i64) {
        if self.disp_on_ticks + self.disp_off_ticks <= 0 {
            if !self.degenerate_warned {
                log::warn!(
                    "InColor scanline has no length (R0: {} R1: {}), not running",
                    self.crtc.horizontal_total(),
                    self.crtc.horizontal_displayed()
                );
                self.degenerate_warned = true;
            }
            return;
        }

        self.vid_time -= ticks;
        while self.vid_time <= 0 {
            self.advance(host);
        }
    }

    /// Run the device for a period expressed in host CPU clocks or microseconds.
    pub fn run_for(&mut self, host: &mut dyn VideoHost, time: DeviceRunTimeUnit) {
        let ticks = match time {
            DeviceRunTimeUnit::SystemTicks(clocks) => (clocks as i64) << TIMER_SHIFT,
            DeviceRunTimeUnit::Microseconds(us) => (us * self.host_clock_hz / 1_000_000.0 * TIMER_SCALE) as i64,
        };
        self.run(host, ticks);
    }

    fn blank_half(&mut self, host: &mut dyn VideoHost) -> i64 {
        self.status |= STATUS_HRETRACE;
        self.half = HalfLine::Active;

        let saved_vlc = self.vlc_c9;
        if self.crtc.scanline_doubled() {
            self.vlc_c9 = (self.vlc_c9 << 1) & 7;
        }

        if self.display_enabled {
            if (self.display_line as i32) < self.first_line {
                self.first_line = self.display_line as i32;
                host.wait_for_buffer();
            }
            self.last_line = self.display_line as i32;
            self.draw_scanline(host);
        }

        self.vlc_c9 = saved_vlc;
        if self.vcc_c4 == self.crtc.vertical_sync_pos() && self.vlc_c9 == 0 {
            self.status |= STATUS_VRETRACE;
        }

        self.display_line += 1;
        if self.display_line >= DISPLAY_LINE_MAX {
            self.display_line = 0;
        }

        self.disp_off_ticks
    }

    /// Compare the scanline counter against a row register, allowing for scanline doubling.
    #[inline]
    fn vlc_matches(&self, value: u8) -> bool {
        self.vlc_c9 == value || (self.crtc.scanline_doubled() && self.vlc_c9 == value >> 1)
    }

    fn active_half(&mut self, host: &mut dyn VideoHost) -> i64 {
        if self.display_enabled {
            self.status &= !STATUS_HRETRACE;
        }
        self.half = HalfLine::Blank;

        if self.vsc_c3h > 0 {
            self.vsc_c3h -= 1;
            if self.vsc_c3h == 0 {
                self.status &= !STATUS_VRETRACE;
            }
        }

        if self.vlc_matches(self.crtc.cursor_end()) {
            self.cursor_line_on = false;
            self.cursor_line_off = true;
        }

        if self.vtac_c5 > 0 {
            // In vertical total adjust.
            self.vlc_c9 = (self.vlc_c9 + 1) & 0x1F;
            self.vma = self.vma_t;
            self.vtac_c5 -= 1;
            if self.vtac_c5 == 0 {
                self.display_enabled = true;
                self.vma = self.crtc.start_address();
                self.vma_t = self.vma;
                self.vlc_c9 = 0;
            }
        }
        else if self.vlc_matches(self.crtc.maximum_scanline()) {
            self.end_of_row(host);
        }
        else {
            self.vlc_c9 = (self.vlc_c9 + 1) & 0x1F;
            self.vma = self.vma_t;
        }

        if self.vlc_matches(self.crtc.cursor_start()) {
            self.cursor_line_on = true;
        }

        self.disp_on_ticks
    }

    fn end_of_row(&mut self, host: &mut dyn VideoHost) {
        self.vma_t = self.vma;
        self.vlc_c9 = 0;

        let old_vcc = self.vcc_c4;
        self.vcc_c4 = (self.vcc_c4 + 1) & 0x7F;

        if self.vcc_c4 == self.crtc.vertical_displayed() {
            self.display_enabled = false;
        }

        if old_vcc == self.crtc.vertical_total() {
            self.vcc_c4 = 0;
            self.vtac_c5 = self.crtc.vertical_total_adjust();
            if self.vtac_c5 == 0 {
                self.display_enabled = true;
                self.vma = self.crtc.start_address();
                self.vma_t = self.vma;
            }
            self.cursor_visible = !self.crtc.cursor_disabled() && (self.blink & BLINK_PHASE_MASK) != 0;
        }

        if self.vcc_c4 == self.crtc.vertical_sync_pos() {
            self.display_enabled = false;
            self.display_line = 0;
            self.vsc_c3h = VSYNC_LINES;
            if self.crtc.vertical_sync_pos() != 0 {
                self.finish_frame(host);
            }
            self.first_line = FIRST_LINE_NONE;
            self.last_line = 0;
            self.blink = self.blink.wrapping_add(1);
        }
    }

    /// Present the frame just completed and publish its dimensions to the host.
    fn finish_frame(&mut self, host: &mut dyn VideoHost) {
        let graphics = self.is_graphics();
        let columns = self.crtc.horizontal_displayed() as u32;
        let rows = self.crtc.vertical_displayed() as u32;

        let width = if graphics {
            columns * GFX_CELL_WIDTH as u32
        }
        else {
            columns * TEXT_CHAR_WIDTH as u32
        };

        self.last_line += 1;
        let height = self.last_line - self.first_line;
        let line_count = height.max(0) as u32;

        let ctx = host.context_mut();
        let mut resize = None;
        if width != ctx.xsize || height != ctx.ysize as i32 {
            let mut new_w = width;
            let mut new_h = height;
            if new_w < MIN_RESIZE_WIDTH {
                new_w = FALLBACK_WIDTH;
            }
            if new_h < MIN_RESIZE_HEIGHT as i32 {
                new_h = FALLBACK_HEIGHT as i32;
            }
            ctx.xsize = new_w;
            ctx.ysize = new_h as u32;
            resize = Some((new_w, new_h as u32));
        }
        let xsize = ctx.xsize;

        ctx.frames += 1;
        if graphics {
            ctx.res_x = columns * 16;
            ctx.res_y = rows * 4;
            ctx.bpp = 1;
        }
        else {
            ctx.res_x = columns;
            ctx.res_y = rows;
            ctx.bpp = 0;
        }

        if let Some((w, h)) = resize {
            log::debug!("InColor resize: {}x{}", w, h);
            host.request_resize(w, h);
        }

        host.blit(self.first_line.max(0) as u32, line_count, xsize, line_count);
        self.frame_count += 1;
        self.display_size = (xsize, line_count);

        trace!(
            self,
            "frame {}: lines {}-{} width {} ({})",
            self.frame_count,
            self.first_line,
            self.last_line,
            xsize,
            if graphics { "graphics" } else { "text" }
        );
    }
}
