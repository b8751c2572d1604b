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

    framebuffer.rs

    An in-memory VideoHost. Used by the headless runner, the benchmarks and
    tests; a windowed front end would implement VideoHost over its own
    surface instead.

*/

use crate::device_traits::videocard::{HostVideoContext, VideoHost};

/// Wide enough for 255 graphics cells of 16 pixels.
pub const DEFAULT_BUFFER_WIDTH: usize = 4096;
/// The display line counter wraps at 500, so 512 rows always suffice.
pub const DEFAULT_BUFFER_HEIGHT: usize = 512;

/// A single call to [VideoHost::blit].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct BlitRecord {
    pub first_line: u32,
    pub line_count: u32,
    pub width: u32,
    pub height: u32,
}

pub struct FrameBufferHost {
    width: usize,
    height: usize,
    buf: Vec<u32>,
    // A sink for rows outside the buffer, so line_mut never has to fail.
    scratch: Vec<u32>,
    context: HostVideoContext,
    blits: Vec<BlitRecord>,
    resizes: Vec<(u32, u32)>,
    buffer_waits: u64,
}

impl Default for FrameBufferHost {
    fn default() -> Self {
        Self::new(DEFAULT_BUFFER_WIDTH, DEFAULT_BUFFER_HEIGHT)
    }
}

impl FrameBufferHost {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            buf: vec![0; width * height],
            scratch: vec![0; width],
            context: HostVideoContext::default(),
            blits: Vec::new(),
            resizes: Vec::new(),
            buffer_waits: 0,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Return the pixel row for a scanline, or an empty slice if the line is outside the buffer.
    pub fn row(&self, line: usize) -> &[u32] {
        if line < self.height {
            &self.buf[line * self.width..(line + 1) * self.width]
        }
        else {
            &[]
        }
    }

    pub fn pixel(&self, x: usize, y: usize) -> Option<u32> {
        self.row(y).get(x).copied()
    }

    pub fn context(&self) -> &HostVideoContext {
        &self.context
    }

    pub fn blits(&self) -> &[BlitRecord] {
        &self.blits
    }

    pub fn last_blit(&self) -> Option<BlitRecord> {
        self.blits.last().copied()
    }

    pub fn resizes(&self) -> &[(u32, u32)] {
        &self.resizes
    }

    pub fn buffer_waits(&self) -> u64 {
        self.buffer_waits
    }

    /// Forget recorded blits and resizes, keeping pixel contents and the context.
    pub fn clear_history(&mut self) {
        self.blits.clear();
        self.resizes.clear();
        self.buffer_waits = 0;
    }

    /// Copy out the area presented by the last blit as packed RGBA bytes, along with its
    /// dimensions. Returns None if nothing has been presented yet.
    pub fn last_frame_rgba(&self) -> Option<(u32, u32, Vec<u8>)> {
        let blit = self.last_blit()?;
        let w = (blit.width as usize).min(self.width);
        let h = blit.line_count as usize;

        let mut rgba = Vec::with_capacity(w * h * 4);
        for y in 0..h {
            let row = self.row(blit.first_line as usize + y);
            for x in 0..w {
                let p = row.get(x).copied().unwrap_or(0);
                rgba.extend_from_slice(&[(p >> 16) as u8, (p >> 8) as u8, p as u8, 0xFF]);
            }
        }
        Some((w as u32, h as u32, rgba))
    }
}

impl VideoHost for FrameBufferHost {
    fn wait_for_buffer(&mut self) {
        self.buffer_waits += 1;
    }

    fn line_mut(&mut self, line: usize) -> &mut [u32] {
        if line < self.height {
            &mut self.buf[line * self.width..(line + 1) * self.width]
        }
        else {
            log::warn!("Scanline {} is outside the frame buffer", line);
            &mut self.scratch
        }
    }

    fn blit(&mut self, first_line: u32, line_count: u32, width: u32, height: u32) {
        self.blits.push(BlitRecord {
            first_line,
            line_count,
            width,
            height,
        });
    }

    fn request_resize(&mut self, width: u32, height: u32) {
        log::debug!("Frame buffer resize requested: {}x{}", width, height);
        self.resizes.push((width, height));
    }

    fn context_mut(&mut self) -> &mut HostVideoContext {
        &mut self.context
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rows_are_independent() {
        let mut host = FrameBufferHost::new(16, 4);
        host.line_mut(1)[3] = 0x00AA_BBCC;
        assert_eq!(host.pixel(3, 1), Some(0x00AA_BBCC));
        assert_eq!(host.pixel(3, 0), Some(0));
        assert_eq!(host.pixel(3, 2), Some(0));
    }

    #[test]
    fn out_of_range_rows_go_to_scratch() {
        let mut host = FrameBufferHost::new(8, 2);
        host.line_mut(5)[0] = 0xFFFFFF;
        assert!(host.row(5).is_empty());
        assert!(host.row(0).iter().all(|&p| p == 0));
        assert!(host.row(1).iter().all(|&p| p == 0));
    }

    #[test]
    fn last_frame_rgba_unpacks_pixels() {
        let mut host = FrameBufferHost::new(4, 4);
        host.line_mut(2)[1] = 0x0012_3456;
        host.blit(2, 1, 2, 1);

        let (w, h, rgba) = host.last_frame_rgba().unwrap();
        assert_eq!((w, h), (2, 1));
        assert_eq!(rgba, vec![0, 0, 0, 0xFF, 0x12, 0x34, 0x56, 0xFF]);
    }

    #[test]
    fn records_blits_and_resizes() {
        let mut host = FrameBufferHost::default();
        assert!(host.last_frame_rgba().is_none());
        host.wait_for_buffer();
        host.request_resize(720, 350);
        host.blit(20, 350, 720, 350);
        assert_eq!(host.buffer_waits(), 1);
        assert_eq!(host.resizes(), &[(720, 350)]);
        assert_eq!(host.blits().len(), 1);

        host.clear_history();
        assert!(host.blits().is_empty());
        assert_eq!(host.buffer_waits(), 0);
    }
}
