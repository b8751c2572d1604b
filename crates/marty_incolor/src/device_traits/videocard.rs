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

    device_traits/videocard.rs

    The host side of video output, and the debugger-facing VideoCard trait.

*/

use std::collections::HashMap;

/// Emulator-wide video counters. Owned by the host and shared by whatever
/// display device is currently driving the window.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct HostVideoContext {
    /// Frames completed since power-on.
    pub frames: u64,
    /// Current window width, as last requested by a device.
    pub xsize: u32,
    /// Current window height, as last requested by a device.
    pub ysize: u32,
    /// Resolution reported to the user interface. Text modes report characters, graphics modes
    /// report pixels.
    pub res_x: u32,
    pub res_y: u32,
    /// Bits per pixel reported to the user interface. 0 for text modes.
    pub bpp: u32,
}

/// The host frame buffer a video device renders into.
///
/// A device writes each visible scanline into the row returned by [VideoHost::line_mut], then
/// presents a completed frame with [VideoHost::blit].
pub trait VideoHost {
    /// Block until the host has consumed the previous frame. Called before the first visible
    /// scanline of a frame is written.
    fn wait_for_buffer(&mut self);

    /// Return the pixel row for the specified scanline. Pixels are 0x00RRGGBB.
    fn line_mut(&mut self, line: usize) -> &mut [u32];

    /// Present `line_count` rows starting at `first_line`, scaled to a `width` x `height` window.
    fn blit(&mut self, first_line: u32, line_count: u32, width: u32, height: u32);

    /// Resize the output window.
    fn request_resize(&mut self, width: u32, height: u32);

    fn context_mut(&mut self) -> &mut HostVideoContext;
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum VideoCardStateEntry {
    Value8(u8),
    Value16(u16),
    String(String),
    Color(String, u8, u8, u8),
}

pub type VideoCardState = HashMap<String, Vec<(String, VideoCardStateEntry)>>;

pub trait VideoCard {
    /// Return the size (width, height) of the last presented frame.
    fn get_display_size(&self) -> (u32, u32);

    /// Return the status of VSYNC, HSYNC, and DISPLAY ENABLE.
    fn get_sync(&self) -> (bool, bool, bool);

    /// Get the current scanline being rendered.
    fn get_scanline(&self) -> u32;

    /// Get the current calculated video start address from the CRTC
    fn get_start_address(&self) -> u16;

    /// Returns whether the current display mode is a graphics mode
    fn is_graphics_mode(&self) -> bool;

    /// Returns the currently programmed character height
    /// (CRTC Maximum Scanline + 1)
    fn get_character_height(&self) -> u8;

    /// Returns a hash map of vectors containing name and value pairs.
    ///
    /// This allows returning multiple categories of related registers, for example the CRTC
    /// and the extended InColor registers.
    fn get_videocard_string_state(&self) -> VideoCardState;

    /// Return the number of frames the video device has rendered
    fn get_frame_count(&self) -> u64;

    /// Reset the video card
    fn reset(&mut self);

    /// Write a string to the video device's trace log (if one is configured)
    fn write_trace_log(&mut self, msg: String);

    /// Flush the trace log (if one is configured)
    fn trace_flush(&mut self);
}
