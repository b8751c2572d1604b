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

    devices/incolor/mod.rs

    Implementation of the Hercules InColor / Hercules Plus display adapter.

    The card is a Hercules Graphics Card with 64K of video memory, a 6845
    CRTC extended with RAMfont registers, and a 16-of-64 colour palette.
    Timing is scanline-granular: each call to advance() processes one half
    of a scanline (the displayed portion or the retrace portion) and reports
    how long until the next half.

*/

use modular_bitfield::{bitfield, prelude::*};

use crate::{
    bus::MemRangeDescriptor,
    config::{HostChipset, InColorConfig, MemoryWindow},
    error::InColorError,
    tracelogger::TraceLogger,
};

macro_rules! trace {
    ($self:ident, $($t:tt)*) => {{
        if $self.trace_logger.is_some() {
            $self.trace_logger.println(&format!($($t)*));
        }
    }};
}

pub(crate) use trace;

pub mod attr;
pub mod crtc;
pub mod draw;
pub mod font;
mod io;
mod mmio;
pub mod palette;
mod timing;
mod videocard;

use crtc::CrtcRegisterFile;
use draw::LineRenderer;
use font::CharacterRom;
use palette::PaletteExtension;

pub use io::*;

pub const INCOLOR_MEM_ADDRESS: usize = 0xB0000;
pub const INCOLOR_MEM_SIZE: usize = 0x10000;
pub const INCOLOR_MEM_MASK: usize = 0xFFFF;
pub const INCOLOR_APERTURE_HALF: usize = 0x8000;
pub const INCOLOR_APERTURE_FULL: usize = 0x10000;

// Status register bits.
pub const STATUS_HRETRACE: u8 = 0b0000_0001;
pub const STATUS_VRETRACE: u8 = 0b0000_1000;

// Cell widths in pixels.
pub const TEXT_CHAR_WIDTH: usize = 9;
pub const TEXT_CHAR_WIDTH_90COL: usize = 8;
pub const GFX_CELL_WIDTH: usize = 16;

/// The display line counter wraps here.
pub const DISPLAY_LINE_MAX: u32 = 500;
/// Length of the vertical retrace, in scanlines.
pub const VSYNC_LINES: u32 = 16;
/// first_line value meaning "no line displayed yet this frame".
pub const FIRST_LINE_NONE: i32 = 1000;

/// The cursor and blinking text toggle every 16 frames.
pub const BLINK_PHASE_MASK: u32 = 0x10;

// Degenerate window sizes are replaced with these before a resize is requested.
pub const MIN_RESIZE_WIDTH: u32 = 64;
pub const MIN_RESIZE_HEIGHT: u32 = 32;
pub const FALLBACK_WIDTH: u32 = 656;
pub const FALLBACK_HEIGHT: u32 = 200;

#[bitfield]
#[derive(Copy, Clone)]
pub struct ModeControlRegister {
    #[skip]
    unused0: bool,
    pub graphics: bool,
    #[skip]
    unused1: bool,
    pub display_enable: bool,
    #[skip]
    unused2: bool,
    pub blink_enable: bool,
    #[skip]
    unused3: bool,
    pub page_one: bool,
}

#[bitfield]
#[derive(Copy, Clone)]
pub struct ConfigSwitch {
    pub enable_gfx: bool,
    pub enable_page: bool,
    #[skip]
    unused: B6,
}

/// Which half of a scanline the timing state machine will process next.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum HalfLine {
    /// The retrace portion: sets the in-progress status bit and renders the line.
    #[default]
    Blank,
    /// The displayed portion: advances the CRTC counters.
    Active,
}

pub struct InColorCard {
    crtc: CrtcRegisterFile,
    mode: ModeControlRegister,
    config_switch: ConfigSwitch,
    status: u8,
    palette: PaletteExtension,
    font: CharacterRom,
    chipset: HostChipset,
    initial_window: MemoryWindow,
    mapping: MemRangeDescriptor,

    half: HalfLine,
    display_line: u32,
    first_line: i32,
    last_line: i32,
    vcc_c4: u8,  // Vertical character row counter
    vlc_c9: u8,  // Scanline within the character row
    vtac_c5: u8, // Vertical total adjust lines remaining
    vsc_c3h: u32, // Vertical sync lines remaining
    vma: u16,
    vma_t: u16,
    cursor_line_on: bool,
    cursor_line_off: bool,
    cursor_visible: bool,
    blink: u32,
    display_enabled: bool,

    host_clock_hz: f64,
    disp_on_ticks: i64,
    disp_off_ticks: i64,
    vid_time: i64,
    degenerate_warned: bool,

    frame_count: u64,
    status_reads: u64,
    lines_rendered: [u64; LineRenderer::COUNT],
    display_size: (u32, u32),

    vram: Box<[u8; INCOLOR_MEM_SIZE]>,
    trace_logger: TraceLogger,
}

fn window_mapping(window: MemoryWindow) -> MemRangeDescriptor {
    let size = match window {
        MemoryWindow::Half => INCOLOR_APERTURE_HALF,
        MemoryWindow::Full => INCOLOR_APERTURE_FULL,
    };
    MemRangeDescriptor::new(INCOLOR_MEM_ADDRESS, size, false)
}

impl InColorCard {
    pub fn new(config: &InColorConfig) -> Result<Self, InColorError> {
        let font = match &config.font_rom {
            Some(path) => CharacterRom::from_file(path)?,
            None => CharacterRom::builtin(),
        };

        let vram: Box<[u8; INCOLOR_MEM_SIZE]> = vec![0; INCOLOR_MEM_SIZE]
            .into_boxed_slice()
            .try_into()
            .map_err(|_| InColorError::VramAllocation)?;

        let trace_logger = match &config.trace_file {
            Some(path) => TraceLogger::from_filename(path),
            None => TraceLogger::None,
        };

        let mut card = Self {
            crtc: CrtcRegisterFile::new(),
            mode: ModeControlRegister::new(),
            config_switch: ConfigSwitch::new(),
            status: 0,
            palette: PaletteExtension::new(config.palette_extension),
            font,
            chipset: config.chipset,
            initial_window: config.memory_window,
            mapping: window_mapping(config.memory_window),

            half: HalfLine::Blank,
            display_line: 0,
            first_line: 0,
            last_line: 0,
            vcc_c4: 0,
            vlc_c9: 0,
            vtac_c5: 0,
            vsc_c3h: 0,
            vma: 0,
            vma_t: 0,
            cursor_line_on: false,
            cursor_line_off: false,
            cursor_visible: false,
            blink: 0,
            display_enabled: false,

            host_clock_hz: config.clock_hz,
            disp_on_ticks: 0,
            disp_off_ticks: 0,
            vid_time: 0,
            degenerate_warned: false,

            frame_count: 0,
            status_reads: 0,
            lines_rendered: [0; LineRenderer::COUNT],
            display_size: (0, 0),

            vram,
            trace_logger,
        };

        card.recalc_timings();
        log::debug!(
            "InColor card created: chipset {:?}, host clock {} Hz, window {:?}",
            card.chipset,
            card.host_clock_hz,
            config.memory_window
        );
        Ok(card)
    }

    /// Release the card. The trace log is flushed; everything else is dropped.
    pub fn close(mut self) {
        self.trace_logger.flush();
        log::debug!("InColor card closed after {} frames", self.frame_count);
    }

    /// Return to power-on register and scan state. Configuration, the palette enable, the
    /// character ROM and VRAM contents are kept.
    pub fn reset(&mut self) {
        self.crtc = CrtcRegisterFile::new();
        self.mode = ModeControlRegister::new();
        self.config_switch = ConfigSwitch::new();
        self.status = 0;
        self.palette.reset();
        self.mapping = window_mapping(self.initial_window);

        self.half = HalfLine::Blank;
        self.display_line = 0;
        self.first_line = 0;
        self.last_line = 0;
        self.vcc_c4 = 0;
        self.vlc_c9 = 0;
        self.vtac_c5 = 0;
        self.vsc_c3h = 0;
        self.vma = 0;
        self.vma_t = 0;
        self.cursor_line_on = false;
        self.cursor_line_off = false;
        self.cursor_visible = false;
        self.blink = 0;
        self.display_enabled = false;
        self.vid_time = 0;
        self.degenerate_warned = false;
        self.status_reads = 0;
        self.lines_rendered = [0; LineRenderer::COUNT];

        self.recalc_timings();
        trace!(self, "reset");
    }

    pub fn crtc(&self) -> &CrtcRegisterFile {
        &self.crtc
    }

    pub fn mode_byte(&self) -> u8 {
        self.mode.into_bytes()[0]
    }

    pub fn config_switch_byte(&self) -> u8 {
        self.config_switch.into_bytes()[0]
    }

    /// The programmable palette. It has no port of its own; the host programs it directly.
    pub fn palette_mut(&mut self) -> &mut PaletteExtension {
        &mut self.palette
    }

    pub fn palette(&self) -> &PaletteExtension {
        &self.palette
    }

    pub fn vram(&self) -> &[u8] {
        &self.vram[..]
    }

    pub fn blink_counter(&self) -> u32 {
        self.blink
    }

    pub fn vcc(&self) -> u8 {
        self.vcc_c4
    }

    pub fn vlc(&self) -> u8 {
        self.vlc_c9
    }

    pub fn display_line(&self) -> u32 {
        self.display_line
    }

    pub fn display_enabled(&self) -> bool {
        self.display_enabled
    }

    pub fn half_line(&self) -> HalfLine {
        self.half
    }

    pub fn status_reads(&self) -> u64 {
        self.status_reads
    }

    /// Number of scanlines drawn by the given strategy since power-on or reset.
    pub fn lines_rendered(&self, renderer: LineRenderer) -> u64 {
        self.lines_rendered[renderer as usize]
    }

    /// Graphics output requires both the mode register and the configuration switch to allow it.
    #[inline]
    pub fn is_graphics(&self) -> bool {
        self.mode.graphics() && self.config_switch.enable_gfx()
    }

    /// The renderer the next visible scanline would use.
    pub fn current_renderer(&self) -> LineRenderer {
        LineRenderer::select(self.is_graphics(), self.crtc.xmode())
    }

    /// Replace the trace sink, for example with an in-memory buffer.
    pub fn set_trace_logger(&mut self, logger: TraceLogger) {
        self.trace_logger = logger;
    }

    pub fn trace_logger(&self) -> &TraceLogger {
        &self.trace_logger
    }

    fn handle_mode_register(&mut self, data: u8) {
        self.mode = ModeControlRegister::from_bytes([data]);
        log::debug!(
            "Write to InColor mode register: {:02X} (graphics: {} enable: {} blink: {} page1: {})",
            data,
            self.mode.graphics(),
            self.mode.display_enable(),
            self.mode.blink_enable(),
            self.mode.page_one()
        );
        trace!(self, "mode <- {:02X}", data);
    }

    fn handle_status_register_read(&mut self) -> u8 {
        self.status_reads += 1;
        (self.status & 0x0F) | ((self.status & STATUS_VRETRACE) << 4) | 0x10
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::{DeviceRunTimeUnit, IoDevice};

    pub(crate) fn test_card() -> InColorCard {
        InColorCard::new(&InColorConfig::default()).unwrap()
    }

    #[test]
    fn new_card_is_zeroed() {
        let card = test_card();
        assert!(card.vram().iter().all(|&b| b == 0));
        assert_eq!(card.vram().len(), INCOLOR_MEM_SIZE);
        assert_eq!(card.mode_byte(), 0);
        assert_eq!(card.config_switch_byte(), 0);
        assert!(!card.display_enabled());
        assert_eq!(card.half_line(), HalfLine::Blank);
    }

    #[test]
    fn missing_font_rom_fails_construction() {
        let config = InColorConfig {
            font_rom: Some("/nonexistent/incolor.rom".into()),
            ..InColorConfig::default()
        };
        assert!(matches!(InColorCard::new(&config), Err(InColorError::FontRomIo { .. })));
    }

    #[test]
    fn mode_register_bits() {
        let mut card = test_card();
        card.write_u8(0x3B8, 0b1010_1010, None, DeviceRunTimeUnit::SystemTicks(0));
        assert!(card.mode.graphics());
        assert!(card.mode.display_enable());
        assert!(card.mode.blink_enable());
        assert!(card.mode.page_one());
        assert_eq!(card.mode_byte(), 0b1010_1010);
        // Graphics also needs the configuration switch.
        assert!(!card.is_graphics());
        card.write_u8(0x3BF, 0x01, None, DeviceRunTimeUnit::SystemTicks(0));
        assert!(card.is_graphics());
        assert_eq!(card.current_renderer(), LineRenderer::Graphics);
    }

    #[test]
    fn reset_keeps_vram_and_configuration() {
        let config = InColorConfig {
            palette_extension: true,
            memory_window: MemoryWindow::Half,
            ..InColorConfig::default()
        };
        let mut card = InColorCard::new(&config).unwrap();
        card.vram_write(0x10, 0x55, None);
        card.write_u8(0x3B0, 1, None, DeviceRunTimeUnit::SystemTicks(0));
        card.write_u8(0x3B1, 80, None, DeviceRunTimeUnit::SystemTicks(0));
        card.write_u8(0x3BF, 0x03, None, DeviceRunTimeUnit::SystemTicks(0));
        card.palette_mut().write(0x3F);

        card.reset();

        assert_eq!(card.vram_read(0x10), 0x55);
        assert_eq!(card.crtc().horizontal_displayed(), 0);
        assert_eq!(card.config_switch_byte(), 0);
        assert!(card.palette().enabled());
        assert_eq!(card.palette().entries(), &palette::DEFAULT_PALETTE);
        assert_eq!(card.mapping.size, INCOLOR_APERTURE_HALF);
    }

    #[test]
    fn reset_is_traced() {
        let mut card = test_card();
        card.set_trace_logger(TraceLogger::Buffer(Vec::new()));
        card.reset();
        assert_eq!(card.trace_logger().lines(), &["reset".to_string()]);
        card.close();
    }
}
