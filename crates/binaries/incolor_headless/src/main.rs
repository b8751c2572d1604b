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

    main.rs

    Headless runner for the InColor core. Programs a standard mode through
    the card's ports, fills video memory with a test pattern, runs a number
    of frames and optionally saves the last one as a PNG.

*/

use std::path::PathBuf;

use anyhow::{bail, Context};
use bpaf::Bpaf;

use marty_incolor::{
    bus::{DeviceRunTimeUnit, IoDevice, MemoryMappedDevice},
    config::HostChipset,
    devices::incolor::{
        font::{CharacterRom, GLYPH_ROWS},
        INCOLOR_CONFIG_SWITCH_REGISTER,
        INCOLOR_MEM_ADDRESS,
        INCOLOR_MODE_CONTROL_REGISTER,
        CRTC_REGISTER2,
        CRTC_REGISTER_SELECT2,
    },
    FrameBufferHost,
    InColorCard,
    InColorConfig,
};

const NOW: DeviceRunTimeUnit = DeviceRunTimeUnit::SystemTicks(0);

const MDA_TEXT_REGS: [u8; 12] = [97, 80, 82, 15, 25, 6, 25, 25, 2, 13, 11, 12];
const HGC_GFX_REGS: [u8; 12] = [0x35, 0x2D, 0x2E, 0x07, 0x5B, 0x02, 0x57, 0x57, 0x02, 0x03, 0x00, 0x00];

const XMODE_REGISTER: u8 = 0x14;
const RAMFONT_BASE: usize = 0x4000;
const RAMFONT_GLYPH_STRIDE: usize = 16;

// Give up on a frame after this many half-line advances.
const ADVANCE_LIMIT: usize = 100_000;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum RunMode {
    Text,
    RamFont,
    Graphics,
}

impl std::str::FromStr for RunMode {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, String> {
        match s {
            "text" => Ok(RunMode::Text),
            "ramfont" => Ok(RunMode::RamFont),
            "graphics" | "gfx" => Ok(RunMode::Graphics),
            _ => Err(format!("Bad value for mode: {}", s)),
        }
    }
}

#[derive(Debug, Bpaf)]
#[bpaf(options, version, generate(cli_args))]
pub struct CmdLineArgs {
    #[bpaf(long)]
    pub configfile: Option<PathBuf>,

    /// Overrides the chipset from the configuration file (Generic or I440fx)
    #[bpaf(long)]
    pub chipset: Option<HostChipset>,

    /// One of text, ramfont or graphics
    #[bpaf(long)]
    pub mode: Option<String>,

    #[bpaf(long)]
    pub frames: Option<u32>,

    #[bpaf(long)]
    pub message: Option<String>,

    #[bpaf(long)]
    pub output: Option<PathBuf>,

    #[bpaf(long, switch)]
    pub blink: bool,
}

/// Command line arguments override config file arguments.
fn overlay(config: &mut InColorConfig, args: &CmdLineArgs) {
    if let Some(chipset) = args.chipset {
        config.chipset = chipset;
    }
}

fn program_crtc(card: &mut InColorCard, regs: &[u8]) {
    for (index, &value) in regs.iter().enumerate() {
        card.write_u8(CRTC_REGISTER_SELECT2, index as u8, None, NOW);
        card.write_u8(CRTC_REGISTER2, value, None, NOW);
    }
}

fn fill_text(card: &mut InColorCard, message: &str) {
    let bytes = message.as_bytes();
    for cell in 0..80 * 25 {
        let row = cell / 80;
        let chr = if row % 2 == 0 && !bytes.is_empty() {
            bytes[cell % bytes.len()]
        }
        else {
            // Walk the whole character set on odd rows.
            (cell & 0xFF) as u8
        };
        let attr = match row % 4 {
            0 => 0x07,
            1 => 0x0F,
            2 => 0x70,
            _ => 0x81,
        };
        card.mmio_write_u8(INCOLOR_MEM_ADDRESS + cell * 2, chr, None);
        card.mmio_write_u8(INCOLOR_MEM_ADDRESS + cell * 2 + 1, attr, None);
    }
}

/// Upload the character ROM into the RAMfont area, inverting every glyph so the result is
/// distinguishable from ROM font output.
fn upload_ramfont(card: &mut InColorCard) {
    let rom = CharacterRom::builtin();
    for chr in 0..=255u8 {
        for row in 0..GLYPH_ROWS as u8 {
            let addr = RAMFONT_BASE + RAMFONT_GLYPH_STRIDE * chr as usize + row as usize;
            card.mmio_write_u8(INCOLOR_MEM_ADDRESS + addr, !rom.glyph_row(chr, row), None);
        }
    }
}

fn fill_graphics(card: &mut InColorCard) {
    // 348 lines interleaved over four 8K banks, 90 bytes per line.
    for y in 0..348usize {
        let base = (y & 3) * 0x2000 + (y >> 2) * 90;
        for x in 0..90usize {
            let byte = if (x / 4 + y / 32) % 2 == 0 { 0xFF } else { 0x00 };
            card.mmio_write_u8(INCOLOR_MEM_ADDRESS + base + x, byte, None);
        }
    }
}

fn setup(card: &mut InColorCard, mode: RunMode, message: &str, blink: bool) {
    let blink_bit = if blink { 0x20 } else { 0x00 };
    match mode {
        RunMode::Text | RunMode::RamFont => {
            card.write_u8(INCOLOR_CONFIG_SWITCH_REGISTER, 0x00, None, NOW);
            card.write_u8(INCOLOR_MODE_CONTROL_REGISTER, 0x08 | blink_bit, None, NOW);
            program_crtc(card, &MDA_TEXT_REGS);
            fill_text(card, message);
            if mode == RunMode::RamFont {
                upload_ramfont(card);
                card.write_u8(CRTC_REGISTER_SELECT2, XMODE_REGISTER, None, NOW);
                card.write_u8(CRTC_REGISTER2, 0x01, None, NOW);
            }
        }
        RunMode::Graphics => {
            card.write_u8(INCOLOR_CONFIG_SWITCH_REGISTER, 0x01, None, NOW);
            card.write_u8(INCOLOR_MODE_CONTROL_REGISTER, 0x0A | blink_bit, None, NOW);
            program_crtc(card, &HGC_GFX_REGS);
            fill_graphics(card);
        }
    }
}

fn run_frames(card: &mut InColorCard, host: &mut FrameBufferHost, frames: u32) -> anyhow::Result<()> {
    for frame in 0..frames {
        let target = host.blits().len() + 1;
        let mut advances = 0;
        while host.blits().len() < target {
            card.advance(host);
            advances += 1;
            if advances >= ADVANCE_LIMIT {
                bail!("Frame {} did not complete after {} advances", frame, ADVANCE_LIMIT);
            }
        }
        if let Some(blit) = host.last_blit() {
            log::debug!(
                "Frame {}: lines {}..{} width {} after {} advances",
                frame,
                blit.first_line,
                blit.first_line + blit.line_count,
                blit.width,
                advances
            );
        }
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let args: CmdLineArgs = cli_args().run();

    let mut config = match args.configfile.as_ref() {
        Some(path) => {
            InColorConfig::from_file(path).with_context(|| format!("loading {}", path.display()))?
        }
        None => InColorConfig::default(),
    };
    overlay(&mut config, &args);

    let mode: RunMode = match args.mode.as_deref() {
        Some(mode) => mode.parse().map_err(anyhow::Error::msg)?,
        None => RunMode::Text,
    };
    let frames = args.frames.unwrap_or(2).max(1);
    let message = args.message.unwrap_or_else(|| "Hercules InColor ".to_string());

    let mut card = InColorCard::new(&config).context("creating card")?;
    let mut host = FrameBufferHost::default();

    setup(&mut card, mode, &message, args.blink);
    log::info!("Running {} frame(s) in {:?} mode", frames, mode);
    run_frames(&mut card, &mut host, frames)?;

    let ctx = host.context();
    log::info!(
        "Display {}x{} ({}x{} cells), {} frames presented",
        ctx.xsize,
        ctx.ysize,
        ctx.res_x,
        ctx.res_y,
        ctx.frames
    );

    if let Some(output) = args.output.as_ref() {
        let Some((w, h, rgba)) = host.last_frame_rgba()
        else {
            bail!("No frame was presented");
        };
        let img = image::RgbaImage::from_raw(w, h, rgba).context("frame buffer size mismatch")?;
        img.save(output).with_context(|| format!("writing {}", output.display()))?;
        log::info!("Wrote {}x{} frame to {}", w, h, output.display());
    }

    card.close();
    Ok(())
}
