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

    ---------------------------------------------------------------------------

    benches::incolor_bench.rs

    Benchmarks for the InColor device.

*/

use marty_incolor::{
    bus::{DeviceRunTimeUnit, IoDevice, MemoryMappedDevice},
    FrameBufferHost,
    InColorCard,
    InColorConfig,
};

use criterion::{black_box, criterion_group, criterion_main, Criterion};

const NOW: DeviceRunTimeUnit = DeviceRunTimeUnit::SystemTicks(0);

// 80x25 text: 26 rows of 14 lines plus 6 adjust lines, two halves per line.
const TEXT_FRAME_ADVANCES: usize = 370 * 2;
// 720x348 graphics: 92 rows of 4 lines plus 2 adjust lines.
const GFX_FRAME_ADVANCES: usize = 370 * 2;

fn make_card(mode: u8, config: u8, xmode: u8, regs: &[u8]) -> InColorCard {
    let mut card = InColorCard::new(&InColorConfig::default()).unwrap();
    card.write_u8(0x3BF, config, None, NOW);
    card.write_u8(0x3B8, mode, None, NOW);
    for (index, &value) in regs.iter().enumerate() {
        card.write_u8(0x3B4, index as u8, None, NOW);
        card.write_u8(0x3B5, value, None, NOW);
    }
    card.write_u8(0x3B4, 20, None, NOW);
    card.write_u8(0x3B5, xmode, None, NOW);

    for i in 0..0x10000usize {
        card.mmio_write_u8(0xB0000 + i, (i * 7) as u8, None);
    }
    card
}

pub fn incolor_frame_bench(c: &mut Criterion) {
    let text_regs = [97, 80, 82, 15, 25, 6, 25, 25, 2, 13, 11, 12];
    let gfx_regs = [0x35, 0x2D, 0x2E, 0x07, 0x5B, 0x02, 0x57, 0x57, 0x02, 0x03, 0x00, 0x00];

    c.bench_function("incolor_bench_frame_rom_font", |b| {
        let mut card = make_card(0x08, 0x00, 0x00, &text_regs);
        let mut host = FrameBufferHost::default();

        b.iter(|| {
            for _ in 0..TEXT_FRAME_ADVANCES {
                black_box(card.advance(&mut host));
            }
        });
    });

    c.bench_function("incolor_bench_frame_ramfont_48k", |b| {
        let mut card = make_card(0x08, 0x00, 0x05, &text_regs);
        let mut host = FrameBufferHost::default();

        b.iter(|| {
            for _ in 0..TEXT_FRAME_ADVANCES {
                black_box(card.advance(&mut host));
            }
        });
    });

    c.bench_function("incolor_bench_frame_graphics", |b| {
        let mut card = make_card(0x0A, 0x01, 0x00, &gfx_regs);
        let mut host = FrameBufferHost::default();

        b.iter(|| {
            for _ in 0..GFX_FRAME_ADVANCES {
                black_box(card.advance(&mut host));
            }
        });
    });
}

criterion_group!(benches, incolor_frame_bench);
criterion_main!(benches);
