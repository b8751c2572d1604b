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

    devices/incolor/mmio.rs

    Implementation of the MMIO interface for the InColor card.

*/

use super::*;
use crate::bus::{CpuLocation, MemRangeDescriptor, MemoryMappedDevice};

// The i440FX BIOS clears video memory from a loop that runs before its memory map is set
// up, leaving garbage on screen. Writes from those two instructions are ignored.
const I440FX_FILL_CS: u32 = 0xE0000;
const I440FX_FILL_IPS: [u16; 2] = [0xBF2F, 0xBF77];

impl InColorCard {
    /// True if a write from this CPU location is the i440FX BIOS VRAM fill.
    pub fn is_vram_fill_bypass(&self, cpu: Option<CpuLocation>) -> bool {
        match cpu {
            Some(loc) => {
                self.chipset == HostChipset::I440fx && loc.cs == I440FX_FILL_CS && I440FX_FILL_IPS.contains(&loc.ip)
            }
            None => false,
        }
    }

    /// Write a byte of video memory. The offset is taken modulo 64K regardless of the size of
    /// the window currently claimed on the bus.
    pub fn vram_write(&mut self, address: usize, data: u8, cpu: Option<CpuLocation>) {
        if self.is_vram_fill_bypass(cpu) {
            return;
        }
        let a_offset = address & INCOLOR_MEM_MASK;
        self.vram[a_offset] = data;
    }

    #[inline]
    pub fn vram_read(&self, address: usize) -> u8 {
        self.vram[address & INCOLOR_MEM_MASK]
    }
}

impl MemoryMappedDevice for InColorCard {
    fn mmio_read_u8(&mut self, address: usize) -> u8 {
        self.vram_read(address)
    }

    fn mmio_read_u16(&mut self, address: usize) -> u16 {
        let lo_byte = self.mmio_read_u8(address);
        let ho_byte = self.mmio_read_u8(address + 1);
        (ho_byte as u16) << 8 | lo_byte as u16
    }

    fn mmio_peek_u8(&self, address: usize) -> u8 {
        self.vram_read(address)
    }

    fn mmio_peek_u16(&self, address: usize) -> u16 {
        (self.vram_read(address + 1) as u16) << 8 | self.vram_read(address) as u16
    }

    fn mmio_write_u8(&mut self, address: usize, data: u8, cpu: Option<CpuLocation>) {
        self.vram_write(address, data, cpu);
    }

    fn mmio_write_u16(&mut self, address: usize, data: u16, cpu: Option<CpuLocation>) {
        self.vram_write(address, data as u8, cpu);
        self.vram_write(address + 1, (data >> 8) as u8, cpu);
    }

    fn get_mapping(&self) -> Vec<MemRangeDescriptor> {
        vec![self.mapping]
    }
}
