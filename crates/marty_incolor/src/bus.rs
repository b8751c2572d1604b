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

    bus.rs

    The bus-facing side of a device. The port dispatcher and memory bus live
    in the host emulator; these traits are the contract they call through.

*/

//! Interfaces between a device and the host's port dispatch and memory bus.
//!
//! The host decides which device owns an access. Once it has, it calls the
//! device through [IoDevice] or [MemoryMappedDevice]. A device that needs to
//! change the physical range it claims calls back into the host through
//! [MemoryMapper].

/// Value returned when reading a port that nothing drives.
pub const NO_IO_BYTE: u8 = 0xFF;

/// Elapsed time since the device was last run, passed along with port accesses.
#[derive(Copy, Clone, Debug)]
pub enum DeviceRunTimeUnit {
    SystemTicks(u32),
    Microseconds(f64),
}

/// A physical memory range claimed by a device.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct MemRangeDescriptor {
    pub address: usize,
    pub size: usize,
    pub cycle_cost: u32,
    pub read_only: bool,
    pub priority: u32,
}

impl MemRangeDescriptor {
    pub fn new(address: usize, size: usize, read_only: bool) -> Self {
        Self {
            address,
            size,
            cycle_cost: 0,
            read_only,
            priority: 1,
        }
    }
}

/// The segment base and instruction pointer of the CPU issuing a memory write.
/// Only consulted by devices carrying firmware-specific workarounds.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct CpuLocation {
    pub cs: u32,
    pub ip: u16,
}

impl CpuLocation {
    pub fn new(cs: u32, ip: u16) -> Self {
        Self { cs, ip }
    }
}

/// Implemented by the host memory bus. A device calls this when a register write changes the
/// physical window it decodes.
pub trait MemoryMapper {
    fn set_mapping(&mut self, mapping: MemRangeDescriptor);
}

pub trait IoDevice {
    /// Read a byte from the specified port. The default implementation returns NO_IO_BYTE (0xFF).
    fn read_u8(&mut self, _port: u16, _delta: DeviceRunTimeUnit) -> u8 {
        NO_IO_BYTE
    }

    /// Write a byte to the specified port. A mutable reference to the host's memory mapper is
    /// provided if the device needs to reconfigure its memory window on write.
    /// The default implementation does nothing.
    fn write_u8(&mut self, _port: u16, _data: u8, _bus: Option<&mut dyn MemoryMapper>, _delta: DeviceRunTimeUnit) {}

    /// Return a list of named ports claimed by this device.
    fn port_list(&self) -> Vec<(String, u16)>;
}

pub trait MemoryMappedDevice {
    fn mmio_read_u8(&mut self, address: usize) -> u8;
    fn mmio_read_u16(&mut self, address: usize) -> u16;
    fn mmio_peek_u8(&self, address: usize) -> u8;
    fn mmio_peek_u16(&self, address: usize) -> u16;

    fn mmio_write_u8(&mut self, address: usize, data: u8, cpu: Option<CpuLocation>);
    fn mmio_write_u16(&mut self, address: usize, data: u16, cpu: Option<CpuLocation>);

    fn get_mapping(&self) -> Vec<MemRangeDescriptor>;
}
