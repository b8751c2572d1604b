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

    devices/incolor/io.rs

    Implementation of the IO bus interface for the InColor card.

*/

use super::*;
use crate::bus::{DeviceRunTimeUnit, IoDevice, MemoryMapper, NO_IO_BYTE};

// CRTC registers are mirrored on every even/odd port pair from 0x3B0 to 0x3B7.
pub const CRTC_REGISTER_SELECT0: u16 = 0x3B0;
pub const CRTC_REGISTER_SELECT1: u16 = 0x3B2;
pub const CRTC_REGISTER_SELECT2: u16 = 0x3B4;
pub const CRTC_REGISTER_SELECT3: u16 = 0x3B6;

pub const CRTC_REGISTER0: u16 = 0x3B1;
pub const CRTC_REGISTER1: u16 = 0x3B3;
pub const CRTC_REGISTER2: u16 = 0x3B5;
pub const CRTC_REGISTER3: u16 = 0x3B7;

pub const INCOLOR_MODE_CONTROL_REGISTER: u16 = 0x3B8;
pub const INCOLOR_STATUS_REGISTER: u16 = 0x3BA;
pub const INCOLOR_CONFIG_SWITCH_REGISTER: u16 = 0x3BF;

pub const INCOLOR_IO_BASE: u16 = 0x3B0;
pub const INCOLOR_IO_COUNT: u16 = 0x10;

impl InColorCard {
    fn write_crtc_data(&mut self, data: u8) {
        let index = self.crtc.selected();
        if self.crtc.write_data(data) {
            trace!(self, "crtc R{} <- {:02X}", index, data);
            self.recalc_timings();
        }
    }

    fn handle_config_switch(&mut self, data: u8, bus: Option<&mut dyn MemoryMapper>) {
        self.config_switch = ConfigSwitch::from_bytes([data]);

        let size = if self.config_switch.enable_page() {
            INCOLOR_APERTURE_FULL
        }
        else {
            INCOLOR_APERTURE_HALF
        };
        self.mapping = MemRangeDescriptor::new(INCOLOR_MEM_ADDRESS, size, false);

        log::debug!(
            "Write to InColor config switch: {:02X} (graphics: {} page1: {}), window {:05X}+{:05X}",
            data,
            self.config_switch.enable_gfx(),
            self.config_switch.enable_page(),
            INCOLOR_MEM_ADDRESS,
            size
        );
        trace!(self, "config <- {:02X}", data);

        if let Some(mapper) = bus {
            mapper.set_mapping(self.mapping);
        }
    }
}

impl IoDevice for InColorCard {
    fn read_u8(&mut self, port: u16, _delta: DeviceRunTimeUnit) -> u8 {
        match port {
            CRTC_REGISTER_SELECT0 | CRTC_REGISTER_SELECT1 | CRTC_REGISTER_SELECT2 | CRTC_REGISTER_SELECT3 => {
                self.crtc.selected()
            }
            CRTC_REGISTER0 | CRTC_REGISTER1 | CRTC_REGISTER2 | CRTC_REGISTER3 => self.crtc.read_data(),
            INCOLOR_STATUS_REGISTER => self.handle_status_register_read(),
            _ => NO_IO_BYTE,
        }
    }

    fn write_u8(&mut self, port: u16, data: u8, bus: Option<&mut dyn MemoryMapper>, _delta: DeviceRunTimeUnit) {
        match port {
            CRTC_REGISTER_SELECT0 | CRTC_REGISTER_SELECT1 | CRTC_REGISTER_SELECT2 | CRTC_REGISTER_SELECT3 => {
                self.crtc.select(data)
            }
            CRTC_REGISTER0 | CRTC_REGISTER1 | CRTC_REGISTER2 | CRTC_REGISTER3 => self.write_crtc_data(data),
            INCOLOR_MODE_CONTROL_REGISTER => self.handle_mode_register(data),
            INCOLOR_CONFIG_SWITCH_REGISTER => self.handle_config_switch(data, bus),
            _ => {}
        }
    }

    fn port_list(&self) -> Vec<(String, u16)> {
        vec![
            (String::from("InColor CRTC Register Select 0"), CRTC_REGISTER_SELECT0),
            (String::from("InColor CRTC Register Select 1"), CRTC_REGISTER_SELECT1),
            (String::from("InColor CRTC Register Select 2"), CRTC_REGISTER_SELECT2),
            (String::from("InColor CRTC Register Select 3"), CRTC_REGISTER_SELECT3),
            (String::from("InColor CRTC Register 0"), CRTC_REGISTER0),
            (String::from("InColor CRTC Register 1"), CRTC_REGISTER1),
            (String::from("InColor CRTC Register 2"), CRTC_REGISTER2),
            (String::from("InColor CRTC Register 3"), CRTC_REGISTER3),
            (String::from("InColor Mode Control Register"), INCOLOR_MODE_CONTROL_REGISTER),
            (String::from("InColor Status Register"), INCOLOR_STATUS_REGISTER),
            (String::from("InColor Config Switch"), INCOLOR_CONFIG_SWITCH_REGISTER),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{bus::MemoryMappedDevice, devices::incolor::tests::test_card};

    const NOW: DeviceRunTimeUnit = DeviceRunTimeUnit::SystemTicks(0);

    #[derive(Default)]
    struct RecordingMapper {
        mappings: Vec<MemRangeDescriptor>,
    }

    impl MemoryMapper for RecordingMapper {
        fn set_mapping(&mut self, mapping: MemRangeDescriptor) {
            self.mappings.push(mapping);
        }
    }

    #[test]
    fn index_ports_are_mirrored() {
        let mut card = test_card();
        for port in [0x3B0, 0x3B2, 0x3B4, 0x3B6] {
            card.write_u8(port, 0xE9, None, NOW);
            assert_eq!(card.read_u8(0x3B0, NOW), 0x09);
            assert_eq!(card.read_u8(port, NOW), 0x09);
            card.write_u8(port, 0x00, None, NOW);
        }
    }

    #[test]
    fn data_ports_are_mirrored() {
        let mut card = test_card();
        card.write_u8(0x3B4, 9, None, NOW);
        card.write_u8(0x3B7, 13, None, NOW);
        for port in [0x3B1, 0x3B3, 0x3B5, 0x3B7] {
            assert_eq!(card.read_u8(port, NOW), 13);
        }
    }

    #[test]
    fn unimplemented_registers_read_ff() {
        let mut card = test_card();
        card.write_u8(0x3B4, 23, None, NOW);
        card.write_u8(0x3B5, 0x12, None, NOW);
        assert_eq!(card.read_u8(0x3B5, NOW), 0xFF);
    }

    #[test]
    fn data_write_recomputes_timing() {
        let mut card = test_card();
        card.write_u8(0x3B4, 0, None, NOW);
        card.write_u8(0x3B5, 49, None, NOW);
        card.write_u8(0x3B4, 1, None, NOW);
        card.write_u8(0x3B5, 40, None, NOW);
        assert!(card.disp_on_ticks > 0);
        assert!(card.disp_off_ticks > 0);
    }

    #[test]
    fn status_packing() {
        let mut card = test_card();
        card.status = 0;
        assert_eq!(card.read_u8(0x3BA, NOW), 0x10);
        card.status = STATUS_HRETRACE;
        assert_eq!(card.read_u8(0x3BA, NOW), 0x11);
        card.status = STATUS_VRETRACE;
        assert_eq!(card.read_u8(0x3BA, NOW), 0x98);
        card.status = 0xFF;
        assert_eq!(card.read_u8(0x3BA, NOW), 0x9F);
        assert_eq!(card.status_reads(), 4);
    }

    #[test]
    fn write_only_and_unused_ports_float() {
        let mut card = test_card();
        card.write_u8(0x3B8, 0x08, None, NOW);
        assert_eq!(card.read_u8(0x3B8, NOW), 0xFF);
        assert_eq!(card.read_u8(0x3BF, NOW), 0xFF);
        assert_eq!(card.read_u8(0x3BC, NOW), 0xFF);
        card.write_u8(0x3BC, 0x55, None, NOW);
        assert_eq!(card.read_u8(0x3B9, NOW), 0xFF);
    }

    #[test]
    fn config_switch_resizes_window() {
        let mut card = test_card();
        let mut mapper = RecordingMapper::default();

        card.write_u8(0x3BF, 0x01, Some(&mut mapper), NOW);
        card.write_u8(0x3BF, 0x03, Some(&mut mapper), NOW);

        assert_eq!(mapper.mappings.len(), 2);
        assert_eq!(mapper.mappings[0].address, 0xB0000);
        assert_eq!(mapper.mappings[0].size, 0x8000);
        assert_eq!(mapper.mappings[1].size, 0x10000);

        // Without a mapper the card still tracks its window.
        card.write_u8(0x3BF, 0x00, None, NOW);
        assert_eq!(card.get_mapping()[0].size, 0x8000);
    }

    #[test]
    fn port_list_covers_all_ports() {
        let card = test_card();
        let ports: Vec<u16> = card.port_list().into_iter().map(|(_, p)| p).collect();
        for port in [0x3B0, 0x3B1, 0x3B6, 0x3B7, 0x3B8, 0x3BA, 0x3BF] {
            assert!(ports.contains(&port));
        }
    }
}
