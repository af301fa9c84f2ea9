use log::{debug, error};

use super::scheme::Scheme;
use super::{CartBase, Cartridge, clamp_bank};
use crate::{trace_bank, trace_write_port_read};
use crate::vcs::bus::consts::*;
use crate::vcs::bus::device::Device;
use crate::vcs::bus::page_access::{DirectBase, PageAccess, PageAccessType, Region};
use crate::vcs::bus::system::System;
use crate::vcs::serializer::{Serializer, SerializerError};
use crate::vcs::settings::Settings;
use crate::vcs::tracer::Traceable;

/*
    Standard Atari bankswitching (F8, F6, F4) with optional SuperChip RAM.

    Window layout for F6SC:

    $000-$07F  RAM write port (reading here writes the floating bus)
    $080-$0FF  RAM read port
    $100-$FF5  ROM, current bank
    $FF6-$FF9  hot-spots, any access selects bank 0-3
    $FFA-$FFF  ROM, current bank

    Without SuperChip the ROM starts at $000. F8 and F4 only move the run of
    hot-spots ($FF8-$FF9 and $FF4-$FFB).
*/
pub struct CartridgeStd {
    scheme: &'static Scheme,
    image: Vec<u8>,
    ram: Vec<u8>,
    bank_offset: u16,
    base: CartBase,
}

impl CartridgeStd {
    pub fn new(image: &[u8], scheme: &'static Scheme, settings: &Settings) -> Self {
        let mut rom = vec![0u8; scheme.rom_size];
        CartBase::load_image(scheme.name, image, &mut rom);
        debug!("{}: {} banks, {} bytes RAM", scheme.name, scheme.bank_count, scheme.ram_size);

        Self {
            scheme,
            image: rom,
            ram: vec![0; scheme.ram_size],
            bank_offset: 0,
            base: CartBase::new(settings, scheme),
        }
    }

    fn ram_mask(&self) -> u16 {
        (self.scheme.ram_size as u16).wrapping_sub(1)
    }

    fn in_write_port(&self, address: u16) -> bool {
        (address as usize) < self.scheme.ram_size
    }

    fn in_ram(&self, address: u16) -> bool {
        (address as usize) < self.scheme.ram_size * 2
    }

    fn check_switch_bank(&mut self, system: &mut System, address: u16) {
        if let Some(bank) = self.scheme.hotspot_bank(address) {
            self.select_bank(system, bank);
        }
    }

    /// Point the window at `bank`, regardless of the bank lock
    fn map_bank(&mut self, system: &mut System, bank: u16) {
        let bank = clamp_bank(self.scheme, bank);
        self.bank_offset = bank << BANK_SHIFT;
        let offset = self.bank_offset as usize;

        let hotspot_page = CART_START + (self.scheme.hotspots().start & !PAGE_MASK);
        let rom_start = CART_START + self.scheme.rom_start();

        // Hot-spot pages always come back through peek/poke
        let mut access = PageAccess::new(PageAccessType::READ);
        for addr in (hotspot_page..=CART_END).step_by(PAGE_SIZE) {
            access.code_access_base = Some(offset + (addr & CART_WINDOW_MASK) as usize);
            system.set_page_access(addr, access);
        }

        for addr in (rom_start..hotspot_page).step_by(PAGE_SIZE) {
            let window = (addr & CART_WINDOW_MASK) as usize;
            access.direct_peek_base = Some(DirectBase::rom(offset + window));
            access.code_access_base = Some(offset + window);
            system.set_page_access(addr, access);
        }

        self.base.bank_changed = true;
        trace_bank!(self.scheme.name, bank);
    }

    fn write_state(&self, out: &mut Serializer) -> Result<(), SerializerError> {
        out.put_short(self.bank_offset)?;
        out.put_byte_array(&self.ram)
    }

    fn read_state(&self, input: &mut Serializer) -> Result<(u16, Vec<u8>), SerializerError> {
        let bank_offset = input.get_short()?;
        let mut ram = vec![0; self.ram.len()];
        input.get_byte_array(&mut ram)?;
        Ok((bank_offset, ram))
    }
}

impl Device for CartridgeStd {
    fn name(&self) -> &'static str {
        self.scheme.name
    }

    fn reset(&mut self, system: &mut System) {
        self.base.randomize_start_bank(system.random(), self.scheme);
        self.base.initialize_ram(system.random(), &mut self.ram);

        let start_bank = self.base.start_bank;
        self.select_bank(system, start_bank);
    }

    fn install(&mut self, system: &mut System) {
        if self.scheme.has_ram() {
            let ram_mask = self.ram_mask();
            let ram_tags = self.scheme.rom_size;
            let write_port_end = CART_START + self.scheme.ram_size as u16;
            let read_port_end = CART_START + self.scheme.rom_start();

            // Writes land straight in RAM, reads take the phantom write path
            let mut access = PageAccess::new(PageAccessType::WRITE);
            for addr in (CART_START..write_port_end).step_by(PAGE_SIZE) {
                access.direct_poke_base = Some(DirectBase::ram((addr & ram_mask) as usize));
                access.code_access_base = Some(ram_tags + (addr & ram_mask) as usize);
                system.set_page_access(addr, access);
            }

            let mut access = PageAccess::new(PageAccessType::READ);
            for addr in (write_port_end..read_port_end).step_by(PAGE_SIZE) {
                access.direct_peek_base = Some(DirectBase::ram((addr & ram_mask) as usize));
                access.code_access_base = Some(ram_tags + (addr & ram_mask) as usize);
                system.set_page_access(addr, access);
            }
        }

        let start_bank = self.base.start_bank;
        self.map_bank(system, start_bank);
    }

    fn peek(&mut self, system: &mut System, address: u16) -> u8 {
        let peek_address = address;
        let address = address & CART_WINDOW_MASK;

        self.check_switch_bank(system, address);

        if self.in_write_port(address) {
            // The write port is not isolated from the read strobe
            let value = system.get_data_bus_state(0xFF);
            if self.base.bank_locked {
                return value;
            }
            self.base.trigger_read_from_write_port(peek_address);
            trace_write_port_read!(self.scheme.name, peek_address, value);
            self.ram[address as usize] = value;
            value
        } else if self.in_ram(address) {
            self.ram[(address & self.ram_mask()) as usize]
        } else {
            self.image[self.bank_offset as usize + address as usize]
        }
    }

    fn poke(&mut self, system: &mut System, address: u16, _value: u8) -> bool {
        // RAM writes are served by the write-port pages, never from here
        self.check_switch_bank(system, address & CART_WINDOW_MASK);
        false
    }

    fn storage(&self, region: Region) -> &[u8] {
        match region {
            Region::Rom => &self.image,
            Region::Ram => &self.ram,
        }
    }

    fn storage_mut(&mut self, region: Region) -> &mut [u8] {
        match region {
            Region::Rom => &mut self.image,
            Region::Ram => &mut self.ram,
        }
    }

    fn code_access_mut(&mut self) -> &mut [u8] {
        &mut self.base.code_access_base
    }

    fn save(&self, out: &mut Serializer) -> bool {
        if let Err(e) = self.write_state(out) {
            error!("Cartridge{}::save: {e}", self.scheme.name);
            return false;
        }
        true
    }

    fn load(&mut self, system: &mut System, input: &mut Serializer) -> bool {
        let (bank_offset, ram) = match self.read_state(input) {
            Ok(state) => state,
            Err(e) => {
                error!("Cartridge{}::load: {e}", self.scheme.name);
                return false;
            }
        };
        self.ram.copy_from_slice(&ram);

        // Remap even when locked, the bus must match the restored bank
        self.map_bank(system, bank_offset >> BANK_SHIFT);
        true
    }
}

impl Cartridge for CartridgeStd {
    fn scheme(&self) -> &'static Scheme {
        self.scheme
    }

    fn base(&self) -> &CartBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut CartBase {
        &mut self.base
    }

    fn select_bank(&mut self, system: &mut System, bank: u16) -> bool {
        if self.base.bank_locked {
            return false;
        }
        self.map_bank(system, bank);
        true
    }

    fn bank(&self) -> u16 {
        self.bank_offset >> BANK_SHIFT
    }

    fn patch(&mut self, address: u16, value: u8) -> bool {
        let address = address & CART_WINDOW_MASK;
        if self.in_ram(address) {
            // Either port, the patch goes to the RAM cell behind it
            let index = (address & self.ram_mask()) as usize;
            self.ram[index] = value;
        } else {
            self.image[self.bank_offset as usize + address as usize] = value;
        }
        self.base.bank_changed = true;
        true
    }

    fn image(&self) -> &[u8] {
        &self.image
    }

    fn code_access_index(&self, address: u16) -> usize {
        let address = address & CART_WINDOW_MASK;
        if self.in_ram(address) {
            self.scheme.rom_size + (address & self.ram_mask()) as usize
        } else {
            self.bank_offset as usize + address as usize
        }
    }

    fn internal_ram_value(&self, index: usize) -> Option<u8> {
        self.ram.get(index).copied()
    }
}

impl Traceable for CartridgeStd {
    fn trace_name(&self) -> &'static str {
        self.scheme.name
    }

    fn trace_state(&self) -> Option<String> {
        Some(format!(
            "bank={} offset=${:04X} locked={}",
            self.bank(),
            self.bank_offset,
            self.base.bank_locked
        ))
    }
}
