use log::error;

use super::scheme::Scheme;
use super::{CartBase, Cartridge};
use crate::vcs::bus::consts::*;
use crate::vcs::bus::device::Device;
use crate::vcs::bus::page_access::{DirectBase, PageAccess, PageAccessType, Region};
use crate::vcs::bus::system::System;
use crate::vcs::serializer::Serializer;
use crate::vcs::settings::Settings;
use crate::vcs::tracer::Traceable;

/// Plain 2K/4K cartridge, no bankswitching and no RAM
///
/// A 2K image is mirrored into both halves of the window.
pub struct Cartridge4K {
    scheme: &'static Scheme,
    image: Vec<u8>,
    base: CartBase,
}

impl Cartridge4K {
    pub fn new(image: &[u8], scheme: &'static Scheme, settings: &Settings) -> Self {
        let mut rom = vec![0u8; scheme.rom_size];
        CartBase::load_image(scheme.name, image, &mut rom);

        Self {
            scheme,
            image: rom,
            base: CartBase::new(settings, scheme),
        }
    }

    fn mask(&self) -> u16 {
        (self.image.len() - 1) as u16
    }
}

impl Device for Cartridge4K {
    fn name(&self) -> &'static str {
        self.scheme.name
    }

    fn reset(&mut self, _system: &mut System) {
        self.base.bank_changed = true;
    }

    fn install(&mut self, system: &mut System) {
        let mask = self.mask();
        let mut access = PageAccess::new(PageAccessType::READ);
        for addr in (CART_START..=CART_END).step_by(PAGE_SIZE) {
            let offset = (addr & mask) as usize;
            access.direct_peek_base = Some(DirectBase::rom(offset));
            access.code_access_base = Some(offset);
            system.set_page_access(addr, access);
        }
    }

    fn peek(&mut self, _system: &mut System, address: u16) -> u8 {
        self.image[(address & self.mask()) as usize]
    }

    fn poke(&mut self, _system: &mut System, _address: u16, _value: u8) -> bool {
        false
    }

    fn storage(&self, region: Region) -> &[u8] {
        match region {
            Region::Rom => &self.image,
            Region::Ram => &[],
        }
    }

    fn storage_mut(&mut self, region: Region) -> &mut [u8] {
        match region {
            Region::Rom => &mut self.image,
            Region::Ram => &mut [],
        }
    }

    fn code_access_mut(&mut self) -> &mut [u8] {
        &mut self.base.code_access_base
    }

    // Same layout as the banked carts: offset 0, no RAM
    fn save(&self, out: &mut Serializer) -> bool {
        if let Err(e) = out.put_short(0) {
            error!("Cartridge{}::save: {e}", self.scheme.name);
            return false;
        }
        true
    }

    fn load(&mut self, system: &mut System, input: &mut Serializer) -> bool {
        if let Err(e) = input.get_short() {
            error!("Cartridge{}::load: {e}", self.scheme.name);
            return false;
        }
        self.install(system);
        true
    }
}

impl Cartridge for Cartridge4K {
    fn scheme(&self) -> &'static Scheme {
        self.scheme
    }

    fn base(&self) -> &CartBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut CartBase {
        &mut self.base
    }

    fn select_bank(&mut self, _system: &mut System, _bank: u16) -> bool {
        false
    }

    fn bank(&self) -> u16 {
        0
    }

    fn patch(&mut self, address: u16, value: u8) -> bool {
        let index = (address & self.mask()) as usize;
        self.image[index] = value;
        self.base.bank_changed = true;
        true
    }

    fn image(&self) -> &[u8] {
        &self.image
    }

    fn code_access_index(&self, address: u16) -> usize {
        (address & self.mask()) as usize
    }

    fn internal_ram_value(&self, _index: usize) -> Option<u8> {
        None
    }
}

impl Traceable for Cartridge4K {
    fn trace_name(&self) -> &'static str {
        self.scheme.name
    }

    fn trace_state(&self) -> Option<String> {
        Some(format!("size=${:04X}", self.image.len()))
    }
}
