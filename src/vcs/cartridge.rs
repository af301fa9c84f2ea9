use log::{debug, warn};

use crate::vcs::bus::device::Device;
use crate::vcs::bus::system::System;
use crate::vcs::random::Random;
use crate::vcs::settings::Settings;
use crate::vcs::tracer::Traceable;
use scheme::Scheme;

pub mod cart_4k;
pub mod cart_std;
pub mod rom;
pub mod scheme;


/// A cartridge: one bankswitching scheme plus its ROM, RAM and bank state
///
/// Banking, locking and patching are driven from here; bus traffic arrives
/// through the `Device` half.
pub trait Cartridge: Device + Traceable {
    fn scheme(&self) -> &'static Scheme;

    fn base(&self) -> &CartBase;
    fn base_mut(&mut self) -> &mut CartBase;

    /// Switch the visible bank. Returns `false` if the bank is locked.
    fn select_bank(&mut self, system: &mut System, bank: u16) -> bool;

    /// Currently visible bank
    fn bank(&self) -> u16;

    fn bank_count(&self) -> u16 {
        self.scheme().bank_count
    }

    /// Debugger write into ROM or RAM, ignoring bank lock and write protection
    fn patch(&mut self, address: u16, value: u8) -> bool;

    /// Whole ROM image
    fn image(&self) -> &[u8];

    /// Index into the code-access tags for a window address, under the current bank
    fn code_access_index(&self, address: u16) -> usize;

    fn code_access(&self, address: u16) -> Option<u8> {
        self.base()
            .code_access_base
            .get(self.code_access_index(address))
            .copied()
    }

    fn internal_ram_size(&self) -> usize {
        self.scheme().ram_size
    }

    /// Window address of the read port for RAM byte `start`
    fn internal_ram_rport(&self, start: u16) -> u16 {
        start + self.internal_ram_size() as u16
    }

    fn internal_ram_value(&self, index: usize) -> Option<u8>;

    fn lock_bank(&mut self) {
        self.base_mut().bank_locked = true;
    }

    fn unlock_bank(&mut self) {
        self.base_mut().bank_locked = false;
    }

    fn bank_locked(&self) -> bool {
        self.base().bank_locked
    }

    /// Reports a bank change (or patch) since the last call, then clears it
    fn bank_changed(&mut self) -> bool {
        std::mem::take(&mut self.base_mut().bank_changed)
    }

    /// Bus addresses whose reads landed on a RAM write port since the last call
    fn take_ram_read_accesses(&mut self) -> Vec<u16> {
        std::mem::take(&mut self.base_mut().ram_read_accesses)
    }
}

/// State every scheme shares: configuration, lock, change flag and debugger tags
#[derive(Debug, Clone)]
pub struct CartBase {
    settings: Settings,
    pub(crate) start_bank: u16,
    pub(crate) bank_locked: bool,
    pub(crate) bank_changed: bool,
    pub(crate) code_access_base: Vec<u8>,
    pub(crate) ram_read_accesses: Vec<u16>,
}

impl CartBase {
    pub fn new(settings: &Settings, scheme: &Scheme) -> Self {
        Self {
            settings: settings.clone(),
            start_bank: scheme.start_bank,
            bank_locked: false,
            bank_changed: false,
            code_access_base: vec![0; scheme.rom_size + scheme.ram_size],
            ram_read_accesses: Vec::new(),
        }
    }

    pub fn start_bank(&self) -> u16 {
        self.start_bank
    }

    /// Copy as much of `source` as fits in `image`, leaving the rest zeroed
    pub fn load_image(name: &str, source: &[u8], image: &mut [u8]) {
        let len = source.len().min(image.len());
        if source.len() != image.len() {
            debug!(
                "{}: image is {} bytes, scheme holds {}; copying {}",
                name,
                source.len(),
                image.len(),
                len
            );
        }
        image[..len].copy_from_slice(&source[..len]);
    }

    /// Pick the bank the cartridge powers up in
    pub fn randomize_start_bank(&mut self, random: &mut Random, scheme: &Scheme) {
        self.start_bank = if let Some(bank) = self.settings.startup_bank {
            clamp_bank(scheme, bank)
        } else if self.settings.random_startup_bank && scheme.bank_count > 1 {
            random.next_below(scheme.bank_count)
        } else {
            scheme.start_bank
        };
    }

    /// Power-on RAM contents are undefined on real hardware
    pub fn initialize_ram(&self, random: &mut Random, ram: &mut [u8]) {
        if self.settings.random_ram {
            random.fill(ram);
        } else {
            ram.fill(0);
        }
    }

    pub fn trigger_read_from_write_port(&mut self, address: u16) {
        self.ram_read_accesses.push(address);
    }
}

/// Bring a caller-supplied bank into `0..bank_count`
pub fn clamp_bank(scheme: &Scheme, bank: u16) -> u16 {
    if bank >= scheme.bank_count {
        let clamped = scheme.bank_count - 1;
        warn!(
            "{}: bank {} out of range 0..{}, using {}",
            scheme.name, bank, scheme.bank_count, clamped
        );
        clamped
    } else {
        bank
    }
}
