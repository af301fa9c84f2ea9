use once_cell::sync::Lazy;
use std::collections::HashMap;

use crate::vcs::bus::consts::BANK_SIZE;

/// Static description of one bankswitching scheme
///
/// The standard Atari schemes only differ in how many 4K banks they carry,
/// where their run of hot-spots starts and whether a SuperChip RAM sits in
/// the bottom 256 bytes of the window. Hot-spot `hotspot_base + n` selects
/// bank `n`.
#[derive(Debug, PartialEq, Eq)]
pub struct Scheme {
    pub name: &'static str,
    pub rom_size: usize,
    pub bank_count: u16,
    pub hotspot_base: Option<u16>,
    pub ram_size: usize,
    pub start_bank: u16,
}

impl Scheme {
    pub fn is_banked(&self) -> bool {
        self.hotspot_base.is_some()
    }

    pub fn has_ram(&self) -> bool {
        self.ram_size > 0
    }

    /// First window offset past the RAM ports
    pub fn rom_start(&self) -> u16 {
        (self.ram_size * 2) as u16
    }

    /// Window offsets (0x000-0xFFF) that switch banks
    pub fn hotspots(&self) -> std::ops::Range<u16> {
        match self.hotspot_base {
            Some(base) => base..base + self.bank_count,
            None => 0..0,
        }
    }

    pub fn hotspot_bank(&self, address: u16) -> Option<u16> {
        let address = address & 0x0FFF;
        let base = self.hotspot_base?;
        if self.hotspots().contains(&address) {
            Some(address - base)
        } else {
            None
        }
    }
}

pub static SCHEME_2K: Scheme = Scheme {
    name: "2K",
    rom_size: 0x0800,
    bank_count: 1,
    hotspot_base: None,
    ram_size: 0,
    start_bank: 0,
};

pub static SCHEME_4K: Scheme = Scheme {
    name: "4K",
    rom_size: BANK_SIZE,
    bank_count: 1,
    hotspot_base: None,
    ram_size: 0,
    start_bank: 0,
};

pub static SCHEME_F8: Scheme = Scheme {
    name: "F8",
    rom_size: 2 * BANK_SIZE,
    bank_count: 2,
    hotspot_base: Some(0x0FF8),
    ram_size: 0,
    start_bank: 0,
};

pub static SCHEME_F8SC: Scheme = Scheme {
    name: "F8SC",
    rom_size: 2 * BANK_SIZE,
    bank_count: 2,
    hotspot_base: Some(0x0FF8),
    ram_size: 128,
    start_bank: 0,
};

pub static SCHEME_F6: Scheme = Scheme {
    name: "F6",
    rom_size: 4 * BANK_SIZE,
    bank_count: 4,
    hotspot_base: Some(0x0FF6),
    ram_size: 0,
    start_bank: 0,
};

pub static SCHEME_F6SC: Scheme = Scheme {
    name: "F6SC",
    rom_size: 4 * BANK_SIZE,
    bank_count: 4,
    hotspot_base: Some(0x0FF6),
    ram_size: 128,
    start_bank: 0,
};

pub static SCHEME_F4: Scheme = Scheme {
    name: "F4",
    rom_size: 8 * BANK_SIZE,
    bank_count: 8,
    hotspot_base: Some(0x0FF4),
    ram_size: 0,
    start_bank: 0,
};

pub static SCHEME_F4SC: Scheme = Scheme {
    name: "F4SC",
    rom_size: 8 * BANK_SIZE,
    bank_count: 8,
    hotspot_base: Some(0x0FF4),
    ram_size: 128,
    start_bank: 0,
};

pub static SCHEMES: [&Scheme; 8] = [
    &SCHEME_2K,
    &SCHEME_4K,
    &SCHEME_F8,
    &SCHEME_F8SC,
    &SCHEME_F6,
    &SCHEME_F6SC,
    &SCHEME_F4,
    &SCHEME_F4SC,
];

static BY_NAME: Lazy<HashMap<&'static str, &'static Scheme>> =
    Lazy::new(|| SCHEMES.iter().map(|&scheme| (scheme.name, scheme)).collect());

/// Look a scheme up by name, case-insensitive
pub fn by_name(name: &str) -> Option<&'static Scheme> {
    BY_NAME.get(name.trim().to_ascii_uppercase().as_str()).copied()
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_lookup_is_case_insensitive() {
        assert_eq!(by_name("f6sc"), Some(&SCHEME_F6SC));
        assert_eq!(by_name(" F8 "), Some(&SCHEME_F8));
        assert_eq!(by_name("E0"), None);
    }

    #[test]
    fn test_f6_hotspots() {
        let scheme = &SCHEME_F6SC;
        assert_eq!(scheme.hotspot_bank(0x0FF5), None);
        assert_eq!(scheme.hotspot_bank(0x0FF6), Some(0));
        assert_eq!(scheme.hotspot_bank(0x1FF9), Some(3));
        assert_eq!(scheme.hotspot_bank(0x0FFA), None);
    }

    #[test]
    fn test_every_banked_scheme_has_one_hotspot_per_bank() {
        for scheme in SCHEMES.iter().filter(|s| s.is_banked()) {
            assert_eq!(scheme.hotspots().len(), scheme.bank_count as usize);
            assert_eq!(scheme.rom_size, scheme.bank_count as usize * BANK_SIZE);
            assert!(scheme.hotspots().end <= 0x1000);
        }
    }

    #[test]
    fn test_rom_starts_past_ram_ports() {
        assert_eq!(SCHEME_F4SC.rom_start(), 0x100);
        assert_eq!(SCHEME_F4.rom_start(), 0x000);
    }
}
