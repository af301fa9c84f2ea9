use log::error;

use super::consts::*;
use super::device::{AccessFlags, Device};
use super::page_access::PageAccess;
use crate::vcs::random::Random;
use crate::vcs::serializer::Serializer;

/// Page table and data bus for the 8K address space seen by the 6507
///
/// The system knows nothing about cartridges. It only follows the page
/// entries devices install, either straight into device storage or back
/// into the device's `peek`/`poke`.
pub struct System {
    pages: Vec<PageAccess>,
    page_dirty: Vec<bool>,

    // Undriven reads return whatever was last on the data bus
    data_bus_state: u8,
    data_bus_locked: bool,

    random: Random,
}

impl System {
    pub fn new(random: Random) -> Self {
        Self {
            pages: vec![PageAccess::default(); NUM_PAGES],
            page_dirty: vec![false; NUM_PAGES],
            data_bus_state: 0,
            data_bus_locked: false,
            random,
        }
    }

    pub fn reset(&mut self) {
        self.data_bus_state = 0;
        self.data_bus_locked = false;
        self.clear_dirty_pages();
    }

    pub fn random(&mut self) -> &mut Random {
        &mut self.random
    }

    pub fn set_page_access(&mut self, address: u16, access: PageAccess) {
        let page = Self::page_of(address);
        self.pages[page] = access;
    }

    pub fn page_access(&self, address: u16) -> &PageAccess {
        &self.pages[Self::page_of(address)]
    }

    pub fn get_data_bus_state(&self, mask: u8) -> u8 {
        self.data_bus_state & mask
    }

    /// Debugger reads must not disturb the data bus
    pub fn lock_data_bus(&mut self) {
        self.data_bus_locked = true;
    }

    pub fn unlock_data_bus(&mut self) {
        self.data_bus_locked = false;
    }

    /// True if any page touching `start..=end` was written since the last clear
    pub fn is_page_dirty(&self, start: u16, end: u16) -> bool {
        let first = Self::page_of(start);
        let last = Self::page_of(end);
        if first > last {
            return false;
        }
        self.page_dirty[first..=last].iter().any(|&dirty| dirty)
    }

    pub fn clear_dirty_pages(&mut self) {
        self.page_dirty.iter_mut().for_each(|dirty| *dirty = false);
    }

    pub fn peek<D: Device + ?Sized>(&mut self, device: &mut D, address: u16, flags: AccessFlags) -> u8 {
        let address = address & ADDRESS_MASK;
        let access = *self.page_access(address);
        let offset = (address & PAGE_MASK) as usize;

        if !flags.is_empty() {
            Self::tag_access(device, &access, offset, flags);
        }

        let result = if !access.is_mapped() {
            self.data_bus_state
        } else if let Some(base) = access.direct_peek_base {
            match device.storage(base.region).get(base.offset + offset) {
                Some(&value) => value,
                None => {
                    error!(
                        "{}: direct read at ${:04X} outside {:?} storage",
                        device.name(),
                        address,
                        base.region
                    );
                    self.data_bus_state
                }
            }
        } else {
            device.peek(self, address)
        };

        if !self.data_bus_locked {
            self.data_bus_state = result;
        }
        result
    }

    pub fn poke<D: Device + ?Sized>(&mut self, device: &mut D, address: u16, value: u8, flags: AccessFlags) {
        let address = address & ADDRESS_MASK;
        let page = Self::page_of(address);
        let access = self.pages[page];
        let offset = (address & PAGE_MASK) as usize;

        if !flags.is_empty() {
            Self::tag_access(device, &access, offset, flags);
        }

        if access.is_mapped() {
            if let Some(base) = access.direct_poke_base {
                match device.storage_mut(base.region).get_mut(base.offset + offset) {
                    Some(slot) => {
                        *slot = value;
                        self.page_dirty[page] = true;
                    }
                    None => error!(
                        "{}: direct write at ${:04X} outside {:?} storage",
                        device.name(),
                        address,
                        base.region
                    ),
                }
            } else if device.poke(self, address, value) {
                self.page_dirty[page] = true;
            }
        }

        if !self.data_bus_locked {
            self.data_bus_state = value;
        }
    }

    pub fn save(&self, out: &mut Serializer) -> bool {
        if let Err(e) = out.put_byte(self.data_bus_state) {
            error!("System::save: {e}");
            return false;
        }
        true
    }

    pub fn load(&mut self, input: &mut Serializer) -> bool {
        match input.get_byte() {
            Ok(state) => {
                self.data_bus_state = state;
                true
            }
            Err(e) => {
                error!("System::load: {e}");
                false
            }
        }
    }

    fn tag_access<D: Device + ?Sized>(device: &mut D, access: &PageAccess, offset: usize, flags: AccessFlags) {
        if let Some(base) = access.code_access_base
            && let Some(tag) = device.code_access_mut().get_mut(base + offset)
        {
            *tag |= flags.bits();
        }
    }

    fn page_of(address: u16) -> usize {
        ((address & ADDRESS_MASK) >> PAGE_SHIFT) as usize
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::vcs::bus::page_access::{DirectBase, PageAccessType, Region};

    // Flat 4K device: ROM served direct, RAM served indirect
    struct MockDevice {
        rom: Vec<u8>,
        ram: Vec<u8>,
        tags: Vec<u8>,
        peeks: usize,
        pokes: usize,
    }

    impl MockDevice {
        fn new() -> Self {
            Self {
                rom: (0..0x1000).map(|i| (i & 0xFF) as u8).collect(),
                ram: vec![0; 0x100],
                tags: vec![0; 0x1000],
                peeks: 0,
                pokes: 0,
            }
        }
    }

    impl Device for MockDevice {
        fn name(&self) -> &'static str {
            "Mock"
        }
        fn reset(&mut self, _system: &mut System) {}
        fn install(&mut self, system: &mut System) {
            let mut access = PageAccess::new(PageAccessType::WRITE);
            for addr in (0x1000u16..0x1100).step_by(PAGE_SIZE) {
                access.direct_poke_base = Some(DirectBase::ram((addr & 0xFF) as usize));
                system.set_page_access(addr, access);
            }
            let mut access = PageAccess::new(PageAccessType::READ);
            for addr in (0x1100u16..0x2000).step_by(PAGE_SIZE) {
                access.direct_peek_base = Some(DirectBase::rom((addr & 0x0FFF) as usize));
                access.code_access_base = Some((addr & 0x0FFF) as usize);
                system.set_page_access(addr, access);
            }
        }
        fn peek(&mut self, _system: &mut System, address: u16) -> u8 {
            self.peeks += 1;
            self.ram[(address & 0xFF) as usize]
        }
        fn poke(&mut self, _system: &mut System, _address: u16, _value: u8) -> bool {
            self.pokes += 1;
            false
        }
        fn storage(&self, region: Region) -> &[u8] {
            match region {
                Region::Rom => &self.rom,
                Region::Ram => &self.ram,
            }
        }
        fn storage_mut(&mut self, region: Region) -> &mut [u8] {
            match region {
                Region::Rom => &mut self.rom,
                Region::Ram => &mut self.ram,
            }
        }
        fn code_access_mut(&mut self) -> &mut [u8] {
            &mut self.tags
        }
        fn save(&self, _out: &mut Serializer) -> bool {
            true
        }
        fn load(&mut self, _system: &mut System, _input: &mut Serializer) -> bool {
            true
        }
    }

    fn init_system() -> (System, MockDevice) {
        let mut system = System::new(Random::new(Some(7)));
        let mut device = MockDevice::new();
        device.install(&mut system);
        (system, device)
    }

    #[test]
    fn test_direct_read_skips_device() {
        let (mut system, mut device) = init_system();
        assert_eq!(system.peek(&mut device, 0x1234, AccessFlags::empty()), 0x34);
        assert_eq!(device.peeks, 0);
        assert_eq!(system.get_data_bus_state(0xFF), 0x34);
    }

    #[test]
    fn test_indirect_read_reaches_device() {
        let (mut system, mut device) = init_system();
        device.ram[0x42] = 0x99;
        assert_eq!(system.peek(&mut device, 0x1042, AccessFlags::empty()), 0x99);
        assert_eq!(device.peeks, 1);
    }

    #[test]
    fn test_direct_write_marks_page_dirty() {
        let (mut system, mut device) = init_system();
        assert!(!system.is_page_dirty(0x1000, 0x10FF));
        system.poke(&mut device, 0x1043, 0x55, AccessFlags::empty());
        assert_eq!(device.ram[0x43], 0x55);
        assert_eq!(device.pokes, 0);
        assert!(system.is_page_dirty(0x1040, 0x107F));
        assert!(!system.is_page_dirty(0x1000, 0x103F));

        system.clear_dirty_pages();
        assert!(!system.is_page_dirty(0x0000, 0x1FFF));
    }

    #[test]
    fn test_write_to_read_page_goes_through_device() {
        let (mut system, mut device) = init_system();
        system.poke(&mut device, 0x1500, 0x12, AccessFlags::empty());
        assert_eq!(device.pokes, 1);
        assert_eq!(device.rom[0x500], 0x00);
        assert!(!system.is_page_dirty(0x1500, 0x1500));
    }

    #[test]
    fn test_unmapped_page_reads_floating_bus() {
        let (mut system, mut device) = init_system();
        system.poke(&mut device, 0x1200, 0xA7, AccessFlags::empty());
        assert_eq!(system.peek(&mut device, 0x0080, AccessFlags::empty()), 0xA7);
        assert_eq!(system.get_data_bus_state(0x0F), 0x07);
    }

    #[test]
    fn test_addresses_are_masked_to_13_bits() {
        let (mut system, mut device) = init_system();
        assert_eq!(system.peek(&mut device, 0xF234, AccessFlags::empty()), 0x34);
    }

    #[test]
    fn test_locked_data_bus_keeps_value() {
        let (mut system, mut device) = init_system();
        system.peek(&mut device, 0x1211, AccessFlags::empty());
        system.lock_data_bus();
        system.peek(&mut device, 0x1222, AccessFlags::empty());
        assert_eq!(system.get_data_bus_state(0xFF), 0x11);
        system.unlock_data_bus();
        system.peek(&mut device, 0x1222, AccessFlags::empty());
        assert_eq!(system.get_data_bus_state(0xFF), 0x22);
    }

    #[test]
    fn test_access_flags_tag_code_access_base() {
        let (mut system, mut device) = init_system();
        system.peek(&mut device, 0x1345, AccessFlags::CODE);
        system.peek(&mut device, 0x1345, AccessFlags::REFERENCED);
        assert_eq!(device.tags[0x345], (AccessFlags::CODE | AccessFlags::REFERENCED).bits());
        assert_eq!(device.tags[0x346], 0);
    }

    #[test]
    fn test_save_and_load_data_bus_state() {
        let (mut system, mut device) = init_system();
        system.peek(&mut device, 0x12AB, AccessFlags::empty());

        let mut out = Serializer::new();
        assert!(system.save(&mut out));

        let (mut restored, _) = init_system();
        let mut input = Serializer::from_bytes(out.into_bytes());
        assert!(restored.load(&mut input));
        assert_eq!(restored.get_data_bus_state(0xFF), 0xAB);
    }
}
