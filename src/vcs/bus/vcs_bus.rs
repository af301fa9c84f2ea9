use log::{debug, error, info};

use crate::vcs::bus::CpuBusInterface;
use crate::vcs::bus::consts::*;
use crate::vcs::bus::device::AccessFlags;
use crate::vcs::bus::system::System;
use crate::vcs::cartridge::Cartridge;
use crate::vcs::random::Random;
use crate::vcs::serializer::{Serializer, SerializerError};
use crate::vcs::settings::Settings;
use crate::vcs::tracer::Traceable;
use crate::trace_obj;

const STATE_MAGIC: &str = "VCSCART";
const STATE_VERSION: u8 = 1;

/// The 6507's view of the machine: page table plus the inserted cartridge
///
/// Only the cartridge window is populated. Everything below `$1000` is left
/// unmapped and reads back the floating data bus.
pub struct VcsBus {
    system: System,
    cart: Box<dyn Cartridge>,
}

impl VcsBus {
    pub fn new(cart: Box<dyn Cartridge>, settings: &Settings) -> VcsBus {
        let random = Random::new(settings.seed);
        debug!("{}: power-on seed {:#018X}", cart.name(), random.initial_seed());

        let mut bus = VcsBus {
            system: System::new(random),
            cart,
        };
        bus.cart.install(&mut bus.system);
        bus.reset();
        bus
    }

    pub fn reset(&mut self) {
        self.system.reset();
        self.cart.reset(&mut self.system);
        info!("{}: reset into bank {}", self.cart.name(), self.cart.bank());
        trace_obj!(&*self.cart);
    }

    pub fn system(&self) -> &System {
        &self.system
    }

    pub fn system_mut(&mut self) -> &mut System {
        &mut self.system
    }

    pub fn cartridge(&self) -> &dyn Cartridge {
        &*self.cart
    }

    pub fn cartridge_mut(&mut self) -> &mut dyn Cartridge {
        &mut *self.cart
    }

    pub fn peek(&mut self, address: u16) -> u8 {
        self.system.peek(&mut *self.cart, address, AccessFlags::empty())
    }

    pub fn poke(&mut self, address: u16, value: u8) {
        self.system.poke(&mut *self.cart, address, value, AccessFlags::empty());
    }

    /// Read and record how the byte was used, for the disassembler
    pub fn peek_tagged(&mut self, address: u16, flags: AccessFlags) -> u8 {
        self.system.peek(&mut *self.cart, address, flags)
    }

    /// Debugger read: leaves the data bus, bank and cartridge RAM as they were
    pub fn debug_peek(&mut self, address: u16) -> u8 {
        let was_locked = self.cart.bank_locked();
        self.cart.lock_bank();
        self.system.lock_data_bus();

        let value = self.peek(address);

        self.system.unlock_data_bus();
        if !was_locked {
            self.cart.unlock_bank();
        }
        value
    }

    pub fn select_bank(&mut self, bank: u16) -> bool {
        self.cart.select_bank(&mut self.system, bank)
    }

    pub fn patch(&mut self, address: u16, value: u8) -> bool {
        self.cart.patch(address, value)
    }

    /// Whole-machine snapshot: header, data bus, cartridge
    pub fn save_state(&self, out: &mut Serializer) -> bool {
        if let Err(e) = self.write_header(out) {
            error!("VcsBus::save_state: {e}");
            return false;
        }
        self.system.save(out) && self.cart.save(out)
    }

    /// Restore a snapshot taken by `save_state` on the same scheme
    pub fn load_state(&mut self, input: &mut Serializer) -> bool {
        let name = match Self::read_header(input) {
            Ok(header) => header,
            Err(e) => {
                error!("VcsBus::load_state: {e}");
                return false;
            }
        };
        let Some(name) = name else {
            error!("VcsBus::load_state: not a {} v{} snapshot", STATE_MAGIC, STATE_VERSION);
            return false;
        };
        if name != self.cart.name() {
            error!(
                "VcsBus::load_state: snapshot is for {}, cartridge is {}",
                name,
                self.cart.name()
            );
            return false;
        }

        let mut previous = Serializer::new();
        if !self.system.save(&mut previous) {
            return false;
        }
        if self.system.load(input) && self.cart.load(&mut self.system, input) {
            return true;
        }
        self.system.load(&mut previous);
        false
    }

    fn write_header(&self, out: &mut Serializer) -> Result<(), SerializerError> {
        out.put_string(STATE_MAGIC)?;
        out.put_byte(STATE_VERSION)?;
        out.put_string(self.cart.name())
    }

    // Scheme name, or None when magic or version do not match
    fn read_header(input: &mut Serializer) -> Result<Option<String>, SerializerError> {
        if input.get_string()? != STATE_MAGIC || input.get_byte()? != STATE_VERSION {
            return Ok(None);
        }
        input.get_string().map(Some)
    }
}

impl CpuBusInterface for VcsBus {
    fn cpu_bus_read(&mut self, addr: u16) -> u8 {
        self.peek(addr)
    }

    fn cpu_bus_write(&mut self, addr: u16, value: u8) {
        self.poke(addr, value);
    }
}

impl Traceable for VcsBus {
    fn trace_name(&self) -> &'static str {
        "BUS"
    }

    fn trace_state(&self) -> Option<String> {
        Some(format!(
            "cart={} bank={}/{} data_bus=${:02X} dirty={}",
            self.cart.name(),
            self.cart.bank(),
            self.cart.bank_count(),
            self.system.get_data_bus_state(0xFF),
            self.system.is_page_dirty(CART_START, CART_END)
        ))
    }
}
