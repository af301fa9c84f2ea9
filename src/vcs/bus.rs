pub mod consts;
pub mod device;
pub mod page_access;
pub mod system;
pub mod vcs_bus;

#[cfg(test)]
mod vcs_bus_test;

/// What the CPU core sees of the bus
pub trait CpuBusInterface {
    fn cpu_bus_read(&mut self, addr: u16) -> u8;
    fn cpu_bus_write(&mut self, addr: u16, value: u8);
}
