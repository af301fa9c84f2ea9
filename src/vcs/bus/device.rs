use bitflags::bitflags;

use super::page_access::Region;
use super::system::System;
use crate::vcs::serializer::Serializer;

bitflags! {
    /*
        Disassembly attribution for one byte of device storage.
        Set by the debugger while tracing accesses, never read by emulation.

        7  bit  0
        ---- ----
        SCPG DRVF
        |||| ||||
        |||| |||+- Referenced by an access
        |||| ||+-- Valid disassembly entry point
        |||| |+--- Part of a data row
        |||| +---- Data
        |||+------ Graphics
        ||+------- Playfield graphics
        |+-------- Code
        +--------- Skip (operand of a previous instruction)
     */
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct AccessFlags: u8 {
        const REFERENCED =  0b0000_0001;
        const VALID_ENTRY = 0b0000_0010;
        const ROW =         0b0000_0100;
        const DATA =        0b0000_1000;
        const GFX =         0b0001_0000;
        const PGFX =        0b0010_0000;
        const CODE =        0b0100_0000;
        const SKIP =        0b1000_0000;
    }
}

/// Anything that can own pages of the bus
///
/// The bus hands itself to every call that may need to re-map pages or look
/// at the data bus, so devices never keep a pointer back to it.
pub trait Device {
    /// Short identifier used in logs and snapshots
    fn name(&self) -> &'static str;

    /// Power-on / reset state
    fn reset(&mut self, system: &mut System);

    /// Install page access entries for everything this device owns
    fn install(&mut self, system: &mut System);

    /// Read through the indirect path
    fn peek(&mut self, system: &mut System, address: u16) -> u8;

    /// Write through the indirect path. Returns `true` if storage changed.
    fn poke(&mut self, system: &mut System, address: u16, value: u8) -> bool;

    /// Backing storage for direct page bases
    fn storage(&self, region: Region) -> &[u8];
    fn storage_mut(&mut self, region: Region) -> &mut [u8];

    /// Code-access tags, indexed by `PageAccess::code_access_base`
    fn code_access_mut(&mut self) -> &mut [u8];

    fn save(&self, out: &mut Serializer) -> bool;
    fn load(&mut self, system: &mut System, input: &mut Serializer) -> bool;
}
