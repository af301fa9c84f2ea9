use bitflags::bitflags;

bitflags! {
    /*
        Which direction of a page is served straight out of device storage.

        READ:  reads use `direct_peek_base`, writes go to `Device::poke`
        WRITE: writes use `direct_poke_base`, reads go to `Device::peek`
        empty: page is not mapped, reads float and writes are dropped
     */
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct PageAccessType: u8 {
        const READ =      0b0000_0001;
        const WRITE =     0b0000_0010;
        const READWRITE = Self::READ.bits() | Self::WRITE.bits();
    }
}

/// Storage owned by a device that a page can point straight into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Region {
    Rom,
    Ram,
}

/// Start of a page inside a device's storage region
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DirectBase {
    pub region: Region,
    pub offset: usize,
}

impl DirectBase {
    pub fn rom(offset: usize) -> Self {
        Self {
            region: Region::Rom,
            offset,
        }
    }

    pub fn ram(offset: usize) -> Self {
        Self {
            region: Region::Ram,
            offset,
        }
    }
}

/// How the bus services one page of the address space
///
/// A page holding a hot-spot must never carry a direct base for the
/// direction that hot-spot reacts to, otherwise the access would bypass the
/// cartridge and the bank switch would be lost.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PageAccess {
    pub access_type: PageAccessType,
    pub direct_peek_base: Option<DirectBase>,
    pub direct_poke_base: Option<DirectBase>,
    /// Index of the page's first byte in the device's code-access tags
    pub code_access_base: Option<usize>,
}

impl PageAccess {
    pub fn new(access_type: PageAccessType) -> Self {
        Self {
            access_type,
            ..Default::default()
        }
    }

    pub fn is_mapped(&self) -> bool {
        !self.access_type.is_empty()
    }

    pub fn is_direct_peek(&self) -> bool {
        self.direct_peek_base.is_some()
    }

    pub fn is_direct_poke(&self) -> bool {
        self.direct_poke_base.is_some()
    }
}
