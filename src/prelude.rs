//! Convenient imports for consumers of vcs-cart
//!
//! Pull in everything commonly needed in one line:
//! ```rust
//! use vcs_cart::prelude::*;
//! ```

// Bus and dispatch
pub use crate::vcs::bus::CpuBusInterface;
pub use crate::vcs::bus::device::{AccessFlags, Device};
pub use crate::vcs::bus::page_access::{DirectBase, PageAccess, PageAccessType, Region};
pub use crate::vcs::bus::system::System;
pub use crate::vcs::bus::vcs_bus::VcsBus;

// Cartridges
pub use crate::vcs::cartridge::rom::{Rom, RomError};
pub use crate::vcs::cartridge::scheme::Scheme;
pub use crate::vcs::cartridge::{CartBase, Cartridge};

// Snapshots and configuration
pub use crate::vcs::random::Random;
pub use crate::vcs::serializer::{Serializer, SerializerError};
pub use crate::vcs::settings::Settings;
pub use crate::vcs::tracer::{TraceEvent, Traceable};

// Macros
pub use crate::trace_dump;
