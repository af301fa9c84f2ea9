// VCS cartridge core modules
pub mod prelude;
pub mod vcs;

// Re-exports
pub use vcs::bus::vcs_bus::VcsBus;
pub use vcs::cartridge::Cartridge;
pub use vcs::cartridge::rom::{Rom, RomError};
pub use vcs::settings::Settings;
