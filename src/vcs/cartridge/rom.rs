use log::debug;
use thiserror::Error;

use crate::vcs::bus::consts::BANK_SIZE;
use crate::vcs::cartridge::Cartridge;
use crate::vcs::cartridge::cart_4k::Cartridge4K;
use crate::vcs::cartridge::cart_std::CartridgeStd;
use crate::vcs::cartridge::scheme::{self, Scheme};
use crate::vcs::settings::Settings;

// Bytes at the start of each bank a SuperChip image leaves to the RAM ports
const SC_PORT_SIZE: usize = 128;

#[derive(Debug, Error)]
pub enum RomError {
    #[error("ROM image is empty")]
    Empty,

    #[error("Unsupported bankswitching scheme: {0}")]
    UnsupportedScheme(String),
}

pub struct Rom {
    pub image: Vec<u8>,
}

impl Rom {
    pub fn new(image: Vec<u8>) -> Result<Rom, RomError> {
        if image.is_empty() {
            return Err(RomError::Empty);
        }
        Ok(Rom { image })
    }

    /// Guess the scheme from the image size, then look for SuperChip RAM ports
    pub fn detect_scheme(&self) -> &'static Scheme {
        let size = self.image.len();
        let by_size = match size {
            0..=0x0800 => &scheme::SCHEME_2K,
            0x0801..=0x1000 => &scheme::SCHEME_4K,
            0x1001..=0x2000 => &scheme::SCHEME_F8,
            0x2001..=0x4000 => &scheme::SCHEME_F6,
            _ => &scheme::SCHEME_F4,
        };

        let detected = if by_size.is_banked() && self.has_superchip_ports() {
            match by_size.name {
                "F8" => &scheme::SCHEME_F8SC,
                "F6" => &scheme::SCHEME_F6SC,
                _ => &scheme::SCHEME_F4SC,
            }
        } else {
            by_size
        };

        debug!("{} byte image detected as {}", size, detected.name);
        detected
    }

    /// In every bank the write port and read port areas hold identical filler
    fn has_superchip_ports(&self) -> bool {
        self.image.chunks(BANK_SIZE).all(|bank| {
            bank.len() >= SC_PORT_SIZE * 2
                && bank[..SC_PORT_SIZE] == bank[SC_PORT_SIZE..SC_PORT_SIZE * 2]
        })
    }

    /// Build the cartridge for `scheme_name`, or the detected scheme when `None`
    pub fn into_cartridge(
        self,
        scheme_name: Option<&str>,
        settings: &Settings,
    ) -> Result<Box<dyn Cartridge>, RomError> {
        let selected = match scheme_name {
            Some(name) => {
                scheme::by_name(name).ok_or_else(|| RomError::UnsupportedScheme(name.to_string()))?
            }
            None => self.detect_scheme(),
        };

        if selected.is_banked() {
            Ok(Box::new(CartridgeStd::new(&self.image, selected, settings)))
        } else {
            Ok(Box::new(Cartridge4K::new(&self.image, selected, settings)))
        }
    }
}
