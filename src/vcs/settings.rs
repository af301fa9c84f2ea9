use serde::{Deserialize, Serialize};

/// Read-only configuration handed to cartridges and the bus at construction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Pick a random start bank on reset, like the undefined latch on real carts
    pub random_startup_bank: bool,
    /// Fill cartridge RAM with noise on reset instead of zeros
    pub random_ram: bool,
    /// Force the start bank; wins over `random_startup_bank`
    pub startup_bank: Option<u16>,
    /// Seed for the power-on randomness; `None` draws a fresh one
    pub seed: Option<u64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            random_startup_bank: true,
            random_ram: true,
            startup_bank: None,
            seed: None,
        }
    }
}

impl Settings {
    pub fn from_json(json: &str) -> Result<Settings, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Reproducible power-on: fixed seed, zeroed RAM, bank chosen by the scheme
    pub fn deterministic(seed: u64) -> Settings {
        Settings {
            random_startup_bank: false,
            random_ram: false,
            startup_bank: None,
            seed: Some(seed),
        }
    }
}
