use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use crate::activation::CellActivations;
use crate::error::KernelError;

/// Run-time choices for a cell kernel.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KernelConfig {
    pub activations: CellActivations,
    pub use_peephole: bool,
}

impl Default for KernelConfig {
    fn default() -> Self {
        KernelConfig {
            activations: CellActivations::default(),
            use_peephole: true,
        }
    }
}

/// Kernel config persistence operations
pub struct ConfigPersistence;

impl ConfigPersistence {
    /// Save config to JSON format (human-readable)
    pub fn save_to_json<P: AsRef<Path>>(config: &KernelConfig, path: P) -> Result<(), KernelError> {
        let json = serde_json::to_string_pretty(config)?;
        let mut file = File::create(path.as_ref())?;
        file.write_all(json.as_bytes())?;
        log::debug!("saved kernel config to {}", path.as_ref().display());
        Ok(())
    }

    /// Load config from JSON format
    pub fn load_from_json<P: AsRef<Path>>(path: P) -> Result<KernelConfig, KernelError> {
        let mut file = File::open(path.as_ref())?;
        let mut contents = String::new();
        file.read_to_string(&mut contents)?;
        let config = serde_json::from_str(&contents)?;
        log::debug!("loaded kernel config from {}", path.as_ref().display());
        Ok(config)
    }

    /// Save config to binary format
    pub fn save_to_binary<P: AsRef<Path>>(config: &KernelConfig, path: P) -> Result<(), KernelError> {
        let encoded = bincode::serialize(config)?;
        let mut file = File::create(path.as_ref())?;
        file.write_all(&encoded)?;
        log::debug!("saved kernel config to {} ({} bytes)", path.as_ref().display(), encoded.len());
        Ok(())
    }

    /// Load config from binary format
    pub fn load_from_binary<P: AsRef<Path>>(path: P) -> Result<KernelConfig, KernelError> {
        let mut file = File::open(path.as_ref())?;
        let mut contents = Vec::new();
        file.read_to_end(&mut contents)?;
        let config = bincode::deserialize(&contents)?;
        log::debug!("loaded kernel config from {}", path.as_ref().display());
        Ok(config)
    }
}

/// Save/load with the format picked from the file extension:
/// `.json` is JSON, anything else is binary.
pub trait PersistentConfig {
    fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), KernelError>;

    fn load<P: AsRef<Path>>(path: P) -> Result<Self, KernelError>
    where
        Self: Sized;
}

fn is_json(path: &Path) -> bool {
    path.extension().and_then(|s| s.to_str()) == Some("json")
}

impl PersistentConfig for KernelConfig {
    fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), KernelError> {
        if is_json(path.as_ref()) {
            ConfigPersistence::save_to_json(self, path)
        } else {
            ConfigPersistence::save_to_binary(self, path)
        }
    }

    fn load<P: AsRef<Path>>(path: P) -> Result<Self, KernelError> {
        if is_json(path.as_ref()) {
            ConfigPersistence::load_from_json(path)
        } else {
            ConfigPersistence::load_from_binary(path)
        }
    }
}
