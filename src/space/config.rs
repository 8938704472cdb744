use std::{env, fs, path::Path};

use anyhow::Context;
use serde::{Deserialize, Serialize};

use super::{Result, SpaceError};

/// Settings for a managed memory space.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpaceConfig {
    /// Number of words in the space (default: 100)
    pub capacity: u32,
}

impl Default for SpaceConfig {
    fn default() -> Self {
        Self { capacity: 100 }
    }
}

impl SpaceConfig {
    /// Load config from a JSON file, with environment variable overrides.
    /// Falls back to defaults if the file is not found. `MEMSPACE_CAPACITY` overrides the capacity.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        Self::load(path.as_ref(), env::var("MEMSPACE_CAPACITY").ok().as_deref())
    }

    pub fn validate(&self) -> Result<()> {
        if self.capacity == 0 {
            return Err(SpaceError::InvalidCapacity);
        }

        Ok(())
    }

    fn load(path: &Path, capacity_override: Option<&str>) -> anyhow::Result<Self> {
        let mut cfg = match fs::read_to_string(path) {
            Ok(s) => serde_json::from_str::<SpaceConfig>(&s)
                .with_context(|| format!("parsing config file {}", path.display()))?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => SpaceConfig::default(),
            Err(e) => {
                return Err(e).with_context(|| format!("reading config file {}", path.display()));
            }
        };

        cfg.apply_capacity_override(capacity_override);
        Ok(cfg)
    }

    /// Unparsable values are ignored.
    fn apply_capacity_override(&mut self, value: Option<&str>) {
        if let Some(capacity) = value.and_then(|v| v.parse::<u32>().ok()) {
            self.capacity = capacity;
        }
    }
}
