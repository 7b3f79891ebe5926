//! Durable storage of the asserted group set across service restarts.
//!
//! The manager itself never reads this back: the service re-issues
//! `set_group_state(group, true)` for each stored name at startup, which
//! replays the full merge/drive pipeline against real hardware.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use crate::error::{LedgroupdError, Result};

/// Conventional location for the persisted asserted set.
pub const DEFAULT_STATE_FILE: &str = "/var/lib/ledgroupd/saved-groups.json";

/// Persisted asserted-group set, stored as a JSON array of group names.
#[derive(Debug)]
pub struct SavedGroups {
    path: PathBuf,
    groups: BTreeSet<String>,
}

impl SavedGroups {
    /// Open the store, loading any previously saved set. A missing file is an
    /// empty set, not an error.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let groups = match std::fs::read_to_string(&path) {
            Ok(contents) => serde_json::from_str(&contents).map_err(|e| {
                LedgroupdError::Config(format!(
                    "corrupt saved-groups file {}: {e}",
                    path.display()
                ))
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeSet::new(),
            Err(e) => return Err(e.into()),
        };
        Ok(SavedGroups { path, groups })
    }

    /// Record one group's asserted flag and write the set through to disk.
    pub fn store(&mut self, group: &str, asserted: bool) -> Result<()> {
        let changed = if asserted {
            self.groups.insert(group.to_string())
        } else {
            self.groups.remove(group)
        };
        if changed {
            self.write()?;
        }
        Ok(())
    }

    /// Group names that were asserted when last saved.
    pub fn groups(&self) -> impl Iterator<Item = &str> {
        self.groups.iter().map(String::as_str)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    // Atomic write: temp file in the same directory, then rename.
    fn write(&self) -> Result<()> {
        if let Some(dir) = self.path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        let serialized = serde_json::to_string_pretty(&self.groups)
            .map_err(|e| LedgroupdError::Config(format!("serialize saved groups: {e}")))?;
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, &serialized)?;
        match std::fs::rename(&tmp, &self.path) {
            Ok(()) => Ok(()),
            Err(_) => {
                // Rename can fail across filesystems; fall back to direct write.
                let result = std::fs::write(&self.path, &serialized);
                let _ = std::fs::remove_file(&tmp);
                result.map_err(Into::into)
            }
        }
    }
}
