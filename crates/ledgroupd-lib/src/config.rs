//! Group configuration — JSON file mapping group names to LED member sets.
//!
//! Format (one object per group under `"leds"`):
//!
//! ```json
//! {
//!   "leds": [
//!     {
//!       "group": "enclosure_identify",
//!       "members": [
//!         { "Name": "front_id", "Action": "Blink",
//!           "DutyOn": 50, "Period": 1000, "Priority": "Blink" }
//!       ]
//!     }
//!   ]
//! }
//! ```
//!
//! `DutyOn` defaults to 50, `Period` to 0, and `Priority` to the member's own
//! `Action`. The loaded map is read-only for the life of the process.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{LedgroupdError, Result};
use crate::layout::{Action, GroupLayout, LedAction};

/// Group name -> desired LED pattern, loaded once at startup.
pub type GroupMap = BTreeMap<String, GroupLayout>;

/// Conventional config file name.
pub const CONFIG_FILE_NAME: &str = "led-group-config.json";

/// Local-override config directory, checked first.
const CONFIG_OVERRIDE_DIR: &str = "/etc/ledgroupd";
/// Distribution config directory.
const CONFIG_BASE_DIR: &str = "/usr/share/ledgroupd";

#[derive(Debug, Deserialize)]
struct ConfigFile {
    leds: Vec<GroupEntry>,
}

#[derive(Debug, Deserialize)]
struct GroupEntry {
    group: String,
    members: Vec<MemberEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct MemberEntry {
    name: String,
    action: Action,
    #[serde(default = "default_duty_on")]
    duty_on: u8,
    #[serde(default)]
    period: u16,
    priority: Option<Action>,
}

fn default_duty_on() -> u8 {
    50
}

impl MemberEntry {
    fn into_led_action(self) -> LedAction {
        let priority = self.priority.unwrap_or(self.action);
        LedAction {
            name: self.name,
            action: self.action,
            duty_on: self.duty_on,
            period: self.period,
            priority,
        }
    }
}

/// Default config path: the override directory if a file exists there,
/// otherwise the base directory.
pub fn default_config_path() -> Option<PathBuf> {
    for dir in [CONFIG_OVERRIDE_DIR, CONFIG_BASE_DIR] {
        let candidate = Path::new(dir).join(CONFIG_FILE_NAME);
        if candidate.exists() {
            return Some(candidate);
        }
    }
    None
}

/// Load and validate the group-to-LED mapping from a JSON config file.
pub fn load_group_map(path: &Path) -> Result<GroupMap> {
    let contents = std::fs::read_to_string(path)?;
    parse_group_map(&contents)
}

/// Parse the mapping from JSON text (exposed for tests and embedding).
pub fn parse_group_map(contents: &str) -> Result<GroupMap> {
    let parsed: ConfigFile = serde_json::from_str(contents)
        .map_err(|e| LedgroupdError::Config(format!("invalid group config: {e}")))?;

    let mut map = GroupMap::new();
    for entry in parsed.leds {
        let members: Vec<LedAction> = entry
            .members
            .into_iter()
            .map(MemberEntry::into_led_action)
            .collect();
        let layout = GroupLayout::new(members).map_err(|e| {
            LedgroupdError::Config(format!("group '{}': {e}", entry.group))
        })?;
        if map.insert(entry.group.clone(), layout).is_some() {
            return Err(LedgroupdError::Config(format!(
                "group '{}' defined twice",
                entry.group
            )));
        }
    }
    Ok(map)
}
