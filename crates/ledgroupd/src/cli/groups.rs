//! `groups` — list known LED groups and their member actions.

use std::path::{Path, PathBuf};

use ledgroupd_lib::config::{self, GroupMap};
use ledgroupd_lib::layout::{Action, LedAction};

use super::{
    GroupJson, GroupsOutput, LedgroupdError, MemberJson, Result, kv, kv_indent, kv_width,
    parse_payload, request,
};

/// With `--config` the file is read directly (works without a running
/// service); otherwise the service is asked for its loaded group names.
pub fn cmd_groups(config: Option<PathBuf>, socket: &Path, json: bool) -> Result<()> {
    match config {
        Some(path) => {
            let map = config::load_group_map(&path)?;
            if json {
                print_json(&map)
            } else {
                print_plain(&map);
                Ok(())
            }
        }
        None => {
            let payload = request(socket, "groups")?.unwrap_or_default();
            if json {
                println!("{payload}");
            } else {
                let names: Vec<String> = parse_payload(&payload)?;
                for name in names {
                    println!("{name}");
                }
            }
            Ok(())
        }
    }
}

fn member_value(led: &LedAction) -> String {
    let mut value = led.action.to_string();
    if led.action == Action::Blink {
        value.push_str(&format!(" ({}% of {}ms)", led.duty_on, led.period));
    }
    if led.priority != led.action {
        value.push_str(&format!(", priority {}", led.priority));
    }
    value
}

fn print_plain(map: &GroupMap) {
    let member_keys: Vec<String> = map
        .values()
        .flat_map(|layout| layout.leds())
        .map(|led| format!("{}:", led.name))
        .collect();
    let member_refs: Vec<&str> = member_keys.iter().map(String::as_str).collect();
    let w = kv_width(&[], &member_refs);

    for (name, layout) in map {
        println!("{name}");
        for led in layout.leds() {
            kv_indent(&format!("{}:", led.name), member_value(led), w);
        }
    }
    kv("Groups:", map.len(), kv_width(&["Groups:"], &[]).max(w));
}

fn print_json(map: &GroupMap) -> Result<()> {
    let output = GroupsOutput {
        count: map.len(),
        groups: map
            .iter()
            .map(|(name, layout)| GroupJson {
                name: name.clone(),
                members: layout
                    .leds()
                    .iter()
                    .map(|led| MemberJson {
                        name: led.name.clone(),
                        action: led.action.to_string(),
                        duty_on: led.duty_on,
                        period: led.period,
                        priority: led.priority.to_string(),
                    })
                    .collect(),
            })
            .collect(),
    };
    let rendered = serde_json::to_string_pretty(&output)
        .map_err(|e| LedgroupdError::Config(format!("JSON serialization failed: {e}")))?;
    println!("{rendered}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{ "leds": [
        { "group": "enclosure_identify", "members": [
            { "Name": "front_id", "Action": "Blink", "DutyOn": 50, "Period": 1000 },
            { "Name": "rear_id", "Action": "Blink", "DutyOn": 50, "Period": 1000 } ] }
    ]}"#;

    fn sample_config() -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("led-group-config.json");
        std::fs::write(&path, SAMPLE).unwrap();
        (dir, path)
    }

    #[test]
    fn cmd_groups_plain_from_file() {
        let (_dir, path) = sample_config();
        let result = cmd_groups(Some(path), Path::new("/nonexistent.sock"), false);
        assert!(result.is_ok());
    }

    #[test]
    fn cmd_groups_json_from_file() {
        let (_dir, path) = sample_config();
        let result = cmd_groups(Some(path), Path::new("/nonexistent.sock"), true);
        assert!(result.is_ok());
    }

    #[test]
    fn cmd_groups_missing_file_is_an_error() {
        let result = cmd_groups(
            Some(PathBuf::from("/nonexistent/config.json")),
            Path::new("/nonexistent.sock"),
            false,
        );
        assert!(result.is_err());
    }

    #[test]
    fn member_value_blink_includes_parameters() {
        let led = LedAction::new("front_id", Action::Blink).with_blink(25, 2000);
        assert_eq!(member_value(&led), "Blink (25% of 2000ms)");
    }

    #[test]
    fn member_value_notes_divergent_priority() {
        let led = LedAction::new("front_id", Action::On).with_priority(Action::Blink);
        assert_eq!(member_value(&led), "On, priority Blink");
    }
}
