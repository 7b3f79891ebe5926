//! `status` — asserted groups and hardware convergence, from the service.

use std::path::Path;

use super::{LedgroupdError, Result, StatusOutput, kv, kv_width, parse_payload, request};

pub fn cmd_status(socket: &Path, json: bool) -> Result<()> {
    let payload = request(socket, "status")?.unwrap_or_default();
    let status: StatusOutput = parse_payload(&payload)?;

    if json {
        let rendered = serde_json::to_string_pretty(&status)
            .map_err(|e| LedgroupdError::Config(format!("JSON serialization failed: {e}")))?;
        println!("{rendered}");
        return Ok(());
    }

    let w = kv_width(&["Asserted:", "Pending:", "Settled:"], &[]);
    kv("Asserted:", list_or_none(&status.asserted), w);
    kv("Pending:", list_or_none(&status.pending), w);
    kv("Settled:", if status.settled { "yes" } else { "no" }, w);
    Ok(())
}

fn list_or_none(items: &[String]) -> String {
    if items.is_empty() {
        "(none)".to_string()
    } else {
        items.join(", ")
    }
}
