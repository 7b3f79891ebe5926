//! `assert` / `deassert` / `clear-all` — group transitions over the socket.

use std::path::Path;

use super::{Result, StatusOutput, parse_payload, request};

pub fn cmd_transition(socket: &Path, group: &str, assert: bool) -> Result<()> {
    let verb = if assert { "assert" } else { "deassert" };
    request(socket, &format!("{verb} {group}"))?;
    println!("Group '{group}' {verb}ed.");
    Ok(())
}

/// De-assert every group the service currently reports as asserted.
pub fn cmd_clear_all(socket: &Path) -> Result<()> {
    let payload = request(socket, "status")?.unwrap_or_default();
    let status: StatusOutput = parse_payload(&payload)?;

    if status.asserted.is_empty() {
        println!("No groups asserted.");
        return Ok(());
    }
    for group in &status.asserted {
        request(socket, &format!("deassert {group}"))?;
    }
    println!("De-asserted {} group(s).", status.asserted.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transition_without_service_is_an_error() {
        assert!(cmd_transition(Path::new("/nonexistent.sock"), "fault", true).is_err());
    }

    #[test]
    fn clear_all_without_service_is_an_error() {
        assert!(cmd_clear_all(Path::new("/nonexistent.sock")).is_err());
    }
}
