//! Control-socket protocol shared by the ledgroupd service and its CLI.
//!
//! Line-oriented over a Unix domain socket: the client sends one request
//! line, the service answers with one response line and closes. Responses
//! are `ok`, `ok <json payload>`, or `err <message>`.

use std::io::{BufRead, BufReader, Write};
use std::os::unix::net::UnixStream;
use std::path::Path;
use std::time::Duration;

/// Default control socket location.
pub const DEFAULT_SOCKET: &str = "/run/ledgroupd.sock";

/// Client-side I/O timeout — the service answers immediately or not at all.
const IO_TIMEOUT: Duration = Duration::from_secs(5);

/// Parsed response line.
#[derive(Debug, Clone, PartialEq)]
pub enum Response {
    Ok(Option<String>),
    Err(String),
}

impl Response {
    pub fn parse(line: &str) -> Response {
        let line = line.trim_end();
        if let Some(rest) = line.strip_prefix("err ") {
            Response::Err(rest.to_string())
        } else if line == "ok" {
            Response::Ok(None)
        } else if let Some(rest) = line.strip_prefix("ok ") {
            Response::Ok(Some(rest.to_string()))
        } else {
            Response::Err(format!("malformed response: {line}"))
        }
    }

    pub fn render(&self) -> String {
        match self {
            Response::Ok(None) => "ok\n".to_string(),
            Response::Ok(Some(payload)) => format!("ok {payload}\n"),
            Response::Err(msg) => format!("err {msg}\n"),
        }
    }
}

/// Send one request line to the service and wait for its response.
pub fn send_request(socket: &Path, request: &str) -> std::io::Result<Response> {
    let mut stream = UnixStream::connect(socket)?;
    stream.set_read_timeout(Some(IO_TIMEOUT))?;
    stream.set_write_timeout(Some(IO_TIMEOUT))?;
    stream.write_all(request.as_bytes())?;
    stream.write_all(b"\n")?;

    let mut reader = BufReader::new(stream);
    let mut line = String::new();
    reader.read_line(&mut line)?;
    Ok(Response::parse(&line))
}
