//! ledgroupd service — loads the group config, restores the persisted
//! asserted set, and serves assert/de-assert requests over the control
//! socket on a single control thread.

use std::io::{BufRead, BufReader, Write};
use std::os::unix::net::{UnixListener, UnixStream};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use clap::Parser;

use ledgroupd_lib::config;
use ledgroupd_lib::control::{self, Response};
use ledgroupd_lib::driver::{LedDriver, SysfsLedDriver};
use ledgroupd_lib::manager::Manager;
use ledgroupd_lib::persist::{DEFAULT_STATE_FILE, SavedGroups};

/// Shared shutdown flag — set by the Ctrl+C / SIGTERM handler.
static RUNNING: AtomicBool = AtomicBool::new(true);

/// Accept-loop nap while no client and no retry work is due.
const IDLE_POLL: Duration = Duration::from_millis(50);

#[derive(Parser)]
#[command(name = "ledgroupd", version, about = "LED group manager service")]
struct Args {
    /// Path to the JSON group config (default: system search path)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Control socket path
    #[arg(long, default_value = control::DEFAULT_SOCKET)]
    socket: PathBuf,

    /// Persisted asserted-group state file
    #[arg(long, default_value = DEFAULT_STATE_FILE)]
    state_file: PathBuf,

    /// Base directory of the kernel LED class
    #[arg(long, default_value = "/sys/class/leds")]
    sysfs_base: PathBuf,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp(None)
        .format_target(false)
        .init();

    let args = Args::parse();
    if let Err(e) = run(args) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let config_path = args
        .config
        .or_else(config::default_config_path)
        .ok_or("no group config found; pass --config or install led-group-config.json")?;
    let map = config::load_group_map(&config_path)?;
    log::info!(
        "loaded {} LED groups from {}",
        map.len(),
        config_path.display()
    );

    let driver = SysfsLedDriver::with_base(&args.sysfs_base);
    let mut manager = Manager::new(driver, map);
    let mut saved = SavedGroups::open(&args.state_file)?;

    // Replay groups asserted before the last shutdown through the full
    // merge/drive pipeline.
    let restore: Vec<String> = saved.groups().map(str::to_string).collect();
    for group in restore {
        match manager.set_group_state(&group, true) {
            Ok(_) => log::info!("restored asserted group {group}"),
            Err(e) => log::warn!("could not restore group {group}: {e}"),
        }
    }

    // Stale socket from an unclean previous shutdown.
    if args.socket.exists() {
        std::fs::remove_file(&args.socket)?;
    }
    let listener = UnixListener::bind(&args.socket)?;
    listener.set_nonblocking(true)?;

    ctrlc::set_handler(|| {
        RUNNING.store(false, Ordering::SeqCst);
    })?;

    log::info!("listening on {}", args.socket.display());

    while RUNNING.load(Ordering::SeqCst) {
        match listener.accept() {
            Ok((stream, _)) => {
                if let Err(e) = serve_client(stream, &mut manager, &mut saved) {
                    log::warn!("client error: {e}");
                }
            }
            Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                let nap = manager.next_retry().map_or(IDLE_POLL, |d| d.min(IDLE_POLL));
                std::thread::sleep(nap);
            }
            Err(e) => return Err(e.into()),
        }
        manager.tick();
    }

    let _ = std::fs::remove_file(&args.socket);
    Ok(())
}

/// Read one request line, run it against the manager, answer, close.
fn serve_client<D: LedDriver>(
    stream: UnixStream,
    manager: &mut Manager<D>,
    saved: &mut SavedGroups,
) -> std::io::Result<()> {
    // Accepted from a non-blocking listener; the per-client read is blocking
    // with a short timeout so a stalled client cannot wedge the loop.
    stream.set_nonblocking(false)?;
    stream.set_read_timeout(Some(Duration::from_secs(1)))?;
    stream.set_write_timeout(Some(Duration::from_secs(1)))?;

    let mut reader = BufReader::new(stream);
    let mut line = String::new();
    reader.read_line(&mut line)?;

    let response = handle_request(line.trim(), manager, saved);
    let mut stream = reader.into_inner();
    stream.write_all(response.render().as_bytes())
}

fn handle_request<D: LedDriver>(
    request: &str,
    manager: &mut Manager<D>,
    saved: &mut SavedGroups,
) -> Response {
    let mut parts = request.split_whitespace();
    match parts.next() {
        Some(verb @ ("assert" | "deassert")) => {
            let Some(group) = parts.next() else {
                return Response::Err(format!("{verb}: missing group name"));
            };
            match manager.set_group_state(group, verb == "assert") {
                Ok(asserted) => {
                    if let Err(e) = saved.store(group, asserted) {
                        log::warn!("could not persist state of group {group}: {e}");
                    }
                    Response::Ok(None)
                }
                Err(e) => Response::Err(e.to_string()),
            }
        }
        Some("status") => {
            let payload = serde_json::json!({
                "asserted": manager.asserted_groups().collect::<Vec<_>>(),
                "pending": manager.pending_leds(),
                "settled": manager.is_settled(),
            });
            Response::Ok(Some(payload.to_string()))
        }
        Some("groups") => {
            let payload = serde_json::json!(manager.group_names().collect::<Vec<_>>());
            Response::Ok(Some(payload.to_string()))
        }
        Some(other) => Response::Err(format!("unknown command '{other}'")),
        None => Response::Err("empty request".into()),
    }
}
