//! ledgroupd CLI — inspect and drive LED groups through the service's
//! control socket.

use std::path::PathBuf;

use clap::Parser;

mod cli;

#[derive(Parser)]
#[command(
    name = "ledgroupd-cli",
    version,
    about = "Assert and inspect LED groups managed by ledgroupd"
)]
struct Args {
    /// Output as JSON (for groups, status)
    #[arg(long, global = true)]
    json: bool,

    /// Control socket of the running service
    #[arg(long, global = true, default_value = ledgroupd_lib::control::DEFAULT_SOCKET)]
    socket: PathBuf,

    #[command(subcommand)]
    command: cli::Command,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .format_timestamp(None)
        .format_target(false)
        .init();

    let args = Args::parse();

    if let Err(e) = cli::run(args.command, &args.socket, args.json) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
