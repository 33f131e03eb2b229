//! CLI entry point: flags, subcommands, and scheduler wiring.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use timegate_core::{DEFAULT_TERMINAL_PORT, PipelineConfig, TerminalConfig};
use timegate_device::TerminalSdk;
use timegate_device::sdk::{RawAttendanceLog, RawUser};
use timegate_device::sim::{SimSdk, SimTerminal};
use timegate_pipeline::{Forwarder, Pipeline, run_scheduler};
use timegate_store::RecordStore;
use timegate_sync::ForwardClient;

#[derive(Parser)]
#[command(
    name = "timegate",
    version,
    about = "Polls attendance terminals, dedups and stores punches, forwards new batches"
)]
struct Cli {
    /// Terminal address to poll (`ip` or `ip:port`); repeat or comma-separate.
    #[arg(long = "terminal", env = "TIMEGATE_TERMINALS", value_delimiter = ',')]
    terminals: Vec<String>,

    /// Terminal whose punches are stamped IN; all others record OUT.
    /// Defaults to the first configured terminal.
    #[arg(long, env = "TIMEGATE_IN_TERMINAL")]
    in_terminal: Option<String>,

    /// Directory holding the per-day JSON record files.
    #[arg(long, env = "TIMEGATE_DATA_DIR", default_value = "data")]
    data_dir: PathBuf,

    /// Base URL of the downstream collector; omit to disable forwarding.
    #[arg(long, env = "TIMEGATE_COLLECTOR_URL")]
    collector_url: Option<String>,

    /// Poll interval in seconds.
    #[arg(long, env = "TIMEGATE_POLL_INTERVAL", default_value_t = 1800)]
    poll_interval: u64,

    /// Serve scripted simulator terminals instead of vendor hardware.
    #[arg(long)]
    simulate: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Poll on the configured interval until interrupted.
    Run,
    /// Run a single forced cycle and print a summary.
    Cycle,
    /// List store days present on disk.
    Days,
    /// Print one day's stored records as JSON.
    Show { day: String },
    /// Delete one day's store file.
    Delete { day: String },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();

    let store = RecordStore::new(&cli.data_dir);
    match &cli.command {
        Command::Days => {
            for day in store.list_days()? {
                println!("{day}");
            }
            return Ok(());
        }
        Command::Show { day } => {
            let records = store.read_day(day)?;
            println!("{}", serde_json::to_string_pretty(&records)?);
            return Ok(());
        }
        Command::Delete { day } => {
            store.delete_day(day)?;
            println!("deleted {day}");
            return Ok(());
        }
        Command::Run | Command::Cycle => {}
    }

    let config = build_config(&cli)?;
    let sdk = build_sdk(&cli, &config)?;
    let forwarder: Option<Arc<dyn Forwarder>> = match config.collector_url.clone() {
        Some(url) => Some(Arc::new(
            ForwardClient::new(url).context("building collector client")?,
        )),
        None => None,
    };

    let poll_interval = config.poll_interval;
    let pipeline = Arc::new(Pipeline::new(config, sdk, forwarder));

    match cli.command {
        Command::Cycle => {
            let result = pipeline.run_cycle().await?;
            println!(
                "cycle complete: {} new, {} total",
                result.new_records, result.total_records
            );
            for snapshot in &result.device_snapshots {
                match &snapshot.error {
                    None => println!(
                        "  {:<15} online   users={} logs={}",
                        snapshot.device_ip,
                        snapshot.all_users.len(),
                        snapshot.attendance_logs.len()
                    ),
                    Some(error) => {
                        println!("  {:<15} offline  {error}", snapshot.device_ip)
                    }
                }
            }
        }
        Command::Run => {
            tracing::info!(
                interval_secs = poll_interval.as_secs(),
                "timegate v{}, starting scheduler",
                env!("CARGO_PKG_VERSION")
            );
            run_scheduler(pipeline, poll_interval).await;
        }
        _ => unreachable!("store subcommands returned above"),
    }
    Ok(())
}

fn build_config(cli: &Cli) -> anyhow::Result<PipelineConfig> {
    if cli.terminals.is_empty() {
        bail!("no terminals configured; pass --terminal or set TIMEGATE_TERMINALS");
    }
    let terminals: Vec<TerminalConfig> = cli
        .terminals
        .iter()
        .map(|spec| parse_terminal(spec))
        .collect::<anyhow::Result<_>>()?;
    let in_terminal_ip = cli
        .in_terminal
        .clone()
        .unwrap_or_else(|| terminals[0].ip.clone());

    let mut config = PipelineConfig::new(terminals, in_terminal_ip, &cli.data_dir);
    config.poll_interval = Duration::from_secs(cli.poll_interval);
    config.collector_url = cli.collector_url.clone();
    Ok(config)
}

fn parse_terminal(spec: &str) -> anyhow::Result<TerminalConfig> {
    let spec = spec.trim();
    if spec.is_empty() {
        bail!("empty terminal address");
    }
    match spec.split_once(':') {
        Some((ip, port)) => {
            let port: u16 = port
                .parse()
                .with_context(|| format!("invalid port in terminal address {spec:?}"))?;
            Ok(TerminalConfig::new(ip, port))
        }
        None => Ok(TerminalConfig::new(spec, DEFAULT_TERMINAL_PORT)),
    }
}

fn build_sdk(cli: &Cli, config: &PipelineConfig) -> anyhow::Result<Arc<dyn TerminalSdk>> {
    if cli.simulate {
        let mut sdk = SimSdk::new();
        for terminal in &config.terminals {
            sdk = sdk.with_terminal(terminal.ip.clone(), scripted_terminal());
        }
        return Ok(Arc::new(sdk));
    }
    // The vendor wire protocol lives behind TerminalSdk; no hardware backend
    // is linked into this binary yet.
    bail!("no device backend available; run with --simulate or link a vendor SDK backend")
}

/// Small fixed roster with punches over the last hour, enough to watch the
/// dedup and store paths work without hardware.
fn scripted_terminal() -> SimTerminal {
    let users = vec![
        sim_user("1", "Alice", 0),
        sim_user("2", "Bram", 14),
        sim_user("3", "Chandra", 0),
    ];
    let now = chrono::Utc::now();
    let logs = (0..3)
        .map(|i| RawAttendanceLog {
            user_id: Some(format!("{}", i + 1)),
            timestamp: Some(now - chrono::Duration::minutes(i * 20)),
            serial_number: None,
        })
        .collect();
    SimTerminal {
        users,
        logs,
        ..Default::default()
    }
}

fn sim_user(id: &str, name: &str, role: i32) -> RawUser {
    RawUser {
        user_id: Some(id.into()),
        name: Some(name.into()),
        role: Some(role),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_terminal_with_default_port() {
        let t = parse_terminal("10.0.0.1").unwrap();
        assert_eq!(t.ip, "10.0.0.1");
        assert_eq!(t.port, DEFAULT_TERMINAL_PORT);
    }

    #[test]
    fn parse_terminal_with_explicit_port() {
        let t = parse_terminal("10.0.0.1:4371").unwrap();
        assert_eq!(t.port, 4371);
    }

    #[test]
    fn parse_terminal_rejects_bad_port() {
        assert!(parse_terminal("10.0.0.1:notaport").is_err());
        assert!(parse_terminal("").is_err());
    }
}
