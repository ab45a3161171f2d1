//! Lumen entrypoint: wires config, logging, transport, and the core crates
//! together behind a small `clap` CLI exercising the external request
//! surface by hand (`spec.md` §6).

mod seed;

use anyhow::{bail, Result};
use clap::{Parser, Subcommand, ValueEnum};
use lumen_events::EventBus;
use lumen_inventory::config::{self, ConfigFile};
use lumen_model::{status_code, EntityKind as ModelEntityKind, LumenModel};
use lumen_resolver::Resolver;
use lumen_session::SessionController;
use lumen_simulator::Simulator;
use lumen_transport::{spawn, RealSerialOpener, SimulationOpener};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;

#[derive(Parser, Debug)]
#[command(name = "lumen", version, about = "Architectural lighting control")]
struct Args {
    /// Optional configuration file path (overrides discovery of `lumen.toml`).
    #[arg(long = "config")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: CliCommand,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum EntityKind {
    Apartment,
    FloorGroup,
    Fixture,
}

impl From<EntityKind> for ModelEntityKind {
    fn from(kind: EntityKind) -> Self {
        match kind {
            EntityKind::Apartment => ModelEntityKind::Apartment,
            EntityKind::FloorGroup => ModelEntityKind::FloorGroup,
            EntityKind::Fixture => ModelEntityKind::Fixture,
        }
    }
}

#[derive(Subcommand, Debug)]
enum CliCommand {
    /// Light an apartment, floor group, or raw fixture to a named state.
    Light {
        #[arg(value_enum)]
        kind: EntityKind,
        id: String,
        state: String,
        #[arg(long)]
        intensity: Option<u8>,
        #[arg(long = "fade-ms")]
        fade_ms: Option<u32>,
        #[arg(long)]
        r: Option<u8>,
        #[arg(long)]
        g: Option<u8>,
        #[arg(long)]
        b: Option<u8>,
    },
    /// Turn an apartment, floor group, or raw fixture off.
    Off {
        #[arg(value_enum)]
        kind: EntityKind,
        id: String,
    },
    /// Turn every known fixture off.
    OffAll,
    /// Turn every known fixture on, optionally at a given intensity.
    OnAll {
        #[arg(long)]
        intensity: Option<u8>,
    },
    /// Begin an agent's session (cancels ambient, fades the building down).
    Login { agent: String },
    /// End an agent's session (resumes the configured ambient sequence).
    Logout { agent: String },
    /// Send an already-encoded SLIP frame, given as a hex string.
    Raw { hex: String },
    /// Report transport, session, and animation status.
    Status,
}

fn configure_logging(retention_days: u32) -> Result<Option<WorkerGuard>> {
    let file_appender = tracing_appender::rolling::Builder::new()
        .rotation(tracing_appender::rolling::Rotation::DAILY)
        .filename_prefix("lumen")
        .filename_suffix("log")
        .max_log_files(retention_days.max(1) as usize)
        .build(".")?;
    let (nb_writer, guard) = tracing_appender::non_blocking(file_appender);
    match tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(nb_writer)
        .try_init()
    {
        Ok(()) => Ok(Some(guard)),
        Err(_) => Ok(None),
    }
}

fn decode_hex(hex: &str) -> Result<Vec<u8>> {
    let hex = hex.trim();
    if hex.len() % 2 != 0 {
        bail!("hex string must have an even number of digits");
    }
    (0..hex.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(&hex[i..i + 2], 16).map_err(anyhow::Error::from))
        .collect()
}

async fn build_model(config: &ConfigFile) -> LumenModel {
    let inventory = Arc::new(seed::demo_building());
    let events = EventBus::new(lumen_events::EVENT_CHANNEL_CAP);

    let (transport, _writer) = if config.simulation_mode {
        spawn(Arc::new(SimulationOpener), true, events.clone())
    } else {
        let opener = RealSerialOpener {
            com_port: config.com_port.clone(),
            baud_rate: config.baud_rate,
        };
        spawn(Arc::new(opener), false, events.clone())
    };

    let resolver = Resolver::new(
        inventory.clone(),
        transport.clone(),
        config.default_intensity,
        config.default_fade_time_ms,
    );
    let session = SessionController::new(
        inventory.clone(),
        transport.clone(),
        events.clone(),
        Duration::from_millis(config.login_fade_delay_ms),
        config.ambient_enabled,
        Some(config.ambient_sequence_id.clone()),
    );
    let simulator = Simulator::new();
    simulator.spawn(&events);

    LumenModel::new(
        inventory,
        transport,
        resolver,
        session,
        simulator,
        config.default_fade_time_ms,
    )
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = config::load_from(args.config);
    let _log_guard = configure_logging(config.log_retention_days)?;
    info!(
        target: "runtime",
        simulation_mode = config.simulation_mode,
        com_port = %config.com_port,
        "startup"
    );

    let model = build_model(&config).await;
    if config.ambient_enabled && !model.query_status().session_active {
        model.start_ambient(&config.ambient_sequence_id);
    }

    let result = run_command(&model, args.command).await;
    match result {
        Ok(()) => Ok(()),
        Err(err) => {
            if let Some(lumen_err) = err.downcast_ref::<lumen_model::LumenError>() {
                eprintln!("error ({}): {lumen_err}", status_code(lumen_err));
            } else {
                eprintln!("error: {err}");
            }
            std::process::exit(1);
        }
    }
}

async fn run_command(model: &LumenModel, command: CliCommand) -> Result<()> {
    match command {
        CliCommand::Light {
            kind,
            id,
            state,
            intensity,
            fade_ms,
            r,
            g,
            b,
        } => {
            let rgb = match (r, g, b) {
                (Some(r), Some(g), Some(b)) => Some((r, g, b)),
                (None, None, None) => None,
                _ => bail!("--r, --g, and --b must be given together"),
            };
            model
                .light_entity(kind.into(), &id, &state, intensity, fade_ms, rgb)
                .await?;
            println!("ok");
        }
        CliCommand::Off { kind, id } => {
            model.off_entity(kind.into(), &id).await?;
            println!("ok");
        }
        CliCommand::OffAll => {
            model.off_all().await?;
            println!("ok");
        }
        CliCommand::OnAll { intensity } => {
            model.on_all(intensity).await?;
            println!("ok");
        }
        CliCommand::Login { agent } => {
            model.login(agent).await?;
            println!("ok");
        }
        CliCommand::Logout { agent } => {
            model.logout(agent).await?;
            println!("ok");
        }
        CliCommand::Raw { hex } => {
            let bytes = decode_hex(&hex)?;
            model.send_raw_frame(bytes).await?;
            println!("ok");
        }
        CliCommand::Status => {
            let status = model.query_status();
            println!("transport: {:?}", status.transport.state);
            println!("queue_depth: {}", status.transport.queue_depth);
            println!("jobs_completed: {}", status.transport.counters.jobs_completed);
            println!("session_active: {}", status.session_active);
            println!("animation_running: {}", status.animation_running);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_hex_round_trips_a_slip_frame() {
        let bytes = decode_hex("c0200ac0").unwrap();
        assert_eq!(bytes, vec![0xC0, 0x20, 0x0A, 0xC0]);
    }

    #[test]
    fn decode_hex_rejects_odd_length() {
        assert!(decode_hex("abc").is_err());
    }

    #[test]
    fn demo_building_has_two_floors() {
        let inventory = seed::demo_building();
        assert_eq!(lumen_inventory::InventoryStore::floors_descending(&inventory), vec![10, 9]);
    }

    #[tokio::test]
    async fn status_subcommand_reports_idle_session() {
        let config = ConfigFile::default();
        let model = build_model(&config).await;
        let status = model.query_status();
        assert!(!status.session_active);
    }
}
