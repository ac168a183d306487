//! Staff Portal CLI Server
//!
//! Headless portal server suitable for a systemd service, a container or a
//! plain process on a workstation.
//!
//! ```sh
//! # Run with default config (~/.config/staff-portal/config.toml)
//! staff-portal
//!
//! # Custom config path and port
//! staff-portal --config /etc/staff-portal/config.toml --port 9090
//!
//! # Validate config without starting
//! staff-portal --check
//!
//! # Fill the configured backend with demo data
//! staff-portal seed --patients 200 --appointments 500
//! ```

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use tracing::{error, info, warn};

use staff_portal::config::{AppConfig, BackendKind, SeedConfig};
use staff_portal::infrastructure::build_gateway;
use staff_portal::server::{init_tracing, seed_demo_data, ServerHandle, ServerOptions};

/// Staff Portal: role-gated access to hospital records.
#[derive(Parser, Debug)]
#[command(
    name = "staff-portal",
    version,
    about = "Role-gated internal portal for hospital staff",
    long_about = "Staff Portal: REST API over a hosted PostgREST backend, \
                  gating record tables by the signed-in employee's department.\n\n\
                  Default config: ~/.config/staff-portal/config.toml"
)]
struct Cli {
    /// Path to the configuration file (TOML).
    #[arg(short, long, env = "PORTAL_CONFIG")]
    config: Option<PathBuf>,

    /// Override the REST API listen port.
    #[arg(short, long)]
    port: Option<u16>,

    /// Override the log level (trace, debug, info, warn, error).
    #[arg(short, long)]
    log_level: Option<String>,

    /// Validate the configuration file and exit without starting the server.
    #[arg(long)]
    check: bool,

    /// Do not seed the in-memory backend on start.
    #[arg(long)]
    no_seed: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Insert a demo data set into the configured backend and exit.
    Seed(SeedArgs),
}

#[derive(Args, Debug)]
struct SeedArgs {
    #[arg(long)]
    patients: Option<u32>,
    #[arg(long)]
    employees: Option<u32>,
    #[arg(long)]
    medications: Option<u32>,
    #[arg(long)]
    appointments: Option<u32>,
    #[arg(long)]
    billing: Option<u32>,
    #[arg(long)]
    prescriptions: Option<u32>,
    #[arg(long)]
    announcements: Option<u32>,
}

impl SeedArgs {
    fn apply(&self, counts: &mut SeedConfig) {
        let overrides = [
            (self.patients, &mut counts.patients),
            (self.employees, &mut counts.employees),
            (self.medications, &mut counts.medications),
            (self.appointments, &mut counts.appointments),
            (self.billing, &mut counts.billing),
            (self.prescriptions, &mut counts.prescriptions),
            (self.announcements, &mut counts.announcements),
        ];
        for (value, slot) in overrides {
            if let Some(value) = value {
                *slot = value;
            }
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // ── Load configuration ─────────────────────────────────────
    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(staff_portal::default_config_path);

    let loaded = AppConfig::load(&config_path);
    let mut config = match &loaded {
        Ok(cfg) => cfg.clone(),
        Err(_) => AppConfig::default(),
    };

    // ── Apply CLI overrides ────────────────────────────────────
    if let Some(ref level) = cli.log_level {
        config.logging.level = level.clone();
    }
    init_tracing(&config);
    match loaded {
        Ok(_) => info!("Configuration loaded from {}", config_path.display()),
        Err(e) => {
            error!("Failed to load config from {}: {}", config_path.display(), e);
            error!("Using default configuration.");
        }
    }

    if let Some(port) = cli.port {
        info!("CLI override: port = {}", port);
        config.server.port = port;
    }

    // ── Config validation mode ─────────────────────────────────
    if cli.check {
        if let Err(e) = config.validate() {
            error!("Configuration is invalid: {}", e);
            return Err(e.into());
        }
        println!("✅ Configuration is valid");
        println!("   Config file : {}", config_path.display());
        println!("   API address : {}", config.server.address());
        println!("   Backend     : {:?} {}", config.backend.kind, config.backend.url);
        println!("   Log level   : {}", config.logging.level);
        return Ok(());
    }

    // ── Seed mode ──────────────────────────────────────────────
    if let Some(Command::Seed(args)) = cli.command {
        let mut counts = config.seed.clone();
        args.apply(&mut counts);
        if config.backend.kind == BackendKind::Memory {
            warn!("Backend is in-memory; seeded rows are discarded on exit");
        }
        let gateway = build_gateway(&config.backend)?;
        let report = seed_demo_data(&gateway, counts).await?;
        info!(?report, "Demo data inserted");
        println!("{:#?}", report);
        return Ok(());
    }

    // ── Start server ───────────────────────────────────────────
    let seed_memory_backend = config.backend.seed_on_start && !cli.no_seed;
    let handle = ServerHandle::start(ServerOptions {
        config,
        seed_memory_backend,
    })
    .await?;

    handle.install_signal_handler();

    info!("🚀 Press Ctrl+C to shutdown gracefully.");

    handle.shutdown_signal().wait().await;
    handle.wait().await;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_overrides() {
        let cli = Cli::parse_from(["staff-portal", "seed", "--patients", "7", "--billing", "0"]);
        let Some(Command::Seed(args)) = cli.command else {
            panic!("expected seed subcommand");
        };
        let mut counts = SeedConfig::default();
        args.apply(&mut counts);
        assert_eq!(counts.patients, 7);
        assert_eq!(counts.billing, 0);
        assert_eq!(counts.employees, SeedConfig::default().employees);
    }

    #[test]
    fn test_cli_flags() {
        let cli = Cli::parse_from(["staff-portal", "--port", "9090", "--check", "--no-seed"]);
        assert_eq!(cli.port, Some(9090));
        assert!(cli.check);
        assert!(cli.no_seed);
        assert!(cli.command.is_none());
    }
}
