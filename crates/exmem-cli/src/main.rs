mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use exmem_core::EngineConfig;
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "exmem")]
#[command(about = "Inspect remote structures through declared layouts")]
struct Args {
    /// Engine configuration file (JSON)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show resolved layouts: sizes, processing order and pointer regions
    Layout {
        /// Schema file (JSON)
        #[arg(long)]
        schema: PathBuf,

        /// Only show this layout
        #[arg(short, long)]
        name: Option<String>,
    },
    /// Read a structure from a memory snapshot
    Inspect {
        #[arg(long)]
        schema: PathBuf,

        /// Memory snapshot file (JSON)
        #[arg(long)]
        snapshot: PathBuf,

        /// Layout to read
        #[arg(short, long)]
        layout: String,

        /// Address in hex (e.g., 0x1431B08A0)
        #[arg(short, long)]
        address: String,

        /// Treat the address as a sequence header of `layout` elements
        #[arg(long)]
        sequence: bool,

        /// Print the structure dump as JSON
        #[arg(long)]
        json: bool,
    },
    /// Decode a single value from a memory snapshot
    Peek {
        #[arg(long)]
        snapshot: PathBuf,

        #[arg(short, long)]
        address: String,

        /// Value type (i32, f32, pointer, ...)
        #[arg(short = 't', long = "type")]
        value_type: String,
    },
    /// Hexdump a range of a memory snapshot
    Hexdump {
        #[arg(long)]
        snapshot: PathBuf,

        #[arg(short, long)]
        address: String,

        /// Number of bytes to dump
        #[arg(short, long, default_value = "256")]
        size: usize,

        /// Show ASCII column
        #[arg(long)]
        ascii: bool,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let directive = if args.verbose { "exmem=debug" } else { "exmem=info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(directive.parse()?))
        .init();

    let config = load_config(args.config.as_ref());

    match args.command {
        Command::Layout { schema, name } => commands::layout::run(&schema, name.as_deref(), &config),
        Command::Inspect {
            schema,
            snapshot,
            layout,
            address,
            sequence,
            json,
        } => commands::inspect::run(
            &commands::inspect::InspectArgs {
                schema: &schema,
                snapshot: &snapshot,
                layout: &layout,
                address: &address,
                sequence,
                json,
            },
            &config,
        ),
        Command::Peek {
            snapshot,
            address,
            value_type,
        } => commands::peek::run(&snapshot, &address, &value_type, &config),
        Command::Hexdump {
            snapshot,
            address,
            size,
            ascii,
        } => commands::hexdump::run(&snapshot, &address, size, ascii),
    }
}

fn load_config(path: Option<&PathBuf>) -> EngineConfig {
    let Some(path) = path else {
        return EngineConfig::default();
    };

    match EngineConfig::load(path) {
        Ok(c) => {
            info!("Loaded config from {:?}", path);
            c
        }
        Err(e) => {
            warn!("Failed to load config: {}, using defaults", e);
            EngineConfig::default()
        }
    }
}
