use std::{
    fs,
    io::{self, BufRead},
    path::{Path, PathBuf},
};

use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use uos::{
    frame_count, DecodeOutcome, Decoder, DecoderConfigBuilder, NetworkRegistry, ReassemblyState,
    SigningRequest,
};

#[derive(Parser)]
#[command(name = "uos-scan", version, about = "Decode Uniform Online Signer QR scans")]
struct Cli {
    /// Log decoder progress to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Decode the scans of one request and print it as JSON
    Decode {
        /// Network registry JSON (defaults to the built-in networks)
        #[arg(long, env = "UOS_NETWORKS")]
        networks: Option<PathBuf>,
        /// Largest frame count accepted for a multipart sequence
        #[arg(long)]
        max_frames: Option<u16>,
        /// Hex scans; read one per line from stdin when omitted
        scans: Vec<String>,
    },
    /// Print the number of frames a scan's sequence declares
    Frames { scan: String },
    /// Print the built-in network registry as JSON
    Networks,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Decode {
            networks,
            max_frames,
            scans,
        } => cmd_decode(networks.as_deref(), max_frames, scans),
        Commands::Frames { scan } => cmd_frames(&scan),
        Commands::Networks => cmd_networks(),
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn cmd_decode(networks: Option<&Path>, max_frames: Option<u16>, scans: Vec<String>) -> Result<()> {
    let registry = load_registry(networks)?;

    let mut builder = DecoderConfigBuilder::new();
    if let Some(max) = max_frames {
        builder = builder.max_frame_count(max);
    }
    let config = builder.build().map_err(|err| anyhow!(err))?;
    let decoder = Decoder::with_config(config);

    let scans = if scans.is_empty() {
        read_stdin_scans()?
    } else {
        scans
    };
    if scans.is_empty() {
        bail!("no scans given");
    }

    let mut session = ReassemblyState::new();
    for scan in &scans {
        match decoder.decode_scan(scan, &mut session, &registry) {
            DecodeOutcome::NeedMoreFrames { received, total } => {
                tracing::debug!(received, total, "waiting for more frames");
            }
            DecodeOutcome::Ready(request) => return print_request(&request),
            DecodeOutcome::Failed(err) => bail!("{}: {}", err.kind(), err),
        }
    }

    bail!(
        "IncompleteSequence: received {} of {} frames, missing {:?}",
        session.received(),
        session.frame_count().unwrap_or(0),
        session.missing_frames()
    )
}

fn cmd_frames(scan: &str) -> Result<()> {
    let count = frame_count(scan.trim()).map_err(|err| anyhow!("{}: {}", err.kind(), err))?;
    println!("{count}");
    Ok(())
}

fn cmd_networks() -> Result<()> {
    println!("{}", NetworkRegistry::with_defaults().to_json()?);
    Ok(())
}

fn load_registry(path: Option<&Path>) -> Result<NetworkRegistry> {
    let Some(path) = path else {
        return Ok(NetworkRegistry::with_defaults());
    };
    let json = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    NetworkRegistry::from_json(&json)
        .with_context(|| format!("invalid network registry {}", path.display()))
}

fn read_stdin_scans() -> Result<Vec<String>> {
    let mut scans = Vec::new();
    for line in io::stdin().lock().lines() {
        let line = line.context("failed to read stdin")?;
        let line = line.trim();
        if !line.is_empty() {
            scans.push(line.to_string());
        }
    }
    Ok(scans)
}

fn print_request(request: &SigningRequest) -> Result<()> {
    let json = serde_json::to_string_pretty(request)?;
    println!("{json}");
    if let SigningRequest::SubstrateMessage(message) = request {
        tracing::info!(text = %message.display_text(), "message to sign");
    }
    Ok(())
}
