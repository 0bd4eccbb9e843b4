//! LinkLab - two-layer communication stack simulator
//!
//! This is the main entry point for transmitting, receiving and simulating
//! messages over the modeled physical and data-link layers.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;
use tracing::info;

use linklab_pipeline::channel::AwgnChannel;
use linklab_tools::opts::StackArgs;
use linklab_tools::wav;

/// LinkLab stack simulator
#[derive(Parser)]
#[command(name = "linklab")]
#[command(about = "Simulated digital communication stack: line/carrier codecs, framing, error control")]
#[command(version = "0.1.0")]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Enable debug output
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Transmit a message to a WAV file
    Tx(TxArgs),
    /// Receive and decode a WAV file
    Rx(RxArgs),
    /// Run the full loop through the noisy channel
    Simulate(SimulateArgs),
}

#[derive(Parser)]
struct TxArgs {
    #[command(flatten)]
    stack: StackArgs,

    /// Output audio file
    #[arg(short, long)]
    output: PathBuf,

    /// Message text to transmit
    #[arg(short, long)]
    text: Option<String>,

    /// File whose contents are transmitted
    #[arg(short, long)]
    file: Option<PathBuf>,
}

#[derive(Parser)]
struct RxArgs {
    #[command(flatten)]
    stack: StackArgs,

    /// Input audio file
    #[arg(short, long)]
    input: PathBuf,

    /// Write the decoded text to a file as well
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(Parser)]
struct SimulateArgs {
    #[command(flatten)]
    stack: StackArgs,

    /// Message text to push through the loop
    #[arg(short, long, default_value = "Hello, LinkLab!")]
    text: String,

    /// Noise standard deviation (defaults to the configured value)
    #[arg(long)]
    sigma: Option<f64>,

    /// Noise seed for a reproducible run
    #[arg(long)]
    seed: Option<u64>,

    /// Emit the report as JSON
    #[arg(long)]
    json: bool,
}

/// Machine-readable result of one simulated loop.
#[derive(Serialize)]
struct SimulationReport {
    message: String,
    modulation: String,
    hamming: bool,
    noise_sigma: f64,
    message_bits: usize,
    signal_samples: usize,
    decoded: String,
    error_detected: bool,
    corrected_blocks: usize,
    success: bool,
}

fn resolve_message(text: Option<String>, file: Option<PathBuf>) -> Result<String> {
    match (text, file) {
        (Some(text), _) => Ok(text),
        (None, Some(path)) => std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read input file: {:?}", path)),
        (None, None) => anyhow::bail!("Either --text or --file must be specified"),
    }
}

fn run_tx(args: TxArgs) -> Result<()> {
    let config = args.stack.link_config()?;
    let message = resolve_message(args.text, args.file)?;

    let transmitter = args.stack.transmitter(&config)?;
    let signal = transmitter.transmit(&message)?;
    wav::write_signal(&args.output, &signal, config.sample_rate)?;

    println!(
        "✓ Transmission complete: {} samples written to {:?}",
        signal.len(),
        args.output
    );
    Ok(())
}

fn run_rx(args: RxArgs) -> Result<()> {
    let config = args.stack.link_config()?;
    let signal = wav::read_signal(&args.input)?;

    let receiver = args.stack.receiver(&config)?;
    let reception = receiver.receive(&signal);

    println!("✓ Decoded: {}", reception.text);
    if reception.error_detected {
        println!("⚠ Error detected by the {:?} check", args.stack.detection);
    }
    if reception.corrected_blocks > 0 {
        println!("✓ Hamming repaired {} block(s)", reception.corrected_blocks);
    }

    if let Some(output) = args.output {
        std::fs::write(&output, &reception.text)?;
        println!("✓ Decoded text written to {:?}", output);
    }
    Ok(())
}

fn run_simulate(args: SimulateArgs) -> Result<()> {
    let config = args.stack.link_config()?;
    let sigma = args.sigma.unwrap_or(config.noise_sigma);

    let transmitter = args.stack.transmitter(&config)?;
    let receiver = args.stack.receiver(&config)?;
    let mut channel = match args.seed {
        Some(seed) => AwgnChannel::with_seed(config.noise_mean, sigma, seed)?,
        None => AwgnChannel::new(config.noise_mean, sigma)?,
    };

    let clean = transmitter.transmit(&args.text)?;
    let noisy = channel.transmit(&clean);
    let reception = receiver.receive(&noisy);

    let report = SimulationReport {
        message: args.text.clone(),
        modulation: format!("{:?}", args.stack.modulation),
        hamming: args.stack.hamming,
        noise_sigma: sigma,
        message_bits: args.text.len() * 8,
        signal_samples: clean.len(),
        decoded: reception.text.clone(),
        error_detected: reception.error_detected,
        corrected_blocks: reception.corrected_blocks,
        success: reception.text == args.text,
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("Message:   {}", report.message);
    println!("Stack:     {:?} / {:?} / {:?} / hamming={}",
        args.stack.modulation, args.stack.framing, args.stack.detection, args.stack.hamming);
    println!("Channel:   sigma={}", report.noise_sigma);
    println!("Signal:    {} samples for {} message bits",
        report.signal_samples, report.message_bits);
    println!("Decoded:   {}", report.decoded);
    if report.error_detected {
        println!("⚠ Error detected");
    }
    if report.corrected_blocks > 0 {
        println!("✓ {} block(s) repaired", report.corrected_blocks);
    }
    println!("{}", if report.success { "✓ Round trip succeeded" } else { "✗ Round trip FAILED" });
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.debug {
        tracing::Level::DEBUG
    } else if cli.verbose {
        tracing::Level::INFO
    } else {
        tracing::Level::WARN
    };

    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_target(false)
        .init();

    info!("LinkLab stack simulator starting");

    match cli.command {
        Commands::Tx(args) => run_tx(args),
        Commands::Rx(args) => run_rx(args),
        Commands::Simulate(args) => run_simulate(args),
    }
}
