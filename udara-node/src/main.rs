//! Udara - air-quality sensing node
//! Command-line runtime: provisioning, calibration and scheduled readings

use anyhow::Context;
use clap::{Parser, Subcommand};
use colored::*;
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use udara_core::prelude::*;
use udara_gas::CancelToken;
use udara_node::{shutdown, DeviceConfiguration, Node, NodeTransport, SimulatedClimateProbe, SimulatedGasArray, EEPROM_CAPACITY};
use udara_orchestration::CycleOutcome;

#[derive(Parser)]
#[command(name = "udara")]
#[command(author = "Udara Contributors")]
#[command(version = "2026.1.16")]
#[command(about = "Udara - air-quality sensing node", long_about = None)]
struct Cli {
    /// EEPROM image file
    #[arg(long, global = true, env = "UDARA_EEPROM_PATH", value_name = "PATH")]
    eeprom: Option<PathBuf>,

    /// Divider supply voltage (V)
    #[arg(long, global = true, env = "UDARA_SUPPLY_VOLTAGE")]
    supply_voltage: Option<f32>,

    /// Divider load resistance (kΩ)
    #[arg(long, global = true, env = "UDARA_LOAD_RESISTANCE")]
    load_resistance: Option<f32>,

    /// ADC full-scale code
    #[arg(long, global = true, env = "UDARA_ADC_MAX")]
    adc_max: Option<u16>,

    /// Latency budget of one transport send (ms)
    #[arg(long, global = true, env = "UDARA_TRANSPORT_TIMEOUT_MS")]
    transport_timeout_ms: Option<u64>,

    /// Center code of the simulated gas array
    #[arg(long, global = true, default_value_t = 2000)]
    sim_center: u16,

    /// Make the simulated climate probe fail every N reads
    #[arg(long, global = true, value_name = "N")]
    sim_climate_fail_every: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a configuration document and store it
    Provision {
        /// Configuration JSON file
        #[arg(value_name = "CONFIG")]
        config: PathBuf,
    },

    /// Calibrate the gas array in clean air and persist the baselines
    Calibrate {
        /// Number of samples
        #[arg(short, long, env = "UDARA_CALIBRATION_SAMPLES")]
        samples: Option<u32>,

        /// Interval between samples (ms)
        #[arg(short, long, env = "UDARA_CALIBRATION_INTERVAL_MS")]
        interval_ms: Option<u64>,
    },

    /// Run a single cycle and print the reading
    Read {
        /// Use this configuration instead of the stored one
        #[arg(short, long, value_name = "CONFIG")]
        config: Option<PathBuf>,
    },

    /// Run scheduled cycles and send readings to the configured transport
    ///
    /// Ctrl-C (or SIGTERM) stops after the current cycle and drains pending sends.
    Run {
        /// Stop after N cycles (default: until interrupted)
        #[arg(short = 'n', long)]
        cycles: Option<u64>,

        /// Use this configuration instead of the stored one
        #[arg(short, long, value_name = "CONFIG")]
        config: Option<PathBuf>,
    },

    /// Show calibration and configuration state
    Status,
}

type SimNode = Node<MmapEeprom, SimulatedGasArray, SimulatedClimateProbe>;

fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "udara_core=info,udara_gas=info,udara_environment=info,udara_orchestration=info,udara_node=info".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // Carrega .env antes do clap ler as variáveis
    let defaults = NodeSettings::from_env();
    let cli = Cli::parse();
    let settings = merge_settings(defaults, &cli);

    let result = match &cli.command {
        Commands::Provision { config } => provision_command(&cli, settings, config),
        Commands::Calibrate { samples, interval_ms } => {
            let mut settings = settings;
            if let Some(samples) = samples {
                settings.calibration_samples = *samples;
            }
            if let Some(interval_ms) = interval_ms {
                settings.calibration_interval_ms = *interval_ms;
            }
            calibrate_command(&cli, settings)
        }
        Commands::Read { config } => read_command(&cli, settings, config.as_deref()),
        Commands::Run { cycles, config } => run_command(&cli, settings, *cycles, config.as_deref()),
        Commands::Status => status_command(&cli, settings),
    };

    if let Err(e) = result {
        eprintln!("{} {:#}", "error:".red().bold(), e);
        std::process::exit(1);
    }
}

fn merge_settings(mut settings: NodeSettings, cli: &Cli) -> NodeSettings {
    if let Some(path) = &cli.eeprom {
        settings.eeprom_path = path.clone();
    }
    if let Some(v) = cli.supply_voltage {
        settings.supply_voltage = v;
    }
    if let Some(r) = cli.load_resistance {
        settings.load_resistance = r;
    }
    if let Some(max) = cli.adc_max {
        settings.adc_max = max;
    }
    if let Some(ms) = cli.transport_timeout_ms {
        settings.transport_timeout_ms = ms;
    }
    settings
}

fn boot(cli: &Cli, settings: NodeSettings) -> anyhow::Result<SimNode> {
    let path = settings.eeprom_path.clone();
    let eeprom = MmapEeprom::open(&path, EEPROM_CAPACITY)
        .with_context(|| format!("cannot open EEPROM image {}", path.display()))?;

    let gas = SimulatedGasArray::new(cli.sim_center, 300, settings.adc_max);
    let climate = SimulatedClimateProbe::new(cli.sim_climate_fail_every);

    Ok(Node::boot(settings, share(eeprom), gas, climate, Box::new(MonotonicClock::new()))?)
}

fn load_document(path: &Path) -> anyhow::Result<DeviceConfiguration> {
    let json = std::fs::read_to_string(path).with_context(|| format!("cannot read {}", path.display()))?;
    Ok(DeviceConfiguration::from_json(&json)?)
}

fn provision_command(cli: &Cli, settings: NodeSettings, config: &Path) -> anyhow::Result<()> {
    let document = load_document(config)?;
    let mut node = boot(cli, settings)?;

    let device_id = document.device_id().to_string();
    let protocol = document.transport().protocol();
    node.provision(document)?;

    println!(
        "{} Provisioned {} ({} every {} ms)",
        "✓".green().bold(),
        device_id.cyan(),
        protocol,
        node.configuration()?.interval_ms()
    );
    Ok(())
}

fn calibrate_command(cli: &Cli, settings: NodeSettings) -> anyhow::Result<()> {
    let mut node = boot(cli, settings)?;
    let total = node.settings().calibration_samples;

    println!("{} Calibrating in clean air ({} samples)...", "→".cyan(), total);

    let baselines = node.calibrate(
        |p| {
            eprintln!(
                "  {}/{}  accepted {}  Rs 135={:.3} 7={:.3} 9={:.3}",
                p.sample, p.total, p.accepted, p.mean_resistance.mq135, p.mean_resistance.mq7, p.mean_resistance.mq9
            );
        },
        &CancelToken::new(),
    )?;

    println!(
        "{} Baselines stored: ro_135={:.3} ro_7={:.3} ro_9={:.3}",
        "✓".green().bold(),
        baselines.mq135,
        baselines.mq7,
        baselines.mq9
    );
    Ok(())
}

fn read_command(cli: &Cli, settings: NodeSettings, config: Option<&Path>) -> anyhow::Result<()> {
    let mut node = boot(cli, settings)?;
    if let Some(path) = config {
        node.use_configuration(load_document(path)?);
    }

    match node.run_cycle()? {
        CycleOutcome::Emitted(reading) => println!("{}", reading.to_json()?),
        CycleOutcome::NoReading(reason) => {
            eprintln!("{} no reading: {}", "warning:".yellow().bold(), reason);
        }
    }
    Ok(())
}

fn run_command(cli: &Cli, settings: NodeSettings, cycles: Option<u64>, config: Option<&Path>) -> anyhow::Result<()> {
    let mut node = boot(cli, settings)?;
    if let Some(path) = config {
        node.use_configuration(load_document(path)?);
    }

    let transport = NodeTransport::from_config(node.configuration()?.transport(), node.settings().transport_timeout_ms);

    let stop = CancelToken::new();
    shutdown::cancel_on_signal(&stop).context("cannot install stop signal handler")?;
    let summary = node.run_scheduled(transport, cycles, &stop)?;

    eprintln!(
        "{} {} cycles, {} readings ({} skipped), sent {} / failed {} / dropped {}",
        "✓".green().bold(),
        summary.cycles,
        summary.pipeline.emitted,
        summary.pipeline.skipped,
        summary.dispatch.sent,
        summary.dispatch.failed,
        summary.dispatch.dropped
    );
    Ok(())
}

fn status_command(cli: &Cli, settings: NodeSettings) -> anyhow::Result<()> {
    let node = boot(cli, settings)?;
    println!("{}", serde_json::to_string_pretty(&node.status())?);
    Ok(())
}
