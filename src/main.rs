//! # N.E.T.R.A. Command Center - CLI Entry Point
//!
//! Commands:
//! - `analyze`     - Live analysis of one location
//! - `batch`       - Random-sensor batch analysis of every location
//! - `locations`   - List the location registry
//! - `map`         - Print map markers
//! - `serve`       - Run the dashboard API
//! - `init-config` - Generate a default configuration file

use clap::{Args, Parser, Subcommand};
use log::{error, info, warn};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use netra_command::analysis::{AnalysisReport, Session};
use netra_command::analysis::batch::BatchReport;
use netra_command::dashboard::DashboardServer;
use netra_command::report::{build_report, export, ReportKind};
use netra_command::sensors::ManualSensors;
use netra_command::{NetraConfig, NetraError, NetraResult, SensorKind};

/// N.E.T.R.A. - Next-Gen Eye for Threat Recognition & Analysis.
///
/// Scores simulated rover and drone sensor readings for ten locations
/// across North-East India.
#[derive(Parser, Debug)]
#[command(name = "netra-command")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to configuration file.
    #[arg(short, long, default_value = "netra-command.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Analyze one location with manual sensor values (unset sensors read 50).
    Analyze(AnalyzeArgs),

    /// Analyze every location with random sensor values.
    Batch {
        /// RNG seed for a reproducible run (overrides config).
        #[arg(long)]
        seed: Option<u64>,

        /// Also write the rows to this CSV file.
        #[arg(long)]
        csv: Option<PathBuf>,

        /// Print JSON instead of a table.
        #[arg(long)]
        json: bool,
    },

    /// List the location registry.
    Locations,

    /// Print map markers for every location.
    Map {
        /// RNG seed for simulated marker values.
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Run the dashboard API until interrupted.
    Serve,

    /// Generate a default configuration file.
    InitConfig,
}

#[derive(Args, Debug)]
struct AnalyzeArgs {
    /// Location key (see `locations`).
    #[arg(short, long)]
    location: String,

    /// Sensors as a list, e.g. `fume=80,metal=75`.
    #[arg(short, long)]
    sensors: Option<String>,

    #[arg(long)]
    fume: Option<f64>,
    #[arg(long)]
    metal: Option<f64>,
    #[arg(long)]
    gpr: Option<f64>,
    #[arg(long)]
    ground_cv: Option<f64>,
    #[arg(long)]
    drone_cv: Option<f64>,
    #[arg(long)]
    disturbance: Option<f64>,
    #[arg(long)]
    thermal: Option<f64>,

    /// Print JSON instead of text.
    #[arg(long)]
    json: bool,
}

impl AnalyzeArgs {
    /// Slider defaults, then the list, then individual flags.
    fn manual_sensors(&self) -> NetraResult<ManualSensors> {
        let mut manual = ManualSensors::default();
        if let Some(ref spec) = self.sensors {
            manual.apply_spec(spec)?;
        }
        let flags = [
            (SensorKind::Fume, self.fume),
            (SensorKind::Metal, self.metal),
            (SensorKind::Gpr, self.gpr),
            (SensorKind::GroundCv, self.ground_cv),
            (SensorKind::DroneCv, self.drone_cv),
            (SensorKind::Disturbance, self.disturbance),
            (SensorKind::Thermal, self.thermal),
        ];
        for (kind, value) in flags {
            if let Some(v) = value {
                manual.set(kind, v);
            }
        }
        Ok(manual)
    }
}

#[tokio::main]
async fn main() -> NetraResult<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Analyze(ref args) => cmd_analyze(&cli.config, args),
        Commands::Batch { seed, ref csv, json } => cmd_batch(&cli.config, seed, csv.as_deref(), json),
        Commands::Locations => cmd_locations(&cli.config),
        Commands::Map { seed } => cmd_map(&cli.config, seed),
        Commands::Serve => cmd_serve(&cli.config).await,
        Commands::InitConfig => cmd_init_config(&cli.config),
    }
}

/// Load the config file if present, defaults otherwise.
fn load_config(config_path: &Path) -> NetraResult<NetraConfig> {
    if config_path.exists() {
        info!("Loading configuration from: {}", config_path.display());
        NetraConfig::from_file(config_path)
    } else {
        info!("No config file found, using defaults. Run 'init-config' to generate one.");
        Ok(NetraConfig::default())
    }
}

fn cmd_analyze(config_path: &Path, args: &AnalyzeArgs) -> NetraResult<()> {
    let config = load_config(config_path)?;
    let reading = args.manual_sensors()?.reading();

    let mut session = Session::new(&config);
    let report = session.analyze(&args.location, &reading)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_analysis(&report);
    }
    Ok(())
}

fn print_analysis(report: &AnalysisReport) {
    println!("Analysis Results");
    println!("  Probability: {:.1}%", report.score.probability);
    println!("  Level:       {} {}", report.score.level.icon(), report.score.level);
    println!();
    println!("  Location:    {}", report.location.name);
    println!("  State:       {}", report.location.state);
    println!("  Coordinates: {}", report.location.coordinates());
    println!();
    println!("Sensor Readings");
    for c in &report.breakdown.contributions {
        println!(
            "  {:<17} {:>6.1}  x {:.2} = {:>6.2}",
            c.sensor.label(),
            c.value,
            c.weight,
            c.weighted
        );
    }
    println!("  {:<17} {:>27.2}", "Base", report.breakdown.base);
    for b in &report.breakdown.bonuses {
        println!("  + {:>5.1}  {}", b.points, b.description);
    }
}

fn cmd_batch(
    config_path: &Path,
    seed: Option<u64>,
    csv_path: Option<&Path>,
    json: bool,
) -> NetraResult<()> {
    let mut config = load_config(config_path)?;
    if seed.is_some() {
        config.batch.seed = seed;
    }

    let mut session = Session::new(&config);
    let report = session.run_batch(|done, total| {
        info!("[BATCH] {}/{} locations analyzed", done, total);
    })?;

    if let Some(path) = csv_path {
        let mut buf = Vec::new();
        export::write_batch_csv(&mut buf, &report)?;
        export::write_file(path, &buf)?;
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_batch(&report);
    }
    Ok(())
}

fn print_batch(report: &BatchReport) {
    println!("{:<40} {:<18} {:>11}  Level", "Location", "State", "Probability");
    for row in &report.rows {
        println!(
            "{:<40} {:<18} {:>10.2}%  {} {}",
            row.location,
            row.state,
            row.probability,
            row.level.icon(),
            row.level
        );
    }
    println!();
    println!("Average threat by state");
    for avg in report.state_averages() {
        println!("  {:<18} {:>6.2}% ({} locations)", avg.state, avg.mean_probability, avg.locations);
    }
    println!();
    println!("Level counts");
    for c in report.level_counts() {
        println!("  {:<9} {}", c.level.as_str(), c.count);
    }
}

fn cmd_locations(config_path: &Path) -> NetraResult<()> {
    let config = load_config(config_path)?;
    let session = Session::new(&config);
    for loc in session.registry().iter() {
        println!("{:<18} {:<40} {:<18} {}", loc.key, loc.name, loc.state, loc.coordinates());
    }
    Ok(())
}

fn cmd_map(config_path: &Path, seed: Option<u64>) -> NetraResult<()> {
    let mut config = load_config(config_path)?;
    if seed.is_some() {
        config.batch.seed = seed;
    }
    let mut session = Session::new(&config);
    for marker in session.map_markers() {
        println!(
            "{:<18} {:>8.4} {:>8.4}  {:>5.1}%  {:?}",
            marker.key, marker.lat, marker.lon, marker.threat, marker.color
        );
    }
    Ok(())
}

/// Serve the dashboard API until Ctrl-C, then export the session.
async fn cmd_serve(config_path: &Path) -> NetraResult<()> {
    let config = load_config(config_path)?;
    std::fs::create_dir_all(&config.general.data_dir)?;

    let shutdown = Arc::new(AtomicBool::new(false));
    let shutdown_clone = shutdown.clone();
    if let Err(e) = ctrlc::set_handler(move || {
        shutdown_clone.store(true, Ordering::SeqCst);
    }) {
        warn!("Could not install signal handler: {}. Use kill to stop.", e);
    }

    let server = DashboardServer::new(&config.dashboard, Session::new(&config));
    let session = server.session();
    info!("{} online at http://{}", config.general.station_name, server.bind_address());

    let run_flag = shutdown.clone();
    tokio::task::spawn_blocking(move || server.run(run_flag))
        .await
        .map_err(|e| NetraError::Dashboard(format!("Dashboard task failed: {}", e)))??;

    let session = session
        .lock()
        .map_err(|_| NetraError::Dashboard("session lock poisoned".to_string()))?;
    if let Err(e) = export_session(&config, &session) {
        error!("Failed to export session: {}", e);
    }
    Ok(())
}

/// Write the history CSV and a threat assessment covering the session.
fn export_session(config: &NetraConfig, session: &Session) -> NetraResult<()> {
    let history = session.history();
    let (first, last) = match (history.entries().first(), history.latest()) {
        (Some(first), Some(last)) => (first.date(), last.date()),
        _ => {
            info!("No analyses this session, nothing to export.");
            return Ok(());
        }
    };

    let stamp = chrono::Utc::now().format("%Y%m%d_%H%M%S");
    let dir = &config.reports.output_dir;

    let mut csv = Vec::new();
    export::write_history_csv(&mut csv, history)?;
    export::write_file(&dir.join(format!("netra_history_{}.csv", stamp)), &csv)?;

    let report = build_report(ReportKind::ThreatAssessment, history, first, last)?;
    let text = report.render_text(&config.general.station_name);
    export::write_file(&dir.join(format!("netra_report_{}.txt", stamp)), text.as_bytes())?;

    info!(
        "Session closed: {} analyses, {} alerts delivered",
        history.len(),
        session.alerts().map(|a| a.delivered_count()).unwrap_or(0),
    );
    Ok(())
}

fn cmd_init_config(config_path: &Path) -> NetraResult<()> {
    if config_path.exists() {
        return Err(NetraError::Config(format!(
            "Configuration file already exists: {}. Remove it first or use a different path.",
            config_path.display()
        )));
    }

    NetraConfig::write_default(config_path)?;
    println!("Default configuration written to: {}", config_path.display());
    println!();
    println!("Key settings:");
    println!("  [scoring]   - input_policy = \"reject\" or \"clamp\" for values outside 0-100");
    println!("  [batch]     - random sensor range (default 10..95) and optional seed");
    println!("  [alerts]    - min_level, webhook_url, alert_email");
    println!("  [dashboard] - API runs on http://127.0.0.1:8501 by default");

    Ok(())
}
