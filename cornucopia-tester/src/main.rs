mod logic;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use colored::Colorize;
use std::fs::File;
use std::io::{BufWriter, Write, stdout};
use std::path::PathBuf;
use std::time::{Duration, Instant};

use cornucopia_game::{ArenaChoice, Catalog, GameSettings, RosterSet};
use logic::{LogicTester, Pacing, ScenarioResult, resolve_seed_inputs, split_csv};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RosterArg {
    /// The 24 named tributes
    Book,
    /// Two rolled tributes per district
    Generic,
}

impl From<RosterArg> for RosterSet {
    fn from(value: RosterArg) -> Self {
        match value {
            RosterArg::Book => Self::Book,
            RosterArg::Generic => Self::Generic,
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "cornucopia-tester", version = "0.1.0")]
#[command(about = "Seed sweeps and invariant audits for the Cornucopia arena simulator")]
struct Args {
    /// Arena to play in, or "random"
    #[arg(long)]
    arena: Option<String>,

    /// Starting roster
    #[arg(long, value_enum)]
    roster: Option<RosterArg>,

    /// Day limit before sudden death
    #[arg(long)]
    max_days: Option<u32>,

    /// Maximum bloodbath pairings on day one
    #[arg(long)]
    bloodbath_deaths: Option<usize>,

    /// JSON settings file; explicit flags override its fields
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Seeds to run (comma-separated; supports 0x hex and a..b ranges)
    #[arg(long, default_value = "1337")]
    seeds: String,

    /// Number of consecutive seeds to run from each listed seed
    #[arg(long, default_value_t = 1)]
    iterations: usize,

    /// List the available arenas and exit
    #[arg(long)]
    list_arenas: bool,

    /// Output report format
    #[arg(long, default_value = "console")]
    #[arg(value_parser = ["json", "markdown", "console"])]
    report: String,

    /// Optional path to write the report output instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,

    /// Whether days are narrated as they are published
    #[arg(long, value_enum, default_value_t = Pacing::Instant)]
    pacing: Pacing,

    /// Pause after each major event when streaming
    #[arg(long, default_value_t = 0)]
    event_speed_ms: u64,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Print the full game log after each run
    #[arg(long)]
    show_log: bool,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();
    let catalog = Catalog::load_from_static().context("failed to load bundled catalog")?;

    if maybe_list_arenas(&args, &catalog)? {
        return Ok(());
    }

    announce_banner();

    let start_time = Instant::now();
    let settings = build_settings(&args, &catalog)?;
    let seeds = resolve_seed_inputs(&split_csv(&args.seeds))?;
    log::info!(
        "running {} seed(s) x {} iteration(s)",
        seeds.len(),
        args.iterations
    );

    let tester = LogicTester::new(&catalog, args.verbose)
        .with_pacing(args.pacing, Duration::from_millis(args.event_speed_ms))
        .with_log(args.show_log);
    let results = tester.run_scenario(&settings, &seeds, args.iterations);

    write_reports(&args, &results, start_time)?;

    if results.iter().any(|r| !r.passed) {
        std::process::exit(1);
    }

    Ok(())
}

fn maybe_list_arenas(args: &Args, catalog: &Catalog) -> Result<bool> {
    if !args.list_arenas {
        return Ok(false);
    }
    let mut output_target = OutputTarget::new(args.output.clone())?;
    writeln!(output_target.writer(), "Available arenas:")?;
    for arena in &catalog.arenas {
        writeln!(output_target.writer(), "  {:25} - {}", arena.name, arena.description)?;
    }
    output_target.flush_inner()?;
    Ok(true)
}

fn announce_banner() {
    println!("{}", "🏹 Cornucopia Arena Tester".bright_cyan().bold());
    println!("{}", "==========================".cyan());
}

fn build_settings(args: &Args, catalog: &Catalog) -> Result<GameSettings> {
    let mut settings = match &args.settings {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            GameSettings::from_json(&json)
                .with_context(|| format!("failed to parse {}", path.display()))?
        }
        None => GameSettings::default(),
    };

    if let Some(arena) = &args.arena {
        settings.arena = if arena.eq_ignore_ascii_case("random") {
            ArenaChoice::Random
        } else {
            ArenaChoice::Named(arena.clone())
        };
    }
    if let Some(roster) = args.roster {
        settings.roster = roster.into();
    }
    if let Some(max_days) = args.max_days {
        settings.max_days = max_days;
    }
    if let Some(bloodbath_deaths) = args.bloodbath_deaths {
        settings.bloodbath_deaths = bloodbath_deaths;
    }

    settings.validate(catalog).context("invalid game settings")?;
    Ok(settings)
}

fn write_reports(args: &Args, results: &[ScenarioResult], start_time: Instant) -> Result<()> {
    let mut output_target = OutputTarget::new(args.output.clone())?;

    match args.report.as_str() {
        "json" => {
            if results.is_empty() {
                writeln!(&mut output_target, "[]")?;
            } else {
                logic::reports::generate_json_report(&mut output_target, results)?;
            }
        }
        "markdown" => {
            if results.is_empty() {
                writeln!(
                    &mut output_target,
                    "# Cornucopia Arena Audit Results\n\n_No scenarios executed._"
                )?;
            } else {
                logic::reports::generate_markdown_report(&mut output_target, results)?;
            }
        }
        _ => {
            if results.is_empty() {
                writeln!(&mut output_target, "No scenarios executed.")?;
            } else {
                logic::reports::generate_console_report(
                    &mut output_target,
                    results,
                    start_time.elapsed(),
                )?;
            }
        }
    }

    if args.report == "console" {
        let duration = start_time.elapsed();
        writeln!(&mut output_target)?;
        writeln!(&mut output_target, "🏁 Total time: {duration:?}")?;
    }
    output_target.flush_inner()?;
    Ok(())
}

enum OutputTarget {
    Stdout(BufWriter<std::io::Stdout>),
    File(BufWriter<File>),
}

impl OutputTarget {
    fn new(path: Option<PathBuf>) -> Result<Self> {
        if let Some(path) = path {
            let file = File::create(&path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            Ok(Self::File(BufWriter::new(file)))
        } else {
            Ok(Self::Stdout(BufWriter::new(stdout())))
        }
    }

    fn writer(&mut self) -> &mut dyn Write {
        match self {
            Self::Stdout(w) => w,
            Self::File(w) => w,
        }
    }

    fn flush_inner(&mut self) -> std::io::Result<()> {
        match self {
            Self::Stdout(w) => w.flush(),
            Self::File(w) => w.flush(),
        }
    }
}

impl Write for OutputTarget {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.writer().write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.flush_inner()
    }
}
