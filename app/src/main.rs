use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use chrono::Local;
use clap::Parser;
use env_logger::Builder;
use glob::glob;
use log::LevelFilter;

use pcd_interpolator::{
    config::{class, parse_max_distance},
    Attribute, ClassFilter, ConfigError, FileScheduler, Host, ReturnPolicy, RunConfig,
};
use pcd_parser::parsers::las::LasParserProvider;

#[derive(Parser, Debug)]
#[command(
    name = "LiDAR IDW",
    about = "Interpolates LiDAR point clouds into rasters by inverse distance weighting",
    author = "MIERUNE Inc.",
    version = "0.0.1"
)]
struct Cli {
    /// Input LAS/LAZ files. Accepts globs and semicolon separated lists.
    #[arg(short, long, required = true, num_args = 1.., value_name = "FILE")]
    input: Vec<String>,

    /// Appended to each input file stem, separated by a space.
    #[arg(long, default_value = "IDW")]
    suffix: String,

    #[arg(long, default_value = "elevation")]
    attribute: String,

    /// Which returns to use: all, first or last.
    #[arg(long, default_value = "all")]
    returns: String,

    /// IDW distance exponent.
    #[arg(long, default_value_t = 2.0)]
    weight: f64,

    #[arg(long = "max-dist", default_value = "not specified")]
    max_dist: String,

    #[arg(short = 'k', long, default_value_t = 8)]
    neighbours: usize,

    #[arg(long, default_value_t = 1.0)]
    resolution: f64,

    /// Worker threads, one per CPU when omitted.
    #[arg(long)]
    threads: Option<usize>,

    #[arg(long)]
    exclude_never_classified: bool,
    #[arg(long)]
    exclude_unclassified: bool,
    #[arg(long)]
    exclude_ground: bool,
    #[arg(long)]
    exclude_low_veg: bool,
    #[arg(long)]
    exclude_med_veg: bool,
    #[arg(long)]
    exclude_high_veg: bool,
    #[arg(long)]
    exclude_building: bool,
    #[arg(long)]
    exclude_low_point: bool,
    #[arg(long)]
    exclude_model_key: bool,
    #[arg(long)]
    exclude_water: bool,
}

impl Cli {
    fn excluded_classes(&self) -> ClassFilter {
        ClassFilter::default()
            .exclude_if(class::NEVER_CLASSIFIED, self.exclude_never_classified)
            .exclude_if(class::UNCLASSIFIED, self.exclude_unclassified)
            .exclude_if(class::GROUND, self.exclude_ground)
            .exclude_if(class::LOW_VEGETATION, self.exclude_low_veg)
            .exclude_if(class::MEDIUM_VEGETATION, self.exclude_med_veg)
            .exclude_if(class::HIGH_VEGETATION, self.exclude_high_veg)
            .exclude_if(class::BUILDING, self.exclude_building)
            .exclude_if(class::LOW_POINT, self.exclude_low_point)
            .exclude_if(class::MODEL_KEY_POINT, self.exclude_model_key)
            .exclude_if(class::WATER, self.exclude_water)
    }

    fn run_config(&self) -> Result<RunConfig, ConfigError> {
        RunConfig::builder()
            .suffix(self.suffix.as_str())
            .attribute(self.attribute.parse::<Attribute>()?)
            .return_policy(self.returns.parse::<ReturnPolicy>()?)
            .weight(self.weight)
            .max_distance(parse_max_distance(&self.max_dist)?)
            .neighbours(self.neighbours)
            .resolution(self.resolution)
            .excluded_classes(self.excluded_classes())
            .build()
    }
}

/// Forwards host notifications to the log.
struct ConsoleHost;

impl Host for ConsoleHost {
    fn report_feedback(&self, message: &str) {
        log::warn!("{}", message);
    }

    fn report_progress(&self, label: &str, percent: u8) {
        log::info!("{}: {}%", label, percent);
    }

    fn report_result(&self, path: &Path) {
        log::info!("output: {:?}", path);
    }

    fn signal_complete(&self) {
        log::info!("complete");
    }
}

fn expand_globs(input_patterns: &[String]) -> Result<Vec<PathBuf>, glob::PatternError> {
    let mut paths = Vec::new();
    for pattern in input_patterns
        .iter()
        .flat_map(|arg| arg.split(';'))
        .map(str::trim)
        .filter(|p| !p.is_empty())
    {
        if pattern.contains('*') || pattern.contains('?') || pattern.contains('[') {
            for entry in glob(pattern)? {
                match entry {
                    Ok(path) => paths.push(path),
                    Err(e) => log::warn!("skipping unreadable path: {:?}", e),
                }
            }
        } else {
            paths.push(PathBuf::from(pattern));
        }
    }
    Ok(paths)
}

fn main() -> ExitCode {
    Builder::new()
        .format(|buf, record| {
            writeln!(
                buf,
                "{} [{}] - {}",
                Local::now().format("%Y-%m-%d %H:%M:%S"),
                record.level(),
                record.args()
            )
        })
        .filter(None, LevelFilter::Info)
        .init();

    let args = Cli::parse();
    let host = ConsoleHost;

    let config = match args.run_config() {
        Ok(config) => config,
        Err(e) => {
            log::error!("invalid configuration: {}", e);
            host.report_feedback(&e.to_string());
            host.signal_complete();
            return ExitCode::FAILURE;
        }
    };
    match serde_json::to_string(&config) {
        Ok(json) => log::info!("config: {}", json),
        Err(e) => log::warn!("could not serialize config: {}", e),
    }

    let input_files = match expand_globs(&args.input) {
        Ok(files) => files,
        Err(e) => {
            log::error!("invalid input pattern: {}", e);
            host.report_feedback(&e.to_string());
            host.signal_complete();
            return ExitCode::FAILURE;
        }
    };
    log::info!("expanded input files: {:?}", input_files);

    let start = std::time::Instant::now();
    let mut scheduler = FileScheduler::new(LasParserProvider, config);
    if let Some(threads) = args.threads {
        scheduler = scheduler.with_threads(threads);
    }

    match scheduler.run(&input_files, &host) {
        Ok(summary) => {
            log::info!("elapsed: {:?}", start.elapsed());
            if summary.failed > 0 {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            }
        }
        Err(_) => ExitCode::FAILURE,
    }
}
