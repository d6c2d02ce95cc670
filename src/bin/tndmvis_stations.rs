use std::path::Path;
use structopt::StructOpt;
use tndmvis::base::init_logging;
use tndmvis::post::{write_tecplot, GridLoader, StationResampler, StationSet, VariableConfig};
use tndmvis::vtk::TimeSeriesIndex;
use tndmvis::TndmError;
use tracing::info;

/// Command line options
#[derive(StructOpt, Debug)]
#[structopt(
    name = "tndmvis_stations",
    about = "Samples the fault output at stations and writes one Tecplot table per station"
)]
struct Options {
    /// Output prefix (may contain directories)
    #[structopt(short = "o", long, default_value = "fltst")]
    prefix: String,

    /// JSON file with the variables to extract (fault variables by default)
    #[structopt(short = "c", long, validator = file_exists)]
    config: Option<String>,

    /// Probe tolerance
    #[structopt(short = "t", long)]
    tolerance: Option<f64>,

    /// Hides the progress bar
    #[structopt(short = "q", long)]
    quiet: bool,

    /// Verbosity (-v, -vv, -vvv)
    #[structopt(short = "v", long, parse(from_occurrences))]
    verbose: u8,

    /// CSV file with the stations (columns x, y, z and optionally name)
    #[structopt(validator = file_exists)]
    stations: String,

    /// PVD file listing the time steps
    #[structopt(validator = file_exists)]
    pvd: String,
}

fn file_exists(path: String) -> Result<(), String> {
    if Path::new(&path).is_file() {
        Ok(())
    } else {
        Err(format!("file '{}' does not exist", path))
    }
}

fn run(options: &Options) -> Result<usize, TndmError> {
    let stations = StationSet::read_csv(&options.stations)?;
    let index = TimeSeriesIndex::read(&options.pvd)?;
    let config = match &options.config {
        Some(path) => VariableConfig::read_json(path)?,
        None => VariableConfig::default(),
    };
    info!(nstation = stations.len(), nstep = index.len(), "inputs loaded");

    let mut resampler = StationResampler::new(GridLoader, config.to_map());
    if let Some(tolerance) = options.tolerance {
        resampler.set_tolerance(tolerance)?;
    }
    resampler.set_progress(!options.quiet);
    info!("variables:\n{}", resampler.variables());
    let data = resampler.resample(&index, &stations.positions())?;

    let names = stations.names();
    let paths = write_tecplot(&options.prefix, &data, names.as_deref())?;
    Ok(paths.len())
}

fn main() {
    // parse options
    let options = Options::from_args();
    init_logging(options.verbose);

    // run
    let count = match run(&options) {
        Ok(n) => n,
        Err(e) => {
            eprintln!("ERROR: {}", e);
            std::process::exit(1);
        }
    };

    // message
    let message = format!("{} station files written with prefix {}", count, options.prefix);
    let thin_line = format!("{:─^1$}", "", message.chars().count());
    println!("\n{}", thin_line);
    println!("{}", message);
    println!("{}\n", thin_line);
}
