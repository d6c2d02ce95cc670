use std::path::Path;
use structopt::StructOpt;
use tndmvis::base::init_logging;
use tndmvis::post::{stack_steps, Colormap, FancyPlot, GridLoader};
use tndmvis::vtk::{write_vtu, TimeSeriesIndex, UnstructuredGrid};
use tndmvis::TndmError;
use tracing::info;

/// Command line options
#[derive(StructOpt, Debug)]
#[structopt(
    name = "tndmvis_fancy",
    about = "Stacks the fault output along a time axis and draws slip versus depth and time"
)]
struct Options {
    /// Output prefix; writes {prefix}.vtu and {prefix}.svg
    #[structopt(short = "o", long, default_value = "fancy")]
    prefix: String,

    /// Colormap file with one "r g b" row per color (values in [0, 1])
    #[structopt(short = "c", long, validator = file_exists)]
    colormap: Option<String>,

    /// Name of the slip field
    #[structopt(short = "s", long, default_value = "state1")]
    slip: String,

    /// Name of the slip rate field
    #[structopt(short = "r", long, alias = "slip_rate", default_value = "state3")]
    slip_rate: String,

    /// Writes the stacked mesh only
    #[structopt(long)]
    no_figure: bool,

    /// Hides the progress bar
    #[structopt(short = "q", long)]
    quiet: bool,

    /// Verbosity (-v, -vv, -vvv)
    #[structopt(short = "v", long, parse(from_occurrences))]
    verbose: u8,

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

fn run(options: &Options) -> Result<Vec<String>, TndmError> {
    let index = TimeSeriesIndex::read(&options.pvd)?;
    let steps = stack_steps(&mut GridLoader, &index, 2, !options.quiet)?;
    let mut written = Vec::new();

    // stacked mesh
    let grids: Vec<_> = steps.iter().map(|s| s.grid.clone()).collect();
    let path_vtu = format!("{}.vtu", options.prefix);
    write_vtu(&UnstructuredGrid::append_all(&grids), &path_vtu)?;
    info!(file = %path_vtu, "stacked mesh written");
    written.push(path_vtu);

    // figure
    if !options.no_figure {
        let mut fancy = FancyPlot::new(&options.slip, &options.slip_rate);
        if let Some(path) = &options.colormap {
            fancy.set_colormap(Colormap::read_txt(path)?);
        }
        let path_svg = format!("{}.svg", options.prefix);
        fancy.save(&steps, &path_svg)?;
        info!(file = %path_svg, "figure written");
        written.push(path_svg);
    }
    Ok(written)
}

fn main() {
    // parse options
    let options = Options::from_args();
    init_logging(options.verbose);

    // run
    let written = match run(&options) {
        Ok(w) => w,
        Err(e) => {
            eprintln!("ERROR: {}", e);
            std::process::exit(1);
        }
    };

    // message
    let width = written.iter().map(|w| w.chars().count()).max().unwrap_or(0);
    let thin_line = format!("{:─^1$}", "", width);
    println!("\n{}", thin_line);
    for path in &written {
        println!("{}", path);
    }
    println!("{}\n", thin_line);
}
