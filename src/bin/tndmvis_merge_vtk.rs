use std::path::Path;
use structopt::StructOpt;
use tndmvis::base::init_logging;
use tndmvis::post::merge_pvd;

/// Command line options
#[derive(StructOpt, Debug)]
#[structopt(
    name = "tndmvis_merge_vtk",
    about = "Merges the pieces of a parallel (PVTU) time series into serial VTU files"
)]
struct Options {
    /// Hides the progress bar
    #[structopt(short = "q", long)]
    quiet: bool,

    /// Verbosity (-v, -vv, -vvv)
    #[structopt(short = "v", long, parse(from_occurrences))]
    verbose: u8,

    /// PVD file listing the PVTU files
    #[structopt(validator = file_exists)]
    pvd: String,

    /// Output directory
    out_dir: String,
}

fn file_exists(path: String) -> Result<(), String> {
    if Path::new(&path).is_file() {
        Ok(())
    } else {
        Err(format!("file '{}' does not exist", path))
    }
}

fn main() {
    // parse options
    let options = Options::from_args();
    init_logging(options.verbose);

    // merge
    let written = match merge_pvd(&options.pvd, &options.out_dir, !options.quiet) {
        Ok(w) => w,
        Err(e) => {
            eprintln!("ERROR: {}", e);
            std::process::exit(1);
        }
    };

    // message
    let path_pvd = written[0].display().to_string();
    let thin_line = format!("{:─^1$}", "", path_pvd.chars().count());
    println!("\n{}", thin_line);
    println!("{} VTU files generated; the PVD file is:", written.len() - 1);
    println!("{}", path_pvd);
    println!("{}\n", thin_line);
}
