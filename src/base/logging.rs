use tracing_subscriber::EnvFilter;

/// Holds the targets that receive log output
const CRATE_TARGETS: &[&str] = &["tndmvis", "tndmvis_stations", "tndmvis_merge_vtk", "tndmvis_fancy"];

/// Initializes tracing according to the verbosity given on the command line
///
/// * 0 (none) -> warn
/// * 1 (-v)   -> info
/// * 2 (-vv)  -> debug
/// * 3+       -> trace
///
/// The `RUST_LOG` environment variable overrides the flag if set.
pub fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let default_filter: String = CRATE_TARGETS
        .iter()
        .map(|t| format!("{t}={level}"))
        .collect::<Vec<_>>()
        .join(",");
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
