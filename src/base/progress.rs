use std::io::{self, Write};

/// Defines the number of characters of the progress bar
const BAR_LENGTH: usize = 60;

/// Prints a progress bar to stderr while looping over time steps
///
/// A new line is printed when the instance is dropped.
pub struct Progress {
    /// Holds the total number of steps
    total: usize,

    /// Enables printing
    enabled: bool,
}

impl Progress {
    /// Allocates a new instance
    pub fn new(total: usize, enabled: bool) -> Self {
        Progress { total, enabled }
    }

    /// Reports that the zero-based `step` has been completed
    pub fn update(&self, step: usize) {
        if self.enabled && self.total > 0 {
            let mut stderr = io::stderr();
            let _ = write!(stderr, "{}\r", progress_bar(step + 1, self.total));
            let _ = stderr.flush();
        }
    }
}

impl Drop for Progress {
    fn drop(&mut self) {
        if self.enabled && self.total > 0 {
            let _ = writeln!(io::stderr());
        }
    }
}

/// Returns the bar for `count` completed steps out of `total`, e.g., `[===---] 50.0%`
fn progress_bar(count: usize, total: usize) -> String {
    let ratio = count as f64 / total as f64;
    let filled = usize::min((BAR_LENGTH as f64 * ratio).round() as usize, BAR_LENGTH);
    let percents = (1000.0 * ratio).round() / 10.0;
    format!("[{}{}] {:?}%", "=".repeat(filled), "-".repeat(BAR_LENGTH - filled), percents)
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
