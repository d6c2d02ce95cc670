/// Defines the maximum distance a station may be moved to lie inside a mesh's bounding box
pub const CLAMP_EPSILON: f64 = 1e-4;

/// Defines the number of seconds in a (365-day) year
pub const SECONDS_PER_YEAR: f64 = 365.0 * 24.0 * 3600.0;

/// Defines an auxiliary directory where the test result files are saved
pub const DEFAULT_TEST_DIR: &str = "/tmp/tndmvis/test";
