//! Implements the base structures shared by the post-processing tools

mod bounding_box;
mod constants;
mod logging;
mod progress;
pub use crate::base::bounding_box::*;
pub use crate::base::constants::*;
pub use crate::base::logging::*;
pub use crate::base::progress::*;
