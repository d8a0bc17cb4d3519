//! Parallel batch encoding of tree collections

mod driver;
mod progress;

pub use driver::{BatchEncoder, BatchTable};
pub use progress::{CancelFlag, NoProgress, ProgressReporter};
