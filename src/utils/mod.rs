//! Utility functions for CBLV

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;
use ndarray::Array2;
use rand::Rng;
use serde::{Serialize, Deserialize};
use crate::tree::{Tree, TreeBuilder};
use crate::Result;

pub use progress::LogProgress;

/// Save object to JSON file
pub fn save_json<T: Serialize, P: AsRef<Path>>(obj: &T, path: P) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, obj)?;
    writer.flush()?;
    Ok(())
}

/// Load object from JSON file
pub fn load_json<T: for<'de> Deserialize<'de>, P: AsRef<Path>>(path: P) -> Result<T> {
    let reader = BufReader::new(File::open(path)?);
    Ok(serde_json::from_reader(reader)?)
}

/// Write a matrix as comma-separated values, one line per row
pub fn write_csv<W: Write>(matrix: &Array2<f64>, writer: W) -> Result<()> {
    let mut writer = BufWriter::new(writer);
    for row in matrix.rows() {
        let mut first = true;
        for value in row.iter() {
            if !first {
                writer.write_all(b",")?;
            }
            write!(writer, "{}", value)?;
            first = false;
        }
        writer.write_all(b"\n")?;
    }
    writer.flush()?;
    Ok(())
}

/// Generate a random binary tree with `num_tips` tips
///
/// Lineages are joined pairwise at random; every branch gets a length in
/// `[0.01, 1.0)`. With `num_states` set, every tip draws a uniform state.
pub fn random_tree<R: Rng>(num_tips: usize, num_states: Option<u32>, rng: &mut R) -> Result<Tree> {
    let mut builder = TreeBuilder::new(num_tips);
    let mut lineages: Vec<usize> = (1..=num_tips).collect();

    // The last join creates the root T + 1, so count internal ids downwards
    let mut next_internal = 2 * num_tips.max(1) - 1;
    while lineages.len() > 1 {
        let first = lineages.swap_remove(rng.gen_range(0..lineages.len()));
        let second = lineages.swap_remove(rng.gen_range(0..lineages.len()));
        builder.add_child(next_internal, first, rng.gen_range(0.01..1.0))
            .add_child(next_internal, second, rng.gen_range(0.01..1.0));
        lineages.push(next_internal);
        next_internal -= 1;
    }

    if let Some(num_states) = num_states {
        for tip in 1..=num_tips {
            builder.set_state(tip, rng.gen_range(0..num_states.max(1)));
        }
    }

    builder.build()
}

/// Timing utilities
pub mod timing {
    use std::time::Instant;

    /// Logs the elapsed time of a scope when dropped
    pub struct Timer {
        start: Instant,
        name: String,
    }

    impl Timer {
        /// Start new timer
        pub fn new(name: &str) -> Self {
            Timer {
                start: Instant::now(),
                name: name.to_string(),
            }
        }

        /// Get elapsed time in seconds
        pub fn elapsed(&self) -> f32 {
            self.start.elapsed().as_secs_f32()
        }
    }

    impl Drop for Timer {
        fn drop(&mut self) {
            log::debug!("{}: {:.3}s", self.name, self.elapsed());
        }
    }
}

/// Progress tracking
pub mod progress {
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::time::{Duration, Instant};
    use crate::batch::ProgressReporter;

    /// Logs batch progress at info level every `every` trees
    ///
    /// The rate is measured from the latest `on_start`, not from construction.
    pub struct LogProgress {
        every: usize,
        origin: Instant,
        // Nanoseconds from `origin` to the latest batch start
        started: AtomicU64,
    }

    impl LogProgress {
        /// Create a reporter logging every `every` completed trees
        pub fn new(every: usize) -> Self {
            LogProgress {
                every: every.max(1),
                origin: Instant::now(),
                started: AtomicU64::new(0),
            }
        }

        /// Time since the current batch started
        pub fn elapsed(&self) -> Duration {
            let started = Duration::from_nanos(self.started.load(Ordering::Relaxed));
            self.origin.elapsed().saturating_sub(started)
        }
    }

    impl Default for LogProgress {
        fn default() -> Self {
            Self::new(1000)
        }
    }

    impl ProgressReporter for LogProgress {
        fn on_start(&self, total: usize) {
            let nanos = u64::try_from(self.origin.elapsed().as_nanos()).unwrap_or(u64::MAX);
            self.started.store(nanos, Ordering::Relaxed);
            log::info!("progress: 0/{} trees", total);
        }

        fn on_tree(&self, done: usize, total: usize) {
            if done % self.every == 0 || done == total {
                let elapsed = self.elapsed().as_secs_f32();
                log::info!(
                    "progress: {:>10}/{} {:6.2}%   {:8.0} trees/s",
                    done,
                    total,
                    done as f32 / total.max(1) as f32 * 100.0,
                    done as f32 / elapsed.max(f32::EPSILON),
                );
            }
        }

        fn on_finish(&self, total: usize) {
            log::info!(
                "progress: done, {} trees in {:.3}s",
                total,
                self.elapsed().as_secs_f32()
            );
        }
    }
}
