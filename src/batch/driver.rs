//! Column-stacked batch encoding

use std::io::Write;
use std::sync::atomic::{AtomicUsize, Ordering};
use rayon::prelude::*;
use ndarray::{Array2, ArrayView1, Axis};
use serde::{Serialize, Deserialize};

use super::{CancelFlag, NoProgress, ProgressReporter};
use crate::config::EncoderConfig;
use crate::encoding::{encode, format_into, EncodingKind};
use crate::tree::Tree;
use crate::utils::timing::Timer;
use crate::{CblvError, Result};

/// Encoded batch: one column per tree, `k * max_taxa` rows
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BatchTable {
    /// Encoding variant of every column
    pub kind: EncodingKind,
    /// Capacity shared by every column
    pub max_taxa: usize,
    /// Feature matrix [k * max_taxa, num_trees]
    pub matrix: Array2<f64>,
}

impl BatchTable {
    /// Number of feature rows
    pub fn rows(&self) -> usize {
        self.matrix.nrows()
    }

    /// Number of encoded trees
    pub fn columns(&self) -> usize {
        self.matrix.ncols()
    }

    /// Formatted vector of the `index`-th tree
    pub fn column(&self, index: usize) -> Option<ArrayView1<'_, f64>> {
        (index < self.columns()).then(|| self.matrix.column(index))
    }

    /// Write the matrix as CSV, one line per feature row
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<()> {
        crate::utils::write_csv(&self.matrix, writer)
    }
}

/// Encodes tree collections in parallel
///
/// Every tree is encoded by an independent rayon task that writes straight
/// into its own pre-allocated matrix column. The first failure aborts the
/// batch and is reported with the failing tree's input position.
pub struct BatchEncoder {
    config: EncoderConfig,
    progress: Box<dyn ProgressReporter>,
    cancel: CancelFlag,
}

impl BatchEncoder {
    /// Create an encoder without progress reporting
    pub fn new(config: EncoderConfig) -> Self {
        BatchEncoder {
            config,
            progress: Box::new(NoProgress),
            cancel: CancelFlag::default(),
        }
    }

    /// Report progress to `progress`
    pub fn with_progress(mut self, progress: impl ProgressReporter + 'static) -> Self {
        self.progress = Box::new(progress);
        self
    }

    /// Stop dispatching trees once `cancel` is set
    pub fn with_cancel(mut self, cancel: CancelFlag) -> Self {
        self.cancel = cancel;
        self
    }

    /// Get the configuration
    pub fn config(&self) -> &EncoderConfig {
        &self.config
    }

    /// Encode `trees` into a [`BatchTable`], columns in input order
    pub fn encode(&self, trees: &[Tree]) -> Result<BatchTable> {
        self.config.validate()?;

        let kind = self.config.kind;
        let max_taxa = self.config.resolve_max_taxa(trees);
        let rows = self.config.vector_len(max_taxa);
        let total = trees.len();

        log::info!(
            "encoding {} trees ({:?}, max_taxa = {}, {} rows)",
            total,
            kind,
            max_taxa,
            rows
        );
        let _timer = Timer::new("batch encoding");
        self.progress.on_start(total);

        let done = AtomicUsize::new(0);
        let mut matrix = Array2::zeros((rows, total));
        matrix
            .axis_iter_mut(Axis(1))
            .into_par_iter()
            .zip(trees.par_iter())
            .enumerate()
            .try_for_each(|(index, (column, tree))| -> Result<()> {
                if self.cancel.is_cancelled() {
                    return Err(CblvError::Cancelled);
                }
                encode(tree, kind)
                    .and_then(|encoding| format_into(&encoding, max_taxa, column))
                    .map_err(|err| err.for_tree(index))?;

                let count = done.fetch_add(1, Ordering::Relaxed) + 1;
                self.progress.on_tree(count, total);
                Ok(())
            })?;

        self.progress.on_finish(total);
        log::info!("encoded {} trees", total);

        Ok(BatchTable {
            kind,
            max_taxa,
            matrix,
        })
    }
}
