//! # CBLV: Compact Bijective Ladderized Vectors
//!
//! Encodes rooted, binary, edge-weighted phylogenetic trees into fixed-length
//! numeric vectors for downstream statistical learners.
//!
//! ## Pipeline
//!
//! - **Ladder ordering**: the deeper child of every internal node goes left
//! - **Inorder traversal**: explicit-stack walk producing the canonical node sequence
//! - **Feature encoding**: internal-node root distances, tip branch lengths and
//!   optional tip states
//! - **Formatting**: zero-padding into `k * max_taxa` slots
//! - **Batch encoding**: parallel column assembly of many trees

#![warn(missing_docs)]
#![warn(clippy::all)]

/// Phylogenetic tree arena and Newick reader
pub mod tree;

/// Tree-to-vector encoding pipeline
pub mod encoding;

/// Parallel batch encoding into a feature matrix
pub mod batch;

/// Encoder configuration
pub mod config;

/// Utility functions and helpers
pub mod utils;

// Re-export commonly used types
pub use tree::{parse_newick, parse_newick_trees, Tree, TreeBuilder};
pub use encoding::{encode, format, encode_formatted, Encoding, EncodingKind, Ladder};
pub use batch::{BatchEncoder, BatchTable, CancelFlag, ProgressReporter};
pub use config::EncoderConfig;

/// Error types for the library
#[derive(Debug, thiserror::Error)]
pub enum CblvError {
    /// Tree does not satisfy the rooted strictly-binary arena invariants
    #[error("Structural violation: {0}")]
    StructuralViolation(String),

    /// Node index outside `1..=2T-1`
    #[error("Node index {index} out of range 1..={node_count}")]
    OutOfRange {
        /// Offending index
        index: usize,
        /// Number of nodes in the tree
        node_count: usize,
    },

    /// A feature sequence does not fit the configured capacity
    #[error("Sequence of length {len} exceeds capacity max_taxa = {max_taxa}")]
    CapacityExceeded {
        /// Length of the offending sequence
        len: usize,
        /// Configured capacity
        max_taxa: usize,
    },

    /// State-augmented encoding requested for a tip without a state
    #[error("Tip {tip} has no state label")]
    MissingState {
        /// Tip index
        tip: usize,
    },

    /// Tip state outside the configured label space
    #[error("Tip {tip} has state {state}, expected a value below {num_states}")]
    InvalidState {
        /// Tip index
        tip: usize,
        /// Offending state code
        state: u32,
        /// Size of the label space
        num_states: u32,
    },

    /// Invalid configuration
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    /// Failure while encoding one tree of a batch
    #[error("Tree {index}: {source}")]
    Tree {
        /// Position of the tree in the batch input
        index: usize,
        /// Underlying error
        source: Box<CblvError>,
    },

    /// Batch encoding was cancelled
    #[error("Batch encoding cancelled")]
    Cancelled,

    /// Newick text could not be parsed
    #[error("Newick parse error at byte {position}: {message}")]
    Newick {
        /// Byte offset into the input
        position: usize,
        /// Description of the problem
        message: String,
    },

    /// IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl CblvError {
    /// Attach the batch position of the tree that failed
    pub fn for_tree(self, index: usize) -> Self {
        CblvError::Tree {
            index,
            source: Box::new(self),
        }
    }
}

/// Result type for the library
pub type Result<T> = std::result::Result<T, CblvError>;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        tree::{parse_newick, parse_newick_trees, Tree, TreeBuilder},
        encoding::{encode, format, encode_formatted, Encoding, EncodingKind, Ladder, Distances},
        batch::{BatchEncoder, BatchTable, CancelFlag, ProgressReporter},
        config::EncoderConfig,
        utils::LogProgress,
        Result, CblvError,
    };
}
