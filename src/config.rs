//! Encoder configuration

use serde::{Serialize, Deserialize};
use crate::encoding::EncodingKind;
use crate::tree::Tree;
use crate::{CblvError, Result};

/// Encoder configuration
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct EncoderConfig {
    /// Encoding variant
    #[serde(default)]
    pub kind: EncodingKind,
    /// Capacity in taxa; `None` uses the largest tree of each batch
    #[serde(default)]
    pub max_taxa: Option<usize>,
}

impl EncoderConfig {
    /// Create config for the plain encoding
    pub fn plain() -> Self {
        EncoderConfig {
            kind: EncodingKind::Plain,
            max_taxa: None,
        }
    }

    /// Create config for the binary-state encoding
    pub fn binary_state() -> Self {
        EncoderConfig {
            kind: EncodingKind::BinaryState,
            max_taxa: None,
        }
    }

    /// Create config for the multi-state encoding
    pub fn multi_state(num_states: u32) -> Self {
        EncoderConfig {
            kind: EncodingKind::MultiState { num_states },
            max_taxa: None,
        }
    }

    /// Fix the capacity instead of inferring it per batch
    pub fn with_max_taxa(mut self, max_taxa: usize) -> Self {
        self.max_taxa = Some(max_taxa);
        self
    }

    /// Capacity used for `trees`
    pub fn resolve_max_taxa(&self, trees: &[Tree]) -> usize {
        self.max_taxa
            .unwrap_or_else(|| trees.iter().map(Tree::num_tips).max().unwrap_or(0))
    }

    /// Length `k * max_taxa` of each formatted vector
    pub fn vector_len(&self, max_taxa: usize) -> usize {
        self.kind.blocks() * max_taxa
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.max_taxa == Some(0) {
            return Err(CblvError::InvalidConfig(
                "max_taxa must be positive".to_string(),
            ));
        }

        if let EncodingKind::MultiState { num_states } = self.kind {
            if num_states < 2 {
                return Err(CblvError::InvalidConfig(format!(
                    "multi-state encoding needs at least 2 states, got {}",
                    num_states
                )));
            }
        }

        Ok(())
    }
}
