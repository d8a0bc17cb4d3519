//! Zero-padding of encodings into fixed-width vectors

use ndarray::{Array1, ArrayViewMut1};
use super::Encoding;
use crate::{CblvError, Result};

/// Pad an encoding into a vector of `k * max_taxa` slots
///
/// Block `i` holds sequence `i` (nodes, tips, states) followed by zeros.
/// Any sequence longer than `max_taxa` fails with
/// [`CblvError::CapacityExceeded`] before anything is written.
pub fn format(encoding: &Encoding, max_taxa: usize) -> Result<Array1<f64>> {
    let mut vector = Array1::zeros(encoding.kind().blocks() * max_taxa);
    format_into(encoding, max_taxa, vector.view_mut())?;
    Ok(vector)
}

/// Write the padded vector into a pre-allocated slot such as a matrix column
pub fn format_into(encoding: &Encoding, max_taxa: usize, mut out: ArrayViewMut1<f64>) -> Result<()> {
    let states: Option<Vec<f64>> = encoding
        .states()
        .map(|states| states.iter().map(|&s| f64::from(s)).collect());

    let mut blocks: Vec<&[f64]> = vec![encoding.nodes(), encoding.tips()];
    if let Some(states) = &states {
        blocks.push(states);
    }

    if let Some(len) = blocks.iter().map(|b| b.len()).find(|&len| len > max_taxa) {
        return Err(CblvError::CapacityExceeded { len, max_taxa });
    }

    let expected = blocks.len() * max_taxa;
    if out.len() != expected {
        return Err(CblvError::InvalidConfig(format!(
            "output slot holds {} values, encoding needs {}",
            out.len(),
            expected
        )));
    }

    out.fill(0.0);
    for (i, block) in blocks.iter().enumerate() {
        let offset = i * max_taxa;
        for (j, &value) in block.iter().enumerate() {
            out[offset + j] = value;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoding::{encode, EncodingKind};
    use crate::tree::parse_newick;
    use ndarray::Array2;

    #[test]
    fn test_plain_padding() {
        let tree = parse_newick("((A:0.2,B:0.3):0.5,C:0.4);").unwrap();
        let encoding = encode(&tree, EncodingKind::Plain).unwrap();

        let vector = format(&encoding, 3).unwrap();
        assert_eq!(vector.to_vec(), vec![0.5, 0.0, 0.0, 0.2, 0.3, 0.4]);

        let vector = format(&encoding, 5).unwrap();
        assert_eq!(
            vector.to_vec(),
            vec![0.5, 0.0, 0.0, 0.0, 0.0, 0.2, 0.3, 0.4, 0.0, 0.0]
        );
    }

    #[test]
    fn test_state_block() {
        let encoding = Encoding::BinaryState {
            nodes: vec![0.0],
            tips: vec![1.0, 2.0],
            states: vec![1, 0],
        };
        let vector = format(&encoding, 3).unwrap();
        assert_eq!(
            vector.to_vec(),
            vec![0.0, 0.0, 0.0, 1.0, 2.0, 0.0, 1.0, 0.0, 0.0]
        );
    }

    #[test]
    fn test_capacity_exceeded() {
        let tree = parse_newick("((A:0.2,B:0.3):0.5,C:0.4);").unwrap();
        let encoding = encode(&tree, EncodingKind::Plain).unwrap();

        assert!(matches!(
            format(&encoding, 2),
            Err(CblvError::CapacityExceeded { len: 3, max_taxa: 2 })
        ));
    }

    #[test]
    fn test_failed_format_leaves_slot_untouched() {
        let encoding = Encoding::Plain {
            nodes: vec![1.0, 1.0],
            tips: vec![1.0, 1.0, 1.0],
        };
        let mut matrix = Array2::from_elem((4, 2), 7.0);

        assert!(format_into(&encoding, 2, matrix.column_mut(1)).is_err());
        assert!(matrix.iter().all(|&v| v == 7.0));

        let encoding = Encoding::Plain {
            nodes: vec![1.0],
            tips: vec![2.0, 3.0],
        };
        format_into(&encoding, 2, matrix.column_mut(1)).unwrap();
        assert_eq!(matrix.column(1).to_vec(), vec![1.0, 0.0, 2.0, 3.0]);
        assert_eq!(matrix.column(0).to_vec(), vec![7.0; 4]);
    }

    #[test]
    fn test_wrong_slot_size() {
        let encoding = Encoding::Plain {
            nodes: vec![1.0],
            tips: vec![2.0, 3.0],
        };
        let mut slot = Array1::zeros(5);
        assert!(matches!(
            format_into(&encoding, 2, slot.view_mut()),
            Err(CblvError::InvalidConfig(_))
        ));
    }
}
