use ndarray::Array2;

use crate::events::Event;

/// Encodes one event into a pair of n-hot row vectors.
///
/// Each index in the event contributes 1.0 to its slot, so a repeated index
/// accumulates (2.0, 3.0, ...) — an additive overlay, not a boolean union.
/// Output shapes are always `1 × num_inputs` and `1 × num_outputs`.
#[derive(Debug, Clone, Copy)]
pub struct BatchEncoder {
    num_inputs: usize,
    num_outputs: usize,
}

impl BatchEncoder {
    /// Creates an encoder for a fixed vocabulary. `num_inputs` and
    /// `num_outputs` include the reserved unknown slot at index 0.
    pub fn new(num_inputs: usize, num_outputs: usize) -> Self {
        Self {
            num_inputs,
            num_outputs,
        }
    }

    /// One training sample: `(cue row, outcome row)`.
    pub fn encode(&self, event: &Event) -> (Array2<f32>, Array2<f32>) {
        (
            n_hot(&event.cues, self.num_inputs),
            n_hot(&event.outcomes, self.num_outputs),
        )
    }

    pub fn num_inputs(&self) -> usize {
        self.num_inputs
    }

    pub fn num_outputs(&self) -> usize {
        self.num_outputs
    }
}

fn n_hot(indices: &[usize], width: usize) -> Array2<f32> {
    let mut row = Array2::zeros((1, width));
    for &index in indices {
        assert!(index < width, "index {} out of range for width {}", index, width);
        row[[0, index]] += 1.0;
    }
    row
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_shapes() {
        let encoder = BatchEncoder::new(4, 3);
        let event = Event {
            cues: vec![1, 2],
            outcomes: vec![1],
        };
        let (cues, outcomes) = encoder.encode(&event);
        assert_eq!(cues.dim(), (1, 4));
        assert_eq!(outcomes.dim(), (1, 3));
    }

    #[test]
    fn test_encode_sets_selected_slots() {
        let encoder = BatchEncoder::new(4, 3);
        let event = Event {
            cues: vec![1, 3],
            outcomes: vec![2],
        };
        let (cues, outcomes) = encoder.encode(&event);
        assert_eq!(cues.row(0).to_vec(), vec![0.0, 1.0, 0.0, 1.0]);
        assert_eq!(outcomes.row(0).to_vec(), vec![0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_repeated_index_accumulates() {
        let encoder = BatchEncoder::new(3, 2);
        let event = Event {
            cues: vec![1, 1, 1],
            outcomes: vec![0],
        };
        let (cues, outcomes) = encoder.encode(&event);
        assert_eq!(cues.row(0).to_vec(), vec![0.0, 3.0, 0.0]);
        assert_eq!(outcomes.row(0).to_vec(), vec![1.0, 0.0]);
    }
}
