//! The naive discriminative learning network: parallel linear perceptrons
//! trained one event at a time with the Rescorla-Wagner / Widrow-Hoff delta
//! rule.

use std::fmt::{self, Display};

use ndarray::{Array1, Array2, Axis};

use crate::config::{InitScheme, NetworkConfig};
use crate::events::{Event, EventError};
use crate::logging;

use super::encoder::BatchEncoder;

const PROGRESS_INTERVAL: usize = 1000;

/// Out-of-range index in a weight lookup. Never clamped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexError {
    pub axis: &'static str,
    pub index: usize,
    pub size: usize,
}

impl Display for IndexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} index {} out of range (size {})",
            self.axis, self.index, self.size
        )
    }
}

impl std::error::Error for IndexError {}

/// Single dense weight matrix of shape `num_inputs × num_outputs`, row 0 and
/// column 0 representing the unknown symbol. Mutated in place by every
/// training step, never resized.
#[derive(Debug, Clone)]
pub struct NdlNetwork {
    weights: Array2<f32>,
    bias: Option<Array1<f32>>,
    learning_rate: f32,
}

impl NdlNetwork {
    pub fn new(config: &NetworkConfig, num_inputs: usize, num_outputs: usize) -> Self {
        let weights = match config.init {
            InitScheme::Zero => Array2::zeros((num_inputs, num_outputs)),
            InitScheme::Uniform => uniform_weights(config.seed, num_inputs, num_outputs),
        };
        let bias = config.use_bias.then(|| Array1::zeros(num_outputs));
        Self {
            weights,
            bias,
            learning_rate: config.learning_rate,
        }
    }

    /// Continues learning from a previously exported weight matrix.
    pub fn from_weights(config: &NetworkConfig, weights: Array2<f32>) -> Self {
        let bias = config.use_bias.then(|| Array1::zeros(weights.ncols()));
        Self {
            weights,
            bias,
            learning_rate: config.learning_rate,
        }
    }

    /// Pulls `num_events` events from the stream and performs one online
    /// update per event. Returns the number of events actually learnt (less
    /// than requested only if the stream ends, which event streams never do).
    pub fn learn_from<I>(
        &mut self,
        events: &mut I,
        encoder: &BatchEncoder,
        num_events: usize,
    ) -> Result<usize, EventError>
    where
        I: Iterator<Item = Result<Event, EventError>>,
    {
        for learnt in 0..num_events {
            let event = match events.next() {
                Some(event) => event?,
                None => return Ok(learnt),
            };
            let (cues, outcomes) = encoder.encode(&event);
            self.update(&cues, &outcomes);
            if (learnt + 1) % PROGRESS_INTERVAL == 0 {
                report_progress(learnt + 1, num_events);
            }
        }
        if num_events > 0 {
            report_progress(num_events, num_events);
        }
        Ok(num_events)
    }

    /// One gradient step of the half mean-squared-error objective against the
    /// linear prediction: `W += lr * xᵀ (y − x·W) / num_outputs`. The scaling
    /// is fixed across all input sizes.
    fn update(&mut self, cues: &Array2<f32>, outcomes: &Array2<f32>) {
        let mut prediction = cues.dot(&self.weights);
        if let Some(bias) = &self.bias {
            prediction += bias;
        }
        let error = outcomes - &prediction;
        let scale = self.learning_rate / self.weights.ncols() as f32;

        let gradient = cues.t().dot(&error);
        self.weights.scaled_add(scale, &gradient);
        if let Some(bias) = &mut self.bias {
            bias.scaled_add(scale, &error.row(0));
        }
    }

    /// Read-only sub-matrix of the weights, rows and columns selected in the
    /// exact given order. Duplicate indices yield duplicate rows/columns.
    pub fn get_weights(
        &self,
        cue_indices: &[usize],
        outcome_indices: &[usize],
    ) -> Result<Array2<f32>, IndexError> {
        for &index in cue_indices {
            if index >= self.weights.nrows() {
                return Err(IndexError {
                    axis: "cue",
                    index,
                    size: self.weights.nrows(),
                });
            }
        }
        for &index in outcome_indices {
            if index >= self.weights.ncols() {
                return Err(IndexError {
                    axis: "outcome",
                    index,
                    size: self.weights.ncols(),
                });
            }
        }
        Ok(self
            .weights
            .select(Axis(0), cue_indices)
            .select(Axis(1), outcome_indices))
    }

    pub fn weights(&self) -> &Array2<f32> {
        &self.weights
    }

    pub fn learning_rate(&self) -> f32 {
        self.learning_rate
    }

    pub fn num_inputs(&self) -> usize {
        self.weights.nrows()
    }

    pub fn num_outputs(&self) -> usize {
        self.weights.ncols()
    }
}

fn report_progress(learnt: usize, total: usize) {
    if let Err(err) = logging::log_progress("network", learnt, total) {
        eprintln!("failed to log training progress: {err}");
    }
}

fn uniform_weights(seed: u64, num_inputs: usize, num_outputs: usize) -> Array2<f32> {
    let state = if seed == 0 { 1 } else { seed };
    let mut weights = Array2::zeros((num_inputs, num_outputs));
    for (idx, value) in weights.iter_mut().enumerate() {
        let next = lcg(idx as u64 + state);
        *value = (normalized(next) - 0.5) * 0.02;
    }
    weights
}

fn lcg(seed: u64) -> u64 {
    seed.wrapping_mul(1664525).wrapping_add(1013904223)
}

fn normalized(value: u64) -> f32 {
    let fraction = (value & 0xFFFF_FFFF) as f32 / (u32::MAX as f32);
    fraction.clamp(0.0, 1.0)
}
