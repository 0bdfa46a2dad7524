use std::collections::BTreeSet;
use std::path::Path;

use ndarray::Array2;

use crate::config::NetworkConfig;
use crate::events::{EventError, EventFile, EventStream, UNKNOWN_INDEX};
use crate::logging;
use crate::neural::{BatchEncoder, NdlNetwork};

use super::table::WeightTable;

/// High-level interface between network and corpus.
///
/// Owns the event file, a persistent lazy stream over it, the encoder and the
/// network. Tracks how many events have been consumed versus available; every
/// learning request is clamped to what is left, so the stream's placeholder
/// tail is never reached through this interface.
///
/// # Example
///
/// ```no_run
/// use ndl_core::Learner;
///
/// let mut learner = Learner::new("events.tsv")?;
/// learner.learn_all()?;
/// let table = learner.named_weights(None, None);
/// println!("{}", table);
/// # Ok::<(), ndl_core::EventError>(())
/// ```
pub struct Learner {
    events: EventFile,
    stream: EventStream,
    encoder: BatchEncoder,
    network: NdlNetwork,
    num_events_learnt: usize,
}

impl Learner {
    /// Opens an event file with the default network configuration.
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, EventError> {
        Self::with_config(path, NetworkConfig::default())
    }

    pub fn with_config<P: AsRef<Path>>(path: P, config: NetworkConfig) -> Result<Self, EventError> {
        let events = EventFile::open_with(path, config.lowercase)?;
        // +1 for the unknown slot at index 0
        let num_inputs = events.num_cues() + 1;
        let num_outputs = events.num_outcomes() + 1;
        let network = NdlNetwork::new(&config, num_inputs, num_outputs);
        Self::assemble(events, network)
    }

    /// Continues learning from a previously exported weight matrix.
    pub fn with_weights<P: AsRef<Path>>(
        path: P,
        config: NetworkConfig,
        weights: Array2<f32>,
    ) -> Result<Self, EventError> {
        let events = EventFile::open_with(path, config.lowercase)?;
        assert_eq!(
            weights.dim(),
            (events.num_cues() + 1, events.num_outcomes() + 1),
            "weight matrix must match the event file vocabulary"
        );
        let network = NdlNetwork::from_weights(&config, weights);
        Self::assemble(events, network)
    }

    fn assemble(events: EventFile, network: NdlNetwork) -> Result<Self, EventError> {
        let encoder = BatchEncoder::new(network.num_inputs(), network.num_outputs());
        let stream = events.events()?;
        Ok(Self {
            events,
            stream,
            encoder,
            network,
            num_events_learnt: 0,
        })
    }

    /// Learns the next `num_events_to_learn` events.
    ///
    /// Requests beyond the remaining event count are clamped with a non-fatal
    /// warning on the diagnostic channel. Returns the number of events
    /// actually learnt.
    pub fn learn(&mut self, num_events_to_learn: usize) -> Result<usize, EventError> {
        let mut requested = num_events_to_learn;
        let left = self.num_events_left();
        if requested > left {
            warn(&format!(
                "can't learn {} events, only {} events left",
                requested, left
            ));
            requested = left;
        }
        let learnt = self
            .network
            .learn_from(&mut self.stream, &self.encoder, requested)?;
        self.num_events_learnt += learnt;
        Ok(learnt)
    }

    /// Learns every event that has not been learnt yet.
    pub fn learn_all(&mut self) -> Result<usize, EventError> {
        self.learn(self.num_events_left())
    }

    /// Learned weights between the given cues and outcomes as a bare matrix.
    ///
    /// `None` selects all known tokens. Token lists are de-duplicated and
    /// sorted lexicographically before lookup, so rows and columns follow the
    /// sorted lists, not the argument order. Unknown tokens are excluded from
    /// the result and reported on the warning channel; the call never fails.
    pub fn weights(&self, cues: Option<&[&str]>, outcomes: Option<&[&str]>) -> Array2<f32> {
        let (_, _, weights) = self.select(cues, outcomes);
        weights
    }

    /// Same selection as [`weights`](Self::weights), labeled with the cue and
    /// outcome names.
    pub fn named_weights(&self, cues: Option<&[&str]>, outcomes: Option<&[&str]>) -> WeightTable {
        let (cue_names, outcome_names, weights) = self.select(cues, outcomes);
        WeightTable::new(cue_names, outcome_names, weights)
    }

    fn select(
        &self,
        cues: Option<&[&str]>,
        outcomes: Option<&[&str]>,
    ) -> (Vec<String>, Vec<String>, Array2<f32>) {
        let (cue_names, cue_indices) = resolve_tokens(cues, self.events.cue_names(), "cue", |t| {
            self.events.cue_index(t)
        });
        let (outcome_names, outcome_indices) =
            resolve_tokens(outcomes, self.events.outcome_names(), "outcome", |t| {
                self.events.outcome_index(t)
            });
        let weights = self
            .network
            .get_weights(&cue_indices, &outcome_indices)
            .expect("vocabulary indices are within the weight matrix");
        (cue_names, outcome_names, weights)
    }

    /// Full weight matrix including the unknown row and column. Cloning this
    /// is the model checkpoint.
    pub fn weight_matrix(&self) -> &Array2<f32> {
        self.network.weights()
    }

    pub fn cue_index(&self, cue: &str) -> usize {
        self.events.cue_index(cue)
    }

    pub fn outcome_index(&self, outcome: &str) -> usize {
        self.events.outcome_index(outcome)
    }

    /// All known cue tokens in index order.
    pub fn cues(&self) -> &[String] {
        self.events.cue_names()
    }

    /// All known outcome tokens in index order.
    pub fn outcomes(&self) -> &[String] {
        self.events.outcome_names()
    }

    pub fn num_events(&self) -> usize {
        self.events.num_events()
    }

    pub fn num_cues(&self) -> usize {
        self.events.num_cues()
    }

    pub fn num_outcomes(&self) -> usize {
        self.events.num_outcomes()
    }

    pub fn num_events_learnt(&self) -> usize {
        self.num_events_learnt
    }

    pub fn num_events_left(&self) -> usize {
        self.events.num_events() - self.num_events_learnt
    }

    pub fn learning_rate(&self) -> f32 {
        self.network.learning_rate()
    }

    /// Human-readable status summary. Presentation only, no mutation.
    pub fn info(&self) -> String {
        format!(
            "Event File: {}\n\
             Number of Events: {} ({} learnt)\n\
             Number of Cues: {}\n\
             Number of Outcomes: {}\n\
             Cues and Outcomes are lowercased: {}\n\
             Learning Rate: {}",
            self.events.path().display(),
            self.num_events(),
            self.num_events_learnt,
            self.num_cues(),
            self.num_outcomes(),
            self.events.lowercase(),
            self.learning_rate(),
        )
    }
}

/// Resolves an optional token query to sorted names and their indices.
///
/// `None` means every known token. Explicit lists are de-duplicated and
/// sorted; tokens outside the vocabulary are dropped with a warning.
fn resolve_tokens(
    requested: Option<&[&str]>,
    known: &[String],
    kind: &str,
    lookup: impl Fn(&str) -> usize,
) -> (Vec<String>, Vec<usize>) {
    let names: Vec<String> = match requested {
        None => {
            let mut all = known.to_vec();
            all.sort();
            all
        }
        Some(list) => {
            let mut unknown = Vec::new();
            let mut selected = BTreeSet::new();
            for &token in list {
                if lookup(token) == UNKNOWN_INDEX {
                    unknown.push(token);
                } else {
                    selected.insert(token.to_string());
                }
            }
            if !unknown.is_empty() {
                warn(&format!("unknown {}s (ignored): {:?}", kind, unknown));
            }
            selected.into_iter().collect()
        }
    };
    let indices = names.iter().map(|name| lookup(name)).collect();
    (names, indices)
}

fn warn(message: &str) {
    if let Err(err) = logging::log_warning("learner", message) {
        eprintln!("failed to log learner warning: {err}");
    }
}
