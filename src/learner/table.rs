use std::fmt::{self, Display};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use ndarray::Array2;
use serde::Serialize;

/// Labeled weight table: row labels are cues, column labels are outcomes.
///
/// Produced by [`Learner::named_weights`](super::Learner::named_weights).
/// Downstream consumers (tabular export, graph rendering) work from this
/// value; the table itself only knows how to display and export itself.
#[derive(Debug, Clone, Serialize)]
pub struct WeightTable {
    cues: Vec<String>,
    outcomes: Vec<String>,
    weights: Array2<f32>,
}

impl WeightTable {
    pub(crate) fn new(cues: Vec<String>, outcomes: Vec<String>, weights: Array2<f32>) -> Self {
        assert_eq!(weights.nrows(), cues.len(), "row labels must match matrix");
        assert_eq!(
            weights.ncols(),
            outcomes.len(),
            "column labels must match matrix"
        );
        Self {
            cues,
            outcomes,
            weights,
        }
    }

    pub fn cues(&self) -> &[String] {
        &self.cues
    }

    pub fn outcomes(&self) -> &[String] {
        &self.outcomes
    }

    pub fn weights(&self) -> &Array2<f32> {
        &self.weights
    }

    /// Weight between a labeled cue and outcome, if both are in the table.
    pub fn value(&self, cue: &str, outcome: &str) -> Option<f32> {
        let row = self.cues.iter().position(|c| c == cue)?;
        let col = self.outcomes.iter().position(|o| o == outcome)?;
        Some(self.weights[[row, col]])
    }

    /// Writes the table as tab-separated values, header row first.
    pub fn write_tsv<W: Write>(&self, mut writer: W) -> io::Result<()> {
        write!(writer, "cue")?;
        for outcome in &self.outcomes {
            write!(writer, "\t{}", outcome)?;
        }
        writeln!(writer)?;
        for (row, cue) in self.cues.iter().enumerate() {
            write!(writer, "{}", cue)?;
            for col in 0..self.outcomes.len() {
                write!(writer, "\t{}", self.weights[[row, col]])?;
            }
            writeln!(writer)?;
        }
        Ok(())
    }

    pub fn save_tsv<P: AsRef<Path>>(&self, path: P) -> io::Result<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        self.write_tsv(&mut writer)?;
        writer.flush()
    }
}

impl Display for WeightTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label_width = self
            .cues
            .iter()
            .map(|cue| cue.len())
            .max()
            .unwrap_or(0)
            .max(3);
        let col_width = self
            .outcomes
            .iter()
            .map(|outcome| outcome.len())
            .max()
            .unwrap_or(0)
            .max(10);

        write!(f, "{:label_width$}", "")?;
        for outcome in &self.outcomes {
            write!(f, " {:>col_width$}", outcome)?;
        }
        writeln!(f)?;
        for (row, cue) in self.cues.iter().enumerate() {
            write!(f, "{:label_width$}", cue)?;
            for col in 0..self.outcomes.len() {
                write!(f, " {:>col_width$.6}", self.weights[[row, col]])?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
