use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use flate2::write::GzEncoder;
use flate2::Compression;

use crate::config::PreprocessingConfig;

/// Turns a sentence-per-line corpus into a tab-separated event file.
///
/// Each sliding window of consecutive tokens becomes one event: the window
/// joined by `_` is the outcome field, and the character n-grams of the
/// window string (with `_` replaced by `#`) are the cue field.
pub struct Preprocessor {
    config: PreprocessingConfig,
}

impl Preprocessor {
    pub fn new(config: PreprocessingConfig) -> Self {
        Self { config }
    }

    /// Processes a corpus file line by line into an event file, writing the
    /// mandatory header first.
    pub fn process_file<P: AsRef<Path>, Q: AsRef<Path>>(
        &self,
        in_file: P,
        out_file: Q,
    ) -> io::Result<()> {
        let reader = BufReader::new(File::open(in_file)?);
        let mut writer = BufWriter::new(File::create(out_file)?);
        writeln!(writer, "Cues\tOutcomes\tFrequency")?;
        for line in reader.lines() {
            for event in self.line_to_events(&line?) {
                writeln!(writer, "{}", event)?;
            }
        }
        writer.flush()
    }

    /// Turns one corpus line into event lines (`cues\toutcomes\t1`).
    pub fn line_to_events(&self, line: &str) -> Vec<String> {
        let line = if self.config.lowercase {
            line.to_lowercase()
        } else {
            line.to_string()
        };
        let line = if self.config.remove_punctuation {
            line.chars()
                .filter(|c| !c.is_ascii_punctuation())
                .collect()
        } else {
            line
        };

        let tokens: Vec<&str> = line.split_whitespace().collect();
        let window = self.config.outcomes_per_event;
        if tokens.len() < window {
            return Vec::new();
        }

        tokens
            .windows(window)
            .map(|outcome_tokens| {
                let outcomes = self.join_field(outcome_tokens, self.config.unique_outcomes);
                let cues = self.make_cues(&outcomes);
                format!("{}\t{}\t1", cues, outcomes)
            })
            .collect()
    }

    /// Extracts the cue field for one outcome window: character n-grams of
    /// the window string, for every configured n-gram size.
    pub fn make_cues(&self, outcomes: &str) -> String {
        let text = outcomes.replace('_', "#");
        let chars: Vec<char> = text.chars().collect();

        let mut all_cues = Vec::new();
        for &length in &self.config.grams {
            if chars.len() < length {
                continue;
            }
            for gram in chars.windows(length) {
                all_cues.push(gram.iter().collect::<String>());
            }
        }
        if self.config.unique_cues {
            dedup_preserving_order(&mut all_cues);
        }
        all_cues.join("_")
    }

    fn join_field(&self, tokens: &[&str], unique: bool) -> String {
        let mut tokens: Vec<String> = tokens.iter().map(|t| t.to_string()).collect();
        if unique {
            dedup_preserving_order(&mut tokens);
        }
        tokens.join("_")
    }
}

impl Default for Preprocessor {
    fn default() -> Self {
        Self::new(PreprocessingConfig::default())
    }
}

/// Re-encodes an event file as gzip with the frequency column dropped, the
/// layout expected by binary event consumers.
pub fn compress_events<P: AsRef<Path>, Q: AsRef<Path>>(event_file: P, out_file: Q) -> io::Result<()> {
    let reader = BufReader::new(File::open(event_file)?);
    let mut encoder = GzEncoder::new(BufWriter::new(File::create(out_file)?), Compression::default());
    for line in reader.lines() {
        let line = line?;
        let stripped = match line.rsplit_once('\t') {
            Some((rest, _frequency)) => rest,
            None => line.as_str(),
        };
        writeln!(encoder, "{}", stripped)?;
    }
    encoder.finish()?.flush()
}

fn dedup_preserving_order(tokens: &mut Vec<String>) {
    let mut seen = std::collections::HashSet::new();
    tokens.retain(|token| seen.insert(token.clone()));
}
