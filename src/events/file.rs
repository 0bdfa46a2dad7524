use std::borrow::Cow;
use std::fmt::{self, Display};
use std::fs::File;
use std::io::{self, BufRead, BufReader, Lines};
use std::path::{Path, PathBuf};

use flate2::read::GzDecoder;

use super::numberer::{Numberer, UNKNOWN_INDEX};

/// One training instance: the indices of co-occurring cues and outcomes.
///
/// Index 0 marks a token outside the trained vocabulary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub cues: Vec<usize>,
    pub outcomes: Vec<usize>,
}

impl Event {
    /// The single-unknown-cue / single-unknown-outcome event yielded after
    /// the underlying file is exhausted.
    pub fn placeholder() -> Self {
        Self {
            cues: vec![UNKNOWN_INDEX],
            outcomes: vec![UNKNOWN_INDEX],
        }
    }
}

#[derive(Debug)]
pub enum EventError {
    Io(io::Error),
    Parse { line: usize, content: String },
}

impl Display for EventError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventError::Io(err) => write!(f, "IO error: {}", err),
            EventError::Parse { line, content } => write!(
                f,
                "Parse error on line {}: missing tab-separated cue/outcome pair in {:?}",
                line, content
            ),
        }
    }
}

impl std::error::Error for EventError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            EventError::Io(err) => Some(err),
            EventError::Parse { .. } => None,
        }
    }
}

impl From<io::Error> for EventError {
    fn from(value: io::Error) -> Self {
        EventError::Io(value)
    }
}

/// Interface to a tab-separated event file.
///
/// Construction performs one full synchronous pass over the file (the header
/// line is mandatory and always skipped), assigning indices to every distinct
/// cue and outcome through two [`Numberer`]s and counting event lines. The
/// counters are fixed for the lifetime of the value. Once counting completes,
/// both numberers are frozen: later lookups and decoding passes read the
/// vocabulary, they never grow it.
///
/// The file may be plain text or gzip-compressed (`.gz` extension). Each data
/// line holds a cue field and an outcome field separated by a tab; a trailing
/// frequency column is accepted and ignored. Multi-token fields join their
/// tokens with `_`.
///
/// # Example
///
/// ```text
/// Cues\tOutcomes\tFrequency
/// ban_an\tbanana\t1
/// ```
#[derive(Debug)]
pub struct EventFile {
    path: PathBuf,
    lowercase: bool,
    cues: Numberer,
    outcomes: Numberer,
    num_events: usize,
    num_cues: usize,
    num_outcomes: usize,
}

impl EventFile {
    /// Opens an event file with lowercasing on.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, EventError> {
        Self::open_with(path, true)
    }

    /// Opens an event file, counting events and indexing every distinct cue
    /// and outcome in one pass.
    pub fn open_with<P: AsRef<Path>>(path: P, lowercase: bool) -> Result<Self, EventError> {
        let path = path.as_ref().to_path_buf();
        let mut cues = Numberer::new();
        let mut outcomes = Numberer::new();
        let mut num_events = 0;

        let mut lines = open_reader(&path)?.lines();
        if let Some(header) = lines.next() {
            header?;
        }
        for (offset, line) in lines.enumerate() {
            let line = line?;
            let line = normalize(&line, lowercase);
            let (cue_field, outcome_field) = split_event_line(&line, offset + 2)?;
            for token in cue_field.split('_') {
                cues.number(token);
            }
            for token in outcome_field.split('_') {
                outcomes.number(token);
            }
            num_events += 1;
        }

        // the declared dimensionality is locked in here
        cues.freeze();
        outcomes.freeze();
        let num_cues = cues.len();
        let num_outcomes = outcomes.len();

        Ok(Self {
            path,
            lowercase,
            cues,
            outcomes,
            num_events,
            num_cues,
            num_outcomes,
        })
    }

    /// Creates an independent lazy stream over the same file: a fresh read
    /// from the start, skipping the header, decoding every line against a
    /// read-only snapshot of the vocabulary built at construction.
    ///
    /// The stream never terminates. Once the file is exhausted it yields
    /// [`Event::placeholder`] on every subsequent pull, so a consumer that
    /// over-requests samples sees no-op events rather than an end of stream.
    pub fn events(&self) -> Result<EventStream, EventError> {
        let mut lines = open_reader(&self.path)?.lines();
        if let Some(header) = lines.next() {
            header?;
        }
        Ok(EventStream {
            lines,
            cues: self.cues.clone(),
            outcomes: self.outcomes.clone(),
            lowercase: self.lowercase,
            line_number: 1,
            exhausted: false,
        })
    }

    /// Resolves a cue token against the vocabulary; unknown tokens answer 0.
    pub fn cue_index(&self, cue: &str) -> usize {
        self.cues.index_of(cue).unwrap_or(UNKNOWN_INDEX)
    }

    /// Resolves an outcome token against the vocabulary; unknown tokens
    /// answer 0.
    pub fn outcome_index(&self, outcome: &str) -> usize {
        self.outcomes.index_of(outcome).unwrap_or(UNKNOWN_INDEX)
    }

    /// All known cue tokens in index order.
    pub fn cue_names(&self) -> &[String] {
        self.cues.names()
    }

    /// All known outcome tokens in index order.
    pub fn outcome_names(&self) -> &[String] {
        self.outcomes.names()
    }

    pub fn num_events(&self) -> usize {
        self.num_events
    }

    pub fn num_cues(&self) -> usize {
        self.num_cues
    }

    pub fn num_outcomes(&self) -> usize {
        self.num_outcomes
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn lowercase(&self) -> bool {
        self.lowercase
    }
}

/// Lazy, never-exhausted sequence of decoded events.
///
/// Owns its own file handle and a frozen copy of the vocabulary, so it stays
/// valid independently of the [`EventFile`] that created it.
pub struct EventStream {
    lines: Lines<Box<dyn BufRead>>,
    cues: Numberer,
    outcomes: Numberer,
    lowercase: bool,
    line_number: usize,
    exhausted: bool,
}

impl EventStream {
    fn decode(&self, line: &str) -> Result<Event, EventError> {
        let line = normalize(line, self.lowercase);
        let (cue_field, outcome_field) = split_event_line(&line, self.line_number)?;
        let cues = cue_field
            .split('_')
            .map(|token| self.cues.index_of(token).unwrap_or(UNKNOWN_INDEX))
            .collect();
        let outcomes = outcome_field
            .split('_')
            .map(|token| self.outcomes.index_of(token).unwrap_or(UNKNOWN_INDEX))
            .collect();
        Ok(Event { cues, outcomes })
    }
}

impl Iterator for EventStream {
    type Item = Result<Event, EventError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.exhausted {
            return Some(Ok(Event::placeholder()));
        }
        match self.lines.next() {
            None => {
                self.exhausted = true;
                Some(Ok(Event::placeholder()))
            }
            Some(Err(err)) => Some(Err(EventError::Io(err))),
            Some(Ok(line)) => {
                self.line_number += 1;
                Some(self.decode(&line))
            }
        }
    }
}

fn open_reader(path: &Path) -> io::Result<Box<dyn BufRead>> {
    let file = File::open(path)?;
    if path.extension().map_or(false, |ext| ext == "gz") {
        Ok(Box::new(BufReader::new(GzDecoder::new(file))))
    } else {
        Ok(Box::new(BufReader::new(file)))
    }
}

fn normalize(line: &str, lowercase: bool) -> Cow<'_, str> {
    if lowercase {
        Cow::Owned(line.to_lowercase())
    } else {
        Cow::Borrowed(line)
    }
}

fn split_event_line(line: &str, line_number: usize) -> Result<(&str, &str), EventError> {
    let line = line.trim();
    match line.split_once('\t') {
        Some((cue_field, rest)) => {
            // everything after the second tab (the frequency column) is ignored
            let outcome_field = rest.split('\t').next().unwrap_or(rest);
            Ok((cue_field, outcome_field))
        }
        None => Err(EventError::Parse {
            line: line_number,
            content: line.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_events(lines: &[&str]) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "Cues\tOutcomes\tFrequency").unwrap();
        for line in lines {
            writeln!(file, "{}", line).unwrap();
        }
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_counting_pass() {
        let file = write_events(&["a_b\tx\t1", "c\tx_y\t1"]);
        let events = EventFile::open(file.path()).unwrap();

        assert_eq!(events.num_events(), 2);
        assert_eq!(events.num_cues(), 3);
        assert_eq!(events.num_outcomes(), 2);
        assert_eq!(events.cue_names(), &["a", "b", "c"]);
        assert_eq!(events.outcome_names(), &["x", "y"]);
    }

    #[test]
    fn test_indices_are_stable_across_passes() {
        let file = write_events(&["a_b\tx\t1", "c\tx_y\t1"]);
        let events = EventFile::open(file.path()).unwrap();

        let mut stream = events.events().unwrap();
        let first = stream.next().unwrap().unwrap();
        let second = stream.next().unwrap().unwrap();

        assert_eq!(first.cues, vec![events.cue_index("a"), events.cue_index("b")]);
        assert_eq!(first.outcomes, vec![events.outcome_index("x")]);
        assert_eq!(second.cues, vec![events.cue_index("c")]);
        assert_eq!(
            second.outcomes,
            vec![events.outcome_index("x"), events.outcome_index("y")]
        );
    }

    #[test]
    fn test_stream_yields_placeholders_after_exhaustion() {
        let file = write_events(&["a\tx\t1"]);
        let events = EventFile::open(file.path()).unwrap();

        let mut stream = events.events().unwrap();
        assert!(stream.next().unwrap().is_ok());
        for _ in 0..5 {
            assert_eq!(stream.next().unwrap().unwrap(), Event::placeholder());
        }
    }

    #[test]
    fn test_lowercase_folds_tokens() {
        let file = write_events(&["Walk\tWALKED\t1"]);
        let events = EventFile::open(file.path()).unwrap();

        assert_eq!(events.cue_names(), &["walk"]);
        assert_eq!(events.outcome_names(), &["walked"]);
        assert_eq!(events.cue_index("walk"), 1);
        assert_eq!(events.cue_index("Walk"), 0);
    }

    #[test]
    fn test_without_lowercase_case_is_preserved() {
        let file = write_events(&["Walk\tx\t1", "walk\tx\t1"]);
        let events = EventFile::open_with(file.path(), false).unwrap();
        assert_eq!(events.num_cues(), 2);
    }

    #[test]
    fn test_unknown_token_resolves_to_zero() {
        let file = write_events(&["a\tx\t1"]);
        let events = EventFile::open(file.path()).unwrap();
        assert_eq!(events.cue_index("zzz"), UNKNOWN_INDEX);
        assert_eq!(events.outcome_index("zzz"), UNKNOWN_INDEX);
    }

    #[test]
    fn test_malformed_line_is_a_parse_error() {
        let file = write_events(&["a\tx\t1", "no-tab-here"]);
        let err = EventFile::open(file.path()).unwrap_err();
        match err {
            EventError::Parse { line, .. } => assert_eq!(line, 3),
            other => panic!("expected parse error, got {}", other),
        }
    }

    #[test]
    fn test_frequency_column_is_optional() {
        let file = write_events(&["a\tx"]);
        let events = EventFile::open(file.path()).unwrap();
        assert_eq!(events.num_events(), 1);
        assert_eq!(events.num_cues(), 1);
    }

    #[test]
    fn test_gzip_event_file() {
        use flate2::write::GzEncoder;
        use flate2::Compression;

        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        write!(encoder, "Cues\tOutcomes\tFrequency\na_b\tx\t1\nc\tx_y\t1\n").unwrap();
        let bytes = encoder.finish().unwrap();

        let file = tempfile::Builder::new().suffix(".gz").tempfile().unwrap();
        std::fs::write(file.path(), bytes).unwrap();

        let events = EventFile::open(file.path()).unwrap();
        assert_eq!(events.num_events(), 2);
        assert_eq!(events.num_cues(), 3);
        assert_eq!(events.num_outcomes(), 2);
    }
}
