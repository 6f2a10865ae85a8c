//! The ordered set of letters a classifier can report.

use std::{
    fmt, fs, io,
    path::{Path, PathBuf},
    sync::Arc,
};

/// Number of labels the letter network distinguishes.
pub const NUM_LABELS: usize = 21;

/// Class order of the bundled letter network.
///
/// The network was trained on static handshapes only, so letters that require motion (J, K, Ñ,
/// Q, X, Z) are absent.
pub const LETTERS: [&str; NUM_LABELS] = [
    "A", "B", "C", "D", "E", "F", "G", "H", "I", "L", "M", "N", "O", "P", "R", "S", "T", "U", "V",
    "W", "Y",
];

/// Errors produced while building a [`LabelSet`].
#[derive(Debug, thiserror::Error)]
pub enum LabelError {
    #[error("label set must contain exactly {expected} labels, got {actual}")]
    WrongCount { expected: usize, actual: usize },

    #[error("label {index} is empty")]
    EmptyLabel { index: usize },

    #[error("failed to read label file {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// An ordered, immutable list of [`NUM_LABELS`] labels.
///
/// Position `i` names the class of network output `i`, so the order must match the order used
/// when training the network.
///
/// This is a cheaply [`Clone`]able handle.
#[derive(Clone, PartialEq, Eq)]
pub struct LabelSet(Arc<[String]>);

impl LabelSet {
    /// Creates a label set, validating its length and that no label is empty.
    pub fn new<I, S>(labels: I) -> Result<Self, LabelError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let labels = labels.into_iter().map(Into::into).collect::<Vec<String>>();
        if labels.len() != NUM_LABELS {
            return Err(LabelError::WrongCount {
                expected: NUM_LABELS,
                actual: labels.len(),
            });
        }
        if let Some(index) = labels.iter().position(|l| l.is_empty()) {
            return Err(LabelError::EmptyLabel { index });
        }

        Ok(Self(labels.into()))
    }

    /// Reads a label set from a text file with one label per line.
    ///
    /// Surrounding whitespace is trimmed and blank lines are skipped.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, LabelError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| LabelError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text)
    }

    fn parse(text: &str) -> Result<Self, LabelError> {
        Self::new(text.lines().map(str::trim).filter(|line| !line.is_empty()))
    }

    /// The label at `index`, or [`None`] if `index` is out of range.
    #[inline]
    pub fn get(&self, index: usize) -> Option<&str> {
        self.0.get(index).map(String::as_str)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl ExactSizeIterator<Item = &str> + '_ {
        self.0.iter().map(String::as_str)
    }
}

impl Default for LabelSet {
    fn default() -> Self {
        Self(LETTERS.iter().map(|l| l.to_string()).collect())
    }
}

impl fmt::Debug for LabelSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_order() {
        let labels = LabelSet::default();
        assert_eq!(labels.len(), NUM_LABELS);
        assert_eq!(labels.get(0), Some("A"));
        assert_eq!(labels.get(9), Some("L"));
        assert_eq!(labels.get(20), Some("Y"));
        assert_eq!(labels.get(21), None);
    }

    #[test]
    fn wrong_count() {
        let err = LabelSet::new(["A", "B"]).unwrap_err();
        assert!(matches!(
            err,
            LabelError::WrongCount {
                expected: 21,
                actual: 2
            }
        ));
    }

    #[test]
    fn empty_label() {
        let mut labels = LETTERS.map(String::from);
        labels[4] = String::new();
        let err = LabelSet::new(labels).unwrap_err();
        assert!(matches!(err, LabelError::EmptyLabel { index: 4 }));
    }

    #[test]
    fn parse_lines() {
        let text = LETTERS
            .iter()
            .map(|l| format!("  {l}\n\n"))
            .collect::<String>();
        assert_eq!(LabelSet::parse(&text).unwrap(), LabelSet::default());
    }

    #[test]
    fn missing_file() {
        let err = LabelSet::from_path("this/file/does/not/exist.txt").unwrap_err();
        assert!(matches!(err, LabelError::Io { .. }));
        assert!(
            err.to_string().contains("this/file/does/not/exist.txt"),
            "{err}"
        );
    }
}
