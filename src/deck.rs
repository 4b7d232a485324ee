use crate::error::DeckError;
use crate::pair::{DuplicatePolicy, Pair, PairSet};
use include_dir::{include_dir, Dir};
use serde::Deserialize;
use std::fs;
use std::path::Path;

static DECK_DIR: Dir = include_dir!("$CARGO_MANIFEST_DIR/src/decks");

/// A named list of pairs ready to be handed to a session
#[derive(Debug, Clone, PartialEq)]
pub struct Deck {
    pub name: String,
    pub pairs: Vec<Pair>,
}

// Either the bare array the generator emits or an object with a name
#[derive(Deserialize)]
#[serde(untagged)]
enum DeckFile {
    Named { name: Option<String>, pairs: Vec<Pair> },
    Bare(Vec<Pair>),
}

impl Deck {
    pub fn new(name: impl Into<String>, pairs: Vec<Pair>) -> Self {
        Self {
            name: name.into(),
            pairs,
        }
    }

    /// Load a `.json` or `.csv` deck; the file stem names the deck unless the JSON says otherwise
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, DeckError> {
        let path = path.as_ref();
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "deck".to_string());

        let extension = path
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase());

        match extension.as_deref() {
            Some("json") => Self::from_json(&stem, &fs::read_to_string(path)?),
            Some("csv") => Self::from_csv(&stem, fs::File::open(path)?),
            _ => Err(DeckError::UnsupportedFormat(path.to_path_buf())),
        }
    }

    pub fn from_json(default_name: &str, text: &str) -> Result<Self, DeckError> {
        let deck = match serde_json::from_str::<DeckFile>(text)? {
            DeckFile::Named { name, pairs } => Self {
                name: name.unwrap_or_else(|| default_name.to_string()),
                pairs,
            },
            DeckFile::Bare(pairs) => Self::new(default_name, pairs),
        };
        Ok(deck)
    }

    /// Reads `term,definition` rows after a header line
    pub fn from_csv<R: std::io::Read>(name: &str, reader: R) -> Result<Self, DeckError> {
        let mut rdr = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);

        let pairs = rdr
            .deserialize::<Pair>()
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self::new(name, pairs))
    }

    pub fn bundled(name: &str) -> Result<Self, DeckError> {
        let file = DECK_DIR
            .get_file(format!("{name}.json"))
            .ok_or_else(|| DeckError::UnknownBundled(name.to_string()))?;

        let text = file
            .contents_utf8()
            .ok_or_else(|| DeckError::UnknownBundled(name.to_string()))?;

        Self::from_json(name, text)
    }

    pub fn bundled_names() -> Vec<String> {
        let mut names: Vec<String> = DECK_DIR
            .files()
            .filter(|f| f.path().extension().is_some_and(|e| e == "json"))
            .filter_map(|f| f.path().file_stem())
            .map(|s| s.to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    /// Check the pairs the same way a session will, before any terminal setup
    pub fn validate(&self, policy: DuplicatePolicy) -> Result<(), DeckError> {
        PairSet::new(self.pairs.clone(), policy)?;
        Ok(())
    }
}
