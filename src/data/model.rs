use std::collections::BTreeMap;
use std::fmt;

use super::clean::{GENRES, RUNTIME, SCORE, TITLE, YEAR};

// ---------------------------------------------------------------------------
// RawValue – a single cell as it came out of the source file
// ---------------------------------------------------------------------------

/// A dynamically-typed cell. CSV text stays `String`; JSON and Parquet
/// keep their native types.
#[derive(Debug, Clone, PartialEq)]
pub enum RawValue {
    String(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    /// A column that is already a sequence of strings (Parquet `List<Utf8>`, JSON arrays).
    List(Vec<String>),
    Null,
}

impl fmt::Display for RawValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawValue::String(s) => write!(f, "{s}"),
            RawValue::Integer(i) => write!(f, "{i}"),
            RawValue::Float(v) => write!(f, "{v}"),
            RawValue::Bool(b) => write!(f, "{b}"),
            RawValue::List(items) => write!(f, "{}", items.join(", ")),
            RawValue::Null => Ok(()),
        }
    }
}

// ---------------------------------------------------------------------------
// RawTable – loader output, columns exactly as in the source header
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    /// Column names in source order.
    pub column_names: Vec<String>,
    /// One map per source row: column_name → cell.
    pub rows: Vec<BTreeMap<String, RawValue>>,
}

impl RawTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_names.iter().any(|c| c == name)
    }
}

// ---------------------------------------------------------------------------
// MovieRecord – one cleaned row
// ---------------------------------------------------------------------------

/// A single movie after cleaning.
#[derive(Debug, Clone, PartialEq)]
pub struct MovieRecord {
    pub title: String,
    /// Release year; `None` when the source cell was not numeric.
    pub year: Option<f64>,
    /// Rating on a 0–10 scale.
    pub score: f64,
    pub runtime_min: Option<f64>,
    pub genres: Vec<String>,
    /// Source columns beyond the five required ones, kept for the raw data view.
    pub extra: BTreeMap<String, RawValue>,
}

impl MovieRecord {
    pub fn genres_joined(&self) -> String {
        self.genres.join(", ")
    }

    /// Display text for any source column; missing values render empty.
    pub fn cell_text(&self, column: &str) -> String {
        fn optional(value: Option<f64>) -> String {
            value.map(|v| v.to_string()).unwrap_or_default()
        }
        match column {
            TITLE => self.title.clone(),
            YEAR => optional(self.year),
            SCORE => self.score.to_string(),
            RUNTIME => optional(self.runtime_min),
            GENRES => self.genres_joined(),
            other => self.extra.get(other).map(|v| v.to_string()).unwrap_or_default(),
        }
    }
}

// ---------------------------------------------------------------------------
// MovieTable – the complete cleaned dataset
// ---------------------------------------------------------------------------

/// Cleaned movies in source order. Built once per load and never mutated.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MovieTable {
    pub movies: Vec<MovieRecord>,
    /// Every source column name, in source header order.
    pub column_names: Vec<String>,
}

impl MovieTable {
    pub fn new(movies: Vec<MovieRecord>, column_names: Vec<String>) -> Self {
        Self {
            movies,
            column_names,
        }
    }

    pub fn len(&self) -> usize {
        self.movies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.movies.is_empty()
    }

    /// One `(movie, genre)` pair per genre label of every movie.
    pub fn flattened(&self) -> impl Iterator<Item = (&MovieRecord, &str)> + '_ {
        self.movies
            .iter()
            .flat_map(|m| m.genres.iter().map(move |g| (m, g.as_str())))
    }
}
