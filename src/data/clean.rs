use std::collections::BTreeMap;
use std::fmt;

use thiserror::Error;

use super::genres::decode_genres;
use super::model::{MovieRecord, MovieTable, RawTable, RawValue};

pub const TITLE: &str = "title";
pub const YEAR: &str = "year";
pub const SCORE: &str = "score";
pub const RUNTIME: &str = "runtime_min";
pub const GENRES: &str = "genres";

pub const REQUIRED_COLUMNS: [&str; 5] = [TITLE, YEAR, SCORE, RUNTIME, GENRES];

// ---------------------------------------------------------------------------
// Policy, row issues, errors
// ---------------------------------------------------------------------------

/// What to do with a row whose `genres` or `score` cannot be decoded.
/// An empty `genres` cell counts as undecodable.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CleanPolicy {
    /// Drop the row and report it in [`CleanedTable::rejected`].
    #[default]
    Lenient,
    /// Abort the whole clean on the first bad row.
    Strict,
}

/// A row that could not be cleaned. `row` is the 0-based data row index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowIssue {
    pub row: usize,
    pub column: &'static str,
    pub message: String,
}

impl fmt::Display for RowIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "row {}, column '{}': {}", self.row, self.column, self.message)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CleanError {
    #[error("required column '{0}' is missing")]
    MissingColumn(&'static str),
    #[error("{0}")]
    Row(RowIssue),
}

/// Cleaner output: the kept movies plus every row that was dropped.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CleanedTable {
    pub table: MovieTable,
    pub rejected: Vec<RowIssue>,
}

// ---------------------------------------------------------------------------
// Per-cell coercion
// ---------------------------------------------------------------------------

/// Numeric coercion that never fails: anything unparseable becomes `None`.
pub fn coerce_numeric(value: &RawValue) -> Option<f64> {
    let v = match value {
        RawValue::Integer(i) => *i as f64,
        RawValue::Float(f) => *f,
        RawValue::String(s) => s.trim().parse::<f64>().ok()?,
        RawValue::Bool(_) | RawValue::List(_) | RawValue::Null => return None,
    };
    v.is_finite().then_some(v)
}

fn genres_cell(value: &RawValue) -> Result<Vec<String>, String> {
    match value {
        RawValue::List(items) => Ok(items.clone()),
        RawValue::String(s) => decode_genres(s).map_err(|e| format!("{e} in {s:?}")),
        RawValue::Null => Err("missing genre list".to_string()),
        other => Err(format!("expected a list literal, found {other:?}")),
    }
}

// ---------------------------------------------------------------------------
// Table cleaning
// ---------------------------------------------------------------------------

/// Turn the loader's raw table into a [`MovieTable`].
///
/// Pure: the same raw table and policy always produce the same result.
pub fn clean_table(raw: &RawTable, policy: CleanPolicy) -> Result<CleanedTable, CleanError> {
    if let Some(missing) = REQUIRED_COLUMNS.iter().find(|c| !raw.has_column(c)) {
        return Err(CleanError::MissingColumn(*missing));
    }

    let extra_columns: Vec<String> = raw
        .column_names
        .iter()
        .filter(|c| !REQUIRED_COLUMNS.contains(&c.as_str()))
        .cloned()
        .collect();

    let mut movies = Vec::with_capacity(raw.len());
    let mut rejected = Vec::new();

    for (row_no, row) in raw.rows.iter().enumerate() {
        match clean_row(row_no, row, &extra_columns) {
            Ok(movie) => movies.push(movie),
            Err(issue) => match policy {
                CleanPolicy::Strict => return Err(CleanError::Row(issue)),
                CleanPolicy::Lenient => {
                    log::warn!("Dropping {issue}");
                    rejected.push(issue);
                }
            },
        }
    }

    log::info!("Cleaned {} movies, rejected {} rows", movies.len(), rejected.len());

    Ok(CleanedTable {
        table: MovieTable::new(movies, raw.column_names.clone()),
        rejected,
    })
}

fn clean_row(
    row_no: usize,
    row: &BTreeMap<String, RawValue>,
    extra_columns: &[String],
) -> Result<MovieRecord, RowIssue> {
    let cell = |col: &str| row.get(col).unwrap_or(&RawValue::Null);

    let genres = genres_cell(cell(GENRES)).map_err(|message| RowIssue {
        row: row_no,
        column: GENRES,
        message,
    })?;

    let score = coerce_numeric(cell(SCORE)).ok_or_else(|| RowIssue {
        row: row_no,
        column: SCORE,
        message: format!("'{}' is not a number", cell(SCORE)),
    })?;

    let extra = extra_columns
        .iter()
        .map(|c| (c.clone(), cell(c).clone()))
        .collect();

    Ok(MovieRecord {
        title: cell(TITLE).to_string(),
        year: coerce_numeric(cell(YEAR)),
        score,
        runtime_min: coerce_numeric(cell(RUNTIME)),
        genres,
        extra,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::loader::load_csv_str;

    const SCENARIO: &str = "\
title,year,score,runtime_min,genres
A,2000,8.0,90,['Drama']
B,2000,6.0,bad,\"['Drama','Comedy']\"
";

    #[test]
    fn numeric_coercion_maps_garbage_to_none() {
        assert_eq!(coerce_numeric(&RawValue::String(" 90 ".into())), Some(90.0));
        assert_eq!(coerce_numeric(&RawValue::String("bad".into())), None);
        assert_eq!(coerce_numeric(&RawValue::String("".into())), None);
        assert_eq!(coerce_numeric(&RawValue::String("NaN".into())), None);
        assert_eq!(coerce_numeric(&RawValue::Float(f64::INFINITY)), None);
        assert_eq!(coerce_numeric(&RawValue::Integer(120)), Some(120.0));
        assert_eq!(coerce_numeric(&RawValue::Null), None);
        assert_eq!(coerce_numeric(&RawValue::Bool(true)), None);
    }

    #[test]
    fn fractional_years_are_kept() {
        let raw = load_csv_str(
            "title,year,score,runtime_min,genres\n\
             Half,1999.5,7.0,90,['Drama']\n\
             Roman,MCMXC,6.0,90,['Drama']\n",
        )
        .unwrap();
        let cleaned = clean_table(&raw, CleanPolicy::Strict).unwrap();
        assert_eq!(cleaned.table.movies[0].year, Some(1999.5));
        assert_eq!(cleaned.table.movies[1].year, None);
    }

    #[test]
    fn numeric_looking_titles_stay_verbatim() {
        let raw = load_csv_str(
            "title,year,score,runtime_min,genres\n\
             2.0,2000,7.0,90,['Drama']\n\
             Infinity,2001,6.5,95,['Sci-Fi']\n\
             007,1962,7.2,110,['Action']\n",
        )
        .unwrap();
        let cleaned = clean_table(&raw, CleanPolicy::Strict).unwrap();
        let titles: Vec<&str> = cleaned.table.movies.iter().map(|m| m.title.as_str()).collect();
        assert_eq!(titles, vec!["2.0", "Infinity", "007"]);
    }

    #[test]
    fn scenario_rows_clean_to_sequences_and_nulls() {
        let raw = load_csv_str(SCENARIO).unwrap();
        let cleaned = clean_table(&raw, CleanPolicy::Strict).unwrap();
        assert!(cleaned.rejected.is_empty());

        let movies = &cleaned.table.movies;
        assert_eq!(movies.len(), 2);
        assert_eq!(movies[0].genres, vec!["Drama"]);
        assert_eq!(movies[1].genres, vec!["Drama", "Comedy"]);
        assert_eq!(movies[0].runtime_min, Some(90.0));
        assert_eq!(movies[1].runtime_min, None);
        assert_eq!(movies[1].year, Some(2000.0));
        assert_eq!(movies[1].score, 6.0);
    }

    #[test]
    fn cleaning_is_a_pure_function_of_the_raw_table() {
        let raw = load_csv_str(SCENARIO).unwrap();
        let first = clean_table(&raw, CleanPolicy::Lenient).unwrap();
        let second = clean_table(&raw, CleanPolicy::Lenient).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn lenient_policy_drops_and_reports_bad_rows() {
        let raw = load_csv_str(
            "title,year,score,runtime_min,genres\n\
             Good,1999,7.5,100,['Drama']\n\
             BadGenres,2001,6.0,95,Drama\n\
             BadScore,2002,n/a,80,['Comedy']\n",
        )
        .unwrap();
        let cleaned = clean_table(&raw, CleanPolicy::Lenient).unwrap();

        assert_eq!(cleaned.table.len(), 1);
        assert_eq!(cleaned.table.movies[0].title, "Good");
        let issues: Vec<(usize, &str)> = cleaned
            .rejected
            .iter()
            .map(|i| (i.row, i.column))
            .collect();
        assert_eq!(issues, vec![(1, GENRES), (2, SCORE)]);
    }

    #[test]
    fn strict_policy_aborts_on_first_bad_row() {
        let raw = load_csv_str(
            "title,year,score,runtime_min,genres\n\
             BadGenres,2001,6.0,95,Drama\n",
        )
        .unwrap();
        let err = clean_table(&raw, CleanPolicy::Strict).unwrap_err();
        assert!(matches!(err, CleanError::Row(RowIssue { row: 0, column: GENRES, .. })));
    }

    const EMPTY_GENRES: &str = "\
title,year,score,runtime_min,genres
Blank,2003,6.1,101,
Fine,2004,7.0,99,['Comedy']
";

    #[test]
    fn empty_genres_cell_aborts_strict_clean() {
        let raw = load_csv_str(EMPTY_GENRES).unwrap();
        let err = clean_table(&raw, CleanPolicy::Strict).unwrap_err();
        assert!(matches!(err, CleanError::Row(RowIssue { row: 0, column: GENRES, .. })));
    }

    #[test]
    fn empty_genres_cell_is_reported_when_lenient() {
        let raw = load_csv_str(EMPTY_GENRES).unwrap();
        let cleaned = clean_table(&raw, CleanPolicy::Lenient).unwrap();
        assert_eq!(cleaned.table.len(), 1);
        assert_eq!(cleaned.table.movies[0].title, "Fine");
        assert_eq!(cleaned.rejected.len(), 1);
        assert_eq!(cleaned.rejected[0].column, GENRES);
        assert_eq!(cleaned.rejected[0].message, "missing genre list");
    }

    #[test]
    fn missing_required_column_is_fatal() {
        let raw = load_csv_str("title,year,score,genres\nA,2000,8.0,['Drama']\n").unwrap();
        assert_eq!(
            clean_table(&raw, CleanPolicy::Lenient),
            Err(CleanError::MissingColumn(RUNTIME))
        );
    }

    #[test]
    fn extra_columns_are_carried_through() {
        let raw = load_csv_str(
            "title,director,year,score,runtime_min,genres\n\
             A,Someone,2000,8.0,90,['Drama']\n",
        )
        .unwrap();
        let cleaned = clean_table(&raw, CleanPolicy::Strict).unwrap();
        assert_eq!(
            cleaned.table.column_names,
            vec!["title", "director", "year", "score", "runtime_min", "genres"]
        );
        assert_eq!(
            cleaned.table.movies[0].extra.get("director"),
            Some(&RawValue::String("Someone".into()))
        );
    }

    #[test]
    fn list_genre_cells_need_no_decoding_but_null_ones_are_rejected() {
        let mut row = BTreeMap::new();
        row.insert(TITLE.to_string(), RawValue::String("A".into()));
        row.insert(YEAR.to_string(), RawValue::Integer(2010));
        row.insert(SCORE.to_string(), RawValue::Float(7.1));
        row.insert(RUNTIME.to_string(), RawValue::Null);
        row.insert(GENRES.to_string(), RawValue::List(vec!["Horror".into()]));
        let mut second = row.clone();
        second.insert(GENRES.to_string(), RawValue::Null);

        let raw = RawTable {
            column_names: REQUIRED_COLUMNS.iter().map(|c| c.to_string()).collect(),
            rows: vec![row, second],
        };
        let cleaned = clean_table(&raw, CleanPolicy::Lenient).unwrap();
        assert_eq!(cleaned.table.movies[0].genres, vec!["Horror"]);
        assert_eq!(cleaned.table.len(), 1);
        assert_eq!(cleaned.rejected[0].row, 1);
    }
}
