//! Read-only aggregate queries over a cleaned [`MovieTable`].
//!
//! Genre-grouped queries run over the flattened view (one row per
//! movie/genre pair). Whole-table metrics use the movies themselves.
//! Ties in the "top n" queries keep source / first-appearance order.

use std::collections::{HashMap, HashSet};

use super::model::{MovieRecord, MovieTable};

pub const DEFAULT_TOP_N: usize = 10;

/// Numeric columns that take part in correlations and fits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NumericColumn {
    Score,
    RuntimeMin,
    Year,
}

impl NumericColumn {
    pub const ALL: [NumericColumn; 3] = [
        NumericColumn::Score,
        NumericColumn::RuntimeMin,
        NumericColumn::Year,
    ];

    pub fn label(self) -> &'static str {
        match self {
            NumericColumn::Score => "score",
            NumericColumn::RuntimeMin => "runtime_min",
            NumericColumn::Year => "year",
        }
    }

    pub fn value(self, movie: &MovieRecord) -> Option<f64> {
        match self {
            NumericColumn::Score => Some(movie.score),
            NumericColumn::RuntimeMin => movie.runtime_min,
            NumericColumn::Year => movie.year,
        }
    }
}

// ---------------------------------------------------------------------------
// Correlation matrix
// ---------------------------------------------------------------------------

/// Square Pearson matrix. `None` marks a pair with too little data to correlate.
#[derive(Debug, Clone, PartialEq)]
pub struct CorrelationMatrix {
    pub columns: Vec<NumericColumn>,
    values: Vec<Option<f64>>,
}

impl CorrelationMatrix {
    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        self.values[row * self.columns.len() + col]
    }

    pub fn size(&self) -> usize {
        self.columns.len()
    }
}

// ---------------------------------------------------------------------------
// Linear fit with confidence band
// ---------------------------------------------------------------------------

/// Ordinary least squares fit `y = intercept + slope * x`.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearFit {
    pub slope: f64,
    pub intercept: f64,
    pub n: usize,
    /// Residual standard error.
    pub sigma: f64,
    mean_x: f64,
    sxx: f64,
}

/// A point on the fitted line with its confidence interval for the mean response.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BandPoint {
    pub x: f64,
    pub fit: f64,
    pub lower: f64,
    pub upper: f64,
}

impl LinearFit {
    /// Least squares over `(x, y)` pairs. Needs at least three points and
    /// some spread in `x`.
    pub fn from_pairs(pairs: &[(f64, f64)]) -> Option<Self> {
        let n = pairs.len();
        if n < 3 {
            return None;
        }
        let nf = n as f64;
        let mean_x = pairs.iter().map(|p| p.0).sum::<f64>() / nf;
        let mean_y = pairs.iter().map(|p| p.1).sum::<f64>() / nf;
        let sxx: f64 = pairs.iter().map(|p| (p.0 - mean_x).powi(2)).sum();
        let sxy: f64 = pairs.iter().map(|p| (p.0 - mean_x) * (p.1 - mean_y)).sum();
        if sxx <= f64::EPSILON {
            return None;
        }

        let slope = sxy / sxx;
        let intercept = mean_y - slope * mean_x;
        let rss: f64 = pairs
            .iter()
            .map(|p| (p.1 - (intercept + slope * p.0)).powi(2))
            .sum();
        let sigma = (rss / (nf - 2.0)).sqrt();

        Some(LinearFit {
            slope,
            intercept,
            n,
            sigma,
            mean_x,
            sxx,
        })
    }

    pub fn predict(&self, x: f64) -> f64 {
        self.intercept + self.slope * x
    }

    /// Evaluate the line and a two-sided 95% confidence band at each `x`.
    pub fn band(&self, xs: impl IntoIterator<Item = f64>) -> Vec<BandPoint> {
        let t = t_critical_95(self.n - 2);
        let nf = self.n as f64;
        xs.into_iter()
            .map(|x| {
                let fit = self.predict(x);
                let se = self.sigma * (1.0 / nf + (x - self.mean_x).powi(2) / self.sxx).sqrt();
                BandPoint {
                    x,
                    fit,
                    lower: fit - t * se,
                    upper: fit + t * se,
                }
            })
            .collect()
    }
}

/// Two-sided 95% Student-t critical value for `df` degrees of freedom.
fn t_critical_95(df: usize) -> f64 {
    const TABLE: [f64; 30] = [
        12.706, 4.303, 3.182, 2.776, 2.571, 2.447, 2.365, 2.306, 2.262, 2.228, 2.201, 2.179,
        2.160, 2.145, 2.131, 2.120, 2.110, 2.101, 2.093, 2.086, 2.080, 2.074, 2.069, 2.064,
        2.060, 2.056, 2.052, 2.048, 2.045, 2.042,
    ];
    match df {
        0 => f64::INFINITY,
        1..=30 => TABLE[df - 1],
        31..=60 => 2.000,
        61..=120 => 1.980,
        _ => 1.960,
    }
}

// ---------------------------------------------------------------------------
// MovieStats – the query surface
// ---------------------------------------------------------------------------

/// Borrowing view that answers every aggregate the dashboard shows.
#[derive(Debug, Clone, Copy)]
pub struct MovieStats<'a> {
    table: &'a MovieTable,
}

impl<'a> MovieStats<'a> {
    pub fn new(table: &'a MovieTable) -> Self {
        Self { table }
    }

    pub fn total_count(&self) -> usize {
        self.table.len()
    }

    pub fn mean_score(&self) -> Option<f64> {
        mean(self.table.movies.iter().map(|m| m.score))
    }

    /// Mean over the movies that have a runtime.
    pub fn mean_runtime(&self) -> Option<f64> {
        mean(self.table.movies.iter().filter_map(|m| m.runtime_min))
    }

    pub fn unique_genre_count(&self) -> usize {
        self.table
            .flattened()
            .map(|(_, g)| g)
            .collect::<HashSet<_>>()
            .len()
    }

    /// `(year, count)` ascending by year; movies without a year are left out.
    /// Fractional years get their own bucket.
    pub fn year_histogram(&self) -> Vec<(f64, usize)> {
        let mut years: Vec<f64> = self.table.movies.iter().filter_map(|m| m.year).collect();
        years.sort_by(f64::total_cmp);

        let mut counts: Vec<(f64, usize)> = Vec::new();
        for year in years {
            match counts.last_mut() {
                Some((last, count)) if *last == year => *count += 1,
                _ => counts.push((year, 1)),
            }
        }
        counts
    }

    pub fn top_genres_by_count(&self, n: usize) -> Vec<(String, usize)> {
        let mut counts: Vec<(String, usize)> = self
            .genre_groups()
            .into_iter()
            .map(|(genre, scores)| (genre.to_string(), scores.len()))
            .collect();
        counts.sort_by(|a, b| b.1.cmp(&a.1));
        counts.truncate(n);
        counts
    }

    pub fn genres_by_mean_score(&self, n: usize) -> Vec<(String, f64)> {
        let mut means: Vec<(String, f64)> = self
            .genre_groups()
            .into_iter()
            .filter_map(|(genre, scores)| Some((genre.to_string(), mean(scores)?)))
            .collect();
        means.sort_by(|a, b| b.1.total_cmp(&a.1));
        means.truncate(n);
        means
    }

    pub fn top_movies_by_score(&self, n: usize) -> Vec<&'a MovieRecord> {
        let mut movies: Vec<&MovieRecord> = self.table.movies.iter().collect();
        movies.sort_by(|a, b| b.score.total_cmp(&a.score));
        movies.truncate(n);
        movies
    }

    /// Pearson correlation over pairwise-complete rows, diagonal fixed at 1.0.
    pub fn correlation_matrix(&self, columns: &[NumericColumn]) -> CorrelationMatrix {
        let k = columns.len();
        let mut values = vec![None; k * k];
        for i in 0..k {
            values[i * k + i] = Some(1.0);
            for j in (i + 1)..k {
                let r = pearson(&self.pairs(columns[i], columns[j]));
                values[i * k + j] = r;
                values[j * k + i] = r;
            }
        }
        CorrelationMatrix {
            columns: columns.to_vec(),
            values,
        }
    }

    pub fn linear_fit(&self, x: NumericColumn, y: NumericColumn) -> Option<LinearFit> {
        LinearFit::from_pairs(&self.pairs(x, y))
    }

    /// Rows where both columns are present.
    pub fn pairs(&self, x: NumericColumn, y: NumericColumn) -> Vec<(f64, f64)> {
        self.table
            .movies
            .iter()
            .filter_map(|m| Some((x.value(m)?, y.value(m)?)))
            .collect()
    }

    pub fn score_range(&self) -> Option<(f64, f64)> {
        min_max(self.table.movies.iter().map(|m| m.score))
    }

    pub fn year_range(&self) -> Option<(f64, f64)> {
        min_max(self.table.movies.iter().filter_map(|m| m.year))
    }

    /// Scores grouped by genre, in order of each genre's first appearance.
    fn genre_groups(&self) -> Vec<(&'a str, Vec<f64>)> {
        let mut index: HashMap<&str, usize> = HashMap::new();
        let mut groups: Vec<(&str, Vec<f64>)> = Vec::new();
        for (movie, genre) in self.table.flattened() {
            let slot = *index.entry(genre).or_insert_with(|| {
                groups.push((genre, Vec::new()));
                groups.len() - 1
            });
            groups[slot].1.push(movie.score);
        }
        groups
    }
}

fn mean(values: impl IntoIterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values
        .into_iter()
        .fold((0.0, 0usize), |(s, c), v| (s + v, c + 1));
    (count > 0).then(|| sum / count as f64)
}

fn min_max(values: impl Iterator<Item = f64>) -> Option<(f64, f64)> {
    values.fold(None, |acc, v| match acc {
        None => Some((v, v)),
        Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
    })
}

fn pearson(pairs: &[(f64, f64)]) -> Option<f64> {
    if pairs.len() < 2 {
        return None;
    }
    let n = pairs.len() as f64;
    let mean_x = pairs.iter().map(|p| p.0).sum::<f64>() / n;
    let mean_y = pairs.iter().map(|p| p.1).sum::<f64>() / n;
    let (mut sxy, mut sxx, mut syy) = (0.0, 0.0, 0.0);
    for &(x, y) in pairs {
        let dx = x - mean_x;
        let dy = y - mean_y;
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }
    if sxx <= 0.0 || syy <= 0.0 {
        return None;
    }
    Some((sxy / (sxx * syy).sqrt()).clamp(-1.0, 1.0))
}
