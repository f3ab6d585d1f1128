use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::config::Config;
use crate::data::clean::{CleanPolicy, RowIssue, clean_table};
use crate::data::loader::load_file;
use crate::data::model::{MovieRecord, MovieTable};
use crate::data::stats::{CorrelationMatrix, LinearFit, MovieStats, NumericColumn};

// ---------------------------------------------------------------------------
// Dashboard snapshot
// ---------------------------------------------------------------------------

/// Everything the presenter draws, computed once from an immutable table.
#[derive(Debug, Clone)]
pub struct Dashboard {
    pub source: PathBuf,
    pub table: MovieTable,
    pub rejected: Vec<RowIssue>,
    pub view: DashboardView,
}

#[derive(Debug, Clone)]
pub struct DashboardView {
    pub total_count: usize,
    pub mean_score: Option<f64>,
    pub mean_runtime: Option<f64>,
    pub unique_genres: usize,
    pub year_histogram: Vec<(f64, usize)>,
    pub top_genres: Vec<(String, usize)>,
    pub correlations: CorrelationMatrix,
    pub year_score_fit: Option<LinearFit>,
    /// Best first.
    pub top_movies: Vec<MovieRecord>,
    pub genre_scores: Vec<(String, f64)>,
    pub score_range: Option<(f64, f64)>,
    pub year_range: Option<(f64, f64)>,
}

impl DashboardView {
    pub fn build(table: &MovieTable, top_n: usize) -> Self {
        let stats = MovieStats::new(table);
        let view = DashboardView {
            total_count: stats.total_count(),
            mean_score: stats.mean_score(),
            mean_runtime: stats.mean_runtime(),
            unique_genres: stats.unique_genre_count(),
            year_histogram: stats.year_histogram(),
            top_genres: stats.top_genres_by_count(top_n),
            correlations: stats.correlation_matrix(&NumericColumn::ALL),
            year_score_fit: stats.linear_fit(NumericColumn::Year, NumericColumn::Score),
            top_movies: stats.top_movies_by_score(top_n).into_iter().cloned().collect(),
            genre_scores: stats.genres_by_mean_score(top_n),
            score_range: stats.score_range(),
            year_range: stats.year_range(),
        };
        log::debug!(
            "Dashboard view: {} movies, {} years, {} genres",
            view.total_count,
            view.year_histogram.len(),
            view.unique_genres
        );
        view
    }
}

/// Load → clean → aggregate. Each call starts from the file again.
pub fn run_pipeline(path: &Path, policy: CleanPolicy, top_n: usize) -> Result<Dashboard> {
    let raw = load_file(path)?;
    let cleaned = clean_table(&raw, policy)
        .with_context(|| format!("cleaning {}", path.display()))?;
    let view = DashboardView::build(&cleaned.table, top_n);
    Ok(Dashboard {
        source: path.to_path_buf(),
        table: cleaned.table,
        rejected: cleaned.rejected,
        view,
    })
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    #[default]
    Distributions,
    Relationships,
    TopPerformers,
}

/// The full UI state, independent of rendering.
pub struct AppState {
    pub config: Config,

    /// The loaded dashboard. Replaced wholesale on reload, never patched.
    pub dashboard: Dashboard,

    pub active_tab: Tab,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    pub fn new(config: Config, dashboard: Dashboard) -> Self {
        Self {
            config,
            dashboard,
            active_tab: Tab::default(),
            status_message: None,
        }
    }

    /// Re-run the pipeline for another file. On failure the current
    /// dashboard stays and the error goes to the status bar.
    pub fn open(&mut self, path: &Path) {
        match run_pipeline(path, self.config.clean_policy(), self.config.top) {
            Ok(dashboard) => {
                self.dashboard = dashboard;
                self.status_message = None;
            }
            Err(e) => {
                log::error!("Failed to load {}: {e:#}", path.display());
                self.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }
}
