use eframe::egui::{self, Ui};

use crate::state::{AppState, Tab};
use crate::ui::{panels, plot, table};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct MovieDashboardApp {
    pub state: AppState,
}

impl MovieDashboardApp {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }
}

impl eframe::App for MovieDashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Bottom panel: footer ----
        egui::TopBottomPanel::bottom("footer").show(ctx, |ui| {
            panels::footer(ui);
        });

        // ---- Central panel: metrics, tabs, raw data ----
        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical()
                .auto_shrink([false, false])
                .show(ui, |ui: &mut Ui| {
                    dashboard_body(ui, &mut self.state);
                });
        });
    }
}

fn dashboard_body(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Movie Analytics Dashboard");
    ui.add_space(8.0);

    ui.strong("Key Statistics");
    panels::metrics_strip(ui, &state.dashboard.view);
    ui.separator();

    panels::tab_bar(ui, &mut state.active_tab);
    ui.separator();

    let dashboard = &state.dashboard;
    if dashboard.table.is_empty() {
        ui.label(format!("No movies to chart in {}", dashboard.source.display()));
    } else {
        tab_contents(ui, state);
    }

    ui.separator();
    ui.strong("Data Exploration");
    panels::rejected_rows(ui, &dashboard.rejected);
    egui::CollapsingHeader::new("Show Raw Data Table")
        .id_salt("raw_data")
        .default_open(false)
        .show(ui, |ui: &mut Ui| {
            table::raw_data_table(ui, &dashboard.table);
        });
}

fn tab_contents(ui: &mut Ui, state: &AppState) {
    let dashboard = &state.dashboard;
    let view = &dashboard.view;
    match state.active_tab {
        Tab::Distributions => {
            ui.strong("Movie Releases by Year");
            plot::year_histogram_chart(ui, &view.year_histogram);
            ui.add_space(12.0);
            ui.strong("Genre Distribution");
            plot::genre_count_chart(ui, &view.top_genres);
        }
        Tab::Relationships => {
            ui.strong("Runtime vs Rating");
            plot::runtime_score_scatter(ui, &dashboard.table, view.year_range, view.score_range);
            ui.add_space(12.0);
            ui.strong("Year vs Rating");
            plot::year_score_trend(ui, &dashboard.table, view.year_score_fit.as_ref());
            ui.add_space(12.0);
            ui.strong("Feature Correlations");
            plot::correlation_heatmap(ui, &view.correlations);
        }
        Tab::TopPerformers => {
            ui.strong(format!("Top {} Movies by Rating", state.config.top));
            table::top_movies_table(ui, &view.top_movies);
            ui.add_space(12.0);
            ui.strong("Top Genres by Average Rating");
            plot::genre_score_chart(ui, &view.genre_scores);
        }
    }
}
