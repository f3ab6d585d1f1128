use eframe::egui::{self, Color32, RichText, Ui};

use crate::data::clean::RowIssue;
use crate::state::{AppState, DashboardView, Tab};

/// Metric value with a fixed number of decimals and a unit, or `n/a`.
pub fn format_metric(value: Option<f64>, suffix: &str) -> String {
    match value {
        Some(v) => format!("{v:.1}{suffix}"),
        None => "n/a".to_string(),
    }
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        let dashboard = &state.dashboard;
        let file = dashboard
            .source
            .file_name()
            .map(|f| f.to_string_lossy().into_owned())
            .unwrap_or_default();
        ui.label(format!("{} movies loaded from {file}", dashboard.table.len()));
        if !dashboard.rejected.is_empty() {
            ui.label(
                RichText::new(format!("{} rows skipped", dashboard.rejected.len()))
                    .color(Color32::YELLOW),
            );
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open movie data")
        .add_filter("Supported files", &["csv", "json", "parquet", "pq"])
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        state.open(&path);
    }
}

// ---------------------------------------------------------------------------
// Metrics strip, tabs, footer
// ---------------------------------------------------------------------------

fn metric(ui: &mut Ui, label: &str, value: String) {
    ui.vertical(|ui: &mut Ui| {
        ui.label(RichText::new(label).weak());
        ui.label(RichText::new(value).size(28.0).strong());
    });
}

/// The four headline numbers.
pub fn metrics_strip(ui: &mut Ui, view: &DashboardView) {
    ui.columns(4, |cols: &mut [Ui]| {
        metric(&mut cols[0], "Total Movies", view.total_count.to_string());
        metric(&mut cols[1], "Avg Rating", format_metric(view.mean_score, "/10"));
        metric(&mut cols[2], "Avg Runtime", format_metric(view.mean_runtime, " mins"));
        metric(&mut cols[3], "Unique Genres", view.unique_genres.to_string());
    });
}

pub fn tab_bar(ui: &mut Ui, active: &mut Tab) {
    ui.horizontal(|ui: &mut Ui| {
        ui.selectable_value(active, Tab::Distributions, "Distributions");
        ui.selectable_value(active, Tab::Relationships, "Relationships");
        ui.selectable_value(active, Tab::TopPerformers, "Top Performers");
    });
}

/// Rows the cleaner dropped, with the reason.
pub fn rejected_rows(ui: &mut Ui, rejected: &[RowIssue]) {
    if rejected.is_empty() {
        return;
    }
    egui::CollapsingHeader::new(
        RichText::new(format!("Skipped Rows ({})", rejected.len())).color(Color32::YELLOW),
    )
    .id_salt("rejected_rows")
    .default_open(false)
    .show(ui, |ui: &mut Ui| {
        egui::ScrollArea::vertical()
            .max_height(200.0)
            .show(ui, |ui: &mut Ui| {
                for issue in rejected {
                    ui.monospace(issue.to_string());
                }
            });
    });
}

pub fn footer(ui: &mut Ui) {
    ui.vertical_centered(|ui: &mut Ui| {
        ui.label(RichText::new("Dashboard built with egui").italics().weak());
    });
}
