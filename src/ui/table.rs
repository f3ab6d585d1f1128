use eframe::egui::{self, RichText, Ui};
use egui_extras::{Column, TableBuilder};

use crate::color::{ColorRamp, contrast_text};
use crate::data::model::{MovieRecord, MovieTable};

const ROW_HEIGHT: f32 = 20.0;

fn optional<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

/// Title / year / score / genres, score cells shaded on a yellow-green ramp
/// spanning the scores shown.
pub fn top_movies_table(ui: &mut Ui, movies: &[MovieRecord]) {
    let ramp = ColorRamp::yellow_green();
    let (lo, hi) = movies.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), m| {
        (lo.min(m.score), hi.max(m.score))
    });

    ui.push_id("top_movies", |ui: &mut Ui| {
        TableBuilder::new(ui)
            .striped(true)
            .cell_layout(egui::Layout::left_to_right(egui::Align::Center))
            .column(Column::auto().at_least(180.0))
            .column(Column::auto().at_least(50.0))
            .column(Column::auto().at_least(60.0))
            .column(Column::remainder())
            .max_scroll_height(400.0)
            .header(ROW_HEIGHT, |mut header| {
                for title in ["Title", "Year", "Score", "Genres"] {
                    header.col(|ui: &mut Ui| {
                        ui.strong(title);
                    });
                }
            })
            .body(|mut body| {
                for movie in movies {
                    body.row(ROW_HEIGHT, |mut row| {
                        row.col(|ui: &mut Ui| {
                            ui.label(&movie.title);
                        });
                        row.col(|ui: &mut Ui| {
                            ui.label(optional(movie.year));
                        });
                        row.col(|ui: &mut Ui| {
                            let fill = ramp.sample_range(movie.score, lo, hi);
                            ui.painter().rect_filled(ui.max_rect(), 0.0, fill);
                            ui.label(
                                RichText::new(format!("{:.1}", movie.score)).color(contrast_text(fill)),
                            );
                        });
                        row.col(|ui: &mut Ui| {
                            ui.label(movie.genres_joined());
                        });
                    });
                }
            });
    });
}

/// Every cleaned row, columns in source header order.
pub fn raw_data_table(ui: &mut Ui, table: &MovieTable) {
    let headers = &table.column_names;

    ui.push_id("raw_data", |ui: &mut Ui| {
        egui::ScrollArea::horizontal().show(ui, |ui: &mut Ui| {
            TableBuilder::new(ui)
                .striped(true)
                .resizable(true)
                .cell_layout(egui::Layout::left_to_right(egui::Align::Center))
                .columns(Column::auto().at_least(60.0), headers.len())
                .max_scroll_height(400.0)
                .header(ROW_HEIGHT, |mut header| {
                    for name in headers {
                        header.col(|ui: &mut Ui| {
                            ui.strong(name.as_str());
                        });
                    }
                })
                .body(|body| {
                    body.rows(ROW_HEIGHT, table.len(), |mut row| {
                        let movie = &table.movies[row.index()];
                        for name in headers {
                            row.col(|ui: &mut Ui| {
                                ui.label(movie.cell_text(name));
                            });
                        }
                    });
                });
        });
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_cells_render_empty() {
        assert_eq!(optional::<f64>(None), "");
        assert_eq!(optional(Some(1999.0)), "1999");
        assert_eq!(optional(Some(96.5)), "96.5");
    }
}
