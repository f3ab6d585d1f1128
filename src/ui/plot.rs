use std::collections::BTreeMap;
use std::ops::RangeInclusive;

use eframe::egui::{Color32, RichText, Stroke, Ui};
use egui_plot::{
    Bar, BarChart, GridMark, Legend, Line, Plot, PlotPoint, PlotPoints, Points, Polygon, Text,
    uniform_grid_spacer,
};

use crate::color::{ColorRamp, contrast_text};
use crate::data::model::MovieTable;
use crate::data::stats::{CorrelationMatrix, LinearFit};

const CHART_HEIGHT: f32 = 280.0;
const MIN_RADIUS: f32 = 3.0;
const MAX_RADIUS: f32 = 9.0;
const BAND_SEGMENTS: usize = 40;
const YEAR_BUCKETS: usize = 8;
const SIZE_BUCKETS: usize = 4;

/// Axis labels for categorical charts: integer ticks index into `labels`.
fn category_formatter(labels: Vec<String>) -> impl Fn(GridMark, &RangeInclusive<f64>) -> String {
    move |mark, _range| {
        let v = mark.value;
        if v < -0.01 || (v - v.round()).abs() > 0.01 {
            return String::new();
        }
        labels.get(v.round() as usize).cloned().unwrap_or_default()
    }
}

fn static_plot(id: &str) -> Plot {
    Plot::new(id)
        .height(CHART_HEIGHT)
        .allow_drag(false)
        .allow_scroll(false)
        .allow_zoom(false)
        .allow_boxed_zoom(false)
}

// ---------------------------------------------------------------------------
// Distributions tab
// ---------------------------------------------------------------------------

/// Vertical bars: one per release year, ascending.
pub fn year_histogram_chart(ui: &mut Ui, histogram: &[(f64, usize)]) {
    let colors = ColorRamp::viridis().discrete(histogram.len());
    let bars: Vec<Bar> = histogram
        .iter()
        .zip(colors)
        .map(|(&(year, count), color)| {
            Bar::new(year, count as f64)
                .name(year)
                .fill(color)
                .width(0.8)
        })
        .collect();

    static_plot("year_histogram")
        .x_axis_label("Release Year")
        .y_axis_label("Number of Movies")
        .include_y(0.0)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).name("Movies"));
        });
}

/// Horizontal bars for `(label, value)` pairs, first pair drawn on top.
fn ranked_bar_chart(
    ui: &mut Ui,
    id: &str,
    entries: &[(String, f64)],
    ramp: ColorRamp,
    value_label: &str,
    category_label: &str,
) {
    let n = entries.len();
    let colors = ramp.discrete(n);
    // Bar i sits at y = n - 1 - i so the ranking reads top-down.
    let mut labels = vec![String::new(); n];
    let bars: Vec<Bar> = entries
        .iter()
        .zip(colors)
        .enumerate()
        .map(|(i, ((label, value), color))| {
            let slot = n - 1 - i;
            labels[slot] = label.clone();
            Bar::new(slot as f64, *value)
                .name(label)
                .fill(color)
                .width(0.7)
        })
        .collect();

    static_plot(id)
        .x_axis_label(value_label)
        .y_axis_label(category_label)
        .include_x(0.0)
        .y_grid_spacer(uniform_grid_spacer(|_| [1.0, 5.0, 10.0]))
        .y_axis_formatter(category_formatter(labels))
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).horizontal().name(value_label));
        });
}

pub fn genre_count_chart(ui: &mut Ui, counts: &[(String, usize)]) {
    let entries: Vec<(String, f64)> = counts.iter().map(|(g, c)| (g.clone(), *c as f64)).collect();
    ranked_bar_chart(ui, "genre_counts", &entries, ColorRamp::rocket(), "Count", "Genre");
}

// ---------------------------------------------------------------------------
// Relationships tab
// ---------------------------------------------------------------------------

/// Which of `buckets` equal slices of `lo..=hi` holds `value`.
fn bucket_of(value: f64, lo: f64, hi: f64, buckets: usize) -> usize {
    if hi - lo <= f64::EPSILON {
        return buckets / 2;
    }
    let t = ((value - lo) / (hi - lo)).clamp(0.0, 1.0);
    ((t * buckets as f64) as usize).min(buckets - 1)
}

/// Scatter key: year bucket (`None` without a year), then size bucket.
type ScatterKey = (Option<usize>, usize);

/// `[runtime, score]` points grouped so each group is drawn as one series.
/// Movies without a runtime are left out.
fn scatter_buckets(
    table: &MovieTable,
    year_range: Option<(f64, f64)>,
    score_range: Option<(f64, f64)>,
) -> BTreeMap<ScatterKey, Vec<[f64; 2]>> {
    let (score_lo, score_hi) = score_range.unwrap_or((0.0, 10.0));
    let mut buckets: BTreeMap<ScatterKey, Vec<[f64; 2]>> = BTreeMap::new();
    for movie in &table.movies {
        let Some(runtime) = movie.runtime_min else {
            continue;
        };
        let year_bucket = match (movie.year, year_range) {
            (Some(year), Some((lo, hi))) => Some(bucket_of(year, lo, hi, YEAR_BUCKETS)),
            _ => None,
        };
        let size_bucket = bucket_of(movie.score, score_lo, score_hi, SIZE_BUCKETS);
        buckets
            .entry((year_bucket, size_bucket))
            .or_default()
            .push([runtime, movie.score]);
    }
    buckets
}

fn year_bucket_label(bucket: usize, (lo, hi): (f64, f64)) -> String {
    let step = (hi - lo) / YEAR_BUCKETS as f64;
    let start = lo + step * bucket as f64;
    format!("{:.0}–{:.0}", start, start + step)
}

/// Runtime against score. Colour follows release year, radius follows score.
pub fn runtime_score_scatter(
    ui: &mut Ui,
    table: &MovieTable,
    year_range: Option<(f64, f64)>,
    score_range: Option<(f64, f64)>,
) {
    let colors = ColorRamp::mako().discrete(YEAR_BUCKETS);
    let buckets = scatter_buckets(table, year_range, score_range);

    static_plot("runtime_vs_score")
        .x_axis_label("Runtime (minutes)")
        .y_axis_label("Rating")
        .allow_drag(true)
        .allow_zoom(true)
        .show(ui, |plot_ui| {
            for ((year_bucket, size_bucket), points) in buckets {
                let (color, name) = match (year_bucket, year_range) {
                    (Some(b), Some(range)) => (colors[b], year_bucket_label(b, range)),
                    _ => (Color32::GRAY, "Unknown year".to_string()),
                };
                let t = (size_bucket as f32 + 0.5) / SIZE_BUCKETS as f32;
                plot_ui.points(
                    Points::new(PlotPoints::new(points))
                        .name(name)
                        .radius(MIN_RADIUS + t * (MAX_RADIUS - MIN_RADIUS))
                        .color(color)
                        .filled(true),
                );
            }
        });

    if let Some(range) = year_range {
        ui.horizontal_wrapped(|ui: &mut Ui| {
            ui.label("Year:");
            for (b, color) in colors.into_iter().enumerate() {
                ui.label(RichText::new(format!("■ {}", year_bucket_label(b, range))).color(color));
            }
        });
    }
}

/// Year against score with the fitted line and its 95% confidence band.
pub fn year_score_trend(ui: &mut Ui, table: &MovieTable, fit: Option<&LinearFit>) {
    let points: PlotPoints = table
        .movies
        .iter()
        .filter_map(|m| Some([m.year?, m.score]))
        .collect();
    let x_range = table
        .movies
        .iter()
        .filter_map(|m| m.year)
        .fold(None, |acc: Option<(f64, f64)>, y| match acc {
            None => Some((y, y)),
            Some((lo, hi)) => Some((lo.min(y), hi.max(y))),
        });

    let band_color = Color32::from_rgba_unmultiplied(76, 114, 176, 60);
    let line_color = Color32::from_rgb(76, 114, 176);

    static_plot("year_vs_score")
        .legend(Legend::default())
        .x_axis_label("Release Year")
        .y_axis_label("Rating")
        .show(ui, |plot_ui| {
            plot_ui.points(
                Points::new(points)
                    .name("Movies")
                    .radius(3.5)
                    .color(line_color)
                    .filled(true),
            );

            let (Some(fit), Some((lo, hi))) = (fit, x_range) else {
                return;
            };
            let xs = (0..=BAND_SEGMENTS).map(|i| lo + (hi - lo) * i as f64 / BAND_SEGMENTS as f64);
            let band = fit.band(xs);

            // One quad per segment keeps every polygon convex.
            for pair in band.windows(2) {
                let (a, b) = (pair[0], pair[1]);
                plot_ui.polygon(
                    Polygon::new(PlotPoints::new(vec![
                        [a.x, a.lower],
                        [b.x, b.lower],
                        [b.x, b.upper],
                        [a.x, a.upper],
                    ]))
                    .name("95% CI")
                    .fill_color(band_color)
                    .stroke(Stroke::NONE),
                );
            }

            let line: PlotPoints = band.iter().map(|p| [p.x, p.fit]).collect();
            plot_ui.line(
                Line::new(line)
                    .name(format!("y = {:.3}x + {:.2}", fit.slope, fit.intercept))
                    .color(line_color)
                    .width(2.0),
            );
        });
}

/// Annotated heatmap of the correlation matrix, first column at top-left.
pub fn correlation_heatmap(ui: &mut Ui, matrix: &CorrelationMatrix) {
    let ramp = ColorRamp::coolwarm();
    let k = matrix.size();
    let names: Vec<String> = matrix.columns.iter().map(|c| c.label().to_string()).collect();
    let row_names: Vec<String> = names.iter().rev().cloned().collect();

    static_plot("correlations")
        .data_aspect(1.0)
        .show_grid(false)
        .x_grid_spacer(uniform_grid_spacer(|_| [1.0, 5.0, 10.0]))
        .y_grid_spacer(uniform_grid_spacer(|_| [1.0, 5.0, 10.0]))
        .x_axis_formatter(category_formatter(names))
        .y_axis_formatter(category_formatter(row_names))
        .show(ui, |plot_ui| {
            for i in 0..k {
                for j in 0..k {
                    let x = j as f64;
                    let y = (k - 1 - i) as f64;
                    let value = matrix.get(i, j);
                    let fill = value.map_or(Color32::DARK_GRAY, |r| ramp.sample_range(r, -1.0, 1.0));

                    plot_ui.polygon(
                        Polygon::new(PlotPoints::new(vec![
                            [x - 0.5, y - 0.5],
                            [x + 0.5, y - 0.5],
                            [x + 0.5, y + 0.5],
                            [x - 0.5, y + 0.5],
                        ]))
                        .fill_color(fill)
                        .stroke(Stroke::new(1.0, Color32::WHITE)),
                    );

                    let label = value.map_or_else(|| "n/a".to_string(), |r| format!("{r:.2}"));
                    plot_ui.text(Text::new(
                        PlotPoint::new(x, y),
                        RichText::new(label).strong().color(contrast_text(fill)),
                    ));
                }
            }
        });
}

// ---------------------------------------------------------------------------
// Top performers tab
// ---------------------------------------------------------------------------

pub fn genre_score_chart(ui: &mut Ui, scores: &[(String, f64)]) {
    ranked_bar_chart(ui, "genre_scores", scores, ColorRamp::plasma(), "Average Rating", "Genre");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mark(value: f64) -> GridMark {
        GridMark {
            value,
            step_size: 1.0,
        }
    }

    #[test]
    fn scatter_series_count_is_bounded_and_keeps_every_point() {
        use crate::data::model::MovieRecord;

        let movies: Vec<MovieRecord> = (0..500)
            .map(|i| MovieRecord {
                title: format!("Movie {i}"),
                year: (i % 50 != 0).then_some(1950.0 + (i % 70) as f64),
                score: 1.0 + (i % 90) as f64 / 10.0,
                runtime_min: (i % 40 != 3).then_some(80.0 + (i % 60) as f64),
                genres: vec!["Drama".into()],
                extra: Default::default(),
            })
            .collect();
        let with_runtime = movies.iter().filter(|m| m.runtime_min.is_some()).count();
        let table = MovieTable::new(movies, Vec::new());

        let buckets = scatter_buckets(&table, Some((1950.0, 2019.0)), Some((1.0, 9.9)));
        assert!(buckets.len() <= (YEAR_BUCKETS + 1) * SIZE_BUCKETS);
        assert_eq!(buckets.values().map(Vec::len).sum::<usize>(), with_runtime);
        assert!(buckets.keys().any(|(year, _)| year.is_none()));
    }

    #[test]
    fn bucket_edges_land_in_first_and_last_slices() {
        assert_eq!(bucket_of(1950.0, 1950.0, 2020.0, YEAR_BUCKETS), 0);
        assert_eq!(bucket_of(2020.0, 1950.0, 2020.0, YEAR_BUCKETS), YEAR_BUCKETS - 1);
        assert_eq!(bucket_of(7.0, 7.0, 7.0, SIZE_BUCKETS), SIZE_BUCKETS / 2);
        assert_eq!(year_bucket_label(0, (1950.0, 2030.0)), "1950–1960");
    }

    #[test]
    fn category_ticks_map_to_labels() {
        let fmt = category_formatter(vec!["Drama".into(), "Comedy".into()]);
        let range = 0.0..=1.0;
        assert_eq!(fmt(mark(0.0), &range), "Drama");
        assert_eq!(fmt(mark(1.0), &range), "Comedy");
        assert_eq!(fmt(mark(0.5), &range), "");
        assert_eq!(fmt(mark(-1.0), &range), "");
        assert_eq!(fmt(mark(2.0), &range), "");
    }
}
