use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{Float64Builder, Int64Builder, ListBuilder, StringArray, StringBuilder};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use arrow::util::pretty::pretty_format_batches;
use parquet::arrow::ArrowWriter;
use serde::Serialize;

const GENRES: [&str; 14] = [
    "Action", "Adventure", "Animation", "Comedy", "Crime", "Drama", "Family", "Fantasy",
    "Horror", "Mystery", "Romance", "Sci-Fi", "Thriller", "War",
];

const WORDS: [&str; 24] = [
    "Midnight", "Iron", "Silent", "Golden", "Last", "Broken", "Crimson", "Hidden", "Northern",
    "Paper", "Electric", "Wild", "River", "Empire", "Garden", "Signal", "Harbor", "Storm",
    "Echo", "Mirror", "Frontier", "Orchard", "Lantern", "Voyage",
];

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    fn below(&mut self, n: usize) -> usize {
        (self.next_f64() * n as f64) as usize % n
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

struct SampleMovie {
    title: String,
    year: Option<i64>,
    score: f64,
    runtime_min: Option<f64>,
    genres: Vec<String>,
}

/// CSV row: year and runtime stay text so malformed cells can be written.
#[derive(Serialize)]
struct CsvRow<'a> {
    title: &'a str,
    year: String,
    score: String,
    runtime_min: String,
    genres: String,
}

fn list_literal(items: &[String]) -> String {
    let quoted: Vec<String> = items
        .iter()
        .map(|g| format!("'{}'", g.replace('\\', "\\\\").replace('\'', "\\'")))
        .collect();
    format!("[{}]", quoted.join(", "))
}

fn generate_movies(rng: &mut SimpleRng, count: usize) -> Vec<SampleMovie> {
    (0..count)
        .map(|i| {
            let title = format!(
                "The {} {}",
                WORDS[rng.below(WORDS.len())],
                WORDS[rng.below(WORDS.len())]
            );
            let year = 1970 + rng.below(55) as i64;
            // Newer films drift slightly lower in this synthetic set.
            let score = (rng.gauss(7.4 - (year - 1970) as f64 * 0.02, 0.9)).clamp(1.0, 9.8);
            let runtime = rng.gauss(112.0, 22.0).clamp(70.0, 210.0).round();

            let n_genres = 1 + rng.below(3);
            let mut genres: Vec<String> = Vec::with_capacity(n_genres);
            while genres.len() < n_genres {
                let g = GENRES[rng.below(GENRES.len())].to_string();
                if !genres.contains(&g) {
                    genres.push(g);
                }
            }

            SampleMovie {
                title,
                // Every 17th year and 23rd runtime is left unusable.
                year: (i % 17 != 5).then_some(year),
                score: (score * 10.0).round() / 10.0,
                runtime_min: (i % 23 != 7).then_some(runtime),
                genres,
            }
        })
        .collect()
}

fn write_csv(movies: &[SampleMovie], path: &str) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).with_context(|| format!("creating {path}"))?;
    for (i, m) in movies.iter().enumerate() {
        writer.serialize(CsvRow {
            title: &m.title,
            year: m.year.map_or_else(|| "unknown".to_string(), |y| y.to_string()),
            score: format!("{:.1}", m.score),
            runtime_min: m
                .runtime_min
                .map_or_else(|| if i % 2 == 0 { "N/A".to_string() } else { String::new() }, |r| r.to_string()),
            genres: list_literal(&m.genres),
        })?;
    }
    writer.flush()?;
    Ok(())
}

fn write_parquet(movies: &[SampleMovie], path: &str) -> Result<()> {
    let schema = Arc::new(Schema::new(vec![
        Field::new("title", DataType::Utf8, false),
        Field::new("year", DataType::Int64, true),
        Field::new("score", DataType::Float64, false),
        Field::new("runtime_min", DataType::Float64, true),
        Field::new(
            "genres",
            DataType::List(Arc::new(Field::new("item", DataType::Utf8, true))),
            true,
        ),
    ]));

    let titles = StringArray::from(movies.iter().map(|m| m.title.as_str()).collect::<Vec<_>>());
    let mut years = Int64Builder::with_capacity(movies.len());
    let mut scores = Float64Builder::with_capacity(movies.len());
    let mut runtimes = Float64Builder::with_capacity(movies.len());
    let mut genres = ListBuilder::new(StringBuilder::new());
    for m in movies {
        years.append_option(m.year);
        scores.append_value(m.score);
        runtimes.append_option(m.runtime_min);
        for g in &m.genres {
            genres.values().append_value(g);
        }
        genres.append(true);
    }

    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(titles),
            Arc::new(years.finish()),
            Arc::new(scores.finish()),
            Arc::new(runtimes.finish()),
            Arc::new(genres.finish()),
        ],
    )?;

    println!("{}", pretty_format_batches(&[batch.slice(0, 5.min(batch.num_rows()))])?);

    let file = std::fs::File::create(path).with_context(|| format!("creating {path}"))?;
    let mut writer = ArrowWriter::try_new(file, schema, None)?;
    writer.write(&batch)?;
    writer.close()?;
    Ok(())
}

/// Output stem used when none is given on the command line. Kept apart from
/// the bundled `sample_data.csv` so the curated default is never overwritten.
const DEFAULT_STEM: &str = "synthetic_movies";

fn output_paths(stem: Option<String>) -> (String, String) {
    let stem = stem.unwrap_or_else(|| DEFAULT_STEM.to_string());
    (format!("{stem}.csv"), format!("{stem}.parquet"))
}

fn main() -> Result<()> {
    let (csv_path, parquet_path) = output_paths(std::env::args().nth(1));
    let mut rng = SimpleRng::new(42);
    let movies = generate_movies(&mut rng, 250);

    write_csv(&movies, &csv_path)?;
    write_parquet(&movies, &parquet_path)?;

    println!("Wrote {} movies to {csv_path} and {parquet_path}", movies.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_outputs_leave_bundled_sample_alone() {
        let (csv, parquet) = output_paths(None);
        assert_eq!(csv, "synthetic_movies.csv");
        assert_eq!(parquet, "synthetic_movies.parquet");
        assert_ne!(csv, "sample_data.csv");
    }

    #[test]
    fn output_stem_comes_from_the_command_line() {
        let (csv, parquet) = output_paths(Some("/tmp/films".to_string()));
        assert_eq!(csv, "/tmp/films.csv");
        assert_eq!(parquet, "/tmp/films.parquet");
    }

    #[test]
    fn generated_csv_loads_with_injected_bad_cells() {
        let mut rng = SimpleRng::new(7);
        let movies = generate_movies(&mut rng, 40);
        let path = std::env::temp_dir().join(format!("movie-dashboard-gen-{}.csv", std::process::id()));
        let path_str = path.to_string_lossy().into_owned();
        write_csv(&movies, &path_str).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(text.lines().count(), 41);
        assert!(text.lines().next().unwrap().starts_with("title,year,score,runtime_min,genres"));
        assert!(text.contains("unknown"));
    }
}
