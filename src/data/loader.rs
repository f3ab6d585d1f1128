use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use arrow::array::{
    Array, AsArray, BooleanArray, Float32Array, Float64Array, Int32Array, Int64Array,
    LargeListArray, ListArray,
};
use arrow::datatypes::DataType;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::model::{RawTable, RawValue};

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a movie table from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row, `genres` stored as a list literal: `"['Action', 'Drama']"`
/// * `.json`    – `[{ "title": ..., "genres": [...] | "['...']", ... }, ...]`
/// * `.parquet` – `genres` as `List<Utf8>` or as list-literal text
pub fn load_file(path: &Path) -> Result<RawTable> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let table = match ext.as_str() {
        "csv" => {
            let file = std::fs::File::open(path)
                .with_context(|| format!("opening CSV {}", path.display()))?;
            load_csv(file)
        }
        "json" => load_json(path),
        "parquet" | "pq" => load_parquet(path),
        other => bail!("Unsupported file extension: .{other}"),
    }?;

    if table.is_empty() {
        log::warn!("{} has a header but no data rows", path.display());
    }
    log::info!(
        "Loaded {} rows with columns {:?} from {}",
        table.len(),
        table.column_names,
        path.display()
    );
    Ok(table)
}

/// Parse CSV held in memory (same rules as a `.csv` file).
pub fn load_csv_str(text: &str) -> Result<RawTable> {
    load_csv(text.as_bytes())
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

fn load_csv<R: Read>(source: R) -> Result<RawTable> {
    let mut reader = csv::Reader::from_reader(source);
    let column_names: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut rows = Vec::new();

    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;

        let row: BTreeMap<String, RawValue> = column_names
            .iter()
            .enumerate()
            .map(|(col_idx, name)| {
                let value = record.get(col_idx).map_or(RawValue::Null, text_cell);
                (name.clone(), value)
            })
            .collect();

        rows.push(row);
    }

    Ok(RawTable { column_names, rows })
}

/// CSV cells stay text; the cleaner decides which columns are numeric.
fn text_cell(s: &str) -> RawValue {
    if s.is_empty() {
        RawValue::Null
    } else {
        RawValue::String(s.to_string())
    }
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Records-oriented JSON, the default `df.to_json(orient='records')`:
///
/// ```json
/// [
///   { "title": "Heat", "year": 1995, "score": 8.3, "runtime_min": 170,
///     "genres": ["Crime", "Drama"] },
///   ...
/// ]
/// ```
fn load_json(path: &Path) -> Result<RawTable> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading JSON {}", path.display()))?;
    let root: JsonValue = serde_json::from_str(&text).context("parsing JSON")?;

    let records = root
        .as_array()
        .context("Expected top-level JSON array")?;

    let mut column_names: Vec<String> = Vec::new();
    let mut rows = Vec::with_capacity(records.len());

    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .with_context(|| format!("Row {i} is not a JSON object"))?;

        let mut row = BTreeMap::new();
        for (key, val) in obj {
            if !column_names.contains(key) {
                column_names.push(key.clone());
            }
            row.insert(key.clone(), json_to_value(val));
        }
        rows.push(row);
    }

    Ok(RawTable { column_names, rows })
}

fn json_to_value(val: &JsonValue) -> RawValue {
    match val {
        JsonValue::String(s) => RawValue::String(s.clone()),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                RawValue::Integer(i)
            } else if let Some(f) = n.as_f64() {
                RawValue::Float(f)
            } else {
                RawValue::String(n.to_string())
            }
        }
        JsonValue::Bool(b) => RawValue::Bool(*b),
        JsonValue::Null => RawValue::Null,
        JsonValue::Array(items) if items.iter().all(JsonValue::is_string) => RawValue::List(
            items
                .iter()
                .filter_map(|v| v.as_str().map(str::to_string))
                .collect(),
        ),
        other => RawValue::String(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file holding one movie per row.
///
/// Works with files written by both **Pandas** (`df.to_parquet()`) and
/// **Polars** (`df.write_parquet()`), and with `generate_sample`.
fn load_parquet(path: &Path) -> Result<RawTable> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("opening parquet file {}", path.display()))?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)
        .context("reading parquet metadata")?;
    let column_names: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    let reader = builder.build().context("building parquet reader")?;

    let mut rows = Vec::new();

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;

        for row in 0..batch.num_rows() {
            let mut values = BTreeMap::new();
            for (col_idx, col_name) in column_names.iter().enumerate() {
                let value = extract_value(batch.column(col_idx), row)
                    .with_context(|| format!("Row {row}: failed to read '{col_name}'"))?;
                values.insert(col_name.clone(), value);
            }
            rows.push(values);
        }
    }

    Ok(RawTable { column_names, rows })
}

// -- Parquet / Arrow helpers --

/// Extract the string items of a List or LargeList cell.
fn extract_string_list(col: &Arc<dyn Array>, row: usize) -> Result<Vec<String>> {
    let values_array = match col.data_type() {
        DataType::List(_) => {
            let list_arr = col
                .as_any()
                .downcast_ref::<ListArray>()
                .context("expected ListArray")?;
            list_arr.value(row)
        }
        DataType::LargeList(_) => {
            let list_arr = col
                .as_any()
                .downcast_ref::<LargeListArray>()
                .context("expected LargeListArray")?;
            list_arr.value(row)
        }
        other => bail!("Expected List or LargeList column, got {other:?}"),
    };

    let items: Vec<Option<&str>> = match values_array.data_type() {
        DataType::Utf8 => values_array.as_string::<i32>().iter().collect(),
        DataType::LargeUtf8 => values_array.as_string::<i64>().iter().collect(),
        other => bail!("List inner type is {other:?}, expected Utf8"),
    };
    Ok(items.into_iter().flatten().map(str::to_string).collect())
}

/// Extract a single cell from an Arrow column at a given row.
fn extract_value(col: &Arc<dyn Array>, row: usize) -> Result<RawValue> {
    if col.is_null(row) {
        return Ok(RawValue::Null);
    }

    fn downcast<T: 'static>(col: &Arc<dyn Array>) -> Result<&T> {
        col.as_any()
            .downcast_ref::<T>()
            .with_context(|| format!("column type {:?} does not match its array", col.data_type()))
    }

    let value = match col.data_type() {
        DataType::Utf8 => RawValue::String(col.as_string::<i32>().value(row).to_string()),
        DataType::LargeUtf8 => RawValue::String(col.as_string::<i64>().value(row).to_string()),
        DataType::Int32 => RawValue::Integer(downcast::<Int32Array>(col)?.value(row) as i64),
        DataType::Int64 => RawValue::Integer(downcast::<Int64Array>(col)?.value(row)),
        DataType::Float32 => RawValue::Float(downcast::<Float32Array>(col)?.value(row) as f64),
        DataType::Float64 => RawValue::Float(downcast::<Float64Array>(col)?.value(row)),
        DataType::Boolean => RawValue::Bool(downcast::<BooleanArray>(col)?.value(row)),
        DataType::List(_) | DataType::LargeList(_) => {
            RawValue::List(extract_string_list(col, row)?)
        }
        other => RawValue::String(format!("{other:?}")),
    };
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    use arrow::array::{ListBuilder, StringArray, StringBuilder};
    use arrow::datatypes::{Field, Schema};
    use arrow::record_batch::RecordBatch;
    use parquet::arrow::ArrowWriter;

    fn temp_path(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("movie-dashboard-{}-{name}", std::process::id()))
    }

    #[test]
    fn csv_keeps_header_order_and_cell_text() {
        let table = load_csv_str(
            "title,year,score,runtime_min,genres\n\
             Heat,1995,8.3,,\"['Crime', 'Drama']\"\n",
        )
        .unwrap();

        assert_eq!(
            table.column_names,
            vec!["title", "year", "score", "runtime_min", "genres"]
        );
        let row = &table.rows[0];
        assert_eq!(row["title"], RawValue::String("Heat".into()));
        assert_eq!(row["year"], RawValue::String("1995".into()));
        assert_eq!(row["score"], RawValue::String("8.3".into()));
        assert_eq!(row["runtime_min"], RawValue::Null);
        assert_eq!(row["genres"], RawValue::String("['Crime', 'Drama']".into()));
    }

    #[test]
    fn numeric_looking_csv_text_is_not_rewritten() {
        let table = load_csv_str("title,note\n2.0,007\nInfinity,nan\n").unwrap();
        assert_eq!(table.rows[0]["title"], RawValue::String("2.0".into()));
        assert_eq!(table.rows[0]["note"], RawValue::String("007".into()));
        assert_eq!(table.rows[1]["title"], RawValue::String("Infinity".into()));
        assert_eq!(table.rows[1]["note"], RawValue::String("nan".into()));
    }

    #[test]
    fn header_only_csv_loads_as_empty_table() {
        let path = temp_path("header-only.csv");
        std::fs::write(&path, "title,year,score,runtime_min,genres\n").unwrap();
        let table = load_file(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert!(table.is_empty());
        assert_eq!(table.column_names.len(), 5);
    }

    #[test]
    fn ragged_csv_rows_are_an_error() {
        assert!(load_csv_str("title,year\nA,2000,extra\n").is_err());
    }

    #[test]
    fn missing_file_is_an_error() {
        let err = load_file(Path::new("/definitely/not/here/sample_data.csv")).unwrap_err();
        assert!(format!("{err:#}").contains("opening CSV"));
    }

    #[test]
    fn unsupported_extension_is_rejected() {
        let err = load_file(Path::new("movies.xlsx")).unwrap_err();
        assert!(err.to_string().contains(".xlsx"));
    }

    #[test]
    fn json_records_with_array_genres() {
        let path = temp_path("movies.json");
        std::fs::write(
            &path,
            r#"[{"title":"Heat","year":1995,"score":8.3,"runtime_min":null,"genres":["Crime","Drama"]},
                {"title":"Up","year":"2009","score":8.2,"runtime_min":96,"genres":"['Animation']","studio":"Pixar"}]"#,
        )
        .unwrap();

        let table = load_file(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(table.len(), 2);
        assert!(table.has_column("studio"));
        assert_eq!(
            table.rows[0]["genres"],
            RawValue::List(vec!["Crime".into(), "Drama".into()])
        );
        assert_eq!(table.rows[0]["runtime_min"], RawValue::Null);
        assert_eq!(table.rows[1]["year"], RawValue::String("2009".into()));
        assert!(!table.rows[0].contains_key("studio"));
    }

    #[test]
    fn parquet_list_column_loads_as_list() {
        let schema = Arc::new(Schema::new(vec![
            Field::new("title", DataType::Utf8, false),
            Field::new("score", DataType::Float64, false),
            Field::new("year", DataType::Int64, true),
            Field::new(
                "genres",
                DataType::List(Arc::new(Field::new("item", DataType::Utf8, true))),
                true,
            ),
        ]));

        let mut genres = ListBuilder::new(StringBuilder::new());
        genres.values().append_value("Drama");
        genres.values().append_value("War");
        genres.append(true);
        genres.append(true);

        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(StringArray::from(vec!["1917", "Empty"])),
                Arc::new(Float64Array::from(vec![8.2, 5.0])),
                Arc::new(Int64Array::from(vec![Some(2019), None])),
                Arc::new(genres.finish()),
            ],
        )
        .unwrap();

        let path = temp_path("movies.parquet");
        let file = std::fs::File::create(&path).unwrap();
        let mut writer = ArrowWriter::try_new(file, schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();

        let table = load_file(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(table.column_names, vec!["title", "score", "year", "genres"]);
        assert_eq!(
            table.rows[0]["genres"],
            RawValue::List(vec!["Drama".into(), "War".into()])
        );
        assert_eq!(table.rows[1]["genres"], RawValue::List(Vec::new()));
        assert_eq!(table.rows[1]["year"], RawValue::Null);
        assert_eq!(table.rows[0]["title"], RawValue::String("1917".into()));
    }
}
