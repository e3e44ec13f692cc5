//! Loads CSV and JSON files into a [`Dataset`].
//!
//! CSV fields stay text and blank fields become nulls; typing happens in
//! [`crate::inference`]. JSON arrays of objects keep their key order.
//!
//! - **Format**: picked from the extension (`.csv`, `.tsv`, `.txt`, `.json`)
//!   unless given explicitly.
//! - **Delimiter**: `.tsv` → tab, otherwise comma, with manual override.
//! - **Encoding**: input decoding via `encoding_rs`, defaulting to UTF-8.
//! - **stdin**: the `-` path reads standard input (format must be explicit).

use std::{
    fs::File,
    io::{BufReader, Read},
    path::Path,
};

use clap::ValueEnum;
use encoding_rs::{Encoding, UTF_8};
use log::debug;
use serde_json::Value as JsonValue;

use crate::{
    data::{Cell, Dataset, Record},
    error::LoadError,
};

pub const DEFAULT_CSV_DELIMITER: u8 = b',';
pub const DEFAULT_TSV_DELIMITER: u8 = b'\t';

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
#[value(rename_all = "kebab-case")]
pub enum InputFormat {
    Csv,
    Json,
}

#[derive(Debug, Clone)]
pub struct LoadOptions {
    pub format: Option<InputFormat>,
    pub delimiter: Option<u8>,
    pub encoding: &'static Encoding,
    /// Maximum rows to load (0 = all).
    pub limit: usize,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            format: None,
            delimiter: None,
            encoding: UTF_8,
            limit: 0,
        }
    }
}

pub fn is_dash(path: &Path) -> bool {
    path == Path::new("-")
}

pub fn resolve_encoding(label: Option<&str>) -> Result<&'static Encoding, LoadError> {
    match label {
        Some(value) => Encoding::for_label(value.trim().as_bytes())
            .ok_or_else(|| LoadError::UnknownEncoding(value.to_string())),
        None => Ok(UTF_8),
    }
}

pub fn resolve_input_delimiter(path: &Path, provided: Option<u8>) -> u8 {
    provided.unwrap_or_else(|| match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("tsv") => DEFAULT_TSV_DELIMITER,
        _ => DEFAULT_CSV_DELIMITER,
    })
}

pub fn resolve_format(path: &Path, provided: Option<InputFormat>) -> Result<InputFormat, LoadError> {
    if let Some(format) = provided {
        return Ok(format);
    }
    match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("json") => Ok(InputFormat::Json),
        Some(ext) if ["csv", "tsv", "txt"].iter().any(|known| ext.eq_ignore_ascii_case(known)) => {
            Ok(InputFormat::Csv)
        }
        _ => Err(LoadError::UnsupportedFormat(path.to_path_buf())),
    }
}

fn open_input(path: &Path) -> Result<Box<dyn Read>, LoadError> {
    if is_dash(path) {
        return Ok(Box::new(std::io::stdin().lock()));
    }
    let file = File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(Box::new(BufReader::new(file)))
}

pub fn load_dataset(path: &Path, options: &LoadOptions) -> Result<Dataset, LoadError> {
    let format = resolve_format(path, options.format)?;
    let reader = open_input(path)?;
    let dataset = match format {
        InputFormat::Csv => {
            let delimiter = resolve_input_delimiter(path, options.delimiter);
            read_csv(reader, delimiter, options.encoding, options.limit)?
        }
        InputFormat::Json => read_json(reader, options.limit)?,
    };
    debug!(
        "Loaded {} row(s) and {} column(s) from {path:?}",
        dataset.len(),
        dataset.columns().len()
    );
    Ok(dataset)
}

fn decode_bytes(bytes: &[u8], encoding: &'static Encoding) -> Result<String, LoadError> {
    let (text, _, had_errors) = encoding.decode(bytes);
    if had_errors {
        Err(LoadError::Decode(encoding.name()))
    } else {
        Ok(text.into_owned())
    }
}

fn decode_record(
    record: &csv::ByteRecord,
    encoding: &'static Encoding,
) -> Result<Vec<String>, LoadError> {
    record
        .iter()
        .map(|field| decode_bytes(field, encoding))
        .collect()
}

pub fn read_csv<R: Read>(
    reader: R,
    delimiter: u8,
    encoding: &'static Encoding,
    limit: usize,
) -> Result<Dataset, LoadError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .delimiter(delimiter)
        .double_quote(true)
        .flexible(true)
        .from_reader(reader);
    let raw_headers = reader
        .byte_headers()
        .map_err(|source| LoadError::Csv { row: 1, source })?
        .clone();
    let headers = decode_record(&raw_headers, encoding)?;

    let mut rows = Vec::new();
    for (row_idx, record) in reader.byte_records().enumerate() {
        if limit > 0 && row_idx >= limit {
            break;
        }
        let record = record.map_err(|source| LoadError::Csv {
            row: row_idx + 2,
            source,
        })?;
        let cells = decode_record(&record, encoding)?
            .into_iter()
            .map(|field| {
                if field.trim().is_empty() {
                    Cell::Null
                } else {
                    Cell::Text(field)
                }
            })
            .collect::<Vec<_>>();
        rows.push(cells);
    }
    Ok(Dataset::from_rows(&headers, rows))
}

pub fn read_json<R: Read>(reader: R, limit: usize) -> Result<Dataset, LoadError> {
    let value: JsonValue = serde_json::from_reader(reader)?;
    let JsonValue::Array(items) = value else {
        return Err(LoadError::JsonShape(
            "expected a top-level array of records".to_string(),
        ));
    };
    let take = if limit > 0 { limit } else { items.len() };
    let records = items
        .into_iter()
        .take(take)
        .enumerate()
        .map(|(idx, item)| match item {
            JsonValue::Object(fields) => Ok(fields
                .into_iter()
                .map(|(name, value)| (name, json_cell(value)))
                .collect::<Record>()),
            other => Err(LoadError::JsonShape(format!(
                "record {} is {}, expected an object",
                idx + 1,
                json_kind(&other)
            ))),
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Dataset::new(records))
}

fn json_cell(value: JsonValue) -> Cell {
    match value {
        JsonValue::Null => Cell::Null,
        JsonValue::Number(n) => n.as_f64().map_or(Cell::Null, Cell::Number),
        JsonValue::String(s) => Cell::Text(s),
        JsonValue::Bool(b) => Cell::Text(b.to_string()),
        nested @ (JsonValue::Array(_) | JsonValue::Object(_)) => Cell::Text(nested.to_string()),
    }
}

fn json_kind(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "a boolean",
        JsonValue::Number(_) => "a number",
        JsonValue::String(_) => "a string",
        JsonValue::Array(_) => "an array",
        JsonValue::Object(_) => "an object",
    }
}
