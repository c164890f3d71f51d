//! Загрузка трасс из CSV (в том числе сжатых bzip2)

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use bzip2::read::MultiBzDecoder;

use crate::config::PipelineConfig;
use crate::error::Result;
use crate::preprocessing::FeatureNormalizer;
use crate::types::{Column, Table, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compression {
    None,
    Bzip2,
}

impl Compression {
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some("bz2") => Compression::Bzip2,
            _ => Compression::None,
        }
    }
}

/// Читает CSV с заголовком в сырую таблицу
pub fn read_csv<R: Read>(reader: R) -> Result<Table> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers: Vec<String> = csv_reader.headers()?.iter().map(str::to_string).collect();
    let mut columns: Vec<Vec<Value>> = vec![Vec::new(); headers.len()];

    for record in csv_reader.records() {
        let record = record?;
        for (i, values) in columns.iter_mut().enumerate() {
            values.push(record.get(i).map(Value::parse).unwrap_or(Value::Missing));
        }
    }

    Table::new(
        headers
            .into_iter()
            .zip(columns)
            .map(|(name, values)| Column::new(name, values))
            .collect(),
    )
}

pub fn load_csv(path: impl AsRef<Path>, compression: Compression) -> Result<Table> {
    let path = path.as_ref();
    let file = BufReader::new(File::open(path)?);

    let table = match compression {
        Compression::None => read_csv(file)?,
        Compression::Bzip2 => read_csv(MultiBzDecoder::new(file))?,
    };

    tracing::info!(
        "Loaded {} rows, {} columns from {}",
        table.n_rows(),
        table.n_cols(),
        path.display()
    );
    Ok(table)
}

/// Загрузка и подготовка трасс TableScan одним вызовом
pub fn load_table_scan_data(path: impl AsRef<Path>, config: &PipelineConfig) -> Result<Table> {
    let path = path.as_ref();
    let raw = load_csv(path, Compression::from_path(path))?;
    FeatureNormalizer::new(config).prepare(&raw)
}
