// CSV ingestion into a RawTable
use crate::model::{LoadError, RawTable};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::info;

pub fn load_csv(path: impl AsRef<Path>) -> Result<RawTable, LoadError> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let table = read_csv(file)?;
    info!("Loaded {} rows from {}", table.rows.len(), path.display());
    Ok(table)
}

/// Reads headers verbatim and every cell as text. Short rows are padded with empty cells.
pub fn read_csv<R: Read>(reader: R) -> Result<RawTable, LoadError> {
    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers: Vec<String> = rdr.headers()?.iter().map(str::to_string).collect();
    let mut rows = Vec::new();
    for record in rdr.records() {
        let record = record?;
        let mut row: Vec<String> = record.iter().map(str::to_string).collect();
        row.resize(headers.len(), String::new());
        rows.push(row);
    }

    Ok(RawTable::new(headers, rows))
}
