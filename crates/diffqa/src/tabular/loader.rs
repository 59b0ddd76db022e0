//! Decoding tables from CSV, TSV, HTML and workbook files.

use super::table::{Cell, Sheet, Table};
use crate::format::extension_of;
use crate::result::{DiffqaError, DiffqaResult};
use calamine::{open_workbook_auto, Data, Reader};
use scraper::{Html, Selector};
use std::io::Read;
use std::path::Path;

/// Load a single-table file (`.csv`, `.tsv`, `.html`)
pub fn load_table(path: impl AsRef<Path>) -> DiffqaResult<Table> {
    let path = path.as_ref();
    match extension_of(path).as_deref() {
        Some("csv") => read_delimited_file(path, b','),
        Some("tsv") => read_delimited_file(path, b'\t'),
        Some("html") => {
            let text = std::fs::read_to_string(path)?;
            parse_html_table(&text, path)
        }
        Some("hdf") => Err(DiffqaError::unsupported(format!(
            "HDF5 decoding is not available ({})",
            path.display()
        ))),
        _ => Err(DiffqaError::unsupported(format!(
            "{} is not a delimited-text file",
            path.display()
        ))),
    }
}

fn read_delimited_file(path: &Path, delimiter: u8) -> DiffqaResult<Table> {
    let file = std::fs::File::open(path)?;
    read_delimited(file, delimiter, path)
}

/// Read delimited text with a header row
pub fn read_delimited<R: Read>(reader: R, delimiter: u8, origin: &Path) -> DiffqaResult<Table> {
    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let headers = rdr
        .headers()
        .map_err(|e| DiffqaError::table_decode(origin, e.to_string()))?;
    let mut table = Table::new(header_names(headers.iter()));

    for record in rdr.records() {
        let record = record.map_err(|e| DiffqaError::table_decode(origin, e.to_string()))?;
        table.push_row(record.iter().map(Cell::parse));
    }
    Ok(table)
}

/// Parse the first `<table>` of an HTML document; its first row is the header
pub fn parse_html_table(html: &str, origin: &Path) -> DiffqaResult<Table> {
    let document = Html::parse_document(html);
    let table_sel = selector("table", origin)?;
    let row_sel = selector("tr", origin)?;
    let cell_sel = selector("th, td", origin)?;

    let element = document
        .select(&table_sel)
        .next()
        .ok_or_else(|| DiffqaError::table_decode(origin, "no <table> element found"))?;

    let mut rows = element.select(&row_sel).map(|tr| {
        tr.select(&cell_sel)
            .map(|cell| cell.text().collect::<String>().trim().to_string())
            .collect::<Vec<_>>()
    });

    let Some(header) = rows.next() else {
        return Ok(Table::default());
    };
    let mut table = Table::new(header_names(header.iter().map(String::as_str)));
    for row in rows {
        table.push_row(row.iter().map(|raw| Cell::parse(raw)));
    }
    Ok(table)
}

fn selector(css: &str, origin: &Path) -> DiffqaResult<Selector> {
    Selector::parse(css).map_err(|e| DiffqaError::table_decode(origin, e.to_string()))
}

/// Load every sheet of an `.xls`/`.xlsx` workbook in workbook order
pub fn load_workbook(path: impl AsRef<Path>) -> DiffqaResult<Vec<Sheet>> {
    let path = path.as_ref();
    let mut workbook =
        open_workbook_auto(path).map_err(|e| DiffqaError::table_decode(path, e.to_string()))?;

    let names = workbook.sheet_names();
    let mut sheets = Vec::with_capacity(names.len());
    for name in names {
        let range = workbook
            .worksheet_range(&name)
            .map_err(|e| DiffqaError::table_decode(path, format!("sheet '{name}': {e}")))?;
        let table = table_from_rows(range.rows());
        sheets.push(Sheet { name, table });
    }

    tracing::debug!(path = %path.display(), sheets = sheets.len(), "loaded workbook");
    Ok(sheets)
}

fn table_from_rows<'a>(mut rows: impl Iterator<Item = &'a [Data]>) -> Table {
    let Some(header) = rows.next() else {
        return Table::default();
    };
    let names: Vec<String> = header.iter().map(|d| cell_from_data(d).to_string()).collect();
    let mut table = Table::new(header_names(names.iter().map(String::as_str)));
    for row in rows {
        table.push_row(row.iter().map(cell_from_data));
    }
    table
}

fn cell_from_data(data: &Data) -> Cell {
    match data {
        Data::Empty => Cell::Empty,
        Data::String(s) if s.trim().is_empty() => Cell::Empty,
        Data::String(s) => Cell::Text(s.clone()),
        Data::Int(n) => Cell::Int(*n),
        Data::Float(f) => Cell::Float(*f),
        Data::Bool(b) => Cell::Bool(*b),
        Data::DateTime(dt) => Cell::Float(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => Cell::Text(s.clone()),
        Data::Error(e) => Cell::Text(e.to_string()),
    }
}

/// Trim headers and name blank ones `Unnamed: <index>`
fn header_names<'a>(raw: impl Iterator<Item = &'a str>) -> Vec<String> {
    raw.enumerate()
        .map(|(i, name)| {
            let name = name.trim();
            if name.is_empty() {
                format!("Unnamed: {i}")
            } else {
                name.to_string()
            }
        })
        .collect()
}
