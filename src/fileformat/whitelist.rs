// This software is released under the MIT license.
// See file LICENSE for full license details.
use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use anyhow::{bail, Context};
use itertools::Itertools;
use log::info;

use crate::barcode::normalize_barcode;

///////////////////////////////
/// One row in a whitelist CSV, `barcode,id`
#[derive(Debug, Eq, PartialEq)]
struct WhitelistCsvFileRow {
    barcode: String,
    id: String,
}

///////////////////////////////
/// Read all rows of a whitelist. The file has no header.
/// Blank lines are skipped, fields are trimmed and barcodes normalized.
/// Everything after the first comma is the id, commas included
fn read_barcode_rows(src: impl Read) -> anyhow::Result<Vec<WhitelistCsvFileRow>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(src);

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result.context("Malformed barcode CSV")?;
        if record.len() < 2 {
            let line = record.position().map_or(0, |pos| pos.line());
            bail!("Malformed barcode line {}, expected barcode,id", line);
        }
        rows.push(WhitelistCsvFileRow {
            barcode: normalize_barcode(&record[0]),
            id: record.iter().skip(1).join(","),
        });
    }
    Ok(rows)
}

fn open_whitelist(path: &Path) -> anyhow::Result<File> {
    File::open(path).with_context(|| format!("Failed to open barcode CSV: {}", path.display()))
}

///////////////////////////////
/// Barcodes of a whitelist, in file order
pub fn read_barcode_list(src: impl Read) -> anyhow::Result<Vec<String>> {
    Ok(read_barcode_rows(src)?
        .into_iter()
        .map(|row| row.barcode)
        .collect())
}

pub fn read_barcode_list_file(path: &Path) -> anyhow::Result<Vec<String>> {
    let barcodes = read_barcode_list(open_whitelist(path)?)
        .with_context(|| format!("Failed to parse barcode CSV: {}", path.display()))?;
    info!("Read {} barcodes from {}", barcodes.len(), path.display());
    Ok(barcodes)
}

///////////////////////////////
/// Map from normalized antibody barcode to the name of the antibody. Later lines win
pub fn read_antibody_names(src: impl Read) -> anyhow::Result<HashMap<String, String>> {
    Ok(read_barcode_rows(src)?
        .into_iter()
        .map(|row| (row.barcode, row.id))
        .collect())
}

pub fn read_antibody_names_file(path: &Path) -> anyhow::Result<HashMap<String, String>> {
    read_antibody_names(open_whitelist(path)?)
        .with_context(|| format!("Failed to parse antibody CSV: {}", path.display()))
}
