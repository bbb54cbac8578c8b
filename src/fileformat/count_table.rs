// This software is released under the MIT license.
// See file LICENSE for full license details.
use std::collections::HashMap;
use std::path::Path;

use anyhow::Context;
use itertools::Itertools;
use log::{info, warn};

use crate::barcode::DecodedPair;

/// Name used for antibody barcodes missing from the name map
pub const UNKNOWN_ANTIBODY: &str = "UNKNOWN";

///////////////////////////////
/// How many read pairs could be decoded
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecodeStats {
    pub num_pairs: u64,
    pub num_with_cell: u64,
    pub num_with_antibody: u64,
    pub num_with_both: u64,
}
impl DecodeStats {
    pub fn add(&mut self, other: &DecodeStats) {
        self.num_pairs += other.num_pairs;
        self.num_with_cell += other.num_with_cell;
        self.num_with_antibody += other.num_with_antibody;
        self.num_with_both += other.num_with_both;
    }

    pub fn log_summary(&self) {
        info!("Summary over {} pairs:", self.num_pairs);
        info!("{} have valid cell barcodes", self.num_with_cell);
        info!("{} have valid antibody payloads", self.num_with_antibody);
        info!("{} have both cell + antibody", self.num_with_both);
    }
}

///////////////////////////////
/// Per-cell, per-antibody read counts
#[derive(Debug, Clone, Default)]
pub struct CellAntibodyCounts {
    //cell id -> antibody barcode -> count
    counts: HashMap<String, HashMap<String, u64>>,
    stats: DecodeStats,
}
impl CellAntibodyCounts {
    pub fn new() -> CellAntibodyCounts {
        CellAntibodyCounts::default()
    }

    ///////////////////////////////
    /// Tally one decoded read pair. Only complete pairs are counted per cell
    pub fn add_decoded(&mut self, decoded: &DecodedPair) {
        self.stats.num_pairs += 1;
        if decoded.cell.is_some() {
            self.stats.num_with_cell += 1;
        }
        if decoded.antibody.is_some() {
            self.stats.num_with_antibody += 1;
        }
        if let (Some(cell), Some(antibody)) = (&decoded.cell, decoded.antibody) {
            self.stats.num_with_both += 1;
            self.inc(&cell.cell_id(), antibody, 1);
        }
    }

    pub fn inc(&mut self, cell_id: &str, antibody: &str, cnt: u64) {
        let per_cell = self.counts.entry(cell_id.to_string()).or_default();
        *per_cell.entry(antibody.to_string()).or_insert(0) += cnt;
    }

    ///////////////////////////////
    /// Add the counts of another table, e.g. from another batch
    pub fn merge(&mut self, other: CellAntibodyCounts) {
        for (cell_id, per_cell) in other.counts {
            for (antibody, cnt) in per_cell {
                self.inc(&cell_id, &antibody, cnt);
            }
        }
        self.stats.add(&other.stats);
    }

    pub fn get(&self, cell_id: &str, antibody: &str) -> u64 {
        self.counts
            .get(cell_id)
            .and_then(|per_cell| per_cell.get(antibody))
            .copied()
            .unwrap_or(0)
    }

    pub fn num_cells(&self) -> usize {
        self.counts.len()
    }

    pub fn stats(&self) -> &DecodeStats {
        &self.stats
    }

    ///////////////////////////////
    /// All (cell, antibody barcode, count) with count at least `min_count`, sorted
    pub fn rows_above(&self, min_count: u64) -> Vec<(&str, &str, u64)> {
        self.counts
            .iter()
            .flat_map(|(cell_id, per_cell)| {
                per_cell
                    .iter()
                    .filter(move |(_, cnt)| **cnt >= min_count)
                    .map(move |(antibody, &cnt)| (cell_id.as_str(), antibody.as_str(), cnt))
            })
            .sorted()
            .collect()
    }

    ///////////////////////////////
    /// Write one `cell_<id>.csv` per cell that has at least one antibody at `min_count` or more.
    /// Returns the number of files written
    pub fn write_per_cell_dir(
        &self,
        out_dir: &Path,
        antibody_names: &HashMap<String, String>,
        min_count: u64,
    ) -> anyhow::Result<usize> {
        std::fs::create_dir_all(out_dir)
            .with_context(|| format!("Could not create output directory {}", out_dir.display()))?;

        let mut n_files = 0;
        let rows = self.rows_above(min_count);
        for (cell_id, cell_rows) in &rows.iter().chunk_by(|(cell_id, _, _)| *cell_id) {
            let path = out_dir.join(format!("cell_{}.csv", cell_id));
            let mut writer = match csv::Writer::from_path(&path) {
                Ok(writer) => writer,
                Err(e) => {
                    warn!("Could not open {} for writing: {}", path.display(), e);
                    continue;
                }
            };
            writer.write_record(["antibody_name", "count"])?;
            for (_, antibody, cnt) in cell_rows {
                writer.write_record([
                    antibody_name(antibody_names, antibody),
                    cnt.to_string().as_str(),
                ])?;
            }
            writer.flush()?;
            n_files += 1;
        }
        info!("Wrote {} cell files to {}", n_files, out_dir.display());
        Ok(n_files)
    }

    ///////////////////////////////
    /// Write all counts at `min_count` or more into one CSV. Returns the number of rows
    pub fn write_long_csv(
        &self,
        path: &Path,
        antibody_names: &HashMap<String, String>,
        min_count: u64,
    ) -> anyhow::Result<usize> {
        let mut writer = csv::Writer::from_path(path)
            .with_context(|| format!("Could not open {} for writing", path.display()))?;
        writer.write_record(["cell_id", "antibody_name", "count"])?;

        let rows = self.rows_above(min_count);
        for (cell_id, antibody, cnt) in &rows {
            writer.write_record([
                *cell_id,
                antibody_name(antibody_names, antibody),
                cnt.to_string().as_str(),
            ])?;
        }
        writer.flush()?;
        info!("Wrote {} rows to {}", rows.len(), path.display());
        Ok(rows.len())
    }
}

fn antibody_name<'a>(antibody_names: &'a HashMap<String, String>, antibody: &str) -> &'a str {
    antibody_names
        .get(antibody)
        .map(|s| s.as_str())
        .unwrap_or(UNKNOWN_ANTIBODY)
}
