// This software is released under the MIT license.
// See file LICENSE for full license details.
use std::path::PathBuf;

use anyhow::Context;
use anyhow::Result;
use clap::Args;
use log::{debug, info, warn};
use rayon::prelude::*;
use seq_io::fastq::Record as FastqRecord;

use super::threadcount::determine_thread_count;
use crate::barcode::{CollisionPolicy, DabseqChemistry, HammingIndex};
use crate::fileformat::whitelist;
use crate::fileformat::{CellAntibodyCounts, PairedFastqReader, RecordPair};

pub const DEFAULT_PATH_OUT: &str = "cell_counts";
pub const DEFAULT_MIN_COUNT: u64 = 10;
pub const DEFAULT_BATCH_SIZE: usize = 10000;

const PROGRESS_INTERVAL: u64 = 1_000_000;

#[derive(Args)]
pub struct CountCMD {
    // FASTQ for r1, holding the cell barcode
    #[arg(long = "r1", value_parser)]
    pub path_r1: PathBuf,

    // FASTQ for r2, holding the antibody barcode
    #[arg(long = "r2", value_parser)]
    pub path_r2: PathBuf,

    // CSV with cell barcode halves: barcode,id
    #[arg(long = "cell-barcodes", value_parser)]
    pub path_cell_barcodes: PathBuf,

    // CSV with antibody barcodes: barcode,name
    #[arg(long = "antibody-barcodes", value_parser)]
    pub path_antibody_barcodes: PathBuf,

    // Directory to write one CSV per cell into
    #[arg(short = 'o', long = "out-dir", value_parser, default_value = DEFAULT_PATH_OUT)]
    pub path_out: PathBuf,

    // Optional: also write all counts into a single CSV
    #[arg(long = "long-csv", value_parser)]
    pub path_long_csv: Option<PathBuf>,

    // Minimum count for a cell/antibody combination to be written
    #[arg(long = "min-count", default_value_t = DEFAULT_MIN_COUNT)]
    pub min_count: u64,

    // Optional: stop after this many read pairs
    #[arg(long = "max-pairs")]
    pub max_pairs: Option<u64>,

    // Keep going if whitelist barcodes are within two substitutions of each other
    #[arg(long = "allow-barcode-collisions")]
    pub allow_barcode_collisions: bool,

    // Read pairs decoded per batch
    #[arg(long = "batch-size", default_value_t = DEFAULT_BATCH_SIZE)]
    pub batch_size: usize,

    //Thread settings
    #[arg(short = '@', value_parser = clap::value_parser!(usize))]
    num_threads_total: Option<usize>,
}
impl CountCMD {
    /// Run the commandline option.
    /// This one takes raw FASTQ files, decodes cell and antibody barcodes, and counts them
    pub fn try_execute(&mut self) -> Result<()> {
        let num_threads = determine_thread_count(self.num_threads_total)?;
        info!("Using threads: {}", num_threads);

        if self.batch_size == 0 {
            anyhow::bail!("Batch size must be at least 1");
        }

        let collision_policy = if self.allow_barcode_collisions {
            CollisionPolicy::KeepFirst
        } else {
            CollisionPolicy::Reject
        };

        let params = CountParams {
            path_r1: self.path_r1.clone(),
            path_r2: self.path_r2.clone(),
            path_cell_barcodes: self.path_cell_barcodes.clone(),
            path_antibody_barcodes: self.path_antibody_barcodes.clone(),
            path_out: self.path_out.clone(),
            path_long_csv: self.path_long_csv.clone(),
            min_count: self.min_count,
            max_pairs: self.max_pairs,
            collision_policy,
            batch_size: self.batch_size,
            threads_work: num_threads,
            chemistry: DabseqChemistry::default(),
        };

        DabseqCount::run(&params)?;

        println!("Count has finished successfully");
        Ok(())
    }
}

pub struct CountParams {
    pub path_r1: PathBuf,
    pub path_r2: PathBuf,
    pub path_cell_barcodes: PathBuf,
    pub path_antibody_barcodes: PathBuf,

    pub path_out: PathBuf,
    pub path_long_csv: Option<PathBuf>,

    pub min_count: u64,
    pub max_pairs: Option<u64>,
    pub collision_policy: CollisionPolicy,

    pub batch_size: usize,
    pub threads_work: usize,

    pub chemistry: DabseqChemistry,
}

pub struct DabseqCount {}
impl DabseqCount {
    ///////////////////////////////
    /// Load whitelists, decode all read pairs and write the count tables
    pub fn run(params: &CountParams) -> anyhow::Result<CellAntibodyCounts> {
        params.chemistry.validate()?;

        let cell_index = load_index(&params.path_cell_barcodes, params.collision_policy)?;
        let antibody_index = load_index(&params.path_antibody_barcodes, params.collision_policy)?;
        let antibody_names = whitelist::read_antibody_names_file(&params.path_antibody_barcodes)?;
        check_barcode_length(&cell_index, params.chemistry.cell.half_length, "cell");
        check_barcode_length(&antibody_index, params.chemistry.antibody.payload_length, "antibody");

        let mut reader = PairedFastqReader::open(&params.path_r1, &params.path_r2)?;

        let thread_pool = rayon::ThreadPoolBuilder::new()
            .num_threads(params.threads_work)
            .build()
            .context("Failed to start worker threads")?;

        let mut counts = CellAntibodyCounts::new();
        let mut next_progress = PROGRESS_INTERVAL;
        loop {
            let batch_size = match params.max_pairs {
                Some(max_pairs) => {
                    let remaining = max_pairs.saturating_sub(reader.num_pairs());
                    remaining.min(params.batch_size as u64) as usize
                }
                None => params.batch_size,
            };
            if batch_size == 0 {
                break;
            }

            let batch = reader.next_batch(batch_size)?;
            if batch.is_empty() {
                break;
            }

            let batch_counts = thread_pool.install(|| {
                count_batch(&batch, &params.chemistry, &cell_index, &antibody_index)
            });
            counts.merge(batch_counts);

            if reader.num_pairs() >= next_progress {
                info!("#read pairs processed: {}", reader.num_pairs());
                next_progress += PROGRESS_INTERVAL;
            }
        }

        counts.stats().log_summary();
        info!("Unique cells: {}", counts.num_cells());

        counts.write_per_cell_dir(&params.path_out, &antibody_names, params.min_count)?;
        if let Some(path_long_csv) = &params.path_long_csv {
            counts.write_long_csv(path_long_csv, &antibody_names, params.min_count)?;
        }

        Ok(counts)
    }
}

fn load_index(path: &PathBuf, policy: CollisionPolicy) -> anyhow::Result<HammingIndex> {
    let barcodes = whitelist::read_barcode_list_file(path)?;
    let index = HammingIndex::with_distance(barcodes, 1, policy)
        .with_context(|| format!("Failed to build barcode index from {}", path.display()))?;
    info!(
        "Loaded {} barcodes from {}, {} correctable variants",
        index.len(),
        path.display(),
        index.num_variants()
    );
    Ok(index)
}

///////////////////////////////
/// Barcodes of another length than the chemistry cuts out can never be matched
fn check_barcode_length(index: &HammingIndex, expected: usize, kind: &str) {
    match index.barcode_length() {
        Some(len) if len == expected => {}
        Some(len) => warn!(
            "All {} barcodes have length {}, but the chemistry extracts {} bases",
            kind, len, expected
        ),
        None if index.is_empty() => warn!("The {} barcode whitelist is empty", kind),
        None => warn!(
            "The {} barcodes have differing lengths; only those of length {} can match",
            kind, expected
        ),
    }
}

///////////////////////////////
/// Decode and tally one batch of read pairs in parallel. Counting does not depend on order
pub fn count_batch(
    batch: &[RecordPair],
    chemistry: &DabseqChemistry,
    cell_index: &HammingIndex,
    antibody_index: &HammingIndex,
) -> CellAntibodyCounts {
    let counts = batch
        .par_iter()
        .fold(CellAntibodyCounts::new, |mut counts, pair| {
            let decoded = chemistry.decode(pair.r1.seq(), pair.r2.seq(), cell_index, antibody_index);
            counts.add_decoded(&decoded);
            counts
        })
        .reduce(CellAntibodyCounts::new, |mut a, b| {
            a.merge(b);
            a
        });
    debug!("batch of {} pairs, {} cells", batch.len(), counts.num_cells());
    counts
}
