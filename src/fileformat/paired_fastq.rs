// This software is released under the MIT license.
// See file LICENSE for full license details.
use std::fs::File;
use std::path::Path;

use anyhow::{bail, Context};
use log::debug;
use seq_io::fastq::OwnedRecord;
use seq_io::fastq::Reader as FastqReader;
use seq_io::fastq::Record as FastqRecord;

///////////////////////////////
/// One R1/R2 read pair with matching headers
#[derive(Debug, Clone)]
pub struct RecordPair {
    pub r1: OwnedRecord,
    pub r2: OwnedRecord,
}

///////////////////////////////
/// Reads R1 and R2 in lockstep. Files may be plain or compressed
pub struct PairedFastqReader {
    reader_r1: FastqReader<Box<dyn std::io::Read>>,
    reader_r2: FastqReader<Box<dyn std::io::Read>>,
    num_pairs: u64,
}
impl PairedFastqReader {
    pub fn new(
        reader_r1: FastqReader<Box<dyn std::io::Read>>,
        reader_r2: FastqReader<Box<dyn std::io::Read>>,
    ) -> PairedFastqReader {
        PairedFastqReader {
            reader_r1,
            reader_r2,
            num_pairs: 0,
        }
    }

    pub fn open(path_r1: &Path, path_r2: &Path) -> anyhow::Result<PairedFastqReader> {
        Ok(PairedFastqReader::new(
            open_fastq(path_r1)?,
            open_fastq(path_r2)?,
        ))
    }

    ///////////////////////////////
    /// Get the next pair. `None` when R1 is exhausted.
    ///
    /// Fails if a record is malformed, if R2 ends before R1, or if the two headers do not
    /// describe the same fragment
    pub fn next_pair(&mut self) -> anyhow::Result<Option<RecordPair>> {
        let record_r1 = match self.reader_r1.next() {
            None => return Ok(None),
            Some(record) => record
                .with_context(|| format!("Malformed R1 record after pair {}", self.num_pairs))?,
        };
        let record_r2 = match self.reader_r2.next() {
            None => bail!("R2 ended before R1, after pair {}", self.num_pairs),
            Some(record) => record
                .with_context(|| format!("Malformed R2 record after pair {}", self.num_pairs))?,
        };

        if record_r1.seq().len() != record_r1.qual().len()
            || record_r2.seq().len() != record_r2.qual().len()
        {
            bail!(
                "Sequence and quality lengths differ in pair {}",
                self.num_pairs + 1
            );
        }

        let core_r1 = core_header(record_r1.head());
        let core_r2 = core_header(record_r2.head());
        if core_r1 != core_r2 {
            bail!(
                "R1 and R2 are out of sync: {} vs {}",
                String::from_utf8_lossy(core_r1),
                String::from_utf8_lossy(core_r2)
            );
        }

        self.num_pairs += 1;
        Ok(Some(RecordPair {
            r1: record_r1.to_owned_record(),
            r2: record_r2.to_owned_record(),
        }))
    }

    ///////////////////////////////
    /// Get up to `max_pairs` pairs. An empty list means there is nothing more to read
    pub fn next_batch(&mut self, max_pairs: usize) -> anyhow::Result<Vec<RecordPair>> {
        let mut batch = Vec::with_capacity(max_pairs);
        while batch.len() < max_pairs {
            match self.next_pair()? {
                Some(pair) => batch.push(pair),
                None => break,
            }
        }
        Ok(batch)
    }

    /// Number of pairs returned so far
    pub fn num_pairs(&self) -> u64 {
        self.num_pairs
    }
}

///////////////////////////////
/// The part of an Illumina header shared by R1 and R2, i.e. everything before the first space
pub fn core_header(head: &[u8]) -> &[u8] {
    match head.iter().position(|&c| c == b' ') {
        Some(pos) => &head[..pos],
        None => head,
    }
}

/// Open a FASTQ file
pub fn open_fastq(path: &Path) -> anyhow::Result<FastqReader<Box<dyn std::io::Read>>> {
    let opened_handle = File::open(path)
        .with_context(|| format!("Could not open fastq file {}", path.display()))?;

    let (reader, compression) = niffler::get_reader(Box::new(opened_handle))
        .with_context(|| format!("Could not open fastq file {}", path.display()))?;

    debug!(
        "Opened file {} with compression {:?}",
        path.display(),
        &compression
    );
    Ok(FastqReader::new(reader))
}
