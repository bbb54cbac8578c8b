// This software is released under the MIT license.
// See file LICENSE for full license details.
pub mod count_table;
pub mod paired_fastq;
pub mod whitelist;

pub use count_table::CellAntibodyCounts;
pub use count_table::DecodeStats;
pub use paired_fastq::PairedFastqReader;
pub use paired_fastq::RecordPair;
