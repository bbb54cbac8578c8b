// This software is released under the MIT license.
// See file LICENSE for full license details.
pub mod barcode;
pub mod command;
pub mod fileformat;

pub use barcode::DabseqChemistry;
pub use barcode::HammingIndex;
