// This software is released under the MIT license.
// See file LICENSE for full license details.
pub mod antibody_barcode;
pub mod cell_barcode;
pub mod chemistry;
pub mod hamming;
pub mod motif;

pub use cell_barcode::CellBarcode;
pub use chemistry::AntibodyBarcodeLayout;
pub use chemistry::CellBarcodeLayout;
pub use chemistry::DabseqChemistry;
pub use chemistry::DecodedPair;
pub use chemistry::PayloadStrategy;
pub use hamming::CollisionPolicy;
pub use hamming::HammingIndex;
pub use hamming::normalize_barcode;
pub use motif::find_with_mismatches;
