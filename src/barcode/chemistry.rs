// This software is released under the MIT license.
// See file LICENSE for full license details.
use anyhow::bail;

use super::cell_barcode::CellBarcode;
use super::hamming::HammingIndex;

/// Anchor found right after the cell barcode in R1
pub const R1_START_MOTIF: &str = "GTACTCGCAGTAGTC";
/// Tn5 mosaic end, at the end of the R1 insert
pub const R1_END_MOTIF: &str = "CTGTCTCTTATACACATCT";
/// Reverse complement of the R1 anchor, as seen from R2
pub const R2_END_MOTIF: &str = "GACTACTGCGAGTAC";

/// 5' handle before the TotalSeq antibody barcode
pub const H5_AB_HANDLE: &str = "TGACTACGCTACTCATGG";
/// Alternative 3' handle. Payload is everything before it
pub const H3A_AB_HANDLE: &str = "GCTTTAAGGCCGGTCCTAGC";
/// 3' handle used together with the 5' handle
pub const H3B_AB_HANDLE: &str = "GAGCCGATCTAGTATCTCAGTCG";

///////////////////////////////
/// Where the two cell barcode halves sit in R1.
///
/// The first half is the start of the read. The second half is the `half_length` bases
/// right before the anchor motif.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CellBarcodeLayout {
    pub anchor_motif: Vec<u8>,
    pub anchor_max_mismatches: usize,
    pub half_length: usize,
}
impl Default for CellBarcodeLayout {
    fn default() -> CellBarcodeLayout {
        CellBarcodeLayout {
            anchor_motif: R1_START_MOTIF.as_bytes().to_vec(),
            anchor_max_mismatches: 1,
            half_length: 9,
        }
    }
}

///////////////////////////////
/// One way of isolating the antibody barcode from R2
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PayloadStrategy {
    /// Payload lies strictly between two handles, each searched over the whole read
    Flanked {
        five_prime: Vec<u8>,
        three_prime: Vec<u8>,
        max_mismatches: usize,
    },
    /// Payload is everything from the read start up to the handle
    BeforeHandle {
        handle: Vec<u8>,
        max_mismatches: usize,
    },
}

///////////////////////////////
/// Layout of the antibody barcode in R2. Strategies are tried in order; the first one
/// that yields a payload wins
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AntibodyBarcodeLayout {
    pub strategies: Vec<PayloadStrategy>,
    pub payload_length: usize,
}
impl Default for AntibodyBarcodeLayout {
    fn default() -> AntibodyBarcodeLayout {
        AntibodyBarcodeLayout {
            strategies: vec![
                PayloadStrategy::Flanked {
                    five_prime: H5_AB_HANDLE.as_bytes().to_vec(),
                    three_prime: H3B_AB_HANDLE.as_bytes().to_vec(),
                    max_mismatches: 1,
                },
                PayloadStrategy::BeforeHandle {
                    handle: H3A_AB_HANDLE.as_bytes().to_vec(),
                    max_mismatches: 1,
                },
            ],
            payload_length: 15,
        }
    }
}

///////////////////////////////
/// Barcode geometry of a DAb-seq library. The default is the Mission Bio cell barcode
/// together with TotalSeq-B antibody tags
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DabseqChemistry {
    pub cell: CellBarcodeLayout,
    pub antibody: AntibodyBarcodeLayout,
}
impl DabseqChemistry {
    ///////////////////////////////
    /// Check that the layout can possibly match anything
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.cell.anchor_motif.is_empty() {
            bail!("Cell barcode anchor motif is empty");
        }
        if self.cell.half_length == 0 {
            bail!("Cell barcode half length must be positive");
        }
        if self.antibody.payload_length == 0 {
            bail!("Antibody barcode length must be positive");
        }
        if self.antibody.strategies.is_empty() {
            bail!("No strategy given for locating the antibody barcode");
        }
        for strategy in &self.antibody.strategies {
            let has_empty = match strategy {
                PayloadStrategy::Flanked {
                    five_prime,
                    three_prime,
                    ..
                } => five_prime.is_empty() || three_prime.is_empty(),
                PayloadStrategy::BeforeHandle { handle, .. } => handle.is_empty(),
            };
            if has_empty {
                bail!("Antibody handle motif is empty in {:?}", strategy);
            }
        }
        Ok(())
    }

    ///////////////////////////////
    /// Decode the cell barcode from R1 and the antibody barcode from R2
    #[inline(always)]
    pub fn decode<'a>(
        &self,
        r1_seq: &[u8],
        r2_seq: &[u8],
        cell_index: &'a HammingIndex,
        antibody_index: &'a HammingIndex,
    ) -> DecodedPair<'a> {
        DecodedPair {
            cell: self.cell.extract(r1_seq, cell_index),
            antibody: self.antibody.extract(r2_seq, antibody_index),
        }
    }
}

///////////////////////////////
/// Outcome of decoding one read pair. Either part may be missing
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DecodedPair<'a> {
    pub cell: Option<CellBarcode<'a>>,
    pub antibody: Option<&'a str>,
}
impl DecodedPair<'_> {
    pub fn is_complete(&self) -> bool {
        self.cell.is_some() && self.antibody.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let chem = DabseqChemistry::default();
        chem.validate().unwrap();
        assert_eq!(chem.cell.anchor_motif.len(), 15);
        assert_eq!(chem.antibody.strategies.len(), 2);
        assert_eq!(chem.antibody.payload_length, 15);
    }

    #[test]
    fn test_invalid_layouts() {
        let mut chem = DabseqChemistry::default();
        chem.antibody.strategies.clear();
        assert!(chem.validate().is_err());

        let mut chem = DabseqChemistry::default();
        chem.cell.half_length = 0;
        assert!(chem.validate().is_err());

        let mut chem = DabseqChemistry::default();
        chem.antibody.strategies.push(PayloadStrategy::BeforeHandle {
            handle: vec![],
            max_mismatches: 0,
        });
        assert!(chem.validate().is_err());
    }

    #[test]
    fn test_decode_pair() {
        let chem = DabseqChemistry::default();
        let cell_index = HammingIndex::new(["TAGACCATG", "TGAACGGTT"]).unwrap();
        let antibody_index = HammingIndex::new(["CCGTGTTCCTCATTA"]).unwrap();

        let r1 = format!("TAGACCATGTGAACGGTT{}CCGACTGAGA", R1_START_MOTIF);
        let r2 = format!("CGANA{}CCGTGTTCCTCATTA{}AAAA", H5_AB_HANDLE, H3B_AB_HANDLE);

        let decoded = chem.decode(r1.as_bytes(), r2.as_bytes(), &cell_index, &antibody_index);
        assert!(decoded.is_complete());
        assert_eq!(decoded.cell.unwrap().cell_id(), "TAGACCATG_TGAACGGTT");
        assert_eq!(decoded.antibody, Some("CCGTGTTCCTCATTA"));

        let decoded = chem.decode(b"ACGT", r2.as_bytes(), &cell_index, &antibody_index);
        assert!(!decoded.is_complete());
        assert_eq!(decoded.cell, None);
        assert!(decoded.antibody.is_some());
    }
}
