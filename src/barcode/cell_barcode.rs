// This software is released under the MIT license.
// See file LICENSE for full license details.
use log::trace;

use super::chemistry::CellBarcodeLayout;
use super::hamming::HammingIndex;
use super::motif::find_with_mismatches;

///////////////////////////////
/// A decoded cell barcode: two corrected halves, borrowed from the whitelist index
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CellBarcode<'a> {
    pub bc1: &'a str,
    pub bc2: &'a str,
}
impl CellBarcode<'_> {
    ///////////////////////////////
    /// Full cell identity, halves joined with `_`
    pub fn cell_id(&self) -> String {
        format!("{}_{}", self.bc1, self.bc2)
    }
}

impl CellBarcodeLayout {
    ///////////////////////////////
    /// Decode the cell barcode from an R1 sequence.
    ///
    /// The anchor must be found far enough into the read for the second half to fit in front
    /// of it. Both halves must be correctable, otherwise the read has no cell barcode
    pub fn extract<'a>(&self, seq: &[u8], index: &'a HammingIndex) -> Option<CellBarcode<'a>> {
        let anchor_pos = find_with_mismatches(seq, &self.anchor_motif, self.anchor_max_mismatches);
        let anchor_pos = match anchor_pos {
            Some(pos) if pos >= self.half_length => pos,
            _ => {
                trace!("no usable anchor in R1 {:?}", anchor_pos);
                return None;
            }
        };

        let half1 = seq.get(0..self.half_length)?;
        let half2 = seq.get(anchor_pos - self.half_length..anchor_pos)?;

        let bc1 = index.correct(half1)?;
        let bc2 = index.correct(half2)?;
        Some(CellBarcode { bc1, bc2 })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn whitelist() -> HammingIndex {
        HammingIndex::new(["TAGACCATG", "TGAACGGTT", "CCTTGGAAC"]).unwrap()
    }

    #[test]
    fn test_anchor_after_both_halves() {
        let index = whitelist();
        let layout = CellBarcodeLayout::default();
        let seq = b"TAGACCATGTGAACGGTTGTACTCGCAGTAGTCCGACTGAGATTCTAG";

        let bc = layout.extract(seq, &index).unwrap();
        assert_eq!(bc.bc1, "TAGACCATG");
        assert_eq!(bc.bc2, "TGAACGGTT");
        assert_eq!(bc.cell_id(), "TAGACCATG_TGAACGGTT");
    }

    #[test]
    fn test_spacer_between_halves_with_noise() {
        //Real reads carry a spacer between the halves, and an N in the first half
        let index = whitelist();
        let layout = CellBarcodeLayout::default();
        let seq = b"TNGACCATGAGTACGTACGAGTCTGAACGGTTGTACTCGCAGTAGTCCGACTGAGATNCTAGATCGG";

        let bc = layout.extract(seq, &index).unwrap();
        assert_eq!(bc.bc1, "TAGACCATG");
        assert_eq!(bc.bc2, "TGAACGGTT");
    }

    #[test]
    fn test_anchor_with_one_mismatch() {
        let index = whitelist();
        let layout = CellBarcodeLayout::default();
        let seq = b"TAGACCATGTGAACGGTTGTACTCGCTGTAGTCCGACTG";
        assert!(layout.extract(seq, &index).is_some());
    }

    #[test]
    fn test_missing_or_early_anchor() {
        let index = whitelist();
        let layout = CellBarcodeLayout::default();

        //No anchor at all
        assert_eq!(layout.extract(b"TAGACCATGTGAACGGTTAAAAAAAAAAAAAAAAAAAAA", &index), None);

        //Anchor at offset 4, not enough room for the second half
        assert_eq!(layout.extract(b"TAGAGTACTCGCAGTAGTCAAAAAAAAA", &index), None);

        //Too short for anything
        assert_eq!(layout.extract(b"TAGACC", &index), None);
        assert_eq!(layout.extract(b"", &index), None);
    }

    #[test]
    fn test_uncorrectable_half() {
        let index = whitelist();
        let layout = CellBarcodeLayout::default();

        //Second half two substitutions away from TGAACGGTT
        let seq = b"TAGACCATGTGAACGGAAGTACTCGCAGTAGTCCGACTG";
        assert_eq!(layout.extract(seq, &index), None);

        //First half two substitutions away from TAGACCATG
        let seq = b"TAGACCANNTGAACGGTTGTACTCGCAGTAGTCCGACTG";
        assert_eq!(layout.extract(seq, &index), None);
    }

    #[test]
    fn test_anchor_at_exact_minimum_offset() {
        //The anchor right after a single half: both halves are the same 9 bases
        let index = whitelist();
        let layout = CellBarcodeLayout::default();
        let seq = b"TAGACCATGGTACTCGCAGTAGTCAAAA";
        let bc = layout.extract(seq, &index).unwrap();
        assert_eq!(bc.bc1, "TAGACCATG");
        assert_eq!(bc.bc2, "TAGACCATG");
    }
}
