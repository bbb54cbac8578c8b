// This software is released under the MIT license.
// See file LICENSE for full license details.
use log::trace;

use super::chemistry::{AntibodyBarcodeLayout, PayloadStrategy};
use super::hamming::HammingIndex;
use super::motif::find_with_mismatches;

impl PayloadStrategy {
    ///////////////////////////////
    /// Cut out the payload according to this strategy. The length is not checked here
    pub fn locate<'s>(&self, seq: &'s [u8]) -> Option<&'s [u8]> {
        match self {
            PayloadStrategy::Flanked {
                five_prime,
                three_prime,
                max_mismatches,
            } => {
                //Both handles are searched independently over the whole read
                let pos5 = find_with_mismatches(seq, five_prime, *max_mismatches)?;
                let pos3 = find_with_mismatches(seq, three_prime, *max_mismatches)?;
                let payload_start = pos5 + five_prime.len();
                if pos3 > payload_start {
                    Some(&seq[payload_start..pos3])
                } else {
                    None
                }
            }
            PayloadStrategy::BeforeHandle {
                handle,
                max_mismatches,
            } => {
                let pos = find_with_mismatches(seq, handle, *max_mismatches)?;
                Some(&seq[..pos])
            }
        }
    }
}

impl AntibodyBarcodeLayout {
    ///////////////////////////////
    /// Isolate the raw antibody barcode from an R2 sequence.
    ///
    /// The first strategy that finds its handles decides the payload. Later strategies are
    /// not consulted even if that payload turns out to have the wrong length
    pub fn locate_payload<'s>(&self, seq: &'s [u8]) -> Option<&'s [u8]> {
        self.strategies.iter().find_map(|s| s.locate(seq))
    }

    ///////////////////////////////
    /// Decode and correct the antibody barcode from an R2 sequence
    pub fn extract<'a>(&self, seq: &[u8], index: &'a HammingIndex) -> Option<&'a str> {
        let payload = self.locate_payload(seq)?;
        if payload.len() != self.payload_length {
            trace!(
                "antibody payload of length {}, expected {}",
                payload.len(),
                self.payload_length
            );
            return None;
        }
        index.correct(payload)
    }
}
