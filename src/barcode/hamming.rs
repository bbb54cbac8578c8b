// This software is released under the MIT license.
// See file LICENSE for full license details.
use std::collections::HashSet;

use anyhow::bail;
use log::{debug, warn};
use rustc_hash::FxHashMap;

use super::motif::hamming_distance;

/// Symbols that a noisy variant may carry at a substituted position
pub const BARCODE_ALPHABET: [u8; 5] = [b'A', b'C', b'G', b'T', b'N'];

///////////////////////////////
/// Canonical spelling of a whitelist barcode: surrounding whitespace removed, upper case
pub fn normalize_barcode(bc: &str) -> String {
    bc.trim().to_ascii_uppercase()
}

///////////////////////////////
/// What to do when the 1-substitution neighborhoods of two canonical barcodes overlap
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CollisionPolicy {
    /// Refuse to build the index
    #[default]
    Reject,
    /// Keep the mapping that was inserted first, and count the collision
    KeepFirst,
}

///////////////////////////////
/// Lookup table from observed barcodes to the whitelisted (canonical) barcode they came from.
///
/// Every canonical barcode maps to itself, and every string at Hamming distance 1 from it
/// (over A/C/G/T/N) maps to it as well. The index is immutable once built and can be shared
/// across threads by reference.
#[derive(Clone, Debug)]
pub struct HammingIndex {
    //Canonical barcodes in insertion order. Values of the map index into this
    canonical: Vec<String>,
    canonical_set: HashSet<String>,
    noisy_to_canonical: FxHashMap<Vec<u8>, usize>,
    num_collisions: usize,
}
impl HammingIndex {
    ///////////////////////////////
    /// Build an index correcting up to one substitution, rejecting overlapping neighborhoods
    pub fn new<I, S>(barcodes: I) -> anyhow::Result<HammingIndex>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        HammingIndex::with_distance(barcodes, 1, CollisionPolicy::Reject)
    }

    ///////////////////////////////
    /// Build an index. Only `hamming_dist == 1` is supported; anything else is an error.
    /// Duplicated barcodes are inserted once.
    pub fn with_distance<I, S>(
        barcodes: I,
        hamming_dist: usize,
        policy: CollisionPolicy,
    ) -> anyhow::Result<HammingIndex>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        if hamming_dist != 1 {
            bail!(
                "Only a Hamming distance of 1 is supported for barcode correction, got {}",
                hamming_dist
            );
        }

        let mut index = HammingIndex {
            canonical: Vec::new(),
            canonical_set: HashSet::new(),
            noisy_to_canonical: FxHashMap::default(),
            num_collisions: 0,
        };
        for bc in barcodes {
            index.add_barcode(bc.as_ref(), policy)?;
        }

        if index.num_collisions > 0 {
            warn!(
                "{} noisy barcode variants were shared by more than one canonical barcode; the first inserted was kept",
                index.num_collisions
            );
        }
        debug!(
            "Built Hamming index over {} barcodes, {} entries",
            index.canonical.len(),
            index.noisy_to_canonical.len()
        );
        Ok(index)
    }

    ///////////////////////////////
    /// Insert one canonical barcode and all of its 1-substitution neighbors
    fn add_barcode(&mut self, bc: &str, policy: CollisionPolicy) -> anyhow::Result<()> {
        let bc = normalize_barcode(bc);
        if bc.is_empty() {
            bail!("Empty barcode in whitelist");
        }
        if let Some(c) = bc.bytes().find(|c| !BARCODE_ALPHABET.contains(c)) {
            bail!("Barcode {} contains invalid symbol '{}'", bc, c as char);
        }
        if self.canonical_set.contains(&bc) {
            return Ok(());
        }

        let bc_index = self.canonical.len();
        self.canonical.push(bc.clone());
        self.canonical_set.insert(bc.clone());

        let seq = bc.as_bytes();
        self.insert_variant(seq.to_vec(), bc_index, policy)?;
        for i in 0..seq.len() {
            for &base in BARCODE_ALPHABET.iter() {
                if base == seq[i] {
                    continue;
                }
                let mut neighbor = seq.to_vec();
                neighbor[i] = base;
                self.insert_variant(neighbor, bc_index, policy)?;
            }
        }
        Ok(())
    }

    fn insert_variant(
        &mut self,
        variant: Vec<u8>,
        bc_index: usize,
        policy: CollisionPolicy,
    ) -> anyhow::Result<()> {
        if let Some(&existing) = self.noisy_to_canonical.get(&variant) {
            if existing != bc_index {
                match policy {
                    CollisionPolicy::Reject => bail!(
                        "Barcodes {} and {} are {} substitutions apart: both correct {}",
                        self.canonical[existing],
                        self.canonical[bc_index],
                        hamming_distance(
                            self.canonical[existing].as_bytes(),
                            self.canonical[bc_index].as_bytes()
                        ),
                        String::from_utf8_lossy(&variant)
                    ),
                    CollisionPolicy::KeepFirst => self.num_collisions += 1,
                }
            }
            return Ok(());
        }
        self.noisy_to_canonical.insert(variant, bc_index);
        Ok(())
    }

    ///////////////////////////////
    /// Is this exactly a canonical barcode? Noisy variants are not considered
    pub fn is_valid(&self, bc: &str) -> bool {
        self.canonical_set.contains(bc)
    }

    ///////////////////////////////
    /// Map an observed barcode to its canonical form, if it is within one substitution
    #[inline(always)]
    pub fn correct(&self, observed: &[u8]) -> Option<&str> {
        self.noisy_to_canonical
            .get(observed)
            .map(|&i| self.canonical[i].as_str())
    }

    /// Number of canonical barcodes
    pub fn len(&self) -> usize {
        self.canonical.len()
    }

    pub fn is_empty(&self) -> bool {
        self.canonical.is_empty()
    }

    /// Number of observed strings that can be corrected, canonical ones included
    pub fn num_variants(&self) -> usize {
        self.noisy_to_canonical.len()
    }

    pub fn num_collisions(&self) -> usize {
        self.num_collisions
    }

    ///////////////////////////////
    /// The length shared by all canonical barcodes, if there is one
    pub fn barcode_length(&self) -> Option<usize> {
        let first = self.canonical.first()?.len();
        if self.canonical.iter().all(|bc| bc.len() == first) {
            Some(first)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    //Pairwise more than 3 substitutions apart
    const WHITELIST: [&str; 3] = ["TAGACCATG", "TGAACGGTT", "CCTTGGAAC"];

    #[test]
    fn test_canonical_maps_to_itself() {
        let index = HammingIndex::new(WHITELIST).unwrap();
        for bc in WHITELIST {
            assert!(index.is_valid(bc));
            assert_eq!(index.correct(bc.as_bytes()), Some(bc));
        }
        assert_eq!(index.len(), 3);
        assert_eq!(index.num_variants(), 3 * (9 * 4 + 1));
        assert_eq!(index.barcode_length(), Some(9));
    }

    #[test]
    fn test_all_single_substitutions_resolve() {
        let index = HammingIndex::new(WHITELIST).unwrap();
        for bc in WHITELIST {
            let seq = bc.as_bytes();
            for i in 0..seq.len() {
                for &base in BARCODE_ALPHABET.iter().filter(|&&b| b != seq[i]) {
                    let mut noisy = seq.to_vec();
                    noisy[i] = base;
                    assert_eq!(index.correct(&noisy), Some(bc));
                    assert!(!index.is_valid(std::str::from_utf8(&noisy).unwrap()));
                }
            }
        }
    }

    #[test]
    fn test_n_substitution() {
        let index = HammingIndex::new(["TAGACCATG"]).unwrap();
        assert_eq!(index.correct(b"TAGACCATN"), Some("TAGACCATG"));
        assert_eq!(index.correct(b"TAGACCANN"), None);
        assert_eq!(index.correct(b"TAGACCAT"), None);
    }

    #[test]
    fn test_duplicates_are_idempotent() {
        let index = HammingIndex::new(["TAGACCATG", "TAGACCATG", "tagaccatg "]).unwrap();
        assert_eq!(index.len(), 1);
        assert_eq!(index.num_variants(), 37);
    }

    #[test]
    fn test_unsupported_distance() {
        assert!(HammingIndex::with_distance(WHITELIST, 2, CollisionPolicy::Reject).is_err());
        assert!(HammingIndex::with_distance(WHITELIST, 0, CollisionPolicy::Reject).is_err());
    }

    #[test]
    fn test_collision_policy() {
        //Two substitutions apart, so neighborhoods overlap
        let close = ["AAAAAAAAA", "AAAAAAACC"];
        assert!(HammingIndex::new(close).is_err());

        let index = HammingIndex::with_distance(close, 1, CollisionPolicy::KeepFirst).unwrap();
        assert!(index.num_collisions() > 0);
        assert_eq!(index.correct(b"AAAAAAAAC"), Some("AAAAAAAAA"));
        assert_eq!(index.correct(b"AAAAAAACC"), Some("AAAAAAACC"));
    }

    #[test]
    fn test_lower_case_whitelist() {
        let index = HammingIndex::new([" ccgtgttcctcatta"]).unwrap();
        assert!(index.is_valid("CCGTGTTCCTCATTA"));
        assert_eq!(index.correct(b"CCGTGTTCCTCATTA"), Some("CCGTGTTCCTCATTA"));
        assert_eq!(normalize_barcode(" ccgtgTTCCTCATTA\t"), "CCGTGTTCCTCATTA");
    }

    #[test]
    fn test_invalid_symbols() {
        assert!(HammingIndex::new(["ACGTX"]).is_err());
        assert!(HammingIndex::new([""]).is_err());
    }
}
