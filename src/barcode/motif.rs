// This software is released under the MIT license.
// See file LICENSE for full license details.

///////////////////////////////
/// Find the leftmost position where `motif` matches `seq` with at most `max_mismatches`
/// substitutions. No indels are considered.
///
/// The first qualifying offset wins, even if a later offset would match with fewer mismatches.
/// An empty motif, or a motif longer than the sequence, never matches.
pub fn find_with_mismatches(seq: &[u8], motif: &[u8], max_mismatches: usize) -> Option<usize> {
    if motif.is_empty() || seq.len() < motif.len() {
        return None;
    }

    for start in 0..=(seq.len() - motif.len()) {
        let window = &seq[start..start + motif.len()];

        //Give up on this window once it has too many mismatches
        let mut mismatches = 0;
        for (a, b) in window.iter().zip(motif.iter()) {
            if a != b {
                mismatches += 1;
                if mismatches > max_mismatches {
                    break;
                }
            }
        }

        if mismatches <= max_mismatches {
            return Some(start);
        }
    }
    None
}

///////////////////////////////
/// Number of positions at which two equal-length sequences differ
pub fn hamming_distance(a: &[u8], b: &[u8]) -> usize {
    a.iter().zip(b.iter()).filter(|(x, y)| x != y).count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_first_occurrence() {
        let seq = b"AAGTACTTTGTACTT";
        assert_eq!(find_with_mismatches(seq, b"GTACT", 0), Some(2));
        assert_eq!(find_with_mismatches(b"GTACT", b"GTACT", 0), Some(0));
    }

    #[test]
    fn test_mismatch_tolerance_boundary() {
        //Motif placed at offset 4 with exactly one substitution
        let seq = b"CCCCGTACTCGCAGTAGTCCCCC";
        let motif = b"GTACTCGCAGTAGTC";
        let mut noisy = seq.to_vec();
        noisy[6] = b'T';
        assert_eq!(find_with_mismatches(&noisy, motif, 1), Some(4));
        assert_eq!(find_with_mismatches(&noisy, motif, 0), None);

        //Two substitutions need a tolerance of two
        noisy[10] = b'A';
        assert_eq!(find_with_mismatches(&noisy, motif, 1), None);
        assert_eq!(find_with_mismatches(&noisy, motif, 2), Some(4));
    }

    #[test]
    fn test_leftmost_not_best() {
        //Offset 0 has one mismatch, offset 5 is exact. Leftmost wins
        let seq = b"ACGTTACGTA";
        assert_eq!(find_with_mismatches(seq, b"ACGTA", 1), Some(0));
        assert_eq!(find_with_mismatches(seq, b"ACGTA", 0), Some(5));
    }

    #[test]
    fn test_degenerate_inputs() {
        assert_eq!(find_with_mismatches(b"ACGT", b"", 3), None);
        assert_eq!(find_with_mismatches(b"ACG", b"ACGT", 3), None);
        assert_eq!(find_with_mismatches(b"", b"A", 0), None);
    }

    #[test]
    fn test_hamming_distance() {
        assert_eq!(hamming_distance(b"ACGT", b"ACGT"), 0);
        assert_eq!(hamming_distance(b"ACGT", b"ACGN"), 1);
        assert_eq!(hamming_distance(b"AAAA", b"TTTT"), 4);
    }
}
