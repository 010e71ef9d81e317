// ambiguity.rs - IUPAC-aware column distance and its per-run cache

use std::collections::HashMap;

use crate::error::{DiscoError, Result};

const BASE_A: u8 = 1 << 0;
const BASE_C: u8 = 1 << 1;
const BASE_G: u8 = 1 << 2;
const BASE_T: u8 = 1 << 3;
const BASE_U: u8 = 1 << 4;
const GAP: u8 = 1 << 5;

/// Base sets of every accepted symbol, indexed by ASCII byte. Zero means "not
/// in the alphabet".
static SYMBOL_SETS: [u8; 256] = build_symbol_table();

const fn build_symbol_table() -> [u8; 256] {
    let mut table = [0u8; 256];
    // Standard symbols are singletons
    table[b'A' as usize] = BASE_A;
    table[b'C' as usize] = BASE_C;
    table[b'G' as usize] = BASE_G;
    table[b'T' as usize] = BASE_T;
    table[b'U' as usize] = BASE_U;
    table[b'-' as usize] = GAP;
    // IUPAC ambiguity codes
    table[b'N' as usize] = BASE_A | BASE_C | BASE_G | BASE_T | BASE_U;
    table[b'R' as usize] = BASE_A | BASE_G;
    table[b'Y' as usize] = BASE_C | BASE_T | BASE_U;
    table[b'S' as usize] = BASE_C | BASE_G;
    table[b'W' as usize] = BASE_A | BASE_T | BASE_U;
    table[b'K' as usize] = BASE_G | BASE_T | BASE_U;
    table[b'M' as usize] = BASE_A | BASE_C;
    table[b'B' as usize] = BASE_C | BASE_G | BASE_T | BASE_U;
    table[b'V' as usize] = BASE_A | BASE_C | BASE_G;
    table[b'D' as usize] = BASE_A | BASE_G | BASE_T | BASE_U;
    table[b'H' as usize] = BASE_A | BASE_C | BASE_T | BASE_U;
    table
}

/// Read-only view over the ambiguity symbol table
pub struct AmbiguitySymbolSet;

impl AmbiguitySymbolSet {
    /// Bit set of standard bases (and gap) a symbol can stand for
    pub fn base_set(symbol: u8) -> Option<u8> {
        match SYMBOL_SETS[symbol as usize] {
            0 => None,
            set => Some(set),
        }
    }

    pub fn is_valid(symbol: u8) -> bool {
        SYMBOL_SETS[symbol as usize] != 0
    }

    /// True for A, C, G, T, U and gap
    pub fn is_standard(symbol: u8) -> bool {
        SYMBOL_SETS[symbol as usize].count_ones() == 1
    }

    /// Two symbols are compatible when their base sets intersect
    pub fn compatible(a: u8, b: u8) -> bool {
        SYMBOL_SETS[a as usize] & SYMBOL_SETS[b as usize] != 0
    }

    /// Check a whole residue string, returning the first invalid symbol
    pub fn validate(residues: &[u8]) -> Result<()> {
        match residues.iter().position(|&c| !Self::is_valid(c)) {
            Some(pos) => Err(DiscoError::InvalidSymbol {
                id: None,
                symbol: residues[pos] as char,
                column: pos + 1,
            }),
            None => Ok(()),
        }
    }
}

/// Ambiguity-tolerant column distance between two pre-aligned sequences.
///
/// Each column contributes 0 when the symbols are identical or their base sets
/// intersect, and 1 otherwise. No insertions or deletions are modelled.
pub fn ambiguity_distance(seq1: &[u8], seq2: &[u8]) -> Result<usize> {
    if seq1.len() != seq2.len() {
        return Err(DiscoError::UnequalLength {
            id: "<pair>".to_string(),
            expected: seq1.len(),
            found: seq2.len(),
        });
    }

    let mut distance = 0;
    for (column, (&a, &b)) in seq1.iter().zip(seq2.iter()).enumerate() {
        let set_a = SYMBOL_SETS[a as usize];
        let set_b = SYMBOL_SETS[b as usize];
        if set_a == 0 || set_b == 0 {
            let symbol = if set_a == 0 { a } else { b };
            return Err(DiscoError::InvalidSymbol {
                id: None,
                symbol: symbol as char,
                column: column + 1,
            });
        }
        if a != b && set_a & set_b == 0 {
            distance += 1;
        }
    }
    Ok(distance)
}

/// Distance cache owned by one run, keyed by the unordered pair of sequence
/// contents. Contents are interned so each key is two integers.
#[derive(Debug, Default)]
pub struct DistanceCache {
    interned: HashMap<Vec<u8>, usize>,
    distances: HashMap<(usize, usize), usize>,
    hits: usize,
}

impl DistanceCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn intern(&mut self, sequence: &[u8]) -> usize {
        if let Some(&key) = self.interned.get(sequence) {
            return key;
        }
        let key = self.interned.len();
        self.interned.insert(sequence.to_vec(), key);
        key
    }

    /// Get the distance between two sequences, computing it on a cache miss
    pub fn distance(&mut self, seq1: &[u8], seq2: &[u8]) -> Result<usize> {
        let key1 = self.intern(seq1);
        let key2 = self.intern(seq2);

        // Identical content
        if key1 == key2 {
            AmbiguitySymbolSet::validate(seq1)?;
            self.hits += 1;
            return Ok(0);
        }

        let key = if key1 <= key2 { (key1, key2) } else { (key2, key1) };
        if let Some(&distance) = self.distances.get(&key) {
            self.hits += 1;
            return Ok(distance);
        }

        let distance = ambiguity_distance(seq1, seq2)?;
        self.distances.insert(key, distance);
        Ok(distance)
    }

    /// Cache statistics: (stored pairs, distinct sequences, hits)
    pub fn stats(&self) -> (usize, usize, usize) {
        (self.distances.len(), self.interned.len(), self.hits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identical_and_symmetric() {
        let a = b"ACGTRYN-";
        let b = b"ACTTAYG-";
        assert_eq!(ambiguity_distance(a, a).unwrap(), 0);
        assert_eq!(
            ambiguity_distance(a, b).unwrap(),
            ambiguity_distance(b, a).unwrap()
        );
    }

    #[test]
    fn test_standard_bases_are_singletons() {
        assert_eq!(ambiguity_distance(b"A", b"C").unwrap(), 1);
        assert_eq!(ambiguity_distance(b"T", b"U").unwrap(), 1);
        assert_eq!(ambiguity_distance(b"A", b"-").unwrap(), 1);
        assert_eq!(ambiguity_distance(b"ACGT", b"TGCA").unwrap(), 4);
    }

    #[test]
    fn test_ambiguity_codes_intersect() {
        // R = {A,G}
        assert_eq!(ambiguity_distance(b"R", b"A").unwrap(), 0);
        assert_eq!(ambiguity_distance(b"R", b"C").unwrap(), 1);
        // R = {A,G}, Y = {C,T,U}: disjoint
        assert_eq!(ambiguity_distance(b"R", b"Y").unwrap(), 1);
        // S = {C,G}, K = {G,T,U}: share G
        assert_eq!(ambiguity_distance(b"S", b"K").unwrap(), 0);
        // N covers every base but not the gap
        assert_eq!(ambiguity_distance(b"N", b"U").unwrap(), 0);
        assert_eq!(ambiguity_distance(b"N", b"-").unwrap(), 1);
    }

    #[test]
    fn test_pair_penalty_matches_set_intersection() {
        let symbols = b"ACGTU-NRYSWKMBVDH";
        for &a in symbols {
            for &b in symbols {
                let expected = if a == b || AmbiguitySymbolSet::compatible(a, b) { 0 } else { 1 };
                assert_eq!(ambiguity_distance(&[a], &[b]).unwrap(), expected);
            }
        }
    }

    #[test]
    fn test_invalid_symbol() {
        let err = ambiguity_distance(b"ACXT", b"ACGT").unwrap_err();
        match err {
            DiscoError::InvalidSymbol { symbol, column, .. } => {
                assert_eq!(symbol, 'X');
                assert_eq!(column, 3);
            }
            other => panic!("unexpected error: {}", other),
        }
        assert!(ambiguity_distance(b"acgt", b"ACGT").is_err());
    }

    #[test]
    fn test_unequal_length_is_rejected() {
        assert!(matches!(
            ambiguity_distance(b"ACG", b"ACGT"),
            Err(DiscoError::UnequalLength { .. })
        ));
    }

    #[test]
    fn test_symbol_set_queries() {
        assert!(AmbiguitySymbolSet::is_standard(b'-'));
        assert!(!AmbiguitySymbolSet::is_standard(b'N'));
        assert_eq!(AmbiguitySymbolSet::base_set(b'M'), Some(BASE_A | BASE_C));
        assert_eq!(AmbiguitySymbolSet::base_set(b'X'), None);
        assert!(AmbiguitySymbolSet::validate(b"ACGTN-").is_ok());
        assert!(AmbiguitySymbolSet::validate(b"ACGT*").is_err());
    }

    #[test]
    fn test_cache_reuses_unordered_pairs() {
        let mut cache = DistanceCache::new();
        assert_eq!(cache.distance(b"AAAA", b"AACC").unwrap(), 2);
        assert_eq!(cache.distance(b"AACC", b"AAAA").unwrap(), 2);
        assert_eq!(cache.distance(b"AAAA", b"AAAA").unwrap(), 0);

        let (pairs, sequences, hits) = cache.stats();
        assert_eq!(pairs, 1);
        assert_eq!(sequences, 2);
        assert_eq!(hits, 2);
    }

    #[test]
    fn test_independent_caches() {
        let mut first = DistanceCache::new();
        let second = DistanceCache::new();
        first.distance(b"AC", b"AG").unwrap();
        assert_eq!(second.stats(), (0, 0, 0));
    }
}
