// index.rs - All-pairs distance index over an aligned sequence set

use std::collections::{BTreeMap, HashMap};
use std::time::Instant;

use indicatif::{ProgressBar, ProgressStyle};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::core::ambiguity::DistanceCache;
use crate::data::SequenceSet;
use crate::error::{DiscoError, Result};

/// One persisted row of the index: an unordered pair and its distance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistanceTriple {
    pub id_a: String,
    pub id_b: String,
    pub distance: usize,
}

impl DistanceTriple {
    pub fn new(id_a: impl Into<String>, id_b: impl Into<String>, distance: usize) -> Self {
        Self {
            id_a: id_a.into(),
            id_b: id_b.into(),
            distance,
        }
    }
}

/// For every id, the other ids grouped by their exact distance.
///
/// A distance key is present only when at least one neighbor sits at that
/// distance. An id never lists itself and every pair is stored in both
/// directions. Read-only once built.
#[derive(Debug, Clone)]
pub struct DistanceIndex {
    ids: Vec<String>,
    positions: HashMap<String, usize>,
    neighbors: Vec<BTreeMap<usize, Vec<usize>>>,
}

impl DistanceIndex {
    fn empty(sequences: &SequenceSet) -> Self {
        let ids: Vec<String> = sequences.iter().map(|s| s.id.clone()).collect();
        let positions = ids
            .iter()
            .enumerate()
            .map(|(i, id)| (id.clone(), i))
            .collect();
        Self {
            neighbors: vec![BTreeMap::new(); ids.len()],
            ids,
            positions,
        }
    }

    fn insert_pair(&mut self, a: usize, b: usize, distance: usize) -> Result<()> {
        if a == b {
            return Err(DiscoError::Internal(format!(
                "attempted to index '{}' as its own neighbor",
                self.ids[a]
            )));
        }
        self.neighbors[a].entry(distance).or_default().push(b);
        self.neighbors[b].entry(distance).or_default().push(a);
        Ok(())
    }

    /// Compute every unordered pair once and index it symmetrically
    pub fn build(sequences: &SequenceSet, cache: &mut DistanceCache) -> Result<Self> {
        let mut index = Self::empty(sequences);
        let n = sequences.len();
        let total_pairs = n * n.saturating_sub(1) / 2;
        info!(
            "🔄 Building distance index ({} sequences, {} pairs)...",
            n, total_pairs
        );

        let start = Instant::now();
        let pb = ProgressBar::new(total_pairs as u64);
        if let Ok(style) = ProgressStyle::default_bar().template(
            "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {per_sec} ETA: {eta}",
        ) {
            pb.set_style(style.progress_chars("#>-"));
        }
        let update_interval = std::cmp::max(1, total_pairs / 100);

        let seqs = sequences.as_slice();
        let mut done = 0usize;
        for i in 0..n {
            for j in (i + 1)..n {
                let distance = cache.distance(&seqs[i].residues, &seqs[j].residues)?;
                index.insert_pair(i, j, distance)?;
                done += 1;
                if done % update_interval == 0 {
                    pb.set_position(done as u64);
                }
            }
        }
        pb.finish_and_clear();

        let (cached_pairs, distinct, hits) = cache.stats();
        info!(
            "✅ Distance index built in {:.2}s ({} distinct sequences, {} cached pairs, {} cache hits)",
            start.elapsed().as_secs_f64(),
            distinct,
            cached_pairs,
            hits
        );
        Ok(index)
    }

    /// Rebuild an index from persisted triples.
    ///
    /// Pairs of the current sequence set that the triples do not cover are
    /// computed and added. Returns the index and the number of computed pairs.
    pub fn from_triples(
        triples: &[DistanceTriple],
        sequences: &SequenceSet,
        cache: &mut DistanceCache,
    ) -> Result<(Self, usize)> {
        let mut index = Self::empty(sequences);
        let mut seen: HashMap<(usize, usize), usize> = HashMap::with_capacity(triples.len());

        for triple in triples {
            let a = index.require(&triple.id_a)?;
            let b = index.require(&triple.id_b)?;
            if a == b {
                return Err(DiscoError::InvalidInput(format!(
                    "Persisted distance index pairs '{}' with itself",
                    triple.id_a
                )));
            }

            let key = if a < b { (a, b) } else { (b, a) };
            match seen.get(&key) {
                Some(&known) if known == triple.distance => {
                    debug!("Ignoring repeated pair {} / {}", triple.id_a, triple.id_b);
                }
                Some(&known) => {
                    return Err(DiscoError::InvalidInput(format!(
                        "Persisted distance index lists {} / {} with distances {} and {}",
                        triple.id_a, triple.id_b, known, triple.distance
                    )));
                }
                None => {
                    seen.insert(key, triple.distance);
                    index.insert_pair(a, b, triple.distance)?;
                }
            }
        }

        let seqs = sequences.as_slice();
        let n = seqs.len();
        let mut computed = 0;
        for i in 0..n {
            for j in (i + 1)..n {
                if seen.contains_key(&(i, j)) {
                    continue;
                }
                let distance = cache.distance(&seqs[i].residues, &seqs[j].residues)?;
                index.insert_pair(i, j, distance)?;
                computed += 1;
            }
        }

        info!(
            "📂 Distance index reloaded: {} persisted pairs, {} computed on demand",
            seen.len(),
            computed
        );
        Ok((index, computed))
    }

    fn require(&self, id: &str) -> Result<usize> {
        self.position(id).ok_or_else(|| DiscoError::UnknownSequenceId {
            id: id.to_string(),
            origin: "persisted distance index".to_string(),
        })
    }

    /// Every unordered pair exactly once, in index order
    pub fn triples(&self) -> Vec<DistanceTriple> {
        let mut triples = Vec::new();
        for (a, by_distance) in self.neighbors.iter().enumerate() {
            for (&distance, list) in by_distance {
                for &b in list.iter().filter(|&&b| b > a) {
                    triples.push(DistanceTriple::new(
                        self.ids[a].as_str(),
                        self.ids[b].as_str(),
                        distance,
                    ));
                }
            }
        }
        triples
    }

    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn position(&self, id: &str) -> Option<usize> {
        self.positions.get(id).copied()
    }

    pub fn id(&self, position: usize) -> &str {
        &self.ids[position]
    }

    /// Ids at exactly `distance` from `id`, in insertion order
    pub fn neighbors_at(&self, id: &str, distance: usize) -> Vec<&str> {
        self.position(id)
            .and_then(|p| self.neighbors[p].get(&distance))
            .map(|list| list.iter().map(|&b| self.ids[b].as_str()).collect())
            .unwrap_or_default()
    }

    /// Number of ids at exactly `distance` from `id`
    pub fn count_at(&self, id: &str, distance: usize) -> usize {
        self.position(id)
            .map(|p| self.count_at_position(p, distance))
            .unwrap_or(0)
    }

    pub(crate) fn count_at_position(&self, position: usize, distance: usize) -> usize {
        self.neighbors[position]
            .get(&distance)
            .map(Vec::len)
            .unwrap_or(0)
    }

    /// Positions of every id within `radius` (inclusive) of `position`
    pub(crate) fn within(&self, position: usize, radius: usize) -> impl Iterator<Item = usize> + '_ {
        self.neighbors[position]
            .range(..=radius)
            .flat_map(|(_, list)| list.iter().copied())
    }

    /// True when `candidate` sits within `radius` of `member`
    pub(crate) fn blocks(&self, member: usize, candidate: usize, radius: usize) -> bool {
        self.within(member, radius).any(|p| p == candidate)
    }

    /// Distance between two indexed ids (linear scan of one neighbor map)
    pub fn distance(&self, id_a: &str, id_b: &str) -> Option<usize> {
        let a = self.position(id_a)?;
        let b = self.position(id_b)?;
        if a == b {
            return Some(0);
        }
        self.neighbors[a]
            .iter()
            .find(|(_, list)| list.contains(&b))
            .map(|(&distance, _)| distance)
    }

    /// Total number of directed neighbor entries; N*(N-1) for a complete index
    pub fn directed_entry_count(&self) -> usize {
        self.neighbors
            .iter()
            .map(|by_distance| by_distance.values().map(Vec::len).sum::<usize>())
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_set() -> SequenceSet {
        SequenceSet::from_pairs(vec![
            ("s1", "AAAAAA"),
            ("s2", "AAAAAC"),
            ("s3", "AAAACC"),
            ("s4", "CCCCCC"),
            ("s5", "AAAAAR"),
        ])
        .unwrap()
    }

    #[test]
    fn test_build_is_complete_and_symmetric() {
        let set = sample_set();
        let mut cache = DistanceCache::new();
        let index = DistanceIndex::build(&set, &mut cache).unwrap();

        let n = set.len();
        assert_eq!(index.directed_entry_count(), n * (n - 1));
        for a in set.iter() {
            assert!(index.distance(&a.id, &a.id) == Some(0));
            for b in set.iter().filter(|b| b.id != a.id) {
                assert_eq!(index.distance(&a.id, &b.id), index.distance(&b.id, &a.id));
            }
            for distances in index.neighbors[index.position(&a.id).unwrap()].values() {
                assert!(!distances.contains(&index.position(&a.id).unwrap()));
                assert!(!distances.is_empty());
            }
        }
        assert_eq!(index.distance("s1", "s3"), Some(2));
        assert_eq!(index.distance("s1", "s5"), Some(0));
        assert_eq!(index.distance("s2", "s5"), Some(1));
        assert_eq!(index.neighbors_at("s1", 1), vec!["s2"]);
        assert_eq!(index.count_at("s4", 6), 2);
        assert!(index.neighbors_at("s1", 3).is_empty());
    }

    #[test]
    fn test_triples_cover_each_pair_once() {
        let set = sample_set();
        let mut cache = DistanceCache::new();
        let index = DistanceIndex::build(&set, &mut cache).unwrap();
        let triples = index.triples();
        assert_eq!(triples.len(), 10);
        assert!(triples.contains(&DistanceTriple::new("s1", "s3", 2)));
    }

    #[test]
    fn test_reload_computes_missing_pairs() {
        let set = sample_set();
        let mut cache = DistanceCache::new();
        let full = DistanceIndex::build(&set, &mut cache).unwrap();

        let partial: Vec<DistanceTriple> = full.triples().into_iter().take(4).collect();
        let mut fresh_cache = DistanceCache::new();
        let (reloaded, computed) =
            DistanceIndex::from_triples(&partial, &set, &mut fresh_cache).unwrap();

        assert_eq!(computed, 6);
        assert_eq!(reloaded.directed_entry_count(), 20);
        for triple in full.triples() {
            assert_eq!(
                reloaded.distance(&triple.id_a, &triple.id_b),
                Some(triple.distance)
            );
        }
    }

    #[test]
    fn test_reload_trusts_persisted_distances() {
        let set = SequenceSet::from_pairs(vec![("a", "AAAA"), ("b", "CCCC")]).unwrap();
        let triples = vec![DistanceTriple::new("b", "a", 1)];
        let mut cache = DistanceCache::new();
        let (index, computed) = DistanceIndex::from_triples(&triples, &set, &mut cache).unwrap();
        assert_eq!(computed, 0);
        assert_eq!(index.distance("a", "b"), Some(1));
    }

    #[test]
    fn test_reload_rejects_unknown_ids() {
        let set = sample_set();
        let triples = vec![DistanceTriple::new("s1", "ghost", 3)];
        let mut cache = DistanceCache::new();
        let err = DistanceIndex::from_triples(&triples, &set, &mut cache).unwrap_err();
        assert!(matches!(err, DiscoError::UnknownSequenceId { ref id, .. } if id == "ghost"));
    }

    #[test]
    fn test_reload_rejects_self_and_conflicting_pairs() {
        let set = sample_set();
        let mut cache = DistanceCache::new();

        let selfish = vec![DistanceTriple::new("s1", "s1", 0)];
        assert!(matches!(
            DistanceIndex::from_triples(&selfish, &set, &mut cache),
            Err(DiscoError::InvalidInput(_))
        ));

        let conflicting = vec![
            DistanceTriple::new("s1", "s2", 1),
            DistanceTriple::new("s2", "s1", 4),
        ];
        assert!(matches!(
            DistanceIndex::from_triples(&conflicting, &set, &mut cache),
            Err(DiscoError::InvalidInput(_))
        ));

        let repeated = vec![
            DistanceTriple::new("s1", "s2", 1),
            DistanceTriple::new("s2", "s1", 1),
        ];
        let (index, _) = DistanceIndex::from_triples(&repeated, &set, &mut cache).unwrap();
        assert_eq!(index.directed_entry_count(), 20);
    }

    #[test]
    fn test_within_and_blocks() {
        let set = sample_set();
        let mut cache = DistanceCache::new();
        let index = DistanceIndex::build(&set, &mut cache).unwrap();
        let s1 = index.position("s1").unwrap();
        let s3 = index.position("s3").unwrap();
        let s4 = index.position("s4").unwrap();

        let mut near: Vec<&str> = index.within(s1, 1).map(|p| index.id(p)).collect();
        near.sort();
        assert_eq!(near, vec!["s2", "s5"]);
        assert!(index.blocks(s1, s3, 2));
        assert!(!index.blocks(s1, s3, 1));
        assert!(!index.blocks(s1, s4, 5));
    }

    #[test]
    fn test_single_sequence_has_no_entries() {
        let set = SequenceSet::from_pairs(vec![("only", "ACGT")]).unwrap();
        let mut cache = DistanceCache::new();
        let index = DistanceIndex::build(&set, &mut cache).unwrap();
        assert_eq!(index.len(), 1);
        assert_eq!(index.directed_entry_count(), 0);
        assert!(index.triples().is_empty());
    }
}
