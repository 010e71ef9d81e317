// community.rs - Greedy construction of a maximal "far enough apart" community

use std::collections::HashSet;

use rand::seq::SliceRandom;
use rand::Rng;
use tracing::{debug, info, warn};

use crate::core::index::DistanceIndex;
use crate::error::{DiscoError, Result};

/// Selected ids in insertion order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Community {
    members: Vec<String>,
    threshold: usize,
    starter_size: usize,
}

impl Community {
    pub fn members(&self) -> &[String] {
        &self.members
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.members.iter().any(|m| m == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.members.iter().map(String::as_str)
    }

    /// Threshold the community was grown at
    pub fn threshold(&self) -> usize {
        self.threshold
    }

    /// Number of leading members that came from the starter list
    pub fn starter_size(&self) -> usize {
        self.starter_size
    }
}

/// Membership bookkeeping for one growth run
struct GrowthState {
    in_community: Vec<bool>,
    blocked: Vec<bool>,
    members: Vec<usize>,
}

impl GrowthState {
    fn new(size: usize) -> Self {
        Self {
            in_community: vec![false; size],
            blocked: vec![false; size],
            members: Vec::new(),
        }
    }

    fn is_free(&self, position: usize) -> bool {
        !self.in_community[position] && !self.blocked[position]
    }
}

/// Grows a community in which no two members are within `threshold` of each
/// other.
///
/// A candidate is blocked by a member when it appears in the member's neighbor
/// lists at any distance in `0..=threshold`. Each step adds one free candidate:
/// a uniformly random one among those with no neighbor at exactly `threshold`,
/// otherwise the one with the fewest neighbors at `threshold` (earliest in
/// alignment order on ties). Growth stops when no free candidate is left.
pub struct CommunityBuilder<'a> {
    index: &'a DistanceIndex,
    threshold: usize,
}

impl<'a> CommunityBuilder<'a> {
    pub fn new(index: &'a DistanceIndex, threshold: usize) -> Self {
        Self { index, threshold }
    }

    pub fn threshold(&self) -> usize {
        self.threshold
    }

    /// Map starter ids to index positions, dropping repeats
    fn resolve_starter(&self, starter: &[String]) -> Result<Vec<usize>> {
        let mut seen = HashSet::new();
        let mut positions = Vec::with_capacity(starter.len());
        for id in starter {
            let position = self
                .index
                .position(id)
                .ok_or_else(|| DiscoError::UnknownSequenceId {
                    id: id.clone(),
                    origin: "starter community".to_string(),
                })?;
            if seen.insert(position) {
                positions.push(position);
            } else {
                warn!("⚠️  Starter id '{}' listed more than once, keeping the first", id);
            }
        }
        Ok(positions)
    }

    /// Every starter pair that sits within the threshold, in list order
    pub fn conflicting_pairs(&self, starter: &[String]) -> Result<Vec<(String, String)>> {
        let positions = self.resolve_starter(starter)?;
        Ok(self.conflicts_among(&positions))
    }

    fn conflicts_among(&self, positions: &[usize]) -> Vec<(String, String)> {
        let mut pairs = Vec::new();
        for (i, &a) in positions.iter().enumerate() {
            for &b in &positions[i + 1..] {
                if self.index.blocks(a, b, self.threshold) || self.index.blocks(b, a, self.threshold) {
                    pairs.push((self.index.id(a).to_string(), self.index.id(b).to_string()));
                }
            }
        }
        pairs
    }

    /// Fail with every conflicting pair if the starter set is not independent
    pub fn validate_starter(&self, starter: &[String]) -> Result<()> {
        let positions = self.resolve_starter(starter)?;
        self.check_independent(&positions)
    }

    fn check_independent(&self, positions: &[usize]) -> Result<()> {
        let pairs = self.conflicts_among(positions);
        if pairs.is_empty() {
            Ok(())
        } else {
            Err(DiscoError::StarterCommunityInvalid {
                threshold: self.threshold,
                pairs,
            })
        }
    }

    /// Pick the first member when no starter is given
    pub fn seed<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<String> {
        let state = GrowthState::new(self.index.len());
        self.next_candidate(&state, rng)
            .map(|p| self.index.id(p).to_string())
    }

    /// Grow a community to fixpoint, optionally starting from a required set
    pub fn build<R: Rng + ?Sized>(
        &self,
        starter: Option<&[String]>,
        rng: &mut R,
    ) -> Result<Community> {
        let mut state = GrowthState::new(self.index.len());

        let starter = starter.filter(|s| !s.is_empty());
        let starter_size = match starter {
            Some(ids) => {
                let positions = self.resolve_starter(ids)?;
                self.check_independent(&positions)?;
                info!("✅ Starter community is valid ({} members)", positions.len());
                for position in positions {
                    self.add_member(&mut state, position);
                }
                state.members.len()
            }
            None => {
                if let Some(first) = self.next_candidate(&state, rng) {
                    debug!("Seeding community with {}", self.index.id(first));
                    self.add_member(&mut state, first);
                }
                0
            }
        };

        while let Some(next) = self.next_candidate(&state, rng) {
            self.add_member(&mut state, next);
        }

        self.verify(&state)?;

        let members: Vec<String> = state
            .members
            .iter()
            .map(|&p| self.index.id(p).to_string())
            .collect();
        info!(
            "🎯 Community complete: {} of {} sequences at threshold {}",
            members.len(),
            self.index.len(),
            self.threshold
        );

        Ok(Community {
            members,
            threshold: self.threshold,
            starter_size,
        })
    }

    fn add_member(&self, state: &mut GrowthState, position: usize) {
        state.in_community[position] = true;
        state.members.push(position);
        for neighbor in self.index.within(position, self.threshold) {
            state.blocked[neighbor] = true;
        }
    }

    /// One growth step: the next free id to add, drawing from `rng` only when
    /// unconstrained candidates exist
    fn next_candidate<R: Rng + ?Sized>(&self, state: &GrowthState, rng: &mut R) -> Option<usize> {
        let mut unconstrained = Vec::new();
        let mut best: Option<(usize, usize)> = None;

        for position in 0..self.index.len() {
            if !state.is_free(position) {
                continue;
            }
            match self.index.count_at_position(position, self.threshold) {
                0 => unconstrained.push(position),
                count => {
                    if best.map_or(true, |(best_count, _)| count < best_count) {
                        best = Some((count, position));
                    }
                }
            }
        }

        if !unconstrained.is_empty() {
            return unconstrained.choose(rng).copied();
        }
        best.map(|(_, position)| position)
    }

    /// Independence and maximality of a finished community
    fn verify(&self, state: &GrowthState) -> Result<()> {
        for &member in &state.members {
            if let Some(conflict) = self
                .index
                .within(member, self.threshold)
                .find(|&p| state.in_community[p])
            {
                return Err(DiscoError::Internal(format!(
                    "community members '{}' and '{}' are within threshold {}",
                    self.index.id(member),
                    self.index.id(conflict),
                    self.threshold
                )));
            }
        }
        if let Some(free) = (0..self.index.len()).find(|&p| state.is_free(p)) {
            return Err(DiscoError::Internal(format!(
                "community growth stopped while '{}' was still free",
                self.index.id(free)
            )));
        }
        Ok(())
    }
}
