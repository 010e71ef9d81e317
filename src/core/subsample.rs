// subsample.rs - Count and proportion driven subsampling of a community

use std::collections::{HashMap, HashSet};

use rand::seq::SliceRandom;
use rand::Rng;
use tracing::{debug, info, warn};

use crate::data::TaxonRecord;
use crate::error::{DiscoError, Result};

/// Allowed distance of the goal fractions' sum from 1
pub const PROPORTION_TOLERANCE: f64 = 1e-6;

/// Errors at or below this are treated as balanced
const ERROR_EPSILON: f64 = 1e-12;

/// Target fraction per group, in proportion-file order
#[derive(Debug, Clone, PartialEq)]
pub struct GroupProportionGoal {
    entries: Vec<(String, f64)>,
}

impl GroupProportionGoal {
    pub fn new<I, S>(entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = (S, f64)>,
        S: Into<String>,
    {
        let mut seen = HashSet::new();
        let mut goal = Vec::new();
        for (group, fraction) in entries {
            let group = group.into();
            if !(0.0..=1.0).contains(&fraction) {
                return Err(DiscoError::InvalidInput(format!(
                    "Proportion for group '{}' must be within [0, 1], got {}",
                    group, fraction
                )));
            }
            if !seen.insert(group.clone()) {
                return Err(DiscoError::InvalidInput(format!(
                    "Group '{}' appears more than once in the proportion table",
                    group
                )));
            }
            goal.push((group, fraction));
        }

        if goal.is_empty() {
            return Err(DiscoError::InvalidInput(
                "Proportion table has no entries".to_string(),
            ));
        }

        let sum: f64 = goal.iter().map(|(_, f)| f).sum();
        if (sum - 1.0).abs() > PROPORTION_TOLERANCE {
            return Err(DiscoError::ProportionSumInvalid { sum });
        }
        Ok(Self { entries: goal })
    }

    pub fn fraction(&self, group: &str) -> Option<f64> {
        self.entries
            .iter()
            .find(|(g, _)| g == group)
            .map(|&(_, f)| f)
    }

    pub fn groups(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(g, _)| g.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Realized share of one group after subsampling
#[derive(Debug, Clone, PartialEq)]
pub struct GroupSummary {
    pub group: String,
    pub count: usize,
    pub proportion: f64,
    pub goal: Option<f64>,
}

#[derive(Debug, Clone)]
pub struct SubsampleOutcome {
    pub records: Vec<TaxonRecord>,
    pub summary: Vec<GroupSummary>,
}

struct GroupState {
    name: String,
    goal: f64,
    members: Vec<TaxonRecord>,
}

fn population(groups: &[GroupState]) -> usize {
    groups.iter().map(|g| g.members.len()).sum()
}

/// Sum of squared (current - goal) proportion errors, optionally as if one
/// record had been removed from `without`
fn squared_error(groups: &[GroupState], without: Option<usize>) -> f64 {
    let total = population(groups) - usize::from(without.is_some());
    if total == 0 {
        return f64::INFINITY;
    }
    groups
        .iter()
        .enumerate()
        .map(|(i, g)| {
            let count = g.members.len() - usize::from(without == Some(i));
            let error = count as f64 / total as f64 - g.goal;
            error * error
        })
        .sum()
}

/// Greedy reducer of a labeled population toward group proportions and/or a
/// target size
#[derive(Debug, Clone, Copy, Default)]
pub struct ProportionalSubsampler {
    target: Option<usize>,
    enforce_count: bool,
}

impl ProportionalSubsampler {
    pub fn new(target: Option<usize>, enforce_count: bool) -> Self {
        Self {
            target,
            enforce_count,
        }
    }

    /// Uniform sample of `target` records without replacement
    pub fn sample_count<R: Rng + ?Sized>(
        records: &[TaxonRecord],
        target: usize,
        rng: &mut R,
    ) -> Result<Vec<TaxonRecord>> {
        if target >= records.len() {
            return Err(DiscoError::CountConstraintInfeasible(format!(
                "Number of taxa to subsample ({}) must be smaller than the total number of taxa ({})",
                target,
                records.len()
            )));
        }
        let picked = rand::seq::index::sample(rng, records.len(), target);
        info!("🎯 Sampled {} of {} taxa", target, records.len());
        Ok(picked.into_iter().map(|i| records[i].clone()).collect())
    }

    /// Reduce `records` toward `goal`, grouping on `group_column`.
    ///
    /// Records whose group has no goal are dropped before anything else.
    /// Groups are emitted in goal order, members in their shuffled order.
    pub fn subsample<R: Rng + ?Sized>(
        &self,
        records: &[TaxonRecord],
        group_column: usize,
        goal: &GroupProportionGoal,
        rng: &mut R,
    ) -> Result<SubsampleOutcome> {
        let mut groups = self.partition(records, group_column, goal, rng)?;
        let initial = population(&groups);
        self.check_feasible(&groups)?;

        let removed = self.reduce_error(&mut groups);
        debug!("Error-driven loop removed {} records", removed);

        if let Some(target) = self.target {
            if population(&groups) > target {
                self.proportional_trim(&mut groups, target);
                Self::corrective_pass(&mut groups, target);
            }
        }

        let total = population(&groups);
        info!("✂️  Subsampled {} of {} taxa", total, initial);
        if let Some(target) = self.target {
            if total != target {
                warn!(
                    "⚠️  Final population ({}) differs from the requested {} taxa",
                    total, target
                );
            }
        }

        let summary = groups
            .iter()
            .map(|g| GroupSummary {
                group: g.name.clone(),
                count: g.members.len(),
                proportion: g.members.len() as f64 / total as f64,
                goal: Some(g.goal),
            })
            .collect();
        let records = groups.into_iter().flat_map(|g| g.members).collect();
        Ok(SubsampleOutcome { records, summary })
    }

    fn partition<R: Rng + ?Sized>(
        &self,
        records: &[TaxonRecord],
        group_column: usize,
        goal: &GroupProportionGoal,
        rng: &mut R,
    ) -> Result<Vec<GroupState>> {
        let mut by_group: HashMap<&str, Vec<TaxonRecord>> = HashMap::new();
        let mut available: Vec<String> = Vec::new();
        for record in records {
            let group = record.group(group_column);
            if !by_group.contains_key(group) {
                available.push(group.to_string());
            }
            by_group.entry(group).or_default().push(record.clone());
        }

        let mut dropped = 0;
        for group in &available {
            if goal.fraction(group).is_none() {
                let count = by_group.get(group.as_str()).map_or(0, Vec::len);
                warn!(
                    "⚠️  Group '{}' has no proportion goal; dropping its {} taxa",
                    group, count
                );
                dropped += count;
            }
        }
        if dropped > 0 {
            info!("Dropped {} taxa without a proportion goal", dropped);
        }

        let mut groups = Vec::with_capacity(goal.len());
        for (name, fraction) in &goal.entries {
            let mut members = by_group
                .remove(name.as_str())
                .ok_or_else(|| DiscoError::UnknownGroup {
                    group: name.clone(),
                    available: available.clone(),
                })?;
            members.shuffle(rng);
            groups.push(GroupState {
                name: name.clone(),
                goal: *fraction,
                members,
            });
        }
        Ok(groups)
    }

    fn check_feasible(&self, groups: &[GroupState]) -> Result<()> {
        let Some(target) = self.target else {
            return Ok(());
        };
        let total = population(groups);
        if target >= total {
            return Err(DiscoError::CountConstraintInfeasible(format!(
                "Number of taxa to subsample ({}) must be smaller than the total number of taxa ({})",
                target, total
            )));
        }
        if self.enforce_count && target < groups.len() {
            return Err(DiscoError::CountConstraintInfeasible(format!(
                "Cannot keep {} taxa while leaving at least one member in each of {} groups",
                target,
                groups.len()
            )));
        }
        Ok(())
    }

    /// Remove one record at a time from the most over-represented group.
    /// Returns the number of removals.
    fn reduce_error(&self, groups: &mut [GroupState]) -> usize {
        let mut removed = 0;
        loop {
            let total = population(groups);
            let mut worst: Option<(usize, f64)> = None;
            for (i, g) in groups.iter().enumerate() {
                let error = g.members.len() as f64 / total as f64 - g.goal;
                if worst.map_or(true, |(_, e)| error > e) {
                    worst = Some((i, error));
                }
            }
            let Some((index, error)) = worst else {
                break;
            };

            if error <= ERROR_EPSILON || groups[index].members.len() == 1 {
                break;
            }
            if let Some(target) = self.target.filter(|_| self.enforce_count) {
                if total - 1 < target {
                    break;
                }
            }

            let current = squared_error(groups, None);
            let candidate = squared_error(groups, Some(index));
            let forced = self.target.map_or(false, |target| total > target);
            if candidate < current || forced {
                groups[index].members.pop();
                removed += 1;
            } else {
                break;
            }
        }
        removed
    }

    /// Remove the same fraction from every group. The population never drops
    /// below `target` and no group is emptied.
    fn proportional_trim(&self, groups: &mut [GroupState], target: usize) {
        let down = 1.0 - target as f64 / population(groups) as f64;
        for i in 0..groups.len() {
            let total = population(groups);
            if total <= target {
                break;
            }
            let len = groups[i].members.len();
            let remove = ((len as f64 * down).round() as usize).min(total - target);
            if remove < 1 || len == 1 {
                continue;
            }
            let keep = len.saturating_sub(remove).max(1);
            groups[i].members.truncate(keep);
            debug!(
                "Proportional trim removed {} from group '{}'",
                len - keep,
                groups[i].name
            );
        }
    }

    /// Remove from the largest group until the target is met
    fn corrective_pass(groups: &mut [GroupState], target: usize) {
        while population(groups) > target {
            let mut largest = 0;
            for (i, g) in groups.iter().enumerate() {
                if g.members.len() > groups[largest].members.len() {
                    largest = i;
                }
            }
            if groups[largest].members.len() <= 1 {
                break;
            }
            groups[largest].members.pop();
        }
    }
}

/// Per-group counts of an arbitrary record list, in first-seen order
pub fn summarize(
    records: &[TaxonRecord],
    group_column: usize,
    goal: Option<&GroupProportionGoal>,
) -> Vec<GroupSummary> {
    let mut order: Vec<&str> = Vec::new();
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for record in records {
        let group = record.group(group_column);
        let count = counts.entry(group).or_insert(0);
        if *count == 0 {
            order.push(group);
        }
        *count += 1;
    }
    let total = records.len();
    order
        .into_iter()
        .map(|group| GroupSummary {
            group: group.to_string(),
            count: counts[group],
            proportion: counts[group] as f64 / total as f64,
            goal: goal.and_then(|g| g.fraction(group)),
        })
        .collect()
}
