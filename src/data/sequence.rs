// sequence.rs - Aligned sequence collection loaded from FASTA

use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use bio::io::fasta;
use tracing::{debug, info};

use crate::core::AmbiguitySymbolSet;
use crate::error::{DiscoError, Result};

/// A single aligned sequence
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sequence {
    pub id: String,
    pub residues: Vec<u8>,
}

/// Immutable, equal-length collection of sequences in load order
#[derive(Debug, Clone, Default)]
pub struct SequenceSet {
    sequences: Vec<Sequence>,
    positions: HashMap<String, usize>,
    alignment_length: usize,
}

impl SequenceSet {
    /// Build a set from (id, residues) pairs.
    ///
    /// Residues are upper-cased; duplicate ids, symbols outside the alphabet and
    /// non-uniform lengths are rejected.
    pub fn from_pairs<I, S, R>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (S, R)>,
        S: Into<String>,
        R: AsRef<[u8]>,
    {
        let mut set = Self::default();
        for (id, residues) in pairs {
            set.push(id.into(), residues.as_ref().to_ascii_uppercase())?;
        }
        Ok(set)
    }

    /// Load an aligned FASTA file, optionally trimming `trim` residues from
    /// both ends of every record (primer removal).
    pub fn from_fasta(path: &Path, trim: Option<usize>) -> Result<Self> {
        info!("🧬 Loading alignment: {}", path.display());
        let file = File::open(path).map_err(|e| DiscoError::io(path, e))?;
        let reader = fasta::Reader::new(BufReader::new(file));

        let mut set = Self::default();
        for record_result in reader.records() {
            let record = record_result.map_err(|e| {
                DiscoError::InvalidInput(format!(
                    "Invalid FASTA record in {}: {}",
                    path.display(),
                    e
                ))
            })?;

            let mut residues = record.seq().to_ascii_uppercase();
            if let Some(trim) = trim.filter(|&t| t > 0) {
                residues = trim_primers(record.id(), &residues, trim)?;
            }
            set.push(record.id().to_string(), residues)?;
        }

        if set.is_empty() {
            return Err(DiscoError::InputMissing(format!(
                "no sequences found in {}",
                path.display()
            )));
        }

        if let Some(trim) = trim.filter(|&t| t > 0) {
            info!("✂️  Trimmed {} residues from both ends of every sequence", trim);
        }
        info!(
            "✅ Alignment loaded: {} sequences, {} columns",
            set.len(),
            set.alignment_length
        );
        Ok(set)
    }

    fn push(&mut self, id: String, residues: Vec<u8>) -> Result<()> {
        if self.positions.contains_key(&id) {
            return Err(DiscoError::InvalidInput(format!(
                "Duplicate sequence id '{}'",
                id
            )));
        }

        AmbiguitySymbolSet::validate(&residues).map_err(|e| match e {
            DiscoError::InvalidSymbol { symbol, column, .. } => DiscoError::InvalidSymbol {
                id: Some(id.clone()),
                symbol,
                column,
            },
            other => other,
        })?;

        if self.sequences.is_empty() {
            self.alignment_length = residues.len();
        } else if residues.len() != self.alignment_length {
            return Err(DiscoError::UnequalLength {
                id,
                expected: self.alignment_length,
                found: residues.len(),
            });
        }

        debug!("Loaded sequence {} ({} columns)", id, residues.len());
        self.positions.insert(id.clone(), self.sequences.len());
        self.sequences.push(Sequence { id, residues });
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.sequences.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sequences.is_empty()
    }

    /// Shared length of every sequence (0 for an empty set)
    pub fn alignment_length(&self) -> usize {
        self.alignment_length
    }

    pub fn get(&self, id: &str) -> Option<&Sequence> {
        self.positions.get(id).map(|&i| &self.sequences[i])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.positions.contains_key(id)
    }

    /// Position of an id in load order
    pub fn position(&self, id: &str) -> Option<usize> {
        self.positions.get(id).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Sequence> {
        self.sequences.iter()
    }

    pub fn as_slice(&self) -> &[Sequence] {
        &self.sequences
    }
}

/// Remove `trim` residues from the start and the end of a record
fn trim_primers(id: &str, residues: &[u8], trim: usize) -> Result<Vec<u8>> {
    if residues.len() < trim * 2 {
        return Err(DiscoError::InvalidInput(format!(
            "Sequence '{}' ({} residues) is shorter than both primers ({} residues each)",
            id,
            residues.len(),
            trim
        )));
    }
    Ok(residues[trim..residues.len() - trim].to_vec())
}
