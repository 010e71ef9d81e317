// taxa.rs - Labeled community records for the subsample stage

use std::collections::HashSet;

use crate::error::{DiscoError, Result};

/// One row of a community table; the first field is the taxon id
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaxonRecord {
    pub fields: Vec<String>,
}

impl TaxonRecord {
    pub fn new<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            fields: fields.into_iter().map(Into::into).collect(),
        }
    }

    pub fn id(&self) -> &str {
        self.fields.first().map(String::as_str).unwrap_or("")
    }

    /// Value of the grouping column
    pub fn group(&self, column: usize) -> &str {
        self.fields.get(column).map(String::as_str).unwrap_or("")
    }
}

/// Community table with its header row
#[derive(Debug, Clone, Default)]
pub struct TaxonTable {
    pub header: Vec<String>,
    pub records: Vec<TaxonRecord>,
}

impl TaxonTable {
    pub fn new(header: Vec<String>, records: Vec<TaxonRecord>) -> Result<Self> {
        for (row, record) in records.iter().enumerate() {
            if record.fields.len() != header.len() {
                return Err(DiscoError::InvalidInput(format!(
                    "Record {} ('{}') has {} fields, header has {}",
                    row + 1,
                    record.id(),
                    record.fields.len(),
                    header.len()
                )));
            }
        }
        Ok(Self { header, records })
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Resolve the grouping column: a header name, or the second column
    pub fn group_column(&self, name: Option<&str>) -> Result<usize> {
        match name {
            Some(name) => self.header.iter().position(|h| h == name).ok_or_else(|| {
                DiscoError::InvalidInput(format!(
                    "Group by variable ({}) was not found in the header. The provided headings are {}",
                    name,
                    self.header.join(",")
                ))
            }),
            None if self.header.len() >= 2 => Ok(1),
            None => Err(DiscoError::InvalidInput(
                "Community table needs a second column to group by".to_string(),
            )),
        }
    }

    /// Distinct group values in first-seen order
    pub fn groups(&self, column: usize) -> Vec<String> {
        let mut seen = HashSet::new();
        self.records
            .iter()
            .map(|r| r.group(column))
            .filter(|g| seen.insert(*g))
            .map(str::to_string)
            .collect()
    }
}
