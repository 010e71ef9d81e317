// mod.rs - Output writers module

use std::fs::{create_dir_all, File};
use std::io::{self, BufWriter, Write};
use std::path::Path;

use bio::io::fasta;
use tracing::{info, warn};

use crate::core::{Community, DistanceTriple, GroupSummary};
use crate::data::loaders::is_lz4;
use crate::data::{MemberLabels, SequenceSet, TaxonRecord};
use crate::error::{DiscoError, Result};

/// Provenance written at the top of every table
#[derive(Debug, Clone)]
pub struct RunHeader {
    pub command_line: String,
    pub seed: Option<u64>,
}

impl RunHeader {
    pub fn new(command_line: impl Into<String>, seed: Option<u64>) -> Self {
        Self {
            command_line: command_line.into(),
            seed,
        }
    }

    fn write_to<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        writeln!(writer, "# Command: {}", self.command_line)?;
        writeln!(
            writer,
            "# Generated: {}",
            chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC")
        )?;
        writeln!(writer, "# disco v{}", env!("CARGO_PKG_VERSION"))?;
        if let Some(seed) = self.seed {
            writeln!(writer, "# Seed: {}", seed)?;
        }
        Ok(())
    }
}

/// Ensure parent directory exists before creating file
fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        create_dir_all(parent).map_err(|e| DiscoError::io(parent, e))?;
    }
    Ok(())
}

fn create_output(path: &Path) -> Result<BufWriter<File>> {
    ensure_parent_dir(path)?;
    let file = File::create(path).map_err(|e| DiscoError::io(path, e))?;
    Ok(BufWriter::new(file))
}

/// Write the community as an id table, joined with metadata labels when given.
/// Returns the number of members without a label.
pub fn write_community(
    path: &Path,
    community: &Community,
    labels: Option<&MemberLabels>,
    header: &RunHeader,
) -> Result<usize> {
    let mut writer = create_output(path)?;
    let mut unlabeled = 0;

    let result = (|| -> io::Result<()> {
        header.write_to(&mut writer)?;
        writeln!(writer, "# Threshold: {}", community.threshold())?;
        match labels {
            Some(labels) => {
                writeln!(writer, "id\t{}", labels.column)?;
                for id in community.iter() {
                    let label = labels.get(id).unwrap_or_else(|| {
                        warn!("⚠️  No metadata for community member '{}'", id);
                        unlabeled += 1;
                        "NA"
                    });
                    writeln!(writer, "{}\t{}", id, label)?;
                }
            }
            None => {
                writeln!(writer, "id")?;
                for id in community.iter() {
                    writeln!(writer, "{}", id)?;
                }
            }
        }
        writer.flush()
    })();
    result.map_err(|e| DiscoError::io(path, e))?;

    info!(
        "✅ Community written to: {} ({} members)",
        path.display(),
        community.len()
    );
    Ok(unlabeled)
}

/// Write the community's sequences as FASTA, in community order
pub fn write_community_fasta(
    path: &Path,
    community: &Community,
    sequences: &SequenceSet,
) -> Result<()> {
    let mut writer = fasta::Writer::new(create_output(path)?);
    for id in community.iter() {
        let sequence = sequences.get(id).ok_or_else(|| {
            DiscoError::Internal(format!("community member '{}' has no sequence", id))
        })?;
        writer
            .write(id, None, &sequence.residues)
            .map_err(|e| DiscoError::io(path, e))?;
    }
    writer.flush().map_err(|e| DiscoError::io(path, e))?;
    info!("✅ Community sequences written to: {}", path.display());
    Ok(())
}

/// Write the distance index as triples; `.lz4` paths are compressed
pub fn write_triples(path: &Path, triples: &[DistanceTriple], header: &RunHeader) -> Result<()> {
    let mut buffer = Vec::new();
    header
        .write_to(&mut buffer)
        .map_err(|e| DiscoError::io(path, e))?;
    {
        let mut writer = csv::WriterBuilder::new()
            .delimiter(b'\t')
            .has_headers(false)
            .from_writer(&mut buffer);
        for triple in triples {
            writer.serialize(triple)?;
        }
        writer.flush().map_err(|e| DiscoError::io(path, e))?;
    }

    let bytes = if is_lz4(path) {
        lz4_flex::compress_prepend_size(&buffer)
    } else {
        buffer
    };
    ensure_parent_dir(path)?;
    std::fs::write(path, &bytes).map_err(|e| DiscoError::io(path, e))?;
    info!(
        "✅ Distance index written to: {} ({} pairs, {} KB)",
        path.display(),
        triples.len(),
        bytes.len() / 1024
    );
    Ok(())
}

/// Write a record table with its original header row
pub fn write_taxon_table(
    path: &Path,
    columns: &[String],
    records: &[TaxonRecord],
    header: &RunHeader,
) -> Result<()> {
    let mut writer = create_output(path)?;
    header
        .write_to(&mut writer)
        .map_err(|e| DiscoError::io(path, e))?;
    {
        let mut table = csv::WriterBuilder::new()
            .delimiter(b'\t')
            .quote_style(csv::QuoteStyle::Never)
            .from_writer(&mut writer);
        table.write_record(columns)?;
        for record in records {
            table.write_record(&record.fields)?;
        }
        table.flush().map_err(|e| DiscoError::io(path, e))?;
    }
    writer.flush().map_err(|e| DiscoError::io(path, e))?;
    info!(
        "✅ Subsampled community written to: {} ({} taxa)",
        path.display(),
        records.len()
    );
    Ok(())
}

/// Write realized vs goal proportions
pub fn write_summary(path: &Path, summary: &[GroupSummary], header: &RunHeader) -> Result<()> {
    let mut writer = create_output(path)?;
    let result = (|| -> io::Result<()> {
        header.write_to(&mut writer)?;
        writeln!(writer, "group\tcount\tproportion\tgoal")?;
        for group in summary {
            let goal = match group.goal {
                Some(goal) => format!("{:.4}", goal),
                None => "NA".to_string(),
            };
            writeln!(
                writer,
                "{}\t{}\t{:.4}\t{}",
                group.group, group.count, group.proportion, goal
            )?;
        }
        writer.flush()
    })();
    result.map_err(|e| DiscoError::io(path, e))?;
    info!("✅ Proportion summary written to: {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{CommunityBuilder, DistanceCache, DistanceIndex};
    use crate::data::loaders::{read_id_list, read_taxon_table, read_triples};
    use std::collections::HashMap;

    fn community() -> (SequenceSet, Community) {
        let set = SequenceSet::from_pairs(vec![("S1", "AAAA"), ("S2", "CCCC"), ("S3", "AAAC")])
            .unwrap();
        let mut cache = DistanceCache::new();
        let index = DistanceIndex::build(&set, &mut cache).unwrap();
        let mut rng = crate::core::seeded_rng(1);
        let community = CommunityBuilder::new(&index, 1)
            .build(Some(&["S1".to_string(), "S2".to_string()]), &mut rng)
            .unwrap();
        (set, community)
    }

    fn header() -> RunHeader {
        RunHeader::new("disco create --threshold 1", Some(42))
    }

    #[test]
    fn test_community_table_roundtrips_as_id_list() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/Community_ED1.txt");
        let (_, community) = community();
        write_community(&path, &community, None, &header()).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("# Seed: 42"));
        assert!(text.contains("# Threshold: 1"));
        assert_eq!(read_id_list(&path).unwrap(), community.members().to_vec());
    }

    #[test]
    fn test_community_labels_fill_na() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("community.txt");
        let (_, community) = community();
        let labels = MemberLabels {
            column: "species".to_string(),
            labels: HashMap::from([("S1".to_string(), "V. cholerae".to_string())]),
        };
        let unlabeled = write_community(&path, &community, Some(&labels), &header()).unwrap();
        assert_eq!(unlabeled, community.len() - 1);

        let table = read_taxon_table(&path).unwrap();
        assert_eq!(table.header, vec!["id", "species"]);
        assert_eq!(table.records[0].fields, vec!["S1", "V. cholerae"]);
        assert!(table.records[1..].iter().all(|r| r.group(1) == "NA"));
    }

    #[test]
    fn test_fasta_output() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("community.fasta");
        let (set, community) = community();
        write_community_fasta(&path, &community, &set).unwrap();

        let reloaded = SequenceSet::from_fasta(&path, None).unwrap();
        assert_eq!(reloaded.len(), community.len());
        assert_eq!(reloaded.get("S2").unwrap().residues, b"CCCC".to_vec());
    }

    #[test]
    fn test_triples_written_compressed() {
        let dir = tempfile::tempdir().unwrap();
        let triples = vec![
            DistanceTriple::new("S1", "S2", 4),
            DistanceTriple::new("S1", "S3", 1),
        ];
        for name in ["index.tsv", "index.tsv.lz4"] {
            let path = dir.path().join(name);
            write_triples(&path, &triples, &header()).unwrap();
            assert_eq!(read_triples(&path).unwrap(), triples);
        }
    }

    #[test]
    fn test_taxon_table_and_summary() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sub.txt");
        let columns = vec!["id".to_string(), "phylum".to_string()];
        let records = vec![TaxonRecord::new(["t1", "Firmicutes"])];
        write_taxon_table(&path, &columns, &records, &header()).unwrap();
        let table = read_taxon_table(&path).unwrap();
        assert_eq!(table.header, columns);
        assert_eq!(table.records, records);

        let verbatim = vec![TaxonRecord::new(["t2", "\"Candidatus\" Pelagibacter "])];
        write_taxon_table(&path, &columns, &verbatim, &header()).unwrap();
        assert_eq!(read_taxon_table(&path).unwrap().records, verbatim);

        let summary_path = dir.path().join("summary.tsv");
        let summary = vec![GroupSummary {
            group: "Firmicutes".to_string(),
            count: 1,
            proportion: 1.0,
            goal: None,
        }];
        write_summary(&summary_path, &summary, &header()).unwrap();
        let text = std::fs::read_to_string(&summary_path).unwrap();
        assert!(text.contains("Firmicutes\t1\t1.0000\tNA"));
    }
}
