// tsv.rs - Tab-separated table loaders

use std::collections::{HashMap, HashSet};
use std::path::Path;

use tracing::{info, warn};

use crate::core::{DistanceTriple, GroupProportionGoal};
use crate::data::{TaxonRecord, TaxonTable};
use crate::error::{DiscoError, Result};

/// Id to label join table (label in the first column, id in the last)
#[derive(Debug, Clone, Default)]
pub struct MemberLabels {
    pub column: String,
    pub labels: HashMap<String, String>,
}

impl MemberLabels {
    pub fn get(&self, id: &str) -> Option<&str> {
        self.labels.get(id).map(String::as_str)
    }
}

/// Read a whole file, transparently decompressing `.lz4` paths
pub fn read_source(path: &Path) -> Result<Vec<u8>> {
    let bytes = std::fs::read(path).map_err(|e| DiscoError::io(path, e))?;
    if is_lz4(path) {
        lz4_flex::decompress_size_prepended(&bytes).map_err(|e| {
            DiscoError::InvalidInput(format!(
                "Failed to decompress '{}': {}",
                path.display(),
                e
            ))
        })
    } else {
        Ok(bytes)
    }
}

pub fn is_lz4(path: &Path) -> bool {
    path.extension().map_or(false, |ext| ext == "lz4")
}

/// Tab reader without quote handling; record tables pass `Trim::None` so
/// fields come back byte for byte
fn tab_reader(bytes: &[u8], has_headers: bool, trim: csv::Trim) -> csv::Reader<&[u8]> {
    csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .comment(Some(b'#'))
        .has_headers(has_headers)
        .flexible(true)
        .quoting(false)
        .trim(trim)
        .from_reader(bytes)
}

/// Load a community table with its header row
pub fn read_taxon_table(path: &Path) -> Result<TaxonTable> {
    let bytes = read_source(path)?;
    let mut reader = tab_reader(&bytes, true, csv::Trim::None);
    let header: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    if header.iter().all(String::is_empty) {
        return Err(DiscoError::InputMissing(format!(
            "community table {} has no header",
            path.display()
        )));
    }

    let mut records = Vec::new();
    for row in reader.records() {
        records.push(TaxonRecord::new(row?.iter()));
    }
    let table = TaxonTable::new(header, records)?;
    info!(
        "✅ Community table loaded: {} taxa, {} columns",
        table.len(),
        table.header.len()
    );
    Ok(table)
}

/// Load `group<TAB>fraction` rows
pub fn read_proportions(path: &Path) -> Result<GroupProportionGoal> {
    let bytes = read_source(path)?;
    let mut reader = tab_reader(&bytes, false, csv::Trim::All);
    let mut entries = Vec::new();
    for (line, row) in reader.records().enumerate() {
        let row = row?;
        if row.len() < 2 {
            return Err(DiscoError::InvalidInput(format!(
                "Proportion row {} needs a group and a fraction",
                line + 1
            )));
        }
        let fraction: f64 = row[1].parse().map_err(|_| {
            DiscoError::InvalidInput(format!(
                "Proportion for group '{}' is not a number: '{}'",
                &row[0], &row[1]
            ))
        })?;
        entries.push((row[0].to_string(), fraction));
    }
    GroupProportionGoal::new(entries)
}

/// Load an id list (first column), skipping an `id` header row and repeats
pub fn read_id_list(path: &Path) -> Result<Vec<String>> {
    let bytes = read_source(path)?;
    let mut reader = tab_reader(&bytes, false, csv::Trim::All);
    let mut seen = HashSet::new();
    let mut ids = Vec::new();
    for (line, row) in reader.records().enumerate() {
        let row = row?;
        let id = row.get(0).unwrap_or("");
        if id.is_empty() || (line == 0 && id == "id") {
            continue;
        }
        if !seen.insert(id.to_string()) {
            warn!("⚠️  Duplicate id '{}' in {} ignored", id, path.display());
            continue;
        }
        ids.push(id.to_string());
    }
    info!("📋 Loaded {} ids from {}", ids.len(), path.display());
    Ok(ids)
}

/// Load the metadata join table
pub fn read_metadata(path: &Path) -> Result<MemberLabels> {
    let bytes = read_source(path)?;
    let mut reader = tab_reader(&bytes, true, csv::Trim::None);
    let column = reader
        .headers()?
        .get(0)
        .filter(|h| !h.is_empty())
        .unwrap_or("label")
        .to_string();

    let mut labels = HashMap::new();
    for row in reader.records() {
        let row = row?;
        if row.len() < 2 {
            continue;
        }
        if let (Some(label), Some(id)) = (row.get(0), row.get(row.len() - 1)) {
            labels.insert(id.to_string(), label.to_string());
        }
    }
    info!("📋 Metadata loaded: {} labeled ids", labels.len());
    Ok(MemberLabels { column, labels })
}

/// Load persisted `idA<TAB>idB<TAB>distance` rows
pub fn read_triples(path: &Path) -> Result<Vec<DistanceTriple>> {
    let bytes = read_source(path)?;
    let mut reader = tab_reader(&bytes, false, csv::Trim::All);
    let mut triples = Vec::new();
    for row in reader.deserialize() {
        let triple: DistanceTriple = row?;
        triples.push(triple);
    }
    info!(
        "📂 Loaded {} distance pairs from {}",
        triples.len(),
        path.display()
    );
    Ok(triples)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_file(name: &str, content: &[u8]) -> (tempfile::TempDir, std::path::PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(content).unwrap();
        (dir, path)
    }

    #[test]
    fn test_taxon_table_skips_comments() {
        let (_dir, path) = write_file(
            "community.txt",
            b"# Command: disco create\nid\tphylum\nt1\tFirmicutes\nt2\tProteobacteria\n",
        );
        let table = read_taxon_table(&path).unwrap();
        assert_eq!(table.header, vec!["id", "phylum"]);
        assert_eq!(table.len(), 2);
        assert_eq!(table.records[1].group(1), "Proteobacteria");
    }

    #[test]
    fn test_taxon_fields_kept_verbatim() {
        let (_dir, path) = write_file(
            "community.txt",
            b"id\tlabel\nt1\t\"quoted\" name\nt2\t padded \n",
        );
        let table = read_taxon_table(&path).unwrap();
        assert_eq!(table.records[0].fields, vec!["t1", "\"quoted\" name"]);
        assert_eq!(table.records[1].fields, vec!["t2", " padded "]);
    }

    #[test]
    fn test_proportions_parse_and_validate() {
        let (_dir, path) = write_file("prop.txt", b"A\t0.75\nB\t0.25\n");
        let goal = read_proportions(&path).unwrap();
        assert_eq!(goal.fraction("A"), Some(0.75));
        assert_eq!(goal.groups().collect::<Vec<_>>(), vec!["A", "B"]);

        let (_dir, path) = write_file("bad.txt", b"A\thalf\n");
        assert!(matches!(
            read_proportions(&path),
            Err(DiscoError::InvalidInput(_))
        ));

        let (_dir, path) = write_file("sum.txt", b"A\t0.5\nB\t0.2\n");
        assert!(matches!(
            read_proportions(&path),
            Err(DiscoError::ProportionSumInvalid { .. })
        ));
    }

    #[test]
    fn test_id_list_accepts_community_tables() {
        let (_dir, path) = write_file(
            "starter.txt",
            b"# Seed: 4\nid\tgenus\nS1\tVibrio\n\nS2\tBacillus\nS1\tVibrio\n",
        );
        assert_eq!(read_id_list(&path).unwrap(), vec!["S1", "S2"]);
    }

    #[test]
    fn test_metadata_label_first_id_last() {
        let (_dir, path) = write_file(
            "meta.txt",
            b"species\tsource\taccession\nV. cholerae\twater\tS1\nB. subtilis\tsoil\tS2\n",
        );
        let meta = read_metadata(&path).unwrap();
        assert_eq!(meta.column, "species");
        assert_eq!(meta.get("S2"), Some("B. subtilis"));
        assert_eq!(meta.get("S3"), None);
    }

    #[test]
    fn test_triples_plain_and_lz4() {
        let body = b"S1\tS2\t3\nS1\tS3\t0\n";
        let (_dir, plain) = write_file("index.tsv", body);
        let triples = read_triples(&plain).unwrap();
        assert_eq!(triples[0], DistanceTriple::new("S1", "S2", 3));

        let compressed = lz4_flex::compress_prepend_size(body);
        let (_dir, packed) = write_file("index.tsv.lz4", &compressed);
        assert_eq!(read_triples(&packed).unwrap(), triples);
    }

    #[test]
    fn test_triples_bad_distance() {
        let (_dir, path) = write_file("index.tsv", b"S1\tS2\tfar\n");
        assert!(matches!(read_triples(&path), Err(DiscoError::Csv(_))));
    }
}
