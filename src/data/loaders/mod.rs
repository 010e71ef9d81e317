// mod.rs - Input file loaders

pub mod tsv;

pub use tsv::{
    is_lz4, read_id_list, read_metadata, read_proportions, read_source, read_taxon_table,
    read_triples, MemberLabels,
};
