// args.rs - Command line arguments definition

use argh::FromArgs;

#[derive(FromArgs, Debug)]
/// disco - build threshold-separated communities of aligned sequences and subsample them
pub struct Args {
    /// path to TOML configuration file
    #[argh(option)]
    pub config: Option<String>,

    /// random seed (default: drawn from OS entropy and reported)
    #[argh(option)]
    pub seed: Option<u64>,

    /// log level: error, warn, info, debug, trace (default: info; RUST_LOG wins)
    #[argh(option)]
    pub log_level: Option<String>,

    #[argh(subcommand)]
    pub command: Command,
}

#[derive(FromArgs, Debug)]
#[argh(subcommand)]
pub enum Command {
    Create(CreateArgs),
    Subsample(SubsampleArgs),
    GenerateConfig(GenerateConfigArgs),
}

#[derive(FromArgs, Debug, Default)]
/// create a community whose members differ pairwise by more than the threshold
#[argh(subcommand, name = "create")]
pub struct CreateArgs {
    /// aligned FASTA file (all sequences of equal length)
    #[argh(option)]
    pub alignment: Option<String>,

    /// distance threshold: members must differ by more than this many columns
    #[argh(option)]
    pub threshold: Option<usize>,

    /// starter community that must be included (one id per line)
    #[argh(option)]
    pub include_strains: Option<String>,

    /// number of residues to trim from both ends of every sequence
    #[argh(option)]
    pub trim_primers: Option<usize>,

    /// metadata to join with the community (label in the first column, id in the last, with header)
    #[argh(option)]
    pub metadata: Option<String>,

    /// previously saved distance index to reuse (.tsv or .lz4)
    #[argh(option)]
    pub distance_index: Option<String>,

    /// save the distance index for reuse (.lz4 extension compresses)
    #[argh(option)]
    pub distance_index_out: Option<String>,

    /// output community table (default: Community_ED<threshold>.txt)
    #[argh(option)]
    pub output: Option<String>,

    /// also write the community sequences as FASTA
    #[argh(option)]
    pub output_fasta: Option<String>,
}

#[derive(FromArgs, Debug, Default)]
/// subsample a community to a number of taxa and/or group proportions
#[argh(subcommand, name = "subsample")]
pub struct SubsampleArgs {
    /// community table from `disco create` (tab delimited, with header)
    #[argh(option)]
    pub community: Option<String>,

    /// number of taxa to keep
    #[argh(option)]
    pub num_taxa: Option<usize>,

    /// column name to group by for proportions (default: second column)
    #[argh(option)]
    pub group_by: Option<String>,

    /// file of desired group proportions (group<TAB>fraction)
    #[argh(option)]
    pub proportion: Option<String>,

    /// never let the proportion search drop below --num-taxa
    #[argh(switch)]
    pub num_enforce: bool,

    /// output table (default: Subsampled_community_taxa<N>.txt or Subsampled_community_taxa_prop.txt)
    #[argh(option)]
    pub output: Option<String>,

    /// write realized vs goal proportions to this file
    #[argh(option)]
    pub summary: Option<String>,
}

#[derive(FromArgs, Debug)]
/// print a sample configuration file and exit
#[argh(subcommand, name = "generate-config")]
pub struct GenerateConfigArgs {}
