use clap::{ArgGroup, Args, Parser, Subcommand};
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Chimera CLI - receptor-ligand distances, Gaussian overlap scores and binding-site annotations for protein structures and sequences.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output except for errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Set the number of threads for parallel overlap integration.
    /// Defaults to the number of available logical cores.
    #[arg(short = 'j', long, global = true, value_name = "NUM")]
    pub threads: Option<usize>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Compute all receptor-ligand atom distances and overlaps into a distance report.
    Distance(DistanceArgs),
    /// Turn a distance report into a FASTA-style binding-site annotation.
    Annotate(AnnotateArgs),
    /// Find Pfam domains in protein sequences and map them to ligand binding frequencies.
    Bindings(BindingsArgs),
    /// Print the (match state, sequence index) pairs of one aligned domain sequence.
    Matchstates(MatchstatesArgs),
}

/// Arguments for the `distance` subcommand.
#[derive(Args, Debug)]
pub struct DistanceArgs {
    /// Identifier of the structure; prefixes the chain id in every report row.
    #[arg(long, required = true, value_name = "ID")]
    pub pdb_id: String,

    /// A receptor chain and ligand to scan, as CHAIN:LIGAND:RECEPTOR_PDB:LIGAND_PDB.
    /// Can be used multiple times.
    #[arg(long = "job", required = true, value_name = "SPEC")]
    pub jobs: Vec<String>,

    /// Path of the distance report (".gz" is appended when compressing).
    #[arg(short, long, required = true, value_name = "PATH")]
    pub output: PathBuf,

    /// Path to a configuration file in TOML format.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Override the distance cutoff in Ångström.
    #[arg(long, value_name = "FLOAT")]
    pub cutoff: Option<f64>,

    /// Keep backbone atoms (N, CA, C, O) of receptor residues.
    #[arg(long)]
    pub include_backbone: bool,

    /// Skip the overlap integrals; only distances are reported.
    #[arg(long)]
    pub no_overlap: bool,

    /// Write the report uncompressed.
    #[arg(long)]
    pub no_compress: bool,

    /// Reuse overlap values between records sharing a distance and radius pair.
    #[arg(long)]
    pub legacy_overlap_reuse: bool,

    /// Custom element radius table (tab-separated) instead of the bundled one.
    #[arg(long, value_name = "PATH")]
    pub radii: Option<PathBuf>,

    /// Also write the binding-site annotation to this path.
    #[arg(long, value_name = "PATH")]
    pub fasta: Option<PathBuf>,

    /// Aggregation metric for --fasta.
    #[arg(short, long, value_name = "NAME")]
    pub metric: Option<String>,
}

/// Arguments for the `annotate` subcommand.
#[derive(Args, Debug)]
pub struct AnnotateArgs {
    /// Distance report to aggregate (plain or gzipped).
    #[arg(short, long, required = true, value_name = "PATH")]
    pub input: PathBuf,

    /// Path of the annotation (gzipped when it ends in ".gz").
    #[arg(short, long, required = true, value_name = "PATH")]
    pub output: PathBuf,

    /// Path to a configuration file in TOML format.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Aggregation metric (maxstd, maxvdw, meanstd, meanvdw, sumstd, sumvdw, mindist, meandist, fracin4).
    #[arg(short, long, value_name = "NAME")]
    pub metric: Option<String>,

    /// Distance imputed by "meandist" for atoms without a contact; defaults to the distance cutoff.
    #[arg(long, value_name = "FLOAT")]
    pub cutoff: Option<f64>,
}

/// Arguments for the `bindings` subcommand.
#[derive(Args, Debug)]
#[command(group(ArgGroup::new("query").required(true).args(["sequences", "fasta_in"])))]
#[command(group(ArgGroup::new("table").required(true).args(["frequencies", "interacdome"])))]
pub struct BindingsArgs {
    /// A query sequence as ID=SEQUENCE. Can be used multiple times.
    #[arg(long = "sequence", value_name = "ID=SEQ")]
    pub sequences: Vec<String>,

    /// FASTA file of query sequences.
    #[arg(long, value_name = "PATH")]
    pub fasta_in: Option<PathBuf>,

    /// Binding frequencies as CSV (pfam_id,match_state,ligand_type,binding_frequency).
    #[arg(long, value_name = "PATH")]
    pub frequencies: Option<PathBuf>,

    /// InteracDome results table (TSV), filtered by the configured thresholds.
    #[arg(long, value_name = "PATH")]
    pub interacdome: Option<PathBuf>,

    /// Domain search backend (hmmer, hmmerweb, dpuc2, domstratstats).
    #[arg(short, long, value_name = "NAME")]
    pub backend: Option<String>,

    /// Keep only domains that cover their whole Pfam model.
    #[arg(long)]
    pub full_domains: bool,

    /// Path of the binding-frequency matches (CSV).
    #[arg(short, long, required = true, value_name = "PATH")]
    pub output: PathBuf,

    /// Also write the domain table (CSV) to this path.
    #[arg(long, value_name = "PATH")]
    pub domains_out: Option<PathBuf>,

    /// Path to a configuration file in TOML format.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

/// Arguments for the `matchstates` subcommand.
#[derive(Args, Debug)]
pub struct MatchstatesArgs {
    /// Aligned sequence: uppercase matches, lowercase insertions, '-' deletions.
    #[arg(long, required = true, value_name = "SEQ", allow_hyphen_values = true)]
    pub aligned: String,

    /// 1-based position of the first aligned residue in the full sequence.
    #[arg(long, required = true, value_name = "INT")]
    pub start: usize,

    /// 1-based position of the last aligned residue in the full sequence.
    #[arg(long, required = true, value_name = "INT")]
    pub end: usize,
}
