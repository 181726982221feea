use std::path::PathBuf;

use openequity::{Concentration, RentType};

/// Housing-risk and equity scoring CLI (argument schema only)
#[derive(clap::Parser, Debug)]
#[command(name = "openequity", version, about, propagate_version = true)]
pub struct Cli {
    /// Increase output verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Analysis configuration (TOML), defaults to the built-in column names
    #[arg(long, global = true, value_hint = clap::ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    /// Keep only geographies in this state, e.g. "California"
    #[arg(long, global = true)]
    pub state: Option<String>,

    /// Keep only geographies inside this state, county or tract id, e.g. 06075
    #[arg(long, global = true)]
    pub within: Option<String>,

    /// Keep only geographies with these names (repeatable)
    #[arg(long = "name", global = true)]
    pub names: Vec<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(clap::Subcommand, Debug)]
pub enum Commands {
    /// Rank counties by Relative Risk of housing instability
    Rank(RankArgs),

    /// Classify census tracts as Equity Geographies
    Equity(EquityArgs),

    /// Build the transportation vulnerability index over census tracts
    Transport(TransportArgs),

    /// Estimate the monthly cost of avoiding evictions
    Cost(CostArgs),

    /// Pearson correlation matrix between indicators
    Correlate(CorrelateArgs),
}

#[derive(clap::Args, Debug)]
pub struct RankArgs {
    /// County indicator table (CSV)
    #[arg(value_hint = clap::ValueHint::FilePath)]
    pub table: PathBuf,

    /// Policy terms per county (CSV with the configured policy columns)
    #[arg(long, value_hint = clap::ValueHint::FilePath)]
    pub policy: Option<PathBuf>,

    /// Fold pairwise feature crosses into the score
    #[arg(long)]
    pub cross: bool,

    /// Output ranking file, prints CSV to stdout if omitted
    #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
    pub output: Option<PathBuf>,
}

#[derive(clap::Args, Debug)]
pub struct EquityArgs {
    /// Census tract indicator table (CSV)
    #[arg(value_hint = clap::ValueHint::FilePath)]
    pub tracts: PathBuf,

    /// Concentration level: low (0.5), medium (1) or high (1.5)
    #[arg(long)]
    pub concentration: Option<Concentration>,

    /// Output classification file, prints CSV to stdout if omitted
    #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
    pub output: Option<PathBuf>,
}

#[derive(clap::Args, Debug)]
pub struct TransportArgs {
    /// Census tract indicator table (CSV)
    #[arg(value_hint = clap::ValueHint::FilePath)]
    pub tracts: PathBuf,

    /// Annotate tracts with their Equity Geography criteria
    #[arg(long)]
    pub equity: bool,

    /// Keep only the N highest-ranked tracts
    #[arg(long)]
    pub top: Option<usize>,

    /// Output index file, prints CSV to stdout if omitted
    #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
    pub output: Option<PathBuf>,
}

#[derive(clap::Args, Debug)]
pub struct CostArgs {
    /// County indicator table (CSV)
    #[arg(value_hint = clap::ValueHint::FilePath)]
    pub table: PathBuf,

    /// Rents per county and bedroom count (CSV with fmr_0..4 or rent50_0..4)
    #[arg(long, value_hint = clap::ValueHint::FilePath)]
    pub rents: PathBuf,

    /// Rent schedule: fmr or rent50
    #[arg(long)]
    pub rent_type: Option<RentType>,

    /// Share of burdened households to support, in percent
    #[arg(long)]
    pub percent_burdened: Option<f64>,

    /// Output estimate file, prints CSV to stdout if omitted
    #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
    pub output: Option<PathBuf>,
}

#[derive(clap::Args, Debug)]
pub struct CorrelateArgs {
    /// Indicator table (CSV)
    #[arg(value_hint = clap::ValueHint::FilePath)]
    pub table: PathBuf,

    /// Indicators to compare (repeatable), defaults to every numeric column
    #[arg(long = "indicator")]
    pub indicators: Vec<String>,

    /// Read the table as census tracts instead of counties
    #[arg(long)]
    pub tracts: bool,

    /// Output matrix file, prints CSV to stdout if omitted
    #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
    pub output: Option<PathBuf>,
}
