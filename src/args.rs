use clap::Parser;

#[derive(Debug, Parser)]
#[command(name = "build_tables")]
#[command(
    about = "Transform yearly CMS HHA cost report extracts into provider and operator annual tables"
)]
pub struct Args {
    /// Directory holding the yearly extracts as <year>/CostReporthha_Final_<yy>.csv.
    /// Defaults to data/raw under the project root.
    #[arg(long)]
    pub input_dir: Option<std::path::PathBuf>,

    /// Output path for the provider-year table.
    /// Defaults to data/output/providers_annual.csv.
    #[arg(long)]
    pub providers_csv: Option<std::path::PathBuf>,

    /// Output path for the operator-year rollup table.
    /// Defaults to data/output/operators_annual.csv.
    #[arg(long)]
    pub operators_csv: Option<std::path::PathBuf>,

    /// Optional SQLite registry keeping operator ids stable across runs.
    ///
    /// Without it, ids are assigned fresh each run (equivalent tables, ids
    /// renumbered). With it, previously seen names keep their ids and new
    /// names extend past the stored maximum.
    #[arg(long)]
    pub registry_db: Option<std::path::PathBuf>,

    /// Delete the operator id registry before the run.
    #[arg(long, default_value_t = false)]
    pub reset_registry: bool,
}
