mod args;

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::{
    fs,
    path::{Path, PathBuf},
};

use args::Args;
use build_tables::columns::SUPPORTED_YEARS;
use build_tables::load::{load_year, year_file_path};
use build_tables::operators::{build_operator_rows, write_operators_csv};
use build_tables::providers::{
    build_provider_rows, register_names, verify_consistent_assignment, write_providers_csv,
};
use build_tables::registry::{OperatorRegistry, RegistryStore};

fn project_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
}

fn delete_if_exists(path: &Path) -> Result<()> {
    if path.exists() {
        fs::remove_file(path).with_context(|| format!("Failed deleting {}", path.display()))?;
    }
    Ok(())
}

fn apply_load_progress_style(progress: &ProgressBar) {
    if let Ok(style) = ProgressStyle::with_template(
        "{spinner:.green} {prefix:.bold} [{bar:32.cyan/blue}] {pos}/{len} {msg}",
    ) {
        progress.set_style(style.progress_chars("=> "));
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    let project_dir = project_root();
    let data_dir = project_dir.join("data");
    let input_dir = args.input_dir.clone().unwrap_or_else(|| data_dir.join("raw"));
    let output_dir = data_dir.join("output");
    fs::create_dir_all(&output_dir)
        .with_context(|| format!("Failed creating {}", output_dir.display()))?;

    let providers_csv = args
        .providers_csv
        .clone()
        .unwrap_or_else(|| output_dir.join("providers_annual.csv"));
    let operators_csv = args
        .operators_csv
        .clone()
        .unwrap_or_else(|| output_dir.join("operators_annual.csv"));

    if args.reset_registry {
        if let Some(registry_db) = &args.registry_db {
            delete_if_exists(registry_db)?;
            println!("Reset operator id registry {}", registry_db.display());
        }
    }

    let mut registry = match &args.registry_db {
        Some(registry_db) => {
            let registry = RegistryStore::open(registry_db)?.load()?;
            println!(
                "Loaded operator id registry {} ({} operators)",
                registry_db.display(),
                registry.len()
            );
            registry
        }
        None => OperatorRegistry::new(),
    };

    let progress = ProgressBar::new(SUPPORTED_YEARS.len() as u64);
    progress.set_prefix("extracts");
    apply_load_progress_style(&progress);

    let mut reports = Vec::new();
    for year in SUPPORTED_YEARS {
        let path = year_file_path(&input_dir, year);
        progress.set_message(format!("loading {year}"));
        let rows = load_year(&path, year)?;
        progress.println(format!("Loaded {} rows from {}", rows.len(), path.display()));
        reports.extend(rows);
        progress.inc(1);
    }
    progress.finish_with_message("all years loaded");

    // All years register as one batch so an operator spanning years gets a
    // single id, no matter which year names it first.
    register_names(&reports, &mut registry);
    println!(
        "Resolved {} distinct operators across {} provider rows",
        registry.len(),
        reports.len()
    );

    let provider_rows = build_provider_rows(reports, &registry)?;
    verify_consistent_assignment(&provider_rows)?;
    let operator_rows = build_operator_rows(&provider_rows)?;

    write_providers_csv(&providers_csv, &provider_rows)?;
    println!(
        "Wrote {} with {} rows",
        providers_csv.display(),
        provider_rows.len()
    );
    write_operators_csv(&operators_csv, &operator_rows)?;
    println!(
        "Wrote {} with {} rows",
        operators_csv.display(),
        operator_rows.len()
    );

    if let Some(registry_db) = &args.registry_db {
        let added = RegistryStore::open(registry_db)?.persist(&registry)?;
        println!(
            "Registry {} extended with {} new operators ({} total)",
            registry_db.display(),
            added,
            registry.len()
        );
    }
    Ok(())
}
