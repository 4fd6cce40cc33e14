use crate::cli::AnalyzeArgs;
use crate::config::PartialAnalysisConfig;
use crate::error::{CliError, Result};
use crate::registry_store::RegistryStore;
use crate::utils::progress::CliProgressHandler;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use trajkit::core::io::memory::InMemoryTrajectory;
use trajkit::core::io::series::write_unwrapped_species;
use trajkit::engine::progress::ProgressReporter;
use trajkit::workflows::analyze::{self, AnalysisResult};

/// Topology, coarse graining and unwrapping.
const ANALYSIS_PHASES: usize = 3;

pub fn run(args: AnalyzeArgs) -> Result<()> {
    let store = if args.project.is_some() || args.save_names {
        Some(RegistryStore::new()?)
    } else {
        None
    };
    execute(&args, store.as_ref())
}

fn execute(args: &AnalyzeArgs, store: Option<&RegistryStore>) -> Result<()> {
    info!("Loading configuration from {:?}", &args.config);
    let config = PartialAnalysisConfig::from_file(&args.config)?.merge_with_cli(args)?;

    info!("Loading trajectory from {:?}", &args.input);
    let trajectory =
        InMemoryTrajectory::load_json(&args.input).map_err(|e| CliError::parsing(&args.input, e))?;

    let mut registry = match (&config.project, store) {
        (Some(_), Some(store)) => Some(store.load()?),
        (Some(project), None) => {
            warn!(
                "No registry available; project '{}' names will not be used.",
                project
            );
            None
        }
        _ => None,
    };

    let handler = CliProgressHandler::new(ANALYSIS_PHASES);
    let reporter = ProgressReporter::with_callback(handler.get_callback());
    let result = analyze::run(&trajectory, &config, registry.as_ref(), &reporter)?;

    let written = write_species_files(&args.output, &result)?;
    print_summary(&result, &written);

    if args.save_names {
        if let (Some(project), Some(registry), Some(store)) =
            (&config.project, registry.as_mut(), store)
        {
            registry.insert_project(project, result.species.clone());
            store.save(registry)?;
            println!(
                "Stored {} species names under project '{}' in {:?}.",
                result.species.len(),
                project,
                store.path()
            );
        }
    }

    Ok(())
}

fn write_species_files(output: &Path, result: &AnalysisResult) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(output)?;
    result
        .unwrapped
        .species()
        .iter()
        .map(|(name, molecules)| {
            let path = output.join(format!("{}.csv", file_stem(name)));
            write_unwrapped_species(&path, result.unwrapped.frame_indices(), molecules)
                .map_err(|e| CliError::writing(&path, e))?;
            info!("Wrote {} molecules of '{}' to {:?}", molecules.len(), name, &path);
            Ok(path)
        })
        .collect()
}

/// Maps a species name onto a single path component inside the output directory.
fn file_stem(name: &str) -> String {
    let stem: String = name
        .chars()
        .map(|c| match c {
            c if c.is_alphanumeric() => c,
            '-' | '_' | '+' | '.' => c,
            _ => '_',
        })
        .collect();
    if stem.trim_matches('.').is_empty() {
        format!("_{}", stem)
    } else {
        stem
    }
}

fn print_summary(result: &AnalysisResult, written: &[PathBuf]) {
    println!("Analyzed {} frames.", result.frames.len());
    println!("Molecule census (atoms per molecule: count):");
    for (size, count) in &result.census {
        println!("  {:>4}: {}", size, count);
    }
    println!("Species (formula -> name):");
    for (formula, name) in &result.species {
        println!("  {} -> {}", formula, name);
    }
    for path in written {
        println!("  wrote {}", path.display());
    }
}
