use crate::cli::{RegistryArgs, RegistryCommands};
use crate::error::{CliError, Result};
use crate::registry_store::RegistryStore;
use std::path::PathBuf;
use tracing::info;
use trajkit::core::topology::registry::{NameRegistry, ProjectNames};

pub fn run(args: RegistryArgs) -> Result<()> {
    match args.command {
        RegistryCommands::Show { project } => handle_show(&RegistryStore::new()?, project),
        RegistryCommands::Set {
            project,
            formula,
            name,
        } => handle_set(&RegistryStore::new()?, &project, &formula, &name),
        RegistryCommands::Remove { project } => handle_remove(&RegistryStore::new()?, &project),
        RegistryCommands::Path => handle_path(),
        RegistryCommands::SetPath { path } => handle_set_path(path),
        RegistryCommands::ResetPath => handle_reset_path(),
    }
}

fn handle_show(store: &RegistryStore, project: Option<String>) -> Result<()> {
    let registry = store.load()?;
    print!("{}", render(&registry, project.as_deref())?);
    Ok(())
}

fn render(registry: &NameRegistry, project: Option<&str>) -> Result<String> {
    let mut out = String::new();
    let mut push_project = |name: &str, names: &ProjectNames| {
        out.push_str(&format!("[{}]\n", name));
        for (formula, molecule) in names {
            out.push_str(&format!("  {} = {}\n", formula, molecule));
        }
    };

    match project {
        Some(project) => {
            let names = registry
                .project(project)
                .ok_or_else(|| CliError::Registry(format!("Unknown project '{}'.", project)))?;
            push_project(project, names);
        }
        None => {
            for (name, names) in registry.projects() {
                push_project(name, names);
            }
        }
    }
    if out.is_empty() {
        out.push_str("The name registry is empty.\n");
    }
    Ok(out)
}

fn handle_set(store: &RegistryStore, project: &str, formula: &str, name: &str) -> Result<()> {
    let mut registry = store.load()?;
    match registry.set_name(project, formula, name) {
        Some(previous) => println!("[{}] {}: {} -> {}", project, formula, previous, name),
        None => println!("[{}] {} = {}", project, formula, name),
    }
    store.save(&registry)?;
    info!("Saved name registry to {:?}", store.path());
    Ok(())
}

fn handle_remove(store: &RegistryStore, project: &str) -> Result<()> {
    let mut registry = store.load()?;
    let removed = registry
        .remove_project(project)
        .ok_or_else(|| CliError::Registry(format!("Unknown project '{}'.", project)))?;
    store.save(&registry)?;
    println!("Removed project '{}' ({} names).", project, removed.len());
    Ok(())
}

fn handle_path() -> Result<()> {
    let store = RegistryStore::new()?;
    println!("Registry file: {}", store.path().display());
    Ok(())
}

fn handle_set_path(path: PathBuf) -> Result<()> {
    RegistryStore::set_custom_path(&path)?;
    println!("Registry path set to: {}", path.display());
    Ok(())
}

fn handle_reset_path() -> Result<()> {
    RegistryStore::reset_path()?;
    println!("Registry path reset to default.");
    Ok(())
}
