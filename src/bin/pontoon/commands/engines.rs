//! `pontoon engines` commands

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Result};
use indicatif::{ProgressBar, ProgressStyle};

use crate::cli::{ListArgs, SetArgs};
use pontoon::catalog::{DirCatalogSource, EngineCatalog};
use pontoon::core::engine::is_supported_platform;
use pontoon::ops::{self, ToolCli, UpdateStatus};
use pontoon::resolver::{self, active, defaults, ResolutionSource};
use pontoon::util::Config;
use pontoon::{HybridProject, InstalledEngine};

fn load_catalog(config: &Config) -> EngineCatalog {
    EngineCatalog::from_source(&DirCatalogSource::new(config.engines_dir()))
}

fn describe(engine: &InstalledEngine) -> String {
    if engine.managed {
        format!("{:<10} {}", engine.id, engine.version)
    } else {
        format!("{:<10} {} (local)", engine.id, engine.version)
    }
}

pub fn list(project_dir: &Path, args: ListArgs) -> Result<()> {
    let project = HybridProject::open(project_dir)?;
    let config = Config::load_or_default();
    let catalog = load_catalog(&config);

    if args.state_only {
        let active = active::from_platforms_state(&project, &catalog);
        if active.is_empty() {
            println!("no engines recorded in platforms.json");
        }
        for engine in &active {
            println!("{}", describe(engine));
        }
        return Ok(());
    }

    let (active, source) = resolver::resolve_with_source(&project, &catalog, &config);
    let source = match source {
        ResolutionSource::PlatformsState => "platforms.json",
        ResolutionSource::ManifestEngines => "manifest",
        ResolutionSource::Defaults => "defaults",
    };

    if active.is_empty() {
        println!("no active engines (source: {})", source);
        return Ok(());
    }
    println!("active engines (source: {}):", source);
    for engine in &active {
        println!("  {}", describe(engine));
    }
    Ok(())
}

pub fn defaults() -> Result<()> {
    let config = Config::load_or_default();
    let catalog = load_catalog(&config);

    let engines = defaults::compute(&catalog, config.default_engines.as_deref());
    if engines.is_empty() {
        println!("no default engines available");
        return Ok(());
    }
    for engine in &engines {
        println!("{}", describe(engine));
    }
    Ok(())
}

pub fn set(project_dir: &Path, args: SetArgs) -> Result<()> {
    let project = HybridProject::open(project_dir)?;
    let config = Config::load_or_default();
    let catalog = load_catalog(&config);

    let desired = args
        .engines
        .iter()
        .map(|spec| parse_engine_arg(spec, &catalog))
        .collect::<Result<Vec<_>>>()?;

    if args.dry_run {
        let manifest_refs = pontoon::Manifest::load(&project.manifest_path())
            .map(|m| m.engines)
            .unwrap_or_default();
        let plan = ops::plan(&desired, &manifest_refs);
        for name in &plan.removals {
            println!("- {}", name);
        }
        for r in &plan.refs {
            println!("+ {}", r);
        }
        if !plan.changed && plan.removals.is_empty() {
            println!("manifest already up to date");
        }
        return Ok(());
    }

    let cli = ToolCli::for_project(&project, &config)?;
    let handle = ops::update_engines(project, desired, Arc::new(cli));

    let bar = ProgressBar::new(u64::from(handle.progress().total().max(1)));
    bar.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{pos}/{len}] {msg}")
            .unwrap(),
    );
    while !handle.is_finished() {
        let progress = handle.progress();
        bar.set_length(u64::from(progress.total().max(1)));
        bar.set_position(u64::from(progress.completed()));
        bar.set_message(progress.step());
        std::thread::sleep(Duration::from_millis(50));
    }
    bar.finish_and_clear();

    match handle.join()? {
        UpdateStatus::Ok => {
            println!("engines updated");
            Ok(())
        }
        UpdateStatus::Warning(msg) => {
            eprintln!("warning: {}", msg);
            Ok(())
        }
        UpdateStatus::Cancelled => bail!("engine update was cancelled"),
        UpdateStatus::Failed(msg) => bail!("engine update failed: {}", msg),
    }
}

/// Parse an `id@version` or `id@path` argument against the catalog.
fn parse_engine_arg(arg: &str, catalog: &EngineCatalog) -> Result<InstalledEngine> {
    let Some((id, spec)) = arg.split_once('@') else {
        bail!(
            "invalid engine `{}`\n\
             help: Use id@version (e.g. android@14.0.0) or id@path for a local checkout",
            arg
        );
    };
    if !is_supported_platform(id) {
        bail!("unsupported platform `{}`", id);
    }

    // Anything path-shaped is a local checkout.
    if spec.contains('/') || spec.starts_with('.') {
        let location = Path::new(spec);
        let existing = catalog
            .iter()
            .find(|e| !e.managed && e.id == id && e.location() == Some(location));
        return Ok(existing
            .cloned()
            .unwrap_or_else(|| InstalledEngine::unmanaged(id, location)));
    }

    match catalog.find(id, spec) {
        Some(engine) => Ok(engine.clone()),
        None => {
            let available: Vec<String> = catalog
                .engines_for(id)
                .map(|e| e.version.clone())
                .collect();
            if available.is_empty() {
                bail!("no installed engine for platform `{}`", id);
            }
            bail!(
                "engine {}@{} is not installed\n\
                 help: installed versions: {}",
                id,
                spec,
                available.join(", ")
            );
        }
    }
}
