//! `pontoon prepare` command

use std::path::Path;

use anyhow::{bail, Result};

use pontoon::ops::{PlatformCli, ToolCli};
use pontoon::util::{Config, ProgressToken};
use pontoon::HybridProject;

pub fn execute(project_dir: &Path) -> Result<()> {
    let project = HybridProject::open(project_dir)?;
    let config = Config::load_or_default();
    let cli = ToolCli::for_project(&project, &config)?;

    let outcome = cli.prepare(&ProgressToken::new());
    project.refresh();
    if !outcome.success {
        bail!("{}", outcome.summary);
    }
    println!("{}", outcome.summary);
    Ok(())
}
