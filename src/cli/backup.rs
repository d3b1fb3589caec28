//! Backup commands: import and export JSON record files.

use std::path::Path;

use anyhow::{Context, Result};

use memfog::terminal::Terminal;
use memfog::{Config, Memfog};

pub(crate) fn cmd_import(
    config: &Config,
    path: &Path,
    force: bool,
    term: &mut dyn Terminal,
) -> Result<()> {
    let mut session = Memfog::open(config)
        .with_context(|| format!("Failed to open record store at {:?}", Config::db_path()))?;
    session
        .import(path, force, term)
        .with_context(|| format!("Failed to import {:?}", path))?;
    Ok(())
}

pub(crate) fn cmd_export(
    config: &Config,
    target: Option<&str>,
    term: &mut dyn Terminal,
) -> Result<()> {
    let session = Memfog::open(config)
        .with_context(|| format!("Failed to open record store at {:?}", Config::db_path()))?;
    if session
        .export(target, term)
        .context("Failed to export records")?
        .is_none()
    {
        term.print_line("Export cancelled")?;
    }
    Ok(())
}
