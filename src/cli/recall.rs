//! Recall commands: search, add, and remove.

use anyhow::{Context, Result};
use tracing::info;

use memfog::terminal::Terminal;
use memfog::{Config, Memfog};

fn open_session(config: &Config) -> Result<Memfog> {
    Memfog::open(config)
        .with_context(|| format!("Failed to open record store at {:?}", Config::db_path()))
}

pub(crate) fn cmd_search(config: &Config, query: &str, term: &mut dyn Terminal) -> Result<()> {
    let mut session = open_session(config)?;
    session.search(query, term).context("Search failed")
}

pub(crate) fn cmd_add(config: &Config, term: &mut dyn Terminal) -> Result<()> {
    let mut session = open_session(config)?;
    if let Some(id) = session.add(term).context("Failed to add record")? {
        info!(id = %id, "Record added");
    }
    Ok(())
}

pub(crate) fn cmd_remove(config: &Config, query: &str, term: &mut dyn Terminal) -> Result<()> {
    let mut session = open_session(config)?;
    let removed = session.remove(query, term).context("Failed to remove record")?;
    info!(removed, "Remove finished");
    Ok(())
}
