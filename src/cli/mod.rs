//! Command-line surface for Memfog.

mod backup;
mod recall;

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use memfog::config::{parse_top_n, Config, DuplicatePolicy};
use memfog::terminal::StdTerminal;

#[derive(Parser)]
#[command(name = "memfog", version)]
#[command(about = "Personal memory recall with fuzzy keyword search", long_about = None)]
#[command(args_conflicts_with_subcommands = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Limit results to the top N records [default: 10]
    #[arg(short, long, value_name = "N", value_parser = parse_top_n)]
    pub top: Option<usize>,

    /// Keywords to search for
    #[arg(value_name = "KEYWORD")]
    pub keywords: Vec<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create a new record in your editor
    Add,
    /// Find records by keyword and delete them
    Remove {
        /// Limit results to the top N records [default: 10]
        #[arg(short, long, value_name = "N", value_parser = parse_top_n)]
        top: Option<usize>,

        /// Keywords to search for
        #[arg(value_name = "KEYWORD")]
        keywords: Vec<String>,
    },
    /// Import records from a JSON file
    Import {
        /// Also import records whose title already exists. What happens to
        /// them is set by --on-duplicate: `overwrite` (default) replaces the
        /// existing record's keywords and body, `duplicate` adds a second
        /// record with the same title.
        #[arg(short, long)]
        force: bool,

        /// Handling of existing titles when --force is given
        #[arg(long, value_enum, value_name = "POLICY")]
        on_duplicate: Option<DuplicatePolicy>,

        /// JSON file: an array of {"title", "keywords", "body"} objects
        path: PathBuf,
    },
    /// Export every record to a JSON file
    Export {
        /// Target file or directory [default: the memfog data home]
        path: Option<String>,
    },
}

/// Parse arguments, load configuration, and run the requested command.
pub fn run() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load()
        .with_context(|| format!("Failed to load configuration from {:?}", Config::path()))?;

    // Ctrl+C cancels the current prompt instead of killing the process.
    let interrupted = Arc::new(AtomicBool::new(false));
    let flag = interrupted.clone();
    ctrlc::set_handler(move || {
        flag.store(true, Ordering::SeqCst);
    })
    .context("Failed to install Ctrl+C handler")?;
    let mut term = StdTerminal::new(interrupted);

    match cli.command {
        None => {
            if let Some(top) = cli.top {
                config.search.top_n = top;
            }
            recall::cmd_search(&config, &cli.keywords.join(" "), &mut term)
        }
        Some(Commands::Add) => recall::cmd_add(&config, &mut term),
        Some(Commands::Remove { top, keywords }) => {
            if let Some(top) = top {
                config.search.top_n = top;
            }
            recall::cmd_remove(&config, &keywords.join(" "), &mut term)
        }
        Some(Commands::Import {
            force,
            on_duplicate,
            path,
        }) => {
            if let Some(policy) = on_duplicate {
                config.import.on_duplicate = policy;
            }
            backup::cmd_import(&config, &path, force, &mut term)
        }
        Some(Commands::Export { path }) => backup::cmd_export(&config, path.as_deref(), &mut term),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_default_mode_keywords_and_top() {
        let cli = Cli::try_parse_from(["memfog", "--top", "3", "car", "brakes"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.top, Some(3));
        assert_eq!(cli.keywords, vec!["car", "brakes"]);
    }

    #[test]
    fn test_negative_top_rejected() {
        assert!(Cli::try_parse_from(["memfog", "--top", "-1", "car"]).is_err());
        assert!(Cli::try_parse_from(["memfog", "--top", "ten"]).is_err());
    }

    #[test]
    fn test_remove_subcommand() {
        let cli = Cli::try_parse_from(["memfog", "remove", "-t", "0", "food"]).unwrap();
        match cli.command {
            Some(Commands::Remove { top, keywords }) => {
                assert_eq!(top, Some(0));
                assert_eq!(keywords, vec!["food"]);
            }
            _ => panic!("expected remove"),
        }
    }

    #[test]
    fn test_import_subcommand() {
        let cli = Cli::try_parse_from([
            "memfog",
            "import",
            "--force",
            "--on-duplicate",
            "duplicate",
            "backup.json",
        ])
        .unwrap();
        match cli.command {
            Some(Commands::Import {
                force,
                on_duplicate,
                path,
            }) => {
                assert!(force);
                assert_eq!(on_duplicate, Some(DuplicatePolicy::Duplicate));
                assert_eq!(path, PathBuf::from("backup.json"));
            }
            _ => panic!("expected import"),
        }
    }

    #[test]
    fn test_export_optional_path() {
        let cli = Cli::try_parse_from(["memfog", "export"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Export { path: None })));
    }
}
