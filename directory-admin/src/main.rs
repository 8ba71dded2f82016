use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use content_filter::{
    catalog_digest, normalize, write_default_catalog, Catalog, Category, ContentFilter,
};
use directory_core::commands::serverdir_root;
use directory_core::{bootstrap, GateOutcome, ListingSubmission, Registration};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "directory-admin",
    about = "Operator helpers for the server directory content filter"
)]
struct Cli {
    /// Directory root (defaults to $SERVERDIR_ROOT or .serverdir)
    #[arg(long, global = true)]
    root: Option<PathBuf>,

    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand)]
enum Cmd {
    /// Check one or more strings against the active catalog
    Check {
        #[arg(required = true)]
        text: Vec<String>,
        /// Show which term or fragment matched
        #[arg(long)]
        explain: bool,
    },
    /// Print the normalized form the filter matches against
    Normalize { text: String },
    /// Catalog maintenance
    Catalog {
        #[command(subcommand)]
        cmd: CatalogCmd,
    },
    /// Run a server listing through the moderation gate
    Listing {
        #[arg(long)]
        name: String,
        #[arg(long)]
        invite: String,
        #[arg(long)]
        description: String,
        #[arg(long)]
        tags: Option<String>,
    },
    /// Run a registration through the moderation gate
    Register {
        #[arg(long)]
        username: String,
        #[arg(long)]
        password: String,
    },
    /// Show recent moderation records
    Audit {
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },
}

#[derive(Subcommand)]
enum CatalogCmd {
    /// Write the embedded default catalog into a directory (idempotent)
    Seed {
        #[arg(long)]
        dir: PathBuf,
    },
    /// Summarize a catalog file (embedded default if omitted)
    Show {
        #[arg(long)]
        file: Option<PathBuf>,
    },
}

fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let root = cli.root.unwrap_or_else(serverdir_root);

    match cli.cmd {
        Cmd::Check { text, explain } => check(&root, &text, explain),
        Cmd::Normalize { text } => {
            println!("{}", normalize(&text));
            Ok(ExitCode::SUCCESS)
        }
        Cmd::Catalog { cmd: CatalogCmd::Seed { dir } } => {
            let created = write_default_catalog(&dir)
                .with_context(|| format!("seeding {}", dir.display()))?;
            tracing::info!(dir = %dir.display(), created = created.len(), "catalog seed");
            if created.is_empty() {
                println!("nothing to do; catalog already present in {}", dir.display());
            }
            for name in created {
                println!("created {}", dir.join(name).display());
            }
            Ok(ExitCode::SUCCESS)
        }
        Cmd::Catalog { cmd: CatalogCmd::Show { file } } => show_catalog(file),
        Cmd::Listing {
            name,
            invite,
            description,
            tags,
        } => {
            let gate = bootstrap(&root)?;
            let outcome = gate.check_listing(&ListingSubmission {
                name,
                invite,
                description,
                tags,
            });
            Ok(report(outcome, "Server added"))
        }
        Cmd::Register { username, password } => {
            let gate = bootstrap(&root)?;
            let outcome = gate.check_registration(&Registration { username, password });
            Ok(report(outcome, "Registered"))
        }
        Cmd::Audit { limit } => {
            let gate = bootstrap(&root)?;
            for record in gate.audit().tail(limit)? {
                println!("{}", serde_json::to_string(&record)?);
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn check(root: &Path, inputs: &[String], explain: bool) -> Result<ExitCode> {
    let gate = bootstrap(root)?;
    let filter = gate.filter();
    let mut any_banned = false;

    for text in inputs {
        match filter.find_match(text.as_str()) {
            Some(hit) => {
                any_banned = true;
                tracing::debug!(term = %hit.term, kind = %hit.kind, "input banned");
                if explain {
                    println!(
                        "banned\t{text}\t{} ({}) in {:?}",
                        hit.term, hit.kind, hit.normalized
                    );
                } else {
                    println!("banned\t{text}");
                }
            }
            None => println!("clean\t{text}"),
        }
    }

    Ok(if any_banned { ExitCode::from(1) } else { ExitCode::SUCCESS })
}

fn show_catalog(file: Option<PathBuf>) -> Result<ExitCode> {
    let text = match &file {
        Some(path) => {
            fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?
        }
        None => content_filter::assets::BANNED_TERMS_TOML.to_string(),
    };
    let catalog = Catalog::parse(&text)?;
    tracing::debug!(catalog = %catalog.name, terms = catalog.term_count(), "catalog parsed");
    // Compiling proves the catalog is usable, not just parseable
    let filter = ContentFilter::from_toml(&text)?;

    println!("{} {}", catalog.name, catalog.version);
    if let Some(desc) = &catalog.description {
        println!("  {desc}");
    }
    for category in Category::ALL {
        println!("  {:<10} {}", category.as_str(), catalog.terms_in(category).len());
    }
    println!("  {:<10} {}", "fragments", catalog.fragments.len());
    println!("  patterns   {}", filter.len());
    println!("  blake3     {}", catalog_digest(&text));
    Ok(ExitCode::SUCCESS)
}

fn report(outcome: GateOutcome, ok_message: &str) -> ExitCode {
    match outcome.message() {
        None => {
            println!("{ok_message}");
            ExitCode::SUCCESS
        }
        Some(msg) => {
            println!("{msg}");
            ExitCode::from(1)
        }
    }
}
