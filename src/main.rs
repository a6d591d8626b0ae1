//! Docweave CLI - document declarations without breaking the file

use clap::{Parser, Subcommand};
use docweave::config::{self, DocweaveConfig};
use docweave::docblock::Narrative;
use docweave::ignore::IgnoreFilter;
use docweave::metadata::DEFAULT_MAX_REVISIONS;
use docweave::narrative::{FileNarrativeProvider, FixedNarrativeProvider, NarrativeProvider};
use docweave::{default_registry, Engine};
use std::path::{Path, PathBuf};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "docweave")]
#[command(version = "0.1.0")]
#[command(about = "Documentation mutation engine - insert and refresh structured doc blocks")]
#[command(long_about = r#"
Docweave locates a function or class at file:line, composes a structured doc
block (narrative prose + deterministic metadata), and rewrites the file only
if the result still parses. Existing narrative prose is preserved verbatim;
only metadata sections are recomputed.

Example usage:
  docweave annotate src/app.py --line 42 --narrative narratives.json
  docweave batch --path ./src --narrative narratives.json
  docweave deps src/app.py --name resolve --format json
"#)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to a docweave.toml config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Document one declaration at file:line
    Annotate {
        /// Source file to mutate
        file: PathBuf,

        /// 1-based line of the declaration header
        #[arg(short, long)]
        line: u32,

        /// JSON file mapping declaration names to narratives
        #[arg(short, long)]
        narrative: Option<PathBuf>,

        /// Inline narrative: what the declaration does
        #[arg(long)]
        what: Option<String>,

        /// Inline narrative: why it exists
        #[arg(long)]
        why: Option<String>,

        /// Inline narrative guardrail (repeatable)
        #[arg(long = "guardrail")]
        guardrails: Vec<String>,

        /// Bound on revisions pulled from version control
        #[arg(long)]
        max_revisions: Option<usize>,
    },

    /// Document every declaration under a file or directory
    Batch {
        /// File or directory to process
        #[arg(short, long)]
        path: PathBuf,

        /// JSON file mapping declaration names to narratives
        #[arg(short, long)]
        narrative: Option<PathBuf>,

        /// Bound on revisions pulled from version control
        #[arg(long)]
        max_revisions: Option<usize>,
    },

    /// Print the existing doc block at file:line
    Inspect {
        /// Source file to read
        file: PathBuf,

        /// 1-based line of the declaration header
        #[arg(short, long)]
        line: u32,
    },

    /// Print collected metadata for a named declaration
    Deps {
        /// Source file to analyze
        file: PathBuf,

        /// Declaration name
        #[arg(short, long)]
        name: String,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,

        /// Bound on revisions pulled from version control
        #[arg(long)]
        max_revisions: Option<usize>,
    },

    /// List registered language adapters and their extensions
    Languages,

    /// Write a starter docweave.toml
    Init {
        /// Overwrite an existing config
        #[arg(long)]
        force: bool,
    },
}

/// Provider used when no narrative source is configured. Declarations with
/// an existing block still get their metadata refreshed; new blocks cannot
/// be composed.
struct NoNarrative;

impl NarrativeProvider for NoNarrative {
    fn narrate(&self, declaration_name: &str, _snippet: &str) -> docweave::Result<Narrative> {
        Err(docweave::Error::Narrative(format!(
            "no narrative source configured (needed for '{declaration_name}'); pass --narrative or --what/--why"
        )))
    }
}

fn build_provider(
    narrative: Option<&Path>,
    what: Option<String>,
    why: Option<String>,
    guardrails: Vec<String>,
    config: &DocweaveConfig,
) -> anyhow::Result<Box<dyn NarrativeProvider>> {
    if let (Some(what), Some(why)) = (what, why) {
        return Ok(Box::new(FixedNarrativeProvider::new(Narrative {
            what,
            why,
            guardrails,
        })));
    }
    let configured = config.narrative.as_ref().map(PathBuf::from);
    if let Some(path) = narrative.map(Path::to_path_buf).or(configured) {
        let provider = FileNarrativeProvider::load(&path)?;
        if provider.is_empty() {
            tracing::warn!("{} contains no narrative entries", path.display());
        } else {
            tracing::debug!(
                "loaded {} narrative entries from {}",
                provider.len(),
                path.display()
            );
        }
        return Ok(Box::new(provider));
    }
    Ok(Box::new(NoNarrative))
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    let config = config::load_config(cli.config.as_deref())?.unwrap_or_default();

    match cli.command {
        Commands::Annotate {
            file,
            line,
            narrative,
            what,
            why,
            guardrails,
            max_revisions,
        } => {
            let engine = Engine::new(
                default_registry()?,
                max_revisions
                    .or(config.max_revisions)
                    .unwrap_or(DEFAULT_MAX_REVISIONS),
            );
            let provider =
                build_provider(narrative.as_deref(), what, why, guardrails, &config)?;

            let result = engine.document(&file, line, provider.as_ref())?;
            if result.success {
                println!("✅ Documented {}:{}", file.display(), line);
            } else {
                println!(
                    "⚠️  Skipped {}:{} ({})",
                    file.display(),
                    line,
                    serde_json::to_string(&result.reason)?
                );
            }
        }

        Commands::Batch {
            path,
            narrative,
            max_revisions,
        } => {
            let engine = Engine::new(
                default_registry()?,
                max_revisions
                    .or(config.max_revisions)
                    .unwrap_or(DEFAULT_MAX_REVISIONS),
            );
            let provider = build_provider(narrative.as_deref(), None, None, Vec::new(), &config)?;

            let root = if path.is_dir() {
                path.clone()
            } else {
                path.parent().map(Path::to_path_buf).unwrap_or_else(|| PathBuf::from("."))
            };
            let filter = IgnoreFilter::new(&root, config.exclude.as_deref());

            let mut files: Vec<PathBuf> = Vec::new();
            for adapter in engine.registry().list_adapters() {
                files.extend(adapter.discover_files(&path, &filter));
            }
            files.sort();
            files.dedup();

            println!("🚀 Documenting {} file(s) under {}", files.len(), path.display());

            let mut documented = 0usize;
            let mut skipped = 0usize;
            let mut failed = 0usize;
            for file in &files {
                // A single malformed file must never abort the run.
                match engine.document_file(file, provider.as_ref()) {
                    Ok(summary) => {
                        documented += summary.documented;
                        skipped += summary.skipped;
                    }
                    Err(e) => {
                        tracing::error!("failed on {}: {e}", file.display());
                        failed += 1;
                    }
                }
            }

            println!("\n📊 Batch complete:");
            println!("   Declarations documented: {documented}");
            println!("   Declarations skipped: {skipped}");
            println!("   Files failed: {failed}");
        }

        Commands::Inspect { file, line } => {
            let engine = Engine::with_defaults()?;
            match engine.inspect(&file, line)? {
                Some(block) => println!("{block}"),
                None => println!("∅ No doc block at {}:{}", file.display(), line),
            }
        }

        Commands::Deps {
            file,
            name,
            format,
            max_revisions,
        } => {
            let engine = Engine::new(
                default_registry()?,
                max_revisions
                    .or(config.max_revisions)
                    .unwrap_or(DEFAULT_MAX_REVISIONS),
            );
            let metadata = engine.metadata(&file, &name)?;

            if format == "json" {
                println!("{}", serde_json::to_string_pretty(&metadata)?);
            } else if metadata.is_empty() {
                println!("∅ No metadata for '{name}' in {}", file.display());
            } else {
                println!("📎 Metadata for '{name}' ({})", file.display());
                println!("   calls: {}", metadata.calls.join(", "));
                println!("   imports: {}", metadata.imports.join(", "));
                for entry in &metadata.changelog {
                    println!("   {}", entry.render());
                }
            }
        }

        Commands::Languages => {
            let registry = default_registry()?;
            for adapter in registry.list_adapters() {
                let (open, close) = adapter.comment_style().delimiters();
                println!(
                    "- {} [{}] ({}{})",
                    adapter.language_name(),
                    adapter.file_extensions().join(", "),
                    open,
                    close.map(|c| format!(" ... {}", c.trim())).unwrap_or_default()
                );
            }
        }

        Commands::Init { force } => {
            let path = config::default_config_path();
            let starter = DocweaveConfig {
                max_revisions: Some(DEFAULT_MAX_REVISIONS),
                exclude: None,
                narrative: Some("narratives.json".to_string()),
            };
            config::write_config(&path, &starter, force)?;
            println!("✅ Wrote {}", path.display());
        }
    }

    Ok(())
}
