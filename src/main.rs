use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};

use funcdex::docgen::DocGenerator;
use funcdex::{
    EmbeddingProvider, ExtractorFactory, FastEmbedder, HashEmbedder, IndexBuilder, Language,
    QueryEngine, Settings, VectorStore, logging,
};

#[derive(Parser)]
#[command(name = "funcdex")]
#[command(version, about = "Function-level code extraction and semantic search")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the configuration file
    Init {
        /// Overwrite an existing configuration
        #[arg(short, long)]
        force: bool,
    },

    /// Extract structured function records from one file
    Parse {
        /// Path to the source file
        file: PathBuf,
    },

    /// Build the vector index for a directory tree
    Index {
        /// Root folder to scan
        #[arg(default_value = ".")]
        root: PathBuf,

        /// Language to index (auto-detected if omitted)
        #[arg(short, long)]
        lang: Option<String>,

        /// Worker threads (overrides config)
        #[arg(short, long)]
        threads: Option<usize>,
    },

    /// Semantic search over an indexed codebase
    Search {
        /// Free-text query
        query: String,

        /// Language to search
        #[arg(short, long, default_value = "py")]
        lang: String,

        /// Number of results
        #[arg(short = 'k', long, default_value_t = 5)]
        limit: usize,
    },

    /// Generate docs for one file (Gemini per function, Groq summary)
    Document {
        /// Path to the source file
        file: PathBuf,
    },

    /// Show the effective configuration
    Config,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if let Commands::Init { force } = cli.command {
        let path = Settings::init_config_file(force)?;
        println!("Created {}", path.display());
        return Ok(());
    }

    let settings = Arc::new(Settings::load().map_err(|e| anyhow::anyhow!(e))?);
    logging::init_with_config(&settings.logging);

    match cli.command {
        Commands::Init { .. } => unreachable!("handled above"),

        Commands::Parse { file } => {
            let file = file
                .canonicalize()
                .with_context(|| format!("file not found: {}", file.display()))?;
            let records = ExtractorFactory::new().route_and_extract(&file)?;
            for record in records {
                println!("{}", serde_json::to_string(&record)?);
            }
        }

        Commands::Index {
            root,
            lang,
            threads,
        } => {
            let root = root
                .canonicalize()
                .with_context(|| format!("directory not found: {}", root.display()))?;
            let language = match lang {
                Some(alias) => Language::from_alias(&alias).with_context(|| {
                    format!(
                        "unsupported language '{alias}' (supported: {})",
                        Language::supported_tags()
                    )
                })?,
                None => detect_project_language(&root)?,
            };

            let mut settings = (*settings).clone();
            if let Some(threads) = threads {
                settings.indexing.parallel_threads = threads;
            }
            let settings = Arc::new(settings);

            let store = VectorStore::open(settings.resolved_index_path())?;
            let builder = IndexBuilder::new(settings.clone(), make_embedder(&settings)?, store);
            let report = builder.build(&root, language)?;

            println!(
                "Indexed {}/{} functions from {} {} files",
                report.functions_indexed,
                report.functions_found,
                report.files_scanned,
                language.tag()
            );
            if report.duplicate_ids > 0 {
                println!("  {} duplicate ids disambiguated", report.duplicate_ids);
            }
            for error in &report.file_errors {
                println!("  skipped {}: {}", error.path.display(), error.cause);
            }
            for error in &report.record_errors {
                println!("  degraded {}: {}", error.id, error.cause);
            }
        }

        Commands::Search { query, lang, limit } => {
            let store = VectorStore::open(settings.resolved_index_path())?;
            let engine = QueryEngine::new(make_embedder(&settings)?, store);
            let hits = engine.search(&query, &lang, limit)?;
            println!("{}", serde_json::to_string_pretty(&hits)?);
        }

        Commands::Document { file } => {
            let file = file
                .canonicalize()
                .with_context(|| format!("file not found: {}", file.display()))?;
            let generator = DocGenerator::from_settings(&settings)?;
            let docs = generator.document_file(&file).await?;

            println!("Summary: {}", docs.summary);
            for function in &docs.functions {
                let doc = function.doc_comment.as_deref().unwrap_or("(no doc)");
                println!("\n{} -> {doc}", function.name);
            }
        }

        Commands::Config => {
            println!("{}", toml::to_string_pretty(settings.as_ref())?);
        }
    }

    Ok(())
}

/// Construct the configured embedding provider.
fn make_embedder(settings: &Settings) -> anyhow::Result<Arc<dyn EmbeddingProvider>> {
    Ok(match settings.embedding.provider.as_str() {
        "hashed" => Arc::new(HashEmbedder::with_dimensions(settings.embedding.dimensions)),
        _ => Arc::new(FastEmbedder::from_name(&settings.embedding.model)?),
    })
}

/// Pick the language to index when none is given: scan the extensions
/// present under `root` and take the first supported language in a fixed
/// priority order.
fn detect_project_language(root: &Path) -> anyhow::Result<Language> {
    let mut extensions = HashSet::new();
    for entry in walk_extensions(root) {
        extensions.insert(entry);
    }

    const PRIORITY: [Language; 6] = [
        Language::Python,
        Language::JavaScript,
        Language::Cpp,
        Language::Go,
        Language::Rust,
        Language::Java,
    ];
    for language in PRIORITY {
        if language
            .extensions()
            .iter()
            .any(|ext| extensions.contains(*ext))
        {
            return Ok(language);
        }
    }
    bail!(
        "no source files for a supported language ({}) found under {}",
        Language::supported_tags(),
        root.display()
    );
}

fn walk_extensions(root: &Path) -> Vec<String> {
    ignore::WalkBuilder::new(root)
        .require_git(false)
        .build()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().map_or(false, |ft| ft.is_file()))
        .filter_map(|entry| {
            entry
                .path()
                .extension()
                .and_then(|ext| ext.to_str())
                .map(|ext| ext.to_ascii_lowercase())
        })
        .collect()
}
