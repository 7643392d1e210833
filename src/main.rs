//! manifest CLI - Command line interface for radix_manifest
//!
//! Imports directory trees into a chunk store file and lists them back
//! level by level.

use anyhow::Context;
use clap::{Parser, Subcommand};
use radix_manifest::{
    logging, ChunkStore, Config, Entry, Manifest, ManifestBuilder, ObjectStore, Reference,
    WalkRecord, MAX_LEVEL,
};
use std::io::Write;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

#[derive(Parser)]
#[command(name = "manifest")]
#[command(about = "A lazily loaded radix trie manifest of content-addressed files")]
#[command(version)]
struct Cli {
    /// Path to the chunk store file
    #[arg(short, long)]
    store: Option<PathBuf>,

    /// Output format (json or text)
    #[arg(short, long, default_value = "json")]
    format: OutputFormat,

    /// Path separator (single ASCII character)
    #[arg(long)]
    separator: Option<char>,

    /// Log filter, e.g. `radix_manifest=debug`
    #[arg(long)]
    log_level: Option<String>,

    /// Config file to use instead of the default location
    #[arg(long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
enum OutputFormat {
    Json,
    Text,
}

#[derive(Subcommand)]
enum Commands {
    /// Store a directory tree and print the manifest root
    Import {
        /// Directory to import
        dir: PathBuf,
    },

    /// List entries down to a number of directory levels
    Ls {
        /// Manifest root reference (hex)
        root: String,
        /// Path to start from
        #[arg(default_value = "")]
        path: String,
        /// Maximum directory depth
        #[arg(short = 'L', long)]
        level: Option<u32>,
    },

    /// List every entry below a path
    Tree {
        /// Manifest root reference (hex)
        root: String,
        /// Path to start from
        #[arg(default_value = "")]
        path: String,
    },

    /// Look up a single path
    Get {
        /// Manifest root reference (hex)
        root: String,
        /// Stored path
        path: String,
        /// Write the stored content to stdout instead of the entry
        #[arg(long)]
        content: bool,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    if let Some(store) = &cli.store {
        config.store = store.clone();
    }
    if let Some(separator) = cli.separator {
        config.separator = separator;
    }
    if let Some(filter) = &cli.log_level {
        config.log_filter = filter.clone();
    }
    logging::init(&config.log_filter)?;
    let separator = config.separator_byte()?;

    match cli.command {
        Commands::Import { dir } => {
            let store = ObjectStore::open_or_create(&config.store)?;
            let summary = import(&store, &dir, config.separator)?;
            store.sync()?;
            output(
                &cli.format,
                &serde_json::json!({
                    "root": summary.root.to_hex(),
                    "files": summary.files,
                    "directories": summary.directories,
                }),
            )?;
        }

        Commands::Ls { root, path, level } => {
            let level = level.unwrap_or(config.default_level);
            let mut manifest = open_manifest(&config.store, &root)?.with_separator(separator);
            let records = manifest.list(path.as_bytes(), level)?;
            output(
                &cli.format,
                &serde_json::json!({
                    "root": root,
                    "path": path,
                    "level": level,
                    "entries": records.iter().map(record_json).collect::<Vec<_>>(),
                }),
            )?;
        }

        Commands::Tree { root, path } => {
            let mut manifest = open_manifest(&config.store, &root)?.with_separator(separator);
            let records = manifest.list(path.as_bytes(), MAX_LEVEL)?;
            output(
                &cli.format,
                &serde_json::json!({
                    "root": root,
                    "path": path,
                    "entries": records.iter().map(record_json).collect::<Vec<_>>(),
                }),
            )?;
        }

        Commands::Get {
            root,
            path,
            content,
        } => {
            let mut manifest = open_manifest(&config.store, &root)?.with_separator(separator);
            if content {
                let data = manifest.content(path.as_bytes())?;
                let mut stdout = std::io::stdout().lock();
                stdout.write_all(&data)?;
                stdout.flush()?;
            } else {
                let entry = manifest.lookup(path.as_bytes())?;
                output(
                    &cli.format,
                    &serde_json::json!({
                        "path": path,
                        "reference": entry.reference.to_hex(),
                        "metadata": entry.metadata,
                    }),
                )?;
            }
        }
    }

    Ok(())
}

struct ImportSummary {
    root: Reference,
    files: usize,
    directories: usize,
}

fn import(store: &ObjectStore, dir: &Path, separator: char) -> anyhow::Result<ImportSummary> {
    let mut builder = ManifestBuilder::new();
    let mut files = 0;
    let mut directories = 0;

    for item in WalkDir::new(dir).min_depth(1).sort_by_file_name() {
        let item = item?;
        let relative = item
            .path()
            .strip_prefix(dir)
            .with_context(|| format!("{} is outside {}", item.path().display(), dir.display()))?;
        let key = manifest_path(relative, separator);

        if item.file_type().is_file() {
            let data = std::fs::read(item.path())
                .with_context(|| format!("Failed to read {}", item.path().display()))?;
            let reference = store.put_content(&data)?;
            builder.insert(&key, Entry::new(reference).with_metadata("size", data.len().to_string()))?;
            files += 1;
        } else if item.file_type().is_dir() && is_empty_dir(item.path())? {
            // Empty directories would vanish otherwise; keep them as markers
            let reference = store.put_content(&[])?;
            builder.insert(format!("{}{}", key, separator), Entry::new(reference))?;
            directories += 1;
        }
    }

    let root = builder.persist(store)?;
    tracing::info!(root = %root.short(), files, directories, "imported directory");
    Ok(ImportSummary {
        root,
        files,
        directories,
    })
}

fn manifest_path(relative: &Path, separator: char) -> String {
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join(&separator.to_string())
}

fn is_empty_dir(path: &Path) -> anyhow::Result<bool> {
    Ok(std::fs::read_dir(path)?.next().is_none())
}

fn open_manifest(store: &Path, root: &str) -> anyhow::Result<Manifest<ObjectStore>> {
    let root: Reference = root
        .parse()
        .with_context(|| format!("Invalid root reference '{}'", root))?;
    let store = ObjectStore::open(store)
        .with_context(|| format!("Failed to open store {}", store.display()))?;
    Ok(Manifest::open(store, root))
}

fn record_json(record: &WalkRecord) -> serde_json::Value {
    serde_json::json!({
        "kind": record.kind,
        "path": String::from_utf8_lossy(&record.path),
        "name": String::from_utf8_lossy(&record.name),
        "reference": record.reference.map(|r| r.to_hex()),
        "metadata": record.metadata,
    })
}

fn output(format: &OutputFormat, value: &serde_json::Value) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string(value)?);
        }
        OutputFormat::Text => {
            println!("{}", serde_json::to_string_pretty(value)?);
        }
    }
    Ok(())
}
