use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use ngramdex::persist::{MetaFile, META_VERSION};
use ngramdex::{Analyzer, AnalyzerConfig, DocId, Document, IndexError, IndexStore, SearchEngine, SledStore, SAMPLE_DOCUMENTS, SAMPLE_QUERIES};
use serde::Deserialize;
use tracing_subscriber::{fmt, EnvFilter};
use walkdir::WalkDir;

use std::fs::{self, File};
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize)]
struct InputDoc {
    #[serde(alias = "body", alias = "text")]
    content: String,
}

#[derive(Parser)]
#[command(name = "ngramdex")]
#[command(about = "Build and query an n-gram TF-IDF index", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the index from JSON, JSONL or plain-text files
    Build {
        /// Input path (file or directory)
        #[arg(long)]
        input: String,
        /// Index database directory
        #[arg(long)]
        db: String,
        /// Longest n-gram to index (1-3)
        #[arg(long, default_value_t = 3)]
        max_ngram: usize,
        /// NFKC-normalize text before tokenizing
        #[arg(long, default_value_t = false)]
        nfkc: bool,
    },
    /// Run one or more queries against a built index
    Query {
        #[arg(long)]
        db: String,
        #[arg(required = true)]
        queries: Vec<String>,
    },
    /// Print index metadata as JSON
    Stats {
        #[arg(long)]
        db: String,
    },
    /// Index the bundled sample collection in a temporary store and run its queries
    Demo,
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Build { input, db, max_ngram, nfkc } => build_index(&input, &db, AnalyzerConfig { max_ngram, nfkc }),
        Commands::Query { db, queries } => run_queries(&db, &queries),
        Commands::Stats { db } => print_stats(&db),
        Commands::Demo => run_demo(),
    }
}

fn build_index(input: &str, db: &str, config: AnalyzerConfig) -> Result<()> {
    let files = collect_files(Path::new(input))?;
    if files.is_empty() {
        bail!("no .json, .jsonl or .txt files found under {input}");
    }

    let mut documents: Vec<Document> = Vec::new();
    for file in &files {
        let texts = match file.extension().and_then(|s| s.to_str()) {
            Some("jsonl") => read_jsonl(file)?,
            Some("json") => read_json(file)?,
            _ => read_lines(file)?,
        };
        tracing::debug!(file = %file.display(), docs = texts.len(), "read input file");
        for content in texts {
            let id = documents.len() as DocId + 1;
            documents.push(Document::new(id, content));
        }
    }
    tracing::info!(num_docs = documents.len(), files = files.len(), "ingested documents");

    let store = SledStore::open(db)?;
    if let Some(previous) = store.load_meta()? {
        tracing::info!(db, previous_docs = previous.num_docs, "replacing existing index");
    }
    let mut engine = SearchEngine::new(Analyzer::new(config.clone()), store);
    let summary = engine.index(&documents)?;

    let meta = MetaFile {
        num_docs: summary.num_docs,
        num_terms: summary.num_terms,
        created_at: time::OffsetDateTime::now_utc()
            .format(&time::format_description::well_known::Rfc3339)
            .unwrap_or_else(|_| "".into()),
        version: META_VERSION,
        analyzer: config,
    };
    engine.store().save_meta(&meta)?;
    engine.store().flush()?;

    tracing::info!(db, "index build complete");
    Ok(())
}

fn collect_files(input_path: &Path) -> Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = Vec::new();
    if input_path.is_dir() {
        for entry in WalkDir::new(input_path).sort_by_file_name() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    tracing::warn!(%err, "skipping unreadable input entry");
                    continue;
                }
            };
            let p = entry.path();
            if p.is_file() {
                if let Some(ext) = p.extension().and_then(|s| s.to_str()) {
                    if matches!(ext, "json" | "jsonl" | "txt") {
                        files.push(p.to_path_buf());
                    }
                }
            }
        }
    } else if input_path.is_file() {
        files.push(input_path.to_path_buf());
    } else {
        bail!("input path {} does not exist", input_path.display());
    }
    Ok(files)
}

fn read_jsonl(file: &Path) -> Result<Vec<String>> {
    let reader = BufReader::new(File::open(file)?);
    let mut texts = Vec::new();
    for (lineno, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() { continue; }
        let doc: InputDoc = serde_json::from_str(&line)
            .with_context(|| format!("{}:{}", file.display(), lineno + 1))?;
        texts.push(doc.content);
    }
    Ok(texts)
}

fn read_json(file: &Path) -> Result<Vec<String>> {
    let reader = BufReader::new(File::open(file)?);
    let json: serde_json::Value = serde_json::from_reader(reader)
        .with_context(|| format!("parsing {}", file.display()))?;
    let texts = match json {
        serde_json::Value::Array(arr) => arr
            .into_iter()
            .map(|v| serde_json::from_value::<InputDoc>(v).map(|d| d.content))
            .collect::<Result<Vec<_>, _>>()?,
        serde_json::Value::Object(_) => vec![serde_json::from_value::<InputDoc>(json)?.content],
        _ => Vec::new(),
    };
    Ok(texts)
}

fn read_lines(file: &Path) -> Result<Vec<String>> {
    let text = fs::read_to_string(file)?;
    Ok(text.lines().map(str::trim).filter(|l| !l.is_empty()).map(str::to_string).collect())
}

fn open_engine(db: &str) -> Result<SearchEngine<SledStore>> {
    let store = SledStore::open(db)?;
    let meta = store.load_meta()?.ok_or_else(|| IndexError::MissingMeta(db.to_string()))?;
    Ok(SearchEngine::new(Analyzer::new(meta.analyzer), store))
}

fn run_queries(db: &str, queries: &[String]) -> Result<()> {
    let engine = open_engine(db)?;
    let stdout = io::stdout();
    engine.run_queries(queries, &mut stdout.lock())
}

fn print_stats(db: &str) -> Result<()> {
    let store = SledStore::open(db)?;
    let meta = store.load_meta()?.ok_or_else(|| IndexError::MissingMeta(db.to_string()))?;
    println!("{}", serde_json::to_string_pretty(&meta)?);
    Ok(())
}

fn run_demo() -> Result<()> {
    let mut engine = SearchEngine::new(Analyzer::default(), SledStore::temporary()?);
    engine.index_texts(&SAMPLE_DOCUMENTS)?;
    let stdout = io::stdout();
    engine.run_queries(&SAMPLE_QUERIES, &mut stdout.lock())
}
