//! Line-driven fuzzy content search over note files.
//!
//! Usage: `quill-find FILE...`, then type one needle per line on stdin.
//! Settings are read from `--config` or `$QUILL_CONFIG` (a search.toml).

mod logging;

use clap::Parser;
use quill_search::{ChunkIndex, Chunker, ConfigError, PreviewDisplay, SearchConfig, SearchError};
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use thiserror::Error;

#[derive(Parser)]
#[command(name = "quill-find")]
#[command(about = "Fuzzy content search over note files")]
#[command(version)]
struct Cli {
    /// Files to search
    #[arg(value_name = "FILE", required = true)]
    paths: Vec<PathBuf>,

    /// Search settings file
    #[arg(long, env = "QUILL_CONFIG")]
    config: Option<PathBuf>,
}

/// Rows printed per needle, best first.
const MAX_ROWS: usize = 10;

#[derive(Debug, Error)]
enum CliError {
    #[error("cannot read {path}: {source}")]
    Read { path: PathBuf, source: io::Error },

    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    #[error("search error: {0}")]
    Search(#[from] SearchError),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

fn main() -> ExitCode {
    logging::init();

    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let paths = cli.paths;

    let config = load_config(cli.config.as_deref())?;
    for problem in config.validate() {
        tracing::warn!(%problem, "invalid search config, using default");
    }
    let config = config.with_defaults_for_invalid();

    let contents = paths
        .iter()
        .map(|path| read_document(path))
        .collect::<Result<Vec<_>, _>>()?;

    let mut chunker = Chunker::from_config(&config);
    for content in &contents {
        chunker.add(content);
    }
    tracing::info!(
        documents = chunker.document_count(),
        chunks = chunker.len(),
        "indexed files"
    );

    let mut searcher = chunker.searcher(&config);
    let stdin = io::stdin();
    let mut out = io::stdout().lock();

    for needle in stdin.lock().lines() {
        let needle = needle?;
        let list = match searcher.search(&needle) {
            Ok(list) => list,
            Err(err @ SearchError::NeedleTooLong { .. }) => {
                writeln!(out, "{err}")?;
                continue;
            }
            Err(err) => return Err(err.into()),
        };

        writeln!(out, "{} matches in {:.2?}", list.len(), list.elapsed())?;
        for result in list.iter_best_first().take(MAX_ROWS) {
            let chunk: &ChunkIndex = result.key();
            let snippet =
                result.print_matched(config.snippet.context_chars, config.snippet.max_width);
            let highlighted: String = snippet
                .segments()
                .map(|segment| {
                    if segment.highlighted {
                        format!("[{}]", segment.text)
                    } else {
                        segment.text.to_string()
                    }
                })
                .collect();
            writeln!(
                out,
                "{}:{}: {}{}{}",
                paths[chunk.document].display(),
                chunk.line,
                if snippet.truncated_start() { quill_search::ELLIPSIS } else { "" },
                highlighted,
                if snippet.truncated_end() { quill_search::ELLIPSIS } else { "" },
            )?;
        }
        if let Some(best) = list.best() {
            write!(
                out,
                "{}",
                PreviewDisplay::new(&chunker, best.key(), config.preview_radius)
            )?;
        }
        out.flush()?;
    }

    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<SearchConfig, CliError> {
    match path {
        Some(path) => Ok(SearchConfig::load(path)?),
        None => Ok(SearchConfig::default()),
    }
}

fn read_document(path: &Path) -> Result<String, CliError> {
    std::fs::read_to_string(path).map_err(|source| CliError::Read {
        path: path.to_path_buf(),
        source,
    })
}
