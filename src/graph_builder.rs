//! Builds the directed mention graph from a directory of delimited files.
//!
//! Each line of a `*.csv` file holds one `user1 <sep> user2` record. Both
//! fields go through a normalizer; a record whose endpoint normalizes to the
//! `"NAN"` sentinel is dropped. Everything else becomes a `user1 → user2`
//! edge, with repeated records collapsing onto a single edge.
//!
//! Files are discovered in filesystem enumeration order, which is not
//! guaranteed to be sorted. Without a `num_files` cap the order cannot change
//! the final graph's node or edge sets. With a cap, which files get read is
//! platform dependent unless `sort_files` is set.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf, MAIN_SEPARATOR};

use petgraph::graph::{DiGraph, NodeIndex};
use tracing::{debug, info, instrument, warn};
use walkdir::WalkDir;

use crate::cleaning::{clean_user_name, SENTINEL};
use crate::config::{IngestOptions, MalformedPolicy};
use crate::error::{NetworkError, Result};

/// Directed graph of users. An edge `A → B` means "A mentions B".
#[derive(Debug, Clone, Default)]
pub struct MentionGraph {
    pub graph: DiGraph<String, ()>,
    pub node_map: HashMap<String, NodeIndex>,
}

impl MentionGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `source → target`, creating either endpoint if needed.
    ///
    /// Returns `false` when the edge was already present.
    pub fn add_edge(&mut self, source: &str, target: &str) -> bool {
        let source_idx = self.ensure_node(source);
        let target_idx = self.ensure_node(target);

        // petgraph allows parallel edges
        if self.graph.contains_edge(source_idx, target_idx) {
            return false;
        }
        self.graph.add_edge(source_idx, target_idx, ());
        true
    }

    fn ensure_node(&mut self, id: &str) -> NodeIndex {
        if let Some(&idx) = self.node_map.get(id) {
            return idx;
        }
        let idx = self.graph.add_node(id.to_string());
        self.node_map.insert(id.to_string(), idx);
        idx
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn node_index(&self, id: &str) -> Option<NodeIndex> {
        self.node_map.get(id).copied()
    }

    pub fn contains_edge(&self, source: &str, target: &str) -> bool {
        match (self.node_index(source), self.node_index(target)) {
            (Some(s), Some(t)) => self.graph.contains_edge(s, t),
            _ => false,
        }
    }

    /// Node identifiers in insertion order.
    pub fn node_ids(&self) -> impl Iterator<Item = &str> {
        self.graph.node_weights().map(String::as_str)
    }
}

/// Counters collected while reading one directory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngestReport {
    pub files_read: usize,
    pub lines_read: usize,
    pub edges_added: usize,
    pub dropped_unresolved: usize,
    pub malformed_skipped: usize,
}

/// Builds a graph from every `*.csv` file in `path` using [`clean_user_name`].
pub fn build_graph_from_csvs(
    path: &str,
    options: &IngestOptions,
) -> Result<(MentionGraph, IngestReport)> {
    build_graph_with(path, options, clean_user_name)
}

/// Same as [`build_graph_from_csvs`] with a caller-supplied normalizer.
///
/// # Errors
///
/// `InvalidArgument` for an empty path or separator, `Io` when a file cannot
/// be read, and `MalformedRecord` when the policy is
/// [`MalformedPolicy::Abort`] and a line is not valid UTF-8 or does not
/// split into two fields.
#[instrument(skip(options, normalize), fields(sep = %options.separator))]
pub fn build_graph_with<F>(
    path: &str,
    options: &IngestOptions,
    normalize: F,
) -> Result<(MentionGraph, IngestReport)>
where
    F: Fn(&str) -> String,
{
    if path.is_empty() {
        return Err(NetworkError::InvalidArgument(
            "path must be a non-empty string".to_string(),
        ));
    }
    if options.separator.is_empty() {
        return Err(NetworkError::InvalidArgument(
            "separator must not be empty".to_string(),
        ));
    }

    let dir = strip_trailing_separator(path);
    let files = discover_csv_files(Path::new(dir), options.sort_files)?;
    let limit = options.num_files.unwrap_or(files.len());

    let mut graph = MentionGraph::new();
    let mut report = IngestReport::default();

    for file in files.iter().take(limit) {
        info!(file = %file.display(), "Opening");
        read_file(file, options, &normalize, &mut graph, &mut report)?;
        report.files_read += 1;
    }

    debug!(
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        ?report,
        "graph built"
    );

    Ok((graph, report))
}

fn strip_trailing_separator(path: &str) -> &str {
    if path.len() > 1 {
        path.strip_suffix('/')
            .or_else(|| path.strip_suffix(MAIN_SEPARATOR))
            .unwrap_or(path)
    } else {
        path
    }
}

/// Lists `*.csv` files directly inside `dir`. A missing directory has none.
fn discover_csv_files(dir: &Path, sort: bool) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        debug!(dir = %dir.display(), "no such directory");
        return Ok(Vec::new());
    }

    let mut walker = WalkDir::new(dir).min_depth(1).max_depth(1);
    if sort {
        walker = walker.sort_by_file_name();
    }

    let mut files = Vec::new();
    for entry in walker {
        let entry = entry?;
        // follows symlinks; broken links and directories are skipped
        if !entry.path().is_file() {
            continue;
        }
        // shell globs skip dotfiles
        let matches = {
            let name = entry.file_name().to_string_lossy();
            name.ends_with(".csv") && !name.starts_with('.')
        };
        if matches {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

fn read_file<F>(
    file: &Path,
    options: &IngestOptions,
    normalize: &F,
    graph: &mut MentionGraph,
    report: &mut IngestReport,
) -> Result<()>
where
    F: Fn(&str) -> String,
{
    let handle = File::open(file).map_err(|e| NetworkError::io(file, e))?;
    let mut reader = BufReader::new(handle);
    let mut buf = Vec::new();
    let mut line_no = 0;

    loop {
        buf.clear();
        let read = reader
            .read_until(b'\n', &mut buf)
            .map_err(|e| NetworkError::io(file, e))?;
        if read == 0 {
            break;
        }
        line_no += 1;

        let Ok(text) = std::str::from_utf8(&buf) else {
            report.lines_read += 1;
            reject(file, line_no, "not valid UTF-8".to_string(), options, report)?;
            continue;
        };
        let line = text.trim_end_matches(|c: char| c == '\n' || c == '\r');
        if line.trim().is_empty() {
            continue;
        }
        report.lines_read += 1;

        let (raw_source, raw_target) = match split_record(line, &options.separator) {
            Ok(pair) => pair,
            Err(fields) => {
                let reason = format!("expected 2 fields, found {fields}");
                reject(file, line_no, reason, options, report)?;
                continue;
            }
        };

        let source = normalize(raw_source);
        let target = normalize(raw_target);
        if source == SENTINEL || target == SENTINEL {
            report.dropped_unresolved += 1;
            continue;
        }

        if graph.add_edge(&source, &target) {
            report.edges_added += 1;
        }
    }

    Ok(())
}

/// Applies the malformed-record policy to one bad line.
fn reject(
    file: &Path,
    line: usize,
    reason: String,
    options: &IngestOptions,
    report: &mut IngestReport,
) -> Result<()> {
    match options.on_malformed {
        MalformedPolicy::Skip => {
            warn!(file = %file.display(), line, %reason, "skipping malformed record");
            report.malformed_skipped += 1;
            Ok(())
        }
        MalformedPolicy::Abort => Err(NetworkError::MalformedRecord {
            file: file.to_path_buf(),
            line,
            reason,
        }),
    }
}

/// Splits on the literal separator. `Err` carries the field count when it is
/// anything other than two.
fn split_record<'a>(line: &'a str, sep: &str) -> std::result::Result<(&'a str, &'a str), usize> {
    let mut parts = line.split(sep);
    match (parts.next(), parts.next(), parts.next()) {
        (Some(a), Some(b), None) => Ok((a, b)),
        _ => Err(line.split(sep).count()),
    }
}
