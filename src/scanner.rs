use anyhow::{Context, Result};
use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use log::{debug, warn};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Pattern used when no explicit patterns are configured
pub const DEFAULT_PATTERN: &str = "**/*.rs";

/// File scanner for traversing project directories.
///
/// The `FileScanner` recursively walks a project directory and keeps the files whose path,
/// relative to the root, matches at least one of the configured glob patterns. It always
/// skips the `target` directory and hidden directories (those starting with `.`).
///
/// # Example
///
/// ```no_run
/// use openapi_synth::scanner::FileScanner;
/// use std::path::PathBuf;
///
/// let scanner = FileScanner::new(PathBuf::from("./my-project"))
///     .with_patterns(&["src/routes/**/*.rs".to_string()])
///     .unwrap();
/// let result = scanner.scan().unwrap();
/// println!("Found {} files", result.files.len());
/// ```
pub struct FileScanner {
    root_path: PathBuf,
    patterns: GlobSet,
}

/// Result of directory scanning operation.
pub struct ScanResult {
    /// Matching files, in walk order
    pub files: Vec<PathBuf>,
    /// Warning messages for paths that could not be accessed
    pub warnings: Vec<String>,
}

/// Compiles glob patterns into a single matcher.
///
/// `*` and `?` stay within one path segment; only `**` crosses directories.
pub fn build_glob_set(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = GlobBuilder::new(pattern)
            .literal_separator(true)
            .build()
            .with_context(|| format!("Invalid glob pattern: {}", pattern))?;
        builder.add(glob);
    }
    builder.build().context("Failed to compile glob patterns")
}

impl FileScanner {
    /// Creates a scanner that selects every `.rs` file below `root_path`
    pub fn new(root_path: PathBuf) -> Self {
        let patterns = build_glob_set(&[DEFAULT_PATTERN.to_string()])
            .unwrap_or_else(|_| GlobSet::empty());
        Self {
            root_path,
            patterns,
        }
    }

    /// Replaces the file selection patterns. An empty list keeps the default.
    pub fn with_patterns(mut self, patterns: &[String]) -> Result<Self> {
        if !patterns.is_empty() {
            self.patterns = build_glob_set(patterns)?;
        }
        Ok(self)
    }

    fn matches(&self, path: &Path) -> bool {
        let relative = path.strip_prefix(&self.root_path).unwrap_or(path);
        self.patterns.is_match(relative)
    }

    /// Scans the directory tree and collects all matching files.
    ///
    /// Inaccessible entries are logged and recorded as warnings; scanning continues.
    ///
    /// # Errors
    ///
    /// Returns an error if the root directory does not exist.
    pub fn scan(&self) -> Result<ScanResult> {
        if !self.root_path.exists() {
            anyhow::bail!("Scan root does not exist: {}", self.root_path.display());
        }

        let mut files = Vec::new();
        let mut warnings = Vec::new();

        for entry in WalkDir::new(&self.root_path)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| {
                if e.path() == self.root_path {
                    return true;
                }

                let file_name = e.file_name().to_string_lossy();
                !file_name.starts_with('.') && file_name != "target"
            })
        {
            match entry {
                Ok(entry) => {
                    let path = entry.path();
                    if entry.file_type().is_file() && self.matches(path) {
                        files.push(path.to_path_buf());
                    }
                }
                Err(e) => {
                    let warning = format!("Failed to access path: {}", e);
                    warn!("{}", warning);
                    warnings.push(warning);
                }
            }
        }

        debug!(
            "Scanned {}: {} matching files",
            self.root_path.display(),
            files.len()
        );

        Ok(ScanResult { files, warnings })
    }
}
