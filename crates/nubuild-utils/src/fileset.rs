use std::{
    fs,
    path::{Path, PathBuf},
};

use fast_glob::glob_match;

use crate::error::{FileSystemError, FileSystemResult};

/// Directory names that are never descended into.
const EXCLUDED_DIRS: [&str; 6] = [".git", ".svn", ".hg", ".bzr", "CVS", "SCCS"];

/// File name globs that are never reported as matches.
const EXCLUDED_FILES: [&str; 15] = [
    "*~",
    "#*#",
    ".#*",
    "%*%",
    "._*",
    ".cvsignore",
    "vssver.scc",
    ".DS_Store",
    ".gitattributes",
    ".gitignore",
    ".gitmodules",
    ".hgignore",
    ".hgsub",
    ".hgsubstate",
    ".hgtags",
];

/// A set of Ant-style include patterns evaluated against a base directory.
///
/// Patterns are comma separated and relative to the base directory. `*` and `?` never cross a
/// `/`, `**` matches any number of directories (including none) and a trailing `/` is shorthand
/// for `/**`. Backslashes are treated as `/` so Windows-style patterns work unchanged. Every
/// other character, including `!`, `[`, `]`, `{` and `}`, matches itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileSet {
    includes: Vec<String>,
    globs: Vec<String>,
}

impl FileSet {
    /// Creates a file set from a comma-separated list of include patterns.
    ///
    /// # Examples
    ///
    /// ```
    /// use nubuild_utils::fileset::FileSet;
    ///
    /// let set = FileSet::new("**/*.nuspec, build\\");
    /// assert_eq!(set.includes(), ["**/*.nuspec", "build/**"]);
    /// ```
    pub fn new(includes: &str) -> Self {
        let includes: Vec<String> = includes
            .split(',')
            .map(str::trim)
            .filter(|pattern| !pattern.is_empty())
            .map(normalize_pattern)
            .collect();
        let globs = includes.iter().map(|pattern| escape_literals(pattern)).collect();

        Self {
            includes,
            globs,
        }
    }

    pub fn includes(&self) -> &[String] {
        &self.includes
    }

    pub fn is_empty(&self) -> bool {
        self.includes.is_empty()
    }

    /// Returns true if the `/`-separated relative path matches any include pattern.
    pub fn matches(&self, relative: &str) -> bool {
        self.globs
            .iter()
            .any(|glob| pattern_matches(glob, relative))
    }

    /// Scans `base` recursively and returns the relative paths of all matching files.
    ///
    /// Paths use `/` as separator and are sorted, so the order is stable across platforms and
    /// file systems. Version control metadata and editor backup files are skipped.
    ///
    /// # Errors
    ///
    /// * [`FileSystemError::NotADirectory`] if `base` is not a directory
    /// * [`FileSystemError::Directory`] if a directory cannot be read
    pub fn scan(&self, base: &Path) -> FileSystemResult<Vec<String>> {
        if !base.is_dir() {
            return Err(FileSystemError::NotADirectory {
                path: base.to_path_buf(),
            });
        }

        let mut matches = Vec::new();
        if self.includes.is_empty() {
            return Ok(matches);
        }

        self.scan_dir(base, "", &mut matches)?;
        matches.sort();
        Ok(matches)
    }

    fn scan_dir(&self, dir: &Path, prefix: &str, matches: &mut Vec<String>) -> FileSystemResult<()> {
        let read_error = |source| FileSystemError::Directory {
            path: dir.to_path_buf(),
            action: "scan",
            source,
        };

        for entry in fs::read_dir(dir).map_err(read_error)? {
            let entry = entry.map_err(read_error)?;
            let name = entry.file_name().to_string_lossy().into_owned();
            let relative = if prefix.is_empty() {
                name.clone()
            } else {
                format!("{prefix}/{name}")
            };

            let file_type = entry.file_type().map_err(read_error)?;
            let path: PathBuf = entry.path();

            if file_type.is_dir() {
                if !EXCLUDED_DIRS.contains(&name.as_str()) {
                    self.scan_dir(&path, &relative, matches)?;
                }
                continue;
            }

            // Symlinked directories are not followed to avoid cycles.
            let is_file = file_type.is_file() || (file_type.is_symlink() && path.is_file());
            if is_file && !is_excluded_file(&name) && self.matches(&relative) {
                matches.push(relative);
            }
        }

        Ok(())
    }
}

fn normalize_pattern(pattern: &str) -> String {
    let mut pattern = pattern.replace('\\', "/");
    while pattern.starts_with("./") {
        pattern.drain(..2);
    }
    if pattern.ends_with('/') {
        pattern.push_str("**");
    }
    pattern
}

/// Escapes the glob syntax that has no meaning in include patterns, leaving only `*`, `?`
/// and `**` special.
fn escape_literals(pattern: &str) -> String {
    let mut escaped = String::with_capacity(pattern.len());
    for c in pattern.chars() {
        if matches!(c, '!' | '[' | ']' | '{' | '}') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

fn is_excluded_file(name: &str) -> bool {
    EXCLUDED_FILES
        .iter()
        .any(|pattern| glob_match(pattern, name))
}

/// Matches a single escaped pattern, letting every `**/` also match no directory at all.
fn pattern_matches(pattern: &str, path: &str) -> bool {
    if glob_match(pattern, path) {
        return true;
    }

    let mut search_from = 0;
    while let Some(offset) = pattern[search_from..].find("**/") {
        let at = search_from + offset;
        let collapsed = format!("{}{}", &pattern[..at], &pattern[at + 3..]);
        if pattern_matches(&collapsed, path) {
            return true;
        }
        search_from = at + 3;
    }

    false
}
