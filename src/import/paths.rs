use chrono::Utc;
use std::collections::BTreeSet;
use std::fmt;

use crate::import::types::FileType;

/// Run-scoped namespace tag of the form `import-<fileType>-<YYYYMMDDHHMMSS>`.
///
/// Generated once per run; every folder the run creates lives under the tag's
/// root path, so repeated imports never collide.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportTag(String);

impl ImportTag {
    pub fn generate(file_type: FileType) -> Self {
        ImportTag(format!(
            "import-{}-{}",
            file_type.extension(),
            Utc::now().format("%Y%m%d%H%M%S")
        ))
    }

    /// Wrap an already-formatted tag, for deterministic runs
    pub fn from_raw(tag: impl Into<String>) -> Self {
        ImportTag(tag.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Root folder path for this run
    pub fn root_path(&self) -> String {
        format!("/{}", self.0)
    }

    /// Rewrite a raw decoder path into this run's namespace.
    ///
    /// Empty or `/` maps to the run root; the legacy `/Root/` segment is
    /// replaced with the tag; anything else is prefixed with the tag. No
    /// slash normalization happens beyond this.
    pub fn consolidate(&self, raw_path: &str) -> String {
        if raw_path.is_empty() || raw_path == "/" {
            return self.root_path();
        }
        if raw_path.contains("/Root/") {
            return raw_path.replacen("/Root/", &format!("/{}/", self.0), 1);
        }
        format!("/{}/{}", self.0, raw_path)
    }
}

impl fmt::Display for ImportTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Consolidate raw folder paths into the ordered set the run will create.
///
/// The run root is always present exactly once. A `BTreeSet` gives
/// lexicographic order, which puts every parent before its children: a child
/// path textually extends its parent with `/segment`.
pub fn consolidate_paths(raw_paths: &[String], tag: &ImportTag) -> Vec<String> {
    let mut paths = BTreeSet::new();
    paths.insert(tag.root_path());
    for raw in raw_paths {
        paths.insert(tag.consolidate(raw));
    }
    paths.into_iter().collect()
}

/// Split a consolidated path into (parent path, leaf name).
///
/// The parent is empty for the run root itself.
pub fn split_path(path: &str) -> (&str, &str) {
    match path.rfind('/') {
        Some(idx) => (&path[..idx], &path[idx + 1..]),
        None => ("", path),
    }
}
