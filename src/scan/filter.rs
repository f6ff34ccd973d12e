use super::walker::FileRecord;
use std::path::{Path, PathBuf};

/// Extensions that usually mark transient or clutter files
pub const DEFAULT_HINDRANCE_EXTENSIONS: &[&str] = &[".bak", ".log", ".tmp", ".swp", ".old", ".part"];

/// A file whose name carries a hindrance extension
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HindranceMatch {
    pub path: PathBuf,
    pub size_bytes: u64,
}

/// Case-sensitive suffix matcher over file names
#[derive(Debug, Clone)]
pub struct HindranceFilter {
    extensions: Vec<String>,
}

impl Default for HindranceFilter {
    fn default() -> Self {
        HindranceFilter::new(DEFAULT_HINDRANCE_EXTENSIONS.iter().copied())
    }
}

impl HindranceFilter {
    pub fn new<I, S>(extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        HindranceFilter {
            extensions: extensions.into_iter().map(Into::into).collect(),
        }
    }

    pub fn extensions(&self) -> &[String] {
        &self.extensions
    }

    pub fn matches(&self, path: &Path) -> bool {
        let Some(name) = path.file_name() else {
            return false;
        };
        let name = name.to_string_lossy();
        self.extensions.iter().any(|ext| name.ends_with(ext.as_str()))
    }

    pub fn check(&self, record: &FileRecord) -> Option<HindranceMatch> {
        self.matches(&record.path).then(|| HindranceMatch {
            path: record.path.clone(),
            size_bytes: record.size_bytes,
        })
    }
}

/// Keep the records whose file name ends with a hindrance extension,
/// in traversal order
pub fn filter_hindrances<I>(records: I, filter: &HindranceFilter) -> Vec<HindranceMatch>
where
    I: IntoIterator<Item = FileRecord>,
{
    records
        .into_iter()
        .filter_map(|record| filter.check(&record))
        .collect()
}
