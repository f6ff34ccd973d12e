//! Directory tree analysis: largest files and clutter by extension
//!
//! [`analyze`] walks the tree once and feeds every record to both the
//! [`TopK`] ranker and the [`HindranceFilter`]. The two consumers never see
//! each other's state.

pub mod filter;
pub mod rank;
pub mod walker;

pub use filter::{DEFAULT_HINDRANCE_EXTENSIONS, HindranceFilter, HindranceMatch, filter_hindrances};
pub use rank::{RankedEntry, TopK, rank_largest};
pub use walker::{FileRecord, Scan, ScanIssue, Scanner};

use std::path::PathBuf;

/// Everything learned from one walk
#[derive(Debug, Clone)]
pub struct ScanReport {
    pub root: PathBuf,
    pub largest: Vec<RankedEntry>,
    pub hindrances: Vec<HindranceMatch>,
    pub files_seen: u64,
    pub bytes_seen: u64,
    pub issues: Vec<ScanIssue>,
}

impl ScanReport {
    /// Bytes taken up by hindrance files
    pub fn hindrance_bytes(&self) -> u64 {
        self.hindrances.iter().map(|m| m.size_bytes).sum()
    }
}

pub fn analyze(scanner: &Scanner, top_n: usize, filter: &HindranceFilter) -> ScanReport {
    let mut top = TopK::new(top_n);
    let mut hindrances = Vec::new();
    let mut files_seen = 0u64;
    let mut bytes_seen = 0u64;

    let mut scan = scanner.scan();
    for record in scan.by_ref() {
        files_seen += 1;
        bytes_seen = bytes_seen.saturating_add(record.size_bytes);
        top.push(&record);
        if let Some(hit) = filter.check(&record) {
            hindrances.push(hit);
        }
    }

    let issues = scan.into_issues();
    if !issues.is_empty() {
        log::info!(
            "skipped {} unreadable entries under {}",
            issues.len(),
            scanner.root().display()
        );
    }

    ScanReport {
        root: scanner.root().to_path_buf(),
        largest: top.into_ranked(),
        hindrances,
        files_seen,
        bytes_seen,
        issues,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    const MB: usize = 1024 * 1024;

    fn write(dir: &Path, rel: &str, len: usize) {
        let path = dir.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, vec![0u8; len]).unwrap();
    }

    #[test]
    fn test_fused_walk_matches_separate_consumers() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "movies/a.mkv", 10 * MB);
        write(dir.path(), "b.log", 3 * MB);
        write(dir.path(), "c.iso", 7 * MB);
        write(dir.path(), "nested/d.bak", MB);
        write(dir.path(), "e.tar", 20 * MB);
        write(dir.path(), "notes.txt", 12);

        let scanner = Scanner::new(dir.path()).unwrap();
        let filter = HindranceFilter::default();
        let report = analyze(&scanner, 3, &filter);

        let sizes: Vec<u64> = report.largest.iter().map(RankedEntry::size_mb).collect();
        assert_eq!(sizes, vec![20, 10, 7]);
        assert_eq!(report.largest, rank_largest(scanner.scan(), 3));
        assert_eq!(report.hindrances, filter_hindrances(scanner.scan(), &filter));

        assert_eq!(report.files_seen, 6);
        assert_eq!(report.bytes_seen, (41 * MB + 12) as u64);
        assert_eq!(report.hindrance_bytes(), (4 * MB) as u64);
        assert!(report.issues.is_empty());
    }

    #[test]
    fn test_hindrance_scenario() {
        let dir = TempDir::new().unwrap();
        for name in ["a.log", "b.txt", "c.bak", "d.tmp"] {
            write(dir.path(), name, 1);
        }
        let scanner = Scanner::new(dir.path()).unwrap();
        let report = analyze(&scanner, 5, &HindranceFilter::default());

        let names: Vec<_> = report
            .hindrances
            .iter()
            .map(|m| m.path.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.log", "c.bak", "d.tmp"]);
    }

    #[test]
    fn test_empty_tree() {
        let dir = TempDir::new().unwrap();
        let scanner = Scanner::new(dir.path()).unwrap();
        let report = analyze(&scanner, 5, &HindranceFilter::default());
        assert!(report.largest.is_empty());
        assert!(report.hindrances.is_empty());
        assert_eq!(report.files_seen, 0);
    }
}
