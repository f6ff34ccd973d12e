//! Streaming top-K selection of the largest files

use super::walker::FileRecord;
use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::path::PathBuf;

const BYTES_PER_MB: u64 = 1024 * 1024;

/// One of the K largest files
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankedEntry {
    pub path: PathBuf,
    pub size_bytes: u64,
}

impl RankedEntry {
    /// Size in whole megabytes, rounded down
    pub fn size_mb(&self) -> u64 {
        self.size_bytes / BYTES_PER_MB
    }
}

/// Heap slot ordered by eviction priority: the greatest slot is the smallest
/// file, and among equal sizes the one seen last.
#[derive(Debug)]
struct Slot {
    size_bytes: u64,
    seq: u64,
    path: PathBuf,
}

impl Ord for Slot {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .size_bytes
            .cmp(&self.size_bytes)
            .then(self.seq.cmp(&other.seq))
    }
}

impl PartialOrd for Slot {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Slot {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Slot {}

/// Keeps the `k` largest records pushed into it, in O(log k) per record
#[derive(Debug)]
pub struct TopK {
    k: usize,
    heap: BinaryHeap<Slot>,
    seen: u64,
}

impl TopK {
    pub fn new(k: usize) -> Self {
        TopK {
            k,
            heap: BinaryHeap::with_capacity(k),
            seen: 0,
        }
    }

    pub fn push(&mut self, record: &FileRecord) {
        let seq = self.seen;
        self.seen += 1;

        if self.k == 0 {
            return;
        }

        if self.heap.len() < self.k {
            self.heap.push(Slot {
                size_bytes: record.size_bytes,
                seq,
                path: record.path.clone(),
            });
            return;
        }

        // Ties keep the earlier entry
        if let Some(mut smallest) = self.heap.peek_mut()
            && record.size_bytes > smallest.size_bytes
        {
            *smallest = Slot {
                size_bytes: record.size_bytes,
                seq,
                path: record.path.clone(),
            };
        }
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Drain into descending size order, ties in traversal order
    pub fn into_ranked(self) -> Vec<RankedEntry> {
        self.heap
            .into_sorted_vec()
            .into_iter()
            .map(|slot| RankedEntry {
                path: slot.path,
                size_bytes: slot.size_bytes,
            })
            .collect()
    }
}

/// Select the `k` largest records of a stream
pub fn rank_largest<I>(records: I, k: usize) -> Vec<RankedEntry>
where
    I: IntoIterator<Item = FileRecord>,
{
    let mut top = TopK::new(k);
    for record in records {
        top.push(&record);
    }
    top.into_ranked()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn record(name: &str, size_bytes: u64) -> FileRecord {
        FileRecord {
            path: PathBuf::from(format!("/data/{name}")),
            size_bytes,
        }
    }

    #[test]
    fn test_largest_three() {
        let mb = BYTES_PER_MB;
        let records = vec![
            record("a", 10 * mb),
            record("b", 3 * mb),
            record("c", 7 * mb),
            record("d", mb),
            record("e", 20 * mb),
        ];

        let ranked = rank_largest(records, 3);
        let sizes: Vec<u64> = ranked.iter().map(RankedEntry::size_mb).collect();
        assert_eq!(sizes, vec![20, 10, 7]);
        assert_eq!(ranked[0].path, PathBuf::from("/data/e"));
    }

    #[test]
    fn test_ties_keep_first_seen() {
        let records = vec![record("first", 5), record("second", 5), record("third", 5)];
        let ranked = rank_largest(records, 2);
        let names: Vec<_> = ranked.iter().map(|e| e.path.clone()).collect();
        assert_eq!(
            names,
            vec![PathBuf::from("/data/first"), PathBuf::from("/data/second")]
        );
    }

    #[test]
    fn test_k_zero() {
        assert!(rank_largest(vec![record("a", 1)], 0).is_empty());
    }

    #[test]
    fn test_fewer_records_than_k() {
        let ranked = rank_largest(vec![record("a", 1), record("b", 2)], 5);
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].size_bytes, 2);
    }

    #[test]
    fn test_size_mb_floors() {
        let entry = RankedEntry {
            path: PathBuf::from("/x"),
            size_bytes: 2 * BYTES_PER_MB - 1,
        };
        assert_eq!(entry.size_mb(), 1);
        assert_eq!(entry.size_bytes, 2 * BYTES_PER_MB - 1);
    }

    proptest! {
        #[test]
        fn prop_matches_sort_all(sizes in prop::collection::vec(0u64..1_000, 0..200), k in 0usize..20) {
            let records: Vec<_> = sizes
                .iter()
                .enumerate()
                .map(|(i, &s)| record(&i.to_string(), s))
                .collect();
            let ranked = rank_largest(records, k);

            prop_assert_eq!(ranked.len(), k.min(sizes.len()));
            prop_assert!(ranked.windows(2).all(|w| w[0].size_bytes >= w[1].size_bytes));

            let mut expected = sizes.clone();
            expected.sort_unstable_by(|a, b| b.cmp(a));
            expected.truncate(k);
            let got: Vec<u64> = ranked.iter().map(|e| e.size_bytes).collect();
            prop_assert_eq!(got, expected);
        }
    }
}
