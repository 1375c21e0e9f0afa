//! Listing and size aggregation over a [`RemoteStore`].
//!
//! Walks are strictly sequential and depth-first. Every remote call goes
//! through [`Walker::remote`], which checks the cancel token first.

use crate::cancel::CancelToken;
use crate::classify::classify;
use crate::config::{SessionConfig, DEFAULT_MAX_DEPTH};
use crate::errors::{CoreError, Operation, Result};
use crate::helpers::{as_directory, child_path, validate_remote_path};
use crate::models::{EntryKind, EntryMetadata, FileList, ListedEntry, Listing, SizedEntry};
use crate::store::RemoteStore;
use tracing::debug;

/// Traversal engine bound to one store for one invocation.
pub struct Walker<'s> {
    store: &'s dyn RemoteStore,
    cancel: CancelToken,
    max_depth: usize,
}

impl<'s> Walker<'s> {
    pub fn new(store: &'s dyn RemoteStore) -> Self {
        Self {
            store,
            cancel: CancelToken::new(),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    pub fn from_config(store: &'s dyn RemoteStore, config: &SessionConfig) -> Self {
        Self::new(store).with_max_depth(config.max_depth)
    }

    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn cancel_token(&self) -> &CancelToken {
        &self.cancel
    }

    /// Issues one remote call, unless cancellation was requested.
    pub(crate) fn remote<T>(
        &self,
        op: Operation,
        path: &str,
        call: impl FnOnce(&dyn RemoteStore) -> Result<T>,
    ) -> Result<T> {
        self.cancel.check(op, path)?;
        debug!("[{op}] {path}");
        let result = call(self.store);
        if let Err(err) = &result {
            debug!("[{op}] {path}: {err}");
        }
        result
    }

    pub(crate) fn check_depth(&self, path: &str, depth: usize) -> Result<()> {
        if depth > self.max_depth {
            Err(CoreError::DepthExceeded {
                path: path.to_string(),
                limit: self.max_depth,
            })
        } else {
            Ok(())
        }
    }

    pub fn ping(&self) -> Result<()> {
        self.remote(Operation::Ping, "/", |store| store.ping())
    }

    /// Metadata of one path together with its kind.
    pub fn stat(&self, path: &str) -> Result<(EntryMetadata, EntryKind)> {
        validate_remote_path(path)?;
        let metadata = self.remote(Operation::Stat, path, |store| store.stat(path))?;
        let kind = classify(metadata.flags);
        Ok((metadata, kind))
    }

    /// Lists the direct children of `path` with one remote call.
    pub fn list(&self, path: &str) -> Result<Listing> {
        validate_remote_path(path)?;
        let parent = as_directory(path);
        let raw = self.remote(Operation::List, &parent, |store| store.list_directory(&parent))?;
        let entries = raw
            .into_iter()
            .map(|metadata| {
                let kind = classify(metadata.flags);
                let path = child_path(&parent, &metadata.name, kind == EntryKind::Directory);
                ListedEntry {
                    metadata,
                    kind,
                    path,
                }
            })
            .collect();
        Ok(Listing { parent, entries })
    }

    /// Total size in bytes of a file or of a whole directory tree.
    ///
    /// Any failure below the root aborts the aggregation; a partial total is
    /// never returned.
    pub fn size_of(&self, path: &str) -> Result<u64> {
        let (metadata, kind) = self.stat(path)?;
        match kind {
            EntryKind::File => Ok(metadata.size_bytes),
            EntryKind::Directory => self.directory_size(&as_directory(path), 0),
            EntryKind::Unknown => Err(CoreError::Unclassifiable {
                path: path.to_string(),
                flags: metadata.flags.bits(),
            }),
        }
    }

    fn directory_size(&self, path: &str, depth: usize) -> Result<u64> {
        self.check_depth(path, depth)?;
        let listing = self.list(path).map_err(|err| {
            if depth > 0 {
                err.into_descendant_failure()
            } else {
                err
            }
        })?;
        refuse_unknown(&listing)?;

        let mut total: u64 = 0;
        for file in listing.files() {
            total = add_size(total, file.metadata.size_bytes, path)?;
        }
        for directory in listing.directories() {
            let subtotal = self.directory_size(&directory.path, depth + 1)?;
            total = add_size(total, subtotal, path)?;
        }
        debug!("directory size of {path}: {total} B");
        Ok(total)
    }

    /// Aggregate size of every direct child, largest first.
    pub fn dir_content(&self, path: &str) -> Result<Vec<SizedEntry>> {
        let listing = self.list(path)?;
        refuse_unknown(&listing)?;

        let mut sized = Vec::with_capacity(listing.len());
        for entry in &listing.entries {
            let size_bytes = match entry.kind {
                EntryKind::Directory => self.directory_size(&entry.path, 1)?,
                _ => entry.metadata.size_bytes,
            };
            sized.push(SizedEntry {
                path: entry.path.clone(),
                kind: entry.kind,
                size_bytes,
            });
        }
        sized.sort_by(|a, b| b.size_bytes.cmp(&a.size_bytes));
        Ok(sized)
    }

    /// Direct children of `path`, minus those whose path contains `exclude`.
    pub fn file_list(&self, path: &str, exclude: &str) -> Result<FileList> {
        let listing = self.list(path)?;
        let mut list = FileList::default();
        for entry in listing.entries {
            if !exclude.is_empty() && entry.path.contains(exclude) {
                debug!("{} excluded", entry.path);
                continue;
            }
            if entry.kind == EntryKind::Directory {
                list.includes_directories = true;
            }
            list.paths.push(entry.path);
        }
        Ok(list)
    }
}

/// Store-reported sizes are untrusted; a total that does not fit is an error.
fn add_size(total: u64, size: u64, path: &str) -> Result<u64> {
    total
        .checked_add(size)
        .ok_or_else(|| CoreError::remote(Operation::List, path, "size total overflows u64"))
}

/// Fails closed on the first entry that is neither file nor directory.
pub(crate) fn refuse_unknown(listing: &Listing) -> Result<()> {
    match listing.unknown().next() {
        Some(entry) => Err(CoreError::Unclassifiable {
            path: entry.path.clone(),
            flags: entry.metadata.flags.bits(),
        }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorKind;
    use crate::memory::{MemoryStore, StoreCall};
    use crate::models::StatFlags;

    fn scenario() -> MemoryStore {
        MemoryStore::new()
            .with_file("/store/alice/d1/f1", 100)
            .with_file("/store/alice/d1/d2/f2", 200)
    }

    #[test]
    fn list_is_one_round_trip_and_classifies() {
        let store = scenario();
        let listing = Walker::new(&store).list("/store/alice/d1").unwrap();
        assert_eq!(store.calls(), vec![StoreCall::List("/store/alice/d1/".into())]);
        assert_eq!(listing.parent, "/store/alice/d1/");
        let paths: Vec<_> = listing.entries.iter().map(|e| (e.path.as_str(), e.kind)).collect();
        assert_eq!(
            paths,
            vec![
                ("/store/alice/d1/f1", EntryKind::File),
                ("/store/alice/d1/d2/", EntryKind::Directory),
            ]
        );
    }

    #[test]
    fn list_of_missing_directory_is_not_found() {
        let store = scenario();
        let err = Walker::new(&store).list("/store/alice/nope/").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn list_rejects_relative_paths() {
        let store = scenario();
        let err = Walker::new(&store).list("store/alice").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidPath);
        assert!(store.calls().is_empty());
    }

    #[test]
    fn size_of_single_file() {
        let store = scenario();
        assert_eq!(Walker::new(&store).size_of("/store/alice/d1/f1").unwrap(), 100);
    }

    #[test]
    fn size_of_nested_tree() {
        let store = scenario();
        assert_eq!(Walker::new(&store).size_of("/store/alice/d1/").unwrap(), 300);
    }

    #[test]
    fn size_ignores_reported_directory_size() {
        let store = MemoryStore::new()
            .with_file("/store/a/f", 512)
            .with_entry("/store/a/odd", 7, StatFlags::from_bits(StatFlags::IS_DIR));
        assert_eq!(Walker::new(&store).size_of("/store/a/").unwrap(), 512);
    }

    #[test]
    fn descendant_failure_aborts_aggregation() {
        let store = scenario()
            .with_file("/store/alice/d1/d3/f3", 50)
            .fail_on(Operation::List, "/store/alice/d1/d3/", "timeout");
        let err = Walker::new(&store).size_of("/store/alice/d1/").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::RemoteFailure);
        assert_eq!(err.path(), Some("/store/alice/d1/d3/"));
    }

    #[test]
    fn unknown_entries_abort_aggregation() {
        let store = scenario().with_entry("/store/alice/d1/dev", 0, StatFlags::from_bits(StatFlags::OTHER));
        let err = Walker::new(&store).size_of("/store/alice/d1/").unwrap_err();
        assert!(matches!(err, CoreError::Unclassifiable { .. }));
    }

    #[test]
    fn overflowing_total_is_an_error() {
        let store = MemoryStore::new()
            .with_file("/store/a/f1", u64::MAX)
            .with_file("/store/a/f2", 1);
        let err = Walker::new(&store).size_of("/store/a/").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::RemoteFailure);
        assert_eq!(err.path(), Some("/store/a/"));

        let nested = MemoryStore::new()
            .with_file("/store/a/f1", u64::MAX)
            .with_file("/store/a/sub/f2", 1);
        let err = Walker::new(&nested).size_of("/store/a/").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::RemoteFailure);
    }

    #[test]
    fn depth_guard_stops_deep_walks() {
        let store = MemoryStore::new().with_file("/store/a/b/c/f", 1);
        let walker = Walker::new(&store).with_max_depth(1);
        let err = walker.size_of("/store/a/").unwrap_err();
        assert!(matches!(err, CoreError::DepthExceeded { limit: 1, .. }));
        assert_eq!(Walker::new(&store).with_max_depth(2).size_of("/store/a/").unwrap(), 1);
    }

    #[test]
    fn cancelled_walk_issues_no_calls() {
        let store = scenario();
        let token = CancelToken::new();
        token.cancel();
        let err = Walker::new(&store)
            .with_cancel(token)
            .size_of("/store/alice/d1/")
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Cancelled);
        assert!(store.calls().is_empty());
    }

    #[test]
    fn dir_content_sorts_largest_first() {
        let store = scenario().with_file("/store/alice/d1/big", 1_000);
        let content = Walker::new(&store).dir_content("/store/alice/d1/").unwrap();
        let sizes: Vec<_> = content.iter().map(|e| (e.path.as_str(), e.size_bytes)).collect();
        assert_eq!(
            sizes,
            vec![
                ("/store/alice/d1/big", 1_000),
                ("/store/alice/d1/d2/", 200),
                ("/store/alice/d1/f1", 100),
            ]
        );
    }

    #[test]
    fn file_list_excludes_and_flags_directories() {
        let store = scenario().with_file("/store/alice/d1/run.log", 5);
        let walker = Walker::new(&store);
        let list = walker.file_list("/store/alice/d1/", ".log").unwrap();
        assert_eq!(list.paths, vec!["/store/alice/d1/f1", "/store/alice/d1/d2/"]);
        assert!(list.includes_directories);

        let only_files = walker.file_list("/store/alice/d1/d2/", "").unwrap();
        assert_eq!(only_files.paths, vec!["/store/alice/d1/d2/f2"]);
        assert!(!only_files.includes_directories);
    }
}
