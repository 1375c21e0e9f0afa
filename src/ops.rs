//! Single-call mutations: move, mkdir and copies.
//!
//! Each one validates its remote paths and, when it writes to the namespace,
//! passes the ownership guard before the store is contacted.

use crate::errors::{Operation, Result};
use crate::helpers::validate_remote_path;
use crate::ownership::require_ownership;
use crate::walker::Walker;
use std::path::Path;
use tracing::info;

impl<'s> Walker<'s> {
    /// Moves or renames `source` to the explicit destination `dest`.
    pub fn move_path(&self, source: &str, dest: &str, owner: &str) -> Result<()> {
        validate_remote_path(source)?;
        validate_remote_path(dest)?;
        require_ownership(source, owner)?;
        require_ownership(dest, owner)?;
        self.remote(Operation::Move, source, |store| store.rename(source, dest))?;
        info!("mv: {source} to {dest}");
        Ok(())
    }

    /// Creates `path` and every missing ancestor.
    pub fn make_directory_tree(&self, path: &str, owner: &str) -> Result<()> {
        validate_remote_path(path)?;
        require_ownership(path, owner)?;
        self.remote(Operation::MakeDirectory, path, |store| {
            store.make_directory_tree(path)
        })?;
        info!("{path} created.");
        Ok(())
    }

    /// Uploads a local file to `remote`, which has to name the target file.
    pub fn copy_in(&self, local: &Path, remote: &str, owner: &str) -> Result<()> {
        validate_remote_path(remote)?;
        require_ownership(remote, owner)?;
        self.remote(Operation::CopyIn, remote, |store| store.copy_in(local, remote))?;
        info!("File {} copied to {remote}.", local.display());
        Ok(())
    }

    /// Downloads `remote` to `local`, which has to name the target file.
    pub fn copy_out(&self, remote: &str, local: &Path) -> Result<()> {
        validate_remote_path(remote)?;
        self.remote(Operation::CopyOut, remote, |store| store.copy_out(remote, local))?;
        info!("File {remote} copied to {}.", local.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorKind;
    use crate::memory::{MemoryStore, StoreCall};
    use crate::store::RemoteStore;

    #[test]
    fn move_needs_ownership_of_both_ends() {
        let store = MemoryStore::new()
            .with_file("/store/alice/f", 1)
            .with_dir("/store/bob");
        let walker = Walker::new(&store);
        let err = walker
            .move_path("/store/alice/f", "/store/bob/f", "alice")
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::PermissionDenied);
        assert!(store.calls().is_empty());

        walker
            .move_path("/store/alice/f", "/store/alice/g", "alice")
            .unwrap();
        assert!(store.exists("/store/alice/g"));
    }

    #[test]
    fn move_never_overwrites() {
        let store = MemoryStore::new()
            .with_file("/store/alice/f", 1)
            .with_file("/store/alice/g", 2);
        let err = Walker::new(&store)
            .move_path("/store/alice/f", "/store/alice/g", "alice")
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::RemoteFailure);
        assert!(store.exists("/store/alice/f"));
    }

    #[test]
    fn mkdir_creates_full_tree() {
        let store = MemoryStore::new();
        Walker::new(&store)
            .make_directory_tree("/store/alice/a/b/c", "alice")
            .unwrap();
        assert!(store.exists("/store/alice/a/b"));
        assert_eq!(
            store.calls(),
            vec![StoreCall::MakeDirectory("/store/alice/a/b/c".into())]
        );
    }

    #[test]
    fn copies_go_through_the_store() {
        let dir = tempfile::tempdir().unwrap();
        let local = dir.path().join("in.txt");
        std::fs::write(&local, b"0123456789").unwrap();
        let store = MemoryStore::new().with_dir("/store/alice");
        let walker = Walker::new(&store);

        walker.copy_in(&local, "/store/alice/in.txt", "alice").unwrap();
        assert_eq!(store.stat("/store/alice/in.txt").unwrap().size_bytes, 10);

        let out = dir.path().join("out.txt");
        walker.copy_out("/store/alice/in.txt", &out).unwrap();
        assert_eq!(std::fs::read(&out).unwrap(), b"0123456789");
    }

    #[test]
    fn copy_in_outside_own_area_is_denied() {
        let store = MemoryStore::new().with_dir("/store/bob");
        let err = Walker::new(&store)
            .copy_in(Path::new("/tmp/whatever"), "/store/bob/x", "alice")
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::PermissionDenied);
        assert!(store.calls().is_empty());
    }
}
