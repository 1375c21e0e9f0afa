//! In-memory store with a call journal.
//!
//! Useful wherever a deterministic namespace is needed: presentation layers
//! rehearsing a flow, and the engine's own tests, which assert on the exact
//! sequence of remote calls.

use crate::errors::{CoreError, Operation};
use crate::models::{EntryMetadata, StatFlags};
use crate::store::RemoteStore;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// One remote round-trip as observed by [`MemoryStore`].
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum StoreCall {
    Ping,
    Stat(String),
    List(String),
    DeleteFile(String),
    RemoveDirectory(String),
    Move(String, String),
    MakeDirectory(String),
    CopyIn(PathBuf, String),
    CopyOut(String, PathBuf),
}

impl StoreCall {
    /// True for calls that change the namespace.
    pub fn is_mutation(&self) -> bool {
        matches!(
            self,
            Self::DeleteFile(_)
                | Self::RemoveDirectory(_)
                | Self::Move(..)
                | Self::MakeDirectory(_)
                | Self::CopyIn(..)
        )
    }
}

#[derive(Debug, Clone)]
struct Node {
    flags: StatFlags,
    size_bytes: u64,
    mod_time: String,
    data: Option<Vec<u8>>,
    /// Child names in insertion order, which is the listing order.
    children: Vec<String>,
}

impl Node {
    fn directory() -> Self {
        Self {
            flags: StatFlags::default()
                .with(StatFlags::IS_DIR)
                .with(StatFlags::IS_READABLE)
                .with(StatFlags::IS_WRITABLE),
            size_bytes: 512,
            mod_time: String::new(),
            data: None,
            children: Vec::new(),
        }
    }

    fn is_directory(&self) -> bool {
        self.flags.contains(StatFlags::IS_DIR)
    }
}

#[derive(Debug, Default)]
struct State {
    nodes: BTreeMap<String, Node>,
    calls: Vec<StoreCall>,
    failures: Vec<(Operation, String, String)>,
}

#[derive(Debug)]
pub struct MemoryStore {
    state: Mutex<State>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Canonical node key: leading separator, no trailing one, root is "".
fn key(path: &str) -> String {
    let trimmed = path.trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("/{trimmed}")
    }
}

fn split(key: &str) -> (String, String) {
    match key.rsplit_once('/') {
        Some((parent, name)) => (parent.to_string(), name.to_string()),
        None => (String::new(), key.to_string()),
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        let mut state = State::default();
        state.nodes.insert(String::new(), Node::directory());
        Self {
            state: Mutex::new(state),
        }
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Adds a directory and any missing ancestors.
    pub fn with_dir(self, path: &str) -> Self {
        self.lock().ensure_directory(&key(path));
        self
    }

    /// Adds a plain readable file of `size_bytes`.
    pub fn with_file(self, path: &str, size_bytes: u64) -> Self {
        let flags = StatFlags::default()
            .with(StatFlags::IS_READABLE)
            .with(StatFlags::IS_WRITABLE);
        self.with_entry(path, size_bytes, flags)
    }

    /// Adds an entry with explicit flags, creating missing ancestors.
    pub fn with_entry(self, path: &str, size_bytes: u64, flags: StatFlags) -> Self {
        {
            let mut state = self.lock();
            let node = Node {
                flags,
                size_bytes,
                mod_time: "2024-01-01 00:00:00".to_string(),
                data: None,
                children: Vec::new(),
            };
            state.insert(&key(path), node);
        }
        self
    }

    /// Makes every later `op` on `path` fail with a remote failure.
    pub fn fail_on(self, op: Operation, path: &str, message: &str) -> Self {
        self.lock()
            .failures
            .push((op, key(path), message.to_string()));
        self
    }

    /// Remote calls observed so far, in order.
    pub fn calls(&self) -> Vec<StoreCall> {
        self.lock().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.lock().calls.clear();
    }

    pub fn clear_failures(&self) {
        self.lock().failures.clear();
    }

    pub fn exists(&self, path: &str) -> bool {
        self.lock().nodes.contains_key(&key(path))
    }

    fn begin(&self, call: StoreCall, op: Operation, path: &str) -> crate::Result<MutexGuard<'_, State>> {
        let mut state = self.lock();
        state.calls.push(call);
        let wanted = key(path);
        if let Some((_, _, message)) = state
            .failures
            .iter()
            .find(|(failing_op, failing_path, _)| *failing_op == op && *failing_path == wanted)
        {
            return Err(CoreError::remote(op, path, message.clone()));
        }
        Ok(state)
    }
}

impl State {
    fn ensure_directory(&mut self, key: &str) {
        if self.nodes.contains_key(key) {
            return;
        }
        self.insert(key, Node::directory());
    }

    fn insert(&mut self, key: &str, node: Node) {
        let (parent, name) = split(key);
        self.ensure_directory(&parent);
        if let Some(parent_node) = self.nodes.get_mut(&parent) {
            if !parent_node.children.contains(&name) {
                parent_node.children.push(name);
            }
        }
        self.nodes.insert(key.to_string(), node);
    }

    fn remove(&mut self, key: &str) {
        let (parent, name) = split(key);
        self.nodes.remove(key);
        if let Some(parent_node) = self.nodes.get_mut(&parent) {
            parent_node.children.retain(|child| *child != name);
        }
    }

    fn node(&self, op: Operation, path: &str) -> crate::Result<&Node> {
        self.nodes
            .get(&key(path))
            .ok_or_else(|| CoreError::not_found(op, path))
    }

    fn metadata(&self, key: &str, node: &Node) -> EntryMetadata {
        let (_, name) = split(key);
        EntryMetadata::new(name, node.size_bytes, node.flags).with_mod_time(node.mod_time.clone())
    }

    fn refuse_existing(&self, op: Operation, path: &str) -> crate::Result<()> {
        if self.nodes.contains_key(&key(path)) {
            Err(CoreError::remote(op, path, "destination exists, refusing to overwrite"))
        } else {
            Ok(())
        }
    }

    fn require_parent(&self, op: Operation, path: &str) -> crate::Result<()> {
        let (parent, _) = split(&key(path));
        match self.nodes.get(&parent) {
            Some(node) if node.is_directory() => Ok(()),
            _ => Err(CoreError::not_found(op, path)),
        }
    }
}

impl RemoteStore for MemoryStore {
    fn ping(&self) -> crate::Result<()> {
        self.begin(StoreCall::Ping, Operation::Ping, "/")?;
        Ok(())
    }

    fn stat(&self, path: &str) -> crate::Result<EntryMetadata> {
        let state = self.begin(StoreCall::Stat(path.to_string()), Operation::Stat, path)?;
        let node = state.node(Operation::Stat, path)?;
        Ok(state.metadata(&key(path), node))
    }

    fn list_directory(&self, path: &str) -> crate::Result<Vec<EntryMetadata>> {
        let state = self.begin(StoreCall::List(path.to_string()), Operation::List, path)?;
        let node = state.node(Operation::List, path)?;
        if !node.is_directory() {
            return Err(CoreError::remote(Operation::List, path, "not a directory"));
        }
        let parent = key(path);
        Ok(node
            .children
            .iter()
            .filter_map(|name| {
                let child = format!("{parent}/{name}");
                state
                    .nodes
                    .get(&child)
                    .map(|node| state.metadata(&child, node))
            })
            .collect())
    }

    fn delete_file(&self, path: &str) -> crate::Result<()> {
        let mut state = self.begin(
            StoreCall::DeleteFile(path.to_string()),
            Operation::DeleteFile,
            path,
        )?;
        if state.node(Operation::DeleteFile, path)?.is_directory() {
            return Err(CoreError::remote(Operation::DeleteFile, path, "is a directory"));
        }
        state.remove(&key(path));
        Ok(())
    }

    fn remove_empty_directory(&self, path: &str) -> crate::Result<()> {
        let mut state = self.begin(
            StoreCall::RemoveDirectory(path.to_string()),
            Operation::RemoveDirectory,
            path,
        )?;
        let node = state.node(Operation::RemoveDirectory, path)?;
        if !node.is_directory() {
            return Err(CoreError::remote(Operation::RemoveDirectory, path, "not a directory"));
        }
        if !node.children.is_empty() {
            return Err(CoreError::remote(
                Operation::RemoveDirectory,
                path,
                "directory not empty",
            ));
        }
        state.remove(&key(path));
        Ok(())
    }

    fn rename(&self, source: &str, dest: &str) -> crate::Result<()> {
        let mut state = self.begin(
            StoreCall::Move(source.to_string(), dest.to_string()),
            Operation::Move,
            source,
        )?;
        state.node(Operation::Move, source)?;
        state.refuse_existing(Operation::Move, dest)?;
        state.require_parent(Operation::Move, dest)?;

        let from = key(source);
        let to = key(dest);
        let moved: Vec<(String, Node)> = state
            .nodes
            .iter()
            .filter(|(path, _)| **path == from || path.starts_with(&format!("{from}/")))
            .map(|(path, node)| (path.clone(), node.clone()))
            .collect();
        state.remove(&from);
        for (path, node) in moved {
            state.nodes.remove(&path);
            let renamed = format!("{to}{}", &path[from.len()..]);
            if renamed == to {
                state.insert(&renamed, node);
            } else {
                state.nodes.insert(renamed, node);
            }
        }
        Ok(())
    }

    fn make_directory_tree(&self, path: &str) -> crate::Result<()> {
        let mut state = self.begin(
            StoreCall::MakeDirectory(path.to_string()),
            Operation::MakeDirectory,
            path,
        )?;
        let wanted = key(path);
        if let Some(node) = state.nodes.get(&wanted) {
            if !node.is_directory() {
                return Err(CoreError::remote(
                    Operation::MakeDirectory,
                    path,
                    "a file with that name exists",
                ));
            }
        }
        state.ensure_directory(&wanted);
        Ok(())
    }

    fn copy_in(&self, local: &Path, remote: &str) -> crate::Result<()> {
        let mut state = self.begin(
            StoreCall::CopyIn(local.to_path_buf(), remote.to_string()),
            Operation::CopyIn,
            remote,
        )?;
        state.refuse_existing(Operation::CopyIn, remote)?;
        state.require_parent(Operation::CopyIn, remote)?;
        let data = fs::read(local).map_err(|err| {
            CoreError::remote(Operation::CopyIn, local.display().to_string(), err.to_string())
        })?;
        let node = Node {
            flags: StatFlags::default()
                .with(StatFlags::IS_READABLE)
                .with(StatFlags::IS_WRITABLE),
            size_bytes: data.len() as u64,
            mod_time: String::new(),
            data: Some(data),
            children: Vec::new(),
        };
        state.insert(&key(remote), node);
        Ok(())
    }

    fn copy_out(&self, remote: &str, local: &Path) -> crate::Result<()> {
        let state = self.begin(
            StoreCall::CopyOut(remote.to_string(), local.to_path_buf()),
            Operation::CopyOut,
            remote,
        )?;
        let node = state.node(Operation::CopyOut, remote)?;
        if node.is_directory() {
            return Err(CoreError::remote(Operation::CopyOut, remote, "source is a directory"));
        }
        if local.exists() {
            return Err(CoreError::remote(
                Operation::CopyOut,
                local.display().to_string(),
                "destination exists, refusing to overwrite",
            ));
        }
        let data = node
            .data
            .clone()
            .unwrap_or_else(|| vec![0u8; node.size_bytes as usize]);
        fs::write(local, data).map_err(|err| {
            CoreError::remote(Operation::CopyOut, local.display().to_string(), err.to_string())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorKind;

    #[test]
    fn listing_keeps_insertion_order() {
        let store = MemoryStore::new()
            .with_file("/store/a/zeta", 1)
            .with_dir("/store/a/alpha")
            .with_file("/store/a/mid", 2);
        let names: Vec<_> = store
            .list_directory("/store/a/")
            .unwrap()
            .into_iter()
            .map(|entry| entry.name)
            .collect();
        assert_eq!(names, vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn records_every_call() {
        let store = MemoryStore::new().with_file("/store/a/f", 1);
        store.stat("/store/a/f").unwrap();
        store.delete_file("/store/a/f").unwrap();
        assert_eq!(
            store.calls(),
            vec![
                StoreCall::Stat("/store/a/f".into()),
                StoreCall::DeleteFile("/store/a/f".into()),
            ]
        );
        assert!(!store.exists("/store/a/f"));
    }

    #[test]
    fn injected_failures_surface_as_remote_failures() {
        let store = MemoryStore::new()
            .with_dir("/store/a/")
            .fail_on(Operation::List, "/store/a/", "timeout");
        let err = store.list_directory("/store/a/").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::RemoteFailure);
        store.clear_failures();
        assert!(store.list_directory("/store/a/").is_ok());
    }

    #[test]
    fn rename_moves_whole_subtree() {
        let store = MemoryStore::new()
            .with_file("/store/a/d/f", 3)
            .with_dir("/store/b");
        store.rename("/store/a/d", "/store/b/d").unwrap();
        assert!(!store.exists("/store/a/d"));
        assert!(store.exists("/store/b/d/f"));
        assert_eq!(store.list_directory("/store/b/").unwrap().len(), 1);
        assert!(store.list_directory("/store/a/").unwrap().is_empty());
    }

    #[test]
    fn non_empty_directory_is_kept() {
        let store = MemoryStore::new().with_file("/store/a/f", 3);
        let err = store.remove_empty_directory("/store/a/").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::RemoteFailure);
        assert!(store.exists("/store/a"));
    }
}
