use crate::errors::{CoreError, Operation, Result};
use crate::helpers::{base_name, format_mod_time};
use crate::models::{EntryMetadata, StatFlags};
use std::fs::{self, Metadata};
use std::io;
use std::path::{Component, Path, PathBuf};

/// Remote store boundary the traversal engine talks through.
///
/// Every method is one blocking round-trip. Implementations must not retry;
/// retry and timeout policy belong to the transport behind them.
pub trait RemoteStore: Send + Sync {
    /// Connectivity probe.
    fn ping(&self) -> crate::Result<()>;

    /// Metadata of a single path.
    fn stat(&self, path: &str) -> crate::Result<EntryMetadata>;

    /// Raw metadata of the direct children of a directory.
    fn list_directory(&self, path: &str) -> crate::Result<Vec<EntryMetadata>>;

    /// Removes a file.
    fn delete_file(&self, path: &str) -> crate::Result<()>;

    /// Removes a directory that has to be empty already.
    fn remove_empty_directory(&self, path: &str) -> crate::Result<()>;

    /// Moves or renames a path. Never overwrites.
    fn rename(&self, source: &str, dest: &str) -> crate::Result<()>;

    /// Creates a directory and all missing ancestors.
    fn make_directory_tree(&self, path: &str) -> crate::Result<()>;

    /// Uploads a local file. Never overwrites.
    fn copy_in(&self, local: &Path, remote: &str) -> crate::Result<()>;

    /// Downloads a remote file. Never overwrites.
    fn copy_out(&self, remote: &str, local: &Path) -> crate::Result<()>;
}

/// Store backed by a locally mounted namespace (for example a FUSE mount of
/// the redirector). Remote paths are resolved below `root`.
#[derive(Debug, Clone)]
pub struct LocalStore {
    root: PathBuf,
}

impl LocalStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Maps a remote path below `root`. Paths that climb out of the root or
    /// pass through a symbolic link are rejected before anything is touched.
    fn resolve(&self, path: &str) -> crate::Result<PathBuf> {
        let relative = Path::new(path.trim_start_matches('/'));
        let mut local = self.root.clone();
        for component in relative.components() {
            match component {
                Component::CurDir => {}
                Component::Normal(part) => {
                    local.push(part);
                    if is_symlink(&local) {
                        return Err(CoreError::invalid_path(format!(
                            "{path:?} passes through a symbolic link"
                        )));
                    }
                }
                _ => {
                    return Err(CoreError::invalid_path(format!(
                        "{path:?} escapes the namespace root"
                    )))
                }
            }
        }
        Ok(local)
    }

    fn metadata(&self, op: Operation, path: &str) -> crate::Result<Metadata> {
        let local = self.resolve(path)?;
        fs::symlink_metadata(&local).map_err(|err| map_io(op, path, err))
    }

    fn refuse_existing(&self, op: Operation, path: &str, local: &Path) -> crate::Result<()> {
        if fs::symlink_metadata(local).is_ok() {
            Err(CoreError::remote(op, path, "destination exists, refusing to overwrite"))
        } else {
            Ok(())
        }
    }
}

impl RemoteStore for LocalStore {
    fn ping(&self) -> crate::Result<()> {
        if self.root.is_dir() {
            Ok(())
        } else {
            Err(CoreError::remote(
                Operation::Ping,
                self.root.display().to_string(),
                "namespace root is not a directory",
            ))
        }
    }

    fn stat(&self, path: &str) -> crate::Result<EntryMetadata> {
        let metadata = self.metadata(Operation::Stat, path)?;
        Ok(entry_metadata(base_name(path), &metadata))
    }

    fn list_directory(&self, path: &str) -> crate::Result<Vec<EntryMetadata>> {
        let local = self.resolve(path)?;
        let read_dir = fs::read_dir(&local).map_err(|err| map_io(Operation::List, path, err))?;
        let mut entries = Vec::new();
        for entry in read_dir {
            let entry = entry.map_err(|err| map_io(Operation::List, path, err))?;
            // Links are reported as they are, never followed.
            let metadata = fs::symlink_metadata(entry.path())
                .map_err(|err| map_io(Operation::List, path, err))?;
            let name = entry.file_name().to_string_lossy().into_owned();
            entries.push(entry_metadata(&name, &metadata));
        }
        // read_dir order is arbitrary; keep repeated listings stable.
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entries)
    }

    fn delete_file(&self, path: &str) -> crate::Result<()> {
        let local = self.resolve(path)?;
        fs::remove_file(&local).map_err(|err| map_io(Operation::DeleteFile, path, err))
    }

    fn remove_empty_directory(&self, path: &str) -> crate::Result<()> {
        let local = self.resolve(path)?;
        fs::remove_dir(&local).map_err(|err| map_io(Operation::RemoveDirectory, path, err))
    }

    fn rename(&self, source: &str, dest: &str) -> crate::Result<()> {
        let from = self.resolve(source)?;
        let to = self.resolve(dest)?;
        self.metadata(Operation::Move, source)?;
        self.refuse_existing(Operation::Move, dest, &to)?;
        fs::rename(&from, &to).map_err(|err| map_io(Operation::Move, source, err))
    }

    fn make_directory_tree(&self, path: &str) -> crate::Result<()> {
        let local = self.resolve(path)?;
        fs::create_dir_all(&local).map_err(|err| map_io(Operation::MakeDirectory, path, err))
    }

    fn copy_in(&self, local: &Path, remote: &str) -> crate::Result<()> {
        let target = self.resolve(remote)?;
        if !local.is_file() {
            return Err(CoreError::not_found(
                Operation::CopyIn,
                local.display().to_string(),
            ));
        }
        self.refuse_existing(Operation::CopyIn, remote, &target)?;
        fs::copy(local, &target)
            .map(|_| ())
            .map_err(|err| map_io(Operation::CopyIn, remote, err))
    }

    fn copy_out(&self, remote: &str, local: &Path) -> crate::Result<()> {
        let source = self.resolve(remote)?;
        let metadata = self.metadata(Operation::CopyOut, remote)?;
        if metadata.is_dir() {
            return Err(CoreError::remote(
                Operation::CopyOut,
                remote,
                "source is a directory",
            ));
        }
        if fs::symlink_metadata(local).is_ok() {
            return Err(CoreError::remote(
                Operation::CopyOut,
                local.display().to_string(),
                "destination exists, refusing to overwrite",
            ));
        }
        fs::copy(&source, local)
            .map(|_| ())
            .map_err(|err| map_io(Operation::CopyOut, remote, err))
    }
}

fn is_symlink(local: &Path) -> bool {
    fs::symlink_metadata(local)
        .map(|metadata| metadata.file_type().is_symlink())
        .unwrap_or(false)
}

fn map_io(op: Operation, path: &str, err: io::Error) -> CoreError {
    match err.kind() {
        io::ErrorKind::NotFound => CoreError::not_found(op, path),
        _ => CoreError::remote(op, path, err.to_string()),
    }
}

fn entry_metadata(name: &str, metadata: &Metadata) -> EntryMetadata {
    let entry = EntryMetadata::new(name, metadata.len(), local_flags(metadata));
    match metadata.modified() {
        Ok(time) => entry.with_mod_time(format_mod_time(time)),
        Err(_) => entry,
    }
}

fn local_flags(metadata: &Metadata) -> StatFlags {
    let mut flags = StatFlags::default().with(StatFlags::IS_READABLE);
    if metadata.is_dir() {
        flags = flags.with(StatFlags::IS_DIR);
    } else if !metadata.is_file() {
        flags = flags.with(StatFlags::OTHER);
    }
    if !metadata.permissions().readonly() {
        flags = flags.with(StatFlags::IS_WRITABLE);
    }
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        if metadata.permissions().mode() & 0o111 != 0 {
            flags = flags.with(StatFlags::X_BIT_SET);
        }
    }
    flags
}
