//! Recursive deletion.
//!
//! Stores offer no recursive delete, so one is synthesized here: list a
//! directory, delete its files, recurse into its sub-directories, then remove
//! the directory once it is empty. Nothing is rolled back on failure; the
//! error names the operation and path so the caller can reconcile.

use crate::errors::{CoreError, Operation, Result};
use crate::helpers::{as_directory, validate_remote_path};
use crate::models::{ConfirmPolicy, Confirmation, DeleteReport, EntryKind, EntryMetadata, Listing};
use crate::ownership::require_ownership;
use crate::walker::{refuse_unknown, Walker};
use tracing::{info, warn};

/// What the operator is asked to approve.
#[derive(Debug, Clone, Copy)]
pub struct DeleteTarget<'a> {
    pub path: &'a str,
    pub kind: EntryKind,
    /// Direct children, for directory targets.
    pub listing: Option<&'a Listing>,
    /// Stat result, for file targets.
    pub metadata: Option<&'a EntryMetadata>,
}

/// Presentation-side prompt used by deletions.
pub trait Confirmer {
    fn confirm(&mut self, target: &DeleteTarget<'_>) -> Confirmation;
}

/// Confirmation state owned by the top-level call and threaded through the
/// recursion by reference.
pub struct ConfirmState<'c> {
    policy: ConfirmPolicy,
    confirmer: Option<&'c mut dyn Confirmer>,
}

impl<'c> ConfirmState<'c> {
    pub fn new(policy: ConfirmPolicy, confirmer: &'c mut dyn Confirmer) -> Self {
        Self {
            policy,
            confirmer: Some(confirmer),
        }
    }

    /// Batch mode: nothing is ever asked.
    pub fn unattended() -> Self {
        Self {
            policy: ConfirmPolicy::Never,
            confirmer: None,
        }
    }

    pub fn policy(&self) -> ConfirmPolicy {
        self.policy
    }

    fn approve(&mut self, target: &DeleteTarget<'_>) -> bool {
        if self.policy == ConfirmPolicy::Never {
            return true;
        }
        // Asking without anyone to answer declines.
        let Some(confirmer) = self.confirmer.as_deref_mut() else {
            return false;
        };
        match (confirmer.confirm(target), self.policy) {
            (Confirmation::No, _) => false,
            (Confirmation::All, ConfirmPolicy::UntilAll) => {
                info!("will delete without asking again");
                self.policy = ConfirmPolicy::Never;
                true
            }
            _ => true,
        }
    }
}

impl<'s> Walker<'s> {
    /// Deletes a directory and everything below it.
    ///
    /// `owner` has to appear in `path`; otherwise nothing is contacted.
    pub fn delete_subtree(
        &self,
        path: &str,
        owner: &str,
        confirm: &mut ConfirmState<'_>,
    ) -> Result<DeleteReport> {
        validate_remote_path(path)?;
        require_ownership(path, owner)?;
        let report = self.delete_directory(&as_directory(path), confirm, 0)?;
        if report.is_complete() {
            info!("{path} removed");
        }
        Ok(report)
    }

    /// Deletes a single file after an optional confirmation.
    pub fn delete_file(
        &self,
        path: &str,
        owner: &str,
        confirm: &mut ConfirmState<'_>,
    ) -> Result<DeleteReport> {
        validate_remote_path(path)?;
        require_ownership(path, owner)?;
        let (metadata, kind) = self.stat(path)?;
        match kind {
            EntryKind::File => self.delete_stated_file(path, &metadata, confirm),
            EntryKind::Directory => Err(CoreError::invalid_path(format!(
                "{path} is a directory, use a subtree deletion"
            ))),
            EntryKind::Unknown => Err(CoreError::Unclassifiable {
                path: path.to_string(),
                flags: metadata.flags.bits(),
            }),
        }
    }

    /// Deletes whatever `path` is: a file, or a directory with its subtree.
    pub fn delete_path(
        &self,
        path: &str,
        owner: &str,
        confirm: &mut ConfirmState<'_>,
    ) -> Result<DeleteReport> {
        validate_remote_path(path)?;
        require_ownership(path, owner)?;
        let (metadata, kind) = self.stat(path)?;
        match kind {
            EntryKind::File => self.delete_stated_file(path, &metadata, confirm),
            EntryKind::Directory => self.delete_directory(&as_directory(path), confirm, 0),
            EntryKind::Unknown => Err(CoreError::Unclassifiable {
                path: path.to_string(),
                flags: metadata.flags.bits(),
            }),
        }
    }

    fn delete_stated_file(
        &self,
        path: &str,
        metadata: &EntryMetadata,
        confirm: &mut ConfirmState<'_>,
    ) -> Result<DeleteReport> {
        let mut report = DeleteReport::default();
        let target = DeleteTarget {
            path,
            kind: EntryKind::File,
            listing: None,
            metadata: Some(metadata),
        };
        let approved = confirm.approve(&target);
        // An interrupt while the operator was being asked wins over the reply.
        self.cancel_token().check(Operation::DeleteFile, path)?;
        if !approved {
            warn!("nothing deleted: {path}");
            report.declined.push(path.to_string());
            return Ok(report);
        }
        self.remote(Operation::DeleteFile, path, |store| store.delete_file(path))?;
        info!("file: {path} removed.");
        report.files_deleted.push(path.to_string());
        Ok(report)
    }

    fn delete_directory(
        &self,
        path: &str,
        confirm: &mut ConfirmState<'_>,
        depth: usize,
    ) -> Result<DeleteReport> {
        self.check_depth(path, depth)?;
        let listing = self.list(path).map_err(|err| {
            if depth > 0 {
                err.into_descendant_failure()
            } else {
                err
            }
        })?;
        // Validate the whole directory before the first mutation in it.
        refuse_unknown(&listing)?;

        let mut report = DeleteReport::default();
        let target = DeleteTarget {
            path,
            kind: EntryKind::Directory,
            listing: Some(&listing),
            metadata: None,
        };
        let approved = confirm.approve(&target);
        self.cancel_token().check(Operation::RemoveDirectory, path)?;
        if !approved {
            warn!("nothing deleted in {path}");
            report.declined.push(path.to_string());
            return Ok(report);
        }

        for file in listing.files() {
            let file_path = file.path.as_str();
            self.remote(Operation::DeleteFile, file_path, |store| {
                store.delete_file(file_path)
            })?;
            info!("file: {file_path} removed");
            report.files_deleted.push(file.path.clone());
        }

        for directory in listing.directories() {
            let sub = self.delete_directory(&directory.path, confirm, depth + 1)?;
            report.merge(sub);
        }

        if !report.is_complete() {
            warn!("{path} kept, parts of it were declined");
            report.declined.push(path.to_string());
            return Ok(report);
        }

        self.remote(Operation::RemoveDirectory, path, |store| {
            store.remove_empty_directory(path)
        })?;
        info!("directory: {path} removed");
        report.directories_removed.push(path.to_string());
        Ok(report)
    }
}
