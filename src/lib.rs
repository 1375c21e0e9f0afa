//! Traversal and recursive mutation engine for namespaces exposed by a
//! storage redirector.
//!
//! The engine only talks to the namespace through [`RemoteStore`]; command
//! crates pick a store, build a [`Walker`] around it and call into it.

pub mod cancel;
pub mod classify;
pub mod config;
pub mod delete;
pub mod errors;
pub mod helpers;
pub mod memory;
pub mod models;
pub mod ops;
pub mod ownership;
pub mod store;
pub mod walker;

pub use cancel::CancelToken;
pub use classify::classify;
pub use config::{SessionConfig, DEFAULT_MAX_DEPTH};
pub use delete::{ConfirmState, Confirmer, DeleteTarget};
pub use errors::{CoreError, ErrorKind, Operation, Result};
pub use helpers::{
    as_directory,
    file_list_name,
    format_mod_time,
    gib,
    join,
    print_size,
    validate_base,
    validate_remote_path,
    DEFAULT_BASE_PATH,
};
pub use memory::{MemoryStore, StoreCall};
pub use models::{
    ConfirmPolicy,
    Confirmation,
    DeleteReport,
    EntryKind,
    EntryMetadata,
    FileList,
    ListedEntry,
    Listing,
    SizedEntry,
    StatFlags,
};
pub use ownership::{check_ownership, require_ownership};
pub use store::{LocalStore, RemoteStore};
pub use walker::Walker;

/// Re-export a small stable API surface for command crates.
pub mod prelude {
    pub use crate::{
        cancel::CancelToken,
        classify::classify,
        config::SessionConfig,
        delete::{ConfirmState, Confirmer, DeleteTarget},
        errors::{CoreError, ErrorKind, Result},
        helpers::*,
        models::*,
        ownership::check_ownership,
        store::{LocalStore, RemoteStore},
        walker::Walker,
    };
}
