use std::fmt;

/// Stat flag bits as reported by the redirector.
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Hash)]
pub struct StatFlags(u32);

impl StatFlags {
    pub const X_BIT_SET: u32 = 1;
    pub const IS_DIR: u32 = 2;
    /// Neither a regular file nor a directory.
    pub const OTHER: u32 = 4;
    pub const OFFLINE: u32 = 8;
    pub const IS_READABLE: u32 = 16;
    pub const IS_WRITABLE: u32 = 32;
    pub const POSC_PENDING: u32 = 64;
    pub const BACKUP_EXISTS: u32 = 128;

    /// Bit names in ascending bit order.
    pub const NAMES: [(u32, &'static str); 8] = [
        (Self::X_BIT_SET, "X_BIT_SET"),
        (Self::IS_DIR, "IS_DIR"),
        (Self::OTHER, "OTHER"),
        (Self::OFFLINE, "OFFLINE"),
        (Self::IS_READABLE, "IS_READABLE"),
        (Self::IS_WRITABLE, "IS_WRITABLE"),
        (Self::POSC_PENDING, "POSC_PENDING"),
        (Self::BACKUP_EXISTS, "BACKUP_EXISTS"),
    ];

    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    pub const fn bits(self) -> u32 {
        self.0
    }

    pub const fn contains(self, bit: u32) -> bool {
        self.0 & bit == bit
    }

    pub const fn with(self, bit: u32) -> Self {
        Self(self.0 | bit)
    }

    /// Names of every known bit that is set.
    pub fn set_names(self) -> Vec<&'static str> {
        Self::NAMES
            .iter()
            .filter(|(bit, _)| self.contains(*bit))
            .map(|(_, name)| *name)
            .collect()
    }
}

impl fmt::Display for StatFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum EntryKind {
    File,
    Directory,
    Unknown,
}

impl EntryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::File => "file",
            Self::Directory => "dir",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One raw metadata record, as produced by a stat or listing call.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct EntryMetadata {
    pub name: String,
    pub size_bytes: u64,
    pub flags: StatFlags,
    pub mod_time: String,
}

impl EntryMetadata {
    pub fn new(name: impl Into<String>, size_bytes: u64, flags: StatFlags) -> Self {
        Self {
            name: name.into(),
            size_bytes,
            flags,
            mod_time: String::new(),
        }
    }

    pub fn with_mod_time(mut self, mod_time: impl Into<String>) -> Self {
        self.mod_time = mod_time.into();
        self
    }
}

/// A classified child of a listed directory.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct ListedEntry {
    pub metadata: EntryMetadata,
    pub kind: EntryKind,
    /// Fully qualified path; directories carry a trailing separator.
    pub path: String,
}

/// Direct children of one directory, in the order the store returned them.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Listing {
    pub parent: String,
    pub entries: Vec<ListedEntry>,
}

impl Listing {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn files(&self) -> impl Iterator<Item = &ListedEntry> {
        self.of_kind(EntryKind::File)
    }

    pub fn directories(&self) -> impl Iterator<Item = &ListedEntry> {
        self.of_kind(EntryKind::Directory)
    }

    pub fn unknown(&self) -> impl Iterator<Item = &ListedEntry> {
        self.of_kind(EntryKind::Unknown)
    }

    fn of_kind(&self, kind: EntryKind) -> impl Iterator<Item = &ListedEntry> {
        self.entries.iter().filter(move |entry| entry.kind == kind)
    }
}

/// How deletions ask the operator before touching a subtree root.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum ConfirmPolicy {
    /// Ask before every subtree root.
    Always,
    /// Never ask; the operator already confirmed globally.
    Never,
    /// Ask, but an `All` reply stops asking for the rest of the operation.
    UntilAll,
}

/// Operator reply to a deletion prompt.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Confirmation {
    Yes,
    No,
    All,
}

/// Outcome of a (possibly partially declined) deletion.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct DeleteReport {
    pub files_deleted: Vec<String>,
    pub directories_removed: Vec<String>,
    /// Roots the operator declined, plus ancestors left in place because of them.
    pub declined: Vec<String>,
}

impl DeleteReport {
    pub fn is_complete(&self) -> bool {
        self.declined.is_empty()
    }

    pub fn merge(&mut self, other: DeleteReport) {
        self.files_deleted.extend(other.files_deleted);
        self.directories_removed.extend(other.directories_removed);
        self.declined.extend(other.declined);
    }
}

/// Aggregate size of one direct child, used by directory content views.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct SizedEntry {
    pub path: String,
    pub kind: EntryKind,
    pub size_bytes: u64,
}

/// Direct children of a directory selected for a file list.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct FileList {
    pub paths: Vec<String>,
    pub includes_directories: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_names_follow_bit_order() {
        let flags = StatFlags::from_bits(51);
        assert_eq!(
            flags.set_names(),
            vec!["X_BIT_SET", "IS_DIR", "IS_READABLE", "IS_WRITABLE"]
        );
    }

    #[test]
    fn listing_filters_by_kind() {
        let entry = |name: &str, kind| ListedEntry {
            metadata: EntryMetadata::new(name, 0, StatFlags::default()),
            kind,
            path: format!("/store/{name}"),
        };
        let listing = Listing {
            parent: "/store/".into(),
            entries: vec![
                entry("a", EntryKind::File),
                entry("b", EntryKind::Directory),
                entry("c", EntryKind::File),
            ],
        };
        assert_eq!(listing.files().count(), 2);
        assert_eq!(listing.directories().count(), 1);
        assert_eq!(listing.unknown().count(), 0);
    }
}
