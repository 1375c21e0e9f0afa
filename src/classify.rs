//! Entry classification from stat flag bits.
//!
//! Only the flag bits decide the kind of an entry. Reported sizes and whole
//! flag values are backend accidents and are never consulted.

use crate::models::{EntryKind, StatFlags};

/// Classifies one metadata record by its flag bits.
///
/// `IS_DIR` wins over every other bit. Entries flagged `OTHER` are neither
/// files nor directories and come back as [`EntryKind::Unknown`], which
/// traversals refuse to walk past.
pub fn classify(flags: StatFlags) -> EntryKind {
    if flags.contains(StatFlags::IS_DIR) {
        EntryKind::Directory
    } else if flags.contains(StatFlags::OTHER) {
        EntryKind::Unknown
    } else {
        EntryKind::File
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directory_iff_dir_bit_set() {
        for bits in 0..=u8::MAX as u32 {
            let kind = classify(StatFlags::from_bits(bits));
            assert_eq!(
                kind == EntryKind::Directory,
                bits & StatFlags::IS_DIR != 0,
                "flags {bits}"
            );
        }
    }

    #[test]
    fn legacy_flag_values_classify_by_bit() {
        for dir in [51, 19] {
            assert_eq!(classify(StatFlags::from_bits(dir)), EntryKind::Directory);
        }
        for file in [48, 16] {
            assert_eq!(classify(StatFlags::from_bits(file)), EntryKind::File);
        }
    }

    #[test]
    fn read_only_files_are_still_files() {
        let flags = StatFlags::default().with(StatFlags::IS_READABLE);
        assert_eq!(classify(flags), EntryKind::File);
        assert_eq!(classify(StatFlags::default()), EntryKind::File);
    }

    #[test]
    fn other_bit_is_unknown() {
        let flags = StatFlags::default().with(StatFlags::OTHER).with(StatFlags::IS_READABLE);
        assert_eq!(classify(flags), EntryKind::Unknown);
    }
}
