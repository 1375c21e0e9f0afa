//! Plain-text rendering of engine results.

use xrdnav_core::{gib, print_size, EntryKind, EntryMetadata, Listing, SizedEntry, StatFlags};

const RULE: &str = "-------------------------------------";

pub fn ls_lines(listing: &Listing) -> Vec<String> {
    let mut lines = vec![format!("{}, N: {}", listing.parent, listing.len())];
    lines.extend(listing.entries.iter().map(|entry| {
        format!(
            "{} {:>10} {} ({})",
            entry.metadata.mod_time, entry.metadata.size_bytes, entry.metadata.name, entry.kind
        )
    }));
    lines
}

pub fn stat_lines(path: &str, metadata: &EntryMetadata, kind: EntryKind) -> Vec<String> {
    vec![
        RULE.to_string(),
        format!("name: {path}"),
        format!("kind: {kind}"),
        format!("size: {}", metadata.size_bytes),
        format!("flags: {} [{}]", metadata.flags, metadata.flags.set_names().join(", ")),
        format!("modtimestr: {}", metadata.mod_time),
        RULE.to_string(),
    ]
}

/// One line per known flag bit, `1 NAME` or `0 NAME`.
pub fn flag_lines(flags: StatFlags) -> Vec<String> {
    StatFlags::NAMES
        .iter()
        .map(|(bit, name)| format!("{} {name}", u8::from(flags.contains(*bit))))
        .collect()
}

pub fn stat_dir_lines(listing: &Listing) -> Vec<String> {
    let mut lines = Vec::new();
    for entry in &listing.entries {
        lines.push(RULE.to_string());
        lines.push(format!("name: {}", entry.metadata.name));
        lines.push(format!("size: {}", entry.metadata.size_bytes));
        lines.push(format!("flags: {}", entry.metadata.flags));
        lines.push(format!("modtimestr: {}", entry.metadata.mod_time));
    }
    lines.push(RULE.to_string());
    lines
}

pub fn size_line(bytes: u64) -> String {
    format!("Byte: {bytes} (GiB: {:.3}G)", gib(bytes))
}

pub fn content_lines(entries: &[SizedEntry]) -> Vec<String> {
    entries
        .iter()
        .map(|entry| format!("{:<10} {}", print_size(entry.size_bytes), entry.path))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use xrdnav_core::ListedEntry;

    fn listing() -> Listing {
        Listing {
            parent: "/store/user/alice/".into(),
            entries: vec![
                ListedEntry {
                    metadata: EntryMetadata::new("f1", 100, StatFlags::from_bits(48))
                        .with_mod_time("2024-01-01 10:00:00"),
                    kind: EntryKind::File,
                    path: "/store/user/alice/f1".into(),
                },
                ListedEntry {
                    metadata: EntryMetadata::new("d2", 512, StatFlags::from_bits(51))
                        .with_mod_time("2024-01-02 10:00:00"),
                    kind: EntryKind::Directory,
                    path: "/store/user/alice/d2/".into(),
                },
            ],
        }
    }

    #[test]
    fn ls_prints_header_and_kinds() {
        assert_eq!(
            ls_lines(&listing()),
            vec![
                "/store/user/alice/, N: 2",
                "2024-01-01 10:00:00        100 f1 (file)",
                "2024-01-02 10:00:00        512 d2 (dir)",
            ]
        );
    }

    #[test]
    fn flag_lines_cover_every_bit() {
        let lines = flag_lines(StatFlags::from_bits(19));
        assert_eq!(lines.len(), 8);
        assert_eq!(lines[0], "1 X_BIT_SET");
        assert_eq!(lines[1], "1 IS_DIR");
        assert_eq!(lines[2], "0 OTHER");
        assert_eq!(lines[4], "1 IS_READABLE");
    }

    #[test]
    fn stat_names_set_flags() {
        let metadata = EntryMetadata::new("f1", 100, StatFlags::from_bits(48));
        let lines = stat_lines("/store/user/alice/f1", &metadata, EntryKind::File);
        assert!(lines.contains(&"flags: 48 [IS_READABLE, IS_WRITABLE]".to_string()));
        assert!(lines.contains(&"kind: file".to_string()));
    }

    #[test]
    fn size_line_reports_gib() {
        assert_eq!(size_line(1 << 30), "Byte: 1073741824 (GiB: 1.000G)");
    }

    #[test]
    fn content_lines_pad_sizes() {
        let entries = vec![SizedEntry {
            path: "/store/user/alice/d2/".into(),
            kind: EntryKind::Directory,
            size_bytes: 1_500,
        }];
        assert_eq!(content_lines(&entries), vec!["   1.5 KB  /store/user/alice/d2/"]);
    }
}
