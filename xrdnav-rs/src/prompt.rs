use crate::render;
use std::io::{self, BufRead, StdinLock, Stdout, Write};
use xrdnav_core::{Confirmation, Confirmer, DeleteTarget, EntryKind};

/// Line-based y/n/all prompt.
pub struct Prompt<R, W> {
    input: R,
    output: W,
}

impl Prompt<StdinLock<'static>, Stdout> {
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> Prompt<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    fn ask(&mut self, target: &DeleteTarget<'_>) -> io::Result<String> {
        match (target.kind, target.listing) {
            (EntryKind::Directory, Some(listing)) => {
                writeln!(
                    self.output,
                    "The following entries will be deleted within {}:",
                    target.path
                )?;
                for line in render::ls_lines(listing) {
                    writeln!(self.output, "{line}")?;
                }
                write!(
                    self.output,
                    "Are you sure to delete the following directory: {}? (y/n/all) ",
                    target.path
                )?;
            }
            _ => {
                writeln!(self.output, "The following file will be deleted: {}", target.path)?;
                if let Some(metadata) = target.metadata {
                    for line in render::stat_lines(target.path, metadata, target.kind) {
                        writeln!(self.output, "{line}")?;
                    }
                }
                write!(self.output, "Are you sure to delete <{}>? (y/n) ", target.path)?;
            }
        }
        self.output.flush()?;

        let mut reply = String::new();
        self.input.read_line(&mut reply)?;
        Ok(reply.trim().to_string())
    }
}

impl<R: BufRead, W: Write> Confirmer for Prompt<R, W> {
    fn confirm(&mut self, target: &DeleteTarget<'_>) -> Confirmation {
        match self.ask(target).as_deref() {
            Ok("y") => Confirmation::Yes,
            Ok("all") => Confirmation::All,
            Ok(_) => Confirmation::No,
            Err(err) => {
                tracing::warn!("unable to read confirmation: {err}");
                Confirmation::No
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use xrdnav_core::{EntryMetadata, Listing, StatFlags};

    fn file_target<'a>(metadata: &'a EntryMetadata) -> DeleteTarget<'a> {
        DeleteTarget {
            path: "/store/user/alice/f1",
            kind: EntryKind::File,
            listing: None,
            metadata: Some(metadata),
        }
    }

    #[test]
    fn replies_map_to_confirmations() {
        let metadata = EntryMetadata::new("f1", 100, StatFlags::from_bits(48));
        for (reply, expected) in [
            ("y\n", Confirmation::Yes),
            ("all\n", Confirmation::All),
            ("n\n", Confirmation::No),
            ("yes please\n", Confirmation::No),
            ("", Confirmation::No),
        ] {
            let mut prompt = Prompt::new(Cursor::new(reply), Vec::new());
            assert_eq!(prompt.confirm(&file_target(&metadata)), expected, "{reply:?}");
        }
    }

    #[test]
    fn directory_prompt_shows_contents() {
        let listing = Listing {
            parent: "/store/user/alice/d1/".into(),
            entries: Vec::new(),
        };
        let target = DeleteTarget {
            path: "/store/user/alice/d1/",
            kind: EntryKind::Directory,
            listing: Some(&listing),
            metadata: None,
        };
        let mut output = Vec::new();
        let mut prompt = Prompt::new(Cursor::new("all\n"), &mut output);
        assert_eq!(prompt.confirm(&target), Confirmation::All);
        let printed = String::from_utf8(output).unwrap();
        assert!(printed.contains("/store/user/alice/d1/, N: 0"));
        assert!(printed.ends_with("(y/n/all) "));
    }
}
