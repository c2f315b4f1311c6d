//! Parses settings text into a [`SectionMap`].
//!
//! Parsing is line based and never fails.  Each line is trimmed, then:
//!
//! - `[name]` opens section `name`.  If a section with that name was already
//!   seen, the lines that follow are skipped until the next header.
//! - `key=value` inside an open section adds an entry.  Only the first `=`
//!   splits; later ones belong to the value.  A key seen earlier in the same
//!   section keeps its first value.
//! - Anything else, including `key=value` before the first header, is ignored.
//!
//! Empty section names and empty keys are ignored.  There is no comment
//! syntax.

use tracing::debug;

use super::backing::Backing;
use super::cache::{Section, SectionMap};
use crate::error::StoreResult;

const BOM: char = '\u{feff}';

/// Reads and parses the backing text.  Missing text yields an empty map.
///
/// # Errors
///
/// Propagates the backing's [`crate::StoreError::Read`].
pub fn load<B: Backing + ?Sized>(backing: &B) -> StoreResult<SectionMap> {
    let sections = match backing.read()? {
        Some(text) => parse(&text),
        None => SectionMap::new(),
    };
    debug!("loaded {} section(s)", sections.len());
    Ok(sections)
}

/// Parses settings text.  `\n` and `\r\n` line endings are both accepted.
pub fn parse(text: &str) -> SectionMap {
    let text = text.strip_prefix(BOM).unwrap_or(text);

    let mut sections = SectionMap::new();
    // `None` while outside any section or inside a duplicate one.
    let mut current: Option<Section> = None;

    for line in text.lines() {
        let line = line.trim();

        if let Some(name) = section_header(line) {
            let name = name.trim();
            if name.is_empty() {
                continue;
            }
            if let Some(done) = current.take() {
                sections.push_section(done);
            }
            current = if sections.contains_section(name) {
                debug!("skipping duplicate section [{name}]");
                None
            } else {
                Some(Section::new(name))
            };
            continue;
        }

        let Some(section) = current.as_mut() else {
            continue;
        };
        if let Some((key, value)) = line.split_once('=') {
            let key = key.trim();
            if !key.is_empty() {
                section.insert_if_absent(key, value.trim());
            }
        }
    }

    if let Some(done) = current {
        sections.push_section(done);
    }
    sections
}

fn section_header(line: &str) -> Option<&str> {
    line.strip_prefix('[')?.strip_suffix(']')
}
