//! Serialises a [`SectionMap`] back into settings text.
//!
//! ```text
//! [First]
//! key=value
//!
//! [Second]
//! other=value
//! ```
//!
//! One blank line separates sections.  Nothing is escaped or padded.

use tracing::trace;

use super::cache::SectionMap;

pub fn render(sections: &SectionMap) -> String {
    let mut out = String::new();
    for (index, section) in sections.iter().enumerate() {
        if index > 0 {
            out.push('\n');
        }
        out.push('[');
        out.push_str(section.name());
        out.push_str("]\n");

        for (key, value) in section.entries() {
            trace!("writing [{}] {key}={value}", section.name());
            out.push_str(key);
            out.push('=');
            out.push_str(value);
            out.push('\n');
        }
    }
    out
}
