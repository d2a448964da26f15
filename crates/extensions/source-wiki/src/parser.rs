//! Word page scraping.
//!
//! The word page embeds each definition as an inline JSON object, usually
//! more than once (share and delete widgets both carry a copy):
//!
//! ```text
//! {"id":69934,"Word":"maiba","Definition":"Meta AI Business Assistant","Author":571165424,"CreatedTime":1729855936}
//! ```

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;

static RECORD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#""id":(\d+),"Word":"([^"]+)","Definition":"((?:[^"\\]|\\.)*)","Author":(\d+),"CreatedTime":(\d+)"#,
    )
    .expect("valid regex")
});

/// Extract the definitions of `term` from a word page.
///
/// Records for other words are ignored (case-insensitive comparison) and
/// repeated ids are kept once, in page order.
pub fn parse_word_page(html: &str, term: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut definitions = Vec::new();

    for caps in RECORD.captures_iter(html) {
        let (id, word, definition) = (&caps[1], &caps[2], &caps[3]);
        if !word.eq_ignore_ascii_case(term) {
            continue;
        }
        if !seen.insert(id.to_string()) {
            continue;
        }
        definitions.push(unescape(definition));
    }
    definitions
}

fn unescape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some(other) => out.push(other),
            None => {}
        }
    }
    out
}

#[cfg(test)]
#[path = "parser_tests.rs"]
mod tests;
