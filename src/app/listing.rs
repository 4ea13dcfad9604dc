//! Directory listing link extraction
//!
//! Listing pages are scanned for `href="..."` attributes; no HTML parsing
//! takes place. A link is kept when it contains one of the known file
//! extensions anywhere in its text.

use crate::constants::KNOWN_EXTENSIONS;

/// Read-only set of file extensions recognized in listings
#[derive(Debug, Clone)]
pub struct ExtensionSet {
    extensions: Vec<String>,
}

impl ExtensionSet {
    /// Built-in extensions plus `extra`. Entries without a leading dot get one.
    pub fn new(extra: &[String]) -> Self {
        let mut extensions: Vec<String> =
            KNOWN_EXTENSIONS.iter().map(|ext| ext.to_string()).collect();

        for ext in extra {
            let ext = ext.trim().to_ascii_lowercase();
            if ext.is_empty() {
                continue;
            }
            let ext = if ext.starts_with('.') { ext } else { format!(".{}", ext) };
            if !extensions.contains(&ext) {
                extensions.push(ext);
            }
        }

        Self { extensions }
    }

    /// Whether `candidate` contains any known extension (case-insensitive)
    pub fn matches(&self, candidate: &str) -> bool {
        let lowered = candidate.to_ascii_lowercase();
        self.extensions.iter().any(|ext| lowered.contains(ext.as_str()))
    }

    pub fn len(&self) -> usize {
        self.extensions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.extensions.is_empty()
    }
}

impl Default for ExtensionSet {
    fn default() -> Self {
        Self::new(&[])
    }
}

/// Collect link targets with a known extension, in order of appearance.
pub fn extract_links(body: &str, extensions: &ExtensionSet) -> Vec<String> {
    href_values(body)
        .filter(|candidate| extensions.matches(candidate))
        .map(str::to_string)
        .collect()
}

/// Every quoted value following `href=`
fn href_values(body: &str) -> impl Iterator<Item = &str> {
    let mut rest = body;

    std::iter::from_fn(move || loop {
        let start = rest.find("href=")? + "href=".len();
        rest = &rest[start..];

        let open = rest.find(['"', '\''])?;
        let quote = rest[open..].chars().next()?;
        let value_start = open + quote.len_utf8();
        let Some(len) = rest[value_start..].find(quote) else {
            rest = "";
            return None;
        };

        let value = &rest[value_start..value_start + len];
        rest = &rest[value_start + len + quote.len_utf8()..];
        if !value.is_empty() {
            return Some(value);
        }
    })
}
