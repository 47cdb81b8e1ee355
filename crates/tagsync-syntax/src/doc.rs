//! Documentation blocks and embedded tag recovery
//!
//! A declaration is correlated with its tag-tree slot through a block tag
//! in its leading `/** ... */` comment, e.g. `@pattern DataInterface`.
//! The text after the marker is split into per-line fragments, each keeping
//! the separator that precedes it, which is why the default recovery rule
//! drops exactly one leading character per fragment.

use serde::{Deserialize, Serialize};

/// Default block-tag marker
pub const DEFAULT_MARKER: &str = "@pattern";

/// Parsed `/** ... */` documentation block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocComment {
    raw: String,
    description: Vec<String>,
    tags: Vec<DocTag>,
}

/// Block tag with its text fragments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocTag {
    /// Tag name including the `@`
    pub name: String,
    /// One fragment per source line, leading separator kept
    pub fragments: Vec<String>,
}

impl DocComment {
    /// Parse a raw comment
    ///
    /// Anything that is not a terminated `/** ... */` block parses to a
    /// comment without tags instead of failing.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let mut doc = Self {
            raw: raw.to_string(),
            description: Vec::new(),
            tags: Vec::new(),
        };

        let Some(inner) = raw
            .strip_prefix("/**")
            .and_then(|rest| rest.strip_suffix("*/"))
        else {
            return doc;
        };

        for line in inner.lines() {
            let trimmed = line.trim_start();
            let content = trimmed.strip_prefix('*').unwrap_or(trimmed).trim_end();
            if content.trim().is_empty() {
                continue;
            }

            let start = content.trim_start();
            if start.starts_with('@') {
                let end = start
                    .find(char::is_whitespace)
                    .unwrap_or(start.len());
                let (name, rest) = start.split_at(end);
                let fragments = if rest.is_empty() {
                    Vec::new()
                } else {
                    vec![rest.to_string()]
                };
                doc.tags.push(DocTag {
                    name: name.to_string(),
                    fragments,
                });
            } else if let Some(tag) = doc.tags.last_mut() {
                tag.fragments.push(content.to_string());
            } else {
                doc.description.push(start.to_string());
            }
        }

        doc
    }

    /// Build a block carrying `marker tag`, as written by synthesis
    #[must_use]
    pub fn tagged(marker: &str, tag: &str, summary: Option<&str>) -> Self {
        let mut raw = String::from("/**\n");
        if let Some(summary) = summary {
            raw.push_str(&format!(" * {summary}\n *\n"));
        }
        raw.push_str(&format!(" * {marker} {tag}\n */"));
        Self::parse(&raw)
    }

    /// Raw comment text
    #[inline]
    #[must_use]
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Description lines preceding the first block tag
    #[inline]
    #[must_use]
    pub fn description(&self) -> &[String] {
        &self.description
    }

    /// Block tags in source order
    #[inline]
    #[must_use]
    pub fn tags(&self) -> &[DocTag] {
        &self.tags
    }

    /// First block tag named `name`
    #[must_use]
    pub fn find_tag(&self, name: &str) -> Option<&DocTag> {
        self.tags.iter().find(|t| t.name == name)
    }
}

/// Rule recovering tag text from block-tag fragments
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TagRule {
    /// Drop this many leading characters from every fragment
    StripLeading(usize),
    /// Trim whitespace around every fragment
    Trim,
}

impl Default for TagRule {
    fn default() -> Self {
        TagRule::StripLeading(1)
    }
}

impl TagRule {
    fn apply<'a>(&self, fragment: &'a str) -> &'a str {
        match *self {
            TagRule::StripLeading(n) => fragment
                .char_indices()
                .nth(n)
                .map_or("", |(i, _)| &fragment[i..]),
            TagRule::Trim => fragment.trim(),
        }
    }
}

/// Recovers the correlation tag of a declaration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagExtractor {
    marker: String,
    rule: TagRule,
}

impl Default for TagExtractor {
    fn default() -> Self {
        Self::new(DEFAULT_MARKER, TagRule::default())
    }
}

impl TagExtractor {
    /// Create an extractor for `marker`
    #[must_use]
    pub fn new(marker: impl Into<String>, rule: TagRule) -> Self {
        Self {
            marker: marker.into(),
            rule,
        }
    }

    /// Block-tag marker
    #[inline]
    #[must_use]
    pub fn marker(&self) -> &str {
        &self.marker
    }

    /// Recovery rule
    #[inline]
    #[must_use]
    pub fn rule(&self) -> TagRule {
        self.rule
    }

    /// Documentation block from which this extractor recovers `tag`
    ///
    /// `StripLeading(n)` with `n > 1` pads the tag so the strip lands on it.
    #[must_use]
    pub fn document(&self, tag: &str, summary: Option<&str>) -> DocComment {
        let padded = match self.rule {
            TagRule::StripLeading(n) if n > 1 => format!("{}{tag}", " ".repeat(n - 1)),
            _ => tag.to_string(),
        };
        DocComment::tagged(&self.marker, &padded, summary)
    }

    /// Tag embedded in `doc`, `None` when absent or empty
    #[must_use]
    pub fn extract(&self, doc: Option<&DocComment>) -> Option<String> {
        let tag = doc?.find_tag(&self.marker)?;
        let text: String = tag
            .fragments
            .iter()
            .map(|f| self.rule.apply(f))
            .collect();
        if text.trim().is_empty() {
            tracing::trace!(marker = %self.marker, "empty tag annotation treated as untagged");
            None
        } else {
            Some(text)
        }
    }
}
