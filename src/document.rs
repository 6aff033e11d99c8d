//! Line-level view of a YAML document, used to patch one top-level block
//! while leaving every other byte of the file alone.

use serde_yaml::Value;
use std::ops::Range;

// ============================================================================
// Line Endings
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineEnding {
    Lf,
    CrLf,
}

impl LineEnding {
    /// Any `\r\n` marks the whole document as CRLF.
    pub fn detect(text: &str) -> Self {
        if text.contains("\r\n") {
            LineEnding::CrLf
        } else {
            LineEnding::Lf
        }
    }

    pub fn normalize(text: &str) -> String {
        text.replace("\r\n", "\n")
    }

    /// Convert LF-normalized `text` back to this convention.
    pub fn apply(self, text: &str) -> String {
        match self {
            LineEnding::Lf => text.to_string(),
            LineEnding::CrLf => text.replace('\n', "\r\n"),
        }
    }
}

// ============================================================================
// Line Spans
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    Blank,
    /// Column-0 comment
    Comment,
    /// Column-0 `name:` line
    Key,
    /// Indented line, belonging to the block above it
    Member,
    Other,
}

#[derive(Debug, Clone)]
pub struct Line<'a> {
    /// Line content including its trailing `\n`, if any
    pub text: &'a str,
    pub start: usize,
    pub kind: LineKind,
}

impl Line<'_> {
    fn content(&self) -> &str {
        self.text.trim_end_matches('\n')
    }

    /// Name of a column-0 key, e.g. `tag_map` for `tag_map:`
    pub fn key_name(&self) -> Option<&str> {
        if self.kind != LineKind::Key {
            return None;
        }
        key_name(self.content())
    }

    /// Column-0 `# Name` comment. `##` sub-comments do not count.
    pub fn is_section_marker(&self) -> bool {
        self.kind == LineKind::Comment
            && !self.text.starts_with("##")
            && !self.marker_name().is_empty()
    }

    fn marker_name(&self) -> &str {
        self.content().trim_start_matches('#').trim()
    }
}

/// Where a freshly generated block goes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Placement {
    /// Replace this byte range, the existing block
    Replace(Range<usize>),
    /// Insert at this byte offset
    Insert(usize),
}

/// LF-normalized document split into classified lines
#[derive(Debug)]
pub struct Document<'a> {
    text: &'a str,
    lines: Vec<Line<'a>>,
}

impl<'a> Document<'a> {
    pub fn parse(text: &'a str) -> Self {
        let mut lines = Vec::new();
        let mut start = 0;
        for line in text.split_inclusive('\n') {
            lines.push(Line {
                text: line,
                start,
                kind: classify(line.trim_end_matches('\n')),
            });
            start += line.len();
        }
        Self { text, lines }
    }

    /// Byte range of the block owned by top-level `key`: the key line plus
    /// every following indented or blank line, and column-0 comments that
    /// sit between members. Trailing blank lines are left outside the block.
    pub fn key_block(&self, key: &str) -> Option<Range<usize>> {
        let first = self
            .lines
            .iter()
            .position(|line| line.key_name() == Some(key))?;

        let mut end = first + 1;
        while end < self.lines.len() {
            match self.lines[end].kind {
                LineKind::Member | LineKind::Blank => end += 1,
                LineKind::Comment => match self.next_member_after(end) {
                    Some(member) => end = member + 1,
                    None => break,
                },
                LineKind::Key | LineKind::Other => break,
            }
        }
        while end > first + 1 && self.lines[end - 1].kind == LineKind::Blank {
            end -= 1;
        }

        Some(self.lines[first].start..self.offset_of(end))
    }

    /// Insertion offset for a new block in the section headed `# {marker}`:
    /// just before the next section marker (ahead of the blank lines that
    /// separate the sections), or at the end of the document when the
    /// section is last or absent.
    pub fn section_insertion_point(&self, marker: &str) -> usize {
        let Some(head) = self
            .lines
            .iter()
            .position(|line| line.is_section_marker() && line.marker_name() == marker)
        else {
            return self.text.len();
        };

        let next = self.lines[head + 1..]
            .iter()
            .position(Line::is_section_marker)
            .map(|i| head + 1 + i)
            .unwrap_or(self.lines.len());

        let mut at = next;
        while at > head + 1 && self.lines[at - 1].kind == LineKind::Blank {
            at -= 1;
        }
        self.offset_of(at)
    }

    pub fn placement(&self, key: &str, marker: &str) -> Placement {
        match self.key_block(key) {
            Some(range) => Placement::Replace(range),
            None => Placement::Insert(self.section_insertion_point(marker)),
        }
    }

    /// Splice `block` (LF-terminated lines) into the document.
    pub fn splice(&self, placement: &Placement, block: &str) -> String {
        let range = match placement {
            Placement::Replace(range) => range.clone(),
            Placement::Insert(offset) => *offset..*offset,
        };

        let mut result = String::with_capacity(self.text.len() + block.len() + 1);
        let head = &self.text[..range.start];
        result.push_str(head);
        if !head.is_empty() && !head.ends_with('\n') {
            result.push('\n');
        }
        result.push_str(block);
        result.push_str(&self.text[range.end..]);
        result
    }

    /// Index of the first `Member` line after `from`, skipping only comments
    /// and blank lines.
    fn next_member_after(&self, from: usize) -> Option<usize> {
        self.lines[from..]
            .iter()
            .position(|line| !matches!(line.kind, LineKind::Comment | LineKind::Blank))
            .map(|i| from + i)
            .filter(|&i| self.lines[i].kind == LineKind::Member)
    }

    fn offset_of(&self, line_index: usize) -> usize {
        self.lines
            .get(line_index)
            .map(|line| line.start)
            .unwrap_or(self.text.len())
    }
}

fn classify(line: &str) -> LineKind {
    if line.trim().is_empty() {
        LineKind::Blank
    } else if line.starts_with([' ', '\t']) {
        LineKind::Member
    } else if line.starts_with('#') {
        LineKind::Comment
    } else if key_name(line).is_some() {
        LineKind::Key
    } else {
        LineKind::Other
    }
}

/// `name` of a column-0 `name:` or `name: value` line
fn key_name(line: &str) -> Option<&str> {
    if line.starts_with(['-', '[', '{', '#']) {
        return None;
    }
    let bytes = line.as_bytes();
    let colon = bytes.iter().enumerate().position(|(i, &b)| {
        b == b':' && bytes.get(i + 1).map_or(true, |&next| next == b' ' || next == b'\t')
    })?;
    let name = line[..colon].trim_end();
    (!name.is_empty()).then_some(name)
}

// ============================================================================
// Scalars
// ============================================================================

/// Render `s` as a YAML scalar: plain when it reads back as the same string,
/// double-quoted otherwise.
pub fn format_scalar(s: &str) -> String {
    let plain_ok = !s.is_empty()
        && !s.contains(['\n', '\r'])
        && s.trim() == s
        && matches!(
            serde_yaml::from_str::<Value>(s),
            Ok(Value::String(ref parsed)) if parsed == s
        );

    if plain_ok {
        s.to_string()
    } else {
        serde_json::to_string(s).unwrap_or_else(|_| format!("\"{}\"", s))
    }
}

/// `key:` followed by one `  tag: slug` line per entry, LF-terminated.
/// An entry without a slug is written as a bare `  tag:` line.
pub fn render_block<'e>(
    key: &str,
    entries: impl IntoIterator<Item = (&'e str, Option<&'e str>)>,
) -> String {
    let mut block = format!("{}:\n", key);
    for (tag, slug) in entries {
        match slug {
            Some(slug) => {
                block.push_str(&format!("  {}: {}\n", format_scalar(tag), format_scalar(slug)))
            }
            None => block.push_str(&format!("  {}:\n", format_scalar(tag))),
        }
    }
    block
}
