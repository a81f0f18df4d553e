//! # Document Model
//!
//! In-memory tree for one editable rich-text region.
//!
//! ```text
//! Document
//!   └─ Block (paragraph | heading-1 | heading-2 | quote, align)
//!        ├─ Text run (text + marks)
//!        └─ Link (url)
//!             └─ Text run (text + marks)
//! ```
//!
//! All addressing is by `char` offset within a block. A link only ever holds
//! text runs, so links cannot nest.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Block-level element type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum BlockKind {
    #[default]
    #[serde(rename = "paragraph")]
    Paragraph,
    #[serde(rename = "heading-1")]
    Heading1,
    #[serde(rename = "heading-2")]
    Heading2,
    #[serde(rename = "quote")]
    Quote,
}

impl BlockKind {
    /// HTML tag used by the field encoding
    pub fn tag(self) -> &'static str {
        match self {
            BlockKind::Paragraph => "p",
            BlockKind::Heading1 => "h1",
            BlockKind::Heading2 => "h2",
            BlockKind::Quote => "blockquote",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "p" => Some(BlockKind::Paragraph),
            "h1" => Some(BlockKind::Heading1),
            "h2" => Some(BlockKind::Heading2),
            "blockquote" => Some(BlockKind::Quote),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            BlockKind::Paragraph => "paragraph",
            BlockKind::Heading1 => "heading-1",
            BlockKind::Heading2 => "heading-2",
            BlockKind::Quote => "quote",
        }
    }
}

impl FromStr for BlockKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "paragraph" | "p" => Ok(BlockKind::Paragraph),
            "heading-1" | "h1" => Ok(BlockKind::Heading1),
            "heading-2" | "h2" => Ok(BlockKind::Heading2),
            "quote" | "blockquote" => Ok(BlockKind::Quote),
            other => Err(format!("unknown block kind '{}'", other)),
        }
    }
}

/// Horizontal alignment of a block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Align {
    #[default]
    Left,
    Center,
    Right,
}

impl Align {
    pub fn as_css(self) -> &'static str {
        match self {
            Align::Left => "left",
            Align::Center => "center",
            Align::Right => "right",
        }
    }
}

impl FromStr for Align {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "left" | "start" => Ok(Align::Left),
            "center" => Ok(Align::Center),
            "right" | "end" => Ok(Align::Right),
            other => Err(format!("unknown alignment '{}'", other)),
        }
    }
}

/// A single inline formatting attribute
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mark {
    Bold,
    Italic,
    Underline,
    Code,
    Color(String),
}

impl fmt::Display for Mark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mark::Bold => write!(f, "bold"),
            Mark::Italic => write!(f, "italic"),
            Mark::Underline => write!(f, "underline"),
            Mark::Code => write!(f, "code"),
            Mark::Color(value) => write!(f, "color:{}", value),
        }
    }
}

impl FromStr for Mark {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "bold" => Ok(Mark::Bold),
            "italic" => Ok(Mark::Italic),
            "underline" => Ok(Mark::Underline),
            "code" => Ok(Mark::Code),
            _ => match s.strip_prefix("color:").or_else(|| s.strip_prefix("color=")) {
                Some(value) if !value.trim().is_empty() => Ok(Mark::Color(value.trim().to_string())),
                _ => Err(format!("unknown mark '{}'", s)),
            },
        }
    }
}

/// Set of marks carried by a text run. Marks are independent of each other.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Marks {
    #[serde(default, skip_serializing_if = "is_false")]
    pub bold: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub italic: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub underline: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub code: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

fn is_false(value: &bool) -> bool {
    !*value
}

impl Marks {
    pub fn has(&self, mark: &Mark) -> bool {
        match mark {
            Mark::Bold => self.bold,
            Mark::Italic => self.italic,
            Mark::Underline => self.underline,
            Mark::Code => self.code,
            Mark::Color(value) => self.color.as_deref() == Some(value.as_str()),
        }
    }

    /// Add a mark. A color replaces any previous color.
    pub fn add(&mut self, mark: &Mark) {
        match mark {
            Mark::Bold => self.bold = true,
            Mark::Italic => self.italic = true,
            Mark::Underline => self.underline = true,
            Mark::Code => self.code = true,
            Mark::Color(value) => self.color = Some(value.clone()),
        }
    }

    pub fn remove(&mut self, mark: &Mark) {
        match mark {
            Mark::Bold => self.bold = false,
            Mark::Italic => self.italic = false,
            Mark::Underline => self.underline = false,
            Mark::Code => self.code = false,
            Mark::Color(value) => {
                if self.color.as_deref() == Some(value.as_str()) {
                    self.color = None;
                }
            }
        }
    }

    pub fn is_plain(&self) -> bool {
        *self == Marks::default()
    }

    pub fn with(mut self, mark: Mark) -> Self {
        self.add(&mark);
        self
    }
}

/// Leaf text with marks
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TextRun {
    pub text: String,
    #[serde(default, skip_serializing_if = "Marks::is_plain")]
    pub marks: Marks,
}

impl TextRun {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            marks: Marks::default(),
        }
    }

    pub fn styled(text: impl Into<String>, marks: Marks) -> Self {
        Self {
            text: text.into(),
            marks,
        }
    }

    /// Length in chars
    pub fn len(&self) -> usize {
        self.text.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Split at a char offset, keeping the head in `self` and returning the tail.
    pub fn split_off(&mut self, offset: usize) -> TextRun {
        let byte = byte_index(&self.text, offset);
        TextRun {
            text: self.text.split_off(byte),
            marks: self.marks.clone(),
        }
    }
}

/// Inline hyperlink wrapping one or more text runs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub url: String,
    pub children: Vec<TextRun>,
}

impl Link {
    pub fn new(url: impl Into<String>, children: Vec<TextRun>) -> Self {
        Self {
            url: url.into(),
            children,
        }
    }

    pub fn len(&self) -> usize {
        self.children.iter().map(TextRun::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.children.iter().all(TextRun::is_empty)
    }

    pub fn text(&self) -> String {
        self.children.iter().map(|run| run.text.as_str()).collect()
    }

    /// Ensure a run boundary exists at `offset` (relative to the link start)
    fn split_runs_at(&mut self, offset: usize) {
        let mut start = 0;
        for i in 0..self.children.len() {
            let len = self.children[i].len();
            if offset > start && offset < start + len {
                let tail = self.children[i].split_off(offset - start);
                self.children.insert(i + 1, tail);
                return;
            }
            start += len;
        }
    }

    /// Split into two links at `offset`. The head stays in `self`.
    fn split_off(&mut self, offset: usize) -> Link {
        self.split_runs_at(offset);
        let mut start = 0;
        let mut index = self.children.len();
        for (i, run) in self.children.iter().enumerate() {
            if start >= offset {
                index = i;
                break;
            }
            start += run.len();
        }
        Link {
            url: self.url.clone(),
            children: self.children.split_off(index),
        }
    }

    fn normalize(&mut self) {
        let mut merged: Vec<TextRun> = Vec::with_capacity(self.children.len());
        for run in self.children.drain(..) {
            if run.is_empty() {
                continue;
            }
            match merged.last_mut() {
                Some(prev) if prev.marks == run.marks => prev.text.push_str(&run.text),
                _ => merged.push(run),
            }
        }
        self.children = merged;
    }
}

/// Inline node inside a block
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Inline {
    Text(TextRun),
    Link(Link),
}

impl Inline {
    pub fn len(&self) -> usize {
        match self {
            Inline::Text(run) => run.len(),
            Inline::Link(link) => link.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn text(&self) -> String {
        match self {
            Inline::Text(run) => run.text.clone(),
            Inline::Link(link) => link.text(),
        }
    }
}

impl From<TextRun> for Inline {
    fn from(run: TextRun) -> Self {
        Inline::Text(run)
    }
}

impl From<Link> for Inline {
    fn from(link: Link) -> Self {
        Inline::Link(link)
    }
}

/// Block-level container of inline nodes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub kind: BlockKind,
    #[serde(default)]
    pub align: Align,
    pub children: Vec<Inline>,
}

impl Block {
    pub fn new(kind: BlockKind, children: Vec<Inline>) -> Self {
        let mut block = Self {
            kind,
            align: Align::Left,
            children,
        };
        block.normalize();
        block
    }

    pub fn paragraph(text: impl Into<String>) -> Self {
        Self::new(BlockKind::Paragraph, vec![Inline::Text(TextRun::new(text))])
    }

    pub fn with_align(mut self, align: Align) -> Self {
        self.align = align;
        self
    }

    pub fn len(&self) -> usize {
        self.children.iter().map(Inline::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn text(&self) -> String {
        self.children.iter().map(Inline::text).collect()
    }

    /// Text between two char offsets (clamped to the block)
    pub fn slice_text(&self, start: usize, end: usize) -> String {
        let end = end.min(self.len());
        if start >= end {
            return String::new();
        }
        self.text().chars().skip(start).take(end - start).collect()
    }

    /// Ensure a run boundary exists at `offset`. Links are split internally
    /// (their runs), never into two links.
    pub fn split_at(&mut self, offset: usize) {
        let mut start = 0;
        for i in 0..self.children.len() {
            let len = self.children[i].len();
            if offset > start && offset < start + len {
                match &mut self.children[i] {
                    Inline::Text(run) => {
                        let tail = run.split_off(offset - start);
                        self.children.insert(i + 1, Inline::Text(tail));
                    }
                    Inline::Link(link) => link.split_runs_at(offset - start),
                }
                return;
            }
            start += len;
        }
    }

    /// Ensure an inline boundary exists at `offset`, splitting a link into
    /// two links if the offset falls strictly inside one.
    pub fn split_inline_at(&mut self, offset: usize) {
        let mut start = 0;
        for i in 0..self.children.len() {
            let len = self.children[i].len();
            if offset > start && offset < start + len {
                let tail = match &mut self.children[i] {
                    Inline::Text(run) => Inline::Text(run.split_off(offset - start)),
                    Inline::Link(link) => Inline::Link(link.split_off(offset - start)),
                };
                self.children.insert(i + 1, tail);
                return;
            }
            start += len;
        }
    }

    /// Index of the first child starting at or after `offset`
    pub fn child_index_at(&self, offset: usize) -> usize {
        let mut start = 0;
        for (i, child) in self.children.iter().enumerate() {
            if start >= offset {
                return i;
            }
            start += child.len();
        }
        self.children.len()
    }

    /// Children with their starting char offset
    pub fn spans(&self) -> Vec<(usize, &Inline)> {
        let mut start = 0;
        self.children
            .iter()
            .map(|child| {
                let span = (start, child);
                start += child.len();
                span
            })
            .collect()
    }

    /// Visit every text run, including runs inside links, with its start offset
    pub fn for_each_run_mut(&mut self, mut f: impl FnMut(usize, &mut TextRun)) {
        let mut start = 0;
        for child in &mut self.children {
            match child {
                Inline::Text(run) => {
                    let len = run.len();
                    f(start, run);
                    start += len;
                }
                Inline::Link(link) => {
                    for run in &mut link.children {
                        let len = run.len();
                        f(start, run);
                        start += len;
                    }
                }
            }
        }
    }

    /// Every text run with its start offset
    pub fn runs(&self) -> Vec<(usize, &TextRun)> {
        let mut start = 0;
        let mut runs = Vec::new();
        for child in &self.children {
            let leaves: Vec<&TextRun> = match child {
                Inline::Text(run) => vec![run],
                Inline::Link(link) => link.children.iter().collect(),
            };
            for run in leaves {
                runs.push((start, run));
                start += run.len();
            }
        }
        runs
    }

    /// Merge adjacent runs with equal marks, drop empty runs and links, and
    /// keep at least one (possibly empty) run.
    pub fn normalize(&mut self) {
        let mut merged: Vec<Inline> = Vec::with_capacity(self.children.len());
        for child in self.children.drain(..) {
            match child {
                Inline::Text(run) => {
                    if run.is_empty() {
                        continue;
                    }
                    match merged.last_mut() {
                        Some(Inline::Text(prev)) if prev.marks == run.marks => {
                            prev.text.push_str(&run.text)
                        }
                        _ => merged.push(Inline::Text(run)),
                    }
                }
                Inline::Link(mut link) => {
                    link.normalize();
                    if !link.is_empty() {
                        merged.push(Inline::Link(link));
                    }
                }
            }
        }
        if merged.is_empty() {
            merged.push(Inline::Text(TextRun::default()));
        }
        self.children = merged;
    }
}

impl Default for Block {
    fn default() -> Self {
        Self::paragraph("")
    }
}

/// Root of one editable region's content
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub blocks: Vec<Block>,
}

impl Document {
    pub fn new(blocks: Vec<Block>) -> Self {
        let mut doc = Self { blocks };
        doc.normalize();
        doc
    }

    /// Single plain paragraph
    pub fn from_plain_text(text: impl Into<String>) -> Self {
        Self::new(vec![Block::paragraph(text)])
    }

    pub fn block(&self, index: usize) -> Option<&Block> {
        self.blocks.get(index)
    }

    pub fn normalize(&mut self) {
        for block in &mut self.blocks {
            block.normalize();
        }
        if self.blocks.is_empty() {
            self.blocks.push(Block::default());
        }
    }

    /// Plain text of every block, joined by newlines
    pub fn to_plain_text(&self) -> String {
        self.blocks
            .iter()
            .map(Block::text)
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// True when the document carries no structure beyond plain text
    pub fn is_plain(&self) -> bool {
        match self.blocks.as_slice() {
            [block] => {
                block.kind == BlockKind::Paragraph
                    && block.align == Align::Left
                    && block
                        .children
                        .iter()
                        .all(|child| matches!(child, Inline::Text(run) if run.marks.is_plain()))
            }
            _ => false,
        }
    }

    pub fn link_count(&self) -> usize {
        self.blocks
            .iter()
            .flat_map(|block| block.children.iter())
            .filter(|child| matches!(child, Inline::Link(_)))
            .count()
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new(vec![])
    }
}

/// Byte index of the char at `offset`, or the string length past the end
pub fn byte_index(text: &str, offset: usize) -> usize {
    text.char_indices()
        .nth(offset)
        .map(|(byte, _)| byte)
        .unwrap_or(text.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_always_has_a_block() {
        let doc = Document::new(vec![]);
        assert_eq!(doc.blocks.len(), 1);
        assert_eq!(doc.blocks[0].children, vec![Inline::Text(TextRun::default())]);
    }

    #[test]
    fn test_normalize_merges_equal_runs() {
        let bold = Marks::default().with(Mark::Bold);
        let block = Block::new(
            BlockKind::Paragraph,
            vec![
                TextRun::styled("He", bold.clone()).into(),
                TextRun::styled("llo", bold.clone()).into(),
                TextRun::new("").into(),
                TextRun::new(" world").into(),
            ],
        );

        assert_eq!(block.children.len(), 2);
        assert_eq!(block.children[0], Inline::Text(TextRun::styled("Hello", bold)));
    }

    #[test]
    fn test_normalize_drops_empty_links() {
        let block = Block::new(
            BlockKind::Paragraph,
            vec![Link::new("https://a.test", vec![TextRun::new("")]).into()],
        );
        assert_eq!(block.children, vec![Inline::Text(TextRun::default())]);
    }

    #[test]
    fn test_split_at_multibyte_offset() {
        let mut block = Block::paragraph("héllo wörld");
        block.split_at(3);
        assert_eq!(block.children.len(), 2);
        assert_eq!(block.children[0].text(), "hél");
        assert_eq!(block.children[1].text(), "lo wörld");
    }

    #[test]
    fn test_split_inline_at_splits_links() {
        let mut block = Block::new(
            BlockKind::Paragraph,
            vec![Link::new("https://a.test", vec![TextRun::new("abcd")]).into()],
        );
        block.split_inline_at(2);
        assert_eq!(block.children.len(), 2);
        assert!(matches!(&block.children[1], Inline::Link(link) if link.text() == "cd"));
    }

    #[test]
    fn test_runs_include_link_children() {
        let block = Block::new(
            BlockKind::Paragraph,
            vec![
                TextRun::new("go ").into(),
                Link::new("https://a.test", vec![TextRun::new("here")]).into(),
            ],
        );
        let runs = block.runs();
        assert_eq!(runs.len(), 2);
        assert_eq!(runs[1].0, 3);
        assert_eq!(block.slice_text(1, 5), "o he");
    }

    #[test]
    fn test_mark_parsing() {
        assert_eq!("bold".parse::<Mark>(), Ok(Mark::Bold));
        assert_eq!("color:#ff0000".parse::<Mark>(), Ok(Mark::Color("#ff0000".into())));
        assert!("sparkle".parse::<Mark>().is_err());
    }

    #[test]
    fn test_color_replaces_color() {
        let mut marks = Marks::default().with(Mark::Color("red".into()));
        marks.add(&Mark::Color("blue".into()));
        assert!(marks.has(&Mark::Color("blue".into())));
        marks.remove(&Mark::Color("red".into()));
        assert_eq!(marks.color.as_deref(), Some("blue"));
    }

    #[test]
    fn test_document_serde_shape() {
        let doc = Document::from_plain_text("Hi");
        let json = serde_json::to_value(&doc).unwrap();
        assert_eq!(json["blocks"][0]["kind"], "paragraph");
        assert_eq!(json["blocks"][0]["children"][0]["type"], "text");
    }
}
