//! # Formatting Commands
//!
//! Every command is a pure function from (document, selection) to a new
//! (document, selection). Documents are normalized on the way out, so
//! applying a command whose effect is already in place yields an equal
//! document.
//!
//! Commands on a collapsed or whitespace-only selection do nothing, with
//! two exceptions: inserting a link at a caret inserts the URL as linked
//! text, and removing a link at a caret unwraps the link touching it.

use crate::selection::{Point, Selection};
use serde::{Deserialize, Serialize};
use sitebuilder_markup::{Align, Block, BlockKind, Document, Inline, Link, Mark, TextRun};
use std::cmp::Ordering;
use std::fmt;
use std::ops::RangeInclusive;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "camelCase")]
pub enum Command {
    ToggleMark { mark: Mark },
    ToggleBlockType { kind: BlockKind },
    SetAlignment { align: Align },
    InsertLink { url: String },
    RemoveLink,
}

/// Result of applying a command
#[derive(Debug, Clone, PartialEq)]
pub struct CommandOutcome {
    pub document: Document,
    pub selection: Selection,
    pub changed: bool,
}

impl Command {
    pub fn apply(&self, doc: &Document, selection: &Selection) -> CommandOutcome {
        let (document, selection) = match self {
            Command::ToggleMark { mark } => toggle_mark(doc, selection, mark),
            Command::ToggleBlockType { kind } => toggle_block_type(doc, selection, *kind),
            Command::SetAlignment { align } => set_alignment(doc, selection, *align),
            Command::InsertLink { url } => insert_link(doc, selection, url),
            Command::RemoveLink => remove_link(doc, selection),
        };
        let changed = document != *doc;
        debug!(command = %self, changed, "applied command");

        CommandOutcome {
            document,
            selection,
            changed,
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Command::ToggleMark { mark } => write!(f, "toggle {}", mark),
            Command::ToggleBlockType { kind } => write!(f, "toggle {}", kind.name()),
            Command::SetAlignment { align } => write!(f, "align {}", align.as_css()),
            Command::InsertLink { url } => write!(f, "insert link {}", url),
            Command::RemoveLink => write!(f, "remove link"),
        }
    }
}

/// Toggle a mark over the selection, all-or-nothing: remove it when every
/// selected run already carries it, otherwise add it to every selected run.
pub fn toggle_mark(doc: &Document, selection: &Selection, mark: &Mark) -> (Document, Selection) {
    let selection = selection.clamp(doc);
    if !selection.has_text(doc) {
        return (doc.clone(), selection);
    }

    let active = is_mark_active(doc, &selection, mark);
    let mut next = doc.clone();
    for index in selection.block_range() {
        let (start, end) = selection.block_bounds(doc, index);
        if start >= end {
            continue;
        }

        let block = &mut next.blocks[index];
        block.split_at(end);
        block.split_at(start);
        block.for_each_run_mut(|run_start, run| {
            if run.is_empty() || run_start < start || run_start + run.len() > end {
                return;
            }
            if active {
                run.marks.remove(mark);
            } else {
                run.marks.add(mark);
            }
        });
    }

    next.normalize();
    (next, selection)
}

/// Switch every intersected block to `kind`, or back to a paragraph when
/// they all already are `kind`.
pub fn toggle_block_type(doc: &Document, selection: &Selection, kind: BlockKind) -> (Document, Selection) {
    let selection = selection.clamp(doc);
    if !selection.has_text(doc) {
        return (doc.clone(), selection);
    }

    let target = if is_block_active(doc, &selection, kind) {
        BlockKind::Paragraph
    } else {
        kind
    };

    let mut next = doc.clone();
    for block in intersected_blocks(&mut next, selection.covered_blocks(doc)) {
        block.kind = target;
    }
    next.normalize();
    (next, selection)
}

pub fn set_alignment(doc: &Document, selection: &Selection, align: Align) -> (Document, Selection) {
    let selection = selection.clamp(doc);
    if !selection.has_text(doc) {
        return (doc.clone(), selection);
    }

    let mut next = doc.clone();
    for block in intersected_blocks(&mut next, selection.covered_blocks(doc)) {
        block.align = align;
    }
    next.normalize();
    (next, selection)
}

/// Wrap the selection in a link to `url`.
///
/// Links already intersecting the selection are unwrapped first so links
/// never nest. The selection collapses to the end of the linked text. At a
/// caret the URL itself is inserted as the link text.
pub fn insert_link(doc: &Document, selection: &Selection, url: &str) -> (Document, Selection) {
    let selection = selection.clamp(doc);
    let url = url.trim();
    if url.is_empty() {
        debug!("empty link url, nothing to insert");
        return (doc.clone(), selection);
    }

    if selection.is_collapsed() {
        let point = selection.anchor;
        let mut next = doc.clone();
        let block = &mut next.blocks[point.block];
        block.split_inline_at(point.offset);
        let index = block.child_index_at(point.offset);
        block
            .children
            .insert(index, Link::new(url, vec![TextRun::new(url)]).into());
        next.normalize();

        let end = Point::new(point.block, point.offset + url.chars().count());
        return (next, Selection::collapsed(end));
    }

    if !selection.has_text(doc) {
        return (doc.clone(), selection);
    }

    let mut next = doc.clone();
    for index in selection.block_range() {
        let (start, end) = selection.block_bounds(doc, index);
        if start >= end {
            continue;
        }

        let block = &mut next.blocks[index];
        unwrap_links(block, start, end);
        block.split_inline_at(end);
        block.split_inline_at(start);

        let first = block.child_index_at(start);
        let last = block.child_index_at(end);
        let runs: Vec<TextRun> = block
            .children
            .drain(first..last)
            .flat_map(|child| match child {
                Inline::Text(run) => vec![run],
                Inline::Link(link) => link.children,
            })
            .collect();
        block.children.insert(first, Link::new(url, runs).into());
    }

    next.normalize();
    (next, Selection::collapsed(selection.end()))
}

/// Unwrap links intersecting the selection.
///
/// At a caret, a link touching the caret on either side counts as
/// intersecting. A link wrapped across several blocks is stored as one link
/// per block; when the touched link runs up to a block edge, the same-url
/// links continuing it in neighbouring blocks are unwrapped with it.
pub fn remove_link(doc: &Document, selection: &Selection) -> (Document, Selection) {
    let selection = selection.clamp(doc);

    let mut next = doc.clone();
    let mut changed = false;
    if selection.is_collapsed() {
        changed = unwrap_link_chain(&mut next, selection.anchor);
    } else {
        for index in selection.block_range() {
            let (start, end) = selection.block_bounds(doc, index);
            if start >= end {
                continue;
            }
            changed |= unwrap_links(&mut next.blocks[index], start, end);
        }
    }

    if !changed {
        debug!("no link under selection");
        return (doc.clone(), selection);
    }

    next.normalize();
    (next, selection)
}

/// True when every selected run carries `mark`
pub fn is_mark_active(doc: &Document, selection: &Selection, mark: &Mark) -> bool {
    let selection = selection.clamp(doc);
    let mut any = false;

    for index in selection.block_range() {
        let Some(block) = doc.block(index) else {
            continue;
        };
        let (start, end) = selection.block_bounds(doc, index);
        for (run_start, run) in block.runs() {
            let run_end = run_start + run.len();
            if run.is_empty() || run_end <= start || run_start >= end {
                continue;
            }
            if !run.marks.has(mark) {
                return false;
            }
            any = true;
        }
    }

    any
}

/// True when every intersected block is of `kind`
pub fn is_block_active(doc: &Document, selection: &Selection, kind: BlockKind) -> bool {
    let selection = selection.clamp(doc);
    selection
        .covered_blocks(doc)
        .filter_map(|index| doc.block(index))
        .all(|block| block.kind == kind)
}

/// First link intersecting the selection (or touching a caret)
pub fn active_link<'a>(doc: &'a Document, selection: &Selection) -> Option<&'a Link> {
    let selection = selection.clamp(doc);
    let caret = selection.is_collapsed();

    for index in selection.block_range() {
        let block = doc.block(index)?;
        let (start, end) = selection.block_bounds(doc, index);
        for (link_start, child) in block.spans() {
            if let Inline::Link(link) = child {
                if intersects(link_start, link_start + link.len(), start, end, caret) {
                    return Some(link);
                }
            }
        }
    }

    None
}

fn intersects(span_start: usize, span_end: usize, start: usize, end: usize, caret: bool) -> bool {
    if caret {
        span_start <= start && start <= span_end
    } else {
        span_start < end && start < span_end
    }
}

fn intersected_blocks(doc: &mut Document, range: RangeInclusive<usize>) -> impl Iterator<Item = &mut Block> {
    doc.blocks
        .iter_mut()
        .enumerate()
        .filter(move |(index, _)| range.contains(index))
        .map(|(_, block)| block)
}

/// Unwrap the link touching `caret` along with its continuations in the
/// blocks before and after
fn unwrap_link_chain(doc: &mut Document, caret: Point) -> bool {
    let Some(block) = doc.block(caret.block) else {
        return false;
    };
    let touched = block.spans().into_iter().find_map(|(start, child)| match child {
        Inline::Link(link) if intersects(start, start + link.len(), caret.offset, caret.offset, true) => {
            Some((start, start + link.len(), link.url.clone()))
        }
        _ => None,
    });
    let Some((link_start, link_end, url)) = touched else {
        return false;
    };

    let mut first = caret.block;
    let mut reaches_start = link_start == 0;
    while reaches_start && first > 0 {
        match trailing_link(&doc.blocks[first - 1], &url) {
            Some(start) => {
                first -= 1;
                reaches_start = start == 0;
            }
            None => break,
        }
    }

    let mut last = caret.block;
    let mut reaches_end = link_end == block.len();
    while reaches_end && last + 1 < doc.blocks.len() {
        let next = &doc.blocks[last + 1];
        match leading_link(next, &url) {
            Some(end) => {
                last += 1;
                reaches_end = end == next.len();
            }
            None => break,
        }
    }

    for index in first..=last {
        let block = &mut doc.blocks[index];
        let at = match index.cmp(&caret.block) {
            Ordering::Less => block.len(),
            Ordering::Equal => caret.offset,
            Ordering::Greater => 0,
        };
        unwrap_links(block, at, at);
    }
    true
}

/// Start of the block's last child when it is a link to `url`
fn trailing_link(block: &Block, url: &str) -> Option<usize> {
    match block.spans().last() {
        Some((start, Inline::Link(link))) if link.url == url => Some(*start),
        _ => None,
    }
}

/// End of the block's first child when it is a link to `url`
fn leading_link(block: &Block, url: &str) -> Option<usize> {
    match block.spans().first() {
        Some((start, Inline::Link(link))) if link.url == url => Some(start + link.len()),
        _ => None,
    }
}

/// Replace links intersecting `start..end` with their runs
fn unwrap_links(block: &mut Block, start: usize, end: usize) -> bool {
    let caret = start == end;
    let mut offset = 0;
    let mut changed = false;
    let mut children = Vec::with_capacity(block.children.len());

    for child in block.children.drain(..) {
        let span_start = offset;
        offset += child.len();
        match child {
            Inline::Link(link) if intersects(span_start, offset, start, end, caret) => {
                changed = true;
                children.extend(link.children.into_iter().map(Inline::Text));
            }
            other => children.push(other),
        }
    }

    block.children = children;
    changed
}
