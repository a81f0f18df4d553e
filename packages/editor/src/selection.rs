//! # Selection Tracking
//!
//! Selections are addressed by (block, char offset) points inside a
//! Document. The host page (browser DOM, test harness, CLI) is reached only
//! through [`HostSurface`]; the tracker asks it for the live selection and
//! its geometry and derives whether the floating toolbar should show and
//! where.

use crate::config::ToolbarMetrics;
use serde::{Deserialize, Serialize};
use sitebuilder_markup::Document;
use std::ops::RangeInclusive;
use tracing::debug;

/// Position inside a document
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct Point {
    pub block: usize,
    pub offset: usize,
}

impl Point {
    pub fn new(block: usize, offset: usize) -> Self {
        Self { block, offset }
    }
}

/// Anchor/focus pair. The focus may come before the anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Selection {
    pub anchor: Point,
    pub focus: Point,
}

impl Selection {
    pub fn new(anchor: Point, focus: Point) -> Self {
        Self { anchor, focus }
    }

    pub fn collapsed(point: Point) -> Self {
        Self::new(point, point)
    }

    /// Range inside one block
    pub fn within(block: usize, start: usize, end: usize) -> Self {
        Self::new(Point::new(block, start), Point::new(block, end))
    }

    pub fn is_collapsed(&self) -> bool {
        self.anchor == self.focus
    }

    pub fn start(&self) -> Point {
        self.anchor.min(self.focus)
    }

    pub fn end(&self) -> Point {
        self.anchor.max(self.focus)
    }

    pub fn block_range(&self) -> RangeInclusive<usize> {
        self.start().block..=self.end().block
    }

    /// Pull both points inside the document
    pub fn clamp(&self, doc: &Document) -> Selection {
        let clamp_point = |point: Point| {
            let block = point.block.min(doc.blocks.len().saturating_sub(1));
            let len = doc.block(block).map(|b| b.len()).unwrap_or(0);
            Point::new(block, point.offset.min(len))
        };
        Selection::new(clamp_point(self.anchor), clamp_point(self.focus))
    }

    /// Blocks the selection actually covers. An end resting at offset 0 of
    /// the next block, or a start at the very end of its block, selects
    /// nothing there and does not count.
    pub fn covered_blocks(&self, doc: &Document) -> RangeInclusive<usize> {
        let (start, end) = (self.start(), self.end());
        let mut first = start.block;
        let mut last = end.block;

        if last > first && end.offset == 0 {
            last -= 1;
        }
        if last > first && doc.block(first).map_or(false, |b| start.offset >= b.len()) {
            first += 1;
        }
        first..=last
    }

    /// Char bounds of the selection inside one of its blocks
    pub fn block_bounds(&self, doc: &Document, index: usize) -> (usize, usize) {
        let (start, end) = (self.start(), self.end());
        let len = doc.block(index).map(|b| b.len()).unwrap_or(0);
        let from = if index == start.block { start.offset } else { 0 };
        let to = if index == end.block { end.offset } else { len };
        (from.min(len), to.min(len))
    }

    /// Selected text, blocks joined by newlines
    pub fn text(&self, doc: &Document) -> String {
        self.block_range()
            .filter_map(|index| {
                let block = doc.block(index)?;
                let (from, to) = self.block_bounds(doc, index);
                Some(block.slice_text(from, to))
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Non-collapsed and covering at least one non-whitespace character
    pub fn has_text(&self, doc: &Document) -> bool {
        !self.is_collapsed() && !self.text(doc).trim().is_empty()
    }
}

/// Rectangle in the host's coordinate space
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    /// Hosts report 0x0 rects for selections they cannot measure
    pub fn is_empty(&self) -> bool {
        self.width == 0.0 && self.height == 0.0
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn center_x(&self) -> f32 {
        self.x + self.width / 2.0
    }
}

/// Selection as the host reports it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RangeOffsets {
    pub block: usize,
    pub start: usize,
    pub end: usize,
    /// Block holding `end` when the range spans blocks
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_block: Option<usize>,
}

impl RangeOffsets {
    pub fn to_selection(self) -> Selection {
        Selection::new(
            Point::new(self.block, self.start),
            Point::new(self.end_block.unwrap_or(self.block), self.end),
        )
    }
}

/// What the editor needs from the page hosting an editable region
pub trait HostSurface {
    /// Bounding rect of the live selection
    fn selection_rect(&self) -> Option<Rect>;

    /// Live selection in document offsets, `None` if the host has none
    fn focused_range_offsets(&self) -> Option<RangeOffsets>;

    /// Bounding rect of the editable region itself
    fn region_rect(&self) -> Option<Rect>;

    fn has_focus(&self) -> bool;
}

/// Host with fixed answers, for tests and headless drivers
#[derive(Debug, Clone, Default)]
pub struct StaticHost {
    pub selection_rect: Option<Rect>,
    pub range: Option<RangeOffsets>,
    pub region_rect: Option<Rect>,
    pub focused: bool,
}

impl StaticHost {
    /// Focused host selecting `start..end` of one block
    pub fn selecting(block: usize, start: usize, end: usize) -> Self {
        Self {
            selection_rect: Some(Rect::new(100.0, 200.0, 80.0, 20.0)),
            range: Some(RangeOffsets {
                block,
                start,
                end,
                end_block: None,
            }),
            region_rect: Some(Rect::new(0.0, 0.0, 800.0, 600.0)),
            focused: true,
        }
    }
}

impl HostSurface for StaticHost {
    fn selection_rect(&self) -> Option<Rect> {
        self.selection_rect
    }

    fn focused_range_offsets(&self) -> Option<RangeOffsets> {
        self.range
    }

    fn region_rect(&self) -> Option<Rect> {
        self.region_rect
    }

    fn has_focus(&self) -> bool {
        self.focused
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Placement {
    Above,
    Below,
}

/// Top-left corner of the floating toolbar
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ToolbarPosition {
    pub x: f32,
    pub y: f32,
    pub placement: Placement,
}

/// Result of one tracker refresh
#[derive(Debug, Clone, PartialEq)]
pub struct TrackerUpdate {
    pub visible: bool,
    pub position: Option<ToolbarPosition>,
    pub selection: Selection,
    /// Blocks the selection intersects
    pub blocks: RangeInclusive<usize>,
}

/// Follows the host selection for one editable region
#[derive(Debug, Clone)]
pub struct SelectionTracker {
    metrics: ToolbarMetrics,
    visible: bool,
    position: Option<ToolbarPosition>,
    selection: Selection,
}

impl SelectionTracker {
    pub fn new(metrics: ToolbarMetrics) -> Self {
        Self {
            metrics,
            visible: false,
            position: None,
            selection: Selection::default(),
        }
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn position(&self) -> Option<ToolbarPosition> {
        self.position
    }

    pub fn selection(&self) -> Selection {
        self.selection
    }

    /// Re-read the host selection.
    ///
    /// Returns `None` and leaves state untouched when the host reports no
    /// selection at all. A 0x0 selection rect keeps the previous position.
    pub fn refresh(&mut self, doc: &Document, host: &dyn HostSurface) -> Option<TrackerUpdate> {
        let Some(offsets) = host.focused_range_offsets() else {
            debug!("host has no selection, skipping tracker update");
            return None;
        };

        let selection = offsets.to_selection().clamp(doc);
        self.selection = selection;
        self.visible = host.has_focus() && selection.has_text(doc);

        match (host.selection_rect(), host.region_rect()) {
            (Some(rect), Some(region)) if !rect.is_empty() => {
                self.position = Some(place_toolbar(&self.metrics, rect, region));
            }
            _ => debug!("selection geometry unavailable, keeping toolbar position"),
        }

        Some(TrackerUpdate {
            visible: self.visible,
            position: self.position,
            selection,
            blocks: selection.covered_blocks(doc),
        })
    }

    /// Forget the selection, e.g. on blur
    pub fn reset(&mut self) {
        self.visible = false;
        self.selection = Selection::default();
    }
}

/// Center the toolbar over the selection, clamped to the region. Prefer
/// above the selection; drop below when above would leave the region, and
/// pin to the region's bottom edge when below does too.
///
/// A region smaller than the toolbar pins it to the region's top-left
/// corner; the overflow then runs right and down.
pub fn place_toolbar(metrics: &ToolbarMetrics, selection: Rect, region: Rect) -> ToolbarPosition {
    let min_x = region.x + metrics.margin;
    let max_x = (region.right() - metrics.margin - metrics.width).max(min_x);
    let x = (selection.center_x() - metrics.width / 2.0).clamp(min_x, max_x);
    let max_y = (region.bottom() - metrics.height).max(region.y);

    let above = selection.y - metrics.offset - metrics.height;
    if above >= region.y {
        ToolbarPosition {
            x,
            y: above,
            placement: Placement::Above,
        }
    } else {
        ToolbarPosition {
            x,
            y: (selection.bottom() + metrics.offset).min(max_y),
            placement: Placement::Below,
        }
    }
}
