//! Grid geometry: rows and columns with spans, weights and minimum sizes.
//!
//! Track sizes start at their `minsize`, grow to fit single-cell requests, then
//! grow again so every multi-cell span fits. Spare space goes to weighted
//! tracks; a shortfall clips tracks in order.

use bitflags::bitflags;

use crate::error::Result;
use crate::geometry::{Insets, Rect, Size};

use super::manager::{collapsed, invalid_span, ChildInput, LayoutOptions};
use super::pack::share_by_weight;

bitflags! {
    /// Cell edges a child sticks to. Opposite edges together stretch the child.
    #[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
    pub struct Sticky: u8 {
        const N = 0b0001;
        const E = 0b0010;
        const S = 0b0100;
        const W = 0b1000;
    }
}

impl Default for Sticky {
    fn default() -> Self {
        Sticky::all()
    }
}

impl Sticky {
    /// Parse a compass string such as `"nsew"` or `"we"`. Empty means none.
    pub fn parse(s: &str) -> Option<Sticky> {
        let mut sticky = Sticky::empty();
        for c in s.chars() {
            sticky |= match c.to_ascii_lowercase() {
                'n' => Sticky::N,
                'e' => Sticky::E,
                's' => Sticky::S,
                'w' => Sticky::W,
                _ => return None,
            };
        }
        Some(sticky)
    }

    /// Offset and length of a child of `want` inside a cell span.
    fn place(start: i32, len: i32, want: i32, near: bool, far: bool) -> (i32, i32) {
        match (near, far) {
            (true, true) => (start, len),
            (true, false) => (start, want.min(len)),
            (false, true) => {
                let w = want.min(len);
                (start + len - w, w)
            }
            (false, false) => {
                let w = want.min(len);
                (start + (len - w) / 2, w)
            }
        }
    }
}

/// One row or column.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Track {
    /// Share of spare space; zero tracks never grow past their content.
    pub weight: u32,
    pub minsize: i32,
}

/// Per-child grid options.
#[derive(Clone, Debug, PartialEq)]
pub struct GridOptions {
    pub row: usize,
    pub column: usize,
    pub rowspan: usize,
    pub columnspan: usize,
    pub sticky: Sticky,
    pub padx: i32,
    pub pady: i32,
}

impl Default for GridOptions {
    fn default() -> Self {
        Self {
            row: 0,
            column: 0,
            rowspan: 1,
            columnspan: 1,
            sticky: Sticky::default(),
            padx: 0,
            pady: 0,
        }
    }
}

impl GridOptions {
    /// Single cell at (`row`, `column`).
    pub fn at(row: usize, column: usize) -> Self {
        Self {
            row,
            column,
            ..Self::default()
        }
    }

    pub fn span(mut self, rowspan: usize, columnspan: usize) -> Self {
        self.rowspan = rowspan;
        self.columnspan = columnspan;
        self
    }

    pub fn sticky(mut self, sticky: Sticky) -> Self {
        self.sticky = sticky;
        self
    }

    pub fn pad(mut self, padx: i32, pady: i32) -> Self {
        self.padx = padx.max(0);
        self.pady = pady.max(0);
        self
    }

    fn need(&self, requested: Size) -> Size {
        requested.expand(Insets::symmetric(self.padx, self.pady))
    }
}

/// Grid manager with declared bounds.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GridManager {
    rows: Vec<Track>,
    columns: Vec<Track>,
}

/// (first track, span, needed length) for one child on one axis.
type Cell = (usize, usize, i32);

impl GridManager {
    /// A grid of `rows` x `columns` unweighted tracks.
    pub fn new(rows: usize, columns: usize) -> Self {
        Self {
            rows: vec![Track::default(); rows],
            columns: vec![Track::default(); columns],
        }
    }

    /// Configure row `index`, growing the grid if needed.
    pub fn row(mut self, index: usize, weight: u32, minsize: i32) -> Self {
        if index >= self.rows.len() {
            self.rows.resize(index + 1, Track::default());
        }
        self.rows[index] = Track { weight, minsize: minsize.max(0) };
        self
    }

    /// Configure column `index`, growing the grid if needed.
    pub fn column(mut self, index: usize, weight: u32, minsize: i32) -> Self {
        if index >= self.columns.len() {
            self.columns.resize(index + 1, Track::default());
        }
        self.columns[index] = Track { weight, minsize: minsize.max(0) };
        self
    }

    pub fn rows(&self) -> &[Track] {
        &self.rows
    }

    pub fn columns(&self) -> &[Track] {
        &self.columns
    }

    fn span_fits(&self, o: &GridOptions) -> bool {
        o.rowspan >= 1
            && o.columnspan >= 1
            && o.row.checked_add(o.rowspan).is_some_and(|end| end <= self.rows.len())
            && o.column.checked_add(o.columnspan).is_some_and(|end| end <= self.columns.len())
    }

    /// Fail with `InvalidSpan` if `o` reaches past the declared bounds.
    pub fn check_span(&self, o: &GridOptions) -> Result<()> {
        if self.span_fits(o) {
            Ok(())
        } else {
            Err(invalid_span(o, self.rows.len(), self.columns.len()))
        }
    }

    fn placed<'a>(&self, children: &'a [ChildInput]) -> Vec<(usize, GridOptions, &'a ChildInput)> {
        children
            .iter()
            .enumerate()
            .filter(|(_, c)| c.visible)
            .map(|(i, c)| {
                let o = match &c.options {
                    LayoutOptions::Grid(o) => o.clone(),
                    _ => GridOptions::default(),
                };
                (i, o, c)
            })
            .filter(|(_, o, _)| self.span_fits(o))
            .collect()
    }

    fn natural(&self, children: &[ChildInput]) -> (Vec<i32>, Vec<i32>) {
        let placed = self.placed(children);
        let row_cells: Vec<Cell> = placed
            .iter()
            .map(|(_, o, c)| (o.row, o.rowspan, o.need(c.requested).height))
            .collect();
        let col_cells: Vec<Cell> = placed
            .iter()
            .map(|(_, o, c)| (o.column, o.columnspan, o.need(c.requested).width))
            .collect();
        (
            natural_sizes(&self.rows, &row_cells),
            natural_sizes(&self.columns, &col_cells),
        )
    }

    /// Arrange children inside `area`.
    pub fn arrange(&self, area: Rect, children: &[ChildInput]) -> Vec<Rect> {
        let (rows, cols) = self.natural(children);
        let rows = fit(rows, &self.rows, area.height);
        let cols = fit(cols, &self.columns, area.width);
        let row_at = offsets(&rows, area.y);
        let col_at = offsets(&cols, area.x);

        let mut rects = vec![collapsed(area); children.len()];
        for (i, o, child) in self.placed(children) {
            let cell = Rect::new(
                col_at[o.column],
                row_at[o.row],
                total(&cols[o.column..o.column + o.columnspan]),
                total(&rows[o.row..o.row + o.rowspan]),
            );
            let inner = cell.inset(Insets::symmetric(o.padx, o.pady));
            let s = o.sticky;
            let (x, w) = Sticky::place(
                inner.x,
                inner.width,
                child.requested.width,
                s.contains(Sticky::W),
                s.contains(Sticky::E),
            );
            let (y, h) = Sticky::place(
                inner.y,
                inner.height,
                child.requested.height,
                s.contains(Sticky::N),
                s.contains(Sticky::S),
            );
            rects[i] = Rect::new(x, y, w, h);
        }
        rects
    }

    /// Sum of natural track sizes.
    pub fn measure(&self, children: &[ChildInput]) -> Size {
        let (rows, cols) = self.natural(children);
        Size::new(total(&cols), total(&rows))
    }
}

fn total(sizes: &[i32]) -> i32 {
    sizes.iter().fold(0i32, |sum, &s| sum.saturating_add(s))
}

/// Track sizes that satisfy every minsize and every cell request.
fn natural_sizes(tracks: &[Track], cells: &[Cell]) -> Vec<i32> {
    let mut sizes: Vec<i32> = tracks.iter().map(|t| t.minsize.max(0)).collect();
    for &(start, _, need) in cells.iter().filter(|c| c.1 == 1) {
        sizes[start] = sizes[start].max(need);
    }
    let mut spans: Vec<&Cell> = cells.iter().filter(|c| c.1 > 1).collect();
    spans.sort_by_key(|c| c.1);
    for &&(start, span, need) in &spans {
        let range = start..start + span;
        let have = total(&sizes[range.clone()]);
        if need > have {
            let weights: Vec<u32> = tracks[range.clone()].iter().map(|t| t.weight).collect();
            for (size, add) in sizes[range].iter_mut().zip(share_by_weight(need - have, &weights)) {
                *size = size.saturating_add(add);
            }
        }
    }
    sizes
}

/// Fit natural sizes into `available`: grow weighted tracks or clip in order.
fn fit(mut sizes: Vec<i32>, tracks: &[Track], available: i32) -> Vec<i32> {
    let natural = total(&sizes);
    if available > natural {
        if tracks.iter().any(|t| t.weight > 0) {
            let weights: Vec<u32> = tracks.iter().map(|t| t.weight).collect();
            for (size, add) in sizes.iter_mut().zip(share_by_weight(available - natural, &weights)) {
                *size = size.saturating_add(add);
            }
        }
    } else {
        let mut remaining = available.max(0);
        for size in &mut sizes {
            *size = (*size).min(remaining);
            remaining -= *size;
        }
    }
    sizes
}

fn offsets(sizes: &[i32], start: i32) -> Vec<i32> {
    sizes
        .iter()
        .scan(start, |at, &s| {
            let here = *at;
            *at = at.saturating_add(s);
            Some(here)
        })
        .collect()
}

// ===========================================================================
// Tests
// ===========================================================================
