//! Geometric table reconstruction
//!
//! Grid lines are collected per direction from the configured strategy,
//! snapped and joined, and intersected. Cells are the smallest rectangles
//! whose four corners are intersections connected by grid lines, and tables
//! are groups of cells that share corners.

use std::collections::{BTreeSet, HashMap};

use nics_core::{BBox, Strategy, TableGrid, TableSettings};
use tracing::trace;

use crate::geometry::{Char, Edge, Orientation};
use crate::text::{cluster_rows, cluster_values, extract_text, extract_words, Word};

/// Words a column of aligned text needs before it counts as a grid line.
const MIN_WORDS_VERTICAL: usize = 3;

/// Word coordinates closer than this count as aligned.
const ALIGN_TOLERANCE: f64 = 1.0;

/// A reconstructed table: its cells, each a bounding box.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub cells: Vec<BBox>,
}

impl Table {
    pub fn bbox(&self) -> BBox {
        let mut cells = self.cells.iter().copied();
        let first = cells.next().unwrap_or(BBox::new(0.0, 0.0, 0.0, 0.0));
        cells.fold(first, union)
    }

    /// Cell text laid out on the table's column positions, rows top to bottom.
    pub fn extract(&self, chars: &[Char], settings: &TableSettings) -> TableGrid {
        let mut columns: Vec<f64> = self.cells.iter().map(|c| c.x0).collect();
        columns.sort_by(f64::total_cmp);
        columns.dedup();

        cluster_rows(&self.cells, |c| c.top, 0.0)
            .into_iter()
            .map(|row| {
                columns
                    .iter()
                    .map(|&x| {
                        row.iter()
                            .find(|cell| cell.x0 == x)
                            .map(|cell| cell_text(cell, chars, settings))
                    })
                    .collect()
            })
            .collect()
    }
}

fn cell_text(cell: &BBox, chars: &[Char], settings: &TableSettings) -> String {
    let inside: Vec<Char> = chars
        .iter()
        .filter(|c| cell.contains_point(c.h_mid(), c.v_mid()))
        .cloned()
        .collect();
    extract_text(&inside, settings.text_x_tolerance, settings.text_y_tolerance)
}

/// Finds tables among the glyphs and ruling edges of a page region.
pub struct TableFinder<'a> {
    bbox: BBox,
    chars: &'a [Char],
    edges: &'a [Edge],
    settings: &'a TableSettings,
}

impl<'a> TableFinder<'a> {
    pub fn new(bbox: BBox, chars: &'a [Char], edges: &'a [Edge], settings: &'a TableSettings) -> Self {
        Self {
            bbox,
            chars,
            edges,
            settings,
        }
    }

    /// All tables, ordered top to bottom then left to right.
    pub fn find_tables(&self) -> Vec<Table> {
        let edges = self.grid_edges();
        let intersections = Intersections::find(&edges, self.settings.intersection_tolerance);
        let cells = intersections.cells();
        trace!(
            edges = edges.len(),
            intersections = intersections.points.len(),
            cells = cells.len(),
            "table grid"
        );
        let mut tables: Vec<Table> = group_cells(cells)
            .into_iter()
            .filter(|cells| cells.len() > 1)
            .map(|cells| Table { cells })
            .collect();
        tables.sort_by(|a, b| {
            let (a, b) = (a.bbox(), b.bbox());
            a.top.total_cmp(&b.top).then(a.x0.total_cmp(&b.x0))
        });
        tables
    }

    /// The table with the most cells; ties go to the topmost, then leftmost.
    pub fn extract_table(&self) -> Option<TableGrid> {
        let tables = self.find_tables();
        let mut best: Option<&Table> = None;
        for table in &tables {
            if best.map_or(true, |b| table.cells.len() > b.cells.len()) {
                best = Some(table);
            }
        }
        best.map(|t| t.extract(self.chars, self.settings))
    }

    fn grid_edges(&self) -> Vec<Edge> {
        let settings = self.settings;
        let needs_words = settings.vertical_strategy == Strategy::Text
            || settings.horizontal_strategy == Strategy::Text;
        let words = if needs_words {
            extract_words(self.chars, settings.text_x_tolerance, settings.text_y_tolerance)
        } else {
            Vec::new()
        };

        let mut vertical = match settings.vertical_strategy {
            Strategy::Lines => self.ruling(Orientation::Vertical),
            Strategy::Text => words_to_vertical_edges(&words),
            Strategy::Explicit => Vec::new(),
        };
        vertical.extend(
            settings
                .explicit_vertical_lines
                .iter()
                .map(|&x| Edge::vertical(x, self.bbox.top, self.bbox.bottom)),
        );

        let mut horizontal = match settings.horizontal_strategy {
            Strategy::Lines => self.ruling(Orientation::Horizontal),
            Strategy::Text => words_to_horizontal_edges(&words, settings.min_words_horizontal),
            Strategy::Explicit => Vec::new(),
        };
        horizontal.extend(
            settings
                .explicit_horizontal_lines
                .iter()
                .map(|&y| Edge::horizontal(self.bbox.x0, self.bbox.x1, y)),
        );

        let mut edges = merge_edges(vertical, settings.snap_tolerance, settings.join_tolerance);
        edges.extend(merge_edges(horizontal, settings.snap_tolerance, settings.join_tolerance));
        edges.retain(|e| e.length() >= settings.edge_min_length);
        edges
    }

    fn ruling(&self, orientation: Orientation) -> Vec<Edge> {
        self.edges
            .iter()
            .filter(|e| e.orientation == orientation)
            .copied()
            .collect()
    }
}

/// One edge at the top of every text row with enough words, plus one under
/// the last row, all spanning the rows' combined horizontal extent.
fn words_to_horizontal_edges(words: &[Word], min_words: usize) -> Vec<Edge> {
    let rows: Vec<BBox> = cluster_rows(words, |w| w.top, ALIGN_TOLERANCE)
        .into_iter()
        .filter(|row| row.len() >= min_words)
        .map(|row| words_bbox(&row))
        .collect();
    if rows.is_empty() {
        return Vec::new();
    }

    let x0 = rows.iter().map(|r| r.x0).fold(f64::INFINITY, f64::min);
    let x1 = rows.iter().map(|r| r.x1).fold(f64::NEG_INFINITY, f64::max);
    let bottom = rows.iter().map(|r| r.bottom).fold(f64::NEG_INFINITY, f64::max);

    let mut edges: Vec<Edge> = rows.iter().map(|r| Edge::horizontal(x0, x1, r.top)).collect();
    edges.push(Edge::horizontal(x0, x1, bottom));
    edges
}

/// Vertical lines at word left edges shared by enough words, plus one at
/// the right edge of the rightmost such column.
fn words_to_vertical_edges(words: &[Word]) -> Vec<Edge> {
    let lefts: Vec<f64> = words.iter().map(|w| w.x0).collect();
    let clusters = cluster_values(&lefts, ALIGN_TOLERANCE);
    let count = clusters.iter().max().map(|m| m + 1).unwrap_or(0);
    let mut groups: Vec<Vec<&Word>> = vec![Vec::new(); count];
    for (word, cluster) in words.iter().zip(clusters) {
        groups[cluster].push(word);
    }

    let columns: Vec<BBox> = groups
        .into_iter()
        .filter(|g| g.len() >= MIN_WORDS_VERTICAL)
        .map(|g| words_bbox(&g))
        .collect();
    if columns.is_empty() {
        return Vec::new();
    }

    let top = columns.iter().map(|c| c.top).fold(f64::INFINITY, f64::min);
    let bottom = columns.iter().map(|c| c.bottom).fold(f64::NEG_INFINITY, f64::max);
    let right = columns.iter().map(|c| c.x1).fold(f64::NEG_INFINITY, f64::max);

    let mut edges: Vec<Edge> = columns.iter().map(|c| Edge::vertical(c.x0, top, bottom)).collect();
    edges.push(Edge::vertical(right, top, bottom));
    edges
}

fn words_bbox(words: &[&Word]) -> BBox {
    words
        .iter()
        .map(|w| BBox::new(w.x0, w.top, w.x1, w.bottom))
        .reduce(union)
        .unwrap_or(BBox::new(0.0, 0.0, 0.0, 0.0))
}

fn union(a: BBox, b: BBox) -> BBox {
    BBox::new(
        a.x0.min(b.x0),
        a.top.min(b.top),
        a.x1.max(b.x1),
        a.bottom.max(b.bottom),
    )
}

/// Snap parallel edges to shared positions, then join collinear pieces.
///
/// All edges passed in must have the same orientation.
pub fn merge_edges(edges: Vec<Edge>, snap_tolerance: f64, join_tolerance: f64) -> Vec<Edge> {
    let snapped = snap_edges(edges, snap_tolerance);

    let mut by_position: Vec<(f64, Vec<Edge>)> = Vec::new();
    for edge in snapped {
        let position = position(&edge);
        match by_position.iter_mut().find(|(p, _)| *p == position) {
            Some((_, group)) => group.push(edge),
            None => by_position.push((position, vec![edge])),
        }
    }
    by_position.sort_by(|a, b| a.0.total_cmp(&b.0));

    by_position
        .into_iter()
        .flat_map(|(_, group)| join_edges(group, join_tolerance))
        .collect()
}

/// Cross-axis coordinate: `x0` of a vertical edge, `top` of a horizontal one.
fn position(edge: &Edge) -> f64 {
    match edge.orientation {
        Orientation::Vertical => edge.x0,
        Orientation::Horizontal => edge.top,
    }
}

fn snap_edges(mut edges: Vec<Edge>, tolerance: f64) -> Vec<Edge> {
    let positions: Vec<f64> = edges.iter().map(position).collect();
    let clusters = cluster_values(&positions, tolerance);
    let count = clusters.iter().max().map(|m| m + 1).unwrap_or(0);

    let mut sums = vec![(0.0, 0usize); count];
    for (&p, &c) in positions.iter().zip(&clusters) {
        sums[c].0 += p;
        sums[c].1 += 1;
    }
    for (edge, &c) in edges.iter_mut().zip(&clusters) {
        let mean = sums[c].0 / sums[c].1 as f64;
        match edge.orientation {
            Orientation::Vertical => {
                edge.x0 = mean;
                edge.x1 = mean;
            }
            Orientation::Horizontal => {
                edge.top = mean;
                edge.bottom = mean;
            }
        }
    }
    edges
}

/// Join collinear edges that overlap or are within `tolerance` of each other.
fn join_edges(mut edges: Vec<Edge>, tolerance: f64) -> Vec<Edge> {
    let span = |e: &Edge| match e.orientation {
        Orientation::Vertical => (e.top, e.bottom),
        Orientation::Horizontal => (e.x0, e.x1),
    };
    edges.sort_by(|a, b| span(a).0.total_cmp(&span(b).0));

    let mut joined: Vec<Edge> = Vec::new();
    for edge in edges {
        let (start, end) = span(&edge);
        match joined.last_mut() {
            Some(last) if start <= span(last).1 + tolerance => match last.orientation {
                Orientation::Vertical => last.bottom = last.bottom.max(end),
                Orientation::Horizontal => last.x1 = last.x1.max(end),
            },
            _ => joined.push(edge),
        }
    }
    joined
}

#[derive(Debug, Clone)]
struct Intersection {
    x: f64,
    y: f64,
    vertical: BTreeSet<usize>,
    horizontal: BTreeSet<usize>,
}

/// Crossing points of the grid, each with the edges passing through it.
struct Intersections {
    points: Vec<Intersection>,
    index: HashMap<(u64, u64), usize>,
}

impl Intersections {
    fn find(edges: &[Edge], tolerance: f64) -> Self {
        let mut points: Vec<Intersection> = Vec::new();
        let mut index: HashMap<(u64, u64), usize> = HashMap::new();

        let verticals = edges
            .iter()
            .enumerate()
            .filter(|(_, e)| e.orientation == Orientation::Vertical);
        for (vi, v) in verticals {
            let horizontals = edges
                .iter()
                .enumerate()
                .filter(|(_, e)| e.orientation == Orientation::Horizontal);
            for (hi, h) in horizontals {
                let crosses = v.top <= h.top + tolerance
                    && v.bottom >= h.top - tolerance
                    && v.x0 >= h.x0 - tolerance
                    && v.x0 <= h.x1 + tolerance;
                if !crosses {
                    continue;
                }
                let key = point_key(v.x0, h.top);
                let slot = *index.entry(key).or_insert_with(|| {
                    points.push(Intersection {
                        x: v.x0,
                        y: h.top,
                        vertical: BTreeSet::new(),
                        horizontal: BTreeSet::new(),
                    });
                    points.len() - 1
                });
                points[slot].vertical.insert(vi);
                points[slot].horizontal.insert(hi);
            }
        }

        let mut order: Vec<usize> = (0..points.len()).collect();
        order.sort_by(|&a, &b| {
            points[a]
                .x
                .total_cmp(&points[b].x)
                .then(points[a].y.total_cmp(&points[b].y))
        });
        let points: Vec<Intersection> = order.into_iter().map(|i| points[i].clone()).collect();
        let index = points
            .iter()
            .enumerate()
            .map(|(i, p)| (point_key(p.x, p.y), i))
            .collect();
        Self { points, index }
    }

    fn get(&self, x: f64, y: f64) -> Option<&Intersection> {
        self.index.get(&point_key(x, y)).map(|&i| &self.points[i])
    }

    /// For each intersection, the smallest cell it is the top-left corner of.
    fn cells(&self) -> Vec<BBox> {
        let mut cells = Vec::new();
        for (i, pt) in self.points.iter().enumerate() {
            let rest = &self.points[i + 1..];
            let below: Vec<&Intersection> = rest.iter().filter(|p| p.x == pt.x).collect();
            let right: Vec<&Intersection> = rest.iter().filter(|p| p.y == pt.y).collect();

            let cell = below
                .iter()
                .filter(|b| shares_edge(&pt.vertical, &b.vertical))
                .find_map(|b| {
                    right
                        .iter()
                        .filter(|r| shares_edge(&pt.horizontal, &r.horizontal))
                        .find_map(|r| {
                            let corner = self.get(r.x, b.y)?;
                            (shares_edge(&corner.vertical, &r.vertical)
                                && shares_edge(&corner.horizontal, &b.horizontal))
                            .then(|| BBox::new(pt.x, pt.y, corner.x, corner.y))
                        })
                });
            cells.extend(cell);
        }
        cells
    }
}

fn point_key(x: f64, y: f64) -> (u64, u64) {
    (x.to_bits(), y.to_bits())
}

fn shares_edge(a: &BTreeSet<usize>, b: &BTreeSet<usize>) -> bool {
    a.intersection(b).next().is_some()
}

/// Group cells into tables: cells sharing a corner belong to the same table.
fn group_cells(mut remaining: Vec<BBox>) -> Vec<Vec<BBox>> {
    let corners = |c: &BBox| {
        [
            point_key(c.x0, c.top),
            point_key(c.x0, c.bottom),
            point_key(c.x1, c.top),
            point_key(c.x1, c.bottom),
        ]
    };

    let mut tables = Vec::new();
    while let Some(first) = remaining.pop() {
        let mut table_corners: BTreeSet<(u64, u64)> = corners(&first).into_iter().collect();
        let mut table = vec![first];
        loop {
            let before = table.len();
            let mut i = 0;
            while i < remaining.len() {
                let cell_corners = corners(&remaining[i]);
                if cell_corners.iter().any(|c| table_corners.contains(c)) {
                    table_corners.extend(cell_corners);
                    table.push(remaining.swap_remove(i));
                } else {
                    i += 1;
                }
            }
            if table.len() == before {
                break;
            }
        }
        tables.push(table);
    }
    tables
}
