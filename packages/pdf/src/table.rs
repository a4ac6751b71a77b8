//! Ruling-line table detection.
//!
//! Tables are found from the painted lines on a page, not from text
//! alignment: edges are snapped and joined, their intersections become
//! cell corners, the smallest rectangles whose sides are real edges become
//! cells, and cells that share corners are grouped into tables. Cell text
//! is whatever glyphs have their centre inside the cell.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::content::{Char, PageObjects};
use crate::geometry::{BBox, Edge, Orientation};

/// Tolerances for table detection, in PDF points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableSettings {
    /// Parallel edges closer than this are snapped to a common position.
    pub snap_tolerance: f64,
    /// Collinear edges with a gap up to this are joined.
    pub join_tolerance: f64,
    /// Edges shorter than this (after joining) are ignored.
    pub edge_min_length: f64,
    /// Horizontal slack when intersecting vertical and horizontal edges.
    pub intersection_x_tolerance: f64,
    /// Vertical slack when intersecting vertical and horizontal edges.
    pub intersection_y_tolerance: f64,
    /// Character gap above which a space is inserted in cell text.
    pub text_x_tolerance: f64,
    /// Characters whose tops differ by at most this share a text line.
    pub text_y_tolerance: f64,
}

impl Default for TableSettings {
    fn default() -> Self {
        Self {
            snap_tolerance: 3.0,
            join_tolerance: 3.0,
            edge_min_length: 40.0,
            intersection_x_tolerance: 3.0,
            intersection_y_tolerance: 5.0,
            text_x_tolerance: 3.0,
            text_y_tolerance: 3.0,
        }
    }
}

/// A detected table.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    /// Rows top to bottom, cells left to right. `None` marks a grid
    /// position with no cell (merged or missing); a cell without glyphs is
    /// `Some("")`.
    pub rows: Vec<Vec<Option<String>>>,
    /// Outer bounds of all cells.
    pub bbox: BBox,
}

impl Table {
    /// Renders the table as tab-separated lines, one per row.
    #[must_use]
    pub fn to_tsv(&self) -> String {
        self.rows
            .iter()
            .map(|row| {
                row.iter()
                    .map(|cell| cell.as_deref().unwrap_or("").replace(['\n', '\t'], " "))
                    .collect::<Vec<_>>()
                    .join("\t")
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Finds all ruled tables among a page's objects.
#[must_use]
pub fn find_tables(objects: &PageObjects, settings: &TableSettings) -> Vec<Table> {
    let edges = merge_edges(objects.edges.clone(), settings);
    let intersections = intersections(&edges, settings);
    let cells = cells(&intersections);
    let tables = group_cells(cells);

    log::trace!(
        "{} merged edges, {} intersections, {} tables",
        edges.len(),
        intersections.len(),
        tables.len()
    );

    tables
        .into_iter()
        .map(|cells| layout(&cells, &objects.chars, settings))
        .collect()
}

/// A point ordered by `x`, then `top`.
#[derive(Debug, Clone, Copy)]
struct Point(f64, f64);

impl PartialEq for Point {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Point {}

impl PartialOrd for Point {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Point {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0
            .total_cmp(&other.0)
            .then_with(|| self.1.total_cmp(&other.1))
    }
}

#[derive(Debug, Default)]
struct Intersection {
    vertical: BTreeSet<usize>,
    horizontal: BTreeSet<usize>,
}

/// Groups indices of `values` so that each sorted run whose consecutive
/// members differ by at most `tolerance` shares a group.
fn cluster(values: &[f64], tolerance: f64) -> Vec<Vec<usize>> {
    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by(|&a, &b| values[a].total_cmp(&values[b]));

    let mut groups: Vec<Vec<usize>> = Vec::new();
    let mut last = f64::NEG_INFINITY;
    for idx in order {
        match groups.last_mut() {
            Some(group) if values[idx] <= last + tolerance => group.push(idx),
            _ => groups.push(vec![idx]),
        }
        last = values[idx];
    }
    groups
}

fn snap(edges: &mut [Edge], tolerance: f64) {
    let positions: Vec<f64> = edges.iter().map(Edge::position).collect();
    for group in cluster(&positions, tolerance) {
        #[allow(clippy::cast_precision_loss)]
        let mean = group.iter().map(|&i| positions[i]).sum::<f64>() / group.len() as f64;
        for i in group {
            edges[i].shift(mean - positions[i]);
        }
    }
}

fn span(edge: &Edge) -> (f64, f64) {
    match edge.orientation {
        Orientation::Horizontal => (edge.x0, edge.x1),
        Orientation::Vertical => (edge.top, edge.bottom),
    }
}

fn with_span(edge: &Edge, start: f64, end: f64) -> Edge {
    match edge.orientation {
        Orientation::Horizontal => Edge::horizontal(edge.top, start, end),
        Orientation::Vertical => Edge::vertical(edge.x0, start, end),
    }
}

fn join(mut edges: Vec<Edge>, tolerance: f64) -> Vec<Edge> {
    edges.sort_by(|a, b| {
        a.position()
            .total_cmp(&b.position())
            .then_with(|| span(a).0.total_cmp(&span(b).0))
    });

    let mut joined: Vec<Edge> = Vec::new();
    for edge in edges {
        let (start, end) = span(&edge);
        if let Some(last) = joined.last_mut() {
            let (last_start, last_end) = span(last);
            if (last.position() - edge.position()).abs() < f64::EPSILON
                && start <= last_end + tolerance
            {
                *last = with_span(last, last_start, last_end.max(end));
                continue;
            }
        }
        joined.push(edge);
    }
    joined
}

/// Snaps, joins and length-filters edges, returning horizontal edges
/// followed by vertical ones.
fn merge_edges(edges: Vec<Edge>, settings: &TableSettings) -> Vec<Edge> {
    let (mut horizontal, mut vertical): (Vec<Edge>, Vec<Edge>) = edges
        .into_iter()
        .partition(|e| e.orientation == Orientation::Horizontal);

    snap(&mut horizontal, settings.snap_tolerance);
    snap(&mut vertical, settings.snap_tolerance);

    join(horizontal, settings.join_tolerance)
        .into_iter()
        .chain(join(vertical, settings.join_tolerance))
        .filter(|e| e.length() >= settings.edge_min_length)
        .collect()
}

fn intersections(edges: &[Edge], settings: &TableSettings) -> BTreeMap<Point, Intersection> {
    let xt = settings.intersection_x_tolerance;
    let yt = settings.intersection_y_tolerance;
    let mut points: BTreeMap<Point, Intersection> = BTreeMap::new();

    for (vi, v) in edges.iter().enumerate() {
        if v.orientation != Orientation::Vertical {
            continue;
        }
        for (hi, h) in edges.iter().enumerate() {
            if h.orientation != Orientation::Horizontal {
                continue;
            }
            if v.top <= h.top + yt
                && v.bottom >= h.top - yt
                && v.x0 >= h.x0 - xt
                && v.x0 <= h.x1 + xt
            {
                let entry = points.entry(Point(v.x0, h.top)).or_default();
                entry.vertical.insert(vi);
                entry.horizontal.insert(hi);
            }
        }
    }

    points
}

#[allow(clippy::float_cmp)]
fn connects(points: &BTreeMap<Point, Intersection>, a: Point, b: Point) -> bool {
    let (Some(pa), Some(pb)) = (points.get(&a), points.get(&b)) else {
        return false;
    };
    let same_x = a.0 == b.0;
    let same_y = a.1 == b.1;

    (same_x && !pa.vertical.is_disjoint(&pb.vertical))
        || (same_y && !pa.horizontal.is_disjoint(&pb.horizontal))
}

/// For each intersection, the smallest rectangle it is the top-left corner
/// of whose four sides run along edges.
#[allow(clippy::float_cmp)]
fn cells(points: &BTreeMap<Point, Intersection>) -> Vec<BBox> {
    let sorted: Vec<Point> = points.keys().copied().collect();
    let mut cells = Vec::new();

    for (i, &pt) in sorted.iter().enumerate() {
        let rest = &sorted[i + 1..];
        let below = rest.iter().filter(|p| p.0 == pt.0);

        'search: for &below_pt in below {
            if !connects(points, pt, below_pt) {
                continue;
            }
            for &right_pt in rest.iter().filter(|p| p.1 == pt.1) {
                if !connects(points, pt, right_pt) {
                    continue;
                }
                let corner = Point(right_pt.0, below_pt.1);
                if points.contains_key(&corner)
                    && connects(points, corner, right_pt)
                    && connects(points, corner, below_pt)
                {
                    cells.push(BBox::new(pt.0, pt.1, corner.0, corner.1));
                    break 'search;
                }
            }
        }
    }

    cells
}

fn corners(cell: &BBox) -> [Point; 4] {
    [
        Point(cell.x0, cell.top),
        Point(cell.x0, cell.bottom),
        Point(cell.x1, cell.top),
        Point(cell.x1, cell.bottom),
    ]
}

/// Groups cells that share corners; single-cell groups are dropped and
/// tables are ordered by their top-most, then left-most cell.
fn group_cells(cells: Vec<BBox>) -> Vec<Vec<BBox>> {
    let mut remaining = cells;
    let mut tables: Vec<Vec<BBox>> = Vec::new();
    let mut current: Vec<BBox> = Vec::new();
    let mut current_corners: BTreeSet<Point> = BTreeSet::new();

    while !remaining.is_empty() {
        let before = current.len();
        let mut rest = Vec::with_capacity(remaining.len());

        for cell in remaining {
            let cell_corners = corners(&cell);
            if current.is_empty() || cell_corners.iter().any(|c| current_corners.contains(c)) {
                current_corners.extend(cell_corners);
                current.push(cell);
            } else {
                rest.push(cell);
            }
        }
        remaining = rest;

        if current.len() == before {
            tables.push(std::mem::take(&mut current));
            current_corners.clear();
        }
    }
    if !current.is_empty() {
        tables.push(current);
    }

    let key = |table: &Vec<BBox>| {
        table
            .iter()
            .map(|c| Point(c.top, c.x0))
            .min()
            .unwrap_or(Point(f64::INFINITY, f64::INFINITY))
    };
    tables.sort_by_key(key);
    tables.retain(|t| t.len() > 1);
    tables
}

fn layout(cells: &[BBox], chars: &[Char], settings: &TableSettings) -> Table {
    let columns: BTreeSet<Point> = cells.iter().map(|c| Point(c.x0, 0.0)).collect();

    let mut by_row: BTreeMap<Point, BTreeMap<Point, BBox>> = BTreeMap::new();
    for cell in cells {
        by_row
            .entry(Point(cell.top, 0.0))
            .or_default()
            .insert(Point(cell.x0, 0.0), *cell);
    }

    let rows = by_row
        .values()
        .map(|row| {
            columns
                .iter()
                .map(|x| row.get(x).map(|cell| cell_text(cell, chars, settings)))
                .collect()
        })
        .collect();

    let bbox = cells.iter().fold(
        BBox::new(
            f64::INFINITY,
            f64::INFINITY,
            f64::NEG_INFINITY,
            f64::NEG_INFINITY,
        ),
        |acc, c| BBox {
            x0: acc.x0.min(c.x0),
            top: acc.top.min(c.top),
            x1: acc.x1.max(c.x1),
            bottom: acc.bottom.max(c.bottom),
        },
    );

    Table { rows, bbox }
}

/// Text of the glyphs centred inside `cell`, lines joined with `"\n"`.
fn cell_text(cell: &BBox, chars: &[Char], settings: &TableSettings) -> String {
    let inside: Vec<&Char> = chars
        .iter()
        .filter(|c| cell.contains_center_of(&c.bbox))
        .collect();
    if inside.is_empty() {
        return String::new();
    }

    let tops: Vec<f64> = inside.iter().map(|c| c.bbox.top).collect();
    let mut lines = cluster(&tops, settings.text_y_tolerance);
    lines.sort_by(|a, b| {
        let min = |g: &Vec<usize>| g.iter().map(|&i| tops[i]).fold(f64::INFINITY, f64::min);
        min(a).total_cmp(&min(b))
    });

    lines
        .into_iter()
        .map(|line| {
            let mut glyphs: Vec<&Char> = line.into_iter().map(|i| inside[i]).collect();
            glyphs.sort_by(|a, b| a.bbox.x0.total_cmp(&b.bbox.x0));
            line_text(&glyphs, settings.text_x_tolerance)
        })
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Joins left-to-right glyphs into words separated by single spaces.
fn line_text(glyphs: &[&Char], x_tolerance: f64) -> String {
    let mut words: Vec<String> = Vec::new();
    let mut word = String::new();
    let mut last_x1: Option<f64> = None;

    for glyph in glyphs {
        if glyph.is_whitespace() {
            if !word.is_empty() {
                words.push(std::mem::take(&mut word));
            }
            last_x1 = None;
            continue;
        }
        if let Some(x1) = last_x1 {
            if glyph.bbox.x0 - x1 > x_tolerance && !word.is_empty() {
                words.push(std::mem::take(&mut word));
            }
        }
        word.push_str(&glyph.text);
        last_x1 = Some(glyph.bbox.x1);
    }
    if !word.is_empty() {
        words.push(word);
    }

    words.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(xs: &[f64], ys: &[f64]) -> Vec<Edge> {
        let (left, right) = (xs[0], xs[xs.len() - 1]);
        let (top, bottom) = (ys[0], ys[ys.len() - 1]);
        ys.iter()
            .map(|&y| Edge::horizontal(y, left, right))
            .chain(xs.iter().map(|&x| Edge::vertical(x, top, bottom)))
            .collect()
    }

    fn text_at(text: &str, x0: f64, top: f64) -> Vec<Char> {
        text.chars()
            .enumerate()
            .map(|(i, ch)| {
                #[allow(clippy::cast_precision_loss)]
                let x = (i as f64).mul_add(6.0, x0);
                Char {
                    text: ch.to_string(),
                    bbox: BBox::new(x, top, x + 6.0, top + 10.0),
                }
            })
            .collect()
    }

    #[test]
    fn cluster_chains_nearby_values() {
        let groups = cluster(&[10.0, 1.0, 12.5, 2.0, 30.0], 3.0);
        assert_eq!(groups, vec![vec![1, 3], vec![0, 2], vec![4]]);
    }

    #[test]
    fn snapping_and_joining_merge_broken_rules() {
        let edges = vec![
            Edge::horizontal(100.0, 0.0, 50.0),
            Edge::horizontal(101.5, 52.0, 120.0),
            Edge::horizontal(300.0, 0.0, 20.0),
        ];
        let merged = merge_edges(edges, &TableSettings::default());
        assert_eq!(merged.len(), 1);
        assert!((merged[0].top - 100.75).abs() < 1e-9);
        assert!((merged[0].x1 - 120.0).abs() < 1e-9);
    }

    #[test]
    fn two_by_two_grid_reads_rows_and_text() {
        let mut chars = text_at("Date", 105.0, 105.0);
        chars.extend(text_at("Amount", 205.0, 105.0));
        chars.extend(text_at("01/02", 105.0, 135.0));
        chars.extend(text_at("1,200.00", 205.0, 135.0));

        let objects = PageObjects {
            chars,
            edges: grid(&[100.0, 200.0, 300.0], &[100.0, 130.0, 160.0]),
        };
        let tables = find_tables(
            &objects,
            &TableSettings {
                edge_min_length: 20.0,
                ..TableSettings::default()
            },
        );

        assert_eq!(tables.len(), 1);
        assert_eq!(
            tables[0].rows,
            vec![
                vec![Some("Date".to_string()), Some("Amount".to_string())],
                vec![Some("01/02".to_string()), Some("1,200.00".to_string())],
            ]
        );
        assert_eq!(tables[0].to_tsv(), "Date\tAmount\n01/02\t1,200.00");
        assert!((tables[0].bbox.x1 - 300.0).abs() < 1e-9);
    }

    #[test]
    fn single_cell_boxes_are_not_tables() {
        let objects = PageObjects {
            chars: text_at("Note", 105.0, 105.0),
            edges: grid(&[100.0, 300.0], &[100.0, 160.0]),
        };
        assert!(find_tables(&objects, &TableSettings::default()).is_empty());
    }

    #[test]
    fn empty_cells_are_empty_strings() {
        let objects = PageObjects {
            chars: text_at("X", 105.0, 105.0),
            edges: grid(&[100.0, 200.0, 300.0], &[100.0, 150.0]),
        };
        let tables = find_tables(&objects, &TableSettings::default());
        assert_eq!(
            tables[0].rows,
            vec![vec![Some("X".to_string()), Some(String::new())]]
        );
    }

    #[test]
    fn wide_gaps_become_spaces_and_lines_split() {
        let mut chars = text_at("AMAZON", 0.0, 0.0);
        chars.extend(text_at("INDIA", 40.0, 0.0));
        chars.extend(text_at("MUMBAI", 0.0, 12.0));
        let cell = BBox::new(-1.0, -1.0, 200.0, 30.0);
        assert_eq!(
            cell_text(&cell, &chars, &TableSettings::default()),
            "AMAZON INDIA\nMUMBAI"
        );
    }
}
