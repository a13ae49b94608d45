//! Page access contract
//!
//! Extraction never touches PDF internals directly. A page source (the lopdf
//! backend in `nics-pdf`, or an in-memory page in tests) exposes page size,
//! region cropping and geometric table reconstruction through these traits.
//!
//! Coordinates are in PDF points with the origin at the top-left corner of
//! the page: `top` grows downwards.

/// Axis-aligned rectangle in top-down page coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BBox {
    pub x0: f64,
    pub top: f64,
    pub x1: f64,
    pub bottom: f64,
}

impl BBox {
    pub fn new(x0: f64, top: f64, x1: f64, bottom: f64) -> Self {
        Self {
            x0,
            top,
            x1,
            bottom,
        }
    }

    pub fn width(&self) -> f64 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> f64 {
        self.bottom - self.top
    }

    /// Whether `other` lies entirely inside this box.
    pub fn contains(&self, other: &BBox) -> bool {
        other.x0 >= self.x0 && other.x1 <= self.x1 && other.top >= self.top && other.bottom <= self.bottom
    }

    /// Whether the point `(x, y)` lies inside this box (edges included).
    pub fn contains_point(&self, x: f64, y: f64) -> bool {
        x >= self.x0 && x <= self.x1 && y >= self.top && y <= self.bottom
    }
}

/// How a table finder derives one direction of grid lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Strategy {
    /// Ruling lines and rectangle sides drawn on the page, plus explicit lines.
    #[default]
    Lines,
    /// Lines inferred from the alignment of words, plus explicit lines.
    Text,
    /// Only the explicitly supplied lines.
    Explicit,
}

/// Parameters of geometric table reconstruction.
#[derive(Debug, Clone, PartialEq)]
pub struct TableSettings {
    pub vertical_strategy: Strategy,
    pub horizontal_strategy: Strategy,
    /// Extra vertical grid lines, as x coordinates.
    pub explicit_vertical_lines: Vec<f64>,
    /// Extra horizontal grid lines, as top coordinates.
    pub explicit_horizontal_lines: Vec<f64>,
    pub snap_tolerance: f64,
    pub join_tolerance: f64,
    pub edge_min_length: f64,
    pub intersection_tolerance: f64,
    pub text_x_tolerance: f64,
    pub text_y_tolerance: f64,
    /// Minimum words a text row needs to produce a horizontal line.
    pub min_words_horizontal: usize,
}

impl Default for TableSettings {
    fn default() -> Self {
        Self {
            vertical_strategy: Strategy::Lines,
            horizontal_strategy: Strategy::Lines,
            explicit_vertical_lines: Vec::new(),
            explicit_horizontal_lines: Vec::new(),
            snap_tolerance: 3.0,
            join_tolerance: 3.0,
            edge_min_length: 3.0,
            intersection_tolerance: 3.0,
            text_x_tolerance: 3.0,
            text_y_tolerance: 3.0,
            min_words_horizontal: 1,
        }
    }
}

/// A reconstructed table: rows of cells, `None` where the grid has no cell.
pub type TableGrid = Vec<Vec<Option<String>>>;

/// A cropped view of a page.
pub trait PageRegion {
    /// Text of the region, lines joined by `\n`.
    fn extract_text(&self, x_tolerance: f64, y_tolerance: f64) -> String;

    /// Left edge of the leftmost character in the region.
    fn min_char_x0(&self) -> Option<f64>;

    /// The largest table found in the region, if any.
    fn extract_table(&self, settings: &TableSettings) -> Option<TableGrid>;
}

/// One page of the source document. Read-only.
pub trait RawPage {
    type Region: PageRegion;

    /// 1-based position of the page in its document.
    fn number(&self) -> usize;

    fn width(&self) -> f64;

    fn height(&self) -> f64;

    /// Region holding only objects that lie entirely inside `bbox`.
    fn within_bbox(&self, bbox: BBox) -> Self::Region;

    /// Region holding objects whose centre lies inside `bbox`, ruling lines clipped.
    fn crop(&self, bbox: BBox) -> Self::Region;
}
