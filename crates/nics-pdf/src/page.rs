//! Interpreted pages and cropped regions

use nics_core::{BBox, PageRegion, RawPage, TableGrid, TableSettings};

use crate::content::PageObjects;
use crate::geometry::{Char, Edge};
use crate::table::TableFinder;
use crate::text::extract_text;

/// One page of a loaded document, with its glyphs and ruling lines.
#[derive(Debug, Clone, PartialEq)]
pub struct PdfPage {
    number: usize,
    width: f64,
    height: f64,
    objects: PageObjects,
}

impl PdfPage {
    pub fn new(number: usize, width: f64, height: f64, objects: PageObjects) -> Self {
        Self {
            number,
            width,
            height,
            objects,
        }
    }

    pub fn chars(&self) -> &[Char] {
        &self.objects.chars
    }

    pub fn edges(&self) -> &[Edge] {
        &self.objects.edges
    }

    pub fn bbox(&self) -> BBox {
        BBox::new(0.0, 0.0, self.width, self.height)
    }
}

impl RawPage for PdfPage {
    type Region = PdfRegion;

    fn number(&self) -> usize {
        self.number
    }

    fn width(&self) -> f64 {
        self.width
    }

    fn height(&self) -> f64 {
        self.height
    }

    fn within_bbox(&self, bbox: BBox) -> PdfRegion {
        PdfRegion {
            bbox,
            chars: self
                .chars()
                .iter()
                .filter(|c| bbox.contains(&c.bbox()))
                .cloned()
                .collect(),
            edges: self
                .edges()
                .iter()
                .filter(|e| bbox.contains(&e.bbox()))
                .copied()
                .collect(),
        }
    }

    fn crop(&self, bbox: BBox) -> PdfRegion {
        PdfRegion {
            bbox,
            chars: self
                .chars()
                .iter()
                .filter(|c| bbox.contains_point(c.h_mid(), c.v_mid()))
                .cloned()
                .collect(),
            edges: self.edges().iter().filter_map(|e| e.clip(&bbox)).collect(),
        }
    }
}

/// A rectangular part of a page.
#[derive(Debug, Clone, PartialEq)]
pub struct PdfRegion {
    bbox: BBox,
    chars: Vec<Char>,
    edges: Vec<Edge>,
}

impl PdfRegion {
    pub fn bbox(&self) -> BBox {
        self.bbox
    }

    pub fn chars(&self) -> &[Char] {
        &self.chars
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }
}

impl PageRegion for PdfRegion {
    fn extract_text(&self, x_tolerance: f64, y_tolerance: f64) -> String {
        extract_text(&self.chars, x_tolerance, y_tolerance)
    }

    fn min_char_x0(&self) -> Option<f64> {
        self.chars.iter().map(|c| c.x0).reduce(f64::min)
    }

    fn extract_table(&self, settings: &TableSettings) -> Option<TableGrid> {
        TableFinder::new(self.bbox, &self.chars, &self.edges, settings).extract_table()
    }
}
