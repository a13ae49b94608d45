//! Positioned page objects
//!
//! All coordinates are top-down page points: `top` is the distance from the
//! top edge of the page.

use nics_core::BBox;

/// A single rendered glyph.
#[derive(Debug, Clone, PartialEq)]
pub struct Char {
    pub text: String,
    pub x0: f64,
    pub x1: f64,
    pub top: f64,
    pub bottom: f64,
    /// Rendered font size in points.
    pub size: f64,
}

impl Char {
    pub fn bbox(&self) -> BBox {
        BBox::new(self.x0, self.top, self.x1, self.bottom)
    }

    pub fn h_mid(&self) -> f64 {
        (self.x0 + self.x1) / 2.0
    }

    pub fn v_mid(&self) -> f64 {
        (self.top + self.bottom) / 2.0
    }

    pub fn is_blank(&self) -> bool {
        self.text.chars().all(char::is_whitespace)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Orientation {
    Horizontal,
    Vertical,
}

/// An axis-aligned ruling segment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Edge {
    pub x0: f64,
    pub x1: f64,
    pub top: f64,
    pub bottom: f64,
    pub orientation: Orientation,
}

impl Edge {
    pub fn horizontal(x0: f64, x1: f64, top: f64) -> Self {
        Self {
            x0: x0.min(x1),
            x1: x0.max(x1),
            top,
            bottom: top,
            orientation: Orientation::Horizontal,
        }
    }

    pub fn vertical(x: f64, top: f64, bottom: f64) -> Self {
        Self {
            x0: x,
            x1: x,
            top: top.min(bottom),
            bottom: top.max(bottom),
            orientation: Orientation::Vertical,
        }
    }

    /// Extent along the edge's own direction.
    pub fn length(&self) -> f64 {
        match self.orientation {
            Orientation::Horizontal => self.x1 - self.x0,
            Orientation::Vertical => self.bottom - self.top,
        }
    }

    pub fn bbox(&self) -> BBox {
        BBox::new(self.x0, self.top, self.x1, self.bottom)
    }

    /// The part of this edge inside `bbox`, if any remains.
    pub fn clip(&self, bbox: &BBox) -> Option<Edge> {
        match self.orientation {
            Orientation::Horizontal => {
                if self.top < bbox.top || self.top > bbox.bottom {
                    return None;
                }
                let x0 = self.x0.max(bbox.x0);
                let x1 = self.x1.min(bbox.x1);
                (x0 < x1).then(|| Edge::horizontal(x0, x1, self.top))
            }
            Orientation::Vertical => {
                if self.x0 < bbox.x0 || self.x0 > bbox.x1 {
                    return None;
                }
                let top = self.top.max(bbox.top);
                let bottom = self.bottom.min(bbox.bottom);
                (top < bottom).then(|| Edge::vertical(self.x0, top, bottom))
            }
        }
    }
}

/// Affine transform `[a b c d e f]` in PDF row-vector convention.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Matrix {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
    pub e: f64,
    pub f: f64,
}

impl Matrix {
    pub const IDENTITY: Matrix = Matrix::new(1.0, 0.0, 0.0, 1.0, 0.0, 0.0);

    pub const fn new(a: f64, b: f64, c: f64, d: f64, e: f64, f: f64) -> Self {
        Self { a, b, c, d, e, f }
    }

    pub const fn translation(tx: f64, ty: f64) -> Self {
        Self::new(1.0, 0.0, 0.0, 1.0, tx, ty)
    }

    /// `self` applied first, then `other`.
    pub fn then(&self, other: &Matrix) -> Matrix {
        Matrix {
            a: self.a * other.a + self.b * other.c,
            b: self.a * other.b + self.b * other.d,
            c: self.c * other.a + self.d * other.c,
            d: self.c * other.b + self.d * other.d,
            e: self.e * other.a + self.f * other.c + other.e,
            f: self.e * other.b + self.f * other.d + other.f,
        }
    }

    pub fn apply(&self, x: f64, y: f64) -> (f64, f64) {
        (
            x * self.a + y * self.c + self.e,
            x * self.b + y * self.d + self.f,
        )
    }
}

impl Default for Matrix {
    fn default() -> Self {
        Self::IDENTITY
    }
}
