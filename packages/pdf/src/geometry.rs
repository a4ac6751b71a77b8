//! Geometric primitives shared by the content interpreter and table finder.
//!
//! Coordinates handed out of this crate are *top-down*: `top` grows towards
//! the bottom of the page, matching how statement tables are read.

/// A PDF transformation matrix `[a b c d e f]`.
///
/// Points are row vectors, so `p' = p × M` and `A.then(&B)` applies `A`
/// first.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Matrix {
    /// Horizontal scaling component.
    pub a: f64,
    /// Rotation/skew component.
    pub b: f64,
    /// Rotation/skew component.
    pub c: f64,
    /// Vertical scaling component.
    pub d: f64,
    /// Horizontal translation.
    pub e: f64,
    /// Vertical translation.
    pub f: f64,
}

impl Default for Matrix {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Matrix {
    /// The identity transform.
    pub const IDENTITY: Self = Self::new(1.0, 0.0, 0.0, 1.0, 0.0, 0.0);

    /// Creates a matrix from its six components.
    #[must_use]
    pub const fn new(a: f64, b: f64, c: f64, d: f64, e: f64, f: f64) -> Self {
        Self { a, b, c, d, e, f }
    }

    /// A pure translation.
    #[must_use]
    pub const fn translate(tx: f64, ty: f64) -> Self {
        Self::new(1.0, 0.0, 0.0, 1.0, tx, ty)
    }

    /// Returns `self × other`: the transform that applies `self`, then
    /// `other`.
    #[must_use]
    pub fn then(&self, other: &Self) -> Self {
        Self {
            a: self.a.mul_add(other.a, self.b * other.c),
            b: self.a.mul_add(other.b, self.b * other.d),
            c: self.c.mul_add(other.a, self.d * other.c),
            d: self.c.mul_add(other.b, self.d * other.d),
            e: self.e.mul_add(other.a, self.f * other.c) + other.e,
            f: self.e.mul_add(other.b, self.f * other.d) + other.f,
        }
    }

    /// Transforms a point.
    #[must_use]
    pub fn apply(&self, x: f64, y: f64) -> (f64, f64) {
        (
            self.a.mul_add(x, self.c.mul_add(y, self.e)),
            self.b.mul_add(x, self.d.mul_add(y, self.f)),
        )
    }
}

/// An axis-aligned box in top-down page coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BBox {
    /// Left edge.
    pub x0: f64,
    /// Top edge (distance from the top of the page).
    pub top: f64,
    /// Right edge.
    pub x1: f64,
    /// Bottom edge (distance from the top of the page).
    pub bottom: f64,
}

impl BBox {
    /// Creates a box, normalizing the corner order.
    #[must_use]
    pub fn new(x0: f64, top: f64, x1: f64, bottom: f64) -> Self {
        Self {
            x0: x0.min(x1),
            top: top.min(bottom),
            x1: x0.max(x1),
            bottom: top.max(bottom),
        }
    }

    /// Horizontal centre.
    #[must_use]
    pub fn h_mid(&self) -> f64 {
        (self.x0 + self.x1) / 2.0
    }

    /// Vertical centre.
    #[must_use]
    pub fn v_mid(&self) -> f64 {
        (self.top + self.bottom) / 2.0
    }

    /// Whether the centre of `other` lies inside this box (right and
    /// bottom edges exclusive).
    #[must_use]
    pub fn contains_center_of(&self, other: &Self) -> bool {
        let h = other.h_mid();
        let v = other.v_mid();
        h >= self.x0 && h < self.x1 && v >= self.top && v < self.bottom
    }
}

/// Direction of a ruling edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Orientation {
    /// Runs left to right.
    Horizontal,
    /// Runs top to bottom.
    Vertical,
}

/// An axis-aligned painted segment.
///
/// Horizontal edges have `top == bottom`; vertical edges have `x0 == x1`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Edge {
    /// Which way the edge runs.
    pub orientation: Orientation,
    /// Left end (or x position of a vertical edge).
    pub x0: f64,
    /// Top end (or y position of a horizontal edge).
    pub top: f64,
    /// Right end.
    pub x1: f64,
    /// Bottom end.
    pub bottom: f64,
}

impl Edge {
    /// A horizontal edge at `top` from `x0` to `x1`.
    #[must_use]
    pub fn horizontal(top: f64, x0: f64, x1: f64) -> Self {
        Self {
            orientation: Orientation::Horizontal,
            x0: x0.min(x1),
            top,
            x1: x0.max(x1),
            bottom: top,
        }
    }

    /// A vertical edge at `x` from `top` to `bottom`.
    #[must_use]
    pub fn vertical(x: f64, top: f64, bottom: f64) -> Self {
        Self {
            orientation: Orientation::Vertical,
            x0: x,
            top: top.min(bottom),
            x1: x,
            bottom: top.max(bottom),
        }
    }

    /// Builds an edge from two points if the segment is axis-aligned.
    #[must_use]
    pub fn from_points(p0: (f64, f64), p1: (f64, f64)) -> Option<Self> {
        const EPSILON: f64 = 0.01;

        if (p0.1 - p1.1).abs() < EPSILON && (p0.0 - p1.0).abs() >= EPSILON {
            Some(Self::horizontal(p0.1, p0.0, p1.0))
        } else if (p0.0 - p1.0).abs() < EPSILON && (p0.1 - p1.1).abs() >= EPSILON {
            Some(Self::vertical(p0.0, p0.1, p1.1))
        } else {
            None
        }
    }

    /// Extent along the edge's direction.
    #[must_use]
    pub fn length(&self) -> f64 {
        match self.orientation {
            Orientation::Horizontal => self.x1 - self.x0,
            Orientation::Vertical => self.bottom - self.top,
        }
    }

    /// Position across the edge's direction (`top` for horizontal edges,
    /// `x0` for vertical ones).
    #[must_use]
    pub const fn position(&self) -> f64 {
        match self.orientation {
            Orientation::Horizontal => self.top,
            Orientation::Vertical => self.x0,
        }
    }

    /// Moves the edge across its direction by `delta`.
    pub fn shift(&mut self, delta: f64) {
        match self.orientation {
            Orientation::Horizontal => {
                self.top += delta;
                self.bottom += delta;
            }
            Orientation::Vertical => {
                self.x0 += delta;
                self.x1 += delta;
            }
        }
    }
}
