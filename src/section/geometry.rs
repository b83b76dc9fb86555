//! Geometry primitives for cross-section parts
//!
//! The vertical axis `z` runs downward from the top of the cross-section, so
//! `top_edge <= bottom_edge` for every geometry. Widths are measured along the
//! horizontal `y` axis and vary at most linearly with depth, which keeps the
//! stress integrals closed-form.

use serde::{Deserialize, Serialize};

use crate::error::{MnKappaError, MnKappaResult};

/// A rectangle defined by its four edges
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rectangle {
    /// Upper edge (smaller z)
    pub top_edge: f64,
    /// Lower edge (larger z)
    pub bottom_edge: f64,
    /// Left edge (smaller y)
    pub left_edge: f64,
    /// Right edge (larger y)
    pub right_edge: f64,
}

impl Rectangle {
    /// Create a rectangle from its edges
    pub fn new(top_edge: f64, bottom_edge: f64, left_edge: f64, right_edge: f64) -> MnKappaResult<Self> {
        if top_edge > bottom_edge {
            return Err(MnKappaError::InvalidGeometry(format!(
                "top edge {top_edge} below bottom edge {bottom_edge}"
            )));
        }
        if left_edge > right_edge {
            return Err(MnKappaError::InvalidGeometry(format!(
                "left edge {left_edge} right of right edge {right_edge}"
            )));
        }
        Ok(Self {
            top_edge,
            bottom_edge,
            left_edge,
            right_edge,
        })
    }

    /// Create a rectangle of the given width centred on y = 0
    pub fn centred(top_edge: f64, bottom_edge: f64, width: f64) -> MnKappaResult<Self> {
        if width < 0.0 {
            return Err(MnKappaError::InvalidGeometry(format!("negative width {width}")));
        }
        Self::new(top_edge, bottom_edge, -0.5 * width, 0.5 * width)
    }

    /// Constant width of the rectangle
    pub fn width(&self) -> f64 {
        self.right_edge - self.left_edge
    }

    pub fn height(&self) -> f64 {
        self.bottom_edge - self.top_edge
    }

    pub fn area(&self) -> f64 {
        self.width() * self.height()
    }

    pub fn centroid_z(&self) -> f64 {
        0.5 * (self.top_edge + self.bottom_edge)
    }
}

/// A trapezoid with horizontal top and bottom edges and linearly varying width
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Trapezoid {
    pub top_edge: f64,
    pub bottom_edge: f64,
    /// Width at the top edge
    pub top_width: f64,
    /// Width at the bottom edge
    pub bottom_width: f64,
    /// Horizontal offset of the top-left corner
    pub top_left_edge: f64,
    /// Horizontal offset of the bottom-left corner
    pub bottom_left_edge: f64,
}

impl Trapezoid {
    /// Create a trapezoid with explicit corner offsets
    pub fn new(
        top_edge: f64,
        bottom_edge: f64,
        top_width: f64,
        bottom_width: f64,
        top_left_edge: f64,
        bottom_left_edge: f64,
    ) -> MnKappaResult<Self> {
        if top_edge > bottom_edge {
            return Err(MnKappaError::InvalidGeometry(format!(
                "top edge {top_edge} below bottom edge {bottom_edge}"
            )));
        }
        if top_width < 0.0 || bottom_width < 0.0 {
            return Err(MnKappaError::InvalidGeometry(format!(
                "negative width (top {top_width}, bottom {bottom_width})"
            )));
        }
        Ok(Self {
            top_edge,
            bottom_edge,
            top_width,
            bottom_width,
            top_left_edge,
            bottom_left_edge,
        })
    }

    /// Create a trapezoid centred on y = 0
    pub fn centred(
        top_edge: f64,
        bottom_edge: f64,
        top_width: f64,
        bottom_width: f64,
    ) -> MnKappaResult<Self> {
        Self::new(
            top_edge,
            bottom_edge,
            top_width,
            bottom_width,
            -0.5 * top_width,
            -0.5 * bottom_width,
        )
    }

    pub fn height(&self) -> f64 {
        self.bottom_edge - self.top_edge
    }

    /// Slope m of the width function b(z) = m * z + c
    pub fn width_slope(&self) -> f64 {
        let h = self.height();
        if h == 0.0 {
            0.0
        } else {
            (self.bottom_width - self.top_width) / h
        }
    }

    /// Interception c of the width function b(z) = m * z + c
    pub fn width_interception(&self) -> f64 {
        self.top_width - self.width_slope() * self.top_edge
    }

    /// Width at depth z, linearly interpolated between the edges
    pub fn width_at(&self, z: f64) -> f64 {
        self.width_slope() * z + self.width_interception()
    }

    pub fn area(&self) -> f64 {
        0.5 * (self.top_width + self.bottom_width) * self.height()
    }

    pub fn centroid_z(&self) -> f64 {
        let (a, b) = (self.top_width, self.bottom_width);
        if a + b == 0.0 {
            return 0.5 * (self.top_edge + self.bottom_edge);
        }
        self.top_edge + self.height() / 3.0 * (a + 2.0 * b) / (a + b)
    }
}

/// A circle treated as a point mass at its centroid
///
/// The diameter is assumed small against the beam depth, so the stress over the
/// disk is taken as the stress at the centroid. Circles are never split.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Circle {
    pub diameter: f64,
    pub centroid_y: f64,
    pub centroid_z: f64,
}

impl Circle {
    pub fn new(diameter: f64, centroid_y: f64, centroid_z: f64) -> MnKappaResult<Self> {
        if diameter <= 0.0 {
            return Err(MnKappaError::InvalidGeometry(format!(
                "non-positive diameter {diameter}"
            )));
        }
        Ok(Self {
            diameter,
            centroid_y,
            centroid_z,
        })
    }

    pub fn area(&self) -> f64 {
        std::f64::consts::PI * self.diameter.powi(2) / 4.0
    }
}

/// Tagged geometry variant
///
/// Composition of geometries ("adding" shapes) is expressed by building several
/// primitives and collecting them in a cross-section, not by a shape algebra.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Geometry {
    Rectangle(Rectangle),
    Trapezoid(Trapezoid),
    Circle(Circle),
}

impl Geometry {
    pub fn top_edge(&self) -> f64 {
        match self {
            Geometry::Rectangle(r) => r.top_edge,
            Geometry::Trapezoid(t) => t.top_edge,
            Geometry::Circle(c) => c.centroid_z,
        }
    }

    pub fn bottom_edge(&self) -> f64 {
        match self {
            Geometry::Rectangle(r) => r.bottom_edge,
            Geometry::Trapezoid(t) => t.bottom_edge,
            Geometry::Circle(c) => c.centroid_z,
        }
    }

    pub fn height(&self) -> f64 {
        self.bottom_edge() - self.top_edge()
    }

    pub fn area(&self) -> f64 {
        match self {
            Geometry::Rectangle(r) => r.area(),
            Geometry::Trapezoid(t) => t.area(),
            Geometry::Circle(c) => c.area(),
        }
    }

    pub fn centroid_z(&self) -> f64 {
        match self {
            Geometry::Rectangle(r) => r.centroid_z(),
            Geometry::Trapezoid(t) => t.centroid_z(),
            Geometry::Circle(c) => c.centroid_z,
        }
    }

    /// Width at depth z
    ///
    /// Zero outside the geometry's vertical extent. Circles report their full
    /// area through [`Geometry::area`] instead of a width.
    pub fn width_at(&self, z: f64) -> f64 {
        if z < self.top_edge() || z > self.bottom_edge() {
            return 0.0;
        }
        match self {
            Geometry::Rectangle(r) => r.width(),
            Geometry::Trapezoid(t) => t.width_at(z),
            Geometry::Circle(_) => 0.0,
        }
    }

    /// Slope of the width function within the geometry
    pub fn width_slope(&self) -> f64 {
        match self {
            Geometry::Rectangle(_) | Geometry::Circle(_) => 0.0,
            Geometry::Trapezoid(t) => t.width_slope(),
        }
    }

    /// True for geometries integrated as a point mass
    pub fn is_point(&self) -> bool {
        matches!(self, Geometry::Circle(_))
    }

    /// Sub-geometry between two depths
    ///
    /// Returns `None` when the slice misses the geometry entirely or has zero
    /// height. Circles are not split: the whole circle is returned when its
    /// centroid lies inside the slice.
    pub fn split(&self, upper_z: f64, lower_z: f64) -> Option<Geometry> {
        let (z1, z2) = if upper_z <= lower_z {
            (upper_z, lower_z)
        } else {
            (lower_z, upper_z)
        };
        match self {
            Geometry::Rectangle(r) => {
                let top = z1.max(r.top_edge);
                let bottom = z2.min(r.bottom_edge);
                if bottom <= top {
                    return None;
                }
                Some(Geometry::Rectangle(Rectangle {
                    top_edge: top,
                    bottom_edge: bottom,
                    ..*r
                }))
            }
            Geometry::Trapezoid(t) => {
                let top = z1.max(t.top_edge);
                let bottom = z2.min(t.bottom_edge);
                if bottom <= top {
                    return None;
                }
                Some(Geometry::Trapezoid(Trapezoid {
                    top_edge: top,
                    bottom_edge: bottom,
                    top_width: t.width_at(top),
                    bottom_width: t.width_at(bottom),
                    top_left_edge: t.top_left_edge,
                    bottom_left_edge: t.bottom_left_edge,
                }))
            }
            Geometry::Circle(c) => {
                if c.centroid_z >= z1 && c.centroid_z <= z2 {
                    Some(*self)
                } else {
                    None
                }
            }
        }
    }

    /// Horizontal extent (left, right) used for overlap checks
    pub fn horizontal_extent(&self) -> (f64, f64) {
        match self {
            Geometry::Rectangle(r) => (r.left_edge, r.right_edge),
            Geometry::Trapezoid(t) => {
                let left = t.top_left_edge.min(t.bottom_left_edge);
                let right = (t.top_left_edge + t.top_width).max(t.bottom_left_edge + t.bottom_width);
                (left, right)
            }
            Geometry::Circle(c) => (c.centroid_y, c.centroid_y),
        }
    }
}

impl From<Rectangle> for Geometry {
    fn from(r: Rectangle) -> Self {
        Geometry::Rectangle(r)
    }
}

impl From<Trapezoid> for Geometry {
    fn from(t: Trapezoid) -> Self {
        Geometry::Trapezoid(t)
    }
}

impl From<Circle> for Geometry {
    fn from(c: Circle) -> Self {
        Geometry::Circle(c)
    }
}
