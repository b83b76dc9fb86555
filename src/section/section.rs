//! Sections and cross-sections
//!
//! A section pairs one geometry with one material. A cross-section is a
//! validated collection of sections that must not overlap in (y, z). Both are
//! immutable after construction.

use serde::{Deserialize, Serialize};

use crate::error::{MnKappaError, MnKappaResult};
use crate::section::geometry::{Geometry, Rectangle, Trapezoid};
use crate::section::material::{Material, SectionRole};

/// One geometry with one material
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    pub geometry: Geometry,
    pub material: Material,
}

impl Section {
    pub fn new(geometry: impl Into<Geometry>, material: Material) -> Self {
        Self {
            geometry: geometry.into(),
            material,
        }
    }

    pub fn top_edge(&self) -> f64 {
        self.geometry.top_edge()
    }

    pub fn bottom_edge(&self) -> f64 {
        self.geometry.bottom_edge()
    }

    pub fn role(&self) -> SectionRole {
        self.material.role()
    }

    fn describe(&self) -> String {
        format!(
            "{} [{:.1}, {:.1}]",
            self.material.kind(),
            self.top_edge(),
            self.bottom_edge()
        )
    }
}

/// An unordered collection of non-overlapping sections
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrossSection {
    sections: Vec<Section>,
}

/// Overlaps smaller than this are treated as touching edges
const OVERLAP_TOLERANCE: f64 = 1e-9;

impl CrossSection {
    /// Build a cross-section, rejecting overlapping sections
    ///
    /// Touching edges are allowed; circles are point masses and exempt from the
    /// overlap check (embedded reinforcement is the normal case).
    pub fn new(sections: Vec<Section>) -> MnKappaResult<Self> {
        if sections.is_empty() {
            return Err(MnKappaError::EmptyCrossSection);
        }
        for (i, a) in sections.iter().enumerate() {
            for b in sections.iter().skip(i + 1) {
                if a.geometry.is_point() || b.geometry.is_point() {
                    continue;
                }
                let vertical =
                    a.bottom_edge().min(b.bottom_edge()) - a.top_edge().max(b.top_edge());
                let (a_left, a_right) = a.geometry.horizontal_extent();
                let (b_left, b_right) = b.geometry.horizontal_extent();
                let horizontal = a_right.min(b_right) - a_left.max(b_left);
                if vertical > OVERLAP_TOLERANCE && horizontal > OVERLAP_TOLERANCE {
                    return Err(MnKappaError::OverlappingSections(
                        a.describe(),
                        b.describe(),
                    ));
                }
            }
        }
        Ok(Self { sections })
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    pub fn top_edge(&self) -> f64 {
        self.sections
            .iter()
            .map(|s| s.top_edge())
            .fold(f64::INFINITY, f64::min)
    }

    pub fn bottom_edge(&self) -> f64 {
        self.sections
            .iter()
            .map(|s| s.bottom_edge())
            .fold(f64::NEG_INFINITY, f64::max)
    }

    pub fn height(&self) -> f64 {
        self.bottom_edge() - self.top_edge()
    }

    pub fn area(&self) -> f64 {
        self.sections.iter().map(|s| s.geometry.area()).sum()
    }

    pub fn sections_with_role(&self, role: SectionRole) -> impl Iterator<Item = &Section> {
        self.sections.iter().filter(move |s| s.role() == role)
    }

    pub fn has_role(&self, role: SectionRole) -> bool {
        self.sections_with_role(role).next().is_some()
    }

    /// True when both a girder and a slab part are present
    pub fn is_composite(&self) -> bool {
        self.has_role(SectionRole::Girder) && self.has_role(SectionRole::Slab)
    }

    /// The sections of one role as their own cross-section
    pub fn sub_cross_section(&self, role: SectionRole) -> MnKappaResult<CrossSection> {
        let sections: Vec<Section> = self.sections_with_role(role).cloned().collect();
        if sections.is_empty() {
            return Err(MnKappaError::MissingRole(format!("{role:?}")));
        }
        CrossSection::new(sections)
    }

    /// Depth of the horizontal joint between slab and girder parts
    ///
    /// Taken as the bottom edge of the slab sub-cross-section.
    pub fn joint_depth(&self) -> Option<f64> {
        if !self.is_composite() {
            return None;
        }
        Some(
            self.sections_with_role(SectionRole::Slab)
                .map(|s| s.bottom_edge())
                .fold(f64::NEG_INFINITY, f64::max),
        )
    }

    /// Widest slab area geometry, the physical width effective widths reduce
    pub fn slab_width(&self) -> Option<f64> {
        self.sections_with_role(SectionRole::Slab)
            .filter(|s| !s.geometry.is_point())
            .map(|s| {
                let (left, right) = s.geometry.horizontal_extent();
                right - left
            })
            .fold(None, |acc: Option<f64>, w| Some(acc.map_or(w, |a| a.max(w))))
    }

    /// A copy with every slab area geometry scaled horizontally by `factor`
    ///
    /// Used to apply effective widths; point geometries are untouched.
    pub fn with_scaled_slab(&self, factor: f64) -> CrossSection {
        let sections = self
            .sections
            .iter()
            .map(|s| {
                if s.role() != SectionRole::Slab {
                    return s.clone();
                }
                let geometry = match s.geometry {
                    Geometry::Rectangle(r) => {
                        let centre = 0.5 * (r.left_edge + r.right_edge);
                        let half = 0.5 * r.width() * factor;
                        Geometry::Rectangle(Rectangle {
                            left_edge: centre - half,
                            right_edge: centre + half,
                            ..r
                        })
                    }
                    Geometry::Trapezoid(t) => Geometry::Trapezoid(Trapezoid {
                        top_width: t.top_width * factor,
                        bottom_width: t.bottom_width * factor,
                        ..t
                    }),
                    Geometry::Circle(c) => Geometry::Circle(c),
                };
                Section {
                    geometry,
                    material: s.material.clone(),
                }
            })
            .collect();
        CrossSection { sections }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::section::concrete::Concrete;
    use crate::section::geometry::Circle;
    use crate::section::material::Steel;

    fn steel() -> Material {
        Steel::new(355.0)
            .with_failure_strain(0.15)
            .material(SectionRole::Girder)
            .unwrap()
    }

    fn slab_concrete() -> Material {
        Concrete::new(38.0).material(SectionRole::Slab).unwrap()
    }

    #[test]
    fn stacked_rectangles_are_valid() {
        let cs = CrossSection::new(vec![
            Section::new(Rectangle::centred(0.0, 15.0, 200.0).unwrap(), steel()),
            Section::new(Rectangle::centred(15.0, 185.0, 9.5).unwrap(), steel()),
            Section::new(Rectangle::centred(185.0, 200.0, 200.0).unwrap(), steel()),
        ])
        .unwrap();
        assert_eq!(cs.top_edge(), 0.0);
        assert_eq!(cs.bottom_edge(), 200.0);
    }

    #[test]
    fn overlapping_rectangles_rejected() {
        let result = CrossSection::new(vec![
            Section::new(Rectangle::centred(0.0, 100.0, 200.0).unwrap(), steel()),
            Section::new(Rectangle::centred(50.0, 150.0, 200.0).unwrap(), steel()),
        ]);
        assert!(matches!(result, Err(MnKappaError::OverlappingSections(_, _))));
    }

    #[test]
    fn rebar_inside_slab_is_allowed() {
        let cs = CrossSection::new(vec![
            Section::new(Rectangle::centred(0.0, 100.0, 2000.0).unwrap(), slab_concrete()),
            Section::new(Circle::new(12.0, 0.0, 50.0).unwrap(), steel()),
        ]);
        assert!(cs.is_ok());
    }

    #[test]
    fn composite_queries() {
        let cs = CrossSection::new(vec![
            Section::new(Rectangle::centred(0.0, 100.0, 2000.0).unwrap(), slab_concrete()),
            Section::new(Rectangle::centred(100.0, 300.0, 9.5).unwrap(), steel()),
        ])
        .unwrap();
        assert!(cs.is_composite());
        assert_eq!(cs.joint_depth(), Some(100.0));
        assert_eq!(cs.slab_width(), Some(2000.0));
        let girder = cs.sub_cross_section(SectionRole::Girder).unwrap();
        assert_eq!(girder.sections().len(), 1);
    }

    #[test]
    fn slab_scaling_keeps_edges() {
        let cs = CrossSection::new(vec![
            Section::new(Rectangle::centred(0.0, 100.0, 2000.0).unwrap(), slab_concrete()),
            Section::new(Rectangle::centred(100.0, 300.0, 9.5).unwrap(), steel()),
        ])
        .unwrap();
        let scaled = cs.with_scaled_slab(0.5);
        assert_eq!(scaled.slab_width(), Some(1000.0));
        assert_eq!(scaled.top_edge(), 0.0);
        // girder untouched
        let girder = scaled.sub_cross_section(SectionRole::Girder).unwrap();
        match girder.sections()[0].geometry {
            Geometry::Rectangle(r) => assert_eq!(r.width(), 9.5),
            _ => panic!("expected rectangle"),
        }
    }

    #[test]
    fn empty_cross_section_rejected() {
        assert!(matches!(
            CrossSection::new(vec![]),
            Err(MnKappaError::EmptyCrossSection)
        ));
    }
}
