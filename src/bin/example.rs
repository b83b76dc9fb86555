//! Moment-curvature example - HEB 200 girder with a concrete slab

use anyhow::Result;
use mnkappa::prelude::*;

fn heb200(material: &Material) -> Vec<Section> {
    vec![
        Section::new(
            Rectangle::centred(100.0, 115.0, 200.0).unwrap(),
            material.clone(),
        ),
        Section::new(
            Rectangle::centred(115.0, 285.0, 9.5).unwrap(),
            material.clone(),
        ),
        Section::new(
            Rectangle::centred(285.0, 300.0, 200.0).unwrap(),
            material.clone(),
        ),
    ]
}

fn main() -> Result<()> {
    env_logger::init();

    println!("=== Moment-Curvature Example: Composite Beam ===\n");

    // S355 girder material
    let steel = Steel::new(355.0)
        .with_ultimate_strength(400.0)
        .with_failure_strain(0.15)
        .material(SectionRole::Girder)?;

    // C30/35 slab, 2000 x 100 on top of the girder
    let concrete = Concrete::new(38.0).material(SectionRole::Slab)?;
    let slab = Section::new(Rectangle::centred(0.0, 100.0, 2000.0)?, concrete);

    let mut sections = vec![slab];
    sections.extend(heb200(&steel));
    let cross_section = CrossSection::new(sections)?;

    // moment-curvature curve of the composite section
    println!("Computing the moment-curvature curve...");
    let curve = MKappaCurve::new(&cross_section).compute();
    println!(
        "  {} points, {} failed anchors",
        curve.points().len(),
        curve.failures().len()
    );
    println!(
        "  maximum sagging moment: {:.1} kNm",
        curve.maximum_moment() / 1e6
    );
    for point in curve.positive_branch().take(5) {
        println!(
            "  kappa = {:+.3e} 1/mm -> M = {:+.1} kNm",
            point.curvature,
            point.moment / 1e6
        );
    }

    // deflection of a uniformly loaded 8 m span
    println!("\nComputing the beam deflection...");
    let loading = Loading::uniform(8000.0, 10.0)?;
    let beam = Beam::new(cross_section.clone(), 8000.0, 10, loading)?;
    let deflection = beam.deflection()?;
    println!("  mid-span deflection under 10 N/mm: {deflection:.2} mm");

    // the same beam with explicit shear connectors and joint slip
    println!("\nComputing the composite beam with joint slip...");
    let stud = HeadedStud::new(19.0, 100.0, 450.0, 38.0)?;
    let connectors = ShearConnector::spaced(stud, 8000.0, 250.0);
    let loading = Loading::uniform(8000.0, 10.0)?;
    let composite = CompositeBeam::new(cross_section, 8000.0, 10, loading, connectors)?;
    let slip = composite.solve_slip(composite.loading())?;
    println!(
        "  converged after {} iterations, residual {:.2e} Nmm",
        slip.iterations, slip.residual_norm
    );
    let with_slip = composite.deflection_at(4000.0, composite.loading())?;
    println!("  mid-span deflection with slip: {with_slip:.2} mm");

    // curve points serialize for downstream tooling
    if let Some(point) = curve.points().last() {
        let json = serde_json::to_string_pretty(point)?;
        println!("\nUltimate curve point as JSON:\n{json}");
    }

    println!("\n=== Analysis Complete ===");
    Ok(())
}
