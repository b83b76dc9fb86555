//! End-to-end scenarios: steel girder, composite cross-section, beam deflection

use approx::assert_relative_eq;
use mnkappa::prelude::*;

/// HEB-200-shaped welded profile: 200 x 15 flanges, 9.5 x 170 web
fn heb200_sections(top_edge: f64, material: &Material) -> Vec<Section> {
    vec![
        Section::new(
            Rectangle::centred(top_edge, top_edge + 15.0, 200.0).unwrap(),
            material.clone(),
        ),
        Section::new(
            Rectangle::centred(top_edge + 15.0, top_edge + 185.0, 9.5).unwrap(),
            material.clone(),
        ),
        Section::new(
            Rectangle::centred(top_edge + 185.0, top_edge + 200.0, 200.0).unwrap(),
            material.clone(),
        ),
    ]
}

fn s355() -> Material {
    Steel::new(355.0)
        .with_ultimate_strength(400.0)
        .with_failure_strain(0.15)
        .material(SectionRole::Girder)
        .unwrap()
}

/// 2000 x 100 C30/35 slab on top of the HEB 200 profile
fn composite_cross_section() -> CrossSection {
    let concrete = Concrete::new(38.0).material(SectionRole::Slab).unwrap();
    let mut sections = vec![Section::new(
        Rectangle::centred(0.0, 100.0, 2000.0).unwrap(),
        concrete,
    )];
    sections.extend(heb200_sections(100.0, &s355()));
    CrossSection::new(sections).unwrap()
}

#[test]
fn heb200_reaches_a_plastic_plateau() {
    let cross_section = CrossSection::new(heb200_sections(0.0, &s355())).unwrap();
    let curve = MKappaCurve::new(&cross_section).positive_only().compute();
    assert!(!curve.is_empty());

    // the plateau clears the required moment with margin
    let maximum = curve.maximum_moment();
    assert!(maximum >= 78.0e6, "plateau at {maximum} below 78 MNmm");
    assert!(maximum < 3.0e8, "plateau at {maximum} beyond any plausible value");

    // elastic-plastic transition: the extreme fibre reaches the yield strain
    let kappa_yield = 355.0 / 210_000.0 / 100.0;
    let transition = curve
        .points()
        .iter()
        .find(|p| (p.curvature - kappa_yield).abs() < 1e-8 * kappa_yield.max(1.0))
        .expect("transition point missing");
    let second_moment = (200.0 * 200.0_f64.powi(3) - 190.5 * 170.0_f64.powi(3)) / 12.0;
    let elastic_moment = 210_000.0 * second_moment * kappa_yield;
    assert_relative_eq!(transition.moment, elastic_moment, max_relative = 1e-3);

    // equilibrium at every point
    for point in curve.points() {
        assert!(point.axial_force.abs() <= 10.0);
    }
}

#[test]
fn composite_section_maximum_moment() {
    let curve = MKappaCurve::new(&composite_cross_section())
        .positive_only()
        .compute();
    let maximum = curve.maximum_moment();
    assert!(
        (4.3e8..6.4e8).contains(&maximum),
        "maximum positive moment {maximum} outside the expected band around 550 MNmm"
    );
    // neutral axis at the peak sits near the underside of the slab
    let peak = curve
        .points()
        .iter()
        .max_by(|a, b| a.moment.total_cmp(&b.moment))
        .unwrap();
    let neutral_axis = peak.neutral_axis.expect("peak must carry a neutral axis");
    assert!(
        (30.0..130.0).contains(&neutral_axis),
        "neutral axis {neutral_axis} far from the slab underside"
    );
}

#[test]
fn single_point_from_concrete_anchor() {
    let cross_section = composite_cross_section();
    let anchor = StrainPosition::new(-0.002, 0.0, MaterialKind::Concrete);
    let point = MKappaByStrainPosition::new(&cross_section, anchor, true)
        .solve()
        .unwrap();

    // equilibrium within the default 10 N
    assert!(point.axial_force.abs() < 10.0);

    // the converged state reproduces the anchor
    let z_n = point.neutral_axis.unwrap();
    assert_relative_eq!(point.curvature * (0.0 - z_n), -0.002, max_relative = 1e-9);

    // expected solution region (M ~ 5.3e8 Nmm, kappa ~ 3.3e-5 1/mm, z_n ~ 60 mm)
    assert!(
        (4.4e8..5.8e8).contains(&point.moment),
        "moment {} outside the expected band",
        point.moment
    );
    assert!(
        (2.8e-5..3.9e-5).contains(&point.curvature),
        "curvature {} outside the expected band",
        point.curvature
    );
    assert!(
        (48.0..68.0).contains(&z_n),
        "neutral axis {z_n} outside the expected band"
    );

    // round-trip: re-evaluating the profile reproduces the point
    let profile = StrainProfile::linear(point.curvature, z_n);
    let forces = cross_section.internal_forces(&profile);
    assert_relative_eq!(forces.moment, point.moment, max_relative = 1e-12);
    assert_relative_eq!(forces.axial_force, point.axial_force, max_relative = 1e-9);
}

#[test]
fn uniform_load_closed_forms() {
    let loading = Loading::uniform(8000.0, 10.0).unwrap();
    assert_relative_eq!(loading.maximum_moment(), 8.0e7);
    assert_relative_eq!(loading.transversal_shear(0.0), 40_000.0);
    assert_relative_eq!(loading.transversal_shear(8000.0), -40_000.0);
    assert_relative_eq!(loading.moment(2000.0), 6.0e7);
    assert_relative_eq!(loading.transversal_shear(4000.0), 0.0);
    assert_relative_eq!(loading.loading(), 80_000.0);
}

#[test]
fn single_load_closed_forms() {
    let loading =
        Loading::single_loads(8000.0, vec![SingleLoad::new(4000.0, 10.0)]).unwrap();
    assert_relative_eq!(loading.maximum_moment(), 20_000.0);
    assert_relative_eq!(loading.transversal_shear(0.0), 5.0);
    assert_relative_eq!(loading.transversal_shear(8000.0), -5.0);
    assert_relative_eq!(loading.moment(2000.0), 10_000.0);
    assert_relative_eq!(loading.loading(), 10.0);
}

#[test]
fn composite_beam_deflection_with_slip() {
    let reference = Loading::uniform(8000.0, 1.0).unwrap();
    let stud = HeadedStud::new(19.0, 100.0, 450.0, 38.0).unwrap();
    let connectors = ShearConnector::spaced(stud, 8000.0, 250.0);
    let beam = CompositeBeam::new(
        composite_cross_section(),
        8000.0,
        10,
        reference,
        connectors,
    )
    .unwrap();

    // deflection grows monotonically with the load
    let curve = beam.load_deflection(4000.0, &[2.0, 6.0, 10.0]);
    assert!(curve.failed.is_none(), "load steps failed: {:?}", curve.failed);
    assert_eq!(curve.steps.len(), 3);
    assert!(curve.steps[0].deflection > 0.0);
    for pair in curve.steps.windows(2) {
        assert!(pair[1].deflection > pair[0].deflection);
    }

    // slip vanishes at mid-span, where the loading is symmetric
    let loading = Loading::uniform(8000.0, 10.0).unwrap();
    let solution = beam.solve_slip(&loading).unwrap();
    let peak_slip = solution
        .slip
        .iter()
        .fold(0.0_f64, |acc, s| acc.max(s.abs()));
    assert!(
        solution.slip[5].abs() <= 0.2 * peak_slip + 1e-9,
        "mid-span slip {} not small against peak {peak_slip}",
        solution.slip[5]
    );

    // a hopeless overload yields a failed step, not an extrapolation
    let overload = beam.load_deflection(4000.0, &[10.0, 1e5]);
    let failed = overload.failed.expect("overload must produce a failed step");
    assert_eq!(failed.factor, 1e5);
    assert_eq!(overload.steps.len(), 1);
}

#[test]
fn zero_state_is_stress_free() {
    let cross_section = CrossSection::new(heb200_sections(0.0, &s355())).unwrap();
    let (profile, point) = MKappaByConstantCurvature::new(&cross_section, 0.0)
        .solve()
        .unwrap();
    assert_eq!(profile.strain_at(123.0), 0.0);
    assert_eq!(point.moment, 0.0);
    assert_eq!(point.axial_force, 0.0);
}

#[test]
fn curve_round_trip_reproduces_every_point() {
    let cross_section = composite_cross_section();
    let curve = MKappaCurve::new(&cross_section).positive_only().compute();
    for point in curve.points().iter().filter(|p| p.curvature > 0.0) {
        let profile = StrainProfile::linear(point.curvature, point.neutral_axis.unwrap());
        let forces = cross_section.internal_forces(&profile);
        assert_relative_eq!(forces.moment, point.moment, max_relative = 1e-12);
        assert!((forces.axial_force - point.axial_force).abs() < 1e-6);
    }
}
