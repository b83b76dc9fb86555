//! Benchmarks for curve generation and beam deflection

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use mnkappa::prelude::*;

fn steel_cross_section() -> CrossSection {
    let steel = Steel::new(355.0)
        .with_ultimate_strength(400.0)
        .with_failure_strain(0.15)
        .material(SectionRole::Girder)
        .unwrap();
    CrossSection::new(vec![
        Section::new(Rectangle::centred(0.0, 15.0, 200.0).unwrap(), steel.clone()),
        Section::new(Rectangle::centred(15.0, 185.0, 9.5).unwrap(), steel.clone()),
        Section::new(Rectangle::centred(185.0, 200.0, 200.0).unwrap(), steel),
    ])
    .unwrap()
}

fn composite_cross_section() -> CrossSection {
    let concrete = Concrete::new(38.0).material(SectionRole::Slab).unwrap();
    let steel = Steel::new(355.0)
        .with_ultimate_strength(400.0)
        .with_failure_strain(0.15)
        .material(SectionRole::Girder)
        .unwrap();
    CrossSection::new(vec![
        Section::new(Rectangle::centred(0.0, 100.0, 2000.0).unwrap(), concrete),
        Section::new(Rectangle::centred(100.0, 115.0, 200.0).unwrap(), steel.clone()),
        Section::new(Rectangle::centred(115.0, 285.0, 9.5).unwrap(), steel.clone()),
        Section::new(Rectangle::centred(285.0, 300.0, 200.0).unwrap(), steel),
    ])
    .unwrap()
}

fn benchmark_steel_curve(c: &mut Criterion) {
    let cross_section = steel_cross_section();
    c.bench_function("mkappa_curve_steel", |b| {
        b.iter(|| {
            let curve = MKappaCurve::new(&cross_section).compute();
            black_box(&curve);
        })
    });
}

fn benchmark_composite_curve(c: &mut Criterion) {
    let cross_section = composite_cross_section();
    c.bench_function("mkappa_curve_composite", |b| {
        b.iter(|| {
            let curve = MKappaCurve::new(&cross_section).positive_only().compute();
            black_box(&curve);
        })
    });
}

fn benchmark_single_point(c: &mut Criterion) {
    let cross_section = composite_cross_section();
    let anchor = StrainPosition::new(-0.002, 0.0, MaterialKind::Concrete);
    c.bench_function("mkappa_point_composite", |b| {
        b.iter(|| {
            let point = MKappaByStrainPosition::new(&cross_section, anchor, true)
                .solve()
                .unwrap();
            black_box(&point);
        })
    });
}

fn benchmark_beam_deflection(c: &mut Criterion) {
    let loading = Loading::uniform(8000.0, 10.0).unwrap();
    let beam = Beam::new(composite_cross_section(), 8000.0, 10, loading).unwrap();
    c.bench_function("beam_deflection_composite", |b| {
        b.iter(|| {
            let deflection = beam.deflection().unwrap();
            black_box(deflection);
        })
    });
}

criterion_group!(
    benches,
    benchmark_steel_curve,
    benchmark_composite_curve,
    benchmark_single_point,
    benchmark_beam_deflection,
);

criterion_main!(benches);
