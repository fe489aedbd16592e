use criterion::{criterion_group, criterion_main, Criterion};

use deepzoom_core::{
    CameraState, ComplexDD, DoubleDouble, FractalMode, Frame, FrameUniforms, OrbitSeed,
    PrecisionTier, ReferenceOrbit, TierSelection,
};
use deepzoom_render::ReferenceEvaluator;

fn seahorse() -> ComplexDD {
    ComplexDD::from_decimal_strs(
        "-0.743643887037158704752191506114774",
        "0.131825904205311970493132056385139",
    )
    .unwrap()
}

fn bench_reference_orbit(c: &mut Criterion) {
    let seed = OrbitSeed {
        center: seahorse(),
        mode: FractalMode::Mandelbrot,
        budget: 20_000,
    };
    c.bench_function("reference_orbit_20k", |b| {
        b.iter(|| ReferenceOrbit::compute(seed));
    });
}

fn bench_tier(c: &mut Criterion, name: &str, tier: PrecisionTier, scale: f64) {
    let camera = CameraState {
        center: seahorse(),
        scale: DoubleDouble::from(scale),
    };
    let max_iterations = 2_000;
    let orbit = ReferenceOrbit::compute(OrbitSeed {
        center: camera.center,
        mode: FractalMode::Mandelbrot,
        budget: max_iterations,
    });
    let frame = Frame {
        uniforms: FrameUniforms::default(),
        selection: TierSelection {
            tier,
            max_iterations,
            depth: 0.0,
        },
        camera: &camera,
        mode: FractalMode::Mandelbrot,
        orbit: Some(&orbit),
    };
    let evaluator = ReferenceEvaluator::new(160, 120).unwrap();

    c.bench_function(name, |b| {
        b.iter(|| evaluator.evaluate_with(&frame, tier).unwrap());
    });
}

fn bench_frames(c: &mut Criterion) {
    bench_tier(c, "float_160x120", PrecisionTier::Float, 1e-3);
    bench_tier(c, "extended_160x120", PrecisionTier::Extended, 1e-8);
    bench_tier(c, "perturbation_160x120", PrecisionTier::Perturbation, 1e-14);
}

criterion_group!(benches, bench_reference_orbit, bench_frames);
criterion_main!(benches);
