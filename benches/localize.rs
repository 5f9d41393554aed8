use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};
use nalgebra::{Matrix3, Vector3};
use num_complex::Complex64;

use skyloc::{sky_map_tdoa, sky_map_tdoa_snr, DetectorTrigger, DistancePrior, SkyMapParams};

/// A three-detector event loud enough to keep the amplitude phase busy.
fn detectors() -> Vec<DetectorTrigger> {
    let responses = [
        Matrix3::new(
            -0.392_614_1,
            -0.077_613_0,
            -0.247_388_6,
            -0.077_613_0,
            0.319_524_4,
            0.227_998_1,
            -0.247_388_6,
            0.227_998_1,
            0.073_090_3,
        ),
        Matrix3::new(
            0.411_280_9,
            0.140_209_7,
            0.247_294_3,
            0.140_209_7,
            -0.109_005_6,
            -0.181_615_7,
            0.247_294_3,
            -0.181_615_7,
            -0.302_275_5,
        ),
        Matrix3::new(
            0.243_874_0,
            -0.099_083_8,
            -0.232_576_2,
            -0.099_083_8,
            -0.447_825_8,
            0.187_833_1,
            -0.232_576_2,
            0.187_833_1,
            0.203_951_8,
        ),
    ];
    let locations = [
        Vector3::new(-2.161_414_926_36e6, -3.834_695_178_89e6, 4.600_350_226_64e6),
        Vector3::new(-7.427_604_472_38e4, -5.496_283_719_71e6, 3.224_257_017_44e6),
        Vector3::new(4.546_374_099e6, 8.429_896_976_26e5, 4.378_576_962_41e6),
    ];
    let toas = [0.0, 0.003, -0.001];
    let snrs = [10.0, 8.0, 9.0];

    (0..3)
        .map(|i| DetectorTrigger {
            response: responses[i],
            location: locations[i],
            horizon: 100.0,
            toa: toas[i],
            snr: Complex64::new(snrs[i], 0.0),
            s2_toa: 1e-6,
        })
        .collect()
}

fn bench_tdoa(c: &mut Criterion) {
    let dets = detectors();
    c.bench_function("sky_map_tdoa/npix=3072", |b| {
        b.iter(|| sky_map_tdoa(black_box(3072), black_box(0.7), &dets).unwrap())
    });
}

fn bench_tdoa_snr(c: &mut Criterion) {
    let dets = detectors();
    let params = SkyMapParams::default();
    c.bench_function("sky_map_tdoa_snr/npix=768", |b| {
        b.iter(|| {
            sky_map_tdoa_snr(
                black_box(768),
                black_box(0.7),
                &dets,
                1.0,
                1000.0,
                DistancePrior::UniformInVolume,
                &params,
            )
            .unwrap()
        })
    });
}

criterion_group!(benches, bench_tdoa, bench_tdoa_snr);
criterion_main!(benches);
