//! Criterion benchmarks for the render loop.
//!
//! Run with: cargo bench -p klang-synth

use std::sync::Arc;

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use klang_synth::{Engine, FilterMode, SharedParams, Waveform};

const SAMPLE_RATE: f32 = 48000.0;
const BLOCK_SIZES: &[usize] = &[64, 256, 1024];

fn engine_with(waveform: Waveform, voices: usize, filter: FilterMode) -> Engine {
    let params = Arc::new(SharedParams::default());
    params.osc[0].set_waveform(waveform);
    params.filter.set_mode(filter);
    params.filter.cutoff_base.set(1.0);
    params.filter.resonance.set(1.0);
    for k in 0..voices {
        params.set_gate(k, true);
    }
    Engine::new(SAMPLE_RATE, params)
}

fn bench_single_voice_waveforms(c: &mut Criterion) {
    let mut group = c.benchmark_group("render_1voice");

    let waveforms = [
        ("sine", Waveform::Sine),
        ("pulse", Waveform::Pulse),
        ("sawtooth", Waveform::Sawtooth),
        ("triangle", Waveform::Triangle),
        ("noise", Waveform::Noise),
        ("poly17", Waveform::Poly17),
        ("poly17poly5", Waveform::Poly17Poly5),
    ];

    for (name, waveform) in waveforms {
        for &block in BLOCK_SIZES {
            let mut engine = engine_with(waveform, 1, FilterMode::None);
            let mut buffer = vec![0i16; block * 2];
            group.bench_with_input(BenchmarkId::new(name, block), &block, |b, _| {
                b.iter(|| {
                    engine.render(&mut buffer);
                    black_box(buffer[0])
                })
            });
        }
    }

    group.finish();
}

fn bench_polyphony(c: &mut Criterion) {
    let mut group = c.benchmark_group("render_polyphony");

    for voices in [1usize, 8, 24] {
        let mut engine = engine_with(Waveform::Sawtooth, voices, FilterMode::LowPass4);
        let mut buffer = vec![0i16; 512];
        group.bench_with_input(
            BenchmarkId::from_parameter(voices),
            &voices,
            |b, _| {
                b.iter(|| {
                    engine.render(&mut buffer);
                    black_box(buffer[0])
                })
            },
        );
    }

    group.finish();
}

fn bench_filter_modes(c: &mut Criterion) {
    let mut group = c.benchmark_group("render_filter");

    let modes = [
        ("bypass", FilterMode::None),
        ("lp4", FilterMode::LowPass4),
        ("hp4", FilterMode::HighPass4),
        ("notch", FilterMode::Notch),
    ];

    for (name, mode) in modes {
        let mut engine = engine_with(Waveform::Sawtooth, 4, mode);
        let mut buffer = vec![0i16; 512];
        group.bench_function(name, |b| {
            b.iter(|| {
                engine.render(&mut buffer);
                black_box(buffer[0])
            })
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_single_voice_waveforms,
    bench_polyphony,
    bench_filter_modes
);
criterion_main!(benches);
