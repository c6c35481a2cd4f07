//! Relay Throughput Benchmarks
//!
//! Measures the append hot path, flush cost at various batch sizes, and the
//! record codec.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use pencil_relay::record::{codec, SampleRecord};
use pencil_relay::relay::{PencilRelay, PendingSpan, SampleInput};
use pencil_relay::replay::{synthetic_stroke, RecordingSink, ReplayDriver, StrokeShape};

fn discard(_: PendingSpan, _: &[SampleRecord]) {}

/// Append cost per record, no flushes
fn bench_append(c: &mut Criterion) {
    let mut group = c.benchmark_group("relay_append");
    group.throughput(Throughput::Elements(1));

    let input = SampleInput {
        pending_estimates: 2,
        is_predicted: true,
        ..SampleInput::contact(100.0, 200.0, 0.5)
    };

    group.bench_function("sample", |b| {
        let mut storage = vec![SampleRecord::default(); 1000];
        let mut relay = PencilRelay::new();
        relay.register(discard, &mut storage);
        b.iter(|| relay.append_sample(black_box(&input)))
    });

    group.bench_function("barrel_tap", |b| {
        let mut storage = vec![SampleRecord::default(); 1000];
        let mut relay = PencilRelay::new();
        relay.register(discard, &mut storage);
        b.iter(|| relay.append_barrel_tap())
    });

    group.bench_function("unregistered", |b| {
        let mut relay: PencilRelay<'_, fn(PendingSpan, &[SampleRecord])> = PencilRelay::new();
        b.iter(|| relay.append_sample(black_box(&input)))
    });

    group.finish();
}

/// Append a batch then flush into a decoding consumer
fn bench_flush_batches(c: &mut Criterion) {
    let mut group = c.benchmark_group("relay_flush_batch");

    for batch in [1usize, 8, 64, 512] {
        group.throughput(Throughput::Elements(batch as u64));
        group.bench_with_input(BenchmarkId::new("decode", batch), &batch, |b, &batch| {
            let mut storage = vec![SampleRecord::default(); 1000];
            let mut relay = PencilRelay::new();
            relay.register(RecordingSink::new(), &mut storage);
            let input = SampleInput::contact(1.0, 2.0, 0.3);

            b.iter(|| {
                for _ in 0..batch {
                    relay.append_sample(&input);
                }
                black_box(relay.flush())
            })
        });
    }

    group.finish();
}

/// Full replay of a synthetic stroke
fn bench_replay(c: &mut Criterion) {
    let mut group = c.benchmark_group("relay_replay");
    let events = synthetic_stroke(2000, StrokeShape::default());
    group.throughput(Throughput::Elements(events.len() as u64));

    for flush_every in [1usize, 16, 128] {
        group.bench_with_input(
            BenchmarkId::new("flush_every", flush_every),
            &flush_every,
            |b, &flush_every| {
                b.iter(|| {
                    let mut storage = vec![SampleRecord::default(); 1000];
                    let mut relay = PencilRelay::new();
                    relay.register(discard, &mut storage);
                    black_box(ReplayDriver::new(flush_every).run(&mut relay, events.iter().copied()))
                })
            },
        );
    }

    group.finish();
}

/// Byte image encode/decode of a full buffer
fn bench_codec(c: &mut Criterion) {
    let mut group = c.benchmark_group("record_codec");
    let records: Vec<SampleRecord> = (0..1000)
        .map(|i| SampleInput::contact(i as f32, i as f32, 0.5).to_record())
        .collect();
    let image = codec::encode_all(&records);
    group.throughput(Throughput::Bytes(image.len() as u64));

    group.bench_function("encode_all", |b| {
        b.iter(|| black_box(codec::encode_all(black_box(&records))))
    });
    group.bench_function("decode_all", |b| {
        b.iter(|| black_box(codec::decode_all(black_box(&image))))
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_append,
    bench_flush_batches,
    bench_replay,
    bench_codec
);
criterion_main!(benches);
