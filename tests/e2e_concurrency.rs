//! E2E tests for concurrent producers and readers
//!
//! One producer thread per series pushes while reader threads query at the
//! same time, the way a render loop runs next to signal generators.

use sigscope::signal::generator::{SignalGenerator, Waveform};
use sigscope::signal::producer::SignalProducer;
use sigscope::{ChunkedArena, Database, DenseSeries, Sample, SparseSeries, TimeSeries, TsSample};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

/// Values already written never change while the arena keeps growing
#[test]
fn test_index_stability_under_growth() {
    let mut arena = ChunkedArena::new(64);
    let snapshot: Vec<u64> = (0..100).map(|i| i * 3).collect();
    arena.extend(snapshot.iter().copied());

    for i in 0..10_000u64 {
        arena.push(i);
        if i % 1000 == 0 {
            for (idx, expected) in snapshot.iter().enumerate() {
                assert_eq!(arena.at(idx), Ok(expected));
            }
        }
    }
    assert_eq!(arena.len(), 10_100);
}

/// Readers only ever observe a growing span while one producer pushes
#[test]
fn test_readers_observe_monotonic_span() {
    let series = Arc::new(DenseSeries::with_chunk_size(0.0, 1.0, 128).unwrap());
    let done = Arc::new(AtomicBool::new(false));

    let readers: Vec<_> = (0..3)
        .map(|_| {
            let series = Arc::clone(&series);
            let done = Arc::clone(&done);
            thread::spawn(move || {
                let mut last_end = 0.0;
                let mut out = vec![TsSample::default(); 64];
                while !done.load(Ordering::Acquire) {
                    let (start, end) = series.get_span();
                    assert_eq!(start, 0.0);
                    assert!(end >= last_end, "Span went backwards");
                    last_end = end;

                    let written = series.get_samples(&mut out, 0.0, end.max(1.0) / 64.0, 64);
                    for bin in &out[..written] {
                        if !bin.is_empty() {
                            assert!(bin.min <= bin.average && bin.average <= bin.max);
                            assert!(bin.max < series.size() as f64);
                        }
                    }
                }
            })
        })
        .collect();

    for i in 0..50_000 {
        series.push_sample(i as f64);
    }
    done.store(true, Ordering::Release);

    for reader in readers {
        reader.join().unwrap();
    }
    assert_eq!(series.get_span(), (0.0, 50_000.0));
}

/// Producers registered in a database are queryable while running and after stop
#[test]
fn test_producers_with_registry() {
    let db = Database::new();
    let mut handles = Vec::new();

    for (name, waveform) in [("sine", Waveform::Sine), ("noise", Waveform::Noise)] {
        let series = Arc::new(DenseSeries::with_chunk_size(0.0, 1.0 / 8000.0, 256).unwrap());
        db.register(name, Arc::clone(&series)).unwrap();
        let generator = SignalGenerator::new(waveform, 100.0, 8000);
        let handle = SignalProducer::new(generator, series)
            .unpaced()
            .with_block_size(64)
            .with_limit(20_000)
            .start(name)
            .unwrap();
        handles.push(handle);
    }

    // Query while the producers run
    for _ in 0..20 {
        for name in db.names() {
            let series = db.get(&name).unwrap();
            let (start, end) = series.query_span().unwrap();
            if end > start {
                let bin = series.get_sample(start, end - start);
                assert!(bin.min >= -0.5 && bin.max <= 0.5);
            }
        }
        thread::sleep(Duration::from_millis(1));
    }

    for handle in &mut handles {
        while handle.is_alive() {
            thread::sleep(Duration::from_millis(1));
        }
        handle.stop();
    }

    assert_eq!(db.num_samples(), 40_000);
    let sine = db.get("sine").unwrap();
    assert_eq!(sine.size(), 20_000);
}

/// Sparse pushes from one thread are seen in order by a concurrent reader
#[test]
fn test_sparse_concurrent_reader() {
    let series = Arc::new(SparseSeries::new());
    let writer_series = Arc::clone(&series);

    let writer = thread::spawn(move || {
        for i in 0..5_000 {
            writer_series
                .push(Sample::new(i as f64, (i % 7) as f64))
                .unwrap();
        }
    });

    let mut last_len = 0;
    while last_len < 5_000 {
        let range = series.range(f64::NEG_INFINITY, f64::INFINITY);
        let len = range.len();
        assert!(len >= last_len);
        if let (Some(first), Some(last)) = (range.first(), range.last()) {
            assert_eq!(first.time, 0.0);
            assert_eq!(last.time, (len - 1) as f64);
        }
        last_len = len;
    }

    writer.join().unwrap();
    assert_eq!(series.span(), Ok((0.0, 4999.0)));
}

/// A reader holding a range can keep querying while a push is queued
#[test]
fn test_held_range_with_pending_push() {
    let series = Arc::new(SparseSeries::new());
    series.push(Sample::new(0.0, 1.0)).unwrap();
    series.push(Sample::new(1.0, 2.0)).unwrap();

    let (tx, rx) = mpsc::channel();
    let reader_series = Arc::clone(&series);
    let reader = thread::spawn(move || {
        let range = reader_series.range(0.0, 10.0);

        let writer_series = Arc::clone(&reader_series);
        let writer = thread::spawn(move || writer_series.push(Sample::new(2.0, 3.0)));
        thread::sleep(Duration::from_millis(100));

        let mean = reader_series.mean(0.0, 10.0);
        let max = reader_series.max(0.0, 10.0);
        tx.send((range.len(), mean, max)).unwrap();
        writer.join().unwrap()
    });

    let (held, mean, max) = rx
        .recv_timeout(Duration::from_secs(3))
        .expect("second read blocked behind a queued push");
    assert_eq!(held, 2);
    assert!(mean == 1.5 || mean == 2.0);
    assert!(max == Ok(2.0) || max == Ok(3.0));

    assert_eq!(reader.join().unwrap(), Ok(2));
    assert_eq!(series.size(), 3);
}
