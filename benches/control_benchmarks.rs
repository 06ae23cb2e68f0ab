//! Registry and control hook benchmarks

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use rvpnse_netns::{control_with, NativeSocket, ProtectFunc, ProtectRegistry, RawConn, Result};
use std::hint::black_box;
use std::io;
use std::sync::Arc;
use std::thread;

struct BenchConn {
    fd: NativeSocket,
}

impl RawConn for BenchConn {
    fn control(&self, f: &mut dyn FnMut(NativeSocket)) -> io::Result<()> {
        f(self.fd);
        Ok(())
    }
}

fn noop_protector() -> ProtectFunc {
    Arc::new(|fd: NativeSocket| -> Result<()> {
        black_box(fd);
        Ok(())
    })
}

fn registry_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("protect_registry");

    group.bench_function("get_empty", |b| {
        let registry = ProtectRegistry::new();
        b.iter(|| black_box(registry.get()));
    });

    group.bench_function("get_registered", |b| {
        let registry = ProtectRegistry::new();
        registry.set(Some(noop_protector()));
        b.iter(|| black_box(registry.get()));
    });

    group.bench_function("set_replace", |b| {
        let registry = ProtectRegistry::new();
        let protector = noop_protector();
        b.iter(|| registry.set(Some(Arc::clone(&protector))));
    });

    group.finish();
}

fn control_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("control_hook");
    let conn = BenchConn { fd: 3 };

    group.bench_function("no_protector", |b| {
        let registry = ProtectRegistry::new();
        b.iter(|| control_with(&registry, "tcp", "10.0.0.1:443", black_box(&conn)).unwrap());
    });

    group.bench_function("with_protector", |b| {
        let registry = ProtectRegistry::new();
        registry.set(Some(noop_protector()));
        b.iter(|| control_with(&registry, "tcp", "10.0.0.1:443", black_box(&conn)).unwrap());
    });

    group.finish();
}

fn contention_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("control_contention");

    for threads in [2usize, 4, 8] {
        group.bench_with_input(BenchmarkId::new("parallel_dials", threads), &threads, |b, &threads| {
            let registry = ProtectRegistry::new();
            registry.set(Some(noop_protector()));
            b.iter(|| {
                thread::scope(|s| {
                    for fd in 0..threads {
                        let registry = &registry;
                        s.spawn(move || {
                            let conn = BenchConn {
                                fd: fd as NativeSocket,
                            };
                            for _ in 0..100 {
                                control_with(registry, "tcp", "", &conn).unwrap();
                            }
                        });
                    }
                });
            });
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    registry_benchmark,
    control_benchmark,
    contention_benchmark
);
criterion_main!(benches);
