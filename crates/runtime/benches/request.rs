// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Benchmarks for the request path with an identity backend, so the
//! figures reflect binding, marshalling and result extraction only.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use runtime::{FnBackend, RuntimeConfig, Session, TensorMap};
use signature_ir::{SignatureDef, SignatureSet, TensorSpec};
use tensor_core::{ElementKind, FlatBuffer, NestedArray, Shape};

fn identity_session() -> Session<impl runtime::Backend> {
    let sig = SignatureDef::new("identity")
        .with_input(TensorSpec::new("x", ElementKind::Float32))
        .with_output(TensorSpec::new("y", ElementKind::Float32));
    let set = SignatureSet::new(vec![sig], None).validate().unwrap();
    let backend = FnBackend::new(set, |_sig: &SignatureDef, inputs: &TensorMap| {
        Ok(TensorMap::from([("y".to_string(), inputs["x"].clone())]))
    });
    let config = RuntimeConfig {
        enable_profiling: false,
        ..Default::default()
    };
    Session::with_config(backend, config).unwrap()
}

fn batch(rows: usize, cols: usize) -> NestedArray {
    NestedArray::seq((0..rows).map(|r| {
        NestedArray::seq((0..cols).map(move |c| (r * cols + c) as f64 * 0.5))
    }))
}

fn bench_submit_nested(c: &mut Criterion) {
    let session = identity_session();
    let mut group = c.benchmark_group("submit_nested_f64_to_f32");
    for rows in [1usize, 16, 64] {
        let input = batch(rows, 784);
        group.bench_with_input(BenchmarkId::from_parameter(rows), &input, |b, input| {
            b.iter(|| {
                let mut request = session.request();
                request.bind_input("x", input.clone()).unwrap();
                let result = request.submit().unwrap();
                black_box(result.output("y").unwrap().flat::<f32>().unwrap())
            })
        });
    }
    group.finish();
}

fn bench_submit_buffer(c: &mut Criterion) {
    let session = identity_session();
    let buffer = FlatBuffer::zeros(Shape::matrix(64, 784), ElementKind::Float32).unwrap();
    c.bench_function("submit_buffer_f32", |b| {
        b.iter(|| {
            let mut request = session.request();
            request.bind_buffer("x", black_box(buffer.clone())).unwrap();
            black_box(request.submit().unwrap())
        })
    });
}

criterion_group!(benches, bench_submit_nested, bench_submit_buffer);
criterion_main!(benches);
