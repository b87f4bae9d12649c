//! # HTTP Agent Request Benchmarks
//!
//! | Operation | Target |
//! |-----------|--------|
//! | Request id of a call | < 10µs |
//! | Request id of a 100-path read state | < 100µs |
//! | Nonce generation | < 1µs |
//! | Ed25519 envelope signing | < 100µs |

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rand::RngCore;

use http_agent::adapters::encode_envelope;
use http_agent::{
    CanisterRequest, Ed25519Identity, EnvelopeSigner, Expiry, Identity, Nonce, NonceGenerator,
    NoncePacking, Principal, ReadStateRequest, RequestContent,
};

fn call_content(arg_len: usize) -> RequestContent {
    let mut arg = vec![0u8; arg_len];
    rand::thread_rng().fill_bytes(&mut arg);

    RequestContent::Call(CanisterRequest {
        canister_id: Principal::from_slice(&[0, 0, 0, 0, 0, 0, 0, 1, 1, 1]).unwrap(),
        method_name: "transfer".to_string(),
        arg,
        sender: Principal::anonymous(),
        ingress_expiry: Expiry::from_millis(1_700_000_000_000),
        nonce: Some(Nonce::new([7; 8])),
    })
}

fn read_state_content(paths: usize) -> RequestContent {
    RequestContent::ReadState(ReadStateRequest {
        paths: (0..paths)
            .map(|i| {
                vec![
                    b"request_status".to_vec(),
                    (i as u64).to_be_bytes().to_vec(),
                    b"reply".to_vec(),
                ]
            })
            .collect(),
        sender: Principal::anonymous(),
        ingress_expiry: Expiry::from_millis(1_700_000_000_000),
        nonce: None,
    })
}

fn bench_request_id(c: &mut Criterion) {
    let mut group = c.benchmark_group("request-id");

    for arg_len in [0usize, 1_024, 65_536] {
        let content = call_content(arg_len);
        group.throughput(Throughput::Bytes(arg_len as u64));
        group.bench_with_input(BenchmarkId::new("call", arg_len), &content, |b, content| {
            b.iter(|| black_box(content.request_id()))
        });
    }

    for paths in [1usize, 10, 100] {
        let content = read_state_content(paths);
        group.throughput(Throughput::Elements(paths as u64));
        group.bench_with_input(BenchmarkId::new("read_state", paths), &content, |b, content| {
            b.iter(|| black_box(content.request_id()))
        });
    }

    group.finish();
}

fn bench_nonce(c: &mut Criterion) {
    let mut group = c.benchmark_group("nonce");

    for packing in [NoncePacking::WideWrite, NoncePacking::NarrowWrites] {
        let generator = NonceGenerator::with_packing(packing);
        group.bench_function(format!("{:?}", packing), |b| {
            b.iter(|| black_box(generator.generate()))
        });
    }

    group.finish();
}

fn bench_signing(c: &mut Criterion) {
    let mut group = c.benchmark_group("envelope");
    let identity = Ed25519Identity::from_seed([1u8; 32]);
    let signer = EnvelopeSigner::new();
    let content = match call_content(256) {
        RequestContent::Call(mut request) => {
            request.sender = identity.sender();
            RequestContent::Call(request)
        }
        other => other,
    };
    let request_id = content.request_id();

    group.bench_function("sign_ed25519", |b| {
        b.iter(|| black_box(signer.sign(content.clone(), &request_id, &identity).unwrap()))
    });

    let envelope = signer.sign(content.clone(), &request_id, &identity).unwrap();
    group.bench_function("encode_cbor", |b| {
        b.iter(|| black_box(encode_envelope(&envelope).unwrap()))
    });

    group.finish();
}

criterion_group!(benches, bench_request_id, bench_nonce, bench_signing);
criterion_main!(benches);
