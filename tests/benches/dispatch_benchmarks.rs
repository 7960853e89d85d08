//! # Compute Dispatch Benchmarks
//!
//! | Path | Target |
//! |------|--------|
//! | StoreCode through `deliver_tx` | < 50µs |
//! | Execute no-op through `deliver_tx` | < 20µs |
//! | Rolled-back transaction | < 50µs |
//! | Tx decode | < 10µs |

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use qc_11_compute::prelude::*;

const WASM: &[u8] = b"\0asm\x01\0\0\0bench";

fn sender() -> AccAddress {
    AccAddress::new([0x11; 20])
}

fn store_msg() -> Msg {
    MsgStoreCode {
        sender: sender(),
        wasm_byte_code: Binary::from_slice(WASM),
        source: String::new(),
        builder: String::new(),
    }
    .into()
}

fn execute_msg(contract: &AccAddress, msg: &[u8]) -> Msg {
    MsgExecuteContract {
        sender: sender(),
        contract: contract.clone(),
        msg: Binary::from_slice(msg),
        sent_funds: Coins::empty(),
        callback_sig: None,
    }
    .into()
}

fn deployed_service() -> (ComputeService<InMemoryKeeper<JsonCommandEngine>>, AccAddress) {
    let mut service = create_test_service();
    let block = BlockInfo::default();
    service.deliver_tx(&block, 0, &Tx::new(vec![store_msg()]));
    let init = MsgInstantiateContract {
        sender: sender(),
        code_id: CodeId::new(1),
        label: "bench".to_string(),
        init_msg: Binary::from_slice(b"{}"),
        init_funds: Coins::empty(),
        callback_sig: None,
    };
    let result = service.deliver_tx(&block, 1, &Tx::new(vec![init.into()]));
    let address = match &result.responses[0] {
        MsgResponse::InstantiateContract(r) => r.address.parse().unwrap(),
        other => panic!("unexpected response {other:?}"),
    };
    (service, address)
}

fn bench_store_code(c: &mut Criterion) {
    let mut group = c.benchmark_group("qc-11-store-code");
    let block = BlockInfo::default();
    let tx = Tx::new(vec![store_msg()]);

    group.bench_function("deliver_tx", |b| {
        let mut service = create_test_service();
        b.iter(|| black_box(service.deliver_tx(&block, 0, &tx)))
    });
    group.finish();
}

fn bench_execute(c: &mut Criterion) {
    let mut group = c.benchmark_group("qc-11-execute");
    let block = BlockInfo::default();
    let (mut service, contract) = deployed_service();

    for msgs in [1usize, 10, 50] {
        let tx = Tx::new(
            (0..msgs)
                .map(|_| execute_msg(&contract, br#"{"nop":{}}"#))
                .collect(),
        );
        group.throughput(Throughput::Elements(msgs as u64));
        group.bench_with_input(BenchmarkId::new("noop_batch", msgs), &tx, |b, tx| {
            b.iter(|| black_box(service.deliver_tx(&block, 0, tx)))
        });
    }

    let failing = Tx::new(vec![
        execute_msg(&contract, br#"{"nop":{}}"#),
        execute_msg(&contract, br#"{"fail":{"error":"bench"}}"#),
    ]);
    group.bench_function("rolled_back", |b| {
        b.iter(|| black_box(service.deliver_tx(&block, 0, &failing)))
    });
    group.finish();
}

fn bench_decode(c: &mut Criterion) {
    let (_, contract) = deployed_service();
    let bytes = Tx::new(vec![store_msg(), execute_msg(&contract, br#"{"nop":{}}"#)])
        .encode()
        .unwrap();

    c.bench_function("qc-11-tx-decode", |b| {
        b.iter(|| black_box(Tx::decode(black_box(&bytes))))
    });
}

criterion_group!(benches, bench_store_code, bench_execute, bench_decode);
criterion_main!(benches);
