//! Encode and decode a wide and a deep self-referential message.

use divan::{Bencher, black_box};
use remoting::{Codec, Reference};
use std::sync::{Arc, LazyLock};

fn main() {
    divan::main();
}

#[derive(Codec, Debug, Clone, PartialEq)]
struct Struct4 {
    #[remoting(namespace = "urn:x")]
    ptr: Reference<Struct4>,
    value: String,
    vec: Vec<Struct4>,
}

fn leaf(i: usize) -> Struct4 {
    Struct4 {
        ptr: None,
        value: format!("leaf {i}"),
        vec: Vec::new(),
    }
}

static WIDE: LazyLock<Struct4> = LazyLock::new(|| Struct4 {
    ptr: Some(Arc::new(leaf(0))),
    value: "wide".into(),
    vec: (0..1000).map(leaf).collect(),
});

static DEEP: LazyLock<Struct4> = LazyLock::new(|| {
    let mut value = leaf(0);
    for i in 0..500 {
        value = Struct4 {
            ptr: Some(Arc::new(leaf(i))),
            value: format!("level {i}"),
            vec: vec![value],
        };
    }
    value
});

static WIDE_BYTES: LazyLock<Vec<u8>> =
    LazyLock::new(|| remoting_binary::to_vec("Struct4", &*WIDE).unwrap());

static DEEP_BYTES: LazyLock<Vec<u8>> =
    LazyLock::new(|| remoting_binary::to_vec("Struct4", &*DEEP).unwrap());

#[divan::bench]
fn serialize_wide(bencher: Bencher) {
    let data = &*WIDE;
    bencher.bench(|| black_box(remoting_binary::to_vec("Struct4", black_box(data)).unwrap()));
}

#[divan::bench]
fn deserialize_wide(bencher: Bencher) {
    let bytes = &*WIDE_BYTES;
    bencher.bench(|| {
        let value: Struct4 = remoting_binary::from_slice("Struct4", black_box(bytes)).unwrap();
        black_box(value)
    });
}

#[divan::bench]
fn serialize_deep(bencher: Bencher) {
    let data = &*DEEP;
    bencher.bench(|| black_box(remoting_binary::to_vec("Struct4", black_box(data)).unwrap()));
}

#[divan::bench]
fn deserialize_deep(bencher: Bencher) {
    let bytes = &*DEEP_BYTES;
    bencher.bench(|| {
        let value: Struct4 = remoting_binary::from_slice("Struct4", black_box(bytes)).unwrap();
        black_box(value)
    });
}
