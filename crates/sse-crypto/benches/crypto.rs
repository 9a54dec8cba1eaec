use sse_crypto::{decrypt, derive_token, encrypt, EncryptionKey, TokenKey, SCHEME_TAG};

fn make_data(size: usize) -> Vec<u8> {
    (0..size)
        .map(|i| (i.wrapping_mul(7) ^ (i >> 3)) as u8)
        .collect()
}

#[divan::bench(args = [1024, 65536, 1048576])]
fn bench_encrypt(bencher: divan::Bencher, size: usize) {
    let key = EncryptionKey::from_bytes([0xABu8; 32]);
    let data = make_data(size);
    bencher
        .counter(divan::counter::BytesCount::new(size))
        .bench(|| encrypt(divan::black_box(&key), divan::black_box(&data), SCHEME_TAG).unwrap());
}

#[divan::bench(args = [1024, 65536, 1048576])]
fn bench_decrypt(bencher: divan::Bencher, size: usize) {
    let key = EncryptionKey::from_bytes([0xABu8; 32]);
    let blob = encrypt(&key, &make_data(size), SCHEME_TAG).unwrap();
    bencher
        .counter(divan::counter::BytesCount::new(size))
        .bench(|| decrypt(divan::black_box(&key), divan::black_box(&blob), SCHEME_TAG).unwrap());
}

#[divan::bench(args = ["alpha", "  Mixed Case   Keyword  "])]
fn bench_derive_token(keyword: &str) -> sse_core::SearchToken {
    let key = TokenKey::from_bytes([0x55u8; 32]);
    derive_token(divan::black_box(&key), divan::black_box(keyword))
}

fn main() {
    divan::main();
}
