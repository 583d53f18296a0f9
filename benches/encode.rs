use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use tokeneer_lpe::{utok, Lpe};

const TEXT: &str = "The quick brown fox jumps over the lazy dog. 敏捷的棕色狐狸跳过了懒狗。\n";

/// `<s>`、`</s>`、256 个字节词，再加上由文本中的单词构成的词。
fn vocab() -> Vec<String> {
    let words = TEXT
        .split_inclusive(' ')
        .flat_map(|w| [w.trim_end().to_string(), format!(" {}", w.trim_end())]);
    ["<s>", "</s>"]
        .into_iter()
        .map(String::from)
        .chain((0..=255u8).map(|b| format!("<0x{b:02X}>")))
        .chain(words)
        .collect()
}

fn codec_benchmarks(c: &mut Criterion) {
    let vocab = vocab();
    let lpe = Lpe::new(vocab.iter().map(|s| s.as_bytes()), Some(0), Some(1)).unwrap();
    let text = TEXT.repeat(64);
    let tokens = lpe.encode(text.as_bytes()).unwrap();

    let mut group = c.benchmark_group("lpe");
    group.throughput(Throughput::Bytes(text.len() as u64));

    group.bench_function("encode", |b| {
        b.iter(|| black_box(lpe.encode(black_box(text.as_bytes())).unwrap()))
    });

    group.bench_function("decode", |b| {
        b.iter(|| {
            let mut prev: utok = 0;
            let mut len = 0;
            for &t in &tokens {
                len += lpe.decode_one(prev, t).unwrap().len();
                prev = t;
            }
            black_box(len)
        })
    });

    group.finish();
}

criterion_group!(benches, codec_benchmarks);
criterion_main!(benches);
