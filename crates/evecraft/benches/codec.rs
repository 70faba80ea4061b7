use criterion::{Criterion, criterion_group, criterion_main};
use evecraft::{codec::Codec, codegen::generate, schema::Schema, value::Value};

fn text_args(len: usize) -> Vec<Value> {
    vec![
        Value::Int(10),
        Value::Int(20),
        Value::Int(31),
        Value::Int(0),
        Value::Str("x".repeat(len)),
    ]
}

fn gen_stream(schema: &Schema, commands: usize) -> Vec<u8> {
    let tag = schema.find("TAG").unwrap();
    let text = schema.find("TEXT").unwrap();
    let mut data = Vec::new();

    // Deterministic but non-trivial mix of both families
    for i in 0..commands {
        if i % 3 == 0 {
            text.pack_into(&text_args(i % 17), &mut data).unwrap();
        } else {
            tag.pack_into(&[Value::Int((i % 256) as i64)], &mut data)
                .unwrap();
        }
    }

    data
}

fn bench_compile(c: &mut Criterion) {
    c.bench_function("compile_builtin", |b| {
        b.iter(|| Schema::standard().unwrap())
    });
}

fn bench_pack(c: &mut Criterion) {
    let schema = Schema::standard().unwrap();
    let vertex = schema.find("VERTEX2II").unwrap();
    let args = [Value::Int(1), Value::Int(2), Value::Int(300), Value::Int(200)];
    c.bench_function("pack_vertex2ii", |b| {
        b.iter(|| vertex.pack(&args).unwrap())
    });

    for &len in &[0usize, 16, 256] {
        let text = schema.find("TEXT").unwrap();
        let args = text_args(len);
        c.bench_function(&format!("pack_text_{len}"), |b| {
            b.iter(|| text.pack(&args).unwrap())
        });
    }
}

fn bench_decode_stream(c: &mut Criterion) {
    let schema = Schema::standard().unwrap();
    for &commands in &[10usize, 100, 1000] {
        let data = gen_stream(&schema, commands);
        c.bench_function(&format!("decode_{commands}_commands"), |b| {
            b.iter(|| {
                let count = schema.decode_stream(&data).count();
                assert_eq!(count, commands);
            })
        });
    }
}

fn bench_generate(c: &mut Criterion) {
    let schema = Schema::standard().unwrap();
    c.bench_function("generate_builtin", |b| b.iter(|| generate(&schema)));
}

criterion_group!(
    benches,
    bench_compile,
    bench_pack,
    bench_decode_stream,
    bench_generate
);
criterion_main!(benches);
