use criterion::*;

fn bench_simple_match_return(c: &mut Criterion) {
    let query = "MATCH (n:Person) WHERE n.age > 30 RETURN n.name ORDER BY n.name;";

    c.bench_function("simple_match_return", move |b| {
        b.iter(|| {
            let result = cypher_parser::parse(black_box(query));
            black_box(result);
        });
    });
}

fn bench_long_pattern_chain(c: &mut Criterion) {
    let chain = "(a)-[:KNOWS]->".repeat(200);
    let query = format!("MATCH {chain}(z) RETURN z;");

    c.bench_function("long_pattern_chain", move |b| {
        b.iter(|| {
            let result = cypher_parser::parse(black_box(&query));
            black_box(result);
        });
    });
}

fn bench_many_statements(c: &mut Criterion) {
    let query = "MATCH (n) RETURN n;\n".repeat(500);

    c.bench_function("many_statements", move |b| {
        b.iter(|| {
            let result = cypher_parser::parse(black_box(&query));
            black_box(result);
        });
    });
}

fn bench_deeply_nested_expression(c: &mut Criterion) {
    let mut expr = String::from("1");
    for _ in 0..200 {
        expr = format!("({expr} + 1)");
    }
    let query = format!("RETURN {expr};");

    c.bench_function("deeply_nested_expression", move |b| {
        b.iter(|| {
            let result = cypher_parser::parse(black_box(&query));
            black_box(result);
        });
    });
}

fn bench_quick_segment_only(c: &mut Criterion) {
    let query = "MATCH (n) RETURN n;\n".repeat(500);

    c.bench_function("quick_segment_only", move |b| {
        b.iter(|| {
            let mut count = 0;
            cypher_parser::quick_parse(black_box(&query), Default::default(), |_| {
                count += 1;
                0
            });
            black_box(count);
        });
    });
}

criterion_group!(
    benches,
    bench_simple_match_return,
    bench_long_pattern_chain,
    bench_many_statements,
    bench_deeply_nested_expression,
    bench_quick_segment_only,
);
criterion_main!(benches);
