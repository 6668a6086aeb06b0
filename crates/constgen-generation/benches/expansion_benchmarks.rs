use constgen_generation::{
    BlockBuilder, NameTokens, Placeholders, SubstitutionEngine, TemplateMarkerParser,
};
use constgen_storage::GeneratorItem;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

const TEMPLATE: &str = "namespace //%namespaceRuntime {
    public static class //%classNameKeys {
        /// %constComment //%1
        public const %constType %constKey = \"%constValue\"; //%0
    }
}
";

// ============================================================================
// Benchmark 1: Single line expansion
// ============================================================================

fn benchmark_expand_line(c: &mut Criterion) {
    let placeholders = Placeholders::for_entry("MainMenu", "Main_Menu", "string", Some("Title"));
    let line = "        public const %constType %constKey = \"%constValue\"; // %constComment";

    c.bench_function("expand_line", |b| {
        b.iter(|| SubstitutionEngine::expand(black_box(line), black_box(&placeholders)))
    });
}

// ============================================================================
// Benchmark 2: Full file assembly for growing entry counts
// ============================================================================

fn benchmark_assemble_file(c: &mut Criterion) {
    let mut group = c.benchmark_group("assemble_file");
    let parsed = TemplateMarkerParser::parse(TEMPLATE);
    let names = NameTokens::from_item(&GeneratorItem::new("bench"));

    for entries in [10usize, 100, 1_000, 10_000] {
        let data: Vec<(String, String)> = (0..entries)
            .map(|i| (i.to_string(), format!("Value number {}", i)))
            .collect();

        group.bench_with_input(BenchmarkId::from_parameter(entries), &data, |b, data| {
            b.iter(|| {
                let mut builder = BlockBuilder::new(&parsed, "int");
                for (index, (key, value)) in data.iter().enumerate() {
                    let comment = (index % 4 == 0).then_some("every fourth");
                    builder.push(key, &value.replace(' ', "_"), comment);
                }
                black_box(SubstitutionEngine::assemble(&parsed, &builder.finish(), &names))
            })
        });
    }

    group.finish();
}

criterion_group!(benches, benchmark_expand_line, benchmark_assemble_file);
criterion_main!(benches);
