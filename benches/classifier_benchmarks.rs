//! Criterion benchmarks for model building and call classification.
//!
//! Run with: `cargo bench`
//!
//! Sources are synthetic so results are reproducible across machines.

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};

use moq_complete::csharp::{CSharpModel, SourceFile};
use moq_complete::{CallClassifier, completion_hint};

// ─── Helpers ─────────────────────────────────────────────────────────

/// One interface and one test class with `calls` Setup/Returns/Verify groups.
fn synthetic_source(index: usize, calls: usize) -> SourceFile {
    let mut text = format!(
        "using Moq;\n\nnamespace Bench{index};\n\npublic interface IService{index}\n{{\n    \
         string Describe(int id, string name);\n    void Send(string payload);\n}}\n\n\
         public class Service{index}Tests\n{{\n    public void Run()\n    {{\n        \
         var mock = new Mock<IService{index}>();\n"
    );
    for i in 0..calls {
        text.push_str(&format!(
            "        mock.Setup(m => m.Describe({i}, It.IsAny<string>())).Returns(\"r{i}\");\n        \
             mock.Setup(m => m.Send(It.IsAny<string>())).Callback(() => {{ }});\n        \
             mock.Verify(m => m.Send(\"p{i}\"));\n"
        ));
    }
    text.push_str("    }\n}\n");
    SourceFile::new(format!("Bench{}Tests.cs", index), text)
}

fn synthetic_sources(files: usize, calls: usize) -> Vec<SourceFile> {
    (0..files).map(|i| synthetic_source(i, calls)).collect()
}

// ─── Model build ─────────────────────────────────────────────────────

fn bench_model_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("model_build");
    group.sample_size(10);

    for &files in &[1, 20, 100] {
        let sources = synthetic_sources(files, 20);
        group.bench_with_input(BenchmarkId::new("files", files), &sources, |b, sources| {
            b.iter(|| black_box(CSharpModel::build(sources).unwrap()));
        });
    }

    group.finish();
}

// ─── Classification ──────────────────────────────────────────────────

fn bench_classify(c: &mut Criterion) {
    let model = CSharpModel::build(&synthetic_sources(20, 50)).unwrap();
    let classifier = CallClassifier::new(&model);
    let sites = model.call_sites();

    c.bench_function("classify_all_sites", |b| {
        b.iter(|| {
            let classified = sites
                .iter()
                .filter(|s| classifier.classify(Some(black_box(&s.call))).is_some())
                .count();
            black_box(classified)
        })
    });

    c.bench_function("mocked_member_all_sites", |b| {
        b.iter(|| {
            for site in sites {
                black_box(classifier.mocked_method_from_setup(Some(&site.call)));
            }
        })
    });

    c.bench_function("completion_hints_all_sites", |b| {
        b.iter(|| {
            for site in sites {
                black_box(completion_hint(&classifier, &site.call));
            }
        })
    });
}

criterion_group!(benches, bench_model_build, bench_classify);
criterion_main!(benches);
