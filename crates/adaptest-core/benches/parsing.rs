use criterion::{black_box, criterion_group, criterion_main, Criterion};

use adaptest_core::parser::{parse_question_bank_str, validate_question_bank, BankFormat};

fn bench_json_parsing(c: &mut Criterion) {
    let mut group = c.benchmark_group("json_parsing");

    let small = generate_bank_json(5);
    let medium = generate_bank_json(50);
    let large = generate_bank_json(200);

    for (name, json) in [("5_per_tier", &small), ("50_per_tier", &medium), ("200_per_tier", &large)] {
        group.bench_function(name, |b| {
            b.iter(|| {
                parse_question_bank_str(
                    black_box(json),
                    BankFormat::Json,
                    black_box("bench.json".as_ref()),
                )
            })
        });
    }

    group.finish();
}

fn bench_toml_parsing(c: &mut Criterion) {
    let toml = generate_bank_toml(50);

    c.bench_function("toml_parsing_50_per_tier", |b| {
        b.iter(|| {
            parse_question_bank_str(
                black_box(&toml),
                BankFormat::Toml,
                black_box("bench.toml".as_ref()),
            )
        })
    });
}

fn bench_validation(c: &mut Criterion) {
    let json = generate_bank_json(200);
    let bank = parse_question_bank_str(&json, BankFormat::Json, "bench.json".as_ref()).unwrap();

    c.bench_function("validate_200_per_tier", |b| {
        b.iter(|| validate_question_bank(black_box(&bank)))
    });
}

fn generate_bank_json(n: usize) -> String {
    let tier = |name: &str| -> String {
        let entries: Vec<String> = (0..n)
            .map(|i| {
                format!(
                    r#"{{"id": {i}, "difficulty": "{name}", "question": "What is {i} + {i}?", "answer": {}, "answer choices": [{}, {}, {}, {}]}}"#,
                    i * 2,
                    i * 2,
                    i * 2 + 1,
                    i * 2 + 2,
                    i * 2 + 3
                )
            })
            .collect();
        format!(r#""{name}": [{}]"#, entries.join(","))
    };
    format!("{{{}, {}, {}}}", tier("low"), tier("medium"), tier("high"))
}

fn generate_bank_toml(n: usize) -> String {
    let mut s = String::new();
    for name in ["low", "medium", "high"] {
        for i in 0..n {
            s.push_str(&format!(
                r#"
[[{name}]]
id = {i}
question = "What is {i} + {i}?"
answer = {}
"answer choices" = [{}, {}, {}, {}]
"#,
                i * 2,
                i * 2,
                i * 2 + 1,
                i * 2 + 2,
                i * 2 + 3
            ));
        }
    }
    s
}

criterion_group!(benches, bench_json_parsing, bench_toml_parsing, bench_validation);
criterion_main!(benches);
