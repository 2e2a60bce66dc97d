//! Benchmarks for compiling expressions and scanning text with them.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use lexdfa::{InputReader, Lexer, Regex};

const IDENT: &str = "[a-zA-Z_][a-zA-Z0-9_]*";
const XML_COMMENT: &str = r"<!\-\-(([\x01-\uD7FF\uE000-\uFFFD&&[^\-]])|(\-[\x01-\uD7FF\uE000-\uFFFD&&[^\-]]))*\-\->";

fn source_text(lines: usize) -> String {
    let mut text = String::new();
    for i in 0..lines {
        text.push_str(&format!(
            "let value_{i} = compute({i}, \"label\") + 42; <!-- note {i} -->\n"
        ));
    }
    text
}

fn bench_compile(c: &mut Criterion) {
    c.bench_function("compile_ident", |b| {
        b.iter(|| Regex::compile(black_box(IDENT)).unwrap())
    });
    c.bench_function("compile_xml_comment", |b| {
        b.iter(|| Regex::compile(black_box(XML_COMMENT)).unwrap())
    });
    c.bench_function("compile_bounded_repeat", |b| {
        b.iter(|| Regex::compile(black_box("[01]{6,200}")).unwrap())
    });
}

fn bench_search(c: &mut Criterion) {
    let text = source_text(200);
    let comment = Regex::compile(XML_COMMENT).unwrap();
    let number = Regex::compile("[0-9]+").unwrap();

    c.bench_function("find_iter_comments", |b| {
        b.iter(|| comment.find_iter(black_box(&text)).count())
    });
    c.bench_function("replace_numbers", |b| {
        b.iter(|| number.replace(black_box(&text), "N"))
    });
    c.bench_function("replace_numbers_stream", |b| {
        b.iter(|| {
            let mut out = Vec::with_capacity(text.len());
            number
                .replace_reader(black_box(text.as_bytes()), 4096, &mut out, "N")
                .unwrap();
            out
        })
    });
}

fn bench_lexer(c: &mut Criterion) {
    let mut builder = Lexer::builder();
    for keyword in ["let", "fn", "if", "else", "while", "return"] {
        builder.add(keyword, "keyword").unwrap();
    }
    builder.add(IDENT, "ident").unwrap();
    builder.add("[0-9]+", "number").unwrap();
    builder.add("\"[^\"\n]*\"", "string").unwrap();
    builder.add(XML_COMMENT, "comment").unwrap();
    builder.add("[ \t\n]+", "space").unwrap();
    builder.add("[=+(),;]", "punct").unwrap();
    let lexer = builder.build().unwrap();
    let text = source_text(200);

    c.bench_function("tokenize_text", |b| {
        b.iter(|| lexer.tokenize(black_box(&text)).unwrap().len())
    });
    c.bench_function("tokenize_stream", |b| {
        b.iter(|| {
            let mut reader = InputReader::new(black_box(text.as_bytes()));
            let mut count = 0;
            while lexer.next_token(&mut reader).unwrap().is_some() {
                count += 1;
            }
            count
        })
    });
}

criterion_group!(benches, bench_compile, bench_search, bench_lexer);
criterion_main!(benches);
