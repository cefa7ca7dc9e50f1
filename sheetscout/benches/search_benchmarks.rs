use criterion::{black_box, criterion_group, criterion_main, Criterion};
use sheetscout::search::{search, FileEnumerator, TextMatcher};
use sheetscout::{CancelToken, SearchRequest};
use std::{fs, fs::File, io::Write};
use tempfile::tempdir;

/// Lays out `dirs` subdirectories holding `files_per_dir` CSV exports each
fn create_test_files(
    dir: &tempfile::TempDir,
    dirs: usize,
    files_per_dir: usize,
    rows_per_file: usize,
) -> std::io::Result<()> {
    for d in 0..dirs {
        let sub = dir.path().join(format!("Sub{}", d));
        fs::create_dir_all(&sub)?;
        for i in 0..files_per_dir {
            let mut file = File::create(sub.join(format!("report_{}.csv", i)))?;
            for j in 0..rows_per_file {
                writeln!(file, "{};Customer {};Region {};{}.50", j, j, j % 7, j * 3)?;
            }
            writeln!(file, "{};Great Britain;Region 0;0", rows_per_file)?;
        }
    }
    Ok(())
}

fn bench_file_scaling(c: &mut Criterion) {
    let mut group = c.benchmark_group("File Scaling");
    for &count in &[1usize, 10, 100] {
        let dir = tempdir().unwrap();
        create_test_files(&dir, 4, count, 50).unwrap();
        let request = SearchRequest::new(dir.path(), "report", "britain").include_csv(true);

        group.bench_function(format!("files_{}", count * 4), |b| {
            b.iter(|| black_box(search(&request, &CancelToken::new(), |_| {}).unwrap()));
        });
    }
    group.finish();
}

fn bench_row_scaling(c: &mut Criterion) {
    let mut group = c.benchmark_group("Row Scaling");
    for &rows in &[100usize, 1_000, 10_000] {
        let dir = tempdir().unwrap();
        create_test_files(&dir, 1, 1, rows).unwrap();
        let request = SearchRequest::new(dir.path(), "report", "britain").include_csv(true);

        group.bench_function(format!("rows_{}", rows), |b| {
            b.iter(|| black_box(search(&request, &CancelToken::new(), |_| {}).unwrap()));
        });
    }
    group.finish();
}

fn bench_enumeration(c: &mut Criterion) {
    let dir = tempdir().unwrap();
    create_test_files(&dir, 20, 25, 1).unwrap();
    let request = SearchRequest::new(dir.path(), "report_1*", "unused").include_csv(true);
    let recursive = request.clone().recursive(true);

    let mut group = c.benchmark_group("Enumeration");
    group.bench_function("shallow", |b| {
        b.iter(|| {
            let enumerator = FileEnumerator::from_request(&request).unwrap();
            black_box(enumerator.files(&CancelToken::new(), |_| {}))
        });
    });
    group.bench_function("recursive", |b| {
        b.iter(|| {
            let enumerator = FileEnumerator::from_request(&recursive).unwrap();
            black_box(enumerator.files(&CancelToken::new(), |_| {}))
        });
    });
    group.finish();
}

fn bench_matcher(c: &mut Criterion) {
    let matcher = TextMatcher::new("BRITAIN");
    let cells = ["42", "Customer 17", "Vereinigtes Königreich", "Great Britain"];

    c.bench_function("matcher_row", |b| {
        b.iter(|| black_box(matcher.any_match(cells.iter().copied())));
    });
}

criterion_group! {
    name = benches;
    config = Criterion::default();
    targets = bench_file_scaling, bench_row_scaling, bench_enumeration, bench_matcher
}

criterion_main!(benches);
