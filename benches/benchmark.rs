use criterion::{black_box, criterion_group, criterion_main, Criterion};
use html2png::crop::{transparent_bounds, trim_image};
use html2png::document::{markdown_to_html, render_markdown_document};
use image::{Rgba, RgbaImage};
use std::path::Path;
use std::time::Duration;

#[cfg(feature = "integration_benchmarks")]
use html2png::{pipeline, Config, RenderJob};
#[cfg(feature = "integration_benchmarks")]
use tokio::runtime::Runtime;

const SAMPLE_MARKDOWN: &str = r#"# Release notes

Some **bold** text, a [link](https://example.com) and a bare https://example.org URL.
Line two of the same paragraph.

| Feature | Status |
|---------|--------|
| Tables  | done   |
| Crop    | done   |

```rust
fn main() {
    println!("hello");
}
```

> Quoted text
> over two lines

- [x] task one
- [ ] task two

<div align="center"><img src="images/logo.png" width="120"></div>
"#;

// Fast settings for all benchmarks
fn configure_fast_group(group: &mut criterion::BenchmarkGroup<criterion::measurement::WallTime>) {
    group.warm_up_time(Duration::from_millis(500));
    group.measurement_time(Duration::from_millis(500));
    group.sample_size(20);
}

fn framed(width: u32, height: u32, margin: u32) -> RgbaImage {
    RgbaImage::from_fn(width, height, |x, y| {
        if x >= margin && y >= margin && x < width - margin && y < height - margin {
            Rgba([40, 40, 40, 255])
        } else {
            Rgba([0, 0, 0, 0])
        }
    })
}

// === UNIT BENCHMARKS ===

fn benchmark_markdown_conversion(c: &mut Criterion) {
    let mut group = c.benchmark_group("markdown");
    configure_fast_group(&mut group);

    group.bench_function("fragment", |b| {
        b.iter(|| black_box(markdown_to_html(black_box(SAMPLE_MARKDOWN))));
    });

    group.bench_function("document", |b| {
        b.iter(|| {
            let html = render_markdown_document(black_box(SAMPLE_MARKDOWN), Path::new("/tmp"));
            black_box(html)
        });
    });

    group.finish();
}

fn benchmark_trim(c: &mut Criterion) {
    let mut group = c.benchmark_group("trim");
    configure_fast_group(&mut group);

    // Roughly an 800px document captured at 2x
    let capture = framed(1680, 2400, 40);

    group.bench_function("bounds", |b| {
        b.iter(|| black_box(transparent_bounds(black_box(&capture))));
    });

    group.bench_function("crop", |b| {
        b.iter(|| black_box(trim_image(black_box(&capture))));
    });

    group.finish();
}

// === INTEGRATION BENCHMARKS (require Chrome) ===

#[cfg(feature = "integration_benchmarks")]
fn benchmark_render_markdown(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let mut group = c.benchmark_group("render");
    configure_fast_group(&mut group);

    let dir = tempfile::TempDir::new().unwrap();
    let input = dir.path().join("notes.md");
    std::fs::write(&input, SAMPLE_MARKDOWN).unwrap();

    group.bench_function("markdown_to_png", |b| {
        b.iter(|| {
            rt.block_on(async {
                let config = Config::default();
                let job = RenderJob::new(&input, None, &config).unwrap();
                let report = pipeline::run(&job, &config).await;
                black_box(report.is_ok());
            })
        });
    });

    group.finish();
}

criterion_group!(unit_benches, benchmark_markdown_conversion, benchmark_trim);

#[cfg(feature = "integration_benchmarks")]
criterion_group!(integration_benches, benchmark_render_markdown);

#[cfg(feature = "integration_benchmarks")]
criterion_main!(unit_benches, integration_benches);

#[cfg(not(feature = "integration_benchmarks"))]
criterion_main!(unit_benches);
