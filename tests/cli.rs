use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

fn run(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_html2png"))
        .args(args)
        // Point at a binary that cannot exist so nothing could ever launch a browser
        .args(["--chrome-path", "/nonexistent/chrome-for-tests"])
        .output()
        .expect("run html2png")
}

fn pngs(dir: &Path) -> usize {
    std::fs::read_dir(dir)
        .unwrap()
        .filter(|entry| {
            entry
                .as_ref()
                .unwrap()
                .path()
                .extension()
                .is_some_and(|ext| ext == "png")
        })
        .count()
}

#[test]
fn missing_input_exits_with_usage_error() {
    let output = run(&[]);
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Usage: html2png"));
}

#[test]
fn nonexistent_input_exits_nonzero_without_output() {
    let dir = TempDir::new().expect("tempdir");
    let missing = dir.path().join("missing.md");

    let output = run(&[missing.to_str().unwrap()]);
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("does not exist"));
    assert!(output.stdout.is_empty());
    assert_eq!(pngs(dir.path()), 0);
}

#[test]
fn invalid_scales_are_usage_errors() {
    let dir = TempDir::new().expect("tempdir");
    let input = dir.path().join("page.html");
    std::fs::write(&input, "<p>hi</p>").expect("write input");

    for scale in ["0", "-1", "abc"] {
        let output = run(&[input.to_str().unwrap(), "--scale", scale]);
        assert_eq!(output.status.code(), Some(1), "scale {scale}");
        assert!(output.stdout.is_empty(), "scale {scale}");
        // A usage error never reaches browser launch
        assert!(
            !String::from_utf8_lossy(&output.stderr).contains("Browser launch failed"),
            "scale {scale}"
        );
    }
    assert_eq!(pngs(dir.path()), 0);
}

#[test]
fn unusable_browser_is_a_render_error_and_leaves_no_temp_files() {
    let dir = TempDir::new().expect("tempdir");
    let input = dir.path().join("notes.md");
    std::fs::write(&input, "# Title\n").expect("write input");

    let output = run(&[input.to_str().unwrap(), "-s", "2"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty());

    let remaining: Vec<_> = std::fs::read_dir(dir.path())
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().to_string())
        .collect();
    assert_eq!(remaining, vec!["notes.md".to_string()]);
}

#[test]
fn help_exits_zero() {
    let output = Command::new(env!("CARGO_BIN_EXE_html2png"))
        .arg("--help")
        .output()
        .expect("run html2png");
    assert_eq!(output.status.code(), Some(0));
    assert!(String::from_utf8_lossy(&output.stdout).contains("--scale"));
}

#[test]
fn extra_positionals_and_trailing_flag_reach_rendering() {
    let dir = TempDir::new().expect("tempdir");
    let input = dir.path().join("notes.md");
    std::fs::write(&input, "# Title\n").expect("write input");

    let output = run(&[input.to_str().unwrap(), "other.md", "-s", "2", "-s"]);
    let stderr = String::from_utf8_lossy(&output.stderr);
    // Argument parsing succeeded, so the run got as far as launching the browser
    assert!(!stderr.contains("Usage: html2png"), "{stderr}");
    assert!(stderr.contains("Browser launch failed"), "{stderr}");
    assert_eq!(output.status.code(), Some(1));
}
