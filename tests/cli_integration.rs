use std::io::Write;
use std::process::{Command, Stdio};

use tempfile::tempdir;

fn bin() -> String {
    env!("CARGO_BIN_EXE_bookcoder").to_string()
}

#[test]
fn cli_map_extract_roundtrip() {
    let dir = tempdir().unwrap();
    let book = dir.path().join("book.bin");
    let input = dir.path().join("input.bin");
    let code = dir.path().join("code.bkc");
    let output = dir.path().join("output.bin");

    std::fs::write(&book, b"how vexingly quick daft zebras jump").unwrap();
    std::fs::write(&input, b"just dark quartz").unwrap();

    let st = Command::new(bin())
        .args(["map", "--book"])
        .arg(&book)
        .arg(&input)
        .arg(&code)
        .status()
        .unwrap();
    assert!(st.success());

    let code_bytes = std::fs::read(&code).unwrap();
    assert_eq!(code_bytes.len(), 4 * b"just dark quartz".len());

    let st = Command::new(bin())
        .args(["extract", "--book"])
        .arg(&book)
        .arg(&code)
        .arg(&output)
        .status()
        .unwrap();
    assert!(st.success());
    assert_eq!(std::fs::read(&output).unwrap(), b"just dark quartz");
}

#[test]
fn cli_pipes_through_stdio() {
    let dir = tempdir().unwrap();
    let book = dir.path().join("book.bin");
    std::fs::write(&book, b"a small book with every needed letter").unwrap();

    // map: input on stdin, code on stdout.
    let mut map = Command::new(bin())
        .args(["--quiet", "map", "--stdout", "--book"])
        .arg(&book)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .spawn()
        .unwrap();
    map.stdin
        .take()
        .unwrap()
        .write_all(b"seven lambs")
        .unwrap();
    let map_out = map.wait_with_output().unwrap();
    assert!(map_out.status.success());
    assert_eq!(map_out.stdout.len(), 4 * b"seven lambs".len());

    // extract: code on stdin, original on stdout.
    let mut extract = Command::new(bin())
        .args(["--quiet", "extract", "--stdout", "--book"])
        .arg(&book)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .spawn()
        .unwrap();
    extract
        .stdin
        .take()
        .unwrap()
        .write_all(&map_out.stdout)
        .unwrap();
    let extract_out = extract.wait_with_output().unwrap();
    assert!(extract_out.status.success());
    assert_eq!(extract_out.stdout, b"seven lambs");
}

#[test]
fn cli_refuses_to_overwrite_without_force() {
    let dir = tempdir().unwrap();
    let book = dir.path().join("book.bin");
    let input = dir.path().join("input.bin");
    let code = dir.path().join("code.bkc");

    std::fs::write(&book, b"abc").unwrap();
    std::fs::write(&input, b"cab").unwrap();
    std::fs::write(&code, b"existing").unwrap();

    let st = Command::new(bin())
        .args(["map", "--book"])
        .arg(&book)
        .arg(&input)
        .arg(&code)
        .status()
        .unwrap();
    assert!(!st.success());
    assert_eq!(std::fs::read(&code).unwrap(), b"existing");

    let st = Command::new(bin())
        .arg("--force")
        .args(["map", "--book"])
        .arg(&book)
        .arg(&input)
        .arg(&code)
        .status()
        .unwrap();
    assert!(st.success());
    assert_eq!(std::fs::read(&code).unwrap().len(), 12);
}

#[test]
fn cli_reports_missing_entropy() {
    let dir = tempdir().unwrap();
    let book = dir.path().join("book.bin");
    let input = dir.path().join("input.bin");

    std::fs::write(&book, b"aaaa").unwrap();
    std::fs::write(&input, b"b").unwrap();

    let out = Command::new(bin())
        .args(["map", "--book"])
        .arg(&book)
        .arg(&input)
        .arg(dir.path().join("code.bkc"))
        .output()
        .unwrap();
    assert!(!out.status.success());
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("not enough entropy"), "stderr: {stderr}");
}

#[test]
fn cli_buffer_size_suffixes_accepted() {
    let dir = tempdir().unwrap();
    let book = dir.path().join("book.bin");
    let input = dir.path().join("input.bin");
    let code = dir.path().join("code.bkc");
    let output = dir.path().join("output.bin");

    std::fs::write(&book, b"suffix parsing corpus").unwrap();
    std::fs::write(&input, b"pass").unwrap();

    let st = Command::new(bin())
        .args([
            "map",
            "--book-window-size",
            "4k",
            "--input-chunk-size",
            "512b",
            "--book",
        ])
        .arg(&book)
        .arg(&input)
        .arg(&code)
        .status()
        .unwrap();
    assert!(st.success());

    let st = Command::new(bin())
        .args(["extract", "--code-chunk-size", "1K", "--book"])
        .arg(&book)
        .arg(&code)
        .arg(&output)
        .status()
        .unwrap();
    assert!(st.success());
    assert_eq!(std::fs::read(&output).unwrap(), b"pass");
}

#[test]
fn cli_missing_book_fails() {
    let st = Command::new(bin())
        .args(["map", "--book", "/nonexistent/book.bin", "-c"])
        .stdin(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .unwrap();
    assert!(!st.success());
}

#[test]
fn cli_json_stats_on_stderr() {
    let dir = tempdir().unwrap();
    let book = dir.path().join("book.bin");
    let input = dir.path().join("input.bin");

    std::fs::write(&book, b"json stats corpus").unwrap();
    std::fs::write(&input, b"json").unwrap();

    let out = Command::new(bin())
        .args(["--quiet", "--json", "map", "--stdout", "--book"])
        .arg(&book)
        .arg(&input)
        .output()
        .unwrap();
    assert!(out.status.success());
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("\"codes_written\": 4"), "stderr: {stderr}");
}
