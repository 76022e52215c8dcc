use std::io::Write;
use std::process::{Command, Output, Stdio};

use tempfile::tempdir;

fn hexpipe(args: &[&str], stdin: &[u8]) -> Output {
    let mut child = Command::new(env!("CARGO_BIN_EXE_hexpipe"))
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap();
    child.stdin.take().unwrap().write_all(stdin).unwrap();
    child.wait_with_output().unwrap()
}

fn stdout(out: &Output) -> String {
    assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));
    String::from_utf8(out.stdout.clone()).unwrap()
}

#[test]
fn encode_reads_stdin() {
    assert_eq!(stdout(&hexpipe(&["encode"], b"\x01\xab")), "01ab\n");
    assert_eq!(stdout(&hexpipe(&["encode", "--upper"], b"\x01\xab")), "01AB\n");
}

#[test]
fn encode_reads_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("in.bin");
    std::fs::write(&path, b"hello").unwrap();
    assert_eq!(stdout(&hexpipe(&["encode", path.to_str().unwrap()], b"")), "68656c6c6f\n");
}

#[test]
fn encode_missing_file_fails() {
    let dir = tempdir().unwrap();
    let out = hexpipe(&["encode", dir.path().join("nope").to_str().unwrap()], b"");
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("failed to open"));
}

#[test]
fn dump_with_custom_layout() {
    let out = hexpipe(&["dump", "--sep", ":", "--block", "1", "--line", "3"], b"\x00\x01\x02\x03");
    assert_eq!(stdout(&out), "00:01:02\n03\n");
}

#[test]
fn dump_canonical() {
    let text = stdout(&hexpipe(&["dump", "--canonical"], b"Hello, world!\n"));
    assert_eq!(text, "00000000  48 65 6c 6c 6f 2c 20 77 6f 72 6c 64 21 0a        |Hello, world!.|\n");
}

#[test]
fn int_renders_fixed_width() {
    assert_eq!(stdout(&hexpipe(&["int", "255", "--digits", "4"], b"")), "00ff\n");
    assert_eq!(stdout(&hexpipe(&["int", "-255", "--upper"], b"")), "-FF\n");
    assert_eq!(stdout(&hexpipe(&["int", "0"], b"")), "0\n");
}
