//! File I/O contract the `kinda` binary relies on: read a `.knda` file,
//! transform it, and the documented exit-status rule
//! holds for whatever comes back. The binary itself is a thin wrapper
//! around exactly this, so these tests exercise it without spawning a
//! subprocess.

use kinda_lang_core::transform;
use std::io::Write;
use tempfile::NamedTempFile;

fn write_knda(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("create temp file");
    write!(file, "{contents}").expect("write temp file");
    file
}

#[test]
fn transforming_a_file_round_trips_through_disk() {
    let file = write_knda("~kinda int x = 5\n~sorta print(x)\n");
    let source = std::fs::read_to_string(file.path()).expect("read back");
    let result = transform(&source);
    assert_eq!(result.exit_status, 0);
    assert!(result.code.contains("kinda_int(5)"));
}

#[test]
fn exit_status_is_nonzero_when_the_file_has_an_unsafe_argument() {
    let file = write_knda("~kinda int x = exec('1')\n");
    let source = std::fs::read_to_string(file.path()).expect("read back");
    let result = transform(&source);
    assert_eq!(result.exit_status, 1);
}

#[test]
fn output_written_to_disk_matches_in_memory_transform() {
    let input = write_knda("~maybe_for i in [1, 2, 3]:\n    print(i)\n");
    let source = std::fs::read_to_string(input.path()).expect("read input");
    let result = transform(&source);

    let output = NamedTempFile::new().expect("create output temp file");
    std::fs::write(output.path(), &result.code).expect("write output");
    let roundtrip = std::fs::read_to_string(output.path()).expect("read output");
    assert_eq!(roundtrip, result.code);
}

#[test]
fn crlf_line_endings_are_normalized_before_transforming() {
    let file = write_knda("~kinda int x = 5\r\n~sorta print(x)\r\n");
    let source = std::fs::read_to_string(file.path()).expect("read back");
    let result = transform(&source);
    assert!(!result.code.contains('\r'));
    assert_eq!(result.exit_status, 0);
}
