#![allow(non_snake_case)]

use super::*;
use tempfile::TempDir;

fn sample_output() -> OutputSet {
    let mut output = OutputSet::new(TargetId::Java).with_root("out/java");
    output.add("org/acme/Clock.java", "interface Clock {}\n").unwrap();
    output.add("org/acme/ClockStub.java", "class ClockStub {}\n").unwrap();
    output
}

#[test]
fn write_outputs___creates_nested_directories() {
    let dir = TempDir::new().unwrap();

    let written = write_outputs(&[sample_output()], dir.path()).unwrap();

    assert_eq!(written.len(), 2);
    let clock = dir.path().join("out/java/org/acme/Clock.java");
    assert_eq!(fs::read_to_string(clock).unwrap(), "interface Clock {}\n");
}

#[test]
fn read_output___round_trips_written_files() {
    let dir = TempDir::new().unwrap();
    let original = sample_output();
    write_outputs(std::slice::from_ref(&original), dir.path()).unwrap();

    let read = read_output(TargetId::Java, &dir.path().join("out/java")).unwrap();

    assert_eq!(read.target(), TargetId::Java);
    assert_eq!(read.files(), original.files());
    assert_eq!(read.fingerprint(), original.fingerprint());
}

#[test]
fn read_output___missing_root___is_empty() {
    let dir = TempDir::new().unwrap();

    let read = read_output(TargetId::Cpp, &dir.path().join("nowhere")).unwrap();

    assert!(read.is_empty());
}
