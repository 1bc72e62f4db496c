use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const CARD: &str = "\
SUNDHEDSKORT
Region Syddanmark
Lægehuset Havnen
Havnegade 20, 1. sal
Tlf. 65 43 21 09
281262-2223 *
ERIK SØRENSEN
Skovvej 14
5000 Odense C
Odense Kommune
Gyldig fra 01.02.2019
";

fn sundkort() -> Command {
    Command::cargo_bin("sundkort").unwrap()
}

fn write_card(dir: &Path, name: &str, text: &str) -> String {
    let path = dir.join(name);
    fs::write(&path, text).unwrap();
    path.display().to_string()
}

#[test]
fn extract_text_card_as_json() {
    let dir = TempDir::new().unwrap();
    let card = write_card(dir.path(), "card.txt", CARD);

    sundkort()
        .args(["extract", &card, "--today", "2024-06-01"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"national_id\":\"281262-2223\""))
        .stdout(predicate::str::contains("\"holder_surname\":\"SØRENSEN\""))
        .stdout(predicate::str::contains("\"age\":\"61\""))
        .stdout(predicate::str::contains("\"gender\":\"Male\""));
}

#[test]
fn extract_reads_stdin() {
    sundkort()
        .args(["extract", "-", "--today", "2024-06-01", "--format", "csv"])
        .write_stdin("010190-1234\nAnna Jensen\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("holder_first_name,holder_surname"))
        .stdout(predicate::str::contains("Anna,Jensen,Anna Jensen"));
}

#[test]
fn extract_writes_output_file() {
    let dir = TempDir::new().unwrap();
    let card = write_card(dir.path(), "card.ocr", CARD);
    let output = dir.path().join("out.txt");

    sundkort()
        .args(["extract", &card, "-f", "text", "--today", "2024-06-01", "-o"])
        .arg(&output)
        .assert()
        .success()
        .stdout(predicate::str::contains("Output written"));

    let written = fs::read_to_string(&output).unwrap();
    assert!(written.contains("Holder: ERIK SØRENSEN"));
    assert!(written.contains("Doctor: Lægehuset Havnen"));
    assert!(written.contains("28.12.1962 (age 61, Male)"));
}

#[test]
fn extract_shows_metadata() {
    let dir = TempDir::new().unwrap();
    let card = write_card(dir.path(), "card.txt", "Lars Nielsen\n");

    sundkort()
        .args(["extract", &card, "--show-metadata"])
        .assert()
        .success()
        .stdout(predicate::str::contains("CPR anchor: not found"))
        .stdout(predicate::str::contains("Could not extract national_id"));
}

#[test]
fn extract_rejects_unknown_format() {
    let dir = TempDir::new().unwrap();
    let card = write_card(dir.path(), "card.docx", CARD);

    sundkort()
        .args(["extract", &card])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unsupported file format"));
}

#[test]
fn extract_missing_file_fails() {
    sundkort()
        .args(["extract", "does-not-exist.txt"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Input file not found"));
}

#[test]
fn decode_prints_birth_date_age_and_gender() {
    sundkort()
        .args(["decode", "010190-1234", "--today", "2024-06-01"])
        .assert()
        .success()
        .stdout(predicate::str::contains("01.01.1990"))
        .stdout(predicate::str::contains("34"))
        .stdout(predicate::str::contains("Female"));
}

#[test]
fn decode_rejects_impossible_date() {
    sundkort()
        .args(["decode", "310490-1234"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid CPR number"));
}

#[test]
fn batch_writes_outputs_and_summary() {
    let input = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();
    write_card(input.path(), "first.txt", CARD);
    write_card(input.path(), "second.txt", "010190-1234\nAnna Jensen\n");
    write_card(input.path(), "notes.md", "ignored");

    let pattern = format!("{}/*", input.path().display());
    sundkort()
        .args(["batch", &pattern, "--summary", "-j", "2", "--today", "2024-06-01", "-o"])
        .arg(output.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Found 2 files"));

    let first = fs::read_to_string(output.path().join("first.json")).unwrap();
    assert!(first.contains("281262-2223"));
    assert!(output.path().join("second.json").exists());

    let summary = fs::read_to_string(output.path().join("summary.csv")).unwrap();
    assert_eq!(summary.lines().count(), 3);
    assert!(summary.starts_with("filename,status,national_id"));
    assert!(summary.contains("second.txt,success,010190-1234,Anna Jensen"));
}

#[test]
fn batch_continues_past_broken_pdf() {
    let input = TempDir::new().unwrap();
    write_card(input.path(), "good.txt", CARD);
    write_card(input.path(), "broken.pdf", "not a pdf");
    let pattern = format!("{}/*", input.path().display());

    sundkort()
        .args(["batch", &pattern])
        .assert()
        .failure();

    sundkort()
        .args(["batch", &pattern, "--continue-on-error"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Failed files:"))
        .stdout(predicate::str::contains("broken.pdf"));
}

#[test]
fn config_init_get_set_roundtrip() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("nested").join("config.json");
    let config = config.to_str().unwrap();

    sundkort()
        .args(["--config", config, "config", "init"])
        .assert()
        .success();

    sundkort()
        .args(["--config", config, "config", "init"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--force"));

    sundkort()
        .args(["--config", config, "config", "get", "lexicon.default_card_type"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"Danish Health Card\""));

    sundkort()
        .args(["--config", config, "config", "set", "output.pretty_json", "true"])
        .assert()
        .success();

    sundkort()
        .args(["--config", config, "config", "set", "output.no_such_key", "1"])
        .assert()
        .failure();

    let card = write_card(dir.path(), "card.txt", CARD);
    sundkort()
        .args(["--config", config, "extract", &card])
        .assert()
        .success()
        .stdout(predicate::str::contains("\n  \"national_id\": \"281262-2223\""));
}
