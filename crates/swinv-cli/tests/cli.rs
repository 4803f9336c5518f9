use std::path::Path;

use assert_cmd::Command;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};
use predicates::prelude::*;

fn swinv() -> Command {
    Command::cargo_bin("swinv").unwrap()
}

/// Write a one-page invoice PDF to `path`.
fn write_invoice(path: &Path, supplier: &str) {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
        "Encoding" => "WinAnsiEncoding",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => font_id,
        },
    });

    let lines: [(i64, &str); 4] = [
        (800, supplier),
        (700, "Rechnung 20240042"),
        (680, "Datum: 02.05.2024"),
        (600, "Total CHF 1'081.00"),
    ];
    let mut operations = Vec::new();
    for (y, text) in lines {
        operations.push(Operation::new("BT", vec![]));
        operations.push(Operation::new("Tf", vec!["F1".into(), 10.into()]));
        operations.push(Operation::new("Td", vec![50.into(), y.into()]));
        operations.push(Operation::new("Tj", vec![Object::string_literal(text)]));
        operations.push(Operation::new("ET", vec![]));
    }
    let content = Content { operations };
    let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Contents" => content_id,
        "Resources" => resources_id,
        "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
    });

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![page_id.into()],
            "Count" => 1,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.save(path).unwrap();
}

#[test]
fn test_config_show_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("config.json");

    swinv()
        .args(["config", "show", "--config"])
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"max_pages\": 5"))
        .stdout(predicate::str::contains("\"default_vat_rate\": \"8.1\""));
}

#[test]
fn test_config_init_set_get() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("swinv.json");

    swinv()
        .args(["config", "init", "--config"])
        .arg(&config)
        .assert()
        .success();
    assert!(config.exists());

    swinv()
        .args(["config", "set", "extraction.validate_iban", "true", "--config"])
        .arg(&config)
        .assert()
        .success();

    swinv()
        .args(["config", "get", "extraction.validate_iban", "--config"])
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains("true"));

    swinv()
        .args(["config", "set", "extraction.no_such_key", "1", "--config"])
        .arg(&config)
        .assert()
        .failure();
}

#[test]
fn test_process_missing_file_fails() {
    swinv()
        .args(["process", "/nonexistent/invoice.pdf"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Input file not found"));
}

#[test]
fn test_process_non_pdf_fails() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("notes.pdf");
    std::fs::write(&path, "just some text").unwrap();

    swinv()
        .arg("process")
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("document unreadable"));
}

#[test]
fn test_process_json() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("invoice.pdf");
    write_invoice(&path, "Muster AG");

    swinv()
        .arg("process")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"supplierName\": \"Muster AG\""))
        .stdout(predicate::str::contains("\"externalNumber\": \"20240042\""))
        .stdout(predicate::str::contains("\"grossAmount\": \"1081.00\""))
        .stdout(predicate::str::contains("\"netAmount\": \"1000.00\""))
        .stdout(predicate::str::contains("rawText").not());
}

#[test]
fn test_log_level_from_verbosity_and_env() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("invoice.pdf");
    write_invoice(&path, "Muster AG");

    swinv()
        .env_remove("RUST_LOG")
        .arg("process")
        .arg(&path)
        .assert()
        .success()
        .stderr(predicate::str::contains("Processing file").not());

    swinv()
        .env_remove("RUST_LOG")
        .args(["-v", "process"])
        .arg(&path)
        .assert()
        .success()
        .stderr(predicate::str::contains("Processing file"));

    swinv()
        .env("RUST_LOG", "info")
        .arg("process")
        .arg(&path)
        .assert()
        .success()
        .stderr(predicate::str::contains("Processing file"));
}

#[test]
fn test_process_rejects_malformed_config() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("config.json");
    std::fs::write(&config, "{ not json").unwrap();
    let path = dir.path().join("invoice.pdf");
    write_invoice(&path, "Muster AG");

    swinv()
        .arg("process")
        .arg(&path)
        .arg("--config")
        .arg(&config)
        .assert()
        .failure()
        .stderr(predicate::str::contains("configuration error"));
}

#[test]
fn test_batch_writes_outputs_and_summary() {
    let dir = tempfile::tempdir().unwrap();
    write_invoice(&dir.path().join("a.pdf"), "Alpha AG");
    write_invoice(&dir.path().join("b.pdf"), "Beta GmbH");
    std::fs::write(dir.path().join("broken.pdf"), "not a pdf").unwrap();
    let out = dir.path().join("out");

    let pattern = format!("{}/*.pdf", dir.path().display());
    swinv()
        .args(["batch", &pattern, "--summary", "--continue-on-error", "-j", "2", "-o"])
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("2 successful, 1 failed"));

    assert!(out.join("a.json").exists());
    assert!(out.join("b.json").exists());
    assert!(!out.join("broken.json").exists());

    let summary = std::fs::read_to_string(out.join("summary.csv")).unwrap();
    assert!(summary.contains("a.pdf,success,20240042,Alpha AG,2024-05-02"));
    assert!(summary.contains("broken.pdf,error"));
}

#[test]
fn test_batch_stops_on_error_by_default() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("broken.pdf"), "not a pdf").unwrap();

    let pattern = format!("{}/*.pdf", dir.path().display());
    swinv()
        .args(["batch", &pattern])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Processing failed"));
}
