//! End-to-end tests for the `coherent` binary.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn coherent() -> Command {
    Command::cargo_bin("coherent").unwrap()
}

const RELATIONS: &str = "Paris\t/location/capital_of\tFrance\nLyon\t/location/in\tFrance\n";

fn linked_doc(id: &str) -> String {
    serde_json::json!({
        "id": id,
        "tokens": ["Paris", "and", "France"],
        "views": [{
            "viewName": "English_WIKIFIERVIEW",
            "viewData": [{
                "viewType": "SpanLabelView",
                "viewName": "English_WIKIFIERVIEW",
                "generator": "wikifier",
                "score": 1.0,
                "constituents": [
                    {"label": "Paris", "score": 0.9, "start": 0, "end": 1,
                     "labelScoreMap": {"Paris": 0.9, "Berlin": 0.1}},
                    {"label": "Germany", "score": 0.5, "start": 2, "end": 3,
                     "labelScoreMap": {"Germany": 0.5, "France": 0.45}}
                ]
            }]
        }, {
            "viewName": "GOLD_WIKI_LABELS",
            "viewData": [{
                "viewType": "SpanLabelView",
                "viewName": "GOLD_WIKI_LABELS",
                "generator": "gold",
                "score": 1.0,
                "constituents": [
                    {"label": "Paris", "score": 1.0, "start": 0, "end": 1},
                    {"label": "France", "score": 1.0, "start": 2, "end": 3}
                ]
            }]
        }]
    })
    .to_string()
}

fn setup() -> (TempDir, std::path::PathBuf, std::path::PathBuf) {
    let tmp = TempDir::new().unwrap();
    let docs = tmp.path().join("docs");
    fs::create_dir(&docs).unwrap();
    fs::write(docs.join("doc1"), linked_doc("doc1")).unwrap();
    let relations = tmp.path().join("relations.tsv");
    fs::write(&relations, RELATIONS).unwrap();
    (tmp, docs, relations)
}

fn coherence_labels(path: &Path) -> Vec<String> {
    let json: serde_json::Value = serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap();
    json["views"]
        .as_array()
        .unwrap()
        .iter()
        .find(|v| v["viewName"] == "COHERENCE")
        .unwrap()["viewData"][0]["constituents"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["label"].as_str().unwrap().to_string())
        .collect()
}

#[test]
fn help_lists_subcommands() {
    coherent()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("rerank"))
        .stdout(predicate::str::contains("evaluate"))
        .stdout(predicate::str::contains("inspect"))
        .stdout(predicate::str::contains("gold"));
}

#[test]
fn rerank_writes_coherence_view() {
    let (tmp, docs, relations) = setup();
    let out = tmp.path().join("out");
    coherent()
        .arg("rerank")
        .arg(&docs)
        .arg("--relations")
        .arg(&relations)
        .arg("--output")
        .arg(&out)
        .assert()
        .success();
    assert_eq!(coherence_labels(&out.join("doc1")), vec!["Paris", "France"]);
}

#[test]
fn rerank_defaults_to_input_dir() {
    let (_tmp, docs, relations) = setup();
    coherent()
        .args(["rerank", "--strategy", "narrow", "-r"])
        .arg(&relations)
        .arg(&docs)
        .assert()
        .success();
    assert_eq!(coherence_labels(&docs.join("doc1")).len(), 2);
}

#[test]
fn rerank_reads_relations_from_config() {
    let (tmp, docs, _relations) = setup();
    let config = tmp.path().join("run.toml");
    fs::write(&config, "relations = \"relations.tsv\"\ncoherence_view = \"NGDVIEW\"\n").unwrap();
    coherent()
        .arg("rerank")
        .arg(&docs)
        .arg("--config")
        .arg(&config)
        .assert()
        .success();
    let written = fs::read_to_string(docs.join("doc1")).unwrap();
    assert!(written.contains("NGDVIEW"));
}

#[test]
fn missing_relation_table_fails() {
    let (tmp, docs, _relations) = setup();
    coherent()
        .arg("rerank")
        .arg(&docs)
        .arg("--relations")
        .arg(tmp.path().join("absent.tsv"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("load relations"));
}

#[test]
fn empty_relation_table_fails() {
    let (tmp, docs, _relations) = setup();
    let empty = tmp.path().join("empty.tsv");
    fs::write(&empty, "\n").unwrap();
    coherent()
        .arg("rerank")
        .arg(&docs)
        .arg("--relations")
        .arg(&empty)
        .assert()
        .failure();
}

#[test]
fn one_bad_document_does_not_fail_the_run() {
    let (_tmp, docs, relations) = setup();
    fs::write(docs.join("broken"), "{ nope").unwrap();
    coherent()
        .arg("rerank")
        .arg(&docs)
        .arg("--relations")
        .arg(&relations)
        .assert()
        .success()
        .stderr(predicate::str::contains("skipped"));
}

#[test]
fn all_documents_failing_is_an_error() {
    let (_tmp, docs, relations) = setup();
    fs::write(docs.join("doc1"), "{ nope").unwrap();
    coherent()
        .arg("rerank")
        .arg(&docs)
        .arg("--relations")
        .arg(&relations)
        .assert()
        .failure();
}

#[test]
fn evaluate_reports_json() {
    let (tmp, docs, relations) = setup();
    coherent()
        .arg("rerank")
        .arg(&docs)
        .arg("--relations")
        .arg(&relations)
        .assert()
        .success();
    let brackets = tmp.path().join("brackets.tsv");
    fs::write(&brackets, "doc1\t0-10\n").unwrap();

    let output = coherent()
        .arg("evaluate")
        .arg(&docs)
        .arg("--brackets")
        .arg(&brackets)
        .args(["--format", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["documents"], 1);
    assert_eq!(report["accuracy"], 0.5);
    assert_eq!(report["coherence_accuracy"], 1.0);
    assert_eq!(report["brackets"][0]["tally"]["changed"], 1);
}

#[test]
fn inspect_lists_neighbors() {
    let (_tmp, _docs, relations) = setup();
    coherent()
        .arg("inspect")
        .arg("--relations")
        .arg(&relations)
        .arg("France")
        .assert()
        .success()
        .stdout(predicate::str::contains("2 relations"))
        .stdout(predicate::str::contains("Lyon"))
        .stdout(predicate::str::contains("Paris"));
}

const DATASET: &str = r#"<wikipedia.entityAnnotation>
  <document docName="army">
    <annotation>
      <mention>Austria</mention>
      <wikiName>Austria Hungary</wikiName>
      <offset>4</offset>
      <length>7</length>
    </annotation>
  </document>
  <document docName="absent">
    <annotation>
      <mention>x</mention>
      <wikiName>X</wikiName>
      <offset>0</offset>
      <length>1</length>
    </annotation>
  </document>
</wikipedia.entityAnnotation>
"#;

fn tokenized_doc() -> String {
    serde_json::json!({
        "id": "tokenizer-id",
        "tokens": ["the", "Austrian", "army"],
        "tokenOffsets": [
            {"form": "the", "startCharOffset": 0, "endCharOffset": 3},
            {"form": "Austrian", "startCharOffset": 4, "endCharOffset": 12},
            {"form": "army", "startCharOffset": 13, "endCharOffset": 17}
        ]
    })
    .to_string()
}

#[test]
fn gold_attaches_views_from_dataset() {
    let tmp = TempDir::new().unwrap();
    let tokenized = tmp.path().join("tokenized");
    fs::create_dir(&tokenized).unwrap();
    fs::write(tokenized.join("army"), tokenized_doc()).unwrap();
    let dataset = tmp.path().join("wikipedia.xml");
    fs::write(&dataset, DATASET).unwrap();
    let out = tmp.path().join("gold");

    coherent()
        .arg("gold")
        .arg(&dataset)
        .arg(&tokenized)
        .arg("--output")
        .arg(&out)
        .assert()
        .success()
        .stderr(predicate::str::contains("skipped"))
        .stderr(predicate::str::contains("absent"));

    let json: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(out.join("army")).unwrap()).unwrap();
    assert_eq!(json["id"], "army");
    let gold = json["views"]
        .as_array()
        .unwrap()
        .iter()
        .find(|v| v["viewName"] == "GOLD_WIKI_LABELS")
        .unwrap();
    let constituent = &gold["viewData"][0]["constituents"][0];
    assert_eq!(constituent["label"], "Austria_Hungary");
    assert_eq!(constituent["start"], 1);
    assert_eq!(constituent["end"], 2);
}

#[test]
fn gold_with_malformed_dataset_fails() {
    let (tmp, docs, _relations) = setup();
    let dataset = tmp.path().join("broken.xml");
    fs::write(&dataset, "<root><document docName=\"d\"></root>").unwrap();
    coherent()
        .arg("gold")
        .arg(&dataset)
        .arg(&docs)
        .assert()
        .failure()
        .stderr(predicate::str::contains("load dataset"));
}

#[test]
fn completions_generate() {
    coherent()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("coherent"));
}
