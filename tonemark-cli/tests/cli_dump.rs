use assert_cmd::Command;
use predicates::prelude::*;

#[test]
fn dump_prints_annotations_from_a_json_store() {
    let dir = tempfile::tempdir().expect("tempdir");
    let json_path = dir.path().join("annotations.json");
    std::fs::write(
        &json_path,
        r#"{ "a.wav": [[850.0, "H*"], [1900.0, "L%"]] }"#,
    )
    .expect("write json");

    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("tonemark"));
    cmd.args(["a.wav", "--json", json_path.to_str().unwrap(), "--dump"])
        .assert()
        .success()
        .stdout(predicate::str::contains("H*"))
        .stdout(predicate::str::contains("L%"))
        .stdout(predicate::str::contains("a.wav"));
}

#[test]
fn dump_lists_recordings_without_stored_annotations_as_empty() {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("tonemark"));
    cmd.args(["missing.wav", "--dump"])
        .assert()
        .success()
        .stdout(predicate::str::contains("missing.wav"))
        .stdout(predicate::str::contains("[]"));
}

#[test]
fn dump_reads_textgrid_point_tiers() {
    let dir = tempfile::tempdir().expect("tempdir");
    let wav_path = dir.path().join("utterance.wav");
    let grid_path = dir.path().join("utterance.TextGrid");
    tonemark_lib::formats::textgrid::write_textgrid(
        grid_path.to_str().unwrap(),
        "ToDI",
        2_000.0,
        &[(1_250.0, "!H*".to_string())],
    )
    .expect("write grid");

    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("tonemark"));
    cmd.args([wav_path.to_str().unwrap(), "--textgrid", "--dump"])
        .assert()
        .success()
        .stdout(predicate::str::contains("!H*"))
        .stdout(predicate::str::contains("1250"));
}

#[test]
fn json_and_textgrid_stores_conflict() {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("tonemark"));
    cmd.args(["a.wav", "--json", "x.json", "--textgrid", "--dump"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot be used with"));
}
