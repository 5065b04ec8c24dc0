use std::path::PathBuf;

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use predicates::prelude::*;

fn fixture_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .canonicalize()
        .expect("fixture directory present")
}

fn cli() -> Command {
    let mut cmd = cargo_bin_cmd!("subwaymap-cli");
    cmd.env("SUBWAYMAP_API_SOURCE", fixture_dir())
        .env("RUST_LOG", "error");
    cmd
}

#[test]
fn routes_lists_long_names() {
    cli()
        .arg("routes")
        .assert()
        .success()
        .stdout(predicate::str::contains("Red Line"))
        .stdout(predicate::str::contains("Green Line"))
        .stdout(predicate::str::contains("Mattapan Trolley"));
}

#[test]
fn stats_reports_network_shape() {
    cli()
        .arg("stats")
        .assert()
        .success()
        .stdout(predicate::str::contains("Mattapan Trolley (2 stops)"))
        .stdout(predicate::str::contains("Red Line (8 stops)"))
        .stdout(predicate::str::contains("Park Street [Red Line, Green Line]"))
        .stdout(predicate::str::contains("Vertices |V| = 13"))
        .stdout(predicate::str::contains("Edges |E| = 11"));
}

#[test]
fn path_crosses_lines_at_the_transfer_stop() {
    cli()
        .arg("path")
        .arg("--from")
        .arg("Davis")
        .arg("--to")
        .arg("Arlington")
        .assert()
        .success()
        .stdout(predicate::str::contains("Found path (8 hops):"))
        .stdout(predicate::str::contains("-> Davis [Red Line]"))
        .stdout(predicate::str::contains(
            "-> Park Street [Red Line, Green Line]",
        ))
        .stdout(predicate::str::contains("-> Arlington [Green Line]"));
}

#[test]
fn path_accepts_partial_and_mixed_case_names() {
    cli()
        .arg("path")
        .arg("--from")
        .arg("davis")
        .arg("--to")
        .arg("kendall")
        .assert()
        .success()
        .stdout(predicate::str::contains("Found path (4 hops):"))
        .stdout(predicate::str::contains("-> Kendall/MIT [Red Line]"));
}

#[test]
fn unreachable_goal_is_reported_without_failing() {
    cli()
        .arg("path")
        .arg("--from")
        .arg("Davis")
        .arg("--to")
        .arg("Mattapan")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "no path found between Davis and Mattapan",
        ));
}

#[test]
fn unknown_stop_error_is_friendly() {
    cli()
        .arg("path")
        .arg("--from")
        .arg("Davies")
        .arg("--to")
        .arg("Arlington")
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown stop name: Davies"))
        .stderr(predicate::str::contains("Davis"));
}

#[test]
fn json_output_is_machine_readable() {
    cli()
        .arg("--json")
        .arg("path")
        .arg("--from")
        .arg("Davis")
        .arg("--to")
        .arg("Arlington")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"distance\": 8"))
        .stdout(predicate::str::contains("\"place-davis\""));
}

#[test]
fn empty_fixture_directory_fails_with_context() {
    let empty = tempfile::tempdir().expect("temp dir");
    let mut cmd = cargo_bin_cmd!("subwaymap-cli");
    cmd.env("SUBWAYMAP_API_SOURCE", empty.path())
        .env("RUST_LOG", "error")
        .arg("routes")
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "failed to fetch subway routes and stops",
        ))
        .stderr(predicate::str::contains("transit API fixture not found"));
}
