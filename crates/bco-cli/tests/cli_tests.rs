// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
#![allow(missing_docs, clippy::unwrap_used, clippy::expect_used)]

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// A 20x20 road quad at height 2, a 10x10 grass quad at height 5 above part
/// of it, and one decal face that maps to nothing.
const TRACK_OBJ: &str = "\
v 0 2 0
v 20 2 0
v 20 2 20
v 0 2 20
v 0 5 0
v 10 5 0
v 10 5 10
v 0 5 10
usemtl road
f 1 2 3 4
usemtl grass
f 5/1 6/1 7/1 8/1
usemtl decal
f -1 -2 -3
";

const REMAP: &str = "\
# surfaces
0x0100 = 1, 0, (4, 100, 200)
road = 0x0100
grass = 0x0300, 2
";

fn bco() -> Command {
    Command::cargo_bin("bco").unwrap()
}

fn workspace() -> (TempDir, PathBuf, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let obj = dir.path().join("track.obj");
    let remap = dir.path().join("track.remap");
    fs::write(&obj, TRACK_OBJ).unwrap();
    fs::write(&remap, REMAP).unwrap();
    (dir, obj, remap)
}

fn export(dir: &Path, obj: &Path, remap: &Path) -> PathBuf {
    let out = dir.join("track.bco");
    bco()
        .arg("export")
        .arg(obj)
        .arg("-o")
        .arg(&out)
        .arg("--remap")
        .arg(remap)
        .assert()
        .success()
        .stdout(predicate::str::contains("4 triangles, 1 excluded faces, 2 materials"));
    out
}

#[test]
fn export_then_verify() {
    let (dir, obj, remap) = workspace();
    let out = export(dir.path(), &obj, &remap);
    assert_eq!(&fs::read(&out).unwrap()[..4], b"0003");

    bco()
        .arg("verify")
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::starts_with("ok:"));
}

#[test]
fn info_lists_sections_and_materials() {
    let (dir, obj, remap) = workspace();
    let out = export(dir.path(), &obj, &remap);
    bco()
        .arg("info")
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("triangle indices"))
        .stdout(predicate::str::contains("0x0100"))
        .stdout(predicate::str::contains("0x0300"));

    let output = bco().arg("info").arg(&out).arg("--json").output().unwrap();
    assert!(output.status.success());
    let doc: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(doc["materials"][0]["sound_id"], 4);
    assert_eq!(doc["sections"].as_array().unwrap().len(), 5);
}

#[test]
fn height_probes_files_and_meshes() {
    let (dir, obj, remap) = workspace();
    let out = export(dir.path(), &obj, &remap);

    for target in [&out, &obj] {
        bco()
            .args(["height"])
            .arg(target)
            .args(["--x", "5", "--z", "5"])
            .assert()
            .success()
            .stdout(predicate::str::starts_with("height 5"));
        bco()
            .args(["height"])
            .arg(target)
            .args(["--x", "5", "--z", "5", "--y", "4"])
            .assert()
            .success()
            .stdout(predicate::str::starts_with("height 2"));
        bco()
            .args(["height"])
            .arg(target)
            .args(["--x", "5", "--z", "5", "--y", "4", "--closest"])
            .assert()
            .success()
            .stdout(predicate::str::starts_with("height 5"));
    }

    bco()
        .args(["height"])
        .arg(&out)
        .args(["--x", "-5000", "--z", "5"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("no ground"));
}

#[test]
fn pick_reports_nearest_hit() {
    let (dir, obj, remap) = workspace();
    let out = export(dir.path(), &obj, &remap);
    bco()
        .arg("pick")
        .arg(&out)
        .args(["--origin", "15,50,15", "--direction", "0,-1,0"])
        .assert()
        .success()
        .stdout(predicate::str::contains("distance 48"));
    bco()
        .arg("pick")
        .arg(&obj)
        .args(["--origin", "-5,3,5", "--direction", "-1,0,0"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("no hit"));
}

#[test]
fn verify_rejects_corrupt_files() {
    let (dir, obj, remap) = workspace();
    let out = export(dir.path(), &obj, &remap);
    let mut bytes = fs::read(&out).unwrap();
    bytes[0] = b'X';
    fs::write(&out, bytes).unwrap();
    bco()
        .arg("verify")
        .arg(&out)
        .assert()
        .failure()
        .stderr(predicate::str::contains("not a valid BCO file"));
}

#[test]
fn export_without_remap_fails_on_named_materials() {
    let (dir, obj, _remap) = workspace();
    bco()
        .arg("export")
        .arg(&obj)
        .arg("-o")
        .arg(dir.path().join("none.bco"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("no collision triangles"));
}

#[test]
fn settings_file_is_validated() {
    let (dir, obj, remap) = workspace();
    let settings = dir.path().join("export.json");
    fs::write(&settings, r#"{ "max_tri_count": 0 }"#).unwrap();
    bco()
        .arg("export")
        .arg(&obj)
        .arg("-o")
        .arg(dir.path().join("bad.bco"))
        .arg("--remap")
        .arg(&remap)
        .arg("--settings")
        .arg(&settings)
        .assert()
        .failure()
        .stderr(predicate::str::contains("max_tri_count"));
}
