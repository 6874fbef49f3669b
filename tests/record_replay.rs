//! Cassette replay integration tests - zero network I/O.
//!
//! Every test sets `STYLIST_REPLAY` to a cassette built on the fly, so the
//! binary never contacts the Gemini API and needs no key.

use std::path::{Path, PathBuf};

use assert_cmd::Command;
use base64::Engine;
use predicates::prelude::*;
use serde_json::{json, Value};

fn cmd() -> Command {
    assert_cmd::cargo::cargo_bin_cmd!("stylist")
}

/// A fresh scratch directory per test.
fn scratch(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("stylist_replay_{name}"));
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

fn png(width: u32, height: u32) -> Vec<u8> {
    let img = image::DynamicImage::new_rgb8(width, height);
    let mut buf = std::io::Cursor::new(Vec::<u8>::new());
    img.write_to(&mut buf, image::ImageFormat::Png).unwrap();
    buf.into_inner()
}

fn image_output(bytes: &[u8]) -> Value {
    let data = base64::engine::general_purpose::STANDARD.encode(bytes);
    json!({ "Ok": { "data": data, "mime_type": "image/png" } })
}

fn ideas_interaction() -> Value {
    json!({
        "seq": 0,
        "port": "idea_generator",
        "method": "generate_ideas",
        "output": { "Ok": [
            { "category": "Casual", "description": "Cuffed jeans, white sneakers and a canvas tote." },
            { "category": "Business", "description": "Tailored navy trousers and leather loafers." },
            { "category": "Night Out", "description": "Black leather pants and strappy heels." }
        ]}
    })
}

fn interaction(seq: u64, port: &str, method: &str, output: Value) -> Value {
    json!({ "seq": seq, "port": port, "method": method, "output": output })
}

fn write_cassette(dir: &Path, interactions: Vec<Value>) -> PathBuf {
    let cassette = json!({
        "name": "stylist-test",
        "recorded_at": "2026-02-01T00:00:00Z",
        "commit": "test",
        "interactions": interactions,
    });
    let path = dir.join("stylist.cassette.yaml");
    std::fs::write(&path, serde_yaml::to_string(&cassette).unwrap()).unwrap();
    path
}

fn write_item(dir: &Path) -> PathBuf {
    let path = dir.join("blouse.png");
    std::fs::write(&path, png(1, 1)).unwrap();
    path
}

fn stylist(cassette: &Path, item: &Path, out: &Path) -> Command {
    let mut cmd = cmd();
    cmd.env("STYLIST_REPLAY", cassette)
        .env("STYLIST_CONFIG", out.join("absent.toml"))
        .env_remove("GEMINI_API_KEY")
        .env_remove("API_KEY")
        .env_remove("STYLIST_REC")
        .arg(item)
        .arg("--output-dir")
        .arg(out);
    cmd
}

fn synth_interactions(count: u64, bytes: &[u8]) -> Vec<Value> {
    (0..count)
        .map(|i| interaction(i, "image_synthesizer", "synthesize", image_output(bytes)))
        .collect()
}

#[test]
fn happy_path_writes_three_outfits() {
    let dir = scratch("happy");
    let rendered = png(2, 2);
    let mut interactions = vec![ideas_interaction()];
    interactions.extend(synth_interactions(3, &rendered));
    let cassette = write_cassette(&dir, interactions);
    let item = write_item(&dir);
    let out = dir.join("looks");

    stylist(&cassette, &item, &out)
        .write_stdin("wait\nquit\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Your item: blouse.png"))
        .stdout(predicate::str::contains("[Casual]"))
        .stdout(predicate::str::contains("[Business]"))
        .stdout(predicate::str::contains("[Night Out]"))
        .stdout(predicate::str::contains("Oops!").not());

    for name in ["casual.png", "business.png", "night-out.png"] {
        assert_eq!(std::fs::read(out.join(name)).unwrap(), rendered, "{name} should hold the render");
    }
    assert!(out.join("item.png").exists(), "uploaded item should be copied");

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn missing_render_fails_the_whole_batch() {
    let dir = scratch("missing_render");
    let mut interactions = vec![ideas_interaction()];
    interactions.extend(synth_interactions(2, &png(2, 2)));
    let cassette = write_cassette(&dir, interactions);
    let item = write_item(&dir);
    let out = dir.join("looks");

    stylist(&cassette, &item, &out)
        .write_stdin("wait\n")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Oops! Failed to generate outfit ideas. Please try again.",
        ))
        .stdout(predicate::str::contains("[Casual]").not());

    assert!(!out.join("casual.png").exists(), "no partial outfit list should be saved");

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn incremental_reveal_keeps_successful_renders() {
    let dir = scratch("incremental");
    let mut interactions = vec![ideas_interaction()];
    interactions.extend(synth_interactions(2, &png(2, 2)));
    let cassette = write_cassette(&dir, interactions);
    let item = write_item(&dir);
    let out = dir.join("looks");

    stylist(&cassette, &item, &out)
        .args(["--reveal", "incremental"])
        .write_stdin("wait\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("outfit image."));

    let saved = std::fs::read_dir(&out)
        .unwrap()
        .flatten()
        .filter(|e| e.file_name().to_string_lossy() != "item.png")
        .count();
    assert_eq!(saved, 2, "two of three renders should be saved");

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn malformed_ideas_show_generic_error() {
    let dir = scratch("malformed");
    let cassette = write_cassette(
        &dir,
        vec![interaction(0, "idea_generator", "generate_ideas", json!({ "Err": "not json" }))],
    );
    let item = write_item(&dir);
    let out = dir.join("looks");

    stylist(&cassette, &item, &out)
        .write_stdin("quit\n")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Oops! Failed to generate outfit ideas. Please try again.",
        ))
        .stdout(predicate::str::contains("Your item: blouse.png"));

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn edit_replaces_only_the_edited_outfit() {
    let dir = scratch("edit");
    let rendered = png(2, 2);
    let edited = png(3, 3);
    let mut interactions = vec![ideas_interaction()];
    interactions.extend(synth_interactions(3, &rendered));
    interactions.push(interaction(0, "image_editor", "edit", image_output(&edited)));
    let cassette = write_cassette(&dir, interactions);
    let item = write_item(&dir);
    let out = dir.join("looks");

    stylist(&cassette, &item, &out)
        .write_stdin("wait\nedit night-out add a gold necklace\nwait\nquit\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("[Night Out] (editing...)"));

    assert_eq!(std::fs::read(out.join("night-out.png")).unwrap(), edited);
    assert_eq!(std::fs::read(out.join("casual.png")).unwrap(), rendered);

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn failed_edit_keeps_the_previous_image() {
    let dir = scratch("edit_failed");
    let rendered = png(2, 2);
    let mut interactions = vec![ideas_interaction()];
    interactions.extend(synth_interactions(3, &rendered));
    interactions.push(interaction(0, "image_editor", "edit", json!({ "Err": "no image" })));
    let cassette = write_cassette(&dir, interactions);
    let item = write_item(&dir);
    let out = dir.join("looks");

    stylist(&cassette, &item, &out)
        .write_stdin("wait\nedit \"Night Out\" make it sparkle\nquit\n")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Oops! Failed to edit the Night Out outfit. Please try another prompt.",
        ));

    assert_eq!(std::fs::read(out.join("night-out.png")).unwrap(), rendered);

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn unreadable_image_argument_exits_with_error() {
    let dir = scratch("unreadable");
    let cassette = write_cassette(&dir, vec![ideas_interaction()]);

    stylist(&cassette, &dir.join("missing.jpg"), &dir.join("looks"))
        .write_stdin("")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error:"));

    let _ = std::fs::remove_dir_all(&dir);
}
