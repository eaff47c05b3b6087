use std::fs;
use std::process::Command;

use image::{Rgba, RgbaImage};
use tempfile::TempDir;

fn write_deck(root: &std::path::Path, body: &str) -> std::path::PathBuf {
    let path = root.join("deck.toml");
    fs::write(&path, body).unwrap();
    path
}

#[test]
fn validate_prints_resolved_slides() {
    let root = TempDir::new().unwrap();
    fs::create_dir_all(root.path().join("images")).unwrap();
    RgbaImage::from_pixel(4, 3, Rgba([10, 20, 30, 255]))
        .save(root.path().join("images/dawn.png"))
        .unwrap();
    let deck = write_deck(
        root.path(),
        r#"
version = 1
title = "Harbour"

[[slides]]
title = "Dawn"
media = "images/dawn.png"

[[slides]]
title = "Dusk"
media = "images/dusk.png"
"#,
    );

    let output = Command::new(env!("CARGO_BIN_EXE_heroslide"))
        .env("RUST_LOG", "off")
        .arg("validate")
        .arg(&deck)
        .output()
        .expect("failed to run heroslide validate");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Deck: Harbour (2 slides)"));
    assert!(stdout.contains("Dawn"));
    assert!(stdout.contains("missing"));
    assert!(stdout.contains(&root.path().join("images/dawn.png").display().to_string()));
}

#[test]
fn validate_decode_reports_broken_images() {
    let root = TempDir::new().unwrap();
    RgbaImage::from_pixel(8, 2, Rgba([0, 0, 0, 255]))
        .save(root.path().join("good.png"))
        .unwrap();
    let deck = write_deck(
        root.path(),
        r#"
version = 1

[[slides]]
title = "Good"
media = "good.png"

[[slides]]
title = "Gone"
media = "gone.png"
"#,
    );

    let output = Command::new(env!("CARGO_BIN_EXE_heroslide"))
        .env("RUST_LOG", "off")
        .args(["validate", "--decode"])
        .arg(&deck)
        .output()
        .expect("failed to run heroslide validate --decode");

    assert!(!output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("decoded 8x2"));
    assert!(stdout.contains("FAILED"));
}

#[test]
fn validate_rejects_invalid_deck() {
    let root = TempDir::new().unwrap();
    let deck = write_deck(
        root.path(),
        r#"
version = 1

[engine]
sync_point = 1.5

[[slides]]
title = "Only"
media = "only.png"
"#,
    );

    let output = Command::new(env!("CARGO_BIN_EXE_heroslide"))
        .env("RUST_LOG", "off")
        .arg("validate")
        .arg(&deck)
        .output()
        .expect("failed to run heroslide validate");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("sync_point"), "stderr was: {stderr}");
}
