//! Command-line behaviour of the `rplace-painter` binary.

use assert_cmd::Command;
use image::{Rgba, RgbaImage};
use predicates::prelude::*;
use tempfile::TempDir;

fn write_image(dir: &TempDir) -> std::path::PathBuf {
    let path = dir.path().join("board.png");
    // Columns: white/white, red/white, white/red, red/red
    let red = Rgba([255, 0, 0, 255]);
    let mut img = RgbaImage::from_pixel(4, 2, Rgba([255, 255, 255, 255]));
    img.put_pixel(1, 0, red);
    img.put_pixel(2, 1, red);
    img.put_pixel(3, 0, red);
    img.put_pixel(3, 1, red);
    img.save(&path).expect("Failed to write png");
    path
}

#[test]
fn test_preview_prints_board() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let image = write_image(&temp_dir);

    Command::cargo_bin("rplace-painter")
        .expect("binary exists")
        .arg("preview")
        .arg(&image)
        .assert()
        .success()
        .stdout("█▄▀ \n");
}

#[test]
fn test_preview_missing_image_fails() {
    Command::cargo_bin("rplace-painter")
        .expect("binary exists")
        .args(["preview", "/definitely/not/here.png"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Image error"));
}

#[test]
fn test_serve_requires_image() {
    Command::cargo_bin("rplace-painter")
        .expect("binary exists")
        .env_remove("RPLACE_IMAGE")
        .arg("serve")
        .assert()
        .failure()
        .stderr(predicate::str::contains("server.image is not set"));
}

#[test]
fn test_invalid_config_file_fails() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config = temp_dir.path().join("bad.toml");
    std::fs::write(&config, "[painter]\nurl = \"ftp://nowhere\"\n").expect("write config");

    Command::cargo_bin("rplace-painter")
        .expect("binary exists")
        .arg("--config")
        .arg(&config)
        .arg("paint")
        .assert()
        .failure()
        .stderr(predicate::str::contains("painter.url"));
}
