//! Cassette replay integration tests — zero network I/O.
//!
//! All tests set `QUOTECARD_REPLAY` to a cassette written into a temp
//! directory so the binary never contacts a live endpoint.

use std::path::{Path, PathBuf};

use assert_cmd::Command;
use base64::Engine;
use predicates::prelude::*;

const PNG_MAGIC: [u8; 8] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];

fn cmd(work: &Path, cassette: &Path) -> Command {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("quotecard");
    cmd.env("QUOTECARD_REPLAY", cassette.to_str().unwrap())
        .env("QUOTECARD_CONFIG", work.join("config.toml").to_str().unwrap())
        .env_remove("QUOTECARD_REC")
        .env_remove("QUOTECARD_PHOTO_URL")
        .env_remove("QUOTECARD_QUOTE_URL");
    cmd
}

/// Fresh scratch directory with a config pointing the native cache inside it.
fn workspace(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(name);
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(
        dir.join("config.toml"),
        format!("[cache]\ndir = {:?}\n", dir.join("cache").to_str().unwrap()),
    )
    .unwrap();
    dir
}

fn red_png() -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(9, 16, image::Rgba([220, 20, 20, 255]));
    let mut buf = std::io::Cursor::new(Vec::<u8>::new());
    img.write_to(&mut buf, image::ImageFormat::Png).unwrap();
    buf.into_inner()
}

const QUOTE_OK: &str = "      Ok:\n        content: Simplicity is prerequisite for reliability.\n        author: Edsger W. Dijkstra\n";

fn photo_ok() -> String {
    let b64 = base64::engine::general_purpose::STANDARD.encode(red_png());
    format!("      Ok:\n        data: {b64}\n        content_type: image/png\n")
}

fn write_cassette(dir: &Path, quote_output: &str, photo_output: &str) -> PathBuf {
    let content = format!(
        "name: replay-test\nrecorded_at: \"2026-02-01T00:00:00Z\"\ncommit: test\ninteractions:\n  - seq: 0\n    port: quote_source\n    method: random\n    input: technology\n    output:\n{quote_output}  - seq: 1\n    port: photo_source\n    method: fetch\n    input: https://picsum.photos/1080/1920\n    output:\n{photo_output}"
    );
    let path = dir.join("session.cassette.yaml");
    std::fs::write(&path, content).unwrap();
    path
}

fn exported_files(dir: &Path) -> Vec<PathBuf> {
    std::fs::read_dir(dir)
        .unwrap()
        .flatten()
        .map(|e| e.path())
        .filter(|p| p.extension().is_some_and(|e| e == "png"))
        .collect()
}

fn assert_export_name(path: &Path) {
    let name = path.file_name().unwrap().to_string_lossy();
    let digits = name.strip_prefix("quote-").and_then(|n| n.strip_suffix(".png"));
    assert!(
        digits.is_some_and(|d| !d.is_empty() && d.chars().all(|c| c.is_ascii_digit())),
        "unexpected export name: {name}"
    );
}

#[test]
fn web_export_downloads_png() {
    let work = workspace("quotecard_test_web");
    let cassette = write_cassette(&work, QUOTE_OK, &photo_ok());
    let downloads = work.join("downloads");

    cmd(&work, &cassette)
        .args(["--tag", "technology", "--output-dir", downloads.to_str().unwrap()])
        .assert()
        .success()
        .stderr(predicate::str::contains("Saved:"));

    let files = exported_files(&downloads);
    assert_eq!(files.len(), 1, "exactly one download expected");
    assert_export_name(&files[0]);

    let data = std::fs::read(&files[0]).unwrap();
    assert_eq!(&data[..8], &PNG_MAGIC);
    let img = image::load_from_memory(&data).unwrap().to_rgba8();
    assert_eq!(img.dimensions(), (430, 764));
    assert!(img.get_pixel(0, 0)[0] > 200, "background should be the replayed photo");
    assert!(img.get_pixel(45, 382)[0] < 120, "quote box should darken its padding");

    let _ = std::fs::remove_dir_all(&work);
}

#[test]
fn scale_multiplies_export_size() {
    let work = workspace("quotecard_test_scale");
    let cassette = write_cassette(&work, QUOTE_OK, &photo_ok());
    let downloads = work.join("downloads");

    cmd(&work, &cassette)
        .args(["--scale", "2", "-o", downloads.to_str().unwrap()])
        .assert()
        .success();

    let files = exported_files(&downloads);
    let img = image::open(&files[0]).unwrap();
    assert_eq!((img.width(), img.height()), (860, 1528));

    let _ = std::fs::remove_dir_all(&work);
}

#[test]
fn native_export_saves_into_album() {
    let work = workspace("quotecard_test_native");
    let cassette = write_cassette(&work, QUOTE_OK, &photo_ok());
    let gallery = work.join("gallery");

    cmd(&work, &cassette)
        .args(["--platform", "native", "-o", gallery.to_str().unwrap()])
        .assert()
        .success()
        .stderr(predicate::str::contains("Image saved to gallery!"));

    let files = exported_files(&gallery.join("QuoteGenerator"));
    assert_eq!(files.len(), 1);
    assert_export_name(&files[0]);
    assert!(work.join("cache").join("1920").is_file(), "photo should be cached by basename");

    let _ = std::fs::remove_dir_all(&work);
}

#[test]
fn failed_quote_still_exports_background() {
    let work = workspace("quotecard_test_quote_err");
    let cassette = write_cassette(&work, "      Err: \"API error (404): no quotes\"\n", &photo_ok());
    let downloads = work.join("downloads");

    cmd(&work, &cassette)
        .args(["-o", downloads.to_str().unwrap()])
        .assert()
        .success()
        .stderr(predicate::str::contains("no quote available"));

    let img = image::open(&exported_files(&downloads)[0]).unwrap().to_rgba8();
    assert!(img.get_pixel(215, 382)[0] > 200, "no quote box without a quote");

    let _ = std::fs::remove_dir_all(&work);
}

#[test]
fn failed_photo_falls_back_to_blank_background() {
    let work = workspace("quotecard_test_photo_err");
    let cassette = write_cassette(&work, QUOTE_OK, "      Err: \"Network error: timed out\"\n");
    let downloads = work.join("downloads");

    cmd(&work, &cassette)
        .args(["-o", downloads.to_str().unwrap()])
        .assert()
        .success()
        .stderr(predicate::str::contains("Saved:"));

    let img = image::open(&exported_files(&downloads)[0]).unwrap().to_rgba8();
    assert_eq!(img.get_pixel(0, 0).0, [0, 0, 0, 255]);

    let _ = std::fs::remove_dir_all(&work);
}

#[test]
fn missing_cassette_is_a_config_error() {
    let work = workspace("quotecard_test_missing_cassette");

    cmd(&work, &work.join("nope.cassette.yaml"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load cassette"));

    let _ = std::fs::remove_dir_all(&work);
}
