//! End-to-end tests with a real headless Chrome.
//!
//! Gated behind `E2E_ENABLED` because they need a Chrome/Chromium install.
//!
//! Run with:
//!   E2E_ENABLED=1 cargo test --test e2e -- --nocapture
//!
//! Set `CHROME=/path/to/chrome` to use a specific browser binary.

use md2pdf::{convert_file, render_to_bytes, ConversionConfig, PaperSize, Server, ServerConfig};
use std::path::PathBuf;

macro_rules! e2e_skip_unless_enabled {
    () => {
        if std::env::var("E2E_ENABLED").is_err() {
            println!("SKIP — set E2E_ENABLED=1 to run e2e tests");
            return;
        }
    };
}

fn config() -> md2pdf::ConversionConfigBuilder {
    let builder = ConversionConfig::builder();
    match std::env::var_os("CHROME") {
        Some(path) => builder.chrome_path(PathBuf::from(path)),
        None => builder,
    }
}

/// Parse `bytes` as a PDF and return its page count.
fn page_count(bytes: &[u8]) -> usize {
    let doc = lopdf::Document::load_mem(bytes).expect("output must be a valid PDF");
    doc.get_pages().len()
}

const LONG_DOC: &str = include_str!("../README.md");

#[test]
fn e2e_file_conversion_produces_valid_pdf() {
    e2e_skip_unless_enabled!();

    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("readme.md");
    std::fs::write(&input, LONG_DOC).unwrap();

    let config = config().build().unwrap();
    let output = convert_file(&input, None, &config).unwrap();

    let bytes = std::fs::read(&output).unwrap();
    assert!(bytes.starts_with(b"%PDF-"), "not a PDF header");
    let pages = page_count(&bytes);
    println!("{} → {} pages, {} bytes", output.display(), pages, bytes.len());
    assert!(pages >= 1);
}

#[test]
fn e2e_watermark_and_layout() {
    e2e_skip_unless_enabled!();

    let config = config()
        .watermark()
        .paper(PaperSize::Letter)
        .landscape(true)
        .build()
        .unwrap();
    let bytes = render_to_bytes("# Watermarked\n\nBody text.\n", "wm.md", &config).unwrap();

    assert!(page_count(&bytes) >= 1);

    let doc = lopdf::Document::load_mem(&bytes).unwrap();
    let (_, first) = doc.get_pages().into_iter().next().unwrap();
    let media_box = doc
        .get_dictionary(first)
        .and_then(|page| page.get(b"MediaBox"))
        .and_then(|obj| obj.as_array())
        .map(|arr| arr.iter().filter_map(|v| v.as_float().ok()).collect::<Vec<_>>())
        .unwrap_or_default();
    println!("MediaBox: {media_box:?}");
    if media_box.len() == 4 {
        // 11in × 8.5in at 72pt/in, landscape.
        assert!((media_box[2] - 792.0).abs() < 2.0, "width: {}", media_box[2]);
        assert!((media_box[3] - 612.0).abs() < 2.0, "height: {}", media_box[3]);
    }
}

#[test]
fn e2e_relative_images_resolve_against_input_dir() {
    e2e_skip_unless_enabled!();

    let dir = tempfile::tempdir().unwrap();
    // 1×1 transparent PNG.
    let png: &[u8] = &[
        0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44,
        0x52, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x06, 0x00, 0x00, 0x00, 0x1F,
        0x15, 0xC4, 0x89, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x44, 0x41, 0x54, 0x78, 0x9C, 0x63, 0x00,
        0x01, 0x00, 0x00, 0x05, 0x00, 0x01, 0x0D, 0x0A, 0x2D, 0xB4, 0x00, 0x00, 0x00, 0x00, 0x49,
        0x45, 0x4E, 0x44, 0xAE, 0x42, 0x60, 0x82,
    ];
    std::fs::create_dir_all(dir.path().join("img")).unwrap();
    std::fs::write(dir.path().join("img/dot.png"), png).unwrap();
    let input = dir.path().join("doc.md");
    std::fs::write(&input, "# Image\n\n![dot](img/dot.png)\n").unwrap();

    let config = config().build().unwrap();
    let output = convert_file(&input, Some(&dir.path().join("out/doc.pdf")), &config).unwrap();
    assert!(page_count(&std::fs::read(output).unwrap()) >= 1);
}

#[tokio::test]
async fn e2e_http_convert_watermark() {
    e2e_skip_unless_enabled!();

    let server = Server::bind(ServerConfig {
        port: 0,
        conversion: config().build().unwrap(),
        ..ServerConfig::default()
    })
    .await
    .unwrap();
    let addr = server.local_addr().unwrap();
    let (tx, rx) = tokio::sync::oneshot::channel::<()>();
    let handle = tokio::spawn(server.run_until(async {
        let _ = rx.await;
    }));

    let resp = reqwest::Client::new()
        .post(format!("http://{addr}/convert-watermark"))
        .json(&serde_json::json!({"markdown": "# 机密\n\n内容", "filename": "secret.pdf"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);
    let bytes = resp.bytes().await.unwrap();
    assert!(page_count(&bytes) >= 1);

    let _ = tx.send(());
    handle.await.unwrap().unwrap();
}
