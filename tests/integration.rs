use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

fn gbchunk_binary() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_gbchunk"))
}

fn paragraph(word: &str) -> String {
    // two lines of ~200 chars each
    let line = format!("{} ", word).repeat(200 / (word.len() + 1));
    format!("{}\n{}", line.trim(), line.trim())
}

fn alice_text() -> String {
    format!(
        "The Project Gutenberg EBook of Alice's Adventures in Wonderland\r\n\
         \r\n\
         Title: Alice's Adventures in Wonderland\r\n\
         \r\n\
         Author: Lewis Carroll\r\n\
         \r\n\
         *** START OF THIS PROJECT GUTENBERG EBOOK ALICE ***\r\n\
         \r\n\
         {}\n\n\
         CHAPTER I\n\n\
         {}\n\n\
         {}\n\n\
         *** END OF THIS PROJECT GUTENBERG EBOOK ALICE ***\n\
         \n\
         {}\n\n",
        paragraph("rabbit"),
        paragraph("hatter"),
        paragraph("queen"),
        paragraph("license")
    )
}

fn write_zip(path: &Path, entry: &str, body: &str) {
    let file = File::create(path).unwrap();
    let mut zip = zip::ZipWriter::new(file);
    zip.start_file(entry, zip::write::SimpleFileOptions::default())
        .unwrap();
    zip.write_all(body.as_bytes()).unwrap();
    zip.finish().unwrap();
}

fn setup_test_env() -> (TempDir, PathBuf) {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().to_path_buf();

    let config_dir = root.join("config");
    fs::create_dir_all(&config_dir).unwrap();

    // Mirror layout: one dir per book, with alternate encodings alongside
    let mirror = root.join("mirror");
    let alice_dir = mirror.join("1/1");
    let nomark_dir = mirror.join("2/2");
    fs::create_dir_all(&alice_dir).unwrap();
    fs::create_dir_all(&nomark_dir).unwrap();

    write_zip(&alice_dir.join("11.zip"), "11.txt", &alice_text());
    write_zip(&alice_dir.join("11-8.zip"), "11-8.txt", &alice_text());
    write_zip(
        &nomark_dir.join("22.zip"),
        "22.txt",
        &format!("Title: No Markers\n\n{}\n\n", paragraph("plain")),
    );

    let config_content = format!(
        r#"[db]
path = "{}/data/gutenberg.sqlite"

[chunking]
min_chars = 300

[import]
root = "{}/mirror"
"#,
        root.display(),
        root.display()
    );

    let config_path = config_dir.join("gbchunk.toml");
    fs::write(&config_path, config_content).unwrap();

    (tmp, config_path)
}

fn run_gbchunk(config_path: &Path, args: &[&str]) -> (String, String, bool) {
    let binary = gbchunk_binary();
    let output = Command::new(&binary)
        .arg("--config")
        .arg(config_path.to_str().unwrap())
        .args(args)
        .output()
        .unwrap_or_else(|e| panic!("Failed to run gbchunk binary at {:?}: {}", binary, e));

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    (stdout, stderr, output.status.success())
}

fn init_and_import(config_path: &Path) {
    let (stdout, stderr, success) = run_gbchunk(config_path, &["init"]);
    assert!(success, "init failed: stdout={}, stderr={}", stdout, stderr);
    let (stdout, stderr, success) = run_gbchunk(config_path, &["import"]);
    assert!(success, "import failed: stdout={}, stderr={}", stdout, stderr);
}

fn document_id_by_filename(config_path: &Path, filename: &str) -> i64 {
    for id in 1..=2 {
        let (stdout, _, success) = run_gbchunk(config_path, &["get", &id.to_string(), "--json"]);
        if !success {
            continue;
        }
        let doc: serde_json::Value = serde_json::from_str(&stdout).unwrap();
        if doc["filename"] == filename {
            return id;
        }
    }
    panic!("no document with filename {}", filename);
}

#[test]
fn test_init_idempotent() {
    let (_tmp, config_path) = setup_test_env();

    let (stdout, _, success1) = run_gbchunk(&config_path, &["init"]);
    assert!(success1, "First init failed");
    assert!(stdout.contains("initialized"));

    let (_, _, success2) = run_gbchunk(&config_path, &["init"]);
    assert!(success2, "Second init failed (not idempotent)");
}

#[test]
fn test_import_skips_alternate_encodings_and_existing() {
    let (_tmp, config_path) = setup_test_env();
    run_gbchunk(&config_path, &["init"]);

    let (stdout, stderr, success) = run_gbchunk(&config_path, &["import"]);
    assert!(success, "import failed: stdout={}, stderr={}", stdout, stderr);
    assert!(stdout.contains("files found: 2"));
    assert!(stdout.contains("imported: 2"));

    let (stdout, _, success) = run_gbchunk(&config_path, &["import"]);
    assert!(success);
    assert!(stdout.contains("imported: 0"));
    assert!(stdout.contains("skipped (already stored): 2"));
}

#[test]
fn test_import_scrapes_metadata() {
    let (_tmp, config_path) = setup_test_env();
    init_and_import(&config_path);

    let id = document_id_by_filename(&config_path, "11.txt");
    let (stdout, _, success) = run_gbchunk(&config_path, &["get", &id.to_string(), "--json"]);
    assert!(success);
    let doc: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(doc["name"], "Alice's Adventures in Wonderland");
    assert_eq!(doc["author"], "Lewis Carroll");
}

#[test]
fn test_chunk_all_documents() {
    let (_tmp, config_path) = setup_test_env();
    init_and_import(&config_path);

    let (stdout, stderr, success) = run_gbchunk(&config_path, &["chunk"]);
    assert!(success, "chunk failed: stdout={}, stderr={}", stdout, stderr);
    assert!(stdout.contains("documents: 2"));
    assert!(stdout.contains("succeeded: 2"));
    assert!(stdout.contains("chunks written: 3"));
    assert!(stdout.contains("ok"));

    let alice = document_id_by_filename(&config_path, "11.txt");
    let (stdout, _, _) = run_gbchunk(&config_path, &["get", &alice.to_string(), "--json"]);
    let doc: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    let chunks = doc["chunks"].as_array().unwrap();
    assert_eq!(chunks.len(), 3);
    assert_eq!(chunks[0]["text"], format!("{}\n", paragraph("rabbit")));
    assert_eq!(chunks[1]["text"], format!("{}\n", paragraph("hatter")));
    assert_eq!(chunks[2]["text"], format!("{}\n", paragraph("queen")));
    assert_eq!(chunks[0]["source_id"], alice);

    let nomark = document_id_by_filename(&config_path, "22.txt");
    let (stdout, _, _) = run_gbchunk(&config_path, &["get", &nomark.to_string(), "--json"]);
    let doc: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert!(doc["chunks"].as_array().unwrap().is_empty());
}

#[test]
fn test_rechunk_appends_unless_replace() {
    let (_tmp, config_path) = setup_test_env();
    init_and_import(&config_path);

    run_gbchunk(&config_path, &["chunk"]);
    run_gbchunk(&config_path, &["chunk"]);
    let (stdout, _, _) = run_gbchunk(&config_path, &["stats"]);
    assert!(stdout.contains("Chunks:      6"), "stats: {}", stdout);

    let (stdout, _, success) = run_gbchunk(&config_path, &["chunk", "--replace"]);
    assert!(success);
    assert!(stdout.contains("chunks written: 3"));
    let (stdout, _, _) = run_gbchunk(&config_path, &["stats"]);
    assert!(stdout.contains("Chunks:      3"), "stats: {}", stdout);
    assert!(stdout.contains("Unchunked:   1"), "stats: {}", stdout);
}

#[test]
fn test_chunk_unknown_id_reports_failure() {
    let (_tmp, config_path) = setup_test_env();
    init_and_import(&config_path);

    let (stdout, stderr, success) = run_gbchunk(&config_path, &["chunk", "--id", "999"]);
    assert!(!success);
    assert!(stdout.contains("failed: 1"));
    assert!(stdout.contains("document not found: 999"));
    assert!(stderr.contains("1 document(s) failed"));
}

#[test]
fn test_chunk_min_chars_override() {
    let (_tmp, config_path) = setup_test_env();
    init_and_import(&config_path);

    let alice = document_id_by_filename(&config_path, "11.txt");
    let (stdout, _, success) = run_gbchunk(
        &config_path,
        &["chunk", "--id", &alice.to_string(), "--min-chars", "5"],
    );
    assert!(success);
    // CHAPTER I is long enough now
    assert!(stdout.contains("chunks written: 4"));
}

#[test]
fn test_get_missing_document() {
    let (_tmp, config_path) = setup_test_env();
    init_and_import(&config_path);

    let (_, stderr, success) = run_gbchunk(&config_path, &["get", "4242"]);
    assert!(!success);
    assert!(stderr.contains("document not found"));
}

#[test]
fn test_missing_config_fails() {
    let (_tmp, config_path) = setup_test_env();
    let missing = config_path.with_file_name("nope.toml");

    let (_, stderr, success) = run_gbchunk(&missing, &["stats"]);
    assert!(!success);
    assert!(stderr.contains("Failed to read config file"));
}
