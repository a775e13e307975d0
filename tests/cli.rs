#![allow(deprecated)]
use assert_cmd::Command;
use flate2::read::ZlibDecoder;
use predicates::prelude::*;
use std::fs;
use std::io::Read;
use std::path::Path;
use tempfile::tempdir;

const CATEGORIES: &[&str] = &[
    "ascii", "bgm", "dan", "danbg", "danpl", "dlg", "dvm", "mesh", "sfx", "shaders", "tex",
    "tex/bg", "tex/card", "tex/char", "tex/dan", "tex/ui",
];

#[derive(Debug)]
struct Record {
    path: String,
    checksum: u32,
    offset: u64,
    compressed: u64,
    raw: u64,
}

fn u32_at(b: &[u8], at: usize) -> u32 {
    u32::from_le_bytes(b[at..at + 4].try_into().unwrap())
}

fn u64_at(b: &[u8], at: usize) -> u64 {
    u64::from_le_bytes(b[at..at + 8].try_into().unwrap())
}

/// Independent parser for the RI_0 layout.
fn parse(bytes: &[u8]) -> (u32, u64, Vec<Record>) {
    assert_eq!(&bytes[..4], b"RI_0");
    let count = u32_at(bytes, 4);
    let index_offset = u64_at(bytes, 8);
    assert_eq!(bytes.len() as u64, index_offset + count as u64 * 64);

    let records = bytes[index_offset as usize..]
        .chunks_exact(64)
        .map(|r| {
            let nul = r[..36].iter().position(|b| *b == 0).expect("NUL terminator");
            Record {
                path: String::from_utf8(r[..nul].to_vec()).unwrap(),
                checksum: u32_at(r, 36),
                offset: u64_at(r, 40),
                compressed: u64_at(r, 48),
                raw: u64_at(r, 56),
            }
        })
        .collect();
    (count, index_offset, records)
}

fn adler32(data: &[u8]) -> u32 {
    let (mut a, mut b) = (1u32, 0u32);
    for &x in data {
        a = (a + x as u32) % 65521;
        b = (b + a) % 65521;
    }
    (b << 16) | a
}

fn asset_tree(root: &Path) {
    for c in CATEGORIES {
        fs::create_dir_all(root.join(c)).unwrap();
    }
    fs::write(root.join("tex/ui/button.tex"), b"TEX0 button").unwrap();
    fs::write(root.join("tex/bg/sky.tex"), vec![0u8; 10_000]).unwrap();
    fs::write(root.join("tex/logo.tex"), b"logo").unwrap();
    fs::write(root.join("bgm/title.ogg"), b"OggS title music").unwrap();
    fs::write(root.join("dlg/intro.i"), b"authoring source").unwrap();
    fs::write(root.join("dlg/intro.ich"), b"compiled dialogue").unwrap();
    fs::write(root.join("shaders/basic.vert"), b"void main() {}").unwrap();
    fs::write(root.join("sfx/empty.wav"), b"").unwrap();
    // Nested below a category that is not itself whitelisted.
    fs::create_dir_all(root.join("sfx/old")).unwrap();
    fs::write(root.join("sfx/old/legacy.wav"), b"legacy").unwrap();
    // Outside every category.
    fs::write(root.join("readme.txt"), b"not packed").unwrap();
}

fn ripak() -> Command {
    Command::cargo_bin("ripak").unwrap()
}

#[test]
fn build_packs_exactly_the_eligible_files() {
    let dir = tempdir().unwrap();
    let root = dir.path().join("dat");
    asset_tree(&root);
    let out = dir.path().join("ri.dat");

    ripak().arg(&out).arg(&root).assert().success();

    let bytes = fs::read(&out).unwrap();
    let (count, index_offset, records) = parse(&bytes);
    let paths: Vec<&str> = records.iter().map(|r| r.path.as_str()).collect();
    assert_eq!(
        paths,
        vec![
            "bgm/title.ogg",
            "dlg/intro.ich",
            "sfx/empty.wav",
            "shaders/basic.vert",
            "tex/bg/sky.tex",
            "tex/logo.tex",
            "tex/ui/button.tex",
        ]
    );
    assert_eq!(count as usize, records.len());

    // Strictly increasing.
    assert!(records.windows(2).all(|w| w[0].path < w[1].path));

    // Contiguous payloads from the end of the header up to the index.
    assert_eq!(records[0].offset, 16);
    for w in records.windows(2) {
        assert_eq!(w[1].offset, w[0].offset + w[0].compressed);
    }
    let total: u64 = records.iter().map(|r| r.compressed).sum();
    assert_eq!(index_offset, 16 + total);

    // Every payload inflates back to the source file.
    for r in &records {
        let blob = &bytes[r.offset as usize..(r.offset + r.compressed) as usize];
        let mut raw = Vec::new();
        ZlibDecoder::new(blob).read_to_end(&mut raw).unwrap();
        assert_eq!(raw.len() as u64, r.raw);
        assert_eq!(adler32(&raw), r.checksum);
        assert_eq!(raw, fs::read(root.join(&r.path)).unwrap());
    }
}

#[test]
fn builds_are_byte_identical() {
    let dir = tempdir().unwrap();
    let root = dir.path().join("dat");
    asset_tree(&root);
    let a = dir.path().join("a.dat");
    let b = dir.path().join("b.dat");

    ripak().arg(&a).arg(&root).assert().success();
    ripak().arg(&b).arg(&root).assert().success();

    assert_eq!(fs::read(&a).unwrap(), fs::read(&b).unwrap());
}

#[test]
fn path_of_35_bytes_is_accepted() {
    let dir = tempdir().unwrap();
    let root = dir.path().join("dat");
    asset_tree(&root);
    // "tex/" + 31 bytes = 35
    let name = format!("{}.tex", "a".repeat(27));
    fs::write(root.join("tex").join(&name), b"max").unwrap();
    let out = dir.path().join("ri.dat");

    ripak().arg(&out).arg(&root).assert().success();

    let (_, _, records) = parse(&fs::read(&out).unwrap());
    let long = format!("tex/{name}");
    assert_eq!(long.len(), 35);
    assert!(records.iter().any(|r| r.path == long));
}

#[test]
fn path_of_36_bytes_aborts_without_output() {
    let dir = tempdir().unwrap();
    let root = dir.path().join("dat");
    asset_tree(&root);
    let name = format!("{}.tex", "a".repeat(28));
    fs::write(root.join("tex").join(&name), b"too long").unwrap();
    let out = dir.path().join("ri.dat");

    ripak()
        .arg(&out)
        .arg(&root)
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("filename too long"))
        .stderr(predicate::str::contains(name.as_str()));

    assert!(!out.exists());
}

#[test]
fn missing_category_aborts_before_output() {
    let dir = tempdir().unwrap();
    let root = dir.path().join("dat");
    asset_tree(&root);
    fs::remove_dir_all(root.join("danpl")).unwrap();
    let out = dir.path().join("ri.dat");

    ripak()
        .arg(&out)
        .arg(&root)
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("danpl"));

    assert!(!out.exists());
}

#[test]
fn wrong_argument_count_prints_usage() {
    let dir = tempdir().unwrap();

    ripak()
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
    ripak()
        .arg(dir.path().join("ri.dat"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
    ripak()
        .arg("a")
        .arg("b")
        .arg("c")
        .assert()
        .failure();
}

#[test]
fn category_and_extension_flags_override_defaults() {
    let dir = tempdir().unwrap();
    let root = dir.path().join("assets");
    fs::create_dir_all(root.join("models")).unwrap();
    fs::write(root.join("models/ship.obj"), b"v 0 0 0").unwrap();
    fs::write(root.join("models/ship.blend"), b"authoring").unwrap();
    let out = dir.path().join("models.dat");

    ripak()
        .arg(&out)
        .arg(&root)
        .args(["--category", "models", "--exclude-ext", "blend"])
        .assert()
        .success();

    let (_, _, records) = parse(&fs::read(&out).unwrap());
    let paths: Vec<&str> = records.iter().map(|r| r.path.as_str()).collect();
    assert_eq!(paths, vec!["models/ship.obj"]);
}

#[test]
fn verify_list_and_extract_round_trip() {
    let dir = tempdir().unwrap();
    let root = dir.path().join("dat");
    asset_tree(&root);
    let pak = dir.path().join("ri.dat");
    ripak().arg(&pak).arg(&root).assert().success();

    ripak()
        .args(["verify", "--pak"])
        .arg(&pak)
        .assert()
        .success()
        .stdout(predicate::str::contains("ok: 7 entries"));

    ripak()
        .args(["list", "--pak"])
        .arg(&pak)
        .assert()
        .success()
        .stdout(predicate::str::contains("tex/ui/button.tex"))
        .stdout(predicate::str::contains("intro.i\n").not());

    let out = dir.path().join("out");
    ripak()
        .args(["extract", "--pak"])
        .arg(&pak)
        .arg("--output")
        .arg(&out)
        .assert()
        .success();
    assert_eq!(
        fs::read(out.join("tex/bg/sky.tex")).unwrap(),
        fs::read(root.join("tex/bg/sky.tex")).unwrap()
    );
}

#[test]
fn verify_rejects_corrupt_archive() {
    let dir = tempdir().unwrap();
    let pak = dir.path().join("bad.dat");
    fs::write(&pak, b"RI_0\x01\0\0\0\x10\0\0\0\0\0\0\0").unwrap();

    ripak()
        .args(["verify", "--pak"])
        .arg(&pak)
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid archive"));
}

#[test]
fn double_dash_builds_to_a_path_named_like_a_subcommand() {
    let dir = tempdir().unwrap();
    let root = dir.path().join("dat");
    fs::create_dir_all(root.join("sfx")).unwrap();
    fs::write(root.join("sfx/hit.wav"), b"hit").unwrap();

    ripak()
        .current_dir(dir.path())
        .args(["--category", "sfx", "--", "list", "dat"])
        .assert()
        .success();

    let (_, _, records) = parse(&fs::read(dir.path().join("list")).unwrap());
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].path, "sfx/hit.wav");
}

#[test]
fn help_explains_double_dash() {
    ripak()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("ripak -- list dat"));
}
