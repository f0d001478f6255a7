use std::path::Path;
use std::process::Command;

/// Run the binary with config and cache isolated under `home`.
fn lightgrid(home: &Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_lightgrid"));
    cmd.env("HOME", home)
        .env("XDG_CONFIG_HOME", home.join("config"))
        .env("XDG_CACHE_HOME", home.join("cache"))
        .env_remove("RUST_LOG");
    cmd
}

fn write_pngs(dir: &Path, names: &[&str]) {
    std::fs::create_dir_all(dir).unwrap();
    for name in names {
        let img = image::RgbImage::from_fn(10, 10, |_, _| image::Rgb([200, 120, 40]));
        img.save(dir.join(name)).unwrap();
    }
}

const MANIFEST: &str = r#"
title = "Trip"

[[image]]
src = "desert.png"
alt = "Desert dunes"
tags = "sand, sun"

[[image]]
src = "ocean.png"
alt = "Ocean"
tags = "water,blue"

[[image]]
src = "night.png"
tags = "sand,stars"
"#;

#[test]
fn test_help_exits_zero() {
    let home = tempfile::tempdir().unwrap();
    let output = lightgrid(home.path())
        .arg("--help")
        .output()
        .expect("failed to run");
    assert!(output.status.success(), "lightgrid --help should exit 0");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(
        stdout.contains("Terminal photo gallery"),
        "help should contain description"
    );
    assert!(stdout.contains("manifest"), "help should list subcommands");
}

#[test]
fn test_version_exits_zero() {
    let home = tempfile::tempdir().unwrap();
    let output = lightgrid(home.path())
        .arg("--version")
        .output()
        .expect("failed to run");
    assert!(output.status.success(), "lightgrid --version should exit 0");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(
        stdout.contains("lightgrid"),
        "version output should contain crate name"
    );
}

#[test]
fn test_list_directory_prints_every_image() {
    let home = tempfile::tempdir().unwrap();
    let photos = home.path().join("photos");
    write_pngs(&photos, &["a.png", "b.png", "c.png"]);

    let output = lightgrid(home.path())
        .args(["list", photos.to_str().unwrap()])
        .output()
        .expect("failed to run");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    for caption in ["a", "b", "c"] {
        assert!(stdout.contains(&format!("{}.png", caption)));
    }
}

#[test]
fn test_list_json_applies_query() {
    let home = tempfile::tempdir().unwrap();
    let photos = home.path().join("photos");
    write_pngs(&photos, &["desert.png", "ocean.png", "night.png"]);
    std::fs::write(photos.join("gallery.toml"), MANIFEST).unwrap();

    let output = lightgrid(home.path())
        .args([
            "list",
            photos.to_str().unwrap(),
            "--query",
            "SAND",
            "--json",
        ])
        .output()
        .expect("failed to run");

    assert!(
        output.status.success(),
        "{}",
        String::from_utf8_lossy(&output.stderr)
    );
    let listed: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let listed = listed.as_array().unwrap();
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0]["index"], 0);
    assert_eq!(listed[0]["caption"], "Desert dunes");
    assert_eq!(listed[0]["tags"], serde_json::json!(["sand", "sun"]));
    assert_eq!(listed[1]["index"], 2);
    assert_eq!(listed[1]["caption"], "");
}

#[test]
fn test_manifest_writes_skeleton_and_refuses_overwrite() {
    let home = tempfile::tempdir().unwrap();
    let photos = home.path().join("photos");
    write_pngs(&photos, &["one.png", "two.png"]);

    let output = lightgrid(home.path())
        .args(["manifest", photos.to_str().unwrap()])
        .output()
        .expect("failed to run");
    assert!(output.status.success());

    let written = std::fs::read_to_string(photos.join("gallery.toml")).unwrap();
    assert!(written.contains("one.png"));
    assert!(written.contains("two.png"));

    let again = lightgrid(home.path())
        .args(["manifest", photos.to_str().unwrap()])
        .output()
        .expect("failed to run");
    assert!(!again.status.success(), "should refuse to overwrite");
    assert!(String::from_utf8_lossy(&again.stderr).contains("--force"));

    let forced = lightgrid(home.path())
        .args(["manifest", photos.to_str().unwrap(), "--force"])
        .output()
        .expect("failed to run");
    assert!(forced.status.success());
}

#[test]
fn test_list_with_nonexistent_page() {
    let home = tempfile::tempdir().unwrap();
    let output = lightgrid(home.path())
        .args(["list", home.path().join("missing").to_str().unwrap()])
        .output()
        .expect("failed to run");

    // Should fail gracefully, not panic
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        !stderr.contains("panicked"),
        "should not panic on nonexistent page"
    );
}
