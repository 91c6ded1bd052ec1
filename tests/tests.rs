use std::fs;
use std::path::{Path, PathBuf};
use semver::Version;
use tempfile::TempDir;
use toolpin::editor::ToolManifestEditor;
use toolpin::error::ManifestError;
use toolpin::resolve::{PackageId, ToolCommandName};
use toolpin::scanner::DangerousFileDetector;

const BASIC_MANIFEST: &str = concat!(
    r#"{"version":1,"isRoot":true,"tools":"#,
    r#"{"t1":{"version":"1.0.0","commands":["t1"],"rollForward":false}}}"#
);

const THREE_TOOLS_MANIFEST: &str = concat!(
    r#"{"version":1,"isRoot":true,"tools":{"#,
    r#""a":{"version":"1.0.0","commands":["a"],"rollForward":false},"#,
    r#""x":{"version":"1.0.0","commands":["x"],"rollForward":true},"#,
    r#""b":{"version":"1.0.0","commands":["b"],"rollForward":false}}}"#
);

fn setup_manifest(content: &str) -> (TempDir, PathBuf) {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("toolpin.json");
    fs::write(&path, content).unwrap();
    (dir, path)
}

fn commands(names: &[&str]) -> Vec<ToolCommandName> {
    names.iter().map(|n| ToolCommandName::new(n)).collect()
}

fn read_ids(path: &Path) -> Vec<String> {
    let editor = ToolManifestEditor::new();
    let (packages, _) = editor.read(path, path.parent().unwrap()).unwrap();
    packages.iter().map(|p| p.package_id.to_string()).collect()
}

struct AlwaysDangerous;

impl DangerousFileDetector for AlwaysDangerous {
    fn is_dangerous(&self, _path: &Path) -> bool {
        true
    }
}

#[test]
fn add_appends_new_entry_at_the_end() {
    let (_dir, path) = setup_manifest(BASIC_MANIFEST);
    let editor = ToolManifestEditor::new();
    editor
        .add(
            &path,
            &PackageId::new("t2"),
            &Version::new(2, 0, 0),
            &commands(&["t2"]),
            false,
        )
        .unwrap();

    assert_eq!(read_ids(&path), vec!["t1", "t2"]);
}

#[test]
fn re_add_with_same_identity_updates_only_roll_forward() {
    let (_dir, path) = setup_manifest(BASIC_MANIFEST);
    let editor = ToolManifestEditor::new();
    editor
        .add(
            &path,
            &PackageId::new("t1"),
            &Version::new(1, 0, 0),
            &commands(&["t1"]),
            true,
        )
        .unwrap();

    let (packages, _) = editor.read(&path, path.parent().unwrap()).unwrap();
    assert_eq!(packages.len(), 1);
    assert!(packages[0].roll_forward);
    assert_eq!(packages[0].version, Version::new(1, 0, 0));
    assert_eq!(packages[0].command_names, commands(&["t1"]));
}

#[test]
fn re_add_matches_command_sets_regardless_of_order() {
    let manifest = concat!(
        r#"{"version":1,"isRoot":true,"tools":"#,
        r#"{"multi":{"version":"1.0.0","commands":["one","two"],"rollForward":false}}}"#
    );
    let (_dir, path) = setup_manifest(manifest);
    let editor = ToolManifestEditor::new();
    editor
        .add(
            &path,
            &PackageId::new("multi"),
            &Version::new(1, 0, 0),
            &commands(&["two", "one"]),
            true,
        )
        .unwrap();

    let (packages, _) = editor.read(&path, path.parent().unwrap()).unwrap();
    assert_eq!(packages.len(), 1);
    assert!(packages[0].roll_forward);
    // the stored command order is untouched by the roll-forward update
    assert_eq!(packages[0].command_names, commands(&["one", "two"]));
}

#[test]
fn version_collision_is_rejected_without_writing() {
    let (_dir, path) = setup_manifest(BASIC_MANIFEST);
    let editor = ToolManifestEditor::new();
    let before = fs::read(&path).unwrap();

    let err = editor
        .add(
            &path,
            &PackageId::new("t1"),
            &Version::new(2, 0, 0),
            &commands(&["t1"]),
            false,
        )
        .unwrap_err();

    assert!(matches!(err, ManifestError::PackageIdCollision { .. }));
    assert!(err.to_string().contains("1.0.0"));
    assert!(err.to_string().contains("2.0.0"));
    assert_eq!(fs::read(&path).unwrap(), before);
}

#[test]
fn command_set_collision_is_rejected_without_writing() {
    let (_dir, path) = setup_manifest(BASIC_MANIFEST);
    let editor = ToolManifestEditor::new();
    let before = fs::read(&path).unwrap();

    let err = editor
        .add(
            &path,
            &PackageId::new("t1"),
            &Version::new(1, 0, 0),
            &commands(&["other"]),
            false,
        )
        .unwrap_err();

    assert!(matches!(err, ManifestError::PackageIdCollision { .. }));
    assert_eq!(fs::read(&path).unwrap(), before);
}

#[test]
fn edit_overwrites_in_place_and_keeps_roll_forward() {
    let (_dir, path) = setup_manifest(THREE_TOOLS_MANIFEST);
    let editor = ToolManifestEditor::new();
    editor
        .edit(
            &path,
            &PackageId::new("x"),
            &Version::new(2, 0, 0),
            &commands(&["x", "x-alias"]),
        )
        .unwrap();

    assert_eq!(read_ids(&path), vec!["a", "x", "b"]);
    let (packages, _) = editor.read(&path, path.parent().unwrap()).unwrap();
    let x = &packages[1];
    assert_eq!(x.version, Version::new(2, 0, 0));
    assert_eq!(x.command_names, commands(&["x", "x-alias"]));
    assert!(x.roll_forward);
}

#[test]
fn edit_of_missing_package_fails() {
    let (_dir, path) = setup_manifest(BASIC_MANIFEST);
    let editor = ToolManifestEditor::new();
    let err = editor
        .edit(
            &path,
            &PackageId::new("ghost"),
            &Version::new(1, 0, 0),
            &commands(&["ghost"]),
        )
        .unwrap_err();
    assert!(matches!(err, ManifestError::PackageNotFound { .. }));
}

#[test]
fn remove_preserves_order_of_the_rest() {
    let (_dir, path) = setup_manifest(THREE_TOOLS_MANIFEST);
    let editor = ToolManifestEditor::new();
    editor.remove(&path, &PackageId::new("x")).unwrap();
    assert_eq!(read_ids(&path), vec!["a", "b"]);
}

#[test]
fn remove_of_missing_package_fails_without_writing() {
    let (_dir, path) = setup_manifest(BASIC_MANIFEST);
    let editor = ToolManifestEditor::new();
    let before = fs::read(&path).unwrap();
    let err = editor.remove(&path, &PackageId::new("ghost")).unwrap_err();
    assert!(matches!(err, ManifestError::PackageNotFound { .. }));
    assert_eq!(fs::read(&path).unwrap(), before);
}

#[test]
fn read_returns_resolved_entries_and_is_root() {
    let (dir, path) = setup_manifest(BASIC_MANIFEST);
    let editor = ToolManifestEditor::new();
    let (packages, is_root) = editor.read(&path, dir.path()).unwrap();
    assert!(is_root);
    assert_eq!(packages.len(), 1);
    assert_eq!(packages[0].directory, dir.path());
}

#[test]
fn read_refuses_tainted_file_before_parsing() {
    // deliberately not JSON: the taint check must fire before the parser
    let (_dir, path) = setup_manifest("not json at all");
    let editor = ToolManifestEditor::with_detector(Box::new(AlwaysDangerous));
    let err = editor.read(&path, path.parent().unwrap()).unwrap_err();
    assert!(matches!(err, ManifestError::Untrusted { .. }));
}

#[test]
fn mutation_refuses_invalid_document_entirely() {
    let manifest = concat!(
        r#"{"version":1,"isRoot":true,"tools":{"#,
        r#""good":{"version":"1.0.0","commands":["good"],"rollForward":false},"#,
        r#""broken":{"version":"1.0.0","rollForward":false}}}"#
    );
    let (_dir, path) = setup_manifest(manifest);
    let editor = ToolManifestEditor::new();
    let before = fs::read(&path).unwrap();

    let err = editor
        .add(
            &path,
            &PackageId::new("t9"),
            &Version::new(1, 0, 0),
            &commands(&["t9"]),
            false,
        )
        .unwrap_err();

    assert!(matches!(err, ManifestError::Invalid { .. }));
    assert_eq!(fs::read(&path).unwrap(), before);
}

#[test]
fn validation_failure_enumerates_every_problem() {
    // two duplicate ids plus one entry without commands: three problems
    let manifest = concat!(
        r#"{"version":1,"isRoot":true,"tools":{"#,
        r#""dup ":{"version":"1.0.0","commands":["d"],"rollForward":false},"#,
        r#""Dup":{"version":"1.0.0","commands":["d"],"rollForward":false},"#,
        r#""bare":{"version":"1.0.0","rollForward":false}}}"#
    );
    let (_dir, path) = setup_manifest(manifest);
    let editor = ToolManifestEditor::new();
    let err = editor.read(&path, path.parent().unwrap()).unwrap_err();
    let message = err.to_string();
    assert!(message.contains("more than once: dup"));
    assert!(message.contains("in package 'bare'"));
    assert!(message.contains("'commands' field is missing or empty"));
}

#[test]
fn missing_file_is_an_io_error() {
    let dir = TempDir::new().unwrap();
    let editor = ToolManifestEditor::new();
    let err = editor
        .read(&dir.path().join("toolpin.json"), dir.path())
        .unwrap_err();
    assert!(matches!(err, ManifestError::Io { .. }));
}
