use codesnap::{CodesnapBuilder, CodesnapError, SkipReason, WarningKind, run, snapshot};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::tempdir;
fn root_name(path: &Path) -> String {
    path.canonicalize()
        .unwrap()
        .file_name()
        .unwrap()
        .to_string_lossy()
        .into_owned()
}
fn populate(root: &Path) {
    for dir in ["src/core", "src/util", "docs", "assets"] {
        fs::create_dir_all(root.join(dir)).unwrap();
    }
    for i in 0..30 {
        fs::write(
            root.join(format!("src/core/m{i:02}.rs")),
            format!("pub fn f{i}() -> u32 {{ {i} }}\r\n"),
        )
        .unwrap();
    }
    fs::write(root.join("src/util/mod.rs"), "pub mod core;\n").unwrap();
    fs::write(root.join("docs/README.md"), "# Docs\n```sh\nrun\n```\n").unwrap();
    fs::write(root.join("assets/logo.png"), [0x89, b'P', b'N', b'G', 0, 0, 1]).unwrap();
    fs::write(root.join("main.py"), "print('hi')").unwrap();
}
#[test]
fn integration_scenario_from_readme() {
    let dir = tempdir().unwrap();
    fs::create_dir(dir.path().join("src")).unwrap();
    fs::write(dir.path().join("src/a.py"), "x=1").unwrap();
    fs::write(dir.path().join("x.bin"), [0u8]).unwrap();
    let options = CodesnapBuilder::new(dir.path())
        .ignore_patterns(vec!["*.bin".into()])
        .build();
    let result = snapshot(&options).unwrap();
    let expected = format!(
        concat!(
            "# Compiled Codebase\n\n## Folder Structure\n\n",
            "```text\n{}/\n└── src/\n    └── a.py\n```\n\n",
            "## src/a.py\n\n```python\nx=1\n```\n\n",
        ),
        root_name(dir.path())
    );
    assert_eq!(result.document, expected);
    assert!(result.warnings.is_empty());
}
#[test]
fn integration_output_is_deterministic_across_threads() {
    let dir = tempdir().unwrap();
    populate(dir.path());
    let build = |threads| {
        let options = CodesnapBuilder::new(dir.path()).threads(threads).build();
        snapshot(&options).unwrap().document
    };
    let baseline = build(1);
    for _ in 0..5 {
        assert_eq!(build(8), baseline);
        assert_eq!(build(3), baseline);
    }
    let first = baseline.find("## src/core/m00.rs").unwrap();
    let last = baseline.find("## src/core/m29.rs").unwrap();
    let util = baseline.find("## src/util/mod.rs").unwrap();
    let main = baseline.find("## main.py").unwrap();
    assert!(first < last && last < util && util < main);
    assert!(!baseline.contains('\r'));
    assert!(baseline.contains("````markdown\n# Docs\n```sh\nrun\n```\n````"));
}
#[test]
fn integration_run_writes_and_skips_own_output() {
    let dir = tempdir().unwrap();
    populate(dir.path());
    let output = dir.path().join("codebase.md");
    let options = CodesnapBuilder::new(dir.path()).output(&output).build();
    let first = run(&options).unwrap();
    assert!(first.success);
    assert_eq!(first.files, 34);
    assert_eq!(first.counts.binary, 1);
    let written = fs::read_to_string(&output).unwrap();
    let second = run(&options).unwrap();
    assert_eq!(second.files, first.files);
    assert_eq!(fs::read_to_string(&output).unwrap(), written);
    assert!(!written.contains("## codebase.md"));
}
#[test]
fn integration_missing_root_writes_nothing() {
    let dir = tempdir().unwrap();
    let output = dir.path().join("out.md");
    let options = CodesnapBuilder::new(dir.path().join("missing"))
        .output(&output)
        .build();
    assert!(matches!(
        run(&options),
        Err(CodesnapError::RootNotFound { .. })
    ));
    assert!(!output.exists());
}
#[cfg(unix)]
#[test]
fn integration_unreadable_file_does_not_block_siblings() {
    use std::os::unix::fs::symlink;
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("ok.txt"), "fine").unwrap();
    symlink(dir.path().join("nowhere"), dir.path().join("broken.txt")).unwrap();
    let result = snapshot(&CodesnapBuilder::new(dir.path()).build()).unwrap();
    assert_eq!(result.manifest.len(), 2);
    assert!(result.document.contains("## broken.txt\n\n[Unreadable file: "));
    assert!(result.document.contains("```text\nfine\n```"));
    let unreadable: Vec<_> = result
        .warnings
        .iter()
        .filter(|w| w.kind == WarningKind::Unreadable)
        .collect();
    assert_eq!(unreadable.len(), 1);
    assert_eq!(unreadable[0].path, Path::new("broken.txt"));
}
#[cfg(unix)]
#[test]
fn integration_permission_denied_is_annotated() {
    use std::os::unix::fs::PermissionsExt;
    let dir = tempdir().unwrap();
    let locked = dir.path().join("locked.txt");
    fs::write(&locked, "secret").unwrap();
    fs::write(dir.path().join("open.txt"), "open").unwrap();
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();
    if fs::read(&locked).is_ok() {
        // Running with privileges that ignore file modes.
        return;
    }
    let result = snapshot(&CodesnapBuilder::new(dir.path()).build()).unwrap();
    assert!(result.document.contains("## locked.txt\n\n[Unreadable file: "));
    assert!(result.document.contains("```text\nopen\n```"));
    assert_eq!(result.counts.unreadable, 1);
}
#[cfg(unix)]
#[test]
fn integration_symlink_cycle_terminates() {
    use std::os::unix::fs::symlink;
    let dir = tempdir().unwrap();
    fs::create_dir_all(dir.path().join("a")).unwrap();
    fs::write(dir.path().join("a/f.txt"), "f").unwrap();
    symlink(dir.path(), dir.path().join("a/back")).unwrap();
    let options = CodesnapBuilder::new(dir.path()).follow_links(true).build();
    let result = snapshot(&options).unwrap();
    assert!(result.manifest.contains_relative("a/f.txt"));
    assert!(result
        .warnings
        .iter()
        .any(|w| w.kind == WarningKind::SymlinkCycle));
    assert!(result.document.contains("    ├── back/ [skipped: symlink cycle]\n"));
    assert!(result.document.contains("## Skipped Paths\n\n- `a/back/` (symlink cycle): "));
    assert_eq!(result.skipped.len(), 1);
}
#[cfg(unix)]
#[test]
fn integration_real_directory_survives_alias() {
    use std::os::unix::fs::symlink;
    let dir = tempdir().unwrap();
    fs::create_dir(dir.path().join("real")).unwrap();
    fs::write(dir.path().join("real/r.txt"), "r").unwrap();
    symlink(dir.path().join("real"), dir.path().join("alias")).unwrap();
    let options = CodesnapBuilder::new(dir.path()).follow_links(true).build();
    let result = snapshot(&options).unwrap();
    let names: Vec<_> = result.manifest.iter().map(|e| e.display_path()).collect();
    assert_eq!(names, ["real/r.txt"]);
    assert!(result.document.contains("```text\nr\n```"));
    assert!(!result
        .warnings
        .iter()
        .any(|w| w.kind == WarningKind::SymlinkCycle));
    assert_eq!(result.skipped[0].reason, SkipReason::DuplicateLink);
    assert!(result.document.contains("alias/ [skipped: duplicate link]"));
}
#[cfg(unix)]
#[test]
fn integration_unreadable_directory_is_annotated() {
    use std::os::unix::fs::PermissionsExt;
    let dir = tempdir().unwrap();
    let locked = dir.path().join("locked");
    fs::create_dir(&locked).unwrap();
    fs::write(locked.join("hidden.txt"), "h").unwrap();
    fs::write(dir.path().join("open.txt"), "open").unwrap();
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();
    if fs::read_dir(&locked).is_ok() {
        // Running with privileges that ignore directory modes.
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
        return;
    }
    let result = snapshot(&CodesnapBuilder::new(dir.path()).build());
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
    let result = result.unwrap();
    assert!(result
        .warnings
        .iter()
        .any(|w| w.kind == WarningKind::Traversal && w.path == PathBuf::from("locked")));
    assert!(result.document.contains("```text\nopen\n```"));
    assert!(result.document.contains("├── locked/ [skipped: unreadable]\n"));
    assert!(result.document.contains("- `locked/` (unreadable): "));
    assert!(!result.document.contains("hidden.txt"));
}
#[test]
fn integration_exclude_files_by_path_and_name() {
    let dir = tempdir().unwrap();
    fs::create_dir(dir.path().join("sub")).unwrap();
    fs::write(dir.path().join("secrets.env"), "k").unwrap();
    fs::write(dir.path().join("sub/secrets.env"), "k").unwrap();
    fs::write(dir.path().join("NOTES.md"), "n").unwrap();
    fs::write(dir.path().join("sub/NOTES.md"), "n").unwrap();
    fs::write(dir.path().join("main.rs"), "m").unwrap();
    let options = CodesnapBuilder::new(dir.path())
        .exclude_files(vec![
            dir.path().join("NOTES.md"),
            PathBuf::from("does/not/exist/secrets.env"),
        ])
        .build();
    let result = snapshot(&options).unwrap();
    let names: Vec<_> = result.manifest.iter().map(|e| e.display_path()).collect();
    assert_eq!(names, ["sub/NOTES.md", "main.rs"]);
}
