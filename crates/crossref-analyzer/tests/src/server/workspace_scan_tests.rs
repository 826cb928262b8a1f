use std::fs;

use super::*;

fn write(
    root: &Path,
    relative: &str,
    contents: &str,
) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("crossref-analyzer-scan-{name}-{}", std::process::id()));
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).unwrap();
    dir
}

#[test]
fn finds_documents_and_skips_hidden_and_build_directories() {
    let root = scratch_dir("filters");
    write(&root, "b.xref", "declares Foo;");
    write(&root, "nested/a.XREF", "uses b.Foo;");
    write(&root, "notes.txt", "declares Ignored;");
    write(&root, ".git/hidden.xref", "declares Hidden;");
    write(&root, "target/generated.xref", "declares Generated;");

    let files = discover_files(std::slice::from_ref(&root), &IndexingSettings::default());
    assert_eq!(files, vec![root.join("b.xref"), root.join("nested/a.XREF")]);

    fs::remove_dir_all(&root).unwrap();
}

#[test]
fn honours_exclude_paths_and_size_limit() {
    let root = scratch_dir("excludes");
    write(&root, "keep.xref", "declares Keep;");
    write(&root, "vendor/skip.xref", "declares Skip;");
    write(&root, "big.xref", &"declares Big;\n".repeat(200));

    let settings = IndexingSettings {
        exclude_paths: vec!["vendor".to_string()],
        max_file_size_kb: 1,
        ..IndexingSettings::default()
    };
    let files = discover_files(std::slice::from_ref(&root), &settings);
    assert_eq!(files, vec![root.join("keep.xref")]);

    fs::remove_dir_all(&root).unwrap();
}

#[test]
fn relative_excludes_apply_to_every_root() {
    let roots = vec![PathBuf::from("/w/one"), PathBuf::from("/w/two")];
    let prefixes = exclude_prefixes(&roots, &["gen".to_string(), "/abs".to_string()]);
    assert_eq!(
        prefixes,
        vec![PathBuf::from("/w/one/gen"), PathBuf::from("/w/two/gen"), PathBuf::from("/abs")]
    );
}
