use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

use tempfile::TempDir;

use file_migrator::index::indexer::{ConcurrentIndexer, IndexOptions};

fn write_file(path: &Path, size: usize) {
    let mut file = File::create(path).unwrap();
    file.write_all(&vec![b'x'; size]).unwrap();
}

fn options_with(patterns: &[&str], workers: usize) -> IndexOptions {
    IndexOptions {
        exclude_patterns: patterns.iter().map(|p| p.to_string()).collect(),
        workers,
        ..IndexOptions::default()
    }
}

fn run(options: IndexOptions, roots: &[&Path]) -> file_migrator::index::indexer::IndexResult {
    let roots: Vec<String> = roots.iter().map(|r| r.display().to_string()).collect();
    ConcurrentIndexer::new(options).unwrap().run(&roots).unwrap()
}

#[test]
fn indexes_files_and_reports_missing_roots() {
    let temp = TempDir::new().unwrap();
    let root = temp.path().join("a");
    fs::create_dir(&root).unwrap();
    write_file(&root.join("x"), 10);
    write_file(&root.join("y"), 20);
    write_file(&root.join(".z"), 5);
    let missing_root = temp.path().join("missing");

    let result = run(options_with(&["**/y"], 2), &[&root, &missing_root]);

    assert_eq!(result.paths, vec![root.join(".z"), root.join("x")]);
    assert_eq!(result.total_size, 15);
    assert_eq!(result.missing, vec![missing_root]);
}

#[test]
fn excluded_directory_prunes_entire_subtree() {
    let temp = TempDir::new().unwrap();
    let root = temp.path().join("project");
    fs::create_dir_all(root.join("cache/sub")).unwrap();
    write_file(&root.join("keep.txt"), 3);
    write_file(&root.join("cache/blob.bin"), 100);
    write_file(&root.join("cache/sub/deep.bin"), 7);

    let result = run(options_with(&["**/cache"], 1), &[&root]);

    assert_eq!(result.paths, vec![root.join("keep.txt")]);
    assert_eq!(result.total_size, 3);
    assert!(result.missing.is_empty());
}

#[test]
fn empty_directory_is_kept_with_zero_size() {
    let temp = TempDir::new().unwrap();
    let root = temp.path().join("tree");
    fs::create_dir_all(root.join("empty")).unwrap();
    fs::create_dir_all(root.join("full")).unwrap();
    write_file(&root.join("full/f"), 4);

    let result = run(options_with(&[], 1), &[&root]);

    assert_eq!(result.paths, vec![root.join("empty"), root.join("full/f")]);
    assert_eq!(result.total_size, 4);
}

#[test]
fn directory_with_all_children_excluded_is_kept() {
    let temp = TempDir::new().unwrap();
    let root = temp.path().join("tree");
    fs::create_dir_all(root.join("logs")).unwrap();
    write_file(&root.join("logs/a.log"), 11);
    write_file(&root.join("logs/b.log"), 13);

    let result = run(options_with(&["**/*.log"], 1), &[&root]);

    assert_eq!(result.paths, vec![root.join("logs")]);
    assert_eq!(result.total_size, 0);
}

#[test]
fn file_root_is_emitted_directly() {
    let temp = TempDir::new().unwrap();
    let file_root = temp.path().join("single.txt");
    write_file(&file_root, 11);

    let result = run(options_with(&[], 1), &[&file_root]);

    assert_eq!(result.paths, vec![file_root]);
    assert_eq!(result.total_size, 11);
    assert!(result.missing.is_empty());
}

#[test]
fn excluded_root_produces_no_output() {
    let temp = TempDir::new().unwrap();
    let root = temp.path().join("secrets");
    fs::create_dir(&root).unwrap();
    write_file(&root.join("key"), 42);

    let result = run(options_with(&["**/secrets"], 1), &[&root]);

    assert!(result.paths.is_empty());
    assert_eq!(result.total_size, 0);
    assert!(result.missing.is_empty());
}

#[test]
fn sorted_output_is_identical_across_worker_counts() {
    let temp = TempDir::new().unwrap();
    let mut roots = Vec::new();
    for name in ["alpha", "beta", "gamma", "delta"] {
        let root = temp.path().join(name);
        fs::create_dir_all(root.join("nested")).unwrap();
        for file in ["one", "two", "three"] {
            write_file(&root.join(file), 8);
            write_file(&root.join("nested").join(file), 8);
        }
        roots.push(root);
    }
    let root_refs: Vec<&Path> = roots.iter().map(|r| r.as_path()).collect();

    let sequential = run(options_with(&[], 1), &root_refs);
    let parallel = run(options_with(&[], 4), &root_refs);
    let parallel_again = run(options_with(&[], 4), &root_refs);

    assert_eq!(sequential.paths, parallel.paths);
    assert_eq!(parallel.paths, parallel_again.paths);
    assert_eq!(sequential.total_size, parallel.total_size);

    let mut sorted = sequential.paths.clone();
    sorted.sort_unstable_by(|a, b| a.as_os_str().cmp(b.as_os_str()));
    assert_eq!(sequential.paths, sorted);
}

#[test]
fn overlapping_roots_are_deduplicated() {
    let temp = TempDir::new().unwrap();
    let root = temp.path().join("outer");
    let sub = root.join("sub");
    fs::create_dir_all(&sub).unwrap();
    write_file(&root.join("g"), 2);
    write_file(&sub.join("f"), 5);

    let result = run(options_with(&[], 2), &[&root, &sub]);

    assert_eq!(result.paths, vec![root.join("g"), sub.join("f")]);
    assert_eq!(result.total_size, 7);
}

#[test]
fn hidden_entries_skipped_when_disabled() {
    let temp = TempDir::new().unwrap();
    let root = temp.path().join("home");
    fs::create_dir_all(root.join("dotonly")).unwrap();
    write_file(&root.join("visible"), 6);
    write_file(&root.join(".profile"), 9);
    write_file(&root.join("dotonly/.cache"), 3);

    let options = IndexOptions {
        include_hidden: false,
        workers: 1,
        ..IndexOptions::default()
    };
    let result = run(options, &[&root]);

    // 只剩隱藏項目的目錄視同空目錄保留
    assert_eq!(result.paths, vec![root.join("dotonly"), root.join("visible")]);
    assert_eq!(result.total_size, 6);
}

#[test]
fn roots_are_normalized_before_matching_and_output() {
    let temp = TempDir::new().unwrap();
    let root = temp.path().join("n");
    fs::create_dir(&root).unwrap();
    write_file(&root.join("f"), 1);

    let messy = temp.path().join(".").join("n").join("..").join("n");
    let result = run(options_with(&[], 1), &[&messy]);

    assert_eq!(result.paths, vec![root.join("f")]);
}

#[cfg(unix)]
#[test]
fn symlinked_directory_is_not_traversed() {
    let temp = TempDir::new().unwrap();
    let target = temp.path().join("target");
    fs::create_dir(&target).unwrap();
    write_file(&target.join("inside"), 9);

    let root = temp.path().join("root");
    fs::create_dir(&root).unwrap();
    std::os::unix::fs::symlink(&target, root.join("link")).unwrap();

    let result = run(options_with(&[], 1), &[&root]);

    // 連結本身是單一項目，其目標內容不展開
    assert_eq!(result.paths, vec![root.join("link")]);
    assert!(!result
        .paths
        .iter()
        .any(|p| p.starts_with(root.join("link").join("inside"))));
}
