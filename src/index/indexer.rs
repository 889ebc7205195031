use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

use log::{debug, warn};
use rayon::prelude::*;

use crate::index::matcher::ExclusionMatcher;

#[derive(Debug, Clone)]
pub struct IndexOptions {
    pub exclude_patterns: Vec<String>,
    pub include_hidden: bool,
    pub follow_symlinks: bool,
    pub sort_output: bool,
    pub workers: usize,
}

impl Default for IndexOptions {
    fn default() -> IndexOptions {
        IndexOptions {
            exclude_patterns: Vec::new(),
            include_hidden: true,
            follow_symlinks: false,
            sort_output: true,
            workers: std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1),
        }
    }
}

// 一次索引呼叫的彙總結果：檔案與空目錄路徑、成功取得的位元組總和、不存在的路徑
#[derive(Debug, Default)]
pub struct IndexResult {
    pub paths: Vec<PathBuf>,
    pub total_size: u64,
    pub missing: Vec<PathBuf>,
}

// 單一根路徑任務的部分結果，任務之間不共用可變狀態
#[derive(Default)]
struct TaskResult {
    entries: Vec<(PathBuf, u64)>,
    missing: Vec<PathBuf>,
}

pub struct ConcurrentIndexer {
    options: IndexOptions,
    matcher: ExclusionMatcher,
    pool: rayon::ThreadPool,
}

impl ConcurrentIndexer {
    pub fn new(options: IndexOptions) -> io::Result<ConcurrentIndexer> {
        if options.workers < 1 {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "工作執行緒數量必須大於 0",
            ));
        }
        let matcher = ExclusionMatcher::compile(&options.exclude_patterns)?;
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(options.workers)
            .build()
            .map_err(|e| {
                io::Error::new(io::ErrorKind::Other, format!("無法建立工作執行緒池：{}", e))
            })?;
        Ok(ConcurrentIndexer {
            options,
            matcher,
            pool,
        })
    }

    pub fn run(&self, roots: &[String]) -> io::Result<IndexResult> {
        let partials: Vec<TaskResult> = self.pool.install(|| {
            roots
                .par_iter()
                .map(|root| self.walk_root(Path::new(root)))
                .collect()
        });

        // 合併各任務的部分結果；重疊的根路徑只保留第一次出現的項目
        let mut seen: HashSet<PathBuf> = HashSet::new();
        let mut result = IndexResult::default();
        for partial in partials {
            for (path, size) in partial.entries {
                if seen.insert(path.clone()) {
                    result.total_size += size;
                    result.paths.push(path);
                }
            }
            result.missing.extend(partial.missing);
        }

        if self.options.sort_output {
            result
                .paths
                .sort_unstable_by(|a, b| a.as_os_str().cmp(b.as_os_str()));
        }
        Ok(result)
    }

    // 單一根路徑的走訪：明確堆疊的迭代式深度優先，堆疊為本任務私有
    fn walk_root(&self, root: &Path) -> TaskResult {
        let mut task = TaskResult::default();
        let mut stack = vec![normalize_path(root)];

        while let Some(path) = stack.pop() {
            if self.matcher.is_match(&path) {
                continue;
            }

            let meta = match self.stat(&path) {
                Ok(meta) => meta,
                Err(e) if e.kind() == io::ErrorKind::NotFound => {
                    task.missing.push(path);
                    continue;
                }
                Err(e) => {
                    warn!("無法讀取 {}：{}", path.display(), e);
                    task.missing.push(path);
                    continue;
                }
            };

            // 非目錄的根路徑（或競態下被換成檔案的路徑）直接視為單一檔案項目
            if !meta.is_dir() {
                task.entries.push((path, meta.len()));
                continue;
            }

            let entries = match fs::read_dir(&path) {
                Ok(entries) => entries,
                Err(e) if e.kind() == io::ErrorKind::NotFound => {
                    task.missing.push(path);
                    continue;
                }
                Err(e) => {
                    warn!("無法列出目錄 {}：{}", path.display(), e);
                    task.missing.push(path);
                    continue;
                }
            };

            let mut retained = 0usize;
            for entry in entries {
                let entry = match entry {
                    Ok(entry) => entry,
                    Err(e) => {
                        warn!("讀取 {} 的目錄項目失敗：{}", path.display(), e);
                        continue;
                    }
                };
                let child = entry.path();
                if !self.options.include_hidden && is_hidden(&child) {
                    continue;
                }
                if self.matcher.is_match(&child) {
                    continue;
                }

                match self.classify(&entry) {
                    Ok(true) => {
                        stack.push(child);
                        retained += 1;
                    }
                    Ok(false) => match self.stat(&child) {
                        // 路徑只在 stat 成功後才列入結果
                        Ok(meta) => {
                            task.entries.push((child, meta.len()));
                            retained += 1;
                        }
                        Err(_) => {
                            debug!("項目在列出後即消失，略過：{}", child.display());
                        }
                    },
                    Err(_) => {
                        debug!("項目在列出後即消失，略過：{}", child.display());
                    }
                }
            }

            // 排除或消失後不留任何子項目的目錄，以大小 0 保留
            if retained == 0 {
                task.entries.push((path, 0));
            }
        }

        task
    }

    fn stat(&self, path: &Path) -> io::Result<fs::Metadata> {
        if self.options.follow_symlinks {
            fs::metadata(path)
        } else {
            fs::symlink_metadata(path)
        }
    }

    // 判斷子項目是否為要走訪的目錄；預設不追蹤符號連結
    fn classify(&self, entry: &fs::DirEntry) -> io::Result<bool> {
        let file_type = entry.file_type()?;
        if file_type.is_symlink() && self.options.follow_symlinks {
            Ok(fs::metadata(entry.path())?.is_dir())
        } else {
            Ok(file_type.is_dir())
        }
    }
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .map(|name| name.to_string_lossy().starts_with('.'))
        .unwrap_or(false)
}

// 純字面正規化：折疊 `.`、`..` 與多餘分隔符，不接觸檔案系統
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::Prefix(_) | Component::RootDir => out.push(component.as_os_str()),
            Component::CurDir => {}
            Component::ParentDir => match out.components().next_back() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir) => {}
                _ => out.push(".."),
            },
            Component::Normal(name) => out.push(name),
        }
    }
    if out.as_os_str().is_empty() {
        PathBuf::from(".")
    } else {
        out
    }
}
