use std::io::{self, Write};
use std::path::Path;
use std::process::{Command, Stdio};

use log::{info, warn};
use tempfile::NamedTempFile;

use crate::action::interactive::confirm_continue;
use crate::config::ports::AppConfig;
use crate::index::indexer::{ConcurrentIndexer, IndexOptions};
use crate::models::metadata::Metadata;
use crate::ops::pipeline::{copy_with_progress, spawn_compress_encrypt, wait_pipeline};
use crate::utils::utils::{read_manifest, to_engineering_notation, ProgressManager};

pub fn execute(config: &AppConfig) -> io::Result<String> {
    let manifest_path = require(&config.manifest_path, "--manifest-path")?;
    let destination_path = require(&config.destination_path, "--destination-path")?;
    let metadata_path = require(&config.metadata_path, "--metadata-path")?;

    println!("正在計算備份檔案總大小...");
    let roots = read_manifest(Path::new(manifest_path))?;
    if roots.is_empty() {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("清單檔案 '{}' 沒有任何根路徑", manifest_path),
        ));
    }
    let patterns = match &config.exclude_manifest_path {
        Some(path) => read_manifest(Path::new(path))?,
        None => Vec::new(),
    };

    let options = IndexOptions {
        exclude_patterns: patterns.clone(),
        workers: config.threads,
        ..IndexOptions::default()
    };
    let indexer = ConcurrentIndexer::new(options)?;
    let index = indexer.run(&roots)?;
    info!(
        "索引完成：{} 個項目，{} 個排除模式",
        index.paths.len(),
        patterns.len()
    );

    if !index.missing.is_empty() {
        warn!("共 {} 個路徑不存在，將不會納入備份", index.missing.len());
        for path in &index.missing {
            warn!("找不到路徑：{}", path.display());
        }
    }

    println!(
        "備份檔案總大小：{} 位元組（{} 個項目）",
        to_engineering_notation(index.total_size as f64, 3),
        index.paths.len()
    );
    if !confirm_continue()? {
        return Err(io::Error::new(io::ErrorKind::Interrupted, "備份已中止"));
    }

    println!("開始備份，使用 {} 個執行緒...", config.threads);

    // 索引結果逐行寫入暫存檔，交由 tar 讀取
    let mut list_file = NamedTempFile::new()?;
    for path in &index.paths {
        writeln!(list_file, "{}", path.display())?;
    }
    list_file.flush()?;

    let mut tar = tar_create_command(list_file.path())
        .stdout(Stdio::piped())
        .spawn()
        .map_err(|e| io::Error::new(e.kind(), format!("無法啟動 tar：{}", e)))?;
    let mut tar_stdout = tar.stdout.take().expect("tar stdout");

    let (mut sink, children) =
        spawn_compress_encrypt(config.threads, &config.encryption_password, destination_path)?;

    let progress = ProgressManager::new(index.total_size, config.no_progress);
    progress.set_message("備份中");
    copy_with_progress(&mut tar_stdout, &mut sink, &progress)?;
    drop(sink);
    progress.finish_with_message("備份資料串流完成");

    let tar_status = tar.wait()?;
    if !tar_status.success() {
        return Err(io::Error::new(
            io::ErrorKind::Other,
            format!("指令 'tar' 執行失敗，結束狀態：{}", tar_status),
        ));
    }
    wait_pipeline(children)?;
    println!("備份完成");

    println!("正在儲存中繼資料...");
    let metadata = Metadata {
        input_manifest_files: roots,
        exclude_manifest_patterns: patterns,
        total_size: index.total_size,
    };
    write_encrypted_metadata(&metadata, config.threads, &config.encryption_password, metadata_path)?;
    info!("中繼資料已儲存至：{}", metadata_path);

    Ok(destination_path.to_string())
}

// 清單已展開所有子路徑並套用排除規則，tar 不得再自行遞迴
fn tar_create_command(list_path: &Path) -> Command {
    let mut command = Command::new("tar");
    command
        .arg("--create")
        .arg("--acls")
        .arg("--selinux")
        .arg("--xattrs")
        .arg("--absolute-names")
        .arg("--no-recursion")
        .arg(format!("--files-from={}", list_path.display()));
    command
}

fn write_encrypted_metadata(
    metadata: &Metadata,
    threads: usize,
    password: &str,
    metadata_path: &str,
) -> io::Result<()> {
    let json = serde_json::to_string(metadata).map_err(|e| {
        io::Error::new(io::ErrorKind::InvalidData, format!("中繼資料序列化失敗：{}", e))
    })?;
    let (mut sink, children) = spawn_compress_encrypt(threads, password, metadata_path)?;
    sink.write_all(json.as_bytes())?;
    drop(sink);
    wait_pipeline(children)
}

pub(crate) fn require<'a>(value: &'a Option<String>, name: &str) -> io::Result<&'a str> {
    value.as_deref().ok_or_else(|| {
        io::Error::new(io::ErrorKind::InvalidInput, format!("缺少必要參數：{}", name))
    })
}
