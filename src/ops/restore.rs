use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use std::process::{Command, Stdio};

use log::info;

use crate::action::interactive::confirm_continue;
use crate::config::consts::{ANALYSIS_FILE, MIGRATION_SUFFIX};
use crate::config::ports::AppConfig;
use crate::index::indexer::{ConcurrentIndexer, IndexOptions};
use crate::models::analysis::Analysis;
use crate::models::metadata::Metadata;
use crate::ops::backup::require;
use crate::ops::pipeline::{copy_with_progress, spawn_decrypt_decompress, wait_pipeline};
use crate::utils::utils::{to_engineering_notation, ProgressManager};

pub fn execute(config: &AppConfig) -> io::Result<String> {
    let source_backup_path = require(&config.source_backup_path, "--source-backup-path")?;
    let metadata_path = require(&config.metadata_path, "--metadata-path")?;

    println!("正在讀取中繼資料...");
    let metadata = read_encrypted_metadata(config.threads, &config.encryption_password, metadata_path)?;
    println!(
        "備份大小：{} 位元組",
        to_engineering_notation(metadata.total_size as f64, 3)
    );
    if !confirm_continue()? {
        return Err(io::Error::new(io::ErrorKind::Interrupted, "還原已中止"));
    }

    println!("開始還原，使用 {} 個執行緒...", config.threads);
    let (mut stream, children) =
        spawn_decrypt_decompress(config.threads, &config.encryption_password, source_backup_path)?;
    let mut tar = tar_extract_command()
        .stdin(Stdio::piped())
        .spawn()
        .map_err(|e| io::Error::new(e.kind(), format!("無法啟動 tar：{}", e)))?;
    let mut tar_stdin = tar.stdin.take().expect("tar stdin");

    let progress = ProgressManager::new(metadata.total_size, config.no_progress);
    progress.set_message("還原中");
    copy_with_progress(&mut stream, &mut tar_stdin, &progress)?;
    drop(tar_stdin);
    progress.finish_with_message("還原資料串流完成");

    let tar_status = tar.wait()?;
    if !tar_status.success() {
        return Err(io::Error::new(
            io::ErrorKind::Other,
            format!("指令 'tar' 執行失敗，結束狀態：{}", tar_status),
        ));
    }
    wait_pipeline(children)?;
    println!("還原完成");

    println!("正在分析還原衝突（被取代的舊檔案）...");
    let analysis = analyze_conflicts(&metadata, config.threads)?;
    info!("共 {} 個衝突檔案", analysis.conflict_files.len());

    let json = serde_json::to_string(&analysis).map_err(|e| {
        io::Error::new(io::ErrorKind::InvalidData, format!("分析結果序列化失敗：{}", e))
    })?;
    fs::write(ANALYSIS_FILE, json)?;
    println!("分析完成");

    let analysis_path = std::env::current_dir()?.join(ANALYSIS_FILE);
    println!("分析檔案已儲存至：{}", analysis_path.display());
    Ok(analysis_path.display().to_string())
}

fn tar_extract_command() -> Command {
    let mut command = Command::new("tar");
    command
        .arg("--extract")
        .arg("--acls")
        .arg("--selinux")
        .arg("--xattrs")
        .arg("--absolute-names")
        .arg("--same-permissions")
        .arg("--same-owner")
        .arg("--backup")
        .arg(format!("--suffix={}", MIGRATION_SUFFIX));
    command
}

fn read_encrypted_metadata(
    threads: usize,
    password: &str,
    metadata_path: &str,
) -> io::Result<Metadata> {
    let (mut stream, children) = spawn_decrypt_decompress(threads, password, metadata_path)?;
    let mut json = String::new();
    stream.read_to_string(&mut json)?;
    wait_pipeline(children)?;
    serde_json::from_str(&json).map_err(|e| {
        io::Error::new(io::ErrorKind::InvalidData, format!("中繼資料解析失敗：{}", e))
    })
}

// 還原後重新索引原始清單的根路徑，逐項檢查是否留下改名保存的舊檔案
fn analyze_conflicts(metadata: &Metadata, threads: usize) -> io::Result<Analysis> {
    let options = IndexOptions {
        workers: threads,
        ..IndexOptions::default()
    };
    let indexer = ConcurrentIndexer::new(options)?;
    let index = indexer.run(&metadata.input_manifest_files)?;

    let mut conflict_files = Vec::new();
    for path in &index.paths {
        let mut backup_name = path.as_os_str().to_os_string();
        backup_name.push(MIGRATION_SUFFIX);
        if PathBuf::from(&backup_name).exists() {
            conflict_files.push(path.display().to_string());
        }
    }
    Ok(Analysis { conflict_files })
}
