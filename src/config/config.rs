use clap::{Parser, ValueEnum};
use std::io;
use std::path::Path;

#[derive(Parser, Clone)]
#[command(
    name = "file_migrator",
    about = "依據清單檔案建立加密備份，並支援還原與衝突分析",
    long_about = "一個依據清單檔案備份與還原的工具：以多執行緒索引清單中的根路徑，套用排除模式後，交由外部工具（tar、zstd、openssl）壓縮與加密。\n加密密碼一律以互動方式輸入，不接受命令列參數。\n使用 `--help` 查看詳細用法。",
    arg_required_else_help = true
)]
pub struct Cli {
    #[arg(value_enum)]
    pub operation: OperationMode,
    #[arg(
        short = 't',
        long,
        default_value_t = -1,
        help = "索引與壓縮使用的執行緒數（-1 表示使用所有核心）"
    )]
    pub threads: i32,
    #[arg(short = 'm', long, help = "清單檔案路徑，每行一個根路徑（備份階段）")]
    pub manifest_path: Option<String>,
    #[arg(short = 'e', long, help = "排除清單檔案路徑，每行一個 glob 模式（備份階段）")]
    pub exclude_manifest_path: Option<String>,
    #[arg(short = 'd', long, help = "備份檔案儲存路徑（備份階段）")]
    pub destination_path: Option<String>,
    #[arg(short = 's', long, help = "要還原的備份檔案路徑（還原階段）")]
    pub source_backup_path: Option<String>,
    #[arg(long, help = "中繼資料檔案路徑（預設為備份檔案路徑加上 .meta）")]
    pub metadata_path: Option<String>,
    #[arg(long, default_value_t = false)]
    pub no_progress: bool,
    #[arg(long, default_value = "info", value_parser = ["info", "warn", "error"])]
    pub log_level: String,
    #[arg(long, default_value_t = false)]
    pub show_config: bool,
}

#[derive(Clone, Copy, ValueEnum)]
#[derive(PartialEq)]
#[derive(Debug)]
pub enum OperationMode {
    Backup,
    Restore,
}

pub fn validate_existing_path<'a>(path: &'a str, what: &str) -> io::Result<&'a Path> {
    let p = Path::new(path);
    if !p.exists() {
        log::error!("{}不存在：{}", what, path);
        return Err(io::Error::new(
            io::ErrorKind::NotFound,
            format!("{} '{}' 不存在", what, path),
        ));
    }
    Ok(p)
}

// 備份檔案要寫入的目錄必須已存在
pub fn validate_destination_parent(destination: &str) -> io::Result<()> {
    let parent = match Path::new(destination).parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    if !parent.exists() {
        return Err(io::Error::new(
            io::ErrorKind::NotFound,
            format!("目的目錄 '{}' 不存在", parent.display()),
        ));
    }
    Ok(())
}

pub fn resolve_threads(threads: i32) -> usize {
    if threads < 1 {
        std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1)
    } else {
        threads as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_threads_resolve_to_available_cores() {
        assert!(resolve_threads(-1) >= 1);
        assert_eq!(resolve_threads(4), 4);
    }

    #[test]
    fn missing_path_is_rejected() {
        let err = validate_existing_path("/no/such/path/anywhere", "清單檔案路徑")
            .err()
            .unwrap();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn bare_destination_filename_uses_current_directory() {
        assert!(validate_destination_parent("backup.tar.zst.crypt").is_ok());
    }
}
