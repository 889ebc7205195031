use std::fmt;
use std::io;

use crate::config::config::OperationMode;

// 應用配置結構體，封裝所有參數
#[derive(Clone)]
pub struct AppConfig {
    pub operation: OperationMode,
    pub encryption_password: String,
    pub threads: usize,
    pub manifest_path: Option<String>,
    pub exclude_manifest_path: Option<String>,
    pub destination_path: Option<String>,
    pub source_backup_path: Option<String>,
    pub metadata_path: Option<String>,
    pub no_progress: bool,
}

// 密碼不得出現在日誌或 --show-config 輸出
impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfig")
            .field("operation", &self.operation)
            .field("encryption_password", &"******")
            .field("threads", &self.threads)
            .field("manifest_path", &self.manifest_path)
            .field("exclude_manifest_path", &self.exclude_manifest_path)
            .field("destination_path", &self.destination_path)
            .field("source_backup_path", &self.source_backup_path)
            .field("metadata_path", &self.metadata_path)
            .field("no_progress", &self.no_progress)
            .finish()
    }
}

// 配置來源的 Port
pub trait ConfigPort {
    fn get_config(&self) -> io::Result<AppConfig>;
}

// 操作執行的 Port
pub trait OperationPort {
    fn execute(&self, config: AppConfig) -> io::Result<String>;
}
