use serde::{Deserialize, Serialize};

// 備份當下的輸入清單、排除模式與總大小，隨備份檔案一併加密保存
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Metadata {
    pub input_manifest_files: Vec<String>,
    pub exclude_manifest_patterns: Vec<String>,
    pub total_size: u64,
}
