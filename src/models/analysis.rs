use serde::{Deserialize, Serialize};

// 還原後的衝突清單：這些路徑的舊內容被改名保留
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Analysis {
    pub conflict_files: Vec<String>,
}
