use std::io;

use crate::config::config::OperationMode;
use crate::config::ports::{AppConfig, OperationPort};
use crate::ops::{backup, restore};

// 操作集合是封閉的，直接以列舉分派
pub struct OperationAdapter;

impl OperationPort for OperationAdapter {
    fn execute(&self, config: AppConfig) -> io::Result<String> {
        match config.operation {
            OperationMode::Backup => backup::execute(&config),
            OperationMode::Restore => restore::execute(&config),
        }
    }
}
