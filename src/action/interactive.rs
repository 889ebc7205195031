use dialoguer::{Confirm, Input, Password, Select};
use std::io;
use std::path::Path;

use crate::config::config::{resolve_threads, OperationMode};
use crate::config::consts::{ARCHIVE_SUFFIX, METADATA_SUFFIX};
use crate::config::ports::{AppConfig, ConfigPort, OperationPort};
use crate::ops::operation::OperationAdapter;
use crate::service::config_service::ConfigService;
use crate::utils::utils::setup_logging;

pub fn process_interactive_mode() -> io::Result<String> {
    println!("=== 歡迎使用互動模式 ===");
    setup_logging("info")?;

    let operation = get_operation()?;
    let config_port: Box<dyn ConfigPort> = Box::new(InteractiveConfigAdapter::new(operation));
    let config_service = ConfigService::new(config_port);
    let config = config_service.get_config()?;

    let operation_port: Box<dyn OperationPort> = Box::new(OperationAdapter);
    operation_port.execute(config)
}

fn get_operation() -> io::Result<OperationMode> {
    let items = ["備份（backup）", "還原（restore）"];
    let selection = Select::new()
        .with_prompt("請選擇要執行的操作")
        .items(&items)
        .default(0)
        .interact()
        .map_err(|e| io::Error::new(io::ErrorKind::Other, format!("操作選擇失敗：{}", e)))?;
    Ok(if selection == 0 {
        OperationMode::Backup
    } else {
        OperationMode::Restore
    })
}

// 互動式配置適配器
pub struct InteractiveConfigAdapter {
    operation: OperationMode,
}

impl InteractiveConfigAdapter {
    pub fn new(operation: OperationMode) -> Self {
        InteractiveConfigAdapter { operation }
    }
}

impl ConfigPort for InteractiveConfigAdapter {
    fn get_config(&self) -> io::Result<AppConfig> {
        let mut manifest_path = None;
        let mut exclude_manifest_path = None;
        let mut destination_path = None;
        let mut source_backup_path = None;

        let metadata_path = match self.operation {
            OperationMode::Backup => {
                let manifest = get_existing_path("請輸入清單檔案路徑（每行一個根路徑）")?;
                exclude_manifest_path =
                    get_optional_existing_path("請輸入排除清單檔案路徑（留空表示不排除）")?;
                let destination = get_text(
                    "請輸入備份檔案儲存路徑",
                    &format!("backup{}", ARCHIVE_SUFFIX),
                )?;
                let metadata = format!("{}{}", destination, METADATA_SUFFIX);
                manifest_path = Some(manifest);
                destination_path = Some(destination);
                metadata
            }
            OperationMode::Restore => {
                let source = get_existing_path("請輸入要還原的備份檔案路徑")?;
                let metadata = format!("{}{}", source, METADATA_SUFFIX);
                source_backup_path = Some(source);
                metadata
            }
        };

        let encryption_password =
            prompt_encryption_password(self.operation == OperationMode::Backup)?;

        Ok(AppConfig {
            operation: self.operation,
            encryption_password,
            threads: resolve_threads(-1),
            manifest_path,
            exclude_manifest_path,
            destination_path,
            source_backup_path,
            metadata_path: Some(metadata_path),
            no_progress: false,
        })
    }
}

pub fn prompt_encryption_password(confirm: bool) -> io::Result<String> {
    let password = Password::new()
        .with_prompt("請輸入加密密碼")
        .interact()
        .map_err(|e| io::Error::new(io::ErrorKind::Other, format!("密碼輸入失敗：{}", e)))?;
    if password.is_empty() {
        return Err(io::Error::new(io::ErrorKind::InvalidInput, "加密密碼不可為空"));
    }
    if confirm {
        let confirm_password = Password::new()
            .with_prompt("請再次輸入密碼以確認")
            .interact()
            .map_err(|e| io::Error::new(io::ErrorKind::Other, format!("密碼確認失敗：{}", e)))?;
        if password != confirm_password {
            return Err(io::Error::new(io::ErrorKind::InvalidInput, "密碼不匹配"));
        }
    }
    Ok(password)
}

pub fn confirm_continue() -> io::Result<bool> {
    Confirm::new()
        .with_prompt("是否繼續？")
        .default(true)
        .interact()
        .map_err(|e| io::Error::new(io::ErrorKind::Other, format!("確認輸入失敗：{}", e)))
}

fn get_existing_path(prompt: &str) -> io::Result<String> {
    Input::new()
        .with_prompt(prompt)
        .validate_with(|input: &String| -> Result<(), String> {
            if Path::new(input).exists() {
                Ok(())
            } else {
                Err(format!("路徑 '{}' 不存在", input))
            }
        })
        .interact_text()
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e.to_string()))
}

fn get_optional_existing_path(prompt: &str) -> io::Result<Option<String>> {
    let value: String = Input::new()
        .with_prompt(prompt)
        .allow_empty(true)
        .validate_with(|input: &String| -> Result<(), String> {
            if input.is_empty() || Path::new(input).exists() {
                Ok(())
            } else {
                Err(format!("路徑 '{}' 不存在", input))
            }
        })
        .interact_text()
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e.to_string()))?;
    Ok(if value.is_empty() { None } else { Some(value) })
}

fn get_text(prompt: &str, default: &str) -> io::Result<String> {
    Input::new()
        .with_prompt(prompt)
        .default(default.to_string())
        .interact_text()
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e.to_string()))
}
