use std::io;

use clap::Parser;

use crate::action::interactive::{process_interactive_mode, prompt_encryption_password};
use crate::config::config::{
    resolve_threads, validate_destination_parent, validate_existing_path, Cli, OperationMode,
};
use crate::config::consts::METADATA_SUFFIX;
use crate::config::ports::{AppConfig, ConfigPort, OperationPort};
use crate::ops::operation::OperationAdapter;
use crate::service::config_service::ConfigService;
use crate::utils::utils::setup_logging;

pub fn process_args(args: Vec<String>) -> io::Result<String> {
    if args.len() == 1 {
        process_interactive_mode()
    } else {
        process_cli_mode()
    }
}

pub fn process_cli_mode() -> io::Result<String> {
    let cli = Cli::parse();
    setup_logging(&cli.log_level)?;

    let config_port: Box<dyn ConfigPort> = Box::new(CliConfigAdapter::new(cli.clone()));
    let config_service = ConfigService::new(config_port);
    let config = config_service.get_config()?;

    if cli.show_config {
        println!("實際使用的配置：{:#?}", config);
    }

    let operation_port: Box<dyn OperationPort> = Box::new(OperationAdapter);
    operation_port.execute(config)
}

// CLI 配置適配器
pub struct CliConfigAdapter {
    cli: Cli,
}

impl CliConfigAdapter {
    pub fn new(cli: Cli) -> Self {
        CliConfigAdapter { cli }
    }
}

impl ConfigPort for CliConfigAdapter {
    fn get_config(&self) -> io::Result<AppConfig> {
        let threads = resolve_threads(self.cli.threads);

        let metadata_path = match self.cli.operation {
            OperationMode::Backup => {
                let manifest_path = require(&self.cli.manifest_path, "--manifest-path")?;
                validate_existing_path(manifest_path, "清單檔案路徑")?;
                if let Some(exclude_path) = &self.cli.exclude_manifest_path {
                    validate_existing_path(exclude_path, "排除清單檔案路徑")?;
                }
                let destination_path = require(&self.cli.destination_path, "--destination-path")?;
                validate_destination_parent(destination_path)?;

                self.cli
                    .metadata_path
                    .clone()
                    .unwrap_or_else(|| format!("{}{}", destination_path, METADATA_SUFFIX))
            }
            OperationMode::Restore => {
                let source_backup_path =
                    require(&self.cli.source_backup_path, "--source-backup-path")?;
                validate_existing_path(source_backup_path, "備份檔案路徑")?;

                let metadata_path = self
                    .cli
                    .metadata_path
                    .clone()
                    .unwrap_or_else(|| format!("{}{}", source_backup_path, METADATA_SUFFIX));
                validate_existing_path(&metadata_path, "中繼資料檔案路徑")?;
                metadata_path
            }
        };

        // 備份時要求再次輸入密碼以確認
        let encryption_password =
            prompt_encryption_password(self.cli.operation == OperationMode::Backup)?;

        Ok(AppConfig {
            operation: self.cli.operation,
            encryption_password,
            threads,
            manifest_path: self.cli.manifest_path.clone(),
            exclude_manifest_path: self.cli.exclude_manifest_path.clone(),
            destination_path: self.cli.destination_path.clone(),
            source_backup_path: self.cli.source_backup_path.clone(),
            metadata_path: Some(metadata_path),
            no_progress: self.cli.no_progress,
        })
    }
}

fn require<'a>(value: &'a Option<String>, name: &str) -> io::Result<&'a str> {
    value.as_deref().ok_or_else(|| {
        io::Error::new(io::ErrorKind::InvalidInput, format!("缺少必要參數：{}", name))
    })
}
