use std::borrow::Cow;
use std::fs;
use std::io;
use std::path::Path;

use indicatif::{ProgressBar, ProgressStyle};

pub fn setup_logging(log_level: &str) -> io::Result<()> {
    let log_level_filter = match log_level {
        "info" => log::LevelFilter::Info,
        "warn" => log::LevelFilter::Warn,
        "error" => log::LevelFilter::Error,
        _ => log::LevelFilter::Info,
    };
    env_logger::Builder::new()
        .filter_level(log_level_filter)
        .init();
    Ok(())
}

// 以位元組為單位的進度條；總大小來自索引結果
pub struct ProgressManager {
    pb: ProgressBar,
}

impl ProgressManager {
    pub fn new(total_bytes: u64, no_progress: bool) -> Self {
        let pb = if no_progress {
            ProgressBar::hidden()
        } else if total_bytes == 0 {
            let pb = ProgressBar::new_spinner();
            pb.set_style(
                ProgressStyle::default_spinner()
                    .template("{msg} {spinner} 已處理：{bytes}（{bytes_per_sec}）")
                    .unwrap(),
            );
            pb
        } else {
            let pb = ProgressBar::new(total_bytes);
            pb.set_style(
                ProgressStyle::default_bar()
                    .template("{msg} [{bar:40}] {bytes}/{total_bytes}（{bytes_per_sec}，剩餘 {eta_precise}）")
                    .unwrap()
                    .progress_chars("##-"),
            );
            pb
        };
        ProgressManager { pb }
    }

    pub fn set_message(&self, msg: impl Into<Cow<'static, str>>) {
        self.pb.set_message(msg);
    }

    pub fn inc(&self, delta: u64) {
        self.pb.inc(delta);
    }

    pub fn finish_with_message(&self, msg: impl Into<Cow<'static, str>>) {
        self.pb.finish_with_message(msg);
    }
}

pub fn to_engineering_notation(value: f64, precision: usize) -> String {
    if value == 0.0 {
        return "0.0".to_string();
    }
    let exponent = (value.abs().log10() / 3.0).floor() as i32 * 3;
    let mantissa = value / 10f64.powi(exponent);
    format!("{:.prec$}E{:+}", mantissa, exponent, prec = precision)
}

// 清單檔案：每行一個項目，空白行與 # 開頭的註解行不納入
pub fn read_manifest(path: &Path) -> io::Result<Vec<String>> {
    let content = fs::read_to_string(path).map_err(|e| {
        io::Error::new(
            e.kind(),
            format!("無法讀取清單檔案 '{}'：{}", path.display(), e),
        )
    })?;
    Ok(content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn engineering_notation_matches_expected_format() {
        assert_eq!(to_engineering_notation(0.0, 3), "0.0");
        assert_eq!(to_engineering_notation(1234.0, 3), "1.234E+3");
        assert_eq!(to_engineering_notation(15.0, 3), "15.000E+0");
        assert_eq!(to_engineering_notation(0.01, 3), "10.000E-3");
        assert_eq!(to_engineering_notation(-2500.0, 3), "-2.500E+3");
    }

    #[test]
    fn manifest_reading_filters_comments_and_blank_lines() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "# 備份清單").unwrap();
        writeln!(file, "/data/a").unwrap();
        writeln!(file).unwrap();
        writeln!(file, "  /data/b  ").unwrap();
        writeln!(file, "# 結尾註解").unwrap();
        file.flush().unwrap();

        let lines = read_manifest(file.path()).unwrap();
        assert_eq!(lines, vec!["/data/a".to_string(), "/data/b".to_string()]);
    }
}
