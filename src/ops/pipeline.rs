use std::io::{self, Read, Write};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};

use crate::utils::utils::ProgressManager;

const COPY_BUFFER_SIZE: usize = 4 * 1024 * 1024;

// 管線中的子行程，保留指令名稱供錯誤回報
pub type PipelineChildren = Vec<(&'static str, Child)>;

pub fn zstd_compress_command(threads: usize) -> Command {
    let mut command = Command::new("zstd");
    command
        .arg("--compress")
        .arg(format!("--threads={}", threads))
        .arg("--stdout");
    command
}

pub fn zstd_decompress_command(threads: usize) -> Command {
    let mut command = Command::new("zstd");
    command
        .arg("--decompress")
        .arg(format!("--threads={}", threads))
        .arg("--stdout");
    command
}

pub fn openssl_encrypt_command(password: &str, destination_path: &str) -> Command {
    let mut command = Command::new("openssl");
    command
        .arg("enc")
        .arg("-e")
        .arg("-aes-256-cbc")
        .arg("-pbkdf2")
        .arg("-k")
        .arg(password)
        .arg("-out")
        .arg(destination_path);
    command
}

pub fn openssl_decrypt_command(password: &str, source_path: &str) -> Command {
    let mut command = Command::new("openssl");
    command
        .arg("enc")
        .arg("-d")
        .arg("-aes-256-cbc")
        .arg("-pbkdf2")
        .arg("-k")
        .arg(password)
        .arg("-in")
        .arg(source_path);
    command
}

// zstd 壓縮後交給 openssl 加密寫入目的檔；回傳 zstd 的 stdin 供呼叫端灌入資料
pub fn spawn_compress_encrypt(
    threads: usize,
    password: &str,
    destination_path: &str,
) -> io::Result<(ChildStdin, PipelineChildren)> {
    let mut zstd = zstd_compress_command(threads)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .spawn()
        .map_err(|e| spawn_error("zstd", e))?;
    let zstd_stdin = zstd.stdin.take().expect("zstd stdin");
    let zstd_stdout = zstd.stdout.take().expect("zstd stdout");

    let openssl = openssl_encrypt_command(password, destination_path)
        .stdin(Stdio::from(zstd_stdout))
        .spawn()
        .map_err(|e| spawn_error("openssl", e))?;

    Ok((zstd_stdin, vec![("zstd", zstd), ("openssl", openssl)]))
}

// openssl 解密後交給 zstd 解壓；回傳 zstd 的 stdout 供呼叫端讀取
pub fn spawn_decrypt_decompress(
    threads: usize,
    password: &str,
    source_path: &str,
) -> io::Result<(ChildStdout, PipelineChildren)> {
    let mut openssl = openssl_decrypt_command(password, source_path)
        .stdout(Stdio::piped())
        .spawn()
        .map_err(|e| spawn_error("openssl", e))?;
    let openssl_stdout = openssl.stdout.take().expect("openssl stdout");

    let mut zstd = zstd_decompress_command(threads)
        .stdin(Stdio::from(openssl_stdout))
        .stdout(Stdio::piped())
        .spawn()
        .map_err(|e| spawn_error("zstd", e))?;
    let zstd_stdout = zstd.stdout.take().expect("zstd stdout");

    Ok((zstd_stdout, vec![("openssl", openssl), ("zstd", zstd)]))
}

pub fn wait_pipeline(children: PipelineChildren) -> io::Result<()> {
    for (name, mut child) in children {
        let status = child.wait()?;
        if !status.success() {
            return Err(io::Error::new(
                io::ErrorKind::Other,
                format!("指令 '{}' 執行失敗，結束狀態：{}", name, status),
            ));
        }
    }
    Ok(())
}

pub fn copy_with_progress<R: Read, W: Write>(
    reader: &mut R,
    writer: &mut W,
    progress: &ProgressManager,
) -> io::Result<u64> {
    let mut buffer = vec![0u8; COPY_BUFFER_SIZE];
    let mut copied = 0u64;
    loop {
        let read = match reader.read(&mut buffer) {
            Ok(0) => break,
            Ok(read) => read,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        writer.write_all(&buffer[..read])?;
        copied += read as u64;
        progress.inc(read as u64);
    }
    writer.flush()?;
    Ok(copied)
}

fn spawn_error(program: &str, e: io::Error) -> io::Error {
    io::Error::new(e.kind(), format!("無法啟動 {}：{}", program, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn copy_with_progress_reports_byte_count() {
        let data = vec![7u8; 9000];
        let mut reader = io::Cursor::new(data.clone());
        let mut sink = Vec::new();
        let progress = ProgressManager::new(data.len() as u64, true);

        let copied = copy_with_progress(&mut reader, &mut sink, &progress).unwrap();
        assert_eq!(copied, 9000);
        assert_eq!(sink, data);
    }
}
