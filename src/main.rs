use std::io;

use file_migrator::action::cli::process_args;

fn main() {
    let args: Vec<String> = std::env::args().collect();
    match process_args(args) {
        Ok(output) => {
            log::info!("程式執行完成，輸出位置：{}", output);
            println!("操作完成！輸出檔案位於：{}", output);
        }
        Err(e) if e.kind() == io::ErrorKind::Interrupted => {
            println!("{}", e);
        }
        Err(e) => {
            log::error!("執行失敗：{}", e);
            eprintln!("錯誤：{}", e);
            std::process::exit(1);
        }
    }
}
