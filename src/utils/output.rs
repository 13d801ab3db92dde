//! # 美化输出工具
//!
//! 提供统一的终端输出样式。分析引擎本身不打印，所有终端输出都经过这里。
//!
//! ## 依赖关系
//! - 被所有 `commands/` 模块和 `main.rs` 使用
//! - 使用 `colored` crate

use colored::Colorize;

/// 打印成功消息
pub fn print_success(msg: &str) {
    println!("{} {}", "[OK]".green().bold(), msg);
}

/// 打印错误消息
pub fn print_error(msg: &str) {
    eprintln!("{} {}", "[ERR]".red().bold(), msg);
}

/// 打印警告消息
pub fn print_warning(msg: &str) {
    println!("{} {}", "[WARN]".yellow().bold(), msg);
}

/// 打印信息消息
pub fn print_info(msg: &str) {
    println!("{} {}", "[*]".blue().bold(), msg);
}

/// 打印一条高亮的结果，如 `gap (spin 0): 1.3000 eV`
pub fn print_result(label: &str, value: &str) {
    println!("{} {}: {}", "[=]".cyan().bold(), label, value.truecolor(255, 175, 0).bold());
}

/// 打印标题栏
pub fn print_header(title: &str) {
    let line = "─".repeat(60);
    println!("\n{}", line.dimmed());
    println!("  {}", title.bold());
    println!("{}\n", line.dimmed());
}

/// 格式化 k 点坐标，如 `12 (0.3333, 0.3333, 0.0000)`
pub fn format_kpoint(index: usize, coords: &[f64; 3]) -> String {
    format!(
        "{} ({:.4}, {:.4}, {:.4})",
        index, coords[0], coords[1], coords[2]
    )
}
