//! # bandkit - VASP 能带后处理工具
//!
//! 读取 vaspout.h5 / vasprun.xml，分析带隙、能量窗口能带数和谷极化。
//!
//! ## 子命令
//! - `gap`         - 带隙及 VBM/CBM 位置（目录输入时批量并行）
//! - `nbands-ewin` - 能量窗口能带计数
//! - `vp`          - 谷极化
//!
//! ## 依赖关系
//! ```text
//! main.rs
//!   ├── cli/        (命令行参数定义)
//!   ├── commands/   (命令执行逻辑)
//!   │     └── bandkit (解析器、数据模型、分析)
//!   ├── batch/      (批量并行处理)
//!   └── utils/      (工具函数)
//! ```

mod batch;
mod cli;
mod commands;
mod utils;

use clap::Parser;
use cli::Cli;

fn main() {
    // Initialize colored output for Windows compatibility
    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    let cli = Cli::parse();

    if let Err(e) = commands::run(cli.command) {
        utils::output::print_error(&format!("{}", e));
        std::process::exit(1);
    }
}
