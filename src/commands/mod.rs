//! # 命令执行模块
//!
//! 实现各子命令的业务逻辑。
//!
//! ## 依赖关系
//! - 被 `main.rs` 调用
//! - 使用 `cli/`, `batch/`, `utils/` 以及 `bandkit` 引擎
//! - 子模块: gap, window, valley

pub mod gap;
pub mod valley;
pub mod window;

use crate::cli::Commands;
use bandkit::Result;

/// 执行命令
pub fn run(cmd: Commands) -> Result<()> {
    match cmd {
        Commands::Gap(args) => gap::execute(args),
        Commands::NbandsEwin(args) => window::execute(args),
        Commands::Vp(args) => valley::execute(args),
    }
}
