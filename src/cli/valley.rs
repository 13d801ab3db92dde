//! # vp 子命令 CLI 定义
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/valley.rs`

use super::{FormatOpt, VbmOpt};
use clap::Args;
use std::path::PathBuf;

/// vp 子命令参数
#[derive(Args, Debug)]
pub struct ValleyArgs {
    /// Output file
    #[arg(default_value = "vaspout.h5")]
    pub file: PathBuf,

    #[command(flatten)]
    pub format: FormatOpt,

    #[command(flatten)]
    pub vbm: VbmOpt,

    /// K+ k-point index (0-based)
    #[arg(long = "point1", visible_alias = "p1", default_value_t = 49)]
    pub point1: usize,

    /// K- k-point index (0-based)
    #[arg(long = "point2", visible_alias = "p2", default_value_t = 149)]
    pub point2: usize,

    /// Fermi energy used to locate the VBM (default: value stored in the file)
    #[arg(long, allow_negative_numbers = true)]
    pub fermi: Option<f64>,
}
