//! # gap 子命令 CLI 定义
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/gap.rs`

use super::{FormatOpt, VbmOpt};
use clap::Args;
use std::path::PathBuf;

/// gap 子命令参数
#[derive(Args, Debug)]
pub struct GapArgs {
    /// Output file, or a directory of outputs (batch mode)
    #[arg(default_value = "vaspout.h5")]
    pub file: PathBuf,

    #[command(flatten)]
    pub format: FormatOpt,

    #[command(flatten)]
    pub vbm: VbmOpt,

    /// Print only the gap values, without VBM/CBM positions
    #[arg(short, long, default_value_t = false)]
    pub quiet: bool,

    // ─────────────────────────────────────────────────────────────
    // 批量处理参数
    // ─────────────────────────────────────────────────────────────
    /// Glob pattern for output files (batch mode)
    #[arg(long, default_value = "vaspout.h5,vasprun.xml")]
    pub pattern: String,

    /// Recurse into subdirectories (batch mode)
    #[arg(long, default_value_t = false)]
    pub recursive: bool,

    /// Number of parallel jobs (0 = auto, batch mode only)
    #[arg(short, long, default_value_t = 0)]
    pub jobs: usize,

    /// Filename for the batch summary CSV
    #[arg(long, default_value = "gap_summary.csv")]
    pub output_csv: PathBuf,
}
