//! # nbands-ewin 子命令 CLI 定义
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/window.rs`

use super::FormatOpt;
use clap::Args;
use std::path::PathBuf;

/// nbands-ewin 子命令参数
#[derive(Args, Debug)]
pub struct WindowArgs {
    /// Energy window EMIN EMAX (eV, relative to --fermi)
    #[arg(
        short = 'e',
        long = "energy-windows",
        alias = "energy_windows",
        num_args = 2,
        value_names = ["EMIN", "EMAX"],
        allow_negative_numbers = true,
        required = true
    )]
    pub energy_windows: Vec<f64>,

    /// Output file
    #[arg(default_value = "vaspout.h5")]
    pub file: PathBuf,

    #[command(flatten)]
    pub format: FormatOpt,

    /// Reference energy added to both window bounds (eV)
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    pub fermi: f64,

    /// Spin channel (0 or 1)
    #[arg(short, long, default_value_t = 0, value_parser = clap::value_parser!(u8).range(0..=1))]
    pub spin: u8,
}
