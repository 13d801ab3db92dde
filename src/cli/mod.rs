//! # CLI 模块
//!
//! 使用 `clap` 定义命令行参数和子命令。
//!
//! ## 命令结构
//! - `gap`: 带隙分析（目录输入时批量并行）
//! - `nbands-ewin`: 能量窗口能带计数
//! - `vp`: 谷极化
//!
//! ## 选项拼写
//! - 文件格式: `-f/--vaspfileformat`（环境变量 `MXMF_VASPFILE_FORMAT`）
//! - 参考能量: 只有长选项 `--fermi`，`-f` 不表示费米能级
//! - vp 的 k 点: `--point1/--point2`，别名 `--p1/--p2`（双横线）
//!
//! ## 依赖关系
//! - 被 `main.rs` 使用
//! - 子模块: gap, window, valley

pub mod gap;
pub mod valley;
pub mod window;

use bandkit::parsers::FileFormat;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::Path;

/// bandkit - VASP 能带后处理工具
#[derive(Parser)]
#[command(name = "bandkit")]
#[command(author = "Changjiang Wu")]
#[command(version)]
#[command(about = "Band gap, energy-window and valley-polarization analysis for VASP outputs", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// 可用的子命令
#[derive(Subcommand)]
pub enum Commands {
    /// Find the band gap, its type and the VBM/CBM positions
    Gap(gap::GapArgs),

    /// Count bands fully / partly inside an energy window
    #[command(name = "nbands-ewin", alias = "nbands_ewin")]
    NbandsEwin(window::WindowArgs),

    /// Compute the valley polarization between two k-points
    Vp(valley::ValleyArgs),
}

// ─────────────────────────────────────────────────────────────
// 共享参数
// ─────────────────────────────────────────────────────────────

/// 输出文件格式
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum FormatArg {
    /// vaspout.h5 (HDF5)
    H5,
    /// vasprun.xml
    Xml,
}

impl From<FormatArg> for FileFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::H5 => FileFormat::Vaspout,
            FormatArg::Xml => FileFormat::Vasprun,
        }
    }
}

/// 文件格式选项
#[derive(Args, Debug, Clone)]
pub struct FormatOpt {
    /// Read file format [default: guessed from the extension, else h5]
    #[arg(
        short = 'f',
        long = "vaspfileformat",
        alias = "format",
        value_enum,
        env = "MXMF_VASPFILE_FORMAT"
    )]
    pub format: Option<FormatArg>,
}

impl FormatOpt {
    /// 文件的读取格式：显式指定 > 扩展名推断 > h5
    pub fn resolve(&self, path: &Path) -> FileFormat {
        self.explicit()
            .or_else(|| FileFormat::from_path(path).ok())
            .unwrap_or(FileFormat::Vaspout)
    }

    /// 显式指定的格式
    pub fn explicit(&self) -> Option<FileFormat> {
        self.format.map(FileFormat::from)
    }
}

/// VBM 覆盖选项
#[derive(Args, Debug, Clone)]
pub struct VbmOpt {
    /// Per-spin VBM band indices (0-based), e.g. "24 23"
    #[arg(short = 'v', long = "vbms", num_args = 1.., value_delimiter = ' ')]
    pub vbms: Option<Vec<usize>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_vp_point_aliases() {
        let cli = Cli::try_parse_from(["bandkit", "vp", "--p1", "3", "--p2", "5", "-v", "4"]).unwrap();
        match cli.command {
            Commands::Vp(args) => {
                assert_eq!(args.point1, 3);
                assert_eq!(args.point2, 5);
                assert_eq!(args.vbm.vbms, Some(vec![4]));
                assert_eq!(args.fermi, None);
            }
            _ => panic!("expected vp"),
        }

        let cli = Cli::try_parse_from(["bandkit", "vp", "--point1", "7"]).unwrap();
        match cli.command {
            Commands::Vp(args) => {
                assert_eq!(args.point1, 7);
                assert_eq!(args.point2, 149);
            }
            _ => panic!("expected vp"),
        }
    }

    #[test]
    fn test_format_flag_is_not_fermi() {
        let cli = Cli::try_parse_from(["bandkit", "gap", "run/vasprun.xml", "-f", "xml"]).unwrap();
        match cli.command {
            Commands::Gap(args) => {
                assert_eq!(args.format.explicit(), Some(FileFormat::Vasprun));
                assert_eq!(args.format.resolve(&args.file), FileFormat::Vasprun);
            }
            _ => panic!("expected gap"),
        }

        // -f 只接受格式标签
        assert!(Cli::try_parse_from(["bandkit", "nbands-ewin", "-e", "-1", "1", "-f", "0.5"]).is_err());
    }

    #[test]
    fn test_format_inferred_from_extension() {
        let opt = FormatOpt { format: None };
        assert_eq!(opt.resolve(Path::new("run/vasprun.xml")), FileFormat::Vasprun);
        assert_eq!(opt.resolve(Path::new("run/vaspout.h5")), FileFormat::Vaspout);
        assert_eq!(opt.resolve(Path::new("run/EIGENVAL")), FileFormat::Vaspout);
    }
}
