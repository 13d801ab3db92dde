//! # 解析器模块
//!
//! 将 VASP 输出容器解析为统一的 [`ElectronicStructure`]。
//!
//! ## 支持格式
//! - `h5`:  vaspout.h5 (HDF5)
//! - `xml`: vasprun.xml
//!
//! ## 依赖关系
//! - 被 `commands/`, `batch/` 使用
//! - 使用 `models/` 数据模型
//! - 子模块: vaspout, vasprun

pub mod vaspout;
pub mod vasprun;

pub use vaspout::VaspoutReader;
pub use vasprun::VasprunReader;

use crate::error::{BandkitError, Result};
use crate::models::ElectronicStructure;
use serde::Serialize;
use std::path::Path;
use std::str::FromStr;

/// 输出文件读取器
pub trait OutputReader {
    /// 读取并解析文件，失败时不返回部分结果
    fn read(&self, path: &Path) -> Result<ElectronicStructure>;
}

/// 输出文件格式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FileFormat {
    /// vaspout.h5
    Vaspout,
    /// vasprun.xml
    Vasprun,
}

impl FileFormat {
    /// 对应的读取器
    pub fn reader(self) -> Box<dyn OutputReader + Send + Sync> {
        match self {
            FileFormat::Vaspout => Box::new(VaspoutReader),
            FileFormat::Vasprun => Box::new(VasprunReader),
        }
    }

    /// 从扩展名推断格式
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|s| s.to_lowercase())
            .unwrap_or_default();

        match ext.as_str() {
            "h5" | "hdf5" => Ok(FileFormat::Vaspout),
            "xml" => Ok(FileFormat::Vasprun),
            _ => Err(BandkitError::UnsupportedFormat(format!(
                "Cannot determine format for: {}",
                path.display()
            ))),
        }
    }
}

impl FromStr for FileFormat {
    type Err = BandkitError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "h5" | "hdf5" | "vaspout" => Ok(FileFormat::Vaspout),
            "xml" | "vasprun" => Ok(FileFormat::Vasprun),
            other => Err(BandkitError::UnsupportedFormat(format!(
                "'{}' (expected h5 or xml)",
                other
            ))),
        }
    }
}

impl std::fmt::Display for FileFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FileFormat::Vaspout => write!(f, "h5"),
            FileFormat::Vasprun => write!(f, "xml"),
        }
    }
}

/// 按格式标签读取输出文件
pub fn read_output(path: &Path, format: FileFormat) -> Result<ElectronicStructure> {
    format.reader().read(path)
}

/// 构造失败说明文件内容不自洽，归为解析错误
pub(crate) fn finish_structure(
    format: &str,
    path: &str,
    built: Result<ElectronicStructure>,
) -> Result<ElectronicStructure> {
    built.map_err(|e| match e {
        BandkitError::DataError(reason) => BandkitError::ParseError {
            format: format.to_string(),
            path: path.to_string(),
            reason,
        },
        other => other,
    })
}
