//! # 统一错误处理模块
//!
//! 定义 bandkit 的所有错误类型，使用 `thiserror` 派生。
//!
//! ## 错误分类
//! - I/O: 文件缺失或无法读取
//! - Schema: 识别出格式，但缺少必需的数据集/节点
//! - Parse: 已识别结构内部内容格式错误
//! - Data: 结构合法但无法分析（如零能带、零 k 点）
//! - Index: 调用方给出的自旋、k 点或 VBM 索引越界
//!
//! ## 依赖关系
//! - 被所有其他模块使用
//! - 无外部模块依赖

use thiserror::Error;

/// bandkit 统一错误类型
#[derive(Error, Debug)]
pub enum BandkitError {
    // ─────────────────────────────────────────────────────────────
    // I/O 错误
    // ─────────────────────────────────────────────────────────────
    #[error("File not found: {path}")]
    FileNotFound { path: String },

    #[error("Failed to read file: {path}")]
    FileReadError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write file: {path}")]
    FileWriteError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    // ─────────────────────────────────────────────────────────────
    // 格式错误
    // ─────────────────────────────────────────────────────────────
    #[error("Missing required {format} node in {path}: {missing}")]
    SchemaError {
        format: String,
        path: String,
        missing: String,
    },

    #[error("Failed to parse {format} file: {path}\nReason: {reason}")]
    ParseError {
        format: String,
        path: String,
        reason: String,
    },

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    // ─────────────────────────────────────────────────────────────
    // 数据错误
    // ─────────────────────────────────────────────────────────────
    #[error("Invalid electronic structure data: {0}")]
    DataError(String),

    // ─────────────────────────────────────────────────────────────
    // 索引错误
    // ─────────────────────────────────────────────────────────────
    #[error("Spin channel {spin} out of range (structure has {num_spins} spin channel(s))")]
    SpinOutOfRange { spin: usize, num_spins: usize },

    #[error("K-point index {index} out of range (structure has {num_kpoints} k-points)")]
    KpointOutOfRange { index: usize, num_kpoints: usize },

    #[error("VBM override {index} for spin {spin} out of range (structure has {num_bands} bands)")]
    VbmOverrideOutOfRange {
        spin: usize,
        index: usize,
        num_bands: usize,
    },

    // ─────────────────────────────────────────────────────────────
    // 参数错误
    // ─────────────────────────────────────────────────────────────
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    // ─────────────────────────────────────────────────────────────
    // CSV 错误
    // ─────────────────────────────────────────────────────────────
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
}

/// 错误大类，供调用方按分类分支
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Io,
    Schema,
    Parse,
    Data,
    Index,
    Argument,
}

impl BandkitError {
    /// 返回错误所属的大类
    pub fn kind(&self) -> ErrorKind {
        match self {
            BandkitError::FileNotFound { .. }
            | BandkitError::FileReadError { .. }
            | BandkitError::FileWriteError { .. }
            | BandkitError::CsvError(_) => ErrorKind::Io,
            BandkitError::SchemaError { .. } => ErrorKind::Schema,
            BandkitError::ParseError { .. } => ErrorKind::Parse,
            BandkitError::DataError(_) => ErrorKind::Data,
            BandkitError::SpinOutOfRange { .. }
            | BandkitError::KpointOutOfRange { .. }
            | BandkitError::VbmOverrideOutOfRange { .. } => ErrorKind::Index,
            BandkitError::UnsupportedFormat(_) | BandkitError::InvalidArgument(_) => {
                ErrorKind::Argument
            }
        }
    }
}

/// Result 类型别名
pub type Result<T> = std::result::Result<T, BandkitError>;
