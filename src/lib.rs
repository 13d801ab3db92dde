//! # bandkit - VASP 电子结构后处理引擎
//!
//! 将 vaspout.h5 / vasprun.xml 解析为统一的 [`ElectronicStructure`]，
//! 并在其上进行带隙、能量窗口能带计数和谷极化分析。
//!
//! ## 格式支持
//! - vasprun.xml: 默认可用
//! - vaspout.h5: 需要系统 HDF5 库，并以 `--features hdf5` 构建；
//!   未启用时读取 `.h5` 返回 [`BandkitError::UnsupportedFormat`]
//!
//! ```text
//! cargo build --release --features hdf5
//! ```
//!
//! ## 依赖关系
//! ```text
//! lib.rs
//!   ├── parsers/    (vaspout.h5, vasprun.xml 读取器)
//!   ├── models/     (ElectronicStructure)
//!   ├── analysis/   (gap, window, valley)
//!   └── error.rs    (错误处理)
//! ```
//!
//! ## 示例
//! ```no_run
//! use bandkit::analysis::get_gap;
//! use bandkit::parsers::{read_output, FileFormat};
//! use std::path::Path;
//!
//! let structure = read_output(Path::new("vasprun.xml"), FileFormat::Vasprun)?;
//! let report = get_gap(&structure, true, None)?;
//! for spin in &report.spins {
//!     println!("spin {}: {:.4} eV ({})", spin.spin, spin.gap, spin.kind);
//! }
//! # Ok::<(), bandkit::error::BandkitError>(())
//! ```

pub mod analysis;
pub mod error;
pub mod models;
pub mod parsers;

pub use error::{BandkitError, ErrorKind, Result};
pub use models::ElectronicStructure;
