//! # 批量处理模块
//!
//! 对一个目录下的多个 VASP 输出文件并行执行分析。
//!
//! ## 功能
//! - 收集匹配文件并确定读取格式
//! - 并行解析与分析
//! - 进度反馈与失败汇总
//!
//! ## 依赖关系
//! - 被 `commands/gap.rs` 使用
//! - 使用 `rayon` 进行并行处理
//! - 使用 `indicatif` 显示进度

pub mod collector;
pub mod runner;

pub use collector::{OutputCollector, OutputFile};
pub use runner::{BatchResult, BatchRunner};
