//! # 数据模型模块
//!
//! 定义统一的电子结构数据模型。
//!
//! ## 依赖关系
//! - 被 `parsers/` 构造，被 `analysis/` 和 `commands/` 使用
//! - 子模块: electronic

pub mod electronic;

pub use electronic::ElectronicStructure;
