//! # 输出文件收集器
//!
//! 在目录中查找待分析的 VASP 输出文件，并确定每个文件的读取格式。
//!
//! ## 功能
//! - 逗号分隔的多个文件名模式（支持 `*` 和 `?`）
//! - 可选递归搜索
//! - 显式格式，或按扩展名推断
//!
//! ## 依赖关系
//! - 被 `commands/gap.rs` 调用
//! - 使用 `walkdir` 遍历目录

use bandkit::parsers::FileFormat;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// 待读取的输出文件
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputFile {
    pub path: PathBuf,
    pub format: FileFormat,
}

/// 输出文件收集器
pub struct OutputCollector {
    root: PathBuf,
    patterns: Vec<String>,
    recursive: bool,
    format: Option<FileFormat>,
}

impl OutputCollector {
    pub fn new(root: PathBuf) -> Self {
        Self {
            root,
            patterns: vec!["vaspout.h5".to_string(), "vasprun.xml".to_string()],
            recursive: false,
            format: None,
        }
    }

    /// 设置文件名模式（逗号分隔）
    pub fn with_pattern(mut self, pattern: &str) -> Self {
        let patterns: Vec<String> = pattern
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        if !patterns.is_empty() {
            self.patterns = patterns;
        }
        self
    }

    pub fn recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    /// 强制所有文件使用同一格式
    pub fn with_format(mut self, format: Option<FileFormat>) -> Self {
        self.format = format;
        self
    }

    /// 收集匹配的文件，按路径排序
    ///
    /// 未指定格式且扩展名无法识别的文件被跳过。
    pub fn collect(&self) -> Vec<OutputFile> {
        let max_depth = if self.recursive { usize::MAX } else { 1 };

        let mut files: Vec<OutputFile> = WalkDir::new(&self.root)
            .max_depth(max_depth)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file() && self.matches(e.path()))
            .filter_map(|e| {
                let format = match self.format {
                    Some(f) => f,
                    None => FileFormat::from_path(e.path()).ok()?,
                };
                Some(OutputFile {
                    path: e.into_path(),
                    format,
                })
            })
            .collect();

        files.sort_by(|a, b| a.path.cmp(&b.path));
        files
    }

    fn matches(&self, path: &Path) -> bool {
        path.file_name()
            .and_then(|n| n.to_str())
            .map(|name| self.patterns.iter().any(|p| glob_match(p, name)))
            .unwrap_or(false)
    }
}

/// 简单 glob 匹配（支持 * 和 ? 通配符）
fn glob_match(pattern: &str, text: &str) -> bool {
    let pattern = pattern.as_bytes();
    let text = text.as_bytes();

    let (mut p, mut t) = (0, 0);
    let mut backtrack: Option<(usize, usize)> = None;

    while t < text.len() {
        match pattern.get(p) {
            Some(b'*') => {
                backtrack = Some((p, t));
                p += 1;
            }
            Some(&c) if c == b'?' || c == text[t] => {
                p += 1;
                t += 1;
            }
            _ => match backtrack {
                // 让上一个 * 多吞一个字符
                Some((star_p, star_t)) => {
                    backtrack = Some((star_p, star_t + 1));
                    p = star_p + 1;
                    t = star_t + 1;
                }
                None => return false,
            },
        }
    }

    pattern[p..].iter().all(|&c| c == b'*')
}
