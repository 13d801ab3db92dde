//! # 批量执行器
//!
//! 并行解析并分析多个输出文件。每个任务独立读取自己的文件，
//! 得到的 `ElectronicStructure` 不在任务间共享可变状态。
//!
//! ## 功能
//! - 基于 rayon 的并行迭代
//! - 进度条显示
//! - 单个文件失败不影响其他文件，失败信息汇总报告
//!
//! ## 依赖关系
//! - 被 `commands/gap.rs` 调用
//! - 使用 `utils/progress.rs` 创建进度条
//! - 使用 `rayon` 进行并行计算

use super::OutputFile;
use crate::utils::progress;

use bandkit::{BandkitError, Result};
use rayon::prelude::*;
use std::path::PathBuf;

/// 批量处理结果
#[derive(Debug)]
pub struct BatchResult<T> {
    /// 成功的文件及其结果，按路径排序
    pub successes: Vec<(PathBuf, T)>,
    /// 失败的文件及错误信息，按路径排序
    pub failures: Vec<(PathBuf, String)>,
}

impl<T> BatchResult<T> {
    pub fn total(&self) -> usize {
        self.successes.len() + self.failures.len()
    }
}

/// 批量执行器
pub struct BatchRunner {
    /// 并行作业数
    jobs: usize,
}

impl BatchRunner {
    /// 创建新的批量执行器，`jobs == 0` 时使用全部 CPU
    pub fn new(jobs: usize) -> Self {
        let jobs = if jobs == 0 { num_cpus::get() } else { jobs };
        Self { jobs }
    }

    pub fn jobs(&self) -> usize {
        self.jobs
    }

    /// 并行处理文件列表
    pub fn run<T, F>(&self, files: Vec<OutputFile>, processor: F) -> Result<BatchResult<T>>
    where
        T: Send,
        F: Fn(&OutputFile) -> Result<T> + Sync + Send,
    {
        let pb = progress::create_progress_bar(files.len() as u64, "Analyzing");

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.jobs)
            .build()
            .map_err(|e| BandkitError::InvalidArgument(format!("cannot start {} jobs: {}", self.jobs, e)))?;

        let outcomes: Vec<(PathBuf, Result<T>)> = pool.install(|| {
            files
                .par_iter()
                .map(|file| {
                    let outcome = processor(file);
                    pb.inc(1);
                    (file.path.clone(), outcome)
                })
                .collect()
        });

        pb.finish_and_clear();

        let mut result = BatchResult {
            successes: Vec::new(),
            failures: Vec::new(),
        };
        for (path, outcome) in outcomes {
            match outcome {
                Ok(value) => result.successes.push((path, value)),
                Err(e) => result.failures.push((path, e.to_string())),
            }
        }
        result.successes.sort_by(|a, b| a.0.cmp(&b.0));
        result.failures.sort_by(|a, b| a.0.cmp(&b.0));

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bandkit::parsers::FileFormat;

    #[test]
    fn test_run_collects_failures_per_file() {
        let files = vec![
            OutputFile {
                path: PathBuf::from("b/vasprun.xml"),
                format: FileFormat::Vasprun,
            },
            OutputFile {
                path: PathBuf::from("a/vasprun.xml"),
                format: FileFormat::Vasprun,
            },
            OutputFile {
                path: PathBuf::from("c/vasprun.xml"),
                format: FileFormat::Vasprun,
            },
        ];

        let runner = BatchRunner::new(2);
        let result = runner
            .run(files, |file| {
                if file.path.starts_with("c") {
                    Err(BandkitError::DataError("no bands".to_string()))
                } else {
                    Ok(file.path.display().to_string().len())
                }
            })
            .unwrap();

        assert_eq!(result.total(), 3);
        assert_eq!(result.successes.len(), 2);
        assert_eq!(result.successes[0].0, PathBuf::from("a/vasprun.xml"));
        assert_eq!(result.failures.len(), 1);
        assert!(result.failures[0].1.contains("no bands"));
    }

    #[test]
    fn test_zero_jobs_uses_all_cpus() {
        assert_eq!(BatchRunner::new(0).jobs(), num_cpus::get());
        assert_eq!(BatchRunner::new(3).jobs(), 3);
    }
}
