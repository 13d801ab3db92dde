//! # gap 命令实现
//!
//! 读取输出文件并报告每个自旋通道的带隙。
//!
//! ## 功能
//! - 单文件：带隙、类型及 VBM/CBM 位置表格
//! - 目录：并行分析所有匹配文件，输出汇总表格和 CSV
//!
//! ## 依赖关系
//! - 使用 `cli/gap.rs` 定义的参数
//! - 使用 `bandkit::parsers`, `bandkit::analysis::gap`
//! - 使用 `batch/` 模块进行批量处理
//! - 使用 `utils/output.rs`

use crate::batch::{BatchRunner, OutputCollector};
use crate::cli::gap::GapArgs;
use crate::utils::output;

use bandkit::analysis::{get_gap, GapReport};
use bandkit::parsers::read_output;
use bandkit::{BandkitError, ElectronicStructure, Result};
use std::path::{Path, PathBuf};
use tabled::{Table, Tabled};

/// 带边表格行
#[derive(Debug, Clone, Tabled)]
struct EdgeRow {
    #[tabled(rename = "Spin")]
    spin: usize,
    #[tabled(rename = "Edge")]
    edge: &'static str,
    #[tabled(rename = "Band")]
    band: usize,
    #[tabled(rename = "K-point")]
    kpoint: String,
    #[tabled(rename = "Energy (eV)")]
    energy: String,
}

/// 批量汇总表格行
#[derive(Debug, Clone, Tabled)]
struct SummaryRow {
    #[tabled(rename = "File")]
    file: String,
    #[tabled(rename = "Spin")]
    spin: usize,
    #[tabled(rename = "Gap (eV)")]
    gap: String,
    #[tabled(rename = "Type")]
    kind: String,
}

/// 执行 gap 命令
pub fn execute(args: GapArgs) -> Result<()> {
    output::print_header("Band Gap Analysis");

    if args.file.is_dir() {
        execute_batch(&args)
    } else {
        execute_single(&args)
    }
}

/// 单文件模式
fn execute_single(args: &GapArgs) -> Result<()> {
    let format = args.format.resolve(&args.file);
    output::print_info(&format!(
        "Reading '{}' as {}",
        args.file.display(),
        format
    ));

    let structure = read_output(&args.file, format)?;
    output::print_info(&format!(
        "{} spin channel(s), {} k-points, {} bands, E_F = {:.4} eV",
        structure.num_spins(),
        structure.num_kpoints(),
        structure.num_bands(),
        structure.fermi_energy()
    ));

    let report = get_gap(&structure, !args.quiet, args.vbm.vbms.as_deref())?;

    if !args.quiet {
        let rows = edge_rows(&structure, &report);
        println!("{}\n", Table::new(&rows));
    }

    for spin in &report.spins {
        output::print_result(
            &format!("gap (spin {})", spin.spin),
            &format!("{:.4} eV ({})", spin.gap, spin.kind),
        );
    }

    if report.spins.len() > 1 {
        if let Some(overall) = report.overall() {
            output::print_result(
                "gap (overall)",
                &format!("{:.4} eV ({}, spin {})", overall.gap, overall.kind, overall.spin),
            );
        }
    }

    Ok(())
}

fn edge_rows(structure: &ElectronicStructure, report: &GapReport) -> Vec<EdgeRow> {
    let kpoints = structure.kpoints();
    report
        .spins
        .iter()
        .filter_map(|s| s.edges.as_ref().map(|e| (s.spin, e)))
        .flat_map(|(spin, e)| {
            [
                EdgeRow {
                    spin,
                    edge: "VBM",
                    band: e.vbm_index,
                    kpoint: output::format_kpoint(e.vbm_kpoint, &kpoints[e.vbm_kpoint]),
                    energy: format!("{:.4}", e.vbm_energy),
                },
                EdgeRow {
                    spin,
                    edge: "CBM",
                    band: e.cbm_index,
                    kpoint: output::format_kpoint(e.cbm_kpoint, &kpoints[e.cbm_kpoint]),
                    energy: format!("{:.4}", e.cbm_energy),
                },
            ]
        })
        .collect()
}

/// 批量处理模式
fn execute_batch(args: &GapArgs) -> Result<()> {
    output::print_info(&format!("Batch mode: directory '{}'", args.file.display()));

    let files = OutputCollector::new(args.file.clone())
        .with_pattern(&args.pattern)
        .recursive(args.recursive)
        .with_format(args.format.explicit())
        .collect();

    if files.is_empty() {
        output::print_warning(&format!(
            "No matching files found with pattern '{}'",
            args.pattern
        ));
        return Ok(());
    }

    let runner = BatchRunner::new(args.jobs);
    output::print_info(&format!(
        "Found {} files, using {} parallel jobs",
        files.len(),
        runner.jobs()
    ));

    let vbms = args.vbm.vbms.as_deref();
    let result = runner.run(files, |file| {
        let structure = read_output(&file.path, file.format)?;
        get_gap(&structure, true, vbms)
    })?;

    if !result.successes.is_empty() {
        let rows: Vec<SummaryRow> = result
            .successes
            .iter()
            .flat_map(|(path, report)| {
                report.spins.iter().map(move |s| SummaryRow {
                    file: path.display().to_string(),
                    spin: s.spin,
                    gap: format!("{:.4}", s.gap),
                    kind: s.kind.to_string(),
                })
            })
            .collect();
        println!("{}\n", Table::new(&rows));

        save_summary_csv(&result.successes, &args.output_csv)?;
        output::print_success(&format!(
            "Summary saved to '{}'",
            args.output_csv.display()
        ));
    }

    for (path, err) in &result.failures {
        output::print_warning(&format!("{}: {}", path.display(), err));
    }

    output::print_info(&format!(
        "{} of {} files analyzed successfully",
        result.successes.len(),
        result.total()
    ));

    Ok(())
}

/// 保存批量结果到 CSV
fn save_summary_csv(results: &[(PathBuf, GapReport)], output_path: &Path) -> Result<()> {
    let mut wtr = csv::Writer::from_path(output_path)?;

    wtr.write_record([
        "file",
        "spin",
        "gap_eV",
        "type",
        "vbm_band",
        "vbm_kpoint",
        "cbm_band",
        "cbm_kpoint",
    ])?;

    for (path, report) in results {
        for s in &report.spins {
            let (vbm_band, vbm_kpoint, cbm_band, cbm_kpoint) = match &s.edges {
                Some(e) => (
                    e.vbm_index.to_string(),
                    e.vbm_kpoint.to_string(),
                    e.cbm_index.to_string(),
                    e.cbm_kpoint.to_string(),
                ),
                None => Default::default(),
            };
            wtr.write_record(&[
                path.display().to_string(),
                s.spin.to_string(),
                format!("{:.10}", s.gap),
                s.kind.to_string(),
                vbm_band,
                vbm_kpoint,
                cbm_band,
                cbm_kpoint,
            ])?;
        }
    }

    wtr.flush().map_err(|e| BandkitError::FileWriteError {
        path: output_path.display().to_string(),
        source: e,
    })?;

    Ok(())
}
