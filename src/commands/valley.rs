//! # vp 命令实现
//!
//! 计算 K+ 与 K- 两个谷之间的价带能量差。
//!
//! ## 依赖关系
//! - 使用 `cli/valley.rs` 定义的参数
//! - 使用 `bandkit::analysis::valley`
//! - 使用 `utils/output.rs`

use crate::cli::valley::ValleyArgs;
use crate::utils::output;

use bandkit::analysis::valley_polarization;
use bandkit::parsers::read_output;
use bandkit::Result;
use tabled::{Table, Tabled};

/// 谷劈裂表格行
#[derive(Debug, Clone, Tabled)]
struct ValleyRow {
    #[tabled(rename = "Spin")]
    spin: usize,
    #[tabled(rename = "VBM band")]
    band: usize,
    #[tabled(rename = "E(K+) (eV)")]
    kplus: String,
    #[tabled(rename = "E(K-) (eV)")]
    kminus: String,
    #[tabled(rename = "ΔE (eV)")]
    difference: String,
    #[tabled(rename = "ΔE (meV)")]
    metric: String,
}

/// 执行 vp 命令
pub fn execute(args: ValleyArgs) -> Result<()> {
    output::print_header("Valley Polarization");

    let format = args.format.resolve(&args.file);
    output::print_info(&format!("Reading '{}' as {}", args.file.display(), format));
    let structure = read_output(&args.file, format)?;

    let fermi = args.fermi.unwrap_or_else(|| structure.fermi_energy());
    let splittings = valley_polarization(
        &structure,
        fermi,
        args.vbm.vbms.as_deref(),
        args.point1,
        args.point2,
    )?;

    let kpoints = structure.kpoints();
    output::print_info(&format!(
        "K+ = {}, K- = {}, E_F = {:.4} eV",
        output::format_kpoint(args.point1, &kpoints[args.point1]),
        output::format_kpoint(args.point2, &kpoints[args.point2]),
        fermi
    ));

    let rows: Vec<ValleyRow> = splittings
        .iter()
        .map(|v| ValleyRow {
            spin: v.spin,
            band: v.vbm_index,
            kplus: format!("{:.6}", v.energy_kplus),
            kminus: format!("{:.6}", v.energy_kminus),
            difference: format!("{:.6}", v.energy_difference),
            metric: format!("{:.3}", v.polarization_metric),
        })
        .collect();
    println!("{}\n", Table::new(&rows));

    for v in &splittings {
        output::print_result(
            &format!("valley splitting (spin {})", v.spin),
            &format!("{:.3} meV", v.polarization_metric),
        );
    }

    Ok(())
}
