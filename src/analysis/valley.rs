//! # 谷极化计算
//!
//! 计算价带顶能带在 K+ 与 K- 两个谷之间的能量差：
//! ```text
//! ΔE = E_VBM(K+) - E_VBM(K-)          (eV)
//! P  = ΔE / VALLEY_ENERGY_SCALE        (meV)
//! ```
//! 交换 K+ 与 K- 时两者都变号。
//!
//! ## 依赖关系
//! - 被 `commands/valley.rs` 使用
//! - 使用 `analysis::resolve_vbm`

use super::resolve_vbm;
use crate::error::Result;
use crate::models::ElectronicStructure;
use serde::Serialize;

/// 极化度量的能量标度 (eV)，度量值即以 meV 表示的谷劈裂
pub const VALLEY_ENERGY_SCALE: f64 = 1.0e-3;

/// 单个自旋通道的谷劈裂
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValleySplitting {
    pub spin: usize,
    pub vbm_index: usize,
    pub energy_kplus: f64,
    pub energy_kminus: f64,
    /// E(K+) - E(K-) (eV)
    pub energy_difference: f64,
    /// energy_difference / VALLEY_ENERGY_SCALE
    pub polarization_metric: f64,
}

/// 计算每个自旋通道的谷极化
///
/// `fermi` 用于确定 VBM（可与文件中的费米能级不同），
/// `vbms[s]` 给出时替代自旋 `s` 的 VBM。
pub fn valley_polarization(
    structure: &ElectronicStructure,
    fermi: f64,
    vbms: Option<&[usize]>,
    kplus_index: usize,
    kminus_index: usize,
) -> Result<Vec<ValleySplitting>> {
    structure.check_kpoint(kplus_index)?;
    structure.check_kpoint(kminus_index)?;
    structure.ensure_analyzable()?;

    (0..structure.num_spins())
        .map(|spin| {
            let levels = structure.sorted_levels(spin)?;
            let vbm = resolve_vbm(&levels, spin, fermi, vbms, false)?;

            let energy_kplus = levels[kplus_index][vbm];
            let energy_kminus = levels[kminus_index][vbm];
            let energy_difference = energy_kplus - energy_kminus;

            Ok(ValleySplitting {
                spin,
                vbm_index: vbm,
                energy_kplus,
                energy_kminus,
                energy_difference,
                polarization_metric: energy_difference / VALLEY_ENERGY_SCALE,
            })
        })
        .collect()
}
