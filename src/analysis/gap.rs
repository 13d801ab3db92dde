//! # 带隙分析
//!
//! 对每个自旋通道计算带隙数值、类型（直接/间接/金属）以及 VBM/CBM
//! 所在的能带和 k 点。
//!
//! ## 算法
//! 1. VBM: 覆盖值或在所有 k 点上 ≤ E_F 的最高能带
//! 2. CBM = VBM + 1（升序视图）
//! 3. gap = min_k' E_CBM(k') - max_k E_VBM(k)，负值表示能带交叠，报告为 0 / metallic
//! 4. 极值出现在同一 k 点为 direct，否则 indirect
//!
//! ## 依赖关系
//! - 被 `commands/gap.rs`, `batch/` 使用
//! - 使用 `analysis::resolve_vbm`

use super::resolve_vbm;
use crate::error::Result;
use crate::models::ElectronicStructure;
use serde::Serialize;

/// 带隙类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GapKind {
    Direct,
    Indirect,
    Metallic,
}

impl std::fmt::Display for GapKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GapKind::Direct => write!(f, "direct"),
            GapKind::Indirect => write!(f, "indirect"),
            GapKind::Metallic => write!(f, "metallic"),
        }
    }
}

/// 带边位置
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BandEdges {
    pub vbm_index: usize,
    pub vbm_kpoint: usize,
    pub vbm_energy: f64,
    pub cbm_index: usize,
    pub cbm_kpoint: usize,
    pub cbm_energy: f64,
}

/// 单个自旋通道的带隙
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpinGap {
    pub spin: usize,
    /// 带隙 (eV)，金属为 0
    pub gap: f64,
    pub kind: GapKind,
    /// 仅在 verbose 模式下给出
    pub edges: Option<BandEdges>,
}

/// 所有自旋通道的带隙结果
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GapReport {
    pub spins: Vec<SpinGap>,
}

impl GapReport {
    /// 带隙最小的自旋通道
    pub fn overall(&self) -> Option<&SpinGap> {
        self.spins
            .iter()
            .min_by(|a, b| a.gap.total_cmp(&b.gap))
    }
}

/// 计算每个自旋通道的带隙
///
/// `vbm_override[s]` 给出时替代自旋 `s` 的 VBM 计算；`verbose` 只决定
/// 是否附带带边位置，不影响数值。
pub fn get_gap(
    structure: &ElectronicStructure,
    verbose: bool,
    vbm_override: Option<&[usize]>,
) -> Result<GapReport> {
    structure.ensure_analyzable()?;

    let fermi = structure.fermi_energy();
    let spins = (0..structure.num_spins())
        .map(|spin| {
            let levels = structure.sorted_levels(spin)?;
            let vbm = resolve_vbm(&levels, spin, fermi, vbm_override, true)?;
            Ok(spin_gap(&levels, spin, vbm, verbose))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(GapReport { spins })
}

fn spin_gap(levels: &[Vec<f64>], spin: usize, vbm: usize, verbose: bool) -> SpinGap {
    let cbm = vbm + 1;

    let vbm_max = levels
        .iter()
        .map(|k| k[vbm])
        .fold(f64::NEG_INFINITY, f64::max);
    let cbm_min = levels
        .iter()
        .map(|k| k[cbm])
        .fold(f64::INFINITY, f64::min);

    // 同时取到两个极值的 k 点
    let shared = levels
        .iter()
        .position(|k| k[vbm] == vbm_max && k[cbm] == cbm_min);

    let (vbm_kpoint, cbm_kpoint) = match shared {
        Some(k) => (k, k),
        None => (
            levels.iter().position(|k| k[vbm] == vbm_max).unwrap_or(0),
            levels.iter().position(|k| k[cbm] == cbm_min).unwrap_or(0),
        ),
    };

    let raw_gap = cbm_min - vbm_max;
    let (gap, kind) = if raw_gap < 0.0 {
        (0.0, GapKind::Metallic)
    } else if shared.is_some() {
        (raw_gap, GapKind::Direct)
    } else {
        (raw_gap, GapKind::Indirect)
    };

    let edges = verbose.then(|| BandEdges {
        vbm_index: vbm,
        vbm_kpoint,
        vbm_energy: vbm_max,
        cbm_index: cbm,
        cbm_kpoint,
        cbm_energy: cbm_min,
    });

    SpinGap {
        spin,
        gap,
        kind,
        edges,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{BandkitError, ErrorKind};

    fn structure(eigs: Vec<Vec<Vec<f64>>>, fermi: f64) -> ElectronicStructure {
        let nk = eigs[0].len();
        let kpoints = (0..nk).map(|k| [k as f64 / nk as f64, 0.0, 0.0]).collect();
        ElectronicStructure::new(eigs, kpoints, fermi, None).unwrap()
    }

    #[test]
    fn test_direct_gap_two_kpoints() {
        let es = structure(vec![vec![vec![-1.0, 1.0], vec![-0.5, 0.8]]], 0.0);
        let report = get_gap(&es, true, None).unwrap();

        assert_eq!(report.spins.len(), 1);
        let spin = &report.spins[0];
        assert!((spin.gap - 1.3).abs() < 1e-9);
        assert_eq!(spin.kind, GapKind::Direct);

        let edges = spin.edges.as_ref().unwrap();
        assert_eq!(edges.vbm_index, 0);
        assert_eq!(edges.cbm_index, 1);
        assert_eq!(edges.vbm_kpoint, 1);
        assert_eq!(edges.cbm_kpoint, 1);
        assert!((edges.vbm_energy - (-0.5)).abs() < 1e-12);
        assert!((edges.cbm_energy - 0.8).abs() < 1e-12);
    }

    #[test]
    fn test_indirect_gap() {
        let es = structure(vec![vec![vec![-0.2, 1.5], vec![-0.6, 0.9]]], 0.0);
        let spin = &get_gap(&es, true, None).unwrap().spins[0];

        assert!((spin.gap - 1.1).abs() < 1e-9);
        assert_eq!(spin.kind, GapKind::Indirect);
        let edges = spin.edges.as_ref().unwrap();
        assert_eq!(edges.vbm_kpoint, 0);
        assert_eq!(edges.cbm_kpoint, 1);
    }

    #[test]
    fn test_overlap_reported_as_metallic_zero() {
        // CBM dips below the VBM at another k-point
        let es = structure(
            vec![vec![vec![-2.0, -0.1, 1.0], vec![-1.5, -0.3, -0.2]]],
            -0.05,
        );
        let spin = &get_gap(&es, false, Some(&[1])).unwrap().spins[0];

        assert_eq!(spin.gap, 0.0);
        assert_eq!(spin.kind, GapKind::Metallic);
    }

    #[test]
    fn test_verbose_does_not_change_value() {
        let es = structure(vec![vec![vec![-1.0, 1.0], vec![-0.5, 0.8]]], 0.0);
        let quiet = get_gap(&es, false, None).unwrap();
        let verbose = get_gap(&es, true, None).unwrap();

        assert!(quiet.spins[0].edges.is_none());
        assert_eq!(quiet.spins[0].gap, verbose.spins[0].gap);
        assert_eq!(quiet.spins[0].kind, verbose.spins[0].kind);
    }

    #[test]
    fn test_unsorted_bands_use_sorted_view() {
        let es = structure(vec![vec![vec![1.0, -1.0], vec![0.8, -0.5]]], 0.0);
        let spin = &get_gap(&es, true, None).unwrap().spins[0];

        assert!((spin.gap - 1.3).abs() < 1e-9);
        assert_eq!(spin.kind, GapKind::Direct);
        assert_eq!(spin.edges.as_ref().unwrap().vbm_index, 0);
    }

    #[test]
    fn test_level_at_fermi_counts_as_occupied() {
        let es = structure(vec![vec![vec![-1.0, 0.0, 2.0], vec![-0.5, -0.2, 1.5]]], 0.0);
        let spin = &get_gap(&es, true, None).unwrap().spins[0];

        assert_eq!(spin.edges.as_ref().unwrap().vbm_index, 1);
        assert!((spin.gap - 1.5).abs() < 1e-9);
    }

    #[test]
    fn test_spin_polarized_and_overall() {
        let es = structure(
            vec![
                vec![vec![-1.0, 1.0], vec![-0.5, 0.8]],
                vec![vec![-1.0, 0.6], vec![-0.7, 0.9]],
            ],
            0.0,
        );
        let report = get_gap(&es, false, None).unwrap();

        assert_eq!(report.spins.len(), 2);
        assert!((report.spins[1].gap - 1.3).abs() < 1e-9);
        assert_eq!(report.spins[1].kind, GapKind::Indirect);
        let overall = report.overall().unwrap();
        assert!((overall.gap - 1.3).abs() < 1e-9);
    }

    #[test]
    fn test_override_out_of_range_names_spin() {
        let es = structure(
            vec![
                vec![vec![-1.0, 1.0], vec![-0.5, 0.8]],
                vec![vec![-1.0, 0.6], vec![-0.7, 0.9]],
            ],
            0.0,
        );
        match get_gap(&es, false, Some(&[0, 1])).unwrap_err() {
            BandkitError::VbmOverrideOutOfRange { spin, index, num_bands } => {
                assert_eq!(spin, 1);
                assert_eq!(index, 1);
                assert_eq!(num_bands, 2);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_empty_structure_is_data_error() {
        let es = ElectronicStructure::new(vec![vec![]], vec![], 0.0, None).unwrap();
        assert_eq!(get_gap(&es, false, None).unwrap_err().kind(), ErrorKind::Data);
    }

    #[test]
    fn test_gap_kind_display() {
        assert_eq!(GapKind::Direct.to_string(), "direct");
        assert_eq!(GapKind::Indirect.to_string(), "indirect");
        assert_eq!(GapKind::Metallic.to_string(), "metallic");
    }
}
