//! # 电子结构数据模型
//!
//! 存储从 vaspout.h5 / vasprun.xml 解析出的本征值、k 点、费米能级和占据数。
//!
//! ## 数组约定
//! ```text
//! eigenvalues[spin][kpoint][band]   (eV)
//! occupations[spin][kpoint][band]   (可选，形状与 eigenvalues 相同)
//! kpoints[kpoint] = [k1, k2, k3]    (倒空间分数坐标)
//! ```
//!
//! 同一 k 点上的能带不保证按能量升序排列，依赖升序的算法必须先调用
//! [`ElectronicStructure::sorted_levels`]。
//!
//! ## 依赖关系
//! - 被 `parsers/vaspout.rs`, `parsers/vasprun.rs` 构造
//! - 被 `analysis/` 所有分析器只读使用

use crate::error::{BandkitError, Result};
use serde::Serialize;

/// 解析得到的电子结构，构造后不可变
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ElectronicStructure {
    eigenvalues: Vec<Vec<Vec<f64>>>,
    kpoints: Vec<[f64; 3]>,
    fermi_energy: f64,
    occupations: Option<Vec<Vec<Vec<f64>>>>,
}

impl ElectronicStructure {
    /// 校验数组形状并构造电子结构
    pub fn new(
        eigenvalues: Vec<Vec<Vec<f64>>>,
        kpoints: Vec<[f64; 3]>,
        fermi_energy: f64,
        occupations: Option<Vec<Vec<Vec<f64>>>>,
    ) -> Result<Self> {
        let num_spins = eigenvalues.len();
        if !(1..=2).contains(&num_spins) {
            return Err(BandkitError::DataError(format!(
                "expected 1 or 2 spin channels, found {}",
                num_spins
            )));
        }

        if !fermi_energy.is_finite() {
            return Err(BandkitError::DataError(format!(
                "Fermi energy is not finite: {}",
                fermi_energy
            )));
        }

        let num_kpoints = eigenvalues[0].len();
        let num_bands = eigenvalues[0].first().map_or(0, |k| k.len());
        check_shape(&eigenvalues, num_kpoints, num_bands, "eigenvalues")?;

        if kpoints.len() != num_kpoints {
            return Err(BandkitError::DataError(format!(
                "{} k-point coordinates given for {} k-points of eigenvalues",
                kpoints.len(),
                num_kpoints
            )));
        }

        for (spin, channel) in eigenvalues.iter().enumerate() {
            for (k, levels) in channel.iter().enumerate() {
                if let Some(e) = levels.iter().find(|e| !e.is_finite()) {
                    return Err(BandkitError::DataError(format!(
                        "non-finite eigenvalue {} at spin {}, k-point {}",
                        e, spin, k
                    )));
                }
            }
        }

        if let Some(occ) = &occupations {
            if occ.len() != num_spins {
                return Err(BandkitError::DataError(format!(
                    "occupations have {} spin channels, eigenvalues have {}",
                    occ.len(),
                    num_spins
                )));
            }
            check_shape(occ, num_kpoints, num_bands, "occupations")?;
        }

        Ok(ElectronicStructure {
            eigenvalues,
            kpoints,
            fermi_energy,
            occupations,
        })
    }

    /// 自旋通道数 (1 或 2)
    pub fn num_spins(&self) -> usize {
        self.eigenvalues.len()
    }

    pub fn num_kpoints(&self) -> usize {
        self.kpoints.len()
    }

    pub fn num_bands(&self) -> usize {
        self.eigenvalues[0].first().map_or(0, |k| k.len())
    }

    pub fn is_spin_polarized(&self) -> bool {
        self.num_spins() == 2
    }

    pub fn fermi_energy(&self) -> f64 {
        self.fermi_energy
    }

    pub fn kpoints(&self) -> &[[f64; 3]] {
        &self.kpoints
    }

    /// 指定自旋通道的本征值 `[kpoint][band]`（原始顺序）
    pub fn eigenvalues(&self, spin: usize) -> Result<&[Vec<f64>]> {
        self.check_spin(spin)?;
        Ok(&self.eigenvalues[spin])
    }

    /// 指定自旋通道的占据数，文件未提供时为 `None`
    pub fn occupations(&self, spin: usize) -> Result<Option<&[Vec<f64>]>> {
        self.check_spin(spin)?;
        Ok(self.occupations.as_ref().map(|occ| occ[spin].as_slice()))
    }

    pub fn has_occupations(&self) -> bool {
        self.occupations.is_some()
    }

    /// 检查自旋通道索引
    pub fn check_spin(&self, spin: usize) -> Result<()> {
        if spin >= self.num_spins() {
            return Err(BandkitError::SpinOutOfRange {
                spin,
                num_spins: self.num_spins(),
            });
        }
        Ok(())
    }

    /// 检查 k 点索引
    pub fn check_kpoint(&self, index: usize) -> Result<()> {
        if index >= self.num_kpoints() {
            return Err(BandkitError::KpointOutOfRange {
                index,
                num_kpoints: self.num_kpoints(),
            });
        }
        Ok(())
    }

    /// 分析前检查：零能带或零 k 点无法分析
    pub fn ensure_analyzable(&self) -> Result<()> {
        if self.num_kpoints() == 0 {
            return Err(BandkitError::DataError("structure has no k-points".to_string()));
        }
        if self.num_bands() == 0 {
            return Err(BandkitError::DataError("structure has no bands".to_string()));
        }
        Ok(())
    }

    /// 每个 k 点上按能量升序排列的能级 `[kpoint][band]`
    pub fn sorted_levels(&self, spin: usize) -> Result<Vec<Vec<f64>>> {
        let channel = self.eigenvalues(spin)?;
        Ok(channel
            .iter()
            .map(|levels| {
                let mut sorted = levels.clone();
                sorted.sort_by(|a, b| a.total_cmp(b));
                sorted
            })
            .collect())
    }
}

/// 检查 `[spin][kpoint][band]` 数组是否规整
fn check_shape(
    data: &[Vec<Vec<f64>>],
    num_kpoints: usize,
    num_bands: usize,
    what: &str,
) -> Result<()> {
    for (spin, channel) in data.iter().enumerate() {
        if channel.len() != num_kpoints {
            return Err(BandkitError::DataError(format!(
                "{} spin {} has {} k-points, expected {}",
                what,
                spin,
                channel.len(),
                num_kpoints
            )));
        }
        for (k, levels) in channel.iter().enumerate() {
            if levels.len() != num_bands {
                return Err(BandkitError::DataError(format!(
                    "{} spin {} k-point {} has {} bands, expected {}",
                    what,
                    spin,
                    k,
                    levels.len(),
                    num_bands
                )));
            }
        }
    }
    Ok(())
}
