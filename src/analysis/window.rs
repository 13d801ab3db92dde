//! # 能量窗口能带计数
//!
//! 统计完全落在能量窗口内的能带数和部分进入窗口的能带数，
//! 用于后续计算（如 Wannier 投影）中截断能带数的确定。
//!
//! ## 判定规则（严格不等式）
//! ```text
//! 完全在内:  band_min > e_min  且  band_max < e_max
//! 部分重叠:  跨越任一边界，或同时跨越两个边界（只计一次）
//! ```
//!
//! ## 依赖关系
//! - 被 `commands/window.rs` 使用
//! - 使用 `models/electronic.rs`

use crate::error::{BandkitError, Result};
use crate::models::ElectronicStructure;
use serde::Serialize;

/// 窗口计数结果
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct WindowCount {
    /// 完全在窗口内的能带数
    pub fully_inside: usize,
    /// 部分进入窗口的能带数
    pub partial: usize,
}

impl From<WindowCount> for (usize, usize) {
    fn from(count: WindowCount) -> Self {
        (count.fully_inside, count.partial)
    }
}

/// 统计指定自旋通道在 `(energy_min, energy_max)` 窗口内的能带
pub fn count_in_window(
    structure: &ElectronicStructure,
    spin: usize,
    energy_min: f64,
    energy_max: f64,
) -> Result<WindowCount> {
    structure.check_spin(spin)?;

    if !energy_min.is_finite() || !energy_max.is_finite() || energy_min >= energy_max {
        return Err(BandkitError::InvalidArgument(format!(
            "energy window [{}, {}] must be finite with min < max",
            energy_min, energy_max
        )));
    }

    structure.ensure_analyzable()?;
    let levels = structure.sorted_levels(spin)?;

    let mut count = WindowCount::default();
    for band in 0..structure.num_bands() {
        let (band_min, band_max) = levels.iter().map(|k| k[band]).fold(
            (f64::INFINITY, f64::NEG_INFINITY),
            |(lo, hi), e| (lo.min(e), hi.max(e)),
        );

        let crosses = |bound: f64| band_min < bound && band_max > bound;

        if band_min > energy_min && band_max < energy_max {
            count.fully_inside += 1;
        } else if crosses(energy_min) || crosses(energy_max) {
            count.partial += 1;
        }
    }

    Ok(count)
}
