//! # 分析模块
//!
//! 基于 [`ElectronicStructure`] 的纯函数分析，互相独立：
//! - `gap`: 带隙数值、类型和带边位置
//! - `window`: 能量窗口内的能带计数
//! - `valley`: 两个谷之间的价带能量差（谷极化）
//!
//! 所有分析中的能带索引 `b` 均指每个 k 点按能量升序排列后的第 `b` 个能级。
//!
//! ## 依赖关系
//! - 被 `commands/`, `batch/` 使用
//! - 使用 `models/electronic.rs`

pub mod gap;
pub mod valley;
pub mod window;

pub use gap::{get_gap, BandEdges, GapKind, GapReport, SpinGap};
pub use valley::{valley_polarization, ValleySplitting, VALLEY_ENERGY_SCALE};
pub use window::{count_in_window, WindowCount};

use crate::error::{BandkitError, Result};

/// 确定某自旋通道的 VBM 能带索引
///
/// `overrides[spin]` 存在时直接使用；否则取在所有 k 点上能量都 ≤ `fermi`
/// 的最高能带（恰好等于费米能级视为占据）。
/// `need_conduction` 为真时要求 VBM 之上至少还有一条能带。
pub(crate) fn resolve_vbm(
    levels: &[Vec<f64>],
    spin: usize,
    fermi: f64,
    overrides: Option<&[usize]>,
    need_conduction: bool,
) -> Result<usize> {
    let num_bands = levels.first().map_or(0, |k| k.len());
    let limit = if need_conduction {
        num_bands.saturating_sub(1)
    } else {
        num_bands
    };

    if let Some(&index) = overrides.and_then(|o| o.get(spin)) {
        if index >= limit {
            return Err(BandkitError::VbmOverrideOutOfRange {
                spin,
                index,
                num_bands,
            });
        }
        return Ok(index);
    }

    // 升序视图中 ≤ fermi 的能级构成前缀
    let occupied = levels
        .iter()
        .map(|k| k.iter().take_while(|e| **e <= fermi).count())
        .min()
        .unwrap_or(0);

    if occupied == 0 {
        return Err(BandkitError::DataError(format!(
            "spin {}: no band lies at or below the Fermi energy ({:.4} eV) at every k-point",
            spin, fermi
        )));
    }

    let vbm = occupied - 1;
    if vbm >= limit {
        return Err(BandkitError::DataError(format!(
            "spin {}: all {} bands are occupied, no conduction band available",
            spin, num_bands
        )));
    }

    Ok(vbm)
}
