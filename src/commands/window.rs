//! # nbands-ewin 命令实现
//!
//! 统计完全 / 部分落在能量窗口内的能带数。
//! 窗口边界相对 `--fermi` 给出；`--fermi` 默认为 0，即绝对能量。
//!
//! ## 依赖关系
//! - 使用 `cli/window.rs` 定义的参数
//! - 使用 `bandkit::analysis::window`
//! - 使用 `utils/output.rs`

use crate::cli::window::WindowArgs;
use crate::utils::output;

use bandkit::analysis::count_in_window;
use bandkit::parsers::read_output;
use bandkit::{BandkitError, Result};

/// 执行 nbands-ewin 命令
pub fn execute(args: WindowArgs) -> Result<()> {
    output::print_header("Energy Window Band Count");

    let (emin, emax) = window_bounds(&args)?;

    let format = args.format.resolve(&args.file);
    output::print_info(&format!("Reading '{}' as {}", args.file.display(), format));
    let structure = read_output(&args.file, format)?;

    let spin = usize::from(args.spin);
    let count = count_in_window(&structure, spin, emin, emax)?;

    output::print_info(&format!(
        "Window [{:.4}, {:.4}] eV, spin {}, {} bands",
        emin,
        emax,
        spin,
        structure.num_bands()
    ));
    output::print_result(
        &format!("bands fully in the energy window for spin {}", spin),
        &count.fully_inside.to_string(),
    );
    output::print_result(
        &format!("bands partly in the energy window for spin {}", spin),
        &count.partial.to_string(),
    );

    Ok(())
}

/// 平移到绝对能量的窗口边界
fn window_bounds(args: &WindowArgs) -> Result<(f64, f64)> {
    match args.energy_windows.as_slice() {
        [lo, hi] => Ok((lo + args.fermi, hi + args.fermi)),
        other => Err(BandkitError::InvalidArgument(format!(
            "expected two energy window bounds, got {}",
            other.len()
        ))),
    }
}
