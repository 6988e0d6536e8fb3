//! # wannier 命令实现
//!
//! 从 EIGENVAL 计算 disentanglement 窗口并写回 `.win` 文件。
//!
//! ## 流程
//! 1. 读取 EIGENVAL，报告自旋情况与 HOMO/LUMO
//! 2. 校验 `-w` 与 `num_wann`，计算冻结窗口
//! 3. 校验 `-b` 与 `num_bands`，计算外窗口
//! 4. 重写 `.win`（`--dry-run` 时只打印）
//!
//! ## 依赖关系
//! - 使用 `cli/wannier.rs` 定义的参数
//! - 使用 `parsers/eigenval.rs`, `parsers/win.rs`, `wannier/window.rs`

use crate::cli::wannier::WannierArgs;
use crate::commands::{read_text, require_file, write_text};
use crate::error::{Result, VasputilError};
use crate::parsers::eigenval::parse_eigenval_file;
use crate::parsers::win::{read_keyword_usize, rewrite_disentanglement, WINDOW_KEYS};
use crate::utils::output;
use crate::wannier::{check_band_range, DisentanglementWindow};

/// 执行 wannier 命令
pub fn execute(args: WannierArgs) -> Result<()> {
    let mlwf = pair(&args.mlwf, "-w")?;
    let bands = pair(&args.bands, "-b")?;

    require_file(&args.file)?;
    require_file(&args.eigenval)?;

    let eig = parse_eigenval_file(&args.eigenval)?;
    if eig.spin_polarized {
        output::print_info("This calculation is spin-polarized (ISPIN=2)");
    } else {
        output::print_info("This calculation is non-spin-polarized (ISPIN=1) or SOC");
    }
    let spin = if eig.spin_polarized { args.spin } else { None };

    let homo = eig.homo_index(spin)?;
    output::print_header("Band information");
    output::print_value("Electrons", eig.num_electrons);
    output::print_value("k-points", eig.num_kpoints);
    output::print_value("Total bands", eig.num_bands);
    output::print_value("HOMO index", homo);
    output::print_value("LUMO index", homo + 1);

    let win_path = args.file.display().to_string();
    let content = read_text(&args.file)?;

    let num_wann = read_keyword_usize(&content, "num_wann", &win_path)?;
    output::print_value("num_wann", num_wann);
    check_band_range("-w", "num_wann", mlwf, num_wann)?;

    let num_bands = read_keyword_usize(&content, "num_bands", &win_path)?;
    output::print_value("num_bands", num_bands);
    check_band_range("-b", "num_bands", bands, num_bands)?;

    let window = DisentanglementWindow::compute(&eig, spin, mlwf, bands, args.margin)?;
    print_window(&window);

    if args.dry_run {
        output::print_skip(&format!("Dry run: '{}' left unchanged", win_path));
        return Ok(());
    }

    write_text(&args.file, &rewrite_disentanglement(&content, window.values()))?;
    output::print_done(&format!("Disentanglement windows written to '{}'", win_path));
    Ok(())
}

fn pair(values: &[usize], option: &str) -> Result<(usize, usize)> {
    match values {
        [first, last] => Ok((*first, *last)),
        _ => Err(VasputilError::InvalidArgument(format!(
            "{} expects exactly two band indices",
            option
        ))),
    }
}

fn print_window(window: &DisentanglementWindow) {
    output::print_header("Disentanglement windows");
    let notes = [
        "covers all conduction bands",
        "covers all valence bands",
        "covers all conduction bands",
        "covers all valence bands",
    ];
    for ((key, value), note) in WINDOW_KEYS.iter().zip(window.values()).zip(notes) {
        match value {
            Some(v) => output::print_value(key, format!("{:.6}", v)),
            None => output::print_value(key, note),
        }
    }
}
