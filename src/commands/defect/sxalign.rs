//! # sxdefectalign2d 迭代对齐
//!
//! 对每个 shift 运行一次 sxdefectalign2d，读取生成的 `vline-eV.dat`，
//! 绘制 Vmod/Vdft/Vsr 曲线并保存数据副本。
//!
//! 单个 shift 失败时报告错误并继续；找不到程序时直接终止。
//!
//! ## 依赖关系
//! - 使用 `cli/defect.rs` 的 SxalignArgs
//! - 使用 `defects/vline.rs` 读取与绘图
//! - 使用 `utils/progress.rs` 的 spinner

use crate::cli::defect::SxalignArgs;
use crate::commands::{ensure_dir, require_file};
use crate::defects::{generate_vline_plot, parse_vline_file};
use crate::error::{Result, VasputilError};
use crate::utils::{output, progress};

use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use std::process::Command;

/// sxdefectalign2d 输出的势能曲线文件
const VLINE_FILE: &str = "vline-eV.dat";

/// 单次扫描允许的 shift 个数上限
const MAX_SHIFTS: usize = 10_000;

/// 执行 sxalign 命令
pub fn execute(args: SxalignArgs) -> Result<()> {
    let shifts = shift_values(&args.shifts)?;

    require_file(&args.vdef)?;
    require_file(&args.vref)?;
    ensure_dir(&args.figs)?;

    output::print_header("sxdefectalign2d shift scan");
    output::print_value("ecut (Ry)", args.ecut);
    output::print_value("vdef", args.vdef.display());
    output::print_value("vref", args.vref.display());
    output::print_value(
        "shifts",
        shifts.iter().map(|s| s.to_string()).collect::<Vec<_>>().join(", "),
    );

    let summary = scan_shifts(&args, &shifts, Path::new("."))?;

    output::print_separator();
    output::print_done(&format!(
        "Processing complete: {} succeeded, {} failed",
        summary.succeeded, summary.failed
    ));
    Ok(())
}

/// 扫描结果计数
#[derive(Debug, Default, PartialEq, Eq)]
struct ScanSummary {
    succeeded: usize,
    failed: usize,
}

/// 依次处理每个 shift；只有找不到程序时提前返回
fn scan_shifts(args: &SxalignArgs, shifts: &[f64], workdir: &Path) -> Result<ScanSummary> {
    let mut summary = ScanSummary::default();

    for shift in shifts {
        output::print_info(&format!("Processing shift value: {}", shift));
        match run_shift(args, *shift, workdir) {
            Ok(plot) => {
                summary.succeeded += 1;
                output::print_success(&format!("Saved: {}", plot));
            }
            Err(e @ VasputilError::CommandNotFound { .. }) => return Err(e),
            Err(e) => {
                summary.failed += 1;
                output::print_error(&format!("shift {}: {}", shift, e));
            }
        }
    }

    Ok(summary)
}

/// 生成 `[start, stop)` 内步长为 `step` 的 shift 序列
fn shift_values(range: &[f64]) -> Result<Vec<f64>> {
    let (start, stop, step) = match range {
        [start, stop, step] => (*start, *stop, *step),
        _ => {
            return Err(VasputilError::InvalidArgument(
                "--shifts expects START STOP STEP".to_string(),
            ))
        }
    };

    if step.is_nan() || step <= 0.0 {
        return Err(VasputilError::InvalidArgument(format!(
            "--shifts step must be positive, got {}",
            step
        )));
    }

    let count = ((stop - start) / step).ceil();
    if !count.is_finite() || count > MAX_SHIFTS as f64 {
        return Err(VasputilError::InvalidArgument(format!(
            "--shifts {} {} {} gives too many values (limit {})",
            start, stop, step, MAX_SHIFTS
        )));
    }
    if count < 1.0 {
        return Err(VasputilError::InvalidArgument(format!(
            "--shifts {} {} {} is an empty range",
            start, stop, step
        )));
    }

    Ok((0..count as usize).map(|k| start + k as f64 * step).collect())
}

/// 运行一次 sxdefectalign2d，返回图片路径
fn run_shift(args: &SxalignArgs, shift: f64, workdir: &Path) -> Result<String> {
    let shift_str = shift.to_string();
    let command_line = format!(
        "{} --ecut {} --vdef {} --vref {} --vasp --shift {}",
        args.program,
        args.ecut,
        args.vdef.display(),
        args.vref.display(),
        shift_str
    );

    // 上一个 shift 留下的曲线文件不能被当作本次结果
    let vline_path = workdir.join(VLINE_FILE);
    match fs::remove_file(&vline_path) {
        Ok(()) => {}
        Err(e) if e.kind() == ErrorKind::NotFound => {}
        Err(e) => {
            return Err(VasputilError::FileWriteError {
                path: vline_path.display().to_string(),
                source: e,
            })
        }
    }

    let result = progress::with_spinner(&format!("Running {}", args.program), || {
        Command::new(&args.program)
            .current_dir(workdir)
            .arg("--ecut")
            .arg(args.ecut.to_string())
            .arg("--vdef")
            .arg(&args.vdef)
            .arg("--vref")
            .arg(&args.vref)
            .arg("--vasp")
            .arg("--shift")
            .arg(&shift_str)
            .args(&args.extra)
            .output()
    });

    let out = match result {
        Ok(out) => out,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Err(VasputilError::CommandNotFound {
                command: args.program.clone(),
            })
        }
        Err(e) => {
            return Err(VasputilError::CommandFailed {
                command: command_line,
                stderr: e.to_string(),
            })
        }
    };

    if !out.status.success() {
        return Err(VasputilError::CommandFailed {
            command: command_line,
            stderr: String::from_utf8_lossy(&out.stderr).trim().to_string(),
        });
    }

    let data = parse_vline_file(&vline_path)?;

    let plot_path = args.figs.join(format!("plot_{}.png", shift_str));
    generate_vline_plot(
        &data,
        &plot_path,
        &format!("shift = {}", shift_str),
        args.width,
        args.height,
    )?;

    let copy_path = args.figs.join(format!("vline_{}.dat", shift_str));
    fs::copy(&vline_path, &copy_path).map_err(|e| VasputilError::FileWriteError {
        path: copy_path.display().to_string(),
        source: e,
    })?;

    Ok(plot_path.display().to_string())
}
