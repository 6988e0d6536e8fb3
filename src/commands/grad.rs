//! # grad 命令实现
//!
//! 逐行读取 OUTCAR，每完成一个离子步输出一行汇总：
//! 能量、dE、电子步数、平均/最大受力、体积、磁矩、耗时。
//!
//! ## 行颜色
//! - 红：电子步数达到 NELM（未收敛）
//! - 绿：dE ≤ 0
//! - 黄：能量上升
//!
//! ## 依赖关系
//! - 使用 `cli/grad.rs` 定义的参数
//! - 使用 `parsers/outcar.rs`, `parsers/poscar.rs`
//! - 使用 `utils/output.rs`

use crate::cli::grad::GradArgs;
use crate::commands::require_file;
use crate::error::{Result, VasputilError};
use crate::models::IonicStep;
use crate::parsers::outcar::{MonitorEvent, RelaxationMonitor};
use crate::parsers::poscar;
use crate::utils::output::{self, RowColor};

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

/// 执行 grad 命令
pub fn execute(args: GradArgs) -> Result<()> {
    require_file(&args.outcar)?;

    let poscar_path = args
        .poscar
        .clone()
        .unwrap_or_else(|| default_poscar(&args.outcar));
    let relaxed = relaxed_atoms(&poscar_path);

    if args.verbose {
        output::print_info(&format!("OUTCAR: {}", args.outcar.display()));
        match &relaxed {
            Some(indices) => output::print_info(&format!(
                "Forces averaged over {} relaxed atom(s) from '{}'",
                indices.len(),
                poscar_path.display()
            )),
            None => output::print_info("Forces averaged over all atoms"),
        }
    }

    let file = File::open(&args.outcar).map_err(|e| VasputilError::FileReadError {
        path: args.outcar.display().to_string(),
        source: e,
    })?;

    let mut monitor = RelaxationMonitor::new(relaxed);
    let mut steps: Vec<IonicStep> = Vec::new();

    for line in BufReader::new(file).lines() {
        let line = line.map_err(|e| VasputilError::FileReadError {
            path: args.outcar.display().to_string(),
            source: e,
        })?;

        match monitor.feed_line(&line) {
            Some(MonitorEvent::Step(step)) => {
                if steps.is_empty() {
                    if args.verbose {
                        print_parameters(&monitor);
                    }
                    println!("{}", header_line(monitor.spin_polarized));
                }
                let color = row_color(&step, monitor.params.nelm);
                println!("{}", output::paint_row(&format_row(&step), color));
                steps.push(step);
            }
            Some(MonitorEvent::Unreadable { step }) => {
                output::print_warning(&format!(
                    "Ionic step {} closed before any energy was written; skipped",
                    step
                ));
            }
            None => {}
        }
    }

    if steps.is_empty() {
        output::print_warning("No completed ionic step found yet");
        return Ok(());
    }

    let total_minutes: f64 = steps.iter().filter_map(|s| s.ionic_minutes).sum();
    output::print_separator();
    output::print_done(&format!(
        "{} ionic step(s), {:.2} min total",
        steps.len(),
        total_minutes
    ));

    if let Some(csv_path) = &args.csv {
        save_steps_csv(&steps, csv_path)?;
        output::print_success(&format!("Ionic steps saved to '{}'", csv_path.display()));
    }

    Ok(())
}

/// OUTCAR 同目录下的 POSCAR
fn default_poscar(outcar: &Path) -> PathBuf {
    match outcar.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.join("POSCAR"),
        _ => PathBuf::from("POSCAR"),
    }
}

/// 读取可弛豫原子；无 Selective dynamics 时返回 None（全部原子）
fn relaxed_atoms(poscar_path: &Path) -> Option<Vec<usize>> {
    match poscar::parse_poscar_file(poscar_path) {
        Ok(crystal) if crystal.has_selective_dynamics() => Some(
            (0..crystal.atoms.len())
                .filter(|&i| crystal.is_relaxed(i))
                .collect(),
        ),
        Ok(_) => None,
        Err(e) => {
            output::print_warning(&format!(
                "Cannot read constraints ({}); forces are averaged over all atoms",
                e
            ));
            None
        }
    }
}

fn print_parameters(monitor: &RelaxationMonitor) {
    let show = |v: Option<String>| v.unwrap_or_else(|| "-".to_string());
    output::print_value("NIONS", show(monitor.params.nions.map(|n| n.to_string())));
    output::print_value("NELM", show(monitor.params.nelm.map(|n| n.to_string())));
    output::print_value("EDIFF", show(monitor.params.ediff.map(|e| format!("{:.1E}", e))));
    output::print_value("ISPIN", if monitor.spin_polarized { 2 } else { 1 });
}

fn header_line(spin_polarized: bool) -> String {
    let mut line = format!(
        "{:>5} {:>15} {:>12} {:>4} {:>9} {:>9} {:>10}",
        "Step", "E (eV)", "dE (eV)", "SCF", "Avg|F|", "Max|F|", "Vol (A^3)"
    );
    if spin_polarized {
        line.push_str(&format!(" {:>9}", "Mag"));
    }
    line.push_str(&format!(" {:>8} {:>8}", "SCF min", "Ion min"));
    line
}

fn format_row(step: &IonicStep) -> String {
    let mut line = format!(
        "{:>5} {:>15.6} {:>12.6} {:>4} {:>9.4} {:>9.4} {:>10.3}",
        step.step,
        step.energy,
        step.delta_e,
        step.scf_steps,
        step.avg_force,
        step.max_force,
        step.volume
    );
    if let Some(mag) = step.magnetization {
        line.push_str(&format!(" {:>9.4}", mag));
    }
    let ionic = step
        .ionic_minutes
        .map(|m| format!("{:.2}", m))
        .unwrap_or_else(|| "-".to_string());
    line.push_str(&format!(" {:>8.2} {:>8}", step.scf_minutes, ionic));
    line
}

fn row_color(step: &IonicStep, nelm: Option<usize>) -> RowColor {
    if step.hit_nelm(nelm) {
        RowColor::Bad
    } else if step.delta_e <= 0.0 {
        RowColor::Good
    } else {
        RowColor::Uphill
    }
}

/// 保存离子步到 CSV
fn save_steps_csv(steps: &[IonicStep], output_path: &Path) -> Result<()> {
    let mut wtr = csv::Writer::from_path(output_path)?;
    for step in steps {
        wtr.serialize(step)?;
    }
    wtr.flush().map_err(|e| VasputilError::FileWriteError {
        path: output_path.display().to_string(),
        source: e,
    })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn step(delta_e: f64, scf_steps: usize) -> IonicStep {
        IonicStep {
            step: 2,
            energy: -10.0,
            delta_e,
            scf_steps,
            avg_force: 0.1,
            max_force: 0.2,
            volume: 100.0,
            magnetization: None,
            scf_minutes: 1.5,
            ionic_minutes: None,
        }
    }

    #[test]
    fn test_row_color() {
        assert_eq!(row_color(&step(-0.1, 10), Some(60)), RowColor::Good);
        assert_eq!(row_color(&step(0.0, 10), Some(60)), RowColor::Good);
        assert_eq!(row_color(&step(0.1, 10), Some(60)), RowColor::Uphill);
        assert_eq!(row_color(&step(-0.1, 60), Some(60)), RowColor::Bad);
        assert_eq!(row_color(&step(0.1, 60), None), RowColor::Uphill);
    }

    #[test]
    fn test_row_shows_unknown_ionic_time() {
        let row = format_row(&step(0.0, 5));
        assert!(row.trim_end().ends_with('-'));
        assert!(!header_line(false).contains("Mag"));
        assert!(header_line(true).contains("Mag"));
    }

    #[test]
    fn test_default_poscar_next_to_outcar() {
        assert_eq!(default_poscar(Path::new("OUTCAR")), PathBuf::from("POSCAR"));
        assert_eq!(
            default_poscar(Path::new("run/relax/OUTCAR")),
            PathBuf::from("run/relax/POSCAR")
        );
    }

    #[test]
    fn test_csv_export() {
        let path = std::env::temp_dir().join("vasputil_grad_steps.csv");
        save_steps_csv(&[step(0.0, 5), step(0.5, 6)], &path).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        let mut lines = text.lines();
        assert!(lines.next().unwrap().starts_with("step,energy,delta_e"));
        assert_eq!(text.lines().count(), 3);
    }
}
