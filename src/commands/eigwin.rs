//! # eigwin 命令实现
//!
//! - `-e BAND`: 打印总能带数、HOMO/LUMO 序号和该能带在所有 k 点上的能量范围
//! - `-n E1 E2`: 按 k 点列出落在 [E1, E2] 内的能带数
//!
//! ## 依赖关系
//! - 使用 `cli/eigwin.rs` 定义的参数
//! - 使用 `parsers/eigenval.rs`, `models/bands.rs`
//! - 使用 `tabled` 打印表格，`csv` 导出

use crate::cli::eigwin::EigwinArgs;
use crate::commands::require_file;
use crate::error::{Result, VasputilError};
use crate::models::{Eigenval, Spin};
use crate::parsers::eigenval::parse_eigenval_file;
use crate::utils::output;

use std::path::Path;
use tabled::{Table, Tabled};

#[derive(Debug, Clone, Tabled)]
struct WindowRow {
    #[tabled(rename = "ik")]
    ik: usize,
    #[tabled(rename = "nbnd")]
    nbnd: usize,
}

/// 执行 eigwin 命令
pub fn execute(args: EigwinArgs) -> Result<()> {
    require_file(&args.file)?;
    let eig = parse_eigenval_file(&args.file)?;
    let spin = effective_spin(&eig, args.spin);

    if let Some(band) = args.band {
        return print_band_range(&eig, band, spin);
    }

    match args.window.as_deref() {
        Some([e1, e2]) => print_window_counts(&eig, *e1, *e2, spin, args.csv.as_deref()),
        _ => Err(VasputilError::InvalidArgument(
            "Provide either '-e BAND' or '-n E1 E2'".to_string(),
        )),
    }
}

/// 非极化计算忽略自旋参数（给出警告）
fn effective_spin(eig: &Eigenval, spin: Option<Spin>) -> Option<Spin> {
    if !eig.spin_polarized {
        if let Some(s) = spin {
            output::print_warning(&format!(
                "Non-spin-polarized EIGENVAL; ignoring '-s {}'",
                s
            ));
        }
        return None;
    }
    spin
}

fn print_band_range(eig: &Eigenval, band: usize, spin: Option<Spin>) -> Result<()> {
    for line in band_range_lines(eig, band, spin)? {
        println!("{}", line);
    }
    Ok(())
}

/// `key = value` 行，供下游脚本 grep
fn band_range_lines(eig: &Eigenval, band: usize, spin: Option<Spin>) -> Result<Vec<String>> {
    let homo = eig.homo_index(spin)?;
    let (emin, emax) = eig.band_range(band, spin)?;

    Ok(vec![
        format!("Tot_bands = {}", eig.num_bands),
        format!("homo_index = {}", homo),
        format!("lumo_index = {}", homo + 1),
        format!("emin = {:.6}", emin),
        format!("emax = {:.6}", emax),
    ])
}

fn print_window_counts(
    eig: &Eigenval,
    e1: f64,
    e2: f64,
    spin: Option<Spin>,
    csv_path: Option<&Path>,
) -> Result<()> {
    let counts = eig.bands_in_window(e1, e2, spin)?;
    let rows: Vec<WindowRow> = counts
        .iter()
        .enumerate()
        .map(|(i, &n)| WindowRow { ik: i + 1, nbnd: n })
        .collect();

    output::print_header(&format!("Bands in [{}, {}] eV", e1, e2));
    println!("{}", Table::new(&rows));

    if let Some(path) = csv_path {
        save_counts_csv(&rows, path)?;
        output::print_success(&format!("Band counts saved to '{}'", path.display()));
    }
    Ok(())
}

fn save_counts_csv(rows: &[WindowRow], output_path: &Path) -> Result<()> {
    let mut wtr = csv::Writer::from_path(output_path)?;
    wtr.write_record(["ik", "nbnd"])?;
    for row in rows {
        wtr.write_record([row.ik.to_string(), row.nbnd.to_string()])?;
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
    use crate::models::KPoint;

    fn polarized() -> Eigenval {
        Eigenval {
            num_electrons: 2,
            num_kpoints: 1,
            num_bands: 2,
            spin_polarized: true,
            kpoints: vec![KPoint {
                energies: vec![vec![-1.0, 1.0], vec![-0.5, 1.5]],
                occupations: vec![vec![1.0, 0.0], vec![1.0, 0.0]],
            }],
        }
    }

    #[test]
    fn test_spin_kept_for_polarized() {
        assert_eq!(effective_spin(&polarized(), Some(Spin::Down)), Some(Spin::Down));
    }

    #[test]
    fn test_spin_dropped_for_unpolarized() {
        let mut eig = polarized();
        eig.spin_polarized = false;
        assert_eq!(effective_spin(&eig, Some(Spin::Up)), None);
    }

    #[test]
    fn test_band_range_requires_spin() {
        assert!(matches!(
            print_band_range(&polarized(), 1, None),
            Err(VasputilError::SpinChannelRequired)
        ));
        assert!(print_band_range(&polarized(), 2, Some(Spin::Up)).is_ok());
    }

    #[test]
    fn test_band_range_lines() {
        let lines = band_range_lines(&polarized(), 2, Some(Spin::Down)).unwrap();
        assert_eq!(
            lines,
            vec![
                "Tot_bands = 2",
                "homo_index = 1",
                "lumo_index = 2",
                "emin = 1.500000",
                "emax = 1.500000",
            ]
        );
    }

    #[test]
    fn test_window_csv() {
        let path = std::env::temp_dir().join("vasputil_eigwin.csv");
        print_window_counts(&polarized(), -1.0, 1.2, Some(Spin::Down), Some(&path)).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text, "ik,nbnd\n1,1\n");
    }
}
