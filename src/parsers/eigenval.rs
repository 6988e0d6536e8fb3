//! # VASP EIGENVAL 解析器
//!
//! 文件结构：
//! - 第 6 行：电子数、k 点数、能带数
//! - 第 8 行起：每个 k 点一个块，块头为 `kx ky kz weight`，
//!   随后每条能带一行 `n E occ`（自旋极化时为 `n E_up E_dw occ_up occ_dw`），
//!   块之间以空行分隔
//!
//! ## 依赖关系
//! - 被 `commands/eigwin.rs`, `commands/wannier.rs` 使用
//! - 使用 `models/bands.rs`

use crate::error::{Result, VasputilError};
use crate::models::{Eigenval, KPoint};
use std::fs;
use std::path::Path;

/// 解析 EIGENVAL 文件
pub fn parse_eigenval_file(path: &Path) -> Result<Eigenval> {
    let content = fs::read_to_string(path).map_err(|e| VasputilError::FileReadError {
        path: path.display().to_string(),
        source: e,
    })?;

    if content.trim().is_empty() {
        return Err(VasputilError::EmptyFile {
            path: path.display().to_string(),
        });
    }

    parse_eigenval_content(&content, &path.display().to_string())
}

/// 从字符串内容解析 EIGENVAL
pub fn parse_eigenval_content(content: &str, path: &str) -> Result<Eigenval> {
    let lines: Vec<&str> = content.lines().collect();
    let err = |reason: String| VasputilError::parse("eigenval", path, reason);

    let header: Vec<usize> = lines
        .get(5)
        .ok_or_else(|| err("File is too short to contain the band header".to_string()))?
        .split_whitespace()
        .map(|s| s.parse::<usize>())
        .collect::<std::result::Result<_, _>>()
        .map_err(|_| err("Line 6 must hold electrons, k-points and bands".to_string()))?;
    if header.len() < 3 {
        return Err(err("Line 6 must hold electrons, k-points and bands".to_string()));
    }
    let (num_electrons, num_kpoints, num_bands) = (header[0], header[1], header[2]);

    let mut kpoints: Vec<KPoint> = Vec::with_capacity(num_kpoints);
    let mut current: Option<KPoint> = None;
    let mut columns: Option<bool> = None;

    for (offset, line) in lines.iter().enumerate().skip(7) {
        let tokens: Vec<f64> = match line
            .split_whitespace()
            .map(|s| s.parse::<f64>())
            .collect::<std::result::Result<Vec<_>, _>>()
        {
            Ok(t) => t,
            Err(_) => return Err(err(format!("Non-numeric data at line {}", offset + 1))),
        };

        match tokens.len() {
            4 => {
                if let Some(k) = current.take() {
                    kpoints.push(k);
                }
                current = Some(KPoint {
                    energies: Vec::new(),
                    occupations: Vec::new(),
                });
            }
            3 | 5 => {
                let k = current
                    .as_mut()
                    .ok_or_else(|| err(format!("Band line outside a k-point block at line {}", offset + 1)))?;
                let polarized = tokens.len() == 5;
                // 第一条能带行决定整个文件的列数
                match columns {
                    None => columns = Some(polarized),
                    Some(expected) if expected != polarized => {
                        return Err(err(format!(
                            "Inconsistent column count at line {}: expected {}, found {}",
                            offset + 1,
                            if expected { 5 } else { 3 },
                            tokens.len()
                        )));
                    }
                    Some(_) => {}
                }
                if k.energies.is_empty() {
                    let channels = if polarized { 2 } else { 1 };
                    k.energies = vec![Vec::with_capacity(num_bands); channels];
                    k.occupations = vec![Vec::with_capacity(num_bands); channels];
                }

                if polarized {
                    k.energies[0].push(tokens[1]);
                    k.energies[1].push(tokens[2]);
                    k.occupations[0].push(tokens[3]);
                    k.occupations[1].push(tokens[4]);
                } else {
                    k.energies[0].push(tokens[1]);
                    k.occupations[0].push(tokens[2]);
                }
            }
            _ => {
                // 空行结束当前块
                if let Some(k) = current.take() {
                    kpoints.push(k);
                }
            }
        }
    }
    if let Some(k) = current.take() {
        kpoints.push(k);
    }

    if kpoints.len() != num_kpoints {
        return Err(err(format!(
            "Found {} k-points, header declares {}",
            kpoints.len(),
            num_kpoints
        )));
    }

    for (i, k) in kpoints.iter().enumerate() {
        let found = k.energies.first().map(|e| e.len()).unwrap_or(0);
        if found != num_bands {
            return Err(err(format!(
                "k-point {} has {} bands, header declares {}",
                i + 1,
                found,
                num_bands
            )));
        }
    }

    Ok(Eigenval {
        num_electrons,
        num_kpoints,
        num_bands,
        spin_polarized: columns.unwrap_or(false),
        kpoints,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Spin;

    const HEADER: &str = "    2    2    1    1\n  0.1E+02  0.4E-09  0.4E-09  0.4E-09  0.5E-15\n  1.0E-004\n  CAR\n unknown system\n    4    2    3\n\n";

    fn unpolarized() -> String {
        format!(
            "{}  0.0000000E+00  0.0000000E+00  0.0000000E+00  0.5000000E+00\n    1   -6.0000  1.00000\n    2   -1.0000  1.00000\n    3    2.0000  0.00000\n\n  0.5000000E+00  0.0000000E+00  0.0000000E+00  0.5000000E+00\n    1   -5.5000  1.00000\n    2   -0.5000  1.00000\n    3    2.5000  0.00000\n",
            HEADER
        )
    }

    #[test]
    fn test_parse_unpolarized() {
        let eig = parse_eigenval_content(&unpolarized(), "EIGENVAL").unwrap();
        assert_eq!(eig.num_electrons, 4);
        assert_eq!(eig.num_bands, 3);
        assert!(!eig.spin_polarized);
        assert_eq!(eig.kpoints.len(), 2);
        assert_eq!(eig.num_kpoints, 2);
        assert_eq!(eig.homo_index(None).unwrap(), 2);
        assert_eq!(eig.band_range(3, None).unwrap(), (2.0, 2.5));
    }

    #[test]
    fn test_parse_spin_polarized() {
        let content = format!(
            "{}  0.0 0.0 0.0 1.0\n    1   -6.0  -5.0  1.0  1.0\n    2   -1.0  -0.8  1.0  0.0\n    3    2.0   2.2  0.0  0.0\n",
            HEADER.replace("    4    2    3", "    3    1    3")
        );
        let eig = parse_eigenval_content(&content, "EIGENVAL").unwrap();
        assert!(eig.spin_polarized);
        assert_eq!(eig.homo_index(Some(Spin::Up)).unwrap(), 2);
        assert_eq!(eig.homo_index(Some(Spin::Down)).unwrap(), 1);
        assert_eq!(eig.band_range(1, Some(Spin::Down)).unwrap(), (-5.0, -5.0));
        assert!(eig.homo_index(None).is_err());
    }

    #[test]
    fn test_band_count_mismatch() {
        let content = unpolarized().replace("    3    2.5000  0.00000\n", "");
        assert!(parse_eigenval_content(&content, "EIGENVAL").is_err());
    }

    #[test]
    fn test_mixed_columns_across_kpoints() {
        // 第一个 k 点三列，第二个 k 点五列
        let content = format!(
            "{}  0.0 0.0 0.0 0.5\n    1   -6.0  1.0\n    2   -1.0  1.0\n    3    2.0  0.0\n\n  0.5 0.0 0.0 0.5\n    1   -5.5  -5.0  1.0  1.0\n    2   -0.5  -0.4  1.0  1.0\n    3    2.5   2.6  0.0  0.0\n",
            HEADER
        );
        match parse_eigenval_content(&content, "EIGENVAL") {
            Err(VasputilError::ParseError { reason, .. }) => {
                assert!(reason.contains("line 14"), "{}", reason)
            }
            other => panic!("mixed columns accepted: {:?}", other.map(|e| e.spin_polarized)),
        }
    }

    #[test]
    fn test_truncated_kpoint_list() {
        let content = unpolarized();
        let first_block = &content[..content.find("\n\n  0.5").unwrap() + 1];
        assert!(parse_eigenval_content(first_block, "EIGENVAL").is_err());
    }

    #[test]
    fn test_too_short() {
        assert!(parse_eigenval_content("1\n2\n", "EIGENVAL").is_err());
    }
}
