//! # VASP POSCAR 格式解析器
//!
//! 解析与写出 VASP POSCAR/CONTCAR 文件格式。
//!
//! ## POSCAR 格式说明
//! ```text
//! Comment line (structure name)
//! 1.0                    # scaling factor (negative = target volume)
//! a1 a2 a3               # lattice vector a
//! b1 b2 b3               # lattice vector b
//! c1 c2 c3               # lattice vector c
//! Element1 Element2 ...  # element symbols (VASP 5+)
//! n1 n2 ...              # number of atoms per element
//! Selective dynamics     # optional
//! Direct/Cartesian       # coordinate type
//! x1 y1 z1 [T T F]       # atom positions
//! ...
//! ```
//!
//! ## 依赖关系
//! - 被 `parsers/mod.rs` 使用
//! - 使用 `models/structure.rs`

use crate::error::{Result, VasputilError};
use crate::models::{Atom, Crystal, Lattice};
use std::fs;
use std::path::Path;

/// 写出时的坐标类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoordinateMode {
    Direct,
    Cartesian,
}

/// 解析 POSCAR/CONTCAR 文件
pub fn parse_poscar_file(path: &Path) -> Result<Crystal> {
    let content = fs::read_to_string(path).map_err(|e| VasputilError::FileReadError {
        path: path.display().to_string(),
        source: e,
    })?;

    parse_poscar_content(
        &content,
        path.file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("unknown"),
    )
}

/// 从字符串内容解析 POSCAR 格式
pub fn parse_poscar_content(content: &str, default_name: &str) -> Result<Crystal> {
    let lines: Vec<&str> = content.lines().collect();
    let err = |reason: String| VasputilError::parse("poscar", default_name, reason);

    if lines.len() < 8 {
        return Err(err("File too short".to_string()));
    }

    // Line 0: Comment/name
    let name = lines[0].trim().to_string();
    let name = if name.is_empty() {
        default_name.to_string()
    } else {
        name
    };

    // Line 1: Scaling factor
    let scale: f64 = lines[1]
        .split_whitespace()
        .next()
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| err(format!("Invalid scaling factor: '{}'", lines[1].trim())))?;

    // Lines 2-4: Lattice vectors
    let mut matrix = [[0.0; 3]; 3];
    for i in 0..3 {
        let parts: Vec<f64> = lines[2 + i]
            .split_whitespace()
            .take(3)
            .filter_map(|s| s.parse().ok())
            .collect();
        if parts.len() < 3 {
            return Err(err(format!("Invalid lattice vector at line {}", 3 + i)));
        }
        matrix[i] = [parts[0], parts[1], parts[2]];
    }

    // 负的缩放因子表示目标体积
    let factor = if scale < 0.0 {
        let raw_volume = Lattice::from_vectors(matrix).volume().abs();
        if raw_volume < 1e-10 {
            return Err(err("Degenerate lattice vectors".to_string()));
        }
        (scale.abs() / raw_volume).cbrt()
    } else {
        scale
    };
    for row in matrix.iter_mut() {
        for v in row.iter_mut() {
            *v *= factor;
        }
    }
    let lattice = Lattice::from_vectors(matrix);

    // Line 5: Element symbols (VASP 5+) or atom counts (VASP 4)
    let line5_parts: Vec<&str> = lines[5].split_whitespace().collect();
    if line5_parts.is_empty() {
        return Err(err("Missing species line".to_string()));
    }
    let (elements, counts, mut coord_line) = if line5_parts[0].parse::<usize>().is_ok() {
        // VASP 4 format: no element line, only counts
        let counts: Vec<usize> = line5_parts.iter().filter_map(|s| s.parse().ok()).collect();
        let elements: Vec<String> = (0..counts.len()).map(|i| format!("X{}", i + 1)).collect();
        (elements, counts, 6)
    } else {
        // VASP 5+ format: element symbols on line 5, counts on line 6
        // POTCAR 风格的 "Fe_pv" / "O/abc" 只保留元素部分
        let elements: Vec<String> = line5_parts
            .iter()
            .map(|s| {
                s.split(|c| c == '_' || c == '/')
                    .next()
                    .unwrap_or(s)
                    .to_string()
            })
            .collect();
        let counts: Vec<usize> = lines[6]
            .split_whitespace()
            .filter_map(|s| s.parse().ok())
            .collect();
        (elements, counts, 7)
    };

    if counts.len() != elements.len() {
        return Err(err(format!(
            "{} element symbols but {} atom counts",
            elements.len(),
            counts.len()
        )));
    }

    // Check for "Selective dynamics" line
    let selective = lines.len() > coord_line
        && lines[coord_line]
            .trim_start()
            .to_lowercase()
            .starts_with('s');
    if selective {
        coord_line += 1;
    }

    // Coordinate type line
    if lines.len() <= coord_line {
        return Err(err("Missing coordinate type line".to_string()));
    }

    let coord_type = lines[coord_line].trim().to_lowercase();
    let is_cartesian = coord_type.starts_with('c') || coord_type.starts_with('k');

    // Parse atom positions
    let total: usize = counts.iter().sum();
    let mut atoms: Vec<Atom> = Vec::with_capacity(total);
    let mut line_idx = coord_line + 1;

    for (elem, &count) in elements.iter().zip(counts.iter()) {
        for _ in 0..count {
            let line = lines
                .get(line_idx)
                .ok_or_else(|| err(format!("Expected {} atoms, found {}", total, atoms.len())))?;
            let tokens: Vec<&str> = line.split_whitespace().collect();
            let parts: Vec<f64> = tokens
                .iter()
                .take(3)
                .filter_map(|s| s.parse().ok())
                .collect();

            if parts.len() < 3 {
                return Err(err(format!("Invalid atom position at line {}", line_idx + 1)));
            }

            let position = if is_cartesian {
                let cart = [parts[0] * factor, parts[1] * factor, parts[2] * factor];
                lattice.cart_to_frac(cart)
            } else {
                [parts[0], parts[1], parts[2]]
            };

            let mut atom = Atom::new(elem.clone(), position);
            if selective {
                atom = atom.with_selective(parse_flags(&tokens[3..]).ok_or_else(|| {
                    err(format!(
                        "Missing selective dynamics flags at line {}",
                        line_idx + 1
                    ))
                })?);
            }
            atoms.push(atom);
            line_idx += 1;
        }
    }

    let mut crystal = Crystal::new(name, lattice, atoms);
    crystal.source_format = Some("poscar".to_string());

    Ok(crystal)
}

/// 解析 T/F 标记
fn parse_flags(tokens: &[&str]) -> Option<[bool; 3]> {
    if tokens.len() < 3 {
        return None;
    }
    let mut flags = [true; 3];
    for (flag, token) in flags.iter_mut().zip(tokens.iter()) {
        *flag = match token.chars().next()? {
            'T' | 't' => true,
            'F' | 'f' => false,
            _ => return None,
        };
    }
    Some(flags)
}

/// 将 Crystal 转换为 POSCAR 格式字符串 (VASP 5)
///
/// 原子按元素首次出现的顺序分组；任一原子带约束时写出 Selective dynamics。
pub fn to_poscar_string(crystal: &Crystal, mode: CoordinateMode) -> String {
    let species = crystal.species();
    let selective = crystal.has_selective_dynamics();

    let mut result = String::new();

    // Line 0: Comment
    result.push_str(&format!("{}\n", crystal.name));

    // Line 1: Scale
    result.push_str("1.0\n");

    // Lines 2-4: Lattice
    for row in &crystal.lattice.matrix {
        result.push_str(&format!(
            "  {:16.10}  {:16.10}  {:16.10}\n",
            row[0], row[1], row[2]
        ));
    }

    // Line 5-6: Elements and counts
    let names: Vec<&str> = species.iter().map(|(el, _)| el.as_str()).collect();
    let counts: Vec<String> = species.iter().map(|(_, n)| n.to_string()).collect();
    result.push_str(&format!("   {}\n", names.join("   ")));
    result.push_str(&format!("   {}\n", counts.join("   ")));

    if selective {
        result.push_str("Selective dynamics\n");
    }

    match mode {
        CoordinateMode::Direct => result.push_str("Direct\n"),
        CoordinateMode::Cartesian => result.push_str("Cartesian\n"),
    }

    // Atom positions, grouped by species
    for (elem, _) in &species {
        for atom in crystal.atoms.iter().filter(|a| &a.element == elem) {
            let pos = match mode {
                CoordinateMode::Direct => atom.position,
                CoordinateMode::Cartesian => crystal.lattice.frac_to_cart(atom.position),
            };
            result.push_str(&format!(
                "  {:16.10}  {:16.10}  {:16.10}",
                pos[0], pos[1], pos[2]
            ));
            if selective {
                let flags = atom.selective.unwrap_or([true; 3]);
                for f in flags {
                    result.push_str(if f { "   T" } else { "   F" });
                }
            }
            result.push('\n');
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_poscar_vasp5() {
        let content = r#"NaCl
1.0
5.64 0.0 0.0
0.0 5.64 0.0
0.0 0.0 5.64
Na Cl
4 4
Direct
0.0 0.0 0.0
0.5 0.5 0.0
0.5 0.0 0.5
0.0 0.5 0.5
0.5 0.0 0.0
0.0 0.5 0.0
0.0 0.0 0.5
0.5 0.5 0.5
"#;
        let crystal = parse_poscar_content(content, "NaCl").unwrap();
        assert_eq!(crystal.name, "NaCl");
        assert_eq!(crystal.atoms.len(), 8);
        assert_eq!(crystal.formula(), "Na4Cl4");
        assert!(!crystal.has_selective_dynamics());
    }

    #[test]
    fn test_parse_poscar_with_scale() {
        let content = r#"Si
2.0
2.0 0.0 0.0
0.0 2.0 0.0
0.0 0.0 2.0
Si
2
Direct
0.0 0.0 0.0
0.5 0.5 0.5
"#;
        let crystal = parse_poscar_content(content, "Si").unwrap();
        let (a, _, _, _, _, _) = crystal.lattice.parameters();
        assert!((a - 4.0).abs() < 0.01);
    }

    #[test]
    fn test_parse_poscar_negative_scale_is_volume() {
        let content = "cube\n-27.0\n1 0 0\n0 1 0\n0 0 1\nAl\n1\nDirect\n0 0 0\n";
        let crystal = parse_poscar_content(content, "cube").unwrap();
        assert!((crystal.lattice.volume() - 27.0).abs() < 1e-9);
    }

    #[test]
    fn test_parse_poscar_selective_dynamics() {
        let content = r#"Fe with selective
1.0
2.87 0.0 0.0
0.0 2.87 0.0
0.0 0.0 2.87
Fe
3
Selective dynamics
Direct
0.0 0.0 0.0 T T T
0.5 0.5 0.5 F F F
0.5 0.0 0.0 F F T
"#;
        let crystal = parse_poscar_content(content, "Fe").unwrap();
        assert_eq!(crystal.atoms.len(), 3);
        assert_eq!(crystal.atoms[1].selective, Some([false, false, false]));
        assert!(crystal.is_relaxed(0));
        assert!(!crystal.is_relaxed(1));
        assert!(crystal.is_relaxed(2));
    }

    #[test]
    fn test_parse_poscar_cartesian() {
        let content = "H2\n1.0\n10 0 0\n0 10 0\n0 0 10\nH\n2\nCartesian\n1.0 2.0 3.0\n5.0 5.0 5.0\n";
        let crystal = parse_poscar_content(content, "H2").unwrap();
        assert!((crystal.atoms[0].position[1] - 0.2).abs() < 1e-12);
        assert!((crystal.atoms[1].position[2] - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_parse_poscar_truncated_positions() {
        let content = "Si\n1.0\n5 0 0\n0 5 0\n0 0 5\nSi\n3\nDirect\n0 0 0\n0.5 0.5 0.5\n";
        assert!(parse_poscar_content(content, "Si").is_err());
    }

    #[test]
    fn test_write_keeps_selective_flags() {
        let lattice = Lattice::cubic(4.0);
        let atoms = vec![
            Atom::new("Ti", [0.0, 0.0, 0.0]).with_selective([false, false, false]),
            Atom::new("O", [0.5, 0.5, 0.0]).with_selective([true, true, true]),
        ];
        let crystal = Crystal::new("TiO", lattice, atoms);

        let text = to_poscar_string(&crystal, CoordinateMode::Direct);
        assert!(text.contains("Selective dynamics\nDirect\n"));
        assert!(text.contains("   F   F   F\n"));

        let parsed = parse_poscar_content(&text, "TiO").unwrap();
        assert_eq!(parsed.atoms[0].selective, Some([false, false, false]));
        assert_eq!(parsed.atoms[1].selective, Some([true, true, true]));
    }

    #[test]
    fn test_write_cartesian_groups_species() {
        let atoms = vec![
            Atom::new("O", [0.1, 0.0, 0.0]),
            Atom::new("H", [0.2, 0.0, 0.0]),
            Atom::new("O", [0.3, 0.0, 0.0]),
        ];
        let crystal = Crystal::new("title", Lattice::cubic(10.0), atoms);
        let text = to_poscar_string(&crystal, CoordinateMode::Cartesian);
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[5].split_whitespace().collect::<Vec<_>>(), vec!["O", "H"]);
        assert_eq!(lines[6].split_whitespace().collect::<Vec<_>>(), vec!["2", "1"]);
        assert_eq!(lines[7], "Cartesian");
        let x: Vec<f64> = lines[8..11]
            .iter()
            .map(|l| l.split_whitespace().next().unwrap().parse().unwrap())
            .collect();
        assert!((x[0] - 1.0).abs() < 1e-8);
        assert!((x[1] - 3.0).abs() < 1e-8);
        assert!((x[2] - 2.0).abs() < 1e-8);
    }
}
