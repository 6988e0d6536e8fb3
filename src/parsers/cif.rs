//! # CIF 格式解析器
//!
//! 读取 Crystallographic Information File 的第一个 data 块：
//! 晶胞参数、`_atom_site_*` 循环以及对称操作，并展开成 P1 原胞。
//!
//! ## 支持的标签
//! ```text
//! _cell_length_a / _b / _c          (允许 "5.431(2)" 形式的不确定度)
//! _cell_angle_alpha / _beta / _gamma
//! _atom_site_type_symbol 或 _atom_site_label
//! _atom_site_fract_x / _y / _z
//! _symmetry_equiv_pos_as_xyz 或 _space_group_symop_operation_xyz
//! ```
//!
//! ## 依赖关系
//! - 被 `parsers/mod.rs` 使用
//! - 使用 `models/structure.rs`, `models/elements.rs`

use crate::error::{Result, VasputilError};
use crate::models::elements::normalize_symbol;
use crate::models::{Atom, Crystal, Lattice};
use regex::Regex;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::OnceLock;

/// 对称等价位点去重容差（分数坐标）
const DEDUP_TOLERANCE: f64 = 1e-3;

/// 对称操作：frac' = rotation · frac + translation
#[derive(Debug, Clone, PartialEq)]
pub struct SymOp {
    pub rotation: [[f64; 3]; 3],
    pub translation: [f64; 3],
}

impl SymOp {
    pub fn identity() -> Self {
        SymOp {
            rotation: [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]],
            translation: [0.0; 3],
        }
    }

    pub fn apply(&self, p: [f64; 3]) -> [f64; 3] {
        let mut out = [0.0; 3];
        for (i, o) in out.iter_mut().enumerate() {
            *o = self.rotation[i][0] * p[0]
                + self.rotation[i][1] * p[1]
                + self.rotation[i][2] * p[2]
                + self.translation[i];
        }
        out
    }
}

/// CIF 中的一个 loop_ 块
#[derive(Debug, Default)]
struct Loop {
    tags: Vec<String>,
    values: Vec<String>,
}

impl Loop {
    fn column(&self, tag: &str) -> Option<usize> {
        self.tags.iter().position(|t| t.eq_ignore_ascii_case(tag))
    }

    fn rows(&self) -> impl Iterator<Item = &[String]> {
        self.values.chunks(self.tags.len().max(1))
    }
}

/// 一个 data 块的内容
#[derive(Debug, Default)]
struct DataBlock {
    name: String,
    items: HashMap<String, String>,
    loops: Vec<Loop>,
}

/// 解析 CIF 文件
pub fn parse_cif_file(path: &Path) -> Result<Crystal> {
    let content = fs::read_to_string(path).map_err(|e| VasputilError::FileReadError {
        path: path.display().to_string(),
        source: e,
    })?;

    parse_cif_content(
        &content,
        path.file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("unknown"),
    )
}

/// 从字符串内容解析 CIF
pub fn parse_cif_content(content: &str, default_name: &str) -> Result<Crystal> {
    let err = |reason: String| VasputilError::parse("cif", default_name, reason);
    let block = read_first_block(&tokenize(content));

    let cell_value = |tag: &str| -> Result<f64> {
        block
            .items
            .get(tag)
            .and_then(|v| parse_number(v))
            .ok_or_else(|| err(format!("Missing or invalid {}", tag)))
    };

    let lattice = Lattice::from_parameters(
        cell_value("_cell_length_a")?,
        cell_value("_cell_length_b")?,
        cell_value("_cell_length_c")?,
        cell_value("_cell_angle_alpha")?,
        cell_value("_cell_angle_beta")?,
        cell_value("_cell_angle_gamma")?,
    );

    // 原子位点循环
    let site_loop = block
        .loops
        .iter()
        .find(|l| l.column("_atom_site_fract_x").is_some())
        .ok_or_else(|| err("No _atom_site_fract_x loop".to_string()))?;

    let col = |tag: &str| site_loop.column(tag);
    let (cx, cy, cz) = match (
        col("_atom_site_fract_x"),
        col("_atom_site_fract_y"),
        col("_atom_site_fract_z"),
    ) {
        (Some(x), Some(y), Some(z)) => (x, y, z),
        _ => return Err(err("Incomplete fractional coordinates".to_string())),
    };
    let c_label = col("_atom_site_label");
    let c_symbol = col("_atom_site_type_symbol");
    if c_label.is_none() && c_symbol.is_none() {
        return Err(err("Atom sites have neither label nor type symbol".to_string()));
    }

    let mut asymmetric = Vec::new();
    for (i, row) in site_loop.rows().enumerate() {
        if row.len() < site_loop.tags.len() {
            return Err(err(format!("Truncated atom site row {}", i + 1)));
        }
        let mut pos = [0.0; 3];
        for (k, &c) in [cx, cy, cz].iter().enumerate() {
            pos[k] = parse_number(&row[c])
                .ok_or_else(|| err(format!("Invalid coordinate '{}' in site row {}", row[c], i + 1)))?;
        }
        let raw_symbol = c_symbol.or(c_label).map(|c| row[c].as_str()).unwrap_or("X");
        let element = normalize_symbol(raw_symbol);
        if element.is_empty() {
            return Err(err(format!("Cannot derive element from '{}'", raw_symbol)));
        }
        let mut atom = Atom::new(element, pos);
        if let Some(c) = c_label {
            atom = atom.with_label(row[c].clone());
        }
        asymmetric.push(atom);
    }

    // 对称操作
    let mut ops = Vec::new();
    for l in &block.loops {
        let c = l
            .column("_symmetry_equiv_pos_as_xyz")
            .or_else(|| l.column("_space_group_symop_operation_xyz"));
        if let Some(c) = c {
            for row in l.rows() {
                if let Some(expr) = row.get(c) {
                    ops.push(parse_symop(expr).ok_or_else(|| {
                        err(format!("Invalid symmetry operation '{}'", expr))
                    })?);
                }
            }
        }
    }
    if ops.is_empty() {
        ops.push(SymOp::identity());
    }

    let atoms = expand_sites(&asymmetric, &ops);
    let name = if block.name.is_empty() {
        default_name.to_string()
    } else {
        block.name.clone()
    };

    let mut crystal = Crystal::new(name, lattice, atoms);
    crystal.source_format = Some("cif".to_string());
    Ok(crystal)
}

/// 将不对称单元按对称操作展开，回折到 [0,1) 并去重
pub fn expand_sites(asymmetric: &[Atom], ops: &[SymOp]) -> Vec<Atom> {
    let mut atoms: Vec<Atom> = Vec::new();
    for site in asymmetric {
        for op in ops {
            let p = op.apply(site.position).map(wrap_unit);
            let duplicate = atoms.iter().any(|a| {
                a.element == site.element
                    && (0..3).all(|k| {
                        let d = (a.position[k] - p[k]).abs();
                        d.min(1.0 - d) < DEDUP_TOLERANCE
                    })
            });
            if !duplicate {
                let mut atom = site.clone();
                atom.position = p;
                atoms.push(atom);
            }
        }
    }
    atoms
}

/// 回折到 [0, 1)
pub fn wrap_unit(v: f64) -> f64 {
    let w = v.rem_euclid(1.0);
    if w >= 1.0 - 1e-12 {
        0.0
    } else {
        w
    }
}

/// 解析数值，去掉 "(n)" 形式的不确定度；"?" 和 "." 视为缺失
fn parse_number(value: &str) -> Option<f64> {
    static UNCERTAINTY: OnceLock<Regex> = OnceLock::new();
    let re = UNCERTAINTY.get_or_init(|| Regex::new(r"\(\d+\)$").expect("valid regex"));
    let stripped = re.replace(value.trim(), "");
    stripped.parse().ok()
}

/// 解析对称操作字符串，如 "-x+1/2, y, z+0.25"
pub fn parse_symop(expr: &str) -> Option<SymOp> {
    static TERM: OnceLock<Regex> = OnceLock::new();
    let re = TERM.get_or_init(|| {
        Regex::new(r"([+-]?)(?:(\d+(?:\.\d*)?)(?:/(\d+(?:\.\d*)?))?)?\*?([xyz])?")
            .expect("valid regex")
    });

    let compact: String = expr
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '\'' && *c != '"')
        .collect::<String>()
        .to_lowercase();
    let parts: Vec<&str> = compact.split(',').collect();
    if parts.len() != 3 {
        return None;
    }

    let mut op = SymOp {
        rotation: [[0.0; 3]; 3],
        translation: [0.0; 3],
    };

    for (row, part) in parts.iter().enumerate() {
        if part.is_empty() {
            return None;
        }
        let mut consumed = 0;
        for cap in re.captures_iter(part) {
            let whole = cap.get(0)?;
            if whole.as_str().is_empty() {
                continue;
            }
            if whole.start() != consumed {
                return None;
            }
            consumed = whole.end();

            let sign = if cap.get(1).map(|m| m.as_str()) == Some("-") {
                -1.0
            } else {
                1.0
            };
            let number = match cap.get(2) {
                Some(num) => {
                    let n: f64 = num.as_str().parse().ok()?;
                    match cap.get(3) {
                        Some(den) => n / den.as_str().parse::<f64>().ok()?,
                        None => n,
                    }
                }
                None => 1.0,
            };
            match cap.get(4).map(|m| m.as_str()) {
                Some("x") => op.rotation[row][0] += sign * number,
                Some("y") => op.rotation[row][1] += sign * number,
                Some("z") => op.rotation[row][2] += sign * number,
                _ => {
                    if cap.get(2).is_none() {
                        return None;
                    }
                    op.translation[row] += sign * number;
                }
            }
        }
        if consumed != part.len() {
            return None;
        }
    }

    Some(op)
}

/// CIF 词法切分：处理注释、引号和分号文本域
fn tokenize(content: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut lines = content.lines();

    while let Some(line) = lines.next() {
        // 分号文本域
        if let Some(rest) = line.strip_prefix(';') {
            let mut text = rest.to_string();
            for inner in lines.by_ref() {
                if inner.starts_with(';') {
                    break;
                }
                text.push('\n');
                text.push_str(inner);
            }
            tokens.push(text);
            continue;
        }

        let chars: Vec<char> = line.chars().collect();
        let mut i = 0;
        while i < chars.len() {
            let c = chars[i];
            if c.is_whitespace() {
                i += 1;
            } else if c == '#' {
                break;
            } else if c == '\'' || c == '"' {
                // 引号结束须紧跟空白或行尾
                let mut j = i + 1;
                while j < chars.len()
                    && !(chars[j] == c && (j + 1 == chars.len() || chars[j + 1].is_whitespace()))
                {
                    j += 1;
                }
                tokens.push(chars[i + 1..j.min(chars.len())].iter().collect());
                i = j + 1;
            } else {
                let mut j = i;
                while j < chars.len() && !chars[j].is_whitespace() {
                    j += 1;
                }
                tokens.push(chars[i..j].iter().collect());
                i = j;
            }
        }
    }

    tokens
}

/// 读取第一个 data 块
fn read_first_block(tokens: &[String]) -> DataBlock {
    let mut block = DataBlock::default();
    let mut seen_data = false;
    let mut i = 0;

    while i < tokens.len() {
        let tok = &tokens[i];
        let lower = tok.to_lowercase();

        if lower.starts_with("data_") {
            if seen_data {
                break;
            }
            seen_data = true;
            block.name = tok[5..].to_string();
            i += 1;
        } else if lower == "loop_" {
            i += 1;
            let mut lp = Loop::default();
            while i < tokens.len() && tokens[i].starts_with('_') {
                lp.tags.push(tokens[i].to_lowercase());
                i += 1;
            }
            while i < tokens.len() {
                let t = tokens[i].to_lowercase();
                if tokens[i].starts_with('_') || t == "loop_" || t.starts_with("data_") {
                    break;
                }
                lp.values.push(tokens[i].clone());
                i += 1;
            }
            block.loops.push(lp);
        } else if tok.starts_with('_') {
            if let Some(value) = tokens.get(i + 1) {
                block.items.insert(lower, value.clone());
            }
            i += 2;
        } else {
            i += 1;
        }
    }

    block
}

/// 转换为 CIF 格式 (P1)
pub fn to_cif_string(crystal: &Crystal) -> String {
    let (a, b, c, alpha, beta, gamma) = crystal.lattice.parameters();

    let mut result = String::new();
    result.push_str(&format!("data_{}\n", crystal.name.replace(' ', "_")));
    result.push_str("_symmetry_space_group_name_H-M    'P 1'\n");
    result.push_str("_symmetry_Int_Tables_number       1\n\n");

    result.push_str(&format!("_cell_length_a    {:.6}\n", a));
    result.push_str(&format!("_cell_length_b    {:.6}\n", b));
    result.push_str(&format!("_cell_length_c    {:.6}\n", c));
    result.push_str(&format!("_cell_angle_alpha {:.4}\n", alpha));
    result.push_str(&format!("_cell_angle_beta  {:.4}\n", beta));
    result.push_str(&format!("_cell_angle_gamma {:.4}\n\n", gamma));

    result.push_str("loop_\n");
    result.push_str("_symmetry_equiv_pos_as_xyz\n");
    result.push_str("'x, y, z'\n\n");

    result.push_str("loop_\n");
    result.push_str("_atom_site_label\n");
    result.push_str("_atom_site_type_symbol\n");
    result.push_str("_atom_site_fract_x\n");
    result.push_str("_atom_site_fract_y\n");
    result.push_str("_atom_site_fract_z\n");
    result.push_str("_atom_site_occupancy\n");

    for (i, atom) in crystal.atoms.iter().enumerate() {
        let label = atom
            .label
            .clone()
            .unwrap_or_else(|| format!("{}{}", atom.element, i + 1));
        result.push_str(&format!(
            "{} {} {:.10} {:.10} {:.10} 1.0\n",
            label, atom.element, atom.position[0], atom.position[1], atom.position[2]
        ));
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    const NACL: &str = r#"
# rock salt, conventional cell
data_NaCl
_cell_length_a    5.6402(3)
_cell_length_b    5.6402(3)
_cell_length_c    5.6402(3)
_cell_angle_alpha 90
_cell_angle_beta  90
_cell_angle_gamma 90
loop_
_symmetry_equiv_pos_as_xyz
'x, y, z'
'x, y+1/2, z+1/2'
'x+1/2, y, z+1/2'
'x+1/2, y+1/2, z'
loop_
_atom_site_label
_atom_site_type_symbol
_atom_site_fract_x
_atom_site_fract_y
_atom_site_fract_z
Na1 Na+ 0.0 0.0 0.0
Cl1 Cl- 0.5 0.5 0.5
"#;

    #[test]
    fn test_parse_symop() {
        let op = parse_symop("-x+1/2, y, z+0.25").unwrap();
        assert_eq!(op.rotation[0], [-1.0, 0.0, 0.0]);
        assert_eq!(op.translation, [0.5, 0.0, 0.25]);

        let op = parse_symop("x-y, x, 1/3+z").unwrap();
        assert_eq!(op.rotation[0], [1.0, -1.0, 0.0]);
        assert!((op.translation[2] - 1.0 / 3.0).abs() < 1e-12);

        assert!(parse_symop("x, y").is_none());
        assert!(parse_symop("x, y, q").is_none());
    }

    #[test]
    fn test_parse_number_strips_uncertainty() {
        assert_eq!(parse_number("5.6402(3)"), Some(5.6402));
        assert_eq!(parse_number("90"), Some(90.0));
        assert_eq!(parse_number("?"), None);
    }

    #[test]
    fn test_expand_rock_salt() {
        let crystal = parse_cif_content(NACL, "fallback").unwrap();
        assert_eq!(crystal.name, "NaCl");
        assert_eq!(crystal.atoms.len(), 8);
        assert_eq!(crystal.formula(), "Na4Cl4");
        assert!((crystal.lattice.volume() - 5.6402f64.powi(3)).abs() < 1e-6);
        for atom in &crystal.atoms {
            assert!(atom.position.iter().all(|&v| (0.0..1.0).contains(&v)));
        }
    }

    #[test]
    fn test_p1_without_symmetry_loop() {
        let content = "data_\n_cell_length_a 3\n_cell_length_b 3\n_cell_length_c 3\n\
                       _cell_angle_alpha 90\n_cell_angle_beta 90\n_cell_angle_gamma 90\n\
                       loop_\n_atom_site_label\n_atom_site_fract_x\n_atom_site_fract_y\n_atom_site_fract_z\n\
                       O1 0 0 0\nO2 0.5 0.5 0.5\n";
        let crystal = parse_cif_content(content, "fallback").unwrap();
        assert_eq!(crystal.name, "fallback");
        assert_eq!(crystal.atoms.len(), 2);
        assert_eq!(crystal.atoms[0].element, "O");
        assert_eq!(crystal.atoms[1].label.as_deref(), Some("O2"));
    }

    #[test]
    fn test_missing_cell_is_error() {
        let content = "data_x\nloop_\n_atom_site_label\n_atom_site_fract_x\n_atom_site_fract_y\n_atom_site_fract_z\nO1 0 0 0\n";
        assert!(parse_cif_content(content, "x").is_err());
    }

    #[test]
    fn test_written_cif_parses_back() {
        let crystal = parse_cif_content(NACL, "NaCl").unwrap();
        let text = to_cif_string(&crystal);
        let again = parse_cif_content(&text, "NaCl").unwrap();
        assert_eq!(again.atoms.len(), crystal.atoms.len());
    }
}
