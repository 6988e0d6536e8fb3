//! # XYZ 格式解析器
//!
//! 解析分子 XYZ 文件。第二行注释中可携带盒子：
//! ```text
//! 3
//! water [10.0,0,0,0,10.0,0,0,0,10.0]
//! O   5.000  5.000  5.000
//! H   5.757  5.586  5.000
//! H   4.243  5.586  5.000
//! ```
//! 方括号内 9 个数依次为 a、b、c 三个晶格向量。
//!
//! ## 依赖关系
//! - 被 `parsers/mod.rs`, `commands/convert.rs` 使用
//! - 使用 `models/structure.rs`

use crate::error::{Result, VasputilError};
use crate::models::{Atom, Crystal, Lattice};
use std::fs;
use std::path::Path;

/// 未给出盒子时的默认立方盒边长 (Å)
pub const DEFAULT_BOX_EDGE: f64 = 100.0;

/// 盒子来源
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BoxSource {
    /// 命令行 `--box`
    Override,
    /// 注释行中的方括号
    Comment,
    /// 默认立方盒
    Default,
}

/// 解析后的 XYZ 文件
#[derive(Debug, Clone)]
pub struct XyzFile {
    pub crystal: Crystal,
    pub box_source: BoxSource,
    /// 注释行中存在方括号但内容无效
    pub malformed_box: bool,
}

/// 解析 9 个逗号分隔的数为晶格矩阵
pub fn parse_box(text: &str) -> Option<[[f64; 3]; 3]> {
    let values: Vec<f64> = text
        .split(',')
        .map(|s| s.trim().parse::<f64>())
        .collect::<std::result::Result<_, _>>()
        .ok()?;
    if values.len() != 9 {
        return None;
    }
    Some([
        [values[0], values[1], values[2]],
        [values[3], values[4], values[5]],
        [values[6], values[7], values[8]],
    ])
}

/// 从注释行提取 `[...]` 中的盒子
fn box_from_comment(comment: &str) -> (Option<[[f64; 3]; 3]>, bool) {
    let start = match comment.find('[') {
        Some(i) => i,
        None => return (None, false),
    };
    let end = match comment[start..].find(']') {
        Some(j) => start + j,
        None => return (None, true),
    };
    match parse_box(&comment[start + 1..end]) {
        Some(m) => (Some(m), false),
        None => (None, true),
    }
}

/// 解析 XYZ 文件
pub fn parse_xyz_file(path: &Path, box_override: Option<[[f64; 3]; 3]>) -> Result<XyzFile> {
    let content = fs::read_to_string(path).map_err(|e| VasputilError::FileReadError {
        path: path.display().to_string(),
        source: e,
    })?;

    parse_xyz_content(
        &content,
        path.file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("unknown"),
        box_override,
    )
}

/// 从字符串内容解析 XYZ 格式
pub fn parse_xyz_content(
    content: &str,
    default_name: &str,
    box_override: Option<[[f64; 3]; 3]>,
) -> Result<XyzFile> {
    let lines: Vec<&str> = content.lines().collect();
    let err = |reason: String| VasputilError::parse("xyz", default_name, reason);

    let count: usize = lines
        .first()
        .and_then(|l| l.trim().parse().ok())
        .ok_or_else(|| err("First line must be the atom count".to_string()))?;

    let comment = lines.get(1).copied().unwrap_or("");
    let (comment_box, malformed_box) = box_from_comment(comment);

    let (matrix, box_source) = match (box_override, comment_box) {
        (Some(m), _) => (m, BoxSource::Override),
        (None, Some(m)) => (m, BoxSource::Comment),
        (None, None) => (
            Lattice::cubic(DEFAULT_BOX_EDGE).matrix,
            BoxSource::Default,
        ),
    };
    let lattice = Lattice::from_vectors(matrix);

    let mut atoms = Vec::with_capacity(count);
    for i in 0..count {
        let line_no = i + 3;
        let line = lines
            .get(i + 2)
            .ok_or_else(|| err(format!("Expected {} atoms, found {}", count, i)))?;
        let tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens.len() < 4 {
            return Err(err(format!("Invalid atom record at line {}", line_no)));
        }
        let mut cart = [0.0; 3];
        for k in 0..3 {
            cart[k] = tokens[k + 1]
                .parse()
                .map_err(|_| err(format!("Invalid coordinate at line {}", line_no)))?;
        }
        atoms.push(Atom::new(tokens[0], lattice.cart_to_frac(cart)));
    }

    let mut crystal = Crystal::new(default_name, lattice, atoms);
    crystal.source_format = Some("xyz".to_string());

    Ok(XyzFile {
        crystal,
        box_source,
        malformed_box,
    })
}

/// 转换为 XYZ 格式（笛卡尔坐标），注释行写入盒子
pub fn to_xyz_string(crystal: &Crystal) -> String {
    let m = crystal.lattice.matrix;
    let cell: Vec<String> = m.iter().flatten().map(|v| format!("{}", v)).collect();

    let mut result = String::new();
    result.push_str(&format!("{}\n", crystal.atoms.len()));
    result.push_str(&format!("{} [{}]\n", crystal.name, cell.join(",")));

    for (atom, pos) in crystal.atoms.iter().zip(crystal.cartesian_positions()) {
        result.push_str(&format!(
            "{} {:16.10} {:16.10} {:16.10}\n",
            atom.element, pos[0], pos[1], pos[2]
        ));
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    const WATER: &str = "3\nwater [10.0,0,0,0,12.0,0,0,0,14.0]\nO 5.0 6.0 7.0\nH\t5.757  6.586 7.0\nH 4.243 6.586 7.0\n";

    #[test]
    fn test_box_from_comment() {
        let xyz = parse_xyz_content(WATER, "water", None).unwrap();
        assert_eq!(xyz.box_source, BoxSource::Comment);
        assert_eq!(xyz.crystal.lattice.matrix[1][1], 12.0);
        assert_eq!(xyz.crystal.atoms.len(), 3);
        assert!((xyz.crystal.atoms[0].position[2] - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_box_override_wins() {
        let m = parse_box("20,0,0,0,20,0,0,0,20").unwrap();
        let xyz = parse_xyz_content(WATER, "water", Some(m)).unwrap();
        assert_eq!(xyz.box_source, BoxSource::Override);
        assert_eq!(xyz.crystal.lattice.matrix[2][2], 20.0);
    }

    #[test]
    fn test_default_box_when_comment_is_malformed() {
        let content = "1\nbad [1,2,3]\nC 1.0 2.0 3.0\n";
        let xyz = parse_xyz_content(content, "c", None).unwrap();
        assert_eq!(xyz.box_source, BoxSource::Default);
        assert!(xyz.malformed_box);
        assert_eq!(xyz.crystal.lattice.matrix[0][0], DEFAULT_BOX_EDGE);

        let plain = parse_xyz_content("1\nplain\nC 0 0 0\n", "c", None).unwrap();
        assert!(!plain.malformed_box);
    }

    #[test]
    fn test_parse_box_rejects_wrong_length() {
        assert!(parse_box("1,2,3").is_none());
        assert!(parse_box("1,2,3,4,5,6,7,8,x").is_none());
    }

    #[test]
    fn test_truncated_xyz() {
        assert!(parse_xyz_content("3\nc\nC 0 0 0\n", "c", None).is_err());
    }

    #[test]
    fn test_to_xyz_string_keeps_cartesian() {
        let xyz = parse_xyz_content(WATER, "water", None).unwrap();
        let text = to_xyz_string(&xyz.crystal);
        let again = parse_xyz_content(&text, "water", None).unwrap();
        assert_eq!(again.box_source, BoxSource::Comment);
        let pos = again.crystal.cartesian_positions();
        assert!((pos[1][0] - 5.757).abs() < 1e-8);
    }
}
