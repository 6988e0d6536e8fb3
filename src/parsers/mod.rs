//! # 解析器模块
//!
//! 提供结构文件和 VASP 输出格式的解析器。
//!
//! ## 依赖关系
//! - 被 `commands/` 模块使用
//! - 使用 `models/` 数据模型
//! - 子模块: poscar, xyz, cif, outcar, eigenval, win

pub mod cif;
pub mod eigenval;
pub mod outcar;
pub mod poscar;
pub mod win;
pub mod xyz;

use crate::error::{Result, VasputilError};
use crate::models::Crystal;
use std::path::Path;

/// 从文件路径推断格式并解析
pub fn parse_structure_file(path: &Path) -> Result<Crystal> {
    if !path.exists() {
        return Err(VasputilError::FileNotFound {
            path: path.display().to_string(),
        });
    }

    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|s| s.to_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "cif" => cif::parse_cif_file(path),
        "xyz" => xyz::parse_xyz_file(path, None).map(|x| x.crystal),
        "vasp" | "poscar" => poscar::parse_poscar_file(path),
        _ => {
            // 可能是 POSCAR/CONTCAR (无扩展名)
            if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                if name.starts_with("POSCAR") || name.starts_with("CONTCAR") {
                    return poscar::parse_poscar_file(path);
                }
            }
            Err(VasputilError::UnsupportedFormat(format!(
                "Cannot determine format for: {}",
                path.display()
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_extension() {
        let dir = std::env::temp_dir().join("vasputil_parsers_detect");
        std::fs::create_dir_all(&dir).unwrap();
        let file = dir.join("structure.res");
        std::fs::write(&file, "TITL x\n").unwrap();
        assert!(matches!(
            parse_structure_file(&file),
            Err(VasputilError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        let missing = Path::new("/nonexistent/POSCAR");
        assert!(matches!(
            parse_structure_file(missing),
            Err(VasputilError::FileNotFound { .. })
        ));
    }
}
