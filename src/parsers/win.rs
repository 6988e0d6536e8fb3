//! # wannier90 `.win` 读写
//!
//! 只处理本工具需要的两件事：读取整数关键字（`num_wann`, `num_bands`），
//! 以及重写 disentanglement 能量窗口关键字。
//!
//! ## 依赖关系
//! - 被 `commands/wannier.rs` 使用

use crate::error::{Result, VasputilError};

/// 重写时写入的关键字顺序
pub const WINDOW_KEYS: [&str; 4] = ["dis_win_max", "dis_win_min", "dis_froz_max", "dis_froz_min"];

/// 读取第一处包含 `key` 的行中的整数值
///
/// 支持 `key = value`、`key : value` 和 `key value`。
pub fn read_keyword_usize(content: &str, key: &str, path: &str) -> Result<usize> {
    let line = content
        .lines()
        .find(|l| l.contains(key))
        .ok_or_else(|| VasputilError::KeywordNotFound {
            key: key.to_string(),
            path: path.to_string(),
        })?;

    let after_key = &line[line.find(key).map(|i| i + key.len()).unwrap_or(0)..];
    let value = after_key
        .trim_start()
        .trim_start_matches(['=', ':'])
        .split_whitespace()
        .next()
        .unwrap_or("");

    value.parse().map_err(|_| {
        VasputilError::parse("win", path, format!("Cannot read integer value of '{}' from '{}'", key, line.trim()))
    })
}

/// 替换 disentanglement 窗口
///
/// 删除所有以这四个关键字开头的行，再按 [`WINDOW_KEYS`] 顺序在文件开头写入
/// 存在的值（6 位小数）。其他行保持原有顺序。
pub fn rewrite_disentanglement(content: &str, values: [Option<f64>; 4]) -> String {
    let mut result = String::new();

    for (key, value) in WINDOW_KEYS.iter().zip(values.iter()) {
        if let Some(v) = value {
            result.push_str(&format!("{} = {:.6}\n", key, v));
        }
    }

    for line in content.lines() {
        if WINDOW_KEYS.iter().any(|key| line.starts_with(key)) {
            continue;
        }
        result.push_str(line);
        result.push('\n');
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    const WIN: &str = "num_wann = 8\nnum_bands : 12\ndis_froz_min = -1.0\nbegin projections\nMo:d\nend projections\ndis_win_max = 9.0\n";

    #[test]
    fn test_read_keyword() {
        assert_eq!(read_keyword_usize(WIN, "num_wann", "w.win").unwrap(), 8);
        assert_eq!(read_keyword_usize(WIN, "num_bands", "w.win").unwrap(), 12);
        assert_eq!(read_keyword_usize("num_wann 4\n", "num_wann", "w.win").unwrap(), 4);
        assert!(matches!(
            read_keyword_usize(WIN, "num_iter", "w.win"),
            Err(VasputilError::KeywordNotFound { .. })
        ));
        assert!(read_keyword_usize("num_wann = many\n", "num_wann", "w.win").is_err());
    }

    #[test]
    fn test_rewrite_disentanglement() {
        let text = rewrite_disentanglement(WIN, [Some(10.25), None, Some(3.0), Some(-0.5)]);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines,
            vec![
                "dis_win_max = 10.250000",
                "dis_froz_max = 3.000000",
                "dis_froz_min = -0.500000",
                "num_wann = 8",
                "num_bands : 12",
                "begin projections",
                "Mo:d",
                "end projections",
            ]
        );
    }
}
