//! # 命令执行模块
//!
//! 实现各子命令的业务逻辑。
//!
//! ## 依赖关系
//! - 被 `main.rs` 调用
//! - 使用 `cli/`, `parsers/`, `models/`, `utils/`
//! - 子模块: grad, eigwin, wannier, convert, defect, analyze, dimer

pub mod analyze;
pub mod convert;
pub mod defect;
pub mod dimer;
pub mod eigwin;
pub mod grad;
pub mod wannier;

use crate::cli::Commands;
use crate::error::{Result, VasputilError};
use std::fs;
use std::path::Path;

/// 执行命令
pub fn run(cmd: Commands) -> Result<()> {
    match cmd {
        Commands::Grad(args) => grad::execute(args),
        Commands::Eigwin(args) => eigwin::execute(args),
        Commands::Wannier(args) => wannier::execute(args),
        Commands::Convert(args) => convert::execute(args),
        Commands::Defect(args) => defect::execute(args),
        Commands::Analyze(args) => analyze::execute(args),
        Commands::Dimer(args) => dimer::execute(args),
    }
}

/// 确认输入文件存在且非空
pub(crate) fn require_file(path: &Path) -> Result<()> {
    let meta = fs::metadata(path).map_err(|_| VasputilError::FileNotFound {
        path: path.display().to_string(),
    })?;
    if !meta.is_file() {
        return Err(VasputilError::FileNotFound {
            path: path.display().to_string(),
        });
    }
    if meta.len() == 0 {
        return Err(VasputilError::EmptyFile {
            path: path.display().to_string(),
        });
    }
    Ok(())
}

/// 读取整个文本文件
pub(crate) fn read_text(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| VasputilError::FileReadError {
        path: path.display().to_string(),
        source: e,
    })
}

/// 写入文本文件
pub(crate) fn write_text(path: &Path, content: &str) -> Result<()> {
    fs::write(path, content).map_err(|e| VasputilError::FileWriteError {
        path: path.display().to_string(),
        source: e,
    })
}

/// 创建目录（含父目录）
pub(crate) fn ensure_dir(path: &Path) -> Result<()> {
    fs::create_dir_all(path).map_err(|e| VasputilError::FileWriteError {
        path: path.display().to_string(),
        source: e,
    })
}
