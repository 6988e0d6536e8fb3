//! # analyze 命令实现
//!
//! 结构分析统一入口，包含多个子命令：
//! - `com`: 质心
//! - `neighbors`: 过近原子对检查
//!
//! ## 依赖关系
//! - 使用 `cli/analyze.rs` 定义的参数
//! - 子模块: com, neighbors

pub mod com;
pub mod neighbors;

use crate::cli::analyze::{AnalyzeArgs, AnalyzeCommands};
use crate::error::Result;

/// 执行 analyze 命令
pub fn execute(args: AnalyzeArgs) -> Result<()> {
    match args.command {
        AnalyzeCommands::Com(com_args) => com::execute(com_args),
        AnalyzeCommands::Neighbors(neighbors_args) => neighbors::execute(neighbors_args),
    }
}
