//! # defect 命令实现
//!
//! 缺陷工具统一入口：
//! - `vacancy`: 不等价空位结构生成
//! - `sxalign`: sxdefectalign2d 迭代对齐
//!
//! ## 依赖关系
//! - 使用 `cli/defect.rs` 定义的参数
//! - 子模块: vacancy, sxalign

pub mod sxalign;
pub mod vacancy;

use crate::cli::defect::{DefectArgs, DefectCommands};
use crate::error::Result;

/// 执行 defect 命令
pub fn execute(args: DefectArgs) -> Result<()> {
    match args.command {
        DefectCommands::Vacancy(vacancy_args) => vacancy::execute(vacancy_args),
        DefectCommands::Sxalign(sxalign_args) => sxalign::execute(sxalign_args),
    }
}
