//! # 统一错误处理模块
//!
//! 定义 vasputil 的所有错误类型，使用 `thiserror` 派生。
//!
//! ## 依赖关系
//! - 被所有其他模块使用
//! - 无外部模块依赖

use thiserror::Error;

/// vasputil 统一错误类型
#[derive(Error, Debug)]
pub enum VasputilError {
    // ─────────────────────────────────────────────────────────────
    // I/O 错误
    // ─────────────────────────────────────────────────────────────
    #[error("Failed to read file: {path}")]
    FileReadError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write file: {path}")]
    FileWriteError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Directory not found: {path}")]
    DirectoryNotFound { path: String },

    #[error("File not found: {path}")]
    FileNotFound { path: String },

    #[error("File is empty: {path}")]
    EmptyFile { path: String },

    #[error("Required file '{path}' not found: {purpose}")]
    MissingInput { path: String, purpose: String },

    // ─────────────────────────────────────────────────────────────
    // 解析错误
    // ─────────────────────────────────────────────────────────────
    #[error("Failed to parse {format} file: {path}\nReason: {reason}")]
    ParseError {
        format: String,
        path: String,
        reason: String,
    },

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("'{marker}' not found in {path}{hint}")]
    MarkerNotFound {
        marker: String,
        path: String,
        hint: String,
    },

    // ─────────────────────────────────────────────────────────────
    // 能带 / Wannier / 振动模式错误
    // ─────────────────────────────────────────────────────────────
    #[error("Spin-polarized calculation (ISPIN=2): choose a spin channel with '-s spinup' or '-s spindw'")]
    SpinChannelRequired,

    #[error("EIGENVAL data has no spin channel {channel}")]
    MissingSpinChannel { channel: usize },

    #[error("Band index {index} is out of range (1..={num_bands})")]
    BandOutOfRange { index: usize, num_bands: usize },

    #[error("Range {first}..={last} given by {option} spans {given} bands, but {key} = {expected}")]
    WindowMismatch {
        option: String,
        key: String,
        first: usize,
        last: usize,
        given: usize,
        expected: usize,
    },

    #[error("Keyword '{key}' not found in {path}")]
    KeywordNotFound { key: String, path: String },

    #[error("No imaginary (f/i) mode found in {path}")]
    NoImaginaryMode { path: String },

    // ─────────────────────────────────────────────────────────────
    // 结构错误
    // ─────────────────────────────────────────────────────────────
    #[error("Unknown element symbol: {0}")]
    UnknownElement(String),

    #[error("'{symbol}' in {path} is not an element symbol; a VASP 4 POSCAR needs the element line added above the atom counts")]
    UnknownSpecies { symbol: String, path: String },

    #[error("Element '{element}' not present in {path}")]
    ElementNotPresent { element: String, path: String },

    // ─────────────────────────────────────────────────────────────
    // 外部命令错误
    // ─────────────────────────────────────────────────────────────
    #[error("External command '{command}' not found in PATH")]
    CommandNotFound { command: String },

    #[error("External command failed: {command}\n{stderr}")]
    CommandFailed { command: String, stderr: String },

    // ─────────────────────────────────────────────────────────────
    // 参数错误
    // ─────────────────────────────────────────────────────────────
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    // ─────────────────────────────────────────────────────────────
    // CSV 错误
    // ─────────────────────────────────────────────────────────────
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    // ─────────────────────────────────────────────────────────────
    // 其他
    // ─────────────────────────────────────────────────────────────
    #[error("{0}")]
    Other(String),
}

impl VasputilError {
    /// 构造解析错误的简写
    pub fn parse(format: &str, path: &str, reason: impl Into<String>) -> Self {
        VasputilError::ParseError {
            format: format.to_string(),
            path: path.to_string(),
            reason: reason.into(),
        }
    }
}

/// Result 类型别名
pub type Result<T> = std::result::Result<T, VasputilError>;
