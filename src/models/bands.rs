//! # 能带本征值数据模型
//!
//! 存储 EIGENVAL 中每个 k 点、每个自旋通道的能带能量与占据数，
//! 并提供 HOMO/LUMO 与能量窗口查询。
//!
//! ## 依赖关系
//! - 被 `parsers/eigenval.rs` 构造
//! - 被 `commands/eigwin.rs`, `wannier/` 使用

use crate::error::{Result, VasputilError};
use clap::ValueEnum;

/// 自旋通道
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum Spin {
    /// Spin-up channel
    #[value(name = "spinup")]
    Up,
    /// Spin-down channel
    #[value(name = "spindw")]
    Down,
}

impl std::fmt::Display for Spin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Spin::Up => write!(f, "spinup"),
            Spin::Down => write!(f, "spindw"),
        }
    }
}

/// 单个 k 点
#[derive(Debug, Clone)]
pub struct KPoint {
    /// energies[spin][band] (eV)
    pub energies: Vec<Vec<f64>>,

    /// occupations[spin][band]
    pub occupations: Vec<Vec<f64>>,
}

/// EIGENVAL 内容
#[derive(Debug, Clone)]
pub struct Eigenval {
    /// 电子数
    pub num_electrons: usize,

    /// 头部声明的 k 点数
    pub num_kpoints: usize,

    /// 能带数
    pub num_bands: usize,

    /// 是否自旋极化 (ISPIN=2)
    pub spin_polarized: bool,

    /// k 点列表
    pub kpoints: Vec<KPoint>,
}

impl KPoint {
    fn energies_in(&self, ch: usize) -> Result<&[f64]> {
        self.energies
            .get(ch)
            .map(Vec::as_slice)
            .ok_or(VasputilError::MissingSpinChannel { channel: ch + 1 })
    }

    fn occupations_in(&self, ch: usize) -> Result<&[f64]> {
        self.occupations
            .get(ch)
            .map(Vec::as_slice)
            .ok_or(VasputilError::MissingSpinChannel { channel: ch + 1 })
    }
}

impl Eigenval {
    /// 根据用户指定的自旋选择通道下标
    ///
    /// 自旋极化时必须指定；非极化时忽略指定值。
    pub fn channel(&self, spin: Option<Spin>) -> Result<usize> {
        if !self.spin_polarized {
            return Ok(0);
        }
        match spin {
            Some(Spin::Up) => Ok(0),
            Some(Spin::Down) => Ok(1),
            None => Err(VasputilError::SpinChannelRequired),
        }
    }

    /// HOMO 能带序号 (1 起)：各 k 点最高占据能带的最大值；无占据时为 0
    pub fn homo_index(&self, spin: Option<Spin>) -> Result<usize> {
        let ch = self.channel(spin)?;
        let mut homo = 0;
        for k in &self.kpoints {
            if let Some(i) = k.occupations_in(ch)?.iter().rposition(|&occ| occ > 0.0) {
                homo = homo.max(i + 1);
            }
        }
        Ok(homo)
    }

    /// LUMO = HOMO + 1
    pub fn lumo_index(&self, spin: Option<Spin>) -> Result<usize> {
        Ok(self.homo_index(spin)? + 1)
    }

    /// 指定能带 (1 起) 在所有 k 点上的最低和最高能量
    pub fn band_range(&self, band: usize, spin: Option<Spin>) -> Result<(f64, f64)> {
        let ch = self.channel(spin)?;
        if band == 0 || band > self.num_bands {
            return Err(VasputilError::BandOutOfRange {
                index: band,
                num_bands: self.num_bands,
            });
        }

        let mut emin = f64::INFINITY;
        let mut emax = f64::NEG_INFINITY;
        for k in &self.kpoints {
            let energies = k.energies_in(ch)?;
            let e = *energies.get(band - 1).ok_or(VasputilError::BandOutOfRange {
                index: band,
                num_bands: energies.len(),
            })?;
            emin = emin.min(e);
            emax = emax.max(e);
        }

        if self.kpoints.is_empty() {
            return Err(VasputilError::Other("EIGENVAL contains no k-points".to_string()));
        }
        Ok((emin, emax))
    }

    /// 每个 k 点落在 [e1, e2] 内的能带数
    pub fn bands_in_window(&self, e1: f64, e2: f64, spin: Option<Spin>) -> Result<Vec<usize>> {
        if e1 > e2 {
            return Err(VasputilError::InvalidArgument(format!(
                "Energy window lower bound {} is above upper bound {}",
                e1, e2
            )));
        }
        let ch = self.channel(spin)?;
        self.kpoints
            .iter()
            .map(|k| -> Result<usize> {
                Ok(k.energies_in(ch)?
                    .iter()
                    .filter(|&&e| e >= e1 && e <= e2)
                    .count())
            })
            .collect()
    }
}
