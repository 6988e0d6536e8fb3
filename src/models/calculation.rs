//! # VASP 计算过程数据模型
//!
//! 存储从 OUTCAR 中提取的离子步信息和振动模式。
//!
//! ## 依赖关系
//! - 被 `parsers/outcar.rs` 使用
//! - 被 `commands/grad.rs`, `commands/dimer.rs` 使用

use serde::{Deserialize, Serialize};

/// OUTCAR 头部的运行参数
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunParameters {
    /// 原子数 NIONS
    pub nions: Option<usize>,

    /// 最大电子步数 NELM
    pub nelm: Option<usize>,

    /// 电子收敛判据 EDIFF (eV)
    pub ediff: Option<f64>,
}

/// 单个离子步的汇总
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IonicStep {
    /// 离子步序号，从 1 开始
    pub step: usize,

    /// energy(sigma->0) (eV)
    pub energy: f64,

    /// 相对此前最低能量的变化 (eV)
    pub delta_e: f64,

    /// 本离子步的电子步数
    pub scf_steps: usize,

    /// 可弛豫原子的平均受力 (eV/Å)
    pub avg_force: f64,

    /// 可弛豫原子的最大受力 (eV/Å)
    pub max_force: f64,

    /// 晶胞体积 (Å³)
    pub volume: f64,

    /// 总磁矩，仅自旋极化计算
    pub magnetization: Option<f64>,

    /// 电子步累计墙钟时间 (min)
    pub scf_minutes: f64,

    /// 离子步墙钟时间 (min)，LOOP+ 行缺失数字时为 None
    pub ionic_minutes: Option<f64>,
}

impl IonicStep {
    /// 电子步是否达到 NELM 上限（未收敛）
    pub fn hit_nelm(&self, nelm: Option<usize>) -> bool {
        nelm.map(|n| self.scf_steps == n).unwrap_or(false)
    }
}

/// 振动模式（Γ 点）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VibrationMode {
    /// 模式编号，OUTCAR 中的原始序号
    pub index: usize,

    /// 是否为虚频 (f/i)
    pub imaginary: bool,

    /// 波数 (cm⁻¹)
    pub wavenumber: f64,

    /// 每个原子的位移 dx dy dz
    pub displacements: Vec<[f64; 3]>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn step(scf: usize) -> IonicStep {
        IonicStep {
            step: 1,
            energy: -10.0,
            delta_e: 0.0,
            scf_steps: scf,
            avg_force: 0.0,
            max_force: 0.0,
            volume: 0.0,
            magnetization: None,
            scf_minutes: 0.0,
            ionic_minutes: None,
        }
    }

    #[test]
    fn test_hit_nelm() {
        assert!(step(60).hit_nelm(Some(60)));
        assert!(!step(12).hit_nelm(Some(60)));
        assert!(!step(60).hit_nelm(None));
    }
}
