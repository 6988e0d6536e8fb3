//! # Disentanglement 窗口计算
//!
//! - 冻结窗口：`[emax(NW1-1) + m, emin(NW2+1) - m]`，完整覆盖 MLWF 能带
//! - 外窗口：`[emin(NB1) - m, emax(NB2) + m]`，不得比冻结窗口更窄
//!
//! 端点越过第一条或最后一条能带时，该端点不写入（覆盖全部价带/导带）。

use crate::error::{Result, VasputilError};
use crate::models::{Eigenval, Spin};

/// 默认能量余量 (eV)
pub const DEFAULT_MARGIN: f64 = 0.0005;

/// wannier90 disentanglement 窗口
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DisentanglementWindow {
    pub win_max: Option<f64>,
    pub win_min: Option<f64>,
    pub froz_max: Option<f64>,
    pub froz_min: Option<f64>,
}

impl DisentanglementWindow {
    /// 计算窗口
    ///
    /// `mlwf` 和 `bands` 为 1 起的闭区间能带序号。
    pub fn compute(
        eig: &Eigenval,
        spin: Option<Spin>,
        mlwf: (usize, usize),
        bands: (usize, usize),
        margin: f64,
    ) -> Result<Self> {
        let nbands = eig.num_bands;
        let (nw1, nw2) = mlwf;
        let (nb1, nb2) = bands;

        let froz_min = if nw1 > 1 {
            Some(eig.band_range(nw1 - 1, spin)?.1 + margin)
        } else {
            None
        };

        let froz_max = if nw2 < nbands {
            Some(eig.band_range(nw2 + 1, spin)?.0 - margin)
        } else {
            None
        };

        let win_min = if nb1 > 1 {
            let v = eig.band_range(nb1, spin)?.0 - margin;
            Some(match froz_min {
                Some(f) if v > f => f,
                _ => v,
            })
        } else {
            None
        };

        let win_max = if nb2 < nbands {
            let v = eig.band_range(nb2, spin)?.1 + margin;
            Some(match froz_max {
                Some(f) if v < f => f,
                _ => v,
            })
        } else {
            None
        };

        Ok(DisentanglementWindow {
            win_max,
            win_min,
            froz_max,
            froz_min,
        })
    }

    /// 按 `dis_win_max, dis_win_min, dis_froz_max, dis_froz_min` 顺序
    pub fn values(&self) -> [Option<f64>; 4] {
        [self.win_max, self.win_min, self.froz_max, self.froz_min]
    }
}

/// 检查命令行给出的能带范围与 `.win` 中的关键字一致
pub fn check_band_range(option: &str, key: &str, range: (usize, usize), expected: usize) -> Result<()> {
    let (first, last) = range;
    if first == 0 || last < first {
        return Err(VasputilError::InvalidArgument(format!(
            "{} expects two 1-based band indices with FIRST <= LAST, got {} {}",
            option, first, last
        )));
    }

    let given = last - first + 1;
    if given != expected {
        return Err(VasputilError::WindowMismatch {
            option: option.to_string(),
            key: key.to_string(),
            first,
            last,
            given,
            expected,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::KPoint;

    /// 6 条能带，2 个 k 点
    fn bands() -> Eigenval {
        let k = |energies: Vec<f64>| KPoint {
            occupations: vec![vec![1.0, 1.0, 1.0, 0.0, 0.0, 0.0]],
            energies: vec![energies],
        };
        Eigenval {
            num_electrons: 6,
            num_kpoints: 2,
            num_bands: 6,
            spin_polarized: false,
            kpoints: vec![
                k(vec![-8.0, -3.0, -1.0, 1.0, 3.0, 6.0]),
                k(vec![-7.0, -2.5, -0.5, 1.5, 4.0, 7.0]),
            ],
        }
    }

    #[test]
    fn test_interior_window() {
        let w = DisentanglementWindow::compute(&bands(), None, (3, 4), (2, 5), 0.0).unwrap();
        assert_eq!(w.froz_min, Some(-2.5));
        assert_eq!(w.froz_max, Some(3.0));
        assert_eq!(w.win_min, Some(-3.0));
        assert_eq!(w.win_max, Some(4.0));
    }

    #[test]
    fn test_outer_window_clamped_to_frozen() {
        // 外窗口取 NB1=3 (emin=-1.0) 高于 froz_min=-2.5，应被压到 -2.5
        let w = DisentanglementWindow::compute(&bands(), None, (3, 4), (3, 4), 0.0).unwrap();
        assert_eq!(w.win_min, Some(-2.5));
        assert_eq!(w.win_max, Some(3.0));
    }

    #[test]
    fn test_edges_leave_keys_out() {
        let w = DisentanglementWindow::compute(&bands(), None, (1, 6), (1, 6), DEFAULT_MARGIN).unwrap();
        assert_eq!(w.values(), [None, None, None, None]);
    }

    #[test]
    fn test_margin_applied() {
        let w = DisentanglementWindow::compute(&bands(), None, (2, 5), (1, 6), 0.0005).unwrap();
        assert!((w.froz_min.unwrap() - (-6.9995)).abs() < 1e-12);
        assert!((w.froz_max.unwrap() - 5.9995).abs() < 1e-12);
    }

    #[test]
    fn test_check_band_range() {
        assert!(check_band_range("-w", "num_wann", (3, 10), 8).is_ok());
        assert!(matches!(
            check_band_range("-w", "num_wann", (3, 9), 8),
            Err(VasputilError::WindowMismatch { given: 7, .. })
        ));
        assert!(check_band_range("-b", "num_bands", (5, 2), 8).is_err());
    }
}
