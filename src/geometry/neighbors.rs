//! # 周期性近邻搜索
//!
//! 对原子 i，在所有满足距离条件的周期像中搜索近邻。
//! 分数坐标差先回折到 [-0.5, 0.5)，再按晶面间距确定每个方向需要的像数。

use crate::models::structure::norm;
use crate::models::Crystal;
use rayon::prelude::*;

/// 原子 i 的一个近邻
#[derive(Debug, Clone, PartialEq)]
pub struct Neighbor {
    /// 近邻原子下标 (0 起)
    pub index: usize,
    /// 距离 (Å)
    pub distance: f64,
    /// 近邻所在的周期像（晶格平移）
    pub image: [i32; 3],
}

/// 距离低于阈值的原子对，i < j
#[derive(Debug, Clone, PartialEq)]
pub struct ClosePair {
    pub i: usize,
    pub j: usize,
    pub distance: f64,
    pub image: [i32; 3],
}

/// 原子 `center` 在 `radius` 内的全部近邻（含其他原子的周期像与自身的周期像）
pub fn neighbors_within(crystal: &Crystal, center: usize, radius: f64) -> Vec<Neighbor> {
    let lattice = &crystal.lattice;
    let heights = lattice.heights();
    let reach: Vec<i32> = heights
        .iter()
        .map(|h| (radius / h + 0.5).ceil() as i32)
        .collect();

    let origin = crystal.atoms[center].position;
    let mut result = Vec::new();

    for (j, atom) in crystal.atoms.iter().enumerate() {
        let mut diff = [0.0; 3];
        let mut shift = [0i32; 3];
        for k in 0..3 {
            let d = atom.position[k] - origin[k];
            shift[k] = -(d.round() as i32);
            diff[k] = d + shift[k] as f64;
        }

        for na in -reach[0]..=reach[0] {
            for nb in -reach[1]..=reach[1] {
                for nc in -reach[2]..=reach[2] {
                    if j == center && na == 0 && nb == 0 && nc == 0 {
                        continue;
                    }
                    let frac = [diff[0] + na as f64, diff[1] + nb as f64, diff[2] + nc as f64];
                    let distance = norm(lattice.frac_to_cart(frac));
                    if distance < radius {
                        result.push(Neighbor {
                            index: j,
                            distance,
                            image: [shift[0] + na, shift[1] + nb, shift[2] + nc],
                        });
                    }
                }
            }
        }
    }

    result
}

/// 搜索所有距离小于 `threshold` 的原子对
///
/// 每个原子独立搜索，使用 rayon 并行。结果按 (i, j, 距离) 排序。
pub fn find_close_pairs(crystal: &Crystal, threshold: f64) -> Vec<ClosePair> {
    if threshold <= 0.0 || crystal.atoms.is_empty() {
        return Vec::new();
    }

    let mut pairs: Vec<ClosePair> = (0..crystal.atoms.len())
        .into_par_iter()
        .flat_map_iter(|i| {
            neighbors_within(crystal, i, threshold)
                .into_iter()
                .filter(move |n| n.index > i)
                .map(move |n| ClosePair {
                    i,
                    j: n.index,
                    distance: n.distance,
                    image: n.image,
                })
        })
        .collect();

    pairs.sort_by(|a, b| {
        (a.i, a.j)
            .cmp(&(b.i, b.j))
            .then(a.distance.total_cmp(&b.distance))
    });
    pairs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Atom, Lattice};

    fn dimer_across_boundary() -> Crystal {
        // 两个 H 原子隔着 a 方向边界相距 0.5 Å
        Crystal::new(
            "H2",
            Lattice::cubic(10.0),
            vec![
                Atom::new("H", [0.02, 0.5, 0.5]),
                Atom::new("H", [0.97, 0.5, 0.5]),
                Atom::new("O", [0.5, 0.5, 0.5]),
            ],
        )
    }

    #[test]
    fn test_close_pair_across_boundary() {
        let pairs = find_close_pairs(&dimer_across_boundary(), 0.8);
        assert_eq!(pairs.len(), 1);
        assert_eq!((pairs[0].i, pairs[0].j), (0, 1));
        assert!((pairs[0].distance - 0.5).abs() < 1e-9);
        assert_eq!(pairs[0].image, [-1, 0, 0]);
    }

    #[test]
    fn test_no_close_pairs() {
        assert!(find_close_pairs(&dimer_across_boundary(), 0.4).is_empty());
    }

    #[test]
    fn test_small_cell_reports_every_image() {
        // 边长 1.0 的立方格子中，单原子与自身的 6 个最近像相距 1.0
        let crystal = Crystal::new("sc", Lattice::cubic(1.0), vec![Atom::new("Po", [0.0; 3])]);
        let neighbors = neighbors_within(&crystal, 0, 1.1);
        assert_eq!(neighbors.len(), 6);
        assert!(neighbors.iter().all(|n| (n.distance - 1.0).abs() < 1e-12));

        // 两原子体心格子：i < j 的每个像都单独报告
        let bcc = Crystal::new(
            "bcc",
            Lattice::cubic(1.0),
            vec![Atom::new("Fe", [0.0; 3]), Atom::new("Fe", [0.5, 0.5, 0.5])],
        );
        let pairs = find_close_pairs(&bcc, 0.9);
        assert_eq!(pairs.len(), 8);
    }
}
