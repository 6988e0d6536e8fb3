//! # 格点环境分类
//!
//! 用局部环境指纹近似对称等价：两个同元素格点在 `radius` 内
//! 各元素近邻数相同，且排序后的距离逐一相差不超过 `tolerance`，即视为等价。

use super::neighbors::neighbors_within;
use crate::models::Crystal;
use rayon::prelude::*;
use std::collections::BTreeMap;

/// 一组等价格点
#[derive(Debug, Clone)]
pub struct SiteClass {
    /// 代表格点（组内最小下标，0 起）
    pub representative: usize,
    /// 全部成员（升序）
    pub members: Vec<usize>,
}

impl SiteClass {
    pub fn multiplicity(&self) -> usize {
        self.members.len()
    }
}

/// 元素 -> 排序后的近邻距离
type Fingerprint = BTreeMap<String, Vec<f64>>;

fn fingerprint(crystal: &Crystal, site: usize, radius: f64) -> Fingerprint {
    let mut fp: Fingerprint = BTreeMap::new();
    for n in neighbors_within(crystal, site, radius) {
        fp.entry(crystal.atoms[n.index].element.clone())
            .or_default()
            .push(n.distance);
    }
    for distances in fp.values_mut() {
        distances.sort_by(|a, b| a.total_cmp(b));
    }
    fp
}

fn same_environment(a: &Fingerprint, b: &Fingerprint, tolerance: f64) -> bool {
    a.len() == b.len()
        && a.iter().zip(b.iter()).all(|((ea, da), (eb, db))| {
            ea == eb
                && da.len() == db.len()
                && da.iter().zip(db.iter()).all(|(x, y)| (x - y).abs() <= tolerance)
        })
}

/// 将元素 `element` 的所有格点划分为等价类
///
/// 类按代表格点下标排序。
pub fn classify_sites(crystal: &Crystal, element: &str, radius: f64, tolerance: f64) -> Vec<SiteClass> {
    let sites: Vec<usize> = crystal
        .atoms
        .iter()
        .enumerate()
        .filter(|(_, a)| a.element == element)
        .map(|(i, _)| i)
        .collect();

    let fingerprints: Vec<Fingerprint> = sites
        .par_iter()
        .map(|&i| fingerprint(crystal, i, radius))
        .collect();

    let mut classes: Vec<(Fingerprint, SiteClass)> = Vec::new();
    for (&site, fp) in sites.iter().zip(fingerprints) {
        match classes
            .iter_mut()
            .find(|(rep, _)| same_environment(rep, &fp, tolerance))
        {
            Some((_, class)) => class.members.push(site),
            None => classes.push((
                fp,
                SiteClass {
                    representative: site,
                    members: vec![site],
                },
            )),
        }
    }

    classes.into_iter().map(|(_, class)| class).collect()
}
