//! 多阈值进展检测.
//!
//! 对每张切片, 逐块计算以结节窗口为参照的 HU 比值变化率,
//! 再在整个阈值扫描序列上符号化, 得到该切片的检测曲线.

use ndarray::{Array2, ArrayView1};
use once_cell::sync::Lazy;

use crate::consts::{RATIO_EPSILON, REFERENCE_SWEEP_LEN};
use crate::blocks::TileGrid;
use crate::NpdsError;

mod integrate;

pub use integrate::{final_score, trapezoid, trapezoid_shoelace};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// 检测阈值扫描序列: (0, 1] 内的严格递增实数序列.
///
/// 序列的顺序参与后续积分, 构造后不可修改.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ThresholdSweep {
    values: Vec<f64>,
}

impl ThresholdSweep {
    /// 校验并构造阈值序列.
    ///
    /// 序列必须非空、严格递增, 且所有值落在 (0, 1] 内;
    /// 否则返回 [`NpdsError::InvalidThresholdSweep`].
    pub fn new(values: Vec<f64>) -> Result<ThresholdSweep, NpdsError> {
        if values.is_empty() {
            return Err(NpdsError::InvalidThresholdSweep);
        }
        let in_range = values.iter().all(|&v| v > 0.0 && v <= 1.0);
        let increasing = values.windows(2).all(|w| w[0] < w[1]);
        if !in_range || !increasing {
            return Err(NpdsError::InvalidThresholdSweep);
        }
        Ok(ThresholdSweep { values })
    }

    /// 参考配置: (0, 1] 上均匀分布的 100 个阈值
    /// (`0.01, 0.02, …, 1.00`).
    pub fn reference() -> &'static ThresholdSweep {
        static REFERENCE: Lazy<ThresholdSweep> = Lazy::new(|| {
            let n = REFERENCE_SWEEP_LEN;
            let values = (1..=n).map(|i| i as f64 / n as f64).collect();
            ThresholdSweep::new(values).expect("reference sweep is well formed")
        });
        &REFERENCE
    }

    /// 阈值序列.
    #[inline]
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// 阈值个数 `R`.
    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// 序列是否为空. 按构造不变式恒为 `false`.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// 单张切片的检测产物.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SliceDetection {
    /// 逐块变化率 (长度为块总数).
    pub change_ratio: Vec<f64>,

    /// 检测矩阵: `R × 块总数`, 取值 {-1, 0, +1}.
    pub matrix: Array2<i8>,

    /// 检测曲线: 每个阈值下所有块符号的均值 (长度 `R`).
    pub curve: Vec<f64>,
}

/// 逐块均值比率: `mean(参照窗口 / |块 + ε|)` (逐元素).
///
/// 均值在 `f64` 中累积. `ε` 只稳定接近 0 的分母,
/// 不能消除均值比率本身为 0 时的数值退化.
fn mean_ratio(reference: ArrayView1<'_, f32>, tile: ArrayView1<'_, f32>) -> f64 {
    debug_assert_eq!(reference.len(), tile.len());
    let sum: f64 = reference
        .iter()
        .zip(tile.iter())
        .map(|(&n, &t)| n as f64 / (t as f64 + RATIO_EPSILON).abs())
        .sum();
    sum / reference.len() as f64
}

/// 对一张切片运行多阈值进展检测.
///
/// `a1` / `a2` 为基线与随访的组织块集合, `nodule_baseline` /
/// `nodule_followup` 为该切片的参照向量 (结节窗口或显式指定的块),
/// 长度必须等于块的像素数.
///
/// 每块的变化率为 `(mean₂ − mean₁) / |mean₁|`, 其中 `meanₖ` 为
/// [`mean_ratio`] 的结果. 基线均值比率精确为 0 时产生 ±inf/NaN,
/// **不做任何防护** 地流入检测矩阵与后续积分
/// (与参考实现逐位兼容的既定选择; NaN 在符号判定中记 0).
pub fn detect_slice(
    a1: &TileGrid,
    a2: &TileGrid,
    nodule_baseline: ArrayView1<'_, f32>,
    nodule_followup: ArrayView1<'_, f32>,
    sweep: &ThresholdSweep,
) -> Result<SliceDetection, NpdsError> {
    let pixels = a1.split_size() * a1.split_size();
    if a2.split_size() != a1.split_size() || a2.tile_count() != a1.tile_count() {
        return Err(NpdsError::ShapeMismatch(
            (a2.tile_count(), a2.split_size()),
            "matching baseline/followup tile grids",
        ));
    }
    if nodule_baseline.len() != pixels || nodule_followup.len() != pixels {
        return Err(NpdsError::ShapeMismatch(
            (nodule_baseline.len(), nodule_followup.len()),
            "nodule vectors of split_size^2 elements",
        ));
    }

    let tile_count = a1.tile_count();
    let r = sweep.len();
    let mut change_ratio = vec![0.0f64; tile_count];
    let mut matrix = Array2::<i8>::zeros((r, tile_count));

    for t in 0..tile_count {
        let mean_1 = mean_ratio(nodule_baseline, a1.tile(t));
        let mean_2 = mean_ratio(nodule_followup, a2.tile(t));
        let change = (mean_2 - mean_1) / mean_1.abs();
        change_ratio[t] = change;

        for (i, &lambda) in sweep.values().iter().enumerate() {
            matrix[(i, t)] = if change > lambda {
                1
            } else if change < -lambda {
                -1
            } else {
                0
            };
        }
    }

    let curve = (0..r)
        .map(|i| {
            let net: i64 = matrix.row(i).iter().map(|&s| s as i64).sum();
            net as f64 / tile_count as f64
        })
        .collect();

    Ok(SliceDetection {
        change_ratio,
        matrix,
        curve,
    })
}
