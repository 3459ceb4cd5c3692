//! 端到端编排: 双体数据 → 单一 NPDS 分数.
//!
//! 逐切片计算互相独立 (每张切片只依赖自身数据与固定参数),
//! 因此切片级并行是纯增益优化; 只有跨切片的最终归约
//! 必须看到全部切片结果.

use cfg_if::cfg_if;

use crate::blocks::{extract_nodule_pair, TileGrid, WindowConvention};
use crate::detect::{detect_slice, final_score, trapezoid_shoelace, ThresholdSweep};
use crate::segment::{segment_slice, SegmentOptions};
use crate::{CtVolume, Idx2d, NpdsError};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// 结节参照的来源.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum NoduleRef {
    /// 以 `(x, y)` 为中心 (x 为列坐标, y 为行坐标),
    /// 从分割后切片提取 `split_size × split_size` 窗口.
    Centered(Idx2d),

    /// 直接取组织块网格中 `(i, j)` 处的块作为参照.
    Tile(Idx2d),
}

/// 一次进展检测的全部参数.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ProgressionConfig {
    /// 分块边长. 参见 [`crate::consts::split_size_for`].
    pub split_size: usize,

    /// 阈值扫描序列.
    pub sweep: ThresholdSweep,

    /// 结节窗口的下标约定.
    pub convention: WindowConvention,

    /// 结节参照来源.
    pub nodule: NoduleRef,

    /// 分割参数.
    pub segment: SegmentOptions,
}

impl ProgressionConfig {
    /// 以参考阈值扫描与默认分割参数构造.
    pub fn new(split_size: usize, nodule: NoduleRef) -> Self {
        Self {
            split_size,
            sweep: ThresholdSweep::reference().clone(),
            convention: WindowConvention::default(),
            nodule,
            segment: SegmentOptions::default(),
        }
    }
}

/// 进展检测报告.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct NpdsReport {
    /// 逐切片 NPDS (检测曲线在阈值序列上的积分).
    pub per_slice: Vec<f64>,

    /// 跨切片判定后的最终分数.
    pub score: f64,
}

/// 单张切片的完整处理: 分割 → 分块 → 参照提取 → 检测 → 积分.
fn slice_score(
    baseline: &CtVolume,
    followup: &CtVolume,
    z: usize,
    config: &ProgressionConfig,
) -> Result<f64, NpdsError> {
    let seg_1 = segment_slice(baseline.axial_slice(z), &config.segment)?;
    let seg_2 = segment_slice(followup.axial_slice(z), &config.segment)?;

    let a1 = TileGrid::split(seg_1.cleaned(), config.split_size)?;
    let a2 = TileGrid::split(seg_2.cleaned(), config.split_size)?;

    let detection = match config.nodule {
        NoduleRef::Centered(center) => {
            let pair = extract_nodule_pair(
                seg_1.cleaned(),
                seg_2.cleaned(),
                center,
                config.split_size,
                config.convention,
            )?;
            detect_slice(
                &a1,
                &a2,
                pair.baseline.view(),
                pair.followup.view(),
                &config.sweep,
            )?
        }
        NoduleRef::Tile(pos) => {
            detect_slice(&a1, &a2, a1.tile_at(pos), a2.tile_at(pos), &config.sweep)?
        }
    };

    Ok(trapezoid_shoelace(config.sweep.values(), &detection.curve))
}

/// 对一对已配准体数据运行完整的进展检测流水线.
///
/// 两个体数据形状必须一致且至少包含一张切片.
/// 开启 `rayon` feature 时逐切片并行计算; 结果与串行完全一致.
pub fn detect_progression(
    baseline: &CtVolume,
    followup: &CtVolume,
    config: &ProgressionConfig,
) -> Result<NpdsReport, NpdsError> {
    if baseline.shape() != followup.shape() {
        return Err(NpdsError::ShapeMismatch(
            followup.slice_shape(),
            "baseline/followup volumes of equal shape",
        ));
    }
    if baseline.len_z() == 0 {
        return Err(NpdsError::EmptySliceRange);
    }

    cfg_if! {
        if #[cfg(feature = "rayon")] {
            use rayon::prelude::*;
            let per_slice: Vec<f64> = (0..baseline.len_z())
                .into_par_iter()
                .map(|z| slice_score(baseline, followup, z, config))
                .collect::<Result<_, _>>()?;
        } else {
            let per_slice: Vec<f64> = (0..baseline.len_z())
                .map(|z| slice_score(baseline, followup, z, config))
                .collect::<Result<_, _>>()?;
        }
    }

    let score = final_score(&per_slice);
    Ok(NpdsReport { per_slice, score })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{Array2, Array3, Axis};

    /// 构造体数据: 每张切片在两处矩形内取给定 HU, 其余为软组织 50 HU.
    fn volume(z: usize, n: usize, hu: f32) -> CtVolume {
        let mut slice = Array2::from_elem((n, n), 50.0f32);
        for r in 4..n - 4 {
            for c in 2..n / 2 - 1 {
                slice[(r, c)] = hu;
            }
            for c in n / 2 + 1..n - 2 {
                slice[(r, c)] = hu;
            }
        }
        let mut data = Array3::zeros((z, n, n));
        for mut plane in data.axis_iter_mut(Axis(0)) {
            plane.assign(&slice);
        }
        CtVolume::from_array(data)
    }

    #[test]
    fn test_identical_volumes_score_zero() {
        // 基线与随访完全相同: 每块变化率为 0, 所有得分为 0,
        // 决策分支取 min = 0.
        let baseline = volume(3, 16, -800.0);
        let followup = volume(3, 16, -800.0);
        let mut config = ProgressionConfig::new(4, NoduleRef::Centered((8, 8)));
        config.sweep = ThresholdSweep::new(vec![0.1, 0.5, 1.0]).unwrap();

        let report = detect_progression(&baseline, &followup, &config).unwrap();
        assert_eq!(report.per_slice.len(), 3);
        assert!(report.per_slice.iter().all(|&v| v == 0.0));
        assert_eq!(report.score, 0.0);
    }

    #[test]
    fn test_attenuation_increase_scores_positive() {
        // 随访期肺组织 HU 上升 (-800 → -600): 变化率为正, 最终得分为正.
        let baseline = volume(2, 16, -800.0);
        let followup = volume(2, 16, -600.0);
        let mut config = ProgressionConfig::new(4, NoduleRef::Centered((8, 8)));
        config.sweep = ThresholdSweep::new(vec![0.05, 0.1, 0.2]).unwrap();

        let report = detect_progression(&baseline, &followup, &config).unwrap();
        assert!(report.score > 0.0, "score = {}", report.score);
        assert_eq!(report.score, final_score(&report.per_slice));
    }

    #[test]
    fn test_tile_reference_matches_centered_window() {
        // 结节窗口与某个组织块重合时, 两条参照路径的 change 语义一致.
        let baseline = volume(1, 16, -800.0);
        let followup = volume(1, 16, -600.0);
        let sweep = ThresholdSweep::new(vec![0.05, 0.1, 0.2]).unwrap();

        // 块 (1, 1) 覆盖行列 [4, 8); 其中心窗口为 (x, y) = (6, 6).
        let mut by_tile = ProgressionConfig::new(4, NoduleRef::Tile((1, 1)));
        by_tile.sweep = sweep.clone();
        let mut by_window = ProgressionConfig::new(4, NoduleRef::Centered((6, 6)));
        by_window.sweep = sweep;

        let a = detect_progression(&baseline, &followup, &by_tile).unwrap();
        let b = detect_progression(&baseline, &followup, &by_window).unwrap();
        assert!((a.score - b.score).abs() < 1e-12);
    }

    #[test]
    fn test_volume_shape_mismatch() {
        let baseline = volume(2, 16, -800.0);
        let followup = volume(3, 16, -800.0);
        let config = ProgressionConfig::new(4, NoduleRef::Tile((0, 0)));
        assert!(matches!(
            detect_progression(&baseline, &followup, &config),
            Err(NpdsError::ShapeMismatch(..))
        ));
    }

    #[test]
    fn test_empty_volume() {
        let empty = CtVolume::from_array(Array3::zeros((0, 16, 16)));
        let config = ProgressionConfig::new(4, NoduleRef::Tile((0, 0)));
        let err = detect_progression(&empty, &empty, &config).unwrap_err();
        assert_eq!(err, NpdsError::EmptySliceRange);
    }
}
