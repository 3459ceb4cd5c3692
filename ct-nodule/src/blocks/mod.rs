//! 组织分块与结节窗口提取.
//!
//! 分割后的切片被切分为 `tiles_per_axis × tiles_per_axis` 个互不重叠的
//! `split_size × split_size` 方块, 作为双期比较的基本单位;
//! 同时围绕结节坐标提取每切片一对基线/随访窗口.

use ndarray::{Array1, Array2, ArrayView1, ArrayView2};

use crate::{Idx2d, NpdsError};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// 单张切片的组织块集合.
///
/// 内部为 `(块数, split_size²)` 矩阵: 块 `(i, j)` 的线性编号为
/// `i * tiles_per_axis + j`, 块内像素按行优先展平.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TileGrid {
    tiles: Array2<f32>,
    split_size: usize,
    tiles_per_axis: usize,
}

impl TileGrid {
    /// 将一张方形切片均匀切分为组织块.
    ///
    /// 要求切片为正方形且边长能被 `split_size` 整除;
    /// 违反时返回 [`NpdsError::ShapeMismatch`], 绝不静默截断.
    pub fn split(slice: ArrayView2<'_, f32>, split_size: usize) -> Result<TileGrid, NpdsError> {
        let (h, w) = slice.dim();
        if h != w {
            return Err(NpdsError::ShapeMismatch((h, w), "square slice"));
        }
        if split_size == 0 || h % split_size != 0 {
            return Err(NpdsError::ShapeMismatch(
                (h, w),
                "image_size divisible by split_size",
            ));
        }

        let tiles_per_axis = h / split_size;
        let mut tiles = Array2::zeros((tiles_per_axis * tiles_per_axis, split_size * split_size));
        for i in 0..tiles_per_axis {
            for j in 0..tiles_per_axis {
                let index = i * tiles_per_axis + j;
                for k in 0..split_size {
                    for l in 0..split_size {
                        tiles[(index, k * split_size + l)] =
                            slice[(i * split_size + k, j * split_size + l)];
                    }
                }
            }
        }
        Ok(TileGrid {
            tiles,
            split_size,
            tiles_per_axis,
        })
    }

    /// 块总数.
    #[inline]
    pub fn tile_count(&self) -> usize {
        self.tiles_per_axis * self.tiles_per_axis
    }

    /// 每轴块数.
    #[inline]
    pub fn tiles_per_axis(&self) -> usize {
        self.tiles_per_axis
    }

    /// 块边长.
    #[inline]
    pub fn split_size(&self) -> usize {
        self.split_size
    }

    /// 块坐标 `(i, j)` 的线性编号.
    #[inline]
    pub fn linear_index(&self, (i, j): Idx2d) -> usize {
        i * self.tiles_per_axis + j
    }

    /// 按线性编号取块 (行优先展平). 越界时 panic.
    #[inline]
    pub fn tile(&self, index: usize) -> ArrayView1<'_, f32> {
        self.tiles.row(index)
    }

    /// 按块坐标 `(i, j)` 取块. 越界时 panic.
    #[inline]
    pub fn tile_at(&self, pos: Idx2d) -> ArrayView1<'_, f32> {
        self.tile(self.linear_index(pos))
    }

    /// 按行优先块序与行优先像素序重新拼装出原切片.
    pub fn reassemble(&self) -> Array2<f32> {
        let n = self.tiles_per_axis * self.split_size;
        let s = self.split_size;
        let mut out = Array2::zeros((n, n));
        for index in 0..self.tile_count() {
            let (i, j) = (index / self.tiles_per_axis, index % self.tiles_per_axis);
            let tile = self.tile(index);
            for k in 0..s {
                for l in 0..s {
                    out[(i * s + k, j * s + l)] = tile[k * s + l];
                }
            }
        }
        out
    }
}

/// 结节窗口的下标约定.
///
/// 上游存在两种差一个单位的提取约定, 孰为基准尚未定论;
/// 在参考输出澄清之前, 两种约定都以显式命名的变体保留,
/// 不做猜测性统一.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum WindowConvention {
    /// 0 起点约定: 窗口边界为 `[c - s/2, c + s/2)`.
    #[default]
    ZeroBased,

    /// 遗留 1 起点约定: 起止边界各再减一个单位.
    OneBasedLegacy,
}

/// 单张切片的一对结节窗口 (基线, 随访), 均为行优先展平向量.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct NodulePair {
    /// 基线扫描的结节窗口.
    pub baseline: Array1<f32>,

    /// 随访扫描的结节窗口.
    pub followup: Array1<f32>,
}

/// 从一对已配准切片中提取以 `(x, y)` 为中心的结节窗口.
///
/// `x` 为列坐标, `y` 为行坐标; 两轴均使用同一 `split_size`,
/// 边界为 `[c - split_size/2, c + split_size/2)` (再按 `convention` 修正).
/// 窗口越界时返回 [`NpdsError::ShapeMismatch`].
pub fn extract_nodule_pair(
    baseline: ArrayView2<'_, f32>,
    followup: ArrayView2<'_, f32>,
    (x, y): Idx2d,
    split_size: usize,
    convention: WindowConvention,
) -> Result<NodulePair, NpdsError> {
    if baseline.dim() != followup.dim() {
        return Err(NpdsError::ShapeMismatch(
            followup.dim(),
            "paired slices of equal shape",
        ));
    }

    let half = split_size / 2;
    let offset = match convention {
        WindowConvention::ZeroBased => 0,
        WindowConvention::OneBasedLegacy => 1,
    };
    let (Some(x_start), Some(y_start)) = (
        x.checked_sub(half + offset),
        y.checked_sub(half + offset),
    ) else {
        return Err(NpdsError::ShapeMismatch(
            baseline.dim(),
            "nodule window within slice bounds",
        ));
    };
    let (x_end, y_end) = (x_start + split_size, y_start + split_size);

    let (h, w) = baseline.dim();
    if y_end > h || x_end > w {
        return Err(NpdsError::ShapeMismatch(
            (h, w),
            "nodule window within slice bounds",
        ));
    }

    let len = split_size * split_size;
    let mut base = Array1::zeros(len);
    let mut foll = Array1::zeros(len);
    let mut pixel = 0usize;
    for k in y_start..y_end {
        for l in x_start..x_end {
            base[pixel] = baseline[(k, l)];
            foll[pixel] = followup[(k, l)];
            pixel += 1;
        }
    }
    Ok(NodulePair {
        baseline: base,
        followup: foll,
    })
}
