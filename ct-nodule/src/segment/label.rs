//! 4-邻接连通域标记.

use ndarray::{Array2, ArrayView2};

use super::fill::span_fill_with;
use crate::Idx2d;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// flood fill 过程中的逐像素状态.
///
/// 显式枚举, 避免用单个整数同时承载
/// "未访问 / 背景 / 已标记" 三种含义.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
enum FillState {
    /// 背景像素, 不参与标记.
    Background,

    /// 前景像素, 尚未归入任何连通域.
    Unvisited,

    /// 前景像素, 已归入编号为参数值的连通域.
    Labeled(u32),
}

/// 标记网格. `0` 为背景, 正整数代表一个 4-连通域.
///
/// 标签编号按发现顺序依次为 1, 2, 3, …; 编号除同一性外没有语义.
/// 给定相同输入, 编号分配顺序总是相同 (确定性).
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LabelGrid {
    labels: Array2<u32>,
    count: u32,
}

impl LabelGrid {
    /// 直接初始化. `count` 必须等于网格中标签的总数.
    pub(crate) fn new(labels: Array2<u32>, count: u32) -> Self {
        Self { labels, count }
    }

    /// 连通域总数 `K`. 标签编号范围为 `1..=K`.
    ///
    /// 注意: 该计数为 **标记时** 的连通域数量; 后续处理
    /// (如边缘剔除) 可能把某些标签清空, 但编号空间不变.
    #[inline]
    pub fn count(&self) -> u32 {
        self.count
    }

    /// 图像的分辨率 (高, 宽).
    #[inline]
    pub fn shape(&self) -> Idx2d {
        self.labels.dim()
    }

    /// 底层标签数组的只读视图.
    #[inline]
    pub fn view(&self) -> ArrayView2<'_, u32> {
        self.labels.view()
    }

    /// 获取给定位置的标签值. 越界时返回 `None`.
    #[inline]
    pub fn get(&self, pos: Idx2d) -> Option<u32> {
        self.labels.get(pos).copied()
    }

    /// 生成二值前景掩膜 (`标签 != 0`).
    pub fn to_mask(&self) -> Array2<bool> {
        self.labels.map(|&l| l != 0)
    }

    /// 只保留 `keep` 中的标签, 其余像素全部置 0, 返回新网格.
    pub fn retain_labels(&self, keep: &[u32]) -> LabelGrid {
        let labels = self
            .labels
            .map(|&l| if l != 0 && keep.contains(&l) { l } else { 0 });
        LabelGrid {
            labels,
            count: self.count,
        }
    }

    /// 直接获得底层数据.
    #[inline]
    pub fn into_raw(self) -> Array2<u32> {
        self.labels
    }
}

/// 对二值掩膜做 4-邻接连通域标记.
///
/// 种子遍历按 **列优先** 进行 (先扫完一列的所有行, 再移到下一列),
/// 标签编号按发现顺序分配. 测试只应依赖 "划分相同" 等价性,
/// 不应依赖具体编号.
pub fn label_components(mask: ArrayView2<'_, bool>) -> LabelGrid {
    let mut state = mask.map(|&fg| {
        if fg {
            FillState::Unvisited
        } else {
            FillState::Background
        }
    });

    let (height, width) = state.dim();
    let mut next = 1u32;
    for col in 0..width {
        for row in 0..height {
            if state[(row, col)] == FillState::Unvisited {
                span_fill_with(
                    &mut state,
                    (row, col),
                    |s| s == FillState::Unvisited,
                    FillState::Labeled(next),
                );
                next += 1;
            }
        }
    }

    let labels = state.map(|s| match *s {
        FillState::Background => 0,
        FillState::Labeled(id) => id,
        // 遍历覆盖了所有像素, 不可能有残留的未访问前景.
        FillState::Unvisited => unreachable!(),
    });
    LabelGrid::new(labels, next - 1)
}

/// 对实值网格做连通域标记, 精确等于 0 的像素视为背景.
#[inline]
pub fn label_nonzero(slice: ArrayView2<'_, f32>) -> LabelGrid {
    label_components(slice.map(|&v| v != 0.0).view())
}
