//! 肺实质分割.
//!
//! 单张切片的处理链: HU 阈值二值化 → 4-邻接连通域标记 →
//! 边缘连通区域剔除 → 区域属性提取 → 保留至多两个肺区域 → 掩膜应用.
//! 基线与随访体数据逐切片独立执行同一流程.

use ndarray::ArrayView2;

mod border;
mod fill;
mod label;
mod region;

pub use fill::flood_fill;
pub use label::{label_components, label_nonzero, LabelGrid};
pub use region::{region_properties, select_lung_regions, BBox, Region};

use crate::consts::LUNG_HU_UPPER;
use crate::{NpdsError, SegmentedSlice};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// 分割参数.
#[derive(Copy, Clone, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SegmentOptions {
    /// 前景 HU 上界: 严格低于该值的像素视为候选肺组织.
    pub hu_upper: f32,

    /// 边缘带宽参数 `b` (实际带宽为 `b + 1` 像素).
    pub border_margin: usize,
}

impl Default for SegmentOptions {
    fn default() -> Self {
        Self {
            hu_upper: LUNG_HU_UPPER,
            border_margin: 0,
        }
    }
}

/// 对单张原始 HU 切片做肺实质分割.
///
/// 返回 (清理后切片, 二值掩膜) 对. 掩膜外像素在清理切片中为 0.
///
/// # 失败
///
/// - [`NpdsError::NoValidRegion`]: 没有任何可信肺区域.
/// - [`NpdsError::EmptyRegionSet`]: 阈值化后完全没有前景连通域.
pub fn segment_slice(
    slice: ArrayView2<'_, f32>,
    opts: &SegmentOptions,
) -> Result<SegmentedSlice, NpdsError> {
    let mask = slice.map(|&hu| hu < opts.hu_upper);
    let labeled = label_components(mask.view());
    let cleared = labeled.clear_border(opts.border_margin, 0);

    let props = region_properties(&cleared);
    let keep = select_lung_regions(&props)?;
    let selected = cleared.retain_labels(&keep);

    let lung_mask = selected.to_mask();
    let mut cleaned = slice.to_owned();
    cleaned
        .iter_mut()
        .zip(lung_mask.iter())
        .for_each(|(pix, &keep)| {
            if !keep {
                *pix = 0.0;
            }
        });
    Ok(SegmentedSlice::new(cleaned, lung_mask))
}
