//! 通用常量.

/// 候选肺组织的 HU 上界. 严格低于该值的体素被视为前景 (空气/肺实质).
pub const LUNG_HU_UPPER: f32 = -400.0;

/// 有效肺区域 bbox 跨度上限 (以 512 像素尺度帧为基准).
///
/// 行跨度与列跨度均 **严格小于** 该值的区域才可能是肺;
/// 跨度达到该值的大块连通域通常横贯整个躯干截面, 直接排除.
pub const REGION_SPAN_LIMIT: usize = 350;

/// 肺区域选择的保留上限: 左右肺至多各一个连通域.
pub const MAX_LUNG_REGIONS: usize = 2;

/// HU 比值分母的稳定项. 原始值接近 0 时避免直接除零,
/// 但不能消除均值比率本身为 0 时的数值退化 (见 [`crate::detect`]).
pub const RATIO_EPSILON: f64 = 0.1;

/// 参考阈值扫描的阈值个数 (在 (0, 1] 上均匀分布).
pub const REFERENCE_SWEEP_LEN: usize = 100;

/// 小分块边长. 结节直径与切片数都不超过
/// [`SPLIT_SIZE_PIVOT`] 时使用.
pub const SPLIT_SIZE_SMALL: usize = 32;

/// 大分块边长.
pub const SPLIT_SIZE_LARGE: usize = 64;

/// 分块边长选择的分界点.
pub const SPLIT_SIZE_PIVOT: usize = 32;

/// 根据结节直径 (像素) 与参与计算的切片数选择分块边长.
///
/// 任意一者超过 [`SPLIT_SIZE_PIVOT`] 时选用
/// [`SPLIT_SIZE_LARGE`], 否则选用 [`SPLIT_SIZE_SMALL`].
#[inline]
pub const fn split_size_for(diameter_px: usize, slice_count: usize) -> usize {
    if diameter_px > SPLIT_SIZE_PIVOT || slice_count > SPLIT_SIZE_PIVOT {
        SPLIT_SIZE_LARGE
    } else {
        SPLIT_SIZE_SMALL
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_size_for() {
        assert_eq!(split_size_for(10, 10), SPLIT_SIZE_SMALL);
        assert_eq!(split_size_for(32, 32), SPLIT_SIZE_SMALL);
        assert_eq!(split_size_for(33, 10), SPLIT_SIZE_LARGE);
        assert_eq!(split_size_for(10, 33), SPLIT_SIZE_LARGE);
    }
}
