//! 区域属性提取与肺区域选择.

use log::warn;

use super::label::LabelGrid;
use crate::consts::{MAX_LUNG_REGIONS, REGION_SPAN_LIMIT};
use crate::NpdsError;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// 区域的像素 bounding box (闭区间).
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BBox {
    /// 最小行号.
    pub row_min: usize,

    /// 最大行号.
    pub row_max: usize,

    /// 最小列号.
    pub col_min: usize,

    /// 最大列号.
    pub col_max: usize,
}

impl BBox {
    /// 行方向跨度 (`row_max - row_min`).
    #[inline]
    pub fn row_span(&self) -> usize {
        self.row_max - self.row_min
    }

    /// 列方向跨度 (`col_max - col_min`).
    #[inline]
    pub fn col_span(&self) -> usize {
        self.col_max - self.col_min
    }
}

/// 单个标签的区域属性记录.
///
/// 上游处理 (如边缘剔除) 可能已把某个标签清空;
/// 这时 `area` 为 0, `bbox` 为 `None`, 记录本身仍然合法.
#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Region {
    /// 标签编号 (1 起).
    pub id: u32,

    /// 像素个数.
    pub area: usize,

    /// bounding box; 标签无像素时为 `None`.
    pub bbox: Option<BBox>,
}

impl Region {
    /// 该区域是否为可信的肺候选区域.
    ///
    /// 判定标准: 存在像素, 且 bbox 行跨度与列跨度均严格小于
    /// [`REGION_SPAN_LIMIT`]. 跨度达到上限的大块连通域通常
    /// 横贯躯干截面, 不可能是单侧肺.
    #[inline]
    pub fn is_plausible_lung(&self) -> bool {
        self.bbox
            .is_some_and(|b| b.row_span() < REGION_SPAN_LIMIT && b.col_span() < REGION_SPAN_LIMIT)
    }
}

/// 提取每个标签 (`1..=K`) 的区域属性.
///
/// 单次完整扫描, 逐标签累积行列的 min/max 与像素计数.
pub fn region_properties(grid: &LabelGrid) -> Vec<Region> {
    let k = grid.count() as usize;
    let mut areas = vec![0usize; k];
    let mut bboxes: Vec<Option<BBox>> = vec![None; k];

    for ((r, c), &label) in grid.view().indexed_iter() {
        if label == 0 {
            continue;
        }
        let i = (label - 1) as usize;
        debug_assert!(i < k, "标签超出编号空间");
        areas[i] += 1;
        match &mut bboxes[i] {
            Some(b) => {
                b.row_min = b.row_min.min(r);
                b.row_max = b.row_max.max(r);
                b.col_min = b.col_min.min(c);
                b.col_max = b.col_max.max(c);
            }
            slot @ None => {
                *slot = Some(BBox {
                    row_min: r,
                    row_max: r,
                    col_min: c,
                    col_max: c,
                });
            }
        }
    }

    (1..=k as u32)
        .map(|id| Region {
            id,
            area: areas[(id - 1) as usize],
            bbox: bboxes[(id - 1) as usize],
        })
        .collect()
}

/// 从区域记录中选出至多两个最大的可信肺区域, 返回保留的标签集合.
///
/// - 可信区域为空: 返回 [`NpdsError::NoValidRegion`], 致命.
/// - 可信区域不足两个但非空: 记录警告后照常返回
///   (单肺患者等情形下游可以接受).
/// - 超过两个: 单次线性扫描维护最大/次大两个追踪器;
///   面积相同时先发现者胜出 (有意为之, 下游校准依赖该确定性).
pub fn select_lung_regions(regions: &[Region]) -> Result<Vec<u32>, NpdsError> {
    if regions.is_empty() {
        return Err(NpdsError::EmptyRegionSet);
    }

    let valid: Vec<&Region> = regions.iter().filter(|r| r.is_plausible_lung()).collect();
    if valid.is_empty() {
        return Err(NpdsError::NoValidRegion);
    }

    if valid.len() <= MAX_LUNG_REGIONS {
        if valid.len() < MAX_LUNG_REGIONS {
            warn!("less than two valid lung regions were found");
        }
        return Ok(valid.iter().map(|r| r.id).collect());
    }

    // 最大与次大追踪器. 严格大于才替换, 因此同面积时先发现者胜出.
    let mut best: Option<&Region> = None;
    let mut second: Option<&Region> = None;
    for region in valid {
        if best.map_or(true, |b| region.area > b.area) {
            second = best;
            best = Some(region);
        } else if second.map_or(true, |s| region.area > s.area) {
            second = Some(region);
        }
    }

    let mut keep = Vec::with_capacity(MAX_LUNG_REGIONS);
    if let Some(b) = best {
        keep.push(b.id);
    }
    if let Some(s) = second {
        keep.push(s.id);
    }
    Ok(keep)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::segment::label_components;
    use ndarray::Array2;

    fn region(id: u32, area: usize, span: usize) -> Region {
        Region {
            id,
            area,
            bbox: Some(BBox {
                row_min: 0,
                row_max: span,
                col_min: 0,
                col_max: span,
            }),
        }
    }

    #[test]
    fn test_region_properties_single_scan() {
        let mut mask = Array2::from_elem((6, 6), false);
        // 块 1: (1,1)-(2,2); 块 2: (4,4) 单像素.
        for r in 1..3 {
            for c in 1..3 {
                mask[(r, c)] = true;
            }
        }
        mask[(4, 4)] = true;
        let grid = label_components(mask.view());
        let props = region_properties(&grid);
        assert_eq!(props.len(), 2);

        let big = props.iter().find(|r| r.area == 4).unwrap();
        assert_eq!(
            big.bbox,
            Some(BBox {
                row_min: 1,
                row_max: 2,
                col_min: 1,
                col_max: 2,
            })
        );
        let dot = props.iter().find(|r| r.area == 1).unwrap();
        assert_eq!(dot.bbox.unwrap().row_span(), 0);
    }

    #[test]
    fn test_region_properties_empty_label_is_valid_record() {
        let grid = label_components(Array2::from_elem((3, 3), true).view());
        assert_eq!(grid.count(), 1);
        // 清空唯一标签后, 记录仍存在: area 0, bbox None.
        let wiped = grid.retain_labels(&[]);
        let props = region_properties(&wiped);
        assert_eq!(props.len(), 1);
        assert_eq!(props[0].area, 0);
        assert_eq!(props[0].bbox, None);
        assert!(!props[0].is_plausible_lung());
    }

    #[test]
    fn test_select_empty_region_set() {
        assert_eq!(select_lung_regions(&[]), Err(NpdsError::EmptyRegionSet));
    }

    #[test]
    fn test_select_no_valid_region_is_fatal() {
        // 唯一区域跨度达到上限: 不可信, 致命错误.
        let oversized = region(1, 100, REGION_SPAN_LIMIT);
        assert_eq!(
            select_lung_regions(&[oversized]),
            Err(NpdsError::NoValidRegion)
        );
    }

    #[test]
    fn test_select_keeps_few_valid_as_is() {
        let regions = [region(1, 10, 5), region(2, 3, 5)];
        assert_eq!(select_lung_regions(&regions).unwrap(), vec![1, 2]);

        let single = [region(7, 10, 5)];
        assert_eq!(select_lung_regions(&single).unwrap(), vec![7]);
    }

    #[test]
    fn test_select_top_two_by_area() {
        let regions = [
            region(1, 10, 5),
            region(2, 50, 5),
            region(3, 30, 5),
            region(4, 5, 5),
        ];
        assert_eq!(select_lung_regions(&regions).unwrap(), vec![2, 3]);
    }

    #[test]
    fn test_select_tie_first_seen_wins() {
        // 三个同面积区域: 严格大于才替换, 保留前两个.
        let regions = [region(1, 20, 5), region(2, 20, 5), region(3, 20, 5)];
        assert_eq!(select_lung_regions(&regions).unwrap(), vec![1, 2]);
    }

    #[test]
    fn test_select_never_more_than_two() {
        let regions: Vec<Region> = (1..=9).map(|id| region(id, id as usize, 5)).collect();
        let keep = select_lung_regions(&regions).unwrap();
        assert_eq!(keep.len(), 2);
        assert!(keep.iter().all(|id| regions.iter().any(|r| r.id == *id)));
        assert_eq!(keep, vec![9, 8]);
    }

    #[test]
    fn test_oversized_region_filtered_before_selection() {
        // 大跨度区域即便面积最大也会在有效性过滤中被排除.
        let regions = [
            region(1, 10_000, REGION_SPAN_LIMIT + 10),
            region(2, 40, 5),
            region(3, 30, 5),
            region(4, 20, 5),
        ];
        assert_eq!(select_lung_regions(&regions).unwrap(), vec![2, 3]);
    }
}
