//! 运行时错误.

use crate::Idx2d;
use std::fmt;

/// 分割或检测阶段的致命运行时错误.
///
/// 所有错误都意味着当前结节的整条流水线中止; 核心算法内部没有重试.
/// 非致命情况 (如有效肺区域不足两个) 不在此枚举中, 仅产生日志警告.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NpdsError {
    /// 网格形状与声明的 `image_size` / `split_size` 不一致,
    /// 或 `image_size` 不能被 `split_size` 整除.
    ///
    /// 第一个参数为实际形状, 第二个参数为期望的约束描述.
    ShapeMismatch(Idx2d, &'static str),

    /// 有效肺区域集合为空, 分割无法继续.
    NoValidRegion,

    /// 上游给出的标记区域集合为空.
    EmptyRegionSet,

    /// 阈值扫描序列为空或不是 (0, 1] 内的严格递增序列.
    InvalidThresholdSweep,

    /// 参与计算的切片数为 0.
    EmptySliceRange,
}

impl fmt::Display for NpdsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NpdsError::ShapeMismatch(shape, want) => {
                write!(f, "shape mismatch: got {shape:?}, want {want}")
            }
            NpdsError::NoValidRegion => write!(f, "no plausible lung region"),
            NpdsError::EmptyRegionSet => write!(f, "empty region set"),
            NpdsError::InvalidThresholdSweep => {
                write!(f, "threshold sweep must be strictly increasing within (0, 1]")
            }
            NpdsError::EmptySliceRange => write!(f, "no slices to process"),
        }
    }
}

impl std::error::Error for NpdsError {}
