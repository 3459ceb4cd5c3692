//! 双期 CT 体数据与分割结果的基础数据结构.
//!
//! 体数据的解码、空间配准与裁剪由外部协作者完成;
//! 这里只接收已经按 `(切片, 高, 宽)` 顺序排列的 HU 网格.

use ndarray::{Array2, Array3, ArrayView2, Axis};

use crate::{Idx2d, Idx3d};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// 3D CT 体数据. HU 值以 `f32` 保存, 按 `(z, 高, 宽)` 访问.
///
/// 该结构是只读的: 构造之后不提供任何修改底层数据的方法.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CtVolume {
    data: Array3<f32>,
}

impl CtVolume {
    /// 从已解码、已配准的 HU 数组直接构造.
    #[inline]
    pub fn from_array(data: Array3<f32>) -> Self {
        Self { data }
    }

    /// 获取数据形状 (切片数, 高, 宽).
    #[inline]
    pub fn shape(&self) -> Idx3d {
        let &[z, h, w] = self.data.shape() else {
            unreachable!()
        };
        (z, h, w)
    }

    /// 获取水平切片形状 (高, 宽).
    #[inline]
    pub fn slice_shape(&self) -> Idx2d {
        let (_, h, w) = self.shape();
        (h, w)
    }

    /// 获取水平切片个数.
    #[inline]
    pub fn len_z(&self) -> usize {
        self.shape().0
    }

    /// 获取数据体素个数.
    #[inline]
    pub fn size(&self) -> usize {
        let (z, h, w) = self.shape();
        z * h * w
    }

    /// 检查索引是否合法.
    #[inline]
    pub fn check(&self, (z0, h0, w0): &Idx3d) -> bool {
        let (z, h, w) = self.shape();
        *z0 < z && *h0 < h && *w0 < w
    }

    /// 获取第 `z` 张水平切片的只读视图. `z` 越界时 panic.
    #[inline]
    pub fn axial_slice(&self, z: usize) -> ArrayView2<'_, f32> {
        self.data.index_axis(Axis(0), z)
    }

    /// 直接获得底层数据.
    #[inline]
    pub fn into_raw(self) -> Array3<f32> {
        self.data
    }
}

/// 单张切片的分割产物: 清理后的 HU 切片 + 二值肺掩膜.
///
/// 两者形状一致; 掩膜完全由阈值化与区域选择推导,
/// 构造之后不再修改.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SegmentedSlice {
    cleaned: Array2<f32>,
    mask: Array2<bool>,
}

impl SegmentedSlice {
    /// 直接初始化. 两个数组形状必须一致.
    pub(crate) fn new(cleaned: Array2<f32>, mask: Array2<bool>) -> Self {
        debug_assert_eq!(cleaned.dim(), mask.dim());
        Self { cleaned, mask }
    }

    /// 清理后的 HU 切片 (掩膜外像素为 0).
    #[inline]
    pub fn cleaned(&self) -> ArrayView2<'_, f32> {
        self.cleaned.view()
    }

    /// 二值肺掩膜.
    #[inline]
    pub fn mask(&self) -> &Array2<bool> {
        &self.mask
    }

    /// 图像的分辨率 (高, 宽).
    #[inline]
    pub fn shape(&self) -> Idx2d {
        self.cleaned.dim()
    }

    /// 拆出底层数据 (清理切片, 掩膜).
    #[inline]
    pub fn into_parts(self) -> (Array2<f32>, Array2<bool>) {
        (self.cleaned, self.mask)
    }
}
