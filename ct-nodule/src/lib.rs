#![warn(missing_docs)]
// #![warn(clippy::missing_docs_in_private_items)]  // <= too strict.

//! 核心库. 提供双期 (基线/随访) 胸部 CT 的肺实质分割与结节进展检测
//! (NPDS, Nodule Progression Detection Score) 基础算法.
//!
//! 该 crate 目前仅提供 `safe` 接口. 所有计算均为确定性的纯函数,
//! 不访问文件系统, 不依赖外部配准引擎 (输入要求已经完成刚性配准).
//!
//! # 注意
//!
//! 1. 该 crate 只负责核心算法: 体数据读取、空间配准、百分位阈值查表
//!    等均由外部协作者完成.
//! 2. 在违反调用约定的情况下, 程序会直接 panic, 而不会导致内存错误.
//!    As what Rust promises. 可恢复的失败则通过 [`NpdsError`] 返回.
//!
//! # 算法流水线
//!
//! ### 肺实质分割 ✅
//!
//! 原始切片 → HU 阈值二值化 → 4-邻接连通域标记 (scanline flood fill)
//! → 边缘连通区域剔除 → 区域属性提取 → 保留至多两个肺区域 → 掩膜应用.
//!
//! 实现位于 `ct-nodule/src/segment`.
//!
//! ### 组织分块与结节窗口 ✅
//!
//! 分割后切片按 `split_size` 均匀切分为行优先展平的组织块;
//! 同时围绕结节坐标提取每切片一对基线/随访窗口.
//!
//! 实现位于 `ct-nodule/src/blocks`.
//!
//! ### 多阈值进展检测与积分 ✅
//!
//! 逐块 HU 比值变化率 → 阈值扫描符号化 → 逐切片检测曲线
//! → 梯形积分 → 跨切片最终得分.
//!
//! 实现位于 `ct-nodule/src/detect`.
//!
//! ### 端到端编排 ✅
//!
//! 双体数据到单一 NPDS 分数的一次性计算, 可选切片级 rayon 并行.
//!
//! 实现位于 `ct-nodule/src/pipeline.rs`.

/// 二维索引 (高, 宽), 同时也可一定程度上用作非负整数向量.
pub type Idx2d = (usize, usize);

/// 三维索引 (切片, 高, 宽).
pub type Idx3d = (usize, usize, usize);

mod data;

pub use data::{CtVolume, SegmentedSlice};

pub mod consts;

mod error;

pub use error::NpdsError;

pub mod blocks;
pub mod detect;
pub mod segment;

mod pipeline;

pub use pipeline::{detect_progression, NoduleRef, NpdsReport, ProgressionConfig};

pub mod prelude;
