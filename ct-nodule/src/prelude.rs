//! 🫁 欢迎光临 🫁
//!
//! 涵盖了本 crate 一系列常用的功能.

pub use crate::{Idx2d, Idx3d};

pub use crate::data::{CtVolume, SegmentedSlice};

pub use crate::blocks::{
    extract_nodule_pair, NodulePair, TileGrid, WindowConvention,
};
pub use crate::detect::{
    detect_slice, final_score, trapezoid, trapezoid_shoelace, SliceDetection, ThresholdSweep,
};
pub use crate::segment::{
    flood_fill, label_components, label_nonzero, region_properties, segment_slice,
    select_lung_regions, BBox, LabelGrid, Region, SegmentOptions,
};

pub use crate::consts::{split_size_for, LUNG_HU_UPPER, REGION_SPAN_LIMIT};

pub use crate::{detect_progression, NoduleRef, NpdsError, NpdsReport, ProgressionConfig};
