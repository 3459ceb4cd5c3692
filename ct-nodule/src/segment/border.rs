//! 边缘连通区域剔除.
//!
//! CT 切片中接触图像边缘的连通域通常是扫描床或视野外伪影,
//! 一律视为非解剖结构, 连同其远离边缘的像素整体丢弃.

use std::collections::HashSet;

use super::label::LabelGrid;

impl LabelGrid {
    /// 剔除与边缘连通的区域, 返回新网格.
    ///
    /// 距任一边缘不超过 `margin + 1` 个像素的带状区域为边缘带;
    /// 凡在边缘带内出现过的标签, 其 **所有** 像素 (无论远近)
    /// 都被替换为 `background`.
    ///
    /// 没有任何区域接触边缘带时, 输出与输入相同.
    pub fn clear_border(&self, margin: usize, background: u32) -> LabelGrid {
        let (height, width) = self.shape();
        let ext = margin + 1;

        let mut border_labels: HashSet<u32> = HashSet::new();
        for ((r, c), &label) in self.view().indexed_iter() {
            let banded = r < ext || r + ext >= height || c < ext || c + ext >= width;
            if banded && label != 0 {
                border_labels.insert(label);
            }
        }

        if border_labels.is_empty() {
            return self.clone();
        }

        let labels = self.view().map(|&l| {
            if l != 0 && border_labels.contains(&l) {
                background
            } else {
                l
            }
        });
        LabelGrid::new(labels, self.count())
    }
}
