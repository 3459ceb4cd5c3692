//! Scanline flood fill 原语.
//!
//! 使用显式种子栈的经典左右扫描 (left/right-span) 4-邻接填充,
//! 不使用递归, 以保证大图上的栈深度有界.

use ndarray::Array2;
use num::ToPrimitive;

use crate::Idx2d;

/// 以 `seed` 为种子, 将所有与之 4-连通且满足 `matches` 的像素
/// 全部替换为 `replacement`.
///
/// 扫描段沿列方向 (同一列内的连续行段): 先沿列向上回退到连续段上端,
/// 再向下逐行填充; 填充过程中在左右相邻列出现 "非目标 → 目标"
/// 跳变时压入新种子.
///
/// # 注意
///
/// 调用者必须保证 `matches(replacement)` 为 `false`,
/// 否则已填充像素会被反复入栈, 程序不会终止.
pub(crate) fn span_fill_with<T, F>(grid: &mut Array2<T>, seed: Idx2d, mut matches: F, replacement: T)
where
    T: Copy,
    F: FnMut(T) -> bool,
{
    let (height, width) = grid.dim();
    if seed.0 >= height || seed.1 >= width {
        return;
    }

    let mut stack: Vec<Idx2d> = Vec::with_capacity(16);
    stack.push(seed);

    while let Some((seed_h, w)) = stack.pop() {
        // 沿列向上越过连续目标段. 若种子本身已非目标 (可能在入栈后
        // 已被其它扫描段填充), 则从其下一行开始, 下方的填充循环会立即退出.
        let mut h = seed_h as isize;
        while h >= 0 && matches(grid[(h as usize, w)]) {
            h -= 1;
        }
        let mut h = (h + 1) as usize;

        let mut span_left = false;
        let mut span_right = false;

        // 向下填充连续段, 同时探测左右列的跳变.
        while h < height && matches(grid[(h, w)]) {
            grid[(h, w)] = replacement;

            if w > 0 {
                if !span_left && matches(grid[(h, w - 1)]) {
                    stack.push((h, w - 1));
                    span_left = true;
                } else if span_left && !matches(grid[(h, w - 1)]) {
                    span_left = false;
                }
            }
            if w + 1 < width {
                if !span_right && matches(grid[(h, w + 1)]) {
                    stack.push((h, w + 1));
                    span_right = true;
                } else if span_right && !matches(grid[(h, w + 1)]) {
                    span_right = false;
                }
            }
            h += 1;
        }
    }
}

/// 带容差的通用 flood fill.
///
/// 以 `seed` 处的像素值为目标色 `tc`, 将所有与 `seed` 4-连通且与 `tc`
/// 差值绝对值不超过 `tol` 的像素替换为 `replacement`.
///
/// 若 `replacement` 本身落入目标色容差范围, 则将其抬升为
/// `replacement + tol + 1` 后再填充, 以保证算法终止
/// (与经典 bwlabel 实现一致).
pub fn flood_fill<T>(grid: &mut Array2<T>, seed: Idx2d, replacement: T, tol: f64)
where
    T: Copy + ToPrimitive + num::NumCast,
{
    let (height, width) = grid.dim();
    if seed.0 >= height || seed.1 >= width {
        return;
    }

    let near = |a: T, b: T| -> bool {
        let (Some(a), Some(b)) = (a.to_f64(), b.to_f64()) else {
            return false;
        };
        (a - b).abs() <= tol
    };

    let tc = grid[seed];
    let mut rc = replacement;
    if near(tc, rc) {
        // 替换色与目标色无法区分时抬升替换色.
        let lifted = rc.to_f64().map(|v| v + tol + 1.0);
        if let Some(v) = lifted.and_then(num::cast) {
            rc = v;
        }
    }

    span_fill_with(grid, seed, |v| near(v, tc), rc);
}
