//! 检测曲线积分与最终得分判定.

use itertools::Itertools;
use ordered_float::OrderedFloat;

/// 标准梯形法数值积分: `Σ (x_{i+1} − x_i) · (y_i + y_{i+1}) / 2`.
///
/// `x` 与 `y` 长度必须一致, 否则 panic. 点数不足 2 时返回 0.
pub fn trapezoid(x: &[f64], y: &[f64]) -> f64 {
    assert_eq!(x.len(), y.len(), "x 与 y 长度必须一致");
    x.iter()
        .zip(y.iter())
        .tuple_windows()
        .map(|((x0, y0), (x1, y1))| (x1 - x0) * (y0 + y1) / 2.0)
        .sum()
}

/// 镜像填充 shoelace 形式的梯形积分.
///
/// 将曲线与 x 轴上的镜像拼成闭合多边形, 用 shoelace 公式求有向面积.
/// 对下界处隐含零基线的曲线, 该式与 [`trapezoid`] 代数等价
/// (浮点误差内), 参考实现以此形式交付.
pub fn trapezoid_shoelace(x: &[f64], y: &[f64]) -> f64 {
    let m = x.len();
    assert_eq!(m, y.len(), "x 与 y 长度必须一致");
    if m == 0 {
        return 0.0;
    }

    // xp: 正序 x 接逆序 x; yp: m 个 0 接逆序 y.
    let n = 2 * m;
    let mut xp = vec![0.0f64; n];
    let mut yp = vec![0.0f64; n];
    for i in 0..m {
        xp[i] = x[i];
        xp[m + i] = x[m - i - 1];
        yp[m + i] = y[m - i - 1];
    }

    let mut p1 = 0.0f64;
    let mut p2 = 0.0f64;
    for i in 0..n - 1 {
        p1 += xp[i] * yp[i + 1];
        p2 += xp[i + 1] * yp[i];
    }
    p1 += xp[n - 1] * yp[0];
    p2 += xp[0] * yp[n - 1];

    0.5 * (p1 - p2)
}

/// 跨切片最终得分判定.
///
/// 设 `meanPos` 为正分均值 (无正分时取 0), `meanNeg` 为负分均值
/// (无负分时取 0). 若 `|meanPos| > |meanNeg|` 取逐切片得分的最大值,
/// 否则取最小值.
///
/// 注意: 所有得分恰好为 0 时两个均值都为 0, 比较为假,
/// 结果为 `min = 0` — 该决策分支被下游校准依赖, 按原样保留.
///
/// `per_slice` 不能为空, 否则 panic.
pub fn final_score(per_slice: &[f64]) -> f64 {
    assert!(!per_slice.is_empty(), "至少需要一个逐切片得分");

    let mean_or_zero = |v: &[f64]| -> f64 {
        if v.is_empty() {
            0.0
        } else {
            v.iter().sum::<f64>() / v.len() as f64
        }
    };
    let pos: Vec<f64> = per_slice.iter().copied().filter(|&v| v > 0.0).collect();
    let neg: Vec<f64> = per_slice.iter().copied().filter(|&v| v < 0.0).collect();
    let mean_pos = mean_or_zero(&pos);
    let mean_neg = mean_or_zero(&neg);

    let scores = per_slice.iter().copied().map(OrderedFloat);
    if mean_pos.abs() > mean_neg.abs() {
        scores.max().map(|v| v.0).unwrap()
    } else {
        scores.min().map(|v| v.0).unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trapezoid_linear_curve() {
        // ∫ x dx over [0, 1] = 0.5; 梯形法对线性函数精确.
        let x: Vec<f64> = (0..=10).map(|i| i as f64 / 10.0).collect();
        let y = x.clone();
        assert!((trapezoid(&x, &y) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_trapezoid_trivial_lengths() {
        assert_eq!(trapezoid(&[], &[]), 0.0);
        assert_eq!(trapezoid(&[1.0], &[3.0]), 0.0);
    }

    #[test]
    fn test_shoelace_matches_direct() {
        // 任意严格递增 x 与任意曲线: 两种形式在 1e-9 内一致.
        let mut seed = 0x9e37_79b9u64;
        let mut next = || {
            seed ^= seed << 13;
            seed ^= seed >> 7;
            seed ^= seed << 17;
            (seed % 10_000) as f64 / 10_000.0
        };
        for case in 0..50 {
            let m = 2 + case % 17;
            let mut x = Vec::with_capacity(m);
            let mut acc = next() * 0.1;
            for _ in 0..m {
                acc += 0.001 + next() * 0.05;
                x.push(acc);
            }
            let y: Vec<f64> = (0..m).map(|_| next() * 2.0 - 1.0).collect();
            let direct = trapezoid(&x, &y);
            let shoelace = trapezoid_shoelace(&x, &y);
            assert!(
                (direct - shoelace).abs() < 1e-9,
                "case {case}: {direct} vs {shoelace}",
            );
        }
    }

    #[test]
    fn test_final_score_negative_dominates() {
        // {3, −1, 5, −10}: meanPos = 4, meanNeg = −5.5 → 取最小值 −10.
        let scores = [3.0, -1.0, 5.0, -10.0];
        assert_eq!(final_score(&scores), -10.0);
    }

    #[test]
    fn test_final_score_positive_dominates() {
        let scores = [3.0, -1.0, 5.0];
        assert_eq!(final_score(&scores), 5.0);
    }

    #[test]
    fn test_final_score_all_zero_picks_min() {
        // 两均值都为 0, 比较为假 → min = 0. 按原样保留的决策分支.
        let scores = [0.0, 0.0, 0.0];
        assert_eq!(final_score(&scores), 0.0);
    }

    #[test]
    fn test_final_score_single_slice() {
        assert_eq!(final_score(&[2.5]), 2.5);
        assert_eq!(final_score(&[-2.5]), -2.5);
    }
}
