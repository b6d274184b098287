// crates/mh_turbulence/src/yap.rs

//! Yap 修正项
//!
//! Yap (1987) 经验修正：在回流/撞击流动中，标准 k-ε 会高估
//! 湍流长度尺度；向 ε 方程添加一个额外破坏源把长度尺度拉回
//! 近壁平衡值。
//!
//! ```text
//! L    = k^{3/2} / ε          湍流长度尺度
//! L_e  = κ·y                  近壁平衡长度尺度
//! sYap = Cyap · max(0, L/L_e - 1) · (L/L_e)² · ε²/k
//! ```
//!
//! 该项处处非负（修正只增加耗散，从不反向注入），量纲为
//! ε 每单位时间 [m²/s⁴]。
//!
//! # 近壁保护
//!
//! y → 0 时 L_e → 0，比值 L/L_e 无界。比值在使用前被
//! `yap_ratio_max` 钳位，壁面单元得到大而有限的修正值。

use crate::coeffs::KEYapCoeffs;
use crate::field::{ScalarField, Unit};

/// 壁面距离下限 [m]（除法保护）
const Y_FLOOR: f64 = 1e-12;

/// 逐点 Yap 修正源 [m²/s⁴]
///
/// 返回加入 ε 方程的额外破坏源，处处 ≥ 0 且有限。
pub fn s_yap(
    k: &ScalarField,
    epsilon: &ScalarField,
    y: &ScalarField,
    coeffs: &KEYapCoeffs,
) -> ScalarField {
    debug_assert_eq!(k.unit(), Unit::TKE);
    debug_assert_eq!(epsilon.unit(), Unit::DISSIPATION);
    debug_assert_eq!(y.unit(), Unit::LENGTH);
    debug_assert_eq!(k.len(), y.len(), "壁面距离场长度不匹配");

    let mut out = ScalarField::zeros("sYap", Unit::DISSIPATION_RATE, k.len());
    for i in 0..k.len() {
        let k_i = k[i].max(coeffs.k_min);
        let eps_i = epsilon[i].max(coeffs.eps_min);
        let y_i = y[i].max(Y_FLOOR);

        let l = k_i.powf(1.5) / eps_i;
        let l_e = coeffs.kappa * y_i;
        let ratio = (l / l_e).min(coeffs.yap_ratio_max);

        let excess = (ratio - 1.0).max(0.0);
        out[i] = coeffs.c_yap * excess * ratio * ratio * eps_i * eps_i / k_i;
    }
    out
}
