// crates/mh_turbulence/src/damping.rs

//! 低雷诺数阻尼函数
//!
//! Launder-Sharma (1974) 低 Re 数形式的两个逐点阻尼场：
//!
//! ```text
//! Re_t = k² / (ν·ε)
//! f_μ  = exp(-3.4 / (1 + Re_t/50)²)
//! f₂   = 1 - 0.3·exp(-Re_t²)
//! ```
//!
//! 两者均为无量纲并裁剪到 [0, 1]：
//! - f_μ 随 Re_t 增大指数趋近 1，近壁趋近 exp(-3.4)
//! - f₂ 在近壁削弱破坏项的 C₂ 系数
//!
//! # 边缘情况
//!
//! 初始化/层流区域 ε 可能为零或极小。Re_t 的分母在除法前
//! 由 `eps_min` 与粘性下限钳位，避免除零爆炸。

use crate::coeffs::KEYapCoeffs;
use crate::field::{ScalarField, Unit};

/// f_μ 指数系数
const FMU_EXPONENT: f64 = 3.4;

/// Re_t 归一化尺度
const FMU_RE_SCALE: f64 = 50.0;

/// f₂ 衰减幅值
const F2_AMPLITUDE: f64 = 0.3;

/// 分子粘性下限 [m²/s]（除法保护）
const NU_FLOOR: f64 = 1e-30;

/// 逐点湍流雷诺数 Re_t = k²/(ν·ε)
///
/// 分母在除法前钳位，输出恒为有限非负无量纲数。
pub fn turbulence_reynolds(
    k: &ScalarField,
    epsilon: &ScalarField,
    nu: &ScalarField,
    coeffs: &KEYapCoeffs,
) -> ScalarField {
    debug_assert_eq!(k.unit(), Unit::TKE);
    debug_assert_eq!(epsilon.unit(), Unit::DISSIPATION);
    debug_assert_eq!(nu.unit(), Unit::VISCOSITY);

    let mut re_t = ScalarField::zeros("ReT", Unit::DIMLESS, k.len());
    for i in 0..k.len() {
        let k_i = k[i].max(0.0);
        let eps_i = epsilon[i].max(coeffs.eps_min);
        let nu_i = nu[i].max(NU_FLOOR);
        re_t[i] = k_i * k_i / (nu_i * eps_i);
    }
    re_t
}

/// 粘性阻尼函数 f_μ ∈ [0, 1]
///
/// f_μ = exp(-3.4/(1 + Re_t/50)²)
pub fn f_mu(
    k: &ScalarField,
    epsilon: &ScalarField,
    nu: &ScalarField,
    coeffs: &KEYapCoeffs,
) -> ScalarField {
    let re_t = turbulence_reynolds(k, epsilon, nu, coeffs);
    re_t.derive("fMu", Unit::DIMLESS, |r| {
        let denom = 1.0 + r / FMU_RE_SCALE;
        (-FMU_EXPONENT / (denom * denom)).exp().clamp(0.0, 1.0)
    })
}

/// 破坏项阻尼函数 f₂ ∈ [0, 1]
///
/// f₂ = 1 - 0.3·exp(-Re_t²)
pub fn f2(
    k: &ScalarField,
    epsilon: &ScalarField,
    nu: &ScalarField,
    coeffs: &KEYapCoeffs,
) -> ScalarField {
    let re_t = turbulence_reynolds(k, epsilon, nu, coeffs);
    re_t.derive("f2", Unit::DIMLESS, |r| {
        // Re_t 较大时 exp(-Re_t²) 下溢为 0，f₂ → 1
        (1.0 - F2_AMPLITUDE * (-(r * r)).exp()).clamp(0.0, 1.0)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(k: f64, eps: f64, nu: f64, n: usize) -> (ScalarField, ScalarField, ScalarField) {
        (
            ScalarField::uniform("k", Unit::TKE, n, k),
            ScalarField::uniform("epsilon", Unit::DISSIPATION, n, eps),
            ScalarField::uniform("nu", Unit::VISCOSITY, n, nu),
        )
    }

    #[test]
    fn test_reynolds_reference_value() {
        // Re_t = 0.01²/(1e-5 × 0.02) = 500
        let (k, eps, nu) = fields(0.01, 0.02, 1e-5, 3);
        let re_t = turbulence_reynolds(&k, &eps, &nu, &KEYapCoeffs::default());
        assert!((re_t[0] - 500.0).abs() < 1e-9);
        assert!(re_t.unit().is_dimensionless());
    }

    #[test]
    fn test_fmu_reference_value() {
        // Re_t = 500 → f_μ = exp(-3.4/11²) ≈ 0.9723
        let (k, eps, nu) = fields(0.01, 0.02, 1e-5, 3);
        let f = f_mu(&k, &eps, &nu, &KEYapCoeffs::default());
        let expected = (-3.4_f64 / (11.0 * 11.0)).exp();
        assert!((f[0] - expected).abs() < 1e-6);
        assert!((f[0] - 0.9723).abs() < 1e-3);
    }

    #[test]
    fn test_f2_reference_value() {
        // Re_t = 500 → f₂ ≈ 1
        let (k, eps, nu) = fields(0.01, 0.02, 1e-5, 3);
        let f = f2(&k, &eps, &nu, &KEYapCoeffs::default());
        assert!((f[0] - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_near_wall_limits() {
        // k → 0: Re_t → 0，f_μ → exp(-3.4)，f₂ → 0.7
        let (k, eps, nu) = fields(0.0, 0.01, 1e-6, 2);
        let fm = f_mu(&k, &eps, &nu, &KEYapCoeffs::default());
        let f = f2(&k, &eps, &nu, &KEYapCoeffs::default());
        assert!((fm[0] - (-3.4_f64).exp()).abs() < 1e-12);
        assert!((f[0] - 0.7).abs() < 1e-12);
    }

    #[test]
    fn test_zero_epsilon_guarded() {
        // ε = 0 不得产生 NaN/Inf，且输出仍在 [0,1]
        let (k, eps, nu) = fields(0.5, 0.0, 1e-6, 2);
        let fm = f_mu(&k, &eps, &nu, &KEYapCoeffs::default());
        let f = f2(&k, &eps, &nu, &KEYapCoeffs::default());
        assert!(fm.is_finite());
        assert!(f.is_finite());
        assert!(fm[0] >= 0.0 && fm[0] <= 1.0);
        assert!(f[0] >= 0.0 && f[0] <= 1.0);
    }

    #[test]
    fn test_bounds_over_sweep() {
        let coeffs = KEYapCoeffs::default();
        for &k_v in &[0.0, 1e-8, 1e-3, 0.1, 10.0] {
            for &e_v in &[0.0, 1e-10, 1e-4, 1.0] {
                let (k, eps, nu) = fields(k_v, e_v, 1e-6, 1);
                let fm = f_mu(&k, &eps, &nu, &coeffs);
                let f = f2(&k, &eps, &nu, &coeffs);
                assert!(fm[0] >= 0.0 && fm[0] <= 1.0, "fMu 越界: {}", fm[0]);
                assert!(f[0] >= 0.0 && f[0] <= 1.0, "f2 越界: {}", f[0]);
            }
        }
    }
}
