// crates/mh_turbulence/src/coeffs.rs

//! 模型系数块
//!
//! Launder-Sharma + Yap 闭合的全部命名常数。构造时从外部配置源
//! 填充（字典解析在外部完成，本层只接收已解析的块），之后除显式
//! `read` 外保持不变。
//!
//! # 默认系数
//!
//! | 系数 | 值 | 说明 |
//! |------|-----|------|
//! | Cmu | 0.09 | 涡粘性系数 |
//! | C1 | 1.44 | ε 方程生成项系数 |
//! | C2 | 1.92 | ε 方程破坏项系数 |
//! | C3 | -0.33 | RDT 压缩项系数（El Tahry 1983）|
//! | alphah | 1.0 | 热扩散逆 Prandtl 数（仅可压缩能量方程）|
//! | alphahk | 1.0 | k 方程逆 Prandtl 数（σ_k = 1/alphahk）|
//! | alphaEps | 0.76923 | ε 方程逆 Prandtl 数（σ_ε = 1/alphaEps = 1.3）|
//! | Cyap | 0.83 | Yap 修正系数（Yap 1987）|
//! | kappa | 0.41 | von Karman 常数 |
//!
//! 另带数值下限/上限（非物理系数，防止除零与数值爆炸）：
//! `k_min`、`eps_min`、`nu_t_max`、`yap_ratio_max`。

use crate::error::{TurbResult, TurbulenceError};
use crate::field::Scalar;
use serde::{Deserialize, Serialize};

/// Launder-Sharma + Yap 模型系数
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KEYapCoeffs {
    /// 涡粘性系数 C_μ
    #[serde(alias = "Cmu")]
    pub c_mu: Scalar,
    /// ε 方程生成项系数 C₁
    #[serde(alias = "C1")]
    pub c1: Scalar,
    /// ε 方程破坏项系数 C₂
    #[serde(alias = "C2")]
    pub c2: Scalar,
    /// RDT 压缩项系数 C₃（通常为负）
    #[serde(alias = "C3")]
    pub c3: Scalar,
    /// 热扩散逆 Prandtl 数（仅可压缩能量方程使用，本库透传）
    #[serde(alias = "alphah")]
    pub alpha_h: Scalar,
    /// k 方程逆 Prandtl 数，σ_k = 1/alphahk
    #[serde(alias = "alphahk")]
    pub alpha_hk: Scalar,
    /// ε 方程逆 Prandtl 数，σ_ε = 1/alphaEps
    #[serde(alias = "alphaEps")]
    pub alpha_eps: Scalar,
    /// Yap 修正系数
    #[serde(alias = "Cyap")]
    pub c_yap: Scalar,
    /// von Karman 常数
    pub kappa: Scalar,
    /// k 下限 [m²/s²]（除法保护）
    pub k_min: Scalar,
    /// ε 下限 [m²/s³]（除法保护，有界步骤的正下限）
    pub eps_min: Scalar,
    /// 涡粘性上限 [m²/s]
    pub nu_t_max: Scalar,
    /// Yap 长度尺度比 L/L_e 上限（近壁 y→0 保护）
    pub yap_ratio_max: Scalar,
}

impl Default for KEYapCoeffs {
    fn default() -> Self {
        Self {
            c_mu: 0.09,
            c1: 1.44,
            c2: 1.92,
            c3: -0.33,
            alpha_h: 1.0,
            alpha_hk: 1.0,
            alpha_eps: 0.76923,
            c_yap: 0.83,
            kappa: 0.41,
            k_min: 1e-10,
            eps_min: 1e-14,
            nu_t_max: 1e3,
            yap_ratio_max: 100.0,
        }
    }
}

impl KEYapCoeffs {
    /// k 方程 Prandtl 数 σ_k（严格为正，作为有效扩散的除数）
    #[inline]
    pub fn sigma_k(&self) -> Scalar {
        1.0 / self.alpha_hk
    }

    /// ε 方程 Prandtl 数 σ_ε（严格为正，作为有效扩散的除数）
    #[inline]
    pub fn sigma_eps(&self) -> Scalar {
        1.0 / self.alpha_eps
    }

    /// 校验系数块
    ///
    /// 非法系数是构造/重读期的硬失败，模型不会带病运行。
    pub fn validate(&self) -> TurbResult<()> {
        fn positive(name: &'static str, value: Scalar) -> TurbResult<()> {
            if !(value.is_finite() && value > 0.0) {
                return Err(TurbulenceError::InvalidCoefficient {
                    name,
                    value,
                    reason: "必须为有限正数".to_string(),
                });
            }
            Ok(())
        }

        positive("Cmu", self.c_mu)?;
        positive("C1", self.c1)?;
        positive("C2", self.c2)?;
        positive("alphah", self.alpha_h)?;
        positive("alphahk", self.alpha_hk)?;
        positive("alphaEps", self.alpha_eps)?;
        positive("kappa", self.kappa)?;
        positive("k_min", self.k_min)?;
        positive("eps_min", self.eps_min)?;
        positive("nu_t_max", self.nu_t_max)?;

        if !self.c3.is_finite() {
            return Err(TurbulenceError::InvalidCoefficient {
                name: "C3",
                value: self.c3,
                reason: "必须为有限数".to_string(),
            });
        }
        if !(self.c_yap.is_finite() && self.c_yap >= 0.0) {
            return Err(TurbulenceError::InvalidCoefficient {
                name: "Cyap",
                value: self.c_yap,
                reason: "必须为非负有限数".to_string(),
            });
        }
        if !(self.yap_ratio_max.is_finite() && self.yap_ratio_max > 1.0) {
            return Err(TurbulenceError::InvalidCoefficient {
                name: "yap_ratio_max",
                value: self.yap_ratio_max,
                reason: "必须大于 1".to_string(),
            });
        }

        Ok(())
    }
}
