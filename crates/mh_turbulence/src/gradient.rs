// crates/mh_turbulence/src/gradient.rs

//! 速度梯度张量
//!
//! 梯度算子属于外部离散化协作者；本模块只定义逐单元的
//! 梯度张量及由其派生的应变率/散度，供生成项与 RDT 压缩项使用。
//!
//! # 2D 应变率张量
//!
//! ```text
//! S = [S_11  S_12]   [∂u/∂x        (∂u/∂y+∂v/∂x)/2]
//!     [S_21  S_22] = [(∂u/∂y+∂v/∂x)/2     ∂v/∂y    ]
//! ```
//!
//! # 应变率模
//!
//! ```text
//! |S| = √(2S_ij·S_ij) = √(2(∂u/∂x)² + 2(∂v/∂y)² + (∂u/∂y + ∂v/∂x)²)
//! ```

use crate::field::Scalar;

/// 速度梯度张量（单个单元）
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct VelocityGradient {
    /// ∂u/∂x [1/s]
    pub du_dx: Scalar,
    /// ∂u/∂y [1/s]
    pub du_dy: Scalar,
    /// ∂v/∂x [1/s]
    pub dv_dx: Scalar,
    /// ∂v/∂y [1/s]
    pub dv_dy: Scalar,
}

impl VelocityGradient {
    /// 创建新的速度梯度
    #[inline]
    pub fn new(du_dx: Scalar, du_dy: Scalar, dv_dx: Scalar, dv_dy: Scalar) -> Self {
        Self { du_dx, du_dy, dv_dx, dv_dy }
    }

    /// 应变率张量的模
    ///
    /// |S| = √(2*(∂u/∂x)² + 2*(∂v/∂y)² + (∂u/∂y + ∂v/∂x)²)
    #[inline]
    pub fn strain_rate_magnitude(&self) -> Scalar {
        let s11 = self.du_dx;
        let s22 = self.dv_dy;
        let s12 = 0.5 * (self.du_dy + self.dv_dx);

        (2.0 * s11 * s11 + 2.0 * s22 * s22 + 4.0 * s12 * s12).sqrt()
    }

    /// 速度散度 div(u) = ∂u/∂x + ∂v/∂y
    ///
    /// 不可压路径恒为零；可压路径进入 ε 方程的 RDT 压缩项。
    #[inline]
    pub fn divergence(&self) -> Scalar {
        self.du_dx + self.dv_dy
    }

    /// 检查梯度是否有效
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.du_dx.is_finite()
            && self.du_dy.is_finite()
            && self.dv_dx.is_finite()
            && self.dv_dy.is_finite()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pure_shear_strain() {
        // 纯剪切 ∂u/∂y = 1 → |S| = 1
        let g = VelocityGradient::new(0.0, 1.0, 0.0, 0.0);
        assert!((g.strain_rate_magnitude() - 1.0).abs() < 1e-12);
        assert_eq!(g.divergence(), 0.0);
    }

    #[test]
    fn test_uniform_compression_divergence() {
        let g = VelocityGradient::new(-0.5, 0.0, 0.0, -0.5);
        assert!((g.divergence() + 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_invalid_gradient() {
        let g = VelocityGradient::new(Scalar::NAN, 0.0, 0.0, 0.0);
        assert!(!g.is_valid());
    }
}
