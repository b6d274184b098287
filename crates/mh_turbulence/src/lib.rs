// crates/mh_turbulence/src/lib.rs

//! Launder-Sharma 低雷诺数 k-ε 湍流闭合 + Yap 修正
//!
//! 为不可压/可压湍流求解器提供一步湍流闭合更新：给定速度梯度、
//! 分子粘性与壁面距离，推进湍动能 k 与耗散率 ε，并派生动量
//! 求解器使用的涡粘性 ν_t。
//!
//! # 模块概览
//!
//! - [`error`]: 统一错误类型
//! - [`field`]: 携带量纲的标量/向量场
//! - [`coeffs`]: 模型系数块（含校验与默认值）
//! - [`gradient`]: 速度梯度张量（应变率、散度）
//! - [`damping`]: 低 Re 数阻尼函数 f_μ、f₂
//! - [`yap`]: Yap (1987) ε 方程修正项
//! - [`transport`]: 标量输运离散化契约与参考实现
//! - [`model`]: 闭合模型与修正步编排
//!
//! # 外部协作者
//!
//! 网格表示、离散微分算子、压力-速度耦合、边界条件求值、
//! 字典解析与壁面距离计算都在本库之外；它们通过
//! [`transport::TransportDiscretization`]、[`model::FlowContext`]
//! 与 [`model::NutBoundary`] 三个接口进入。
//!
//! # 参考文献
//!
//! - Launder & Sharma (1974), Letters in Heat and Mass Transfer 1(2)
//! - Yap (1987), PhD Thesis, University of Manchester
//! - El Tahry (1983), Journal of Energy 7(4)（RDT 压缩项）
//!
//! # 使用示例
//!
//! ```
//! use mh_turbulence::{
//!     ExplicitFvDiscretization, FlowContext, KEYapCoeffs,
//!     LaunderSharmaKEYap, ScalarField, Unit, VelocityGradient,
//! };
//!
//! let n = 16;
//! let mut model = LaunderSharmaKEYap::new(n, KEYapCoeffs::default()).unwrap();
//! let mut disc = ExplicitFvDiscretization::pointwise(n);
//!
//! let nu = ScalarField::uniform("nu", Unit::VISCOSITY, n, 1e-6);
//! let y = ScalarField::uniform("y", Unit::LENGTH, n, 0.5);
//! let grads = vec![VelocityGradient::new(0.0, 1.0, 0.0, 0.0); n];
//!
//! let ctx = FlowContext { nu: &nu, y: &y, grad_u: &grads };
//! let report = model.correct(&ctx, &mut disc, 1e-3).unwrap();
//! assert!(report.converged());
//! assert!(model.k().min_value() >= 0.0);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod coeffs;
pub mod damping;
pub mod error;
pub mod field;
pub mod gradient;
pub mod model;
pub mod transport;
pub mod yap;

// 重导出常用类型
pub use coeffs::KEYapCoeffs;
pub use error::{TurbResult, TurbulenceError};
pub use field::{Scalar, ScalarField, Unit};
pub use gradient::VelocityGradient;
pub use model::{
    CorrectionReport, FlowContext, LaunderSharmaKEYap, NutBoundary,
    ZeroGradientNutBoundary,
};
pub use transport::{
    ExplicitFvDiscretization, SolveReport, SolveStatus, TransportDiscretization,
};
