// crates/mh_turbulence/src/model.rs

//! Launder-Sharma 低 Re 数 k-ε 闭合 + Yap 修正
//!
//! 每个外层求解器迭代调用一次 [`LaunderSharmaKEYap::correct`]，
//! 同步推进 k、ε 并派生涡粘性 ν_t。
//!
//! # 控制方程（单位质量形式）
//!
//! ```text
//! ∂k/∂t = ∇·(DkEff ∇k) + P - ε
//! ∂ε/∂t = ∇·(DεEff ∇ε) + C₁(ε/k)P - C₂f₂ε²/k + sYap + C₃·div(U)·ε
//! ν_t   = C_μ·f_μ·k²/ε
//! ```
//!
//! 其中 P = ν_t|S|² 为生成项，f_μ/f₂ 为低 Re 数阻尼函数，
//! sYap 为 Yap 修正，DkEff = ν_t/σ_k + ν。
//!
//! # 修正步骤
//!
//! 1. 用上一步 k、ε 更新 ν_t（与外层动量求解器的起步涡粘性一致）
//! 2. 组装并求解 ε 方程，钳位 ε ≥ eps_min
//! 3. 组装并求解 k 方程（破坏项用**新** ε），钳位 k ≥ 0
//! 4. 用新 k、ε 重算 ν_t
//! 5. 通过 [`NutBoundary`] 刷新 ν_t 边界值
//!
//! 求解不收敛由 [`CorrectionReport`] 上报、从不重试；
//! 无论求解结果如何有界步骤都执行，下游永远看不到负的 k/ε。

use crate::coeffs::KEYapCoeffs;
use crate::damping;
use crate::error::{TurbResult, TurbulenceError};
use crate::field::{Scalar, ScalarField, Unit};
use crate::gradient::VelocityGradient;
use crate::transport::{SolveReport, TransportDiscretization};
use crate::yap;
use tracing::{debug, warn};

/// k 场初值 [m²/s²]
const K_INIT: Scalar = 1e-4;

/// ε 场初值 [m²/s³]
const EPS_INIT: Scalar = 1e-6;

/// 每步流动输入（外部所有，只读借用）
///
/// 速度场本身留在动量求解器一侧，经外部梯度算子求导后
/// 以逐单元梯度张量进入本模型。
#[derive(Clone, Copy)]
pub struct FlowContext<'a> {
    /// 分子运动粘性 [m²/s]
    pub nu: &'a ScalarField,
    /// 壁面距离 [m]（外部计算，只读）
    pub y: &'a ScalarField,
    /// 速度梯度张量（外部梯度算子输出）
    pub grad_u: &'a [VelocityGradient],
}

impl FlowContext<'_> {
    /// 校验输入场的长度与量纲
    pub fn validate(&self, n_cells: usize) -> TurbResult<()> {
        fn check(field: &ScalarField, n: usize, unit: Unit) -> TurbResult<()> {
            if field.len() != n {
                return Err(TurbulenceError::FieldSizeMismatch {
                    field: field.name().to_string(),
                    expected: n,
                    actual: field.len(),
                });
            }
            if field.unit() != unit {
                return Err(TurbulenceError::DimensionMismatch {
                    field: field.name().to_string(),
                    expected: unit.to_string(),
                    actual: field.unit().to_string(),
                });
            }
            Ok(())
        }

        check(self.nu, n_cells, Unit::VISCOSITY)?;
        check(self.y, n_cells, Unit::LENGTH)?;
        if self.grad_u.len() != n_cells {
            return Err(TurbulenceError::FieldSizeMismatch {
                field: "grad(U)".to_string(),
                expected: n_cells,
                actual: self.grad_u.len(),
            });
        }
        Ok(())
    }
}

/// ν_t 边界刷新协作者
///
/// 边界条件求值属于外部场基础设施；闭合模型只在每次
/// 涡粘性更新后调用这个缝隙。
pub trait NutBoundary {
    /// 从域边界刷新 ν_t 的边界值
    fn refresh(&self, nut: &mut ScalarField);
}

/// 零梯度边界（默认）：单元值即边界值，无需修改
#[derive(Debug, Clone, Copy, Default)]
pub struct ZeroGradientNutBoundary;

impl NutBoundary for ZeroGradientNutBoundary {
    fn refresh(&self, _nut: &mut ScalarField) {}
}

/// 一次修正步的报告
#[derive(Debug, Clone, Copy)]
pub struct CorrectionReport {
    /// ε 方程求解报告
    pub epsilon_solve: SolveReport,
    /// k 方程求解报告
    pub k_solve: SolveReport,
}

impl CorrectionReport {
    /// 两个方程是否都收敛
    pub fn converged(&self) -> bool {
        self.epsilon_solve.converged() && self.k_solve.converged()
    }
}

/// Launder-Sharma + Yap 湍流闭合模型
///
/// 持有 k、ε、ν_t 场；场绑定到特定网格，因此模型不可复制
/// （未实现 `Clone`），只能移动或借用。修正窗口内本模型是
/// ν_t 的唯一写者。
pub struct LaunderSharmaKEYap {
    coeffs: KEYapCoeffs,
    k: ScalarField,
    epsilon: ScalarField,
    nut: ScalarField,
    production: ScalarField,
    boundary: Box<dyn NutBoundary + Send + Sync>,
}

impl LaunderSharmaKEYap {
    /// 创建模型（小的正初值，避免初始除零）
    pub fn new(n_cells: usize, coeffs: KEYapCoeffs) -> TurbResult<Self> {
        coeffs.validate()?;
        Ok(Self {
            coeffs,
            k: ScalarField::uniform("k", Unit::TKE, n_cells, K_INIT),
            epsilon: ScalarField::uniform("epsilon", Unit::DISSIPATION, n_cells, EPS_INIT),
            nut: ScalarField::zeros("nut", Unit::VISCOSITY, n_cells),
            production: ScalarField::zeros("Pk", Unit::TKE_RATE, n_cells),
            boundary: Box::new(ZeroGradientNutBoundary),
        })
    }

    /// 从既有场创建（重启场景）
    pub fn from_fields(
        k: ScalarField,
        epsilon: ScalarField,
        coeffs: KEYapCoeffs,
    ) -> TurbResult<Self> {
        coeffs.validate()?;
        if k.unit() != Unit::TKE {
            return Err(TurbulenceError::DimensionMismatch {
                field: k.name().to_string(),
                expected: Unit::TKE.to_string(),
                actual: k.unit().to_string(),
            });
        }
        if epsilon.unit() != Unit::DISSIPATION {
            return Err(TurbulenceError::DimensionMismatch {
                field: epsilon.name().to_string(),
                expected: Unit::DISSIPATION.to_string(),
                actual: epsilon.unit().to_string(),
            });
        }
        if k.len() != epsilon.len() {
            return Err(TurbulenceError::FieldSizeMismatch {
                field: epsilon.name().to_string(),
                expected: k.len(),
                actual: epsilon.len(),
            });
        }
        let n = k.len();
        Ok(Self {
            coeffs,
            k,
            epsilon,
            nut: ScalarField::zeros("nut", Unit::VISCOSITY, n),
            production: ScalarField::zeros("Pk", Unit::TKE_RATE, n),
            boundary: Box::new(ZeroGradientNutBoundary),
        })
    }

    /// 替换 ν_t 边界刷新协作者
    pub fn with_boundary(mut self, boundary: Box<dyn NutBoundary + Send + Sync>) -> Self {
        self.boundary = boundary;
        self
    }

    /// 单元数
    pub fn n_cells(&self) -> usize {
        self.k.len()
    }

    /// 当前系数块
    pub fn coeffs(&self) -> &KEYapCoeffs {
        &self.coeffs
    }

    /// 湍动能 k [m²/s²]
    pub fn k(&self) -> &ScalarField {
        &self.k
    }

    /// 耗散率 ε [m²/s³]
    pub fn epsilon(&self) -> &ScalarField {
        &self.epsilon
    }

    /// 涡粘性 ν_t [m²/s]
    pub fn nut(&self) -> &ScalarField {
        &self.nut
    }

    /// 粘性阻尼函数 f_μ ∈ [0,1]
    pub fn f_mu(&self, nu: &ScalarField) -> ScalarField {
        damping::f_mu(&self.k, &self.epsilon, nu, &self.coeffs)
    }

    /// 破坏项阻尼函数 f₂ ∈ [0,1]
    pub fn f2(&self, nu: &ScalarField) -> ScalarField {
        damping::f2(&self.k, &self.epsilon, nu, &self.coeffs)
    }

    /// Yap 修正源 [m²/s⁴]
    pub fn s_yap(&self, y: &ScalarField) -> ScalarField {
        yap::s_yap(&self.k, &self.epsilon, y, &self.coeffs)
    }

    /// k 方程的额外源项
    ///
    /// 本公式化中为零：生成/耗散走标准 k 方程组装路径。
    /// 保留为派生模型的扩展缝隙。
    pub fn k_source(&self) -> ScalarField {
        ScalarField::zeros("Sk", Unit::TKE_RATE, self.n_cells())
    }

    /// ε 方程的额外源项：-sYap
    ///
    /// 按方程组装约定返回**移到左端**的贡献（矩阵侧），
    /// 即右端源为 +sYap：修正抬升近壁耗散、缩短长度尺度。
    pub fn epsilon_source(&self, y: &ScalarField) -> ScalarField {
        -&self.s_yap(y)
    }

    /// k 的有效扩散系数 DkEff = ν_t/σ_k + ν
    pub fn dk_eff(&self, nu: &ScalarField) -> ScalarField {
        (&(&self.nut * (1.0 / self.coeffs.sigma_k())) + nu).derive(
            "DkEff",
            Unit::VISCOSITY,
            |v| v,
        )
    }

    /// ε 的有效扩散系数 DεEff = ν_t/σ_ε + ν
    pub fn depsilon_eff(&self, nu: &ScalarField) -> ScalarField {
        (&(&self.nut * (1.0 / self.coeffs.sigma_eps())) + nu).derive(
            "DepsilonEff",
            Unit::VISCOSITY,
            |v| v,
        )
    }

    /// 湍流长度尺度 L = k^{3/2}/ε [m]
    pub fn turbulent_length_scale(&self, cell: usize) -> Scalar {
        let k = self.k[cell].max(self.coeffs.k_min);
        let eps = self.epsilon[cell].max(self.coeffs.eps_min);
        k.powf(1.5) / eps
    }

    /// 湍流时间尺度 τ = k/ε [s]
    pub fn turbulent_time_scale(&self, cell: usize) -> Scalar {
        let k = self.k[cell].max(self.coeffs.k_min);
        let eps = self.epsilon[cell].max(self.coeffs.eps_min);
        k / eps
    }

    /// 更新涡粘性 ν_t = C_μ·f_μ·k²/ε
    ///
    /// 下限 0、上限 `nu_t_max` 钳位；随后通过边界协作者刷新
    /// ν_t 边界值。相同 k、ε、f_μ 下重复调用结果逐位相同。
    pub fn correct_nut(&mut self, nu: &ScalarField) {
        let f_mu = damping::f_mu(&self.k, &self.epsilon, nu, &self.coeffs);
        let c_mu = self.coeffs.c_mu;
        let eps_min = self.coeffs.eps_min;
        let nu_t_max = self.coeffs.nu_t_max;

        for i in 0..self.nut.len() {
            let k_i = self.k[i];
            let eps_i = self.epsilon[i].max(eps_min);
            let nu_t = c_mu * f_mu[i] * k_i * k_i / eps_i;
            self.nut[i] = nu_t.clamp(0.0, nu_t_max);
        }
        self.boundary.refresh(&mut self.nut);
    }

    /// 生成项 P = ν_t|S|²（用当前 ν_t）
    fn compute_production(&mut self, grad_u: &[VelocityGradient]) {
        for i in 0..self.production.len() {
            let s_mag = grad_u[i].strain_rate_magnitude();
            self.production[i] = self.nut[i] * s_mag * s_mag;
        }
    }

    /// 执行一次完整修正步
    ///
    /// 顺序见模块文档。返回两个输运求解的报告；不收敛只告警
    /// 上报，不重试，有界步骤无条件执行。
    pub fn correct(
        &mut self,
        ctx: &FlowContext<'_>,
        disc: &mut dyn TransportDiscretization,
        dt: Scalar,
    ) -> TurbResult<CorrectionReport> {
        let n = self.n_cells();
        ctx.validate(n)?;
        if disc.n_cells() != n {
            return Err(TurbulenceError::FieldSizeMismatch {
                field: "discretization".to_string(),
                expected: n,
                actual: disc.n_cells(),
            });
        }

        // 阶段 1: 用上一步 k、ε 更新 ν_t
        self.correct_nut(ctx.nu);
        self.compute_production(ctx.grad_u);

        let f2 = damping::f2(&self.k, &self.epsilon, ctx.nu, &self.coeffs);
        let s_yap = yap::s_yap(&self.k, &self.epsilon, ctx.y, &self.coeffs);

        // 阶段 2: ε 方程
        // 显式: C₁(ε/k)P + sYap (+ 正的 RDT 压缩贡献)
        // 隐式: C₂f₂ε/k (+ 负的 RDT 压缩贡献)
        // 破坏项折算成隐式汇系数，正性无条件保持；
        // Yap 修正抬升近壁耗散，把长度尺度拉回平衡值
        let mut eps_explicit =
            ScalarField::zeros("SEpsilon", Unit::DISSIPATION_RATE, n);
        let mut eps_implicit = ScalarField::zeros("spEpsilon", Unit::FREQUENCY, n);
        for i in 0..n {
            let k_i = self.k[i].max(self.coeffs.k_min);
            let eps_i = self.epsilon[i].max(self.coeffs.eps_min);
            let ratio = eps_i / k_i;

            let mut explicit = self.coeffs.c1 * ratio * self.production[i] + s_yap[i];
            let mut implicit = self.coeffs.c2 * f2[i] * ratio;

            let compression = self.coeffs.c3 * ctx.grad_u[i].divergence();
            if compression >= 0.0 {
                explicit += compression * eps_i;
            } else {
                implicit -= compression;
            }

            eps_explicit[i] = explicit;
            eps_implicit[i] = implicit;
        }

        let d_eps_eff = self.depsilon_eff(ctx.nu);
        let epsilon_solve =
            disc.solve(&mut self.epsilon, &d_eps_eff, &eps_explicit, &eps_implicit, dt);
        if !epsilon_solve.converged() {
            warn!(
                status = ?epsilon_solve.status,
                residual = epsilon_solve.residual,
                "ε 方程求解未收敛，继续执行有界步骤"
            );
        }
        self.epsilon.clamp_min(self.coeffs.eps_min);

        // 阶段 3: k 方程（破坏项用新 ε）
        let mut k_implicit = ScalarField::zeros("spK", Unit::FREQUENCY, n);
        for i in 0..n {
            let k_i = self.k[i].max(self.coeffs.k_min);
            k_implicit[i] = self.epsilon[i] / k_i;
        }
        // 额外源为零（k_source 契约），生成项为显式源
        let k_explicit = self.production.clone();

        let d_k_eff = self.dk_eff(ctx.nu);
        let k_solve = disc.solve(&mut self.k, &d_k_eff, &k_explicit, &k_implicit, dt);
        if !k_solve.converged() {
            warn!(
                status = ?k_solve.status,
                residual = k_solve.residual,
                "k 方程求解未收敛，继续执行有界步骤"
            );
        }
        self.k.clamp_min(0.0);

        // 阶段 4+5: 用新 k、ε 重算 ν_t 并刷新边界
        self.correct_nut(ctx.nu);

        debug!(
            k_max = self.k.max_value(),
            eps_max = self.epsilon.max_value(),
            nut_max = self.nut.max_value(),
            converged = epsilon_solve.converged() && k_solve.converged(),
            "湍流修正步完成"
        );

        Ok(CorrectionReport { epsilon_solve, k_solve })
    }

    /// 重读系数块
    ///
    /// 校验后整体替换，返回是否有值变化。不触发任何场重算 ——
    /// 调用方需另行调用 [`Self::correct`]。
    pub fn read(&mut self, block: &KEYapCoeffs) -> TurbResult<bool> {
        block.validate()?;
        let changed = *block != self.coeffs;
        self.coeffs = *block;
        Ok(changed)
    }
}

impl std::fmt::Debug for LaunderSharmaKEYap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LaunderSharmaKEYap")
            .field("n_cells", &self.n_cells())
            .field("coeffs", &self.coeffs)
            .finish_non_exhaustive()
    }
}
