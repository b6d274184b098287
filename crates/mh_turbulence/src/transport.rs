// crates/mh_turbulence/src/transport.rs

//! 标量输运离散化协作者
//!
//! 空间离散与线性求解属于外部基础设施；本模块定义闭合模型
//! 依赖的最小契约 [`TransportDiscretization`]，并提供一个
//! 有限体积参考实现 [`ExplicitFvDiscretization`] 供测试与
//! 轻量场景使用。
//!
//! # 契约
//!
//! 求解一步广义标量输运：
//!
//! ```text
//! ∂φ/∂t = ∇·(Γ_eff ∇φ) + S_explicit - γ_implicit·φ
//! ```
//!
//! - `Γ_eff`: 有效扩散系数 [m²/s]（ν_t/σ + ν，由闭合模型给出）
//! - `S_explicit`: 显式源 [φ]/s
//! - `γ_implicit`: 隐式汇系数 [1/s]，非负；隐式处理保证
//!   源项本身不会把 φ 推成负值
//!
//! 收敛状态通过 [`SolveReport`] 上报，失败从不在此层重试，
//! 也不转成 `Err` —— 调用方（闭合模型）在任何结果上都执行
//! 有界步骤。

use crate::field::{Scalar, ScalarField, Unit};
use rayon::prelude::*;

/// 求解状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolveStatus {
    /// 收敛
    Converged,
    /// 达到最大迭代次数
    MaxIterationsReached,
    /// 发散（出现非有限值）
    Diverged,
}

/// 单次输运求解报告
#[derive(Debug, Clone, Copy)]
pub struct SolveReport {
    /// 求解状态
    pub status: SolveStatus,
    /// 迭代次数
    pub iterations: usize,
    /// 最终残差范数
    pub residual: Scalar,
    /// 初始残差范数
    pub initial_residual: Scalar,
}

impl SolveReport {
    /// 是否成功收敛
    pub fn converged(&self) -> bool {
        self.status == SolveStatus::Converged
    }
}

/// 标量输运离散化契约
///
/// 实现方负责对流/扩散的空间离散与线性系统求解；
/// 闭合模型只提供系数场与源项。
pub trait TransportDiscretization {
    /// 离散化覆盖的单元数
    fn n_cells(&self) -> usize;

    /// 就地推进场 `phi` 一个时间步
    ///
    /// # 参数
    /// - `phi`: 被求解场（就地更新）
    /// - `gamma_eff`: 有效扩散系数 [m²/s]
    /// - `explicit_src`: 显式源，量纲 = φ 每单位时间
    /// - `implicit_sink`: 隐式汇系数 [1/s]，逐单元非负
    /// - `dt`: 时间步长 [s]
    fn solve(
        &mut self,
        phi: &mut ScalarField,
        gamma_eff: &ScalarField,
        explicit_src: &ScalarField,
        implicit_sink: &ScalarField,
        dt: Scalar,
    ) -> SolveReport;
}

/// 有限体积参考离散化
///
/// 二点通量显式扩散 + 隐式 Euler 汇项：
///
/// ```text
/// D_i = (1/A_i) ∑_f Γ_face (φ_j - φ_i)/d_ij · L_f
/// φ_i^{n+1} = (φ_i + dt·(D_i + S_i)) / (1 + dt·γ_i)
/// ```
///
/// 汇项的隐式处理（衰减因子 1/(1+dt·γ)）无条件保持非负初值
/// 场的非负性。邻域为空时退化为逐点 ODE 推进。
pub struct ExplicitFvDiscretization {
    /// 单元面积 [m²]
    cell_areas: Vec<Scalar>,
    /// 邻域信息：(邻居索引, 面长度 [m], 单元心距离 [m])
    neighbors: Vec<Vec<(usize, Scalar, Scalar)>>,
}

/// 面积/距离下限（除法保护）
const GEOM_FLOOR: Scalar = 1e-10;

impl ExplicitFvDiscretization {
    /// 创建无连接（逐点）离散化
    pub fn pointwise(n_cells: usize) -> Self {
        Self {
            cell_areas: vec![1.0; n_cells],
            neighbors: vec![Vec::new(); n_cells],
        }
    }

    /// 从网格几何创建
    pub fn with_mesh(
        cell_areas: Vec<Scalar>,
        neighbors: Vec<Vec<(usize, Scalar, Scalar)>>,
    ) -> Self {
        debug_assert_eq!(cell_areas.len(), neighbors.len());
        Self { cell_areas, neighbors }
    }

    /// 均匀笛卡尔网格（nx × ny，间距 dx），四邻域
    pub fn uniform_grid(nx: usize, ny: usize, dx: Scalar) -> Self {
        let n = nx * ny;
        let mut neighbors = vec![Vec::new(); n];
        for j in 0..ny {
            for i in 0..nx {
                let c = j * nx + i;
                let mut push = |nb: usize| neighbors[c].push((nb, dx, dx));
                if i > 0 {
                    push(c - 1);
                }
                if i + 1 < nx {
                    push(c + 1);
                }
                if j > 0 {
                    push(c - nx);
                }
                if j + 1 < ny {
                    push(c + nx);
                }
            }
        }
        Self {
            cell_areas: vec![dx * dx; n],
            neighbors,
        }
    }

    /// 扩散算子 D_i（逐单元，面平均扩散系数、二点通量）
    fn diffusion(&self, phi: &ScalarField, gamma_eff: &ScalarField) -> Vec<Scalar> {
        let phi_s = phi.as_slice();
        let gamma = gamma_eff.as_slice();

        (0..phi.len())
            .into_par_iter()
            .map(|i| {
                let area = self.cell_areas[i].max(GEOM_FLOOR);
                let mut sum = 0.0;
                for &(j, face_length, distance) in &self.neighbors[i] {
                    if j >= phi_s.len() {
                        continue;
                    }
                    let gamma_face = 0.5 * (gamma[i] + gamma[j]);
                    let grad = (phi_s[j] - phi_s[i]) / distance.max(GEOM_FLOOR);
                    sum += gamma_face * grad * face_length;
                }
                sum / area
            })
            .collect()
    }
}

impl TransportDiscretization for ExplicitFvDiscretization {
    fn n_cells(&self) -> usize {
        self.cell_areas.len()
    }

    fn solve(
        &mut self,
        phi: &mut ScalarField,
        gamma_eff: &ScalarField,
        explicit_src: &ScalarField,
        implicit_sink: &ScalarField,
        dt: Scalar,
    ) -> SolveReport {
        debug_assert_eq!(phi.len(), self.n_cells());
        debug_assert_eq!(gamma_eff.unit(), Unit::VISCOSITY);
        debug_assert_eq!(
            explicit_src.unit(),
            phi.unit().div(Unit::new(0, 0, 1)),
            "显式源量纲必须为 φ 每单位时间"
        );
        debug_assert_eq!(implicit_sink.unit(), Unit::FREQUENCY);

        let diff = self.diffusion(phi, gamma_eff);

        let mut initial_residual = 0.0_f64;
        let mut residual = 0.0_f64;
        let mut finite = true;

        for i in 0..phi.len() {
            let rhs = diff[i] + explicit_src[i];
            initial_residual = initial_residual.max(rhs.abs());

            // 隐式 Euler 汇项：无条件稳定且保持正性
            let gamma = implicit_sink[i].max(0.0);
            let next = (phi[i] + dt * rhs) / (1.0 + dt * gamma);

            residual = residual.max((next - phi[i]).abs() / dt.max(GEOM_FLOOR));
            if !next.is_finite() {
                finite = false;
            }
            phi[i] = next;
        }

        SolveReport {
            status: if finite {
                SolveStatus::Converged
            } else {
                SolveStatus::Diverged
            },
            iterations: 1,
            residual,
            initial_residual,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pointwise_decay_positivity() {
        // dφ/dt = -γφ，隐式处理后永不为负
        let mut disc = ExplicitFvDiscretization::pointwise(4);
        let mut phi = ScalarField::uniform("k", Unit::TKE, 4, 1.0);
        let gamma_eff = ScalarField::uniform("DkEff", Unit::VISCOSITY, 4, 0.0);
        let src = ScalarField::zeros("Sk", Unit::TKE_RATE, 4);
        let sink = ScalarField::uniform("gamma", Unit::FREQUENCY, 4, 1e6);

        let report = disc.solve(&mut phi, &gamma_eff, &src, &sink, 1.0);
        assert!(report.converged());
        assert!(phi[0] > 0.0 && phi[0] < 1e-5);
    }

    #[test]
    fn test_implicit_decay_factor() {
        // φ' = φ/(1+dt·γ)：dt=0.5, γ=2 → 因子 0.5
        let mut disc = ExplicitFvDiscretization::pointwise(1);
        let mut phi = ScalarField::uniform("k", Unit::TKE, 1, 2.0);
        let gamma_eff = ScalarField::uniform("DkEff", Unit::VISCOSITY, 1, 0.0);
        let src = ScalarField::zeros("Sk", Unit::TKE_RATE, 1);
        let sink = ScalarField::uniform("gamma", Unit::FREQUENCY, 1, 2.0);

        disc.solve(&mut phi, &gamma_eff, &src, &sink, 0.5);
        assert!((phi[0] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_diffusion_smooths_step() {
        // 两单元阶跃在纯扩散下互相趋近且守恒
        let mut disc = ExplicitFvDiscretization::with_mesh(
            vec![1.0, 1.0],
            vec![vec![(1, 1.0, 1.0)], vec![(0, 1.0, 1.0)]],
        );
        let mut phi = ScalarField::from_vec("k", Unit::TKE, vec![1.0, 0.0]);
        let gamma_eff = ScalarField::uniform("DkEff", Unit::VISCOSITY, 2, 0.1);
        let src = ScalarField::zeros("Sk", Unit::TKE_RATE, 2);
        let sink = ScalarField::zeros("gamma", Unit::FREQUENCY, 2);

        disc.solve(&mut phi, &gamma_eff, &src, &sink, 0.1);
        assert!(phi[0] < 1.0 && phi[1] > 0.0);
        assert!((phi[0] + phi[1] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_uniform_grid_topology() {
        let disc = ExplicitFvDiscretization::uniform_grid(3, 3, 0.5);
        assert_eq!(disc.n_cells(), 9);
        // 角单元 2 邻居，中心单元 4 邻居
        assert_eq!(disc.neighbors[0].len(), 2);
        assert_eq!(disc.neighbors[4].len(), 4);
    }

    #[test]
    fn test_divergence_reported() {
        let mut disc = ExplicitFvDiscretization::pointwise(1);
        let mut phi = ScalarField::uniform("k", Unit::TKE, 1, 1.0);
        let gamma_eff = ScalarField::uniform("DkEff", Unit::VISCOSITY, 1, 0.0);
        let src = ScalarField::uniform("Sk", Unit::TKE_RATE, 1, Scalar::INFINITY);
        let sink = ScalarField::zeros("gamma", Unit::FREQUENCY, 1);

        let report = disc.solve(&mut phi, &gamma_eff, &src, &sink, 0.1);
        assert_eq!(report.status, SolveStatus::Diverged);
    }
}
