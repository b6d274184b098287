// crates/mh_turbulence/src/field.rs

//! 场类型与量纲系统
//!
//! 提供携带物理量纲的单元中心场类型：
//! - [`Unit`]: 运行时量纲标签（kg/m/s 半整数指数）
//! - [`ScalarField`]: 标量场（每单元一个值）
//!
//! # 量纲一致性
//!
//! 湍流闭合中每个代数组合都必须得到物理上正确的单位
//! （例如 ε 的单位是 k 每单位时间）。场算术在 debug 构建下
//! 通过 `debug_assert!` 强制检查量纲，release 构建零开销。
//!
//! # 半整数指数
//!
//! 湍流长度尺度 L = k^{3/2}/ε 含半整数幂，因此指数内部
//! 以**两倍值**存储（`m2 = 3` 表示 m^{3/2}），`sqrt` 恰为
//! 指数减半，保持精确。

use serde::{Deserialize, Serialize};

/// 标量类型（全库统一双精度）
pub type Scalar = f64;

/// 物理量纲
///
/// 以 {kg, m, s} 三个基本量的半整数指数表示。
/// 内部存储为指数的两倍，支持精确的 `sqrt`/`powi_half`。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Unit {
    /// 质量指数 × 2
    kg2: i16,
    /// 长度指数 × 2
    m2: i16,
    /// 时间指数 × 2
    s2: i16,
}

impl Unit {
    /// 无量纲
    pub const DIMLESS: Unit = Unit::new(0, 0, 0);
    /// 长度 [m]（壁面距离、长度尺度）
    pub const LENGTH: Unit = Unit::new(0, 1, 0);
    /// 湍动能 [m²/s²]
    pub const TKE: Unit = Unit::new(0, 2, -2);
    /// 耗散率 [m²/s³]
    pub const DISSIPATION: Unit = Unit::new(0, 2, -3);
    /// 运动粘性 [m²/s]
    pub const VISCOSITY: Unit = Unit::new(0, 2, -1);
    /// 频率 [1/s]（隐式汇项系数）
    pub const FREQUENCY: Unit = Unit::new(0, 0, -1);
    /// 耗散率变化率 [m²/s⁴]（ε 方程源项）
    pub const DISSIPATION_RATE: Unit = Unit::new(0, 2, -4);
    /// 湍动能变化率 [m²/s³]（k 方程源项，与耗散率同量纲）
    pub const TKE_RATE: Unit = Unit::new(0, 2, -3);

    /// 从整数指数创建
    pub const fn new(kg: i16, m: i16, s: i16) -> Self {
        Self { kg2: kg * 2, m2: m * 2, s2: s * 2 }
    }

    /// 量纲乘法
    pub const fn mul(self, rhs: Unit) -> Unit {
        Unit {
            kg2: self.kg2 + rhs.kg2,
            m2: self.m2 + rhs.m2,
            s2: self.s2 + rhs.s2,
        }
    }

    /// 量纲除法
    pub const fn div(self, rhs: Unit) -> Unit {
        Unit {
            kg2: self.kg2 - rhs.kg2,
            m2: self.m2 - rhs.m2,
            s2: self.s2 - rhs.s2,
        }
    }

    /// 整数幂
    pub const fn powi(self, n: i16) -> Unit {
        Unit {
            kg2: self.kg2 * n,
            m2: self.m2 * n,
            s2: self.s2 * n,
        }
    }

    /// 平方根（指数减半，精确）
    pub const fn sqrt(self) -> Unit {
        Unit {
            kg2: self.kg2 / 2,
            m2: self.m2 / 2,
            s2: self.s2 / 2,
        }
    }

    /// 是否无量纲
    pub const fn is_dimensionless(self) -> bool {
        self.kg2 == 0 && self.m2 == 0 && self.s2 == 0
    }
}

impl std::fmt::Display for Unit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        fn exp(f: &mut std::fmt::Formatter<'_>, sym: &str, doubled: i16) -> std::fmt::Result {
            match doubled {
                0 => Ok(()),
                2 => write!(f, " {}", sym),
                d if d % 2 == 0 => write!(f, " {}^{}", sym, d / 2),
                d => write!(f, " {}^{}/2", sym, d),
            }
        }
        if self.is_dimensionless() {
            return write!(f, "[-]");
        }
        write!(f, "[")?;
        exp(f, "kg", self.kg2)?;
        exp(f, "m", self.m2)?;
        exp(f, "s", self.s2)?;
        write!(f, " ]")
    }
}

/// 标量场（单元中心）
///
/// 每个控制体一个值，携带名称与物理量纲。
/// 算术运算在 debug 构建下校验量纲与长度一致性。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScalarField {
    name: String,
    unit: Unit,
    data: Vec<Scalar>,
}

impl ScalarField {
    /// 创建零初始化场
    pub fn zeros(name: &str, unit: Unit, n_cells: usize) -> Self {
        Self {
            name: name.to_string(),
            unit,
            data: vec![0.0; n_cells],
        }
    }

    /// 创建均匀初值场
    pub fn uniform(name: &str, unit: Unit, n_cells: usize, value: Scalar) -> Self {
        Self {
            name: name.to_string(),
            unit,
            data: vec![value; n_cells],
        }
    }

    /// 从既有数据创建
    pub fn from_vec(name: &str, unit: Unit, data: Vec<Scalar>) -> Self {
        Self {
            name: name.to_string(),
            unit,
            data,
        }
    }

    /// 场名
    pub fn name(&self) -> &str {
        &self.name
    }

    /// 物理量纲
    pub fn unit(&self) -> Unit {
        self.unit
    }

    /// 单元数
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// 是否为空
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// 只读切片
    pub fn as_slice(&self) -> &[Scalar] {
        &self.data
    }

    /// 可变切片
    pub fn as_mut_slice(&mut self) -> &mut [Scalar] {
        &mut self.data
    }

    /// 全场填充
    pub fn fill(&mut self, value: Scalar) {
        self.data.fill(value);
    }

    /// 下界钳位（非负性/正性约束的执行点）
    pub fn clamp_min(&mut self, floor: Scalar) {
        for v in &mut self.data {
            if *v < floor {
                *v = floor;
            }
        }
    }

    /// 上界钳位
    pub fn clamp_max(&mut self, ceil: Scalar) {
        for v in &mut self.data {
            if *v > ceil {
                *v = ceil;
            }
        }
    }

    /// 全场最小值
    pub fn min_value(&self) -> Scalar {
        self.data.iter().copied().fold(Scalar::INFINITY, Scalar::min)
    }

    /// 全场最大值
    pub fn max_value(&self) -> Scalar {
        self.data.iter().copied().fold(Scalar::NEG_INFINITY, Scalar::max)
    }

    /// 检查所有值是否有限
    pub fn is_finite(&self) -> bool {
        self.data.iter().all(|v| v.is_finite())
    }

    /// 带重命名/换量纲的逐点派生场
    pub fn derive<F: Fn(Scalar) -> Scalar>(&self, name: &str, unit: Unit, f: F) -> Self {
        Self {
            name: name.to_string(),
            unit,
            data: self.data.iter().map(|&v| f(v)).collect(),
        }
    }
}

impl std::ops::Index<usize> for ScalarField {
    type Output = Scalar;

    #[inline]
    fn index(&self, i: usize) -> &Scalar {
        &self.data[i]
    }
}

impl std::ops::IndexMut<usize> for ScalarField {
    #[inline]
    fn index_mut(&mut self, i: usize) -> &mut Scalar {
        &mut self.data[i]
    }
}

impl std::ops::Add for &ScalarField {
    type Output = ScalarField;

    fn add(self, rhs: &ScalarField) -> ScalarField {
        debug_assert_eq!(
            self.unit, rhs.unit,
            "量纲不匹配: {} + {}", self.unit, rhs.unit
        );
        debug_assert_eq!(self.len(), rhs.len(), "场长度不匹配");
        ScalarField {
            name: self.name.clone(),
            unit: self.unit,
            data: self
                .data
                .iter()
                .zip(&rhs.data)
                .map(|(a, b)| a + b)
                .collect(),
        }
    }
}

impl std::ops::Mul for &ScalarField {
    type Output = ScalarField;

    fn mul(self, rhs: &ScalarField) -> ScalarField {
        debug_assert_eq!(self.len(), rhs.len(), "场长度不匹配");
        ScalarField {
            name: self.name.clone(),
            unit: self.unit.mul(rhs.unit),
            data: self
                .data
                .iter()
                .zip(&rhs.data)
                .map(|(a, b)| a * b)
                .collect(),
        }
    }
}

impl std::ops::Div for &ScalarField {
    type Output = ScalarField;

    fn div(self, rhs: &ScalarField) -> ScalarField {
        debug_assert_eq!(self.len(), rhs.len(), "场长度不匹配");
        ScalarField {
            name: self.name.clone(),
            unit: self.unit.div(rhs.unit),
            data: self
                .data
                .iter()
                .zip(&rhs.data)
                .map(|(a, b)| a / b)
                .collect(),
        }
    }
}

impl std::ops::Mul<Scalar> for &ScalarField {
    type Output = ScalarField;

    fn mul(self, rhs: Scalar) -> ScalarField {
        ScalarField {
            name: self.name.clone(),
            unit: self.unit,
            data: self.data.iter().map(|&v| v * rhs).collect(),
        }
    }
}

impl std::ops::Neg for &ScalarField {
    type Output = ScalarField;

    fn neg(self) -> ScalarField {
        ScalarField {
            name: self.name.clone(),
            unit: self.unit,
            data: self.data.iter().map(|&v| -v).collect(),
        }
    }
}
