// crates/mh_turbulence/src/error.rs

//! 错误处理模块，定义统一错误类型
//!
//! 提供 `TurbulenceError` 枚举和 `TurbResult` 类型别名。
//!
//! # 设计原则
//!
//! 1. **硬失败仅限构造期**: 系数非法、场尺寸/量纲不匹配在模型
//!    构造或 `read` 时立即报错，模型不会带病运行
//! 2. **求解不收敛不是错误**: 输运求解的收敛状态通过
//!    [`crate::transport::SolveReport`] 上报，永不转成 `Err`

use thiserror::Error;

/// 统一结果类型
pub type TurbResult<T> = Result<T, TurbulenceError>;

/// 湍流闭合模型错误类型
#[derive(Debug, Error)]
pub enum TurbulenceError {
    /// 非法系数（构造/重读时校验失败）
    #[error("无效系数 '{name}': {value} - {reason}")]
    InvalidCoefficient {
        /// 系数名
        name: &'static str,
        /// 读到的值
        value: f64,
        /// 非法原因
        reason: String,
    },

    /// 场长度与网格单元数不匹配
    #[error("场 '{field}' 长度不匹配: 期望 {expected}, 实际 {actual}")]
    FieldSizeMismatch {
        /// 场名
        field: String,
        /// 期望单元数
        expected: usize,
        /// 实际单元数
        actual: usize,
    },

    /// 场量纲与物理约定不匹配
    #[error("场 '{field}' 量纲不匹配: 期望 {expected}, 实际 {actual}")]
    DimensionMismatch {
        /// 场名
        field: String,
        /// 期望量纲
        expected: String,
        /// 实际量纲
        actual: String,
    },
}
