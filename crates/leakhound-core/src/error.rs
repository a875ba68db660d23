//! 错误分级（对外暴露）
//!
//! 传播策略：
//! - `ScanError`：仅有的两类“终止本次扫描”错误，向调用方冒泡。
//! - `SearchError`：逐查询/逐提交的协作方失败；`AuthRequired` 升级为致命，
//!   `Upstream` 在组件边界被记录并跳过。
//! - `NetworkError`：单个余额端点的失败，隔离后降级为 "unavailable"。

use thiserror::Error;

/// 终止扫描的错误：校验失败（未发起任何网络请求）或缺少必需凭证
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ScanError {
    /// 目标/关键字非法，在构建任何查询之前报出
    #[error("invalid scan input: {0}")]
    Validation(String),
    /// 端点要求凭证但未提供；调用方据此区分“零结果”与“扫描中断”
    #[error("authentication required: {0}")]
    AuthRequired(String),
}

/// 代码搜索 / 提交端点的单次调用失败
#[derive(Debug, Clone, Error)]
pub enum SearchError {
    /// 缺少必需凭证，由分发器/遍历器升级为 `ScanError::AuthRequired`
    #[error("authentication required: {0}")]
    AuthRequired(String),
    /// 其他上游失败（4xx/5xx、限流、畸形查询等），记录后跳过
    #[error("upstream failure: {0}")]
    Upstream(String),
}

/// 单个余额端点的失败；核验器将其折算为该网络 "unavailable"
#[derive(Debug, Clone, Error)]
#[error("balance endpoint failure: {0}")]
pub struct NetworkError(pub String);
