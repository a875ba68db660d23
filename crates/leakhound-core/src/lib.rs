//! 泄露密钥扫描与链上余额核验核心库
//!
//! 设计要点：
//! - 扫描端（查询分发、提交历史遍历）刻意串行并注入限速门，尊重上游速率限制；
//!   累积按 identity 去重、与顺序无关，后续可切换为有界并发而不改变可见结果。
//! - 任何单个查询/提交/网络端点的失败都在组件边界被吸收，绝不拖垮无关工作；
//!   只有 `Validation` 与 `AuthRequired` 两类错误会终止整次扫描。
//! - 余额核验按 (候选 × 网络) 并行扇出，逐任务隔离失败，缺数据是合法结果而非错误。
//! - 所有网络协作方均为窄接口（trait），核心不感知任何传输细节。

mod dedup;
mod derive;
mod dispatcher;
mod error;
mod extractor;
mod history;
mod ignore;
mod patterns;
mod planner;
mod ratelimit;
mod session;
mod target;
mod types;
mod verifier;

pub mod endpoints;

// 对外暴露的稳定 API
pub use dedup::{apply_filters, merge_findings, merge_hits, FilterOptions, FilterOutcome};
pub use derive::derive_identity;
pub use dispatcher::{run_queries, DispatchResult};
pub use error::{NetworkError, ScanError, SearchError};
pub use extractor::{extract_candidates, extract_from_text};
pub use history::{walk_history, WalkOutcome};
pub use ignore::IgnoreList;
pub use patterns::PatternSet;
pub use planner::build_queries;
pub use ratelimit::IntervalGate;
pub use session::{ScanSession, SessionOptions};
pub use types::{
    BalanceReport, CandidateSecret, DerivedIdentity, Finding, NetworkBalance, NetworkId,
    QueryCategory, RawHit, ScanMode, ScanOutcome, ScanRequest, ScanStatus, ScanTarget,
    SearchQuery, SecretKind, TargetKind,
};
pub use verifier::{verify_candidates, verify_finding, VerifyOptions};
