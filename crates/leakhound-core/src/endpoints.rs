//! 协作方窄接口（核心唯一感知的外部世界）
//!
//! 核心不关心传输细节；所有实现都可能部分失败，调用侧必须容忍：
//! - 搜索/提交端点逐次调用返回 `SearchError`；
//! - 余额端点逐网络返回 `NetworkError`，折算为 "unavailable"；
//! - 忽略名单存储失败降级为空名单（加载）或向上报告（写入）。
use std::collections::HashSet;

use crate::error::{NetworkError, SearchError};
use crate::types::{NetworkId, RawHit, SearchQuery};

/// 凭证存取；`get` 返回 None 时，要求凭证的调用以 `AuthRequired` 失败
pub trait CredentialStore {
    fn get(&self) -> Option<String>;
    fn set(&mut self, token: String);
}

/// 代码搜索端点返回的一页结果
#[derive(Debug, Clone)]
pub struct SearchPage {
    pub total_count: u64,
    pub items: Vec<RawHit>,
}

/// 代码搜索端点
pub trait CodeSearch {
    fn search(&self, query: &SearchQuery) -> Result<SearchPage, SearchError>;
}

/// 提交列表中的一项
#[derive(Debug, Clone)]
pub struct CommitRef {
    pub sha: String,
}

/// 单个提交中被改动的文件；patch 可能缺失（二进制/超大 diff）
#[derive(Debug, Clone)]
pub struct CommitFile {
    pub filename: String,
    pub patch: Option<String>,
}

/// 单个提交的 diff 详情
#[derive(Debug, Clone)]
pub struct CommitDetail {
    pub sha: String,
    pub url: String,
    pub files: Vec<CommitFile>,
}

/// 提交历史端点；列表上限为最近 100 条
pub trait CommitSource {
    fn list_commits(&self, repo: &str) -> Result<Vec<CommitRef>, SearchError>;
    fn get_commit(&self, repo: &str, sha: &str) -> Result<CommitDetail, SearchError>;
}

/// 余额端点；按网络查询，返回原生最小单位数额
/// 核验器跨线程扇出调用，实现必须可共享
pub trait BalanceSource: Send + Sync {
    fn get_balance(&self, network: NetworkId, address: &str) -> Result<u128, NetworkError>;
}

/// 忽略名单持久化存储
pub trait IgnoreStore {
    fn load(&self) -> anyhow::Result<HashSet<String>>;
    fn save(&self, repos: &HashSet<String>) -> anyhow::Result<()>;
}
