//! 扫描会话：一次 ScanRequest 的端到端编排
//!
//! 流程：校验 → 规划 → 分发 / 历史遍历 → 合并去重 → 名单与噪音过滤 → 产出。
//! 提取与核验不在这里预跑，由调用方对具体 Finding 按需发起（见 verifier）。
//! 忽略名单在会话创建时加载一次；`mark_safe` 写穿存储后，
//! 已渲染的结果集用 `refilter` 重新过滤即可立即生效。
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use tracing::info;

use crate::dedup::{apply_filters, merge_findings, merge_hits, FilterOptions};
use crate::dispatcher::run_queries;
use crate::endpoints::{CodeSearch, CommitSource, IgnoreStore};
use crate::error::ScanError;
use crate::history::walk_history;
use crate::ignore::IgnoreList;
use crate::patterns::PatternSet;
use crate::planner::build_queries;
use crate::ratelimit::IntervalGate;
use crate::types::{ScanMode, ScanOutcome, ScanRequest, ScanStatus};

/// 会话级选项
#[derive(Debug, Clone, Default)]
pub struct SessionOptions {
    /// 排除示例性文件（example/sample/template/readme）
    pub exclude_illustrative: bool,
    /// 查询间隔；None 用基线 1.5s
    pub search_interval: Option<std::time::Duration>,
    /// 提交间隔；None 用基线 200ms
    pub commit_interval: Option<std::time::Duration>,
}

/// 一个扫描会话；持有协作方接口与会话内忽略名单
pub struct ScanSession<'a> {
    search: &'a dyn CodeSearch,
    commits: &'a dyn CommitSource,
    ignore_store: &'a dyn IgnoreStore,
    ignore: IgnoreList,
    /// TOML 覆盖的内容规则集；None 用内置默认集
    patterns: Option<PatternSet>,
    opts: SessionOptions,
    cancel: Arc<AtomicBool>,
}

impl<'a> ScanSession<'a> {
    /// 创建会话并从存储加载忽略名单（加载失败降级为空名单）
    pub fn new(
        search: &'a dyn CodeSearch,
        commits: &'a dyn CommitSource,
        ignore_store: &'a dyn IgnoreStore,
        opts: SessionOptions,
    ) -> Self {
        let ignore = IgnoreList::load(ignore_store);
        ScanSession {
            search,
            commits,
            ignore_store,
            ignore,
            patterns: None,
            opts,
            cancel: Arc::new(AtomicBool::new(false)),
        }
    }

    /// 用外部规则文件替换内置内容规则集
    pub fn with_patterns(mut self, patterns: PatternSet) -> Self {
        self.patterns = Some(patterns);
        self
    }

    /// 取消句柄；历史遍历在提交之间检查该标志
    pub fn cancel_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancel)
    }

    pub fn ignore_list(&self) -> &IgnoreList {
        &self.ignore
    }

    /// 标记仓库为安全：追加进名单并立即持久化
    pub fn mark_safe(&mut self, repo: &str) -> anyhow::Result<bool> {
        self.ignore.mark_safe(repo, self.ignore_store)
    }

    /// 对已产出的结果集重新应用当前名单/噪音过滤（纯函数，不发网络请求）
    ///
    /// `mark_safe` 之后调用，呈现层即可看到新名单立即生效；
    /// 计数按新移除的条目精确修正
    pub fn refilter(&self, outcome: &ScanOutcome) -> ScanOutcome {
        let filter_opts = FilterOptions { exclude_illustrative: self.opts.exclude_illustrative };
        let filtered = apply_filters(outcome.findings.clone(), &self.ignore, &filter_opts);
        ScanOutcome {
            total: filtered.findings.len(),
            dropped_ignored: outcome.dropped_ignored + filtered.dropped_ignored,
            dropped_noise: outcome.dropped_noise + filtered.dropped_noise,
            findings: filtered.findings,
            status: outcome.status.clone(),
        }
    }

    /// 执行一次扫描请求
    ///
    /// 返回 Err 仅限两类致命错误（校验失败在任何网络请求之前）；
    /// 其余一切失败都吸收为部分结果 + 状态标志。
    /// `progress` 仅在历史遍历模式下被调用（index/total）。
    pub fn run(
        &mut self,
        req: &ScanRequest,
        progress: &mut dyn FnMut(usize, usize),
    ) -> Result<ScanOutcome, ScanError> {
        info!(scope = %req.target.name, mode = ?req.mode, "scan started");

        let (merged, cancelled, aborted) = match req.mode {
            ScanMode::HistoricalSweep => {
                let patterns = self.patterns.as_ref().unwrap_or_else(|| PatternSet::builtin());
                let mut gate = IntervalGate::new(
                    self.opts.commit_interval.unwrap_or(IntervalGate::COMMIT_BASELINE),
                );
                let walk =
                    walk_history(req, self.commits, patterns, &mut gate, &self.cancel, progress)?;
                (merge_findings(walk.findings), walk.cancelled, walk.aborted)
            }
            ScanMode::BroadSweep | ScanMode::KeywordSearch => {
                let queries = build_queries(req)?;
                let mut gate = IntervalGate::new(
                    self.opts.search_interval.unwrap_or(IntervalGate::SEARCH_BASELINE),
                );
                let dispatch = run_queries(&queries, self.search, &mut gate);
                (merge_hits(dispatch.hits), false, dispatch.aborted)
            }
        };

        let filter_opts = FilterOptions { exclude_illustrative: self.opts.exclude_illustrative };
        let filtered = apply_filters(merged, &self.ignore, &filter_opts);

        let status = if cancelled {
            ScanStatus::Cancelled
        } else if let Some(reason) = aborted {
            ScanStatus::Aborted(reason)
        } else {
            ScanStatus::Complete
        };

        let outcome = ScanOutcome {
            total: filtered.findings.len(),
            findings: filtered.findings,
            status,
            dropped_ignored: filtered.dropped_ignored,
            dropped_noise: filtered.dropped_noise,
        };
        info!(
            total = outcome.total,
            dropped_ignored = outcome.dropped_ignored,
            dropped_noise = outcome.dropped_noise,
            status = ?outcome.status,
            "scan finished"
        );
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::endpoints::{CommitDetail, CommitRef, SearchPage};
    use crate::error::SearchError;
    use crate::types::{RawHit, ScanTarget, SearchQuery, TargetKind};
    use std::collections::HashSet;

    /// 无凭证：所有查询都报 AuthRequired
    struct NoTokenSearch;

    impl CodeSearch for NoTokenSearch {
        fn search(&self, _query: &SearchQuery) -> Result<SearchPage, SearchError> {
            Err(SearchError::AuthRequired("no token configured".into()))
        }
    }

    struct EmptyCommits;

    impl CommitSource for EmptyCommits {
        fn list_commits(&self, _repo: &str) -> Result<Vec<CommitRef>, SearchError> {
            Ok(Vec::new())
        }
        fn get_commit(&self, _repo: &str, _sha: &str) -> Result<CommitDetail, SearchError> {
            Err(SearchError::Upstream("unexpected".into()))
        }
    }

    struct NullStore;

    impl IgnoreStore for NullStore {
        fn load(&self) -> anyhow::Result<HashSet<String>> {
            Ok(HashSet::new())
        }
        fn save(&self, _repos: &HashSet<String>) -> anyhow::Result<()> {
            Ok(())
        }
    }

    fn request(mode: ScanMode) -> ScanRequest {
        ScanRequest {
            target: ScanTarget { kind: TargetKind::Repo, name: "acme/app".into() },
            mode,
            keyword: None,
            env_only: false,
        }
    }

    fn fast_options() -> SessionOptions {
        SessionOptions {
            search_interval: Some(std::time::Duration::ZERO),
            commit_interval: Some(std::time::Duration::ZERO),
            ..SessionOptions::default()
        }
    }

    #[test]
    fn missing_credential_aborts_with_empty_findings() {
        let search = NoTokenSearch;
        let commits = EmptyCommits;
        let store = NullStore;
        let mut session = ScanSession::new(&search, &commits, &store, fast_options());
        let outcome = session.run(&request(ScanMode::BroadSweep), &mut |_, _| {}).unwrap();
        assert!(outcome.findings.is_empty());
        assert_eq!(outcome.total, 0);
        assert!(matches!(outcome.status, ScanStatus::Aborted(_)));
        // 硬失败视角：同一结果可转换为类型化错误
        assert!(matches!(outcome.into_result(), Err(ScanError::AuthRequired(_))));
    }

    #[test]
    fn keyword_mode_without_keyword_fails_validation() {
        let search = NoTokenSearch;
        let commits = EmptyCommits;
        let store = NullStore;
        let mut session = ScanSession::new(&search, &commits, &store, fast_options());
        let err = session.run(&request(ScanMode::KeywordSearch), &mut |_, _| {}).unwrap_err();
        assert!(matches!(err, ScanError::Validation(_)));
    }

    #[test]
    fn refilter_applies_newly_marked_repos() {
        let search = NoTokenSearch;
        let commits = EmptyCommits;
        let store = NullStore;
        let mut session = ScanSession::new(&search, &commits, &store, fast_options());

        let outcome = ScanOutcome {
            findings: crate::dedup::merge_hits(vec![RawHit {
                identity: "x".into(),
                display_name: ".env".into(),
                url: "https://github.com/acme/app/blob/main/.env".into(),
                repo_full_name: "acme/app".into(),
                repo_url: "https://github.com/acme/app".into(),
                snippet_text: String::new(),
            }]),
            total: 1,
            status: ScanStatus::Complete,
            dropped_ignored: 0,
            dropped_noise: 0,
        };

        session.mark_safe("acme/app").unwrap();
        let refiltered = session.refilter(&outcome);
        assert!(refiltered.findings.is_empty());
        assert_eq!(refiltered.total, 0);
        assert_eq!(refiltered.dropped_ignored, 1);
    }
}
