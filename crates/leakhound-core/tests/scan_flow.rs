//! 扫描链路端到端测试（内存假协作方驱动）
use std::cell::RefCell;
use std::collections::HashSet;

use leakhound_core::endpoints::{
    CodeSearch, CommitDetail, CommitFile, CommitRef, CommitSource, IgnoreStore, SearchPage,
};
use leakhound_core::{
    RawHit, ScanError, ScanMode, ScanRequest, ScanSession, ScanStatus, ScanTarget, SearchError,
    SearchQuery, SessionOptions, TargetKind,
};

/// 所有查询返回同一批命中的假搜索端点
struct ConstSearch {
    items: Vec<RawHit>,
    calls: RefCell<usize>,
}

impl CodeSearch for ConstSearch {
    fn search(&self, _query: &SearchQuery) -> Result<SearchPage, SearchError> {
        *self.calls.borrow_mut() += 1;
        Ok(SearchPage { total_count: self.items.len() as u64, items: self.items.clone() })
    }
}

/// 无凭证端点：任何查询都要求认证
struct NoTokenSearch;

impl CodeSearch for NoTokenSearch {
    fn search(&self, _query: &SearchQuery) -> Result<SearchPage, SearchError> {
        Err(SearchError::AuthRequired("no token configured".into()))
    }
}

struct FakeCommits {
    commits: Vec<CommitDetail>,
}

impl CommitSource for FakeCommits {
    fn list_commits(&self, _repo: &str) -> Result<Vec<CommitRef>, SearchError> {
        Ok(self.commits.iter().map(|c| CommitRef { sha: c.sha.clone() }).collect())
    }
    fn get_commit(&self, _repo: &str, sha: &str) -> Result<CommitDetail, SearchError> {
        self.commits
            .iter()
            .find(|c| c.sha == sha)
            .cloned()
            .ok_or_else(|| SearchError::Upstream("unknown sha".into()))
    }
}

struct MemStore {
    repos: RefCell<HashSet<String>>,
}

impl MemStore {
    fn with(repos: &[&str]) -> Self {
        MemStore { repos: RefCell::new(repos.iter().map(|r| r.to_string()).collect()) }
    }
}

impl IgnoreStore for MemStore {
    fn load(&self) -> anyhow::Result<HashSet<String>> {
        Ok(self.repos.borrow().clone())
    }
    fn save(&self, repos: &HashSet<String>) -> anyhow::Result<()> {
        *self.repos.borrow_mut() = repos.clone();
        Ok(())
    }
}

fn hit(identity: &str, repo: &str, name: &str) -> RawHit {
    RawHit {
        identity: identity.into(),
        display_name: name.into(),
        url: format!("https://github.com/{repo}/blob/main/{name}"),
        repo_full_name: repo.into(),
        repo_url: format!("https://github.com/{repo}"),
        snippet_text: String::new(),
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
fn missing_credential_aborts_scan_with_empty_set() {
    let search = NoTokenSearch;
    let commits = FakeCommits { commits: vec![] };
    let store = MemStore::with(&[]);
    let mut session = ScanSession::new(&search, &commits, &store, fast_options());

    let outcome = session.run(&request(ScanMode::BroadSweep), &mut |_, _| {}).unwrap();
    assert_eq!(outcome.total, 0);
    assert!(outcome.findings.is_empty());
    assert!(matches!(outcome.status, ScanStatus::Aborted(_)));
}

#[test]
fn identical_identities_across_queries_merge_to_one() {
    // 每条查询都返回同一 identity 的命中；合并后结果集大小为 1
    let search = ConstSearch { items: vec![hit("same-sha", "acme/app", ".env")], calls: RefCell::new(0) };
    let commits = FakeCommits { commits: vec![] };
    let store = MemStore::with(&[]);
    let mut session = ScanSession::new(&search, &commits, &store, fast_options());

    let outcome = session.run(&request(ScanMode::BroadSweep), &mut |_, _| {}).unwrap();
    assert!(*search.calls.borrow() > 1, "broad sweep should dispatch many queries");
    assert_eq!(outcome.status, ScanStatus::Complete);
    assert_eq!(outcome.total, 1);
    assert_eq!(outcome.findings[0].identity, "same-sha");
}

#[test]
fn historical_env_commit_yields_filename_keyed_finding() {
    let search = NoTokenSearch;
    let commits = FakeCommits {
        commits: vec![CommitDetail {
            sha: "c42".into(),
            url: "https://github.com/acme/app/commit/c42".into(),
            files: vec![CommitFile {
                filename: "config/.env".into(),
                patch: Some("+AWS_SECRET_KEY=wJalrXUtnFEMI".into()),
            }],
        }],
    };
    let store = MemStore::with(&[]);
    let mut session = ScanSession::new(&search, &commits, &store, fast_options());

    let mut ticks = Vec::new();
    let outcome = session
        .run(&request(ScanMode::HistoricalSweep), &mut |done, total| ticks.push((done, total)))
        .unwrap();
    assert_eq!(outcome.status, ScanStatus::Complete);
    assert_eq!(outcome.total, 1);
    assert_eq!(outcome.findings[0].identity, "c42-config/.env");
    assert_eq!(ticks, vec![(1, 1)]);
}

#[test]
fn historical_mode_rejects_user_target() {
    let search = NoTokenSearch;
    let commits = FakeCommits { commits: vec![] };
    let store = MemStore::with(&[]);
    let mut session = ScanSession::new(&search, &commits, &store, fast_options());

    let req = ScanRequest {
        target: ScanTarget { kind: TargetKind::User, name: "octocat".into() },
        mode: ScanMode::HistoricalSweep,
        keyword: None,
        env_only: false,
    };
    let err = session.run(&req, &mut |_, _| {}).unwrap_err();
    assert!(matches!(err, ScanError::Validation(_)));
}

#[test]
fn ignored_repo_filters_to_zero_with_exact_counts() {
    let search = ConstSearch {
        items: vec![hit("a", "acme/app", ".env"), hit("b", "acme/app", "id_rsa")],
        calls: RefCell::new(0),
    };
    let commits = FakeCommits { commits: vec![] };
    let store = MemStore::with(&["acme/app"]);
    let mut session = ScanSession::new(&search, &commits, &store, fast_options());

    let outcome = session.run(&request(ScanMode::BroadSweep), &mut |_, _| {}).unwrap();
    assert_eq!(outcome.total, 0);
    assert!(outcome.findings.is_empty());
    assert_eq!(outcome.dropped_ignored, 2);
}

#[test]
fn marking_safe_never_increases_subsequent_counts() {
    let search = ConstSearch {
        items: vec![hit("a", "acme/app", ".env"), hit("b", "other/repo", ".env")],
        calls: RefCell::new(0),
    };
    let commits = FakeCommits { commits: vec![] };
    let store = MemStore::with(&[]);
    let mut session = ScanSession::new(&search, &commits, &store, fast_options());

    let before = session.run(&request(ScanMode::BroadSweep), &mut |_, _| {}).unwrap();
    assert_eq!(before.total, 2);

    session.mark_safe("acme/app").unwrap();

    // 已渲染的结果集重过滤立即生效
    let refiltered = session.refilter(&before);
    assert_eq!(refiltered.total, 1);
    assert_eq!(refiltered.dropped_ignored, 1);

    // 后续同样的扫描单调不增
    let after = session.run(&request(ScanMode::BroadSweep), &mut |_, _| {}).unwrap();
    assert!(after.total <= before.total);
    assert_eq!(after.total, 1);
    assert_eq!(after.findings[0].repo_full_name, "other/repo");

    // 名单写穿到了存储，新会话同样看到
    let session2 = ScanSession::new(&search, &commits, &store, fast_options());
    assert!(session2.ignore_list().contains("acme/app"));
}
