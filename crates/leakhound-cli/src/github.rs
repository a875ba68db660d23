//! GitHub REST v3 协作方实现（搜索 + 提交历史）
//!
//! 认证语义：
//! - 401 一律视为 `AuthRequired`；
//! - 403 且本地没有凭证也视为 `AuthRequired`（匿名配额被限流，补 token 可解）；
//! - 其余非 2xx 折算为 `Upstream`，携带响应里的 message。
use std::time::Duration;

use leakhound_core::endpoints::{
    CodeSearch, CommitDetail, CommitFile, CommitRef, CommitSource, CredentialStore, SearchPage,
};
use leakhound_core::{RawHit, SearchError, SearchQuery};
use serde::Deserialize;

const API_BASE: &str = "https://api.github.com";
const USER_AGENT: &str = concat!("leakhound/", env!("CARGO_PKG_VERSION"));
/// text-match 媒体类型：让搜索响应带上命中片段
const SEARCH_ACCEPT: &str = "application/vnd.github.v3.text-match+json";
const ACCEPT: &str = "application/vnd.github.v3+json";

/// GitHub 客户端；token 每次调用时从凭证存取接口读取
pub struct GitHubClient<'a> {
    http: reqwest::blocking::Client,
    credentials: &'a dyn CredentialStore,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    total_count: u64,
    items: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    sha: String,
    name: String,
    html_url: String,
    repository: RepoRef,
    #[serde(default)]
    text_matches: Vec<TextMatch>,
}

#[derive(Debug, Deserialize)]
struct RepoRef {
    full_name: String,
    html_url: String,
}

#[derive(Debug, Deserialize)]
struct TextMatch {
    #[serde(default)]
    fragment: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CommitItem {
    sha: String,
}

#[derive(Debug, Deserialize)]
struct CommitResponse {
    sha: String,
    html_url: String,
    #[serde(default)]
    files: Vec<FileEntry>,
}

#[derive(Debug, Deserialize)]
struct FileEntry {
    filename: String,
    #[serde(default)]
    patch: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: Option<String>,
}

impl<'a> GitHubClient<'a> {
    pub fn new(credentials: &'a dyn CredentialStore) -> anyhow::Result<Self> {
        let http = reqwest::blocking::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(20))
            .build()?;
        Ok(GitHubClient { http, credentials })
    }

    /// 发送 GET 并把非 2xx 折算为 SearchError
    fn get(&self, url: &str, accept: &str) -> Result<reqwest::blocking::Response, SearchError> {
        let mut req = self.http.get(url).header("Accept", accept);
        let token = self.credentials.get();
        if let Some(t) = &token {
            req = req.header("Authorization", format!("token {t}"));
        }
        let resp = req.send().map_err(|e| SearchError::Upstream(e.to_string()))?;

        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        // 失败响应体里通常带 message
        let message = resp
            .json::<ApiError>()
            .ok()
            .and_then(|e| e.message)
            .unwrap_or_else(|| format!("http status {status}"));
        if status.as_u16() == 401 || (status.as_u16() == 403 && token.is_none()) {
            return Err(SearchError::AuthRequired(message));
        }
        Err(SearchError::Upstream(message))
    }
}

impl CodeSearch for GitHubClient<'_> {
    fn search(&self, query: &SearchQuery) -> Result<SearchPage, SearchError> {
        let url = format!(
            "{API_BASE}/search/code?q={}&per_page=30",
            urlencode(&query.text)
        );
        let parsed: SearchResponse = self
            .get(&url, SEARCH_ACCEPT)?
            .json()
            .map_err(|e| SearchError::Upstream(e.to_string()))?;

        let items = parsed
            .items
            .into_iter()
            .map(|item| RawHit {
                identity: item.sha,
                display_name: item.name,
                url: item.html_url,
                repo_full_name: item.repository.full_name,
                repo_url: item.repository.html_url,
                snippet_text: item
                    .text_matches
                    .into_iter()
                    .filter_map(|m| m.fragment)
                    .collect::<Vec<_>>()
                    .join("\n"),
            })
            .collect();
        Ok(SearchPage { total_count: parsed.total_count, items })
    }
}

impl CommitSource for GitHubClient<'_> {
    fn list_commits(&self, repo: &str) -> Result<Vec<CommitRef>, SearchError> {
        let url = format!("{API_BASE}/repos/{repo}/commits?per_page=100");
        let parsed: Vec<CommitItem> = self
            .get(&url, ACCEPT)?
            .json()
            .map_err(|e| SearchError::Upstream(e.to_string()))?;
        Ok(parsed.into_iter().map(|c| CommitRef { sha: c.sha }).collect())
    }

    fn get_commit(&self, repo: &str, sha: &str) -> Result<CommitDetail, SearchError> {
        let url = format!("{API_BASE}/repos/{repo}/commits/{sha}");
        let parsed: CommitResponse = self
            .get(&url, ACCEPT)?
            .json()
            .map_err(|e| SearchError::Upstream(e.to_string()))?;
        Ok(CommitDetail {
            sha: parsed.sha,
            url: parsed.html_url,
            files: parsed
                .files
                .into_iter()
                .map(|f| CommitFile { filename: f.filename, patch: f.patch })
                .collect(),
        })
    }
}

/// 查询串百分号编码（仅处理 query 部分需要的字符集）
fn urlencode(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len() * 3 / 2);
    for b in raw.bytes() {
        match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(b as char)
            }
            _ => out.push_str(&format!("%{b:02X}")),
        }
    }
    out
}
