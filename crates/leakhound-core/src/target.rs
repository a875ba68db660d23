//! 扫描目标解析（纯函数，不发起网络请求）
use crate::error::ScanError;
use crate::types::{ScanTarget, TargetKind};

impl ScanTarget {
    /// 从用户输入解析目标，接受三种写法：
    /// - `owner/repo`
    /// - 完整 GitHub URL（`https://github.com/owner/repo[/...]`，路径尾部忽略）
    /// - `user:login`（账号级扫描）
    ///
    /// 空名或无法识别的输入报 `Validation`，先于一切网络调用
    pub fn parse(input: &str) -> Result<ScanTarget, ScanError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(ScanError::Validation("empty scan target".into()));
        }

        if let Some(login) = trimmed.strip_prefix("user:") {
            let login = login.trim();
            if login.is_empty() || login.contains('/') {
                return Err(ScanError::Validation(format!("invalid user login: {trimmed:?}")));
            }
            return Ok(ScanTarget { kind: TargetKind::User, name: login.to_string() });
        }

        // URL 形式：剥掉协议与主机，仅保留 owner/repo 两段
        if let Some(rest) = strip_github_host(trimmed) {
            let mut parts = rest.split('/').filter(|s| !s.is_empty());
            match (parts.next(), parts.next()) {
                (Some(owner), Some(repo)) => {
                    return Ok(ScanTarget {
                        kind: TargetKind::Repo,
                        name: format!("{owner}/{repo}"),
                    })
                }
                _ => return Err(ScanError::Validation(format!("no owner/repo in url: {trimmed:?}"))),
            }
        }

        // 裸 `owner/repo`
        let mut parts = trimmed.split('/');
        match (parts.next(), parts.next(), parts.next()) {
            (Some(owner), Some(repo), None) if !owner.is_empty() && !repo.is_empty() => {
                Ok(ScanTarget { kind: TargetKind::Repo, name: format!("{owner}/{repo}") })
            }
            _ => Err(ScanError::Validation(format!("unrecognized scan target: {trimmed:?}"))),
        }
    }

    /// 搜索查询里使用的范围限定词
    pub(crate) fn scope_qualifier(&self) -> String {
        match self.kind {
            TargetKind::Repo => format!("repo:{}", self.name),
            TargetKind::User => format!("user:{}", self.name),
        }
    }
}

/// 若输入是 github.com URL，返回主机之后的路径；否则 None
fn strip_github_host(input: &str) -> Option<&str> {
    let rest = input
        .strip_prefix("https://")
        .or_else(|| input.strip_prefix("http://"))?;
    let rest = rest.strip_prefix("www.").unwrap_or(rest);
    rest.strip_prefix("github.com/")
}
