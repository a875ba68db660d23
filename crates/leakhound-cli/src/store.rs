//! 本地实现：凭证存取与忽略名单文件存储
use std::collections::HashSet;
use std::path::PathBuf;

use anyhow::Context;
use leakhound_core::endpoints::{CredentialStore, IgnoreStore};

/// 凭证来源：命令行参数优先，其次 GITHUB_TOKEN 环境变量
#[derive(Debug, Default)]
pub struct EnvCredentialStore {
    token: Option<String>,
}

impl EnvCredentialStore {
    pub fn new(flag_token: Option<String>) -> Self {
        EnvCredentialStore { token: flag_token.filter(|t| !t.trim().is_empty()) }
    }
}

impl CredentialStore for EnvCredentialStore {
    fn get(&self) -> Option<String> {
        if let Some(t) = &self.token {
            return Some(t.clone());
        }
        std::env::var("GITHUB_TOKEN").ok().filter(|t| !t.trim().is_empty())
    }

    fn set(&mut self, token: String) {
        self.token = Some(token);
    }
}

/// JSON 文件忽略名单存储（仓库全名数组）
#[derive(Debug)]
pub struct JsonIgnoreStore {
    path: PathBuf,
}

impl JsonIgnoreStore {
    pub fn new(path: PathBuf) -> Self {
        JsonIgnoreStore { path }
    }
}

impl IgnoreStore for JsonIgnoreStore {
    fn load(&self) -> anyhow::Result<HashSet<String>> {
        if !self.path.exists() {
            // 首次使用：还没有名单文件
            return Ok(HashSet::new());
        }
        let txt = std::fs::read_to_string(&self.path)
            .with_context(|| format!("read ignore file {}", self.path.display()))?;
        let repos: Vec<String> = serde_json::from_str(&txt)
            .with_context(|| format!("parse ignore file {}", self.path.display()))?;
        Ok(repos.into_iter().collect())
    }

    fn save(&self, repos: &HashSet<String>) -> anyhow::Result<()> {
        // 排序后写出，保证文件内容稳定可 diff
        let mut sorted: Vec<&str> = repos.iter().map(String::as_str).collect();
        sorted.sort_unstable();
        let txt = serde_json::to_string_pretty(&sorted)?;
        std::fs::write(&self.path, txt)
            .with_context(|| format!("write ignore file {}", self.path.display()))?;
        Ok(())
    }
}
