//! 会话忽略名单（唯一跨会话持久化的状态）
//!
//! 每个扫描会话启动时从存储加载一次；`mark_safe` 只增不减，
//! 每次变更立即写穿到存储，对已渲染的结果集由调用方重新过滤生效。
//! 名单永不被静默清理。
use std::collections::HashSet;

use tracing::warn;

use crate::endpoints::IgnoreStore;

/// 仓库全名集合（`owner/repo`）
#[derive(Debug, Default, Clone)]
pub struct IgnoreList {
    repos: HashSet<String>,
}

impl IgnoreList {
    /// 从存储加载；加载失败降级为空名单（协作方部分失败不终止会话）
    pub fn load(store: &dyn IgnoreStore) -> IgnoreList {
        match store.load() {
            Ok(repos) => IgnoreList { repos },
            Err(err) => {
                warn!(error = %err, "ignore list unavailable, starting empty");
                IgnoreList::default()
            }
        }
    }

    pub fn contains(&self, repo: &str) -> bool {
        self.repos.contains(repo)
    }

    pub fn len(&self) -> usize {
        self.repos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.repos.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.repos.iter().map(String::as_str)
    }

    /// 标记仓库为安全：追加并立即持久化；返回是否为新条目
    pub fn mark_safe(&mut self, repo: &str, store: &dyn IgnoreStore) -> anyhow::Result<bool> {
        let added = self.repos.insert(repo.to_string());
        if added {
            store.save(&self.repos)?;
        }
        Ok(added)
    }

    #[cfg(test)]
    pub(crate) fn insert_for_test(&mut self, repo: &str) {
        self.repos.insert(repo.to_string());
    }
}
