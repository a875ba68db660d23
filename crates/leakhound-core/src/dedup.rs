//! 去重与忽略名单过滤
//!
//! 合并按 identity 键控、后写覆盖，因此幂等且与来源顺序无关；
//! 输出按 identity 排序，保证结果可复现。
//! 过滤分两级进行，计数修正严格等于每级实际移除的条数。
use std::collections::HashMap;

use crate::ignore::IgnoreList;
use crate::types::{Finding, RawHit};

/// 名称+路径中出现即视为示例/文档噪音的固定标记集（小写比较）
const NOISE_TOKENS: &[&str] = &["example", "sample", "template", "readme.md", "readme.txt"];

/// 过滤选项
#[derive(Debug, Clone, Copy, Default)]
pub struct FilterOptions {
    /// 排除示例性文件（example/sample/template/readme）
    pub exclude_illustrative: bool,
}

/// 过滤产出：留存的 Finding 与各级移除计数
#[derive(Debug, Default)]
pub struct FilterOutcome {
    pub findings: Vec<Finding>,
    pub dropped_ignored: usize,
    pub dropped_noise: usize,
}

/// 合并一批或多批 RawHit 为按 identity 唯一的 Finding 集
///
/// 重复 identity 后写覆盖；喂入同一批两次得到相同大小的结果集
pub fn merge_hits<I>(hits: I) -> Vec<Finding>
where
    I: IntoIterator<Item = RawHit>,
{
    merge_findings(hits.into_iter().map(Finding::from))
}

/// 同语义的 Finding 级合并（历史遍历器直接产出 Finding）
pub fn merge_findings<I>(findings: I) -> Vec<Finding>
where
    I: IntoIterator<Item = Finding>,
{
    let mut by_identity: HashMap<String, Finding> = HashMap::new();
    for finding in findings {
        by_identity.insert(finding.identity.clone(), finding);
    }
    let mut merged: Vec<Finding> = by_identity.into_values().collect();
    merged.sort_by(|a, b| a.identity.cmp(&b.identity));
    merged
}

/// 依序应用忽略名单与噪音过滤
///
/// 顺序固定：先忽略名单（按 repo_full_name），后噪音标记
/// （display_name + url 合并后小写包含判断）
pub fn apply_filters(
    findings: Vec<Finding>,
    ignore: &IgnoreList,
    opts: &FilterOptions,
) -> FilterOutcome {
    let mut outcome = FilterOutcome::default();

    let after_ignore: Vec<Finding> = findings
        .into_iter()
        .filter(|f| {
            let keep = !ignore.contains(&f.repo_full_name);
            if !keep {
                outcome.dropped_ignored += 1;
            }
            keep
        })
        .collect();

    outcome.findings = if opts.exclude_illustrative {
        after_ignore
            .into_iter()
            .filter(|f| {
                let haystack = format!("{} {}", f.display_name, f.url).to_lowercase();
                let keep = !NOISE_TOKENS.iter().any(|t| haystack.contains(t));
                if !keep {
                    outcome.dropped_noise += 1;
                }
                keep
            })
            .collect()
    } else {
        after_ignore
    };

    outcome
}
