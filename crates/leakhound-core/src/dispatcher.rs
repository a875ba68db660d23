//! 搜索分发器：按规划顺序执行查询，限速、失败容忍、认证即停
use tracing::{debug, warn};

use crate::endpoints::CodeSearch;
use crate::error::SearchError;
use crate::ratelimit::IntervalGate;
use crate::types::{RawHit, SearchQuery};

/// 分发结果：已累积的命中，以及（若发生）中断原因
/// aborted 为 Some 时剩余查询已被丢弃，调用方据此区分“零命中”与“扫描中断”
#[derive(Debug, Default)]
pub struct DispatchResult {
    pub hits: Vec<RawHit>,
    pub aborted: Option<String>,
}

/// 逐条执行查询并累积命中；本组件不去重
///
/// 失败语义：
/// - `AuthRequired`：致命，立即返回已累积结果 + 中断原因；
/// - 其他上游失败：记录日志，该查询贡献为空，继续后续查询。
pub fn run_queries(
    queries: &[SearchQuery],
    search: &dyn CodeSearch,
    gate: &mut IntervalGate,
) -> DispatchResult {
    let mut result = DispatchResult::default();

    for query in queries {
        gate.wait();
        match search.search(query) {
            Ok(page) => {
                debug!(query = %query.text, total = page.total_count, "query done");
                result.hits.extend(page.items);
            }
            Err(SearchError::AuthRequired(reason)) => {
                warn!(query = %query.text, %reason, "auth required, aborting dispatch");
                result.aborted = Some(reason);
                break;
            }
            Err(SearchError::Upstream(reason)) => {
                // 单条查询失败不影响其余查询
                warn!(query = %query.text, %reason, "query failed, skipping");
            }
        }
    }

    result
}
