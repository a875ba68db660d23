//! 公共数据模型（对外暴露）
use serde::Serialize;

/// 扫描范围的种类：单个仓库或整个账号
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TargetKind {
    Repo,
    User,
}

/// 扫描目标；解析完成后不可变
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScanTarget {
    pub kind: TargetKind,
    /// `owner/repo` 或账号 login
    pub name: String,
}

/// 扫描模式
/// - BroadSweep：规划器的全量预置查询集
/// - KeywordSearch：单条自定义关键字查询
/// - HistoricalSweep：提交历史遍历（不走搜索端点）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ScanMode {
    BroadSweep,
    KeywordSearch,
    HistoricalSweep,
}

/// 一次扫描请求；随用户动作创建，扫描结束即丢弃
#[derive(Debug, Clone)]
pub struct ScanRequest {
    pub target: ScanTarget,
    pub mode: ScanMode,
    pub keyword: Option<String>,
    /// 仅关注 `.env`：过滤/改写所有非 `.env` 的查询与文件
    pub env_only: bool,
}

/// 查询类别（规划器输出的标签）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum QueryCategory {
    Filename,
    Literal,
    ChainSpecific,
}

/// 规划器产出的单条查询；text 对核心不透明，原样交给搜索端点
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub text: String,
    pub category: QueryCategory,
}

/// 来自单一数据源的一次命中
/// identity 是稳定内容键：实时搜索用内容 SHA，历史遍历用 `sha-filename`
#[derive(Debug, Clone)]
pub struct RawHit {
    pub identity: String,
    pub display_name: String,
    pub url: String,
    pub repo_full_name: String,
    pub repo_url: String,
    /// 实时搜索为拼接的片段文本，历史遍历为 diff patch
    pub snippet_text: String,
}

/// 去重、过滤后的命中；identity 在一个结果集内全局唯一
#[derive(Debug, Clone, Serialize)]
pub struct Finding {
    pub identity: String,
    pub display_name: String,
    pub url: String,
    pub repo_full_name: String,
    pub repo_url: String,
    pub snippet_text: String,
}

impl From<RawHit> for Finding {
    fn from(h: RawHit) -> Self {
        Finding {
            identity: h.identity,
            display_name: h.display_name,
            url: h.url,
            repo_full_name: h.repo_full_name,
            repo_url: h.repo_url,
            snippet_text: h.snippet_text,
        }
    }
}

/// 候选密钥的封闭类型集；提取器不会产出此集合之外的类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SecretKind {
    EvmPrivateKey,
    EvmAddress,
    SolPrivateKey,
    SolPrivateKeyArray,
    SolAddress,
    BtcAddress,
    /// 0x + 64 hex 与 EVM 私钥同形，提取器同时给出两种解释
    SuiOrAptosAddress,
}

/// 从 Finding 文本中提取出的类型化候选；(kind, value) 定义同一 Finding 内的同一性
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct CandidateSecret {
    pub kind: SecretKind,
    pub value: String,
}

/// 余额查询覆盖的网络
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum NetworkId {
    Ethereum,
    Bsc,
    Polygon,
    Arbitrum,
    Optimism,
    Solana,
    Bitcoin,
    Sui,
    Aptos,
}

impl NetworkId {
    /// EVM 地址要逐一独立查询的主网集合
    pub const EVM_MAINNETS: [NetworkId; 5] = [
        NetworkId::Ethereum,
        NetworkId::Bsc,
        NetworkId::Polygon,
        NetworkId::Arbitrum,
        NetworkId::Optimism,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            NetworkId::Ethereum => "ethereum",
            NetworkId::Bsc => "bsc",
            NetworkId::Polygon => "polygon",
            NetworkId::Arbitrum => "arbitrum",
            NetworkId::Optimism => "optimism",
            NetworkId::Solana => "solana",
            NetworkId::Bitcoin => "bitcoin",
            NetworkId::Sui => "sui",
            NetworkId::Aptos => "aptos",
        }
    }
}

/// 派生结果：公开地址，或对畸形输入的“无法判定”（派生永不报错）
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum DerivedIdentity {
    Address(String),
    Undetermined,
}

/// 单个网络返回的具体余额（原生最小单位）；amount 为 0 与非 0 可区分呈现
#[derive(Debug, Clone, Serialize)]
pub struct NetworkBalance {
    pub network: NetworkId,
    pub amount: u128,
}

/// 一个候选的余额核验报告
/// balances 只列出返回了具体数值的网络；失败/超时的网络进入 unavailable，
/// 缺数据是合法结果，不阻塞也不报错
#[derive(Debug, Clone, Serialize)]
pub struct BalanceReport {
    pub candidate: CandidateSecret,
    pub derived: DerivedIdentity,
    pub balances: Vec<NetworkBalance>,
    pub unavailable: Vec<NetworkId>,
}

impl BalanceReport {
    /// 是否存在非零余额（供呈现层高亮）
    pub fn has_value(&self) -> bool {
        self.balances.iter().any(|b| b.amount > 0)
    }
}

/// 扫描结束状态
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ScanStatus {
    Complete,
    /// 致命中断（AuthRequired）；携带人类可读原因，已累积的部分结果仍然返回
    Aborted(String),
    /// 用户取消；返回取消前已完成的部分结果
    Cancelled,
}

/// 一次扫描的最终产出；total 恒等于 findings.len()，
/// 每个过滤阶段按实际移除数修正计数
#[derive(Debug, Clone, Serialize)]
pub struct ScanOutcome {
    pub findings: Vec<Finding>,
    pub total: usize,
    pub status: ScanStatus,
    pub dropped_ignored: usize,
    pub dropped_noise: usize,
}

impl ScanOutcome {
    /// 把中断状态折算为类型化致命错误，供偏好硬失败的调用方使用；
    /// 完成/取消状态原样透传
    pub fn into_result(self) -> Result<ScanOutcome, crate::error::ScanError> {
        match &self.status {
            ScanStatus::Aborted(reason) => {
                Err(crate::error::ScanError::AuthRequired(reason.clone()))
            }
            _ => Ok(self),
        }
    }
}
