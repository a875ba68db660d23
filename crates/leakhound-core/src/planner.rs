//! 查询规划器：对同一请求产出确定且有序的查询序列
//!
//! 查询表按固定顺序声明，新增条目不需要改动任何调用方；
//! 本组件不发起网络请求，仅在目标/关键字畸形时报 `Validation`。
use crate::error::ScanError;
use crate::types::{QueryCategory, ScanMode, ScanRequest, SearchQuery};

/// 敏感文件名（env、密钥文件、CMS/DB 配置）
const SENSITIVE_FILENAMES: &[&str] = &[
    ".env",
    ".env.local",
    ".env.production",
    "id_rsa",
    "id_ed25519",
    "credentials",
    "wp-config.php",
    "database.yml",
    "settings.py",
    "config.json",
    "secrets.yml",
    "docker-compose.yml",
];

/// 连接串字面量（带凭证的 DSN 前缀）
const CONNECTION_LITERALS: &[&str] = &[
    "mongodb+srv://",
    "postgres://",
    "mysql://",
    "redis://",
    "amqp://",
];

/// 云服务 / SaaS 令牌前缀
const TOKEN_PREFIXES: &[&str] = &[
    "AKIA",
    "sk_live_",
    "sk-proj-",
    "ghp_",
    "gho_",
    "xoxb-",
    "xoxp-",
    "AIza",
    "SG.",
];

/// 私钥块标记
const PRIVATE_KEY_MARKERS: &[&str] = &[
    "BEGIN RSA PRIVATE KEY",
    "BEGIN OPENSSH PRIVATE KEY",
    "BEGIN PRIVATE KEY",
];

/// 钱包文件名
const WALLET_FILENAMES: &[&str] = &["wallet.dat", "keystore"];

/// 助记词 / 种子短语标记
const MNEMONIC_MARKERS: &[&str] = &["mnemonic", "seed phrase", "secret recovery phrase"];

/// 扩展私钥前缀（BIP32 及变体）
const EXTENDED_KEY_PREFIXES: &[&str] = &["xprv", "yprv", "zprv"];

/// 链相关私钥环境变量名
const CHAIN_ENV_NAMES: &[&str] = &[
    "PRIVATE_KEY=",
    "ETH_PRIVATE_KEY",
    "ETHEREUM_PRIVATE_KEY",
    "SOLANA_PRIVATE_KEY",
    "SOL_PRIVATE_KEY",
    "WALLET_PRIVATE_KEY",
    "DEPLOYER_PRIVATE_KEY",
    "MNEMONIC=",
];

/// 通用后缀模式
const GENERIC_SUFFIXES: &[&str] = &["_KEY=", "_SECRET=", "_TOKEN=", "_PASSWORD="];

/// 地址 / 公钥标记
const ADDRESS_MARKERS: &[&str] = &["publicKey", "walletAddress"];

/// 为一次请求构建查询序列；对相同输入输出逐条相等
///
/// `env_only` 语义：
/// - 文件名范围的查询若不指向 `.env`，整条丢弃；
/// - 其余查询一律追加 ` filename:.env` 约束。
pub fn build_queries(req: &ScanRequest) -> Result<Vec<SearchQuery>, ScanError> {
    if req.target.name.trim().is_empty() {
        return Err(ScanError::Validation("empty target name".into()));
    }
    let scope = req.target.scope_qualifier();
    let mut out: Vec<SearchQuery> = Vec::new();

    // 文件名范围查询；env_only 时只保留严格的 `.env`
    let push_filename = |f: &str, category: QueryCategory, out: &mut Vec<SearchQuery>| {
        if req.env_only && f != ".env" {
            return;
        }
        out.push(SearchQuery { text: format!("filename:{f} {scope}"), category });
    };
    // 字面量查询；env_only 时追加文件名约束
    let push_literal = |lit: &str, category: QueryCategory, out: &mut Vec<SearchQuery>| {
        let mut text = format!("\"{lit}\" {scope}");
        if req.env_only {
            text.push_str(" filename:.env");
        }
        out.push(SearchQuery { text, category });
    };

    match req.mode {
        ScanMode::KeywordSearch => {
            let kw = match req.keyword.as_deref().map(str::trim) {
                Some(k) if !k.is_empty() => k,
                _ => return Err(ScanError::Validation("keyword search without keyword".into())),
            };
            push_literal(kw, QueryCategory::Literal, &mut out);
        }
        ScanMode::HistoricalSweep => {
            // 历史遍历不走搜索端点
        }
        ScanMode::BroadSweep => {
            for &f in SENSITIVE_FILENAMES {
                push_filename(f, QueryCategory::Filename, &mut out);
            }
            for &l in CONNECTION_LITERALS {
                push_literal(l, QueryCategory::Literal, &mut out);
            }
            for &l in TOKEN_PREFIXES {
                push_literal(l, QueryCategory::Literal, &mut out);
            }
            for &l in PRIVATE_KEY_MARKERS {
                push_literal(l, QueryCategory::Literal, &mut out);
            }
            for &f in WALLET_FILENAMES {
                push_filename(f, QueryCategory::ChainSpecific, &mut out);
            }
            for &l in MNEMONIC_MARKERS {
                push_literal(l, QueryCategory::ChainSpecific, &mut out);
            }
            for &l in EXTENDED_KEY_PREFIXES {
                push_literal(l, QueryCategory::ChainSpecific, &mut out);
            }
            for &l in CHAIN_ENV_NAMES {
                push_literal(l, QueryCategory::ChainSpecific, &mut out);
            }
            for &l in GENERIC_SUFFIXES {
                push_literal(l, QueryCategory::Literal, &mut out);
            }
            for &l in ADDRESS_MARKERS {
                push_literal(l, QueryCategory::ChainSpecific, &mut out);
            }
        }
    }

    Ok(out)
}
