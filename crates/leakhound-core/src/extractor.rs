//! 凭证提取器：对单个 Finding 的文本做模式匹配，产出类型化候选
//!
//! - 惰性调用：只在调用方请求某个 Finding 时执行，绝不对全量结果集预跑
//!   （下游每个候选都会触发外部核验调用，成本与候选数成正比）。
//! - 匹配器是有序固定注册表 `(name, kind, pattern, validate)`；
//!   新增一条匹配器不触碰任何调用方代码。
//! - 纯函数：畸形输入不报错，不匹配的匹配器只是零贡献。
//! - 0x + 64 hex 与 EVM 私钥同形（也可能是 Sui/Aptos 地址），
//!   两种解释都产出，由核验器分别尝试派生。
use std::collections::HashSet;
use std::sync::OnceLock;

use regex::Regex;

use crate::types::{CandidateSecret, Finding, SecretKind};

/// 匹配器声明；validate 用于正则表达力不够的二次校验
struct MatcherSpec {
    name: &'static str,
    kind: SecretKind,
    pattern: &'static str,
    validate: Option<fn(&str) -> bool>,
}

/// 注册表按声明顺序执行
const MATCHER_SPECS: &[MatcherSpec] = &[
    MatcherSpec {
        name: "evm-private-key",
        kind: SecretKind::EvmPrivateKey,
        pattern: r"\b(?:0x)?[0-9a-fA-F]{64}\b",
        validate: None,
    },
    MatcherSpec {
        name: "evm-address",
        kind: SecretKind::EvmAddress,
        pattern: r"\b0x[0-9a-fA-F]{40}\b",
        validate: None,
    },
    MatcherSpec {
        name: "sol-private-key",
        kind: SecretKind::SolPrivateKey,
        pattern: r"\b[1-9A-HJ-NP-Za-km-z]{87,88}\b",
        validate: None,
    },
    MatcherSpec {
        name: "sol-private-key-array",
        kind: SecretKind::SolPrivateKeyArray,
        pattern: r"\[\s*(?:\d{1,3}\s*,\s*){63}\d{1,3}\s*\]",
        validate: Some(is_u8_array_of_64),
    },
    MatcherSpec {
        name: "sol-address",
        kind: SecretKind::SolAddress,
        // 只有出现在 publicKey/wallet/address 关键字附近才算地址候选
        pattern: r"(?:(?i:public_?key|wallet|address))[^\n]{0,40}?\b([1-9A-HJ-NP-Za-km-z]{32,44})\b",
        validate: None,
    },
    MatcherSpec {
        name: "btc-address",
        kind: SecretKind::BtcAddress,
        pattern: r"\b(?:bc1[02-9ac-hj-np-z]{11,71}|[13][1-9A-HJ-NP-Za-km-z]{25,34})\b",
        validate: None,
    },
    MatcherSpec {
        name: "sui-aptos-address",
        kind: SecretKind::SuiOrAptosAddress,
        pattern: r"\b0x[0-9a-fA-F]{64}\b",
        validate: None,
    },
];

struct CompiledMatcher {
    kind: SecretKind,
    regex: Regex,
    validate: Option<fn(&str) -> bool>,
}

/// 编译后的注册表（进程内一次）
fn registry() -> &'static [CompiledMatcher] {
    static REGISTRY: OnceLock<Vec<CompiledMatcher>> = OnceLock::new();
    REGISTRY.get_or_init(|| {
        MATCHER_SPECS
            .iter()
            .map(|spec| CompiledMatcher {
                kind: spec.kind,
                // 注册表为内置常量，模式合法性由单测保证
                regex: Regex::new(spec.pattern)
                    .unwrap_or_else(|e| panic!("bad matcher {}: {e}", spec.name)),
                validate: spec.validate,
            })
            .collect()
    })
}

/// JSON 风格的 64 元素小整数数组（Solana keypair 导出格式）
fn is_u8_array_of_64(value: &str) -> bool {
    match serde_json::from_str::<Vec<u16>>(value) {
        Ok(nums) => nums.len() == 64 && nums.iter().all(|&n| n <= 255),
        Err(_) => false,
    }
}

/// 对一个 Finding 的文本执行提取
pub fn extract_candidates(finding: &Finding) -> Vec<CandidateSecret> {
    extract_from_text(&finding.snippet_text)
}

/// 对任意文本执行提取；同一 (kind, value) 只产出一次，保持首见顺序
pub fn extract_from_text(text: &str) -> Vec<CandidateSecret> {
    let mut seen: HashSet<(SecretKind, String)> = HashSet::new();
    let mut out: Vec<CandidateSecret> = Vec::new();

    for matcher in registry() {
        for caps in matcher.regex.captures_iter(text) {
            // 优先第 1 捕获组（上下文关键字类规则），否则取整个匹配
            let value = match caps.get(1) {
                Some(m) => m.as_str(),
                None => match caps.get(0) {
                    Some(m) => m.as_str(),
                    None => continue,
                },
            };
            if let Some(validate) = matcher.validate {
                if !validate(value) {
                    continue;
                }
            }
            if seen.insert((matcher.kind, value.to_string())) {
                out.push(CandidateSecret { kind: matcher.kind, value: value.to_string() });
            }
        }
    }

    out
}
