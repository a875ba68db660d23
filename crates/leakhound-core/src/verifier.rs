//! 余额核验器：按 (候选 × 网络) 并行扇出，逐任务隔离失败
//!
//! 并行调度：
//! - 任务在 Rayon 线程池内执行，结果经有界通道流回当前线程的收集端；
//! - 每个任务只写自己的 (候选, 网络) 槽位，候选之间、网络之间无共享可变状态；
//! - 单任务失败（含超时，由端点实现负责）折算为该网络 "unavailable"，
//!   永不拖垮同一候选或其他候选的其余查询。
use crossbeam_channel as channel;
use rayon::prelude::*;
use tracing::{debug, warn};

use crate::derive::derive_identity;
use crate::endpoints::BalanceSource;
use crate::extractor::extract_candidates;
use crate::types::{
    BalanceReport, CandidateSecret, DerivedIdentity, Finding, NetworkBalance, NetworkId,
    SecretKind,
};

/// 核验选项
#[derive(Debug, Clone, Copy, Default)]
pub struct VerifyOptions {
    /// 线程数：None 表示自动（CPU 核数与任务数取小）
    pub threads: Option<usize>,
}

/// 一种候选类型要触达的网络集合
fn networks_for(kind: SecretKind) -> &'static [NetworkId] {
    match kind {
        SecretKind::EvmPrivateKey | SecretKind::EvmAddress => &NetworkId::EVM_MAINNETS,
        SecretKind::SolPrivateKey | SecretKind::SolPrivateKeyArray | SecretKind::SolAddress => {
            &[NetworkId::Solana]
        }
        SecretKind::BtcAddress => &[NetworkId::Bitcoin],
        // 同形地址：两条链都试，报告返回有数据的那些
        SecretKind::SuiOrAptosAddress => &[NetworkId::Sui, NetworkId::Aptos],
    }
}

/// 核验一批候选；每个候选得到一份报告，顺序与输入一致
///
/// 派生为 `Undetermined` 的候选不发起任何查询，其目标网络全部记为
/// unavailable（缺数据是合法结果）。
pub fn verify_candidates(
    candidates: &[CandidateSecret],
    source: &dyn BalanceSource,
    opts: &VerifyOptions,
) -> Vec<BalanceReport> {
    let mut reports: Vec<BalanceReport> = Vec::with_capacity(candidates.len());
    // (候选槽位, 网络, 地址) 任务表
    let mut tasks: Vec<(usize, NetworkId, String)> = Vec::new();

    for candidate in candidates {
        let derived = derive_identity(candidate);
        let idx = reports.len();
        match &derived {
            DerivedIdentity::Address(address) => {
                for network in networks_for(candidate.kind) {
                    tasks.push((idx, *network, address.clone()));
                }
                reports.push(BalanceReport {
                    candidate: candidate.clone(),
                    derived,
                    balances: Vec::new(),
                    unavailable: Vec::new(),
                });
            }
            DerivedIdentity::Undetermined => {
                reports.push(BalanceReport {
                    candidate: candidate.clone(),
                    derived,
                    balances: Vec::new(),
                    unavailable: networks_for(candidate.kind).to_vec(),
                });
            }
        }
    }

    if tasks.is_empty() {
        return reports;
    }

    let threads = opts.threads.unwrap_or_else(num_cpus::get).max(1).min(tasks.len());
    type Msg = (usize, NetworkId, Result<u128, crate::error::NetworkError>);
    let (tx, rx) = channel::bounded::<Msg>(64);

    // 扇出在作用域线程内进入 Rayon 池；收集端留在当前线程
    std::thread::scope(|scope| {
        let tasks_ref = &tasks;
        scope.spawn(move || {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(threads)
                .build()
                .expect("build rayon pool");
            pool.install(|| {
                tasks_ref.par_iter().for_each(|(idx, network, address)| {
                    let res = source.get_balance(*network, address);
                    let _ = tx.send((*idx, *network, res));
                });
            });
            // 闭包结束时 Sender 被丢弃，收集端随之收到关闭信号
        });

        while let Ok((idx, network, res)) = rx.recv() {
            match res {
                Ok(amount) => {
                    debug!(network = network.label(), amount, "balance fetched");
                    reports[idx].balances.push(NetworkBalance { network, amount });
                }
                Err(err) => {
                    warn!(network = network.label(), error = %err, "balance unavailable");
                    reports[idx].unavailable.push(network);
                }
            }
        }
    });

    // 网络序固定，保证报告可复现
    for report in &mut reports {
        report.balances.sort_by_key(|b| b.network);
        report.unavailable.sort();
    }
    reports
}

/// 对单个 Finding 的按需核验：提取候选后全部查询
/// 不同 Finding 的核验相互独立，可由调用方并发发起
pub fn verify_finding(
    finding: &Finding,
    source: &dyn BalanceSource,
    opts: &VerifyOptions,
) -> Vec<BalanceReport> {
    let candidates = extract_candidates(finding);
    verify_candidates(&candidates, source, opts)
}
