use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use leakhound_core::{
    extract_from_text, verify_candidates, PatternSet, ScanMode, ScanRequest, ScanSession,
    ScanTarget, SessionOptions, VerifyOptions,
};
use std::path::PathBuf;
use std::sync::atomic::Ordering;
use tracing::{info, warn};

mod chains;
mod github;
mod store;

use chains::PublicRpcBalances;
use github::GitHubClient;
use store::{EnvCredentialStore, JsonIgnoreStore};

/// 命令行入口（基于 clap）
#[derive(Parser, Debug)]
#[command(name = "leakhound", version, about = "GitHub 泄露密钥扫描与链上余额核验")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// 实时代码搜索扫描（全量预置查询集，或单条自定义关键字）
    Scan {
        /// 目标：owner/repo、完整 GitHub URL 或 user:login
        #[arg(long)]
        target: String,

        /// 自定义关键字；缺省走全量预置查询集
        #[arg(long)]
        keyword: Option<String>,

        /// 仅关注 .env 文件
        #[arg(long)]
        env_only: bool,

        /// 排除示例性文件（example/sample/template/readme）
        #[arg(long)]
        exclude_illustrative: bool,

        /// GitHub token；缺省读 GITHUB_TOKEN 环境变量
        #[arg(long)]
        token: Option<String>,

        /// 忽略名单文件
        #[arg(long, default_value = "./ignore.json")]
        ignore_file: PathBuf,

        /// 自定义内容规则文件（TOML）；缺省用内置规则集
        #[arg(long)]
        rules: Option<PathBuf>,

        /// 输出文件（JSON）；缺省打印到 stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// 提交历史遍历扫描（最近 100 个提交的 diff）
    History {
        /// 目标仓库：owner/repo 或完整 GitHub URL
        #[arg(long)]
        target: String,

        /// 自定义关键字；提供后仅做内容匹配，文件名拒绝表禁用
        #[arg(long)]
        keyword: Option<String>,

        /// 仅关注 .env 文件
        #[arg(long)]
        env_only: bool,

        /// 排除示例性文件
        #[arg(long)]
        exclude_illustrative: bool,

        /// GitHub token；缺省读 GITHUB_TOKEN 环境变量
        #[arg(long)]
        token: Option<String>,

        /// 忽略名单文件
        #[arg(long, default_value = "./ignore.json")]
        ignore_file: PathBuf,

        /// 自定义内容规则文件（TOML）
        #[arg(long)]
        rules: Option<PathBuf>,

        /// 输出文件（JSON）；缺省打印到 stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// 从本地文本提取候选密钥并核验链上余额
    Verify {
        /// 待提取的文本文件（diff、.env 片段等）
        #[arg(long)]
        input: PathBuf,

        /// 输出文件（JSON）；缺省打印到 stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// 忽略名单维护
    Ignore {
        #[command(subcommand)]
        action: IgnoreAction,
    },
}

#[derive(Subcommand, Debug)]
enum IgnoreAction {
    /// 标记仓库为安全（追加并持久化）
    Add {
        /// 仓库全名 owner/repo
        repo: String,

        #[arg(long, default_value = "./ignore.json")]
        ignore_file: PathBuf,
    },
    /// 列出当前名单
    List {
        #[arg(long, default_value = "./ignore.json")]
        ignore_file: PathBuf,
    },
}

fn main() -> Result<()> {
    // 初始化日志（支持通过 RUST_LOG 控制等级，例如 info、debug）
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Scan {
            target,
            keyword,
            env_only,
            exclude_illustrative,
            token,
            ignore_file,
            rules,
            output,
        } => {
            let mode = if keyword.is_some() { ScanMode::KeywordSearch } else { ScanMode::BroadSweep };
            run_scan(
                &target, mode, keyword, env_only, exclude_illustrative, token, ignore_file, rules,
                output,
            )
        }
        Commands::History {
            target,
            keyword,
            env_only,
            exclude_illustrative,
            token,
            ignore_file,
            rules,
            output,
        } => run_scan(
            &target,
            ScanMode::HistoricalSweep,
            keyword,
            env_only,
            exclude_illustrative,
            token,
            ignore_file,
            rules,
            output,
        ),
        Commands::Verify { input, output } => run_verify(&input, output),
        Commands::Ignore { action } => run_ignore(action),
    }
}

#[allow(clippy::too_many_arguments)]
fn run_scan(
    target: &str,
    mode: ScanMode,
    keyword: Option<String>,
    env_only: bool,
    exclude_illustrative: bool,
    token: Option<String>,
    ignore_file: PathBuf,
    rules: Option<PathBuf>,
    output: Option<PathBuf>,
) -> Result<()> {
    let target = ScanTarget::parse(target)?;
    let request = ScanRequest { target, mode, keyword, env_only };

    let credentials = EnvCredentialStore::new(token);
    let github = GitHubClient::new(&credentials).context("build github client")?;
    let ignore_store = JsonIgnoreStore::new(ignore_file);

    let opts = SessionOptions { exclude_illustrative, ..SessionOptions::default() };
    let mut session = ScanSession::new(&github, &github, &ignore_store, opts);
    if let Some(path) = rules {
        let set = PatternSet::from_toml_file(&path).context("load rules file")?;
        session = session.with_patterns(set);
    }

    // Ctrl-C 触发取消；遍历器在提交之间检查并交回部分结果
    let cancel = session.cancel_handle();
    ctrlc::set_handler(move || {
        warn!("cancellation requested");
        cancel.store(true, Ordering::Relaxed);
    })
    .context("install ctrl-c handler")?;

    let outcome = session.run(&request, &mut |done, total| {
        info!(done, total, "commit processed");
    })?;

    write_json(&outcome, output.as_deref())?;
    info!(
        total = outcome.total,
        dropped_ignored = outcome.dropped_ignored,
        dropped_noise = outcome.dropped_noise,
        "scan finished"
    );

    // 中断状态转换为硬失败，让退出码反映扫描未完成；完成/取消原样通过
    outcome.into_result()?;
    Ok(())
}

fn run_verify(input: &std::path::Path, output: Option<PathBuf>) -> Result<()> {
    let text = std::fs::read_to_string(input)
        .with_context(|| format!("read input file {}", input.display()))?;
    let candidates = extract_from_text(&text);
    if candidates.is_empty() {
        info!("no candidate secrets found");
        write_json(&Vec::<leakhound_core::BalanceReport>::new(), output.as_deref())?;
        return Ok(());
    }
    info!(count = candidates.len(), "candidates extracted, querying balances");

    let balances = PublicRpcBalances::new().context("build rpc client")?;
    let reports = verify_candidates(&candidates, &balances, &VerifyOptions::default());
    for report in reports.iter().filter(|r| r.has_value()) {
        warn!(
            kind = ?report.candidate.kind,
            derived = ?report.derived,
            "NON-ZERO BALANCE FOUND"
        );
    }
    write_json(&reports, output.as_deref())
}

fn run_ignore(action: IgnoreAction) -> Result<()> {
    use leakhound_core::endpoints::IgnoreStore;
    match action {
        IgnoreAction::Add { repo, ignore_file } => {
            let store = JsonIgnoreStore::new(ignore_file);
            let mut repos = store.load()?;
            if repos.insert(repo.clone()) {
                store.save(&repos)?;
                info!(%repo, "marked safe");
            } else {
                info!(%repo, "already in ignore list");
            }
            Ok(())
        }
        IgnoreAction::List { ignore_file } => {
            let store = JsonIgnoreStore::new(ignore_file);
            let mut repos: Vec<String> = store.load()?.into_iter().collect();
            repos.sort_unstable();
            for repo in repos {
                println!("{repo}");
            }
            Ok(())
        }
    }
}

/// 序列化为 JSON：有 output 写文件，否则打印 stdout
fn write_json<T: serde::Serialize>(value: &T, output: Option<&std::path::Path>) -> Result<()> {
    let txt = serde_json::to_string_pretty(value)?;
    match output {
        Some(path) => std::fs::write(path, txt)
            .with_context(|| format!("write output file {}", path.display()))?,
        None => println!("{txt}"),
    }
    Ok(())
}

fn init_tracing() {
    use tracing_subscriber::{EnvFilter, FmtSubscriber};
    // 支持通过环境变量 RUST_LOG 控制日志等级，如：RUST_LOG=debug
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder().with_env_filter(env_filter).finish();
    let _ = tracing::subscriber::set_global_default(subscriber);
}
