//! 公共 RPC 余额端点实现（每网络一个）
//!
//! 所有调用都带超时；任何失败（连接、超时、解析、非 2xx）折算为
//! `NetworkError`，由核心核验器记为该网络 "unavailable"。
use std::time::Duration;

use leakhound_core::endpoints::BalanceSource;
use leakhound_core::{NetworkError, NetworkId};
use serde_json::{json, Value};

/// 各网络的公共端点
fn endpoint(network: NetworkId) -> &'static str {
    match network {
        NetworkId::Ethereum => "https://eth.llamarpc.com",
        NetworkId::Bsc => "https://bsc-dataseed.binance.org",
        NetworkId::Polygon => "https://polygon-rpc.com",
        NetworkId::Arbitrum => "https://arb1.arbitrum.io/rpc",
        NetworkId::Optimism => "https://mainnet.optimism.io",
        NetworkId::Solana => "https://api.mainnet-beta.solana.com",
        NetworkId::Bitcoin => "https://blockstream.info/api",
        NetworkId::Sui => "https://fullnode.mainnet.sui.io",
        NetworkId::Aptos => "https://fullnode.mainnet.aptoslabs.com/v1",
    }
}

/// 公共 RPC 余额源；可在核验器线程间共享
pub struct PublicRpcBalances {
    http: reqwest::blocking::Client,
}

impl PublicRpcBalances {
    pub fn new() -> anyhow::Result<Self> {
        let http = reqwest::blocking::Client::builder()
            .user_agent(concat!("leakhound/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(10))
            .build()?;
        Ok(PublicRpcBalances { http })
    }

    fn post_json(&self, url: &str, body: Value) -> Result<Value, NetworkError> {
        let resp = self
            .http
            .post(url)
            .json(&body)
            .send()
            .map_err(|e| NetworkError(e.to_string()))?;
        if !resp.status().is_success() {
            return Err(NetworkError(format!("http status {}", resp.status())));
        }
        resp.json::<Value>().map_err(|e| NetworkError(e.to_string()))
    }

    /// JSON-RPC eth_getBalance → wei
    fn evm_balance(&self, network: NetworkId, address: &str) -> Result<u128, NetworkError> {
        let body = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": "eth_getBalance",
            "params": [address, "latest"],
        });
        let value = self.post_json(endpoint(network), body)?;
        let result = value
            .get("result")
            .and_then(Value::as_str)
            .ok_or_else(|| NetworkError(format!("malformed rpc response: {value}")))?;
        let hex_part = result.strip_prefix("0x").unwrap_or(result);
        u128::from_str_radix(hex_part, 16).map_err(|e| NetworkError(e.to_string()))
    }

    /// Solana getBalance → lamports
    fn solana_balance(&self, address: &str) -> Result<u128, NetworkError> {
        let body = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": "getBalance",
            "params": [address],
        });
        let value = self.post_json(endpoint(NetworkId::Solana), body)?;
        value
            .pointer("/result/value")
            .and_then(Value::as_u64)
            .map(u128::from)
            .ok_or_else(|| NetworkError(format!("malformed rpc response: {value}")))
    }

    /// Blockstream 地址统计 → satoshi（funded - spent）
    fn bitcoin_balance(&self, address: &str) -> Result<u128, NetworkError> {
        let url = format!("{}/address/{address}", endpoint(NetworkId::Bitcoin));
        let resp = self.http.get(&url).send().map_err(|e| NetworkError(e.to_string()))?;
        if !resp.status().is_success() {
            return Err(NetworkError(format!("http status {}", resp.status())));
        }
        let value: Value = resp.json().map_err(|e| NetworkError(e.to_string()))?;
        let funded = value
            .pointer("/chain_stats/funded_txo_sum")
            .and_then(Value::as_u64)
            .unwrap_or(0);
        let spent = value
            .pointer("/chain_stats/spent_txo_sum")
            .and_then(Value::as_u64)
            .unwrap_or(0);
        Ok(u128::from(funded.saturating_sub(spent)))
    }

    /// Sui suix_getBalance → MIST
    fn sui_balance(&self, address: &str) -> Result<u128, NetworkError> {
        let body = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": "suix_getBalance",
            "params": [address],
        });
        let value = self.post_json(endpoint(NetworkId::Sui), body)?;
        value
            .pointer("/result/totalBalance")
            .and_then(Value::as_str)
            .and_then(|s| s.parse::<u128>().ok())
            .ok_or_else(|| NetworkError(format!("malformed rpc response: {value}")))
    }

    /// Aptos CoinStore 资源 → octa；账户/资源不存在视为 0
    fn aptos_balance(&self, address: &str) -> Result<u128, NetworkError> {
        let url = format!(
            "{}/accounts/{address}/resource/0x1::coin::CoinStore%3C0x1::aptos_coin::AptosCoin%3E",
            endpoint(NetworkId::Aptos)
        );
        let resp = self.http.get(&url).send().map_err(|e| NetworkError(e.to_string()))?;
        if resp.status().as_u16() == 404 {
            return Ok(0);
        }
        if !resp.status().is_success() {
            return Err(NetworkError(format!("http status {}", resp.status())));
        }
        let value: Value = resp.json().map_err(|e| NetworkError(e.to_string()))?;
        value
            .pointer("/data/coin/value")
            .and_then(Value::as_str)
            .and_then(|s| s.parse::<u128>().ok())
            .ok_or_else(|| NetworkError(format!("malformed resource: {value}")))
    }
}

impl BalanceSource for PublicRpcBalances {
    fn get_balance(&self, network: NetworkId, address: &str) -> Result<u128, NetworkError> {
        match network {
            NetworkId::Ethereum
            | NetworkId::Bsc
            | NetworkId::Polygon
            | NetworkId::Arbitrum
            | NetworkId::Optimism => self.evm_balance(network, address),
            NetworkId::Solana => self.solana_balance(address),
            NetworkId::Bitcoin => self.bitcoin_balance(address),
            NetworkId::Sui => self.sui_balance(address),
            NetworkId::Aptos => self.aptos_balance(address),
        }
    }
}
