//! 公开身份派生（纯函数、无副作用）
//!
//! 私钥形态的候选按链的标准派生规则推出公开地址：
//! - EVM：secp256k1 私钥 → 未压缩公钥 → Keccak-256 → 末 20 字节；
//! - Solana：64 字节 keypair（seed ‖ pubkey），用 ed25519 从 seed 展开并与
//!   自带的 pubkey 交叉校验，不自洽即视为畸形。
//! 地址形态的候选原样透传。任何畸形输入返回 `Undetermined`，绝不报错。
use ed25519_dalek::SigningKey;
use k256::elliptic_curve::sec1::ToEncodedPoint;
use sha3::{Digest, Keccak256};

use crate::types::{CandidateSecret, DerivedIdentity, SecretKind};

/// 候选 → 可查询的公开地址
pub fn derive_identity(candidate: &CandidateSecret) -> DerivedIdentity {
    match candidate.kind {
        SecretKind::EvmPrivateKey => evm_address_from_hex(&candidate.value),
        SecretKind::EvmAddress | SecretKind::SuiOrAptosAddress => {
            DerivedIdentity::Address(candidate.value.to_lowercase())
        }
        SecretKind::SolPrivateKey => sol_address_from_base58(&candidate.value),
        SecretKind::SolPrivateKeyArray => sol_address_from_array(&candidate.value),
        SecretKind::SolAddress | SecretKind::BtcAddress => {
            DerivedIdentity::Address(candidate.value.clone())
        }
    }
}

/// hex 私钥（可带 0x）→ EVM 地址
fn evm_address_from_hex(value: &str) -> DerivedIdentity {
    let hex_part = value.strip_prefix("0x").unwrap_or(value);
    let bytes = match hex::decode(hex_part) {
        Ok(b) if b.len() == 32 => b,
        _ => return DerivedIdentity::Undetermined,
    };
    // 零值/越界标量在这里被拒绝
    let secret = match k256::SecretKey::from_slice(&bytes) {
        Ok(s) => s,
        Err(_) => return DerivedIdentity::Undetermined,
    };
    let point = secret.public_key().to_encoded_point(false);
    let uncompressed = point.as_bytes(); // 0x04 ‖ X ‖ Y
    let digest = Keccak256::digest(&uncompressed[1..]);
    DerivedIdentity::Address(format!("0x{}", hex::encode(&digest[12..])))
}

/// base58 编码的 64 字节 keypair → Solana 地址
fn sol_address_from_base58(value: &str) -> DerivedIdentity {
    match bs58::decode(value).into_vec() {
        Ok(bytes) => sol_address_from_keypair(&bytes),
        Err(_) => DerivedIdentity::Undetermined,
    }
}

/// JSON 数组导出格式（64 个小整数）→ Solana 地址
fn sol_address_from_array(value: &str) -> DerivedIdentity {
    match serde_json::from_str::<Vec<u16>>(value) {
        Ok(nums) if nums.len() == 64 && nums.iter().all(|&n| n <= 255) => {
            let bytes: Vec<u8> = nums.into_iter().map(|n| n as u8).collect();
            sol_address_from_keypair(&bytes)
        }
        _ => DerivedIdentity::Undetermined,
    }
}

/// 64 字节 keypair（seed ‖ pubkey），seed 展开结果必须与自带 pubkey 一致
fn sol_address_from_keypair(bytes: &[u8]) -> DerivedIdentity {
    if bytes.len() != 64 {
        return DerivedIdentity::Undetermined;
    }
    let seed: [u8; 32] = match bytes[..32].try_into() {
        Ok(s) => s,
        Err(_) => return DerivedIdentity::Undetermined,
    };
    let expanded = SigningKey::from_bytes(&seed).verifying_key().to_bytes();
    if expanded[..] != bytes[32..] {
        return DerivedIdentity::Undetermined;
    }
    DerivedIdentity::Address(bs58::encode(&expanded).into_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 众所周知的确定性测试私钥（hardhat/foundry 开发账户 #0）
    const DEV_KEY: &str = "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
    const DEV_ADDR: &str = "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266";

    fn candidate(kind: SecretKind, value: &str) -> CandidateSecret {
        CandidateSecret { kind, value: value.into() }
    }

    #[test]
    fn known_evm_key_derives_known_address() {
        let d = derive_identity(&candidate(SecretKind::EvmPrivateKey, DEV_KEY));
        assert_eq!(d, DerivedIdentity::Address(DEV_ADDR.into()));
        // 0x 前缀等价
        let d = derive_identity(&candidate(SecretKind::EvmPrivateKey, &format!("0x{DEV_KEY}")));
        assert_eq!(d, DerivedIdentity::Address(DEV_ADDR.into()));
    }

    #[test]
    fn zero_scalar_is_undetermined() {
        let zero = "0".repeat(64);
        let d = derive_identity(&candidate(SecretKind::EvmPrivateKey, &zero));
        assert_eq!(d, DerivedIdentity::Undetermined);
    }

    #[test]
    fn address_kinds_pass_through() {
        let d = derive_identity(&candidate(
            SecretKind::EvmAddress,
            "0x742d35Cc6634C0532925a3b844Bc454e4438f44e",
        ));
        assert_eq!(
            d,
            DerivedIdentity::Address("0x742d35cc6634c0532925a3b844bc454e4438f44e".into())
        );
        let d = derive_identity(&candidate(SecretKind::BtcAddress, "1A1zP1eP5QGefi2DMPTfTL5SLmv7DivfNa"));
        assert_eq!(d, DerivedIdentity::Address("1A1zP1eP5QGefi2DMPTfTL5SLmv7DivfNa".into()));
    }

    #[test]
    fn solana_keypair_roundtrip_is_self_consistent() {
        // 用固定 seed 构造一致的 keypair，派生结果应为其公钥的 base58
        let seed = [7u8; 32];
        let signing = SigningKey::from_bytes(&seed);
        let public = signing.verifying_key().to_bytes();
        let mut keypair = Vec::with_capacity(64);
        keypair.extend_from_slice(&seed);
        keypair.extend_from_slice(&public);

        let b58 = bs58::encode(&keypair).into_string();
        let d = derive_identity(&candidate(SecretKind::SolPrivateKey, &b58));
        assert_eq!(d, DerivedIdentity::Address(bs58::encode(&public).into_string()));

        let array = format!(
            "[{}]",
            keypair.iter().map(|b| b.to_string()).collect::<Vec<_>>().join(",")
        );
        let d = derive_identity(&candidate(SecretKind::SolPrivateKeyArray, &array));
        assert_eq!(d, DerivedIdentity::Address(bs58::encode(&public).into_string()));
    }

    #[test]
    fn inconsistent_keypair_is_undetermined() {
        let seed = [7u8; 32];
        let mut keypair = vec![0u8; 64];
        keypair[..32].copy_from_slice(&seed);
        // 后半段不是 seed 对应的公钥
        let b58 = bs58::encode(&keypair).into_string();
        let d = derive_identity(&candidate(SecretKind::SolPrivateKey, &b58));
        assert_eq!(d, DerivedIdentity::Undetermined);
    }

    #[test]
    fn malformed_inputs_never_panic() {
        for (kind, value) in [
            (SecretKind::EvmPrivateKey, "nothex"),
            (SecretKind::EvmPrivateKey, "abcd"),
            (SecretKind::SolPrivateKey, "0OIl"),
            (SecretKind::SolPrivateKey, "abc"),
            (SecretKind::SolPrivateKeyArray, "[1,2,3]"),
            (SecretKind::SolPrivateKeyArray, "not json"),
        ] {
            assert_eq!(derive_identity(&candidate(kind, value)), DerivedIdentity::Undetermined);
        }
    }
}
