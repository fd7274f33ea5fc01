//! Ethereum wallet signature recovery
//!
//! Implements the `personal_sign` / EIP-191 scheme: the signed digest is
//! `keccak256("\x19Ethereum Signed Message:\n" || len(message) || message)`
//! and the signature is the 65-byte `r || s || v` encoding, hex-encoded.

use k256::ecdsa::{RecoveryId, Signature, SigningKey, VerifyingKey};
use sha3::{Digest, Keccak256};

/// Challenge message the frontend asks wallets to sign at login
pub const DEFAULT_CHALLENGE_MESSAGE: &str = "CHAINLINK HACKATHON 2022 | Welcome to grid bot";

const SIGNATURE_LEN: usize = 65;

#[derive(Debug, thiserror::Error)]
pub enum WalletError {
    #[error("signature is not valid hex: {0}")]
    Hex(#[from] hex::FromHexError),

    #[error("signature must be {SIGNATURE_LEN} bytes, got {0}")]
    Length(usize),

    #[error("invalid recovery byte: {0}")]
    RecoveryByte(u8),

    #[error("signature recovery failed: {0}")]
    Recovery(#[from] k256::ecdsa::Error),
}

/// EIP-191 digest of a `personal_sign` message
pub fn hash_personal_message(message: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak256::new();
    hasher.update(format!("\x19Ethereum Signed Message:\n{}", message.len()).as_bytes());
    hasher.update(message);
    hasher.finalize().into()
}

/// Lowercase `0x`-prefixed address of a secp256k1 public key
pub fn address_of(key: &VerifyingKey) -> String {
    let point = key.to_encoded_point(false);
    // Skip the 0x04 uncompressed-point prefix
    let hash = Keccak256::digest(&point.as_bytes()[1..]);
    format!("0x{}", hex::encode(&hash[12..]))
}

/// Recover the lowercase address that produced `signature_hex` over `message`
pub fn recover_signer(message: &str, signature_hex: &str) -> Result<String, WalletError> {
    let raw = signature_hex.trim();
    let raw = raw.strip_prefix("0x").unwrap_or(raw);
    let bytes = hex::decode(raw)?;
    if bytes.len() != SIGNATURE_LEN {
        return Err(WalletError::Length(bytes.len()));
    }

    // Wallets emit v as 27/28; some libraries emit the raw 0/1 parity
    let v = bytes[64];
    let parity = if v >= 27 { v - 27 } else { v };
    let recovery_id = RecoveryId::from_byte(parity).ok_or(WalletError::RecoveryByte(v))?;

    let signature = Signature::from_slice(&bytes[..64])?;
    let digest = hash_personal_message(message.as_bytes());
    let key = VerifyingKey::recover_from_prehash(&digest, &signature, recovery_id)?;

    Ok(address_of(&key))
}

/// Produce a `personal_sign` signature (hex, `v` in 27/28 form)
pub fn sign_personal_message(key: &SigningKey, message: &str) -> Result<String, WalletError> {
    let digest = hash_personal_message(message.as_bytes());
    let (signature, recovery_id) = key.sign_prehash_recoverable(&digest)?;

    let mut bytes = signature.to_bytes().to_vec();
    bytes.push(recovery_id.to_byte() + 27);
    Ok(format!("0x{}", hex::encode(bytes)))
}

/// Compare a caller-supplied wallet against a recovered (lowercase) signer
///
/// Surrounding whitespace on `claimed` is ignored in both modes.
/// `case_sensitive` keeps the legacy behavior where the claimed address had to
/// already be lowercase to match.
pub fn addresses_match(claimed: &str, recovered: &str, case_sensitive: bool) -> bool {
    let claimed = claimed.trim();
    let recovered = recovered.to_lowercase();
    if case_sensitive {
        claimed == recovered
    } else {
        claimed.to_lowercase() == recovered
    }
}
