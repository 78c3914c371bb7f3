//! Mock security utilities.
//!
//! Stand-ins for identity, proof and intrusion-detection primitives. They
//! shape strings the way the real artifacts would look and nothing more:
//! no output here is cryptographically meaningful.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::ModelError;
use crate::random::{random_string, RandomSource};

/// Upper bound (inclusive) of simulated intrusions per poll.
pub const MAX_INTRUSIONS_PER_POLL: u32 = 4;

/// Tag prepended to sealed payloads before encoding.
const SEAL_TAG: &str = "enc_v1_";

const HEX: &[u8] = b"0123456789abcdef";
const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Random `0x`-prefixed 40-digit hex wallet address.
pub fn generate_wallet_address(rng: &dyn RandomSource) -> String {
    format!("0x{}", random_string(rng, HEX, 40))
}

/// Mock DID for a wallet: `did:rap:eth:<wallet[2..12]>...<random suffix>`.
///
/// The suffix is fresh on every call, so the same wallet yields a
/// different DID each time.
pub fn generate_did(wallet: &str, rng: &dyn RandomSource) -> String {
    let fragment: String = wallet.chars().skip(2).take(10).collect();
    format!(
        "did:rap:eth:{}...{}",
        fragment,
        random_string(rng, BASE36, 6)
    )
}

/// Mock proof token for an asset: `zkp_<8 hex>_<asset_id>`.
pub fn generate_zk_proof(asset_id: &str, rng: &dyn RandomSource) -> String {
    format!("zkp_{}_{}", random_string(rng, HEX, 8), asset_id)
}

/// Simulated intrusion count, uniform in `0..=MAX_INTRUSIONS_PER_POLL`.
pub fn monitor_threats(rng: &dyn RandomSource) -> u32 {
    rng.below(MAX_INTRUSIONS_PER_POLL + 1)
}

/// Random `0x`-prefixed token used as a record identifier.
pub fn random_token(rng: &dyn RandomSource) -> String {
    format!("0x{}", random_string(rng, HEX, 12))
}

/// Seal a value: base64 of the tagged JSON text. Not encryption.
pub fn seal<T: Serialize>(value: &T) -> Result<String, ModelError> {
    let json = serde_json::to_string(value).map_err(|e| ModelError::Seal(e.to_string()))?;
    Ok(STANDARD.encode(format!("{SEAL_TAG}{json}")))
}

/// Read back a sealed value. Input that is not a sealed blob is parsed as
/// plain JSON.
pub fn unseal<T: DeserializeOwned>(text: &str) -> Result<T, ModelError> {
    let decoded = STANDARD
        .decode(text.trim())
        .ok()
        .and_then(|bytes| String::from_utf8(bytes).ok());

    let json = match decoded.as_deref().and_then(|d| d.strip_prefix(SEAL_TAG)) {
        Some(inner) => inner.to_string(),
        None => text.to_string(),
    };

    serde_json::from_str(&json).map_err(|e| ModelError::Seal(e.to_string()))
}
