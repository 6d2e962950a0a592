use super::names::{guest_name, sanitize_player_name};
use anyhow::Context;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileClaims {
    #[serde(rename = "sub")]
    pub account_id: String,
    pub name: String,
    #[serde(rename = "exp")]
    pub expires_at_ms: i64,
}

pub fn sign_profile_token(claims: &ProfileClaims, secret: &str) -> anyhow::Result<String> {
    let payload = serde_json::to_vec(claims).context("failed to serialize profile claims")?;
    let payload_b64 = URL_SAFE_NO_PAD.encode(payload);

    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .context("failed to initialize profile token signer")?;
    mac.update(payload_b64.as_bytes());
    let signature = mac.finalize().into_bytes();
    let signature_b64 = URL_SAFE_NO_PAD.encode(signature);

    Ok(format!("{payload_b64}.{signature_b64}"))
}

/// `None` for anything malformed, forged or expired.
pub fn verify_profile_token(token: &str, secret: &str, now_ms: i64) -> Option<ProfileClaims> {
    let (payload_b64, signature_b64) = token.trim().split_once('.')?;
    if signature_b64.contains('.') {
        return None;
    }
    let signature = URL_SAFE_NO_PAD.decode(signature_b64).ok()?;
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).ok()?;
    mac.update(payload_b64.as_bytes());
    mac.verify_slice(&signature).ok()?;

    let payload = URL_SAFE_NO_PAD.decode(payload_b64).ok()?;
    let claims: ProfileClaims = serde_json::from_slice(&payload).ok()?;
    if claims.expires_at_ms <= now_ms {
        return None;
    }
    Some(claims)
}

/// Best-effort identity: a verified token wins, anything else is guest play.
pub fn resolve_display_name(
    token: Option<&str>,
    requested_name: Option<&str>,
    secret: Option<&str>,
    now_ms: i64,
) -> String {
    let verified = match (token, secret) {
        (Some(token), Some(secret)) => {
            let claims = verify_profile_token(token, secret, now_ms);
            if claims.is_none() {
                tracing::debug!("profile token rejected, continuing as guest");
            }
            claims
        }
        _ => None,
    };
    let fallback = guest_name();
    match verified {
        Some(claims) => sanitize_player_name(&claims.name, &fallback),
        None => sanitize_player_name(requested_name.unwrap_or_default(), &fallback),
    }
}
