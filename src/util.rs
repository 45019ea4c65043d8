//! Formatting, validation and retry helpers shared by the SDK and the binaries.

use crate::error::{Error, Result};
use primitive_types::U256;
use std::future::Future;
use std::time::Duration;
use tracing::warn;

const WEI_PER_ETHER: u64 = 1_000_000_000_000_000_000;

pub fn to_hex_string(bytes: &[u8]) -> String {
    format!("0x{}", hex::encode(bytes))
}

/// Decodes hex with or without a `0x` prefix.
pub fn from_hex_string(s: &str) -> Result<Vec<u8>> {
    let s = s.trim();
    let s = s
        .strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s);
    hex::decode(s).map_err(|e| Error::InvalidInput(format!("invalid hex string: {}", e)))
}

/// Shortens long handles for display: `0x1234...cdef`.
pub fn format_handle(handle: &str) -> String {
    if handle.chars().count() <= 10 {
        return handle.to_string();
    }
    let chars: Vec<char> = handle.chars().collect();
    let head: String = chars[..6].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}...{}", head, tail)
}

pub fn is_valid_address(address: &str) -> bool {
    match address.strip_prefix("0x") {
        Some(rest) => rest.len() == 40 && rest.chars().all(|c| c.is_ascii_hexdigit()),
        None => false,
    }
}

pub fn ensure_address(address: &str) -> Result<()> {
    if is_valid_address(address) {
        Ok(())
    } else {
        Err(Error::InvalidAddress(address.to_string()))
    }
}

pub fn is_valid_network(network: &str) -> bool {
    matches!(network, "sepolia" | "mainnet" | "localhost" | "custom")
}

fn explorer_base(network: &str) -> &'static str {
    match network {
        "mainnet" => "https://etherscan.io",
        "localhost" => "http://localhost:8545",
        _ => "https://sepolia.etherscan.io",
    }
}

pub fn explorer_address_url(network: &str, address: &str) -> String {
    format!("{}/address/{}", explorer_base(network), address)
}

pub fn explorer_tx_url(network: &str, tx_hash: &str) -> String {
    format!("{}/tx/{}", explorer_base(network), tx_hash)
}

/// Renders a wei amount in ether, rounded to `decimals` places (at most 18).
pub fn format_ether(wei: U256, decimals: u32) -> String {
    let decimals = decimals.min(18);
    let unit = U256::from(WEI_PER_ETHER);
    let scale = U256::from(10u64).pow(U256::from(decimals));
    let (mut whole, rem) = wei.div_mod(unit);
    // rem < 10^18 and scale <= 10^18, so the product stays far below U256::MAX.
    let mut frac = (rem * scale + unit / 2) / unit;
    if frac == scale {
        whole += U256::one();
        frac = U256::zero();
    }
    if decimals == 0 {
        return whole.to_string();
    }
    format!("{}.{:0>width$}", whole, frac.to_string(), width = decimals as usize)
}

/// Parses a decimal ether amount into wei; digits past the 18th decimal are truncated.
pub fn parse_ether(ether: &str) -> Result<U256> {
    let ether = ether.trim();
    let (whole, frac) = match ether.split_once('.') {
        Some((w, f)) => (w, f),
        None => (ether, ""),
    };
    let bad = || Error::InvalidInput(format!("invalid ether amount: {:?}", ether));
    if whole.is_empty() && frac.is_empty() {
        return Err(bad());
    }
    if !whole.chars().all(|c| c.is_ascii_digit()) || !frac.chars().all(|c| c.is_ascii_digit()) {
        return Err(bad());
    }
    let whole = if whole.is_empty() {
        U256::zero()
    } else {
        U256::from_dec_str(whole).map_err(|_| bad())?
    };
    let mut frac_digits: String = frac.chars().take(18).collect();
    while frac_digits.len() < 18 {
        frac_digits.push('0');
    }
    let frac = U256::from_dec_str(&frac_digits).map_err(|_| bad())?;
    whole
        .checked_mul(U256::from(WEI_PER_ETHER))
        .and_then(|w| w.checked_add(frac))
        .ok_or_else(bad)
}

/// Retries `f` with exponential backoff (`base_delay * 2^attempt`).
///
/// Makes `max_retries + 1` attempts in total and returns the last error.
pub async fn retry<T, E, F, Fut>(mut f: F, max_retries: u32, base_delay: Duration) -> std::result::Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = std::result::Result<T, E>>,
    E: std::fmt::Display,
{
    let mut attempt = 0;
    loop {
        match f().await {
            Ok(v) => return Ok(v),
            Err(e) if attempt < max_retries => {
                let delay = base_delay * 2u32.saturating_pow(attempt);
                warn!(attempt, ?delay, error = %e, "retrying after failure");
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    #[test]
    fn hex_helpers() {
        assert_eq!(to_hex_string(&[0x01, 0xab]), "0x01ab");
        assert_eq!(from_hex_string("0x01ab").unwrap(), vec![0x01, 0xab]);
        assert_eq!(from_hex_string("01AB").unwrap(), vec![0x01, 0xab]);
        assert!(from_hex_string("0xzz").is_err());
    }

    #[test]
    fn handles_are_shortened() {
        assert_eq!(format_handle("0x1234"), "0x1234");
        assert_eq!(format_handle("0x1234567890abcdef"), "0x1234...cdef");
    }

    #[test]
    fn addresses() {
        assert!(is_valid_address("0x5FbDB2315678afecb367f032d93F642f64180aa3"));
        assert!(!is_valid_address("5FbDB2315678afecb367f032d93F642f64180aa3"));
        assert!(!is_valid_address("0x5FbDB2315678afecb367f032d93F642f64180aa"));
        assert!(!is_valid_address("0xZZbDB2315678afecb367f032d93F642f64180aa3"));
    }

    #[test]
    fn explorer_falls_back_to_sepolia() {
        assert_eq!(
            explorer_tx_url("mainnet", "0xabc"),
            "https://etherscan.io/tx/0xabc"
        );
        assert_eq!(
            explorer_address_url("unknown", "0xabc"),
            "https://sepolia.etherscan.io/address/0xabc"
        );
    }

    #[test]
    fn ether_formatting() {
        let one_and_half = U256::from(1_500_000_000_000_000_000u64);
        assert_eq!(format_ether(one_and_half, 4), "1.5000");
        assert_eq!(format_ether(U256::from(123_456_789_000_000u64), 4), "0.0001");
        assert_eq!(format_ether(one_and_half, 0), "2");
        assert_eq!(
            format_ether(U256::from(999_999_999_999_999_999u64), 4),
            "1.0000"
        );
        assert_eq!(format_ether(U256::from(1u8), 30), "0.000000000000000001");

        let max_whole = (U256::MAX / U256::from(WEI_PER_ETHER)).to_string();
        let formatted = format_ether(U256::MAX, 4);
        assert!(formatted.starts_with(&max_whole), "{}", formatted);
        assert_eq!(format_ether(U256::MAX, 100).len(), max_whole.len() + 19);
        assert_eq!(parse_ether("1.5").unwrap(), one_and_half);
        assert_eq!(parse_ether(".5").unwrap(), U256::from(500_000_000_000_000_000u64));
        assert!(parse_ether("1.2.3").is_err());
        assert!(parse_ether("").is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn retry_backs_off_until_success() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = calls.clone();
        let out: std::result::Result<u32, String> = retry(
            move || {
                let c = c.clone();
                async move {
                    let n = c.fetch_add(1, Ordering::SeqCst);
                    if n < 2 {
                        Err(format!("attempt {} failed", n))
                    } else {
                        Ok(n)
                    }
                }
            },
            3,
            Duration::from_millis(10),
        )
        .await;
        assert_eq!(out, Ok(2));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn retry_surfaces_last_error() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = calls.clone();
        let out: std::result::Result<(), String> = retry(
            move || {
                let c = c.clone();
                async move { Err(format!("failure {}", c.fetch_add(1, Ordering::SeqCst))) }
            },
            2,
            Duration::from_millis(10),
        )
        .await;
        assert_eq!(out, Err("failure 2".to_string()));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }
}
