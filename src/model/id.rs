//! Generated identifiers.
//!
//! None of these are secrets; they only need to be unique in practice.

use chrono::{DateTime, Utc};
use rand::Rng;

const BASE36: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

fn to_base36(mut n: u64) -> String {
    if n == 0 {
        return "0".to_string();
    }
    let mut digits = Vec::new();
    while n > 0 {
        digits.push(BASE36[(n % 36) as usize]);
        n /= 36;
    }
    digits.reverse();
    String::from_utf8_lossy(&digits).into_owned()
}

/// `<prefix>-<millis in base36><9 random base36 chars>`.
pub fn generate_id(prefix: &str, now: DateTime<Utc>) -> String {
    let millis = now.timestamp_millis().max(0) as u64;
    let mut rng = rand::thread_rng();
    let suffix: String = (0..9)
        .map(|_| BASE36[rng.gen_range(0..BASE36.len())] as char)
        .collect();
    format!("{prefix}-{}{suffix}", to_base36(millis))
}

/// A display-only receipt hash: `0x<millis hex><8 random hex digits>`.
pub fn transaction_hash(now: DateTime<Utc>) -> String {
    let millis = now.timestamp_millis().max(0) as u64;
    let salt: u32 = rand::thread_rng().gen();
    format!("0x{millis:x}{salt:08x}")
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn base36() {
        assert_eq!(to_base36(0), "0");
        assert_eq!(to_base36(35), "z");
        assert_eq!(to_base36(36), "10");
    }

    #[test]
    fn ids_are_prefixed_and_distinct() {
        let now = Utc.with_ymd_and_hms(2024, 12, 10, 12, 0, 0).unwrap();
        let a = generate_id("vote", now);
        let b = generate_id("vote", now);
        assert!(a.starts_with("vote-"));
        assert_ne!(a, b);
        let hash = transaction_hash(now);
        assert!(hash.starts_with(&format!("0x{:x}", now.timestamp_millis())));
        assert_eq!(hash.len(), 2 + format!("{:x}", now.timestamp_millis()).len() + 8);
    }
}
