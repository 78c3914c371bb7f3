//! Demo fixtures shown by a freshly seeded session.

use chrono::{DateTime, TimeZone, Utc};

use crate::types::{Participant, PayoutStatus, PayoutTransaction, SplitSheet, SplitStatus};

fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, h, min, 0)
        .single()
        .unwrap_or_default()
}

/// Split sheets, newest first.
pub fn demo_splits() -> Vec<SplitSheet> {
    vec![
        SplitSheet {
            id: "0x9b...4e99".to_string(),
            title: "Cyber City Sessions".to_string(),
            status: SplitStatus::Pending,
            participants: vec![
                Participant::new("Storm Hunter", 60.0).verified(),
                Participant::new("Echo One", 40.0),
            ],
            creation_date: at(2024, 11, 25, 0, 0),
            hash: "zkp_pending_0x9b...4e99".to_string(),
        },
        SplitSheet {
            id: "0x3a...1f22".to_string(),
            title: "Diamond Nights (ft. Neon)".to_string(),
            status: SplitStatus::Verified,
            participants: vec![
                Participant::new("Storm Hunter", 50.0).verified(),
                Participant::new("Neon Ghost", 25.0).verified(),
                Participant::new("Apex Beats", 25.0).verified(),
            ],
            creation_date: at(2024, 11, 20, 0, 0),
            hash: "zkp_7c1e90ab_0x3a...1f22".to_string(),
        },
    ]
}

/// Payout ledger, newest first.
pub fn demo_payouts() -> Vec<PayoutTransaction> {
    let tx = |id: &str, source: &str, amount: f64, timestamp: DateTime<Utc>, status: PayoutStatus| {
        PayoutTransaction {
            id: id.to_string(),
            source: source.to_string(),
            amount,
            timestamp,
            verified: true,
            status,
        }
    };

    vec![
        tx("TX-9201", "Spotify (Global)", 12450.20, at(2024, 11, 24, 14, 20), PayoutStatus::Cleared),
        tx("TX-9198", "Apple Music", 8900.50, at(2024, 11, 23, 9, 12), PayoutStatus::Cleared),
        tx("TX-9195", "YouTube ContentID", 4500.00, at(2024, 11, 22, 18, 45), PayoutStatus::Processing),
        tx("TX-9182", "Apex Publishing", 32000.00, at(2024, 11, 20, 11, 30), PayoutStatus::Cleared),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_demo_splits_are_whole() {
        for split in demo_splits() {
            let total: f64 = split.participants.iter().map(|p| p.percentage).sum();
            assert_eq!(total, 100.0, "{}", split.title);
        }
    }

    #[test]
    fn test_demo_payouts_newest_first() {
        let payouts = demo_payouts();
        assert!(payouts.windows(2).all(|w| w[0].timestamp >= w[1].timestamp));
        assert!(payouts.iter().all(|p| p.validate().is_ok()));
    }
}
