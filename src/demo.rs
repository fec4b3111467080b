//! Deterministic demo dataset: users and pre-triaged mail items.
//!
//! Used by `--demo`, by `Session::seeded`, and as a fixture in tests. No
//! randomness; the same dataset is produced on every run.

use crate::config::Config;
use crate::intake::{self, RecognizedEnvelope};
use crate::model::{AddressFields, AiSuggestion, MailItem, Role, User};
use crate::review::{self, ReviewAction};

/// First sequence number used by the seeded items.
pub const SEED_START: u64 = 1001;

pub fn operator_anita() -> User {
    User {
        id: "op-anita".to_string(),
        name: "Anita Desai".to_string(),
        role: Role::Operator,
        center: "Delhi Central".to_string(),
        supervisor_id: Some("sup-vikram".to_string()),
    }
}

pub fn operator_ravi() -> User {
    User {
        id: "op-ravi".to_string(),
        name: "Ravi Kumar".to_string(),
        role: Role::Operator,
        center: "Delhi Central".to_string(),
        supervisor_id: Some("sup-vikram".to_string()),
    }
}

pub fn operator_meera() -> User {
    User {
        id: "op-meera".to_string(),
        name: "Meera Patel".to_string(),
        role: Role::Operator,
        center: "Mumbai Central".to_string(),
        supervisor_id: None,
    }
}

pub fn supervisor_vikram() -> User {
    User {
        id: "sup-vikram".to_string(),
        name: "Vikram Singh".to_string(),
        role: Role::Supervisor,
        center: "Delhi Central".to_string(),
        supervisor_id: None,
    }
}

pub fn admin_priya() -> User {
    User {
        id: "admin-priya".to_string(),
        name: "Priya Nair".to_string(),
        role: Role::Admin,
        center: "Delhi Central".to_string(),
        supervisor_id: None,
    }
}

pub fn demo_users() -> Vec<User> {
    vec![
        operator_anita(),
        operator_ravi(),
        operator_meera(),
        supervisor_vikram(),
        admin_priya(),
    ]
}

/// Look up the demo user for an acting role.
pub fn demo_user_for(role: Role) -> User {
    match role {
        Role::Operator => operator_anita(),
        Role::Supervisor => supervisor_vikram(),
        Role::Admin => admin_priya(),
    }
}

#[allow(clippy::too_many_arguments)]
fn envelope(
    name: &str,
    house_no: &str,
    street: &str,
    locality: &str,
    city: &str,
    state: &str,
    pincode: &str,
    corrected_pincode: &str,
    delivery_hub: &str,
    nodal_center: &str,
    confidence: u8,
    flags: &[&str],
    reasoning: &str,
) -> RecognizedEnvelope {
    RecognizedEnvelope {
        image_ref: format!("scan-{pincode}-{house_no}.jpg"),
        ocr_text: format!("{name}, {house_no} {street}, {locality}, {city} {pincode}"),
        fields: AddressFields {
            name: name.to_string(),
            house_no: house_no.to_string(),
            street: street.to_string(),
            locality: locality.to_string(),
            city: city.to_string(),
            state: state.to_string(),
            pincode: pincode.to_string(),
        },
        suggestion: AiSuggestion {
            corrected_pincode: corrected_pincode.to_string(),
            delivery_hub: delivery_hub.to_string(),
            nodal_center: nodal_center.to_string(),
            confidence,
            flags: flags.iter().map(|f| f.to_string()).collect(),
            reasoning: reasoning.to_string(),
        },
    }
}

/// Build the demo item collection: three operators across two centers, all
/// five statuses, all three confidence bands, and a mix of recorded and
/// missing processing times.
pub fn seed_items(config: &Config) -> Vec<MailItem> {
    let anita = operator_anita();
    let ravi = operator_ravi();
    let meera = operator_meera();
    let vikram = supervisor_vikram();

    let mut seq = SEED_START;
    let mut next = |envelope: RecognizedEnvelope, user: &User, time: Option<u32>| {
        let mut item = intake::ingest(envelope, user, config, seq);
        seq += 1;
        item.processing_time = time;
        intake::submit(&mut item, user);
        item
    };

    let mut items = vec![
        next(
            envelope(
                "Mr. Ramesh Sharma",
                "45",
                "MG Road",
                "Gandhi Nagar",
                "Jaipur",
                "Rajasthan",
                "302015",
                "302015",
                "DH-302",
                "NC-30",
                96,
                &[],
                "High confidence match. All fields validated successfully.",
            ),
            &anita,
            Some(32),
        ),
        next(
            envelope(
                "Smt. Kavita Joshi",
                "12B",
                "Nehru Marg",
                "Karol Bagh",
                "New Delhi",
                "Delhi",
                "110005",
                "110005",
                "DH-110",
                "NC-11",
                78,
                &["Low confidence", "Manual review suggested"],
                "Address fields extracted but manual verification recommended.",
            ),
            &anita,
            Some(41),
        ),
        next(
            envelope(
                "Sh. Arun Verma",
                "7",
                "Station Road",
                "Paharganj",
                "New Delhi",
                "Delhi",
                "302001",
                "110055",
                "DH-110",
                "NC-11",
                55,
                &["Low confidence", "PIN-City mismatch"],
                "Recognized pincode does not match the recognized city.",
            ),
            &anita,
            Some(58),
        ),
        next(
            envelope(
                "Dr. Sunita Rao",
                "203",
                "Lodhi Road",
                "Jor Bagh",
                "New Delhi",
                "Delhi",
                "110003",
                "110003",
                "DH-110",
                "NC-11",
                91,
                &[],
                "High confidence match. All fields validated successfully.",
            ),
            &ravi,
            Some(38),
        ),
        next(
            envelope(
                "Mr. Imran Qureshi",
                "88",
                "Chandni Chowk",
                "Old Delhi",
                "New Delhi",
                "Delhi",
                "110006",
                "110006",
                "DH-110",
                "NC-11",
                85,
                &[],
                "Confidence at the review boundary; queued without a flag.",
            ),
            &ravi,
            Some(47),
        ),
        next(
            envelope(
                "Ms. Farah Khan",
                "5A",
                "Mall Road",
                "Civil Lines",
                "New Delhi",
                "Delhi",
                "1100_4",
                "110054",
                "DH-110",
                "NC-11",
                62,
                &["Illegible text", "Low confidence"],
                "Fifth pincode digit unreadable; nearest match suggested.",
            ),
            &ravi,
            None,
        ),
        next(
            envelope(
                "Mr. Devdutt Iyer",
                "31",
                "Ring Road",
                "Lajpat Nagar",
                "New Delhi",
                "Delhi",
                "110024",
                "110024",
                "DH-110",
                "NC-11",
                88,
                &[],
                "High confidence match. All fields validated successfully.",
            ),
            &ravi,
            None,
        ),
        next(
            envelope(
                "Mrs. Lakshmi Menon",
                "14",
                "Marine Drive",
                "Nariman Point",
                "Mumbai",
                "Maharashtra",
                "400021",
                "400021",
                "DH-400",
                "NC-40",
                93,
                &[],
                "High confidence match. All fields validated successfully.",
            ),
            &meera,
            Some(35),
        ),
        next(
            envelope(
                "Mr. Sanjay Kulkarni",
                "67",
                "LBS Marg",
                "Kurla West",
                "Mumbai",
                "Maharashtra",
                "400070",
                "400072",
                "DH-400",
                "NC-40",
                73,
                &["Wrong PIN"],
                "Recognized pincode belongs to a neighbouring delivery zone.",
            ),
            &meera,
            Some(52),
        ),
        next(
            envelope(
                "Ms. Rukmini Bai",
                "2",
                "Hill Road",
                "Bandra West",
                "Mumbai",
                "Maharashtra",
                "400050",
                "400050",
                "DH-400",
                "NC-40",
                48,
                &["Illegible text", "Incomplete address"],
                "Street line partially unreadable; manual review required.",
            ),
            &meera,
            None,
        ),
    ];

    // Give the dataset a review history covering the approved, escalated,
    // and ambiguous statuses.
    review::apply_action(&mut items[1], &vikram, ReviewAction::Approve)
        .expect("demo approve transition");
    review::apply_action(
        &mut items[2],
        &vikram,
        ReviewAction::Escalate {
            reason: Some("PIN-City mismatch".to_string()),
        },
    )
    .expect("demo escalate transition");
    review::apply_action(&mut items[5], &vikram, ReviewAction::MarkAmbiguous)
        .expect("demo mark-ambiguous transition");
    review::apply_action(&mut items[8], &vikram, ReviewAction::AcceptSuggestion)
        .expect("demo accept-suggestion transition");

    items
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::MailStatus;

    #[test]
    fn test_seed_is_deterministic() {
        let config = Config::default();
        let first = seed_items(&config);
        let second = seed_items(&config);

        assert_eq!(first.len(), second.len());
        for (a, b) in first.iter().zip(second.iter()) {
            assert_eq!(a.id, b.id);
            assert_eq!(a.status, b.status);
            assert_eq!(a.confidence, b.confidence);
        }
    }

    #[test]
    fn test_seed_covers_all_statuses() {
        let items = seed_items(&Config::default());
        for status in MailStatus::ALL {
            assert!(
                items.iter().any(|i| i.status == status),
                "no seeded item with status {status}"
            );
        }
    }

    #[test]
    fn test_seed_covers_all_confidence_bands() {
        use crate::model::ConfidenceBand;
        let items = seed_items(&Config::default());
        for band in [
            ConfidenceBand::High,
            ConfidenceBand::Medium,
            ConfidenceBand::Low,
        ] {
            assert!(items.iter().any(|i| i.confidence_band() == band));
        }
    }

    #[test]
    fn test_seed_has_missing_processing_times() {
        let items = seed_items(&Config::default());
        assert!(items.iter().any(|i| i.processing_time.is_none()));
        assert!(items.iter().any(|i| i.processing_time.is_some()));
    }

    #[test]
    fn test_seed_ids_are_sequential() {
        let items = seed_items(&Config::default());
        assert_eq!(items[0].id, "MAIL-1001");
        assert_eq!(items[items.len() - 1].id, format!("MAIL-{}", SEED_START + items.len() as u64 - 1));
    }
}
