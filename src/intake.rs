//! Scan intake: turn recognition-service output into a mail item.
//!
//! The recognition call itself lives outside this crate; by the time intake
//! runs, the external service has already produced recognized text, parsed
//! address fields, and a routing suggestion with a confidence score.

use crate::config::Config;
use crate::model::{
    ActivityAction, ActivityEntry, AddressFields, AiSuggestion, HistoryEntry, MailItem, MailStatus,
    User,
};
use chrono::Utc;

/// Output of the external recognition service for one envelope.
#[derive(Debug, Clone)]
pub struct RecognizedEnvelope {
    pub image_ref: String,
    pub ocr_text: String,
    pub fields: AddressFields,
    pub suggestion: AiSuggestion,
}

/// Build a mail item from a recognized envelope on behalf of the scanning
/// user.
///
/// Confidence strictly above the auto-approve threshold routes the item
/// immediately; strictly below flags it for review. At exactly the threshold
/// the item is neither: it waits in the pending queue unflagged.
pub fn ingest(
    envelope: RecognizedEnvelope,
    user: &User,
    config: &Config,
    sequence: u64,
) -> MailItem {
    let id = format!("MAIL-{sequence}");
    let now = Utc::now();
    let confidence = envelope.suggestion.confidence;

    let status = if confidence > config.auto_approve_threshold {
        MailStatus::Routed
    } else {
        MailStatus::Pending
    };
    let needs_review = confidence < config.auto_approve_threshold;

    log::debug!(
        "ingest {id}: confidence {confidence} -> {status} (threshold {})",
        config.auto_approve_threshold
    );

    let original_pincode = envelope.fields.pincode.clone();
    let qr_label = format!("{}-{}", config.qr_prefix, id);

    MailItem {
        id: id.clone(),
        created_at: now,
        image_ref: envelope.image_ref,
        ocr_text: envelope.ocr_text,
        fields: envelope.fields,
        original_pincode,
        suggestion: envelope.suggestion,
        status,
        confidence,
        qr_label,
        history: vec![HistoryEntry {
            id: format!("HIST-{id}-1"),
            timestamp: now,
            action: "Created".to_string(),
            user: user.name.clone(),
            changes: "Mail item created and processed".to_string(),
            reason_code: None,
        }],
        activity: vec![ActivityEntry {
            id: format!("ACT-{id}-1"),
            timestamp: now,
            action: ActivityAction::Upload,
            user_id: user.id.clone(),
            user_name: user.name.clone(),
            user_role: user.role,
            details: "Image uploaded and recognition output ingested".to_string(),
            reason_code: None,
            field_changes: None,
        }],
        needs_review,
        processing_time: None,
        uploaded_by: user.id.clone(),
        uploaded_by_name: user.name.clone(),
        uploaded_by_role: user.role,
        submitted_by: None,
        submitted_by_name: None,
        reviewed_by: None,
        reviewed_by_name: None,
        center: user.center.clone(),
    }
}

/// Mark an item as submitted by the scanning user, closing the scan flow.
pub fn submit(item: &mut MailItem, user: &User) {
    item.submitted_by = Some(user.id.clone());
    item.submitted_by_name = Some(user.name.clone());
    item.activity.push(ActivityEntry {
        id: format!("ACT-{}-{}", item.id, item.activity.len() + 1),
        timestamp: Utc::now(),
        action: ActivityAction::Submit,
        user_id: user.id.clone(),
        user_name: user.name.clone(),
        user_role: user.role,
        details: "Item submitted for processing".to_string(),
        reason_code: None,
        field_changes: None,
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Role;

    fn scanner() -> User {
        User {
            id: "op1".to_string(),
            name: "Anita Desai".to_string(),
            role: Role::Operator,
            center: "Delhi Central".to_string(),
            ..Default::default()
        }
    }

    fn envelope(confidence: u8) -> RecognizedEnvelope {
        RecognizedEnvelope {
            image_ref: "scan-001.jpg".to_string(),
            ocr_text: "Mr. Ramesh Sharma, 45 Gandhi Nagar, Jaipur 302015".to_string(),
            fields: AddressFields {
                name: "Mr. Ramesh Sharma".to_string(),
                house_no: "45".to_string(),
                street: "Gandhi Nagar".to_string(),
                locality: "Gandhi Nagar".to_string(),
                city: "Jaipur".to_string(),
                state: "Rajasthan".to_string(),
                pincode: "302015".to_string(),
            },
            suggestion: AiSuggestion {
                corrected_pincode: "302015".to_string(),
                delivery_hub: "DH-302".to_string(),
                nodal_center: "NC-30".to_string(),
                confidence,
                flags: Vec::new(),
                reasoning: String::new(),
            },
        }
    }

    #[test]
    fn test_high_confidence_auto_routes() {
        let item = ingest(envelope(92), &scanner(), &Config::default(), 1001);

        assert_eq!(item.id, "MAIL-1001");
        assert_eq!(item.status, MailStatus::Routed);
        assert!(!item.needs_review);
        assert_eq!(item.qr_label, "QR-MAIL-1001");
        assert_eq!(item.uploaded_by, "op1");
        assert_eq!(item.uploaded_by_role, Role::Operator);
        assert_eq!(item.center, "Delhi Central");
        assert_eq!(item.history.len(), 1);
        assert_eq!(item.activity[0].action, ActivityAction::Upload);
    }

    #[test]
    fn test_low_confidence_needs_review() {
        let item = ingest(envelope(74), &scanner(), &Config::default(), 1002);

        assert_eq!(item.status, MailStatus::Pending);
        assert!(item.needs_review);
    }

    #[test]
    fn test_threshold_boundary_is_pending_without_review_flag() {
        let item = ingest(envelope(85), &scanner(), &Config::default(), 1003);

        assert_eq!(item.status, MailStatus::Pending);
        assert!(!item.needs_review);

        let routed = ingest(envelope(86), &scanner(), &Config::default(), 1004);
        assert_eq!(routed.status, MailStatus::Routed);

        let flagged = ingest(envelope(84), &scanner(), &Config::default(), 1005);
        assert!(flagged.needs_review);
    }

    #[test]
    fn test_original_pincode_snapshot() {
        let mut env = envelope(90);
        env.suggestion.corrected_pincode = "302017".to_string();
        let item = ingest(env, &scanner(), &Config::default(), 1006);

        assert_eq!(item.original_pincode, "302015");
        assert!(item.pincode_corrected());
    }

    #[test]
    fn test_submit_attribution() {
        let mut item = ingest(envelope(74), &scanner(), &Config::default(), 1007);
        submit(&mut item, &scanner());

        assert_eq!(item.submitted_by.as_deref(), Some("op1"));
        assert_eq!(item.activity.len(), 2);
        assert_eq!(item.activity[1].action, ActivityAction::Submit);
    }
}
