//! Review state machine for mail items.
//!
//! The status set is {pending, ambiguous, approved, escalated, routed}.
//! Review verbs are gated by role and by the current status; an invalid
//! combination is rejected with a typed error and the item is left untouched.
//! Every applied action appends one history entry and one activity entry.

use crate::model::{
    ActivityAction, ActivityEntry, AddressFields, FieldChange, HistoryEntry, MailItem, MailStatus,
    Role, User,
};
use chrono::Utc;
use std::collections::BTreeMap;
use thiserror::Error;

/// A human decision applied to a mail item.
#[derive(Debug, Clone)]
pub enum ReviewAction {
    /// Clear the item for routing.
    Approve,
    /// Push the item to senior review.
    Escalate { reason: Option<String> },
    /// Park the item as unresolvable without more information.
    MarkAmbiguous,
    /// Adopt the AI-corrected pincode and approve.
    AcceptSuggestion,
    /// Send the item back to the pending queue.
    Revert { reason: Option<String> },
    /// Correct recognized address fields without changing status.
    EditFields { fields: AddressFields },
}

impl ReviewAction {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Approve => "approve",
            Self::Escalate { .. } => "escalate",
            Self::MarkAmbiguous => "mark_ambiguous",
            Self::AcceptSuggestion => "accept_suggestion",
            Self::Revert { .. } => "revert",
            Self::EditFields { .. } => "edit_fields",
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ReviewError {
    #[error("cannot {action} an item that is {from}")]
    InvalidTransition {
        from: MailStatus,
        action: &'static str,
    },
    #[error("role {role} is not permitted to {action}")]
    RoleNotPermitted { role: Role, action: &'static str },
    #[error("only the uploading operator may edit this item")]
    NotOwner,
    #[error("no mail item with id {0}")]
    UnknownItem(String),
}

/// Apply a review action to a mail item on behalf of `user`.
///
/// All checks run before any mutation; on `Err` the item is unchanged.
pub fn apply_action(
    item: &mut MailItem,
    user: &User,
    action: ReviewAction,
) -> Result<(), ReviewError> {
    let action_name = action.name();

    match action {
        ReviewAction::Approve => {
            require_reviewer(user, action_name)?;
            require_status(
                item,
                &[
                    MailStatus::Pending,
                    MailStatus::Ambiguous,
                    MailStatus::Escalated,
                ],
                action_name,
            )?;

            item.status = MailStatus::Approved;
            item.needs_review = false;
            mark_reviewed(item, user);
            record(
                item,
                user,
                ActivityAction::Approve,
                "Item approved and cleared for routing",
                None,
                None,
            );
            log::info!("{} approved by {}", item.id, user.id);
        }
        ReviewAction::Escalate { reason } => {
            require_reviewer(user, action_name)?;
            require_status(
                item,
                &[MailStatus::Pending, MailStatus::Ambiguous],
                action_name,
            )?;

            item.status = MailStatus::Escalated;
            mark_reviewed(item, user);
            record(
                item,
                user,
                ActivityAction::Escalate,
                "Item escalated for senior review",
                reason,
                None,
            );
            log::info!("{} escalated by {}", item.id, user.id);
        }
        ReviewAction::MarkAmbiguous => {
            require_reviewer(user, action_name)?;
            require_status(item, &[MailStatus::Pending], action_name)?;

            item.status = MailStatus::Ambiguous;
            mark_reviewed(item, user);
            record(
                item,
                user,
                ActivityAction::MarkAmbiguous,
                "Address marked ambiguous",
                None,
                None,
            );
        }
        ReviewAction::AcceptSuggestion => {
            require_reviewer(user, action_name)?;
            require_status(
                item,
                &[MailStatus::Pending, MailStatus::Ambiguous],
                action_name,
            )?;

            let old_pincode = item.fields.pincode.clone();
            let new_pincode = item.suggestion.corrected_pincode.clone();
            let changes = if old_pincode != new_pincode {
                let mut map = BTreeMap::new();
                map.insert(
                    "pincode".to_string(),
                    FieldChange {
                        old: old_pincode,
                        new: new_pincode.clone(),
                    },
                );
                Some(map)
            } else {
                None
            };

            item.fields.pincode = new_pincode;
            item.status = MailStatus::Approved;
            item.needs_review = false;
            mark_reviewed(item, user);
            record(
                item,
                user,
                ActivityAction::Approve,
                "AI suggestion accepted and item approved",
                None,
                changes,
            );
            log::info!("{} accepted AI suggestion via {}", item.id, user.id);
        }
        ReviewAction::Revert { reason } => {
            require_reviewer(user, action_name)?;
            match item.status {
                MailStatus::Approved | MailStatus::Escalated | MailStatus::Ambiguous => {}
                // Routed items have left the review queue; only an admin may
                // pull one back.
                MailStatus::Routed => {
                    if user.role != Role::Admin {
                        return Err(ReviewError::RoleNotPermitted {
                            role: user.role,
                            action: action_name,
                        });
                    }
                }
                MailStatus::Pending => {
                    return Err(ReviewError::InvalidTransition {
                        from: item.status,
                        action: action_name,
                    })
                }
            }

            item.status = MailStatus::Pending;
            item.needs_review = true;
            mark_reviewed(item, user);
            record(
                item,
                user,
                ActivityAction::Reject,
                "Item reverted to pending review",
                reason,
                None,
            );
            log::info!("{} reverted by {}", item.id, user.id);
        }
        ReviewAction::EditFields { fields } => {
            // Reviewers may edit anything in the queue; an operator may only
            // edit their own uploads.
            if !user.role.can_review() && item.uploaded_by != user.id {
                return Err(ReviewError::NotOwner);
            }
            require_status(
                item,
                &[MailStatus::Pending, MailStatus::Ambiguous],
                action_name,
            )?;

            let changes = diff_fields(&item.fields, &fields);
            item.fields = fields;
            record(
                item,
                user,
                ActivityAction::Edit,
                "Address fields corrected",
                None,
                if changes.is_empty() {
                    None
                } else {
                    Some(changes)
                },
            );
        }
    }

    Ok(())
}

fn require_reviewer(user: &User, action: &'static str) -> Result<(), ReviewError> {
    if user.role.can_review() {
        Ok(())
    } else {
        Err(ReviewError::RoleNotPermitted {
            role: user.role,
            action,
        })
    }
}

fn require_status(
    item: &MailItem,
    allowed: &[MailStatus],
    action: &'static str,
) -> Result<(), ReviewError> {
    if allowed.contains(&item.status) {
        Ok(())
    } else {
        Err(ReviewError::InvalidTransition {
            from: item.status,
            action,
        })
    }
}

fn mark_reviewed(item: &mut MailItem, user: &User) {
    item.reviewed_by = Some(user.id.clone());
    item.reviewed_by_name = Some(user.name.clone());
}

fn diff_fields(old: &AddressFields, new: &AddressFields) -> BTreeMap<String, FieldChange> {
    let pairs = [
        ("name", &old.name, &new.name),
        ("house_no", &old.house_no, &new.house_no),
        ("street", &old.street, &new.street),
        ("locality", &old.locality, &new.locality),
        ("city", &old.city, &new.city),
        ("state", &old.state, &new.state),
        ("pincode", &old.pincode, &new.pincode),
    ];

    let mut changes = BTreeMap::new();
    for (field, old_value, new_value) in pairs {
        if old_value != new_value {
            changes.insert(
                field.to_string(),
                FieldChange {
                    old: old_value.clone(),
                    new: new_value.clone(),
                },
            );
        }
    }
    changes
}

/// Append matching history and activity entries for an applied action.
fn record(
    item: &mut MailItem,
    user: &User,
    action: ActivityAction,
    details: &str,
    reason_code: Option<String>,
    field_changes: Option<BTreeMap<String, FieldChange>>,
) {
    let now = Utc::now();

    let summary = match &field_changes {
        Some(changes) => {
            let fields: Vec<&str> = changes.keys().map(String::as_str).collect();
            format!("{} ({})", details, fields.join(", "))
        }
        None => details.to_string(),
    };
    item.history.push(HistoryEntry {
        id: format!("HIST-{}-{}", item.id, item.history.len() + 1),
        timestamp: now,
        action: action.as_str().to_string(),
        user: user.name.clone(),
        changes: summary,
        reason_code: reason_code.clone(),
    });

    item.activity.push(ActivityEntry {
        id: format!("ACT-{}-{}", item.id, item.activity.len() + 1),
        timestamp: now,
        action,
        user_id: user.id.clone(),
        user_name: user.name.clone(),
        user_role: user.role,
        details: details.to_string(),
        reason_code,
        field_changes,
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn supervisor() -> User {
        User {
            id: "sup1".to_string(),
            name: "Vikram Singh".to_string(),
            role: Role::Supervisor,
            center: "Delhi Central".to_string(),
            ..Default::default()
        }
    }

    fn admin() -> User {
        User {
            id: "admin1".to_string(),
            name: "Priya Nair".to_string(),
            role: Role::Admin,
            ..Default::default()
        }
    }

    fn operator(id: &str) -> User {
        User {
            id: id.to_string(),
            name: id.to_string(),
            role: Role::Operator,
            ..Default::default()
        }
    }

    fn pending_item() -> MailItem {
        MailItem {
            id: "MAIL-1".to_string(),
            status: MailStatus::Pending,
            confidence: 74,
            needs_review: true,
            uploaded_by: "op1".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_approve_pending() {
        let mut item = pending_item();
        apply_action(&mut item, &supervisor(), ReviewAction::Approve).unwrap();

        assert_eq!(item.status, MailStatus::Approved);
        assert!(!item.needs_review);
        assert_eq!(item.reviewed_by.as_deref(), Some("sup1"));
        assert_eq!(item.history.len(), 1);
        assert_eq!(item.activity.len(), 1);
        assert_eq!(item.activity[0].action, ActivityAction::Approve);
    }

    #[test]
    fn test_operator_cannot_approve() {
        let mut item = pending_item();
        let err = apply_action(&mut item, &operator("op1"), ReviewAction::Approve).unwrap_err();

        assert!(matches!(err, ReviewError::RoleNotPermitted { .. }));
        assert_eq!(item.status, MailStatus::Pending);
        assert!(item.activity.is_empty());
    }

    #[test]
    fn test_cannot_approve_routed() {
        let mut item = MailItem {
            status: MailStatus::Routed,
            ..pending_item()
        };
        let err = apply_action(&mut item, &supervisor(), ReviewAction::Approve).unwrap_err();

        assert_eq!(
            err,
            ReviewError::InvalidTransition {
                from: MailStatus::Routed,
                action: "approve",
            }
        );
        assert_eq!(item.status, MailStatus::Routed);
    }

    #[test]
    fn test_escalate_records_reason() {
        let mut item = pending_item();
        apply_action(
            &mut item,
            &supervisor(),
            ReviewAction::Escalate {
                reason: Some("PIN-City mismatch".to_string()),
            },
        )
        .unwrap();

        assert_eq!(item.status, MailStatus::Escalated);
        assert_eq!(
            item.activity[0].reason_code.as_deref(),
            Some("PIN-City mismatch")
        );
    }

    #[test]
    fn test_mark_ambiguous_only_from_pending() {
        let mut item = pending_item();
        apply_action(&mut item, &supervisor(), ReviewAction::MarkAmbiguous).unwrap();
        assert_eq!(item.status, MailStatus::Ambiguous);

        let err =
            apply_action(&mut item, &supervisor(), ReviewAction::MarkAmbiguous).unwrap_err();
        assert!(matches!(err, ReviewError::InvalidTransition { .. }));
    }

    #[test]
    fn test_accept_suggestion_adopts_corrected_pincode() {
        let mut item = pending_item();
        item.fields.pincode = "302015".to_string();
        item.suggestion.corrected_pincode = "302017".to_string();

        apply_action(&mut item, &supervisor(), ReviewAction::AcceptSuggestion).unwrap();

        assert_eq!(item.status, MailStatus::Approved);
        assert_eq!(item.fields.pincode, "302017");
        let changes = item.activity[0].field_changes.as_ref().unwrap();
        assert_eq!(changes["pincode"].old, "302015");
        assert_eq!(changes["pincode"].new, "302017");
    }

    #[test]
    fn test_revert_approved_back_to_pending() {
        let mut item = pending_item();
        apply_action(&mut item, &supervisor(), ReviewAction::Approve).unwrap();
        apply_action(
            &mut item,
            &supervisor(),
            ReviewAction::Revert { reason: None },
        )
        .unwrap();

        assert_eq!(item.status, MailStatus::Pending);
        assert!(item.needs_review);
        assert_eq!(item.history.len(), 2);
    }

    #[test]
    fn test_revert_routed_is_admin_only() {
        let mut item = MailItem {
            status: MailStatus::Routed,
            ..pending_item()
        };

        let err = apply_action(
            &mut item,
            &supervisor(),
            ReviewAction::Revert { reason: None },
        )
        .unwrap_err();
        assert!(matches!(err, ReviewError::RoleNotPermitted { .. }));
        assert_eq!(item.status, MailStatus::Routed);

        apply_action(&mut item, &admin(), ReviewAction::Revert { reason: None }).unwrap();
        assert_eq!(item.status, MailStatus::Pending);
    }

    #[test]
    fn test_operator_edits_own_pending_item() {
        let mut item = pending_item();
        item.fields.locality = "Gandhi Nagar".to_string();
        let mut corrected = item.fields.clone();
        corrected.locality = "Shastri Nagar".to_string();

        apply_action(
            &mut item,
            &operator("op1"),
            ReviewAction::EditFields { fields: corrected },
        )
        .unwrap();

        assert_eq!(item.fields.locality, "Shastri Nagar");
        let changes = item.activity[0].field_changes.as_ref().unwrap();
        assert_eq!(changes["locality"].old, "Gandhi Nagar");
    }

    #[test]
    fn test_other_operator_cannot_edit() {
        let mut item = pending_item();
        let err = apply_action(
            &mut item,
            &operator("op2"),
            ReviewAction::EditFields {
                fields: AddressFields::default(),
            },
        )
        .unwrap_err();
        assert_eq!(err, ReviewError::NotOwner);
    }

    #[test]
    fn test_edit_rejected_once_approved() {
        let mut item = pending_item();
        apply_action(&mut item, &supervisor(), ReviewAction::Approve).unwrap();

        let err = apply_action(
            &mut item,
            &supervisor(),
            ReviewAction::EditFields {
                fields: AddressFields::default(),
            },
        )
        .unwrap_err();
        assert!(matches!(err, ReviewError::InvalidTransition { .. }));
    }

    #[test]
    fn test_history_and_activity_grow_in_lockstep() {
        let mut item = pending_item();
        apply_action(&mut item, &supervisor(), ReviewAction::MarkAmbiguous).unwrap();
        apply_action(&mut item, &supervisor(), ReviewAction::Approve).unwrap();
        apply_action(
            &mut item,
            &supervisor(),
            ReviewAction::Revert { reason: None },
        )
        .unwrap();

        assert_eq!(item.history.len(), 3);
        assert_eq!(item.activity.len(), 3);
        assert_eq!(item.activity[2].id, "ACT-MAIL-1-3");
    }
}
