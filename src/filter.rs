//! Role-scoped visibility and inbox filtering.
//!
//! Pure functions over `(items, user)` / `(items, query)`. No I/O, no
//! mutation of inputs, no hidden state; every call recomputes from its
//! arguments.

use crate::model::{ConfidenceBand, MailItem, MailStatus, Role, User};

/// Return the subset of `items` the acting user may see, preserving input
/// order.
///
/// Role precedence:
/// - operators see only items they uploaded themselves,
/// - supervisors see operator-authored items from their own center (their
///   own uploads and other supervisors' uploads are excluded),
/// - admins see everything.
pub fn visible_items<'a>(items: &'a [MailItem], user: &User) -> Vec<&'a MailItem> {
    let visible: Vec<&MailItem> = items
        .iter()
        .filter(|item| is_visible_to(item, user))
        .collect();
    log::debug!(
        "visibility: {} of {} items visible to {} ({})",
        visible.len(),
        items.len(),
        user.id,
        user.role
    );
    visible
}

/// Single-item visibility predicate behind [`visible_items`].
pub fn is_visible_to(item: &MailItem, user: &User) -> bool {
    match user.role {
        Role::Operator => item.uploaded_by == user.id,
        Role::Supervisor => {
            item.uploaded_by_role == Role::Operator && item.center == user.center
        }
        Role::Admin => true,
    }
}

/// Inbox filter selections: search text, status, confidence band, and
/// uploading operator. `None` means "all" for each axis. All active
/// predicates are AND-combined.
#[derive(Debug, Clone, Default)]
pub struct InboxQuery {
    /// Case-insensitive substring match on item id, pincode, or locality.
    pub search: Option<String>,
    pub status: Option<MailStatus>,
    pub confidence: Option<ConfidenceBand>,
    /// Exact match on the uploading operator's display name.
    pub operator: Option<String>,
}

impl InboxQuery {
    pub fn matches(&self, item: &MailItem) -> bool {
        if let Some(search) = &self.search {
            let needle = search.to_lowercase();
            let hit = item.id.to_lowercase().contains(&needle)
                || item.fields.pincode.to_lowercase().contains(&needle)
                || item.fields.locality.to_lowercase().contains(&needle);
            if !hit {
                return false;
            }
        }

        if let Some(status) = self.status {
            if item.status != status {
                return false;
            }
        }

        if let Some(band) = self.confidence {
            if !band.contains(item.confidence) {
                return false;
            }
        }

        if let Some(operator) = &self.operator {
            if item.uploaded_by_name != *operator {
                return false;
            }
        }

        true
    }
}

/// Apply an [`InboxQuery`] to a collection, preserving input order. Never
/// mutates the input; identical arguments yield identical results.
pub fn filter_inbox<'a>(items: &'a [MailItem], query: &InboxQuery) -> Vec<&'a MailItem> {
    items.iter().filter(|item| query.matches(item)).collect()
}

/// Deduplicated uploader display names in first-appearance order (the inbox
/// operator dropdown).
pub fn unique_operators<'a, I>(items: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a MailItem>,
{
    let mut seen = std::collections::HashSet::new();
    let mut operators = Vec::new();
    for item in items {
        if seen.insert(item.uploaded_by_name.clone()) {
            operators.push(item.uploaded_by_name.clone());
        }
    }
    operators
}
