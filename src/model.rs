use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Role of an acting user. Determines which mail items are visible and which
/// review actions are permitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Operator,
    Supervisor,
    Admin,
}

impl Role {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "operator" => Some(Self::Operator),
            "supervisor" => Some(Self::Supervisor),
            "admin" => Some(Self::Admin),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Operator => "operator",
            Self::Supervisor => "supervisor",
            Self::Admin => "admin",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Operator => "Sorter/Operator",
            Self::Supervisor => "Supervisor",
            Self::Admin => "Administrator",
        }
    }

    /// Review verbs (approve, escalate, mark ambiguous, revert) are reserved
    /// for supervisory staff.
    pub fn can_review(&self) -> bool {
        matches!(self, Self::Supervisor | Self::Admin)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity record for a logged-in user. Created at login, immutable for the
/// session.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub role: Role,
    pub center: String,
    /// Links an operator to their supervisor. Carried on the record but not
    /// consulted by visibility scoping, which is center-based.
    #[serde(default)]
    pub supervisor_id: Option<String>,
}

/// Processing status of a mail item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MailStatus {
    #[default]
    Pending,
    Approved,
    Escalated,
    Routed,
    Ambiguous,
}

impl MailStatus {
    /// Every status in fixed display order.
    pub const ALL: [MailStatus; 5] = [
        Self::Pending,
        Self::Approved,
        Self::Escalated,
        Self::Routed,
        Self::Ambiguous,
    ];

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "pending" => Some(Self::Pending),
            "approved" => Some(Self::Approved),
            "escalated" => Some(Self::Escalated),
            "routed" => Some(Self::Routed),
            "ambiguous" => Some(Self::Ambiguous),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Escalated => "escalated",
            Self::Routed => "routed",
            Self::Ambiguous => "ambiguous",
        }
    }
}

impl fmt::Display for MailStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Confidence band used by inbox filtering and the analytics distribution.
/// Band boundaries are fixed: high is strictly above 85, medium is 70-85
/// inclusive, low is strictly below 70.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfidenceBand {
    High,
    Medium,
    Low,
}

impl ConfidenceBand {
    pub fn of(confidence: u8) -> Self {
        if confidence > 85 {
            Self::High
        } else if confidence >= 70 {
            Self::Medium
        } else {
            Self::Low
        }
    }

    pub fn contains(&self, confidence: u8) -> bool {
        Self::of(confidence) == *self
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "high" => Some(Self::High),
            "medium" => Some(Self::Medium),
            "low" => Some(Self::Low),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::High => "High (>85%)",
            Self::Medium => "Medium (70-85%)",
            Self::Low => "Low (<70%)",
        }
    }
}

/// Structured address fields recognized from an envelope.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressFields {
    pub name: String,
    pub house_no: String,
    pub street: String,
    pub locality: String,
    pub city: String,
    pub state: String,
    pub pincode: String,
}

/// Routing correction suggested by the recognition service.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AiSuggestion {
    pub corrected_pincode: String,
    pub delivery_hub: String,
    pub nodal_center: String,
    /// 0-100 trust score for the suggested correction.
    pub confidence: u8,
    pub flags: Vec<String>,
    pub reasoning: String,
}

/// Typed action recorded in a mail item's activity log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityAction {
    Upload,
    Submit,
    Approve,
    Reject,
    MarkAmbiguous,
    Edit,
    Escalate,
    QrRegenerate,
}

impl ActivityAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Upload => "upload",
            Self::Submit => "submit",
            Self::Approve => "approve",
            Self::Reject => "reject",
            Self::MarkAmbiguous => "mark_ambiguous",
            Self::Edit => "edit",
            Self::Escalate => "escalate",
            Self::QrRegenerate => "qr_regenerate",
        }
    }
}

/// Old/new value pair for an edited address field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldChange {
    pub old: String,
    pub new: String,
}

/// One entry in the comprehensive activity log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityEntry {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub action: ActivityAction,
    pub user_id: String,
    pub user_name: String,
    pub user_role: Role,
    pub details: String,
    #[serde(default)]
    pub reason_code: Option<String>,
    #[serde(default)]
    pub field_changes: Option<BTreeMap<String, FieldChange>>,
}

/// One human-readable entry in a mail item's change history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub action: String,
    pub user: String,
    pub changes: String,
    #[serde(default)]
    pub reason_code: Option<String>,
}

/// A processed-envelope record: recognized address, AI suggestion, review
/// status, and audit trail. Owned by exactly one uploading user and one
/// center.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MailItem {
    pub id: String,
    pub created_at: DateTime<Utc>,
    /// Reference to the raw scanned image (opaque to the engine).
    pub image_ref: String,
    pub ocr_text: String,
    pub fields: AddressFields,
    pub original_pincode: String,
    pub suggestion: AiSuggestion,
    pub status: MailStatus,
    pub confidence: u8,
    pub qr_label: String,
    pub history: Vec<HistoryEntry>,
    pub activity: Vec<ActivityEntry>,
    pub needs_review: bool,
    /// Seconds spent processing the item, when measured.
    #[serde(default)]
    pub processing_time: Option<u32>,
    pub uploaded_by: String,
    pub uploaded_by_name: String,
    pub uploaded_by_role: Role,
    #[serde(default)]
    pub submitted_by: Option<String>,
    #[serde(default)]
    pub submitted_by_name: Option<String>,
    #[serde(default)]
    pub reviewed_by: Option<String>,
    #[serde(default)]
    pub reviewed_by_name: Option<String>,
    pub center: String,
}

impl Default for MailItem {
    fn default() -> Self {
        MailItem {
            id: String::new(),
            created_at: Utc::now(),
            image_ref: String::new(),
            ocr_text: String::new(),
            fields: AddressFields::default(),
            original_pincode: String::new(),
            suggestion: AiSuggestion::default(),
            status: MailStatus::Pending,
            confidence: 0,
            qr_label: String::new(),
            history: Vec::new(),
            activity: Vec::new(),
            needs_review: false,
            processing_time: None,
            uploaded_by: String::new(),
            uploaded_by_name: String::new(),
            uploaded_by_role: Role::Operator,
            submitted_by: None,
            submitted_by_name: None,
            reviewed_by: None,
            reviewed_by_name: None,
            center: String::new(),
        }
    }
}

impl MailItem {
    /// An item counts as auto-routed when it was routed with confidence
    /// strictly above the auto-approve threshold.
    pub fn is_auto_routed(&self, threshold: u8) -> bool {
        self.status == MailStatus::Routed && self.confidence > threshold
    }

    pub fn confidence_band(&self) -> ConfidenceBand {
        ConfidenceBand::of(self.confidence)
    }

    /// The suggestion corrected the recognized pincode.
    pub fn pincode_corrected(&self) -> bool {
        self.original_pincode != self.suggestion.corrected_pincode
    }
}
