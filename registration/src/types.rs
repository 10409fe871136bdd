//! Schema model shared by the builder and the renderer.
//!
//! A [`FormConfig`] is the persisted schema for one event's registration
//! form. Everything here serializes to the camelCase JSON the REST backend
//! speaks.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

// ============================================================================
// Identifiers
// ============================================================================

/// Identifier of the event a form belongs to
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(Uuid);

impl EventId {
    /// Creates a new random `EventId`
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create an `EventId` from a `Uuid`
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Get the inner UUID
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for EventId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of one field definition
///
/// Opaque to this crate: any string the schema carries is accepted, so
/// documents authored elsewhere (`"field_1700000000000"`) load unchanged.
/// Ids minted here are UUIDs. Stable for the field's lifetime; joins schema,
/// validation errors and submitted values.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldId(String);

impl FieldId {
    /// Wrap an existing identifier
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Mint an identifier from a generated `Uuid`
    #[must_use]
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid.to_string())
    }

    /// The identifier as it appears on the wire
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for FieldId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl fmt::Display for FieldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ============================================================================
// Field definitions
// ============================================================================

/// Input kind of a field
///
/// Tags this build does not know deserialize to [`FieldType::Unknown`] so a
/// newer schema still loads.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    /// Single-line text
    Text,
    /// Email address
    Email,
    /// Telephone number
    Tel,
    /// Numeric input (submitted as a string)
    Number,
    /// File upload
    File,
    /// Choice among `options`
    Dropdown,
    /// Boolean tick box
    Checkbox,
    /// Multi-line text
    Textarea,
    /// Calendar date
    Date,
    /// Unrecognised tag
    Unknown,
}

impl FieldType {
    /// Wire tag of this type
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Email => "email",
            Self::Tel => "tel",
            Self::Number => "number",
            Self::File => "file",
            Self::Dropdown => "dropdown",
            Self::Checkbox => "checkbox",
            Self::Textarea => "textarea",
            Self::Date => "date",
            Self::Unknown => "unknown",
        }
    }
}

impl From<&str> for FieldType {
    fn from(tag: &str) -> Self {
        match tag {
            "text" => Self::Text,
            "email" => Self::Email,
            "tel" => Self::Tel,
            "number" => Self::Number,
            "file" => Self::File,
            "dropdown" => Self::Dropdown,
            "checkbox" => Self::Checkbox,
            "textarea" => Self::Textarea,
            "date" => Self::Date,
            _ => Self::Unknown,
        }
    }
}

impl<'de> Deserialize<'de> for FieldType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let tag = String::deserialize(deserializer)?;
        Ok(Self::from(tag.as_str()))
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Optional per-field rules
///
/// String bounds count characters. Numeric bounds only apply to
/// [`FieldType::Number`] fields.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldValidation {
    /// Minimum number of characters
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<usize>,
    /// Maximum number of characters
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
    /// Smallest accepted number
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    /// Largest accepted number
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    /// Regular expression the value must match somewhere
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
}

/// One question in a registration form
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormField {
    /// Unique within its [`FormConfig`]
    pub id: FieldId,
    /// Display text, must be non-blank at save time
    pub label: String,
    /// Input kind
    #[serde(rename = "type")]
    pub field_type: FieldType,
    /// Whether a value must be supplied on submit
    #[serde(default)]
    pub required: bool,
    /// Advisory position, recomputed on reorder
    #[serde(default)]
    pub order: u32,
    /// Display grouping key
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,
    /// Extra rules
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation: Option<FieldValidation>,
    /// Hint text shown inside an empty input
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    /// Choices for dropdown fields
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
}

impl FormField {
    /// A freshly added field: `"New {type} Field"`, optional, no rules
    #[must_use]
    pub fn new(id: FieldId, field_type: FieldType, order: u32) -> Self {
        Self {
            id,
            label: format!("New {field_type} Field"),
            field_type,
            required: false,
            order,
            section: None,
            validation: None,
            placeholder: None,
            options: Vec::new(),
        }
    }

    /// Whether the label is empty once surrounding whitespace is ignored
    #[must_use]
    pub fn has_blank_label(&self) -> bool {
        self.label.trim().is_empty()
    }
}

// ============================================================================
// Form-level settings
// ============================================================================

/// Who gets an email when someone registers
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EmailNotifications {
    /// Notify the event's vendor
    pub to_vendor: bool,
    /// Notify the registering participant
    pub to_participant: bool,
}

impl Default for EmailNotifications {
    fn default() -> Self {
        Self {
            to_vendor: true,
            to_participant: true,
        }
    }
}

/// The persisted registration schema for one event
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FormConfig {
    /// Whether registration is open at all
    pub enabled: bool,
    /// Field definitions in render order
    pub fields: Vec<FormField>,
    /// Capacity limit
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_registrations: Option<u32>,
    /// Instant after which registration closes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub registration_deadline: Option<DateTime<Utc>>,
    /// Registrations wait for vendor approval
    pub requires_approval: bool,
    /// Notification switches
    pub email_notifications: EmailNotifications,
}

impl Default for FormConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            fields: Vec::new(),
            max_registrations: None,
            registration_deadline: None,
            requires_approval: false,
            email_notifications: EmailNotifications::default(),
        }
    }
}

impl FormConfig {
    /// Look up a field by id
    #[must_use]
    pub fn field(&self, id: &FieldId) -> Option<&FormField> {
        self.fields.iter().find(|f| &f.id == id)
    }

    /// Look up a field by id for mutation
    pub fn field_mut(&mut self, id: &FieldId) -> Option<&mut FormField> {
        self.fields.iter_mut().find(|f| &f.id == id)
    }

    /// Position of a field in render order
    #[must_use]
    pub fn position(&self, id: &FieldId) -> Option<usize> {
        self.fields.iter().position(|f| &f.id == id)
    }

    /// Every field whose label is blank, in schema order
    #[must_use]
    pub fn blank_label_ids(&self) -> Vec<FieldId> {
        self.fields
            .iter()
            .filter(|f| f.has_blank_label())
            .map(|f| f.id.clone())
            .collect()
    }

    /// First id that appears more than once, if any
    #[must_use]
    pub fn duplicate_field_id(&self) -> Option<FieldId> {
        let mut seen = std::collections::HashSet::with_capacity(self.fields.len());
        self.fields
            .iter()
            .map(|f| &f.id)
            .find(|id| !seen.insert(*id))
            .cloned()
    }

    /// Whether the deadline lies strictly before `now`
    ///
    /// A deadline equal to `now` still accepts registrations.
    #[must_use]
    pub fn deadline_passed(&self, now: DateTime<Utc>) -> bool {
        self.registration_deadline
            .is_some_and(|deadline| deadline < now)
    }

    /// Rewrite every `order` to match its position
    pub fn renumber(&mut self) {
        for (position, field) in self.fields.iter_mut().enumerate() {
            field.order = u32::try_from(position).unwrap_or(u32::MAX);
        }
    }
}

// ============================================================================
// Patches
// ============================================================================

/// Partial update of one field
///
/// `None` leaves the attribute alone. The doubly optional attributes can be
/// cleared with `Some(None)`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FieldPatch {
    /// New label
    pub label: Option<String>,
    /// New type
    pub field_type: Option<FieldType>,
    /// New required flag
    pub required: Option<bool>,
    /// New or cleared section
    pub section: Option<Option<String>>,
    /// New or cleared rules
    pub validation: Option<Option<FieldValidation>>,
    /// New or cleared placeholder
    pub placeholder: Option<Option<String>>,
    /// New dropdown options
    pub options: Option<Vec<String>>,
}

impl FieldPatch {
    /// Patch that only relabels
    #[must_use]
    pub fn label(label: impl Into<String>) -> Self {
        Self {
            label: Some(label.into()),
            ..Self::default()
        }
    }

    /// Patch that only toggles `required`
    #[must_use]
    pub fn required(required: bool) -> Self {
        Self {
            required: Some(required),
            ..Self::default()
        }
    }

    /// Merge into `field`
    pub fn apply_to(self, field: &mut FormField) {
        if let Some(label) = self.label {
            field.label = label;
        }
        if let Some(field_type) = self.field_type {
            field.field_type = field_type;
        }
        if let Some(required) = self.required {
            field.required = required;
        }
        if let Some(section) = self.section {
            field.section = section;
        }
        if let Some(validation) = self.validation {
            field.validation = validation;
        }
        if let Some(placeholder) = self.placeholder {
            field.placeholder = placeholder;
        }
        if let Some(options) = self.options {
            field.options = options;
        }
    }
}

/// Partial update of the notification switches
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EmailNotificationsPatch {
    /// New vendor flag
    pub to_vendor: Option<bool>,
    /// New participant flag
    pub to_participant: Option<bool>,
}

/// Partial update of form-level settings
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SettingsPatch {
    /// New enabled flag
    pub enabled: Option<bool>,
    /// New or cleared capacity
    pub max_registrations: Option<Option<u32>>,
    /// New or cleared deadline
    pub registration_deadline: Option<Option<DateTime<Utc>>>,
    /// New approval flag
    pub requires_approval: Option<bool>,
    /// Merged one level deeper, so untouched switches keep their value
    pub email_notifications: Option<EmailNotificationsPatch>,
}

impl SettingsPatch {
    /// Merge into `config`, leaving `fields` untouched
    pub fn apply_to(self, config: &mut FormConfig) {
        if let Some(enabled) = self.enabled {
            config.enabled = enabled;
        }
        if let Some(max) = self.max_registrations {
            config.max_registrations = max;
        }
        if let Some(deadline) = self.registration_deadline {
            config.registration_deadline = deadline;
        }
        if let Some(requires_approval) = self.requires_approval {
            config.requires_approval = requires_approval;
        }
        if let Some(notifications) = self.email_notifications {
            if let Some(to_vendor) = notifications.to_vendor {
                config.email_notifications.to_vendor = to_vendor;
            }
            if let Some(to_participant) = notifications.to_participant {
                config.email_notifications.to_participant = to_participant;
            }
        }
    }
}
