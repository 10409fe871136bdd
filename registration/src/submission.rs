//! Normalized registration submissions and the collaborator that accepts them.

use crate::error::SubmissionError;
use crate::types::{EventId, FieldId, FieldType, FormField};
use crate::value::{FieldValue, FileBlob};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

/// One answer in schema shape
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionEntry {
    /// Field the answer belongs to
    pub field_id: FieldId,
    /// Label at submission time
    pub field_label: String,
    /// Type at submission time
    pub field_type: FieldType,
    /// The answer, `null` when none was given
    pub value: Option<serde_json::Value>,
}

/// Everything sent to the submission collaborator for one attempt
#[derive(Clone, Debug, PartialEq)]
pub struct RegistrationSubmission {
    /// Event being registered for
    pub event_id: EventId,
    /// One entry per schema field, in schema order
    pub registration_data: Vec<SubmissionEntry>,
    /// File contents keyed by field
    pub files: BTreeMap<FieldId, FileBlob>,
    /// Partial save that skipped validation
    pub save_as_draft: bool,
    /// Deduplication key, fresh per attempt
    pub idempotency_key: Uuid,
}

impl RegistrationSubmission {
    /// Normalize the current answers against the schema
    #[must_use]
    pub fn build(
        event_id: EventId,
        fields: &[FormField],
        values: &HashMap<FieldId, FieldValue>,
        save_as_draft: bool,
        idempotency_key: Uuid,
    ) -> Self {
        let (registration_data, files) = normalize(fields, values);
        Self {
            event_id,
            registration_data,
            files,
            save_as_draft,
            idempotency_key,
        }
    }

    /// The `registrationData` part as JSON
    ///
    /// # Errors
    ///
    /// Returns the serializer's error.
    pub fn registration_data_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(&self.registration_data)
    }
}

/// Lay answers out in schema order, one entry per field
///
/// File answers appear as their name in the entry; the blob itself goes into
/// the returned file collection.
#[must_use]
pub fn normalize(
    fields: &[FormField],
    values: &HashMap<FieldId, FieldValue>,
) -> (Vec<SubmissionEntry>, BTreeMap<FieldId, FileBlob>) {
    let mut files = BTreeMap::new();

    let entries = fields
        .iter()
        .map(|field| {
            let value = values.get(&field.id);
            if let Some(FieldValue::File(blob)) = value {
                if field.field_type == FieldType::File {
                    files.insert(field.id.clone(), blob.clone());
                }
            }
            SubmissionEntry {
                field_id: field.id.clone(),
                field_label: field.label.clone(),
                field_type: field.field_type,
                value: value.map(FieldValue::to_json),
            }
        })
        .collect();

    (entries, files)
}

/// Payment the registrant still has to complete
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentIntentRef {
    /// Gateway-side intent id
    pub id: String,
    /// Secret handed to the payment widget
    #[serde(default)]
    pub client_secret: Option<String>,
}

/// Successful answer of the submission collaborator
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SubmissionReceipt {
    /// Backend registration id, when it reports one
    pub registration_id: Option<String>,
    /// Present when payment is required next
    pub payment: Option<PaymentIntentRef>,
}

/// Boxed future returned by submission operations
pub type SubmissionFuture =
    Pin<Box<dyn Future<Output = Result<SubmissionReceipt, SubmissionError>> + Send>>;

/// Accepts registrations
pub trait SubmissionClient: Send + Sync {
    /// Send one submission attempt
    ///
    /// Implementations deduplicate on
    /// [`RegistrationSubmission::idempotency_key`].
    ///
    /// # Errors
    ///
    /// Returns [`SubmissionError`] if the registration was not accepted.
    fn submit(&self, submission: RegistrationSubmission) -> SubmissionFuture;
}

/// In-memory submission collaborator for tests and the demo
#[derive(Clone, Default)]
pub struct InMemorySubmissionClient {
    accepted: Arc<Mutex<Vec<RegistrationSubmission>>>,
    receipts: Arc<Mutex<HashMap<Uuid, SubmissionReceipt>>>,
    payment: Option<PaymentIntentRef>,
    failure: Option<SubmissionError>,
}

impl InMemorySubmissionClient {
    /// Accept everything, no payment
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept everything and ask for `payment` on final submissions
    #[must_use]
    pub fn requiring_payment(payment: PaymentIntentRef) -> Self {
        Self {
            payment: Some(payment),
            ..Self::default()
        }
    }

    /// Reject everything with `error`
    #[must_use]
    pub fn failing(error: SubmissionError) -> Self {
        Self {
            failure: Some(error),
            ..Self::default()
        }
    }

    /// Submissions accepted so far, deduplicated
    pub async fn accepted(&self) -> Vec<RegistrationSubmission> {
        self.accepted.lock().await.clone()
    }
}

impl SubmissionClient for InMemorySubmissionClient {
    fn submit(&self, submission: RegistrationSubmission) -> SubmissionFuture {
        let accepted = Arc::clone(&self.accepted);
        let receipts = Arc::clone(&self.receipts);
        let payment = self.payment.clone();
        let failure = self.failure.clone();

        Box::pin(async move {
            if let Some(error) = failure {
                return Err(error);
            }

            let mut receipts = receipts.lock().await;
            if let Some(receipt) = receipts.get(&submission.idempotency_key) {
                tracing::debug!(key = %submission.idempotency_key, "Replayed submission");
                return Ok(receipt.clone());
            }

            let mut accepted = accepted.lock().await;
            let receipt = SubmissionReceipt {
                registration_id: Some(format!("reg-{}", accepted.len() + 1)),
                payment: if submission.save_as_draft { None } else { payment },
            };
            receipts.insert(submission.idempotency_key, receipt.clone());
            accepted.push(submission);

            Ok(receipt)
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    fn field(n: u128, label: &str, field_type: FieldType) -> FormField {
        let mut field = FormField::new(FieldId::from_uuid(Uuid::from_u128(n)), field_type, 0);
        field.label = label.to_string();
        field
    }

    #[test]
    fn entries_follow_schema_with_nulls() {
        let a = field(1, "A", FieldType::Text);
        let b = field(2, "B", FieldType::Text);
        let mut values = HashMap::new();
        values.insert(b.id.clone(), FieldValue::from("x"));

        let (entries, files) = normalize(&[a.clone(), b.clone()], &values);

        assert!(files.is_empty());
        assert_eq!(
            serde_json::to_value(&entries).unwrap(),
            json!([
                { "fieldId": a.id, "fieldLabel": "A", "fieldType": "text", "value": null },
                { "fieldId": b.id, "fieldLabel": "B", "fieldType": "text", "value": "x" },
            ])
        );
    }

    #[test]
    fn file_answers_split_into_files() {
        let cv = field(1, "CV", FieldType::File);
        let agree = field(2, "Agree", FieldType::Checkbox);
        let blob = FileBlob::new("cv.pdf", "application/pdf", vec![1, 2, 3]);
        let mut values = HashMap::new();
        values.insert(cv.id.clone(), FieldValue::from(blob.clone()));
        values.insert(agree.id.clone(), FieldValue::from(true));

        let (entries, files) = normalize(&[cv.clone(), agree], &values);

        assert_eq!(entries[0].value, Some(json!("cv.pdf")));
        assert_eq!(entries[1].value, Some(json!(true)));
        assert_eq!(files.get(&cv.id), Some(&blob));
    }

    #[test]
    fn answers_for_unknown_fields_are_dropped() {
        let a = field(1, "A", FieldType::Text);
        let mut values = HashMap::new();
        values.insert(FieldId::from_uuid(Uuid::from_u128(99)), FieldValue::from("stray"));

        let submission = RegistrationSubmission::build(
            EventId::new(),
            &[a],
            &values,
            true,
            Uuid::from_u128(7),
        );

        assert_eq!(submission.registration_data.len(), 1);
        assert_eq!(submission.registration_data[0].value, None);
        assert!(submission.registration_data_json().unwrap().contains("\"value\":null"));
    }

    #[tokio::test]
    async fn in_memory_client_deduplicates_on_key() {
        let client = InMemorySubmissionClient::requiring_payment(PaymentIntentRef {
            id: "pi_1".into(),
            client_secret: None,
        });
        let submission =
            RegistrationSubmission::build(EventId::new(), &[], &HashMap::new(), false, Uuid::from_u128(1));

        let first = client.submit(submission.clone()).await.unwrap();
        let second = client.submit(submission).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(first.payment.map(|p| p.id), Some("pi_1".to_string()));
        assert_eq!(client.accepted().await.len(), 1);
    }

    #[tokio::test]
    async fn drafts_never_ask_for_payment() {
        let client = InMemorySubmissionClient::requiring_payment(PaymentIntentRef {
            id: "pi_1".into(),
            client_secret: None,
        });
        let draft =
            RegistrationSubmission::build(EventId::new(), &[], &HashMap::new(), true, Uuid::from_u128(2));

        assert_eq!(client.submit(draft).await.unwrap().payment, None);
    }
}
