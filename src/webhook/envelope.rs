//! Connect notification payloads.

// crates.io
use time::format_description::well_known::Rfc3339;
// self
use crate::_prelude::*;

/// Inbound notification body as sent by Connect (JSON, camelCase).
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookEnvelope {
	/// Event tag, e.g. `envelope-completed`.
	pub event: String,
	/// Generation timestamp (RFC 3339) used for replay checks.
	#[serde(default)]
	pub generated_date_time: Option<String>,
	/// Event data.
	#[serde(default)]
	pub data: EnvelopeData,
}
impl WebhookEnvelope {
	/// Parsed generation timestamp; unparsable values count as absent.
	pub fn generated_at(&self) -> Option<OffsetDateTime> {
		self.generated_date_time
			.as_deref()
			.and_then(|raw| OffsetDateTime::parse(raw.trim(), &Rfc3339).ok())
	}
}

/// `data` object of a notification.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvelopeData {
	/// Account the envelope belongs to.
	#[serde(default)]
	pub account_id: Option<String>,
	/// Envelope the event concerns.
	#[serde(default)]
	pub envelope_id: Option<String>,
	/// Envelope summary, present when the Connect configuration includes data.
	#[serde(default)]
	pub envelope_summary: Option<EnvelopeSummary>,
}

/// Subset of the envelope summary forwarded to the host.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvelopeSummary {
	/// Envelope id, repeated inside the summary.
	#[serde(default)]
	pub envelope_id: Option<String>,
	/// Envelope status, e.g. `completed`.
	#[serde(default)]
	pub status: Option<String>,
	/// Email subject.
	#[serde(default)]
	pub email_subject: Option<String>,
	/// Sender identity.
	#[serde(default)]
	pub sender: Option<EnvelopeSender>,
	/// Recipient structure, forwarded as-is.
	#[serde(default)]
	pub recipients: Value,
	/// Document list, forwarded as-is.
	#[serde(default, alias = "documents")]
	pub envelope_documents: Value,
}

/// Sender of an envelope.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvelopeSender {
	/// Sender email.
	#[serde(default)]
	pub email: Option<String>,
	/// Sender display name.
	#[serde(default)]
	pub user_name: Option<String>,
}

/// Flattened event handed to the workflow host on acceptance.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookEvent {
	/// Event tag.
	pub event: String,
	/// Envelope id from `data`, falling back to the summary.
	pub envelope_id: Option<String>,
	/// Account id.
	pub account_id: Option<String>,
	/// Envelope status.
	pub status: Option<String>,
	/// Email subject.
	pub email_subject: Option<String>,
	/// Sender identity.
	pub sender: Option<EnvelopeSender>,
	/// Recipient structure.
	pub recipients: Value,
	/// Document list.
	pub documents: Value,
	/// Generation timestamp as sent.
	pub generated_date_time: Option<String>,
	/// Full notification body.
	pub payload: Value,
}
impl WebhookEvent {
	/// Flattens `envelope`; `payload` is the untyped body it was parsed from.
	pub fn from_envelope(envelope: WebhookEnvelope, payload: Value) -> Self {
		let WebhookEnvelope { event, generated_date_time, data } = envelope;
		let summary = data.envelope_summary.unwrap_or_default();

		Self {
			event,
			envelope_id: data.envelope_id.or(summary.envelope_id),
			account_id: data.account_id,
			status: summary.status,
			email_subject: summary.email_subject,
			sender: summary.sender,
			recipients: summary.recipients,
			documents: summary.envelope_documents,
			generated_date_time,
			payload,
		}
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use serde_json::json;
	// self
	use super::*;

	#[test]
	fn summary_flattens_with_documents_alias() {
		let payload = json!({
			"event": "envelope-completed",
			"generatedDateTime": "2023-11-14T22:13:20Z",
			"data": {
				"accountId": "acct",
				"envelopeSummary": {
					"envelopeId": "env-1",
					"status": "completed",
					"emailSubject": "Please sign",
					"sender": { "email": "a@example.com", "userName": "Ada" },
					"recipients": { "signers": [] },
					"documents": [{ "documentId": "1" }]
				}
			}
		});
		let envelope: WebhookEnvelope =
			serde_json::from_value(payload.clone()).expect("Fixture envelope should parse.");

		assert_eq!(
			envelope.generated_at().map(OffsetDateTime::unix_timestamp),
			Some(1_700_000_000)
		);

		let event = WebhookEvent::from_envelope(envelope, payload);

		assert_eq!(event.envelope_id.as_deref(), Some("env-1"));
		assert_eq!(event.status.as_deref(), Some("completed"));
		assert_eq!(event.sender.and_then(|s| s.user_name).as_deref(), Some("Ada"));
		assert_eq!(event.documents, json!([{ "documentId": "1" }]));
	}

	#[test]
	fn garbage_timestamp_counts_as_absent() {
		let envelope = WebhookEnvelope {
			generated_date_time: Some("yesterday".into()),
			..Default::default()
		};

		assert_eq!(envelope.generated_at(), None);
	}
}
