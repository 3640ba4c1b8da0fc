mod common;

// crates.io
use docusign_broker::webhook::{
	SIGNATURE_HEADER, WebhookAuthError, WebhookOutcome, WebhookReceiver, sign_payload,
};
use serde_json::json;
use time::Duration;
// self
use common::*;

// `start_time()` is 2023-11-14T22:13:20Z.
const ONE_MINUTE_AGO: &str = "2023-11-14T22:12:20Z";
const TEN_MINUTES_AGO: &str = "2023-11-14T22:03:20+00:00";

fn notification(event: &str, generated: &str) -> Vec<u8> {
	json!({
		"event": event,
		"apiVersion": "v2.1",
		"generatedDateTime": generated,
		"data": {
			"accountId": ACCOUNT_ID,
			"envelopeId": "env-42",
			"envelopeSummary": {
				"status": "completed",
				"emailSubject": "Please sign the lease",
				"sender": { "email": "owner@example.com", "userName": "Owner" },
				"recipients": { "signers": [{ "email": "tenant@example.com" }] },
				"envelopeDocuments": [{ "documentId": "1", "name": "lease.pdf" }]
			}
		}
	})
	.to_string()
	.into_bytes()
}

fn receiver() -> WebhookReceiver {
	WebhookReceiver::from_credentials(&credentials(
		"account-d.docusign.com",
		"https://demo.docusign.net/restapi/v2.1",
	))
}

#[test]
fn signed_fresh_notifications_are_forwarded() {
	let body = notification("envelope-completed", ONE_MINUTE_AGO);
	let signature = sign_payload(&body, WEBHOOK_SECRET).expect("Signing should succeed.");
	let outcome = receiver().handle(Some(&signature), &body, start_time());

	assert_eq!(SIGNATURE_HEADER, "X-DocuSign-Signature-1");
	assert_eq!(outcome.status_code(), 200);

	let response = outcome.body();

	assert_eq!(response["event"], "envelope-completed");
	assert_eq!(response["envelopeId"], "env-42");
	assert_eq!(response["accountId"], ACCOUNT_ID);
	assert_eq!(response["status"], "completed");
	assert_eq!(response["sender"]["userName"], "Owner");
	assert_eq!(response["documents"][0]["name"], "lease.pdf");
	assert_eq!(response["payload"]["apiVersion"], "v2.1");
}

#[test]
fn stale_notifications_are_rejected_after_the_signature_passes() {
	let body = notification("envelope-completed", TEN_MINUTES_AGO);
	let signature = sign_payload(&body, WEBHOOK_SECRET).expect("Signing should succeed.");
	let outcome = receiver().handle(Some(&signature), &body, start_time());

	assert_eq!(outcome, WebhookOutcome::Rejected(WebhookAuthError::Expired));
	assert_eq!(outcome.status_code(), 401);

	let relaxed = receiver().with_max_age(Duration::minutes(15));

	assert_eq!(relaxed.handle(Some(&signature), &body, start_time()).status_code(), 200);
}

#[test]
fn tampered_bodies_are_rejected() {
	let body = notification("envelope-completed", ONE_MINUTE_AGO);
	let signature = sign_payload(&body, WEBHOOK_SECRET).expect("Signing should succeed.");
	let mut tampered = body.clone();

	tampered[10] ^= 0x20;

	let outcome = receiver().handle(Some(&signature), &tampered, start_time());

	assert_eq!(outcome, WebhookOutcome::Rejected(WebhookAuthError::InvalidSignature));
	assert_eq!(outcome.body(), json!({ "error": "Invalid webhook signature." }));
}

#[test]
fn unsubscribed_events_are_acknowledged_but_filtered() {
	let body = notification("envelope-sent", ONE_MINUTE_AGO);
	let signature = sign_payload(&body, WEBHOOK_SECRET).expect("Signing should succeed.");
	let outcome = receiver()
		.with_events(["envelope-completed", "envelope-declined"])
		.handle(Some(&signature), &body, start_time());

	assert_eq!(outcome.status_code(), 200);
	assert_eq!(outcome.body(), json!({ "received": true, "filtered": true }));
	assert!(outcome.into_event().is_none());
}

#[test]
fn missing_secret_is_a_server_error() {
	let body = notification("envelope-completed", ONE_MINUTE_AGO);
	let outcome = WebhookReceiver::new(None).handle(Some("anything"), &body, start_time());

	assert_eq!(outcome.status_code(), 500);
	assert_eq!(outcome.body(), json!({ "error": "Webhook secret is not configured." }));
}
