//! Offset-based pagination over list endpoints.
//!
//! List responses carry `resultSetSize`, `startPosition`, `endPosition`, and `totalSetSize`
//! next to the item array. The paginator requests `count={page_size}` pages starting at
//! `start_position=0` and advances to `endPosition + 1` until the set is exhausted.

// crates.io
use oauth2::http::Method;
// self
use crate::{
	_prelude::*,
	api::{ApiClient, RequestDescriptor},
	http::HttpTransport,
	obs::{self, OpKind, OpOutcome, OpSpan},
};

/// Query parameter carrying the page size.
pub const COUNT_PARAM: &str = "count";
/// Query parameter carrying the zero-based offset.
pub const START_POSITION_PARAM: &str = "start_position";

/// Limits applied to a single [`ApiClient::fetch_all`] call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageOptions {
	/// Stop once this many items are collected; the result is truncated to exactly this many.
	///
	/// `Some(0)` returns an empty listing without issuing a request.
	pub max_items: Option<usize>,
	/// Wall-clock budget for the whole listing.
	pub timeout: Duration,
	/// Items requested per page.
	pub page_size: u32,
	/// Per-page attempt timeout; the client's default applies when unset.
	pub request_timeout: Option<StdDuration>,
}
impl PageOptions {
	/// Caps the number of returned items.
	pub fn with_max_items(mut self, max_items: usize) -> Self {
		self.max_items = Some(max_items);

		self
	}

	/// Overrides the wall-clock budget.
	pub fn with_timeout(mut self, timeout: Duration) -> Self {
		self.timeout = timeout;

		self
	}

	/// Overrides the per-page attempt timeout.
	pub fn with_request_timeout(mut self, timeout: StdDuration) -> Self {
		self.request_timeout = Some(timeout);

		self
	}

	/// Overrides the page size; zero is raised to one.
	pub fn with_page_size(mut self, page_size: u32) -> Self {
		self.page_size = page_size.max(1);

		self
	}
}
impl Default for PageOptions {
	fn default() -> Self {
		Self {
			max_items: None,
			timeout: Duration::minutes(5),
			page_size: 100,
			request_timeout: None,
		}
	}
}

#[derive(Debug)]
struct PaginationState {
	items: Vec<Value>,
	offset: u64,
	started_at: OffsetDateTime,
}

impl<C> ApiClient<C>
where
	C: ?Sized + HttpTransport,
{
	/// Collects every item under `resource_key` across pages of `path`.
	///
	/// Caller-supplied `count`/`start_position` entries in `query` are overwritten. A page
	/// without usable position fields is treated as the last one.
	pub async fn fetch_all(
		&self,
		method: Method,
		path: &str,
		resource_key: &str,
		query: Vec<(String, String)>,
		options: PageOptions,
	) -> Result<Vec<Value>> {
		const KIND: OpKind = OpKind::Paginate;

		let span = OpSpan::new(KIND, "fetch_all");

		obs::record_op_outcome(KIND, OpOutcome::Attempt);

		let mut template = RequestDescriptor::new(method, path);

		template.query = query;
		template.timeout = options.request_timeout;

		let result = span.instrument(self.collect_pages(template, resource_key, options)).await;

		match &result {
			Ok(_) => obs::record_op_outcome(KIND, OpOutcome::Success),
			Err(_) => obs::record_op_outcome(KIND, OpOutcome::Failure),
		}

		result
	}

	async fn collect_pages(
		&self,
		mut template: RequestDescriptor,
		resource_key: &str,
		options: PageOptions,
	) -> Result<Vec<Value>> {
		if options.max_items == Some(0) {
			return Ok(Vec::new());
		}

		let mut state =
			PaginationState { items: Vec::new(), offset: 0, started_at: self.clock.now() };

		template.set_query(COUNT_PARAM, options.page_size.to_string());

		loop {
			if state.offset > 0 {
				let elapsed = self.clock.now() - state.started_at;

				if elapsed > options.timeout {
					return Err(Error::PaginationTimeout { retrieved: state.items.len(), elapsed });
				}
			}

			let mut page_request = template.clone();

			page_request.set_query(START_POSITION_PARAM, state.offset.to_string());

			let page = self.request(page_request).await?;
			let page_items = page.get(resource_key).and_then(Value::as_array);

			match page_items {
				Some(items) if !items.is_empty() => state.items.extend(items.iter().cloned()),
				_ => break,
			}

			if let Some(max) = options.max_items.filter(|max| state.items.len() >= *max) {
				state.items.truncate(max);

				break;
			}

			match next_offset(&page) {
				Some(next) if next > state.offset => state.offset = next,
				_ => break,
			}

			obs::trace_event(OpKind::Paginate, "Fetching next page.");
		}

		Ok(state.items)
	}
}

/// Offset of the next page, or `None` when `page` is the last one.
fn next_offset(page: &Value) -> Option<u64> {
	let end = position(page, "endPosition")?;
	let total = position(page, "totalSetSize")?;

	let next = end.saturating_add(1);

	(next < total).then_some(next)
}

/// Reads a non-negative position that may arrive as a number or a numeric string.
fn position(page: &Value, field: &str) -> Option<u64> {
	match page.get(field)? {
		Value::Number(n) => n.as_u64(),
		Value::String(s) => s.trim().parse().ok(),
		_ => None,
	}
}
