//! Ordered page aggregation over the request executor.

// crates.io
use futures::{StreamExt, TryStreamExt, stream};
// self
use crate::{
	_prelude::*,
	client::{CallOptions, Client},
	config::ClientConfig,
	http::{HttpMethod, HttpTransport},
	obs::{self, OperationKind, OperationOutcome, OperationSpan},
	page::{self, PageResult},
	response::ApiResult,
};

impl<T> Client<T>
where
	T: ?Sized + HttpTransport,
{
	/// Fetches and decodes a single page at `url`.
	///
	/// Relative `lastPage`/`nextPage` links are resolved against `url`. An error envelope fails
	/// with [`Error::Api`].
	pub async fn fetch_page(&self, url: Url, options: &CallOptions) -> Result<PageResult> {
		let base = url.clone();

		match self.send(HttpMethod::Get, url, None, options).await? {
			ApiResult::Ok(mut body) => {
				page::resolve_links(&mut body, &base);

				serde_path_to_error::deserialize(Value::Object(body))
					.map_err(|source| Error::Decode { status: None, source })
			},
			ApiResult::ErrorEnvelope { status, body } =>
				Err(Error::Api { status, body: Value::Object(body) }),
		}
	}

	/// Fetches every page of the collection at `url` and merges them in page order.
	///
	/// Page 1 reports `totalPages`; the remaining numbered pages are fetched concurrently (capped by
	/// [`ClientConfig::max_concurrent_pages`]) and folded in ascending order. Cursor links are then
	/// followed one at a time until the API reports `lastPage` or stops sending `nextPage`.
	pub async fn fetch_all_pages(&self, url: Url, options: &CallOptions) -> Result<PageResult> {
		const KIND: OperationKind = OperationKind::FetchPages;

		let span = OperationSpan::new(KIND, "collect");

		obs::record_outcome(KIND, OperationOutcome::Attempt);

		let result = span.instrument(self.collect_pages(url, options)).await;

		obs::record_result(KIND, &result);

		result
	}

	/// Resolves `endpoint` against the base origin and fetches all of its pages.
	pub async fn get_pages(&self, endpoint: &str, options: &CallOptions) -> Result<PageResult> {
		let url = self.config.endpoint_url(endpoint)?;

		self.fetch_all_pages(url, options).await
	}

	/// All products.
	pub async fn products(&self, options: &CallOptions) -> Result<PageResult> {
		self.get_pages("Products", options).await
	}

	/// Accounts, optionally narrowed by an API filter expression.
	pub async fn accounts(&self, filter: Option<&str>, options: &CallOptions) -> Result<PageResult> {
		self.get_pages(&filtered("accounts", filter), options).await
	}

	/// Subscriptions, optionally narrowed by an API filter expression.
	pub async fn subscriptions(
		&self,
		filter: Option<&str>,
		options: &CallOptions,
	) -> Result<PageResult> {
		self.get_pages(&filtered("Subscriptions", filter), options).await
	}

	/// Usage records, optionally narrowed by an API filter expression.
	pub async fn usages(&self, filter: Option<&str>, options: &CallOptions) -> Result<PageResult> {
		self.get_pages(&filtered("Usage", filter), options).await
	}

	async fn collect_pages(&self, url: Url, options: &CallOptions) -> Result<PageResult> {
		let size = ClientConfig::PAGE_SIZE;
		let mut acc = self.fetch_page(page::page_url(&url, 1, size), options).await?;
		let mut numbered = 1;

		if acc.total_pages > acc.page_number {
			let (first, last) = (acc.page_number + 1, acc.total_pages);

			numbered += u64::from(last - first + 1);

			let concurrency = self.config.page_concurrency((last - first + 1) as usize);

			obs::log_page_fanout(first, last, concurrency);

			// `buffered` yields in input order, so the fold sees pages ascending.
			acc = stream::iter(first..=last)
				.map(|n| self.fetch_page(page::page_url(&url, n, size), options))
				.buffered(concurrency)
				.try_fold(acc, |mut acc, page| async move {
					acc.merge(page);

					Ok::<_, Error>(acc)
				})
				.await?;
		}

		let mut visited = HashSet::new();

		while acc.has_pending_cursor() {
			let Some(next) = acc.next_page.take() else { break };

			if !visited.insert(next.clone()) {
				return Err(Error::CursorLoop { url: next });
			}

			obs::log_cursor_page(&next);

			let page = self.fetch_page(next, options).await?;

			acc.merge(page);
		}

		obs::record_pages_fetched(numbered, visited.len() as u64);

		Ok(acc)
	}
}

fn filtered(endpoint: &str, filter: Option<&str>) -> String {
	match filter {
		Some(filter) => format!("{endpoint}?filter={filter}"),
		None => endpoint.to_owned(),
	}
}
