//! Paginated collections: the page accumulator and page URL construction.

mod aggregate;

// self
use crate::{_prelude::*, response::JsonObject};

const LINK_FIELDS: [&str; 2] = ["lastPage", "nextPage"];

/// One page of a collection, or the accumulation of several.
///
/// Missing or `null` fields decode to their defaults. Links must be absolute when decoding directly;
/// [`Client::fetch_page`](crate::Client::fetch_page) resolves relative ones against the page URL.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PageResult {
	/// Page index reported by the API (1-based).
	#[serde(deserialize_with = "null_as_default")]
	pub page_number: u32,
	/// Page size reported by the API.
	#[serde(deserialize_with = "null_as_default")]
	pub page_size: u32,
	/// Total number of pages.
	#[serde(deserialize_with = "null_as_default")]
	pub total_pages: u32,
	/// Total number of items across all pages.
	#[serde(deserialize_with = "null_as_default")]
	pub total_count: u64,
	/// Link to the last page, once the API reports it.
	pub last_page: Option<Url>,
	/// Link to the next page when the API paginates by cursor.
	pub next_page: Option<Url>,
	/// Items in ascending page order.
	#[serde(deserialize_with = "null_as_default")]
	pub data: Vec<Value>,
}
impl PageResult {
	/// Appends `other.data` and takes over its pagination metadata.
	pub fn merge(&mut self, other: PageResult) {
		self.page_number = other.page_number;
		self.page_size = other.page_size;
		self.total_pages = other.total_pages;
		self.total_count = other.total_count;
		self.last_page = other.last_page;
		self.next_page = other.next_page;
		self.data.extend(other.data);
	}

	/// Returns `true` while a cursor link remains to be followed.
	pub fn has_pending_cursor(&self) -> bool {
		self.next_page.is_some() && self.last_page.is_none()
	}

	/// Number of accumulated items.
	pub fn len(&self) -> usize {
		self.data.len()
	}

	/// Returns `true` when no items were accumulated.
	pub fn is_empty(&self) -> bool {
		self.data.is_empty()
	}
}

/// Returns `base` with `pageNumber=<page>&pageSize=<size>` appended to its query.
pub fn page_url(base: &Url, page: u32, size: u32) -> Url {
	let mut url = base.clone();
	let paging = format!("pageNumber={page}&pageSize={size}");
	let query = match base.query() {
		Some(query) if !query.is_empty() => format!("{query}&{paging}"),
		_ => paging,
	};

	url.set_query(Some(&query));

	url
}

/// Rewrites relative `lastPage`/`nextPage` links in a raw page body into absolute URLs.
///
/// Links that cannot be joined are left as they are and fail later in decoding.
pub(crate) fn resolve_links(body: &mut JsonObject, base: &Url) {
	for field in LINK_FIELDS {
		if let Some(Value::String(link)) = body.get_mut(field) {
			if let Ok(resolved) = base.join(link) {
				*link = resolved.into();
			}
		}
	}
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
	D: serde::Deserializer<'de>,
	T: Default + Deserialize<'de>,
{
	Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
