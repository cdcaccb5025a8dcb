//! Async client for the Younium subscription-billing API: bearer-token lifecycle, header plumbing,
//! ordered page aggregation, and typed CRUD helpers over JSON resources.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod obs;
pub mod page;
pub mod response;
pub mod session;

pub use client::{CallOptions, Client, Identified};
pub use config::{ClientConfig, Environment};
pub use error::{Error, Result};
pub use page::PageResult;
pub use response::{ApiResult, JsonObject};

mod _prelude {
	pub use std::{
		collections::{BTreeMap, HashMap, HashSet},
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		str::FromStr,
		sync::Arc,
	};

	pub use async_lock::Mutex as AsyncMutex;
	pub use parking_lot::{Mutex, RwLock};
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use serde_json::Value;
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use serde_json;
pub use url;
#[cfg(test)] use {color_eyre as _, httpmock as _};
