//! # Camara API
//!
//! Read access to the Câmara dos Deputados open-data REST API.
//!
//! [`DataSource`] is the seam the ingestion pipeline fetches through;
//! [`CamaraClient`] is its HTTP implementation. [`paginate::fetch_all`]
//! walks link-following collections and [`paginate::fetch_detail`] reads
//! single resources.

pub mod client;
pub mod envelope;
pub mod error;
pub mod paginate;
pub mod routes;
pub mod source;
pub mod static_source;

pub use client::CamaraClient;
pub use error::{ApiError, ApiResult};
pub use paginate::{fetch_all, fetch_detail, fetch_list};
pub use routes::Routes;
pub use source::{DataSource, QueryParams};
pub use static_source::StaticSource;
