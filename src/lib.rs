// Library root
// -----------
// Blocking client for the Streamtape file-hosting API plus the small
// interactive demo used by the binary (`main.rs`).
//
// Module responsibilities:
// - `api`: `ApiClient`, one method per remote endpoint, and the two-phase
//   file upload.
// - `config`: credentials, base URL and timeouts, optionally from the
//   environment.
// - `error`: the typed `ApiError` every operation fails with.
// - `params`: ordered request parameters that drop absent values.
// - `response`: immutable wrapper around a decoded JSON response.
// - `transport`: the HTTP seam (`HttpTransport`) and its reqwest
//   implementation.
// - `ui`: terminal menus that drive `api` for the demo binary.
pub mod api;
pub mod config;
pub mod error;
pub mod params;
pub mod response;
pub mod transport;
pub mod ui;

pub use api::{ApiClient, RemoteUploadOptions, UploadOptions};
pub use config::{ClientConfig, Credentials};
pub use error::{ApiError, Result};
pub use params::QueryParams;
pub use response::ApiResponse;
pub use transport::{FilePart, HttpTransport, RawResponse, ReqwestTransport};
