// API client module: a small blocking client for the Streamtape HTTP API.
//
// Each public method maps to exactly one endpoint (upload maps to two). The
// credentials ride along as `login`/`key` query parameters on every request
// and the decoded JSON comes back wrapped in an `ApiResponse`.

use crate::config::{ClientConfig, Credentials};
use crate::error::{ApiError, Result};
use crate::params::QueryParams;
use crate::response::ApiResponse;
use crate::transport::{decode_response, FilePart, HttpTransport, RawResponse, ReqwestTransport};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Form field the upload server expects the file bytes under.
pub const UPLOAD_FIELD: &str = "file1";

/// Endpoint used by [`ApiClient::list_files`].
pub const LIST_FILES_ENDPOINT: &str = "/file/listfolder";

/// Optional settings for [`ApiClient::remote_upload`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteUploadOptions {
    /// Destination folder id.
    pub folder: Option<String>,
    /// File name to store the download under.
    pub name: Option<String>,
    /// Extra HTTP headers the provider should send when fetching the URL.
    pub headers: Option<String>,
}

/// Optional settings for [`ApiClient::upload`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadOptions {
    /// Name sent with the file; defaults to the path's last component.
    pub file_name: Option<String>,
    /// Defaults to a guess from the file extension.
    pub mime_type: Option<String>,
    pub folder: Option<String>,
    /// Lower-case hex SHA-256 of the file contents.
    pub sha256: Option<String>,
    /// Compute `sha256` locally when it is not supplied.
    pub compute_sha256: bool,
    pub http_only: bool,
}

#[derive(Clone)]
pub struct ApiClient<T: HttpTransport = ReqwestTransport> {
    transport: T,
    base_url: String,
    credentials: Credentials,
}

impl ApiClient<ReqwestTransport> {
    /// Create a client for `login`/`key`. `base_url` overrides the default
    /// origin; a trailing slash is removed.
    pub fn new(login: &str, key: &str, base_url: Option<&str>) -> Result<Self> {
        Self::with_config(ClientConfig::new(Credentials::new(login, key), base_url))
    }

    pub fn with_config(config: ClientConfig) -> Result<Self> {
        let transport = ReqwestTransport::new(&config)?;
        Ok(Self::with_transport(config, transport))
    }

    /// Create a client configured from the `STREAMTAPE_*` environment
    /// variables. See [`ClientConfig::from_env`].
    pub fn from_env() -> Result<Self> {
        Self::with_config(ClientConfig::from_env()?)
    }
}

impl<T: HttpTransport> ApiClient<T> {
    /// Create a client that sends requests through `transport`.
    pub fn with_transport(config: ClientConfig, transport: T) -> Self {
        Self {
            transport,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            credentials: config.credentials,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Full request URL: `login`, `key`, then `params` in insertion order.
    ///
    /// Parameters named `login` or `key` are skipped so the credentials
    /// appear exactly once.
    pub fn build_url(&self, endpoint: &str, params: &QueryParams) -> String {
        let mut query = QueryParams::new()
            .with("login", &self.credentials.login)
            .with("key", &self.credentials.key);
        for (k, v) in params.iter() {
            if k == "login" || k == "key" {
                warn!("ignoring request parameter that shadows credentials: {}", k);
                continue;
            }
            query = query.with(k, v);
        }
        format!("{}{}?{}", self.base_url, endpoint, query.encode())
    }

    /// GET `endpoint` with `params` merged into the query string.
    pub fn get(&self, endpoint: &str, params: &QueryParams) -> Result<ApiResponse> {
        let url = self.build_url(endpoint, params);
        debug!("GET {}", endpoint);
        let response = self.transport.get(&url);
        Self::execute(endpoint, response)
    }

    /// POST `data` as a form body; only the credentials go in the URL.
    pub fn post(&self, endpoint: &str, data: &QueryParams) -> Result<ApiResponse> {
        let url = self.build_url(endpoint, &QueryParams::new());
        debug!("POST {}", endpoint);
        let response = self.transport.post_form(&url, data);
        Self::execute(endpoint, response)
    }

    fn execute(endpoint: &str, response: Result<RawResponse>) -> Result<ApiResponse> {
        let value = response
            .and_then(|raw| decode_response(&raw))
            .map_err(|e| {
                warn!("request to {} failed: {}", endpoint, e);
                e
            })?;
        Ok(ApiResponse::new(value))
    }

    pub fn account_info(&self) -> Result<ApiResponse> {
        self.get("/account/info", &QueryParams::new())
    }

    pub fn file_info(&self, file: &str) -> Result<ApiResponse> {
        self.get("/file/info", &QueryParams::new().with("file", file))
    }

    /// List a folder's content; the root folder when `folder` is `None`.
    pub fn list_files(
        &self,
        folder: Option<&str>,
        limit: Option<u32>,
        page: Option<u32>,
    ) -> Result<ApiResponse> {
        let params = QueryParams::new()
            .with_opt("folder", folder)
            .with_opt("limit", limit)
            .with_opt("page", page);
        self.get(LIST_FILES_ENDPOINT, &params)
    }

    /// Create a folder, inside `pid` when given.
    pub fn new_folder(&self, name: &str, pid: Option<&str>) -> Result<ApiResponse> {
        let params = QueryParams::new().with("name", name).with_opt("pid", pid);
        self.get("/file/createfolder", &params)
    }

    pub fn rename_folder(&self, folder: &str, name: &str) -> Result<ApiResponse> {
        let params = QueryParams::new().with("folder", folder).with("name", name);
        self.get("/file/renamefolder", &params)
    }

    pub fn delete_folder(&self, folder: &str) -> Result<ApiResponse> {
        self.get("/file/deletefolder", &QueryParams::new().with("folder", folder))
    }

    pub fn rename_file(&self, file: &str, name: &str) -> Result<ApiResponse> {
        let params = QueryParams::new().with("file", file).with("name", name);
        self.get("/file/rename", &params)
    }

    pub fn move_file(&self, file: &str, folder: &str) -> Result<ApiResponse> {
        let params = QueryParams::new().with("file", file).with("folder", folder);
        self.get("/file/move", &params)
    }

    pub fn delete_file(&self, file: &str) -> Result<ApiResponse> {
        self.get("/file/delete", &QueryParams::new().with("file", file))
    }

    pub fn running_converts(&self) -> Result<ApiResponse> {
        self.get("/file/runningconverts", &QueryParams::new())
    }

    pub fn failed_converts(&self) -> Result<ApiResponse> {
        self.get("/file/failedconverts", &QueryParams::new())
    }

    /// Splash image (thumbnail) of a video.
    pub fn thumbnail(&self, file: &str) -> Result<ApiResponse> {
        self.get("/file/getsplash", &QueryParams::new().with("file", file))
    }

    /// Ask the provider to download `url` into the account.
    pub fn remote_upload(&self, url: &str, options: &RemoteUploadOptions) -> Result<ApiResponse> {
        let params = QueryParams::new()
            .with("url", url)
            .with_opt("folder", options.folder.as_deref())
            .with_opt("name", options.name.as_deref())
            .with_opt("headers", options.headers.as_deref());
        self.get("/remotedl/add", &params)
    }

    /// Cancel a remote upload job; `"all"` cancels every pending job.
    pub fn remove_remote_upload(&self, id: &str) -> Result<ApiResponse> {
        self.get("/remotedl/remove", &QueryParams::new().with("id", id))
    }

    pub fn remote_upload_status(&self, id: &str) -> Result<ApiResponse> {
        self.get("/remotedl/status", &QueryParams::new().with("id", id))
    }

    /// Upload a local file.
    ///
    /// The file is read and the MIME type checked first, then `/file/ul` hands out a single-use upload
    /// URL and the bytes are posted there as multipart field `file1`. A
    /// failure in the second phase is returned as is; the upload URL is not
    /// requested again.
    pub fn upload(&self, path: &Path, options: &UploadOptions) -> Result<ApiResponse> {
        let bytes = std::fs::read(path).map_err(|source| ApiError::LocalFile {
            path: path.to_path_buf(),
            source,
        })?;
        let file_name = match &options.file_name {
            Some(name) => name.clone(),
            None => default_file_name(path)?,
        };
        let mime_type = options
            .mime_type
            .clone()
            .unwrap_or_else(|| guess_mime_type(Path::new(&file_name)).to_string());
        mime_type.parse::<mime::Mime>().map_err(|e| {
            ApiError::invalid_input(format!("invalid MIME type {mime_type:?}: {e}"))
        })?;
        let sha256 = match (&options.sha256, options.compute_sha256) {
            (Some(sum), _) => Some(sum.clone()),
            (None, true) => Some(sha256_hex(&bytes)),
            (None, false) => None,
        };

        let data = QueryParams::new()
            .with_opt("folder", options.folder.as_deref())
            .with_opt("sha256", sha256)
            .with_opt("httponly", options.http_only.then_some("true"));
        let ticket = self.post("/file/ul", &data)?;
        let upload_url = ticket
            .pointer("/result/url")
            .and_then(|v| v.as_str())
            .ok_or_else(|| {
                warn!("upload ticket has no result.url");
                ApiError::protocol("missing upload URL")
            })?
            .to_string();

        info!(
            "uploading {} ({} bytes, {})",
            file_name,
            bytes.len(),
            mime_type
        );
        let part = FilePart {
            field: UPLOAD_FIELD.to_string(),
            file_name,
            mime_type,
            bytes,
        };
        let response = self.transport.post_multipart(&upload_url, part);
        Self::execute("upload URL", response)
    }
}

fn default_file_name(path: &Path) -> Result<String> {
    path.file_name()
        .and_then(|s| s.to_str())
        .map(str::to_string)
        .ok_or_else(|| ApiError::LocalFile {
            path: PathBuf::from(path),
            source: std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "path has no usable file name",
            ),
        })
}

/// Lower-case hex SHA-256 of `bytes`.
pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

/// MIME type from the file extension, `application/octet-stream` otherwise.
pub fn guess_mime_type(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    match ext.as_deref() {
        Some("mp4") | Some("m4v") => "video/mp4",
        Some("mkv") => "video/x-matroska",
        Some("webm") => "video/webm",
        Some("avi") => "video/x-msvideo",
        Some("mov") => "video/quicktime",
        Some("wmv") => "video/x-ms-wmv",
        Some("flv") => "video/x-flv",
        Some("mpg") | Some("mpeg") => "video/mpeg",
        Some("ts") => "video/mp2t",
        Some("3gp") => "video/3gpp",
        Some("mp3") => "audio/mpeg",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("srt") | Some("txt") => "text/plain",
        Some("vtt") => "text/vtt",
        Some("json") => "application/json",
        Some("zip") => "application/zip",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mime_guess_is_case_insensitive() {
        assert_eq!(guess_mime_type(Path::new("clip.MP4")), "video/mp4");
        assert_eq!(guess_mime_type(Path::new("movie.mkv")), "video/x-matroska");
        assert_eq!(guess_mime_type(Path::new("README")), "application/octet-stream");
        assert_eq!(guess_mime_type(Path::new("blob.xyz")), "application/octet-stream");
    }

    #[test]
    fn guessed_mime_types_all_parse() {
        for name in ["a.mp4", "a.mkv", "a.ts", "a.vtt", "a.bin"] {
            assert!(guess_mime_type(Path::new(name)).parse::<mime::Mime>().is_ok());
        }
    }

    #[test]
    fn sha256_of_known_input() {
        assert_eq!(
            sha256_hex(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn file_name_from_path() {
        assert_eq!(default_file_name(Path::new("/tmp/a/video.mp4")).unwrap(), "video.mp4");
        assert!(default_file_name(Path::new("/")).is_err());
    }
}
