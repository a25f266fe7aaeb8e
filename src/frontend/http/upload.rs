use std::convert::Infallible;
use std::io::Write;
use std::path::{Path, PathBuf};

use bytes::Bytes;
use futures_util::{Stream, TryStreamExt};
use http_body_util::BodyStream;
use hyper::{Request, Response, StatusCode, body::Incoming, header};
use tracing::{info, warn};

use crate::engine::duck::{ScanResult, scan_parquet};
use crate::shared::config::CONFIG;
use crate::shared::response::{UploadResponse, error_reply, json_reply};

use super::error::UploadError;

pub const PARQUET_EXT: &str = ".parquet";

/// Headroom for multipart boundary and header bytes around the file
/// part when gating on Content-Length or the raw stream length.
pub(crate) const ENVELOPE_ALLOWANCE: u64 = 16 * 1024;

/// The one file carried by a multipart upload request.
#[derive(Debug)]
pub(crate) struct UploadedFile {
    pub filename: String,
    pub bytes: Bytes,
}

pub async fn handle_upload(req: Request<Incoming>) -> Result<Response<String>, Infallible> {
    match process(req).await {
        Ok(body) => {
            info!(
                rows = body.row_count,
                cols = body.columns.len(),
                "upload scanned"
            );
            Ok(json_reply(StatusCode::OK, &body))
        }
        Err(e) => {
            e.log();
            Ok(error_reply(e.status(), &e))
        }
    }
}

async fn process(req: Request<Incoming>) -> Result<UploadResponse, UploadError> {
    let max_bytes = CONFIG.upload.max_bytes;

    // Reject on the declared length before touching the body.
    check_declared_length(content_length(&req), max_bytes)?;

    let boundary = multipart_boundary(
        req.headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok()),
    )?;

    let body = BodyStream::new(req.into_body())
        .try_filter_map(|frame| async move { Ok(frame.into_data().ok()) });
    let upload = read_file_field(body, boundary, max_bytes).await?;

    execute_upload(upload, max_bytes, std::env::temp_dir()).await
}

fn content_length(req: &Request<Incoming>) -> Option<u64> {
    req.headers()
        .get(header::CONTENT_LENGTH)?
        .to_str()
        .ok()?
        .parse()
        .ok()
}

/// Declared-length gate, run before the body is read. Absent or
/// unparsable Content-Length defers to the streaming limit.
pub(crate) fn check_declared_length(
    declared: Option<u64>,
    max_bytes: u64,
) -> Result<(), UploadError> {
    match declared {
        Some(len) if len > max_bytes + ENVELOPE_ALLOWANCE => {
            Err(UploadError::TooLarge { limit: max_bytes })
        }
        _ => Ok(()),
    }
}

pub(crate) fn multipart_boundary(content_type: Option<&str>) -> Result<String, UploadError> {
    content_type
        .and_then(|ct| multer::parse_boundary(ct).ok())
        .ok_or(UploadError::NotMultipart)
}

/// Pulls the `file` field out of a multipart stream. The filename gate
/// runs before any field bytes are buffered, and the whole-stream size
/// constraint caps memory at the ceiling plus envelope headroom.
pub(crate) async fn read_file_field<S, E>(
    stream: S,
    boundary: String,
    max_bytes: u64,
) -> Result<UploadedFile, UploadError>
where
    S: Stream<Item = Result<Bytes, E>> + Send + 'static,
    E: Into<Box<dyn std::error::Error + Send + Sync>> + 'static,
{
    let constraints = multer::Constraints::new().size_limit(
        multer::SizeLimit::new().whole_stream(max_bytes + ENVELOPE_ALLOWANCE),
    );
    let mut multipart = multer::Multipart::with_constraints(stream, boundary, constraints);

    let mut file: Option<UploadedFile> = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| map_multer(e, max_bytes))?
    {
        if field.name() != Some("file") || file.is_some() {
            continue;
        }
        let filename = field
            .file_name()
            .ok_or(UploadError::MissingFilename)?
            .to_string();
        validate_extension(&filename)?;
        let bytes = field
            .bytes()
            .await
            .map_err(|e| map_multer(e, max_bytes))?;
        file = Some(UploadedFile { filename, bytes });
    }

    file.ok_or(UploadError::MissingFile)
}

fn map_multer(e: multer::Error, max_bytes: u64) -> UploadError {
    match e {
        multer::Error::StreamSizeExceeded { .. } | multer::Error::FieldSizeExceeded { .. } => {
            UploadError::TooLarge { limit: max_bytes }
        }
        other => UploadError::Multipart(other.to_string()),
    }
}

pub(crate) fn validate_extension(filename: &str) -> Result<(), UploadError> {
    if filename.to_ascii_lowercase().ends_with(PARQUET_EXT) {
        Ok(())
    } else {
        Err(UploadError::InvalidExtension {
            filename: filename.to_string(),
        })
    }
}

/// The validate-stage-scan pipeline behind the HTTP surface. Scratch
/// file lifetime is bound to this call on every path.
pub(crate) async fn execute_upload(
    upload: UploadedFile,
    max_bytes: u64,
    scratch_dir: PathBuf,
) -> Result<UploadResponse, UploadError> {
    validate_extension(&upload.filename)?;
    if upload.bytes.len() as u64 > max_bytes {
        return Err(UploadError::TooLarge { limit: max_bytes });
    }

    let bytes = upload.bytes;
    let scan = tokio::task::spawn_blocking(move || stage_and_scan(&scratch_dir, &bytes))
        .await
        .map_err(|e| UploadError::Internal(e.to_string()))??;

    Ok(UploadResponse::from_rows(scan.columns, scan.rows))
}

/// Stages the payload under a unique name carrying the engine-visible
/// extension, scans it on a request-private connection, and deletes the
/// scratch file before returning. The `NamedTempFile` guard also covers
/// the early-return paths.
fn stage_and_scan(scratch_dir: &Path, bytes: &[u8]) -> Result<ScanResult, UploadError> {
    let scratch = tempfile::Builder::new()
        .prefix("parquery-")
        .suffix(PARQUET_EXT)
        .tempfile_in(scratch_dir)?;
    scratch.as_file().write_all(bytes)?;
    scratch.as_file().sync_all()?;

    let scan = scan_parquet(scratch.path())?;

    if let Err(e) = scratch.close() {
        warn!("failed to delete scratch file: {e}");
    }
    Ok(scan)
}
