use actix_multipart::Multipart;
use actix_web::{web, HttpMessage, HttpRequest};
use futures::TryStreamExt;
use log::{debug, error};
use regex::Regex;
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use crate::config::MAX_CONTENT_LENGTH;

pub const ALLOWED_EXTENSIONS: [&str; 4] = ["png", "jpg", "jpeg", "gif"];
pub const PHOTO_FIELD: &str = "photos";

#[derive(Debug)]
pub enum UploadError {
    IoError(std::io::Error),
    MultipartError(String),
    PayloadTooLarge(usize),
}

impl fmt::Display for UploadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UploadError::IoError(err) => write!(f, "Failed to store upload: {}", err),
            UploadError::MultipartError(err) => write!(f, "Malformed form data: {}", err),
            UploadError::PayloadTooLarge(limit) => {
                write!(f, "Request body exceeds {} bytes", limit)
            }
        }
    }
}

impl std::error::Error for UploadError {}

impl From<std::io::Error> for UploadError {
    fn from(err: std::io::Error) -> Self {
        UploadError::IoError(err)
    }
}

#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub filename: String,
    pub data: Vec<u8>,
}

/// Text fields and photo parts of a multipart form submission.
#[derive(Debug, Default)]
pub struct MultipartSubmission {
    pub fields: HashMap<String, String>,
    pub files: Vec<UploadedFile>,
}

/// Reads a whole multipart body, failing once more than `limit` bytes of
/// part content have been received.
pub async fn read_multipart(
    mut payload: Multipart,
    limit: usize,
) -> Result<MultipartSubmission, UploadError> {
    let mut submission = MultipartSubmission::default();
    let mut total = 0usize;

    while let Some(mut field) = payload
        .try_next()
        .await
        .map_err(|e| UploadError::MultipartError(e.to_string()))?
    {
        let name = field.name().unwrap_or_default().to_string();
        let filename = field
            .content_disposition()
            .and_then(|cd| cd.get_filename())
            .map(|f| f.to_string());

        let mut data = Vec::new();
        while let Some(chunk) = field
            .try_next()
            .await
            .map_err(|e| UploadError::MultipartError(e.to_string()))?
        {
            total += chunk.len();
            if total > limit {
                return Err(UploadError::PayloadTooLarge(limit));
            }
            data.extend_from_slice(&chunk);
        }

        match filename {
            Some(filename) if name == PHOTO_FIELD => {
                submission.files.push(UploadedFile { filename, data })
            }
            Some(_) => debug!("Ignoring file part '{}'", name),
            None => {
                submission
                    .fields
                    .insert(name, String::from_utf8_lossy(&data).into_owned());
            }
        }
    }

    Ok(submission)
}

/// Reads a urlencoded form body. Such a submission carries no photos.
pub async fn read_urlencoded(
    mut payload: web::Payload,
    limit: usize,
) -> Result<MultipartSubmission, UploadError> {
    let mut body = web::BytesMut::new();
    while let Some(chunk) = payload
        .try_next()
        .await
        .map_err(|e| UploadError::MultipartError(e.to_string()))?
    {
        if body.len() + chunk.len() > limit {
            return Err(UploadError::PayloadTooLarge(limit));
        }
        body.extend_from_slice(&chunk);
    }

    Ok(MultipartSubmission {
        fields: url::form_urlencoded::parse(&body).into_owned().collect(),
        files: Vec::new(),
    })
}

/// Dispatches on the request content type: urlencoded bodies are parsed as
/// plain fields, everything else goes through the multipart reader.
pub async fn read_submission(
    req: &HttpRequest,
    payload: web::Payload,
    limit: usize,
) -> Result<MultipartSubmission, UploadError> {
    if req
        .content_type()
        .eq_ignore_ascii_case("application/x-www-form-urlencoded")
    {
        read_urlencoded(payload, limit).await
    } else {
        read_multipart(Multipart::new(req.headers(), payload), limit).await
    }
}

fn unsafe_chars() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^A-Za-z0-9_.-]").expect("static regex"))
}

fn extension(filename: &str) -> Option<String> {
    filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
}

/// Upload policy: a file is kept only when its extension, compared
/// case-insensitively, is in [`ALLOWED_EXTENSIONS`]. Anything else is
/// dropped without an error.
pub fn is_allowed(filename: &str) -> bool {
    extension(filename)
        .map(|ext| ALLOWED_EXTENSIONS.contains(&ext.as_str()))
        .unwrap_or(false)
}

/// Reduces a client supplied filename to a flat, ASCII-only name that cannot
/// escape the upload directory. May return an empty string.
pub fn secure_filename(filename: &str) -> String {
    let flattened = filename.replace(['/', '\\'], " ");
    let joined = flattened.split_whitespace().collect::<Vec<_>>().join("_");
    let stripped = unsafe_chars().replace_all(&joined, "");
    stripped.trim_matches(|c| c == '.' || c == '_').to_string()
}

fn random_token() -> String {
    format!("{:08x}", rand::random::<u32>())
}

#[derive(Debug, Clone)]
pub struct UploadService {
    upload_dir: PathBuf,
    max_content_length: usize,
}

impl UploadService {
    pub fn new(upload_dir: impl Into<PathBuf>) -> Self {
        Self {
            upload_dir: upload_dir.into(),
            max_content_length: MAX_CONTENT_LENGTH,
        }
    }

    pub fn with_max_content_length(mut self, limit: usize) -> Self {
        self.max_content_length = limit;
        self
    }

    pub fn upload_dir(&self) -> &Path {
        &self.upload_dir
    }

    pub fn max_content_length(&self) -> usize {
        self.max_content_length
    }

    pub async fn ensure_dir(&self) -> Result<(), UploadError> {
        tokio::fs::create_dir_all(&self.upload_dir).await?;
        Ok(())
    }

    /// Name a file is stored under, or `None` when the policy rejects it.
    pub fn stored_name(&self, original: &str) -> Option<String> {
        if !is_allowed(original) {
            return None;
        }
        let mut secured = secure_filename(original);
        if !is_allowed(&secured) {
            // Nothing usable survived sanitising, keep at least the extension.
            secured = format!("photo.{}", extension(original)?);
        }
        Some(format!("{}_{}", random_token(), secured))
    }

    /// Writes every accepted file and returns the stored names in submission order.
    pub async fn save_all(&self, files: Vec<UploadedFile>) -> Result<Vec<String>, UploadError> {
        let mut stored = Vec::new();

        for file in files {
            let Some(name) = self.stored_name(&file.filename) else {
                debug!("Skipping upload with disallowed name '{}'", file.filename);
                continue;
            };

            let path = self.upload_dir.join(&name);
            if let Err(err) = tokio::fs::write(&path, &file.data).await {
                error!("Failed to write upload {}: {}", path.display(), err);
                return Err(err.into());
            }
            debug!("Stored upload {} ({} bytes)", name, file.data.len());
            stored.push(name);
        }

        Ok(stored)
    }
}
