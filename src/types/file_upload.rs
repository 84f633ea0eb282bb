//! Files sent through the upload protocol.

use crate::params::Parameters;
use crate::transport::TransportError;
use crate::Result;
use bytes::Bytes;
use reqwest::multipart::Part;
use std::path::Path;
use tokio_util::io::ReaderStream;

enum FileSource {
    Bytes(Bytes),
    File(tokio::fs::File),
}

impl std::fmt::Debug for FileSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FileSource::Bytes(bytes) => write!(f, "Bytes({} bytes)", bytes.len()),
            FileSource::File(_) => f.write_str("File"),
        }
    }
}

/// A file to upload, either already in memory or opened from disk.
///
/// Disk files are streamed chunk by chunk into the multipart body instead of
/// being read up front.
#[derive(Debug)]
pub struct FileUpload {
    pub name: String,
    pub size: Option<u64>,
    pub content_type: Option<String>,
    source: FileSource,
}

impl FileUpload {
    pub fn from_bytes(name: impl Into<String>, content: impl Into<Bytes>) -> Self {
        let content = content.into();
        Self {
            name: name.into(),
            size: Some(content.len() as u64),
            content_type: None,
            source: FileSource::Bytes(content),
        }
    }

    /// Open `path` for upload. The upload name is the file name component of the path.
    pub async fn open(path: impl AsRef<Path>, content_type: Option<&str>) -> Result<Self> {
        let path = path.as_ref();
        let file = tokio::fs::File::open(path).await?;
        let size = file.metadata().await?.len();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.to_string_lossy().into_owned());
        Ok(Self {
            name,
            size: Some(size),
            content_type: content_type.map(str::to_string),
            source: FileSource::File(file),
        })
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Form values describing the file for the upload initiation request.
    pub fn upload_args(&self) -> Parameters {
        let mut args = Parameters::new();
        args.push("name", self.name.as_str());
        if let Some(size) = self.size {
            args.push("size", size);
        }
        if let Some(content_type) = &self.content_type {
            args.push("content_type", content_type.as_str());
        }
        args
    }

    /// Convert into the multipart file part, named after the upload.
    pub(crate) fn into_part(self) -> Result<Part> {
        let part = match self.source {
            FileSource::Bytes(bytes) => {
                let len = bytes.len() as u64;
                Part::stream_with_length(bytes, len)
            }
            FileSource::File(file) => {
                let body = reqwest::Body::wrap_stream(ReaderStream::new(file));
                match self.size {
                    Some(len) => Part::stream_with_length(body, len),
                    None => Part::stream(body),
                }
            }
        };
        let part = part.file_name(self.name);
        match self.content_type {
            Some(ct) => part
                .mime_str(&ct)
                .map_err(|e| crate::Error::from(TransportError::Http(e))),
            None => Ok(part),
        }
    }
}
