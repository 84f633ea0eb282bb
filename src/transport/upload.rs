//! The three-step Canvas file upload.
//!
//! 1. Ask Canvas for an upload slot (a form POST describing the file).
//! 2. Send the file as multipart to the returned `upload_url`, with the
//!    returned `upload_params` as leading fields.
//! 3. Read the created entity, either from the transfer response itself or by
//!    following its `Location` header.

use crate::error::UploadStage;
use crate::params::Parameters;
use crate::transport::error_classification::no_response;
use crate::transport::http::multipart_form;
use crate::transport::{cancellable, Connection};
use crate::types::FileUpload;
use crate::{Error, Result};
use reqwest::header::LOCATION;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use tokio_util::sync::CancellationToken;
use tracing::{debug, Instrument};

/// Upload slot handed out by Canvas in the first step.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FileUploadToken {
    #[serde(default)]
    pub upload_url: String,
    #[serde(default)]
    pub upload_params: BTreeMap<String, Value>,
}

impl FileUploadToken {
    /// The upload parameters as multipart text fields. Nulls are dropped.
    pub fn fields(&self) -> Vec<(String, String)> {
        self.upload_params
            .iter()
            .filter_map(|(name, value)| {
                let value = match value {
                    Value::Null => return None,
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                Some((name.clone(), value))
            })
            .collect()
    }
}

impl Connection {
    /// Upload `file` through the Canvas file upload protocol and return the
    /// entity Canvas created for it.
    ///
    /// The steps run strictly in order; the first failure aborts the upload.
    pub async fn upload_file<T: DeserializeOwned>(
        &self,
        url: &str,
        form_values: &Parameters,
        file: FileUpload,
        cancel: &CancellationToken,
    ) -> Result<T> {
        debug!(url, file = %file.name, "Starting file upload");

        let response = self.post(url, form_values, true, cancel).await?;
        let body = self.read_body(response, cancel).await?;
        let token = serde_json::from_slice::<Option<FileUploadToken>>(&body)
            .ok()
            .flatten()
            .filter(|t| !t.upload_url.trim().is_empty())
            .ok_or_else(|| Error::upload(UploadStage::Initiate, "Canvas did not return an upload URL"))?;

        let form = multipart_form(token.fields(), "file", file)?;
        let upload_url = token.upload_url.as_str();
        let request = self.upload_client.post(upload_url).multipart(form);
        let response = cancellable(cancel, async {
            request.send().await.map_err(|e| no_response(upload_url, e))
        })
        .instrument(self.logger())
        .await?;

        let status = response.status();
        debug!(url = upload_url, status = %status, "File transferred");
        if !(200..400).contains(&status.as_u16()) {
            return Err(Error::upload(
                UploadStage::Transfer,
                format!("storage returned {}", status),
            ));
        }

        if status == StatusCode::OK {
            let body = self
                .read_body(response, cancel)
                .await
                .map_err(|e| finalize_failure(e, "unable to read the transfer response"))?;
            return serde_json::from_slice(&body).map_err(|e| {
                Error::upload(
                    UploadStage::Finalize,
                    format!("unable to read the uploaded file: {}", e),
                )
            });
        }

        let location = response
            .headers()
            .get(LOCATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
            .ok_or_else(|| {
                Error::upload(UploadStage::Finalize, "no Location header after the transfer")
            })?;
        debug!(url = %location, "Following upload confirmation");
        let failed = format!("unable to retrieve the uploaded file from {}", location);
        match self.retrieve::<T>(&location, &Parameters::new(), cancel).await {
            Ok(Some(entity)) => Ok(entity),
            Ok(None) => Err(Error::upload(UploadStage::Finalize, failed)),
            Err(e) => Err(finalize_failure(e, &failed)),
        }
    }
}

/// Wrap a failure of the last step, keeping cancellation distinguishable.
fn finalize_failure(error: Error, context: &str) -> Error {
    match error {
        Error::Cancelled => Error::Cancelled,
        other => Error::upload(UploadStage::Finalize, format!("{}: {}", context, other)),
    }
}
