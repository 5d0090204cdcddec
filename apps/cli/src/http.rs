//! reqwest-backed [`ChunkTransport`].

use std::time::Duration;

use reqwest::multipart::{Form, Part};
use tokio_util::sync::CancellationToken;

use reportdrop_protocol::constants::FIELD_FILE;
use reportdrop_protocol::{ChunkFields, FileFields};
use reportdrop_transfer::FileHandle;
use reportdrop_upload::{
    ChunkRequest, ChunkTransport, TransportError, TransportFuture, TransportResponse,
};

const CHUNK_MIME: &str = "application/octet-stream";

/// Posts each chunk (or whole file) as a multipart form to one endpoint.
///
/// A request that has started always runs to completion; cancellation is
/// observed by the upload core between chunks.
pub struct HttpTransport {
    client: reqwest::Client,
    url: String,
}

impl HttpTransport {
    pub fn new(url: impl Into<String>, timeout: Option<Duration>) -> anyhow::Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self::with_client(builder.build()?, url))
    }

    pub fn with_client(client: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }

    async fn post(&self, form: Form) -> Result<TransportResponse, TransportError> {
        let response = self
            .client
            .post(&self.url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| TransportError::new(format!("request to {} failed: {e}", self.url)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| TransportError::new(format!("failed to read response: {e}")))?;

        if !status.is_success() {
            return Err(TransportError::new(format!("HTTP {}: {body}", status.as_u16())));
        }
        Ok(TransportResponse {
            status: status.as_u16(),
            body,
        })
    }
}

fn with_fields(part: Part, fields: Vec<(&'static str, String)>) -> Form {
    fields
        .into_iter()
        .fold(Form::new().part(FIELD_FILE, part), |form, (name, value)| {
            form.text(name, value)
        })
}

fn chunk_form(data: &[u8], fields: &ChunkFields) -> Result<Form, TransportError> {
    let part = Part::bytes(data.to_vec())
        .file_name(fields.file_name.clone())
        .mime_str(CHUNK_MIME)
        .map_err(|e| TransportError::new(e.to_string()))?;
    Ok(with_fields(part, fields.form_fields()))
}

/// Builds the whole-file form. Disk files are streamed, not buffered.
async fn file_form(file: &FileHandle, fields: &FileFields) -> Result<Form, TransportError> {
    let mut part = match file.path() {
        Some(path) => {
            let source = tokio::fs::File::open(path).await.map_err(|e| {
                TransportError::new(format!("failed to open {}: {e}", path.display()))
            })?;
            Part::stream_with_length(reqwest::Body::from(source), file.size())
        }
        None => Part::bytes(
            file.read_all()
                .map_err(|e| TransportError::new(e.to_string()))?,
        ),
    };
    part = part.file_name(file.name().to_string());
    if !file.mime_type().is_empty() {
        part = part
            .mime_str(file.mime_type())
            .map_err(|e| TransportError::new(e.to_string()))?;
    }
    Ok(with_fields(part, fields.form_fields()))
}

impl ChunkTransport for HttpTransport {
    fn send_chunk<'a>(
        &'a self,
        request: ChunkRequest<'a>,
        _cancel: &'a CancellationToken,
    ) -> TransportFuture<'a> {
        Box::pin(async move {
            let form = chunk_form(request.data, request.fields)?;
            self.post(form).await
        })
    }

    fn send_file<'a>(
        &'a self,
        file: &'a FileHandle,
        fields: &'a FileFields,
        _cancel: &'a CancellationToken,
    ) -> TransportFuture<'a> {
        Box::pin(async move {
            let form = file_form(file, fields).await?;
            self.post(form).await
        })
    }
}
