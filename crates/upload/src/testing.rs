//! Mock transport shared by the orchestrator and batch tests.

use std::collections::HashMap;
use std::sync::Mutex;

use reportdrop_protocol::{ChunkFields, FileFields};
use reportdrop_transfer::FileHandle;
use tokio_util::sync::CancellationToken;

use crate::transport::{
    ChunkRequest, ChunkTransport, TransportError, TransportFuture, TransportResponse,
};

type Hook = Box<dyn Fn(&ChunkFields) + Send + Sync>;

/// A chunk the mock received.
#[derive(Debug, Clone)]
pub struct SentChunk {
    pub fields: ChunkFields,
    pub len: usize,
    pub data: Vec<u8>,
}

/// Records every request; fails or runs a hook at chosen chunks.
#[derive(Default)]
pub struct MockTransport {
    sent: Mutex<Vec<SentChunk>>,
    files: Mutex<Vec<(String, FileFields)>>,
    failures: Mutex<HashMap<(String, usize), String>>,
    hook: Mutex<Option<Hook>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail chunk `index` of the file sent for slot `key`.
    pub fn fail_at(&self, key: &str, index: usize, cause: &str) {
        self.failures
            .lock()
            .unwrap()
            .insert((key.to_string(), index), cause.to_string());
    }

    /// Run `hook` while each chunk is "in flight".
    pub fn on_send(&self, hook: impl Fn(&ChunkFields) + Send + Sync + 'static) {
        *self.hook.lock().unwrap() = Some(Box::new(hook));
    }

    pub fn sent(&self) -> Vec<SentChunk> {
        self.sent.lock().unwrap().clone()
    }

    pub fn sent_for(&self, key: &str) -> Vec<SentChunk> {
        self.sent()
            .into_iter()
            .filter(|c| c.fields.file_type == key)
            .collect()
    }

    pub fn files(&self) -> Vec<(String, FileFields)> {
        self.files.lock().unwrap().clone()
    }
}

impl ChunkTransport for MockTransport {
    fn send_chunk<'a>(
        &'a self,
        request: ChunkRequest<'a>,
        _cancel: &'a CancellationToken,
    ) -> TransportFuture<'a> {
        let fields = request.fields.clone();
        let data = request.data.to_vec();
        Box::pin(async move {
            self.sent.lock().unwrap().push(SentChunk {
                fields: fields.clone(),
                len: data.len(),
                data,
            });
            if let Some(hook) = self.hook.lock().unwrap().as_ref() {
                hook(&fields);
            }
            let failure = self
                .failures
                .lock()
                .unwrap()
                .get(&(fields.file_type.clone(), fields.chunk_index))
                .cloned();
            match failure {
                Some(cause) => Err(TransportError::new(cause)),
                None => Ok(TransportResponse {
                    status: 200,
                    body: String::new(),
                }),
            }
        })
    }

    fn send_file<'a>(
        &'a self,
        file: &'a FileHandle,
        fields: &'a FileFields,
        _cancel: &'a CancellationToken,
    ) -> TransportFuture<'a> {
        Box::pin(async move {
            self.files
                .lock()
                .unwrap()
                .push((file.name().to_string(), fields.clone()));
            Ok(TransportResponse {
                status: 200,
                body: String::new(),
            })
        })
    }
}

/// A transport whose calls never resolve.
pub struct StalledTransport;

impl ChunkTransport for StalledTransport {
    fn send_chunk<'a>(
        &'a self,
        _request: ChunkRequest<'a>,
        _cancel: &'a CancellationToken,
    ) -> TransportFuture<'a> {
        Box::pin(std::future::pending())
    }

    fn send_file<'a>(
        &'a self,
        _file: &'a FileHandle,
        _fields: &'a FileFields,
        _cancel: &'a CancellationToken,
    ) -> TransportFuture<'a> {
        Box::pin(std::future::pending())
    }
}

/// A CSV handle of `len` bytes.
pub fn csv_file(name: &str, len: usize) -> FileHandle {
    FileHandle::new(name, "text/csv", vec![b'x'; len])
}
