//! # IO service
//!
//! The byte-stream collaborator. A dedicated thread owns a [`GridStore`]
//! and serves input, output and idle-check requests strictly in the order
//! they were sent, so an idle acknowledgment means every earlier write has
//! finished.
//!
//! Writes are fire-and-forget from the engine's point of view. A failed
//! write is remembered and reported by the next idle check.

use std::collections::HashMap;
use std::io;
use std::sync::Arc;
use std::thread;

use parking_lot::Mutex;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, warn};

use crate::error::{EngineError, EngineResult};
use crate::grid::Grid;
use crate::params::Params;
use crate::world::Snapshot;

/// Backend that actually reads and writes grid images.
///
/// `name` identifies the image: `"{width}x{height}"` for input,
/// `"{width}x{height}x{turn}"` for output.
pub trait GridStore: Send + 'static {
    fn load(&mut self, name: &str, width: usize, height: usize) -> EngineResult<Vec<u8>>;

    fn store(&mut self, name: &str, width: usize, height: usize, bytes: &[u8]) -> EngineResult<()>;
}

/// In-memory store. Clones share the same images.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    images: Arc<Mutex<HashMap<String, Vec<u8>>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, name: impl Into<String>, bytes: Vec<u8>) {
        self.images.lock().insert(name.into(), bytes);
    }

    /// Stores `grid` under its input name.
    pub fn insert_grid(&self, grid: &Grid) {
        self.insert(Params::input_name(grid.width(), grid.height()), grid.to_bytes());
    }

    pub fn get(&self, name: &str) -> Option<Vec<u8>> {
        self.images.lock().get(name).cloned()
    }

    /// Image names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.images.lock().keys().cloned().collect();
        names.sort();
        names
    }
}

impl GridStore for MemoryStore {
    fn load(&mut self, name: &str, _width: usize, _height: usize) -> EngineResult<Vec<u8>> {
        self.get(name).ok_or_else(|| {
            EngineError::Io(io::Error::new(
                io::ErrorKind::NotFound,
                format!("no image named {name}"),
            ))
        })
    }

    fn store(
        &mut self,
        name: &str,
        _width: usize,
        _height: usize,
        bytes: &[u8],
    ) -> EngineResult<()> {
        self.insert(name, bytes.to_vec());
        Ok(())
    }
}

enum IoRequest {
    Input {
        name: String,
        width: usize,
        height: usize,
        reply: oneshot::Sender<EngineResult<Vec<u8>>>,
    },
    Output {
        name: String,
        width: usize,
        height: usize,
        bytes: Vec<u8>,
    },
    CheckIdle {
        reply: oneshot::Sender<EngineResult<()>>,
    },
}

/// Cloneable handle to the IO thread. The thread exits once every handle
/// has been dropped.
#[derive(Debug, Clone)]
pub struct IoHandle {
    tx: mpsc::UnboundedSender<IoRequest>,
}

impl std::fmt::Debug for IoRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IoRequest::Input { name, .. } => write!(f, "Input({name})"),
            IoRequest::Output { name, .. } => write!(f, "Output({name})"),
            IoRequest::CheckIdle { .. } => f.write_str("CheckIdle"),
        }
    }
}

impl IoHandle {
    /// Starts the IO thread over `store`.
    pub fn spawn(store: impl GridStore) -> EngineResult<(Self, thread::JoinHandle<()>)> {
        let (tx, rx) = mpsc::unbounded_channel();
        let thread = thread::Builder::new()
            .name("gol-io".into())
            .spawn(move || serve(store, rx))?;
        Ok((Self { tx }, thread))
    }

    /// Reads the initial grid for a `width` x `height` run.
    pub async fn read_grid(&self, width: usize, height: usize) -> EngineResult<Grid> {
        let (reply, response) = oneshot::channel();
        self.request(IoRequest::Input {
            name: Params::input_name(width, height),
            width,
            height,
            reply,
        })?;
        let bytes = response.await.map_err(|_| EngineError::IoClosed)??;
        Grid::from_bytes(width, height, &bytes)
    }

    /// Queues `snapshot` for persistence under its output name.
    pub fn write_grid(&self, snapshot: &Snapshot) -> EngineResult<()> {
        let grid = &snapshot.grid;
        self.request(IoRequest::Output {
            name: Params::output_name(grid.width(), grid.height(), snapshot.turn),
            width: grid.width(),
            height: grid.height(),
            bytes: grid.to_bytes(),
        })
    }

    /// Waits until every queued write has reached the store.
    ///
    /// Reports the first write failure since the previous check.
    pub async fn wait_idle(&self) -> EngineResult<()> {
        let (reply, response) = oneshot::channel();
        self.request(IoRequest::CheckIdle { reply })?;
        response.await.map_err(|_| EngineError::IoClosed)?
    }

    fn request(&self, request: IoRequest) -> EngineResult<()> {
        self.tx.send(request).map_err(|_| EngineError::IoClosed)
    }
}

fn serve(mut store: impl GridStore, mut rx: mpsc::UnboundedReceiver<IoRequest>) {
    let mut failure: Option<EngineError> = None;

    while let Some(request) = rx.blocking_recv() {
        debug!(?request, "io request");
        match request {
            IoRequest::Input { name, width, height, reply } => {
                let _ = reply.send(store.load(&name, width, height));
            }
            IoRequest::Output { name, width, height, bytes } => {
                if let Err(e) = store.store(&name, width, height, &bytes) {
                    warn!(%name, error = %e, "failed to write grid");
                    failure.get_or_insert(e);
                }
            }
            IoRequest::CheckIdle { reply } => {
                let _ = reply.send(failure.take().map_or(Ok(()), Err));
            }
        }
    }
}
