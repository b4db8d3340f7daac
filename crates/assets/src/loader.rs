use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, SyncSender, TryRecvError};

use simsync_articulated::{ArticulatedModel, ModelError};

use crate::RobotDescription;

/// Errors from loading a robot description.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("description parse error: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid model structure: {0}")]
    Model(#[from] ModelError),
    #[error("model setup failed: {0}")]
    Setup(#[source] ModelError),
    #[error("loader finished without delivering a model")]
    Abandoned,
}

/// Read, parse and validate a description document on the calling thread.
pub fn load_description(path: impl AsRef<Path>) -> Result<ArticulatedModel, LoadError> {
    let path = path.as_ref();
    let json = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let description = RobotDescription::from_json(&json)?;
    Ok(description.into_model()?)
}

/// Create a one-shot delivery pair.
///
/// The [`Completer`] is consumed by `complete`, so a well-behaved loader can
/// deliver only once; the [`LoadHandle`] additionally ignores anything after
/// the first result.
pub fn load_channel(source: impl Into<PathBuf>) -> (Completer, LoadHandle) {
    let (tx, rx) = mpsc::sync_channel(1);
    (
        Completer { tx },
        LoadHandle {
            source: source.into(),
            rx: Some(rx),
        },
    )
}

/// Sending half of a model delivery.
#[derive(Debug)]
pub struct Completer {
    tx: SyncSender<Result<ArticulatedModel, LoadError>>,
}

impl Completer {
    pub fn complete(self, result: Result<ArticulatedModel, LoadError>) {
        // A dropped handle means nobody is waiting any more.
        if self.tx.send(result).is_err() {
            tracing::debug!("model delivered after its handle was dropped");
        }
    }
}

/// Receiving half of a model delivery, polled from the frame loop.
#[derive(Debug)]
pub struct LoadHandle {
    source: PathBuf,
    rx: Option<Receiver<Result<ArticulatedModel, LoadError>>>,
}

impl LoadHandle {
    pub fn source(&self) -> &Path {
        &self.source
    }

    /// Whether the result has already been taken.
    pub fn is_finished(&self) -> bool {
        self.rx.is_none()
    }

    /// Non-blocking check for the result. Yields `Some` exactly once.
    pub fn poll(&mut self) -> Option<Result<ArticulatedModel, LoadError>> {
        let rx = self.rx.as_ref()?;
        let delivered = match rx.try_recv() {
            Ok(result) => result,
            Err(TryRecvError::Empty) => return None,
            Err(TryRecvError::Disconnected) => Err(LoadError::Abandoned),
        };
        self.rx = None;
        Some(delivered)
    }

    /// Block until the loader delivers.
    pub fn wait(mut self) -> Result<ArticulatedModel, LoadError> {
        let Some(rx) = self.rx.take() else {
            return Err(LoadError::Abandoned);
        };
        rx.recv().unwrap_or(Err(LoadError::Abandoned))
    }
}

/// Loads descriptions on a background thread.
#[derive(Debug, Clone, Default)]
pub struct ModelLoader;

impl ModelLoader {
    pub fn new() -> Self {
        Self
    }

    /// Start loading `path`; the returned handle completes exactly once.
    pub fn load(&self, path: impl Into<PathBuf>) -> LoadHandle {
        let path = path.into();
        let (completer, handle) = load_channel(path.clone());
        let spawned = std::thread::Builder::new()
            .name("model-loader".into())
            .spawn(move || {
                let _span = tracing::info_span!("model_load", path = %path.display()).entered();
                let result = load_description(&path);
                match &result {
                    Ok(model) => tracing::info!(
                        model = model.name(),
                        joints = model.joints().len(),
                        "robot description loaded"
                    ),
                    Err(e) => tracing::warn!(error = %e, "robot description failed to load"),
                }
                completer.complete(result);
            });
        if let Err(e) = spawned {
            // The closure, and with it the completer, is dropped: the handle
            // reports `Abandoned` on its next poll.
            tracing::error!(error = %e, "could not start model loader thread");
        }
        handle
    }
}
