//! Background asset loading.
//!
//! File I/O and decoding happen on a dedicated loader thread so the
//! simulation never blocks on the disk. The [`LoaderBridge`] owns the two
//! channels to that thread:
//! - [`LoaderCmd`] travels to the thread (load requests, shutdown).
//! - [`LoaderMessage`] travels back (decoded asset or failure).
//!
//! The resource store drains the message side from the simulation thread,
//! which is the only place entries are mutated and bus events published.

use std::path::{Path, PathBuf};
use std::thread::JoinHandle;

use crossbeam_channel::{Receiver, Sender, TryIter, unbounded};
use log::{debug, error};
use serde_json::Value;

use crate::error::LoadError;
use crate::resources::filetype::{AssetKind, file_type};

/// Decoded RGBA8 image.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageAsset {
    pub width: u32,
    pub height: u32,
    /// Row-major RGBA bytes, `width * height * 4` long.
    pub pixels: Vec<u8>,
}

/// Audio file buffered in memory. Playback is not the engine's concern.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioAsset {
    pub format: String,
    pub bytes: Vec<u8>,
}

/// Payload of a loaded resource.
#[derive(Debug, Clone, PartialEq)]
pub enum Asset {
    Image(ImageAsset),
    Audio(AudioAsset),
    Json(Value),
}

impl Asset {
    pub fn kind(&self) -> AssetKind {
        match self {
            Asset::Image(_) => AssetKind::Image,
            Asset::Audio(_) => AssetKind::Audio,
            Asset::Json(_) => AssetKind::Json,
        }
    }

    pub fn as_image(&self) -> Option<&ImageAsset> {
        match self {
            Asset::Image(image) => Some(image),
            _ => None,
        }
    }

    pub fn as_audio(&self) -> Option<&AudioAsset> {
        match self {
            Asset::Audio(audio) => Some(audio),
            _ => None,
        }
    }

    pub fn as_json(&self) -> Option<&Value> {
        match self {
            Asset::Json(value) => Some(value),
            _ => None,
        }
    }
}

/// Commands sent *to* the loader thread.
#[derive(Debug)]
pub enum LoaderCmd {
    Load {
        ticket: u64,
        name: String,
        path: PathBuf,
        kind: AssetKind,
    },
    Shutdown,
}

/// Results sent *back* from the loader thread.
#[derive(Debug)]
pub enum LoaderMessage {
    Loaded {
        ticket: u64,
        name: String,
        asset: Asset,
    },
    Failed {
        ticket: u64,
        name: String,
        error: LoadError,
    },
}

/// Channels to a running loader thread plus its join handle.
///
/// Dropping the bridge asks the thread to shut down and joins it.
pub struct LoaderBridge {
    tx_cmd: Sender<LoaderCmd>,
    rx_msg: Receiver<LoaderMessage>,
    handle: Option<JoinHandle<()>>,
}

impl LoaderBridge {
    /// Spawn the loader thread.
    pub fn spawn() -> Self {
        let (tx_cmd, rx_cmd) = unbounded::<LoaderCmd>();
        let (tx_msg, rx_msg) = unbounded::<LoaderMessage>();
        let handle = std::thread::Builder::new()
            .name("asset-loader".into())
            .spawn(move || loader_thread(rx_cmd, tx_msg))
            .map_err(|e| error!("Resource: could not spawn loader thread: {}", e))
            .ok();
        Self {
            tx_cmd,
            rx_msg,
            handle,
        }
    }

    /// Queue a load. Returns `false` if the loader thread is gone.
    pub fn load(&self, ticket: u64, name: &str, path: &Path, kind: AssetKind) -> bool {
        self.tx_cmd
            .send(LoaderCmd::Load {
                ticket,
                name: name.to_string(),
                path: path.to_path_buf(),
                kind,
            })
            .is_ok()
    }

    /// Non-blocking drain of finished loads.
    pub fn try_iter(&self) -> TryIter<'_, LoaderMessage> {
        self.rx_msg.try_iter()
    }
}

impl Drop for LoaderBridge {
    fn drop(&mut self) {
        let _ = self.tx_cmd.send(LoaderCmd::Shutdown);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

/// Entry point of the loader thread.
///
/// Blocks on the command channel, loads each request in order and reports
/// back. Exits on [`LoaderCmd::Shutdown`] or when every sender is gone.
pub fn loader_thread(rx_cmd: Receiver<LoaderCmd>, tx_msg: Sender<LoaderMessage>) {
    debug!("Resource: loader thread starting");
    for cmd in rx_cmd.iter() {
        match cmd {
            LoaderCmd::Load {
                ticket,
                name,
                path,
                kind,
            } => {
                let msg = match load_asset(&path, kind) {
                    Ok(asset) => LoaderMessage::Loaded {
                        ticket,
                        name,
                        asset,
                    },
                    Err(error) => LoaderMessage::Failed {
                        ticket,
                        name,
                        error,
                    },
                };
                if tx_msg.send(msg).is_err() {
                    break;
                }
            }
            LoaderCmd::Shutdown => break,
        }
    }
    debug!("Resource: loader thread exiting");
}

/// Read and decode one asset synchronously.
pub fn load_asset(path: &Path, kind: AssetKind) -> Result<Asset, LoadError> {
    let bytes = std::fs::read(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    match kind {
        AssetKind::Image => {
            let decoded = image::load_from_memory(&bytes).map_err(|source| LoadError::Image {
                path: path.to_path_buf(),
                source,
            })?;
            let rgba = decoded.to_rgba8();
            Ok(Asset::Image(ImageAsset {
                width: rgba.width(),
                height: rgba.height(),
                pixels: rgba.into_raw(),
            }))
        }
        AssetKind::Audio => Ok(Asset::Audio(AudioAsset {
            format: file_type(path).to_ascii_lowercase(),
            bytes,
        })),
        AssetKind::Json => {
            let value = serde_json::from_slice(&bytes).map_err(|source| LoadError::Json {
                path: path.to_path_buf(),
                source,
            })?;
            Ok(Asset::Json(value))
        }
    }
}
