//! File-type classification for asset paths.

use std::path::Path;

/// The asset families the resource store knows how to load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssetKind {
    Image,
    Audio,
    Json,
}

impl AssetKind {
    /// Name used in resource channels (`resource-<kind>-<name>`).
    pub fn as_str(self) -> &'static str {
        match self {
            AssetKind::Image => "image",
            AssetKind::Audio => "audio",
            AssetKind::Json => "json",
        }
    }

    /// Pick a loader family from a file extension, case-insensitively.
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension.to_ascii_lowercase().as_str() {
            "png" | "jpg" | "jpeg" => Some(AssetKind::Image),
            "mp3" | "ogg" | "wav" => Some(AssetKind::Audio),
            "json" => Some(AssetKind::Json),
            _ => None,
        }
    }

    /// Classify a path by its extension.
    pub fn from_path(path: impl AsRef<Path>) -> Option<Self> {
        Self::from_extension(&file_type(path))
    }
}

/// Everything after the last `.` of the file name, or an empty string.
pub fn file_type(path: impl AsRef<Path>) -> String {
    path.as_ref()
        .extension()
        .map(|ext| ext.to_string_lossy().into_owned())
        .unwrap_or_default()
}
