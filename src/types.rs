// Configuration, event payloads and event kinds shared by the core and the JS bindings.
// Field names follow the camelCase option names hosts already pass to the widget.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ViewerError;

/// Viewer configuration passed from JS.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewerConfig {
    /// Directory (or URL prefix) holding the frame images.
    pub image_path: String,
    #[serde(default = "default_file_prefix")]
    pub file_prefix: String,
    /// Extension including the leading dot.
    #[serde(default = "default_file_extension")]
    pub file_extension: String,
    #[serde(default = "default_number_of_images")]
    pub number_of_images: usize,
    /// Dragging right rotates backwards when set.
    #[serde(default)]
    pub invert_movement: bool,
}

fn default_file_prefix() -> String {
    "img".to_string()
}

fn default_file_extension() -> String {
    ".jpg".to_string()
}

fn default_number_of_images() -> usize {
    36
}

impl ViewerConfig {
    pub fn new(image_path: impl Into<String>) -> Self {
        ViewerConfig {
            image_path: image_path.into(),
            file_prefix: default_file_prefix(),
            file_extension: default_file_extension(),
            number_of_images: default_number_of_images(),
            invert_movement: false,
        }
    }

    pub fn from_json(json: &str) -> Result<Self, ViewerError> {
        let config: ViewerConfig = serde_json::from_str(json)
            .map_err(|e| ViewerError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ViewerError> {
        if self.number_of_images == 0 {
            return Err(ViewerError::InvalidConfig(
                "numberOfImages must be at least 1".to_string(),
            ));
        }
        for (name, value) in [
            ("imagePath", &self.image_path),
            ("filePrefix", &self.file_prefix),
            ("fileExtension", &self.file_extension),
        ] {
            if value.trim().is_empty() {
                return Err(ViewerError::InvalidConfig(format!(
                    "{} must not be empty",
                    name
                )));
            }
        }
        Ok(())
    }
}

/// Payload of the `release` event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleasePayload {
    pub index: usize,
    /// Frame reference shown at release time.
    pub image: String,
}

/// Payload of the `delta` event, for host-side instrumentation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeltaPayload {
    /// Pointer offset in pixels since the press.
    #[serde(rename = "x")]
    pub pixel_offset: f64,
    pub number_of_images: usize,
    pub offset_index: i64,
}

/// Payload of the `error` event: the frame that broke the readiness barrier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadFailure {
    pub frame: String,
    pub message: String,
}

/// Notification emitted by the viewer.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewerEvent {
    Loaded,
    Press,
    Release(ReleasePayload),
    Index(usize),
    Delta(DeltaPayload),
    Destroyed,
    Error(LoadFailure),
}

impl ViewerEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            ViewerEvent::Loaded => EventKind::Loaded,
            ViewerEvent::Press => EventKind::Press,
            ViewerEvent::Release(_) => EventKind::Release,
            ViewerEvent::Index(_) => EventKind::Index,
            ViewerEvent::Delta(_) => EventKind::Delta,
            ViewerEvent::Destroyed => EventKind::Destroyed,
            ViewerEvent::Error(_) => EventKind::Error,
        }
    }

    /// JSON form of the payload, `None` for events without one.
    pub fn payload_json(&self) -> Result<Option<String>, ViewerError> {
        let json = match self {
            ViewerEvent::Loaded | ViewerEvent::Press | ViewerEvent::Destroyed => return Ok(None),
            ViewerEvent::Release(payload) => serde_json::to_string(payload)?,
            ViewerEvent::Index(index) => serde_json::to_string(index)?,
            ViewerEvent::Delta(payload) => serde_json::to_string(payload)?,
            ViewerEvent::Error(payload) => serde_json::to_string(payload)?,
        };
        Ok(Some(json))
    }
}

/// Event names hosts subscribe to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Loaded,
    Press,
    Release,
    Index,
    Delta,
    Destroyed,
    Error,
}

impl EventKind {
    pub const ALL: [EventKind; 7] = [
        EventKind::Loaded,
        EventKind::Press,
        EventKind::Release,
        EventKind::Index,
        EventKind::Delta,
        EventKind::Destroyed,
        EventKind::Error,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Loaded => "loaded",
            EventKind::Press => "press",
            EventKind::Release => "release",
            EventKind::Index => "index",
            EventKind::Delta => "delta",
            EventKind::Destroyed => "destroyed",
            EventKind::Error => "error",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventKind {
    type Err = ViewerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EventKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| ViewerError::InvalidConfig(format!("Unknown event: {}", s)))
    }
}
