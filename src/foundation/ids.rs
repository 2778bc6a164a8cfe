use std::fmt;
use std::sync::Arc;

/// Identifier of a host-provided region (the element a visual binds to).
///
/// Cheap to clone: regions are referenced from many timeline tracks and written
/// into the [`Stage`](crate::Stage) every frame.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
#[serde(from = "String", into = "String")]
pub struct RegionId(Arc<str>);

impl RegionId {
    /// Create a region id from any string-like value.
    pub fn new(id: impl AsRef<str>) -> Self {
        Self(Arc::from(id.as_ref()))
    }

    /// Borrow the id text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for RegionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RegionId({:?})", &*self.0)
    }
}

impl fmt::Display for RegionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RegionId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for RegionId {
    fn from(value: String) -> Self {
        Self(Arc::from(value))
    }
}

impl From<RegionId> for String {
    fn from(value: RegionId) -> Self {
        value.0.to_string()
    }
}

/// Caller-chosen unique name of a trigger binding.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct BindingKey(pub String);

impl BindingKey {
    /// Create a key from any string-like value.
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }
}

impl fmt::Display for BindingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for BindingKey {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl From<String> for BindingKey {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Handle returned by [`TriggerRegistry::register`](crate::TriggerRegistry::register).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BindingHandle(pub(crate) u64);

/// Handle of a per-frame callback registered on the scroller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FrameCallbackId(pub(crate) u64);

/// Handle of an engine event listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(pub(crate) u64);

/// Handle of an attached pinned segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PinId(pub(crate) u64);

/// Index of a named cue inside a built timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CueId(pub(crate) u16);

/// Owner of a stage channel claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClaimOwner(pub(crate) u64);
