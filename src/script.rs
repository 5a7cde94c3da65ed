//! Abstracts the document the vendor script is injected into.
use std::error::Error;

use url::Url;
use uuid::Uuid;

/// Identifies a `<script>` element appended by a [`ScriptHost`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScriptId(Uuid);

impl ScriptId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ScriptId {
    fn default() -> Self {
        Self::new()
    }
}

/// A document that can load external scripts.
///
/// `append_script` inserts an `async`/`defer` script element and returns its id along
/// with a future that resolves on the element's `load` or `error` event.
pub trait ScriptHost {
    type Error: Error;
    type Load: Future<Output = Result<(), Self::Error>>;

    fn append_script(&self, src: &Url) -> (ScriptId, Self::Load);

    fn remove_script(&self, id: ScriptId);
}
