/// Displayable forms of stored images
///
/// Each shown record gets one `DisplayRef`, an image handle decoded
/// lazily by the renderer. The handle shares the record's bytes.
/// When the record set is replaced, references to records that are
/// still shown are kept (so the renderer does not decode them again)
/// and all others are released.
use iced::widget::image::Handle;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::state::data::ImageRecord;

/// A handle to one record's image, released on drop
#[derive(Debug)]
pub struct DisplayRef {
    id: Option<i64>,
    handle: Handle,
    live: Arc<AtomicUsize>,
}

impl DisplayRef {
    #[cfg(test)]
    pub fn id(&self) -> Option<i64> {
        self.id
    }

    pub fn handle(&self) -> &Handle {
        &self.handle
    }
}

impl Drop for DisplayRef {
    fn drop(&mut self) {
        self.live.fetch_sub(1, Ordering::Relaxed);
        tracing::trace!(id = ?self.id, "Released display reference");
    }
}

/// All display references for the currently shown record set
#[derive(Debug, Default)]
pub struct DisplayRefs {
    refs: Vec<DisplayRef>,
    live: Arc<AtomicUsize>,
}

impl DisplayRefs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Swap in references for a new record set, in its order.
    /// References for records no longer present are released before
    /// any new ones are created.
    pub fn replace(&mut self, records: &[ImageRecord]) {
        let mut previous: Vec<Option<DisplayRef>> = std::mem::take(&mut self.refs)
            .into_iter()
            .filter(|old| {
                old.id.is_some() && records.iter().any(|record| record.id == old.id)
            })
            .map(Some)
            .collect();

        self.refs = records
            .iter()
            .map(|record| {
                let kept = previous
                    .iter_mut()
                    .find(|slot| matches!(slot, Some(old) if old.id == record.id))
                    .and_then(Option::take);

                kept.unwrap_or_else(|| {
                    self.live.fetch_add(1, Ordering::Relaxed);
                    DisplayRef {
                        id: record.id,
                        handle: Handle::from_bytes(record.file.bytes.clone()),
                        live: Arc::clone(&self.live),
                    }
                })
            })
            .collect();
    }

    /// References in display order
    pub fn iter(&self) -> impl Iterator<Item = &DisplayRef> {
        self.refs.iter()
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.refs.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.refs.is_empty()
    }

    /// Number of references not yet released
    #[cfg(test)]
    pub fn live(&self) -> usize {
        self.live.load(Ordering::Relaxed)
    }
}
