/// Gallery controller
///
/// Owns the store handle and the record set shown on screen, and moves
/// through the view states:
///
/// ```text
/// Uninitialized --mount(ok)--> Loaded <--> Inserting
///       |
///       +--mount(err)--> Error
/// ```
///
/// Storage failures are logged, never surfaced to the user.
use crate::state::data::{ImageFile, ImageRecord};
use crate::state::store::{ImageStore, StoreResult};
use crate::ui::display::DisplayRefs;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewState {
    /// Not mounted yet
    Uninitialized,
    /// Showing the last successfully loaded record set
    Loaded,
    /// An insert is in flight
    Inserting,
    /// Startup failed; there is no way back from here
    Error,
}

pub struct GalleryController<S: ImageStore> {
    store: Option<S>,
    state: ViewState,
    records: Vec<ImageRecord>,
    display: DisplayRefs,
}

impl<S: ImageStore> GalleryController<S> {
    pub fn new() -> Self {
        Self {
            store: None,
            state: ViewState::Uninitialized,
            records: Vec::new(),
            display: DisplayRefs::new(),
        }
    }

    /// Take the result of opening the store and load the initial record set
    pub fn mount(&mut self, opened: StoreResult<S>) {
        if self.state != ViewState::Uninitialized {
            tracing::warn!(state = ?self.state, "Gallery already mounted");
            return;
        }

        let store = match opened {
            Ok(store) => store,
            Err(e) => {
                tracing::error!("Failed to open image store: {}", e);
                self.state = ViewState::Error;
                return;
            }
        };

        let loaded = store.list_all();
        self.store = Some(store);

        match loaded {
            Ok(records) => {
                tracing::info!("Gallery loaded with {} images", records.len());
                self.set_records(records);
                self.state = ViewState::Loaded;
            }
            Err(e) => {
                tracing::error!("Failed to load images: {}", e);
                self.state = ViewState::Error;
            }
        }
    }

    /// Handle the user's file selection; `None` means the dialog was cancelled
    pub fn select_file(&mut self, file: Option<ImageFile>) {
        let Some(file) = file else {
            tracing::debug!("No file selected");
            return;
        };

        // No store means startup failed; nothing to write to
        let Some(store) = self.store.as_mut() else {
            return;
        };

        let previous = self.state;
        self.state = ViewState::Inserting;

        match store.insert(&file) {
            Ok(id) => {
                tracing::info!("Added {} as image {}", file.name, id);
                match store.list_all() {
                    Ok(records) => self.set_records(records),
                    Err(e) => tracing::error!("Failed to reload images: {}", e),
                }
            }
            Err(e) => tracing::error!("Failed to add {}: {}", file.name, e),
        }

        self.state = if previous == ViewState::Error {
            ViewState::Error
        } else {
            ViewState::Loaded
        };
    }

    /// Release the store handle, returning it to the caller for closing
    pub fn shutdown(&mut self) -> Option<S> {
        self.display.replace(&[]);
        self.store.take()
    }

    fn set_records(&mut self, records: Vec<ImageRecord>) {
        self.display.replace(&records);
        self.records = records;
    }

    pub fn state(&self) -> ViewState {
        self.state
    }

    pub fn records(&self) -> &[ImageRecord] {
        &self.records
    }

    pub fn display(&self) -> &DisplayRefs {
        &self.display
    }
}

impl<S: ImageStore> Default for GalleryController<S> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::data::tests::PNG_HEADER;
    use crate::state::library::Library;
    use crate::state::store::StoreError;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tracing_subscriber::layer::{Context, SubscriberExt};
    use tracing_subscriber::Layer;

    /// In-memory store that counts calls and can be told to fail
    #[derive(Default)]
    struct FakeStore {
        records: Vec<ImageRecord>,
        inserts: usize,
        lists: Arc<AtomicUsize>,
        fail_insert: bool,
        fail_list: bool,
    }

    impl ImageStore for FakeStore {
        fn insert(&mut self, file: &ImageFile) -> StoreResult<i64> {
            self.inserts += 1;
            if self.fail_insert {
                return Err(StoreError::TransactionAborted("quota exceeded".into()));
            }
            let id = self.records.len() as i64 + 1;
            self.records.push(ImageRecord {
                id: Some(id),
                file: file.clone(),
                timestamp: format!("2024-01-01T00:00:{:02}.000Z", id),
            });
            Ok(id)
        }

        fn list_all(&self) -> StoreResult<Vec<ImageRecord>> {
            self.lists.fetch_add(1, Ordering::Relaxed);
            if self.fail_list {
                return Err(StoreError::TransactionAborted("read failed".into()));
            }
            Ok(self.records.clone())
        }
    }

    /// Counts ERROR-level events
    struct ErrorCounter(Arc<AtomicUsize>);

    impl<S: tracing::Subscriber> Layer<S> for ErrorCounter {
        fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
            if *event.metadata().level() == tracing::Level::ERROR {
                self.0.fetch_add(1, Ordering::Relaxed);
            }
        }
    }

    /// Run `f` with a subscriber that counts error events
    fn count_errors(f: impl FnOnce()) -> usize {
        let errors = Arc::new(AtomicUsize::new(0));
        let subscriber = tracing_subscriber::registry().with(ErrorCounter(Arc::clone(&errors)));
        tracing::subscriber::with_default(subscriber, f);
        errors.load(Ordering::Relaxed)
    }

    fn png(name: &str) -> ImageFile {
        ImageFile::new(name, "image/png", PNG_HEADER.to_vec())
    }

    #[test]
    fn test_mount_loads_existing_records() {
        let mut store = FakeStore::default();
        store.insert(&png("old.png")).unwrap();

        let mut gallery = GalleryController::new();
        gallery.mount(Ok(store));

        assert_eq!(gallery.state(), ViewState::Loaded);
        assert_eq!(gallery.records().len(), 1);
        assert_eq!(gallery.display().live(), 1);
    }

    #[test]
    fn test_open_failure_logs_once_and_never_lists() {
        let mut gallery: GalleryController<FakeStore> = GalleryController::new();

        let errors = count_errors(|| {
            gallery.mount(Err(StoreError::PermissionDenied("host denied access".into())));
        });

        assert_eq!(errors, 1);
        assert_eq!(gallery.state(), ViewState::Error);
        assert!(gallery.records().is_empty());
        assert!(gallery.store.as_ref().is_none());

        // Selecting a file afterwards does nothing
        gallery.select_file(Some(png("a.png")));
        assert_eq!(gallery.state(), ViewState::Error);
        assert!(gallery.records().is_empty());
    }

    #[test]
    fn test_failed_initial_list_keeps_handle() {
        let lists = Arc::new(AtomicUsize::new(0));
        let store = FakeStore {
            fail_list: true,
            lists: Arc::clone(&lists),
            ..Default::default()
        };

        let mut gallery = GalleryController::new();
        let errors = count_errors(|| gallery.mount(Ok(store)));

        assert_eq!(errors, 1);
        assert_eq!(lists.load(Ordering::Relaxed), 1);
        assert_eq!(gallery.state(), ViewState::Error);
        assert!(gallery.store.as_ref().is_some());
    }

    #[test]
    fn test_cancelled_selection_does_not_insert() {
        let mut gallery = GalleryController::new();
        gallery.mount(Ok(FakeStore::default()));

        gallery.select_file(None);

        assert_eq!(gallery.store.as_ref().unwrap().inserts, 0);
        assert!(gallery.records().is_empty());
        assert_eq!(gallery.state(), ViewState::Loaded);
    }

    #[test]
    fn test_selection_inserts_then_reloads() {
        let lists = Arc::new(AtomicUsize::new(0));
        let store = FakeStore {
            lists: Arc::clone(&lists),
            ..Default::default()
        };

        let mut gallery = GalleryController::new();
        gallery.mount(Ok(store));
        gallery.select_file(Some(png("a.png")));
        gallery.select_file(Some(png("b.png")));

        assert_eq!(gallery.state(), ViewState::Loaded);
        assert_eq!(lists.load(Ordering::Relaxed), 3);
        let names: Vec<_> = gallery.records().iter().map(|r| r.file.name.as_str()).collect();
        assert_eq!(names, vec!["a.png", "b.png"]);
        assert_eq!(gallery.display().live(), 2);
    }

    #[test]
    fn test_insert_failure_leaves_view_unchanged() {
        let mut gallery = GalleryController::new();
        gallery.mount(Ok(FakeStore {
            fail_insert: true,
            ..Default::default()
        }));

        let errors = count_errors(|| gallery.select_file(Some(png("a.png"))));

        assert_eq!(errors, 1);
        assert_eq!(gallery.state(), ViewState::Loaded);
        assert!(gallery.records().is_empty());
    }

    #[test]
    fn test_reload_failure_keeps_stale_records() {
        let mut gallery = GalleryController::new();
        gallery.mount(Ok(FakeStore::default()));
        gallery.select_file(Some(png("a.png")));
        assert_eq!(gallery.records().len(), 1);

        // Break reads, then insert again: stored but not shown
        gallery.store.as_mut().unwrap().fail_list = true;

        let errors = count_errors(|| gallery.select_file(Some(png("b.png"))));

        assert_eq!(errors, 1);
        assert_eq!(gallery.records().len(), 1);
        assert_eq!(gallery.store.as_ref().unwrap().records.len(), 2);
        assert_eq!(gallery.state(), ViewState::Loaded);
    }

    #[test]
    fn test_shutdown_releases_handle_and_display_refs() {
        let mut gallery = GalleryController::new();
        gallery.mount(Ok(FakeStore::default()));
        gallery.select_file(Some(png("a.png")));

        assert!(gallery.shutdown().is_some());
        assert!(gallery.store.as_ref().is_none());
        assert_eq!(gallery.display().live(), 0);
    }

    #[test]
    fn test_with_sqlite_library() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("image_gallery.db");

        let mut gallery = GalleryController::new();
        gallery.mount(Library::open_at(&path));
        gallery.select_file(Some(png("a.png")));
        assert_eq!(gallery.records().len(), 1);
        assert_eq!(gallery.records()[0].id, Some(1));
        gallery.shutdown().unwrap().close().unwrap();

        // A fresh view over the same catalog sees the stored image
        let mut gallery = GalleryController::new();
        gallery.mount(Library::open_at(&path));
        assert_eq!(gallery.state(), ViewState::Loaded);
        assert_eq!(gallery.records().len(), 1);
        assert_eq!(gallery.records()[0].file.name, "a.png");
    }
}
