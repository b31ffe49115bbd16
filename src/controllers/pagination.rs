use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

use super::{emit, EVENT_BUFFER};
use crate::{
    error::ErrorCode,
    models::{EnrichedMovie, FavoriteRecord, Resource},
    services::catalog::MovieRepository,
};

/// Notifications emitted by a [`PaginationController`]
///
/// Both channels hold at most [`EVENT_BUFFER`] events; an unread backlog drops
/// newer events rather than growing.
pub struct PageEvents {
    /// `Loading` before every page fetch, then `Success(page)` or `Error`
    pub pages: mpsc::Receiver<Resource<Vec<EnrichedMovie>>>,
    /// One notification per failed page fetch
    pub errors: mpsc::Receiver<ErrorCode>,
}

/// Incrementally loaded recommendation feed
///
/// Page 1 is requested as soon as the controller exists. Each accepted
/// [`fetch_more`](Self::fetch_more) advances the cursor by one and appends the
/// enriched page to `items`, which is never cleared. While a page is loading,
/// further `fetch_more` calls are dropped.
pub struct PaginationController {
    repository: Arc<dyn MovieRepository>,
    cursor: watch::Sender<u32>,
    loading: Arc<watch::Sender<bool>>,
    items: Arc<watch::Sender<Vec<EnrichedMovie>>>,
    driver: JoinHandle<()>,
}

struct PageOutputs {
    loading: Arc<watch::Sender<bool>>,
    items: Arc<watch::Sender<Vec<EnrichedMovie>>>,
    pages: mpsc::Sender<Resource<Vec<EnrichedMovie>>>,
    errors: mpsc::Sender<ErrorCode>,
}

impl PaginationController {
    pub const FIRST_PAGE: u32 = 1;

    pub fn new(repository: Arc<dyn MovieRepository>) -> (Self, PageEvents) {
        let (cursor, cursor_rx) = watch::channel(Self::FIRST_PAGE);
        let (loading, _) = watch::channel(true);
        let loading = Arc::new(loading);
        let (items, _) = watch::channel(Vec::new());
        let items = Arc::new(items);
        let (pages_tx, pages_rx) = mpsc::channel(EVENT_BUFFER);
        let (errors_tx, errors_rx) = mpsc::channel(EVENT_BUFFER);

        let outputs = PageOutputs {
            loading: Arc::clone(&loading),
            items: Arc::clone(&items),
            pages: pages_tx,
            errors: errors_tx,
        };
        let driver = tokio::spawn(Self::page_loop(Arc::clone(&repository), cursor_rx, outputs));

        let controller = Self {
            repository,
            cursor,
            loading,
            items,
            driver,
        };
        let events = PageEvents {
            pages: pages_rx,
            errors: errors_rx,
        };

        (controller, events)
    }

    /// Requests the next page unless one is already loading
    pub fn fetch_more(&self) {
        let accepted = self.loading.send_if_modified(|loading| {
            if *loading {
                false
            } else {
                *loading = true;
                true
            }
        });

        if !accepted {
            tracing::debug!(page = self.current_page(), "Page already loading, fetch dropped");
            return;
        }

        self.cursor.send_modify(|page| *page += 1);
    }

    pub fn current_page(&self) -> u32 {
        *self.cursor.borrow()
    }

    pub fn is_loading(&self) -> bool {
        *self.loading.borrow()
    }

    pub fn loading(&self) -> watch::Receiver<bool> {
        self.loading.subscribe()
    }

    /// Every movie loaded so far, in page order
    pub fn items(&self) -> watch::Receiver<Vec<EnrichedMovie>> {
        self.items.subscribe()
    }

    pub fn favorites(&self) -> watch::Receiver<Vec<FavoriteRecord>> {
        self.repository.favorite_movies()
    }

    /// Stops the page loop, dropping any page in flight
    pub async fn shutdown(self) {
        let Self { cursor, driver, .. } = self;
        drop(cursor);
        if let Err(e) = driver.await {
            tracing::error!(error = %e, "Page loop ended abnormally");
        }
    }

    async fn page_loop(
        repository: Arc<dyn MovieRepository>,
        mut cursor_rx: watch::Receiver<u32>,
        outputs: PageOutputs,
    ) {
        // The first page is due immediately, later ones wait for the cursor
        let mut due = true;

        loop {
            if !due && cursor_rx.changed().await.is_err() {
                break;
            }
            due = false;

            let page = *cursor_rx.borrow_and_update();
            outputs.loading.send_replace(true);
            emit(&outputs.pages, Resource::Loading, "pages");

            tokio::select! {
                changed = cursor_rx.changed() => {
                    if changed.is_err() {
                        return;
                    }
                    tracing::debug!(page = page, "Page fetch superseded by newer cursor");
                    due = true;
                }
                resource = repository.recommended_movies(page) => {
                    Self::apply(page, resource, &outputs);
                }
            }
        }

        tracing::debug!("Page loop stopped");
    }

    fn apply(page: u32, resource: Resource<Vec<EnrichedMovie>>, outputs: &PageOutputs) {
        match resource {
            Resource::Success(movies) => {
                tracing::debug!(page = page, results = movies.len(), "Page appended");
                outputs
                    .items
                    .send_modify(|items| items.extend(movies.iter().cloned()));
                outputs.loading.send_replace(false);
                emit(&outputs.pages, Resource::Success(movies), "pages");
            }
            Resource::Error(code) => {
                tracing::warn!(page = page, "Page fetch failed");
                outputs.loading.send_replace(false);
                emit(&outputs.pages, Resource::Error(code), "pages");
                emit(&outputs.errors, code, "page_errors");
            }
            Resource::Loading => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controllers::testing::{record, FakeRepository};
    use std::time::Duration;

    const PAGE_DELAY: Duration = Duration::from_millis(100);

    async fn advance(millis: u64) {
        tokio::time::sleep(Duration::from_millis(millis)).await;
    }

    fn item_ids(controller: &PaginationController) -> Vec<i64> {
        controller.items().borrow().iter().map(|movie| movie.id).collect()
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_page_loads_on_creation() {
        let repository = Arc::new(FakeRepository::new(PAGE_DELAY));
        let (controller, _events) = PaginationController::new(repository.clone());

        assert!(controller.is_loading());
        advance(500).await;

        assert_eq!(repository.pages(), vec![1]);
        assert_eq!(item_ids(&controller), vec![11, 12]);
        assert_eq!(controller.current_page(), 1);
        assert!(!controller.is_loading());
    }

    #[tokio::test(start_paused = true)]
    async fn test_fetch_more_appends_next_page() {
        let repository = Arc::new(FakeRepository::new(PAGE_DELAY));
        let (controller, _events) = PaginationController::new(repository.clone());
        advance(500).await;

        controller.fetch_more();
        advance(500).await;
        controller.fetch_more();
        advance(500).await;

        assert_eq!(repository.pages(), vec![1, 2, 3]);
        assert_eq!(item_ids(&controller), vec![11, 12, 21, 22, 31, 32]);
        assert_eq!(controller.current_page(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rapid_fetch_more_fetches_once() {
        let repository = Arc::new(FakeRepository::new(PAGE_DELAY));
        let (controller, _events) = PaginationController::new(repository.clone());
        advance(500).await;

        controller.fetch_more();
        controller.fetch_more();
        advance(500).await;

        assert_eq!(repository.pages(), vec![1, 2]);
        assert_eq!(controller.current_page(), 2);
        assert_eq!(item_ids(&controller), vec![11, 12, 21, 22]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fetch_more_dropped_while_first_page_loads() {
        let repository = Arc::new(FakeRepository::new(PAGE_DELAY));
        let (controller, _events) = PaginationController::new(repository.clone());

        controller.fetch_more();
        advance(500).await;

        assert_eq!(repository.pages(), vec![1]);
        assert_eq!(controller.current_page(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_page_events_and_error_notification() {
        let repository = Arc::new(FakeRepository::new(PAGE_DELAY).failing_page(2));
        let (controller, mut events) = PaginationController::new(repository.clone());
        advance(500).await;

        controller.fetch_more();
        advance(500).await;

        assert_eq!(events.pages.recv().await, Some(Resource::Loading));
        assert!(matches!(events.pages.recv().await, Some(Resource::Success(page)) if page.len() == 2));
        assert_eq!(events.pages.recv().await, Some(Resource::Loading));
        assert_eq!(
            events.pages.recv().await,
            Some(Resource::Error(ErrorCode::General))
        );

        assert_eq!(events.errors.recv().await, Some(ErrorCode::General));
        assert!(events.errors.try_recv().is_err());
        assert!(!controller.is_loading());
        assert_eq!(item_ids(&controller), vec![11, 12]);

        // Failed pages are not retried; the cursor keeps moving forward
        controller.fetch_more();
        advance(500).await;
        assert_eq!(repository.pages(), vec![1, 2, 3]);
        assert_eq!(item_ids(&controller), vec![11, 12, 31, 32]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_advanced_cursor_discards_stale_page() {
        let repository: Arc<FakeRepository> = Arc::new(FakeRepository::new(PAGE_DELAY));
        let (cursor, cursor_rx) = watch::channel(1u32);
        let (loading, _) = watch::channel(true);
        let (items, items_rx) = watch::channel(Vec::new());
        let (pages_tx, _pages_rx) = mpsc::channel(EVENT_BUFFER);
        let (errors_tx, _errors_rx) = mpsc::channel(EVENT_BUFFER);

        let outputs = PageOutputs {
            loading: Arc::new(loading),
            items: Arc::new(items),
            pages: pages_tx,
            errors: errors_tx,
        };
        let driver = tokio::spawn(PaginationController::page_loop(
            repository.clone(),
            cursor_rx,
            outputs,
        ));

        advance(500).await;
        cursor.send_replace(2);
        advance(50).await;
        // Page 2 is still in flight when the cursor moves on
        cursor.send_replace(3);
        advance(500).await;

        let ids: Vec<i64> = items_rx.borrow().iter().map(|movie| movie.id).collect();
        assert_eq!(ids, vec![11, 12, 31, 32]);
        assert_eq!(repository.pages(), vec![1, 2, 3]);

        drop(cursor);
        driver.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_unread_page_events_stay_bounded() {
        let repository = Arc::new(FakeRepository::new(PAGE_DELAY));
        let (controller, mut events) = PaginationController::new(repository.clone());
        advance(500).await;

        for _ in 0..100 {
            controller.fetch_more();
            advance(500).await;
        }

        // The feed keeps growing even though nobody reads the events
        assert_eq!(controller.current_page(), 101);
        assert_eq!(controller.items().borrow().len(), 202);

        let mut queued = 0;
        while events.pages.try_recv().is_ok() {
            queued += 1;
        }
        assert_eq!(queued, EVENT_BUFFER);
    }

    #[tokio::test(start_paused = true)]
    async fn test_favorites_pass_through() {
        let repository = Arc::new(FakeRepository::new(PAGE_DELAY));
        let (controller, _events) = PaginationController::new(repository.clone());

        let mut favorites = controller.favorites();
        repository.set_favorites(vec![record(603, "The Matrix")]);
        favorites.changed().await.unwrap();

        assert_eq!(favorites.borrow()[0].title, "The Matrix");
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_drops_page_in_flight() {
        let repository = Arc::new(FakeRepository::new(PAGE_DELAY));
        let (controller, _events) = PaginationController::new(repository.clone());
        let items = controller.items();

        advance(10).await;
        controller.shutdown().await;
        advance(500).await;

        assert!(items.borrow().is_empty());
    }
}
