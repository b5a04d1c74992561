use crate::cancel::{run_cancellable, CancellationState};
use crate::r#trait::StreamingClient;
use crate::types::{AccessToken, Track, TrackPage, VibeSyncError, DEFAULT_MAX_PAGES};
use crate::Result;

use async_trait::async_trait;
use std::collections::{HashSet, VecDeque};

/// Item-at-a-time access to a paginated listing.
///
/// Implementors only provide [`next`](Self::next); pages are fetched lazily
/// behind it.
#[cfg_attr(feature = "mock", mockall::automock)]
#[async_trait(?Send)]
pub trait AsyncPaginatedIterator<T> {
    /// The next item, or `Ok(None)` once the listing is exhausted.
    async fn next(&mut self) -> Result<Option<T>>;

    /// Drain the iterator.
    ///
    /// All or nothing: an error on any page drops what was gathered.
    async fn collect_all(&mut self) -> Result<Vec<T>> {
        let mut all = Vec::new();
        while let Some(item) = self.next().await? {
            all.push(item);
        }
        Ok(all)
    }

    /// At most `n` items; fewer if the listing ends first.
    async fn take(&mut self, n: usize) -> Result<Vec<T>> {
        let mut taken = Vec::new();
        while taken.len() < n {
            let Some(item) = self.next().await? else {
                break;
            };
            taken.push(item);
        }
        Ok(taken)
    }

    /// Pages fetched so far.
    fn current_page(&self) -> u32;

    /// Page count, once the provider has reported enough to derive it.
    fn total_pages(&self) -> Option<u32> {
        None
    }
}

/// Walks a playlist's track listing by following the provider's `next` cursor.
///
/// Pages are requested strictly one after another. The walk stops when a
/// page carries no `next` locator, and fails if it would exceed `max_pages`,
/// if a cursor points back at a page already visited, or if cancellation is
/// requested. A failed walk stays failed: every later call returns the same
/// error.
pub struct PlaylistTracksIterator<'a, C: StreamingClient + ?Sized> {
    client: &'a C,
    token: AccessToken,
    next_url: Option<String>,
    visited: HashSet<String>,
    pages_fetched: u32,
    max_pages: u32,
    pending: VecDeque<Track>,
    page_count: Option<u32>,
    cancel: Option<CancellationState>,
    failed: Option<VibeSyncError>,
}

#[async_trait(?Send)]
impl<C: StreamingClient + ?Sized> AsyncPaginatedIterator<Track> for PlaylistTracksIterator<'_, C> {
    async fn next(&mut self) -> Result<Option<Track>> {
        loop {
            if let Some(track) = self.pending.pop_front() {
                return Ok(Some(track));
            }
            let Some(page) = self.next_page().await? else {
                return Ok(None);
            };
            self.pending.extend(page.tracks);
        }
    }

    fn current_page(&self) -> u32 {
        self.pages_fetched
    }

    fn total_pages(&self) -> Option<u32> {
        self.page_count
    }
}

impl<'a, C: StreamingClient + ?Sized> PlaylistTracksIterator<'a, C> {
    /// Start a walk at `first_page_url`.
    pub fn new(client: &'a C, token: AccessToken, first_page_url: impl Into<String>) -> Self {
        Self {
            client,
            token,
            next_url: Some(first_page_url.into()),
            visited: HashSet::new(),
            pages_fetched: 0,
            max_pages: DEFAULT_MAX_PAGES,
            pending: VecDeque::new(),
            page_count: None,
            cancel: None,
            failed: None,
        }
    }

    pub fn with_max_pages(mut self, max_pages: u32) -> Self {
        self.max_pages = max_pages;
        self
    }

    pub fn with_cancellation(mut self, cancel: CancellationState) -> Self {
        self.cancel = Some(cancel);
        self
    }

    /// Locator of the page the next fetch will request, if any.
    pub fn next_url(&self) -> Option<&str> {
        self.next_url.as_deref()
    }

    /// Follow the cursor one step. `Ok(None)` once it is exhausted.
    pub async fn next_page(&mut self) -> Result<Option<TrackPage>> {
        if let Some(error) = &self.failed {
            return Err(error.clone());
        }

        match self.advance().await {
            Ok(page) => Ok(page),
            Err(error) => {
                self.pending.clear();
                self.next_url = None;
                self.failed = Some(error.clone());
                Err(error)
            }
        }
    }

    /// The error that ended this walk, if it failed.
    pub fn failure(&self) -> Option<&VibeSyncError> {
        self.failed.as_ref()
    }

    async fn advance(&mut self) -> Result<Option<TrackPage>> {
        let Some(url) = self.next_url.take() else {
            return Ok(None);
        };

        if self.pages_fetched >= self.max_pages {
            log::warn!(
                "Stopping track walk: {} pages fetched, ceiling is {}",
                self.pages_fetched,
                self.max_pages
            );
            return Err(VibeSyncError::PageLimitExceeded {
                max_pages: self.max_pages,
            });
        }

        if !self.visited.insert(url.clone()) {
            log::warn!("Pagination cursor repeated: {url}");
            return Err(VibeSyncError::CursorLoop { url });
        }

        let page_number = self.pages_fetched + 1;
        log::trace!("Fetching track page {page_number}: {url}");

        let request = self.client.get_tracks_page(&self.token, &url, page_number);
        let page = run_cancellable(self.cancel.as_ref(), request).await?;

        self.pages_fetched = page_number;
        self.next_url = page.next.clone();
        if let Some(count) = page.total_pages() {
            self.page_count = Some(count);
        }

        log::trace!(
            "Track page {} held {} items, more: {}",
            page_number,
            page.tracks.len(),
            page.has_next_page()
        );

        Ok(Some(page))
    }
}

/// Retrieve the complete, ordered track list starting at `first_page_url`.
///
/// The result is the concatenation of every page in cursor order. A failure
/// on any page discards everything fetched so far.
pub async fn fetch_all_tracks<C: StreamingClient + ?Sized>(
    client: &C,
    token: &AccessToken,
    first_page_url: &str,
    max_pages: u32,
    cancel: Option<&CancellationState>,
) -> Result<Vec<Track>> {
    let mut iterator =
        PlaylistTracksIterator::new(client, token.clone(), first_page_url).with_max_pages(max_pages);
    if let Some(cancel) = cancel {
        iterator = iterator.with_cancellation(cancel.clone());
    }

    let tracks = iterator.collect_all().await?;
    log::debug!(
        "Collected {} tracks over {} pages",
        tracks.len(),
        iterator.current_page()
    );
    Ok(tracks)
}
