//! Lazy page sequence over a tenant listing.

use std::sync::Arc;

use crate::registry::error::StoreResult;
use crate::registry::store::RegistryStore;
use crate::registry::types::{DeviceRecord, PageToken};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Cursor {
    Start,
    After(PageToken),
    Done,
}

/// Walks a tenant's records one page at a time.
///
/// Nothing is fetched until [`Pager::next_page`] is called. Each call is an
/// independent snapshot, so concurrent writers may shift later pages but
/// never corrupt the cursor. [`Pager::restart`] rewinds to the first page.
pub struct Pager {
    store: Arc<dyn RegistryStore>,
    tenant: String,
    page_size: usize,
    cursor: Cursor,
}

impl Pager {
    pub fn new(store: Arc<dyn RegistryStore>, tenant: impl Into<String>, page_size: usize) -> Self {
        Self {
            store,
            tenant: tenant.into(),
            page_size,
            cursor: Cursor::Start,
        }
    }

    /// Resume from a token handed out by an earlier listing.
    pub fn resume(mut self, token: PageToken) -> Self {
        self.cursor = Cursor::After(token);
        self
    }

    /// Fetch the next page, or `None` once the listing is exhausted.
    pub async fn next_page(&mut self) -> StoreResult<Option<Vec<DeviceRecord>>> {
        let token = match &self.cursor {
            Cursor::Done => return Ok(None),
            Cursor::Start => None,
            Cursor::After(token) => Some(token),
        };

        let page = self.store.list(&self.tenant, token, self.page_size).await?;
        self.cursor = match page.next_page_token {
            Some(next) => Cursor::After(next),
            None => Cursor::Done,
        };

        if page.records.is_empty() {
            return Ok(None);
        }
        Ok(Some(page.records))
    }

    /// Drain every remaining page into one vector.
    pub async fn collect_all(&mut self) -> StoreResult<Vec<DeviceRecord>> {
        let mut all = Vec::new();
        while let Some(records) = self.next_page().await? {
            all.extend(records);
        }
        Ok(all)
    }

    /// Rewind to the first page.
    pub fn restart(&mut self) {
        self.cursor = Cursor::Start;
    }

    /// Token for the next page, if one is pending.
    pub fn token(&self) -> Option<&PageToken> {
        match &self.cursor {
            Cursor::After(token) => Some(token),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::MemoryStore;

    async fn seeded(count: usize) -> Arc<dyn RegistryStore> {
        let store = MemoryStore::new();
        for i in 0..count {
            store
                .create(DeviceRecord::new("acme", format!("dev-{:02}", i)))
                .await
                .unwrap();
        }
        Arc::new(store)
    }

    #[tokio::test]
    async fn test_pager_walks_all_pages() {
        let store = seeded(7).await;
        let mut pager = Pager::new(store, "acme", 3);

        let sizes = [3, 3, 1];
        for expected in sizes {
            let page = pager.next_page().await.unwrap().unwrap();
            assert_eq!(page.len(), expected);
        }
        assert!(pager.next_page().await.unwrap().is_none());
        assert!(pager.next_page().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_pager_restart_is_deterministic() {
        let store = seeded(5).await;
        let mut pager = Pager::new(store, "acme", 2);

        let first_pass = pager.collect_all().await.unwrap();
        pager.restart();
        let second_pass = pager.collect_all().await.unwrap();

        assert_eq!(first_pass.len(), 5);
        assert_eq!(first_pass, second_pass);
        assert!(first_pass.windows(2).all(|w| w[0].name < w[1].name));
    }

    #[tokio::test]
    async fn test_pager_resume_from_token() {
        let store = seeded(4).await;
        let mut pager = Pager::new(store.clone(), "acme", 2);
        pager.next_page().await.unwrap();
        let token = pager.token().cloned().unwrap();

        let mut resumed = Pager::new(store, "acme", 2).resume(token);
        let page = resumed.next_page().await.unwrap().unwrap();
        assert_eq!(page[0].name, "dev-02");
    }

    #[tokio::test]
    async fn test_pager_empty_tenant() {
        let store = seeded(0).await;
        let mut pager = Pager::new(store, "acme", 10);
        assert!(pager.next_page().await.unwrap().is_none());
    }
}
