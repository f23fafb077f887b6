use crate::error::{FetchError, RemoteQueryError};
use log::debug;
use std::future::Future;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub limit: u64,
    pub key: Option<String>,
}

impl PageRequest {
    pub fn first(limit: u64) -> Self {
        Self { limit, key: None }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub records: Vec<T>,
    pub next_key: Option<String>,
}

impl<T> Page<T> {
    pub fn new(records: Vec<T>, next_key: Option<String>) -> Self {
        // An empty continuation token means the same as none.
        let next_key = next_key.filter(|key| !key.is_empty());
        Self { records, next_key }
    }

    pub fn last(records: Vec<T>) -> Self {
        Self::new(records, None)
    }
}

/// Follows continuation tokens from the first page until the service stops
/// returning one, concatenating records in page order.
///
/// A failed page ends the walk; the error carries what was fetched so far.
pub async fn fetch_all_pages<T, F, Fut>(limit: u64, mut fetch_page: F) -> Result<Vec<T>, FetchError<T>>
where
    F: FnMut(PageRequest) -> Fut,
    Fut: Future<Output = Result<Page<T>, RemoteQueryError>>,
{
    let mut records = Vec::new();
    let mut request = PageRequest::first(limit);
    let mut page_number = 1;

    loop {
        let page = match fetch_page(request.clone()).await {
            Ok(page) => page,
            Err(e) => return Err(FetchError::new(records, e)),
        };

        debug!(
            "Page {} returned {} records, more pages: {}",
            page_number,
            page.records.len(),
            page.next_key.is_some()
        );
        records.extend(page.records);

        match page.next_key {
            Some(key) => {
                request.key = Some(key);
                page_number += 1;
            }
            None => break,
        }
    }

    Ok(records)
}
