//! Streamed prefix enumeration.

use futures::stream::{self, Stream};

use crate::traits::{BlobStore, StorageError};

/// Stream the keys under `prefix` one page at a time.
///
/// Pages are fetched lazily, so a consumer that removes each page before pulling the
/// next one never holds more than `page_size` keys in memory.
pub fn list_pages<'a>(
    store: &'a dyn BlobStore,
    prefix: &'a str,
    page_size: usize,
) -> impl Stream<Item = Result<Vec<String>, StorageError>> + Send + 'a {
    // `Some(token)` means another page must be fetched; `None` ends the stream.
    stream::try_unfold(Some(None::<String>), move |state| async move {
        let Some(token) = state else {
            return Ok::<_, StorageError>(None);
        };
        let page = store.list_objects_page(prefix, token, page_size).await?;
        let next = page.next_continuation_token.map(Some);
        Ok(Some((page.keys, next)))
    })
}
