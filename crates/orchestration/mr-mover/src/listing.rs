//! Paginated listing over any [`ObjectStore`].

use async_stream::try_stream;
use futures::Stream;
use mr_error::StoreError;
use mr_traits::{ListPage, ObjectStore};

use crate::retry::{RetryConfig, with_retry};

/// List every page under `prefix`, following continuation tokens.
///
/// Each page request is retried on transient errors. The stream ends after
/// the first page without a continuation token, or after the first error.
///
/// # Example
///
/// ```ignore
/// use futures::{StreamExt, pin_mut};
///
/// let pages = list_pages(&store, "USTR/", &RetryConfig::default());
/// pin_mut!(pages);
///
/// while let Some(page) = pages.next().await {
///     for obj in page?.objects {
///         println!("{}", obj.key);
///     }
/// }
/// ```
pub fn list_pages<'a, S>(
    store: &'a S,
    prefix: &'a str,
    retry: &'a RetryConfig,
) -> impl Stream<Item = Result<ListPage, StoreError>> + 'a
where
    S: ObjectStore + ?Sized,
{
    try_stream! {
        let mut continuation_token: Option<String> = None;

        loop {
            let token = continuation_token.take();
            let page = with_retry(retry, "list", || store.list_page(prefix, token.as_deref())).await?;
            let next = page.next_token.clone();

            yield page;

            match next {
                Some(token) => continuation_token = Some(token),
                None => break,
            }
        }
    }
}
