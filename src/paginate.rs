use anyhow::Result;
use std::future::Future;

/// One page of a continuation-token listing.
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub next_token: Option<String>,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, next_token: Option<String>) -> Self {
        Self { items, next_token }
    }
}

/// Fetch every page sequentially and concatenate the items in order.
/// `fetch` gets `None` for the first page, then each page's token until a page
/// comes back without one (or with an empty one).
pub async fn collect_pages<T, F, Fut>(mut fetch: F) -> Result<Vec<T>>
where
    F: FnMut(Option<String>) -> Fut,
    Fut: Future<Output = Result<Page<T>>>,
{
    let mut all = Vec::new();
    let mut token: Option<String> = None;

    loop {
        let page = fetch(token.take()).await?;
        all.extend(page.items);
        match page.next_token {
            Some(next) if !next.is_empty() => token = Some(next),
            _ => break,
        }
    }

    Ok(all)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[tokio::test]
    async fn test_three_pages_are_concatenated() {
        let seen = RefCell::new(Vec::new());
        let items = collect_pages(|token| {
            seen.borrow_mut().push(token.clone());
            async move {
                Ok(match token.as_deref() {
                    None => Page::new(vec![1, 2], Some("p2".to_string())),
                    Some("p2") => Page::new(vec![3], Some("p3".to_string())),
                    Some("p3") => Page::new(vec![4, 5], None),
                    Some(other) => anyhow::bail!("unexpected token {}", other),
                })
            }
        })
        .await
        .unwrap();

        assert_eq!(items, vec![1, 2, 3, 4, 5]);
        assert_eq!(
            *seen.borrow(),
            vec![None, Some("p2".to_string()), Some("p3".to_string())]
        );
    }

    #[tokio::test]
    async fn test_empty_token_ends_listing() {
        let items = collect_pages(|_| async { Ok(Page::new(vec!["only"], Some(String::new()))) })
            .await
            .unwrap();
        assert_eq!(items, vec!["only"]);
    }

    #[tokio::test]
    async fn test_page_error_propagates() {
        let result: Result<Vec<u8>> = collect_pages(|token| async move {
            match token {
                None => Ok(Page::new(vec![1], Some("next".to_string()))),
                Some(_) => anyhow::bail!("quota exceeded"),
            }
        })
        .await;
        assert!(result.unwrap_err().to_string().contains("quota exceeded"));
    }
}
