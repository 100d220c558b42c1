//! Collection traversal and single-resource reads.

use std::collections::HashSet;

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::envelope::{Detail, Page};
use crate::error::{ApiError, ApiResult};
use crate::source::DataSource;

/// Walk a link-following collection to completion.
///
/// `params` are sent with the first request only; every later request uses
/// the server's `next` href verbatim. A failed page (transport error,
/// non-2xx, undecodable body) or a `next` link back to a page already
/// fetched ends the walk and the items gathered so far are returned.
pub async fn fetch_all<S>(source: &S, url: &str, params: &[(String, String)]) -> Vec<Value>
where
    S: DataSource + ?Sized,
{
    let mut items = Vec::new();
    let mut next = Some(url.to_string());
    let mut visited = HashSet::new();
    let mut first = true;
    let mut pages = 0usize;

    while let Some(endpoint) = next.take() {
        if !visited.insert(endpoint.clone()) {
            warn!(url = %endpoint, "Next link points at a page already fetched, stopping");
            break;
        }
        let page_params: &[(String, String)] = if first { params } else { &[] };
        first = false;

        let body = match source.get_json(&endpoint, page_params).await {
            Ok(Some(body)) => body,
            Ok(None) => {
                warn!(url = %endpoint, "Collection page not found, stopping");
                break;
            }
            Err(e) => {
                warn!(url = %endpoint, error = %e, "Failed to fetch collection page, stopping");
                break;
            }
        };

        let page: Page = match serde_json::from_value(body) {
            Ok(page) => page,
            Err(e) => {
                warn!(url = %endpoint, error = %e, "Malformed collection page, stopping");
                break;
            }
        };

        pages += 1;
        next = page.next_href().map(str::to_string);
        debug!(url = %endpoint, count = page.dados.len(), "Fetched page");
        items.extend(page.dados);
    }

    info!(url, pages, items = items.len(), "Collection fetched");
    items
}

/// Read the `dados` object of a single resource. `Ok(None)` on 404.
pub async fn fetch_detail<S>(source: &S, url: &str) -> ApiResult<Option<Value>>
where
    S: DataSource + ?Sized,
{
    let Some(body) = source.get_json(url, &[]).await? else {
        return Ok(None);
    };
    let detail: Detail = serde_json::from_value(body).map_err(|e| ApiError::decode(url, e))?;
    Ok(Some(detail.dados))
}

/// Read the `dados` list of a single-page sub-resource. `Ok(None)` on 404.
pub async fn fetch_list<S>(source: &S, url: &str) -> ApiResult<Option<Vec<Value>>>
where
    S: DataSource + ?Sized,
{
    let Some(body) = source.get_json(url, &[]).await? else {
        return Ok(None);
    };
    let page: Page = serde_json::from_value(body).map_err(|e| ApiError::decode(url, e))?;
    Ok(Some(page.dados))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::static_source::StaticSource;
    use serde_json::json;

    const BASE: &str = "https://api.test/v2/orgaos";

    fn page_url(n: usize) -> String {
        format!("{BASE}?pagina={n}&itens=2")
    }

    /// `total` items split into pages of two, linked by `next`.
    fn paginated_source(total: usize) -> StaticSource {
        let source = StaticSource::new();
        let pages = total.div_ceil(2).max(1);
        for p in 0..pages {
            let items: Vec<Value> = (p * 2..((p + 1) * 2).min(total))
                .map(|i| json!({"id": i}))
                .collect();
            let mut links = vec![json!({"rel": "self", "href": page_url(p + 1)})];
            if p + 1 < pages {
                links.push(json!({"rel": "next", "href": page_url(p + 2)}));
            }
            let url = if p == 0 { BASE.to_string() } else { page_url(p + 1) };
            source.respond(url, json!({"dados": items, "links": links}));
        }
        source
    }

    fn ids(items: &[Value]) -> Vec<i64> {
        items.iter().filter_map(|v| v["id"].as_i64()).collect()
    }

    #[tokio::test]
    async fn test_collects_every_page_in_order() {
        for total in [0, 1, 2, 5, 8] {
            let source = paginated_source(total);
            let items = fetch_all(&source, BASE, &[]).await;
            assert_eq!(ids(&items), (0..total as i64).collect::<Vec<_>>());
        }
    }

    #[tokio::test]
    async fn test_params_only_on_first_request() {
        let source = paginated_source(5);
        let params = vec![("itens".to_string(), "2".to_string())];
        fetch_all(&source, BASE, &params).await;

        let requests = source.requests();
        assert_eq!(requests.len(), 3);
        assert_eq!(requests[0].1, params);
        assert!(requests[1..].iter().all(|(_, p)| p.is_empty()));
        assert_eq!(requests[1].0, page_url(2));
    }

    #[tokio::test]
    async fn test_failed_page_returns_partial() {
        let source = paginated_source(6);
        source.fail(page_url(2), 503);

        let items = fetch_all(&source, BASE, &[]).await;
        assert_eq!(ids(&items), vec![0, 1]);
    }

    #[tokio::test]
    async fn test_cyclic_next_link_stops() {
        let source = StaticSource::new();
        source
            .respond(
                BASE,
                json!({"dados": [{"id": 0}], "links": [{"rel": "next", "href": page_url(2)}]}),
            )
            .respond(
                page_url(2),
                json!({"dados": [{"id": 1}], "links": [{"rel": "next", "href": BASE}]}),
            );

        let items = fetch_all(&source, BASE, &[]).await;
        assert_eq!(ids(&items), vec![0, 1]);
        assert_eq!(source.requests().len(), 2);
    }

    #[tokio::test]
    async fn test_self_referencing_next_link_stops() {
        let source = StaticSource::new();
        source.respond(
            BASE,
            json!({"dados": [{"id": 0}], "links": [{"rel": "next", "href": BASE}]}),
        );

        let items = fetch_all(&source, BASE, &[]).await;
        assert_eq!(ids(&items), vec![0]);
        assert_eq!(source.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_failed_first_page_is_empty() {
        let source = StaticSource::new();
        source.fail(BASE, 500);
        assert!(fetch_all(&source, BASE, &[]).await.is_empty());
    }

    #[tokio::test]
    async fn test_detail_not_found() {
        let source = StaticSource::new();
        let detail = fetch_detail(&source, "https://api.test/v2/votacoes/1").await.unwrap();
        assert!(detail.is_none());
    }

    #[tokio::test]
    async fn test_detail_and_list() {
        let source = StaticSource::new();
        source
            .respond("https://api.test/v2/votacoes/1", json!({"dados": {"id": "1"}}))
            .respond("https://api.test/v2/votacoes/1/votos", json!({"dados": [{"x": 1}], "links": []}));

        let detail = fetch_detail(&source, "https://api.test/v2/votacoes/1").await.unwrap();
        assert_eq!(detail, Some(json!({"id": "1"})));

        let votes = fetch_list(&source, "https://api.test/v2/votacoes/1/votos").await.unwrap();
        assert_eq!(votes.map(|v| v.len()), Some(1));
    }

    #[tokio::test]
    async fn test_detail_server_error() {
        let source = StaticSource::new();
        source.fail("https://api.test/v2/votacoes/9", 500);
        let err = fetch_detail(&source, "https://api.test/v2/votacoes/9").await.unwrap_err();
        assert!(matches!(err, ApiError::Status { status: 500, .. }));
    }
}
