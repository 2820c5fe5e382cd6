//! REST endpoints.
//!
//! Endpoints:
//! - GET /api/v1/status - indexed height and network
//! - GET /api/v1/coins/{id} - one coin
//! - GET /api/v1/coins?page&page_size&sorted_by&dir - paginated coin list
//! - GET /api/v1/addresses/{address} - balances of one address
//! - GET /api/v1/addresses/{address}/coins - unspent coins of one address
//!
//! Every successful response is `{"result": bool, "data": ...}`; `result`
//! is false when the looked-up entity does not exist.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use carv_core::CoinInfo;
use carv_store::CoinStore;

/// REST API error response.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Request parameters failed validation.
    #[error("{0}")]
    BadRequest(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let ApiError::BadRequest(message) = self;
        let body = serde_json::json!({ "error": message });
        (StatusCode::BAD_REQUEST, Json(body)).into_response()
    }
}

fn envelope<T: Serialize>(data: Option<T>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "result": data.is_some(),
        "data": data,
    }))
}

/// Build the full API router over a shared store.
pub fn router(store: Arc<CoinStore>) -> Router {
    Router::new()
        .route("/api/v1/status", get(get_status))
        .route("/api/v1/coins", get(list_coins))
        .route("/api/v1/coins/{id}", get(get_coin))
        .route("/api/v1/addresses/{address}", get(get_address_balances))
        .route("/api/v1/addresses/{address}/coins", get(get_address_coins))
        .with_state(store)
}

/// Indexer status.
#[derive(Debug, Serialize, Deserialize)]
pub struct StatusResponse {
    /// Last fully committed block height.
    pub height: u32,
    /// Network the indexer follows.
    pub network: String,
}

async fn get_status(State(store): State<Arc<CoinStore>>) -> Json<serde_json::Value> {
    let (height, network) = store.status();
    envelope(Some(StatusResponse { height, network }))
}

async fn get_coin(
    State(store): State<Arc<CoinStore>>,
    Path(id): Path<String>,
) -> Json<serde_json::Value> {
    envelope(store.coin_info(&id))
}

/// Query parameters for the coin listing.
#[derive(Debug, Deserialize)]
pub struct CoinsQuery {
    /// 1-based page number.
    #[serde(default = "default_page")]
    pub page: usize,
    /// Page size, 1..=100.
    #[serde(default = "default_page_size")]
    pub page_size: usize,
    /// Sort key: tx_count, created_at, or holder_count.
    #[serde(default = "default_sorted_by")]
    pub sorted_by: String,
    /// Sort direction: asc or desc.
    #[serde(default = "default_dir")]
    pub dir: String,
}

fn default_page() -> usize {
    1
}

fn default_page_size() -> usize {
    10
}

fn default_sorted_by() -> String {
    "tx_count".to_string()
}

fn default_dir() -> String {
    "desc".to_string()
}

async fn list_coins(
    State(store): State<Arc<CoinStore>>,
    Query(query): Query<CoinsQuery>,
) -> Result<Json<serde_json::Value>, ApiError> {
    if query.page < 1 {
        return Err(ApiError::BadRequest("invalid page".to_string()));
    }
    if query.page_size < 1 || query.page_size > 100 {
        return Err(ApiError::BadRequest(
            "invalid page_size, should be between 1 and 100".to_string(),
        ));
    }
    let sort: fn(&CoinInfo, &CoinInfo) -> std::cmp::Ordering = match query.sorted_by.as_str() {
        "tx_count" => |a: &CoinInfo, b: &CoinInfo| a.tx_count.cmp(&b.tx_count),
        "created_at" => |a: &CoinInfo, b: &CoinInfo| a.created_at.cmp(&b.created_at),
        "holder_count" => |a: &CoinInfo, b: &CoinInfo| a.holder_count.cmp(&b.holder_count),
        _ => {
            return Err(ApiError::BadRequest(
                "invalid sorted_by, should be tx_count, created_at or holder_count".to_string(),
            ))
        }
    };
    let descending = match query.dir.as_str() {
        "asc" => false,
        "desc" => true,
        _ => {
            return Err(ApiError::BadRequest(
                "invalid dir, should be asc or desc".to_string(),
            ))
        }
    };

    let mut coins = store.coin_infos();
    coins.sort_by(|a, b| if descending { sort(b, a) } else { sort(a, b) });

    let start = (query.page - 1) * query.page_size;
    if start >= coins.len() {
        return Ok(Json(serde_json::json!({ "result": true, "data": null })));
    }
    let end = usize::min(start + query.page_size, coins.len());
    Ok(envelope(Some(coins[start..end].to_vec())))
}

async fn get_address_balances(
    State(store): State<Arc<CoinStore>>,
    Path(address): Path<String>,
) -> Json<serde_json::Value> {
    envelope(store.balances_by_address(&address))
}

async fn get_address_coins(
    State(store): State<Arc<CoinStore>>,
    Path(address): Path<String>,
) -> Json<serde_json::Value> {
    envelope(store.coins_by_address(&address))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use carv_core::{CoinArgs, UnspentCoin};
    use tower::ServiceExt;

    fn coin(id: &str, tx_count: u64, created_at: u32, holder_count: u64) -> CoinInfo {
        CoinInfo {
            id: id.to_string(),
            total_supply: 1,
            args: CoinArgs {
                max: 100,
                sats: 10_000,
                limit: 1,
            },
            tx_count,
            holder_count,
            created_at,
            deploy_tx: String::new(),
            deploy_height: created_at,
        }
    }

    fn seeded_router() -> Router {
        let store = Arc::new(CoinStore::in_memory("testnet"));
        store
            .coin_info_batch_update(HashMap::from([
                ("AAA".to_string(), coin("AAA", 3, 10, 7)),
                ("BBB".to_string(), coin("BBB", 1, 30, 9)),
                ("CCC".to_string(), coin("CCC", 2, 20, 8)),
            ]))
            .unwrap();
        store
            .utxo_batch_update(HashMap::from([(
                "1111:0".to_string(),
                Some(UnspentCoin {
                    coin_id: "AAA".to_string(),
                    owner: "addr1".to_string(),
                    amount: 1,
                    utxo: "1111:0".to_string(),
                }),
            )]))
            .unwrap();
        store
            .balance_batch_update(HashMap::from([(
                "AAA".to_string(),
                HashMap::from([("addr1".to_string(), 1)]),
            )]))
            .unwrap();
        router(store)
    }

    async fn get_json(router: Router, uri: &str) -> (StatusCode, serde_json::Value) {
        let response = router
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_get_coin_found_and_missing() {
        let (status, body) = get_json(seeded_router(), "/api/v1/coins/AAA").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["result"], true);
        assert_eq!(body["data"]["id"], "AAA");

        let (status, body) = get_json(seeded_router(), "/api/v1/coins/NONE").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["result"], false);
        assert!(body["data"].is_null());
    }

    #[tokio::test]
    async fn test_list_coins_default_sort_is_tx_count_desc() {
        let (status, body) = get_json(seeded_router(), "/api/v1/coins").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["result"], true);
        let ids: Vec<&str> = body["data"]
            .as_array()
            .unwrap()
            .iter()
            .map(|c| c["id"].as_str().unwrap())
            .collect();
        assert_eq!(ids, vec!["AAA", "CCC", "BBB"]);
    }

    #[tokio::test]
    async fn test_list_coins_sorted_by_created_at_asc() {
        let (_, body) = get_json(
            seeded_router(),
            "/api/v1/coins?sorted_by=created_at&dir=asc",
        )
        .await;
        let ids: Vec<&str> = body["data"]
            .as_array()
            .unwrap()
            .iter()
            .map(|c| c["id"].as_str().unwrap())
            .collect();
        assert_eq!(ids, vec!["AAA", "CCC", "BBB"]);
    }

    #[tokio::test]
    async fn test_list_coins_pagination() {
        let (_, body) = get_json(seeded_router(), "/api/v1/coins?page=2&page_size=2").await;
        assert_eq!(body["result"], true);
        assert_eq!(body["data"].as_array().unwrap().len(), 1);

        let (status, body) = get_json(seeded_router(), "/api/v1/coins?page=5&page_size=10").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["result"], true);
        assert!(body["data"].is_null(), "out-of-range page returns null data");
    }

    #[tokio::test]
    async fn test_list_coins_validation_errors() {
        for uri in [
            "/api/v1/coins?page=0",
            "/api/v1/coins?page_size=0",
            "/api/v1/coins?page_size=101",
            "/api/v1/coins?sorted_by=name",
            "/api/v1/coins?dir=sideways",
        ] {
            let (status, body) = get_json(seeded_router(), uri).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
            assert!(body["error"].is_string(), "{uri}");
        }
    }

    #[tokio::test]
    async fn test_address_endpoints() {
        let (_, body) = get_json(seeded_router(), "/api/v1/addresses/addr1").await;
        assert_eq!(body["result"], true);
        assert_eq!(body["data"]["AAA"], 1);

        let (_, body) = get_json(seeded_router(), "/api/v1/addresses/unknown").await;
        assert_eq!(body["result"], false);
        assert!(body["data"].is_null());

        let (_, body) = get_json(seeded_router(), "/api/v1/addresses/addr1/coins").await;
        assert_eq!(body["result"], true);
        assert_eq!(body["data"][0]["utxo"], "1111:0");
    }

    #[tokio::test]
    async fn test_status_endpoint() {
        let (_, body) = get_json(seeded_router(), "/api/v1/status").await;
        assert_eq!(body["result"], true);
        assert_eq!(body["data"]["network"], "testnet");
        assert_eq!(body["data"]["height"], 0);
    }
}
