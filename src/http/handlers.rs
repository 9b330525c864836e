use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::{header, HeaderMap};
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use super::error::{HttpError, HttpResult};
use super::state::AppState;
use crate::controller::{ClientInfo, DownloadBody, DownloadGrant, DownloadRequest};
use crate::domain::{Order, Product, ProductCreate};
use crate::product_actor::ProductError;
use crate::purchases::{NewOrder, PurchaseLookup, PurchaseVerification, VerifyPurchase};

/// `{ "success": true, ..payload }`
#[derive(Serialize)]
pub(crate) struct Success<T> {
    success: bool,
    #[serde(flatten)]
    payload: T,
}

impl<T> Success<T> {
    fn new(payload: T) -> Json<Self> {
        Json(Self { success: true, payload })
    }
}

fn header_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Requester address from proxy headers, first hop first.
fn client_info(headers: &HeaderMap) -> ClientInfo {
    let defaults = ClientInfo::default();
    let ip_address = header_value(headers, "x-forwarded-for")
        .and_then(|chain| chain.split(',').next().map(|ip| ip.trim().to_string()))
        .filter(|ip| !ip.is_empty())
        .or_else(|| header_value(headers, "x-real-ip"))
        .unwrap_or(defaults.ip_address);
    let user_agent = header_value(headers, header::USER_AGENT.as_str()).unwrap_or(defaults.user_agent);
    ClientInfo { ip_address, user_agent }
}

#[instrument(skip_all)]
pub(crate) async fn request_download(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Json<DownloadBody>, JsonRejection>,
) -> HttpResult<Json<Success<DownloadGrant>>> {
    let Json(body) = body.map_err(HttpError::invalid_body)?;
    let request = DownloadRequest::try_from(body)?;
    let grant = state
        .controller
        .request_download(request, client_info(&headers))
        .await?;
    Ok(Success::new(grant))
}

#[derive(Debug, Deserialize)]
pub(crate) struct RetrievalQuery {
    key: String,
    expires: i64,
    sig: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RetrievalAccepted {
    storage_key: String,
}

/// Checks a signed retrieval URL. Byte delivery is left to the object store
/// fronting this endpoint.
#[instrument(skip(state))]
pub(crate) async fn retrieve_file(
    State(state): State<AppState>,
    query: Result<Query<RetrievalQuery>, QueryRejection>,
) -> HttpResult<Json<Success<RetrievalAccepted>>> {
    let Query(query) = query.map_err(HttpError::invalid_query)?;
    state
        .url_signer
        .verify(&query.key, query.expires, &query.sig, state.clock.now())?;
    Ok(Success::new(RetrievalAccepted { storage_key: query.key }))
}

#[instrument(skip_all)]
pub(crate) async fn verify_purchase(
    State(state): State<AppState>,
    body: Result<Json<VerifyPurchase>, JsonRejection>,
) -> HttpResult<Json<Success<PurchaseVerification>>> {
    let Json(purchase) = body.map_err(HttpError::invalid_body)?;
    let verification = state.purchases.verify_purchase(purchase).await?;
    Ok(Success::new(verification))
}

#[derive(Debug, Deserialize)]
pub(crate) struct LookupQuery {
    #[serde(default)]
    tx: Option<String>,
}

#[instrument(skip(state))]
pub(crate) async fn lookup_purchase(
    State(state): State<AppState>,
    Query(query): Query<LookupQuery>,
) -> HttpResult<Json<Success<PurchaseLookup>>> {
    let lookup = state
        .purchases
        .lookup_purchase(query.tx.as_deref().unwrap_or_default())
        .await?;
    Ok(Success::new(lookup))
}

#[derive(Debug, Deserialize)]
pub(crate) struct OrdersQuery {
    #[serde(default)]
    buyer: Option<String>,
    #[serde(default)]
    status: Option<String>,
}

#[derive(Serialize)]
pub(crate) struct OrderBody {
    order: Order,
}

#[instrument(skip_all)]
pub(crate) async fn create_order(
    State(state): State<AppState>,
    body: Result<Json<NewOrder>, JsonRejection>,
) -> HttpResult<Json<Success<OrderBody>>> {
    let Json(order) = body.map_err(HttpError::invalid_body)?;
    let order = state.purchases.create_order(order).await?;
    Ok(Success::new(OrderBody { order }))
}

#[derive(Serialize)]
pub(crate) struct OrderList {
    orders: Vec<Order>,
}

#[instrument(skip(state))]
pub(crate) async fn list_orders(
    State(state): State<AppState>,
    Query(query): Query<OrdersQuery>,
) -> HttpResult<Json<Success<OrderList>>> {
    let orders = state.purchases.list_orders(query.buyer, query.status).await?;
    Ok(Success::new(OrderList { orders }))
}

#[derive(Serialize)]
pub(crate) struct ProductBody {
    product: Product,
}

#[instrument(skip_all)]
pub(crate) async fn register_product(
    State(state): State<AppState>,
    body: Result<Json<ProductCreate>, JsonRejection>,
) -> HttpResult<Json<Success<ProductBody>>> {
    let Json(params) = body.map_err(HttpError::invalid_body)?;
    let product = state.products.register_product(params).await?;
    Ok(Success::new(ProductBody { product }))
}

#[instrument(skip(state))]
pub(crate) async fn get_product(
    State(state): State<AppState>,
    Path(product_id): Path<String>,
) -> HttpResult<Json<Success<ProductBody>>> {
    let product = state
        .products
        .get_product(product_id.clone())
        .await?
        .ok_or(ProductError::NotFound(product_id))?;
    Ok(Success::new(ProductBody { product }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn forwarded_for_takes_first_hop() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_static("203.0.113.7, 10.0.0.1"));
        headers.insert("x-real-ip", HeaderValue::from_static("10.0.0.9"));
        headers.insert(header::USER_AGENT, HeaderValue::from_static("wget/1.21"));
        let info = client_info(&headers);
        assert_eq!(info.ip_address, "203.0.113.7");
        assert_eq!(info.user_agent, "wget/1.21");
    }

    #[test]
    fn missing_headers_are_unknown() {
        let mut headers = HeaderMap::new();
        headers.insert("x-real-ip", HeaderValue::from_static("10.0.0.9"));
        let info = client_info(&headers);
        assert_eq!(info.ip_address, "10.0.0.9");
        assert_eq!(info.user_agent, "unknown");
        assert_eq!(client_info(&HeaderMap::new()), ClientInfo::default());
    }
}
