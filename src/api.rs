//! HTTP binding for the matching engine.
//!
//! This is the external collaborator the core spec treats as out of
//! scope, narrowed to exactly the endpoints the programmatic surface
//! implies: submit, cancel, modify, and the two book-side snapshots. The
//! shape — axum router, a `tower-http` tracing layer, a body-capturing
//! `LoggedJson` extractor that logs a bounded preview on parse failure —
//! follows the teacher's idiom; the routes and payloads are this crate's
//! own.

use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::json;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::warn;

use axum::{
    Json, Router,
    body::Bytes,
    extract::{FromRequest, Path, Request, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post, put},
};

use crate::{
    errors::ApiError,
    order::{NewOrder, OrderId, OrderIdGenerator, OrderType, Side},
    price::{Price, Quantity},
    state::AppState,
    trade::Trade,
};

/// Number of decimal places accepted in request body prices (`"101.50"`).
/// Chosen to match a two-decimal quote currency; the engine itself is
/// agnostic to scale since it only ever sees ticks.
const PRICE_SCALE: u32 = 2;

type ApiErr = (StatusCode, Json<serde_json::Value>);

fn err(status: StatusCode, msg: impl std::fmt::Display) -> ApiErr {
    (status, Json(json!({ "error": msg.to_string() })))
}

impl From<ApiError> for ApiErr {
    fn from(e: ApiError) -> Self {
        match e {
            ApiError::InvalidSide(_) | ApiError::InvalidOrderType(_) | ApiError::InvalidPrice(_) => {
                err(StatusCode::BAD_REQUEST, e)
            }
            ApiError::OrderNotFound => err(StatusCode::NOT_FOUND, e),
        }
    }
}

/// A `Json`-like extractor that logs a bounded preview of the request body
/// when it fails to deserialize, instead of silently discarding the bytes.
pub struct LoggedJson<T>(pub T);

impl<S, T> FromRequest<S> for LoggedJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = ApiErr;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let method = req.method().clone();
        let uri = req.uri().clone();
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|e| err(StatusCode::BAD_REQUEST, e))?;

        match serde_json::from_slice::<T>(&bytes) {
            Ok(val) => Ok(LoggedJson(val)),
            Err(e) => {
                let preview = String::from_utf8_lossy(&bytes);
                let preview = &preview[..preview.len().min(4096)];
                warn!(
                    error = %e,
                    %method,
                    %uri,
                    body_preview = %preview,
                    "request rejected: JSON deserialization failed"
                );
                Err(err(StatusCode::BAD_REQUEST, e))
            }
        }
    }
}

/// A single level of the book, as served by `GET /bids/` and `GET /asks/`.
#[derive(Debug, Serialize, Deserialize)]
pub struct PriceLevel {
    pub price: i64,
    pub quantity: u64,
}

fn levels(entries: &[(Price, Quantity)]) -> Vec<PriceLevel> {
    entries
        .iter()
        .map(|(p, q)| PriceLevel {
            price: p.ticks(),
            quantity: q.0,
        })
        .collect()
}

/// `POST /order/` request body. `order_id` is optional — when omitted the
/// server mints one via the shared [`OrderIdGenerator`]. `price` is a
/// decimal string (e.g. `"101.50"`), quantized to ticks via
/// [`Price::from_decimal_str`] at [`PRICE_SCALE`] — this is the boundary
/// the rest of the engine never has to see.
#[derive(Debug, Deserialize)]
pub struct OrderRequest {
    pub order_type: String,
    pub side: String,
    pub price: String,
    pub qty: u64,
    pub order_id: Option<u64>,
}

/// `PUT /order/{id}` request body: price and quantity are mandatory;
/// `order_type`/`side` are carried over from the existing order. `price`
/// is quantized the same way as [`OrderRequest::price`].
#[derive(Debug, Deserialize)]
pub struct ModifyRequest {
    pub price: String,
    pub qty: u64,
}

#[derive(Debug, Serialize)]
pub struct OrderView {
    pub order_id: u64,
    pub accepted: bool,
}

#[derive(Debug, Serialize)]
pub struct SubmitResponse {
    pub order: OrderView,
    pub trades: Vec<Trade>,
}

fn parse_order_request(
    req: OrderRequest,
    id_gen: &dyn OrderIdGenerator,
) -> Result<NewOrder, ApiError> {
    let order_type: OrderType = req
        .order_type
        .parse()
        .map_err(ApiError::InvalidOrderType)?;
    let side: Side = req.side.parse().map_err(ApiError::InvalidSide)?;
    let price = Price::from_decimal_str(&req.price, PRICE_SCALE).map_err(ApiError::InvalidPrice)?;
    let id = req.order_id.map(OrderId).unwrap_or_else(|| id_gen.next_id());
    Ok(NewOrder {
        id,
        side,
        order_type,
        price,
        quantity: Quantity(req.qty),
    })
}

/// `GET /bids/` — resting bids, best (highest price) first.
pub async fn get_bids(State(state): State<AppState>) -> Json<Vec<PriceLevel>> {
    let engine = state.engine.lock().expect("engine mutex poisoned");
    Json(levels(&engine.snapshot().bids))
}

/// `GET /asks/` — resting asks, best (lowest price) first.
pub async fn get_asks(State(state): State<AppState>) -> Json<Vec<PriceLevel>> {
    let engine = state.engine.lock().expect("engine mutex poisoned");
    Json(levels(&engine.snapshot().asks))
}

/// `POST /order/` — submit a new order. Rejections (duplicate id, a
/// marketable order with no opposite liquidity, a FillAndKill with no
/// cross, a FillOrKill without sufficient depth) are not HTTP errors: the
/// response is still `201` with an empty `trades` array and
/// `order.accepted == false`, per the engine's rejection contract. Only a
/// malformed `order_type`/`side` string is a parse error (`400`).
pub async fn submit_order(
    State(state): State<AppState>,
    LoggedJson(body): LoggedJson<OrderRequest>,
) -> Result<impl IntoResponse, ApiErr> {
    let new_order = parse_order_request(body, state.id_gen.as_ref())?;
    let outcome = {
        let mut engine = state.engine.lock().expect("engine mutex poisoned");
        engine.add_order(new_order)
    };
    Ok((
        StatusCode::CREATED,
        Json(SubmitResponse {
            order: OrderView {
                order_id: outcome.order_id.0,
                accepted: outcome.accepted,
            },
            trades: outcome.trades,
        }),
    ))
}

/// `DELETE /order/{id}` — cancel a resting order. `404` if it wasn't
/// resident; cancelling twice is idempotent at the engine layer, but the
/// second HTTP call surfaces as `404` since the id is no longer found.
pub async fn cancel_order(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<impl IntoResponse, ApiErr> {
    let cancelled = {
        let mut engine = state.engine.lock().expect("engine mutex poisoned");
        engine.cancel_order(OrderId(id))
    };
    if cancelled {
        Ok((StatusCode::OK, Json(json!({"status": "cancelled"}))))
    } else {
        Err(ApiError::OrderNotFound.into())
    }
}

/// `PUT /order/{id}` — cancel-then-reinsert with a new price/quantity;
/// this always forfeits time priority, mirroring the engine's
/// `modify_order` semantics exactly. `404` if the id wasn't resident
/// beforehand.
pub async fn modify_order(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    LoggedJson(body): LoggedJson<ModifyRequest>,
) -> Result<impl IntoResponse, ApiErr> {
    let price = Price::from_decimal_str(&body.price, PRICE_SCALE).map_err(ApiError::InvalidPrice)?;
    let mut engine = state.engine.lock().expect("engine mutex poisoned");
    if !engine.contains_order(OrderId(id)) {
        return Err(ApiError::OrderNotFound.into());
    }
    let outcome = engine.modify_order(OrderId(id), price, Quantity(body.qty));
    Ok((
        StatusCode::OK,
        Json(SubmitResponse {
            order: OrderView {
                order_id: outcome.order_id.0,
                accepted: outcome.accepted,
            },
            trades: outcome.trades,
        }),
    ))
}

/// Constructs the application's `Router` with all routes and shared state.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/bids/", get(get_bids))
        .route("/asks/", get(get_asks))
        .route("/order/", post(submit_order))
        .route("/order/{id}", delete(cancel_order).put(modify_order))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(
                    DefaultMakeSpan::new()
                        .include_headers(false)
                        .level(tracing::Level::INFO),
                )
                .on_response(DefaultOnResponse::new().level(tracing::Level::INFO)),
        )
        .with_state(state)
}
