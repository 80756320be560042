use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, Query, State, rejection::PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use serde_json::json;
use tower_http::{catch_panic::CatchPanicLayer, trace::TraceLayer};

use crate::client::{ClientError, ProductSource};
use crate::product::Product;

/// Anything that stops a relay call, reported to the caller as a 500.
#[derive(Debug)]
pub enum ApiError {
    Upstream(ClientError),
    Path(PathRejection),
}

impl From<ClientError> for ApiError {
    fn from(err: ClientError) -> Self {
        Self::Upstream(err)
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        Self::Path(rejection)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let message = match &self {
            Self::Upstream(err) => {
                tracing::warn!(error = %err, "upstream call failed");
                err.to_string()
            }
            Self::Path(rejection) => {
                tracing::warn!(error = %rejection, "unusable path parameters");
                rejection.body_text()
            }
        };
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": message })),
        )
            .into_response()
    }
}

/// Query string of the top-products route.
///
/// Values are kept as text and parsed leniently: anything missing or
/// unparsable counts as zero. A repeated key keeps its first value.
#[derive(Debug, Default)]
pub struct TopProductsQuery {
    top: Option<String>,
    min_price: Option<String>,
    max_price: Option<String>,
}

impl TopProductsQuery {
    pub fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        let mut query = Self::default();
        for (key, value) in pairs {
            let slot = match key.as_str() {
                "top" => &mut query.top,
                "minPrice" => &mut query.min_price,
                "maxPrice" => &mut query.max_price,
                _ => continue,
            };
            slot.get_or_insert(value);
        }
        query
    }

    pub fn top(&self) -> i64 {
        parse_or_zero(self.top.as_deref())
    }

    pub fn min_price(&self) -> f64 {
        parse_or_zero(self.min_price.as_deref())
    }

    pub fn max_price(&self) -> f64 {
        parse_or_zero(self.max_price.as_deref())
    }
}

fn parse_or_zero<T: std::str::FromStr + Default>(raw: Option<&str>) -> T {
    raw.and_then(|v| v.parse().ok()).unwrap_or_default()
}

pub fn router<S: ProductSource>(source: S) -> Router {
    Router::new()
        .route("/categories/{category}/products", get(top_products::<S>))
        .route(
            "/categories/{category}/products/{productid}",
            get(product_details::<S>),
        )
        .layer(CatchPanicLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(Arc::new(source))
}

async fn top_products<S: ProductSource>(
    State(source): State<Arc<S>>,
    path: Result<Path<String>, PathRejection>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Json<Vec<Product>>, ApiError> {
    let Path(category) = path?;
    let query = TopProductsQuery::from_pairs(pairs);
    let (top, min_price, max_price) = (query.top(), query.min_price(), query.max_price());
    tracing::debug!(%category, top, min_price, max_price, "top products requested");

    let products = source
        .top_products(&category, min_price, max_price, top)
        .await?;
    Ok(Json(products))
}

async fn product_details<S: ProductSource>(
    State(source): State<Arc<S>>,
    path: Result<Path<(String, String)>, PathRejection>,
) -> Result<Json<Product>, ApiError> {
    let Path((category, product_id)) = path?;
    tracing::debug!(%category, %product_id, "product details requested");

    let product = source.product_details(&category, &product_id).await?;
    Ok(Json(product))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{Body, to_bytes};
    use axum::http::Request;
    use std::sync::Mutex;
    use tower::ServiceExt;

    #[derive(Default)]
    struct StubSource {
        calls: Mutex<Vec<String>>,
    }

    fn sample(id: &str) -> Product {
        Product {
            id: id.into(),
            name: format!("Phone {id}"),
            price: 499.5,
            rating: 4.2,
            discount: 10,
            availability: "yes".into(),
            company: "FLP".into(),
            category: "Phone".into(),
        }
    }

    impl ProductSource for Arc<StubSource> {
        async fn top_products(
            &self,
            category: &str,
            min_price: f64,
            max_price: f64,
            top: i64,
        ) -> Result<Vec<Product>, ClientError> {
            self.calls
                .lock()
                .unwrap()
                .push(format!("top {category} {top} {min_price} {max_price}"));
            match category {
                "broken" => Err(ClientError::Status {
                    context: "error fetching top products",
                    status: StatusCode::BAD_GATEWAY,
                }),
                "boom" => panic!("stub exploded"),
                _ => Ok(vec![sample("a"), sample("b")]),
            }
        }

        async fn product_details(
            &self,
            category: &str,
            product_id: &str,
        ) -> Result<Product, ClientError> {
            self.calls
                .lock()
                .unwrap()
                .push(format!("one {category} {product_id}"));
            match product_id {
                "missing" => Err(ClientError::Status {
                    context: "error fetching product details",
                    status: StatusCode::NOT_FOUND,
                }),
                id => Ok(sample(id)),
            }
        }
    }

    async fn call(stub: &Arc<StubSource>, uri: &str) -> (StatusCode, serde_json::Value) {
        let app = router(Arc::clone(stub));
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
        (status, body)
    }

    #[test]
    fn lenient_query_parsing() {
        let pairs = [("top", "5"), ("minPrice", "ten"), ("maxPrice", "250.5"), ("x", "1")];
        let query = TopProductsQuery::from_pairs(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        );
        assert_eq!(query.top(), 5);
        assert_eq!(query.min_price(), 0.0);
        assert_eq!(query.max_price(), 250.5);

        let padded = TopProductsQuery::from_pairs(vec![("top".into(), " 5".into())]);
        assert_eq!(padded.top(), 0);

        let empty = TopProductsQuery::default();
        assert_eq!(empty.top(), 0);
        assert_eq!(empty.max_price(), 0.0);
    }

    #[tokio::test]
    async fn top_products_relays_list() {
        let stub = Arc::new(StubSource::default());
        let uri = "/categories/Phone/products?top=2&minPrice=1&maxPrice=900";
        let (status, body) = call(&stub, uri).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, serde_json::to_value(vec![sample("a"), sample("b")]).unwrap());
        assert_eq!(stub.calls.lock().unwrap().as_slice(), ["top Phone 2 1 900"]);
    }

    #[tokio::test]
    async fn missing_and_malformed_params_default_to_zero() {
        let stub = Arc::new(StubSource::default());
        let (status, _) = call(&stub, "/categories/Phone/products").await;
        assert_eq!(status, StatusCode::OK);
        let uri = "/categories/Phone/products?top=lots&minPrice=&maxPrice=x";
        let (status, _) = call(&stub, uri).await;
        assert_eq!(status, StatusCode::OK);
        let (status, _) = call(&stub, "/categories/Phone/products?top=%205&minPrice=%FF").await;
        assert_eq!(status, StatusCode::OK);

        assert_eq!(
            stub.calls.lock().unwrap().as_slice(),
            ["top Phone 0 0 0", "top Phone 0 0 0", "top Phone 0 0 0"]
        );
    }

    #[tokio::test]
    async fn repeated_params_keep_first_value() {
        let stub = Arc::new(StubSource::default());
        let (status, _) = call(&stub, "/categories/P/products?top=3&top=5").await;
        assert_eq!(status, StatusCode::OK);
        let uri = "/categories/P/products?top=3&minPrice=1&minPrice=2&maxPrice=9&maxPrice=1";
        let (status, _) = call(&stub, uri).await;
        assert_eq!(status, StatusCode::OK);

        assert_eq!(
            stub.calls.lock().unwrap().as_slice(),
            ["top P 3 0 0", "top P 3 1 9"]
        );
    }

    #[tokio::test]
    async fn undecodable_path_becomes_json_500() {
        let stub = Arc::new(StubSource::default());
        let (status, body) = call(&stub, "/categories/%FF/products?top=1").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body["error"].as_str().unwrap().contains("UTF-8"));

        let (status, body) = call(&stub, "/categories/Phone/products/%FF").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!body["error"].as_str().unwrap().is_empty());

        assert!(stub.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn client_error_becomes_500_with_message() {
        let stub = Arc::new(StubSource::default());
        let (status, body) = call(&stub, "/categories/broken/products?top=1").await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body["error"],
            "error fetching top products: upstream returned 502 Bad Gateway"
        );
    }

    #[tokio::test]
    async fn product_details_relays_object_or_error() {
        let stub = Arc::new(StubSource::default());
        let (status, body) = call(&stub, "/categories/Phone/products/42").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["id"], "42");
        assert_eq!(body["productName"], "Phone 42");

        let (status, body) = call(&stub, "/categories/Phone/products/missing").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!body["error"].as_str().unwrap().is_empty());
    }

    #[tokio::test]
    async fn handler_panic_is_caught() {
        let stub = Arc::new(StubSource::default());
        let (status, _) = call(&stub, "/categories/boom/products").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    }
}
