//! Assembles the Axum [`Router`] for a set of API services.
//!
//! | Method | Path | Response |
//! |--------|------|----------|
//! | POST | `/api/{api}/{operation}` | encoded result, or an [`ErrorResponse`](remoting::ErrorResponse) |
//! | GET | docs path (default `/api/{apiName}/docs`) | [`ApiDocument`] |
//! | any | anything else, including a known path with the wrong method | 404 `unknown_route` |

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::Uri,
    routing::{get, post},
    Json, Router,
};
use remoting::{
    build_route, parse_route, route::expand_docs_path, validate_path, ApiContract, ApiDocument,
    ContractError, ContractRegistry, Documentation,
};
use serde_json::Value;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::{
    config::ServerConfig,
    dispatcher::Dispatcher,
    error::{DispatchError, StartupError},
    handlers::Handlers,
};

/// One mounted API: its dispatcher plus the documentation attached to it.
pub struct Service {
    dispatcher: Dispatcher,
    docs: Documentation,
}

impl Service {
    /// Bind `handlers` to `contract`. Fails on missing or mismatched handlers.
    pub fn new(contract: ApiContract, handlers: Handlers) -> Result<Self, ContractError> {
        Ok(Self {
            dispatcher: Dispatcher::new(contract, handlers)?,
            docs: Documentation::new(),
        })
    }

    pub fn with_docs(mut self, docs: Documentation) -> Self {
        self.docs = docs;
        self
    }

    pub fn contract(&self) -> &ApiContract {
        self.dispatcher.contract()
    }
}

/// Shared application state threaded through the handlers via [`State`].
#[derive(Clone)]
pub struct AppState {
    /// Dispatchers keyed by API name. Read-only after startup.
    pub apis: Arc<HashMap<String, Arc<Dispatcher>>>,
}

/// Build the complete application router.
///
/// Every contract is registered in a [`ContractRegistry`] first, so two
/// services with the same API name fail here. Documentation is generated
/// once; an entry naming an undeclared operation fails startup.
pub fn build_router(services: Vec<Service>, config: &ServerConfig) -> Result<Router, StartupError> {
    let mut registry = ContractRegistry::new();
    let mut docs_paths = BTreeSet::new();
    let mut apis = HashMap::new();
    let mut router: Router<AppState> = Router::new();

    for service in services {
        let contract = service.contract();
        registry.register(contract.clone())?;

        let api = contract.api_name().to_string();
        let docs_path = expand_docs_path(&config.docs_path, &api);
        validate_path(&docs_path).map_err(ContractError::from)?;
        if !docs_paths.insert(docs_path.clone()) {
            return Err(ContractError::RouteCollision(docs_path).into());
        }
        for op in contract.describe() {
            if build_route(&api, &op.name).map_err(ContractError::from)? == docs_path {
                return Err(ContractError::RouteCollision(docs_path).into());
            }
        }

        let document: Arc<ApiDocument> = Arc::new(service.docs.generate(contract)?);
        router = router.route(
            &docs_path,
            get(move || {
                let document = Arc::clone(&document);
                async move { Json(document.as_ref().clone()) }
            }),
        );

        info!(
            "mounted API {api}: {} operations, docs at {docs_path}",
            contract.describe().len()
        );
        apis.insert(api, Arc::new(service.dispatcher));
    }

    let state = AppState {
        apis: Arc::new(apis),
    };

    Ok(router
        .route("/api/{api}/{operation}", post(dispatch))
        .method_not_allowed_fallback(unknown_route)
        .fallback(unknown_route)
        .with_state(state)
        .layer(TraceLayer::new_for_http()))
}

/// `POST /api/{api}/{operation}`
async fn dispatch(
    State(state): State<AppState>,
    uri: Uri,
    body: Bytes,
) -> Result<Json<Value>, DispatchError> {
    let path = uri.path();
    let dispatcher = parse_route(path)
        .and_then(|(api, _)| state.apis.get(api))
        .ok_or_else(|| DispatchError::UnknownRoute(path.to_string()))?;
    let result = dispatcher.dispatch(path, &body).await?;
    Ok(Json(result))
}

async fn unknown_route(uri: Uri) -> DispatchError {
    DispatchError::UnknownRoute(uri.path().to_string())
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use remoting::{codes, ErrorResponse, Operation, RouteError};
    use tower::ServiceExt;

    use super::*;
    use crate::error::HandlerError;

    const GET_NAMES: Operation<(), Vec<String>> = Operation::new("getNames");
    const ADD_NAME: Operation<String, String> = Operation::new("addName");
    const DELETE_NAME: Operation<String, Vec<String>> = Operation::new("deleteName");

    fn names_service() -> Service {
        let contract = ApiContract::builder("Names")
            .operation(GET_NAMES)
            .operation(ADD_NAME)
            .operation(DELETE_NAME)
            .build()
            .unwrap();
        let handlers = Handlers::new()
            .bind(GET_NAMES, |()| async move { Ok::<_, HandlerError>(vec!["ada".to_string()]) })
            .bind(ADD_NAME, |name: String| async move { Ok::<_, HandlerError>(name) })
            .bind(DELETE_NAME, |name: String| async move {
                Err::<Vec<String>, _>(HandlerError::new(format!("name {name} not found")))
            });
        let docs = Documentation::new()
            .route(GET_NAMES, "Get names", "Lists every name.")
            .route(ADD_NAME, "Add name", "Stores a name and returns it.");
        Service::new(contract, handlers).unwrap().with_docs(docs)
    }

    fn build_app() -> Router {
        build_router(vec![names_service()], &ServerConfig::default()).unwrap()
    }

    async fn call(app: Router, method: &str, uri: &str, body: &str) -> (StatusCode, Value) {
        let req = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();
        let status = resp.status();
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, json)
    }

    fn envelope(body: Value) -> ErrorResponse {
        serde_json::from_value(body).expect("error envelope")
    }

    #[tokio::test]
    async fn post_dispatches_to_handler() {
        let (status, body) = call(build_app(), "POST", "/api/Names/addName", r#""grace""#).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, serde_json::json!("grace"));
    }

    #[tokio::test]
    async fn no_argument_operation_accepts_empty_body() {
        let (status, body) = call(build_app(), "POST", "/api/Names/getNames", "").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, serde_json::json!(["ada"]));
    }

    #[tokio::test]
    async fn unknown_operation_returns_404_envelope() {
        let (status, body) = call(build_app(), "POST", "/api/Names/renameName", "").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(envelope(body).code, codes::UNKNOWN_ROUTE);
    }

    #[tokio::test]
    async fn unknown_api_and_foreign_paths_return_404_envelope() {
        for uri in ["/api/Other/getNames", "/v1/units", "/api/Names"] {
            let (status, body) = call(build_app(), "POST", uri, "").await;
            assert_eq!(status, StatusCode::NOT_FOUND, "{uri}");
            assert_eq!(envelope(body).code, codes::UNKNOWN_ROUTE, "{uri}");
        }
    }

    #[tokio::test]
    async fn malformed_payload_returns_400() {
        let (status, body) = call(build_app(), "POST", "/api/Names/addName", "[1,2]").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let e = envelope(body);
        assert_eq!(e.code, codes::MALFORMED_PAYLOAD);
        assert!(e.error.contains("expected string"), "{}", e.error);
    }

    #[tokio::test]
    async fn handler_error_returns_500_with_message() {
        let (status, body) = call(build_app(), "POST", "/api/Names/deleteName", r#""bob""#).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            envelope(body),
            ErrorResponse::new(codes::HANDLER_ERROR, "name bob not found")
        );
    }

    #[tokio::test]
    async fn docs_endpoint_lists_every_operation() {
        let (status, body) = call(build_app(), "GET", "/api/Names/docs", "").await;
        assert_eq!(status, StatusCode::OK);
        let doc: ApiDocument = serde_json::from_value(body).unwrap();
        assert_eq!(doc.api, "Names");
        assert_eq!(doc.operations.len(), 3);
        let delete = doc.section("deleteName").unwrap();
        assert_eq!(delete.alias, "");
        assert_eq!(delete.description, "");
        assert_eq!(doc.section("addName").unwrap().route, "/api/Names/addName");
    }

    #[tokio::test]
    async fn wrong_method_returns_404_envelope() {
        for (method, uri) in [("GET", "/api/Names/getNames"), ("POST", "/api/Names/docs")] {
            let (status, body) = call(build_app(), method, uri, "").await;
            assert_eq!(status, StatusCode::NOT_FOUND, "{method} {uri}");
            assert_eq!(envelope(body).code, codes::UNKNOWN_ROUTE, "{method} {uri}");
        }
    }

    #[tokio::test]
    async fn docs_path_is_configurable() {
        let config = ServerConfig {
            docs_path: "/reference/{apiName}".into(),
            ..ServerConfig::default()
        };
        let app = build_router(vec![names_service()], &config).unwrap();
        let (status, body) = call(app, "GET", "/reference/Names", "").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["api"], "Names");
    }

    #[test]
    fn duplicate_api_fails_startup() {
        let err = build_router(vec![names_service(), names_service()], &ServerConfig::default())
            .err()
            .unwrap();
        assert!(matches!(
            err,
            StartupError::Contract(ContractError::DuplicateApi(_))
        ));
    }

    #[test]
    fn operation_named_like_docs_path_fails_startup() {
        const DOCS: Operation<(), ()> = Operation::new("docs");
        let contract = ApiContract::builder("Names").operation(DOCS).build().unwrap();
        let handlers = Handlers::new().bind(DOCS, |()| async move { Ok::<_, HandlerError>(()) });
        let service = Service::new(contract, handlers).unwrap();
        let err = build_router(vec![service], &ServerConfig::default()).err().unwrap();
        assert!(matches!(
            err,
            StartupError::Contract(ContractError::RouteCollision(_))
        ));
    }

    #[test]
    fn unroutable_api_name_fails_startup() {
        for api in [":Names", "{x}", "N\u{f6}mes"] {
            let contract = ApiContract::new(api, vec![GET_NAMES.descriptor()]);
            let handlers = Handlers::new()
                .bind(GET_NAMES, |()| async move { Ok::<_, HandlerError>(Vec::new()) });
            let err = Service::new(contract, handlers).err().unwrap();
            assert!(matches!(err, ContractError::InvalidIdentifier(_)), "{api}");
        }
    }

    #[test]
    fn docs_path_with_router_syntax_fails_startup() {
        for docs_path in ["/docs/{apiName}/{x}", "/docs/:{apiName}", "/docs/*{apiName}"] {
            let config = ServerConfig {
                docs_path: docs_path.into(),
                ..ServerConfig::default()
            };
            let err = build_router(vec![names_service()], &config).err().unwrap();
            let expected = matches!(
                err,
                StartupError::Contract(ContractError::InvalidIdentifier(
                    RouteError::InvalidPath(_)
                ))
            );
            assert!(expected, "{docs_path}");
        }
    }

    #[test]
    fn docs_for_undeclared_operation_fails_startup() {
        const RENAME: Operation<String, String> = Operation::new("renameName");
        let service = names_service().with_docs(Documentation::new().route(RENAME, "Rename", ""));
        let err = build_router(vec![service], &ServerConfig::default()).err().unwrap();
        assert!(matches!(err, StartupError::Docs(_)));
    }
}
