//! Connector liveness check.

use aide::axum::ApiRouter;
use aide::transform::TransformOperation;
use axum::http::StatusCode;

use crate::extract::Json;
use crate::handler::response::PingResponse;
use crate::service::ServiceState;

/// Tracing target for monitor operations.
const TRACING_TARGET: &str = "hub_server::handler::monitors";

/// Reports that the server is up. Needs no credentials.
#[tracing::instrument(skip_all)]
async fn ping() -> (StatusCode, Json<PingResponse>) {
    tracing::trace!(target: TRACING_TARGET, "Ping");
    (StatusCode::OK, Json(PingResponse::now()))
}

fn ping_docs(op: TransformOperation) -> TransformOperation {
    op.summary("Ping")
        .description("Liveness check used by the connectors demo.")
        .response::<200, Json<PingResponse>>()
}

/// Returns a [`Router`] with all health monitoring routes.
///
/// [`Router`]: axum::routing::Router
pub fn routes() -> ApiRouter<ServiceState> {
    use aide::axum::routing::*;

    ApiRouter::new()
        .api_route("/connectors/ping", get_with(ping, ping_docs))
        .with_path_items(|item| item.tag("Connectors"))
}
