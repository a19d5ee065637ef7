//! HTTP handlers and route configuration.
//!
//! The API is a single GraphQL endpoint; GET serves the GraphiQL IDE and
//! POST executes operations. A plain health check sits next to it.

mod health;

use std::sync::Arc;

use actix_web::{HttpRequest, HttpResponse, web};
use async_graphql::http::GraphiQLSource;
use async_graphql_actix_web::{GraphQLRequest, GraphQLResponse};

use scribe_core::ports::TokenService;

use crate::graphql::ServiceSchema;
use crate::identity::identity_from_request;

/// Configure all application routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health::health_check))
        .service(
            web::resource("/graphql")
                .route(web::post().to(graphql))
                .route(web::get().to(graphiql)),
        );
}

/// POST /graphql - execute a query or mutation.
async fn graphql(
    schema: web::Data<ServiceSchema>,
    token_service: web::Data<Arc<dyn TokenService>>,
    http_req: HttpRequest,
    req: GraphQLRequest,
) -> GraphQLResponse {
    let mut request = req.into_inner();

    if let Some(identity) = identity_from_request(&http_req, token_service.get_ref().as_ref()) {
        request = request.data(identity);
    }

    schema.execute(request).await.into()
}

/// GET /graphql - serve the GraphiQL IDE.
async fn graphiql() -> HttpResponse {
    HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(GraphiQLSource::build().endpoint("/graphql").finish())
}
