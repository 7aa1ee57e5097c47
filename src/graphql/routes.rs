use super::AppState;
use actix_web::{get, post, web, HttpResponse};
use async_graphql::http::{playground_source, GraphQLPlaygroundConfig};
use async_graphql_actix_web::{GraphQLRequest, GraphQLResponse};

// Runs a query against the explorer schema
#[post("/graphql")]
pub async fn graphql(state: web::Data<AppState>, request: GraphQLRequest) -> GraphQLResponse {
    state.schema.execute(request.into_inner()).await.into()
}

// Interactive GraphQL playground pointed at the POST endpoint
#[get("/graphql")]
pub async fn playground() -> HttpResponse {
    let config = GraphQLPlaygroundConfig::new("/graphql").title("etherlens");
    HttpResponse::Ok().content_type("text/html; charset=utf-8").body(playground_source(config))
}
