use crate::error::ExplorerError;
use crate::explorer::{classify_query, parse_address, parse_block_id, parse_hash};
use crate::graphql::AppState;
use actix_web::{get, web, HttpResponse};
use log::warn;

// Failures are logged here and rendered as {"error": ...} by ExplorerError
fn logged(route: &str, e: ExplorerError) -> ExplorerError {
    warn!("{} failed: {}", route, e);
    e
}

#[get("/api/stats")]
pub async fn stats(state: web::Data<AppState>) -> Result<HttpResponse, ExplorerError> {
    let stats = state.explorer.stats().await.map_err(|e| logged("/api/stats", e))?;
    Ok(HttpResponse::Ok().json(stats))
}

#[get("/api/blocks/latest")]
pub async fn latest_blocks(state: web::Data<AppState>) -> Result<HttpResponse, ExplorerError> {
    let blocks = state.explorer.latest_blocks().await.map_err(|e| logged("/api/blocks/latest", e))?;
    Ok(HttpResponse::Ok().json(blocks))
}

// Accepts a block number or a block hash
#[get("/api/block/{id}")]
pub async fn block(path: web::Path<String>, state: web::Data<AppState>) -> Result<HttpResponse, ExplorerError> {
    let id = parse_block_id(&path.into_inner())?;
    let block = state.explorer.block(id).await.map_err(|e| logged("/api/block", e))?;
    Ok(HttpResponse::Ok().json(block))
}

#[get("/api/transaction/{hash}")]
pub async fn transaction(path: web::Path<String>, state: web::Data<AppState>) -> Result<HttpResponse, ExplorerError> {
    let hash = parse_hash(&path.into_inner())?;
    let tx = state.explorer.transaction(hash).await.map_err(|e| logged("/api/transaction", e))?;
    Ok(HttpResponse::Ok().json(tx))
}

#[get("/api/address/{address}")]
pub async fn address(path: web::Path<String>, state: web::Data<AppState>) -> Result<HttpResponse, ExplorerError> {
    let addr = parse_address(&path.into_inner())?;
    let detail = state.explorer.address(addr).await.map_err(|e| logged("/api/address", e))?;
    Ok(HttpResponse::Ok().json(detail))
}

#[get("/api/tokens")]
pub async fn tokens(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(state.explorer.tokens())
}

#[get("/api/token/{address}")]
pub async fn token(path: web::Path<String>, state: web::Data<AppState>) -> Result<HttpResponse, ExplorerError> {
    let addr = parse_address(&path.into_inner())?;
    let info = state.explorer.token(addr).await.map_err(|e| logged("/api/token", e))?;
    Ok(HttpResponse::Ok().json(info))
}

#[get("/api/token/{address}/balance/{owner}")]
pub async fn token_balance(
    path: web::Path<(String, String)>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, ExplorerError> {
    let (token_addr, owner) = path.into_inner();
    let (token_addr, owner) = (parse_address(&token_addr)?, parse_address(&owner)?);
    let balance = state
        .explorer
        .token_balance(token_addr, owner)
        .await
        .map_err(|e| logged("/api/token/balance", e))?;
    Ok(HttpResponse::Ok().json(balance))
}

#[get("/api/search/{query}")]
pub async fn search(path: web::Path<String>) -> Result<HttpResponse, ExplorerError> {
    Ok(HttpResponse::Ok().json(classify_query(&path.into_inner())?))
}
