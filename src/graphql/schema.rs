use crate::explorer::{parse_address, parse_hash, Explorer};
use crate::models::{AddressDetail, BlockDetail, BlockRecord, NodeStatus, TokenInfo, TransactionDetail};
use crate::node::BlockId;
use async_graphql::{Context, Json, Object};

// Root object for GraphQL queries; records are returned as JSON values shaped like the REST API
pub struct QueryRoot;

#[Object]
impl QueryRoot {
    async fn stats(&self, ctx: &Context<'_>) -> async_graphql::Result<Json<NodeStatus>> {
        let explorer = ctx.data_unchecked::<Explorer>();
        Ok(Json(explorer.stats().await?))
    }

    async fn latest_blocks(&self, ctx: &Context<'_>) -> async_graphql::Result<Json<Vec<BlockRecord>>> {
        let explorer = ctx.data_unchecked::<Explorer>();
        Ok(Json(explorer.latest_blocks().await?))
    }

    async fn block(&self, ctx: &Context<'_>, number: u64) -> async_graphql::Result<Json<BlockDetail>> {
        let explorer = ctx.data_unchecked::<Explorer>();
        Ok(Json(explorer.block(BlockId::Number(number)).await?))
    }

    async fn transaction(&self, ctx: &Context<'_>, hash: String) -> async_graphql::Result<Json<TransactionDetail>> {
        let explorer = ctx.data_unchecked::<Explorer>();
        Ok(Json(explorer.transaction(parse_hash(&hash)?).await?))
    }

    async fn address(&self, ctx: &Context<'_>, address: String) -> async_graphql::Result<Json<AddressDetail>> {
        let explorer = ctx.data_unchecked::<Explorer>();
        Ok(Json(explorer.address(parse_address(&address)?).await?))
    }

    async fn token(&self, ctx: &Context<'_>, address: String) -> async_graphql::Result<Json<TokenInfo>> {
        let explorer = ctx.data_unchecked::<Explorer>();
        Ok(Json(explorer.token(parse_address(&address)?).await?))
    }
}
