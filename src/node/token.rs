use super::client::NodeClient;
use crate::error::ExplorerError;
use crate::models::{TokenBalance, TokenInfo};
use alloy_primitives::{Address, Bytes};
use alloy_sol_types::{sol, SolCall};

sol! {
    // Minimal ERC-20 surface the explorer reads
    interface IERC20 {
        function symbol() external view returns (string);
        function decimals() external view returns (uint8);
        function balanceOf(address owner) external view returns (uint256);
    }
}

async fn call<C: SolCall>(node: &dyn NodeClient, token: Address, call: C) -> Result<C::Return, ExplorerError> {
    let output = node.call(token, Bytes::from(call.abi_encode())).await?;
    if output.is_empty() {
        // eth_call against an address without code answers 0x
        return Err(ExplorerError::not_found(format!("token contract {}", token)));
    }
    Ok(C::abi_decode_returns(&output)?)
}

// Reads symbol() and decimals() concurrently
pub async fn token_info(node: &dyn NodeClient, token: Address) -> Result<TokenInfo, ExplorerError> {
    let (symbol, decimals) = tokio::try_join!(
        call(node, token, IERC20::symbolCall {}),
        call(node, token, IERC20::decimalsCall {}),
    )?;
    Ok(TokenInfo { address: token, symbol, decimals })
}

pub async fn token_balance(
    node: &dyn NodeClient,
    token: Address,
    owner: Address,
) -> Result<TokenBalance, ExplorerError> {
    let balance = call(node, token, IERC20::balanceOfCall { owner }).await?;
    Ok(TokenBalance { token, owner, balance })
}
