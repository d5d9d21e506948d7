use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use log::debug;
use serde::{de::DeserializeOwned, Deserialize};
use serde_json::{json, Value};
use stakesign_defs::{ChainBlock, ChainOracle, ChainTransaction};
use stakesign_utils::parse_quantity;
use std::time::Duration;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Deserialize)]
struct RpcResponse<T> {
    result: Option<T>,
    error: Option<RpcError>,
}

#[derive(Deserialize, Debug)]
struct RpcError {
    code: i64,
    message: String,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RpcTransaction {
    from: String,
    #[serde(default)]
    block_number: Option<String>,
    input: String,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RpcReceipt {
    from: String,
    #[serde(default)]
    block_number: Option<String>,
}

#[derive(Deserialize, Debug, Clone)]
pub(crate) struct RpcBlock {
    #[serde(default)]
    number: Option<String>,
    timestamp: String,
}

/// Chain oracle backed by an Ethereum JSON-RPC gateway.
pub struct EthRpcClient {
    url: String,
    client: reqwest::Client,
}

impl EthRpcClient {
    pub fn new(url: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(EthRpcClient {
            url: url.to_string(),
            client,
        })
    }

    async fn call<T: DeserializeOwned>(&self, method: &str, params: Value) -> Result<Option<T>> {
        debug!("JSON-RPC {} {}", method, params);
        let body = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": method,
            "params": params,
        });
        let response = self
            .client
            .post(&self.url)
            .json(&body)
            .send()
            .await
            .with_context(|| format!("{} request to {} failed", method, self.url))?
            .error_for_status()
            .with_context(|| format!("{} request to {} failed", method, self.url))?
            .json::<RpcResponse<T>>()
            .await
            .with_context(|| format!("{} returned an unreadable response", method))?;

        if let Some(error) = response.error {
            bail!("{} failed ({}): {}", method, error.code, error.message);
        }
        Ok(response.result)
    }
}

/// Combines a transaction with its receipt; a missing receipt or block means
/// the transaction isn't mined yet.
pub(crate) fn mined_transaction(
    tx: Option<RpcTransaction>,
    receipt: Option<RpcReceipt>,
) -> Result<Option<ChainTransaction>> {
    let (tx, receipt) = match (tx, receipt) {
        (Some(tx), Some(receipt)) => (tx, receipt),
        _ => return Ok(None),
    };
    let block_number = match tx.block_number.as_deref().or(receipt.block_number.as_deref()) {
        Some(number) => parse_quantity(number)?,
        None => return Ok(None),
    };
    if !tx.from.eq_ignore_ascii_case(&receipt.from) {
        bail!("Transaction and receipt disagree on the sender address");
    }
    Ok(Some(ChainTransaction {
        from: receipt.from,
        block_number: u64::try_from(block_number)
            .map_err(|_| anyhow!("Block number out of range"))?,
        input: tx.input,
    }))
}

pub(crate) fn block_from_rpc(number: u64, block: RpcBlock) -> Result<ChainBlock> {
    if let Some(reported) = block.number.as_deref() {
        if parse_quantity(reported)? != u128::from(number) {
            bail!("Gateway returned a different block than requested");
        }
    }
    let timestamp = i64::try_from(parse_quantity(&block.timestamp)?)
        .map_err(|_| anyhow!("Block timestamp out of range"))?;
    Ok(ChainBlock { number, timestamp })
}

#[async_trait]
impl ChainOracle for EthRpcClient {
    async fn get_transaction(&self, id: &str) -> Result<Option<ChainTransaction>, anyhow::Error> {
        let tx: Option<RpcTransaction> = self
            .call("eth_getTransactionByHash", json!([id]))
            .await?;
        if tx.is_none() {
            return Ok(None);
        }
        let receipt: Option<RpcReceipt> = self
            .call("eth_getTransactionReceipt", json!([id]))
            .await?;
        mined_transaction(tx, receipt)
    }

    async fn get_block(&self, number: u64) -> Result<Option<ChainBlock>, anyhow::Error> {
        let block: Option<RpcBlock> = self
            .call(
                "eth_getBlockByNumber",
                json!([format!("0x{:x}", number), false]),
            )
            .await?;
        block.map(|b| block_from_rpc(number, b)).transpose()
    }

    async fn get_balance(&self, address: &str) -> Result<u128, anyhow::Error> {
        let balance: Option<String> = self
            .call("eth_getBalance", json!([address, "latest"]))
            .await?;
        let balance = balance.ok_or_else(|| anyhow!("eth_getBalance returned no result"))?;
        parse_quantity(&balance)
    }
}
