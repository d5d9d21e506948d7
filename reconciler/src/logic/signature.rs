use anyhow::anyhow;
use chrono::{DateTime, Utc};
use log::debug;
use stakesign_defs::{ChainOracle, SignError, SignResult, Signature};
use stakesign_utils::decode_hex_payload;

/// Looks up a signature transaction and the timestamp of the block that mined it.
pub async fn fetch_signature(oracle: &dyn ChainOracle, txid: &str) -> SignResult<Signature> {
    if !txid.starts_with("0x") {
        return Err(SignError::format("Transaction ID should start with 0x"));
    }

    let tx = oracle
        .get_transaction(txid)
        .await?
        .ok_or(SignError::TransactionNotFound)?;
    let block = oracle
        .get_block(tx.block_number)
        .await?
        .ok_or(SignError::TransactionNotFound)?;
    let timestamp = DateTime::<Utc>::from_timestamp(block.timestamp, 0)
        .ok_or_else(|| anyhow!("Block {} has an invalid timestamp", block.number))?;
    let payload = decode_hex_payload(&tx.input)?;
    debug!(
        "Transaction {} from {} mined in block {} ({} payload bytes)",
        txid,
        tx.from,
        tx.block_number,
        payload.len()
    );

    Ok(Signature {
        id: txid.to_string(),
        signer: tx.from,
        block: tx.block_number,
        timestamp,
        payload,
    })
}
