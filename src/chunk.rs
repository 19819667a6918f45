//! Chunked processing of bulk operations.
//!
//! Bulk CRUD calls can carry thousands of inputs; committing them as one
//! request would blow the remote store's payload limits, and committing one
//! per input wastes round trips. The middle ground is fixed-size chunks,
//! processed strictly in order: a failure in chunk `k` leaves chunks
//! `1..k-1` committed and never attempts `k+1..`.

use crate::error::Result;
use std::future::Future;

/// Apply `op` to consecutive chunks of at most `chunk_size` items.
///
/// The operation runs once per chunk, sequentially; no chunk starts before
/// the previous chunk's output is available. Outputs are concatenated in
/// chunk order, so output `i` of chunk `j` pairs with input `i` of chunk
/// `j`. An empty input yields an empty output without invoking `op`.
///
/// An error from `op` stops processing immediately and is returned. Effects
/// of chunks that already completed are not rolled back; surfacing that
/// partial success is the caller's contract.
pub async fn process_in_chunks<I, O, F, Fut>(
    items: Vec<I>,
    chunk_size: usize,
    mut op: F,
) -> Result<Vec<O>>
where
    F: FnMut(Vec<I>) -> Fut,
    Fut: Future<Output = Result<Vec<O>>>,
{
    debug_assert!(chunk_size > 0, "chunk size must be positive");

    let mut results = Vec::with_capacity(items.len());
    let mut iter = items.into_iter();
    loop {
        let chunk: Vec<I> = iter.by_ref().take(chunk_size).collect();
        if chunk.is_empty() {
            break;
        }
        results.extend(op(chunk).await?);
    }
    Ok(results)
}
