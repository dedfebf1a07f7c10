// src/utils/chunk.rs

//! Splits oversized URL lists into provider-sized batches.

use crate::error::{AppError, Result};

/// Split `items` into ordered chunks of at most `max_size` elements.
///
/// The last chunk may be shorter. An empty input yields no chunks.
pub fn chunk<T: Clone>(items: &[T], max_size: usize) -> Result<Vec<Vec<T>>> {
    if max_size == 0 {
        return Err(AppError::invalid_argument("chunk size must be positive"));
    }
    Ok(items.chunks(max_size).map(<[T]>::to_vec).collect())
}
