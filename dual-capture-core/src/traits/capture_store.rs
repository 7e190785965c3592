use std::future::Future;

use crate::models::capture::{CaptureRecord, NewCapture};
use crate::models::error::CaptureError;

/// Remote persistence for captured pairs.
///
/// Implemented in-process by the server's memory storage and over HTTP by
/// the server crate's client.
pub trait CaptureStore {
    /// Every record, in insertion order.
    fn list(&self) -> impl Future<Output = Result<Vec<CaptureRecord>, CaptureError>> + Send;

    fn get(&self, id: i64) -> impl Future<Output = Result<Option<CaptureRecord>, CaptureError>> + Send;

    /// Validate and store. Fails with [`CaptureError::Validation`] naming
    /// the first offending field.
    fn create(&self, capture: NewCapture) -> impl Future<Output = Result<CaptureRecord, CaptureError>> + Send;
}
