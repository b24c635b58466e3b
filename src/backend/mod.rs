//! The boundary between validated requests and the data service.

mod http;
mod sqlite;

pub use http::{Endpoints, HttpBackend, MultipartForm};
pub use sqlite::SqliteBackend;

use crate::error::DispatchError;
use crate::translator::OutboundRequest;

/// One row of a result set, keyed by column name in the order the backend
/// sent them.
pub type Record = serde_json::Map<String, serde_json::Value>;

#[derive(Clone, Debug, PartialEq)]
pub enum Reply {
    Records(Vec<Record>),
    Status(String),
}

pub trait Backend {
    /// Sends one request and waits for its reply. Only one request is ever
    /// in flight per backend.
    fn dispatch(&mut self, request: &OutboundRequest) -> Result<Reply, DispatchError>;
}

impl<B: Backend + ?Sized> Backend for Box<B> {
    fn dispatch(&mut self, request: &OutboundRequest) -> Result<Reply, DispatchError> {
        (**self).dispatch(request)
    }
}
