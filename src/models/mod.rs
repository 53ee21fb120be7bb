//! Request and Response models for the service API
//!
//! DTOs used for serializing/deserializing HTTP request and response bodies.

pub mod requests;
pub mod responses;

pub use requests::{CleanupErrorsRequest, InvalidateRequest, ListErrorsQuery, PutCacheRequest};
pub use responses::{
    DeleteResponse, ErrorResponse, GetResponse, RemovedResponse, SetResponse, StatsResponse,
};
