//! Request extractors whose rejections are reported as [`Error`].
//!
//! axum's own `Json`, `Query` and `Path` answer malformed input with plain-text
//! bodies and assorted status codes. These wrappers turn every such rejection
//! into [`Error::InvalidInput`], so clients always get a 400 with a `detail`.

use crate::errors::Error;
use axum::extract::{FromRequest, FromRequestParts};

/// JSON request body.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(Error))]
pub struct JsonBody<T>(pub T);

/// URL query string.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(Error))]
pub struct QueryParams<T>(pub T);

/// Path parameters.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(Error))]
pub struct PathParam<T>(pub T);
