//! Single-target HTTP endpoint plus the request encoders and response
//! decoders used by the users/events proxies.

use super::Endpoint;
use crate::errors::GatewayError;
use async_trait::async_trait;
use common::RequestContext;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Client, Method, RequestBuilder, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

/// Content type sent on every downstream request.
pub const JSON_CONTENT_TYPE: &str = "application/json;charset=utf-8";

/// Header carrying the caller's request id.
pub const REQUEST_ID_HEADER: &str = "X-Request-Id";

/// Header carrying the caller's forwarded-for chain.
pub const FORWARDED_FOR_HEADER: &str = "X-Forwarded-For";

/// Adds the operation's request data to a prepared request builder.
pub type EncodeRequestFn<Req> =
    fn(&'static str, RequestBuilder, &Req) -> Result<RequestBuilder, GatewayError>;

/// Converts a downstream status and body into the operation's result.
pub type DecodeResponseFn<Resp> = fn(&'static str, StatusCode, &[u8]) -> Result<Resp, GatewayError>;

/// One HTTP target for one operation.
pub struct HttpEndpoint<Req, Resp> {
    name: &'static str,
    client: Client,
    method: Method,
    url: Url,
    encode: EncodeRequestFn<Req>,
    decode: DecodeResponseFn<Resp>,
}

impl<Req, Resp> HttpEndpoint<Req, Resp> {
    pub fn new(
        name: &'static str,
        client: Client,
        method: Method,
        url: Url,
        encode: EncodeRequestFn<Req>,
        decode: DecodeResponseFn<Resp>,
    ) -> Self {
        Self {
            name,
            client,
            method,
            url,
            encode,
            decode,
        }
    }
}

#[async_trait]
impl<Req, Resp> Endpoint<Req, Resp> for HttpEndpoint<Req, Resp>
where
    Req: Send + Sync,
    Resp: Send,
{
    async fn call(&self, ctx: &RequestContext, request: &Req) -> Result<Resp, GatewayError> {
        let builder = set_request_headers(
            self.client.request(self.method.clone(), self.url.clone()),
            ctx,
        );
        let builder = (self.encode)(self.name, builder, request)?;

        let http_request = builder.build().map_err(|e| GatewayError::Encoding {
            method: self.name,
            reason: e.to_string(),
        })?;

        let response = self.client.execute(http_request).await.map_err(|e| {
            warn!(
                target: "door.proxy",
                method = self.name,
                error = %e,
                "Downstream request failed"
            );
            GatewayError::Transport {
                method: self.name,
                reason: e.to_string(),
            }
        })?;

        let status = response.status();
        let body = response.bytes().await.map_err(|e| GatewayError::Transport {
            method: self.name,
            reason: e.to_string(),
        })?;

        debug!(
            target: "door.proxy",
            method = self.name,
            status = %status,
            "Downstream response received"
        );

        (self.decode)(self.name, status, &body)
    }
}

/// Sets the headers every downstream call carries.
pub fn set_request_headers(builder: RequestBuilder, ctx: &RequestContext) -> RequestBuilder {
    builder
        .header(CONTENT_TYPE, JSON_CONTENT_TYPE)
        .header(ACCEPT, "*/*")
        .header(FORWARDED_FOR_HEADER, ctx.forwarded_for.as_str())
        .header(REQUEST_ID_HEADER, ctx.request_id.as_str())
}

/// Adds `username` as a query parameter. An empty username adds nothing.
#[allow(clippy::ptr_arg)] // signature fixed by EncodeRequestFn<String>
pub fn encode_username_query(
    _name: &'static str,
    builder: RequestBuilder,
    username: &String,
) -> Result<RequestBuilder, GatewayError> {
    if username.is_empty() {
        return Ok(builder);
    }
    Ok(builder.query(&[("username", username.as_str())]))
}

/// Serializes the request as the JSON body.
pub fn encode_json_body<T: Serialize>(
    name: &'static str,
    builder: RequestBuilder,
    request: &T,
) -> Result<RequestBuilder, GatewayError> {
    let payload = serde_json::to_vec(request).map_err(|e| GatewayError::Encoding {
        method: name,
        reason: e.to_string(),
    })?;
    Ok(builder.body(payload))
}

/// Requires exactly 200 OK, then decodes the JSON body into `T`.
pub fn decode_json<T: DeserializeOwned>(
    name: &'static str,
    status: StatusCode,
    body: &[u8],
) -> Result<T, GatewayError> {
    if status != StatusCode::OK {
        return Err(GatewayError::UnexpectedStatus {
            method: name,
            expected: StatusCode::OK.as_u16(),
            actual: status.as_u16(),
        });
    }

    serde_json::from_slice(body).map_err(|e| GatewayError::Decoding {
        method: name,
        reason: e.to_string(),
    })
}
