//! Request origin captured for the audit trail

use std::convert::Infallible;

use axum::{extract::FromRequestParts, http::request::Parts};
use axum_extra::{headers::UserAgent, TypedHeader};

/// Client IP and user agent, both best-effort
#[derive(Clone, Debug, Default)]
pub struct ClientInfo {
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for ClientInfo
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let headers = &parts.headers;

        // First hop of X-Forwarded-For, then X-Real-IP
        let ip_address = headers
            .get("x-forwarded-for")
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.split(',').next())
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .or_else(|| {
                headers
                    .get("x-real-ip")
                    .and_then(|v| v.to_str().ok())
                    .map(|s| s.trim().to_string())
            });

        let user_agent = TypedHeader::<UserAgent>::from_request_parts(parts, state)
            .await
            .ok()
            .map(|TypedHeader(agent)| agent.as_str().to_string());

        Ok(ClientInfo {
            ip_address,
            user_agent,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn extract(request: Request<()>) -> ClientInfo {
        let (mut parts, _) = request.into_parts();
        tokio_test::block_on(ClientInfo::from_request_parts(&mut parts, &())).unwrap()
    }

    #[test]
    fn test_first_forwarded_hop_wins() {
        let info = extract(
            Request::builder()
                .header("x-forwarded-for", "203.0.113.7, 10.0.0.1")
                .header("x-real-ip", "10.0.0.2")
                .header("user-agent", "bar-tablet/1.0")
                .body(())
                .unwrap(),
        );
        assert_eq!(info.ip_address.as_deref(), Some("203.0.113.7"));
        assert_eq!(info.user_agent.as_deref(), Some("bar-tablet/1.0"));
    }

    #[test]
    fn test_missing_headers_are_none() {
        let info = extract(Request::builder().body(()).unwrap());
        assert_eq!(info.ip_address, None);
        assert_eq!(info.user_agent, None);

        let info = extract(
            Request::builder()
                .header("x-real-ip", "10.0.0.2")
                .body(())
                .unwrap(),
        );
        assert_eq!(info.ip_address.as_deref(), Some("10.0.0.2"));
    }
}
