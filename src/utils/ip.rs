use std::{
    convert::Infallible,
    net::{IpAddr, SocketAddr},
};

use axum::{
    extract::{ConnectInfo, FromRequestParts},
    http::{header::USER_AGENT, request::Parts, HeaderMap},
};

/// First usable client address: `x-forwarded-for`, then `x-real-ip`, then the
/// socket peer. IPv4 wins over IPv6 within the forwarded chain.
pub fn extract_client_ip(headers: &HeaderMap, connect_info: Option<SocketAddr>) -> Option<IpAddr> {
    let mut first: Option<IpAddr> = None;
    let mut first_ipv4: Option<IpAddr> = None;

    if let Some(raw) = headers
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
    {
        for part in raw.split(',').map(str::trim).filter(|v| !v.is_empty()) {
            if let Ok(ip) = part.parse::<IpAddr>() {
                first.get_or_insert(ip);
                if ip.is_ipv4() && first_ipv4.is_none() {
                    first_ipv4 = Some(ip);
                }
            }
        }
    }

    if let Some(ip) = first_ipv4.or(first) {
        return Some(ip);
    }

    headers
        .get("x-real-ip")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse::<IpAddr>().ok())
        .or_else(|| connect_info.map(|addr| addr.ip()))
}

/// Where a login came from, recorded on the session it creates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientContext {
    pub user_agent: String,
    pub client_ip: String,
}

impl ClientContext {
    pub fn from_parts(headers: &HeaderMap, connect_info: Option<SocketAddr>) -> Self {
        let user_agent = headers
            .get(USER_AGENT)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default()
            .to_string();
        let client_ip = extract_client_ip(headers, connect_info)
            .map(|ip| ip.to_string())
            .unwrap_or_default();
        Self {
            user_agent,
            client_ip,
        }
    }
}

impl<S> FromRequestParts<S> for ClientContext
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let connect_info = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| *addr);
        Ok(Self::from_parts(&parts.headers, connect_info))
    }
}
