//! TCP reachability probe.

use serde::Serialize;
use std::time::{Duration, Instant};
use tokio::net::TcpStream;
use tracing::{debug, info};

use crate::domain::error::{XtuiError, XtuiResult};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProbeReport {
    pub target: String,
    pub reachable: bool,
    pub latency_ms: f64,
}

/// Split `host:port`, accepting bracketed IPv6 hosts.
pub fn parse_target(target: &str) -> XtuiResult<(String, u16)> {
    let invalid = || XtuiError::InvalidInput(format!("expected host:port, got '{}'", target));
    let target = target.strip_prefix("tcp://").unwrap_or(target);
    let (host, port) = target.rsplit_once(':').ok_or_else(invalid)?;
    let host = host.trim_start_matches('[').trim_end_matches(']');
    if host.is_empty() {
        return Err(invalid());
    }
    let port = port.parse::<u16>().map_err(|_| invalid())?;
    if port == 0 {
        return Err(invalid());
    }
    Ok((host.to_string(), port))
}

/// Connect once. A refused or timed-out connection is an error.
pub async fn probe(target: &str, timeout: Duration) -> XtuiResult<ProbeReport> {
    let (host, port) = parse_target(target)?;
    debug!(host = %host, port, "Probing TCP endpoint");

    let started = Instant::now();
    let stream = tokio::time::timeout(timeout, TcpStream::connect((host.as_str(), port)))
        .await
        .map_err(|_| XtuiError::Timeout)?
        .map_err(|e| XtuiError::Connection {
            message: format!("{}:{} is unreachable: {}", host, port, e),
        })?;
    let latency = started.elapsed();
    drop(stream);

    info!(host = %host, port, latency_ms = latency.as_secs_f64() * 1000.0, "TCP endpoint reachable");
    Ok(ProbeReport {
        target: format!("{}:{}", host, port),
        reachable: true,
        latency_ms: latency.as_secs_f64() * 1000.0,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::TcpListener;

    #[test]
    fn test_parse_target() {
        assert_eq!(parse_target("localhost:8080").unwrap(), ("localhost".to_string(), 8080));
        assert_eq!(parse_target("[::1]:22").unwrap(), ("::1".to_string(), 22));
        assert_eq!(parse_target("tcp://10.0.0.1:443").unwrap(), ("10.0.0.1".to_string(), 443));
        assert!(parse_target("localhost").is_err());
        assert!(parse_target(":80").is_err());
        assert!(parse_target("host:0").is_err());
        assert!(parse_target("host:99999").is_err());
    }

    #[tokio::test]
    async fn test_probe_listening_socket() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let report = probe(&addr.to_string(), Duration::from_secs(2)).await.unwrap();
        assert!(report.reachable);
        assert_eq!(report.target, addr.to_string());
    }

    #[tokio::test]
    async fn test_probe_closed_port_fails() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        assert!(probe(&addr.to_string(), Duration::from_secs(2)).await.is_err());
    }
}
