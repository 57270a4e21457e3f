use crate::error::Error;
use crate::http::*;
use async_trait::async_trait;

/// Outcome of a remote fetch.
///
/// `NoData` is the normal way for a single entity to come back empty (rate limited twice, 404,
/// bad JSON ...); it never aborts a run. `Fatal` is reserved for errors that would recur on every
/// request, such as a request that cannot be built.
#[derive(Debug)]
pub enum Fetched<T> {
    Data(T),
    NoData(String),
    Fatal(Error),
}

impl<T> Fetched<T> {
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Fetched<U> {
        match self {
            Fetched::Data(data) => Fetched::Data(f(data)),
            Fetched::NoData(reason) => Fetched::NoData(reason),
            Fetched::Fatal(err) => Fetched::Fatal(err),
        }
    }

    pub fn data(self) -> Option<T> {
        match self {
            Fetched::Data(data) => Some(data),
            _ => None,
        }
    }

    /// For whole-source fetches (a directory file, the ticker list) missing data means the
    /// source is unreachable.
    pub fn require(self, source: &str) -> Result<T, Error> {
        match self {
            Fetched::Data(data) => Ok(data),
            Fetched::NoData(reason) => Err(Error::SourceUnreachable(format!("{source}: {reason}"))),
            Fetched::Fatal(err) => Err(err),
        }
    }
}

/// Status and body of an HTTP GET.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl RawResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn is_rate_limited(&self) -> bool {
        self.status == 429
    }
}

/// The wire underneath the SEC client.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, url: &str) -> Result<RawResponse, Error>;
}

/// [`Transport`] over a [`reqwest::Client`].
pub struct ReqwestTransport {
    client: HttpClient,
}

impl ReqwestTransport {
    pub fn new(client: HttpClient) -> Self {
        Self { client }
    }

    /// The SEC requires every request to identify its sender, e.g.
    /// `"Sample Company admin@sample.com"`.
    pub fn with_user_agent(user_agent: &str) -> Result<Self, Error> {
        let client = reqwest::ClientBuilder::new()
            .user_agent(user_agent)
            .build()?;
        Ok(Self::new(client))
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn get(&self, url: &str) -> Result<RawResponse, Error> {
        let response = self.client.get(url).send().await?;
        let status = response.status().as_u16();
        let body = response.bytes().await?.to_vec();
        Ok(RawResponse { status, body })
    }
}

/// Whether a transport error would fail again on every other request.
pub(crate) fn is_fatal(err: &Error) -> bool {
    match err {
        Error::Http(err) => err.is_builder(),
        Error::Config(_) => true,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    #[tokio::test]
    async fn requests_carry_the_contact_user_agent() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        // answer one request and hand back what was sent
        let server = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
            }
            socket
                .write_all(b"HTTP/1.1 200 OK\r\ncontent-length: 2\r\nconnection: close\r\n\r\n{}")
                .await
                .unwrap();
            String::from_utf8_lossy(&request).into_owned()
        });

        let transport =
            ReqwestTransport::with_user_agent("Sample Company admin@sample.com").unwrap();
        let response = transport
            .get(&format!("http://{addr}/files/company_tickers.json"))
            .await
            .unwrap();
        assert!(response.is_success());
        assert_eq!(response.body, b"{}");

        let request = server.await.unwrap();
        let user_agent = request.lines().find_map(|line| {
            let (name, value) = line.split_once(':')?;
            name.eq_ignore_ascii_case("user-agent").then(|| value.trim().to_string())
        });
        assert_eq!(user_agent.as_deref(), Some("Sample Company admin@sample.com"));
    }
}
