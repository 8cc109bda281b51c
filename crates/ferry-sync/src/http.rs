//! HTTP client for a remote repository service.
//!
//! Each request is wrapped in a [`SignedRequest`], framed with
//! [`FrameCodec`], and POSTed to `<base>/v1/rpc`. The reply body is a single
//! framed [`RpcResponse`].

use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use ferry_crypto::SessionKey;
use ferry_protocol::{endpoints, FrameCodec, RpcRequest, RpcResponse, SignedRequest, FRAME_CONTENT_TYPE};
use ferry_types::{CommitId, CommitSnapshot, FileBlob, RepositoryId, RepositoryInfo};
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use tracing::debug;

use crate::error::{RemoteError, RemoteResult};
use crate::transport::RemoteService;

/// Signed RPC over HTTP(S).
///
/// The session key is generated in [`connect`](Self::connect) and lives only
/// as long as this value; the service sees every process run as a new caller.
pub struct HttpRemote {
    rpc_url: String,
    client: reqwest::Client,
    key: SessionKey,
    nonce: AtomicU64,
}

impl HttpRemote {
    /// Build a client for the service at `base_url`.
    ///
    /// Trust anchors are the bundled web roots plus `ca_cert` (PEM) when
    /// given. No network traffic happens here.
    pub fn connect(base_url: &str, ca_cert: Option<&Path>) -> RemoteResult<Self> {
        let rpc_url = rpc_url(base_url)?;

        let mut builder = reqwest::Client::builder();
        if let Some(path) = ca_cert {
            let pem = fs::read(path).map_err(|e| RemoteError::InvalidCertificate {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;
            let cert = reqwest::Certificate::from_pem(&pem).map_err(|e| {
                RemoteError::InvalidCertificate {
                    path: path.to_path_buf(),
                    reason: e.to_string(),
                }
            })?;
            builder = builder.add_root_certificate(cert);
        }
        let client = builder
            .build()
            .map_err(|e| RemoteError::Transport(format!("cannot build HTTP client: {e}")))?;

        let key = SessionKey::generate();
        debug!(url = %rpc_url, principal = %key.principal(), "remote session created");
        Ok(Self {
            rpc_url,
            client,
            key,
            nonce: AtomicU64::new(1),
        })
    }

    pub fn rpc_url(&self) -> &str {
        &self.rpc_url
    }

    async fn call(&self, request: RpcRequest) -> RemoteResult<RpcResponse> {
        let operation = request.type_name();
        let nonce = self.nonce.fetch_add(1, Ordering::Relaxed);
        let signed = SignedRequest::sign(&self.key, nonce, request)?;
        let body = FrameCodec::encode(&signed)?;

        let response = self
            .client
            .post(&self.rpc_url)
            .header(CONTENT_TYPE, FRAME_CONTENT_TYPE)
            .header(ACCEPT, FRAME_CONTENT_TYPE)
            .body(body)
            .send()
            .await
            .map_err(|e| RemoteError::Transport(format!("{operation} request failed: {e}")))?;

        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| RemoteError::Transport(format!("{operation} response unreadable: {e}")))?;
        debug!(operation, %status, bytes = bytes.len(), "remote replied");
        decode_reply(status.is_success(), status.as_u16(), &bytes)
    }
}

fn rpc_url(base_url: &str) -> RemoteResult<String> {
    let parsed = reqwest::Url::parse(base_url).map_err(|e| RemoteError::InvalidUrl {
        url: base_url.to_string(),
        reason: e.to_string(),
    })?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(RemoteError::InvalidUrl {
            url: base_url.to_string(),
            reason: format!("unsupported scheme {}", parsed.scheme()),
        });
    }
    Ok(format!("{}{}", base_url.trim_end_matches('/'), endpoints::RPC))
}

/// Turn a reply body into a response. Service errors become
/// [`RemoteError::Rejected`] whatever the HTTP status.
fn decode_reply(success: bool, status: u16, bytes: &[u8]) -> RemoteResult<RpcResponse> {
    match FrameCodec::decode::<RpcResponse>(bytes) {
        Ok((RpcResponse::Error { message, .. }, _)) => Err(RemoteError::Rejected(message)),
        Ok((response, _)) if success => Ok(response),
        Ok((response, _)) => Err(RemoteError::Transport(format!(
            "HTTP {status} with {} body",
            response.type_name()
        ))),
        Err(_) if !success => Err(RemoteError::Transport(format!(
            "HTTP {status}: {}",
            String::from_utf8_lossy(bytes).trim()
        ))),
        Err(e) => Err(e.into()),
    }
}

fn unexpected(request: &'static str, response: &RpcResponse) -> RemoteError {
    RemoteError::UnexpectedResponse {
        request,
        response: response.type_name(),
    }
}

#[async_trait]
impl RemoteService for HttpRemote {
    fn principal(&self) -> String {
        self.key.principal()
    }

    async fn create_repository(&self, name: &str, is_public: bool) -> RemoteResult<RepositoryId> {
        let request = RpcRequest::CreateRepository {
            name: name.to_string(),
            is_public,
        };
        match self.call(request).await? {
            RpcResponse::RepositoryCreated { repository } => Ok(repository),
            other => Err(unexpected("createRepository", &other)),
        }
    }

    async fn submit_commit(
        &self,
        repository: RepositoryId,
        branch: &str,
        files: Vec<(String, FileBlob)>,
        message: &str,
    ) -> RemoteResult<CommitId> {
        let request = RpcRequest::SubmitCommit {
            repository,
            branch: branch.to_string(),
            files,
            message: message.to_string(),
        };
        match self.call(request).await? {
            RpcResponse::CommitSubmitted { commit } => Ok(commit),
            other => Err(unexpected("submitCommit", &other)),
        }
    }

    async fn create_branch(&self, repository: RepositoryId, source: &str, name: &str) -> RemoteResult<()> {
        let request = RpcRequest::CreateBranch {
            repository,
            source: source.to_string(),
            name: name.to_string(),
        };
        match self.call(request).await? {
            RpcResponse::Ack => Ok(()),
            other => Err(unexpected("createBranch", &other)),
        }
    }

    async fn merge_branch(&self, repository: RepositoryId, source: &str, target: &str) -> RemoteResult<()> {
        let request = RpcRequest::MergeBranch {
            repository,
            source: source.to_string(),
            target: target.to_string(),
        };
        match self.call(request).await? {
            RpcResponse::Ack => Ok(()),
            other => Err(unexpected("mergeBranch", &other)),
        }
    }

    async fn fork_repository(&self, repository: RepositoryId, name: &str) -> RemoteResult<RepositoryId> {
        let request = RpcRequest::ForkRepository {
            repository,
            name: name.to_string(),
        };
        match self.call(request).await? {
            RpcResponse::Forked { repository } => Ok(repository),
            other => Err(unexpected("forkRepository", &other)),
        }
    }

    async fn add_collaborator(&self, repository: RepositoryId, principal: &str) -> RemoteResult<()> {
        let request = RpcRequest::AddCollaborator {
            repository,
            principal: principal.to_string(),
        };
        match self.call(request).await? {
            RpcResponse::Ack => Ok(()),
            other => Err(unexpected("addCollaborator", &other)),
        }
    }

    async fn fetch_repository(&self, repository: RepositoryId) -> RemoteResult<RepositoryInfo> {
        match self.call(RpcRequest::FetchRepository { repository }).await? {
            RpcResponse::Repository(info) => Ok(info),
            other => Err(unexpected("fetchRepository", &other)),
        }
    }

    async fn fetch_commit(&self, repository: RepositoryId, commit: &CommitId) -> RemoteResult<CommitSnapshot> {
        let request = RpcRequest::FetchCommit {
            repository,
            commit: commit.clone(),
        };
        match self.call(request).await? {
            RpcResponse::Commit(snapshot) => Ok(snapshot),
            other => Err(unexpected("fetchCommit", &other)),
        }
    }

    async fn push_commit(&self, repository: RepositoryId, branch: &str, commit: &CommitId) -> RemoteResult<()> {
        let request = RpcRequest::PushCommit {
            repository,
            branch: branch.to_string(),
            commit: commit.clone(),
        };
        match self.call(request).await? {
            RpcResponse::Ack => Ok(()),
            other => Err(unexpected("pushCommit", &other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ferry_protocol::error_codes;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serve a single HTTP exchange: read one framed request, answer with
    /// `status` and the framed `reply`, and hand back what was received.
    async fn serve_once(
        status: u16,
        reply: RpcResponse,
    ) -> (String, tokio::task::JoinHandle<(String, SignedRequest)>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = Vec::new();
            let header_end = loop {
                let mut chunk = [0u8; 4096];
                let n = socket.read(&mut chunk).await.unwrap();
                assert!(n > 0, "connection closed before headers");
                buf.extend_from_slice(&chunk[..n]);
                if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
                    break pos + 4;
                }
            };
            let head = String::from_utf8_lossy(&buf[..header_end]).to_string();
            let content_length: usize = head
                .lines()
                .find_map(|line| {
                    let (name, value) = line.split_once(':')?;
                    name.eq_ignore_ascii_case("content-length")
                        .then(|| value.trim().parse().unwrap())
                })
                .unwrap();
            while buf.len() < header_end + content_length {
                let mut chunk = [0u8; 4096];
                let n = socket.read(&mut chunk).await.unwrap();
                assert!(n > 0, "connection closed before body");
                buf.extend_from_slice(&chunk[..n]);
            }

            let (signed, _) =
                FrameCodec::decode::<SignedRequest>(&buf[header_end..header_end + content_length]).unwrap();

            let body = FrameCodec::encode(&reply).unwrap();
            let response = format!(
                "HTTP/1.1 {status} Reply\r\ncontent-type: {FRAME_CONTENT_TYPE}\r\ncontent-length: {}\r\nconnection: close\r\n\r\n",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.write_all(&body).await.unwrap();
            socket.shutdown().await.unwrap();
            (head, signed)
        });

        (base_url, handle)
    }

    #[tokio::test]
    async fn call_posts_a_signed_frame_and_decodes_the_reply() {
        let (base_url, server) =
            serve_once(200, RpcResponse::RepositoryCreated { repository: RepositoryId::new(7) }).await;
        let remote = HttpRemote::connect(&base_url, None).unwrap();

        let repository = remote.create_repository("demo", true).await.unwrap();
        assert_eq!(repository, RepositoryId::new(7));

        let (head, signed) = server.await.unwrap();
        assert!(head.starts_with("POST /v1/rpc HTTP/1.1"));
        assert!(head.to_ascii_lowercase().contains(FRAME_CONTENT_TYPE));
        signed.verify().unwrap();
        assert_eq!(signed.principal(), remote.principal());
        assert_eq!(
            signed.request,
            RpcRequest::CreateRepository { name: "demo".into(), is_public: true }
        );
    }

    #[tokio::test]
    async fn service_error_over_http_is_rejected_verbatim() {
        let (base_url, server) =
            serve_once(403, RpcResponse::error(error_codes::FORBIDDEN, "not a collaborator")).await;
        let remote = HttpRemote::connect(&base_url, None).unwrap();

        let err = remote
            .add_collaborator(RepositoryId::new(1), "bob")
            .await
            .unwrap_err();
        assert!(matches!(err, RemoteError::Rejected(ref reason) if reason == "not a collaborator"));

        let (_, signed) = server.await.unwrap();
        signed.verify().unwrap();
        assert_eq!(signed.request.type_name(), "addCollaborator");
    }

    #[tokio::test]
    async fn wrong_reply_variant_is_unexpected() {
        let (base_url, server) = serve_once(200, RpcResponse::Ack).await;
        let remote = HttpRemote::connect(&base_url, None).unwrap();

        let err = remote.fetch_repository(RepositoryId::new(1)).await.unwrap_err();
        assert!(matches!(
            err,
            RemoteError::UnexpectedResponse { request: "fetchRepository", response: "Ack" }
        ));
        server.await.unwrap();
    }

    #[test]
    fn rpc_url_appends_endpoint() {
        assert_eq!(rpc_url("https://vcs.example.org").unwrap(), "https://vcs.example.org/v1/rpc");
        assert_eq!(rpc_url("http://localhost:8080/").unwrap(), "http://localhost:8080/v1/rpc");
    }

    #[test]
    fn rpc_url_rejects_garbage() {
        assert!(matches!(rpc_url("not a url"), Err(RemoteError::InvalidUrl { .. })));
        assert!(matches!(rpc_url("ftp://host"), Err(RemoteError::InvalidUrl { .. })));
    }

    #[test]
    fn connect_generates_fresh_identity() {
        let a = HttpRemote::connect("https://vcs.example.org", None).unwrap();
        let b = HttpRemote::connect("https://vcs.example.org", None).unwrap();
        assert_ne!(a.principal(), b.principal());
        assert_eq!(a.rpc_url(), "https://vcs.example.org/v1/rpc");
    }

    #[test]
    fn connect_reports_missing_ca_cert() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("ca.pem");
        let err = HttpRemote::connect("https://vcs.example.org", Some(&missing)).err().unwrap();
        assert!(err.is_configuration());
    }

    #[test]
    fn service_error_is_rejected_verbatim() {
        let body = FrameCodec::encode(&RpcResponse::error(error_codes::FORBIDDEN, "not a collaborator")).unwrap();
        let err = decode_reply(false, 403, &body).unwrap_err();
        assert!(matches!(err, RemoteError::Rejected(reason) if reason == "not a collaborator"));
    }

    #[test]
    fn success_reply_decodes() {
        let body = FrameCodec::encode(&RpcResponse::Ack).unwrap();
        assert_eq!(decode_reply(true, 200, &body).unwrap(), RpcResponse::Ack);
    }

    #[test]
    fn non_frame_failure_is_transport() {
        let err = decode_reply(false, 502, b"bad gateway").unwrap_err();
        assert!(matches!(err, RemoteError::Transport(msg) if msg.contains("502")));
    }

    #[test]
    fn unexpected_variant_is_reported() {
        let err = unexpected("fetchCommit", &RpcResponse::Ack);
        assert_eq!(err.to_string(), "unexpected Ack response to fetchCommit");
    }
}
