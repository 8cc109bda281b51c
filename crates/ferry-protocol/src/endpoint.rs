/// HTTP endpoint paths exposed by the remote service.
pub mod endpoints {
    /// Every RPC is a framed POST to this path.
    pub const RPC: &str = "/v1/rpc";
}

/// Content type of request and response bodies.
pub const FRAME_CONTENT_TYPE: &str = "application/x-ferry-frame";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_paths() {
        assert_eq!(endpoints::RPC, "/v1/rpc");
        assert!(FRAME_CONTENT_TYPE.starts_with("application/"));
    }
}
