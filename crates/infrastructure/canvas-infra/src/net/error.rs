#[derive(Debug, thiserror::Error)]
pub enum NetError {
    #[error("access denied for {url}")]
    AccessDenied { url: String },
    #[error("response from {url} carries no Link header")]
    MissingLinkHeader { url: String },
    #[error("Section could not be split on \";\": {section}")]
    MalformedLinkHeader { section: String },
    #[error("Link header from {url} has no `{rel}` relation")]
    MissingRelation { rel: &'static str, url: String },
    #[error("request to {url} failed with status {status}")]
    Status { status: u16, url: String },
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("invalid url {url}: {reason}")]
    InvalidUrl { url: String, reason: String },
    #[error("could not decode response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetErrorKind {
    /// The API refused access (403).
    AccessDenied,
    /// Pagination metadata is missing or structurally invalid.
    Pagination,
    /// Non-success status, connection failure or undecodable body.
    Transport,
    /// A URL built from configuration or a Link header did not parse.
    InvalidUrl,
}

impl NetError {
    pub fn kind(&self) -> NetErrorKind {
        match self {
            NetError::AccessDenied { .. } => NetErrorKind::AccessDenied,
            NetError::MissingLinkHeader { .. }
            | NetError::MalformedLinkHeader { .. }
            | NetError::MissingRelation { .. } => NetErrorKind::Pagination,
            NetError::Status { .. } | NetError::Request(_) | NetError::Decode { .. } => {
                NetErrorKind::Transport
            }
            NetError::InvalidUrl { .. } => NetErrorKind::InvalidUrl,
        }
    }

    pub fn is_access_denied(&self) -> bool {
        matches!(self, NetError::AccessDenied { .. })
    }
}
