//! Default values shared across the workspace
//!
//! Provider URLs, timeouts and call defaults live here so settings defaults
//! and tests agree on one value.

/// External service endpoints
pub mod endpoints {
    /// Retell REST API root
    pub const RETELL_BASE_URL: &str = "https://api.retellai.com/v1";

    /// Retell batch-call endpoint, the second provisioning tier
    pub const RETELL_BATCH_CALL_URL: &str = "https://dashboard.retellai.com/api/batchCall";

    /// Local knowledge-base service
    pub const KNOWLEDGE_BASE_URL: &str = "http://localhost:8000";
}

/// Outbound request timeouts (seconds)
pub mod timeouts {
    pub const CONVERSATION_SECS: u64 = 30;
    pub const CALL_SECS: u64 = 10;
    pub const KNOWLEDGE_BASE_SECS: u64 = 10;
}

/// Call provisioning
pub mod calls {
    /// Disclosed when no call session can be created
    pub const DEFAULT_PHONE_NUMBER: &str = "+19787185545";

    /// Value shipped in the sample env file
    pub const API_KEY_PLACEHOLDER: &str = "your_retell_api_key_here";

    /// Shorter keys are treated as unset
    pub const MIN_API_KEY_LEN: usize = 20;

    pub const MOCK_ACCESS_TOKEN: &str = "mock_access_token_for_testing";
}
