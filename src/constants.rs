//! Global Constants
//!
//! Centralized constants for configuration and tuning.
//! All magic numbers should be defined here with documentation.

/// Input/output limits
pub mod limits {
    /// Maximum description length kept from the tracker (characters)
    pub const MAX_DESCRIPTION_CHARS: usize = 5000;

    /// Description characters forwarded to the model
    pub const PROMPT_DESCRIPTION_CHARS: usize = 2000;

    /// Characters scanned when sniffing the input delimiter
    pub const DELIMITER_SNIFF_CHARS: usize = 2000;

    /// A cell must be longer than this to count as a title guess
    pub const MIN_TITLE_CHARS: usize = 5;
}

/// Classifier retry constants
pub mod classifier {
    /// Attempts per ticket, including the first
    pub const MAX_ATTEMPTS: u32 = 5;

    /// Added to the provider's wait hint per attempt index (seconds)
    pub const RATE_LIMIT_STEP_SECS: u64 = 2;

    /// Upper bound for a single rate-limit wait (seconds)
    pub const RATE_LIMIT_CAP_SECS: u64 = 20;

    /// Wait after any other failure (seconds)
    pub const FAILURE_BACKOFF_SECS: u64 = 2;
}

/// Issue tracker constants
pub mod tracker {
    /// Attempts per issue, including the first
    pub const MAX_ATTEMPTS: u32 = 3;

    /// Rate-limit wait multiplier (seconds × attempt number)
    pub const RATE_LIMIT_STEP_SECS: u64 = 5;

    /// Transient failure wait multiplier (seconds × attempt number)
    pub const TRANSIENT_STEP_SECS: u64 = 2;

    /// Request timeout (seconds)
    pub const TIMEOUT_SECS: u64 = 15;

    /// Fields requested from the issue endpoint
    pub const ISSUE_FIELDS: &str = "summary,description,labels,components,status,issuetype";
}

/// LLM provider constants
pub mod provider {
    /// Minimum spacing between calls to OpenAI-compatible endpoints (ms)
    pub const OPENAI_COMPAT_MIN_INTERVAL_MS: u64 = 500;

    /// Minimum spacing between calls to the free-tier Gemini endpoint (ms)
    pub const GEMINI_MIN_INTERVAL_MS: u64 = 4200;

    /// Wait hint for OpenAI-compatible 429s without `retry-after` (ms)
    pub const OPENAI_COMPAT_RATE_LIMIT_WAIT_MS: u64 = 3000;

    /// Wait hint for Gemini 429s without `retry-after` (ms)
    pub const GEMINI_RATE_LIMIT_WAIT_MS: u64 = 5000;

    /// Sampling temperature
    pub const TEMPERATURE: f32 = 0.1;

    /// Completion budget for OpenAI-compatible endpoints
    pub const MAX_TOKENS: u32 = 300;

    /// Request timeout (seconds)
    pub const TIMEOUT_SECS: u64 = 30;
}

/// Pipeline constants
pub mod pipeline {
    /// Observer receives the accumulated results every N tickets
    pub const SNAPSHOT_EVERY: usize = 5;
}
