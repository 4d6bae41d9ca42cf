use fincore_protocol::{API_BASE_ENV, DEFAULT_API_BASE};

/// Resolve the backend API base URL.
///
/// Precedence: `--api-url` flag, then `FINCORE_API_URL`, then the settings
/// file, then the built-in default.
pub fn resolve_api_base(
    flag: Option<&str>,
    env: Option<&str>,
    settings: Option<&str>,
) -> String {
    flag.or(env.filter(|v| !v.is_empty()))
        .or(settings)
        .unwrap_or(DEFAULT_API_BASE)
        .trim_end_matches('/')
        .to_string()
}

pub fn api_base_from_env() -> Option<String> {
    std::env::var(API_BASE_ENV).ok()
}
