use super::*;

#[test]
fn from_values_defaults_when_unset() {
    let cfg = ClientConfig::from_values(None, None, None);
    assert_eq!(cfg, ClientConfig::default());
    assert_eq!(cfg.api_base_url, DEFAULT_API_BASE_URL);
}

#[test]
fn from_values_trims_trailing_slash() {
    let cfg = ClientConfig::from_values(Some("https://lms.example.com/"), None, None);
    assert_eq!(cfg.api_base_url, "https://lms.example.com");
    assert_eq!(cfg.url("/auth/login"), "https://lms.example.com/auth/login");
}

#[test]
fn from_values_blank_base_url_uses_default() {
    let cfg = ClientConfig::from_values(Some("   "), None, None);
    assert_eq!(cfg.api_base_url, DEFAULT_API_BASE_URL);
}

#[test]
fn from_values_parses_numbers() {
    let cfg = ClientConfig::from_values(None, Some("120"), Some(" 15 "));
    assert_eq!(cfg.refresh_skew_secs, 120);
    assert_eq!(cfg.expiry_check_interval_secs, 15);
}

#[test]
fn from_values_malformed_numbers_fall_back() {
    let cfg = ClientConfig::from_values(None, Some("soon"), Some("-3"));
    assert_eq!(cfg.refresh_skew_secs, DEFAULT_REFRESH_SKEW_SECS);
    assert_eq!(cfg.expiry_check_interval_secs, DEFAULT_EXPIRY_CHECK_SECS);
}

#[test]
fn from_values_zero_interval_clamped() {
    let cfg = ClientConfig::from_values(None, None, Some("0"));
    assert_eq!(cfg.expiry_check_interval_secs, 1);
}
