//! Retry classification and deterministic backoff for provider calls.

pub const BASE_BACKOFF_MS: u64 = 200;

pub fn should_retry_status(status: u16) -> bool {
    status == 408 || status == 409 || status == 425 || status == 429 || status >= 500
}

pub fn next_backoff_ms(attempt: usize) -> u64 {
    let shift = attempt.min(6);
    BASE_BACKOFF_MS.saturating_mul(1_u64 << shift)
}

pub fn is_retryable_http_error(error: &reqwest::Error) -> bool {
    error.is_timeout() || error.is_connect() || error.is_request() || error.is_body()
}

#[cfg(test)]
mod tests {
    use super::{next_backoff_ms, should_retry_status, BASE_BACKOFF_MS};

    #[test]
    fn unit_retryable_statuses_cover_throttling_and_server_errors() {
        for status in [408, 409, 425, 429, 500, 502, 503] {
            assert!(should_retry_status(status), "status {status}");
        }
        for status in [200, 400, 401, 403, 404, 422] {
            assert!(!should_retry_status(status), "status {status}");
        }
    }

    #[test]
    fn unit_backoff_doubles_then_saturates() {
        assert_eq!(next_backoff_ms(0), BASE_BACKOFF_MS);
        assert_eq!(next_backoff_ms(1), BASE_BACKOFF_MS * 2);
        assert_eq!(next_backoff_ms(3), BASE_BACKOFF_MS * 8);
        assert_eq!(next_backoff_ms(6), next_backoff_ms(60));
    }
}
