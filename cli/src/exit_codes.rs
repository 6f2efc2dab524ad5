//! # Exit Codes
//!
//! Standard exit codes for the Firstline CLI.
//!
//! These codes follow common Unix conventions and provide meaningful
//! feedback to scripts and wrappers.

/// Successful execution
pub const EXIT_SUCCESS: i32 = 0;

/// General error (unspecified)
pub const EXIT_ERROR: i32 = 1;

/// Configuration error (missing or invalid config)
pub const EXIT_CONFIG_ERROR: i32 = 2;

/// Invalid input (bad arguments, empty query, unreadable files)
pub const EXIT_INVALID_INPUT: i32 = 3;

/// Network error (connection failed, timeout, etc.)
pub const EXIT_NETWORK_ERROR: i32 = 4;

/// An emergency was detected in the message
///
/// Used by `firstline detect` so scripts can branch on the verdict.
pub const EXIT_EMERGENCY_DETECTED: i32 = 5;

/// Service unavailable (provider API down or erroring)
pub const EXIT_SERVICE_UNAVAILABLE: i32 = 6;

/// Rate limit exceeded for the session
pub const EXIT_RATE_LIMITED: i32 = 7;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes_are_distinct() {
        let codes = [
            EXIT_SUCCESS,
            EXIT_ERROR,
            EXIT_CONFIG_ERROR,
            EXIT_INVALID_INPUT,
            EXIT_NETWORK_ERROR,
            EXIT_EMERGENCY_DETECTED,
            EXIT_SERVICE_UNAVAILABLE,
            EXIT_RATE_LIMITED,
        ];

        // Check all codes are unique
        for (i, &code1) in codes.iter().enumerate() {
            for (j, &code2) in codes.iter().enumerate() {
                if i != j {
                    assert_ne!(code1, code2, "Exit codes {} and {} are not unique", i, j);
                }
            }
        }
    }

    #[test]
    fn test_success_is_zero() {
        assert_eq!(EXIT_SUCCESS, 0);
    }

    #[test]
    fn test_error_codes_are_positive() {
        assert!(EXIT_ERROR > 0);
        assert!(EXIT_CONFIG_ERROR > 0);
        assert!(EXIT_INVALID_INPUT > 0);
        assert!(EXIT_NETWORK_ERROR > 0);
        assert!(EXIT_EMERGENCY_DETECTED > 0);
        assert!(EXIT_SERVICE_UNAVAILABLE > 0);
        assert!(EXIT_RATE_LIMITED > 0);
    }
}
