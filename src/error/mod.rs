//! Business error codes.
//!
//! Every code is unique; the registry is a fixed list checked by a test
//! rather than at runtime.

use std::fmt;

use axum::http::StatusCode;

/// A business error code with its message and optional details.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorCode {
    code: u32,
    message: &'static str,
    details: Vec<String>,
}

macro_rules! error_codes {
    ($($name:ident = ($code:expr, $message:expr);)+) => {
        impl ErrorCode {
            $(pub const $name: ErrorCode = ErrorCode::new($code, $message);)+

            /// Every predefined code.
            pub const ALL: &'static [ErrorCode] = &[$(ErrorCode::$name),+];
        }
    };
}

error_codes! {
    SUCCESS = (0, "Success");
    INTERNAL_SERVER = (10001, "Internal server error");
    BIND = (10002, "Bind request error");
    INVALID_PARAM = (10003, "Invalid params");
    SIGN_PARAM = (10004, "Invalid sign");
    VALIDATION = (10005, "Validation failed");
    DATABASE = (10006, "Database error");
    TOKEN = (10007, "Gen token error");
    INVALID_TOKEN = (10108, "Invalid token");
    TOKEN_TIMEOUT = (10109, "Token timeout");
    TOO_MANY_REQUESTS = (10110, "Too many request");
    INVALID_TRANSACTION = (10111, "Invalid transaction");
    ENCRYPT = (10112, "Encrypting the user password error");
    LIMIT_EXCEED = (10113, "Beyond limit");
    SERVICE_UNAVAILABLE = (10114, "Service Unavailable");
}

impl ErrorCode {
    pub const fn new(code: u32, message: &'static str) -> Self {
        Self {
            code,
            message,
            details: Vec::new(),
        }
    }

    pub fn code(&self) -> u32 {
        self.code
    }

    pub fn message(&self) -> &'static str {
        self.message
    }

    pub fn details(&self) -> &[String] {
        &self.details
    }

    /// Copy of this code carrying `details`; the predefined value is untouched.
    pub fn with_details<I, S>(&self, details: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            code: self.code,
            message: self.message,
            details: details.into_iter().map(Into::into).collect(),
        }
    }

    /// HTTP status for a response carrying this code. Unmapped codes are 200.
    pub fn status_code(&self) -> StatusCode {
        match self.code {
            10001 => StatusCode::INTERNAL_SERVER_ERROR,
            10003 => StatusCode::BAD_REQUEST,
            10007 | 10108 | 10109 => StatusCode::UNAUTHORIZED,
            10110 => StatusCode::TOO_MANY_REQUESTS,
            10114 => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::OK,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "code: {}, msg: {}", self.code, self.message)
    }
}

impl std::error::Error for ErrorCode {}
