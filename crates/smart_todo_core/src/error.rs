use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppError {
    InvalidInput(String),
    InvalidData(String),
    Io(String),
    Auth(String),
    RateLimit(String),
    Service {
        status: Option<u16>,
        message: String,
    },
}

impl AppError {
    pub fn invalid_input<M: Into<String>>(message: M) -> Self {
        Self::InvalidInput(message.into())
    }

    pub fn invalid_data<M: Into<String>>(message: M) -> Self {
        Self::InvalidData(message.into())
    }

    pub fn io<M: Into<String>>(message: M) -> Self {
        Self::Io(message.into())
    }

    pub fn auth<M: Into<String>>(message: M) -> Self {
        Self::Auth(message.into())
    }

    pub fn rate_limited<M: Into<String>>(message: M) -> Self {
        Self::RateLimit(message.into())
    }

    pub fn service<M: Into<String>>(status: Option<u16>, message: M) -> Self {
        Self::Service {
            status,
            message: message.into(),
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidInput(_) => "invalid_input",
            Self::InvalidData(_) => "invalid_data",
            Self::Io(_) => "io_error",
            Self::Auth(_) => "auth_error",
            Self::RateLimit(_) => "rate_limited",
            Self::Service { .. } => "service_error",
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::InvalidInput(message) => message,
            Self::InvalidData(message) => message,
            Self::Io(message) => message,
            Self::Auth(message) => message,
            Self::RateLimit(message) => message,
            Self::Service { message, .. } => message,
        }
    }

    /// Text shown in the conversation when an assistant request fails.
    pub fn user_message(&self) -> String {
        match self {
            Self::Auth(_) => {
                "Authentication failed: the API key is missing or invalid. Set a valid key and try again."
                    .to_string()
            }
            Self::RateLimit(_) => {
                "Rate limit reached: the assistant quota is exhausted. Wait a moment and try again."
                    .to_string()
            }
            Self::Service {
                status: Some(status),
                message,
            } => format!("Assistant request failed ({status}): {message}"),
            Self::Service {
                status: None,
                message,
            } => format!("Assistant request failed: {message}"),
            other => format!("Error: {}", other.message()),
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.code(), self.message())
    }
}

impl std::error::Error for AppError {}
