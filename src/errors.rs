use std::fmt;

/// Custom error type that includes exit codes
///
/// A run that finds no cards is not an error: the report carries the
/// `not_found` outcome and the process exits 0.
#[derive(Debug)]
pub enum CardpulseError {
    /// Config file unreadable or inconsistent (exit code 2)
    InvalidConfig(String),
    /// WebDriver connection failed (exit code 4)
    WebDriverFailed(String),
    /// Generic error (exit code 1)
    Other(anyhow::Error),
}

impl CardpulseError {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            CardpulseError::InvalidConfig(_) => 2,
            CardpulseError::WebDriverFailed(_) => 4,
            CardpulseError::Other(_) => 1,
        }
    }

    /// Short machine-readable tag used in JSON error output
    pub fn kind(&self) -> &'static str {
        match self {
            CardpulseError::InvalidConfig(_) => "invalid_config",
            CardpulseError::WebDriverFailed(_) => "webdriver_failed",
            CardpulseError::Other(_) => "error",
        }
    }
}

impl fmt::Display for CardpulseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CardpulseError::InvalidConfig(msg) => write!(f, "{}", msg),
            CardpulseError::WebDriverFailed(msg) => {
                write!(f, "WebDriver connection failed: {}", msg)
            }
            CardpulseError::Other(err) => write!(f, "{:#}", err),
        }
    }
}

impl std::error::Error for CardpulseError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CardpulseError::Other(err) => Some(err.as_ref()),
            _ => None,
        }
    }
}

impl From<anyhow::Error> for CardpulseError {
    fn from(err: anyhow::Error) -> Self {
        // Detect the category from the whole context chain
        let msg = format!("{:#}", err);

        if msg.contains("Invalid configuration") {
            CardpulseError::InvalidConfig(msg)
        } else if msg.contains("Failed to connect to WebDriver")
            || msg.contains("WebDriver")
            || msg.contains("geckodriver")
            || msg.contains("chromedriver")
        {
            CardpulseError::WebDriverFailed(msg)
        } else {
            CardpulseError::Other(err)
        }
    }
}
