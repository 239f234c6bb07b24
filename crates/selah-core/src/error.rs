use thiserror::Error;

#[derive(Debug, Error)]
pub enum SelahError {
    #[error("no weekly theme for week starting {0}: rotation has not been seeded")]
    ThemeNotFound(String),

    #[error("no daily content for day {day} of week starting {week_start}")]
    DailyContentNotFound { week_start: String, day: u8 },

    #[error("recap not found for week starting {0}")]
    RecapNotFound(String),

    #[error("user not found: {0}")]
    UserNotFound(String),

    #[error("invalid delivery day '{0}': must be sunday, monday, or disabled")]
    InvalidDeliveryDay(String),

    #[error("invalid delivery time '{0}': must be HH:MM")]
    InvalidDeliveryTime(String),

    #[error("invalid date '{0}': must be YYYY-MM-DD")]
    InvalidDate(String),

    #[error("failed to connect to database: {0}")]
    ConnectionFailed(String),

    #[error("migration failed: {0}")]
    MigrationFailed(String),

    #[error("query failed: {0}")]
    QueryFailed(String),

    #[error("stored row is malformed: {0}")]
    CorruptRow(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SelahError>;
