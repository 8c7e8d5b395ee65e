//! Configuration constants for the exporter
//!
//! This module centralizes the tunable parameters and fixed values used
//! throughout the application.

use std::time::Duration;

// ============================================================================
// Scheduling
// ============================================================================

/// Wait between two scheduled export passes
pub const POLL_INTERVAL: Duration = Duration::from_secs(300); // 5 minutes

// ============================================================================
// Remote API Configuration
// ============================================================================

/// Timeout applied to every HTTP request made against the Google APIs
pub const HTTP_TIMEOUT: Duration = Duration::from_secs(60);

pub const FORMS_API_BASE_URL: &str = "https://forms.googleapis.com/v1/";

pub const SHEETS_API_BASE_URL: &str = "https://sheets.googleapis.com/v4/";

/// Environment variable consulted for a bearer token when the configuration
/// names neither a token file nor a variable of its own
pub const DEFAULT_TOKEN_ENV: &str = "GOOGLE_OAUTH_ACCESS_TOKEN";

/// Destination type the Forms API reports for a sheet-linked form
pub const SPREADSHEET_DESTINATION: &str = "SPREADSHEET";

// ============================================================================
// Table and Export Configuration
// ============================================================================

pub const RESPONSE_ID_FIELD: &str = "responseId";

pub const CREATE_TIME_FIELD: &str = "createTime";

/// Number of trailing response-id characters kept in exported rows
pub const RESPONSE_ID_VISIBLE_CHARS: usize = 3;

pub const RESPONSE_ID_MASK: &str = "...";

/// Separator used when a question carries several text answers
pub const TEXT_ANSWER_SEPARATOR: &str = ", ";

/// Spaces added after the widest cell of each aligned-text column
pub const COLUMN_GAP: usize = 2;

pub const DEFAULT_EXPORT_FORMAT: &str = "csv";

pub const DEFAULT_SHEET_NAME: &str = "Sheet1";
