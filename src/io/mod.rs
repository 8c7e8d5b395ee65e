//! I/O abstraction layer for the remote Forms and Sheets services

pub mod credentials;
pub mod forms;
pub mod http;
pub mod range;
pub mod sheets;

pub use credentials::{
    ApiClientArgsBuilder, AuthorizedClient, CredentialProvider, TokenCredentialProvider, TokenSource,
};
pub use forms::{FormsService, RawResponseRecord};
pub use range::SheetRange;
pub use sheets::{SheetsService, ValueInputOption};
