pub mod client;
pub mod token;

pub use client::{
    Gist, GistClient, GistError, GistFile, GistResult, PendingWrite, DEFAULT_API_URL,
    DOCUMENT_FILENAME,
};
pub use token::{MemoryTokenStore, TokenStore};
