//! Network layer: the shared HTTP client, download naming, and the downloader.

mod client;
mod download;
mod filename;

pub use client::{extract_domain, HttpClient};
pub use download::Downloader;
pub use filename::{
    choose_file_name, ensure_extension, parse_content_disposition, reserve_unique_path,
    sanitize_file_name,
};
