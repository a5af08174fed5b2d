//! Pic2Text: upload images, extract their text through a remote OCR service,
//! translate it, then copy, download or listen to the result.
//!
//! The crate is the client-side core: an [`store::ItemStore`] of uploaded
//! images, a [`processing::ProcessingController`] that runs each image through
//! `pending -> processing -> done | error`, and adapters for the clipboard,
//! downloads and speech.

pub mod config;
pub mod error;
pub mod export;
pub mod extraction;
pub mod models;
pub mod processing;
pub mod speech;
pub mod store;

pub use error::{Pic2TextError, Result};
