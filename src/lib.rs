// Firemark watermarking library

pub mod batch;
pub mod config;
pub mod editor;
pub mod error;
pub mod imaging;
pub mod logging;
pub mod persistence;
pub mod state;
pub mod watermark;

pub use error::FiremarkError;
