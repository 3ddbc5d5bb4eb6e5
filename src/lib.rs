pub mod capture;
pub mod config;
pub mod crop;
pub mod error;
pub mod geometry;
pub mod input;
pub mod interaction;
pub mod logging;
pub mod render;
pub mod session;
pub mod state;
pub mod storage;

pub use config::CropConfig;
pub use error::{AppError, AppResult};
pub use session::CropSession;
