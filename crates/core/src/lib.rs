pub mod completion;
pub mod config;
pub mod error;

pub use completion::*;
pub use config::{LaunchConfig, LaunchMode, load_dotenv};
pub use error::*;
