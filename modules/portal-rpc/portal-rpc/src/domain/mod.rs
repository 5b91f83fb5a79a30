pub mod context;
pub mod display_mode;
pub mod error;
pub mod procedure;
pub mod router;
