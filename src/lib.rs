pub mod cli; // Command-line front end and interactive loop
pub mod config;
pub mod console; // Patient console state and operations
pub mod events;
pub mod filter;
pub mod form; // Intake form validation
pub mod models;
pub mod notify;
pub mod registry; // Patient registry HTTP client
pub mod view;

pub use cli::run;
