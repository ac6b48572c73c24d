//! Application services
//!
//! Concrete service implementations that orchestrate domain logic.
//! Services depend on I/O boundary traits (FileSystem, PreferenceStore)
//! but are themselves concrete structs, not traits.

mod loader;
mod selector;
mod session;

pub use loader::TocLoader;
pub use selector::LanguageSelector;
pub use session::NavigationSession;
