// src/lib.rs
// Modules principaux
pub mod api;
pub mod core;
pub mod domain;
pub mod infrastructure;
pub mod utils;

// Ré-exports pour faciliter l'utilisation
pub use utils::{AppError, AppResult, Config};

// Version de l'application
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = "Garage Back Office";

// Configuration par défaut pour les tests
#[cfg(test)]
pub mod test_utils {
    use std::sync::Once;

    static INIT: Once = Once::new();

    pub fn init_test_logging() {
        INIT.call_once(|| {
            tracing_subscriber::fmt().with_test_writer().init();
        });
    }
}
