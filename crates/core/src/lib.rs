pub mod catalog;
pub mod detect;
pub mod session;
pub mod snapshot;
pub mod stats;

pub use catalog::{CatalogError, GameCatalog, GameIdentity};
pub use detect::{Detection, detect};
pub use session::Session;
pub use snapshot::ProcessSnapshot;

#[cfg(any(test, feature = "testing"))]
pub mod testing;
