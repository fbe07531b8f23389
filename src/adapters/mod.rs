// Adapters layer: concrete implementations for external systems (repository, pathway model, storage).

pub mod omnipath;
pub mod resolwe;
pub mod storage;

pub use omnipath::OmniPathClient;
pub use resolwe::ResolweClient;
pub use storage::LocalStorage;
