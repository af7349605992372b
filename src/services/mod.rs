pub mod accounts;
pub mod catalog;
pub mod providers;
pub mod recommender;

pub use accounts::{AccountService, AccountStore, InMemoryAccountStore};
pub use catalog::Catalog;
pub use providers::MetadataProvider;
pub use recommender::{CatalogIndex, RecommendError, Recommender};
