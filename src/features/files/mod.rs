pub mod dtos;
pub mod error;
pub mod handlers;
pub mod models;
pub mod policy;
pub mod repositories;
pub mod routes;
pub mod services;

pub use policy::AccessPolicy;
pub use repositories::PgMetadataStore;
pub use routes::routes;
pub use services::FileService;
