use thiserror::Error;

pub type Result<T> = std::result::Result<T, ResolverError>;

#[derive(Error, Debug)]
pub enum ResolverError {
    #[error("catalog unavailable: {0}")]
    CatalogUnavailable(#[from] vulnlab_catalog::CatalogError),
}
