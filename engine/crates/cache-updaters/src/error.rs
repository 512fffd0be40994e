pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Unable to build a fragment without a typename")]
    MissingTypename,
    #[error("Found {count} fragments, a fragment name must be provided to choose between them")]
    AmbiguousFragment { count: usize },
    #[error("No fragment named `{0}` in the document")]
    UnknownFragment(String),
    #[error("Unable to identify the data to write, an id must be provided")]
    MissingIdentity,
    #[error(transparent)]
    Cache(#[from] runtime::cache::Error),
}
