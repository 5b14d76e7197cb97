pub mod brave;
pub mod searxng;

pub use brave::BraveSearchClient;
pub use searxng::SearxngSearchClient;
