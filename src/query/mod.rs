pub mod health;
pub mod resolver;
pub mod search;

pub use health::{HealthReport, check_health};
pub use resolver::{Lookup, Resolver};
pub use search::{MIN_QUERY_CHARS, prepare_query, search_names};
