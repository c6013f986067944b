mod common;
pub use self::common::{Query, QueryCommon};

mod preprint;
pub use self::preprint::PreprintQuery;

mod preprint_provider;
pub use self::preprint_provider::PreprintProviderQuery;
