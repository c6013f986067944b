//! Per-resource façades over [`crate::Client`]. They build paths and
//! queries and leave all JSON handling to the codec.

mod files;
pub use self::files::{normalize_file_id, Files, Upload, STORAGE_PROVIDER};

mod preprint_providers;
pub use self::preprint_providers::PreprintProviders;

mod preprints;
pub use self::preprints::Preprints;
