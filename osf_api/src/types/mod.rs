use serde::{Deserialize, Deserializer};

mod time;
pub use self::time::OsfTime;

mod preprint;
pub(crate) use self::preprint::build_preprint;
pub use self::preprint::{
    LicenseRecord, LinkAvailability, Preprint, PreprintID, PreprintInput, PreprintLinks, Subject,
};

mod preprint_provider;
pub(crate) use self::preprint_provider::build_preprint_provider;
pub use self::preprint_provider::{
    AcceptableSubject, PreprintProvider, PreprintProviderID, PreprintProviderLinks,
};

mod file;
pub(crate) use self::file::build_file;
pub use self::file::{File, FileID, FileLinks};

/// `type` member of preprint resources.
pub const TYPE_PREPRINTS: &str = "preprints";
/// `type` member of preprint provider resources.
pub const TYPE_PREPRINT_PROVIDERS: &str = "preprint_providers";
/// `type` member of file resources.
pub const TYPE_FILES: &str = "files";

/// Reads `null` as the type's default. The service sends `null` for
/// unanswered scalars and empty lists alike.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
