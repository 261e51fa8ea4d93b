pub mod payloads;

use serde::{Serialize, de::DeserializeOwned};
use validator::Validate;

use crate::editor::Orderable;

pub use payloads::*;

/// A sortable content entity the admin panel manages.
pub trait Content:
    Orderable + Clone + Serialize + DeserializeOwned + Send + Sync + Unpin + 'static
{
    type New: Validate + Serialize + DeserializeOwned + Send + Sync + 'static;
    type Patch: Validate + Serialize + DeserializeOwned + Default + Send + Sync + 'static;

    /// Name used in logs and not-found errors.
    const ENTITY: &'static str;
    /// Path segment under `/api` and `/api/admin`.
    const COLLECTION: &'static str;

    fn activation_patch(active: bool) -> Self::Patch;
}
