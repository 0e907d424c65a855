use serde::{Deserialize, Serialize};

use crate::result::Shape;

/// The fixed set of decision points a delegate may define. Each is
/// independently optional; an undefined hook evaluates to
/// [`crate::HookResult::Absent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HookName {
    Authorize,
    Source,
    Metadata,
    Overlay,
    Redactions,
    FilesystemLocation,
    HttpResourceInfo,
    BlobstoreObjectInfo,
    DatabaseIdentifier,
    DatabaseMediaTypeQuery,
    DatabaseLookupQuery,
    ExtraResponseKeys,
}

/// How the host reacts when a hook implementation fails (as opposed to
/// returning a disallowed shape, which always surfaces).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookClass {
    /// Access-control gate — fails closed to deny.
    Gate,
    /// Resource resolution — failure surfaces as not-found.
    Resolver,
    /// Rendering/response decoration — failure degrades to "none".
    Decorative,
}

impl HookName {
    pub const ALL: [HookName; 12] = [
        Self::Authorize,
        Self::Source,
        Self::Metadata,
        Self::Overlay,
        Self::Redactions,
        Self::FilesystemLocation,
        Self::HttpResourceInfo,
        Self::BlobstoreObjectInfo,
        Self::DatabaseIdentifier,
        Self::DatabaseMediaTypeQuery,
        Self::DatabaseLookupQuery,
        Self::ExtraResponseKeys,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Authorize => "authorize",
            Self::Source => "source",
            Self::Metadata => "metadata",
            Self::Overlay => "overlay",
            Self::Redactions => "redactions",
            Self::FilesystemLocation => "filesystem_location",
            Self::HttpResourceInfo => "http_resource_info",
            Self::BlobstoreObjectInfo => "blobstore_object_info",
            Self::DatabaseIdentifier => "database_identifier",
            Self::DatabaseMediaTypeQuery => "database_media_type_query",
            Self::DatabaseLookupQuery => "database_lookup_query",
            Self::ExtraResponseKeys => "extra_response_keys",
        }
    }

    /// Result shapes a delegate may legally return from this hook. Anything
    /// outside this set is a contract violation.
    pub fn allowed_shapes(self) -> &'static [Shape] {
        use Shape::{Absent, Boolean, List, Structured, Text};
        match self {
            Self::Authorize => &[Absent, Boolean, Structured],
            Self::Source
            | Self::Metadata
            | Self::FilesystemLocation
            | Self::DatabaseIdentifier
            | Self::DatabaseMediaTypeQuery
            | Self::DatabaseLookupQuery => &[Absent, Text],
            Self::Overlay | Self::ExtraResponseKeys => &[Absent, Structured],
            Self::Redactions => &[Absent, List],
            Self::HttpResourceInfo => &[Absent, Text, Structured],
            // A bare text result is a blob key with the bucket left to host
            // configuration.
            Self::BlobstoreObjectInfo => &[Absent, Text, Structured],
        }
    }

    pub fn class(self) -> HookClass {
        match self {
            Self::Authorize => HookClass::Gate,
            Self::Source
            | Self::FilesystemLocation
            | Self::HttpResourceInfo
            | Self::BlobstoreObjectInfo
            | Self::DatabaseIdentifier
            | Self::DatabaseMediaTypeQuery
            | Self::DatabaseLookupQuery => HookClass::Resolver,
            Self::Metadata | Self::Overlay | Self::Redactions | Self::ExtraResponseKeys => {
                HookClass::Decorative
            }
        }
    }
}

impl std::fmt::Display for HookName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
