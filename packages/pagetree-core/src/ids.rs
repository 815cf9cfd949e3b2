use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

macro_rules! id_type {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub Uuid);

        impl $name {
            /// Mint a fresh random identifier.
            pub fn generate() -> Self {
                Self(Uuid::new_v4())
            }

            pub fn parse(s: &str) -> Result<Self, uuid::Error> {
                Uuid::parse_str(s).map(Self)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }
    };
}

id_type!(
    /// Opaque tenant identifier. The engine only threads it through; scoping
    /// and lookup are the surrounding service's concern.
    TenantId
);
id_type!(
    /// Identifier of a [`crate::model::Page`].
    PageId
);
id_type!(
    /// Identifier of a [`crate::model::Block`].
    BlockId
);
id_type!(
    /// Identifier of a [`crate::model::Section`].
    SectionId
);
id_type!(
    /// Identifier of a [`crate::model::Element`].
    ElementId
);
