//! Domain layer: talent profiles, credential search and the value
//! enrichment pipeline, plus the shared error type.

pub mod models {
    pub use crate::models::*;
}

pub mod services {
    pub use crate::services::*;
}

pub mod enrichment {
    pub use crate::enrichment::*;
}

pub mod errors {
    pub use crate::errors::*;
}
