//! External service integrations.

pub mod talent_client {
    pub use crate::talent_client::*;
}

pub mod fixtures {
    pub use crate::fixtures::*;
}
