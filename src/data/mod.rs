//! Persistence: repository traits and the stores behind them.

pub mod db {
    pub use crate::db::*;
}

pub mod db_storage {
    pub use crate::db_storage::*;
}

pub mod memory_storage {
    pub use crate::memory_storage::*;
}

pub mod repository {
    pub use crate::repository::*;
}
