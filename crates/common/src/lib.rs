//! Pieces shared by every crate in the workspace: log setup and small wire types.

pub mod types;

pub mod utils {
    pub mod logging;
}
