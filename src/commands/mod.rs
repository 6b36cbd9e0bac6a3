pub mod check;
pub mod environments;
pub mod init;
pub mod package;
pub mod release;

pub use check::run_check;
pub use environments::run_environments;
pub use init::run_init;
pub use package::run_package;
pub use release::ReleaseCommand;
