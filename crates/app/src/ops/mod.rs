pub mod addcat;
pub mod init;
pub mod scenario;
pub mod sweep;
pub mod version;

pub use addcat::AddCat;
pub use init::Init;
pub use sweep::Sweep;
pub use version::Version;
