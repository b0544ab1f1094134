pub mod mirror;
pub mod pairing;
pub mod proof;
pub mod record;
pub mod remote;
pub mod repo;

pub use mirror::LocalMirror;
pub use record::{Record, RecordStore, WriteOutcome};
pub use remote::{RemoteClient, RemoteConfig, RemoteError};
pub use repo::PactRepository;
