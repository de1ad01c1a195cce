//! Files that outlive a run: the metadata log and the session snapshot.

pub mod metadata;
pub mod session;

pub use metadata::{MetadataEntry, MetadataStore};
pub use session::{Mode, Session, SessionStore};
