pub mod config;
pub mod context;
pub mod directory;
pub mod error;
pub mod events;
pub mod lobby;
pub mod ownership;
pub mod persistence;
pub mod replication;
pub mod services;
pub mod users;

pub use config::ServerConfig;
pub use context::{Collaborators, Lifecycle, LobbyContext};
pub use directory::{NetObject, ObjectDirectory};
pub use error::{AuthorityViolation, DirectoryError, LobbyError};
pub use events::{DisconnectReason, ServerEvent};
pub use lobby::{LobbyStats, ServerLobby};
pub use persistence::DetachedStore;
pub use users::{User, UserDirectory};
