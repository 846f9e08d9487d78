pub mod config;
pub mod context;
pub mod events;
pub mod interpolation;
pub mod lobby;
pub mod objects;
pub mod requests;
pub mod services;

pub use config::ClientConfig;
pub use context::{ClientCollaborators, ClientContext, ConnectionState, LocalIdentity};
pub use events::ClientEvent;
pub use interpolation::ReplicatedTransform;
pub use lobby::ClientLobby;
pub use objects::{ClientInteractable, ClientObject, ClientObjects, ClientPlayer, ClientProp};
pub use requests::PendingRequests;
