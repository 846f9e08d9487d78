use grasp::{ObjectId, PlayerId, PrefabKey, RegistryError};

/// The one fatal class: the lobby never comes up.
#[derive(Debug, thiserror::Error)]
pub enum LobbyError {
    #[error("unknown map {0:?}")]
    UnknownMap(String),
    #[error("service registry: {0}")]
    Registry(#[from] RegistryError),
    #[error("starting object {index} uses unresolvable prefab {prefab}")]
    StartingObject { index: usize, prefab: PrefabKey },
    #[error("could not place starting object: {0}")]
    Directory(#[from] DirectoryError),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DirectoryError {
    #[error("object {0} already exists")]
    DuplicateSpawn(ObjectId),
    #[error("no prefab mapping for key {0}")]
    UnknownPrefab(PrefabKey),
    #[error("no free object ids left")]
    IdsExhausted,
}

/// A request the authority refuses. Answered with a deny, never fatal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum AuthorityViolation {
    #[error("player {0} has no object")]
    UnknownPlayer(PlayerId),
    #[error("object {0} does not exist")]
    UnknownTarget(ObjectId),
    #[error("object {0} cannot be held")]
    NotInteractable(ObjectId),
    #[error("object {target} is already held by player {owner}")]
    AlreadyHeld { target: ObjectId, owner: PlayerId },
    #[error("player {player} is already holding object {holding}")]
    HandsFull { player: PlayerId, holding: ObjectId },
    #[error("player {player} does not hold object {target}")]
    NotOwner { player: PlayerId, target: ObjectId },
}
