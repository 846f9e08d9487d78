use std::collections::{BTreeMap, HashMap};

use grasp::{LobbyId, PeerId, PlayerId, UserId, UserInfo, UserSettings};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub global_guid: Uuid,
    pub user_id: UserId,
    pub player_id: PlayerId,
    pub lobby_id: LobbyId,
    pub in_game: bool,
    pub settings: UserSettings,
    pub peer: PeerId,
}

impl User {
    pub fn info(&self) -> UserInfo {
        UserInfo {
            player_id: self.player_id,
            guid: self.global_guid,
            display_name: self.settings.display_name.clone(),
            in_game: self.in_game,
        }
    }
}

/// Connected users of one lobby, plus peers still in their handshake.
#[derive(Debug)]
pub struct UserDirectory {
    pending: HashMap<PeerId, u32>,
    users: BTreeMap<PlayerId, User>,
    by_peer: HashMap<PeerId, PlayerId>,
    next_user_id: UserId,
}

impl Default for UserDirectory {
    fn default() -> Self {
        Self::new()
    }
}

impl UserDirectory {
    pub fn new() -> Self {
        Self {
            pending: HashMap::new(),
            users: BTreeMap::new(),
            by_peer: HashMap::new(),
            next_user_id: 1,
        }
    }

    /// Holds `peer` until `deadline_tick` for its connection request.
    pub fn add_pending(&mut self, peer: PeerId, deadline_tick: u32) {
        self.pending.insert(peer, deadline_tick);
    }

    pub fn is_pending(&self, peer: PeerId) -> bool {
        self.pending.contains_key(&peer)
    }

    pub fn remove_pending(&mut self, peer: PeerId) -> bool {
        self.pending.remove(&peer).is_some()
    }

    /// Removes and returns every pending peer whose deadline has passed.
    pub fn take_expired(&mut self, tick: u32) -> Vec<PeerId> {
        let mut expired: Vec<PeerId> = self
            .pending
            .iter()
            .filter(|&(_, &deadline)| tick >= deadline)
            .map(|(&peer, _)| peer)
            .collect();
        expired.sort_unstable();
        for peer in &expired {
            self.pending.remove(peer);
        }
        expired
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Lowest player id nobody in the lobby is using right now.
    pub fn allocate_player_id(&self) -> Option<PlayerId> {
        (0..=PlayerId::MAX).find(|id| !self.users.contains_key(id))
    }

    pub fn next_user_id(&mut self) -> UserId {
        let id = self.next_user_id;
        self.next_user_id = self.next_user_id.wrapping_add(1).max(1);
        id
    }

    pub fn insert(&mut self, user: User) {
        self.by_peer.insert(user.peer, user.player_id);
        self.users.insert(user.player_id, user);
    }

    pub fn remove(&mut self, player_id: PlayerId) -> Option<User> {
        let user = self.users.remove(&player_id)?;
        self.by_peer.remove(&user.peer);
        Some(user)
    }

    pub fn get(&self, player_id: PlayerId) -> Option<&User> {
        self.users.get(&player_id)
    }

    pub fn get_mut(&mut self, player_id: PlayerId) -> Option<&mut User> {
        self.users.get_mut(&player_id)
    }

    pub fn player_of(&self, peer: PeerId) -> Option<PlayerId> {
        self.by_peer.get(&peer).copied()
    }

    pub fn by_peer(&self, peer: PeerId) -> Option<&User> {
        self.player_of(peer).and_then(|id| self.users.get(&id))
    }

    pub fn contains_guid(&self, guid: Uuid) -> bool {
        self.users.values().any(|u| u.global_guid == guid)
    }

    pub fn iter(&self) -> impl Iterator<Item = &User> {
        self.users.values()
    }

    pub fn lobby_peers(&self) -> Vec<PeerId> {
        self.users.values().map(|u| u.peer).collect()
    }

    pub fn in_game_peers(&self) -> Vec<PeerId> {
        self.users
            .values()
            .filter(|u| u.in_game)
            .map(|u| u.peer)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(player_id: PlayerId, peer: PeerId) -> User {
        User {
            global_guid: Uuid::new_v4(),
            user_id: u32::from(player_id) + 100,
            player_id,
            lobby_id: 1,
            in_game: false,
            settings: UserSettings::new(format!("user{player_id}")),
            peer,
        }
    }

    #[test]
    fn player_ids_are_reclaimed() {
        let mut users = UserDirectory::new();
        for (player, peer) in [(0, 10), (1, 11), (2, 12)] {
            users.insert(user(player, peer));
        }
        assert_eq!(users.allocate_player_id(), Some(3));

        users.remove(1);
        assert_eq!(users.allocate_player_id(), Some(1));
        assert_eq!(users.player_of(11), None);
        assert_eq!(users.player_of(12), Some(2));
    }

    #[test]
    fn full_id_space_allocates_nothing() {
        let mut users = UserDirectory::new();
        for player in 0..=PlayerId::MAX {
            users.insert(user(player, u32::from(player) + 1));
        }
        assert_eq!(users.allocate_player_id(), None);
    }

    #[test]
    fn expired_handshakes_are_taken_once() {
        let mut users = UserDirectory::new();
        users.add_pending(4, 10);
        users.add_pending(5, 20);

        assert!(users.take_expired(9).is_empty());
        assert_eq!(users.take_expired(10), vec![4]);
        assert!(users.take_expired(15).is_empty());
        assert!(users.is_pending(5));
        assert!(users.remove_pending(5));
        assert_eq!(users.pending_count(), 0);
    }

    #[test]
    fn peer_lists_follow_game_state() {
        let mut users = UserDirectory::new();
        users.insert(user(0, 10));
        users.insert(user(1, 11));
        users.get_mut(1).unwrap().in_game = true;

        assert_eq!(users.lobby_peers(), vec![10, 11]);
        assert_eq!(users.in_game_peers(), vec![11]);
    }
}
