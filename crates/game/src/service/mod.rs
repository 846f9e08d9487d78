use std::marker::PhantomData;

use crate::net::{Packet, PacketError, PeerId, ServiceId};
use crate::object::ObjectId;

/// A typed handler for every command of one service.
pub trait Service<C: ?Sized> {
    fn service_id(&self) -> ServiceId;

    /// Lower runs first for lifecycle hooks.
    fn execution_order(&self) -> i32 {
        0
    }

    /// `packet`'s cursor sits just past the `(service, command)` header.
    fn receive(
        &mut self,
        ctx: &mut C,
        sender: PeerId,
        command: u8,
        packet: &mut Packet,
    ) -> Result<(), RoutingError>;
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("service {0:?} already has a handler")]
    Duplicate(ServiceId),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RoutingError {
    #[error("malformed packet: {0}")]
    Malformed(#[from] PacketError),
    #[error("no handler registered for service {0:?}")]
    NoHandler(ServiceId),
    #[error("object {0} not found")]
    ObjectNotFound(ObjectId),
    #[error("service {service:?} does not accept command {command} here")]
    UnexpectedCommand { service: ServiceId, command: u8 },
    #[error("sender {0} is not allowed to issue this command")]
    Unauthorized(PeerId),
}

struct Entry<H: ?Sized> {
    id: ServiceId,
    order: i32,
    handler: Box<H>,
}

/// Maps each service id to at most one handler.
///
/// Handlers are kept sorted by execution order (ties keep registration
/// order), which is the order `iter_mut` walks them in.
pub struct ServiceRegistry<C: ?Sized, H: ?Sized = dyn Service<C>> {
    entries: Vec<Entry<H>>,
    _ctx: PhantomData<fn(&mut C)>,
}

impl<C: ?Sized, H: ?Sized + Service<C>> Default for ServiceRegistry<C, H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: ?Sized, H: ?Sized + Service<C>> ServiceRegistry<C, H> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            _ctx: PhantomData,
        }
    }

    pub fn register(&mut self, handler: Box<H>) -> Result<(), RegistryError> {
        let id = handler.service_id();
        if self.contains(id) {
            log::error!("Refusing second handler for service {:?}", id);
            return Err(RegistryError::Duplicate(id));
        }

        let order = handler.execution_order();
        let index = self.entries.partition_point(|e| e.order <= order);
        self.entries.insert(index, Entry { id, order, handler });
        Ok(())
    }

    pub fn contains(&self, id: ServiceId) -> bool {
        self.entries.iter().any(|e| e.id == id)
    }

    pub fn get_mut(&mut self, id: ServiceId) -> Option<&mut H> {
        self.entries
            .iter_mut()
            .find(|e| e.id == id)
            .map(|e| &mut *e.handler)
    }

    /// Reads the routing header and hands the rest of the packet to its
    /// service.
    pub fn dispatch(
        &mut self,
        ctx: &mut C,
        sender: PeerId,
        packet: &mut Packet,
    ) -> Result<(), RoutingError> {
        let (service, command) = packet.read_header()?;
        let service = ServiceId::try_from(service)?;
        self.route(ctx, sender, service, command, packet)
    }

    pub fn route(
        &mut self,
        ctx: &mut C,
        sender: PeerId,
        service: ServiceId,
        command: u8,
        packet: &mut Packet,
    ) -> Result<(), RoutingError> {
        let handler = self
            .get_mut(service)
            .ok_or(RoutingError::NoHandler(service))?;
        handler.receive(ctx, sender, command, packet)
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut H> {
        self.entries.iter_mut().map(|e| &mut *e.handler)
    }

    pub fn ids(&self) -> Vec<ServiceId> {
        self.entries.iter().map(|e| e.id).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Log {
        received: Vec<(ServiceId, u8, u32)>,
    }

    struct Recorder {
        id: ServiceId,
        order: i32,
    }

    impl Service<Log> for Recorder {
        fn service_id(&self) -> ServiceId {
            self.id
        }

        fn execution_order(&self) -> i32 {
            self.order
        }

        fn receive(
            &mut self,
            ctx: &mut Log,
            _sender: PeerId,
            command: u8,
            packet: &mut Packet,
        ) -> Result<(), RoutingError> {
            let value = packet.read::<u32>()?;
            ctx.received.push((self.id, command, value));
            Ok(())
        }
    }

    fn recorder(id: ServiceId, order: i32) -> Box<dyn Service<Log>> {
        Box::new(Recorder { id, order })
    }

    #[test]
    fn second_handler_for_same_service_is_refused() {
        let mut registry: ServiceRegistry<Log> = ServiceRegistry::new();
        registry.register(recorder(ServiceId::Lobby, 0)).unwrap();

        assert_eq!(
            registry.register(recorder(ServiceId::Lobby, 5)),
            Err(RegistryError::Duplicate(ServiceId::Lobby))
        );
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn dispatch_routes_by_header() {
        let mut registry: ServiceRegistry<Log> = ServiceRegistry::new();
        registry.register(recorder(ServiceId::Fx, 0)).unwrap();
        let mut log = Log::default();

        let mut packet = Packet::command(ServiceId::Fx, 1u8);
        packet.write(42u32);
        registry.dispatch(&mut log, 1, &mut packet).unwrap();

        assert_eq!(log.received, vec![(ServiceId::Fx, 1, 42)]);
    }

    #[test]
    fn unregistered_service_is_dropped() {
        let mut registry: ServiceRegistry<Log> = ServiceRegistry::new();
        let mut log = Log::default();

        let mut packet = Packet::command(ServiceId::Event, 0u8);
        packet.write(1u32);
        assert_eq!(
            registry.dispatch(&mut log, 1, &mut packet),
            Err(RoutingError::NoHandler(ServiceId::Event))
        );

        let mut garbage = Packet::from_bytes(vec![250, 0]);
        assert!(matches!(
            registry.dispatch(&mut log, 1, &mut garbage),
            Err(RoutingError::Malformed(_))
        ));
        assert!(log.received.is_empty());
    }

    #[test]
    fn iteration_follows_execution_order() {
        let mut registry: ServiceRegistry<Log> = ServiceRegistry::new();
        registry.register(recorder(ServiceId::Lobby, i32::MAX)).unwrap();
        registry.register(recorder(ServiceId::Object, 100)).unwrap();
        registry.register(recorder(ServiceId::Connection, 0)).unwrap();
        registry.register(recorder(ServiceId::Player, 50)).unwrap();
        registry.register(recorder(ServiceId::Game, 50)).unwrap();

        assert_eq!(
            registry.ids(),
            vec![
                ServiceId::Connection,
                ServiceId::Player,
                ServiceId::Game,
                ServiceId::Object,
                ServiceId::Lobby,
            ]
        );
    }
}
