use grasp::net::{InteractableCommand, ObjectCommand};
use grasp::object::player_id_of;
use grasp::{
    Archetype, ObjectId, Packet, PeerId, PlayerId, Pose, PrefabKey, RoutingError, Service,
    ServiceId, Verb,
};

use super::{from_server, player};
use crate::context::ClientContext;
use crate::events::ClientEvent;
use crate::interpolation::ReplicatedTransform;
use crate::objects::{ClientInteractable, ClientObject, ClientProp};

/// Object directory traffic: envelopes, catch-up, spawn and destroy.
pub struct ObjectService;

impl ObjectService {
    fn communication(ctx: &mut ClientContext, packet: &mut Packet) -> Result<(), RoutingError> {
        let target = packet.read::<ObjectId>()?;
        let service = ServiceId::try_from(packet.read::<u8>()?)?;
        let command = packet.read::<u8>()?;

        // denies reach the local player before its avatar exists
        let local = player_id_of(target).is_some_and(|p| ctx.is_local(p));
        if !ctx.objects.contains(target) && !(local && service == ServiceId::Player) {
            return Err(RoutingError::ObjectNotFound(target));
        }
        match (service, player_id_of(target)) {
            (ServiceId::Player, Some(player)) => {
                player::receive_envelope(ctx, player, command, packet)
            }
            (ServiceId::Interactable, None) => {
                receive_interactable_envelope(ctx, target, command, packet)
            }
            _ => Err(RoutingError::UnexpectedCommand { service, command }),
        }
    }

    /// Instantiates the map's own objects under the ids the server gave
    /// them, in map order.
    fn objects_init(ctx: &mut ClientContext, packet: &mut Packet) -> Result<(), RoutingError> {
        let count = packet.read::<u16>()?;
        let mut ids = Vec::with_capacity(count as usize);
        for _ in 0..count {
            ids.push(packet.read::<ObjectId>()?);
        }

        let Some(map) = ctx.map.clone() else {
            log::error!("Received {} map objects before knowing the map", ids.len());
            return Ok(());
        };
        if ids.len() != map.starting_objects.len() {
            log::warn!(
                "Server lists {} map objects, map '{}' has {}",
                ids.len(),
                map.name,
                map.starting_objects.len()
            );
        }

        for (id, starting) in ids.into_iter().zip(map.starting_objects.iter()) {
            let Some(client) = ctx.prefabs.resolve_client_path(starting.prefab) else {
                log::error!("Map object {} has unknown prefab {}", id, starting.prefab);
                continue;
            };
            spawn(ctx, id, client.key, starting.pose);
        }
        Ok(())
    }

    fn spawn(ctx: &mut ClientContext, packet: &mut Packet) -> Result<(), RoutingError> {
        let id = packet.read::<ObjectId>()?;
        let client_key = packet.read::<PrefabKey>()?;
        let pose = packet.read::<Pose>()?;
        let owner = if packet.unread_length() > 0 {
            Some(packet.read::<PlayerId>()?)
        } else {
            None
        };

        if spawn(ctx, id, client_key, pose) {
            if let Some(owner) = owner {
                ctx.objects.set_holder(id, owner);
            }
        }
        Ok(())
    }
}

/// Adds an object announced by the server; false if it was refused.
fn spawn(ctx: &mut ClientContext, id: ObjectId, client_key: PrefabKey, pose: Pose) -> bool {
    let archetype = ctx
        .prefabs
        .resolve_server_path(client_key)
        .and_then(|server| ctx.prefabs.descriptor(server.key))
        .map(|d| d.archetype);
    let Some(archetype) = archetype else {
        log::error!("Cannot instantiate object {}: unknown prefab {}", id, client_key);
        return false;
    };

    let transform = ReplicatedTransform::spawned_at(pose);
    let object = match archetype {
        Archetype::Interactable(effect) => ClientObject::Interactable(ClientInteractable {
            id,
            client_key,
            transform,
            owner: None,
            effect,
        }),
        Archetype::Prop => ClientObject::Prop(ClientProp {
            id,
            client_key,
            transform,
        }),
    };

    if !ctx.objects.insert(object) {
        log::warn!("Ignoring duplicate spawn of object {}", id);
        return false;
    }
    ctx.push_event(ClientEvent::ObjectSpawned { id });
    true
}

fn destroy(ctx: &mut ClientContext, id: ObjectId) {
    ctx.pending.forget_object(id);
    if ctx.objects.remove(id).is_some() {
        ctx.push_event(ClientEvent::ObjectDestroyed { id });
    }
}

fn receive_interactable_envelope(
    ctx: &mut ClientContext,
    target: ObjectId,
    command: u8,
    packet: &mut Packet,
) -> Result<(), RoutingError> {
    let command = InteractableCommand::try_from(command)?;

    if command == InteractableCommand::Transform {
        let tick = packet.read::<u32>()?;
        let pose = packet.read::<Pose>()?;
        ctx.observe_tick(tick);
        if ctx.drives(target) {
            return Ok(());
        }
        if let Some(object) = ctx.objects.get_mut(target) {
            object.transform_mut().apply_snapshot(tick, pose);
        }
        return Ok(());
    }

    let Some(verb) = Verb::from_granted(command) else {
        return Err(RoutingError::UnexpectedCommand {
            service: ServiceId::Interactable,
            command: command.into(),
        });
    };
    let player = packet.read::<PlayerId>()?;

    match verb {
        Verb::Grab => {
            ctx.objects.set_holder(target, player);
        }
        Verb::Interact => {}
        Verb::Drop => {
            let pose = packet.read::<Pose>()?;
            ctx.objects.clear_holder(target);
            if let Some(object) = ctx.objects.get_mut(target) {
                object.transform_mut().set_target(pose);
            }
        }
    }

    if ctx.is_local(player) {
        ctx.pending.resolve(verb, target);
    }
    ctx.push_event(ClientEvent::Granted {
        verb,
        target,
        player,
    });
    Ok(())
}

impl Service<ClientContext> for ObjectService {
    fn service_id(&self) -> ServiceId {
        ServiceId::Object
    }

    fn receive(
        &mut self,
        ctx: &mut ClientContext,
        sender: PeerId,
        command: u8,
        packet: &mut Packet,
    ) -> Result<(), RoutingError> {
        from_server(sender)?;
        match ObjectCommand::try_from(command)? {
            ObjectCommand::Communication => Self::communication(ctx, packet),
            ObjectCommand::ObjectsInit => Self::objects_init(ctx, packet),
            ObjectCommand::Spawn => Self::spawn(ctx, packet),
            ObjectCommand::Destroy => {
                let id = packet.read::<ObjectId>()?;
                destroy(ctx, id);
                Ok(())
            }
            ObjectCommand::SpawnRequest | ObjectCommand::DestroyRequest => {
                Err(RoutingError::UnexpectedCommand {
                    service: ServiceId::Object,
                    command,
                })
            }
        }
    }
}
