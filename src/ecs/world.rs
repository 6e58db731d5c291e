//! ECS World - owns every entity and routes damage through its capabilities
//!
//! Every damage change goes through one pipeline: the Damageable is
//! mutated, then the mob state is recomputed, then destructible thresholds
//! are evaluated, then any scanner holding the entity is refreshed, and
//! finally an entity destroyed by its thresholds is removed. Observers are
//! notified after the pipeline has run, so they only ever see settled state.

use ahash::AHashMap;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use super::entity::{Capabilities, Capability, Entity};
use crate::command::table::{CommandTable, InteractionAction, InteractionContext};
use crate::core::config::SimulationConfig;
use crate::core::error::{Result, VitalsError};
use crate::core::types::{EntityId, Seconds, Tick};
use crate::damage::{DamageChangeData, DamageClass, DamageError, Damageable};
use crate::destructible::Destructible;
use crate::engine::{EngineBridge, EngineRequest, RecordingBridge};
use crate::medical::{MedicalScanner, OccupantView, ScannerError};
use crate::mob_state::MobState;
use crate::producers::{
    DamageProducer, Need, NeedBandChange, NeedKind, ProducerContext, ProducerError, ProducerOutput,
    Respiration, Temperature,
};
use crate::prototypes::{PrototypeCatalog, PrototypeError};
use crate::simulation::events::{Deferred, Observer, SimulationEvent};

/// The game world containing all entities
pub struct World<B: EngineBridge = RecordingBridge> {
    pub current_tick: Tick,
    catalog: PrototypeCatalog,
    config: SimulationConfig,
    entities: AHashMap<EntityId, Entity>,
    /// Iteration order for ticks and name lookups
    spawn_order: Vec<EntityId>,
    rng: ChaCha8Rng,
    player: Option<EntityId>,
    observers: Vec<Observer>,
    deferred: Deferred,
    events: Vec<SimulationEvent>,
    commands: CommandTable,
    bridge: B,
}

impl World<RecordingBridge> {
    pub fn new(catalog: PrototypeCatalog, config: SimulationConfig) -> Result<Self> {
        Self::with_bridge(catalog, config, RecordingBridge::new())
    }
}

impl<B: EngineBridge> World<B> {
    pub fn with_bridge(catalog: PrototypeCatalog, config: SimulationConfig, bridge: B) -> Result<Self> {
        config.validate().map_err(VitalsError::Config)?;
        let rng = ChaCha8Rng::seed_from_u64(config.rng_seed);
        Ok(Self {
            current_tick: 0,
            catalog,
            config,
            entities: AHashMap::new(),
            spawn_order: Vec::new(),
            rng,
            player: None,
            observers: Vec::new(),
            deferred: Deferred::new(),
            events: Vec::new(),
            commands: CommandTable::new(),
            bridge,
        })
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn catalog(&self) -> &PrototypeCatalog {
        &self.catalog
    }

    pub fn bridge(&self) -> &B {
        &self.bridge
    }

    pub fn bridge_mut(&mut self) -> &mut B {
        &mut self.bridge
    }

    pub fn commands_mut(&mut self) -> &mut CommandTable {
        &mut self.commands
    }

    // === ENTITIES ===

    pub fn spawn(&mut self, prototype: &str) -> Result<EntityId> {
        self.spawn_named(prototype, None)
    }

    /// Spawn an entity from a prototype, entering its initial states
    pub fn spawn_named(&mut self, prototype: &str, name: Option<&str>) -> Result<EntityId> {
        let proto = self
            .catalog
            .entity(prototype)
            .ok_or_else(|| PrototypeError::UnknownEntityPrototype(prototype.to_string()))?;
        let capabilities =
            Capabilities::from_prototype(proto, &self.catalog, &self.config, &mut self.rng)?;

        let id = EntityId::new();
        let name = name
            .map(str::to_string)
            .unwrap_or_else(|| proto.display_name().to_string());
        let proto_id = proto.id.clone();

        tracing::info!("Spawned {} ({}) as {}", name, proto_id, id);
        self.entities.insert(
            id,
            Entity {
                id,
                name,
                prototype: proto_id,
                capabilities,
            },
        );
        self.spawn_order.push(id);
        self.enter_initial_state(id);
        Ok(id)
    }

    fn enter_initial_state(&mut self, id: EntityId) {
        let mut events = Vec::new();
        let mut requests = Vec::new();
        {
            let Some(entity) = self.entities.get_mut(&id) else {
                return;
            };
            let caps = &mut entity.capabilities;

            if let (Some(mob), Some(damageable)) = (caps.mob_state.as_mut(), caps.damageable.as_ref()) {
                let update = mob.update(id, damageable.total_damage());
                requests.extend(update.requests);
                if let Some(t) = update.transition {
                    events.push(SimulationEvent::StateTransitioned {
                        entity: id,
                        from: t.from,
                        to: t.to,
                    });
                }
            }

            for kind in [NeedKind::Thirst, NeedKind::Hunger] {
                if let Some(need) = caps.need_mut(kind) {
                    requests.extend(need.spawn_effects(id));
                    events.push(SimulationEvent::NeedBandChanged {
                        entity: id,
                        kind,
                        from: None,
                        to: need.band(),
                    });
                }
            }

            if let Some(scanner) = caps.medical_scanner.as_ref() {
                requests.extend(scanner.refresh(id, None));
            }
        }
        self.submit_all(requests);
        for event in events {
            self.emit(event);
        }
    }

    /// Remove an entity, releasing any scanner that holds it
    pub fn despawn(&mut self, id: EntityId) -> Result<()> {
        let entity = self
            .entities
            .remove(&id)
            .ok_or(VitalsError::EntityNotFound(id))?;
        self.spawn_order.retain(|e| *e != id);
        if self.player == Some(id) {
            self.player = None;
        }

        for scanner_id in self.scanners_holding(id) {
            if let Some(scanner) = self
                .entities
                .get_mut(&scanner_id)
                .and_then(|e| e.capabilities.medical_scanner.as_mut())
            {
                let _ = scanner.eject(scanner_id);
            }
            self.refresh_scanner(scanner_id);
        }

        if let Some(occupant) = entity
            .capabilities
            .medical_scanner
            .as_ref()
            .and_then(|s| s.occupant())
        {
            tracing::debug!("Scanner {} released {} on removal", id, occupant);
        }

        self.submit_all(vec![EngineRequest::DeleteEntity { entity: id }]);
        tracing::info!("Removed {} ({})", entity.name, id);
        self.emit(SimulationEvent::EntityDestroyed { entity: id });
        Ok(())
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.entities.contains_key(&id)
    }

    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(&id)
    }

    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// Entity ids in spawn order
    pub fn entity_ids(&self) -> &[EntityId] {
        &self.spawn_order
    }

    /// Entities in spawn order
    pub fn entities(&self) -> impl Iterator<Item = &Entity> + '_ {
        self.spawn_order.iter().filter_map(|id| self.entities.get(id))
    }

    pub fn damageable(&self, id: EntityId) -> Option<&Damageable> {
        self.entities.get(&id)?.capabilities.damageable.as_ref()
    }

    pub fn mob_state(&self, id: EntityId) -> Option<&MobState> {
        self.entities.get(&id)?.capabilities.mob_state.as_ref()
    }

    pub fn destructible(&self, id: EntityId) -> Option<&Destructible> {
        self.entities.get(&id)?.capabilities.destructible.as_ref()
    }

    pub fn need(&self, id: EntityId, kind: NeedKind) -> Option<&Need> {
        let caps = &self.entities.get(&id)?.capabilities;
        match kind {
            NeedKind::Thirst => caps.thirst.as_ref(),
            NeedKind::Hunger => caps.hunger.as_ref(),
        }
    }

    pub fn temperature(&self, id: EntityId) -> Option<&Temperature> {
        self.entities.get(&id)?.capabilities.temperature.as_ref()
    }

    pub fn respiration(&self, id: EntityId) -> Option<&Respiration> {
        self.entities.get(&id)?.capabilities.respiration.as_ref()
    }

    pub fn medical_scanner(&self, id: EntityId) -> Option<&MedicalScanner> {
        self.entities.get(&id)?.capabilities.medical_scanner.as_ref()
    }

    /// Entity the administrative `_` selector refers to
    pub fn player(&self) -> Option<EntityId> {
        self.player
    }

    pub fn set_player(&mut self, player: Option<EntityId>) -> Result<()> {
        if let Some(id) = player {
            if !self.contains(id) {
                return Err(VitalsError::EntityNotFound(id));
            }
        }
        self.player = player;
        Ok(())
    }

    fn entity_mut(&mut self, id: EntityId) -> Result<&mut Entity> {
        self.entities
            .get_mut(&id)
            .ok_or(VitalsError::EntityNotFound(id))
    }

    // === DAMAGE ===

    /// Apply a damage change and run the dispatch pipeline
    pub fn change_damage(
        &mut self,
        id: EntityId,
        class: &DamageClass,
        amount: i32,
        ignore_resistances: bool,
    ) -> std::result::Result<Vec<DamageChangeData>, DamageError> {
        let entity = self
            .entities
            .get_mut(&id)
            .ok_or(DamageError::EntityNotFound(id))?;
        let damageable = entity
            .capabilities
            .damageable
            .as_mut()
            .ok_or(DamageError::NotDamageable(id))?;
        let changes = damageable.change_damage(class, amount, ignore_resistances)?;
        self.after_damage_change(id, changes.clone());
        Ok(changes)
    }

    /// `change_damage`, reporting only whether anything changed
    pub fn try_change_damage(
        &mut self,
        id: EntityId,
        class: &DamageClass,
        amount: i32,
        ignore_resistances: bool,
    ) -> bool {
        match self.change_damage(id, class, amount, ignore_resistances) {
            Ok(_) => true,
            Err(e) => {
                tracing::debug!("Damage change on {} rejected: {}", id, e);
                false
            }
        }
    }

    fn after_damage_change(&mut self, id: EntityId, changes: Vec<DamageChangeData>) {
        let mut events = Vec::new();
        let mut destroyed = false;
        {
            let Some(entity) = self.entities.get_mut(&id) else {
                return;
            };
            let caps = &mut entity.capabilities;
            let Some(damageable) = caps.damageable.as_ref() else {
                return;
            };
            let total = damageable.total_damage();

            if !changes.is_empty() {
                events.push(SimulationEvent::DamageChanged {
                    entity: id,
                    changes,
                    total,
                });
            }

            if let Some(mob) = caps.mob_state.as_mut() {
                let update = mob.update(id, total);
                submit_to(&mut self.bridge, update.requests);
                if let Some(t) = update.transition {
                    events.push(SimulationEvent::StateTransitioned {
                        entity: id,
                        from: t.from,
                        to: t.to,
                    });
                }
            }

            if let Some(destructible) = caps.destructible.as_mut() {
                for firing in destructible.update(id, damageable, &mut self.bridge, &mut self.rng) {
                    destroyed |= firing.destroys_owner;
                    events.push(SimulationEvent::ThresholdCrossed {
                        entity: id,
                        threshold: firing.index,
                        executed: firing.executed,
                        failed: firing.failed,
                    });
                }
            }
        }

        for scanner_id in self.scanners_holding(id) {
            self.refresh_scanner(scanner_id);
        }

        for event in events {
            self.emit(event);
        }

        if destroyed {
            // Cannot fail: the entity was present above
            let _ = self.despawn(id);
        }
    }

    /// Heal everything, revive, and restore needs, temperature and oxygen
    pub fn rejuvenate(&mut self, id: EntityId) -> Result<()> {
        let normal_temperature = self.config.normal_body_temperature;
        let mut requests = Vec::new();
        let mut band_changes = Vec::new();

        let entity = self.entity_mut(id)?;
        let name = entity.name.clone();
        let caps = &mut entity.capabilities;

        let changes = caps
            .damageable
            .as_mut()
            .map(|d| d.heal_all())
            .unwrap_or_default();

        for kind in [NeedKind::Thirst, NeedKind::Hunger] {
            if let Some(need) = caps.need_mut(kind) {
                let output = need.reset(id);
                requests.extend(output.requests);
                band_changes.extend(output.band_change);
            }
        }
        if let Some(temperature) = caps.temperature.as_mut() {
            temperature.set_temperature(normal_temperature);
        }
        if let Some(respiration) = caps.respiration.as_mut() {
            requests.extend(respiration.restore(id).requests);
        }

        self.after_damage_change(id, changes);
        self.submit_all(requests);
        for change in band_changes {
            self.emit_band_change(id, change);
        }
        tracing::info!("Rejuvenated {} ({})", name, id);
        Ok(())
    }

    // === PRODUCERS ===

    /// Run every producer of one entity and apply what they return.
    ///
    /// A faulting producer is logged and skipped; the others still run and
    /// their outputs are applied. The first fault is returned afterwards.
    pub fn update_producers(
        &mut self,
        id: EntityId,
        elapsed: Seconds,
    ) -> std::result::Result<(), ProducerError> {
        let (outputs, fault) = {
            let Some(entity) = self.entities.get_mut(&id) else {
                return Ok(());
            };
            let ctx = ProducerContext {
                is_dead: entity.is_dead(),
            };
            let mut outputs = Vec::new();
            let mut fault = None;
            for producer in entity.capabilities.producers_mut() {
                match producer.update(id, elapsed, &ctx) {
                    Ok(output) => outputs.push(output),
                    Err(e) => {
                        tracing::error!("Entity {}: {} producer faulted: {}", id, producer.name(), e);
                        fault.get_or_insert(e);
                    }
                }
            }
            (outputs, fault)
        };

        for output in outputs {
            self.apply_producer_output(id, output);
        }
        match fault {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    fn apply_producer_output(&mut self, id: EntityId, output: ProducerOutput) {
        if output.is_empty() {
            return;
        }
        self.submit_all(output.requests);
        if let Some(change) = output.band_change {
            self.emit_band_change(id, change);
        }
        for delta in output.damage {
            if !self.contains(id) {
                break;
            }
            let class = DamageClass::Type(delta.damage_type);
            if let Err(e) = self.change_damage(id, &class, delta.amount, delta.ignore_resistances) {
                tracing::debug!("Entity {} ignored {} {} damage: {}", id, delta.amount, class, e);
            }
        }
    }

    /// Raise a need, e.g. after drinking or eating
    pub fn satiate(&mut self, id: EntityId, kind: NeedKind, amount: f32) -> Result<()> {
        let entity = self.entity_mut(id)?;
        let need = entity
            .capabilities
            .need_mut(kind)
            .ok_or_else(|| VitalsError::MissingCapability {
                entity: id,
                capability: kind.name().to_string(),
            })?;
        let output = need.satiate(id, amount);
        self.apply_producer_output(id, output);
        Ok(())
    }

    /// Add (positive) or remove (negative) heat from an entity's body
    pub fn exchange_heat(&mut self, id: EntityId, heat: f32) -> Result<()> {
        let temperature = self
            .entity_mut(id)?
            .capabilities
            .temperature
            .as_mut()
            .ok_or(VitalsError::MissingCapability {
                entity: id,
                capability: Capability::Temperature.to_string(),
            })?;
        if heat >= 0.0 {
            temperature.receive_heat(heat);
        } else {
            temperature.remove_heat(-heat);
        }
        Ok(())
    }

    pub fn set_breathing(&mut self, id: EntityId, breathing: bool) -> Result<()> {
        self.entity_mut(id)?
            .capabilities
            .respiration
            .as_mut()
            .ok_or(VitalsError::MissingCapability {
                entity: id,
                capability: Capability::Respiration.to_string(),
            })?
            .set_breathing(breathing);
        Ok(())
    }

    // === MEDICAL SCANNER ===

    fn scanner_mut(&mut self, id: EntityId) -> Result<&mut MedicalScanner> {
        self.entity_mut(id)?
            .capabilities
            .medical_scanner
            .as_mut()
            .ok_or_else(|| ScannerError::NotAScanner(id).into())
    }

    fn scanners_holding(&self, body: EntityId) -> Vec<EntityId> {
        self.entities()
            .filter(|e| {
                e.capabilities
                    .medical_scanner
                    .as_ref()
                    .is_some_and(|s| s.occupant() == Some(body))
            })
            .map(|e| e.id)
            .collect()
    }

    fn refresh_scanner(&mut self, scanner_id: EntityId) {
        let requests = {
            let Some(scanner) = self.medical_scanner(scanner_id) else {
                return;
            };
            let occupant = scanner
                .occupant()
                .and_then(|id| self.entities.get(&id))
                .map(|e| OccupantView {
                    id: e.id,
                    damageable: e.capabilities.damageable.as_ref(),
                    mob_state: e.capabilities.mob_state.as_ref(),
                });
            scanner.refresh(scanner_id, occupant.as_ref())
        };
        self.submit_all(requests);
    }

    pub fn insert_into_scanner(&mut self, scanner_id: EntityId, body: EntityId) -> Result<()> {
        let has_damageable = self
            .entity(body)
            .ok_or(VitalsError::EntityNotFound(body))?
            .capabilities
            .damageable
            .is_some();
        if let Some(holder) = self.scanners_holding(body).first() {
            return Err(ScannerError::AlreadyInside {
                body,
                scanner: *holder,
            }
            .into());
        }
        self.scanner_mut(scanner_id)?
            .insert(scanner_id, body, has_damageable)?;
        tracing::info!("{} placed in scanner {}", body, scanner_id);
        self.refresh_scanner(scanner_id);
        Ok(())
    }

    pub fn eject_from_scanner(&mut self, scanner_id: EntityId) -> Result<EntityId> {
        let body = self.scanner_mut(scanner_id)?.eject(scanner_id)?;
        tracing::info!("{} ejected from scanner {}", body, scanner_id);
        self.refresh_scanner(scanner_id);
        Ok(body)
    }

    pub fn set_scanner_powered(&mut self, scanner_id: EntityId, powered: bool) -> Result<()> {
        self.scanner_mut(scanner_id)?.set_powered(powered);
        self.refresh_scanner(scanner_id);
        Ok(())
    }

    // === INTERACTIONS ===

    fn interaction_context(
        &self,
        actor: EntityId,
        target: EntityId,
    ) -> Result<(InteractionContext, Vec<Capability>)> {
        let actor_entity = self.entity(actor).ok_or(VitalsError::EntityNotFound(actor))?;
        let target_entity = self.entity(target).ok_or(VitalsError::EntityNotFound(target))?;
        let ctx = InteractionContext {
            actor_can_act: actor_entity.capabilities.can_act(),
            target_occupied: target_entity
                .capabilities
                .medical_scanner
                .as_ref()
                .is_some_and(|s| s.is_occupied()),
        };
        Ok((ctx, target_entity.capabilities.list()))
    }

    /// Actions `actor` can currently perform on `target`
    pub fn available_actions(&self, actor: EntityId, target: EntityId) -> Result<Vec<InteractionAction>> {
        let (ctx, capabilities) = self.interaction_context(actor, target)?;
        Ok(self.commands.visible_actions(&capabilities, &ctx))
    }

    /// Perform an action through the command table. `Insert` needs a `subject`.
    pub fn interact(
        &mut self,
        actor: EntityId,
        target: EntityId,
        action: InteractionAction,
        subject: Option<EntityId>,
    ) -> Result<()> {
        let unavailable = || VitalsError::ActionUnavailable {
            action: action.name().to_string(),
            target,
        };
        let (ctx, capabilities) = self.interaction_context(actor, target)?;
        let capability = self
            .commands
            .find(&capabilities, action, &ctx)
            .map(|spec| spec.capability)
            .ok_or_else(unavailable)?;

        match (capability, action) {
            (Capability::MedicalScanner, InteractionAction::Enter) => {
                self.insert_into_scanner(target, actor)
            }
            (Capability::MedicalScanner, InteractionAction::Eject) => {
                self.eject_from_scanner(target).map(|_| ())
            }
            (Capability::MedicalScanner, InteractionAction::Insert) => {
                let subject = subject.ok_or_else(unavailable)?;
                self.insert_into_scanner(target, subject)
            }
            _ => Err(unavailable()),
        }
    }

    // === EVENTS ===

    /// Register an observer for every simulation event
    pub fn subscribe(&mut self, observer: impl FnMut(&SimulationEvent, &mut Deferred) + 'static) {
        self.observers.push(Box::new(observer));
    }

    /// Take every event logged since the last drain
    pub fn drain_events(&mut self) -> Vec<SimulationEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn events(&self) -> &[SimulationEvent] {
        &self.events
    }

    pub fn pending_deferred(&self) -> usize {
        self.deferred.len()
    }

    /// Apply damage observers scheduled during earlier notifications
    pub fn apply_deferred(&mut self) {
        for work in self.deferred.take() {
            if let Err(e) = self.change_damage(
                work.target,
                &work.class,
                work.amount,
                work.ignore_resistances,
            ) {
                tracing::debug!("Deferred damage on {} dropped: {}", work.target, e);
            }
        }
    }

    pub fn advance_tick(&mut self) {
        self.current_tick += 1;
    }

    fn emit(&mut self, event: SimulationEvent) {
        for observer in self.observers.iter_mut() {
            observer(&event, &mut self.deferred);
        }
        self.events.push(event);
    }

    fn emit_band_change(&mut self, id: EntityId, change: NeedBandChange) {
        self.emit(SimulationEvent::NeedBandChanged {
            entity: id,
            kind: change.kind,
            from: change.from,
            to: change.to,
        });
    }

    fn submit_all(&mut self, requests: Vec<EngineRequest>) {
        submit_to(&mut self.bridge, requests);
    }
}

fn submit_to<B: EngineBridge + ?Sized>(bridge: &mut B, requests: Vec<EngineRequest>) {
    for request in requests {
        let entity = request.entity();
        if let Err(e) = bridge.submit(request) {
            tracing::warn!("Engine refused request for {}: {}", entity, e);
        }
    }
}
