//! CharacterController — movement core одного персонажа
//!
//! Собирает вместе state machine режимов, kinematic mover, grounding,
//! hitbox и ledge tracker. Один тик = один вызов fixed_tick (или
//! frame_tick в Transform режиме интеграции). Внешние вызовы (move_to,
//! jump, set_movement_type...) приходят между тиками из того же потока.

use bevy::prelude::*;

use crate::config::{CharacterConfig, ConfigError, IntegrationMode};
use crate::game_time::TimeSource;
use crate::logger;
use crate::physics::body::CharacterBody;
use crate::physics::query::SpatialQuery;

use super::grounding::{GroundingChange, GroundingController};
use super::hitbox::Hitbox;
use super::ledge::{lateral_input, LedgeLookup, LedgeTracker};
use super::mode::{ModeObserver, ModeTransition, MovementMode, MovementStateMachine};
use super::mover::{KinematicMover, MoveOutcome, Probe};

/// Сколько переходов держим до drain_transitions (дальше теряются старые)
pub const MAX_PENDING_TRANSITIONS: usize = 64;

/// Что произошло на уступе за тик
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LedgeOutcome {
    /// Висим, позиция прибита к уступу
    Held { shift: f32 },
    /// Боковой сдвиг отменён probe'ом
    Blocked,
    /// Уступ не найден в реестре — стоим на месте (velocity обнулена)
    Missing,
    /// Сошли прыжком (прыжок остаётся в очереди)
    JumpedOff,
    /// Ушли дальше max_distance
    Overshot,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TickReport {
    Ground {
        grounding: GroundingChange,
        movement: MoveOutcome,
    },
    Ledge(LedgeOutcome),
}

#[derive(Component, Debug)]
pub struct CharacterController {
    config: CharacterConfig,
    modes: MovementStateMachine,
    mover: KinematicMover,
    grounding: GroundingController,
    hitbox: Hitbox,
    ledge: LedgeTracker,
    /// Свой collider (игнорируется всеми probe'ами)
    own_collider: Option<Entity>,
    channel_registered: bool,
    /// Переходы с последнего drain_transitions (для ECS событий)
    outbox: Vec<ModeTransition>,
}

impl CharacterController {
    /// Базовый hitbox фиксируется здесь и больше не меняется
    pub fn new(config: CharacterConfig) -> Result<Self, ConfigError> {
        let config = config.validated()?;
        Ok(Self {
            hitbox: Hitbox::new(config.hitbox),
            config,
            modes: MovementStateMachine::default(),
            mover: KinematicMover::default(),
            grounding: GroundingController::default(),
            ledge: LedgeTracker::default(),
            own_collider: None,
            channel_registered: false,
            outbox: Vec::new(),
        })
    }

    pub fn with_collider(mut self, collider: Entity) -> Self {
        self.own_collider = Some(collider);
        self
    }

    pub fn set_own_collider(&mut self, collider: Option<Entity>) {
        self.own_collider = collider;
    }

    pub fn own_collider(&self) -> Option<Entity> {
        self.own_collider
    }

    // --- Queries ---

    pub fn config(&self) -> &CharacterConfig {
        &self.config
    }

    pub fn movement_type(&self) -> MovementMode {
        self.modes.current()
    }

    pub fn speed_modifier(&self) -> f32 {
        self.config.profiles.speed_modifier(self.modes.current())
    }

    /// accel_curve(movement_time) × movement_speed × speed_modifier
    pub fn current_speed(&self) -> f32 {
        self.config.acceleration.evaluate(self.mover.movement_time())
            * self.config.movement_speed
            * self.speed_modifier()
    }

    pub fn target(&self) -> Option<Vec3> {
        self.mover.target()
    }

    pub fn movement_time(&self) -> f32 {
        self.mover.movement_time()
    }

    pub fn is_grounded(&self) -> bool {
        self.grounding.is_grounded()
    }

    pub fn pending_jump(&self) -> f32 {
        self.grounding.pending_jump()
    }

    pub fn hitbox(&self) -> &Hitbox {
        &self.hitbox
    }

    pub fn current_ledge(&self) -> Option<Entity> {
        self.ledge.current()
    }

    pub fn ledge_distance(&self) -> f32 {
        self.ledge.ledge_distance()
    }

    pub fn ledge_cooldown(&self) -> Option<f32> {
        self.ledge.cooldown()
    }

    pub fn integration(&self) -> IntegrationMode {
        self.config.integration
    }

    // --- Interface ---

    pub fn move_to(&mut self, position: Vec3) {
        self.mover.move_to(position);
    }

    pub fn stop_moving(&mut self) {
        self.mover.stop();
    }

    /// Телепорт без probe'ов; cancel_movement сбрасывает target
    pub fn warp_to(&mut self, body: &mut dyn CharacterBody, position: Vec3, cancel_movement: bool) {
        body.set_position(position);
        if cancel_movement {
            self.mover.stop();
        }
    }

    /// Прыжок на следующем тике. Нефинитный или ≤ 0 масштаб отклоняется
    pub fn jump(&mut self, force_scale: f32) -> bool {
        if !force_scale.is_finite() || force_scale <= 0.0 {
            logger::log_warning(&format!("jump: rejected force scale {}", force_scale));
            return false;
        }
        self.grounding.queue_jump(force_scale);
        true
    }

    pub fn force_grounded_state(&mut self, grounded: bool) {
        self.grounding.force_grounded(grounded);
    }

    /// Безусловная смена режима + ровно одно уведомление (old, new)
    pub fn set_movement_type(&mut self, mode: MovementMode) {
        let transition = self.modes.transition(mode);

        self.hitbox.on_mode_changed(transition, &self.config.profiles);

        // Ушли с уступа в обход dismount — всё равно запускаем regrab cooldown
        if transition.old == MovementMode::LedgeGrabbing && transition.new != MovementMode::LedgeGrabbing {
            self.ledge.start_cooldown(self.config.profiles.ledge.regrab_cooldown);
        }

        self.modes.notify(transition);
        if self.outbox.len() >= MAX_PENDING_TRANSITIONS {
            self.outbox.remove(0);
        }
        self.outbox.push(transition);

        logger::log(&format!(
            "movement mode: {:?} → {:?}",
            transition.old, transition.new
        ));
    }

    pub fn subscribe(&mut self, observer: impl ModeObserver + 'static) {
        self.modes.subscribe(observer);
    }

    /// Переходы с прошлого вызова, от старых к новым
    ///
    /// В ECS забирает publish_mode_changes. Без plugin'а (голый core)
    /// вызывающий сам drain'ит очередь; хранятся последние
    /// MAX_PENDING_TRANSITIONS переходов.
    pub fn drain_transitions(&mut self) -> Vec<ModeTransition> {
        std::mem::take(&mut self.outbox)
    }

    /// Привязка к уступу. false = no-op (тот же уступ без override или уступа нет)
    pub fn snap_to_ledge(
        &mut self,
        body: &dyn CharacterBody,
        ledge: Entity,
        ledges: &dyn LedgeLookup,
        overwrite_cooldown: bool,
    ) -> bool {
        if !self.ledge.should_attach(ledge, overwrite_cooldown) {
            return false;
        }

        let Some(anchor) = ledges.ledge(ledge) else {
            logger::log_warning(&format!("snap_to_ledge: ledge {:?} not found", ledge));
            return false;
        };

        let distance = anchor.project(body.position(), self.config.profiles.ledge.holding_offset);
        self.ledge.attach(ledge, distance);
        self.set_movement_type(MovementMode::LedgeGrabbing);

        logger::log_info(&format!(
            "ledge {:?} grabbed at lateral offset {:.3}",
            ledge, distance
        ));
        true
    }

    // --- Tick ---

    /// Физический тик (PhysicsBody режим интеграции)
    pub fn fixed_tick(
        &mut self,
        body: &mut dyn CharacterBody,
        query: &dyn SpatialQuery,
        ledges: &dyn LedgeLookup,
        time: &mut dyn TimeSource,
    ) -> TickReport {
        self.ensure_channel(time);
        let delta = time.fixed_delta_time(&self.config.time_channel);
        self.tick(body, query, ledges, delta)
    }

    /// Тик кадра (Transform режим интеграции)
    pub fn frame_tick(
        &mut self,
        body: &mut dyn CharacterBody,
        query: &dyn SpatialQuery,
        ledges: &dyn LedgeLookup,
        time: &mut dyn TimeSource,
    ) -> TickReport {
        self.ensure_channel(time);
        let delta = time.delta_time(&self.config.time_channel);
        self.tick(body, query, ledges, delta)
    }

    fn ensure_channel(&mut self, time: &mut dyn TimeSource) {
        if self.channel_registered {
            return;
        }
        if !time.has_channel(&self.config.time_channel) {
            time.register_channel(&self.config.time_channel);
        }
        self.channel_registered = true;
    }

    pub fn tick(
        &mut self,
        body: &mut dyn CharacterBody,
        query: &dyn SpatialQuery,
        ledges: &dyn LedgeLookup,
        delta: f32,
    ) -> TickReport {
        if self.modes.current() != MovementMode::LedgeGrabbing && self.ledge.tick_cooldown(delta) {
            logger::log_info("ledge regrab cooldown expired");
        }

        // Копия hitbox: probe читает его, пока self мутируется
        let hitbox = self.hitbox;
        let settings = self.config.probes;
        let probe = Probe {
            query,
            own_collider: self.own_collider,
            hitbox: &hitbox,
            settings: &settings,
        };

        if self.modes.current() == MovementMode::LedgeGrabbing {
            return TickReport::Ledge(self.ledge_tick(body, &probe, ledges, delta));
        }

        let grounding = self.grounding.tick(
            body,
            &probe,
            self.config.gravity_magnitude(),
            self.config.jump_height,
        );
        match grounding {
            GroundingChange::Jumped { impulse } => {
                logger::log(&format!("jump: impulse {:.3}", impulse));
            }
            GroundingChange::Landed => logger::log("landed"),
            GroundingChange::LostSupport => logger::log("lost ground support"),
            GroundingChange::None => {}
        }

        if self.mover.target().is_some() {
            self.mover.advance_time(delta);
        }
        let speed = self.current_speed();
        let direct_write = self.config.integration == IntegrationMode::Transform;
        let movement = self.mover.step(body, &probe, speed, delta, direct_write);

        TickReport::Ground { grounding, movement }
    }

    fn ledge_tick(
        &mut self,
        body: &mut dyn CharacterBody,
        probe: &Probe<'_>,
        ledges: &dyn LedgeLookup,
        delta: f32,
    ) -> LedgeOutcome {
        // Прыжок снимает с уступа, даже если сам уступ уже пропал
        if self.grounding.pending_jump() != 0.0 {
            self.dismount();
            return LedgeOutcome::JumpedOff;
        }

        let Some(anchor) = self.ledge.current().and_then(|id| ledges.ledge(id)) else {
            // Уступа нет: стоим на месте, пока режим не сменят снаружи
            body.set_velocity(Vec3::ZERO);
            self.grounding.force_grounded(true);
            return LedgeOutcome::Missing;
        };

        let mut shift = 0.0;
        let mut blocked = false;

        match self.mover.target() {
            Some(target) => {
                self.mover.advance_time(delta);
                let direction = (target - body.position()).normalize_or_zero();
                let displacement = lateral_input(direction, anchor.direction) * self.current_speed() * delta;

                if displacement != 0.0 {
                    let probe_direction = anchor.direction * displacement.signum();
                    if probe.forward_blocked(body.position(), probe_direction, displacement.abs()) {
                        blocked = true;
                    } else {
                        self.ledge.add_distance(displacement);
                        shift = displacement;
                    }
                }

                if self.ledge.exceeded(anchor.max_distance) {
                    self.dismount();
                    return LedgeOutcome::Overshot;
                }
            }
            None => self.mover.reset_time(),
        }

        // Уступ полностью перекрывает физику
        let holding_offset = self.config.profiles.ledge.holding_offset;
        body.set_position(anchor.pinned_position(self.ledge.ledge_distance(), holding_offset));
        body.set_velocity(Vec3::ZERO);
        body.set_rotation(anchor.facing());
        self.grounding.force_grounded(true);

        if blocked {
            LedgeOutcome::Blocked
        } else {
            LedgeOutcome::Held { shift }
        }
    }

    fn dismount(&mut self) {
        self.ledge.start_cooldown(self.config.profiles.ledge.regrab_cooldown);
        self.grounding.force_grounded(false);
        self.set_movement_type(MovementMode::Standard);
        logger::log_info("ledge released");
    }
}
