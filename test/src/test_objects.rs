//! Replicable and predicted types shared by the end-to-end tests

use std::time::Duration;

use volley_shared::{
    stable_hash32, ByteReader, ByteWrite, Channel, ConnectionId, MethodHash, Outbox,
    PhysicsStepper, Predicted, ReadPermission, ReplicateContext, RpcError, RpcKind, RpcOptions,
    RpcRegistry, Serde, SerdeErr, SyncDictionary, SyncList, SyncSet, SyncSettings, SyncType,
    SyncVar, Tick,
};

// Player

pub const JUMP: MethodHash = stable_hash32("Player::jump");
pub const EMOTE: MethodHash = stable_hash32("Player::emote");
pub const WHISPER: MethodHash = stable_hash32("Player::whisper");
pub const RENAME: MethodHash = stable_hash32("Player::rename");

/// A replicable with one member of every kind
pub struct Player {
    /// Sent unreliably, every tick it changes
    pub health: SyncVar<u32>,
    pub name: SyncVar<String>,
    pub inventory: SyncList<u32>,
    pub tags: SyncSet<String>,
    /// Only the owner sees its stats
    pub stats: SyncDictionary<String, i32>,

    pub jumps: Vec<(u8, Option<ConnectionId>)>,
    pub emotes: Vec<String>,
    pub whispers: Vec<(String, Option<ConnectionId>)>,
    pub started_server: bool,
    pub started_client: bool,
}

impl Default for Player {
    fn default() -> Self {
        Self::new()
    }
}

impl Player {
    pub fn new() -> Self {
        Self {
            health: SyncVar::with_settings(
                100,
                SyncSettings::new()
                    .channel(Channel::Unreliable)
                    .send_rate(Duration::ZERO),
            ),
            name: SyncVar::with_settings(String::new(), SyncSettings::new().send_rate(Duration::ZERO)),
            inventory: SyncList::with_settings(SyncSettings::new().send_rate(Duration::ZERO)),
            tags: SyncSet::with_settings(SyncSettings::new().send_rate(Duration::ZERO)),
            stats: SyncDictionary::with_settings(
                SyncSettings::new()
                    .read_permission(ReadPermission::OwnerOnly)
                    .send_rate(Duration::ZERO),
            ),
            jumps: Vec::new(),
            emotes: Vec::new(),
            whispers: Vec::new(),
            started_server: false,
            started_client: false,
        }
    }
}

impl volley_shared::Replicable for Player {
    fn sync_types(&mut self) -> Vec<&mut dyn SyncType> {
        vec![
            &mut self.health as &mut dyn SyncType,
            &mut self.name as &mut dyn SyncType,
            &mut self.inventory as &mut dyn SyncType,
            &mut self.tags as &mut dyn SyncType,
            &mut self.stats as &mut dyn SyncType,
        ]
    }

    fn register_rpcs(registry: &mut RpcRegistry<Self>) -> Result<(), RpcError> {
        registry.try_register(
            JUMP,
            RpcKind::Server,
            RpcOptions::new(),
            |player: &mut Player, height: u8, sender| player.jumps.push((height, sender)),
        )?;
        registry.try_register(
            EMOTE,
            RpcKind::Observers,
            RpcOptions::new().buffer_last(true),
            |player: &mut Player, emote: String, _| player.emotes.push(emote),
        )?;
        registry.try_register(
            RENAME,
            RpcKind::Server,
            RpcOptions::new().require_ownership(false),
            |player: &mut Player, name: String, _| player.name.set(name),
        )?;
        registry.try_register(
            WHISPER,
            RpcKind::Target,
            RpcOptions::new(),
            |player: &mut Player, text: String, connection| player.whispers.push((text, connection)),
        )
    }

    fn on_start_server(&mut self) {
        self.started_server = true;
    }

    fn on_start_client(&mut self) {
        self.started_client = true;
    }
}

// Motor

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MotorInput {
    pub thrust: i32,
}

impl Serde for MotorInput {
    fn ser(&self, writer: &mut dyn ByteWrite) {
        self.thrust.ser(writer);
    }

    fn de(reader: &mut ByteReader) -> Result<Self, SerdeErr> {
        Ok(Self {
            thrust: i32::de(reader)?,
        })
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MotorState {
    pub position: i64,
    pub velocity: i64,
}

impl Serde for MotorState {
    fn ser(&self, writer: &mut dyn ByteWrite) {
        self.position.ser(writer);
        self.velocity.ser(writer);
    }

    fn de(reader: &mut ByteReader) -> Result<Self, SerdeErr> {
        Ok(Self {
            position: i64::de(reader)?,
            velocity: i64::de(reader)?,
        })
    }
}

/// A predicted body: each input changes velocity, velocity moves position
#[derive(Default)]
pub struct Motor {
    pub state: MotorState,
    pub always_replicate: bool,
    /// Every hook invocation, in order
    pub events: Vec<String>,
    pub physics_broadcasts: u32,
}

impl Motor {
    pub fn at(state: MotorState) -> Self {
        Self {
            state,
            ..Default::default()
        }
    }

    /// Applies the movement rule without any bookkeeping
    pub fn step(state: &mut MotorState, input: &MotorInput) {
        state.velocity += i64::from(input.thrust);
        state.position += state.velocity;
    }
}

impl Predicted for Motor {
    type Input = MotorInput;
    type State = MotorState;

    const REPLICATE_HASH: MethodHash = stable_hash32("Motor::replicate");
    const RECONCILE_HASH: MethodHash = stable_hash32("Motor::reconcile");

    fn replicate(&mut self, input: &MotorInput, context: &ReplicateContext) {
        if context.replaying {
            self.events.push(format!("replay {}", context.tick));
        }
        Self::step(&mut self.state, input);
    }

    fn reconcile_state(&self) -> MotorState {
        self.state
    }

    fn apply_reconcile(&mut self, state: &MotorState) {
        self.state = *state;
    }

    fn always_replicate(&self) -> bool {
        self.always_replicate
    }

    fn on_pre_reconcile(&mut self) {
        self.events.push("pre reconcile".to_string());
    }

    fn on_post_reconcile(&mut self) {
        self.events.push("post reconcile".to_string());
    }

    fn on_pre_replicate_replay(&mut self, tick: Tick) {
        self.events.push(format!("pre replay {}", tick));
    }

    fn on_post_replicate_replay(&mut self, tick: Tick) {
        self.events.push(format!("post replay {}", tick));
    }

    fn broadcast_physics_state(&mut self, _outbox: &mut Outbox) {
        self.physics_broadcasts += 1;
    }
}

/// Physics scene stand-in that counts how it was driven
#[derive(Default)]
pub struct CountingStepper {
    pub synced: u32,
    pub simulated: u32,
    pub simulated_seconds: f64,
}

impl PhysicsStepper for CountingStepper {
    fn sync_transforms(&mut self) {
        self.synced += 1;
    }

    fn simulate(&mut self, delta: f64) {
        self.simulated += 1;
        self.simulated_seconds += delta;
    }
}
