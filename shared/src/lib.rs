//! # Volley Shared
//! State replication, remote procedure calls and client-side prediction
//! shared by servers, clients and hosts.

#![deny(trivial_numeric_casts, unstable_features, unused_import_braces)]

pub use volley_serde::{
    ByteCounter, ByteReader, ByteWrite, ByteWriter, Serde, SerdeErr, VarUint,
};

mod channel;
mod config;
mod network;
mod outbox;
mod prediction;
mod rpc;
mod stable_hash;
mod sync;
mod tick_list;
mod time;
mod types;

pub use channel::Channel;
pub use config::{ConfigError, PredictionConfig, RpcConfig, TimeConfig, VolleyConfig};
pub use network::{
    error::NetworkObjectError, network_object::NetworkObject, replicable::Replicable,
    roles::NetworkRoles,
};
pub use outbox::{MessageKind, MessageTarget, Outbox, OutgoingMessage};
pub use prediction::{
    client_buffer::ClientReplicateBuffer,
    client_prediction::{ClientPrediction, PredictionState},
    driver::PredictionDriver,
    error::PredictionError,
    messages::{read_replicate_batch, write_replicate_batch, ReconcileSnapshot},
    predicted::{NoPhysics, PhysicsStepper, Predicted, ReplicateContext},
    replicate_entry::ReplicateEntry,
    server_prediction::ServerPrediction,
    server_queue::ServerReplicateQueue,
};
pub use rpc::{
    error::RpcError,
    rpc_kind::{RpcKind, RpcOptions},
    rpc_message::{write_rpc, RpcHeader},
    rpc_registry::{RpcContext, RpcOutcome, RpcRegistry, RpcSkip},
};
pub use stable_hash::stable_hash32;
pub use sync::{
    callbacks::SyncCallbacks,
    change_tracker::{ChangeIdRead, ChangeTracker, MutationContext},
    dirty_mask::DirtyMask,
    error::SyncError,
    settings::{ReadPermission, SyncSettings, WritePermission},
    sync_dictionary::{DictionaryChange, DictionaryOp, DictionaryOperation, SyncDictionary},
    sync_handle::SyncHandle,
    sync_list::{ListChange, ListOp, ListOperation, SyncList},
    sync_payloads::{SyncAudience, SyncPayloads},
    sync_set::{SetChange, SetOp, SetOperation, SyncSet},
    sync_type::{SyncRegistrar, SyncType},
    sync_var::{SyncVar, SyncVarChange},
};
pub use tick_list::{TickList, TickListError};
pub use time::{FixedTimeManager, PhysicsMode, TimeManager};
pub use types::{ChangeId, ConnectionId, MethodHash, SyncIndex, Tick};
