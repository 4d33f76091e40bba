use std::collections::BTreeMap;

use log::{debug, info};
use volley_serde::{ByteReader, ByteWrite, ByteWriter, Serde, SerdeErr};

use crate::{
    channel::Channel,
    config::VolleyConfig,
    network::{error::NetworkObjectError, replicable::Replicable, roles::NetworkRoles},
    outbox::{MessageKind, MessageTarget, Outbox, OutgoingMessage},
    rpc::{
        error::RpcError,
        rpc_kind::RpcKind,
        rpc_registry::{RpcContext, RpcOutcome, RpcRegistry},
    },
    sync::{
        error::SyncError,
        sync_handle::SyncHandle,
        sync_payloads::{SyncAudience, SyncPayloads},
        sync_type::SyncRegistrar,
    },
    types::{ConnectionId, MethodHash, SyncIndex, Tick},
};

/// A replicable value together with its network identity, registered sync
/// members and RPC table
pub struct NetworkObject<R: Replicable> {
    replicable: R,
    handle: SyncHandle,
    rpcs: RpcRegistry<R>,
    pending_rpcs: Vec<OutgoingMessage>,
    pending_sync: Vec<OutgoingMessage>,
    buffered_rpcs: BTreeMap<MethodHash, (Channel, Vec<u8>)>,
}

impl<R: Replicable> NetworkObject<R> {
    /// # Panics
    ///
    /// Panics if the members or RPCs of `replicable` cannot be registered.
    /// Consider using `try_new` for non-panicking error handling.
    pub fn new(replicable: R, config: &VolleyConfig) -> Self {
        match Self::try_new(replicable, config) {
            Ok(object) => object,
            Err(error) => panic!("{}", error),
        }
    }

    pub fn try_new(mut replicable: R, config: &VolleyConfig) -> Result<Self, NetworkObjectError> {
        let handle = SyncHandle::new();
        let mut registrar = SyncRegistrar::new(&handle, config.time.tick_interval);
        registrar.register_all(replicable.sync_types())?;
        info!("Registered {} sync member(s)", registrar.registered());

        let mut rpcs = RpcRegistry::new(config.rpc.clone());
        R::register_rpcs(&mut rpcs)?;

        Ok(Self {
            replicable,
            handle,
            rpcs,
            pending_rpcs: Vec::new(),
            pending_sync: Vec::new(),
            buffered_rpcs: BTreeMap::new(),
        })
    }

    pub fn get(&self) -> &R {
        &self.replicable
    }

    pub fn get_mut(&mut self) -> &mut R {
        &mut self.replicable
    }

    pub fn handle(&self) -> &SyncHandle {
        &self.handle
    }

    pub fn rpcs(&self) -> &RpcRegistry<R> {
        &self.rpcs
    }

    // Roles

    pub fn roles(&self) -> NetworkRoles {
        self.handle.roles()
    }

    pub fn is_server(&self) -> bool {
        self.roles().is_server
    }

    pub fn is_client(&self) -> bool {
        self.roles().is_client
    }

    pub fn is_host(&self) -> bool {
        self.roles().is_host()
    }

    pub fn is_owner(&self) -> bool {
        self.roles().is_owner()
    }

    pub fn owner(&self) -> Option<ConnectionId> {
        self.roles().owner
    }

    pub fn set_owner(&mut self, owner: Option<ConnectionId>) {
        self.handle.update_roles(|roles| roles.owner = owner);
    }

    // Lifecycle

    /// Makes the object live on the server. Changes made from here on are
    /// recorded for observers.
    pub fn initialize_server(&mut self, owner: Option<ConnectionId>) {
        self.handle.update_roles(|roles| {
            roles.is_server = true;
            roles.owner = owner;
        });
    }

    pub fn start_server(&mut self) {
        self.handle.update_roles(|roles| roles.is_server = true);
        self.handle.set_started(true, true);
        self.replicable.on_start_server();
        self.flush_callbacks(true);
    }

    pub fn stop_server(&mut self) {
        self.replicable.on_stop_server();
        self.handle.set_started(true, false);
        self.handle.update_roles(|roles| roles.is_server = false);
    }

    /// Makes the object live on a client, ready to read its spawn payload
    pub fn initialize_client(
        &mut self,
        local_connection: Option<ConnectionId>,
        owner: Option<ConnectionId>,
    ) {
        self.handle.update_roles(|roles| {
            roles.is_client = true;
            roles.local_connection = local_connection;
            if !roles.is_server {
                roles.owner = owner;
            }
        });
    }

    pub fn start_client(&mut self) {
        self.handle.update_roles(|roles| roles.is_client = true);
        self.handle.set_started(false, true);
        self.replicable.on_start_client();
        self.flush_callbacks(false);
    }

    pub fn stop_client(&mut self) {
        self.replicable.on_stop_client();
        self.handle.set_started(false, false);
        self.handle.update_roles(|roles| roles.is_client = false);
    }

    fn flush_callbacks(&mut self, as_server: bool) {
        for member in self.replicable.sync_types() {
            member.on_start_callback(as_server);
        }
    }

    // Sync

    /// Runs one network tick: sends deltas flushed by `write_full`, writes
    /// due deltas, then flushes queued RPCs
    pub fn tick(&mut self, tick: Tick, outbox: &mut Outbox) {
        let has_owner = self.owner().is_some();
        outbox.extend(self.pending_sync.drain(..));
        outbox.extend(self.write_dirty(tick).into_messages(has_owner));
        self.flush_rpcs(outbox);
    }

    /// Writes a delta for every dirty member whose send rate allows it,
    /// into the payload of each audience allowed to read it
    pub fn write_dirty(&mut self, tick: Tick) -> SyncPayloads {
        self.sweep(tick, false)
    }

    fn sweep(&mut self, tick: Tick, ignore_send_rate: bool) -> SyncPayloads {
        let mut payloads = SyncPayloads::new();
        if !self.is_server() || !self.handle.has_dirty() {
            return payloads;
        }

        let dirty = self.handle.dirty_indices();
        let mut members = self.replicable.sync_types();
        for index in dirty {
            let Some(member) = members.get_mut(index as usize) else {
                continue;
            };
            let tracker = member.tracker();
            if !tracker.is_dirty() || !(ignore_send_rate || tracker.is_sync_due(tick)) {
                continue;
            }
            let channel = tracker.channel();
            let read_permission = tracker.settings().read_permission;

            let mut delta = ByteWriter::new();
            member.write_delta(&mut delta, tick, true);
            for audience in SyncAudience::ALL {
                if audience.reads(read_permission) {
                    payloads
                        .writer_mut(audience, channel)
                        .write_bytes(delta.as_slice());
                }
            }
            member.reset_dirty();
        }
        payloads
    }

    /// Writes the complete state `connection` is allowed to read, for a
    /// newly added observer. Returns None if no member changed from its
    /// initial state.
    ///
    /// Dirty members are written out first regardless of their send rate,
    /// so the snapshot and every later delta start from the same change id.
    /// Those deltas go out with the next `tick`, and the new observer drops
    /// them as already seen.
    pub fn write_full(&mut self, connection: ConnectionId, tick: Tick) -> Option<OutgoingMessage> {
        let has_owner = self.owner().is_some();
        let flushed = self.sweep(tick, true).into_messages(has_owner);
        self.pending_sync.extend(flushed);

        let for_owner = self.roles().is_owned_by(connection);
        let mut writer = ByteWriter::new();
        for member in self.replicable.sync_types() {
            if member.tracker().settings().read_permission.allows(for_owner) {
                member.write_full(&mut writer, tick);
            }
        }
        if writer.is_empty() {
            return None;
        }
        Some(OutgoingMessage::new(
            MessageKind::SyncTypes,
            Channel::Reliable,
            MessageTarget::Connection(connection),
            writer.to_bytes(),
        ))
    }

    /// Applies a sync payload produced by `write_dirty` or `write_full`
    ///
    /// # Panics
    ///
    /// Panics if the payload names an unknown operation. Consider using
    /// `try_read_sync_types` to get that case back as an error.
    pub fn read_sync_types(
        &mut self,
        reader: &mut ByteReader,
        as_server: bool,
    ) -> Result<(), SyncError> {
        match self.try_read_sync_types(reader, as_server) {
            Err(SyncError::Serde(error @ SerdeErr::InvalidDiscriminant { .. })) => {
                panic!("Corrupt sync payload: {}", error)
            }
            result => result,
        }
    }

    pub fn try_read_sync_types(
        &mut self,
        reader: &mut ByteReader,
        as_server: bool,
    ) -> Result<(), SyncError> {
        let mut members = self.replicable.sync_types();
        while !reader.is_empty() {
            let index = SyncIndex::de(reader)?;
            let Some(member) = members.get_mut(index as usize) else {
                return Err(SyncError::UnknownSyncIndex { index });
            };
            member.read(reader, as_server)?;
        }
        Ok(())
    }

    // RPCs

    /// Queues a client to server call
    pub fn send_server_rpc<A: Serde>(&mut self, hash: MethodHash, args: &A) -> Result<(), RpcError> {
        let roles = self.roles();
        if !roles.is_client {
            return Err(RpcError::InvalidSender {
                hash,
                kind: RpcKind::Server,
                reason: "only clients send Server RPCs",
            });
        }
        let require_ownership = self
            .rpcs
            .options(hash)
            .is_some_and(|options| options.require_ownership);
        if require_ownership && !roles.is_owner() {
            return Err(RpcError::InvalidSender {
                hash,
                kind: RpcKind::Server,
                reason: "the local client does not own this object",
            });
        }
        let (channel, bytes) = self.rpcs.encode(hash, RpcKind::Server, args)?;
        self.queue_rpc(channel, MessageTarget::Server, bytes);
        Ok(())
    }

    /// Queues a server to observers call, remembering it for late observers
    /// if the method buffers its last call
    pub fn send_observers_rpc<A: Serde>(
        &mut self,
        hash: MethodHash,
        args: &A,
    ) -> Result<(), RpcError> {
        self.check_server_sender(hash, RpcKind::Observers)?;
        let (channel, bytes) = self.rpcs.encode(hash, RpcKind::Observers, args)?;
        let buffer_last = self
            .rpcs
            .options(hash)
            .is_some_and(|options| options.buffer_last);
        if buffer_last {
            self.buffered_rpcs.insert(hash, (channel, bytes.clone()));
        }
        self.queue_rpc(channel, MessageTarget::Observers, bytes);
        Ok(())
    }

    /// Queues a server call to a single connection
    pub fn send_target_rpc<A: Serde>(
        &mut self,
        hash: MethodHash,
        connection: ConnectionId,
        args: &A,
    ) -> Result<(), RpcError> {
        self.check_server_sender(hash, RpcKind::Target)?;
        let (channel, bytes) = self.rpcs.encode(hash, RpcKind::Target, args)?;
        self.queue_rpc(channel, MessageTarget::Connection(connection), bytes);
        Ok(())
    }

    fn check_server_sender(&self, hash: MethodHash, kind: RpcKind) -> Result<(), RpcError> {
        if self.is_server() {
            return Ok(());
        }
        Err(RpcError::InvalidSender {
            hash,
            kind,
            reason: "only the server sends Observers and Target RPCs",
        })
    }

    fn queue_rpc(&mut self, channel: Channel, target: MessageTarget, bytes: Vec<u8>) {
        self.pending_rpcs.push(OutgoingMessage::new(
            MessageKind::Rpc,
            channel,
            target,
            bytes,
        ));
    }

    pub fn pending_sync(&self) -> usize {
        self.pending_sync.len()
    }

    pub fn pending_rpcs(&self) -> usize {
        self.pending_rpcs.len()
    }

    pub fn flush_rpcs(&mut self, outbox: &mut Outbox) {
        outbox.extend(self.pending_rpcs.drain(..));
    }

    /// The last call of every buffered Observers RPC, addressed to a newly
    /// added observer
    pub fn buffered_rpcs(&self, connection: ConnectionId) -> Vec<OutgoingMessage> {
        self.buffered_rpcs
            .values()
            .map(|(channel, bytes)| {
                OutgoingMessage::new(
                    MessageKind::Rpc,
                    *channel,
                    MessageTarget::Connection(connection),
                    bytes.clone(),
                )
            })
            .collect()
    }

    /// Dispatches one RPC message. `sender` is the connection it arrived
    /// from; `target` is the recipient the transport resolved for Target
    /// RPCs.
    pub fn receive_rpc(
        &mut self,
        reader: &mut ByteReader,
        sender: Option<ConnectionId>,
        target: Option<ConnectionId>,
    ) -> Result<RpcOutcome, RpcError> {
        let context = RpcContext {
            roles: self.roles(),
            sender,
            target,
        };
        let outcome = self.rpcs.receive(&mut self.replicable, reader, &context)?;
        if let RpcOutcome::Skipped(skip) = outcome {
            debug!("RPC skipped: {:?}", skip);
        }
        Ok(outcome)
    }
}
