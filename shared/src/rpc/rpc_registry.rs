use std::collections::HashMap;

use log::{info, warn};
use volley_serde::{ByteReader, Serde, SerdeErr};

use crate::{
    channel::Channel,
    config::RpcConfig,
    network::roles::NetworkRoles,
    rpc::{
        error::RpcError,
        rpc_kind::{RpcKind, RpcOptions},
        rpc_message::{write_rpc, RpcHeader},
    },
    types::{ConnectionId, MethodHash},
};

type RpcInvoker<R> =
    Box<dyn Fn(&mut R, &mut ByteReader, Option<ConnectionId>, bool) -> Result<(), SerdeErr>>;

struct RpcRegistration<R> {
    kind: RpcKind,
    options: RpcOptions,
    invoker: RpcInvoker<R>,
}

/// Why an incoming call was drained without running its handler
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RpcSkip {
    /// A Server RPC arrived on a process that is not the server
    NotServer,
    /// A Server RPC requiring ownership came from another connection
    NotOwner,
    /// A Target RPC addressed to a different connection
    WrongTarget,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RpcOutcome {
    Invoked,
    Skipped(RpcSkip),
}

/// Who a received call came from and who it was addressed to
#[derive(Clone, Copy, Debug, Default)]
pub struct RpcContext {
    pub roles: NetworkRoles,
    /// Connection the message arrived from, on the server
    pub sender: Option<ConnectionId>,
    /// Recipient resolved by the transport for Target RPCs
    pub target: Option<ConnectionId>,
}

/// Maps method hashes to the handlers of one replicable type
pub struct RpcRegistry<R> {
    config: RpcConfig,
    registrations: HashMap<MethodHash, RpcRegistration<R>>,
}

impl<R: 'static> RpcRegistry<R> {
    pub fn new(config: RpcConfig) -> Self {
        Self {
            config,
            registrations: HashMap::new(),
        }
    }

    /// Registers a handler for `hash`
    ///
    /// # Panics
    ///
    /// Panics if `hash` is already registered.
    /// Consider using `try_register` for non-panicking error handling.
    pub fn register<A: Serde + 'static>(
        &mut self,
        hash: MethodHash,
        kind: RpcKind,
        options: RpcOptions,
        logic: impl Fn(&mut R, A, Option<ConnectionId>) + 'static,
    ) {
        if let Err(error) = self.try_register(hash, kind, options, logic) {
            panic!("{}", error);
        }
    }

    /// Registers a handler for `hash`, rejecting duplicate hashes
    pub fn try_register<A: Serde + 'static>(
        &mut self,
        hash: MethodHash,
        kind: RpcKind,
        options: RpcOptions,
        logic: impl Fn(&mut R, A, Option<ConnectionId>) + 'static,
    ) -> Result<(), RpcError> {
        if self.registrations.contains_key(&hash) {
            return Err(RpcError::DuplicateHash { hash });
        }

        // arguments are always decoded so a skipped call still leaves the
        // reader at the next message
        let invoker: RpcInvoker<R> = Box::new(move |object, reader, connection, authorized| {
            let args = A::de(reader)?;
            if authorized {
                logic(object, args, connection);
            }
            Ok(())
        });

        info!("Registered {:?} RPC {:#010x}", kind, hash);
        self.registrations.insert(
            hash,
            RpcRegistration {
                kind,
                options,
                invoker,
            },
        );
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.registrations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registrations.is_empty()
    }

    pub fn contains(&self, hash: MethodHash) -> bool {
        self.registrations.contains_key(&hash)
    }

    pub fn kind(&self, hash: MethodHash) -> Option<RpcKind> {
        self.registrations.get(&hash).map(|registration| registration.kind)
    }

    pub fn options(&self, hash: MethodHash) -> Option<&RpcOptions> {
        self.registrations
            .get(&hash)
            .map(|registration| &registration.options)
    }

    /// Encodes an outgoing call, checking it is sent as the kind it was
    /// registered with. Returns the channel it must travel on.
    pub fn encode<A: Serde>(
        &self,
        hash: MethodHash,
        kind: RpcKind,
        args: &A,
    ) -> Result<(Channel, Vec<u8>), RpcError> {
        let registration = self
            .registrations
            .get(&hash)
            .ok_or(RpcError::UnknownHash { hash })?;
        if registration.kind != kind {
            return Err(RpcError::KindMismatch {
                hash,
                registered: registration.kind,
                requested: kind,
            });
        }
        let channel = registration.options.channel;
        Ok((channel, write_rpc(hash, channel, args)))
    }

    /// Reads one `[header][arguments]` message and dispatches it
    pub fn receive(
        &self,
        object: &mut R,
        reader: &mut ByteReader,
        context: &RpcContext,
    ) -> Result<RpcOutcome, RpcError> {
        let header = RpcHeader::de(reader)?;
        self.invoke(object, header.hash, reader, context)
    }

    /// Decodes the arguments of `hash` from `reader` and runs its handler if
    /// the call passes the ownership and recipient checks. The arguments are
    /// consumed either way.
    pub fn invoke(
        &self,
        object: &mut R,
        hash: MethodHash,
        reader: &mut ByteReader,
        context: &RpcContext,
    ) -> Result<RpcOutcome, RpcError> {
        let registration = self
            .registrations
            .get(&hash)
            .ok_or(RpcError::UnknownHash { hash })?;

        let skip = Self::authorize(registration, context);
        let connection = match registration.kind {
            RpcKind::Server => context.sender,
            RpcKind::Observers => None,
            RpcKind::Target => context.roles.local_connection,
        };
        (registration.invoker)(object, reader, connection, skip.is_none())?;

        match skip {
            None => Ok(RpcOutcome::Invoked),
            Some(skip) => {
                if self.config.log_authorization_failures {
                    warn!(
                        "Dropped {:?} RPC {:#010x} from {:?}: {:?}",
                        registration.kind, hash, context.sender, skip
                    );
                }
                Ok(RpcOutcome::Skipped(skip))
            }
        }
    }

    fn authorize(registration: &RpcRegistration<R>, context: &RpcContext) -> Option<RpcSkip> {
        let roles = &context.roles;
        match registration.kind {
            RpcKind::Server => {
                if !roles.is_server {
                    return Some(RpcSkip::NotServer);
                }
                if registration.options.require_ownership {
                    let is_owner = context
                        .sender
                        .is_some_and(|sender| roles.is_owned_by(sender));
                    if !is_owner {
                        return Some(RpcSkip::NotOwner);
                    }
                }
                None
            }
            RpcKind::Observers => None,
            RpcKind::Target => match context.target {
                Some(target) if Some(target) != roles.local_connection => {
                    Some(RpcSkip::WrongTarget)
                }
                _ => None,
            },
        }
    }
}
