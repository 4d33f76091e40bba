use crate::{
    rpc::{error::RpcError, rpc_registry::RpcRegistry},
    sync::sync_type::SyncType,
};

/// A user type with replicated members and remote procedures
pub trait Replicable: Sized + 'static {
    /// Every sync member, in declaration order. The position in this list
    /// is the member's index on the wire and must never change.
    fn sync_types(&mut self) -> Vec<&mut dyn SyncType>;

    /// Registers the type's RPC handlers
    fn register_rpcs(_registry: &mut RpcRegistry<Self>) -> Result<(), RpcError> {
        Ok(())
    }

    fn on_start_server(&mut self) {}

    fn on_start_client(&mut self) {}

    fn on_stop_server(&mut self) {}

    fn on_stop_client(&mut self) {}
}
