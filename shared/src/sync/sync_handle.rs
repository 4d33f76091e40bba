use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::{network::roles::NetworkRoles, sync::dirty_mask::DirtyMask, types::SyncIndex};

struct SyncCore {
    roles: NetworkRoles,
    started_server: bool,
    started_client: bool,
    dirty: DirtyMask,
}

/// State shared between a network object and every sync primitive it
/// registered: the object's roles, whether its start callbacks have fired,
/// and which of its members have unsent changes.
#[derive(Clone)]
pub struct SyncHandle {
    core: Arc<RwLock<SyncCore>>,
}

impl Default for SyncHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl SyncHandle {
    pub fn new() -> Self {
        Self {
            core: Arc::new(RwLock::new(SyncCore {
                roles: NetworkRoles::default(),
                started_server: false,
                started_client: false,
                dirty: DirtyMask::new(),
            })),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, SyncCore> {
        let Ok(core) = self.core.as_ref().read() else {
            panic!("SyncHandle lock poisoned");
        };
        core
    }

    fn write(&self) -> RwLockWriteGuard<'_, SyncCore> {
        let Ok(core) = self.core.as_ref().write() else {
            panic!("SyncHandle lock poisoned");
        };
        core
    }

    // Roles

    pub fn roles(&self) -> NetworkRoles {
        self.read().roles
    }

    pub fn set_roles(&self, roles: NetworkRoles) {
        self.write().roles = roles;
    }

    pub fn update_roles(&self, update: impl FnOnce(&mut NetworkRoles)) {
        update(&mut self.write().roles);
    }

    /// True when this process may record changes for the network
    pub fn is_authoritative(&self) -> bool {
        self.read().roles.is_server
    }

    pub fn is_host(&self) -> bool {
        self.read().roles.is_host()
    }

    pub fn is_network_live(&self) -> bool {
        self.read().roles.is_network_live()
    }

    // Start callbacks

    pub fn is_started(&self, as_server: bool) -> bool {
        let core = self.read();
        if as_server {
            core.started_server
        } else {
            core.started_client
        }
    }

    pub fn set_started(&self, as_server: bool, started: bool) {
        let mut core = self.write();
        if as_server {
            core.started_server = started;
        } else {
            core.started_client = started;
        }
    }

    // Dirty members

    /// Flags `index` as dirty. Returns true only when the object went from
    /// having no dirty members to having one.
    pub fn mark_dirty(&self, index: SyncIndex) -> bool {
        let mut core = self.write();
        let was_clear = core.dirty.is_clear();
        core.dirty.set_bit(index, true);
        was_clear
    }

    pub fn clear_dirty(&self, index: SyncIndex) {
        self.write().dirty.set_bit(index, false);
    }

    pub fn is_dirty(&self, index: SyncIndex) -> bool {
        self.read().dirty.bit(index)
    }

    pub fn has_dirty(&self) -> bool {
        !self.read().dirty.is_clear()
    }

    /// Snapshot of the dirty indices, ascending
    pub fn dirty_indices(&self) -> Vec<SyncIndex> {
        self.read().dirty.iter().collect()
    }
}
