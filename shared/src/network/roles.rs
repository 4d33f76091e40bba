use crate::types::ConnectionId;

/// Which side(s) of the network an object is live on, and who owns it
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct NetworkRoles {
    pub is_server: bool,
    pub is_client: bool,
    pub owner: Option<ConnectionId>,
    /// This process' own connection, when running as a client
    pub local_connection: Option<ConnectionId>,
}

impl NetworkRoles {
    pub fn is_host(&self) -> bool {
        self.is_server && self.is_client
    }

    pub fn is_owner(&self) -> bool {
        self.is_client && self.owner.is_some() && self.owner == self.local_connection
    }

    pub fn is_network_live(&self) -> bool {
        self.is_server || self.is_client
    }

    /// Whether `connection` owns the object
    pub fn is_owned_by(&self, connection: ConnectionId) -> bool {
        self.owner == Some(connection)
    }
}
