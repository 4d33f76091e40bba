/// Change listeners for one sync member. Events raised before the owning
/// object's start callback has fired on that side are held back and
/// delivered, in order, once it does.
pub struct SyncCallbacks<E> {
    listeners: Vec<Box<dyn FnMut(&E, bool)>>,
    pending_server: Vec<E>,
    pending_client: Vec<E>,
}

impl<E> Default for SyncCallbacks<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> SyncCallbacks<E> {
    pub fn new() -> Self {
        Self {
            listeners: Vec::new(),
            pending_server: Vec::new(),
            pending_client: Vec::new(),
        }
    }

    /// Adds a listener, called with the event and whether it was raised on
    /// the server side
    pub fn listen(&mut self, listener: impl FnMut(&E, bool) + 'static) {
        self.listeners.push(Box::new(listener));
    }

    pub fn has_listeners(&self) -> bool {
        !self.listeners.is_empty()
    }

    pub fn pending(&self, as_server: bool) -> usize {
        if as_server {
            self.pending_server.len()
        } else {
            self.pending_client.len()
        }
    }

    pub fn emit(&mut self, event: E, as_server: bool, started: bool) {
        if !self.has_listeners() {
            return;
        }
        if started {
            self.dispatch(&event, as_server);
        } else if as_server {
            self.pending_server.push(event);
        } else {
            self.pending_client.push(event);
        }
    }

    /// Delivers everything held back for one side
    pub fn flush(&mut self, as_server: bool) {
        let pending = if as_server {
            std::mem::take(&mut self.pending_server)
        } else {
            std::mem::take(&mut self.pending_client)
        };
        for event in pending {
            self.dispatch(&event, as_server);
        }
    }

    fn dispatch(&mut self, event: &E, as_server: bool) {
        for listener in self.listeners.iter_mut() {
            listener(event, as_server);
        }
    }
}
