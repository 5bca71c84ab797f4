use crate::abstract_site::Result;
use crate::file_format::implementors::ImplementorRecord;

/// Callback the rendering front end installs to be handed implementor
/// records.  A returned error means the renderer failed on that record; the
/// record is then lost (logged, never re-buffered) because this is a
/// fire-and-forget notification, not a durable queue.
pub type RendererHook =
    Box<dyn FnMut(ImplementorRecord) -> std::result::Result<(), String> + Send>;

/// Accumulates, per trait, which modules implement it, and hands each record
/// to a renderer hook if one is installed, otherwise buffers it.
///
/// The generated pages do this through a process-global pending slot; here
/// the registry is an explicit object owned by whatever stands in for the
/// page context, with an explicit `drain`.  Single consumer, at-most-once
/// delivery, registration order.
pub struct ImplementorRegistry {
    renderer: Option<RendererHook>,
    pending: Vec<ImplementorRecord>,
}

impl ImplementorRegistry {
    pub fn new() -> ImplementorRegistry {
        ImplementorRegistry {
            renderer: None,
            pending: vec![],
        }
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Register one record.  Delivered to the renderer hook immediately if
    /// one is installed, else appended to the pending buffer.
    ///
    /// A fragment arity mismatch is returned to the caller as a fault, but
    /// the record is delivered/buffered as-is regardless; faults are
    /// reported, never silently fixed.
    pub fn register(&mut self, record: ImplementorRecord) -> Result<()> {
        let arity = record.check_fragment_arity();
        if arity.is_err() {
            warn!(
                trait_key = %record.trait_key,
                "registering implementor record with mismatched fragment lengths"
            );
        }

        match self.renderer.as_mut() {
            Some(hook) => {
                if let Err(msg) = hook(record) {
                    warn!(error = %msg, "renderer hook failed; record lost");
                }
            }
            None => {
                self.pending.push(record);
            }
        }

        arity
    }

    /// Install the renderer hook, draining any pending records into it in
    /// registration order.  Each buffered record is handed over exactly once;
    /// later registrations go straight to the hook.
    pub fn install_renderer(&mut self, mut hook: RendererHook) {
        for record in self.pending.drain(..) {
            if let Err(msg) = hook(record) {
                warn!(error = %msg, "renderer hook failed; record lost");
            }
        }
        self.renderer = Some(hook);
    }

    /// Take every buffered record, in registration order.  Draining twice
    /// yields nothing.
    pub fn drain(&mut self) -> Vec<ImplementorRecord> {
        std::mem::take(&mut self.pending)
    }
}

impl Default for ImplementorRegistry {
    fn default() -> ImplementorRegistry {
        ImplementorRegistry::new()
    }
}
