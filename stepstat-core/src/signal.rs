use tokio::sync::watch;

/// Creates a fresh, unfired completion pair.
pub fn completion() -> (Completion, DoneSignal) {
    let (tx, rx) = watch::channel(false);
    (Completion { tx }, DoneSignal { rx })
}

/// Firing half of a one-shot completion signal.
///
/// Firing consumes the value, so a signal can never fire twice.
#[derive(Debug)]
pub struct Completion {
    tx: watch::Sender<bool>,
}

impl Completion {
    pub fn fire(self) {
        // `send_replace` stores the value even when no receiver is alive, so handles
        // created later through `subscribe` still observe completion.
        self.tx.send_replace(true);
    }

    pub fn subscribe(&self) -> DoneSignal {
        DoneSignal {
            rx: self.tx.subscribe(),
        }
    }
}

/// Waiting half of a completion signal.
///
/// Every clone observes completion, including clones taken after it fired.
#[derive(Debug, Clone)]
pub struct DoneSignal {
    rx: watch::Receiver<bool>,
}

impl DoneSignal {
    pub fn is_done(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolves once the signal fired.
    ///
    /// Also resolves if the firing half is dropped without firing, so waiters never
    /// hang on an abandoned run; check [`DoneSignal::is_done`] to tell the two apart.
    pub async fn wait(&self) {
        let mut rx = self.rx.clone();
        let _ = rx.wait_for(|done| *done).await;
    }
}
