use tokio::sync::watch;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ViewportSize {
    pub width: u16,
    pub height: u16,
}

impl ViewportSize {
    pub fn new(width: u16, height: u16) -> Self {
        Self { width, height }
    }
}

/// Source of "viewport size changed" notifications.
///
/// Every subscriber sees the latest size; intermediate sizes published between
/// two polls collapse into one change.
#[derive(Debug)]
pub struct Viewport {
    size: watch::Sender<ViewportSize>,
}

impl Viewport {
    pub fn new(size: ViewportSize) -> Self {
        let (size, _) = watch::channel(size);
        Self { size }
    }

    pub fn size(&self) -> ViewportSize {
        *self.size.borrow()
    }

    /// Publish a new size. Subscribers are only notified when it differs
    /// from the current one.
    pub fn resize(&self, width: u16, height: u16) {
        let next = ViewportSize::new(width, height);
        self.size.send_if_modified(|current| {
            if *current == next {
                return false;
            }
            *current = next;
            true
        });
    }

    pub fn subscribe(&self) -> ViewportSubscription {
        ViewportSubscription {
            size: self.size.subscribe(),
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.size.receiver_count()
    }
}

/// Live registration with a [`Viewport`]. Dropping it unsubscribes.
#[derive(Debug)]
pub struct ViewportSubscription {
    size: watch::Receiver<ViewportSize>,
}

impl ViewportSubscription {
    pub fn current(&self) -> ViewportSize {
        *self.size.borrow()
    }

    /// The new size if it changed since the last call, otherwise `None`.
    /// Also `None` once the viewport itself is gone.
    pub fn changed(&mut self) -> Option<ViewportSize> {
        match self.size.has_changed() {
            Ok(true) => Some(*self.size.borrow_and_update()),
            _ => None,
        }
    }

    pub fn unsubscribe(self) {}
}
