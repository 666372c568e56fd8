//! User-visible notices.

use std::collections::VecDeque;

use jiff::{SignedDuration, Timestamp};

/// How long a transient notice stays visible.
pub const TRANSIENT_LIFETIME: SignedDuration = SignedDuration::from_secs(2);

/// Shown after removing a cart line.
pub const ITEM_REMOVED: &str = "Item removed from cart";

/// Shown after a coupon is accepted.
pub const COUPON_APPLIED: &str = "Coupon applied successfully!";

/// Shown when a quantity change could not be completed.
pub const QUANTITY_UPDATE_FAILED: &str = "Failed to update quantity. Please try again.";

/// Shown when checkout is blocked by stock errors.
pub const RESOLVE_STOCK_ISSUES: &str = "Please resolve stock issues before checkout";

/// Shown when checkout is attempted with nothing in the cart.
pub const CART_EMPTY: &str = "Your cart is empty";

/// Shown when the backend rejected or never answered an order.
pub const ORDER_FAILED: &str = "Failed to place order. Please try again.";

/// Notice lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    /// Disappears after [`TRANSIENT_LIFETIME`]
    Transient,

    /// Stays until dismissed
    Persistent,
}

/// A message for the shopper.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    /// Message text
    pub message: String,

    /// Lifetime
    pub kind: NoticeKind,

    /// When the notice was raised
    pub raised_at: Timestamp,
}

impl Notice {
    /// Whether the notice should still be shown at `now`.
    #[must_use]
    pub fn is_visible_at(&self, now: Timestamp) -> bool {
        match self.kind {
            NoticeKind::Persistent => true,
            NoticeKind::Transient => now.duration_since(self.raised_at) < TRANSIENT_LIFETIME,
        }
    }
}

/// Notices in the order they were raised.
#[derive(Debug, Clone, Default)]
pub struct Notices {
    queue: VecDeque<Notice>,
}

impl Notices {
    /// Empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Raise a notice that expires on its own.
    pub fn transient(&mut self, message: impl Into<String>) {
        self.push(message.into(), NoticeKind::Transient, Timestamp::now());
    }

    /// Raise a notice that stays until dismissed.
    pub fn persistent(&mut self, message: impl Into<String>) {
        self.push(message.into(), NoticeKind::Persistent, Timestamp::now());
    }

    /// Raise a notice with an explicit timestamp.
    ///
    /// Notices expired by `raised_at` are dropped first. Raising a message that is already queued
    /// replaces the earlier notice.
    pub fn push(&mut self, message: String, kind: NoticeKind, raised_at: Timestamp) {
        self.prune(raised_at);
        self.queue.retain(|notice| notice.message != message);
        self.queue.push_back(Notice {
            message,
            kind,
            raised_at,
        });
    }

    /// Drop expired notices and return the rest.
    pub fn visible(&mut self, now: Timestamp) -> impl Iterator<Item = &Notice> {
        self.prune(now);

        self.queue.iter()
    }

    /// Drop notices that have expired by `now`.
    pub fn prune(&mut self, now: Timestamp) {
        self.queue.retain(|notice| notice.is_visible_at(now));
    }

    /// Remove every notice with `message`.
    pub fn dismiss(&mut self, message: &str) {
        self.queue.retain(|notice| notice.message != message);
    }

    /// Most recent notice, expired or not.
    #[must_use]
    pub fn latest(&self) -> Option<&Notice> {
        self.queue.back()
    }

    /// Number of queued notices.
    #[must_use]
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Whether nothing is queued.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Whether any notice has `message`.
    #[must_use]
    pub fn contains(&self, message: &str) -> bool {
        self.queue.iter().any(|notice| notice.message == message)
    }
}
