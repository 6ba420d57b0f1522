use std::sync::Arc;

/// Signals how a stored value should be treated by the [`ExpiringCache`](crate::ExpiringCache).
///
/// A negative value is a successful "no result" answer. It is cached like any
/// other value, but may be given the shorter `negative_ttl` lifetime.
pub trait CacheValue {
    /// Returns true if this value represents "nothing found".
    fn is_negative(&self) -> bool {
        false
    }
}

impl<T> CacheValue for Vec<T> {
    fn is_negative(&self) -> bool {
        self.is_empty()
    }
}

impl<T> CacheValue for Option<T> {
    fn is_negative(&self) -> bool {
        self.is_none()
    }
}

impl CacheValue for String {}

impl<T: CacheValue + ?Sized> CacheValue for Arc<T> {
    fn is_negative(&self) -> bool {
        (**self).is_negative()
    }
}
