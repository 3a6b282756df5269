//! Entity identity helpers.

/// Placeholder id carried by an entity until the store assigns a real one.
pub const UNSAVED_ID: i64 = -1;

/// A value that can be normalized into an integer entity id.
///
/// Shell input arrives as text while rows and handles carry integers; every
/// lookup funnels through this trait so both compare the same way. Values
/// that do not normalize never match any entity.
pub trait AsEntityId {
    fn as_entity_id(&self) -> Option<i64>;
}

macro_rules! impl_as_entity_id_for_int {
    ($($t:ty),*) => {
        $(
            impl AsEntityId for $t {
                fn as_entity_id(&self) -> Option<i64> {
                    i64::try_from(*self).ok()
                }
            }
        )*
    };
}

impl_as_entity_id_for_int!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

impl AsEntityId for str {
    fn as_entity_id(&self) -> Option<i64> {
        self.trim().parse().ok()
    }
}

impl AsEntityId for String {
    fn as_entity_id(&self) -> Option<i64> {
        self.as_str().as_entity_id()
    }
}

impl<T: AsEntityId + ?Sized> AsEntityId for &T {
    fn as_entity_id(&self) -> Option<i64> {
        (**self).as_entity_id()
    }
}
