use std::borrow::Cow;

/// Produces a copy that no longer borrows from the source buffer.
pub trait CloneStatic<T: 'static> {
    fn clone_static(&self) -> T;
}

impl<T> CloneStatic<Cow<'static, T>> for Cow<'_, T>
where
    T: ToOwned + ?Sized + 'static,
{
    fn clone_static(&self) -> Cow<'static, T> {
        Cow::Owned((**self).to_owned())
    }
}

impl<T, U> CloneStatic<Option<U>> for Option<T>
where
    T: CloneStatic<U>,
    U: 'static,
{
    fn clone_static(&self) -> Option<U> {
        self.as_ref().map(CloneStatic::clone_static)
    }
}
