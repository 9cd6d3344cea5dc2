use core::fmt;
use core::ops::{Deref, DerefMut};

use crate::{WireReader, WireWriter};

/// Scoped namespace push on a writer or reader.
///
/// Created by pushing a namespace; dropping it pops that namespace again, so
/// the stack is restored on every exit path of the nested call, including
/// `?` returns. The guard dereferences to the wrapped writer or reader, and
/// codecs keep working against the same concrete type while it is alive.
///
/// ```
/// use remoting_core::{EventWriter, NamespaceScope, WireWriter};
///
/// let mut writer = EventWriter::new();
/// {
///     let mut scope = NamespaceScope::for_writer(&mut writer, "urn:x").unwrap();
///     assert_eq!(scope.context().namespace(), Some("urn:x"));
/// }
/// assert_eq!(writer.context().namespace(), None);
/// ```
pub struct NamespaceScope<'a, T: ?Sized> {
    inner: &'a mut T,
    pop: fn(&mut T),
}

impl<'a, W: WireWriter + ?Sized> NamespaceScope<'a, W> {
    /// Push `uri` on a writer.
    ///
    /// If the push fails nothing is pushed and no guard is created.
    pub fn for_writer(writer: &'a mut W, uri: &str) -> Result<Self, W::Error> {
        writer.push_namespace(uri)?;
        Ok(Self {
            inner: writer,
            pop: <W as WireWriter>::pop_namespace,
        })
    }
}

impl<'a, R: ?Sized> NamespaceScope<'a, R> {
    /// Push `uri` on a reader.
    ///
    /// If the push fails nothing is pushed and no guard is created.
    pub fn for_reader<'de>(reader: &'a mut R, uri: &str) -> Result<Self, R::Error>
    where
        R: WireReader<'de>,
    {
        reader.push_namespace(uri)?;
        Ok(Self {
            inner: reader,
            pop: <R as WireReader<'de>>::pop_namespace,
        })
    }
}

impl<T: ?Sized> Deref for NamespaceScope<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        self.inner
    }
}

impl<T: ?Sized> DerefMut for NamespaceScope<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        self.inner
    }
}

impl<T: ?Sized> Drop for NamespaceScope<'_, T> {
    fn drop(&mut self) {
        (self.pop)(self.inner);
    }
}

impl<T: ?Sized> fmt::Debug for NamespaceScope<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NamespaceScope").finish_non_exhaustive()
    }
}
