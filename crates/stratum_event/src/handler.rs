//! Event handlers and argument lists.
//!
//! Handlers are cheap to clone; clones share identity, which is what
//! `unregister` matches against.

use core::any::{type_name, Any};
use core::fmt;
use std::sync::Arc;

/// Borrowed argument list passed to `notify`.
pub type Args<'a> = &'a [&'a dyn Any];

type Callback = dyn Fn(Args<'_>) + Send + Sync;

/// A registered callback.
///
/// The typed constructors downcast positional arguments. When an argument
/// is missing or has another type the invocation is skipped and a warning
/// is logged.
#[derive(Clone)]
pub struct Handler {
    callback: Arc<Callback>,
    arity: Option<usize>,
}

impl Handler {
    fn wrap<F>(arity: Option<usize>, f: F) -> Self
    where
        F: Fn(Args<'_>) + Send + Sync + 'static,
    {
        Self {
            callback: Arc::new(f),
            arity,
        }
    }

    /// Creates a handler receiving the raw argument list.
    pub fn variadic<F>(f: F) -> Self
    where
        F: Fn(Args<'_>) + Send + Sync + 'static,
    {
        Self::wrap(None, f)
    }

    /// Creates a handler that ignores arguments.
    pub fn nullary<F>(f: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        Self::wrap(Some(0), move |_| f())
    }

    /// Creates a handler taking one typed argument.
    pub fn unary<T1, F>(f: F) -> Self
    where
        T1: Any,
        F: Fn(&T1) + Send + Sync + 'static,
    {
        Self::wrap(Some(1), move |args| {
            if let Some(a) = arg::<T1>(args, 0) {
                f(a);
            }
        })
    }

    /// Creates a handler taking two typed arguments.
    pub fn binary<T1, T2, F>(f: F) -> Self
    where
        T1: Any,
        T2: Any,
        F: Fn(&T1, &T2) + Send + Sync + 'static,
    {
        Self::wrap(Some(2), move |args| {
            if let (Some(a), Some(b)) = (arg::<T1>(args, 0), arg::<T2>(args, 1)) {
                f(a, b);
            }
        })
    }

    /// Creates a handler taking three typed arguments.
    pub fn ternary<T1, T2, T3, F>(f: F) -> Self
    where
        T1: Any,
        T2: Any,
        T3: Any,
        F: Fn(&T1, &T2, &T3) + Send + Sync + 'static,
    {
        Self::wrap(Some(3), move |args| {
            if let (Some(a), Some(b), Some(c)) =
                (arg::<T1>(args, 0), arg::<T2>(args, 1), arg::<T3>(args, 2))
            {
                f(a, b, c);
            }
        })
    }

    /// Number of typed parameters, `None` for variadic handlers.
    #[must_use]
    pub fn arity(&self) -> Option<usize> {
        self.arity
    }

    /// Returns true if both handles refer to the same callback.
    #[must_use]
    pub fn same(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.callback, &other.callback)
    }

    pub(crate) fn invoke(&self, args: Args<'_>) {
        (self.callback)(args);
    }
}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handler")
            .field("arity", &self.arity)
            .finish_non_exhaustive()
    }
}

fn arg<'a, T: Any>(args: Args<'a>, index: usize) -> Option<&'a T> {
    let value = args
        .get(index)
        .copied()
        .and_then(|value| value.downcast_ref::<T>());
    if value.is_none() {
        tracing::warn!(
            "Event handler skipped: argument {} is missing or not a {}",
            index,
            type_name::<T>()
        );
    }
    value
}

/// Owned argument list, for arguments that outlive the call that supplied
/// them (deferred opens).
#[derive(Default)]
pub struct OwnedArgs(Vec<Box<dyn Any + Send>>);

impl OwnedArgs {
    /// Creates an empty argument list.
    #[must_use]
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Appends an argument.
    #[must_use]
    pub fn with<T: Any + Send>(mut self, value: T) -> Self {
        self.0.push(Box::new(value));
        self
    }

    /// Number of arguments.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if there are no arguments.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Borrows the arguments in the shape `notify` and `on_open` take.
    #[must_use]
    pub fn as_refs(&self) -> Vec<&dyn Any> {
        self.0.iter().map(|value| &**value as &dyn Any).collect()
    }
}

impl fmt::Debug for OwnedArgs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OwnedArgs").field("len", &self.0.len()).finish()
    }
}
