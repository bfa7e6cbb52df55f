//! Plugin registration trait.

use std::any::Any;

use super::{Capability, Registry};

/// A provider that installs itself into a host [`Registry`].
///
/// Registration moves the instance into the registry under
/// [`CAPABILITY`](Self::CAPABILITY). The host retrieves it afterwards with
/// [`Registry::request`] or [`Registry::request_mut`].
pub trait Plugin: Any + Send + Sized {
    /// Capability this plugin provides.
    const CAPABILITY: Capability;

    /// Inserts `self` into `registry`. Has no other side effects.
    fn register(self, registry: &mut Registry) {
        registry.reply(Self::CAPABILITY, self);
    }
}
