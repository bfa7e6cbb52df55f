//! Host capability registry.
//!
//! The host keeps one provider per [`Capability`]. Plugins insert themselves
//! with [`Plugin::register`]; the host looks them up by capability and type.
//!
//! ```rust
//! use stowage_core::{Capability, Registry};
//!
//! let mut registry = Registry::new();
//! registry.reply(Capability::Storage, String::from("provider"));
//!
//! assert_eq!(
//!     registry.request::<String>(Capability::Storage).map(String::as_str),
//!     Some("provider"),
//! );
//! assert!(registry.request::<u32>(Capability::Storage).is_none());
//! ```

mod capability;
mod plugin;

use std::any::Any;
use std::collections::HashMap;
use std::fmt;

pub use capability::Capability;
pub use plugin::Plugin;

use crate::TRACING_TARGET_REGISTRY;

type Provider = Box<dyn Any + Send>;

/// Lookup table from capability to provider instance.
///
/// Providers are owned by the registry. Mutable access goes through
/// [`request_mut`](Self::request_mut), so the borrow checker serialises
/// callers that mutate a provider's state.
#[derive(Default)]
pub struct Registry {
    providers: HashMap<Capability, Provider>,
}

impl Registry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `provider` under `capability`.
    ///
    /// Returns `true` when a previous provider was replaced.
    pub fn reply<T: Any + Send>(&mut self, capability: Capability, provider: T) -> bool {
        let replaced = self
            .providers
            .insert(capability, Box::new(provider))
            .is_some();

        tracing::debug!(
            target: TRACING_TARGET_REGISTRY,
            capability = %capability,
            provider = std::any::type_name::<T>(),
            replaced,
            "Provider registered"
        );

        replaced
    }

    /// Installs a plugin by letting it register itself.
    pub fn install<P: Plugin>(&mut self, plugin: P) -> &mut Self {
        plugin.register(self);
        self
    }

    /// Returns the provider for `capability` if it has type `T`.
    pub fn request<T: Any>(&self, capability: Capability) -> Option<&T> {
        self.providers.get(&capability)?.downcast_ref::<T>()
    }

    /// Returns the provider for `capability` mutably if it has type `T`.
    pub fn request_mut<T: Any>(&mut self, capability: Capability) -> Option<&mut T> {
        self.providers.get_mut(&capability)?.downcast_mut::<T>()
    }

    /// Removes and returns the provider for `capability` if it has type `T`.
    ///
    /// A provider of another type stays registered.
    pub fn take<T: Any>(&mut self, capability: Capability) -> Option<T> {
        let provider = self.providers.remove(&capability)?;
        match provider.downcast::<T>() {
            Ok(provider) => Some(*provider),
            Err(provider) => {
                self.providers.insert(capability, provider);
                None
            }
        }
    }

    /// Whether any provider is registered for `capability`.
    pub fn contains(&self, capability: Capability) -> bool {
        self.providers.contains_key(&capability)
    }

    /// Returns the registered capabilities.
    pub fn capabilities(&self) -> impl Iterator<Item = Capability> + '_ {
        self.providers.keys().copied()
    }

    /// Removes every provider.
    pub fn reset(&mut self) {
        tracing::debug!(
            target: TRACING_TARGET_REGISTRY,
            count = self.providers.len(),
            "Registry reset"
        );
        self.providers.clear();
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("capabilities", &self.providers.keys().collect::<Vec<_>>())
            .finish()
    }
}
