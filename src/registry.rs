//! Per-activation service registry and the shared-services seam.
//!
//! A [`ServiceRegistry`] is built fresh for every activation call and is never
//! shared across activations. It records which service types came from the
//! host set and which from the shared (plugin-side) set, so a binding's
//! declared origin resolves unambiguously even when both sides register the
//! same declared type.

use std::any::{ Any, TypeId };
use std::collections::HashMap ;
use std::sync::Arc ;



/// A service object offered through a registry.
///
/// Stored untyped; wiring setters and factories downcast per the convention of
/// the module that registered the slot.
pub type ServiceRef = Arc<dyn Any + Send + Sync> ;

/// Identity of a declared service type.
#[derive( Debug, Clone, Copy, PartialEq, Eq, Hash )]
pub struct ServiceKey {
	id: TypeId,
	name: &'static str,
}

impl ServiceKey {
	/// The key of declared service type `S`.
	///
	/// `S` may be unsized, so trait objects work directly:
	/// `ServiceKey::of::<dyn Greet>()`.
	#[inline]
	pub fn of<S: ?Sized + 'static>() -> Self {
		Self { id: TypeId::of::<S>(), name: std::any::type_name::<S>() }
	}

	/// Human-readable name of the declared type, for diagnostics.
	#[inline] pub fn name( &self ) -> &'static str { self.name }
}

impl std::fmt::Display for ServiceKey {
	fn fmt( &self, f: &mut std::fmt::Formatter ) -> std::fmt::Result { write!( f, "{}", self.name )}
}

/// One service registration: a declared type key and its provider instance.
#[derive( Clone )]
pub struct ServiceEntry {
	key: ServiceKey,
	instance: ServiceRef,
}

impl ServiceEntry {
	/// Registers `instance` as the provider for declared type `S`.
	#[inline]
	pub fn new<S: ?Sized + 'static>( instance: ServiceRef ) -> Self {
		Self { key: ServiceKey::of::<S>(), instance }
	}

	/// Registers `instance` under an explicit key.
	#[inline]
	pub fn with_key( key: ServiceKey, instance: ServiceRef ) -> Self {
		Self { key, instance }
	}

	/// The declared type key.
	#[inline] pub fn key( &self ) -> ServiceKey { self.key }

	/// The provider instance.
	#[inline] pub fn instance( &self ) -> &ServiceRef { &self.instance }
}

impl std::fmt::Debug for ServiceEntry {
	fn fmt( &self, f: &mut std::fmt::Formatter<'_> ) -> std::fmt::Result {
		f.debug_struct( "ServiceEntry" )
			.field( "key", &self.key )
			.field( "instance", &"<service>" )
			.finish()
	}
}

/// The seam through which the activator obtains host and shared services.
///
/// Host services are owned by the host and merely referenced by the plugin
/// side; shared services form the plugin-side set a bootstrap may add to or
/// override.
pub trait SharedServicesProvider: Send + Sync {
	/// Services the host provides to activations.
	fn host_services( &self ) -> Vec<ServiceEntry> ;

	/// Process-wide shared services offered to the plugin side.
	fn shared_services( &self ) -> Vec<ServiceEntry> ;
}

/// Service lookup scoped to one activation call.
///
/// Host-origin and plugin-origin providers are kept apart; within one origin,
/// the last registration of a key wins.
#[derive( Default )]
pub struct ServiceRegistry {
	host: HashMap<ServiceKey, ServiceRef>,
	plugin: HashMap<ServiceKey, ServiceRef>,
}

impl ServiceRegistry {
	/// Builds a registry from the host set and the (possibly bootstrapped)
	/// shared set.
	pub(crate) fn build( host: Vec<ServiceEntry>, shared: Vec<ServiceEntry> ) -> Self {
		Self {
			host: host.into_iter().map(| entry | ( entry.key, entry.instance )).collect(),
			plugin: shared.into_iter().map(| entry | ( entry.key, entry.instance )).collect(),
		}
	}

	/// Resolves `key` from the host-provided set.
	pub fn resolve_host( &self, key: &ServiceKey ) -> Option<ServiceRef> {
		self.host.get( key ).cloned()
	}

	/// Resolves `key` from the plugin-side shared set.
	pub fn resolve_plugin( &self, key: &ServiceKey ) -> Option<ServiceRef> {
		self.plugin.get( key ).cloned()
	}

	/// Number of host-provided registrations.
	#[inline] pub fn host_len( &self ) -> usize { self.host.len() }

	/// Number of plugin-side registrations.
	#[inline] pub fn plugin_len( &self ) -> usize { self.plugin.len() }
}

impl std::fmt::Debug for ServiceRegistry {
	fn fmt( &self, f: &mut std::fmt::Formatter<'_> ) -> std::fmt::Result {
		f.debug_struct( "ServiceRegistry" )
			.field( "host", &self.host.keys().collect::<Vec<_>>() )
			.field( "plugin", &self.plugin.keys().collect::<Vec<_>>() )
			.finish()
	}
}
