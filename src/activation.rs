//! Activation descriptors and service bindings.
//!
//! An [`ActivationDescriptor`] carries everything one `create_instance` call
//! needs: the entry symbol of the plugin type, the module handle, an optional
//! static factory, an optional post-construction hook name, and the ordered
//! service bindings. Descriptors are created per activation call and not
//! reused; bindings are declared by configuration and read-only during
//! activation.

use crate::context::ModuleHandle ;
use crate::registration::PluginObject ;
use crate::registry::{ ServiceKey, ServiceRegistry };



/// Which registry a service binding resolves against.
#[derive( Debug, Clone, Copy, PartialEq, Eq )]
pub enum ServiceOrigin {
	/// Provided by the host; owned by the host, referenced by the plugin side.
	Host,
	/// Provided by the plugin-side shared set.
	Plugin,
}

impl std::fmt::Display for ServiceOrigin {
	fn fmt( &self, f: &mut std::fmt::Formatter ) -> std::fmt::Result {
		match self {
			Self::Host => write!( f, "Host" ),
			Self::Plugin => write!( f, "Plugin" ),
		}
	}
}

/// One declared service wiring: a target field, the declared service type, the
/// origin to resolve from, and an optional bridge to fall back to.
#[derive( Debug, Clone )]
pub struct PluginServiceBinding {
	field: &'static str,
	service: ServiceKey,
	origin: ServiceOrigin,
	bridge: Option<&'static str>,
}

impl PluginServiceBinding {
	/// Declares a binding of `service` (resolved from `origin`) into `field`.
	#[inline]
	pub fn new( field: &'static str, service: ServiceKey, origin: ServiceOrigin ) -> Self {
		Self { field, service, origin, bridge: None }
	}

	/// Declares the bridge symbol to fall back to when the field rejects the
	/// resolved service.
	pub fn with_bridge( mut self, bridge: &'static str ) -> Self {
		self.bridge = Some( bridge );
		self
	}

	/// Target field name.
	#[inline] pub fn field( &self ) -> &'static str { self.field }

	/// Declared service type.
	#[inline] pub fn service( &self ) -> &ServiceKey { &self.service }

	/// Origin to resolve from.
	#[inline] pub fn origin( &self ) -> ServiceOrigin { self.origin }

	/// Declared bridge symbol, if any.
	#[inline] pub fn bridge( &self ) -> Option<&'static str> { self.bridge }
}

/// A static factory method: receives the per-activation registry as its sole
/// argument and is solely responsible for wiring.
pub type FactoryFn = fn( &ServiceRegistry ) -> Result<PluginObject, String> ;

/// Everything one activation call needs; created per call, never reused.
#[derive( Debug, Clone )]
pub struct ActivationDescriptor {
	entry_symbol: String,
	module: ModuleHandle,
	factory: Option<FactoryFn>,
	activated_hook: Option<String>,
	bindings: Vec<PluginServiceBinding>,
}

impl ActivationDescriptor {
	/// Starts a descriptor for the plugin behind `entry_symbol` in `module`.
	pub fn new( entry_symbol: impl Into<String>, module: ModuleHandle ) -> Self {
		Self {
			entry_symbol: entry_symbol.into(),
			module,
			factory: None,
			activated_hook: None,
			bindings: Vec::with_capacity( 0 ),
		}
	}

	/// Configures a static factory method; when set, field injection and the
	/// post-construction hook are skipped entirely.
	pub fn with_factory( mut self, factory: FactoryFn ) -> Self {
		self.factory = Some( factory );
		self
	}

	/// Configures the post-construction hook name; its absence on the created
	/// instance is fatal to the activation.
	pub fn with_activated_hook( mut self, hook: impl Into<String> ) -> Self {
		self.activated_hook = Some( hook.into() );
		self
	}

	/// Appends a service binding; bindings apply in declaration order.
	pub fn with_binding( mut self, binding: PluginServiceBinding ) -> Self {
		self.bindings.push( binding );
		self
	}

	/// Entry symbol of the plugin type.
	#[inline] pub fn entry_symbol( &self ) -> &str { &self.entry_symbol }

	/// Handle to the module the plugin activates inside.
	#[inline] pub fn module( &self ) -> &ModuleHandle { &self.module }

	/// The configured static factory, if any.
	#[inline] pub fn factory( &self ) -> Option<FactoryFn> { self.factory }

	/// The configured post-construction hook name, if any.
	#[inline] pub fn activated_hook( &self ) -> Option<&str> { self.activated_hook.as_deref() }

	/// Declared service bindings, in declaration order.
	#[inline] pub fn bindings( &self ) -> &[PluginServiceBinding] { &self.bindings }
}
