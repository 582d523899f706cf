//! The remote plugin activator: per-activation registries, instance creation,
//! and idempotent teardown.
//!
//! One activator serves many activation calls against many modules. Every call
//! builds a fresh [`ServiceRegistry`] from the shared-services seam, validates
//! the target type's declared shape against the module's registration table,
//! constructs and wires the instance, and tracks everything it created.
//! Tracked entries hold module handles, so an activator that has not been torn
//! down keeps its modules reachable and unload verification honest.
//!
//! Teardown walks tracked objects in creation order, invokes each declared
//! release hook exactly once, logs failures, and never propagates them. A
//! second teardown is a no-op; activation after teardown fails with
//! [`ActivationError::ActivatorDisposed`].

use std::any::Any ;
use std::sync::{ Arc, Mutex, PoisonError };
use itertools::Itertools ;
use pipe_trait::Pipe ;

use crate::activation::ActivationDescriptor ;
use crate::context::ModuleHandle ;
use crate::error::ActivationError ;
use crate::injection::inject_fields ;
use crate::registration::{ BootstrapFn, ConstructorKind, ConstructorSpec, PluginObject, ReleaseFn };
use crate::registry::{ ServiceEntry, ServiceRef, ServiceRegistry, SharedServicesProvider };



/// One object the activator created and keeps alive until teardown.
enum TrackedObject {
	/// A plugin or bootstrap instance.
	Instance( Arc<Mutex<PluginObject>> ),
	/// A bridge constructed during the injection fallback.
	Bridge( ServiceRef ),
	/// The registry built for one activation call.
	Registry( Arc<ServiceRegistry> ),
}

struct Tracked {
	object: TrackedObject,
	type_name: &'static str,
	release: Option<ReleaseFn>,
	module: ModuleHandle,
}

/// Creates, wires, and tracks plugin instances across the isolation boundary.
///
/// Cheap to share behind an `Arc`; all methods take `&self`.
pub struct PluginActivator {
	provider: Arc<dyn SharedServicesProvider>,
	tracked: Mutex<Option<Vec<Tracked>>>,
}

/// A tracked, activated plugin instance.
///
/// The activator keeps its own reference until teardown, so dropping the
/// handle does not release the instance.
pub struct InstanceHandle {
	object: Arc<Mutex<PluginObject>>,
}

/// A constructed bootstrap instance, passed into `create_instance` to let it
/// reshape the shared-service set.
pub struct BootstrapHandle {
	object: Arc<Mutex<PluginObject>>,
	callback: BootstrapFn,
}

impl PluginActivator {

	/// Creates an activator drawing host and shared services from `provider`.
	pub fn new( provider: Arc<dyn SharedServicesProvider> ) -> Self {
		Self { provider, tracked: Mutex::new( Some( Vec::with_capacity( 0 ))) }
	}

	/// Constructs the bootstrap type behind `symbol` in `module`.
	///
	/// # Errors
	/// Returns [`ActivationError::UnknownBootstrapType`] when `symbol` names no
	/// bootstrap registration, the constructor-shape errors when the type does
	/// not expose exactly one public argumentless constructor, and
	/// [`ActivationError::ActivatorDisposed`] after teardown.
	pub fn create_bootstrap( &self, symbol: &str, module: &ModuleHandle ) -> Result<BootstrapHandle, ActivationError> {
		self.ensure_live()?;

		let registration = module.registrations().bootstrap( symbol )
			.ok_or_else(|| ActivationError::UnknownBootstrapType { symbol: symbol.to_string() })?;
		let construct = sole_argumentless_constructor(
			registration.type_name(),
			registration.public_constructors(),
		)?;

		let object = Arc::new( Mutex::new( construct() ));
		self.track( Tracked {
			object: TrackedObject::Instance( object.clone() ),
			type_name: registration.type_name(),
			release: Option::None,
			module: module.clone(),
		})?;

		tracing::debug!(
			target: "plugin_isolate::activator",
			bootstrap = registration.type_name(),
			module = module.descriptor().name(),
			"bootstrap constructed"
		);

		Ok( BootstrapHandle { object, callback: registration.bootstrap() })
	}

	/// Activates the plugin described by `descriptor`.
	///
	/// Builds the per-activation registry (letting `bootstrap` reshape the
	/// shared set first, when given), then either delegates wholly to the
	/// descriptor's factory or constructs the instance, injects its bound
	/// fields, and invokes the configured post-construction hook. Everything
	/// created by a successful call is tracked until teardown.
	///
	/// # Errors
	/// Fails fast on configuration defects (unknown symbols, duplicate
	/// bindings, constructor-shape violations) and surfaces wiring failures
	/// per the bridge-fallback rules of the injection protocol. A failed call
	/// tracks nothing.
	pub fn create_instance(
		&self,
		descriptor: &ActivationDescriptor,
		bootstrap: Option<&BootstrapHandle>,
	) -> Result<InstanceHandle, ActivationError> {
		self.ensure_live()?;

		let module = descriptor.module();
		let registration = module.registrations().plugin( descriptor.entry_symbol() )
			.ok_or_else(|| ActivationError::UnknownPluginType {
				symbol: descriptor.entry_symbol().to_string(),
			})?;

		if let Some( binding ) = descriptor.bindings().iter()
			.duplicates_by(| binding | binding.field() )
			.next()
		{
			return Err( ActivationError::DuplicateBinding { field: binding.field().to_string() });
		}

		// More than one public constructor is ambiguous even when a factory
		// would sidestep construction.
		if registration.public_constructors().nth( 1 ).is_some() {
			return Err( ActivationError::MultiplePublicConstructors {
				type_name: registration.type_name().to_string(),
			});
		}

		let registry = self.build_registry( bootstrap ).pipe( Arc::new );

		let ( object, release ) = match descriptor.factory() {
			Some( factory ) => {
				let object = factory( &registry )
					.map_err(| message | ActivationError::FactoryFailure { message })?;
				( object, Option::None )
			},
			Option::None => {
				let construct = sole_argumentless_constructor(
					registration.type_name(),
					registration.public_constructors(),
				)?;
				let mut object = construct();
				let mut bridges: Vec<( ServiceRef, &'static str )> = Vec::with_capacity( 0 );
				inject_fields(
					&mut *object,
					registration,
					module.registrations(),
					&registry,
					descriptor.bindings(),
					&mut | bridged, symbol | bridges.push(( bridged, symbol )),
				)?;
				if let Some( hook_name ) = descriptor.activated_hook() {
					let hook = registration.hook( hook_name )
						.ok_or_else(|| ActivationError::HookMissing {
							hook: hook_name.to_string(),
							type_name: registration.type_name().to_string(),
						})?;
					hook.invoke( &mut *object );
				}
				for ( bridged, symbol ) in bridges {
					self.track( Tracked {
						object: TrackedObject::Bridge( bridged ),
						type_name: symbol,
						release: Option::None,
						module: module.clone(),
					})?;
				}
				( object, registration.on_release() )
			},
		};

		self.track( Tracked {
			object: TrackedObject::Registry( registry ),
			type_name: "ServiceRegistry",
			release: Option::None,
			module: module.clone(),
		})?;

		let object = Arc::new( Mutex::new( object ));
		self.track( Tracked {
			object: TrackedObject::Instance( object.clone() ),
			type_name: registration.type_name(),
			release,
			module: module.clone(),
		})?;

		tracing::debug!(
			target: "plugin_isolate::activator",
			plugin = registration.type_name(),
			module = module.descriptor().name(),
			generation = module.generation(),
			"instance activated"
		);

		Ok( InstanceHandle { object })
	}

	/// Number of objects currently tracked; zero after teardown.
	pub fn tracked_len( &self ) -> usize {
		self.lock_tracked().as_ref().map_or( 0, Vec::len )
	}

	/// Releases every tracked object in creation order and drops the
	/// activator's module references.
	///
	/// Release-hook failures are logged and swallowed; one failing object never
	/// prevents the release of the rest. Calling teardown again is a no-op.
	pub fn teardown( &self ) {
		let Some( entries ) = self.lock_tracked().take() else { return };

		let ( released, failures ): ( Vec<_>, Vec<_> ) = entries.into_iter()
			.map( release_entry )
			.partition_result();

		let released = released.len();
		let failed = failures.len();
		for ( type_name, module, message ) in failures {
			tracing::warn!(
				target: "plugin_isolate::activator",
				type_name,
				module = %module,
				message = %message,
				"release hook failed"
			);
		}
		tracing::debug!(
			target: "plugin_isolate::activator",
			released,
			failed,
			"activator torn down"
		);
	}

	fn build_registry( &self, bootstrap: Option<&BootstrapHandle> ) -> ServiceRegistry {
		let host = self.provider.host_services();
		let shared = self.provider.shared_services();
		let shared = match bootstrap {
			Option::None => shared,
			Some( handle ) => handle.bootstrap( shared ),
		};
		ServiceRegistry::build( host, shared )
	}

	fn ensure_live( &self ) -> Result<(), ActivationError> {
		match self.lock_tracked().is_some() {
			true => Ok(()),
			false => Err( ActivationError::ActivatorDisposed ),
		}
	}

	fn track( &self, entry: Tracked ) -> Result<(), ActivationError> {
		self.lock_tracked().as_mut()
			.ok_or( ActivationError::ActivatorDisposed )?
			.push( entry );
		Ok(())
	}

	fn lock_tracked( &self ) -> std::sync::MutexGuard<'_, Option<Vec<Tracked>>> {
		self.tracked.lock().unwrap_or_else( PoisonError::into_inner )
	}

}

impl Drop for PluginActivator {
	fn drop( &mut self ) { self.teardown() }
}

impl std::fmt::Debug for PluginActivator {
	fn fmt( &self, f: &mut std::fmt::Formatter<'_> ) -> std::fmt::Result {
		f.debug_struct( "PluginActivator" )
			.field( "tracked", &self.tracked_len() )
			.finish_non_exhaustive()
	}
}

impl InstanceHandle {
	/// Calls `observe` with a shared view of the instance.
	pub fn with<R>( &self, observe: impl FnOnce( &dyn Any ) -> R ) -> R {
		let guard = self.object.lock().unwrap_or_else( PoisonError::into_inner );
		observe( &**guard )
	}

	/// Calls `mutate` with an exclusive view of the instance.
	pub fn with_mut<R>( &self, mutate: impl FnOnce( &mut dyn Any ) -> R ) -> R {
		let mut guard = self.object.lock().unwrap_or_else( PoisonError::into_inner );
		mutate( &mut **guard )
	}
}

impl std::fmt::Debug for InstanceHandle {
	fn fmt( &self, f: &mut std::fmt::Formatter<'_> ) -> std::fmt::Result {
		f.debug_struct( "InstanceHandle" ).finish_non_exhaustive()
	}
}

impl BootstrapHandle {
	/// Runs the bootstrap callback over `shared`, returning the service set to
	/// use for the activation.
	pub fn bootstrap( &self, shared: Vec<ServiceEntry> ) -> Vec<ServiceEntry> {
		let guard = self.object.lock().unwrap_or_else( PoisonError::into_inner );
		( self.callback )( &**guard, shared )
	}
}

impl std::fmt::Debug for BootstrapHandle {
	fn fmt( &self, f: &mut std::fmt::Formatter<'_> ) -> std::fmt::Result {
		f.debug_struct( "BootstrapHandle" ).finish_non_exhaustive()
	}
}

fn sole_argumentless_constructor<'a>(
	type_name: &str,
	mut publics: impl Iterator<Item = &'a ConstructorSpec>,
) -> Result<fn() -> PluginObject, ActivationError> {
	let sole = publics.next()
		.ok_or_else(|| ActivationError::NoPublicConstructor { type_name: type_name.to_string() })?;
	if publics.next().is_some() {
		return Err( ActivationError::MultiplePublicConstructors { type_name: type_name.to_string() });
	}
	match sole.kind() {
		ConstructorKind::Argumentless( construct ) => Ok( construct ),
		ConstructorKind::Parameterised { .. } => Err( ActivationError::ConstructorHasParameters {
			type_name: type_name.to_string(),
		}),
	}
}

fn release_entry( entry: Tracked ) -> Result<&'static str, ( &'static str, String, String )> {
	match ( &entry.object, entry.release ) {
		( TrackedObject::Instance( object ), Some( release )) => {
			let mut guard = object.lock().unwrap_or_else( PoisonError::into_inner );
			release( &mut **guard )
				.map(|()| entry.type_name )
				.map_err(| message | (
					entry.type_name,
					entry.module.descriptor().name().to_string(),
					message,
				))
		},
		_ => Ok( entry.type_name ),
	}
}
