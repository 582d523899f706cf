//! A plugin host with isolated, verifiably unloadable module contexts.
//!
//! Modules are self-describing bundles: a payload file plus a dependency
//! manifest listing the libraries the module needs. `plugin_isolate` resolves
//! that dependency closure against explicit sharing rules, loads the module
//! into an isolation boundary with a fresh generation id, activates plugin
//! instances inside it with per-activation service wiring, and can later prove
//! the module was actually reclaimed after unload.
//!
//! # Core Concepts
//!
//! - [`ModuleDescriptor`]: Identifies one loadable module by name, location, and
//! 	target runtime. The manifest is expected at `<name>.deps.json` next to the
//! 	payload, `<name>.module`.
//!
//! - [`LoadOptions`]: The explicit, immutable configuration for one load:
//! 	probing paths, shared-type lists, policy flags, and the payload strategy.
//! 	Nothing is read from ambient configuration.
//!
//! - [`SharedType`]: A type intentionally shared by identity across the
//! 	isolation boundary. Its carrying library is never loaded privately; the
//! 	sharing side's existing copy is substituted so the type keeps one
//! 	identity.
//!
//! - [`LoadContext`]: The isolation boundary and lifecycle owner of one loaded
//! 	module. Every load mints a fresh generation id; unload drops the
//! 	context's strong references, and [`LoadContext::verify_unloaded`] polls
//! 	the module's reference count until reclamation is proven or a retry
//! 	budget runs out.
//!
//! - [`RegistrationTable`]: The declared shape of everything a module offers:
//! 	plugin types behind entry symbols, bridge types, and bootstrap types, with
//! 	constructors, typed wiring slots, hooks, and release hooks. Populated at
//! 	load time by a [`ModuleRegistrar`]; nothing is discovered by scanning.
//!
//! - [`PluginActivator`]: Creates plugin instances from [`ActivationDescriptor`]s.
//! 	Each call builds a fresh [`ServiceRegistry`] from a
//! 	[`SharedServicesProvider`] (optionally reshaped by a bootstrap instance),
//! 	injects bound fields with a bridge fallback for type-incompatible
//! 	services, and tracks every created object until [`PluginActivator::teardown`].
//!
//! # Example
//!
//! ```
//! use std::any::Any ;
//! use std::sync::Arc ;
//! use std::time::Duration ;
//! use plugin_isolate::{
//! 	ActivationDescriptor, ConstructorSpec, HostFramework, LoadContext, LoadOptions,
//! 	LoadStrategy, ModuleDescriptor, PluginActivator, PluginRegistration,
//! 	PluginServiceBinding, RegistrationTable, ServiceEntry, ServiceKey, ServiceOrigin,
//! 	ServiceRef, SharedServicesProvider,
//! };
//!
//! // The plugin type lives behind the isolation boundary and is only ever
//! // handled as `dyn Any`; its build declares typed setters and hooks.
//! #[derive( Default )]
//! struct Greeter {
//! 	prefix: Option<Arc<String>>,
//! 	activated: bool,
//! }
//!
//! fn set_prefix( instance: &mut dyn Any, value: &ServiceRef ) -> bool {
//! 	let Some( greeter ) = instance.downcast_mut::<Greeter>() else { return false };
//! 	match value.clone().downcast::<String>() {
//! 		Ok( prefix ) => { greeter.prefix = Some( prefix ); true },
//! 		Err( _ ) => false,
//! 	}
//! }
//!
//! fn mark_activated( instance: &mut dyn Any ) {
//! 	if let Some( greeter ) = instance.downcast_mut::<Greeter>() {
//! 		greeter.activated = true;
//! 	}
//! }
//!
//! // The host side of the shared-services seam.
//! struct HostServices ;
//!
//! impl SharedServicesProvider for HostServices {
//! 	fn host_services( &self ) -> Vec<ServiceEntry> {
//! 		vec![ ServiceEntry::new::<String>( Arc::new( "Hello".to_string() ))]
//! 	}
//! 	fn shared_services( &self ) -> Vec<ServiceEntry> { Vec::new() }
//! }
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // A module on disk is a payload plus a `<name>.deps.json` manifest.
//! let dir = tempfile::tempdir()?;
//! std::fs::write(
//! 	dir.path().join( "greeter.deps.json" ),
//! 	r#"{ "module": "greeter", "version": "1.0.0" }"#,
//! )?;
//!
//! let descriptor = ModuleDescriptor::new( "greeter", dir.path(), "linux-x64" );
//! let options = LoadOptions::new( HostFramework::new( "demo-host", "1.0" ))
//! 	.with_strategy( LoadStrategy::FromBytes( Vec::new() ));
//!
//! // The collaborator that built the module declares its shape explicitly.
//! let registrar = | _descriptor: &ModuleDescriptor | RegistrationTable::new()
//! 	.with_plugin( "demo.Greeter", PluginRegistration::new( "Greeter" )
//! 		.with_constructor( ConstructorSpec::public_argumentless(
//! 			|| Box::new( Greeter::default() ),
//! 		))
//! 		.with_slot( "prefix", set_prefix )
//! 		.with_hook( "mark_activated", mark_activated ));
//!
//! let mut context = LoadContext::new();
//! let module = context.load( &descriptor, &options, &registrar )?;
//!
//! // Activate: fresh registry, field injection, post-construction hook.
//! let activator = PluginActivator::new( Arc::new( HostServices ));
//! let activation = ActivationDescriptor::new( "demo.Greeter", module.clone() )
//! 	.with_activated_hook( "mark_activated" )
//! 	.with_binding( PluginServiceBinding::new(
//! 		"prefix",
//! 		ServiceKey::of::<String>(),
//! 		ServiceOrigin::Host,
//! 	));
//! let instance = activator.create_instance( &activation, None )?;
//!
//! instance.with(| plugin | {
//! 	let greeter = plugin.downcast_ref::<Greeter>().unwrap();
//! 	assert!( greeter.activated );
//! 	assert_eq!( greeter.prefix.as_deref().map( String::as_str ), Some( "Hello" ));
//! });
//!
//! // Unload, release everything the activator tracked, and prove reclamation.
//! context.unload()?;
//! activator.teardown();
//! drop( activation );
//! drop( module );
//! context.verify_unloaded( 5, Duration::from_millis( 10 ))?;
//! # Ok(())
//! # }
//! ```

mod descriptor ;
mod manifest ;
mod resolver ;
mod registration ;
mod context ;
mod registry ;
mod activation ;
mod activator ;
mod injection ;
mod error ;

pub use descriptor::{
	HostFramework, LoadOptions, LoadStrategy, ModuleDescriptor, RuntimeQualifier, SharedType,
};
pub use manifest::{ DependencyManifest, LibraryDependency };
pub use resolver::{ resolve_dependencies, ResolvedLibrary };
pub use registration::{
	BootstrapFn, BootstrapRegistration, BridgeConstructorKind, BridgeConstructorSpec,
	BridgeRegistration, ConstructorKind, ConstructorSpec, HookSpec, ModuleRegistrar,
	PluginObject, PluginRegistration, RegistrationTable, ReleaseFn, Visibility, WiringSlot,
};
pub use context::{ ContextState, LoadContext, LoadedModule, ModuleHandle };
pub use registry::{
	ServiceEntry, ServiceKey, ServiceRef, ServiceRegistry, SharedServicesProvider,
};
pub use activation::{ ActivationDescriptor, FactoryFn, PluginServiceBinding, ServiceOrigin };
pub use activator::{ BootstrapHandle, InstanceHandle, PluginActivator };
pub use error::{
	ActivationError, DependencyResolutionError, LoadError, ManifestError, UnloadTimeoutError,
};
