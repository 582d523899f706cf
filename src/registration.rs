//! Explicit registration table mapping entry symbols to plugin descriptors.
//!
//! There is no metadata scanning and no runtime reflection: a module's build
//! declares, at registration time, the shape the activator validates at
//! activation time. Constructors are declared with their visibility and arity
//! (parameterful constructors exist for shape validation only and are never
//! invoked), wiring is declared as a typed setter list keyed by field name, and
//! post-construction hooks are declared in a runtime method table. The loader
//! populates a [`RegistrationTable`] for each load by consulting a
//! [`ModuleRegistrar`] supplied by the collaborator that built the module.

use std::any::Any ;
use std::collections::HashMap ;

use crate::descriptor::ModuleDescriptor ;
use crate::registry::{ ServiceEntry, ServiceRef };



/// An object created inside a module's isolation boundary.
pub type PluginObject = Box<dyn Any + Send> ;

/// Per-type release hook, invoked once at activator teardown.
pub type ReleaseFn = fn( &mut dyn Any ) -> Result<(), String> ;

/// Bootstrap callback: receives the current shared-service set and returns the
/// set to use for the activation, which may add to or override it.
pub type BootstrapFn = fn( &dyn Any, Vec<ServiceEntry> ) -> Vec<ServiceEntry> ;

/// Constructor visibility, as declared by the module's build.
#[derive( Debug, Clone, Copy, PartialEq, Eq )]
pub enum Visibility {
	/// Callable from outside the module.
	Public,
	/// Internal to the module; never eligible for activation.
	Module,
}

/// What a declared constructor accepts.
#[derive( Debug, Clone, Copy )]
pub enum ConstructorKind {
	/// Argumentless; invocable by the activator.
	Argumentless( fn() -> PluginObject ),
	/// Takes parameters; declared for shape validation only, never invoked.
	Parameterised {
		/// Number of parameters the constructor takes
		arity: usize,
	},
}

/// One constructor declared by a plugin or bootstrap type.
#[derive( Debug, Clone, Copy )]
pub struct ConstructorSpec {
	visibility: Visibility,
	kind: ConstructorKind,
}

impl ConstructorSpec {
	/// Declares a constructor.
	#[inline]
	pub fn new( visibility: Visibility, kind: ConstructorKind ) -> Self {
		Self { visibility, kind }
	}

	/// Declares a public argumentless constructor.
	#[inline]
	pub fn public_argumentless( construct: fn() -> PluginObject ) -> Self {
		Self::new( Visibility::Public, ConstructorKind::Argumentless( construct ))
	}

	/// Declares a public constructor taking `arity` parameters.
	#[inline]
	pub fn public_with_parameters( arity: usize ) -> Self {
		Self::new( Visibility::Public, ConstructorKind::Parameterised { arity })
	}

	/// Constructor visibility.
	#[inline] pub fn visibility( &self ) -> Visibility { self.visibility }

	/// What the constructor accepts.
	#[inline] pub fn kind( &self ) -> ConstructorKind { self.kind }
}

/// A typed wiring slot: the setter for one injectable field.
///
/// The setter returns `false` when the offered value is not assignable to the
/// field, which triggers the bridge fallback during injection.
#[derive( Debug, Clone, Copy )]
pub struct WiringSlot {
	field: &'static str,
	set: fn( &mut dyn Any, &ServiceRef ) -> bool,
}

impl WiringSlot {
	/// Declares the setter for `field`.
	#[inline]
	pub fn new( field: &'static str, set: fn( &mut dyn Any, &ServiceRef ) -> bool ) -> Self {
		Self { field, set }
	}

	/// Field name the slot wires.
	#[inline] pub fn field( &self ) -> &'static str { self.field }

	/// Offers `value` to the field; `false` means not assignable.
	#[inline]
	pub fn assign( &self, instance: &mut dyn Any, value: &ServiceRef ) -> bool {
		( self.set )( instance, value )
	}
}

/// One entry of a plugin type's runtime method table.
#[derive( Debug, Clone, Copy )]
pub struct HookSpec {
	name: &'static str,
	invoke: fn( &mut dyn Any ),
}

impl HookSpec {
	/// Declares a runtime method named `name`.
	#[inline]
	pub fn new( name: &'static str, invoke: fn( &mut dyn Any )) -> Self {
		Self { name, invoke }
	}

	/// Method name.
	#[inline] pub fn name( &self ) -> &'static str { self.name }

	/// Invokes the method on `instance` with no arguments.
	#[inline]
	pub fn invoke( &self, instance: &mut dyn Any ) {
		( self.invoke )( instance )
	}
}

/// The declared shape of one plugin type: constructors, wiring slots, hooks,
/// and an optional release hook.
#[derive( Debug, Clone )]
pub struct PluginRegistration {
	type_name: &'static str,
	constructors: Vec<ConstructorSpec>,
	slots: Vec<WiringSlot>,
	hooks: Vec<HookSpec>,
	on_release: Option<ReleaseFn>,
}

impl PluginRegistration {
	/// Starts a registration for `type_name` with no constructors, slots, or hooks.
	pub fn new( type_name: &'static str ) -> Self {
		Self {
			type_name,
			constructors: Vec::with_capacity( 0 ),
			slots: Vec::with_capacity( 0 ),
			hooks: Vec::with_capacity( 0 ),
			on_release: None,
		}
	}

	/// Declares a constructor.
	pub fn with_constructor( mut self, constructor: ConstructorSpec ) -> Self {
		self.constructors.push( constructor );
		self
	}

	/// Declares the wiring slot for `field`.
	pub fn with_slot( mut self, field: &'static str, set: fn( &mut dyn Any, &ServiceRef ) -> bool ) -> Self {
		self.slots.push( WiringSlot::new( field, set ));
		self
	}

	/// Declares a runtime method.
	pub fn with_hook( mut self, name: &'static str, invoke: fn( &mut dyn Any )) -> Self {
		self.hooks.push( HookSpec::new( name, invoke ));
		self
	}

	/// Declares the release hook invoked once at activator teardown.
	pub fn with_release( mut self, on_release: ReleaseFn ) -> Self {
		self.on_release = Some( on_release );
		self
	}

	/// Name of the registered type.
	#[inline] pub fn type_name( &self ) -> &'static str { self.type_name }

	/// All declared constructors.
	#[inline] pub fn constructors( &self ) -> &[ConstructorSpec] { &self.constructors }

	/// Declared public constructors, in declaration order.
	pub fn public_constructors( &self ) -> impl Iterator<Item = &ConstructorSpec> {
		self.constructors.iter().filter(| spec | spec.visibility() == Visibility::Public )
	}

	/// The wiring slot named exactly `field`, if declared.
	pub fn slot( &self, field: &str ) -> Option<&WiringSlot> {
		self.slots.iter().find(| slot | slot.field() == field )
	}

	/// The runtime method named exactly `name`, if declared.
	pub fn hook( &self, name: &str ) -> Option<&HookSpec> {
		self.hooks.iter().find(| hook | hook.name() == name )
	}

	/// The release hook, if declared.
	#[inline] pub fn on_release( &self ) -> Option<ReleaseFn> { self.on_release }
}

/// What a declared bridge constructor accepts.
#[derive( Debug, Clone, Copy )]
pub enum BridgeConstructorKind {
	/// A single untyped parameter; invocable during the bridge fallback.
	Unary( fn( &ServiceRef ) -> ServiceRef ),
	/// Any other shape; declared for validation only, never invoked.
	Other {
		/// Number of parameters the constructor takes
		arity: usize,
	},
}

/// One constructor declared by a bridge type.
#[derive( Debug, Clone, Copy )]
pub struct BridgeConstructorSpec {
	visibility: Visibility,
	kind: BridgeConstructorKind,
}

impl BridgeConstructorSpec {
	/// Declares a bridge constructor.
	#[inline]
	pub fn new( visibility: Visibility, kind: BridgeConstructorKind ) -> Self {
		Self { visibility, kind }
	}

	/// Declares the public single-untyped-parameter constructor.
	#[inline]
	pub fn public_unary( construct: fn( &ServiceRef ) -> ServiceRef ) -> Self {
		Self::new( Visibility::Public, BridgeConstructorKind::Unary( construct ))
	}

	/// Constructor visibility.
	#[inline] pub fn visibility( &self ) -> Visibility { self.visibility }

	/// What the constructor accepts.
	#[inline] pub fn kind( &self ) -> BridgeConstructorKind { self.kind }
}

/// The declared shape of one bridge type.
///
/// A usable bridge exposes a public constructor accepting a single untyped
/// parameter; the constructed bridge adapts a resolved service to a field the
/// service itself is not assignable to.
#[derive( Debug, Clone )]
pub struct BridgeRegistration {
	type_name: &'static str,
	constructors: Vec<BridgeConstructorSpec>,
}

impl BridgeRegistration {
	/// Starts a registration for bridge type `type_name`.
	pub fn new( type_name: &'static str ) -> Self {
		Self { type_name, constructors: Vec::with_capacity( 0 ) }
	}

	/// Declares a constructor.
	pub fn with_constructor( mut self, constructor: BridgeConstructorSpec ) -> Self {
		self.constructors.push( constructor );
		self
	}

	/// Name of the bridge type.
	#[inline] pub fn type_name( &self ) -> &'static str { self.type_name }

	/// The bridge's sole public constructor, provided it takes a single
	/// untyped parameter. Any other public constructor shape, or more than one
	/// public constructor, disqualifies the bridge.
	pub fn unary_public_constructor( &self ) -> Option<fn( &ServiceRef ) -> ServiceRef> {
		let mut publics = self.constructors.iter()
			.filter(| spec | spec.visibility() == Visibility::Public );
		let sole = publics.next()?;
		match ( publics.next(), sole.kind() ) {
			( Option::None, BridgeConstructorKind::Unary( construct )) => Some( construct ),
			_ => Option::None,
		}
	}
}

/// The declared shape of one bootstrap type plus its bootstrap callback.
#[derive( Debug, Clone )]
pub struct BootstrapRegistration {
	type_name: &'static str,
	constructors: Vec<ConstructorSpec>,
	bootstrap: BootstrapFn,
}

impl BootstrapRegistration {
	/// Starts a registration for bootstrap type `type_name`.
	pub fn new( type_name: &'static str, bootstrap: BootstrapFn ) -> Self {
		Self { type_name, constructors: Vec::with_capacity( 0 ), bootstrap }
	}

	/// Declares a constructor.
	pub fn with_constructor( mut self, constructor: ConstructorSpec ) -> Self {
		self.constructors.push( constructor );
		self
	}

	/// Name of the bootstrap type.
	#[inline] pub fn type_name( &self ) -> &'static str { self.type_name }

	/// All declared constructors.
	#[inline] pub fn constructors( &self ) -> &[ConstructorSpec] { &self.constructors }

	/// Declared public constructors, in declaration order.
	pub fn public_constructors( &self ) -> impl Iterator<Item = &ConstructorSpec> {
		self.constructors.iter().filter(| spec | spec.visibility() == Visibility::Public )
	}

	/// The bootstrap callback.
	#[inline] pub fn bootstrap( &self ) -> BootstrapFn { self.bootstrap }
}

/// Everything a loaded module registers: entry symbols mapped to plugin
/// descriptors, plus bridge and bootstrap types referenced by configuration.
#[derive( Debug, Clone, Default )]
pub struct RegistrationTable {
	plugins: HashMap<String, PluginRegistration>,
	bridges: HashMap<String, BridgeRegistration>,
	bootstraps: HashMap<String, BootstrapRegistration>,
}

impl RegistrationTable {
	/// Creates an empty table.
	pub fn new() -> Self { Self::default() }

	/// Registers the plugin type behind entry symbol `symbol`.
	pub fn with_plugin( mut self, symbol: impl Into<String>, registration: PluginRegistration ) -> Self {
		self.plugins.insert( symbol.into(), registration );
		self
	}

	/// Registers a bridge type under `symbol`.
	pub fn with_bridge( mut self, symbol: impl Into<String>, registration: BridgeRegistration ) -> Self {
		self.bridges.insert( symbol.into(), registration );
		self
	}

	/// Registers a bootstrap type under `symbol`.
	pub fn with_bootstrap( mut self, symbol: impl Into<String>, registration: BootstrapRegistration ) -> Self {
		self.bootstraps.insert( symbol.into(), registration );
		self
	}

	/// The plugin registration behind entry symbol `symbol`, if any.
	pub fn plugin( &self, symbol: &str ) -> Option<&PluginRegistration> {
		self.plugins.get( symbol )
	}

	/// The bridge registration under `symbol`, if any.
	pub fn bridge( &self, symbol: &str ) -> Option<&BridgeRegistration> {
		self.bridges.get( symbol )
	}

	/// The bootstrap registration under `symbol`, if any.
	pub fn bootstrap( &self, symbol: &str ) -> Option<&BootstrapRegistration> {
		self.bootstraps.get( symbol )
	}
}

/// Populates a module's registration table at load time.
///
/// Supplied by the collaborator that built the module; the loader invokes it
/// once per load and stores the result on the loaded module. This replaces any
/// declarative metadata convention: the core never scans for plugin entry
/// points.
pub trait ModuleRegistrar: Send + Sync {
	/// Returns the registration table for `descriptor`.
	fn register( &self, descriptor: &ModuleDescriptor ) -> RegistrationTable ;
}

impl<F> ModuleRegistrar for F
where
	F: Fn( &ModuleDescriptor ) -> RegistrationTable + Send + Sync,
{
	fn register( &self, descriptor: &ModuleDescriptor ) -> RegistrationTable {
		self( descriptor )
	}
}
