#[allow( dead_code )]
pub mod fixtures {

	use std::any::Any ;
	use std::path::Path ;
	use std::sync::atomic::{ AtomicUsize, Ordering };
	use std::sync::{ Arc, Mutex };

	use plugin_isolate::{
		BootstrapRegistration, BridgeConstructorKind, BridgeConstructorSpec, BridgeRegistration,
		ConstructorKind, ConstructorSpec, DependencyManifest, HostFramework, LoadContext,
		LoadOptions, LoadStrategy, ModuleDescriptor, ModuleHandle, PluginObject,
		PluginRegistration, RegistrationTable, ServiceEntry, ServiceKey, ServiceRef,
		ServiceRegistry, SharedServicesProvider, Visibility,
	};

	pub const PAYLOAD: &[u8] = b"module payload" ;

	// The service contract crossing the isolation boundary.

	pub trait Greet: Send + Sync {
		fn greet( &self ) -> String ;
	}

	pub struct ConsoleGreeter { pub label: &'static str }

	impl Greet for ConsoleGreeter {
		fn greet( &self ) -> String { format!( "hello from {}", self.label )}
	}

	/// A greeter the `greeter` slot does not accept directly; wiring it
	/// requires the bridge.
	pub struct RemoteGreeter { pub label: &'static str }

	impl RemoteGreeter {
		pub fn greet( &self ) -> String { format!( "hello from {}", self.label )}
	}

	pub struct GreeterBridge { inner: ServiceRef }

	impl GreeterBridge {
		pub fn adapt( value: &ServiceRef ) -> ServiceRef {
			Arc::new( Self { inner: value.clone() })
		}
	}

	impl Greet for GreeterBridge {
		fn greet( &self ) -> String {
			self.inner.downcast_ref::<RemoteGreeter>()
				.map( RemoteGreeter::greet )
				.unwrap_or_default()
		}
	}

	/// A bridge producing a value no slot accepts.
	pub fn opaque_adapt( _value: &ServiceRef ) -> ServiceRef {
		Arc::new(())
	}

	// Plugin types, their constructors, setters, hooks, and release hooks.

	#[derive( Default )]
	pub struct GreeterPlugin {
		pub greeter: Option<Arc<dyn Greet>>,
		pub releases: Option<Arc<AtomicUsize>>,
		pub activated: bool,
	}

	pub fn construct_greeter() -> PluginObject { Box::new( GreeterPlugin::default() )}

	pub fn set_greeter( instance: &mut dyn Any, value: &ServiceRef ) -> bool {
		let Some( plugin ) = instance.downcast_mut::<GreeterPlugin>() else { return false };
		if let Ok( greeter ) = value.clone().downcast::<ConsoleGreeter>() {
			plugin.greeter = Some( greeter );
			return true;
		}
		if let Ok( bridge ) = value.clone().downcast::<GreeterBridge>() {
			plugin.greeter = Some( bridge );
			return true;
		}
		false
	}

	pub fn set_release_counter( instance: &mut dyn Any, value: &ServiceRef ) -> bool {
		let Some( plugin ) = instance.downcast_mut::<GreeterPlugin>() else { return false };
		match value.clone().downcast::<AtomicUsize>() {
			Ok( counter ) => { plugin.releases = Some( counter ); true },
			Err( _ ) => false,
		}
	}

	pub fn mark_activated( instance: &mut dyn Any ) {
		if let Some( plugin ) = instance.downcast_mut::<GreeterPlugin>() {
			plugin.activated = true;
		}
	}

	pub fn release_greeter( instance: &mut dyn Any ) -> Result<(), String> {
		if let Some( plugin ) = instance.downcast_mut::<GreeterPlugin>() {
			if let Some( counter ) = &plugin.releases {
				counter.fetch_add( 1, Ordering::SeqCst );
			}
		}
		Ok(())
	}

	pub type ReleaseLog = Arc<Mutex<Vec<String>>> ;

	fn record( log: &Option<ReleaseLog>, name: &str ) {
		if let Some( log ) = log {
			log.lock().unwrap().push( name.to_string() );
		}
	}

	fn set_log<P: 'static>(
		instance: &mut dyn Any,
		value: &ServiceRef,
		log_of: fn( &mut P ) -> &mut Option<ReleaseLog>,
	) -> bool {
		let Some( plugin ) = instance.downcast_mut::<P>() else { return false };
		match value.clone().downcast::<Mutex<Vec<String>>>() {
			Ok( log ) => { *log_of( plugin ) = Some( log ); true },
			Err( _ ) => false,
		}
	}

	#[derive( Default )]
	pub struct AlphaPlugin { pub log: Option<ReleaseLog> }

	pub fn construct_alpha() -> PluginObject { Box::new( AlphaPlugin::default() )}

	pub fn set_alpha_log( instance: &mut dyn Any, value: &ServiceRef ) -> bool {
		set_log::<AlphaPlugin>( instance, value, | plugin | &mut plugin.log )
	}

	pub fn release_alpha( instance: &mut dyn Any ) -> Result<(), String> {
		if let Some( plugin ) = instance.downcast_mut::<AlphaPlugin>() {
			record( &plugin.log, "alpha" );
		}
		Ok(())
	}

	#[derive( Default )]
	pub struct BetaPlugin { pub log: Option<ReleaseLog> }

	pub fn construct_beta() -> PluginObject { Box::new( BetaPlugin::default() )}

	pub fn set_beta_log( instance: &mut dyn Any, value: &ServiceRef ) -> bool {
		set_log::<BetaPlugin>( instance, value, | plugin | &mut plugin.log )
	}

	pub fn release_beta( instance: &mut dyn Any ) -> Result<(), String> {
		if let Some( plugin ) = instance.downcast_mut::<BetaPlugin>() {
			record( &plugin.log, "beta" );
		}
		Ok(())
	}

	#[derive( Default )]
	pub struct FaultyPlugin { pub log: Option<ReleaseLog> }

	pub fn construct_faulty() -> PluginObject { Box::new( FaultyPlugin::default() )}

	pub fn set_faulty_log( instance: &mut dyn Any, value: &ServiceRef ) -> bool {
		set_log::<FaultyPlugin>( instance, value, | plugin | &mut plugin.log )
	}

	pub fn release_faulty( instance: &mut dyn Any ) -> Result<(), String> {
		if let Some( plugin ) = instance.downcast_mut::<FaultyPlugin>() {
			record( &plugin.log, "faulty" );
		}
		Err( "faulty refused to release".to_string() )
	}

	// Bootstrap and factories.

	pub struct TestBootstrap ;

	pub fn construct_bootstrap() -> PluginObject { Box::new( TestBootstrap )}

	pub fn bootstrap_adds_greeter( _bootstrap: &dyn Any, mut shared: Vec<ServiceEntry> ) -> Vec<ServiceEntry> {
		shared.push( greeter_entry( "bootstrap" ));
		shared
	}

	pub fn greeter_factory( registry: &ServiceRegistry ) -> Result<PluginObject, String> {
		let service = registry.resolve_host( &greet_key() )
			.ok_or_else(|| "no greeter registered".to_string() )?;
		let greeter = service.downcast::<ConsoleGreeter>()
			.map_err(| _ | "unexpected greeter type".to_string() )?;
		Ok( Box::new( GreeterPlugin { greeter: Some( greeter ), ..GreeterPlugin::default() }))
	}

	pub fn failing_factory( _registry: &ServiceRegistry ) -> Result<PluginObject, String> {
		Err( "factory exploded".to_string() )
	}

	// Service entries and the shared-services seam.

	pub fn greet_key() -> ServiceKey { ServiceKey::of::<dyn Greet>() }

	pub fn log_key() -> ServiceKey { ServiceKey::of::<Mutex<Vec<String>>>() }

	pub fn counter_key() -> ServiceKey { ServiceKey::of::<AtomicUsize>() }

	pub fn greeter_entry( label: &'static str ) -> ServiceEntry {
		ServiceEntry::with_key( greet_key(), Arc::new( ConsoleGreeter { label }))
	}

	pub fn remote_greeter_entry( label: &'static str ) -> ServiceEntry {
		ServiceEntry::with_key( greet_key(), Arc::new( RemoteGreeter { label }))
	}

	pub fn counter_entry( counter: &Arc<AtomicUsize> ) -> ServiceEntry {
		ServiceEntry::new::<AtomicUsize>( counter.clone() )
	}

	pub fn log_entry( log: &ReleaseLog ) -> ServiceEntry {
		ServiceEntry::new::<Mutex<Vec<String>>>( log.clone() )
	}

	pub struct TestServices {
		host: Vec<ServiceEntry>,
		shared: Vec<ServiceEntry>,
	}

	impl TestServices {
		pub fn new( host: Vec<ServiceEntry>, shared: Vec<ServiceEntry> ) -> Arc<Self> {
			Arc::new( Self { host, shared })
		}

		pub fn none() -> Arc<Self> {
			Self::new( Vec::new(), Vec::new() )
		}

		pub fn host_only( entries: Vec<ServiceEntry> ) -> Arc<Self> {
			Self::new( entries, Vec::new() )
		}
	}

	impl SharedServicesProvider for TestServices {
		fn host_services( &self ) -> Vec<ServiceEntry> { self.host.clone() }
		fn shared_services( &self ) -> Vec<ServiceEntry> { self.shared.clone() }
	}

	// The declared shape of the test module.

	pub fn module_table( _descriptor: &ModuleDescriptor ) -> RegistrationTable {
		RegistrationTable::new()
			.with_plugin( "test.Greeter", PluginRegistration::new( "GreeterPlugin" )
				.with_constructor( ConstructorSpec::public_argumentless( construct_greeter ))
				.with_slot( "greeter", set_greeter )
				.with_slot( "releases", set_release_counter )
				.with_hook( "on_activated", mark_activated )
				.with_release( release_greeter ))
			.with_plugin( "test.Hidden", PluginRegistration::new( "HiddenPlugin" )
				.with_constructor( ConstructorSpec::new(
					Visibility::Module,
					ConstructorKind::Argumentless( construct_greeter ),
				)))
			.with_plugin( "test.Overloaded", PluginRegistration::new( "OverloadedPlugin" )
				.with_constructor( ConstructorSpec::public_argumentless( construct_greeter ))
				.with_constructor( ConstructorSpec::public_with_parameters( 2 )))
			.with_plugin( "test.Parameterised", PluginRegistration::new( "ParameterisedPlugin" )
				.with_constructor( ConstructorSpec::public_with_parameters( 1 )))
			.with_plugin( "test.Alpha", PluginRegistration::new( "AlphaPlugin" )
				.with_constructor( ConstructorSpec::public_argumentless( construct_alpha ))
				.with_slot( "log", set_alpha_log )
				.with_release( release_alpha ))
			.with_plugin( "test.Beta", PluginRegistration::new( "BetaPlugin" )
				.with_constructor( ConstructorSpec::public_argumentless( construct_beta ))
				.with_slot( "log", set_beta_log )
				.with_release( release_beta ))
			.with_plugin( "test.Faulty", PluginRegistration::new( "FaultyPlugin" )
				.with_constructor( ConstructorSpec::public_argumentless( construct_faulty ))
				.with_slot( "log", set_faulty_log )
				.with_release( release_faulty ))
			.with_bridge( "test.GreeterBridge", BridgeRegistration::new( "GreeterBridge" )
				.with_constructor( BridgeConstructorSpec::public_unary( GreeterBridge::adapt )))
			.with_bridge( "test.BadBridge", BridgeRegistration::new( "BadBridge" )
				.with_constructor( BridgeConstructorSpec::new(
					Visibility::Public,
					BridgeConstructorKind::Other { arity: 2 },
				)))
			.with_bridge( "test.OpaqueBridge", BridgeRegistration::new( "OpaqueBridge" )
				.with_constructor( BridgeConstructorSpec::public_unary( opaque_adapt )))
			.with_bootstrap( "test.Bootstrap", BootstrapRegistration::new( "TestBootstrap", bootstrap_adds_greeter )
				.with_constructor( ConstructorSpec::public_argumentless( construct_bootstrap )))
	}

	// Modules on disk.

	pub fn host() -> HostFramework {
		HostFramework::new( "test-host", "1.0.0" )
	}

	pub fn options() -> LoadOptions {
		LoadOptions::new( host() ).with_strategy( LoadStrategy::FromBytes( PAYLOAD.to_vec() ))
	}

	pub fn descriptor( dir: &Path, name: &str ) -> ModuleDescriptor {
		ModuleDescriptor::new( name, dir, "linux-x64" )
	}

	pub fn write_manifest( dir: &Path, name: &str ) {
		let json = serde_json::json!({ "module": name, "version": "1.0.0" }).to_string();
		write_manifest_json( dir, name, &json );
	}

	pub fn write_manifest_json( dir: &Path, name: &str, json: &str ) {
		std::fs::write( dir.join( format!( "{name}.deps.json" )), json )
			.expect( "manifest written" );
	}

	pub fn write_payload( dir: &Path, name: &str ) {
		std::fs::write( dir.join( format!( "{name}.module" )), PAYLOAD )
			.expect( "payload written" );
	}

	pub fn write_library( dir: &Path, relative: &str ) {
		let path = dir.join( relative );
		if let Some( parent ) = path.parent() {
			std::fs::create_dir_all( parent ).expect( "library directory created" );
		}
		std::fs::write( &path, b"library" ).expect( "library written" );
	}

	pub fn parse_manifest( json: &str ) -> DependencyManifest {
		serde_json::from_str( json ).expect( "manifest parsed" )
	}

	pub fn load_module( dir: &Path, name: &str ) -> ( LoadContext, ModuleHandle ) {
		write_manifest( dir, name );
		let mut context = LoadContext::new();
		let handle = context.load( &descriptor( dir, name ), &options(), &module_table )
			.expect( "module loaded" );
		( context, handle )
	}

}
