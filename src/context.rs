//! Isolated load contexts with verifiable reclamation.
//!
//! A [`LoadContext`] owns the lifecycle of one loaded module. Loading resolves
//! the module's private dependency closure, reads the payload, and populates
//! the registration table; the context keeps the only long-lived strong
//! reference plus a weak observation handle. Unloading drops the strong
//! reference and verification polls the observation handle's strong count, an
//! explicit reference count checked deterministically, until the module is
//! provably reclaimed or the retry budget runs out.
//!
//! Every load mints a fresh generation id from a process-wide monotonic
//! counter. Repeated loads of the same module path always create a new context
//! and generation; there is no caching or deduplication. A module that cannot
//! be reclaimed would leak memory indefinitely across repeated load/unload
//! cycles, so verification makes that failure observable instead of silent.

use std::sync::atomic::{ AtomicU64, Ordering };
use std::sync::{ Arc, Weak };
use std::time::Duration ;
use pipe_trait::Pipe ;

use crate::descriptor::{ LoadOptions, LoadStrategy, ModuleDescriptor };
use crate::error::{ DependencyResolutionError, LoadError, UnloadTimeoutError };
use crate::manifest::DependencyManifest ;
use crate::registration::{ ModuleRegistrar, RegistrationTable };
use crate::resolver::{ resolve_dependencies, ResolvedLibrary };



static NEXT_GENERATION: AtomicU64 = AtomicU64::new( 0 );

/// Lifecycle state of a [`LoadContext`].
#[derive( Debug, Clone, Copy, PartialEq, Eq )]
pub enum ContextState {
	/// No module loaded; the initial state.
	Unloaded,
	/// A load is in progress.
	Loading,
	/// The module is loaded and usable.
	Loaded,
	/// Unload requested; reclamation not yet verified.
	UnloadRequested,
	/// Reclamation verified; the terminal state.
	UnloadedVerified,
}

impl std::fmt::Display for ContextState {
	fn fmt( &self, f: &mut std::fmt::Formatter ) -> std::fmt::Result { write!( f, "{:?}", self )}
}

impl Default for ContextState {
	fn default() -> Self { Self::Unloaded }
}

/// A loaded module: its payload, its private dependency closure, and its
/// registration table.
///
/// Exclusively owned by its load context until unload; callers observe it
/// through [`ModuleHandle`]s.
pub struct LoadedModule {
	descriptor: ModuleDescriptor,
	generation: u64,
	libraries: Vec<ResolvedLibrary>,
	payload: Vec<u8>,
	registrations: RegistrationTable,
}

impl LoadedModule {
	/// Descriptor the module was loaded from.
	#[inline] pub fn descriptor( &self ) -> &ModuleDescriptor { &self.descriptor }

	/// Generation id minted for this load.
	#[inline] pub fn generation( &self ) -> u64 { self.generation }

	/// Ordered library set resolved for this load.
	#[inline] pub fn libraries( &self ) -> &[ResolvedLibrary] { &self.libraries }

	/// Raw module payload bytes.
	#[inline] pub fn payload( &self ) -> &[u8] { &self.payload }

	/// Registration table populated at load time.
	#[inline] pub fn registrations( &self ) -> &RegistrationTable { &self.registrations }
}

impl std::fmt::Debug for LoadedModule {
	fn fmt( &self, f: &mut std::fmt::Formatter<'_> ) -> std::fmt::Result {
		f.debug_struct( "LoadedModule" )
			.field( "descriptor", &self.descriptor )
			.field( "generation", &self.generation )
			.field( "libraries", &self.libraries )
			.field( "payload", &format_args!( "{} bytes", self.payload.len() ))
			.finish_non_exhaustive()
	}
}

/// Caller-facing strong handle to a loaded module.
///
/// Cloning is cheap; every clone counts toward the module's reference count,
/// so a retained handle keeps unload verification from succeeding.
#[derive( Clone )]
pub struct ModuleHandle( Arc<LoadedModule> );

impl ModuleHandle {
	/// Descriptor the module was loaded from.
	#[inline] pub fn descriptor( &self ) -> &ModuleDescriptor { self.0.descriptor() }

	/// Generation id minted for this load.
	#[inline] pub fn generation( &self ) -> u64 { self.0.generation() }

	/// Ordered library set resolved for this load.
	#[inline] pub fn libraries( &self ) -> &[ResolvedLibrary] { self.0.libraries() }

	/// Raw module payload bytes.
	#[inline] pub fn payload( &self ) -> &[u8] { self.0.payload() }

	/// Registration table populated at load time.
	#[inline] pub fn registrations( &self ) -> &RegistrationTable { self.0.registrations() }
}

impl std::fmt::Debug for ModuleHandle {
	fn fmt( &self, f: &mut std::fmt::Formatter<'_> ) -> std::fmt::Result {
		f.debug_tuple( "ModuleHandle" ).field( &*self.0 ).finish()
	}
}

/// Isolation boundary and lifecycle owner for one loaded module.
///
/// Single-writer: every operation takes `&mut self`, so no two operations can
/// race on one context. Distinct contexts are fully independent, including two
/// concurrent loads of the same module path.
#[derive( Debug, Default )]
pub struct LoadContext {
	state: ContextState,
	strong: Option<Arc<LoadedModule>>,
	observation: Weak<LoadedModule>,
	generation: Option<u64>,
	module_name: Option<String>,
}

impl LoadContext {

	/// Creates a context in the [`Unloaded`]( ContextState::Unloaded ) state.
	pub fn new() -> Self { Self::default() }

	/// Current lifecycle state.
	#[inline] pub fn state( &self ) -> ContextState { self.state }

	/// Generation id of the module this context loaded, once loaded.
	#[inline] pub fn generation( &self ) -> Option<u64> { self.generation }

	/// A fresh strong handle to the loaded module, while one is loaded.
	pub fn module( &self ) -> Option<ModuleHandle> {
		self.strong.clone().map( ModuleHandle )
	}

	/// Loads the module described by `descriptor`.
	///
	/// Resolves dependencies, reads the payload per the options' strategy, and
	/// populates the registration table through `registrar`. On success the
	/// context transitions `Unloaded → Loading → Loaded` and returns a strong
	/// handle; on failure it returns to `Unloaded`.
	///
	/// # Errors
	/// Returns [`LoadError::InvalidState`] unless the context is `Unloaded`,
	/// [`LoadError::Resolution`] when the manifest or a required library is
	/// unusable, and [`LoadError::Payload`] when the payload cannot be read.
	pub fn load(
		&mut self,
		descriptor: &ModuleDescriptor,
		options: &LoadOptions,
		registrar: &dyn ModuleRegistrar,
	) -> Result<ModuleHandle, LoadError> {
		self.begin_load()?;
		let loaded = DependencyManifest::read( descriptor )
			.map_err(| source | manifest_failure( descriptor, source ))
			.map_err( LoadError::from )
			.and_then(| manifest | assemble( descriptor, &manifest, options, registrar, read_payload( descriptor, options )? ));
		self.finish_load( loaded )
	}

	/// Asynchronous variant of [`load`]( Self::load ), suspending on storage I/O.
	///
	/// # Errors
	/// Same failure modes as [`load`]( Self::load ).
	pub async fn load_async(
		&mut self,
		descriptor: &ModuleDescriptor,
		options: &LoadOptions,
		registrar: &dyn ModuleRegistrar,
	) -> Result<ModuleHandle, LoadError> {
		self.begin_load()?;
		let loaded = match DependencyManifest::read_async( descriptor ).await {
			Err( source ) => Err( manifest_failure( descriptor, source ).into() ),
			Ok( manifest ) => match read_payload_async( descriptor, options ).await {
				Err( err ) => Err( err ),
				Ok( payload ) => assemble( descriptor, &manifest, options, registrar, payload ),
			},
		};
		self.finish_load( loaded )
	}

	/// Requests unload: drops the context's strong references to the module
	/// and its private dependency closure. Reclamation is asynchronous and not
	/// guaranteed at the moment of the call; poll with
	/// [`verify_unloaded`]( Self::verify_unloaded ).
	///
	/// # Errors
	/// Returns [`LoadError::InvalidState`] unless the context is `Loaded`.
	pub fn unload( &mut self ) -> Result<(), LoadError> {
		self.expect_state( ContextState::Loaded, "Loaded" )?;
		self.strong = None;
		self.state = ContextState::UnloadRequested;
		tracing::debug!(
			target: "plugin_isolate::context",
			module = self.module_name.as_deref().unwrap_or( "?" ),
			generation = self.generation,
			"unload requested"
		);
		Ok(())
	}

	/// Polls the observation handle until the module is provably reclaimed.
	///
	/// Succeeds once the module's reference count reaches zero, transitioning
	/// to the terminal `UnloadedVerified` state. Sleeps `delay` between
	/// attempts. Calling on an already verified context is a no-op.
	///
	/// # Errors
	/// Returns [`LoadError::UnloadTimeout`] after `max_attempts` failed polls
	/// (the typical root cause is an externally retained strong reference) and
	/// [`LoadError::InvalidState`] unless unload was requested first.
	pub fn verify_unloaded( &mut self, max_attempts: u32, delay: Duration ) -> Result<(), LoadError> {
		if self.state == ContextState::UnloadedVerified { return Ok(()) }
		for attempt in self.verification_attempts( max_attempts )? {
			if self.try_verify( attempt, max_attempts ) { return Ok(()) }
			if attempt != max_attempts { std::thread::sleep( delay ) }
		}
		Err( self.verification_timeout( max_attempts ).into() )
	}

	/// Asynchronous variant of [`verify_unloaded`]( Self::verify_unloaded ).
	///
	/// # Errors
	/// Same failure modes as [`verify_unloaded`]( Self::verify_unloaded ).
	pub async fn verify_unloaded_async( &mut self, max_attempts: u32, delay: Duration ) -> Result<(), LoadError> {
		if self.state == ContextState::UnloadedVerified { return Ok(()) }
		for attempt in self.verification_attempts( max_attempts )? {
			if self.try_verify( attempt, max_attempts ) { return Ok(()) }
			if attempt != max_attempts { tokio::time::sleep( delay ).await }
		}
		Err( self.verification_timeout( max_attempts ).into() )
	}

	fn begin_load( &mut self ) -> Result<(), LoadError> {
		self.expect_state( ContextState::Unloaded, "Unloaded" )?;
		self.state = ContextState::Loading;
		Ok(())
	}

	fn finish_load( &mut self, loaded: Result<LoadedModule, LoadError> ) -> Result<ModuleHandle, LoadError> {
		match loaded {
			Err( err ) => {
				self.state = ContextState::Unloaded;
				Err( err )
			},
			Ok( module ) => {
				let module = module.pipe( Arc::new );
				tracing::debug!(
					target: "plugin_isolate::context",
					module = module.descriptor().name(),
					generation = module.generation(),
					libraries = module.libraries().len(),
					"module loaded"
				);
				self.observation = Arc::downgrade( &module );
				self.generation = Some( module.generation() );
				self.module_name = Some( module.descriptor().name().to_string() );
				self.strong = Some( module.clone() );
				self.state = ContextState::Loaded;
				Ok( ModuleHandle( module ))
			},
		}
	}

	fn expect_state( &self, expected: ContextState, name: &'static str ) -> Result<(), LoadError> {
		match self.state == expected {
			true => Ok(()),
			false => Err( LoadError::InvalidState { expected: name, actual: self.state }),
		}
	}

	fn verification_attempts( &self, max_attempts: u32 ) -> Result<std::ops::RangeInclusive<u32>, LoadError> {
		match self.state {
			ContextState::UnloadRequested => Ok( 1..=max_attempts ),
			actual => Err( LoadError::InvalidState { expected: "UnloadRequested", actual }),
		}
	}

	fn try_verify( &mut self, attempt: u32, max_attempts: u32 ) -> bool {
		match self.observation.strong_count() == 0 {
			false => {
				tracing::trace!(
					target: "plugin_isolate::context",
					module = self.module_name.as_deref().unwrap_or( "?" ),
					attempt,
					max_attempts,
					"module still reachable"
				);
				false
			},
			true => {
				self.state = ContextState::UnloadedVerified;
				tracing::debug!(
					target: "plugin_isolate::context",
					module = self.module_name.as_deref().unwrap_or( "?" ),
					generation = self.generation,
					"unload verified"
				);
				true
			},
		}
	}

	fn verification_timeout( &self, attempts: u32 ) -> UnloadTimeoutError {
		UnloadTimeoutError {
			module: self.module_name.clone().unwrap_or_else(|| "?".to_string() ),
			attempts,
		}
	}

}

fn manifest_failure(
	descriptor: &ModuleDescriptor,
	source: crate::error::ManifestError,
) -> DependencyResolutionError {
	DependencyResolutionError::Manifest { module: descriptor.name().to_string(), source }
}

fn assemble(
	descriptor: &ModuleDescriptor,
	manifest: &DependencyManifest,
	options: &LoadOptions,
	registrar: &dyn ModuleRegistrar,
	payload: Vec<u8>,
) -> Result<LoadedModule, LoadError> {
	let libraries = resolve_dependencies( descriptor, manifest, options )?;
	Ok( LoadedModule {
		descriptor: descriptor.clone(),
		generation: NEXT_GENERATION.fetch_add( 1, Ordering::Relaxed ),
		libraries,
		payload,
		registrations: registrar.register( descriptor ),
	})
}

fn read_payload( descriptor: &ModuleDescriptor, options: &LoadOptions ) -> Result<Vec<u8>, LoadError> {
	match options.strategy() {
		LoadStrategy::FromBytes( payload ) => Ok( payload.clone() ),
		LoadStrategy::FromPath => {
			let path = descriptor.payload_path();
			std::fs::read( &path ).map_err(| source | LoadError::Payload { path, source })
		},
	}
}

async fn read_payload_async( descriptor: &ModuleDescriptor, options: &LoadOptions ) -> Result<Vec<u8>, LoadError> {
	match options.strategy() {
		LoadStrategy::FromBytes( payload ) => Ok( payload.clone() ),
		LoadStrategy::FromPath => {
			let path = descriptor.payload_path();
			tokio::fs::read( &path ).await.map_err(| source | LoadError::Payload { path, source })
		},
	}
}
