//! Module descriptors and load options.
//!
//! A [`ModuleDescriptor`] identifies one loadable module: its name, its
//! file-system location, and the runtime it targets. [`LoadOptions`] is the
//! explicit, immutable configuration object a caller hands to a load: probing
//! paths, shared-type lists, policy flags, and the load strategy. There is no
//! ambient configuration; everything the loader consults travels through these
//! two values.

use std::path::{ Path, PathBuf };
use serde::{ Deserialize, Serialize };



/// Identifies a dynamically loadable module.
///
/// Immutable once passed to a load. Repeated loads of the same descriptor are
/// independent: each produces a fresh context and generation id.
#[derive( Debug, Clone, PartialEq, Eq )]
pub struct ModuleDescriptor {
	/// Module name; also the stem of its manifest and payload file names
	name: String,
	/// Directory containing the module payload and its manifest
	location: PathBuf,
	/// Runtime the module build targets
	runtime: RuntimeQualifier,
}

impl ModuleDescriptor {
	/// Creates a descriptor for a module rooted at `location`.
	#[inline]
	pub fn new(
		name: impl Into<String>,
		location: impl Into<PathBuf>,
		runtime: impl Into<RuntimeQualifier>,
	) -> Self {
		Self { name: name.into(), location: location.into(), runtime: runtime.into() }
	}

	/// Module name.
	#[inline] pub fn name( &self ) -> &str { &self.name }

	/// Directory containing the module payload and its manifest.
	#[inline] pub fn location( &self ) -> &Path { &self.location }

	/// Runtime the module build targets.
	#[inline] pub fn runtime( &self ) -> &RuntimeQualifier { &self.runtime }

	/// Expected location of the module's dependency manifest, `<name>.deps.json`.
	#[inline]
	pub fn manifest_path( &self ) -> PathBuf {
		self.location.join( format!( "{}.deps.json", self.name ))
	}

	/// Expected location of the module's payload, `<name>.module`.
	#[inline]
	pub fn payload_path( &self ) -> PathBuf {
		self.location.join( format!( "{}.module", self.name ))
	}
}

/// A target runtime qualifier (e.g., `linux-x64`).
///
/// Compared verbatim between a descriptor and a manifest's supported runtimes.
#[derive( Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize )]
#[serde( transparent )]
pub struct RuntimeQualifier( String );

impl RuntimeQualifier {
	/// The qualifier as a string slice.
	#[inline] pub fn as_str( &self ) -> &str { &self.0 }
}

impl From<&str> for RuntimeQualifier {
	fn from( qualifier: &str ) -> Self { Self( qualifier.to_string() )}
}

impl From<String> for RuntimeQualifier {
	fn from( qualifier: String ) -> Self { Self( qualifier )}
}

impl std::fmt::Display for RuntimeQualifier {
	fn fmt( &self, f: &mut std::fmt::Formatter ) -> std::fmt::Result { write!( f, "{}", self.0 )}
}

/// Describes the host framework a module is loaded into.
///
/// Collaborator input; the core only carries it for diagnostics and never
/// derives policy from it.
#[derive( Debug, Clone, PartialEq, Eq )]
pub struct HostFramework {
	/// Host framework name
	name: String,
	/// Host framework version
	version: String,
}

impl HostFramework {
	/// Creates a host framework descriptor.
	#[inline]
	pub fn new( name: impl Into<String>, version: impl Into<String> ) -> Self {
		Self { name: name.into(), version: version.into() }
	}

	/// Host framework name.
	#[inline] pub fn name( &self ) -> &str { &self.name }

	/// Host framework version.
	#[inline] pub fn version( &self ) -> &str { &self.version }
}

/// A type intentionally shared by identity across the isolation boundary.
///
/// A library whose name matches a shared type's carrying library is not loaded
/// privately; the existing copy on the sharing side is substituted instead.
/// This prevents two independent identities for what should be one type.
#[derive( Debug, Clone, PartialEq, Eq )]
pub struct SharedType {
	/// Name of the shared type
	type_name: String,
	/// Name of the library that exports the shared type
	library: String,
}

impl SharedType {
	/// Declares `type_name`, exported by `library`, as shared by identity.
	#[inline]
	pub fn new( type_name: impl Into<String>, library: impl Into<String> ) -> Self {
		Self { type_name: type_name.into(), library: library.into() }
	}

	/// Name of the shared type.
	#[inline] pub fn type_name( &self ) -> &str { &self.type_name }

	/// Name of the library that exports the shared type.
	#[inline] pub fn library( &self ) -> &str { &self.library }
}

/// How the module payload is obtained.
#[derive( Debug, Clone, PartialEq, Eq, Default )]
pub enum LoadStrategy {
	/// Read the payload from the descriptor's [`payload_path`]( ModuleDescriptor::payload_path ).
	#[default] FromPath,
	/// Use an in-memory payload; no payload file is touched.
	FromBytes( Vec<u8> ),
}

/// Explicit, immutable configuration for one load.
///
/// Built once by the caller and passed by reference; the loader never mutates
/// it and never consults configuration from anywhere else.
#[derive( Debug, Clone )]
pub struct LoadOptions {
	/// Host framework descriptor
	host_framework: HostFramework,
	/// Ordered directories probed for private library copies
	probing_paths: Vec<PathBuf>,
	/// Types the host shares by identity with loaded modules
	host_shared: Vec<SharedType>,
	/// Types a module intentionally exposes to the host by identity
	plugin_shared: Vec<SharedType>,
	/// Treat a shared type as carrying any library its name prefixes
	share_by_assignability: bool,
	/// Skip the manifest's supported-runtime check
	ignore_platform_mismatch: bool,
	/// How the module payload is obtained
	strategy: LoadStrategy,
}

impl LoadOptions {
	/// Creates options with empty probing paths and shared-type lists, strict
	/// platform matching, and the [`FromPath`]( LoadStrategy::FromPath ) strategy.
	pub fn new( host_framework: HostFramework ) -> Self {
		Self {
			host_framework,
			probing_paths: Vec::with_capacity( 0 ),
			host_shared: Vec::with_capacity( 0 ),
			plugin_shared: Vec::with_capacity( 0 ),
			share_by_assignability: false,
			ignore_platform_mismatch: false,
			strategy: LoadStrategy::FromPath,
		}
	}

	/// Sets the ordered directories probed for private library copies.
	pub fn with_probing_paths( mut self, paths: impl IntoIterator<Item = PathBuf> ) -> Self {
		self.probing_paths = paths.into_iter().collect();
		self
	}

	/// Sets the types the host shares by identity with loaded modules.
	pub fn with_host_shared( mut self, shared: impl IntoIterator<Item = SharedType> ) -> Self {
		self.host_shared = shared.into_iter().collect();
		self
	}

	/// Sets the types modules intentionally expose to the host by identity.
	pub fn with_plugin_shared( mut self, shared: impl IntoIterator<Item = SharedType> ) -> Self {
		self.plugin_shared = shared.into_iter().collect();
		self
	}

	/// When set, a shared type also carries any library its library name
	/// prefixes (e.g., versioned split libraries of one distribution).
	pub fn with_share_by_assignability( mut self, share: bool ) -> Self {
		self.share_by_assignability = share;
		self
	}

	/// When set, the manifest's supported-runtime check is skipped.
	pub fn with_ignore_platform_mismatch( mut self, ignore: bool ) -> Self {
		self.ignore_platform_mismatch = ignore;
		self
	}

	/// Sets how the module payload is obtained.
	pub fn with_strategy( mut self, strategy: LoadStrategy ) -> Self {
		self.strategy = strategy;
		self
	}

	/// Host framework descriptor.
	#[inline] pub fn host_framework( &self ) -> &HostFramework { &self.host_framework }

	/// Ordered directories probed for private library copies.
	#[inline] pub fn probing_paths( &self ) -> &[PathBuf] { &self.probing_paths }

	/// Types the host shares by identity with loaded modules.
	#[inline] pub fn host_shared( &self ) -> &[SharedType] { &self.host_shared }

	/// Types modules intentionally expose to the host by identity.
	#[inline] pub fn plugin_shared( &self ) -> &[SharedType] { &self.plugin_shared }

	/// Whether a shared type carries any library its library name prefixes.
	#[inline] pub fn share_by_assignability( &self ) -> bool { self.share_by_assignability }

	/// Whether the manifest's supported-runtime check is skipped.
	#[inline] pub fn ignore_platform_mismatch( &self ) -> bool { self.ignore_platform_mismatch }

	/// How the module payload is obtained.
	#[inline] pub fn strategy( &self ) -> &LoadStrategy { &self.strategy }
}
