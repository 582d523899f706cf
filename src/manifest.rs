//! Dependency manifest parsing.
//!
//! Every module ships a manifest at `<location>/<name>.deps.json` describing the
//! libraries it requires (name, version, relative path) and the runtimes it
//! supports. The manifest is parsed once per load attempt and never mutated;
//! its exact schema is an external collaborator's concern and everything beyond
//! the fields below is ignored.

use std::path::{ Path, PathBuf };
use pipe_trait::Pipe ;
use serde::{ Deserialize, Serialize };

use crate::descriptor::{ ModuleDescriptor, RuntimeQualifier };
use crate::error::ManifestError ;



/// A module's dependency manifest, keyed by module name and version.
#[derive( Debug, Clone, Serialize, Deserialize )]
pub struct DependencyManifest {
	/// Name of the module the manifest belongs to
	module: String,
	/// Version of the module build the manifest describes
	version: String,
	/// Runtimes the module supports; empty means any runtime
	#[serde( default )]
	runtimes: Vec<RuntimeQualifier>,
	/// Libraries required to satisfy loading, in declaration order
	#[serde( default )]
	libraries: Vec<LibraryDependency>,
}

impl DependencyManifest {
	/// Reads and parses the manifest at the descriptor's manifest path.
	///
	/// # Errors
	/// Returns [`ManifestError::Missing`] when no manifest file exists,
	/// [`ManifestError::Io`] when it cannot be read, and
	/// [`ManifestError::Unparsable`] when it is not a valid manifest document.
	pub fn read( descriptor: &ModuleDescriptor ) -> Result<Self, ManifestError> {
		let path = descriptor.manifest_path();
		if !path.exists() {
			return Err( ManifestError::Missing { path });
		}
		std::fs::read_to_string( &path )
			.map_err(| source | ManifestError::Io { path: path.clone(), source })?
			.pipe_as_ref( Self::parse( &path ))
	}

	/// Asynchronous variant of [`read`]( Self::read ), suspending on storage I/O.
	///
	/// # Errors
	/// Same failure modes as [`read`]( Self::read ).
	pub async fn read_async( descriptor: &ModuleDescriptor ) -> Result<Self, ManifestError> {
		let path = descriptor.manifest_path();
		if !path.exists() {
			return Err( ManifestError::Missing { path });
		}
		tokio::fs::read_to_string( &path ).await
			.map_err(| source | ManifestError::Io { path: path.clone(), source })?
			.pipe_as_ref( Self::parse( &path ))
	}

	fn parse( path: &Path ) -> impl FnOnce( &str ) -> Result<Self, ManifestError> + '_ {
		move | text | serde_json::from_str( text )
			.map_err(| source | ManifestError::Unparsable { path: path.to_path_buf(), source })
	}

	/// Name of the module the manifest belongs to.
	#[inline] pub fn module( &self ) -> &str { &self.module }

	/// Version of the module build the manifest describes.
	#[inline] pub fn version( &self ) -> &str { &self.version }

	/// Runtimes the module supports.
	#[inline] pub fn runtimes( &self ) -> &[RuntimeQualifier] { &self.runtimes }

	/// Libraries required to satisfy loading, in declaration order.
	#[inline] pub fn libraries( &self ) -> &[LibraryDependency] { &self.libraries }

	/// Whether the manifest supports `runtime`.
	///
	/// A manifest declaring no runtimes supports every runtime.
	pub fn supports_runtime( &self, runtime: &RuntimeQualifier ) -> bool {
		self.runtimes.is_empty() || self.runtimes.contains( runtime )
	}
}

/// One required library declared by a manifest.
#[derive( Debug, Clone, Serialize, Deserialize )]
pub struct LibraryDependency {
	/// Library name
	name: String,
	/// Library version
	version: String,
	/// Path of the library file relative to a probing path
	relative_path: PathBuf,
}

impl LibraryDependency {
	/// Creates a library requirement.
	#[inline]
	pub fn new(
		name: impl Into<String>,
		version: impl Into<String>,
		relative_path: impl Into<PathBuf>,
	) -> Self {
		Self { name: name.into(), version: version.into(), relative_path: relative_path.into() }
	}

	/// Library name.
	#[inline] pub fn name( &self ) -> &str { &self.name }

	/// Library version.
	#[inline] pub fn version( &self ) -> &str { &self.version }

	/// Path of the library file relative to a probing path.
	#[inline] pub fn relative_path( &self ) -> &Path { &self.relative_path }
}
