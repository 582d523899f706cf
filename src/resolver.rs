//! Dependency resolution with host/plugin sharing rules.
//!
//! Given a module descriptor and its parsed manifest, resolution produces the
//! ordered set of library locations required to satisfy loading. Libraries are
//! resolved in manifest declaration order. A library carried by a type on the
//! host's shared list is never loaded privately; the host's existing copy is
//! substituted so one type keeps one identity across the isolation boundary.
//! Symmetric handling applies to types a module intentionally exposes to the
//! host. Resolution never inspects the host's own dependency closure beyond
//! the explicit shared-type lists.

use std::path::PathBuf ;

use crate::descriptor::{ LoadOptions, ModuleDescriptor, SharedType };
use crate::error::DependencyResolutionError ;
use crate::manifest::{ DependencyManifest, LibraryDependency };



/// One entry of the ordered library set satisfying a module load.
#[derive( Debug, Clone, PartialEq, Eq )]
pub enum ResolvedLibrary {
	/// A private copy loaded into the module's isolation boundary.
	Private {
		/// Library name as declared by the manifest
		library: String,
		/// Absolute location of the private copy
		location: PathBuf,
	},
	/// Substituted by the host's existing copy; nothing is loaded privately.
	HostShared {
		/// Library name as declared by the manifest
		library: String,
		/// The shared type that carried the substitution
		type_name: String,
	},
	/// Exposed by the module to the host by identity.
	PluginShared {
		/// Library name as declared by the manifest
		library: String,
		/// The shared type that carried the substitution
		type_name: String,
	},
}

impl ResolvedLibrary {
	/// Library name as declared by the manifest.
	pub fn library( &self ) -> &str {
		match self {
			Self::Private { library, .. }
			| Self::HostShared { library, .. }
			| Self::PluginShared { library, .. } => library,
		}
	}
}

/// Computes the ordered library set for `descriptor` from its `manifest`.
///
/// # Errors
/// Returns [`DependencyResolutionError::RuntimeMismatch`] when the manifest
/// does not support the descriptor's target runtime (unless the options ignore
/// platform mismatches), and [`DependencyResolutionError::LibraryNotFound`],
/// naming the library and the module, when a required library is found in no
/// probing path and carried by no shared type.
pub fn resolve_dependencies(
	descriptor: &ModuleDescriptor,
	manifest: &DependencyManifest,
	options: &LoadOptions,
) -> Result<Vec<ResolvedLibrary>, DependencyResolutionError> {

	if !options.ignore_platform_mismatch() && !manifest.supports_runtime( descriptor.runtime() ) {
		return Err( DependencyResolutionError::RuntimeMismatch {
			module: descriptor.name().to_string(),
			runtime: descriptor.runtime().to_string(),
		});
	}

	manifest.libraries().iter()
		.map(| library | resolve_library( descriptor, library, options ))
		.collect()

}

fn resolve_library(
	descriptor: &ModuleDescriptor,
	library: &LibraryDependency,
	options: &LoadOptions,
) -> Result<ResolvedLibrary, DependencyResolutionError> {

	if let Some( shared ) = carrying_shared_type( library, options.host_shared(), options ) {
		tracing::debug!(
			target: "plugin_isolate::resolver",
			library = library.name(),
			shared_type = shared.type_name(),
			"substituting host copy for shared type"
		);
		return Ok( ResolvedLibrary::HostShared {
			library: library.name().to_string(),
			type_name: shared.type_name().to_string(),
		});
	}

	if let Some( shared ) = carrying_shared_type( library, options.plugin_shared(), options ) {
		return Ok( ResolvedLibrary::PluginShared {
			library: library.name().to_string(),
			type_name: shared.type_name().to_string(),
		});
	}

	options.probing_paths().iter()
		.map(| probing_path | probing_path.join( library.relative_path() ))
		.find(| candidate | candidate.exists() )
		.map(| location | ResolvedLibrary::Private { library: library.name().to_string(), location })
		.ok_or_else(|| DependencyResolutionError::LibraryNotFound {
			library: library.name().to_string(),
			module: descriptor.name().to_string(),
		})

}

fn carrying_shared_type<'a>(
	library: &LibraryDependency,
	shared_types: &'a [SharedType],
	options: &LoadOptions,
) -> Option<&'a SharedType> {
	shared_types.iter().find(| shared | match options.share_by_assignability() {
		false => library.name() == shared.library(),
		true => library.name().starts_with( shared.library() ),
	})
}
