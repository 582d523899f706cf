//! Error taxonomy for loading, resolution, activation, and unload verification.
//!
//! Manifest and resolution errors abort a load attempt immediately; retry policy
//! is a caller concern. Activation errors abort only the failing activation call,
//! and objects tracked by earlier successful calls stay tracked until teardown.
//! Teardown itself never propagates errors. An unload timeout is reported to the
//! caller, never fatal to the process.

use std::path::PathBuf ;
use thiserror::Error ;

use crate::activation::ServiceOrigin ;
use crate::context::ContextState ;



/// Errors reading or parsing a module's dependency manifest.
#[derive( Error, Debug )]
pub enum ManifestError {
	/// No manifest file exists at the module's expected manifest path.
	#[error( "Manifest Missing: {}", .path.display() )] Missing { path: PathBuf },
	/// The manifest file exists but is not a valid dependency manifest document.
	#[error( "Manifest Unparsable: {}: {source}", .path.display() )] Unparsable {
		path: PathBuf,
		#[source] source: serde_json::Error,
	},
	/// The manifest file could not be read from storage.
	#[error( "Manifest Unreadable: {}: {source}", .path.display() )] Io {
		path: PathBuf,
		#[source] source: std::io::Error,
	},
}

/// Errors computing the ordered library set for a module.
#[derive( Error, Debug )]
pub enum DependencyResolutionError {
	/// The module's manifest was missing or unparsable.
	#[error( "Manifest Failure for module {module}: {source}" )] Manifest {
		module: String,
		#[source] source: ManifestError,
	},
	/// A required library was found in no probing path and no shared-type list.
	#[error( "Library Not Found: {library} required by module {module}" )] LibraryNotFound {
		library: String,
		module: String,
	},
	/// The module's manifest does not support the descriptor's target runtime.
	#[error( "Runtime Mismatch: module {module} does not support runtime {runtime}" )] RuntimeMismatch {
		module: String,
		runtime: String,
	},
}

/// Errors surfaced by [`LoadContext`]( crate::LoadContext ) operations.
#[derive( Error, Debug )]
pub enum LoadError {
	/// Dependency resolution failed; the load attempt is abandoned.
	#[error( "Resolution Failure: {0}" )] Resolution( #[from] DependencyResolutionError ),
	/// The module payload could not be read from its on-disk location.
	#[error( "Module Payload Unreadable: {}: {source}", .path.display() )] Payload {
		path: PathBuf,
		#[source] source: std::io::Error,
	},
	/// An operation was invoked in a state that does not permit it.
	#[error( "Invalid Context State: expected {expected}, found {actual}" )] InvalidState {
		expected: &'static str,
		actual: ContextState,
	},
	/// Unload verification exhausted its retry budget.
	#[error( "Unload Timeout: {0}" )] UnloadTimeout( #[from] UnloadTimeoutError ),
}

/// The module was still reachable after every verification attempt.
///
/// The typical root cause is an externally retained strong reference to the
/// module, a plugin instance, or a service that was never released.
#[derive( Error, Debug )]
#[error( "module {module} still reachable after {attempts} attempts" )]
pub struct UnloadTimeoutError {
	/// Name of the module that could not be verified as reclaimed.
	pub module: String,
	/// Number of polling attempts that were exhausted.
	pub attempts: u32,
}

/// Errors raised by [`PluginActivator`]( crate::PluginActivator ) operations.
#[derive( Error, Debug )]
pub enum ActivationError {
	/// The entry symbol names no plugin registration in the module's table.
	#[error( "Unknown Plugin Type: {symbol}" )] UnknownPluginType { symbol: String },
	/// The entry symbol names no bootstrap registration in the module's table.
	#[error( "Unknown Bootstrap Type: {symbol}" )] UnknownBootstrapType { symbol: String },
	/// A binding references a bridge symbol absent from the module's table.
	#[error( "Unknown Bridge Type: {bridge} declared for field {field}" )] UnknownBridgeType {
		bridge: String,
		field: String,
	},
	/// The type exposes no public constructor at all.
	#[error( "No Public Constructor on {type_name}" )] NoPublicConstructor { type_name: String },
	/// The sole public constructor takes parameters where none are allowed.
	#[error( "Constructor Takes Parameters: {type_name} must expose a public argumentless constructor" )]
	ConstructorHasParameters { type_name: String },
	/// The plugin type exposes more than one public constructor.
	#[error( "Multiple Public Constructors on {type_name}" )] MultiplePublicConstructors { type_name: String },
	/// Two service bindings target the same field; this is a configuration defect.
	#[error( "Duplicate Binding for field {field}" )] DuplicateBinding { field: String },
	/// No provider for the declared service type under the requested origin.
	#[error( "Service Not Found: {service} with origin {origin}" )] ServiceNotFound {
		service: String,
		origin: ServiceOrigin,
	},
	/// No wiring slot with the binding's exact field name exists on the plugin type.
	#[error( "Field Not Found: no wiring slot named {field} on {type_name}" )] FieldNotFound {
		field: String,
		type_name: String,
	},
	/// The slot rejected the resolved service and no bridge was declared.
	#[error( "Field Not Assignable: {field} rejected the resolved service, consider declaring a bridge" )]
	FieldNotAssignable { field: String },
	/// The declared bridge lacks a single public constructor with one untyped parameter.
	#[error( "Invalid Bridge: {bridge} must expose a single public constructor with one untyped parameter (field {field})" )]
	InvalidBridge { bridge: String, field: String },
	/// The slot rejected even the constructed bridge.
	#[error( "Bridge Not Assignable: {bridge} rejected by field {field}" )] BridgeNotAssignable {
		bridge: String,
		field: String,
	},
	/// The configured post-construction hook is absent from the created instance.
	#[error( "Activation Hook Missing: no runtime method named {hook} on {type_name}" )] HookMissing {
		hook: String,
		type_name: String,
	},
	/// The configured static factory method failed to produce an instance.
	#[error( "Factory Failure: {message}" )] FactoryFailure { message: String },
	/// The activator has been torn down; it accepts no further activations.
	#[error( "Activator Disposed" )] ActivatorDisposed,
}
