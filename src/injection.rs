//! Field injection with the bridge fallback.
//!
//! Bindings apply strictly in declaration order. Each binding resolves its
//! service from the declared origin, locates the wiring slot with the exact
//! field name, and offers the service to the slot. A slot that rejects the
//! offered value triggers the bridge fallback when the binding declares one;
//! a missing slot is always fatal, bridge or not.

use crate::activation::{ PluginServiceBinding, ServiceOrigin };
use crate::error::ActivationError ;
use crate::registration::{ PluginRegistration, RegistrationTable };
use crate::registry::{ ServiceRef, ServiceRegistry };



/// Applies `bindings` to `instance` in declaration order.
///
/// Constructed bridges are reported through `track_bridge` once the slot
/// accepts them, so the caller can keep them alive for the instance's
/// lifetime.
pub(crate) fn inject_fields(
	instance: &mut dyn std::any::Any,
	registration: &PluginRegistration,
	table: &RegistrationTable,
	registry: &ServiceRegistry,
	bindings: &[PluginServiceBinding],
	track_bridge: &mut dyn FnMut( ServiceRef, &'static str ),
) -> Result<(), ActivationError> {
	for binding in bindings {
		apply_binding( instance, registration, table, registry, binding, track_bridge )?;
	}
	Ok(())
}

fn apply_binding(
	instance: &mut dyn std::any::Any,
	registration: &PluginRegistration,
	table: &RegistrationTable,
	registry: &ServiceRegistry,
	binding: &PluginServiceBinding,
	track_bridge: &mut dyn FnMut( ServiceRef, &'static str ),
) -> Result<(), ActivationError> {

	let service = resolve( registry, binding )?;

	let slot = registration.slot( binding.field() )
		.ok_or_else(|| ActivationError::FieldNotFound {
			field: binding.field().to_string(),
			type_name: registration.type_name().to_string(),
		})?;

	if slot.assign( instance, &service ) {
		tracing::trace!(
			target: "plugin_isolate::activator",
			field = binding.field(),
			service = binding.service().name(),
			"service assigned"
		);
		return Ok(());
	}

	let bridge_symbol = binding.bridge()
		.ok_or_else(|| ActivationError::FieldNotAssignable { field: binding.field().to_string() })?;

	let bridge = table.bridge( bridge_symbol )
		.ok_or_else(|| ActivationError::UnknownBridgeType {
			bridge: bridge_symbol.to_string(),
			field: binding.field().to_string(),
		})?;

	let construct = bridge.unary_public_constructor()
		.ok_or_else(|| ActivationError::InvalidBridge {
			bridge: bridge_symbol.to_string(),
			field: binding.field().to_string(),
		})?;

	let bridged = construct( &service );
	match slot.assign( instance, &bridged ) {
		false => Err( ActivationError::BridgeNotAssignable {
			bridge: bridge_symbol.to_string(),
			field: binding.field().to_string(),
		}),
		true => {
			tracing::debug!(
				target: "plugin_isolate::activator",
				field = binding.field(),
				bridge = bridge_symbol,
				"service assigned through bridge"
			);
			track_bridge( bridged, bridge_symbol );
			Ok(())
		},
	}

}

fn resolve( registry: &ServiceRegistry, binding: &PluginServiceBinding ) -> Result<ServiceRef, ActivationError> {
	match binding.origin() {
		ServiceOrigin::Host => registry.resolve_host( binding.service() ),
		ServiceOrigin::Plugin => registry.resolve_plugin( binding.service() ),
	}.ok_or_else(|| ActivationError::ServiceNotFound {
		service: binding.service().name().to_string(),
		origin: binding.origin(),
	})
}
