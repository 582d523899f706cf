use plugin_isolate::{ ActivationDescriptor, PluginActivator, PluginServiceBinding, ServiceOrigin };

use crate::fixtures ;

#[test]
fn rejected_assignment_falls_back_to_the_declared_bridge() {

    let dir = tempfile::tempdir().expect( "tempdir" );
    let ( _context, module ) = fixtures::load_module( dir.path(), "bridged" );

    // The remote greeter's concrete type is not assignable to the slot; only
    // the bridge built around it is.
    let activator = PluginActivator::new( fixtures::TestServices::host_only(
        vec![ fixtures::remote_greeter_entry( "remote" )],
    ));
    let activation = ActivationDescriptor::new( "test.Greeter", module )
        .with_binding(
            PluginServiceBinding::new( "greeter", fixtures::greet_key(), ServiceOrigin::Host )
                .with_bridge( "test.GreeterBridge" ),
        );

    let instance = activator.create_instance( &activation, None ).expect( "activated" );

    instance.with(| plugin | {
        let plugin = plugin.downcast_ref::<fixtures::GreeterPlugin>().expect( "greeter plugin" );
        assert_eq!( plugin.greeter.as_ref().expect( "bridged" ).greet(), "hello from remote" );
    });

    // Bridge, registry, and instance are all tracked.
    assert_eq!( activator.tracked_len(), 3 );

}
