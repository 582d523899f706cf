use plugin_isolate::{ ActivationError, ActivationDescriptor, PluginActivator, PluginServiceBinding, ServiceOrigin };

use crate::fixtures ;

#[test]
fn factory_is_solely_responsible_for_wiring() {

    let dir = tempfile::tempdir().expect( "tempdir" );
    let ( _context, module ) = fixtures::load_module( dir.path(), "factory" );

    let activator = PluginActivator::new( fixtures::TestServices::host_only(
        vec![ fixtures::greeter_entry( "host" )],
    ));

    // The binding targets a field that does not exist and the hook is
    // configured; neither matters because the factory bypasses both.
    let activation = ActivationDescriptor::new( "test.Greeter", module )
        .with_factory( fixtures::greeter_factory )
        .with_activated_hook( "on_activated" )
        .with_binding( PluginServiceBinding::new( "nonexistent", fixtures::greet_key(), ServiceOrigin::Host ));

    let instance = activator.create_instance( &activation, None ).expect( "activated" );

    instance.with(| plugin | {
        let plugin = plugin.downcast_ref::<fixtures::GreeterPlugin>().expect( "greeter plugin" );
        assert!( !plugin.activated );
        assert_eq!( plugin.greeter.as_ref().expect( "wired by factory" ).greet(), "hello from host" );
    });

}

#[test]
fn factory_does_not_excuse_an_ambiguous_constructor() {

    let dir = tempfile::tempdir().expect( "tempdir" );
    let ( _context, module ) = fixtures::load_module( dir.path(), "factory" );

    let activator = PluginActivator::new( fixtures::TestServices::none() );
    let activation = ActivationDescriptor::new( "test.Overloaded", module )
        .with_factory( fixtures::greeter_factory );

    match activator.create_instance( &activation, None ) {
        Err( ActivationError::MultiplePublicConstructors { type_name }) =>
            assert_eq!( type_name, "OverloadedPlugin" ),
        other => panic!( "Unexpected result: {:?}", other.err() ),
    }
    assert_eq!( activator.tracked_len(), 0 );

}

#[test]
fn factory_failure_aborts_the_activation() {

    let dir = tempfile::tempdir().expect( "tempdir" );
    let ( _context, module ) = fixtures::load_module( dir.path(), "factory" );

    let activator = PluginActivator::new( fixtures::TestServices::none() );
    let activation = ActivationDescriptor::new( "test.Greeter", module )
        .with_factory( fixtures::failing_factory );

    match activator.create_instance( &activation, None ) {
        Err( ActivationError::FactoryFailure { message }) => assert_eq!( message, "factory exploded" ),
        other => panic!( "Unexpected result: {:?}", other.err() ),
    }
    assert_eq!( activator.tracked_len(), 0 );

}
