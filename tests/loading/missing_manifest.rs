use plugin_isolate::{ ContextState, DependencyResolutionError, LoadContext, LoadError, ManifestError };

use crate::fixtures ;

#[test]
fn missing_manifest_aborts_and_names_the_module() {

    let dir = tempfile::tempdir().expect( "tempdir" );
    let mut context = LoadContext::new();

    match context.load( &fixtures::descriptor( dir.path(), "absent" ), &fixtures::options(), &fixtures::module_table ) {
        Err( LoadError::Resolution( DependencyResolutionError::Manifest {
            module,
            source: ManifestError::Missing { .. },
        })) => assert_eq!( module, "absent" ),
        other => panic!( "Unexpected result: {other:?}" ),
    }
    assert_eq!( context.state(), ContextState::Unloaded );

    // The same context is usable again once the manifest exists.
    fixtures::write_manifest( dir.path(), "absent" );
    context.load( &fixtures::descriptor( dir.path(), "absent" ), &fixtures::options(), &fixtures::module_table )
        .expect( "loaded after the manifest appeared" );
    assert_eq!( context.state(), ContextState::Loaded );

}
