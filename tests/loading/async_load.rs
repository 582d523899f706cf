use std::time::Duration ;

use plugin_isolate::{ ContextState, LoadContext };

use crate::fixtures ;

#[tokio::test]
async fn async_load_and_verified_unload() {

    let dir = tempfile::tempdir().expect( "tempdir" );
    fixtures::write_manifest( dir.path(), "awaited" );

    let mut context = LoadContext::new();
    let handle = context.load_async( &fixtures::descriptor( dir.path(), "awaited" ), &fixtures::options(), &fixtures::module_table )
        .await
        .expect( "module loaded" );

    assert_eq!( handle.payload(), fixtures::PAYLOAD );
    assert_eq!( context.state(), ContextState::Loaded );

    context.unload().expect( "unload requested" );
    drop( handle );
    context.verify_unloaded_async( 5, Duration::from_millis( 5 )).await.expect( "reclaimed" );
    assert_eq!( context.state(), ContextState::UnloadedVerified );

}
