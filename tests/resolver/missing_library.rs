use plugin_isolate::{ resolve_dependencies, DependencyResolutionError };

use crate::fixtures ;

#[test]
fn unresolvable_library_names_itself_and_the_module() {

    let dir = tempfile::tempdir().expect( "tempdir" );
    let manifest = fixtures::parse_manifest( &serde_json::json!({
        "module": "incomplete",
        "version": "1.0.0",
        "libraries": [
            { "name": "Vanished", "version": "1.0.0", "relative_path": "lib/vanished.bin" },
        ],
    }).to_string() );

    let options = fixtures::options().with_probing_paths( vec![ dir.path().to_path_buf() ]);
    match resolve_dependencies( &fixtures::descriptor( dir.path(), "incomplete" ), &manifest, &options ) {
        Err( DependencyResolutionError::LibraryNotFound { library, module }) => {
            assert_eq!( library, "Vanished" );
            assert_eq!( module, "incomplete" );
        },
        other => panic!( "Unexpected result: {other:?}" ),
    }

}
