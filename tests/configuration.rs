// MIT/Apache2 License

// Lives in its own binary: the default backend is process wide and unit tests register one.

use easel::{
    current_context, default_backend, restore_graphics_state, save_graphics_state,
    set_current_context, set_default_backend, Attributes, Destination, Error, GraphicsContext,
    PostScriptBackend, PostScriptFile,
};
use std::{env, fs};

#[test]
fn configuration_lifecycle() {
    let _ = env_logger::builder().is_test(true).try_init();

    // nothing registered yet
    assert!(matches!(default_backend(), Err(Error::Configuration(_))));
    assert!(matches!(
        GraphicsContext::new(Attributes::new()),
        Err(Error::Configuration(_))
    ));

    set_default_backend::<PostScriptFile>();

    let path = env::temp_dir().join(format!("easel-configuration-{}.ps", std::process::id()));
    let ctx = GraphicsContext::new(Attributes::with_destination(Destination::Stream(
        path.clone(),
    )))
    .unwrap();
    assert!(!ctx.is_drawing_to_screen());

    set_current_context(Some(ctx.clone()));
    save_graphics_state().unwrap();
    ctx.set_gray(0.5).unwrap();
    ctx.rect_fill(0.0, 0.0, 10.0, 10.0).unwrap();
    restore_graphics_state().unwrap();
    assert!(current_context().is_some());
    ctx.flush().unwrap();
    set_current_context(None);
    drop(ctx);

    let written = fs::read_to_string(&path).unwrap();
    let _ = fs::remove_file(&path);
    assert_eq!(
        written,
        "gsave\n0.5 setgray\n0 0 10 10 rectfill\ngrestore\n"
    );

    // a stream backend cannot be built without a stream
    assert!(matches!(
        GraphicsContext::new(Attributes::new()),
        Err(Error::InvalidAttributes(_))
    ));

    // in-memory streams go through from_backend
    let memory = GraphicsContext::from_backend(PostScriptBackend::new(Vec::new()), Attributes::new())
        .unwrap();
    memory.show_page().unwrap();
    let out = memory
        .downcast_backend(|ps: &mut PostScriptBackend<Vec<u8>>| ps.get_ref().clone())
        .unwrap();
    assert_eq!(out, b"showpage\n");
}
